//! Score and level readout.

use std::sync::Arc;

use winit::window::Window;

use crate::level::LevelState;

/// Anything that can show the current score and level.
pub trait ScoreDisplay {
    fn show(&mut self, score: u32, level: LevelState);
}

pub fn format_score(score: u32, level: LevelState) -> String {
    format!("Score: {}  Level: {}", score, level)
}

/// Shows the score in the window title.
pub struct WindowTitleDisplay {
    window: Arc<Window>,
    base_title: String,
}

impl WindowTitleDisplay {
    pub fn new(window: Arc<Window>, base_title: impl Into<String>) -> Self {
        let display = Self {
            window,
            base_title: base_title.into(),
        };
        display.set_title(0, LevelState::default());
        display
    }

    fn set_title(&self, score: u32, level: LevelState) {
        self.window
            .set_title(&format!("{} | {}", self.base_title, format_score(score, level)));
    }
}

impl ScoreDisplay for WindowTitleDisplay {
    fn show(&mut self, score: u32, level: LevelState) {
        log::info!("{}", format_score(score, level));
        self.set_title(score, level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recording(Vec<String>);

    impl ScoreDisplay for Recording {
        fn show(&mut self, score: u32, level: LevelState) {
            self.0.push(format_score(score, level));
        }
    }

    #[test]
    fn formats_score_and_level() {
        let mut display = Recording::default();
        display.show(4, LevelState::new(1));
        display.show(7, LevelState::new(2));
        assert_eq!(display.0, vec!["Score: 4  Level: 1", "Score: 7  Level: 2"]);
    }
}
