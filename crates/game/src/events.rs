//! Window event handling for GameState.

use winit::event::WindowEvent;
use winit::keyboard::{KeyCode, PhysicalKey};

impl crate::GameState {
    /// Handle a window event. Returns `Ok(true)` if the app should exit.
    pub(crate) fn handle_window_event(&mut self, event: WindowEvent) -> anyhow::Result<bool> {
        match event {
            WindowEvent::CloseRequested => {
                self.running = false;
                Ok(true)
            }
            WindowEvent::Resized(size) => {
                self.renderer.resize(size);
                self.camera.set_aspect(size.width, size.height);
                Ok(false)
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.input.process_keyboard(key, event.state);
                    if key == KeyCode::Escape && event.state.is_pressed() {
                        self.running = false;
                    }
                }
                Ok(false)
            }
            // Key releases are not delivered while unfocused.
            WindowEvent::Focused(false) => {
                self.input.clear();
                Ok(false)
            }
            WindowEvent::RedrawRequested => {
                self.frame()?;
                self.renderer.window.request_redraw();
                Ok(false)
            }
            _ => Ok(false),
        }
    }
}
