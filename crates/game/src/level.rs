//! Game level and the visual mode each level selects.

/// Current game level (0, 1 or 2). Only ever moves up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LevelState(u8);

impl LevelState {
    pub const MAX: LevelState = LevelState(2);

    pub fn new(level: u8) -> Self {
        Self(level.min(Self::MAX.0))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Next level, saturating at [`LevelState::MAX`].
    pub fn advanced(self) -> Self {
        Self::new(self.0 + 1)
    }

    pub fn is_max(self) -> bool {
        self == Self::MAX
    }

    /// Level 2: free vertical flight, fixed speed, 3D goal placement.
    pub fn free_flight(self) -> bool {
        self.0 == 2
    }

    /// Goals start spinning once lighting is on.
    pub fn goals_spin(self) -> bool {
        self.0 >= 1
    }
}

impl std::fmt::Display for LevelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const GROUND_COLOR: [f32; 3] = [0.1, 0.5, 0.1];
pub const SKY_COLOR: [f32; 3] = [0.5, 0.7, 1.0];
/// Height of the flat ground band, in pixels from the bottom of the viewport.
pub const HORIZON_PX: f32 = 300.0;

/// What is drawn behind the entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backdrop {
    /// Two-tone ground/sky fill.
    Gradient,
    /// First skybox (level 1).
    SkyboxA,
    /// Second skybox (level 2); also the plane's reflection source.
    SkyboxB,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualMode {
    pub backdrop: Backdrop,
    pub draw_terrain: bool,
    pub reflective_plane: bool,
}

impl VisualMode {
    pub fn for_level(level: LevelState) -> Self {
        match level.value() {
            0 => Self {
                backdrop: Backdrop::Gradient,
                draw_terrain: false,
                reflective_plane: false,
            },
            1 => Self {
                backdrop: Backdrop::SkyboxA,
                draw_terrain: false,
                reflective_plane: false,
            },
            _ => Self {
                backdrop: Backdrop::SkyboxB,
                draw_terrain: true,
                reflective_plane: true,
            },
        }
    }
}
