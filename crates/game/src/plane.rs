//! The player's paper plane: stateful arcade motion, no physics.

use std::f32::consts::FRAC_PI_2;

use engine_core::{Mat4, Quat, Transform, Vec3};
use input::FlightControls;

use crate::level::LevelState;

/// Heading change per tick while a turn key is held (radians).
pub const TURN_RATE: f32 = 0.03;
/// Visual bank while turning (radians).
pub const ROLL_ANGLE: f32 = 0.3;
/// Speed change per tick while up/down is held (levels 0-1).
pub const ACCELERATION: f32 = 0.001;
pub const MIN_SPEED: f32 = 0.005;
pub const MAX_SPEED: f32 = 0.1;
pub const START_SPEED: f32 = 0.02;
/// Vertical movement per tick in free flight (level 2).
pub const CLIMB_RATE: f32 = 0.05;
/// Visual nose pitch while climbing or diving (radians).
pub const PITCH_ANGLE: f32 = 0.2;
/// Fixed forward speed in free flight.
pub const FREE_FLIGHT_SPEED: f32 = 0.05;

#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub position: Vec3,
    /// Heading in radians; 0 flies along +Z.
    pub angle: f32,
    pub pitch: f32,
    pub roll: f32,
    pub speed: f32,
}

impl Default for Plane {
    fn default() -> Self {
        Self::new()
    }
}

impl Plane {
    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, -0.5, 0.0),
            angle: 0.0,
            pitch: 0.0,
            roll: 0.0,
            speed: START_SPEED,
        }
    }

    /// Advance one tick.
    pub fn update(&mut self, controls: FlightControls, level: LevelState) {
        self.roll = 0.0;
        if controls.left {
            self.angle += TURN_RATE;
            self.roll = ROLL_ANGLE;
        }
        if controls.right {
            self.angle -= TURN_RATE;
            self.roll = -ROLL_ANGLE;
        }

        if level.free_flight() {
            self.pitch = 0.0;
            if controls.up {
                self.position.y += CLIMB_RATE;
                self.pitch = -PITCH_ANGLE;
            }
            if controls.down {
                self.position.y -= CLIMB_RATE;
                self.pitch = PITCH_ANGLE;
            }
            self.speed = FREE_FLIGHT_SPEED;
        } else {
            if controls.up {
                self.speed += ACCELERATION;
            }
            if controls.down {
                self.speed -= ACCELERATION;
            }
            self.speed = self.speed.clamp(MIN_SPEED, MAX_SPEED);
        }

        self.position.x += self.angle.sin() * self.speed;
        self.position.z += self.angle.cos() * self.speed;
    }

    /// World transform the chase camera hangs off (local +X is forward).
    pub fn chase_anchor(&self) -> Mat4 {
        Transform::from_position_rotation(self.position, Quat::from_rotation_y(-FRAC_PI_2 + self.angle))
            .to_matrix()
    }

    /// Model matrix: yaw, then pitch (free flight only), then roll.
    pub fn model_matrix(&self, level: LevelState) -> Mat4 {
        let mut rotation = Quat::from_rotation_y(FRAC_PI_2 + self.angle);
        if level.free_flight() {
            rotation *= Quat::from_rotation_z(self.pitch);
        }
        rotation *= Quat::from_rotation_x(self.roll);
        Transform::from_position_rotation(self.position, rotation).to_matrix()
    }
}
