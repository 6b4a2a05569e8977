//! Per-frame orchestration: camera, simulation tick, background and draw recording.

use renderer::{Background, Material, RenderError, SceneMatrices};

use crate::game::GameEvent;
use crate::level::{Backdrop, VisualMode, GROUND_COLOR, HORIZON_PX, SKY_COLOR};

impl crate::GameState {
    /// Run one frame. Surface hiccups skip the frame; anything else is fatal.
    pub(crate) fn frame(&mut self) -> anyhow::Result<()> {
        self.time.update();
        let dt_ms = self.time.delta_millis();
        let controls = self.input.flight_controls();

        let visuals = VisualMode::for_level(self.game.level());
        self.camera.follow(self.game.plane().chase_anchor(), &self.rig);
        self.renderer.update_camera(&self.camera);

        if visuals.draw_terrain {
            let position = self.game.plane().position;
            self.terrain.update(&self.renderer, position.x, position.z);
        }

        self.game.update(dt_ms, controls);
        self.dispatch_events();

        let (output, mut encoder) = match self.renderer.begin_frame() {
            Ok(frame) => frame,
            Err(RenderError::Surface(
                e @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated),
            )) => {
                log::warn!("Surface {:?}, reconfiguring", e);
                self.renderer.reconfigure();
                return Ok(());
            }
            Err(RenderError::Surface(wgpu::SurfaceError::Timeout)) => {
                log::warn!("Surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let background = match visuals.backdrop {
            Backdrop::Gradient => Background::Gradient {
                ground: GROUND_COLOR,
                sky: SKY_COLOR,
                horizon_px: HORIZON_PX,
            },
            Backdrop::SkyboxA => Background::Skybox(&self.skybox_a),
            Backdrop::SkyboxB => Background::Skybox(&self.skybox_b),
        };
        self.renderer
            .render_background(&mut encoder, &view, background);

        let scene = SceneMatrices::from_camera(&self.camera);
        let lighting = self.game.lighting();
        let level = self.game.level();
        let mut commands = Vec::new();

        if visuals.draw_terrain {
            commands.extend(self.terrain.draw_commands(&scene));
        }

        let plane_material = if visuals.reflective_plane {
            Material::Reflective {
                environment: &self.skybox_b,
            }
        } else {
            self.plane_drawer.material(lighting)
        };
        commands.extend(self.plane_drawer.draw(
            plane_material,
            &scene,
            self.game.plane().model_matrix(level),
        ));

        let goal_material = self.goal_drawer.material(lighting);
        let goal_models = self
            .game
            .goals()
            .iter()
            .map(|g| g.model_matrix())
            .chain(self.game.animations().iter().map(|a| a.model_matrix()))
            .chain(
                self.game
                    .explosions()
                    .iter()
                    .flat_map(|e| e.particles.iter().map(|p| p.model_matrix())),
            );
        for model in goal_models {
            commands.extend(self.goal_drawer.draw(goal_material, &scene, model));
        }

        self.renderer.render_meshes(&mut encoder, &view, &commands);
        self.renderer.end_frame(output, encoder);
        Ok(())
    }

    fn dispatch_events(&mut self) {
        for event in self.game.drain_events() {
            match event {
                GameEvent::ScoreChanged { score, level } => self.score_display.show(score, level),
                GameEvent::LevelUp(level) => {
                    log::debug!(
                        "Visual mode now {:?} at score {} ({} terrain chunks cached)",
                        VisualMode::for_level(level),
                        self.game.score(),
                        self.terrain.cached_chunks()
                    );
                }
                GameEvent::LightingEnabled => log::info!("Lighting enabled"),
            }
        }
    }
}
