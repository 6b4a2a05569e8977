//! Paper Plane: fly a paper plane through procedural hills and collect stars.

mod assets;
mod config;
mod effects;
mod events;
mod game;
mod goal;
mod hud;
mod level;
mod plane;
mod render;
mod terrain;

use anyhow::Result;
use engine_core::Time;
use input::InputState;
use procgen::{ChunkCache, HeightField};
use renderer::{Camera, ChaseRig, EnvironmentMap, LightParams, MeshDrawer, Renderer};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowId},
};

use assets::LoadedModel;
use config::GameConfig;
use game::Game;
use hud::{ScoreDisplay, WindowTitleDisplay};
use terrain::{TerrainRenderer, TERRAIN_LIGHT};

const WINDOW_TITLE: &str = "Paper Plane";

/// Everything that lives for the duration of the window.
pub struct GameState {
    time: Time,
    input: InputState,

    renderer: Renderer,
    camera: Camera,
    rig: ChaseRig,

    game: Game,
    terrain: TerrainRenderer,
    plane_drawer: MeshDrawer,
    goal_drawer: MeshDrawer,
    skybox_a: EnvironmentMap,
    skybox_b: EnvironmentMap,
    score_display: Box<dyn ScoreDisplay>,

    running: bool,
}

impl GameState {
    async fn new(window: Arc<Window>, config: &GameConfig) -> Result<Self> {
        let assets = assets::load_all(&config.assets)?;

        let renderer = Renderer::new(window.clone(), config.vsync).await?;
        let size = renderer.size();
        let mut camera = Camera::default();
        camera.set_aspect(size.width, size.height);

        let seed = config.world.seed.unwrap_or_else(rand::random);
        log::info!("World seed: {}", seed);

        let plane_drawer = model_drawer(&renderer, &assets.plane, "Plane");
        let goal_drawer = model_drawer(&renderer, &assets.goal, "Goal");

        let mut terrain_drawer = MeshDrawer::new(TERRAIN_LIGHT);
        if let Some(image) = &assets.terrain_texture {
            terrain_drawer.set_texture(renderer.upload_texture(image, "Terrain Texture"));
        }
        let strategy = config.world.eviction.into_strategy();
        log::info!(
            "Terrain: {} units per chunk, {} cells, view radius {}, eviction {}",
            config.world.chunk_size,
            config.world.resolution,
            config.world.view_radius,
            strategy.name()
        );
        let cache = ChunkCache::new(config.world.chunk_settings(), HeightField::new(seed))
            .with_strategy(strategy);
        let terrain = TerrainRenderer::new(cache, terrain_drawer, config.world.view_radius);

        let skybox_a = renderer.upload_environment(&assets.skybox_a, "Skybox A");
        let skybox_b = renderer.upload_environment(&assets.skybox_b, "Skybox B");

        Ok(Self {
            time: Time::new(),
            input: InputState::new(),
            camera,
            rig: ChaseRig::default(),
            game: Game::new(seed),
            terrain,
            plane_drawer,
            goal_drawer,
            skybox_a,
            skybox_b,
            score_display: Box::new(WindowTitleDisplay::new(window, WINDOW_TITLE)),
            renderer,
            running: true,
        })
    }
}

fn model_drawer(renderer: &Renderer, model: &LoadedModel, label: &str) -> MeshDrawer {
    let mut drawer = MeshDrawer::new(LightParams::default());
    drawer.set_mesh(renderer.upload_mesh(&model.mesh));
    if let Some(image) = &model.texture {
        drawer.set_texture(renderer.upload_texture(image, &format!("{} Texture", label)));
    }
    drawer
}

struct App {
    config: GameConfig,
    state: Option<GameState>,
    /// First fatal error; returned from `main` once the loop exits.
    error: Option<anyhow::Error>,
}

impl App {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error.get_or_insert(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        let window_attrs = Window::default_attributes()
            .with_title(WINDOW_TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window_width,
                self.config.window_height,
            ))
            .with_fullscreen(self.config.fullscreen.then_some(Fullscreen::Borderless(None)));

        let window = match event_loop.create_window(window_attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fail(event_loop, anyhow::anyhow!("failed to create window: {}", e));
                return;
            }
        };

        match pollster::block_on(GameState::new(window.clone(), &self.config)) {
            Ok(s) => {
                self.state = Some(s);
                window.request_redraw();
            }
            Err(e) => self.fail(event_loop, e.context("failed to initialize game")),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };
        match state.handle_window_event(event) {
            Ok(exit) => {
                if exit || !state.running {
                    event_loop.exit();
                }
            }
            Err(e) => self.fail(event_loop, e),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting {} (arrows or WASD to fly, Escape to quit)", WINDOW_TITLE);

    let config = GameConfig::load();
    let event_loop = EventLoop::new()?;
    // Poll so redraws run back to back; each frame requests the next one.
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        config,
        state: None,
        error: None,
    };
    event_loop.run_app(&mut app)?;

    if let Some(state) = &app.state {
        log::info!(
            "Flew {:.1}s over {} frames, final score {}",
            state.time.elapsed_seconds(),
            state.time.frame_count(),
            state.game.score()
        );
    }

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
