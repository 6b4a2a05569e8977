//! Startup asset loading.
//!
//! Every file is parsed and decoded on its own scoped thread; the join waits for all
//! of them and reports the first failure in a fixed order. GPU upload happens later,
//! on the render thread.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;

use image::RgbaImage;
use renderer::{load_rgba, CubeFaces, MeshData, ModelData, ModelError, TextureError};

use crate::config::AssetPaths;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("model {path}: {source}")]
    Model {
        path: PathBuf,
        #[source]
        source: ModelError,
    },

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error("skybox {path}: {source}")]
    Skybox {
        path: PathBuf,
        #[source]
        source: TextureError,
    },

    #[error("{0} loader panicked")]
    LoaderPanicked(&'static str),
}

/// A unit-sized mesh plus its optional texture.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub mesh: MeshData,
    pub texture: Option<RgbaImage>,
}

#[derive(Debug, Clone)]
pub struct LoadedAssets {
    pub plane: LoadedModel,
    pub goal: LoadedModel,
    pub terrain_texture: Option<RgbaImage>,
    pub skybox_a: CubeFaces,
    pub skybox_b: CubeFaces,
}

/// Load a glTF model, re-centre and scale it to unit size.
pub fn load_model(path: &Path, texture: Option<&Path>) -> Result<LoadedModel, AssetError> {
    let model_err = |source| AssetError::Model {
        path: path.to_path_buf(),
        source,
    };
    let mut data = ModelData::load_gltf(path).map_err(model_err)?;
    data.normalize_to_unit().map_err(model_err)?;
    let texture = texture.map(load_rgba).transpose()?;
    Ok(LoadedModel {
        mesh: data.to_mesh_data(),
        texture,
    })
}

fn load_skybox(dir: &Path) -> Result<CubeFaces, AssetError> {
    CubeFaces::load_dir(dir).map_err(|source| AssetError::Skybox {
        path: dir.to_path_buf(),
        source,
    })
}

fn joined<T>(
    handle: thread::ScopedJoinHandle<'_, Result<T, AssetError>>,
    name: &'static str,
) -> Result<T, AssetError> {
    handle.join().map_err(|_| AssetError::LoaderPanicked(name))?
}

/// Load everything the game needs before the first frame.
pub fn load_all(paths: &AssetPaths) -> Result<LoadedAssets, AssetError> {
    let start = Instant::now();

    let assets = thread::scope(|s| {
        let plane = s.spawn(|| load_model(&paths.plane_model, paths.plane_texture.as_deref()));
        let goal = s.spawn(|| load_model(&paths.goal_model, paths.goal_texture.as_deref()));
        let terrain = s.spawn(|| {
            paths
                .terrain_texture
                .as_deref()
                .map(load_rgba)
                .transpose()
                .map_err(AssetError::from)
        });
        let skybox_a = s.spawn(|| load_skybox(&paths.skybox_a));
        let skybox_b = s.spawn(|| load_skybox(&paths.skybox_b));

        Ok::<_, AssetError>(LoadedAssets {
            plane: joined(plane, "plane")?,
            goal: joined(goal, "goal")?,
            terrain_texture: joined(terrain, "terrain texture")?,
            skybox_a: joined(skybox_a, "skybox A")?,
            skybox_b: joined(skybox_b, "skybox B")?,
        })
    })?;

    log::info!(
        "Loaded assets in {:.1} ms (plane {} tris, goal {} tris, skyboxes {}px/{}px)",
        start.elapsed().as_secs_f64() * 1000.0,
        assets.plane.mesh.triangle_count(),
        assets.goal.mesh.triangle_count(),
        assets.skybox_a.size(),
        assets.skybox_b.size(),
    );
    Ok(assets)
}
