//! Materials and draw commands.
//!
//! Shading is chosen per draw: every [`DrawCommand`] carries its own [`Material`], so a
//! drawer can be used lit for one draw and reflective for the next without any state
//! leaking between them.

use bytemuck::{Pod, Zeroable};
use engine_core::normal_matrix;
use glam::{Mat3, Mat4, Vec3};

use crate::camera::Camera;
use crate::mesh::Mesh;
use crate::texture::{BoundTexture, EnvironmentMap};

/// Frame a lit draw's light direction is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightSpace {
    /// The light turns with the camera.
    #[default]
    View,
    /// The light stays fixed in the world as the camera moves.
    World,
}

/// How a draw is shaded.
#[derive(Clone, Copy)]
pub enum Material<'a> {
    /// Base colour only (texture or white).
    Unlit,
    /// Ambient + diffuse + white Blinn-Phong specular.
    Lit {
        light_dir: Vec3,
        shininess: f32,
        space: LightSpace,
    },
    /// Mirror reflection of an environment cubemap.
    Reflective { environment: &'a EnvironmentMap },
}

impl Material<'_> {
    /// Shader mode index (`params.x` in the mesh shader).
    pub fn mode(&self) -> u32 {
        match self {
            Material::Unlit => 0,
            Material::Lit { .. } => 1,
            Material::Reflective { .. } => 2,
        }
    }
}

impl std::fmt::Debug for Material<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Material::Unlit => write!(f, "Unlit"),
            Material::Lit {
                light_dir,
                shininess,
                space,
            } => f
                .debug_struct("Lit")
                .field("light_dir", light_dir)
                .field("shininess", shininess)
                .field("space", space)
                .finish(),
            Material::Reflective { .. } => write!(f, "Reflective"),
        }
    }
}

/// Camera matrices shared by every draw in a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneMatrices {
    pub view: Mat4,
    pub view_proj: Mat4,
}

impl SceneMatrices {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view: camera.view_matrix(),
            view_proj: camera.view_projection_matrix(),
        }
    }
}

/// The matrices one draw needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawTransforms {
    pub mvp: Mat4,
    /// Frame the shader lights and reflects in: `view * model`, or just `model` for
    /// world-space lighting.
    pub model_view: Mat4,
    /// Inverse-transpose of `model_view`.
    pub normal_matrix: Mat3,
}

impl DrawTransforms {
    pub fn new(scene: &SceneMatrices, model: Mat4, space: LightSpace) -> Self {
        let model_view = match space {
            LightSpace::View => scene.view * model,
            LightSpace::World => model,
        };
        Self {
            mvp: scene.view_proj * model,
            model_view,
            normal_matrix: normal_matrix(model_view),
        }
    }
}

/// One recorded draw.
pub struct DrawCommand<'a> {
    pub mesh: &'a Mesh,
    /// `None` draws with plain white.
    pub texture: Option<&'a BoundTexture>,
    pub material: Material<'a>,
    pub transforms: DrawTransforms,
}

/// Light parameters a drawer applies when asked for a lit material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightParams {
    pub direction: Vec3,
    pub shininess: f32,
    pub space: LightSpace,
}

impl Default for LightParams {
    /// The entity light: fixed in the world, shining down the -Z axis.
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.0, 1.0, -1.0),
            shininess: 50.0,
            space: LightSpace::World,
        }
    }
}

/// A reusable mesh + texture + light bundle that records draw commands.
#[derive(Default)]
pub struct MeshDrawer {
    mesh: Option<Mesh>,
    texture: Option<BoundTexture>,
    show_texture: bool,
    light: LightParams,
}

impl MeshDrawer {
    pub fn new(light: LightParams) -> Self {
        Self {
            light,
            ..Default::default()
        }
    }

    pub fn set_mesh(&mut self, mesh: Mesh) {
        self.mesh = Some(mesh);
    }

    /// Set the texture and start showing it.
    pub fn set_texture(&mut self, texture: BoundTexture) {
        self.texture = Some(texture);
        self.show_texture = true;
    }

    pub fn show_texture(&mut self, show: bool) {
        self.show_texture = show;
    }

    pub fn set_light_dir(&mut self, direction: Vec3) {
        self.light.direction = direction;
    }

    pub fn set_shininess(&mut self, shininess: f32) {
        self.light.shininess = shininess;
    }

    pub fn light(&self) -> LightParams {
        self.light
    }

    pub fn has_mesh(&self) -> bool {
        self.mesh.is_some()
    }

    /// `Lit` when `lighting` is on, else `Unlit`.
    pub fn material(&self, lighting: bool) -> Material<'static> {
        if lighting {
            Material::Lit {
                light_dir: self.light.direction,
                shininess: self.light.shininess,
                space: self.light.space,
            }
        } else {
            Material::Unlit
        }
    }

    fn active_texture(&self) -> Option<&BoundTexture> {
        self.texture.as_ref().filter(|_| self.show_texture)
    }

    /// Record a draw of the drawer's own mesh. `None` until a mesh is set.
    pub fn draw<'a>(
        &'a self,
        material: Material<'a>,
        scene: &SceneMatrices,
        model: Mat4,
    ) -> Option<DrawCommand<'a>> {
        let mesh = self.mesh.as_ref()?;
        Some(self.draw_mesh(mesh, material, scene, model))
    }

    /// Record a draw of an externally owned mesh with this drawer's texture.
    pub fn draw_mesh<'a>(
        &'a self,
        mesh: &'a Mesh,
        material: Material<'a>,
        scene: &SceneMatrices,
        model: Mat4,
    ) -> DrawCommand<'a> {
        // Reflections always need the eye ray, so only lit draws can opt out of the view.
        let space = match material {
            Material::Lit { space, .. } => space,
            _ => LightSpace::View,
        };
        DrawCommand {
            mesh,
            texture: self.active_texture(),
            material,
            transforms: DrawTransforms::new(scene, model, space),
        }
    }
}

/// Per-draw shader constants (must match `DrawUniform` in mesh.wgsl).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawUniform {
    pub mvp: [[f32; 4]; 4],
    pub model_view: [[f32; 4]; 4],
    /// mat3x3 columns padded to vec4.
    pub normal_matrix: [[f32; 4]; 3],
    pub light_dir: [f32; 4],
    /// x = mode, y = shininess.
    pub params: [f32; 4],
}

impl DrawUniform {
    pub fn from_command(command: &DrawCommand<'_>) -> Self {
        let t = &command.transforms;
        let n = t.normal_matrix;
        let (light_dir, shininess) = match command.material {
            Material::Lit {
                light_dir,
                shininess,
                ..
            } => (light_dir.normalize_or_zero(), shininess),
            _ => (Vec3::ZERO, 1.0),
        };
        Self {
            mvp: t.mvp.to_cols_array_2d(),
            model_view: t.model_view.to_cols_array_2d(),
            normal_matrix: [
                n.x_axis.extend(0.0).into(),
                n.y_axis.extend(0.0).into(),
                n.z_axis.extend(0.0).into(),
            ],
            light_dir: light_dir.extend(0.0).into(),
            params: [command.material.mode() as f32, shininess, 0.0, 0.0],
        }
    }
}
