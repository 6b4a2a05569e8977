//! 2D textures, cubemaps and the depth buffer.
//!
//! Decoding (`load_rgba`, `CubeFaces::load_dir`) is CPU-only and safe to run on worker
//! threads; uploading needs the device and queue and happens on the render thread.

use std::path::{Path, PathBuf};

use image::RgbaImage;

/// Face files of a cubemap directory, in wgpu layer order (+X, -X, +Y, -Y, +Z, -Z).
pub const CUBE_FACE_FILES: [&str; 6] = [
    "posx.png", "negx.png", "posy.png", "negy.png", "posz.png", "negz.png",
];

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to load image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("cubemap face {face} is {width}x{height}, expected {expected}x{expected}")]
    CubeFaceSize {
        face: &'static str,
        width: u32,
        height: u32,
        expected: u32,
    },
}

/// Decode an image file to RGBA8.
pub fn load_rgba(path: &Path) -> Result<RgbaImage, TextureError> {
    let image = image::open(path).map_err(|source| TextureError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgba8())
}

/// Six decoded, equally sized square faces.
#[derive(Debug, Clone)]
pub struct CubeFaces {
    faces: [RgbaImage; 6],
    size: u32,
}

impl CubeFaces {
    pub fn new(faces: [RgbaImage; 6]) -> Result<Self, TextureError> {
        let size = faces[0].width();
        for (face, name) in faces.iter().zip(CUBE_FACE_FILES) {
            if face.width() != size || face.height() != size {
                return Err(TextureError::CubeFaceSize {
                    face: name,
                    width: face.width(),
                    height: face.height(),
                    expected: size,
                });
            }
        }
        Ok(Self { faces, size })
    }

    /// Load `posx.png` .. `negz.png` from a directory.
    pub fn load_dir(dir: &Path) -> Result<Self, TextureError> {
        let [px, nx, py, ny, pz, nz] = CUBE_FACE_FILES.map(|name| load_rgba(&dir.join(name)));
        Self::new([px?, nx?, py?, ny?, pz?, nz?])
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn faces(&self) -> &[RgbaImage; 6] {
        &self.faces
    }
}

/// A sampled 2D texture.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture {
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Upload an RGBA image as an sRGB texture with repeat addressing.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        label: &str,
    ) -> Self {
        let (width, height) = image.dimensions();
        Self::from_rgba(device, queue, image.as_raw(), width, height, label)
    }

    /// 1x1 white texture, bound when a drawer has no texture.
    pub fn white_pixel(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self::from_rgba(device, queue, &[255, 255, 255, 255], 1, 1, "White Pixel")
    }

    fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: &[u8],
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        Self {
            texture,
            view,
            sampler,
        }
    }

    pub fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });
        Self {
            texture,
            view,
            sampler,
        }
    }
}

/// A six-layer cube texture for skyboxes and reflections.
pub struct CubeTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl CubeTexture {
    pub fn from_faces(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        faces: &CubeFaces,
        label: &str,
    ) -> Self {
        let size = faces.size();
        let texture = Self::create(device, size, label);
        for (layer, face) in faces.faces().iter().enumerate() {
            Self::write_layer(queue, &texture, layer as u32, face.as_raw(), size);
        }
        Self::finish(device, texture, label)
    }

    /// 1x1 cube of a single colour, bound when no environment is in use.
    pub fn solid(device: &wgpu::Device, queue: &wgpu::Queue, rgba: [u8; 4]) -> Self {
        let texture = Self::create(device, 1, "Solid Cube");
        for layer in 0..6 {
            Self::write_layer(queue, &texture, layer, &rgba, 1);
        }
        Self::finish(device, texture, "Solid Cube")
    }

    fn create(device: &wgpu::Device, size: u32, label: &str) -> wgpu::Texture {
        device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        })
    }

    fn write_layer(queue: &wgpu::Queue, texture: &wgpu::Texture, layer: u32, rgba: &[u8], size: u32) {
        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x: 0, y: 0, z: layer },
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * size),
                rows_per_image: Some(size),
            },
            wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 1,
            },
        );
    }

    fn finish(device: &wgpu::Device, texture: wgpu::Texture, label: &str) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        Self {
            texture,
            view,
            sampler,
        }
    }
}

/// A 2D texture with its mesh-pipeline bind group (group 2).
pub struct BoundTexture {
    pub texture: Texture,
    pub bind_group: wgpu::BindGroup,
}

/// A cubemap bound for skybox drawing and reflections (group 1 of the skybox pipeline,
/// group 3 of the mesh pipeline).
pub struct EnvironmentMap {
    pub cube: CubeTexture,
    pub bind_group: wgpu::BindGroup,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]))
    }

    #[test]
    fn cube_faces_must_match() {
        let ok = CubeFaces::new([face(4, 4), face(4, 4), face(4, 4), face(4, 4), face(4, 4), face(4, 4)]);
        assert_eq!(ok.map(|f| f.size()).ok(), Some(4));

        let bad = CubeFaces::new([face(4, 4), face(4, 4), face(4, 4), face(8, 8), face(4, 4), face(4, 4)]);
        match bad {
            Err(TextureError::CubeFaceSize { face, .. }) => assert_eq!(face, "negy.png"),
            other => panic!("expected size error, got {:?}", other.map(|f| f.size())),
        }
    }

    #[test]
    fn non_square_face_is_rejected() {
        let faces = [face(4, 2), face(4, 2), face(4, 2), face(4, 2), face(4, 2), face(4, 2)];
        assert!(CubeFaces::new(faces).is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_rgba(Path::new("does/not/exist.png")).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.png"));
    }
}
