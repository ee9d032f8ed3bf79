use std::path::{Path, PathBuf};

use wgpu::util::{DeviceExt, TextureDataOrder};

/// Binding slot occupied by the uniform block.
pub const UNIFORM_BINDING: u32 = 0;
/// Binding slot occupied by the shared sampler.
pub const SAMPLER_BINDING: u32 = 1;
/// First binding slot available to input textures.
pub const FIRST_TEXTURE_BINDING: u32 = 2;

/// Binding slot for the resource at `index` in the registry. Ordinal
/// position IS the slot: removing a non-tail entry shifts every later
/// resource down, which is why the registry generation gates recompiles.
pub fn binding_slot(index: usize) -> u32 {
    FIRST_TEXTURE_BINDING + index as u32
}

/// Stable identifier for a bound texture, independent of its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(u64);

/// Loading or decoding a texture file failed. The registry is left
/// untouched; the message is surfaced as a transient notice.
#[derive(Debug, thiserror::Error)]
pub enum ResourceLoadError {
    #[error("failed to load image at {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image at {path} has zero extent ({width}x{height})")]
    ZeroExtent {
        path: PathBuf,
        width: u32,
        height: u32,
    },
}

/// One bound input texture.
///
/// Two views exist over the same texture: the sampling view keeps the
/// sRGB interpretation the shader expects, while the preview view
/// reinterprets the texels as non-sRGB because the UI layer performs its
/// own colour handling when drawing thumbnails.
pub struct InputResource {
    id: ResourceId,
    name: String,
    path: PathBuf,
    width: u32,
    height: u32,
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    preview_view: wgpu::TextureView,
}

impl InputResource {
    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn preview_view(&self) -> &wgpu::TextureView {
        &self.preview_view
    }
}

/// Ordered set of input textures bound to the shader.
///
/// The generation counter increments on every mutation; the recompiler
/// compares it against the generation its pipeline was built with, so a
/// remove-then-add that restores the same count still forces a rebuild.
pub struct ResourceRegistry {
    entries: Vec<InputResource>,
    next_id: u64,
    generation: u64,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_id: 0,
            generation: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputResource> {
        self.entries.iter()
    }

    /// Loads an image file and appends it as the highest-numbered slot.
    pub fn add(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
    ) -> Result<ResourceId, ResourceLoadError> {
        let decoded = decode_image(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(&format!("input texture ({})", path.display())),
                size: wgpu::Extent3d {
                    width: decoded.width,
                    height: decoded.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[wgpu::TextureFormat::Rgba8Unorm],
            },
            TextureDataOrder::LayerMajor,
            &decoded.rgba,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let preview_view = texture.create_view(&wgpu::TextureViewDescriptor {
            format: Some(wgpu::TextureFormat::Rgba8Unorm),
            ..Default::default()
        });

        let id = ResourceId(self.next_id);
        self.next_id += 1;
        self.generation += 1;

        tracing::info!(
            slot = binding_slot(self.entries.len()),
            path = %path.display(),
            width = decoded.width,
            height = decoded.height,
            "loaded input texture"
        );

        self.entries.push(InputResource {
            id,
            name,
            path: path.to_path_buf(),
            width: decoded.width,
            height: decoded.height,
            _texture: texture,
            view,
            preview_view,
        });

        Ok(id)
    }

    /// Removes a resource by identifier, returning it so the caller can
    /// release any UI bindings before the GPU handles drop. Later entries
    /// shift into lower slots, so callers must recompile afterwards even
    /// though the shader text did not change.
    pub fn remove(&mut self, id: ResourceId) -> Option<InputResource> {
        let index = self.entries.iter().position(|entry| entry.id == id)?;
        self.generation += 1;
        Some(self.entries.remove(index))
    }

    /// Drops every entry; used on full teardown.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.generation += 1;
        }
        self.entries.clear();
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Decodes an image file to RGBA8. Pure CPU step, separated from texture
/// creation so load failures are reported before any GPU work happens.
pub(crate) fn decode_image(path: &Path) -> Result<DecodedImage, ResourceLoadError> {
    let image = image::open(path).map_err(|source| ResourceLoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(ResourceLoadError::ZeroExtent {
            path: path.to_path_buf(),
            width,
            height,
        });
    }

    Ok(DecodedImage {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn slots_start_after_uniform_and_sampler() {
        assert_eq!(binding_slot(0), 2);
        assert_eq!(binding_slot(1), 3);
        assert_eq!(binding_slot(2), 4);
    }

    #[test]
    fn decode_rejects_unreadable_file() {
        let error = decode_image(Path::new("/nonexistent/not-a-texture.png"))
            .expect_err("missing file must not decode");
        assert!(matches!(error, ResourceLoadError::Decode { .. }));
    }

    #[test]
    fn decode_rejects_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.png");
        let mut file = std::fs::File::create(&path).expect("create file");
        file.write_all(b"definitely not a png").expect("write");

        let error = decode_image(&path).expect_err("garbage must not decode");
        assert!(matches!(error, ResourceLoadError::Decode { .. }));
    }

    #[test]
    fn decode_reads_generated_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("texture.png");
        let mut pixels = image::RgbaImage::new(4, 2);
        pixels.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        pixels.save(&path).expect("save png");

        let decoded = decode_image(&path).expect("png must decode");
        assert_eq!(decoded.width, 4);
        assert_eq!(decoded.height, 2);
        assert_eq!(decoded.rgba.len(), 4 * 2 * 4);
        assert_eq!(&decoded.rgba[0..4], &[255, 0, 0, 255]);
    }
}
