use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::assemble::assemble;
use crate::compile::CompileError;
use crate::pipeline::{RecompileOutcome, Recompiler};
use crate::registry::{InputResource, ResourceId, ResourceLoadError, ResourceRegistry};
use crate::types::RendererConfig;
use crate::uniforms::RuntimeUniforms;

/// Owns the GPU device, the swapchain, the resource registry and the
/// recompiler. Exclusively held by the window loop; UI components request
/// changes through these methods rather than mutating state themselves.
pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    backend: wgpu::Backend,
    flip_frag_coord: bool,
    uniform_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    recompiler: Recompiler,
    registry: ResourceRegistry,
}

impl GpuState {
    /// Brings up the GPU. Every failure here happens before any rendering
    /// state exists and is fatal (unsupported backend, no adapter, no
    /// surface); afterwards nothing in this struct can end the process
    /// short of device loss.
    pub fn new(window: Arc<Window>, config: &RendererConfig) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: config.backend.backends(),
            ..Default::default()
        });

        let size = window.inner_size();
        let surface = instance
            .create_surface(window)
            .context("failed to create rendering surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .with_context(|| {
            format!(
                "no suitable GPU adapter for backend '{}'",
                config.backend
            )
        })?;

        let info = adapter.get_info();
        // OpenGL already uses the reference bottom-left fragment origin;
        // every other backend gets the assembler's flip macro. Decided
        // once here, never per-frame.
        let flip_frag_coord = info.backend != wgpu::Backend::Gl;
        tracing::info!(
            adapter = %info.name,
            backend = ?info.backend,
            flip_frag_coord,
            "selected graphics adapter"
        );

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("fraglab device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
            },
            None,
        ))
        .context("failed to create GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: present_mode(config.vsync),
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&device, &surface_config);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("runtime uniform buffer"),
            size: std::mem::size_of::<RuntimeUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("input texture sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let recompiler = Recompiler::new(&device, surface_format);

        Ok(Self {
            surface,
            device,
            queue,
            config: surface_config,
            size: PhysicalSize::new(size.width.max(1), size.height.max(1)),
            backend: info.backend,
            flip_frag_coord,
            uniform_buffer,
            sampler,
            recompiler,
            registry: ResourceRegistry::new(),
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn backend(&self) -> wgpu::Backend {
        self.backend
    }

    pub fn flip_frag_coord(&self) -> bool {
        self.flip_frag_coord
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn is_ready(&self) -> bool {
        self.recompiler.is_ready()
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn set_vsync(&mut self, vsync: bool) {
        let mode = present_mode(vsync);
        if self.config.present_mode != mode {
            self.config.present_mode = mode;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Assembles the user code against the current registry and asks the
    /// recompiler for a pipeline. All-or-nothing: on error the previous
    /// pipeline keeps rendering untouched.
    pub fn apply_source(&mut self, user_code: &str) -> Result<RecompileOutcome, CompileError> {
        let assembly = assemble(user_code, self.registry.len(), self.flip_frag_coord);
        self.recompiler.recompile(
            &self.device,
            &assembly,
            &self.registry,
            &self.uniform_buffer,
            &self.sampler,
        )
    }

    pub fn resources(&self) -> impl Iterator<Item = &InputResource> {
        self.registry.iter()
    }

    pub fn resource_count(&self) -> usize {
        self.registry.len()
    }

    /// Loads a texture file into the registry. The caller must follow up
    /// with an apply: the new slot only exists in the shader after a
    /// recompile against the grown registry.
    pub fn add_resource(&mut self, path: &Path) -> Result<ResourceId, ResourceLoadError> {
        self.registry.add(&self.device, &self.queue, path)
    }

    /// Removes a texture by id, returning it so the UI can unregister its
    /// preview binding before the GPU handles drop. Later slots shift
    /// down, so the caller must recompile even though the text is
    /// unchanged.
    pub fn remove_resource(&mut self, id: ResourceId) -> Option<InputResource> {
        self.registry.remove(id)
    }

    pub fn clear_resources(&mut self) {
        self.registry.clear();
    }

    /// Renders one frame: uploads the uniform block, draws the fullscreen
    /// triangle with the current program when one exists (clear-only
    /// otherwise), then hands the encoder to the UI overlay.
    pub fn render_frame(
        &mut self,
        uniforms: &RuntimeUniforms,
        overlay: impl FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    ) -> Result<(), wgpu::SurfaceError> {
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shader pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            if let Some(program) = self.recompiler.current() {
                pass.set_pipeline(program.pipeline());
                pass.set_bind_group(0, program.bind_group(), &[]);
                pass.draw(0..3, 0..1);
            }
        }

        overlay(&self.device, &self.queue, &mut encoder, &view);

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::AutoVsync
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}
