use appconfig::AppOptions;
use winit::event::WindowEvent;
use winit::window::Window;

/// Owns the egui context, winit translation state and wgpu painter for
/// the overlay. The overlay renders in its own pass, loading whatever the
/// shader pass produced.
pub struct UiLayer {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

/// Output of one egui frame, ready to paint after the shader pass.
pub struct PreparedUi {
    primitives: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    pixels_per_point: f32,
}

impl UiLayer {
    pub fn new(
        window: &Window,
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let ctx = egui::Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            None,
            None,
            None,
        );
        let renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);
        Self {
            ctx,
            state,
            renderer,
        }
    }

    /// Feeds a window event to egui; returns true when egui consumed it.
    pub fn on_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Runs one egui frame and tessellates it for painting.
    pub fn run(&mut self, window: &Window, mut build: impl FnMut(&egui::Context)) -> PreparedUi {
        let raw_input = self.state.take_egui_input(window);
        let output = self.ctx.run(raw_input, |ctx| build(ctx));
        self.state
            .handle_platform_output(window, output.platform_output);
        let primitives = self
            .ctx
            .tessellate(output.shapes, output.pixels_per_point);
        PreparedUi {
            primitives,
            textures_delta: output.textures_delta,
            pixels_per_point: output.pixels_per_point,
        }
    }

    /// Paints a prepared frame on top of the shader output.
    pub fn paint(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        size_in_pixels: [u32; 2],
        prepared: PreparedUi,
    ) {
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels,
            pixels_per_point: prepared.pixels_per_point,
        };

        for (id, delta) in &prepared.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }
        let _ = self
            .renderer
            .update_buffers(device, queue, encoder, &prepared.primitives, &screen);

        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("overlay pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();
            self.renderer
                .render(&mut pass, &prepared.primitives, &screen);
        }

        for id in &prepared.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }

    /// Exposes a sampling-ready texture view (the registry's preview view)
    /// as an egui texture for thumbnails.
    pub fn register_preview(
        &mut self,
        device: &wgpu::Device,
        view: &wgpu::TextureView,
    ) -> egui::TextureId {
        self.renderer
            .register_native_texture(device, view, wgpu::FilterMode::Linear)
    }

    pub fn free_preview(&mut self, id: egui::TextureId) {
        self.renderer.free_texture(&id);
    }

    /// Applies the UI-affecting options: zoom and overlay opacity.
    pub fn apply_options(&self, options: &AppOptions) {
        self.ctx.set_zoom_factor(options.ui_scale);
        let mut visuals = egui::Visuals::dark();
        visuals.window_fill = visuals.window_fill.gamma_multiply(options.ui_opacity);
        visuals.panel_fill = visuals.panel_fill.gamma_multiply(options.ui_opacity);
        self.ctx.set_visuals(visuals);
    }
}
