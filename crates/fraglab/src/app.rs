use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use appconfig::AppOptions;
use renderer::{
    EditSession, FrameClock, FrameInput, GpuState, RendererConfig, ResourceId, RuntimeUniforms,
};
use shaderfile::{convert_shadertoy, ShaderDocument, ShaderMetadata};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::{Fullscreen, Window, WindowId};

use crate::cli::Cli;
use crate::ui::{Panels, ResourceView, UiAction, UiLayer, UiModel};

const FPS_UPDATE_INTERVAL: f32 = 0.25;

/// Top-level winit application. Everything interesting lives in
/// `AppState`, created once the event loop hands us a window.
pub struct App {
    init: Option<InitData>,
    state: Option<AppState>,
    error: Option<anyhow::Error>,
}

struct InitData {
    backend: renderer::BackendChoice,
    window_size: (u32, u32),
    options: AppOptions,
    options_path: PathBuf,
    metadata: ShaderMetadata,
    fragment_code: String,
    current_file: Option<PathBuf>,
}

struct AppState {
    window: Arc<Window>,
    gpu: GpuState,
    ui: UiLayer,
    panels: Panels,
    session: EditSession,
    metadata: ShaderMetadata,
    options: AppOptions,
    options_path: PathBuf,
    uniforms: RuntimeUniforms,
    clock: FrameClock,
    input: InputTracker,
    fps: FpsCounter,
    backend_label: String,
    previews: HashMap<ResourceId, egui::TextureId>,
    /// egui textures whose registry entry was removed this frame; freed at
    /// the start of the next frame, after the overlay stopped referencing
    /// them.
    pending_free: Vec<egui::TextureId>,
    current_file: Option<PathBuf>,
}

impl App {
    pub fn new(
        cli: Cli,
        options: AppOptions,
        options_path: PathBuf,
        metadata: ShaderMetadata,
        fragment_code: String,
    ) -> Self {
        // A Shadertoy import must not be saved back over the original
        // dialect file, so it starts without a current path.
        let current_file = if cli.shadertoy { None } else { cli.shader.clone() };
        Self {
            init: Some(InitData {
                backend: cli.backend,
                window_size: cli.size.unwrap_or((1280, 720)),
                options,
                options_path,
                metadata,
                fragment_code,
                current_file,
            }),
            state: None,
            error: None,
        }
    }

    /// Surfaces an initialisation failure after the event loop returns.
    pub fn into_result(self) -> Result<()> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn initialise(&mut self, event_loop: &ActiveEventLoop, init: InitData) -> Result<AppState> {
        let mut attributes = Window::default_attributes()
            .with_title("fraglab")
            .with_inner_size(PhysicalSize::new(init.window_size.0, init.window_size.1));
        if init.options.fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("failed to create window")?,
        );

        let config = RendererConfig {
            backend: init.backend,
            vsync: init.options.vsync,
        };
        let gpu = GpuState::new(window.clone(), &config)?;
        let backend_label = format!("{:?}", gpu.backend());
        window.set_title(&format!("fraglab ({backend_label})"));

        let ui = UiLayer::new(&window, gpu.device(), gpu.surface_format());
        ui.apply_options(&init.options);

        let mut session = EditSession::new(init.fragment_code, init.options.auto_apply_interval);
        session.set_auto_apply(init.options.auto_apply);

        let size = window.inner_size();
        Ok(AppState {
            window,
            gpu,
            ui,
            panels: Panels::new(),
            session,
            metadata: init.metadata,
            options: init.options,
            options_path: init.options_path,
            uniforms: RuntimeUniforms::new(size.width.max(1), size.height.max(1)),
            clock: FrameClock::new(),
            input: InputTracker::default(),
            fps: FpsCounter::new(),
            backend_label,
            previews: HashMap::new(),
            pending_free: Vec::new(),
            current_file: init.current_file,
        })
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let AppState {
            window,
            gpu,
            ui,
            panels,
            session,
            metadata,
            options,
            options_path,
            uniforms,
            clock,
            input,
            fps,
            backend_label,
            previews,
            pending_free,
            current_file,
        } = state;

        let delta_time = clock.tick();
        fps.tick(delta_time);
        for id in pending_free.drain(..) {
            ui.free_preview(id);
        }

        let size = gpu.size();
        uniforms.set_resolution(size.width, size.height);
        uniforms.update(&input.frame_input(options.invert_mouse_y), delta_time);

        let resources: Vec<ResourceView> = gpu
            .resources()
            .enumerate()
            .map(|(slot, resource)| {
                let (width, height) = resource.size();
                ResourceView {
                    id: resource.id(),
                    name: resource.name().to_string(),
                    width,
                    height,
                    slot,
                    preview: previews
                        .get(&resource.id())
                        .copied()
                        .unwrap_or_default(),
                }
            })
            .collect();

        let mut actions = Vec::new();
        let prepared = ui.run(window, |ctx| {
            let mut model = UiModel {
                session: &mut *session,
                metadata: &mut *metadata,
                options: &mut *options,
                resources: &resources,
                current_file: current_file.as_deref(),
                fps: fps.text(),
                backend_label: backend_label.as_str(),
            };
            actions = panels.draw(ctx, &mut model, delta_time);
        });

        for action in actions {
            match action {
                UiAction::Apply => session.request_apply(),
                UiAction::SetAutoApply(enabled) => {
                    session.set_auto_apply(enabled);
                    options.auto_apply = enabled;
                    if let Err(error) = options.save(options_path) {
                        tracing::warn!(error = %error, "failed to save options");
                    }
                }
                UiAction::LoadShader { path, shadertoy } => match ShaderDocument::load(&path) {
                    Ok(document) => {
                        let code = if shadertoy {
                            convert_shadertoy(&document.fragment_code)
                        } else {
                            document.fragment_code
                        };
                        session.set_code(code);
                        *metadata = document.metadata;
                        *current_file = if shadertoy { None } else { Some(path) };
                        session.request_apply();
                    }
                    Err(error) => panels.notify(error.to_string()),
                },
                UiAction::SaveShader { path } => {
                    let mut saved_metadata = metadata.clone();
                    saved_metadata.resource_paths = gpu
                        .resources()
                        .map(|resource| resource.path().to_path_buf())
                        .collect();
                    let document = ShaderDocument {
                        metadata: saved_metadata,
                        fragment_code: session.code().to_string(),
                    };
                    match document.save(&path) {
                        Ok(()) => {
                            panels.notify(format!("Saved {}", path.display()));
                            *current_file = Some(path);
                        }
                        Err(error) => panels.notify(error.to_string()),
                    }
                }
                UiAction::AddResource { path } => match gpu.add_resource(&path) {
                    Ok(id) => {
                        if let Some(view) = gpu
                            .resources()
                            .find(|resource| resource.id() == id)
                            .map(|resource| resource.preview_view())
                        {
                            let texture_id = ui.register_preview(gpu.device(), view);
                            previews.insert(id, texture_id);
                        }
                        session.request_apply();
                    }
                    Err(error) => panels.notify(error.to_string()),
                },
                UiAction::RemoveResource { id } => {
                    if let Some(resource) = gpu.remove_resource(id) {
                        if let Some(texture_id) = previews.remove(&id) {
                            pending_free.push(texture_id);
                        }
                        drop(resource);
                        // Later slots shifted down; the shader must be
                        // rebuilt against the new declarations.
                        session.request_apply();
                    }
                }
                UiAction::OptionsChanged => {
                    options.clamp();
                    gpu.set_vsync(options.vsync);
                    window.set_fullscreen(if options.fullscreen {
                        Some(Fullscreen::Borderless(None))
                    } else {
                        None
                    });
                    session.set_auto_apply_interval(options.auto_apply_interval);
                    ui.apply_options(options);
                    if let Err(error) = options.save(options_path) {
                        tracing::warn!(error = %error, "failed to save options");
                    }
                }
                UiAction::Quit => event_loop.exit(),
            }
        }

        if session.tick(delta_time) {
            match gpu.apply_source(session.code()) {
                Ok(outcome) => session.record_success(outcome),
                Err(error) => session.record_failure(&error),
            }
        }

        let size = gpu.size();
        let render_result = gpu.render_frame(uniforms, |device, queue, encoder, view| {
            ui.paint(
                device,
                queue,
                encoder,
                view,
                [size.width, size.height],
                prepared,
            );
        });

        match render_result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                gpu.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("surface out of memory; exiting");
                event_loop.exit();
            }
            Err(other) => {
                tracing::warn!(error = ?other, "skipping frame after surface error");
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(init) = self.init.take() else {
            return;
        };
        match self.initialise(event_loop, init) {
            Ok(state) => self.state = Some(state),
            Err(error) => {
                tracing::error!(error = %error, "initialisation failed");
                self.error = Some(error);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if window_id != state.window.id() {
            return;
        }

        let consumed = state.ui.on_event(&state.window, &event);
        let ui_hidden = !state.panels.ui_visible();

        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                state.gpu.resize(new_size);
            }
            WindowEvent::CursorMoved { position, .. } => {
                state.input.position = (position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput {
                state: button_state,
                button,
                ..
            } if !consumed => {
                let down = button_state == ElementState::Pressed;
                match button {
                    MouseButton::Left => state.input.left = down,
                    MouseButton::Right => state.input.right = down,
                    _ => {}
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Space),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } if ui_hidden => {
                state.panels.reveal_ui();
            }
            WindowEvent::RedrawRequested => {
                self.frame(event_loop);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }
}

/// Latest cursor and button state, sampled into the uniform block once per
/// frame.
#[derive(Debug, Default)]
struct InputTracker {
    position: (f32, f32),
    left: bool,
    right: bool,
}

impl InputTracker {
    fn frame_input(&self, invert_mouse_y: bool) -> FrameInput {
        FrameInput {
            mouse_position: self.position,
            left_down: self.left,
            right_down: self.right,
            invert_mouse_y,
        }
    }
}

/// FPS readout refreshed a few times a second so the label stays legible.
struct FpsCounter {
    elapsed: f32,
    text: String,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            elapsed: FPS_UPDATE_INTERVAL,
            text: String::new(),
        }
    }

    fn tick(&mut self, delta_time: f32) {
        self.elapsed += delta_time;
        if self.elapsed >= FPS_UPDATE_INTERVAL && delta_time > 0.0 {
            self.elapsed = 0.0;
            self.text = format!("{} fps", (1.0 / delta_time).round() as i32);
            tracing::trace!(fps = %self.text, "frame rate");
        }
    }

    fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_counter_updates_on_interval() {
        let mut fps = FpsCounter::new();
        fps.tick(1.0 / 60.0);
        assert_eq!(fps.text(), "60 fps");
        // Within the refresh interval the label is stable.
        fps.tick(1.0 / 30.0);
        assert_eq!(fps.text(), "60 fps");
    }

    #[test]
    fn input_tracker_builds_frame_input() {
        let tracker = InputTracker {
            position: (12.0, 34.0),
            left: true,
            right: false,
        };
        let input = tracker.frame_input(true);
        assert_eq!(input.mouse_position, (12.0, 34.0));
        assert!(input.left_down);
        assert!(!input.right_down);
        assert!(input.invert_mouse_y);
    }
}
