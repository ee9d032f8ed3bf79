use std::path::PathBuf;

use renderer::ApplyPhase;

use super::{UiAction, UiModel};

const NOTICE_DURATION: f32 = 5.0;
const HIDE_HINT_DURATION: f32 = 5.0;
const THUMBNAIL_SIZE: f32 = 64.0;

/// State of every overlay window. Panels own presentation state only;
/// anything that affects the core goes out as a `UiAction`.
pub struct Panels {
    show_ui: bool,
    hide_hint_elapsed: f32,
    show_resources: bool,
    show_metadata: bool,
    show_options: bool,
    prompt: Option<FilePrompt>,
    notice: Option<Notice>,
}

struct Notice {
    text: String,
    age: f32,
}

struct FilePrompt {
    kind: PromptKind,
    path: String,
}

#[derive(Clone, Copy)]
enum PromptKind {
    LoadShader { shadertoy: bool },
    SaveShader,
    AddResource,
}

impl FilePrompt {
    fn title(&self) -> &'static str {
        match self.kind {
            PromptKind::LoadShader { shadertoy: false } => "Load shader",
            PromptKind::LoadShader { shadertoy: true } => "Import Shadertoy shader",
            PromptKind::SaveShader => "Save shader as",
            PromptKind::AddResource => "Add input texture",
        }
    }

    fn confirm_label(&self) -> &'static str {
        match self.kind {
            PromptKind::LoadShader { .. } => "Load",
            PromptKind::SaveShader => "Save",
            PromptKind::AddResource => "Add",
        }
    }

    fn action(&self) -> UiAction {
        let path = PathBuf::from(self.path.trim());
        match self.kind {
            PromptKind::LoadShader { shadertoy } => UiAction::LoadShader { path, shadertoy },
            PromptKind::SaveShader => UiAction::SaveShader { path },
            PromptKind::AddResource => UiAction::AddResource { path },
        }
    }
}

impl Panels {
    pub fn new() -> Self {
        Self {
            show_ui: true,
            hide_hint_elapsed: 0.0,
            show_resources: true,
            show_metadata: false,
            show_options: false,
            prompt: None,
            notice: None,
        }
    }

    pub fn ui_visible(&self) -> bool {
        self.show_ui
    }

    /// Restores the overlay after a hide (bound to space in the app).
    pub fn reveal_ui(&mut self) {
        self.show_ui = true;
    }

    /// Queues a transient notice (resource load failures and the like).
    pub fn notify(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            age: 0.0,
        });
    }

    pub fn draw(
        &mut self,
        ctx: &egui::Context,
        model: &mut UiModel<'_>,
        delta_time: f32,
    ) -> Vec<UiAction> {
        let mut actions = Vec::new();

        if let Some(mut notice) = self.notice.take() {
            notice.age += delta_time;
            if notice.age < NOTICE_DURATION {
                self.notice = Some(notice);
            }
        }

        if !self.show_ui {
            self.hide_hint_elapsed += delta_time;
            if self.hide_hint_elapsed < HIDE_HINT_DURATION {
                egui::Area::new(egui::Id::new("hide hint"))
                    .anchor(egui::Align2::CENTER_TOP, [0.0, 12.0])
                    .show(ctx, |ui| {
                        ui.label("Press space to show the UI");
                    });
            }
            return actions;
        }

        self.menu_bar(ctx, model, &mut actions);
        editor_window(ctx, model);
        self.resources_window(ctx, model, &mut actions);
        self.metadata_window(ctx, model);
        self.options_window(ctx, model, &mut actions);
        prompt_window(ctx, &mut self.prompt, &mut actions);
        self.notice_area(ctx);

        actions
    }

    fn menu_bar(
        &mut self,
        ctx: &egui::Context,
        model: &mut UiModel<'_>,
        actions: &mut Vec<UiAction>,
    ) {
        egui::TopBottomPanel::top("menu bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Load...").clicked() {
                        self.prompt = Some(FilePrompt {
                            kind: PromptKind::LoadShader { shadertoy: false },
                            path: String::new(),
                        });
                        ui.close_menu();
                    }
                    if ui.button("Import Shadertoy...").clicked() {
                        self.prompt = Some(FilePrompt {
                            kind: PromptKind::LoadShader { shadertoy: true },
                            path: String::new(),
                        });
                        ui.close_menu();
                    }
                    let save = egui::Button::new("Save");
                    if ui
                        .add_enabled(model.current_file.is_some(), save)
                        .clicked()
                    {
                        if let Some(path) = model.current_file {
                            actions.push(UiAction::SaveShader {
                                path: path.to_path_buf(),
                            });
                        }
                        ui.close_menu();
                    }
                    if ui.button("Save as...").clicked() {
                        let suggested = model
                            .current_file
                            .map(|path| path.display().to_string())
                            .unwrap_or_default();
                        self.prompt = Some(FilePrompt {
                            kind: PromptKind::SaveShader,
                            path: suggested,
                        });
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Options").clicked() {
                        self.show_options = true;
                        ui.close_menu();
                    }
                    if ui.button("Quit").clicked() {
                        actions.push(UiAction::Quit);
                    }
                });

                if ui.button("Apply").clicked() {
                    actions.push(UiAction::Apply);
                }
                let mut auto_apply = model.session.auto_apply_enabled();
                if ui.checkbox(&mut auto_apply, "Auto apply").changed() {
                    actions.push(UiAction::SetAutoApply(auto_apply));
                }
                if ui.button("Resources").clicked() {
                    self.show_resources = true;
                }
                if ui.button("Metadata").clicked() {
                    self.show_metadata = true;
                }
                if ui.button("Hide UI").clicked() {
                    self.show_ui = false;
                    self.hide_hint_elapsed = 0.0;
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(model.fps);
                    ui.separator();
                    ui.label(model.backend_label);
                });
            });
        });
    }

    fn resources_window(
        &mut self,
        ctx: &egui::Context,
        model: &mut UiModel<'_>,
        actions: &mut Vec<UiAction>,
    ) {
        let prompt = &mut self.prompt;
        egui::Window::new("Resources")
            .open(&mut self.show_resources)
            .default_width(300.0)
            .show(ctx, |ui| {
                if ui.button("Add resource...").clicked() {
                    *prompt = Some(FilePrompt {
                        kind: PromptKind::AddResource,
                        path: String::new(),
                    });
                }
                ui.separator();
                if model.resources.is_empty() {
                    ui.weak("No input textures bound.");
                    return;
                }
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for resource in model.resources {
                        ui.horizontal(|ui| {
                            ui.image((
                                resource.preview,
                                egui::vec2(THUMBNAIL_SIZE, THUMBNAIL_SIZE),
                            ));
                            ui.vertical(|ui| {
                                ui.monospace(resource.slot_label());
                                ui.label(&resource.name);
                                ui.weak(format!("{}x{}", resource.width, resource.height));
                                if ui.button("Remove").clicked() {
                                    actions.push(UiAction::RemoveResource { id: resource.id });
                                }
                            });
                        });
                        ui.separator();
                    }
                });
            });
    }

    fn metadata_window(&mut self, ctx: &egui::Context, model: &mut UiModel<'_>) {
        egui::Window::new("Metadata")
            .open(&mut self.show_metadata)
            .default_width(300.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Name");
                    ui.text_edit_singleline(&mut model.metadata.name);
                });
                ui.horizontal(|ui| {
                    ui.label("Credit");
                    ui.text_edit_singleline(&mut model.metadata.credit);
                });
                ui.horizontal(|ui| {
                    ui.label("Version");
                    ui.text_edit_singleline(&mut model.metadata.version);
                });
                ui.label("Description");
                ui.text_edit_multiline(&mut model.metadata.description);
            });
    }

    fn options_window(
        &mut self,
        ctx: &egui::Context,
        model: &mut UiModel<'_>,
        actions: &mut Vec<UiAction>,
    ) {
        egui::Window::new("Options")
            .open(&mut self.show_options)
            .resizable(false)
            .show(ctx, |ui| {
                let mut changed = false;
                changed |= ui
                    .checkbox(&mut model.options.fullscreen, "Fullscreen")
                    .changed();
                changed |= ui.checkbox(&mut model.options.vsync, "VSync").changed();
                changed |= ui
                    .checkbox(&mut model.options.invert_mouse_y, "Invert mouse Y")
                    .changed();
                ui.label("UI scale");
                changed |= ui
                    .add(egui::Slider::new(&mut model.options.ui_scale, 1.0..=4.0))
                    .changed();
                ui.label("UI opacity");
                changed |= ui
                    .add(egui::Slider::new(&mut model.options.ui_opacity, 0.2..=1.0))
                    .changed();
                ui.label("Auto apply interval");
                changed |= ui
                    .add(
                        egui::Slider::new(&mut model.options.auto_apply_interval, 0.05..=10.0)
                            .suffix(" s"),
                    )
                    .changed();
                if changed {
                    actions.push(UiAction::OptionsChanged);
                }
            });
    }

    fn notice_area(&self, ctx: &egui::Context) {
        let Some(notice) = &self.notice else { return };
        egui::Area::new(egui::Id::new("notice"))
            .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -12.0])
            .show(ctx, |ui| {
                ui.colored_label(egui::Color32::LIGHT_RED, &notice.text);
            });
    }
}

impl Default for Panels {
    fn default() -> Self {
        Self::new()
    }
}

fn editor_window(ctx: &egui::Context, model: &mut UiModel<'_>) {
    egui::Window::new("Shader Editor")
        .default_size([560.0, 480.0])
        .show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .max_height((ui.available_height() - 80.0).max(120.0))
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(model.session.code_mut())
                            .code_editor()
                            .desired_width(f32::INFINITY)
                            .desired_rows(24),
                    );
                });

            ui.separator();
            match model.session.phase() {
                ApplyPhase::Ready => {
                    ui.weak("Shader compiled successfully.");
                }
                ApplyPhase::Faulted => {
                    ui.colored_label(
                        egui::Color32::LIGHT_RED,
                        "Compile failed; still rendering the last working shader.",
                    );
                    for diagnostic in model.session.diagnostics() {
                        let text = match diagnostic.user_line {
                            Some(line) => format!("line {line}: {}", diagnostic.message),
                            None => diagnostic.message.clone(),
                        };
                        ui.colored_label(egui::Color32::RED, text);
                    }
                }
            }
        });
}

fn prompt_window(
    ctx: &egui::Context,
    prompt_slot: &mut Option<FilePrompt>,
    actions: &mut Vec<UiAction>,
) {
    let Some(prompt) = prompt_slot.as_mut() else {
        return;
    };
    let mut close = false;
    egui::Window::new(prompt.title())
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label("Path:");
            let response = ui.add(egui::TextEdit::singleline(&mut prompt.path).desired_width(320.0));
            let submitted =
                response.lost_focus() && ui.input(|input| input.key_pressed(egui::Key::Enter));
            ui.horizontal(|ui| {
                let confirmed = ui.button(prompt.confirm_label()).clicked() || submitted;
                if confirmed && !prompt.path.trim().is_empty() {
                    actions.push(prompt.action());
                    close = true;
                }
                if ui.button("Cancel").clicked() {
                    close = true;
                }
            });
        });
    if close {
        *prompt_slot = None;
    }
}
