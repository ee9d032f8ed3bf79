//! egui overlay: integration plumbing in `layer`, the actual windows in
//! `panels`. Panels never touch GPU or session state directly; they emit
//! `UiAction`s that the frame loop executes through the core's operations.

mod layer;
mod panels;

use std::path::{Path, PathBuf};

use appconfig::AppOptions;
use renderer::{EditSession, ResourceId};
use shaderfile::ShaderMetadata;

pub use layer::{PreparedUi, UiLayer};
pub use panels::Panels;

/// Requests produced by the overlay for the frame loop to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    Apply,
    SetAutoApply(bool),
    LoadShader { path: PathBuf, shadertoy: bool },
    SaveShader { path: PathBuf },
    AddResource { path: PathBuf },
    RemoveResource { id: ResourceId },
    OptionsChanged,
    Quit,
}

/// One registry entry as the resources window sees it.
#[derive(Debug, Clone)]
pub struct ResourceView {
    pub id: ResourceId,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub slot: usize,
    pub preview: egui::TextureId,
}

impl ResourceView {
    /// The identifier user code samples this resource with.
    pub fn slot_label(&self) -> String {
        format!("InputTex{}", self.slot)
    }
}

/// Everything the panels read or edit during one frame.
pub struct UiModel<'a> {
    pub session: &'a mut EditSession,
    pub metadata: &'a mut ShaderMetadata,
    pub options: &'a mut AppOptions,
    pub resources: &'a [ResourceView],
    pub current_file: Option<&'a Path>,
    pub fps: &'a str,
    pub backend_label: &'a str,
}
