//! Live shader rendering core.
//!
//! The pipeline recompiler is the heart of the crate: user fragment code
//! is wrapped by [`assemble::assemble`] into a complete GLSL unit,
//! validated CPU-side, and only then turned into a new render pipeline and
//! bind group that replace the previous ones atomically. A failed edit
//! never disturbs the pipeline that is currently drawing.
//!
//! Modules:
//!
//! - `assemble`: header + resource declarations + user code concatenation.
//! - `compile`: naga-based validation, line-mapped diagnostics, module
//!   creation.
//! - `pipeline`: the recompiler and the swapped-wholesale shader program.
//! - `registry`: ordered input textures whose position is their binding
//!   slot.
//! - `uniforms`: the 48-byte runtime uniform block, frame clock and
//!   auto-apply timer.
//! - `session`: the Ready/Faulted apply state machine the UI talks to.
//! - `gpu`: device/surface ownership and the per-frame draw.

pub mod assemble;
pub mod compile;
pub mod gpu;
pub mod pipeline;
pub mod registry;
pub mod session;
pub mod types;
pub mod uniforms;

pub use assemble::{assemble, Assembly};
pub use compile::{user_line, validate_fragment, CompileError, Diagnostic};
pub use gpu::GpuState;
pub use pipeline::{RecompileOutcome, Recompiler, ShaderProgram};
pub use registry::{
    binding_slot, InputResource, ResourceId, ResourceLoadError, ResourceRegistry,
    FIRST_TEXTURE_BINDING,
};
pub use session::{ApplyPhase, EditSession};
pub use types::{BackendChoice, RendererConfig};
pub use uniforms::{AutoApplyTimer, FrameClock, FrameInput, RuntimeUniforms};
