use crate::compile::{CompileError, Diagnostic};
use crate::pipeline::RecompileOutcome;
use crate::uniforms::AutoApplyTimer;

/// Whether the most recent apply attempt produced a working pipeline.
///
/// `Faulted` never stops drawing: the last good program keeps rendering
/// while the diagnostics point at the broken edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyPhase {
    Ready,
    Faulted,
}

/// The apply state machine driven by the frame loop.
///
/// Owns the editable user source, the pending/auto-apply triggers and the
/// diagnostics produced by the last failed attempt. The GPU side reports
/// outcomes back through `record_*`; everything here is plain state so the
/// whole edit → fail → fix cycle is testable without a device.
pub struct EditSession {
    code: String,
    phase: ApplyPhase,
    diagnostics: Vec<Diagnostic>,
    last_good_code: Option<String>,
    last_error: Option<String>,
    pending_apply: bool,
    auto_apply: AutoApplyTimer,
}

impl EditSession {
    pub fn new(initial_code: impl Into<String>, auto_apply_interval: f32) -> Self {
        Self {
            code: initial_code.into(),
            phase: ApplyPhase::Ready,
            diagnostics: Vec::new(),
            last_good_code: None,
            last_error: None,
            // An explicit apply runs immediately on the first frame.
            pending_apply: true,
            auto_apply: AutoApplyTimer::new(auto_apply_interval, true),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Mutable access for the editor widget's text buffer.
    pub fn code_mut(&mut self) -> &mut String {
        &mut self.code
    }

    pub fn set_code(&mut self, code: impl Into<String>) {
        self.code = code.into();
    }

    pub fn phase(&self) -> ApplyPhase {
        self.phase
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// User code of the last successful apply; what the stale pipeline is
    /// still rendering while the session is faulted.
    pub fn last_good_code(&self) -> Option<&str> {
        self.last_good_code.as_deref()
    }

    pub fn auto_apply_enabled(&self) -> bool {
        self.auto_apply.enabled()
    }

    pub fn set_auto_apply(&mut self, enabled: bool) {
        self.auto_apply.set_enabled(enabled);
    }

    pub fn set_auto_apply_interval(&mut self, interval: f32) {
        self.auto_apply.set_interval(interval);
    }

    /// Queues an explicit apply for the next frame tick.
    pub fn request_apply(&mut self) {
        self.pending_apply = true;
    }

    /// Advances the timers; returns true when the frame should invoke the
    /// recompiler with the current code.
    pub fn tick(&mut self, delta_time: f32) -> bool {
        let auto = self.auto_apply.tick(delta_time);
        let due = self.pending_apply || auto;
        self.pending_apply = false;
        due
    }

    pub fn record_success(&mut self, outcome: RecompileOutcome) {
        if outcome == RecompileOutcome::Rebuilt {
            tracing::debug!("apply succeeded, pipeline rebuilt");
        }
        self.phase = ApplyPhase::Ready;
        self.diagnostics.clear();
        self.last_error = None;
        self.last_good_code = Some(self.code.clone());
    }

    pub fn record_failure(&mut self, error: &CompileError) {
        self.phase = ApplyPhase::Faulted;
        // Unchanged errors keep the existing list; an auto-apply every
        // second would otherwise rebuild identical diagnostics forever.
        if self.last_error.as_deref() == Some(error.raw.as_str()) {
            return;
        }
        tracing::debug!(error = %error.raw, "apply failed, keeping previous pipeline");
        self.diagnostics = error.diagnostics.clone();
        self.last_error = Some(error.raw.clone());
    }

    /// True when a line of the user's code carries a diagnostic.
    pub fn line_has_error(&self, line: u32) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.user_line == Some(line))
    }
}
