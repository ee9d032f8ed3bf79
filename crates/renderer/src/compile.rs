use std::borrow::Cow;

use naga::front::glsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};

use crate::assemble::Assembly;

/// One compiler message, mapped back into the user's coordinate space.
///
/// `user_line` is 1-based and `None` when the message points inside the
/// generated header rather than at user code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub user_line: Option<u32>,
    pub message: String,
}

/// The backend rejected the assembled source. Never fatal: the previous
/// pipeline keeps rendering while this is shown to the user.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{raw}")]
pub struct CompileError {
    pub diagnostics: Vec<Diagnostic>,
    pub raw: String,
}

/// Parses and validates an assembled fragment shader without touching the
/// GPU. Only source that passes here is ever handed to the device, so a
/// failed edit cannot disturb the live pipeline.
pub fn validate_fragment(assembly: &Assembly) -> Result<(), CompileError> {
    let options = glsl::Options::from(naga::ShaderStage::Fragment);
    let module = glsl::Frontend::default()
        .parse(&options, &assembly.source)
        .map_err(|errors| parse_error(&errors, assembly))?;

    Validator::new(ValidationFlags::all(), Capabilities::empty())
        .validate(&module)
        .map_err(|error| validation_error(&error, assembly))?;

    Ok(())
}

/// Compiles a validated fragment source into a shader module.
pub(crate) fn create_fragment_module(device: &wgpu::Device, source: &str) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fraglab fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(source),
            stage: naga::ShaderStage::Fragment,
            defines: naga::FastHashMap::default(),
        },
    })
}

/// Compiles the static full-screen triangle vertex shader, built once at
/// startup and reused by every rebuilt pipeline.
pub(crate) fn create_vertex_module(device: &wgpu::Device) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fullscreen triangle vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: naga::ShaderStage::Vertex,
            defines: naga::FastHashMap::default(),
        },
    })
}

/// Maps a 1-based line in the assembled source to a 1-based user line.
pub fn user_line(reported: u32, user_line_offset: u32) -> Option<u32> {
    reported
        .checked_sub(user_line_offset)
        .filter(|line| *line > 0)
}

fn parse_error(errors: &glsl::ParseErrors, assembly: &Assembly) -> CompileError {
    let mut diagnostics = Vec::with_capacity(errors.errors.len());
    for error in &errors.errors {
        let line = if error.meta.is_defined() {
            Some(error.meta.location(&assembly.source).line_number)
        } else {
            None
        };
        diagnostics.push(Diagnostic {
            user_line: line.and_then(|reported| user_line(reported, assembly.user_line_offset)),
            message: error.kind.to_string(),
        });
    }
    CompileError {
        raw: render_raw(&diagnostics),
        diagnostics,
    }
}

fn validation_error(
    error: &naga::WithSpan<naga::valid::ValidationError>,
    assembly: &Assembly,
) -> CompileError {
    let line = error
        .spans()
        .next()
        .filter(|(span, _)| span.is_defined())
        .map(|(span, _)| span.location(&assembly.source).line_number);
    let diagnostics = vec![Diagnostic {
        user_line: line.and_then(|reported| user_line(reported, assembly.user_line_offset)),
        message: error_chain(error.as_inner()),
    }];
    CompileError {
        raw: render_raw(&diagnostics),
        diagnostics,
    }
}

/// Flattens a nested error into one readable line. The editor shows these
/// messages directly, so no compiler-internal prefixes are included.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

fn render_raw(diagnostics: &[Diagnostic]) -> String {
    let mut raw = String::new();
    for diagnostic in diagnostics {
        if !raw.is_empty() {
            raw.push('\n');
        }
        match diagnostic.user_line {
            Some(line) => raw.push_str(&format!("{}: {}", line, diagnostic.message)),
            None => raw.push_str(&diagnostic.message),
        }
    }
    raw
}

const VERTEX_SHADER_GLSL: &str = "#version 450

void main() {
    vec2 positions[3] = vec2[3](
        vec2(-1.0, -3.0),
        vec2(3.0, 1.0),
        vec2(-1.0, 1.0)
    );
    gl_Position = vec4(positions[gl_VertexIndex], 0.0, 1.0);
}
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::assemble;

    #[test]
    fn valid_shader_passes_validation() {
        let assembly = assemble(
            "void main() {\n    float x = gl_FragCoord.x / resolution.x;\n    out_Color = vec4(0.0, x, time * 0.0, 1.0);\n}\n",
            0,
            true,
        );
        assert!(validate_fragment(&assembly).is_ok());
    }

    #[test]
    fn texture_sampling_helper_validates() {
        let assembly = assemble(
            "void main() {\n    vec2 uv = gl_FragCoord.xy / resolution;\n    out_Color = sample2D(InputTex0, uv) + sample2D(InputTex1, uv);\n}\n",
            2,
            false,
        );
        assert!(validate_fragment(&assembly).is_ok());
    }

    #[test]
    fn unknown_identifier_maps_to_user_line() {
        let assembly = assemble(
            "void main() {\n    out_Color = vec4(bogus_symbol, 0.0, 0.0, 1.0);\n}\n",
            0,
            false,
        );
        let error = validate_fragment(&assembly).expect_err("shader must not validate");
        assert!(!error.diagnostics.is_empty());
        assert!(error
            .diagnostics
            .iter()
            .any(|diagnostic| diagnostic.user_line == Some(2)));
    }

    #[test]
    fn missing_main_is_reported() {
        let assembly = assemble("float nothing() { return 0.0; }\n", 0, false);
        assert!(validate_fragment(&assembly).is_err());
    }

    #[test]
    fn reported_lines_shift_with_header_size() {
        // A diagnostic at header + 5 must surface as user line 5.
        assert_eq!(user_line(25, 20), Some(5));
        assert_eq!(user_line(5, 20), None);
        assert_eq!(user_line(20, 20), None);
        assert_eq!(user_line(21, 20), Some(1));
    }

    #[test]
    fn vertex_shader_parses() {
        let options = glsl::Options::from(naga::ShaderStage::Vertex);
        let module = glsl::Frontend::default()
            .parse(&options, VERTEX_SHADER_GLSL)
            .expect("vertex shader must parse");
        assert!(Validator::new(ValidationFlags::all(), Capabilities::empty())
            .validate(&module)
            .is_ok());
    }
}
