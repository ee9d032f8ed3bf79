//! The shader document as it lives on disk: an optional JSON metadata
//! preamble wrapped in a block comment, a blank-line separator, then the
//! raw fragment source. Also hosts the Shadertoy-dialect importer and the
//! starter shader shown on first launch.

mod format;
mod metadata;
mod shadertoy;

pub use format::{DocumentError, ShaderDocument};
pub use metadata::ShaderMetadata;
pub use shadertoy::convert_shadertoy;

/// Starter shader loaded into the editor on launch. The comment block
/// doubles as the quick reference for the available inputs.
pub const DEFAULT_FRAGMENT: &str = "\
// Available inputs
// mouse (vec4) : x,y => position, z => left button down, w => right button down
// resolution (vec2) : pixel size of the render window
// time (float) : total seconds since start
// deltaTime (float) : seconds since last frame
// frame (int) : current frame number
// use sample2D(InputTexN, uv) to sample a bound input texture

void main()
{
    float x = gl_FragCoord.x / resolution.x;
    float y = gl_FragCoord.y / resolution.y;
    out_Color = vec4(0, x, y, 1);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_shader_parses_as_plain_document() {
        let document = ShaderDocument::parse(DEFAULT_FRAGMENT);
        assert!(document.metadata.is_empty());
        assert_eq!(document.fragment_code, DEFAULT_FRAGMENT);
    }
}
