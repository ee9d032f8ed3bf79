use crate::registry::binding_slot;

/// A fully assembled fragment shader ready for compilation.
///
/// `user_line_offset` is the number of generated lines preceding the user
/// code, so a compiler diagnostic at line `user_line_offset + n` points at
/// line `n` of what the user actually typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub source: String,
    pub user_line_offset: u32,
}

/// Builds the complete fragment shader from the user's code.
///
/// Concatenates the fixed header, one texture declaration per bound
/// resource (slot order must match the registry), the optional
/// `gl_FragCoord` flip for backends whose fragment origin differs from the
/// reference convention, and finally the user code verbatim. Identical
/// inputs always produce byte-identical output; the recompiler's no-op
/// short-circuit depends on that.
pub fn assemble(user_code: &str, resource_count: usize, flip_frag_coord: bool) -> Assembly {
    let mut source = String::with_capacity(HEADER.len() + user_code.len() + 256);
    source.push_str(HEADER);
    for index in 0..resource_count {
        source.push_str(&format!(
            "layout(set = 0, binding = {}) uniform texture2D InputTex{};\n",
            binding_slot(index),
            index
        ));
    }
    if flip_frag_coord {
        source.push_str(FRAG_COORD_FLIP);
    }

    let user_line_offset = source.lines().count() as u32;
    source.push_str(user_code);

    Assembly {
        source,
        user_line_offset,
    }
}

/// GLSL prologue injected ahead of every user fragment shader.
///
/// The uniform block layout must match `RuntimeUniforms` in `uniforms.rs`.
/// Block members are prefixed and re-exposed through macros so the friendly
/// names cannot clash with the block instance (same trick the generated
/// ShaderToy prelude uses for its `iTime` family).
const HEADER: &str = "#version 450

layout(set = 0, binding = 0) uniform RuntimeData {
    vec4 _mouse;
    vec2 _resolution;
    float _time;
    float _deltaTime;
    int _frame;
} _ubo;

#define mouse _ubo._mouse
#define resolution _ubo._resolution
#define time _ubo._time
#define deltaTime _ubo._deltaTime
#define frame _ubo._frame

layout(set = 0, binding = 1) uniform sampler Sampler;

layout(location = 0) out vec4 out_Color;

#define sample2D(tex, uv) texture(sampler2D(tex, Sampler), uv)
";

/// Remaps `gl_FragCoord` to a bottom-left origin. Applied on every backend
/// except OpenGL, which already uses the reference convention.
const FRAG_COORD_FLIP: &str =
    "#define gl_FragCoord vec4(gl_FragCoord.x, resolution.y - gl_FragCoord.y, gl_FragCoord.zw)\n";

#[cfg(test)]
mod tests {
    use super::*;

    const USER: &str = "void main() {\n    out_Color = vec4(1.0);\n}\n";

    #[test]
    fn assembly_is_deterministic() {
        let a = assemble(USER, 3, true);
        let b = assemble(USER, 3, true);
        assert_eq!(a, b);
        assert_eq!(a.source, b.source);
    }

    #[test]
    fn declares_one_texture_per_resource_in_slot_order() {
        let assembly = assemble(USER, 3, false);
        assert!(assembly
            .source
            .contains("layout(set = 0, binding = 2) uniform texture2D InputTex0;"));
        assert!(assembly
            .source
            .contains("layout(set = 0, binding = 3) uniform texture2D InputTex1;"));
        assert!(assembly
            .source
            .contains("layout(set = 0, binding = 4) uniform texture2D InputTex2;"));
        assert!(!assembly.source.contains("InputTex3"));
    }

    #[test]
    fn no_texture_declarations_without_resources() {
        let assembly = assemble(USER, 0, false);
        assert!(!assembly.source.contains("InputTex"));
    }

    #[test]
    fn flip_macro_only_on_request() {
        let flipped = assemble(USER, 0, true);
        let unflipped = assemble(USER, 0, false);
        assert!(flipped.source.contains("resolution.y - gl_FragCoord.y"));
        assert!(!unflipped.source.contains("resolution.y - gl_FragCoord.y"));
    }

    #[test]
    fn user_code_is_appended_verbatim() {
        let assembly = assemble(USER, 2, true);
        assert!(assembly.source.ends_with(USER));
    }

    #[test]
    fn user_line_offset_counts_generated_lines() {
        let assembly = assemble(USER, 2, true);
        let header_lines = assembly.source.lines().count() - USER.lines().count();
        assert_eq!(assembly.user_line_offset, header_lines as u32);

        // One extra line per resource, one for the flip macro.
        let bare = assemble(USER, 0, false);
        assert_eq!(assembly.user_line_offset, bare.user_line_offset + 3);
    }

    #[test]
    fn resource_removal_renumbers_slots() {
        // Registry [A, B, C] loses its middle entry: the remaining two
        // resources must occupy slots 2 and 3 with contiguous names.
        let after = assemble(USER, 2, false);
        assert!(after
            .source
            .contains("layout(set = 0, binding = 2) uniform texture2D InputTex0;"));
        assert!(after
            .source
            .contains("layout(set = 0, binding = 3) uniform texture2D InputTex1;"));
        assert!(!after.source.contains("InputTex2"));
    }
}
