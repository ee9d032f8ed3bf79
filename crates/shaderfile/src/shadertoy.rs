/// Rewrites a Shadertoy-dialect shader into this tool's dialect.
///
/// Shadertoy code provides `mainImage(out vec4 fragColor, in vec2
/// fragCoord)` and the `iTime` uniform family; here the entry point is a
/// plain `main()` writing `out_Color`, with `gl_FragCoord` and the
/// `RuntimeData` names. Best effort, textual: shaders using multi-pass
/// features or `iChannel` inputs will still need manual edits.
pub fn convert_shadertoy(source: &str) -> String {
    rewrite_main_image(source)
        .replace("iResolution", "resolution")
        .replace("iMouse", "mouse")
        .replace("iTimeDelta", "deltaTime")
        .replace("iTime", "time")
        .replace("fragColor", "out_Color")
        .replace("fragCoord.x", "gl_FragCoord.x")
        .replace("fragCoord.y", "gl_FragCoord.y")
        .replace("fragCoord", "gl_FragCoord.xy")
}

/// Replaces the `mainImage(...)` definition signature with `main()`,
/// tolerating arbitrary whitespace and an omitted `in` qualifier. Call
/// sites with other argument lists are left alone.
fn rewrite_main_image(source: &str) -> String {
    let mut result = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(position) = rest.find("mainImage") {
        let (before, found) = rest.split_at(position);
        result.push_str(before);
        let after_name = &found["mainImage".len()..];
        let trimmed = after_name.trim_start();
        if let Some(args) = trimmed.strip_prefix('(') {
            if let Some(close) = args.find(')') {
                if is_main_image_signature(&args[..close]) {
                    result.push_str("main()");
                    rest = &args[close + 1..];
                    continue;
                }
            }
        }
        result.push_str("mainImage");
        rest = after_name;
    }
    result.push_str(rest);
    result
}

fn is_main_image_signature(args: &str) -> bool {
    let tokens: Vec<&str> = args
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .collect();
    matches!(
        tokens.as_slice(),
        ["out", "vec4", "fragColor", "in", "vec2", "fragCoord"]
            | ["out", "vec4", "fragColor", "vec2", "fragCoord"]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_typical_shader() {
        let source = "void mainImage(out vec4 fragColor, in vec2 fragCoord)\n{\n    vec2 uv = fragCoord / iResolution.xy;\n    fragColor = vec4(uv, sin(iTime), 1.0);\n}\n";
        let converted = convert_shadertoy(source);
        assert!(converted.contains("void main()"));
        assert!(converted.contains("gl_FragCoord.xy / resolution.xy"));
        assert!(converted.contains("out_Color = vec4(uv, sin(time), 1.0);"));
        assert!(!converted.contains("mainImage"));
        assert!(!converted.contains("fragCoord"));
    }

    #[test]
    fn signature_matching_tolerates_spacing_and_missing_in() {
        let spaced = "void mainImage ( out vec4 fragColor , in vec2 fragCoord ) {}";
        assert!(convert_shadertoy(spaced).contains("void main() {}"));

        let no_in = "void mainImage(out vec4 fragColor, vec2 fragCoord) {}";
        assert!(convert_shadertoy(no_in).contains("void main() {}"));
    }

    #[test]
    fn member_accesses_keep_their_component() {
        let source = "float x = fragCoord.x; float y = fragCoord.y; vec2 c = fragCoord;";
        let converted = convert_shadertoy(source);
        assert_eq!(
            converted,
            "float x = gl_FragCoord.x; float y = gl_FragCoord.y; vec2 c = gl_FragCoord.xy;"
        );
    }

    #[test]
    fn delta_time_converts_before_time() {
        let converted = convert_shadertoy("float a = iTimeDelta + iTime;");
        assert_eq!(converted, "float a = deltaTime + time;");
    }

    #[test]
    fn unrelated_calls_are_untouched() {
        let source = "mainImage(color, coord);";
        assert_eq!(convert_shadertoy(source), source);
    }
}
