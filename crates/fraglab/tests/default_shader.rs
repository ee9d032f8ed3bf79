//! The shaders the application ships or generates must always compile.

use renderer::{assemble, validate_fragment};
use shaderfile::{convert_shadertoy, DEFAULT_FRAGMENT};

#[test]
fn default_shader_validates_on_flipped_backends() {
    let assembly = assemble(DEFAULT_FRAGMENT, 0, true);
    validate_fragment(&assembly).expect("default shader must compile");
}

#[test]
fn default_shader_validates_without_flip() {
    let assembly = assemble(DEFAULT_FRAGMENT, 0, false);
    validate_fragment(&assembly).expect("default shader must compile");
}

#[test]
fn default_shader_validates_with_bound_resources() {
    let assembly = assemble(DEFAULT_FRAGMENT, 3, true);
    validate_fragment(&assembly).expect("extra texture declarations must not break the shader");
}

#[test]
fn converted_shadertoy_shader_validates() {
    let shadertoy = "void mainImage(out vec4 fragColor, in vec2 fragCoord)\n{\n    vec2 uv = fragCoord / iResolution.xy;\n    fragColor = vec4(uv, 0.5 + 0.5 * sin(iTime), 1.0);\n}\n";
    let converted = convert_shadertoy(shadertoy);
    let assembly = assemble(&converted, 0, true);
    validate_fragment(&assembly).expect("converted Shadertoy shader must compile");
}
