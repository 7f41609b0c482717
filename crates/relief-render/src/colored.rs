//! Built-in `Colored` effect: per-vertex color with directional N·L lighting
//! and an ambient floor.

use crate::effect::{Effect, EffectError};

/// Uniform block layout (std140-compatible, 224 bytes):
///
/// | offset | member            | WGSL type   |
/// |--------|-------------------|-------------|
/// | 0      | `xView`           | `mat4x4<f32>` |
/// | 64     | `xProjection`     | `mat4x4<f32>` |
/// | 128    | `xWorld`          | `mat4x4<f32>` |
/// | 192    | `xLightDirection` | `vec3<f32>` |
/// | 204    | `xAmbient`        | `f32`       |
/// | 208    | `xEnableLighting` | `u32`       |
pub const COLORED_MANIFEST: &str = r#"(
    name: "Colored",
    uniform_size: 224,
    parameters: [
        (name: "xView", kind: Matrix, offset: 0),
        (name: "xProjection", kind: Matrix, offset: 64),
        (name: "xWorld", kind: Matrix, offset: 128),
        (name: "xLightDirection", kind: Vector3, offset: 192),
        (name: "xAmbient", kind: Float, offset: 204),
        (name: "xEnableLighting", kind: Bool, offset: 208),
    ],
    techniques: [
        (
            name: "Colored",
            passes: [
                (name: "Pass0", vertex_entry: "vs_colored", fragment_entry: "fs_colored"),
            ],
        ),
    ],
)"#;

pub const COLORED_SHADER_SOURCE: &str = r#"
struct EffectUniforms {
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    world: mat4x4<f32>,
    light_direction: vec3<f32>,
    ambient: f32,
    enable_lighting: u32,
};

@group(0) @binding(0)
var<uniform> fx: EffectUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
    @location(1) light_factor: f32,
};

@vertex
fn vs_colored(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = fx.world * vec4<f32>(in.position, 1.0);
    out.clip_position = fx.projection * fx.view * world_position;
    out.color = in.color;

    out.light_factor = 1.0;
    if (fx.enable_lighting != 0u) {
        // Zero normals stay zero and receive only the ambient term.
        let normal = (fx.world * vec4<f32>(in.normal, 0.0)).xyz;
        let len = length(normal);
        var diffuse = 0.0;
        if (len > 0.0) {
            diffuse = max(dot(normal / len, -fx.light_direction), 0.0);
        }
        out.light_factor = diffuse + fx.ambient;
    }
    return out;
}

@fragment
fn fs_colored(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color.rgb * in.light_factor, in.color.a);
}
"#;

/// Parse the built-in effect.
pub fn colored_effect() -> Result<Effect, EffectError> {
    Effect::from_sources(COLORED_MANIFEST, COLORED_SHADER_SOURCE)
}
