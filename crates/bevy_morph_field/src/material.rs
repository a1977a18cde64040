use bevy::{
    asset::embedded_asset,
    mesh::{MeshVertexAttribute, MeshVertexBufferLayoutRef},
    pbr::{Material, MaterialPipeline, MaterialPipelineKey, MaterialPlugin},
    prelude::*,
    render::render_resource::{
        AsBindGroup, RenderPipelineDescriptor, ShaderType, SpecializedMeshPipelineError,
        VertexFormat,
    },
    shader::ShaderRef,
};
use serde::{Deserialize, Serialize};

const SHADER_PATH: &str = "embedded://bevy_morph_field/shaders/morph_field.wgsl";

/// Assembled (tree) endpoint of each particle. `Mesh::ATTRIBUTE_POSITION`
/// carries the scattered endpoint.
pub const ATTRIBUTE_ASSEMBLED_POSITION: MeshVertexAttribute =
    MeshVertexAttribute::new("Vertex_AssembledPosition", 988_540_917, VertexFormat::Float32x3);

/// Per-particle randoms: `(random, phase, twinkle_speed, 0)`.
pub const ATTRIBUTE_PARTICLE: MeshVertexAttribute =
    MeshVertexAttribute::new("Vertex_Particle", 988_540_918, VertexFormat::Float32x4);

/// Plugin that registers [`MorphFieldMaterial`] and its embedded shader.
pub struct MorphFieldPlugin;

impl Plugin for MorphFieldPlugin {
    fn build(&self, app: &mut App) {
        embedded_asset!(app, "shaders/morph_field.wgsl");
        app.add_plugins(MaterialPlugin::<MorphFieldMaterial>::default());
    }
}

/// Which per-particle program the shader runs.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum FieldStyle {
    /// Dense specks with wind sway, scatter float and a gold accent.
    #[default]
    Foliage,
    /// Sparse lights that blink independently.
    Twinkle,
}

impl FieldStyle {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Foliage => "Foliage",
            Self::Twinkle => "Twinkle",
        }
    }

    fn code(self) -> u32 {
        match self {
            Self::Foliage => 0,
            Self::Twinkle => 1,
        }
    }
}

/// Uniform data sent to the GPU for a particle field.
#[derive(Clone, Copy, ShaderType, Debug)]
pub struct MorphFieldUniform {
    /// Base particle color
    pub color: LinearRgba,
    /// Color for particles whose random value reaches `accent_threshold`
    pub accent_color: LinearRgba,
    /// Seconds since scene start
    pub time: f32,
    /// Morph progress, 0 = scattered, 1 = assembled
    pub progress: f32,
    /// World-space size of one particle size unit (pixel-ratio aware)
    pub size_scale: f32,
    pub accent_threshold: f32,
    pub style: u32,
}

/// Material for a morphing particle field.
///
/// The host only updates `time`, `progress` and `size_scale` each frame;
/// interpolation, secondary motion and blinking happen per particle on the GPU.
#[derive(Asset, AsBindGroup, TypePath, Debug, Clone)]
pub struct MorphFieldMaterial {
    #[uniform(0)]
    pub uniform: MorphFieldUniform,
}

impl Default for MorphFieldMaterial {
    fn default() -> Self {
        Self {
            uniform: MorphFieldUniform {
                color: LinearRgba::WHITE,
                accent_color: LinearRgba::WHITE,
                time: 0.0,
                progress: 0.0,
                size_scale: Self::DEFAULT_SIZE_SCALE,
                accent_threshold: Self::DEFAULT_ACCENT_THRESHOLD,
                style: FieldStyle::Foliage.code(),
            },
        }
    }
}

impl MorphFieldMaterial {
    /// World-space particle size at a pixel ratio of 1.
    pub const DEFAULT_SIZE_SCALE: f32 = 0.011;
    pub const DEFAULT_ACCENT_THRESHOLD: f32 = 0.92;

    pub fn new(style: FieldStyle) -> Self {
        Self::default().with_style(style)
    }

    /// Foliage field with the given base and accent colors.
    pub fn foliage(color: impl Into<LinearRgba>, accent: impl Into<LinearRgba>) -> Self {
        Self::new(FieldStyle::Foliage)
            .with_color(color)
            .with_accent_color(accent)
    }

    /// Twinkle field; `color` may exceed 1.0 to feed bloom.
    pub fn twinkle(color: impl Into<LinearRgba>) -> Self {
        Self::new(FieldStyle::Twinkle).with_color(color)
    }

    pub fn with_style(mut self, style: FieldStyle) -> Self {
        self.uniform.style = style.code();
        self
    }

    pub fn with_color(mut self, color: impl Into<LinearRgba>) -> Self {
        self.uniform.color = color.into();
        self
    }

    pub fn with_accent_color(mut self, color: impl Into<LinearRgba>) -> Self {
        self.uniform.accent_color = color.into();
        self
    }

    /// Particles with `random >= threshold` use the accent color.
    pub fn with_accent_threshold(mut self, threshold: f32) -> Self {
        self.uniform.accent_threshold = threshold;
        self
    }

    pub fn with_size_scale(mut self, size_scale: f32) -> Self {
        self.uniform.size_scale = size_scale;
        self
    }

    pub fn style(&self) -> FieldStyle {
        if self.uniform.style == FieldStyle::Twinkle.code() {
            FieldStyle::Twinkle
        } else {
            FieldStyle::Foliage
        }
    }

    /// Write the per-frame parameters. Nothing else changes after creation.
    pub fn set_frame(&mut self, time: f32, progress: f32, size_scale: f32) {
        self.uniform.time = time;
        self.uniform.progress = progress.clamp(0.0, 1.0);
        self.uniform.size_scale = size_scale;
    }
}

impl Material for MorphFieldMaterial {
    fn vertex_shader() -> ShaderRef {
        SHADER_PATH.into()
    }

    fn fragment_shader() -> ShaderRef {
        SHADER_PATH.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        AlphaMode::Add
    }

    fn enable_prepass() -> bool {
        false
    }

    fn enable_shadows() -> bool {
        false
    }

    fn specialize(
        _pipeline: &MaterialPipeline,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            ATTRIBUTE_ASSEMBLED_POSITION.at_shader_location(1),
            ATTRIBUTE_PARTICLE.at_shader_location(2),
            Mesh::ATTRIBUTE_UV_0.at_shader_location(3),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];
        // Camera-facing quads; winding depends on view.
        descriptor.primitive.cull_mode = None;
        if let Some(depth) = descriptor.depth_stencil.as_mut() {
            depth.depth_write_enabled = false;
        }
        Ok(())
    }
}
