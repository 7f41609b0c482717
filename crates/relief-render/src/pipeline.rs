//! GPU side of an effect: shader module, uniform block and one render
//! pipeline per pass of the active technique.
//!
//! Everything here is created once at load and reused every frame.

use std::num::NonZeroU64;

use relief_terrain::TerrainVertex;

use crate::buffer::{BufferAllocator, MeshBuffer, VertexLayout};
use crate::depth::DepthBuffer;
use crate::effect::{Effect, TechniqueHandle};

/// Compiled passes of one technique sharing a single uniform bind group at
/// `@group(0) @binding(0)`.
pub struct EffectPipelines {
    pub passes: Vec<wgpu::RenderPipeline>,
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

impl EffectPipelines {
    /// Build pipelines for `technique`. Back-face culling is disabled so
    /// terrain stays visible from below.
    pub fn new(
        device: &wgpu::Device,
        effect: &Effect,
        technique: TechniqueHandle,
        surface_format: wgpu::TextureFormat,
        polygon_mode: wgpu::PolygonMode,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(effect.name()),
            source: wgpu::ShaderSource::Wgsl(effect.source().into()),
        });

        let uniform_size = u64::from(effect.uniform_size());
        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("effect-bind-group-layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(uniform_size),
                    },
                    count: None,
                }],
            });

        let uniform_buffer =
            BufferAllocator::new(device).create_uniform_buffer("effect-uniforms", uniform_size);
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("effect-bind-group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("effect-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let passes = effect
            .passes(technique)
            .iter()
            .map(|pass| {
                log::debug!(
                    "Building pipeline for {}/{} ({}, {})",
                    effect.name(),
                    pass.name,
                    pass.vertex_entry,
                    pass.fragment_entry
                );
                device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(pass.name.as_str()),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some(pass.vertex_entry.as_str()),
                        buffers: &[TerrainVertex::layout()],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    primitive: primitive_state(polygon_mode),
                    depth_stencil: Some(DepthBuffer::stencil_state()),
                    multisample: wgpu::MultisampleState {
                        count: 1,
                        mask: !0,
                        alpha_to_coverage_enabled: false,
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some(pass.fragment_entry.as_str()),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: surface_format,
                            blend: None,
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    }),
                    multiview_mask: None,
                    cache: None,
                })
            })
            .collect();

        Self {
            passes,
            uniform_buffer,
            bind_group_layout,
            bind_group,
        }
    }

    /// Upload the staged uniform block.
    pub fn write_uniforms(&self, queue: &wgpu::Queue, bytes: &[u8]) {
        queue.write_buffer(&self.uniform_buffer, 0, bytes);
    }

    /// Apply each pass in order and draw the whole mesh with it.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, mesh: &MeshBuffer) {
        for pipeline in &self.passes {
            render_pass.set_pipeline(pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            mesh.bind(render_pass);
            mesh.draw(render_pass);
        }
    }
}

fn primitive_state(polygon_mode: wgpu::PolygonMode) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        unclipped_depth: false,
        polygon_mode,
        conservative: false,
    }
}
