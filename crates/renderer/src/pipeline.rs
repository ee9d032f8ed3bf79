use crate::assemble::Assembly;
use crate::compile::{create_fragment_module, create_vertex_module, validate_fragment, CompileError};
use crate::registry::{binding_slot, ResourceRegistry, SAMPLER_BINDING, UNIFORM_BINDING};

/// Result of a recompile request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecompileOutcome {
    /// Source and resource set were identical to the live program; no GPU
    /// work was performed.
    Unchanged,
    /// A new program was built and swapped in.
    Rebuilt,
}

/// Everything a draw call needs, built from one successful compile.
///
/// All fields reflect the same compile: the struct is only ever replaced
/// wholesale, after every new handle exists, so the render loop can never
/// observe a partially updated program. Dropping the previous value
/// releases its GPU handles exactly once.
pub struct ShaderProgram {
    _fragment: wgpu::ShaderModule,
    pipeline: wgpu::RenderPipeline,
    _layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    source: String,
    registry_generation: u64,
}

impl ShaderProgram {
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Turns assembled shader source into a usable graphics pipeline, exactly
/// once per request, with all-or-nothing semantics: on any failure the
/// previous program stays live and untouched.
pub struct Recompiler {
    vertex: wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    current: Option<ShaderProgram>,
}

impl Recompiler {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        Self {
            vertex: create_vertex_module(device),
            surface_format,
            current: None,
        }
    }

    /// True once a program has compiled successfully at least once.
    pub fn is_ready(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&ShaderProgram> {
        self.current.as_ref()
    }

    /// Full source text of the last successful compile, if any.
    pub fn last_source(&self) -> Option<&str> {
        self.current.as_ref().map(|program| program.source())
    }

    /// Compile → bind → build → swap. See module tests for the
    /// short-circuit decision; the swap itself is the final statement so
    /// an error on any earlier step leaves `current` untouched.
    pub fn recompile(
        &mut self,
        device: &wgpu::Device,
        assembly: &Assembly,
        registry: &ResourceRegistry,
        uniform_buffer: &wgpu::Buffer,
        sampler: &wgpu::Sampler,
    ) -> Result<RecompileOutcome, CompileError> {
        let live = self
            .current
            .as_ref()
            .map(|program| (program.source.as_str(), program.registry_generation));
        if is_unchanged(live, (&assembly.source, registry.generation())) {
            return Ok(RecompileOutcome::Unchanged);
        }

        validate_fragment(assembly)?;
        let fragment = create_fragment_module(device, &assembly.source);

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shader bind group layout"),
            entries: &build_layout_entries(registry.len()),
        });

        let mut entries = Vec::with_capacity(registry.len() + 2);
        entries.push(wgpu::BindGroupEntry {
            binding: UNIFORM_BINDING,
            resource: uniform_buffer.as_entire_binding(),
        });
        entries.push(wgpu::BindGroupEntry {
            binding: SAMPLER_BINDING,
            resource: wgpu::BindingResource::Sampler(sampler),
        });
        for (index, resource) in registry.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: binding_slot(index),
                resource: wgpu::BindingResource::TextureView(resource.view()),
            });
        }
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shader bind group"),
            layout: &layout,
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shader pipeline layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("fullscreen shader pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.vertex,
                entry_point: Some("main"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &fragment,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview: None,
            cache: None,
        });

        tracing::info!(
            resources = registry.len(),
            generation = registry.generation(),
            "swapped shader pipeline"
        );

        self.current = Some(ShaderProgram {
            _fragment: fragment,
            pipeline,
            _layout: layout,
            bind_group,
            source: assembly.source.clone(),
            registry_generation: registry.generation(),
        });

        Ok(RecompileOutcome::Rebuilt)
    }
}

/// Layout slots are positional: binding 0 is the uniform block, binding 1
/// the sampler, bindings 2..N+2 one texture per registry entry in order.
/// This must structurally match the declarations the assembler emitted;
/// both are generated from the same registry snapshot.
fn build_layout_entries(resource_count: usize) -> Vec<wgpu::BindGroupLayoutEntry> {
    let mut entries = Vec::with_capacity(resource_count + 2);
    entries.push(wgpu::BindGroupLayoutEntry {
        binding: UNIFORM_BINDING,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    });
    entries.push(wgpu::BindGroupLayoutEntry {
        binding: SAMPLER_BINDING,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    });
    for index in 0..resource_count {
        entries.push(wgpu::BindGroupLayoutEntry {
            binding: binding_slot(index),
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        });
    }
    entries
}

/// The no-op short-circuit decision: skip all GPU work when the assembled
/// source is byte-identical to the live program's AND the registry has not
/// mutated since that program was built.
fn is_unchanged(live: Option<(&str, u64)>, requested: (&str, u64)) -> bool {
    match live {
        Some((source, generation)) => source == requested.0 && generation == requested.1,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_compile_is_never_unchanged() {
        assert!(!is_unchanged(None, ("source", 0)));
    }

    #[test]
    fn identical_source_and_generation_short_circuits() {
        assert!(is_unchanged(Some(("source", 3)), ("source", 3)));
    }

    #[test]
    fn edited_source_forces_rebuild() {
        assert!(!is_unchanged(Some(("source", 3)), ("edited", 3)));
    }

    #[test]
    fn registry_mutation_forces_rebuild_even_with_identical_text() {
        // Remove-then-add can leave the declaration text identical while
        // the bound views differ; the generation counter catches it.
        assert!(!is_unchanged(Some(("source", 3)), ("source", 4)));
    }

    #[test]
    fn layout_entries_are_positional() {
        let entries = build_layout_entries(3);
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].binding, UNIFORM_BINDING);
        assert_eq!(entries[1].binding, SAMPLER_BINDING);
        assert_eq!(entries[2].binding, 2);
        assert_eq!(entries[3].binding, 3);
        assert_eq!(entries[4].binding, 4);
        assert!(matches!(
            entries[2].ty,
            wgpu::BindingType::Texture { .. }
        ));
    }

    #[test]
    fn removing_a_middle_resource_shifts_layout_slots() {
        // Registry [A, B, C] → remove B → [A, C]: slots 2 and 3 remain,
        // slot 4 disappears.
        let entries = build_layout_entries(2);
        assert_eq!(entries.last().expect("entries").binding, 3);
    }
}
