use crate::constants::CLEAR_COLOR;
use crate::dom;
use glam::Vec3;
use wavebars_core::{
    quad_index_count, BackendError, GraphicsBackend, ProgramHandle, QuadVertex, ShaderBackend,
    ShapeFamily, ViewportSize, MAX_BAR_COUNT, QUAD_INDICES, QUAD_VERTICES, UNIFORM_ASPECT,
    UNIFORM_COLOR, UNIFORM_WIDTH,
};
use web_sys as web;
use wgpu::util::DeviceExt;

// ===================== WebGPU state =====================

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct ShapeUniforms {
    color: [f32; 4],
    width: f32,
    aspect: f32,
    _pad: [f32; 2],
}

impl Default for ShapeUniforms {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0, 1.0],
            width: 0.0,
            aspect: 1.0,
            _pad: [0.0; 2],
        }
    }
}

const QUAD_ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
const STATIC_ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32];
const DYNAMIC_ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32];

// Entry points every program source must provide
const VS_ENTRY: &str = "vs_main";
const FS_ENTRY: &str = "fs_main";

struct Program {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    uniforms: ShapeUniforms,
}

/// Per-family instance streams, sized for the largest possible layout so a
/// resize never reallocates.
struct InstanceStreams {
    static_attr: wgpu::Buffer,
    dynamic_attr: wgpu::Buffer,
}

impl InstanceStreams {
    fn new(device: &wgpu::Device, family: ShapeFamily) -> Self {
        let size = (MAX_BAR_COUNT as usize * std::mem::size_of::<f32>()) as u64;
        let make = |kind: &str| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("{}_{}_instances", family.name(), kind)),
                size,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        Self {
            static_attr: make("static"),
            dynamic_attr: make("dynamic"),
        }
    }
}

#[derive(Clone, Copy)]
struct QueuedDraw {
    program: ProgramHandle,
    family: ShapeFamily,
    instances: u32,
}

pub struct GpuState {
    canvas: web::HtmlCanvasElement,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    quad_vertices: wgpu::Buffer,
    quad_indices: wgpu::Buffer,
    bars: InstanceStreams,
    circles: InstanceStreams,
    programs: Vec<Program>,
    // Draws recorded since the last clear(), submitted in order by present()
    queued: Vec<QueuedDraw>,
    clear_color: wgpu::Color,
}

impl GpuState {
    pub async fn new(canvas: &web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No WebGPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    // Use default limits on web to avoid passing unknown fields to older WebGPU impls
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;
        device.on_uncaptured_error(Box::new(|e| {
            log::error!("[gpu] uncaptured error: {}", e);
        }));

        let caps = surface.get_capabilities(&adapter);
        // Non-sRGB target: picked colors are already sRGB-encoded
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = if caps
            .alpha_modes
            .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shape_bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shape_pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let quad_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vertices"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_indices"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let bars = InstanceStreams::new(&device, ShapeFamily::Bar);
        let circles = InstanceStreams::new(&device, ShapeFamily::Circle);

        log::info!("[gpu] surface {}x{} {:?}", width, height, format);

        Ok(Self {
            canvas: canvas.clone(),
            surface,
            device,
            queue,
            config,
            bind_group_layout,
            pipeline_layout,
            quad_vertices,
            quad_indices,
            bars,
            circles,
            programs: Vec::new(),
            queued: Vec::new(),
            clear_color: wgpu::Color {
                r: CLEAR_COLOR[0],
                g: CLEAR_COLOR[1],
                b: CLEAR_COLOR[2],
                a: CLEAR_COLOR[3],
            },
        })
    }

    fn streams(&self, family: ShapeFamily) -> &InstanceStreams {
        match family {
            ShapeFamily::Bar => &self.bars,
            ShapeFamily::Circle => &self.circles,
        }
    }

    fn program_mut(&mut self, handle: ProgramHandle) -> Result<&mut Program, BackendError> {
        self.programs
            .get_mut(handle.0 as usize)
            .ok_or_else(|| BackendError::new(format!("unknown program {}", handle.0)))
    }

    fn write_uniforms(&mut self, handle: ProgramHandle) -> Result<(), BackendError> {
        let program = self
            .programs
            .get(handle.0 as usize)
            .ok_or_else(|| BackendError::new(format!("unknown program {}", handle.0)))?;
        self.queue.write_buffer(
            &program.uniform_buffer,
            0,
            bytemuck::bytes_of(&program.uniforms),
        );
        Ok(())
    }

    fn write_instances(
        &mut self,
        buffer: fn(&InstanceStreams) -> &wgpu::Buffer,
        family: ShapeFamily,
        data: &[f32],
    ) -> Result<(), BackendError> {
        if data.len() > MAX_BAR_COUNT as usize {
            return Err(BackendError::new(format!(
                "{} instances exceed the {} instance buffer",
                data.len(),
                MAX_BAR_COUNT
            )));
        }
        if data.is_empty() {
            return Ok(());
        }
        let target = buffer(self.streams(family));
        self.queue
            .write_buffer(target, 0, bytemuck::cast_slice(data));
        Ok(())
    }
}

impl ShaderBackend for GpuState {
    fn compile(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, BackendError> {
        if !vertex_source.contains(VS_ENTRY) || !fragment_source.contains(FS_ENTRY) {
            return Err(BackendError::new(format!(
                "shader sources must define {} and {}",
                VS_ENTRY, FS_ENTRY
            )));
        }
        let handle = ProgramHandle(self.programs.len() as u32);
        let vs = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("shape_vs"),
                source: wgpu::ShaderSource::Wgsl(vertex_source.into()),
            });
        let fs = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("shape_fs"),
                source: wgpu::ShaderSource::Wgsl(fragment_source.into()),
            });
        let buffers = [
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<QuadVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &QUAD_ATTRIBS,
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<f32>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &STATIC_ATTRIBS,
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<f32>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &DYNAMIC_ATTRIBS,
            },
        ];
        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("shape_pipeline"),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vs,
                    entry_point: Some(VS_ENTRY),
                    buffers: &buffers,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                primitive: wgpu::PrimitiveState {
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &fs,
                    entry_point: Some(FS_ENTRY),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.config.format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                cache: None,
                multiview: None,
            });
        let uniforms = ShapeUniforms::default();
        let uniform_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("shape_uniforms"),
                contents: bytemuck::bytes_of(&uniforms),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shape_bg"),
            layout: &self.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        self.programs.push(Program {
            pipeline,
            uniform_buffer,
            bind_group,
            uniforms,
        });
        log::info!("[gpu] compiled program {}", handle.0);
        Ok(handle)
    }

    fn set_uniform_float(
        &mut self,
        program: ProgramHandle,
        name: &str,
        value: f32,
    ) -> Result<(), BackendError> {
        let p = self.program_mut(program)?;
        match name {
            UNIFORM_WIDTH => p.uniforms.width = value,
            UNIFORM_ASPECT => p.uniforms.aspect = value,
            _ => return Err(BackendError::new(format!("no float uniform '{}'", name))),
        }
        self.write_uniforms(program)
    }

    fn set_uniform_vec3(
        &mut self,
        program: ProgramHandle,
        name: &str,
        value: Vec3,
    ) -> Result<(), BackendError> {
        let p = self.program_mut(program)?;
        match name {
            UNIFORM_COLOR => p.uniforms.color = value.extend(1.0).to_array(),
            _ => return Err(BackendError::new(format!("no vec3 uniform '{}'", name))),
        }
        self.write_uniforms(program)
    }
}

impl GraphicsBackend for GpuState {
    fn resize(&mut self, viewport: ViewportSize) -> Result<(), BackendError> {
        dom::sync_canvas_backing_size(&self.canvas, viewport);
        let width = viewport.width.max(1);
        let height = viewport.height.max(1);
        if width != self.config.width || height != self.config.height {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
        Ok(())
    }

    fn write_static_attribute(
        &mut self,
        family: ShapeFamily,
        data: &[f32],
    ) -> Result<(), BackendError> {
        self.write_instances(|s| &s.static_attr, family, data)
    }

    fn write_dynamic_attribute(
        &mut self,
        family: ShapeFamily,
        data: &[f32],
    ) -> Result<(), BackendError> {
        self.write_instances(|s| &s.dynamic_attr, family, data)
    }

    fn clear(&mut self) -> Result<(), BackendError> {
        self.queued.clear();
        Ok(())
    }

    fn draw_instanced(
        &mut self,
        program: ProgramHandle,
        family: ShapeFamily,
        instance_count: u32,
    ) -> Result<(), BackendError> {
        if program.0 as usize >= self.programs.len() {
            return Err(BackendError::new(format!("unknown program {}", program.0)));
        }
        self.queued.push(QueuedDraw {
            program,
            family,
            instances: instance_count.min(MAX_BAR_COUNT),
        });
        Ok(())
    }

    fn present(&mut self) -> Result<(), BackendError> {
        let frame = self
            .surface
            .get_current_texture()
            .map_err(|e| BackendError::new(format!("surface: {}", e)))?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shapes_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_vertex_buffer(0, self.quad_vertices.slice(..));
            rpass.set_index_buffer(self.quad_indices.slice(..), wgpu::IndexFormat::Uint32);
            for draw in &self.queued {
                let Some(program) = self.programs.get(draw.program.0 as usize) else {
                    continue;
                };
                let streams = self.streams(draw.family);
                rpass.set_pipeline(&program.pipeline);
                rpass.set_bind_group(0, &program.bind_group, &[]);
                rpass.set_vertex_buffer(1, streams.static_attr.slice(..));
                rpass.set_vertex_buffer(2, streams.dynamic_attr.slice(..));
                rpass.draw_indexed(0..quad_index_count(), 0, 0..draw.instances);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        self.queued.clear();
        Ok(())
    }
}
