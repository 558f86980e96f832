use std::collections::{HashMap, HashSet};
use std::ops::Range;

use anyhow::{Context, Result};

use crate::coords::Vec2;
use crate::paint::BlendFunc;
use crate::render::{RenderCtx, RenderTarget};
use crate::scene::{DebugCmd, DrawCmd, DrawList, MeshCmd, SkeletonVertex};
use crate::skeleton::TextureId;

use super::common::{
    blend_state, mesh_vertex_layout, viewport_ubo_min_binding_size, DynamicBuffer, LineVertex,
    ViewportUniform,
};

/// Renders skeleton meshes and debug geometry from a [`DrawList`].
///
/// Everything is drawn in one render pass in paint order, so mesh ranges,
/// overlay output and debug lines interleave exactly as recorded. Mesh
/// pipelines are cached per target format and blend function.
///
/// Debug lines are always 1px wide; the requested width is not honoured.
#[derive(Default)]
pub struct SkeletonRenderer {
    shared: Option<Shared>,
    pipelines: Option<Pipelines>,
    textures: HashMap<TextureId, RegisteredTexture>,

    vertex_buffer: Option<DynamicBuffer>,
    index_buffer: Option<DynamicBuffer>,
    line_buffer: Option<DynamicBuffer>,

    frame: FrameData,
    warned_textures: HashSet<TextureId>,
}

struct Shared {
    mesh_shader: wgpu::ShaderModule,
    line_shader: wgpu::ShaderModule,
    texture_bgl: wgpu::BindGroupLayout,
    mesh_layout: wgpu::PipelineLayout,
    line_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,
    viewport_ubo: wgpu::Buffer,
    viewport_bind_group: wgpu::BindGroup,
}

struct Pipelines {
    format: wgpu::TextureFormat,
    meshes: HashMap<BlendFunc, wgpu::RenderPipeline>,
    lines: wgpu::RenderPipeline,
}

struct RegisteredTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Mesh {
        texture: TextureId,
        blend: BlendFunc,
        indices: Range<u32>,
        base_vertex: i32,
    },
    Lines {
        vertices: Range<u32>,
    },
}

/// CPU-side geometry for one frame, in logical pixels.
#[derive(Debug, Default)]
struct FrameData {
    vertices: Vec<SkeletonVertex>,
    indices: Vec<u16>,
    lines: Vec<LineVertex>,
    ops: Vec<Op>,
}

impl FrameData {
    fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.lines.clear();
        self.ops.clear();
    }

    fn push_mesh(&mut self, mesh: &MeshCmd) {
        if mesh.indices.is_empty() {
            return;
        }
        let base_vertex = self.vertices.len() as i32;
        let first = self.indices.len() as u32;

        self.vertices.extend(mesh.vertices.iter().map(|v| {
            let p = mesh.transform.apply(Vec2::new(v.position[0], v.position[1]));
            SkeletonVertex {
                position: [p.x, p.y],
                ..*v
            }
        }));
        self.indices.extend_from_slice(&mesh.indices);

        self.ops.push(Op::Mesh {
            texture: mesh.texture,
            blend: mesh.blend,
            indices: first..self.indices.len() as u32,
            base_vertex,
        });
    }

    fn push_debug(&mut self, debug: &DebugCmd) {
        let first = self.lines.len() as u32;
        let t = &debug.transform;

        for line in &debug.lines {
            let color = line.color.to_f32_array();
            for p in [t.apply(line.from), t.apply(line.to)] {
                self.lines.push(LineVertex { position: [p.x, p.y], color });
            }
        }
        // Points become small crosses sized in logical pixels.
        for point in &debug.points {
            let color = point.color.to_f32_array();
            let c = t.apply(point.at);
            let h = point.size * 0.5;
            for (from, to) in [
                (Vec2::new(c.x - h, c.y), Vec2::new(c.x + h, c.y)),
                (Vec2::new(c.x, c.y - h), Vec2::new(c.x, c.y + h)),
            ] {
                self.lines.push(LineVertex { position: [from.x, from.y], color });
                self.lines.push(LineVertex { position: [to.x, to.y], color });
            }
        }

        let end = self.lines.len() as u32;
        if end > first {
            self.ops.push(Op::Lines { vertices: first..end });
        }
    }
}

impl SkeletonRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads an RGBA8 image (premultiplied or straight, matching the
    /// entities that sample it) under `id`, replacing any previous texture.
    pub fn register_texture(
        &mut self,
        ctx: &RenderCtx<'_>,
        id: TextureId,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<()> {
        anyhow::ensure!(width > 0 && height > 0, "texture {id:?} has zero size");
        let expected = width as usize * height as usize * 4;
        anyhow::ensure!(
            rgba.len() == expected,
            "texture {id:?}: expected {expected} bytes of RGBA8, got {}",
            rgba.len()
        );

        self.ensure_shared(ctx);
        let shared = self
            .shared
            .as_ref()
            .context("skeleton renderer resources unavailable")?;

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("marrow skeleton texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("marrow skeleton texture bind group"),
            layout: &shared.texture_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&shared.sampler),
                },
            ],
        });

        let replaced = self
            .textures
            .insert(id, RegisteredTexture { _texture: texture, bind_group })
            .is_some();
        self.warned_textures.remove(&id);
        log::debug!(
            "renderer: {} texture {id:?} ({width}x{height})",
            if replaced { "replaced" } else { "registered" }
        );
        Ok(())
    }

    pub fn unregister_texture(&mut self, id: TextureId) -> bool {
        self.textures.remove(&id).is_some()
    }

    pub fn has_texture(&self, id: TextureId) -> bool {
        self.textures.contains_key(&id)
    }

    /// Renders every mesh and debug command of `draw_list` into `target`.
    ///
    /// Meshes referencing unregistered textures are skipped (one warning per id).
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        draw_list: &mut DrawList,
    ) {
        self.ensure_shared(ctx);
        self.ensure_pipelines(ctx);

        self.frame.clear();
        for item in draw_list.iter_in_paint_order() {
            match &item.cmd {
                DrawCmd::Mesh(mesh) => {
                    if !self.textures.contains_key(&mesh.texture) {
                        if self.warned_textures.insert(mesh.texture) {
                            log::warn!("renderer: texture {:?} not registered; mesh skipped", mesh.texture);
                        }
                        continue;
                    }
                    self.frame.push_mesh(mesh);
                }
                DrawCmd::Debug(debug) => self.frame.push_debug(debug),
            }
        }

        if self.frame.ops.is_empty() && target.clear.is_none() {
            return;
        }

        let blends: HashSet<BlendFunc> = self
            .frame
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Mesh { blend, .. } => Some(*blend),
                Op::Lines { .. } => None,
            })
            .collect();
        for blend in blends {
            self.ensure_mesh_pipeline(ctx, blend);
        }

        self.upload(ctx);

        // Mutating methods must happen before borrowing pipelines/buffers immutably.
        let Some(shared) = self.shared.as_ref() else { return };
        let Some(pipelines) = self.pipelines.as_ref() else { return };
        let vertex_buffer = self.vertex_buffer.as_ref().and_then(DynamicBuffer::buffer);
        let index_buffer = self.index_buffer.as_ref().and_then(DynamicBuffer::buffer);
        let line_buffer = self.line_buffer.as_ref().and_then(DynamicBuffer::buffer);

        let load = target.load_op();
        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("marrow skeleton pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
        rpass.set_bind_group(0, &shared.viewport_bind_group, &[]);

        for op in &self.frame.ops {
            match op {
                Op::Mesh { texture, blend, indices, base_vertex } => {
                    let (Some(pipeline), Some(tex), Some(vb), Some(ib)) = (
                        pipelines.meshes.get(blend),
                        self.textures.get(texture),
                        vertex_buffer,
                        index_buffer,
                    ) else {
                        continue;
                    };
                    rpass.set_pipeline(pipeline);
                    rpass.set_bind_group(1, &tex.bind_group, &[]);
                    rpass.set_vertex_buffer(0, vb.slice(..));
                    rpass.set_index_buffer(ib.slice(..), wgpu::IndexFormat::Uint16);
                    rpass.draw_indexed(indices.clone(), *base_vertex, 0..1);
                }
                Op::Lines { vertices } => {
                    let Some(lb) = line_buffer else { continue };
                    rpass.set_pipeline(&pipelines.lines);
                    rpass.set_vertex_buffer(0, lb.slice(..));
                    rpass.draw(vertices.clone(), 0..1);
                }
            }
        }
    }

    fn upload(&mut self, ctx: &RenderCtx<'_>) {
        if let Some(shared) = self.shared.as_ref() {
            let u = ViewportUniform::new(ctx.viewport);
            ctx.queue.write_buffer(&shared.viewport_ubo, 0, bytemuck::bytes_of(&u));
        }

        let frame = &self.frame;
        if !frame.vertices.is_empty() {
            self.vertex_buffer
                .get_or_insert_with(|| {
                    DynamicBuffer::new("marrow skeleton vbo", wgpu::BufferUsages::VERTEX)
                })
                .write(ctx.device, ctx.queue, bytemuck::cast_slice(&frame.vertices));
            self.index_buffer
                .get_or_insert_with(|| {
                    DynamicBuffer::new("marrow skeleton ibo", wgpu::BufferUsages::INDEX)
                })
                .write(ctx.device, ctx.queue, bytemuck::cast_slice(&frame.indices));
        }
        if !frame.lines.is_empty() {
            self.line_buffer
                .get_or_insert_with(|| {
                    DynamicBuffer::new("marrow debug line vbo", wgpu::BufferUsages::VERTEX)
                })
                .write(ctx.device, ctx.queue, bytemuck::cast_slice(&frame.lines));
        }
    }

    fn ensure_shared(&mut self, ctx: &RenderCtx<'_>) {
        if self.shared.is_some() {
            return;
        }
        let device = ctx.device;

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("marrow skeleton shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/skeleton.wgsl").into()),
        });
        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("marrow debug shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/debug.wgsl").into()),
        });

        let viewport_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("marrow viewport bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(viewport_ubo_min_binding_size()),
                },
                count: None,
            }],
        });

        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("marrow texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("marrow skeleton pipeline layout"),
            bind_group_layouts: &[&viewport_bgl, &texture_bgl],
            immediate_size: 0,
        });
        let line_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("marrow debug pipeline layout"),
            bind_group_layouts: &[&viewport_bgl],
            immediate_size: 0,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("marrow skeleton sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let viewport_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("marrow viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let viewport_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("marrow viewport bind group"),
            layout: &viewport_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        log::debug!("renderer: shared skeleton resources created");
        self.shared = Some(Shared {
            mesh_shader,
            line_shader,
            texture_bgl,
            mesh_layout,
            line_layout,
            sampler,
            viewport_ubo,
            viewport_bind_group,
        });
    }

    /// (Re)creates the line pipeline and drops cached mesh pipelines when the
    /// target format changes.
    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipelines.as_ref().is_some_and(|p| p.format == ctx.surface_format) {
            return;
        }
        let Some(shared) = self.shared.as_ref() else { return };

        let lines = create_pipeline(
            ctx.device,
            "marrow debug pipeline",
            &shared.line_layout,
            &shared.line_shader,
            LineVertex::layout(),
            ctx.surface_format,
            wgpu::BlendState::ALPHA_BLENDING,
            wgpu::PrimitiveTopology::LineList,
        );
        log::debug!("renderer: pipelines reset for {:?}", ctx.surface_format);

        self.pipelines = Some(Pipelines {
            format: ctx.surface_format,
            meshes: HashMap::new(),
            lines,
        });
    }

    fn ensure_mesh_pipeline(&mut self, ctx: &RenderCtx<'_>, blend: BlendFunc) {
        let (Some(shared), Some(pipelines)) = (self.shared.as_ref(), self.pipelines.as_mut()) else {
            return;
        };
        if pipelines.meshes.contains_key(&blend) {
            return;
        }

        let pipeline = create_pipeline(
            ctx.device,
            "marrow skeleton pipeline",
            &shared.mesh_layout,
            &shared.mesh_shader,
            mesh_vertex_layout(),
            pipelines.format,
            blend_state(blend),
            wgpu::PrimitiveTopology::TriangleList,
        );
        log::debug!("renderer: mesh pipeline for {blend:?}");
        pipelines.meshes.insert(blend, pipeline);
    }
}

#[allow(clippy::too_many_arguments)]
fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    vertex_layout: wgpu::VertexBufferLayout<'static>,
    format: wgpu::TextureFormat,
    blend: wgpu::BlendState,
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),

        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[vertex_layout],
        },

        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}
