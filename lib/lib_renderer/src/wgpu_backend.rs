use std::borrow::Cow;

use bytemuck::{Pod, Zeroable, bytes_of, cast_slice};
use glam::{UVec2, Vec2, vec2};
use image::GrayImage;
use wgpu::{
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout, BindGroupLayoutDescriptor,
    BindGroupLayoutEntry, BindingResource, BindingType, Buffer, BufferBindingType,
    BufferDescriptor, BufferUsages, ColorTargetState, ColorWrites, CommandEncoderDescriptor,
    CompareFunction, DepthBiasState, DepthStencilState, Device, Extent3d, FragmentState,
    FrontFace, IndexFormat, LoadOp, MultisampleState, Operations, Origin3d,
    PipelineCompilationOptions, PipelineLayoutDescriptor, PolygonMode, PrimitiveState,
    PrimitiveTopology, Queue, RenderPassColorAttachment, RenderPassDepthStencilAttachment,
    RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor, ShaderModuleDescriptor,
    ShaderSource, ShaderStages, StencilState, StoreOp, TexelCopyBufferLayout,
    TexelCopyTextureInfo, TextureAspect, TextureDescriptor, TextureDimension, TextureFormat,
    TextureSampleType, TextureUsages, TextureView, TextureViewDescriptor, TextureViewDimension,
    VertexAttribute, VertexBufferLayout, VertexFormat, VertexState, VertexStepMode,
    util::{BufferInitDescriptor, DeviceExt},
};

use crate::{
    Assets, Color, CommandGroup, GpuBuffer, GpuGroup, Palette, RenderBackend, RenderError,
    Screen, SetupError, VERTICES_PER_GROUP, wgsl_layout,
};

#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub device: &'a Device,
    pub queue: &'a Queue,
    pub surface_format: TextureFormat,
}

const CANVAS_FORMAT: TextureFormat = TextureFormat::R8Uint;
const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;
const ATLAS_FORMAT: TextureFormat = TextureFormat::R8Uint;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct CanvasUniform {
    size: Vec2,
    _pad: Vec2,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct BlitUniform {
    border: Color,
    origin: Vec2,
    canvas: Vec2,
    zoom: f32,
    _pad: [f32; 3],
}

/// Generations of the buffers a draw bind group was created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bound {
    groups: u64,
    params: u64,
    mapping: u64,
}

#[derive(Debug)]
struct CanvasTarget {
    color: TextureView,
    depth: TextureView,
}

/// wgpu implementation of the canvas pass and the blit to the window.
#[derive(Debug)]
pub struct WgpuBackend {
    vertex_buf: Buffer,
    index_buf: Buffer,
    canvas_uniform_buf: Buffer,
    groups: GpuBuffer,
    params: GpuBuffer,
    mapping: GpuBuffer,
    atlas: Option<TextureView>,
    draw_bind_group_layout: BindGroupLayout,
    draw_bind_group: Option<(BindGroup, Bound)>,
    draw_pipeline: RenderPipeline,
    canvas: CanvasTarget,
    blit_uniform_buf: Buffer,
    palette_buf: Buffer,
    blit_bind_group_layout: BindGroupLayout,
    blit_bind_group: BindGroup,
    blit_pipeline: RenderPipeline,
    screen: Screen,
    border: Color,
    draws: Vec<(u32, u32)>,
}

/// The backend bound to one surface texture for the duration of a flush.
pub struct WgpuFrame<'a> {
    backend: &'a mut WgpuBackend,
    output: &'a TextureView,
    ctx: RenderContext<'a>,
    clear: Option<Option<u8>>,
}

impl WgpuBackend {
    pub fn new(screen: Screen, border: Color, ctx: RenderContext<'_>) -> Self {
        let vertex_buf = ctx.device.create_buffer_init(&BufferInitDescriptor {
            label: Some("pixlet vertex buffer"),
            contents: bytes_of(&[
                vec2(-1.0, -1.0),
                vec2(1.0, -1.0),
                vec2(1.0, 1.0),
                vec2(-1.0, 1.0),
            ]),
            usage: BufferUsages::VERTEX,
        });

        let index_buf = ctx.device.create_buffer_init(&BufferInitDescriptor {
            label: Some("pixlet index buffer"),
            contents: bytes_of::<[u16; _]>(&[0, 1, 2, 2, 3, 0]),
            usage: BufferUsages::INDEX,
        });

        let canvas_uniform_buf = ctx.device.create_buffer(&BufferDescriptor {
            label: Some("pixlet canvas uniform buffer"),
            size: size_of::<CanvasUniform>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let groups = GpuBuffer::new(
            "pixlet group buffer",
            BufferUsages::STORAGE,
            (crate::DrawQueue::INITIAL_GROUPS * size_of::<GpuGroup>()) as u64,
            ctx,
        );
        let params = GpuBuffer::new(
            "pixlet parameter buffer",
            BufferUsages::STORAGE,
            (crate::DrawQueue::INITIAL_PARAMS * size_of::<i16>()) as u64,
            ctx,
        );
        let mapping = GpuBuffer::new("pixlet mapping buffer", BufferUsages::STORAGE, 0, ctx);

        let draw_shader = ctx.device.create_shader_module(ShaderModuleDescriptor {
            label: Some("pixlet draw shader"),
            source: ShaderSource::Wgsl(Cow::Owned(format!(
                "{}\n{}",
                wgsl_layout(),
                include_str!("draw.wgsl")
            ))),
        });

        let storage_entry = |binding| BindGroupLayoutEntry {
            binding,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Storage { read_only: true },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
            visibility: ShaderStages::VERTEX,
        };

        let draw_bind_group_layout =
            ctx.device
                .create_bind_group_layout(&BindGroupLayoutDescriptor {
                    label: Some("pixlet draw bind group layout"),
                    entries: &[
                        BindGroupLayoutEntry {
                            binding: 0,
                            ty: BindingType::Buffer {
                                ty: BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: None,
                            },
                            count: None,
                            visibility: ShaderStages::VERTEX,
                        },
                        storage_entry(1),
                        storage_entry(2),
                        storage_entry(3),
                        BindGroupLayoutEntry {
                            binding: 4,
                            ty: BindingType::Texture {
                                sample_type: TextureSampleType::Uint,
                                view_dimension: TextureViewDimension::D2Array,
                                multisampled: false,
                            },
                            count: None,
                            visibility: ShaderStages::FRAGMENT,
                        },
                    ],
                });

        let draw_pipeline = ctx
            .device
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: Some("pixlet draw pipeline"),
                cache: None,
                depth_stencil: Some(DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: CompareFunction::GreaterEqual,
                    stencil: StencilState::default(),
                    bias: DepthBiasState::default(),
                }),
                layout: Some(
                    &ctx.device
                        .create_pipeline_layout(&PipelineLayoutDescriptor {
                            label: Some("pixlet draw pipeline layout"),
                            bind_group_layouts: &[&draw_bind_group_layout],
                            push_constant_ranges: &[],
                        }),
                ),
                multiview: None,
                primitive: PRIMITIVE_STATE,
                vertex: VertexState {
                    module: &draw_shader,
                    entry_point: None,
                    compilation_options: PipelineCompilationOptions::default(),
                    buffers: &[],
                },
                fragment: Some(FragmentState {
                    module: &draw_shader,
                    targets: &[Some(ColorTargetState {
                        blend: None,
                        format: CANVAS_FORMAT,
                        write_mask: ColorWrites::all(),
                    })],
                    entry_point: None,
                    compilation_options: PipelineCompilationOptions::default(),
                }),
                multisample: MultisampleState::default(),
            });

        let blit_shader = ctx.device.create_shader_module(ShaderModuleDescriptor {
            label: Some("pixlet blit shader"),
            source: ShaderSource::Wgsl(Cow::Borrowed(include_str!("blit.wgsl"))),
        });

        let blit_uniform_buf = ctx.device.create_buffer(&BufferDescriptor {
            label: Some("pixlet blit uniform buffer"),
            size: size_of::<BlitUniform>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let palette_buf = ctx.device.create_buffer(&BufferDescriptor {
            label: Some("pixlet palette buffer"),
            size: size_of::<[Color; 256]>() as u64,
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_entry = |binding| BindGroupLayoutEntry {
            binding,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
            visibility: ShaderStages::FRAGMENT,
        };

        let blit_bind_group_layout =
            ctx.device
                .create_bind_group_layout(&BindGroupLayoutDescriptor {
                    label: Some("pixlet blit bind group layout"),
                    entries: &[
                        uniform_entry(0),
                        uniform_entry(1),
                        BindGroupLayoutEntry {
                            binding: 2,
                            ty: BindingType::Texture {
                                sample_type: TextureSampleType::Uint,
                                view_dimension: TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                            visibility: ShaderStages::FRAGMENT,
                        },
                    ],
                });

        let blit_pipeline = ctx
            .device
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: Some("pixlet blit pipeline"),
                cache: None,
                depth_stencil: None,
                layout: Some(
                    &ctx.device
                        .create_pipeline_layout(&PipelineLayoutDescriptor {
                            label: Some("pixlet blit pipeline layout"),
                            bind_group_layouts: &[&blit_bind_group_layout],
                            push_constant_ranges: &[],
                        }),
                ),
                multiview: None,
                primitive: PRIMITIVE_STATE,
                vertex: VertexState {
                    module: &blit_shader,
                    entry_point: None,
                    compilation_options: PipelineCompilationOptions::default(),
                    buffers: &[VERTEX_BUFFER_LAYOUT],
                },
                fragment: Some(FragmentState {
                    module: &blit_shader,
                    targets: &[Some(ColorTargetState {
                        blend: None,
                        format: ctx.surface_format,
                        write_mask: ColorWrites::all(),
                    })],
                    entry_point: None,
                    compilation_options: PipelineCompilationOptions::default(),
                }),
                multisample: MultisampleState::default(),
            });

        let canvas = CanvasTarget::new(screen.canvas, ctx);
        let blit_bind_group = create_blit_bind_group(
            &blit_bind_group_layout,
            &blit_uniform_buf,
            &palette_buf,
            &canvas.color,
            ctx,
        );

        let result = Self {
            vertex_buf,
            index_buf,
            canvas_uniform_buf,
            groups,
            params,
            mapping,
            atlas: None,
            draw_bind_group_layout,
            draw_bind_group: None,
            draw_pipeline,
            canvas,
            blit_uniform_buf,
            palette_buf,
            blit_bind_group_layout,
            blit_bind_group,
            blit_pipeline,
            screen,
            border,
            draws: Vec::new(),
        };
        result.write_uniforms(ctx);

        result
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Packs pending pictures and uploads the atlas bins and the mapping
    /// table. Must run before the first frame that draws pictures or text.
    pub fn upload_assets(
        &mut self,
        assets: &mut Assets,
        ctx: RenderContext<'_>,
    ) -> Result<(), SetupError> {
        assets.pack()?;
        let bins = assets.paint_bins()?;

        self.atlas = Some(upload_atlas(&bins, assets.atlas().bin_size(), ctx));
        self.mapping
            .write(cast_slice(assets.pictures.mapping_table()), ctx)?;
        self.rebuild_draw_bind_group(ctx);

        log::info!(
            "uploaded {} atlas bins, {} pictures",
            bins.len(),
            assets.pictures.len()
        );

        Ok(())
    }

    /// Adapts the canvas to a new window size. The canvas texture is
    /// recreated only when its size changes.
    pub fn resize(&mut self, screen: Screen, ctx: RenderContext<'_>) {
        if screen.canvas != self.screen.canvas {
            log::debug!(
                "canvas resized to {}x{} (zoom {})",
                screen.canvas.x,
                screen.canvas.y,
                screen.zoom
            );

            self.canvas = CanvasTarget::new(screen.canvas, ctx);
            self.blit_bind_group = create_blit_bind_group(
                &self.blit_bind_group_layout,
                &self.blit_uniform_buf,
                &self.palette_buf,
                &self.canvas.color,
                ctx,
            );
        }

        self.screen = screen;
        self.write_uniforms(ctx);
    }

    pub fn frame<'a>(
        &'a mut self,
        output: &'a TextureView,
        ctx: RenderContext<'a>,
    ) -> WgpuFrame<'a> {
        WgpuFrame {
            backend: self,
            output,
            ctx,
            clear: None,
        }
    }

    fn write_uniforms(&self, ctx: RenderContext<'_>) {
        let canvas = CanvasUniform {
            size: self.screen.canvas.as_vec2(),
            _pad: Vec2::ZERO,
        };
        ctx.queue
            .write_buffer(&self.canvas_uniform_buf, 0, bytes_of(&canvas));

        let blit = BlitUniform {
            border: self.border,
            origin: self.screen.origin.as_vec2(),
            canvas: self.screen.canvas.as_vec2(),
            zoom: self.screen.zoom as f32,
            _pad: [0.0; 3],
        };
        ctx.queue
            .write_buffer(&self.blit_uniform_buf, 0, bytes_of(&blit));
    }

    fn bound(&self) -> Bound {
        Bound {
            groups: self.groups.generation(),
            params: self.params.generation(),
            mapping: self.mapping.generation(),
        }
    }

    /// Recreates the draw bind group if a buffer it refers to was
    /// reallocated since it was built.
    fn refresh_draw_bind_group(&mut self, ctx: RenderContext<'_>) {
        let built = self.draw_bind_group.as_ref().map(|(_, bound)| *bound);
        if is_stale(built, self.bound()) {
            self.rebuild_draw_bind_group(ctx);
        }
    }

    fn rebuild_draw_bind_group(&mut self, ctx: RenderContext<'_>) {
        let Some(atlas) = &self.atlas else {
            return;
        };

        let bind_group = ctx.device.create_bind_group(&BindGroupDescriptor {
            label: Some("pixlet draw bind group"),
            layout: &self.draw_bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: self.canvas_uniform_buf.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: self.groups.buffer().as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: self.params.buffer().as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 3,
                    resource: self.mapping.buffer().as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 4,
                    resource: BindingResource::TextureView(atlas),
                },
            ],
        });

        self.draw_bind_group = Some((bind_group, self.bound()));
    }
}

fn is_stale(built: Option<Bound>, current: Bound) -> bool {
    built != Some(current)
}

impl CanvasTarget {
    fn new(size: UVec2, ctx: RenderContext<'_>) -> Self {
        let extent = Extent3d {
            width: size.x.max(1),
            height: size.y.max(1),
            depth_or_array_layers: 1,
        };

        let color = ctx
            .device
            .create_texture(&TextureDescriptor {
                label: Some("pixlet canvas texture"),
                dimension: TextureDimension::D2,
                format: CANVAS_FORMAT,
                mip_level_count: 1,
                sample_count: 1,
                size: extent,
                usage: TextureUsages::RENDER_ATTACHMENT | TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            })
            .create_view(&TextureViewDescriptor::default());

        let depth = ctx
            .device
            .create_texture(&TextureDescriptor {
                label: Some("pixlet canvas depth texture"),
                dimension: TextureDimension::D2,
                format: DEPTH_FORMAT,
                mip_level_count: 1,
                sample_count: 1,
                size: extent,
                usage: TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&TextureViewDescriptor::default());

        Self { color, depth }
    }
}

fn upload_atlas(bins: &[GrayImage], bin_size: (i16, i16), ctx: RenderContext<'_>) -> TextureView {
    let (width, height) = (bin_size.0 as u32, bin_size.1 as u32);

    let texture = ctx.device.create_texture(&TextureDescriptor {
        label: Some("pixlet atlas texture"),
        size: Extent3d {
            width,
            height,
            depth_or_array_layers: bins.len().max(1) as u32,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: ATLAS_FORMAT,
        usage: TextureUsages::TEXTURE_BINDING | TextureUsages::COPY_DST,
        view_formats: &[],
    });

    for (layer, bin) in bins.iter().enumerate() {
        ctx.queue.write_texture(
            TexelCopyTextureInfo {
                texture: &texture,
                aspect: TextureAspect::All,
                mip_level: 0,
                origin: Origin3d {
                    x: 0,
                    y: 0,
                    z: layer as u32,
                },
            },
            bin.as_raw(),
            TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width),
                rows_per_image: Some(height),
            },
            Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    texture.create_view(&TextureViewDescriptor {
        label: Some("pixlet atlas view"),
        dimension: Some(TextureViewDimension::D2Array),
        ..Default::default()
    })
}

fn create_blit_bind_group(
    layout: &BindGroupLayout,
    uniform_buf: &Buffer,
    palette_buf: &Buffer,
    canvas: &TextureView,
    ctx: RenderContext<'_>,
) -> BindGroup {
    ctx.device.create_bind_group(&BindGroupDescriptor {
        label: Some("pixlet blit bind group"),
        layout,
        entries: &[
            BindGroupEntry {
                binding: 0,
                resource: uniform_buf.as_entire_binding(),
            },
            BindGroupEntry {
                binding: 1,
                resource: palette_buf.as_entire_binding(),
            },
            BindGroupEntry {
                binding: 2,
                resource: BindingResource::TextureView(canvas),
            },
        ],
    })
}

impl RenderBackend for WgpuFrame<'_> {
    fn upload_palette(&mut self, palette: &Palette) -> Result<(), RenderError> {
        self.ctx.queue.write_buffer(
            &self.backend.palette_buf,
            0,
            cast_slice(palette.colors().as_slice()),
        );

        Ok(())
    }

    fn upload_commands(&mut self, groups: &[GpuGroup], params: &[i16]) -> Result<(), RenderError> {
        if self.backend.atlas.is_none() {
            return Err(RenderError::NotReady("atlas"));
        }

        let groups = self.backend.groups.write(cast_slice(groups), self.ctx);
        let params = self.backend.params.write(cast_slice(params), self.ctx);

        // Either write may have reallocated even if the other failed.
        self.backend.refresh_draw_bind_group(self.ctx);

        groups?;
        params?;

        Ok(())
    }

    fn begin_canvas(&mut self, clear: Option<u8>) {
        self.clear = Some(clear);
        self.backend.draws.clear();
    }

    fn draw(&mut self, index: u32, group: &CommandGroup) {
        self.backend.draws.push((index, group.count));
    }

    fn end_canvas(&mut self) -> Result<(), RenderError> {
        let Some(clear) = self.clear.take() else {
            return Ok(());
        };

        let backend = &mut *self.backend;
        if !backend.draws.is_empty() && backend.draw_bind_group.is_none() {
            backend.draws.clear();
            return Err(RenderError::NotReady("draw bind group"));
        }

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&CommandEncoderDescriptor::default());

        {
            let load = match clear {
                Some(index) => LoadOp::Clear(wgpu::Color {
                    r: index as f64,
                    g: 0.0,
                    b: 0.0,
                    a: 0.0,
                }),
                None => LoadOp::Load,
            };

            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("pixlet canvas pass"),
                timestamp_writes: None,
                occlusion_query_set: None,
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &backend.canvas.depth,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(0.0),
                        store: StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &backend.canvas.color,
                    depth_slice: None,
                    ops: Operations {
                        load,
                        store: StoreOp::Store,
                    },
                    resolve_target: None,
                })],
            });

            if let Some((bind_group, _)) = &backend.draw_bind_group {
                pass.set_bind_group(0, bind_group, &[]);
                pass.set_pipeline(&backend.draw_pipeline);

                for &(index, count) in &backend.draws {
                    let first = index * VERTICES_PER_GROUP;
                    pass.draw(first..first + VERTICES_PER_GROUP, 0..count);
                }
            }
        }

        self.ctx.queue.submit([encoder.finish()]);
        backend.draws.clear();

        Ok(())
    }

    fn blit(&mut self) -> Result<(), RenderError> {
        let backend = &*self.backend;

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&CommandEncoderDescriptor::default());

        {
            let mut pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("pixlet blit pass"),
                timestamp_writes: None,
                occlusion_query_set: None,
                depth_stencil_attachment: None,
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: self.output,
                    depth_slice: None,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color {
                            r: backend.border.r as f64,
                            g: backend.border.g as f64,
                            b: backend.border.b as f64,
                            a: 1.0,
                        }),
                        store: StoreOp::Store,
                    },
                    resolve_target: None,
                })],
            });

            pass.set_vertex_buffer(0, backend.vertex_buf.slice(..));
            pass.set_index_buffer(backend.index_buf.slice(..), IndexFormat::Uint16);
            pass.set_bind_group(0, &backend.blit_bind_group, &[]);
            pass.set_pipeline(&backend.blit_pipeline);

            pass.draw_indexed(0..6, 0, 0..1);
        }

        self.ctx.queue.submit([encoder.finish()]);

        Ok(())
    }
}

const PRIMITIVE_STATE: PrimitiveState = PrimitiveState {
    front_face: FrontFace::Ccw,
    conservative: false,
    cull_mode: None,
    polygon_mode: PolygonMode::Fill,
    strip_index_format: None,
    topology: PrimitiveTopology::TriangleList,
    unclipped_depth: false,
};

const VERTEX_BUFFER_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: size_of::<Vec2>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &[VertexAttribute {
        format: VertexFormat::Float32x2,
        offset: 0,
        shader_location: 0,
    }],
};

#[cfg(test)]
mod tests {
    use super::*;

    const BUILT: Bound = Bound {
        groups: 0,
        params: 0,
        mapping: 1,
    };

    #[test]
    fn bind_group_is_built_once_assets_exist() {
        assert!(is_stale(None, BUILT));
        assert!(!is_stale(Some(BUILT), BUILT));
    }

    #[test]
    fn growth_before_a_failed_write_still_rebinds() {
        // The group buffer was reallocated, then the parameter write failed.
        let after_failure = Bound {
            groups: 1,
            ..BUILT
        };
        assert!(is_stale(Some(BUILT), after_failure));

        // A smaller frame afterwards grows nothing, but the old bind group
        // still refers to the dropped group buffer.
        let next_frame = after_failure;
        assert!(is_stale(Some(BUILT), next_frame));
    }

    #[test]
    fn any_reallocated_buffer_rebinds() {
        for current in [
            Bound { groups: 1, ..BUILT },
            Bound { params: 1, ..BUILT },
            Bound { mapping: 2, ..BUILT },
        ] {
            assert!(is_stale(Some(BUILT), current));
        }
    }
}
