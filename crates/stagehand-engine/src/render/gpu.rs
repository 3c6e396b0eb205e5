use anyhow::{ensure, Context, Result};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::Affine2;
use crate::device::HeadlessGpu;
use crate::drawable::TouchFilter;
use crate::effects::Effect;
use crate::paint::{Rgb8, Rgba8};
use crate::skin::Silhouette;

use super::{ColorQuery, OffscreenRenderer, PixelRegion, RenderLayer};

const WORKGROUP_SIZE: u32 = 8;

const MODE_COLOR: u32 = 0;
const MODE_ID: u32 = 1;

/// Uniform block of the query pass. Must match `Params` in `touching_color.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QueryParams {
    left: i32,
    bottom: i32,
    width: u32,
    height: u32,
    layer_count: u32,
    first_candidate: u32,
    mode: u32,
    has_mask: u32,
    mask: u32,
    background: u32,
    _pad0: u32,
    _pad1: u32,
}

/// One drawable as the shader sees it. Must match `Layer` in `touching_color.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct GpuLayer {
    inv_a: f32,
    inv_b: f32,
    inv_c: f32,
    inv_d: f32,
    inv_tx: f32,
    inv_ty: f32,
    skin_w: f32,
    skin_h: f32,
    sil_offset: u32,
    sil_width: u32,
    sil_height: u32,
    touch_filter: u32,
    effects: u32,
    id: u32,
    has_inverse: u32,
    u_color: f32,
    u_fisheye: f32,
    u_whirl: f32,
    u_pixelate: f32,
    u_mosaic: f32,
    u_brightness: f32,
    u_ghost: f32,
    _pad0: u32,
    _pad1: u32,
}

/// Layer table plus the packed silhouettes it points into.
///
/// Drawables sharing a skin share one silhouette upload.
#[derive(Default)]
struct LayerPack<'a> {
    layers: Vec<GpuLayer>,
    texels: Vec<u32>,
    uploaded: Vec<(&'a Silhouette, u32)>,
}

impl<'a> LayerPack<'a> {
    fn push(&mut self, layer: &RenderLayer<'a>) {
        let sil = layer.silhouette;
        let offset = match self.uploaded.iter().find(|(s, _)| std::ptr::eq(*s, sil)) {
            Some(&(_, offset)) => offset,
            None => {
                let offset = self.texels.len() as u32;
                self.texels.extend(
                    sil.color_data()
                        .chunks_exact(4)
                        .map(|px| Rgba8::new(px[0], px[1], px[2], px[3]).pack()),
                );
                self.uploaded.push((sil, offset));
                offset
            }
        };

        let d = layer.drawable;
        let inv = d.cached_inverse();
        let m = inv.unwrap_or(Affine2::IDENTITY);
        let fx = d.effects();
        let size = d.skin_size();
        self.layers.push(GpuLayer {
            inv_a: m.a,
            inv_b: m.b,
            inv_c: m.c,
            inv_d: m.d,
            inv_tx: m.tx,
            inv_ty: m.ty,
            skin_w: size.x,
            skin_h: size.y,
            sil_offset: offset,
            sil_width: sil.width(),
            sil_height: sil.height(),
            touch_filter: match d.touch_filter() {
                TouchFilter::Never => 0,
                TouchFilter::Nearest => 1,
                TouchFilter::Linear => 2,
            },
            effects: fx.enabled(),
            id: d.id().get(),
            has_inverse: inv.is_some() as u32,
            u_color: fx.uniform(Effect::Color),
            u_fisheye: fx.uniform(Effect::Fisheye),
            u_whirl: fx.uniform(Effect::Whirl),
            u_pixelate: fx.uniform(Effect::Pixelate),
            u_mosaic: fx.uniform(Effect::Mosaic),
            u_brightness: fx.uniform(Effect::Brightness),
            u_ghost: fx.uniform(Effect::Ghost),
            _pad0: 0,
            _pad1: 0,
        });
    }

    /// Storage bindings may not be empty.
    fn finish(mut self) -> (Vec<GpuLayer>, Vec<u32>) {
        if self.layers.is_empty() {
            self.layers.push(GpuLayer::zeroed());
        }
        if self.texels.is_empty() {
            self.texels.push(0);
        }
        (self.layers, self.texels)
    }
}

fn pack_rgb(c: Rgb8) -> u32 {
    Rgba8::opaque(c.r, c.g, c.b).pack()
}

/// Offscreen renderer backed by a wgpu compute pass.
///
/// Each query uploads the layer table and silhouettes, runs one invocation per
/// region pixel and blocks until the result is mapped back. Regions are small
/// (a sprite's bounds), so per-query buffers are not pooled.
pub struct GpuRenderer {
    gpu: HeadlessGpu,
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    frames: u64,
}

impl GpuRenderer {
    pub fn new(gpu: HeadlessGpu) -> Self {
        let device = gpu.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("stagehand touching shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/touching_color.wgsl").into()),
        });

        let storage = |binding: u32, read_only: bool| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("stagehand touching bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<QueryParams>() as u64,
                        ),
                    },
                    count: None,
                },
                storage(1, true),
                storage(2, true),
                storage(3, false),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("stagehand touching pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("stagehand touching pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        log::debug!("GpuRenderer: pipeline ready on {}", gpu.adapter_info().name);

        Self { gpu, pipeline, bind_group_layout, frames: 0 }
    }

    pub fn gpu(&self) -> &HeadlessGpu {
        &self.gpu
    }

    /// Number of regions dispatched so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn run(&mut self, params: QueryParams, layers: &[GpuLayer], texels: &[u32]) -> Result<Vec<u8>> {
        let pixel_count = params.width as usize * params.height as usize;
        if pixel_count == 0 {
            return Ok(Vec::new());
        }

        let limits = self.gpu.device().limits();
        let groups_x = params.width.div_ceil(WORKGROUP_SIZE);
        let groups_y = params.height.div_ceil(WORKGROUP_SIZE);
        ensure!(
            groups_x.max(groups_y) <= limits.max_compute_workgroups_per_dimension,
            "query region {}x{} exceeds the device dispatch limit",
            params.width,
            params.height
        );

        let device = self.gpu.device();
        let queue = self.gpu.queue();
        let output_size = (pixel_count * 4) as u64;

        let params_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("stagehand query params"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let layers_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("stagehand query layers"),
            contents: bytemuck::cast_slice(layers),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let texels_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("stagehand query silhouettes"),
            contents: bytemuck::cast_slice(texels),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let output_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("stagehand query output"),
            size: output_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("stagehand query readback"),
            size: output_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("stagehand query bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: params_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: layers_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: texels_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: output_buf.as_entire_binding() },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("stagehand query encoder"),
        });
        {
            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("stagehand query pass"),
                timestamp_writes: None,
            });
            cpass.set_pipeline(&self.pipeline);
            cpass.set_bind_group(0, &bind_group, &[]);
            cpass.dispatch_workgroups(groups_x, groups_y, 1);
        }
        encoder.copy_buffer_to_buffer(&output_buf, 0, &readback_buf, 0, output_size);
        queue.submit(Some(encoder.finish()));

        let slice = readback_buf.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |r| {
            let _ = tx.send(r);
        });

        // Blocks until the submission, and with it the map callback, completes.
        device
            .poll(wgpu::PollType::wait_indefinitely())
            .context("device poll failed")?;
        rx.recv()
            .context("query readback callback dropped")?
            .context("failed to map query readback")?;

        let pixels = slice.get_mapped_range().to_vec();
        readback_buf.unmap();
        self.frames += 1;
        Ok(pixels)
    }
}

impl OffscreenRenderer for GpuRenderer {
    fn name(&self) -> &'static str {
        "gpu"
    }

    fn render_color_query(&mut self, query: &ColorQuery<'_>) -> Result<Vec<u8>> {
        let mut pack = LayerPack::default();
        pack.push(&query.tester);
        for layer in query.candidates {
            pack.push(layer);
        }
        let layer_count = pack.layers.len() as u32;
        let (layers, texels) = pack.finish();

        let region = query.region;
        let params = QueryParams {
            left: region.left,
            bottom: region.bottom,
            width: region.width,
            height: region.height,
            layer_count,
            first_candidate: 1,
            mode: MODE_COLOR,
            has_mask: query.mask.is_some() as u32,
            mask: query.mask.map(pack_rgb).unwrap_or(0),
            background: pack_rgb(query.background),
            _pad0: 0,
            _pad1: 0,
        };
        self.run(params, &layers, &texels)
    }

    fn render_id_buffer(
        &mut self,
        region: PixelRegion,
        candidates: &[RenderLayer<'_>],
    ) -> Result<Vec<u8>> {
        let mut pack = LayerPack::default();
        for layer in candidates {
            pack.push(layer);
        }
        let layer_count = pack.layers.len() as u32;
        let (layers, texels) = pack.finish();

        let params = QueryParams {
            left: region.left,
            bottom: region.bottom,
            width: region.width,
            height: region.height,
            layer_count,
            first_candidate: 0,
            mode: MODE_ID,
            has_mask: 0,
            mask: 0,
            background: 0,
            _pad0: 0,
            _pad1: 0,
        };
        self.run(params, &layers, &texels)
    }
}
