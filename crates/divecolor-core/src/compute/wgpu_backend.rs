//! wgpu-based GPU filter backend (Metal / Vulkan).

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::correction::CorrectionVector;
use crate::error::{DiveColorError, Result};
use crate::frame::RgbFrame;

use super::{FilterBackend, GpuBackendKind, GpuCapability};

// ---------------------------------------------------------------------------
// Shader
// ---------------------------------------------------------------------------

/// One invocation per pixel. Pixels are packed `0x00BBGGRR`; the 2D dispatch
/// keeps large frames under the per-dimension workgroup limit.
const APPLY_FILTER_WGSL: &str = r"
struct Params { count: u32, row_stride: u32 }
@group(0) @binding(0) var<storage, read>       input:  array<u32>;
@group(0) @binding(1) var<storage, read_write> output: array<u32>;
@group(0) @binding(2) var<storage, read>       filt:   array<f32>;
@group(0) @binding(3) var<uniform>             params: Params;
@compute @workgroup_size(256)
fn main(@builtin(global_invocation_id) gid: vec3<u32>) {
    let i = gid.y * params.row_stride + gid.x;
    if i >= params.count { return; }
    let px = input[i];
    let r = f32(px & 0xffu);
    let g = f32((px >> 8u) & 0xffu);
    let b = f32((px >> 16u) & 0xffu);
    let r2 = r * filt[0] + g * filt[1] + b * filt[2] + filt[4] * 255.0;
    let g2 = g * filt[6] + filt[9] * 255.0;
    let b2 = b * filt[12] + filt[14] * 255.0;
    let ro = u32(clamp(r2, 0.0, 255.0));
    let go = u32(clamp(g2, 0.0, 255.0));
    let bo = u32(clamp(b2, 0.0, 255.0));
    output[i] = ro | (go << 8u) | (bo << 16u);
}
";

const WORKGROUP_SIZE: u32 = 256;
const MAX_WORKGROUPS_PER_DIM: u32 = 65_535;

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
struct FilterParams {
    count: u32,
    row_stride: u32,
}

const fn div_ceil(a: u32, b: u32) -> u32 {
    (a + b - 1) / b
}

fn wgpu_backends(kind: GpuBackendKind) -> wgpu::Backends {
    match kind {
        GpuBackendKind::Metal => wgpu::Backends::METAL,
        GpuBackendKind::Vulkan => wgpu::Backends::VULKAN,
        GpuBackendKind::None => wgpu::Backends::empty(),
    }
}

fn request_adapter(backends: wgpu::Backends) -> std::result::Result<wgpu::Adapter, String> {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends,
        ..Default::default()
    });
    pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface: None,
        force_fallback_adapter: false,
    }))
    .map_err(|e| format!("No suitable GPU adapter found: {e}"))
}

/// Look for a Metal or Vulkan adapter.
pub fn probe_capability() -> GpuCapability {
    match request_adapter(wgpu::Backends::METAL | wgpu::Backends::VULKAN) {
        Ok(adapter) => {
            let info = adapter.get_info();
            let backend = match info.backend {
                wgpu::Backend::Metal => GpuBackendKind::Metal,
                wgpu::Backend::Vulkan => GpuBackendKind::Vulkan,
                _ => GpuBackendKind::None,
            };
            tracing::info!(adapter = %info.name, backend = %backend, "GPU detected");
            GpuCapability::with_backend(backend)
        }
        Err(e) => {
            tracing::debug!("{e}");
            GpuCapability::none()
        }
    }
}

// ---------------------------------------------------------------------------
// WgpuBackend
// ---------------------------------------------------------------------------

pub struct WgpuBackend {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    name: String,
    pipeline: wgpu::ComputePipeline,
}

impl WgpuBackend {
    pub fn new(kind: GpuBackendKind) -> std::result::Result<Self, String> {
        let adapter = request_adapter(wgpu_backends(kind))?;
        let adapter_name = adapter.get_info().name.clone();
        tracing::info!("GPU adapter: {adapter_name}");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("divecolor"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
        ))
        .map_err(|e| format!("Failed to create GPU device: {e}"))?;

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("apply_filter"),
            source: wgpu::ShaderSource::Wgsl(APPLY_FILTER_WGSL.into()),
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("apply_filter"),
            layout: None,
            module: &module,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        Ok(Self {
            device: Arc::new(device),
            queue: Arc::new(queue),
            name: format!("{kind} ({adapter_name})"),
            pipeline,
        })
    }

    fn create_storage<T: Pod>(&self, data: &[T]) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: None,
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::STORAGE
                    | wgpu::BufferUsages::COPY_SRC
                    | wgpu::BufferUsages::COPY_DST,
            })
    }

    fn create_storage_uninit(&self, byte_size: u64) -> wgpu::Buffer {
        self.device.create_buffer(&wgpu::BufferDescriptor {
            label: None,
            size: byte_size,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_SRC
                | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_uniform<T: Pod>(&self, data: &T) -> wgpu::Buffer {
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: None,
                contents: bytemuck::bytes_of(data),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            })
    }

    fn download_u32(&self, buffer: &wgpu::Buffer) -> std::result::Result<Vec<u32>, String> {
        let size = buffer.size();
        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: None,
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut enc = self.device.create_command_encoder(&Default::default());
        enc.copy_buffer_to_buffer(buffer, 0, &staging, 0, size);
        self.queue.submit(std::iter::once(enc.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::sync_channel(1);
        slice.map_async(wgpu::MapMode::Read, move |r| {
            tx.send(r).ok();
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| format!("GPU poll failed: {e}"))?;
        rx.recv()
            .map_err(|_| "GPU channel closed".to_string())?
            .map_err(|e| format!("Buffer mapping failed: {e}"))?;

        let data = slice.get_mapped_range();
        let result: Vec<u32> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        staging.unmap();
        Ok(result)
    }

    fn run(&self, frame: &RgbFrame, vector: &CorrectionVector) -> std::result::Result<RgbFrame, String> {
        let packed = pack_rgb(&frame.to_raw());
        let count = u32::try_from(packed.len()).map_err(|_| "frame too large".to_string())?;

        let groups = div_ceil(count, WORKGROUP_SIZE);
        let groups_x = groups.min(MAX_WORKGROUPS_PER_DIM);
        let groups_y = div_ceil(groups, groups_x);

        let filter: Vec<f32> = vector.as_array().iter().map(|&v| v as f32).collect();
        let input = self.create_storage(&packed);
        let output = self.create_storage_uninit(u64::from(count) * 4);
        let filt = self.create_storage(&filter);
        let params = self.create_uniform(&FilterParams {
            count,
            row_stride: groups_x * WORKGROUP_SIZE,
        });

        let layout = self.pipeline.get_bind_group_layout(0);
        let bg = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: None,
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: input.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: output.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: filt.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: params.as_entire_binding() },
            ],
        });
        let mut enc = self.device.create_command_encoder(&Default::default());
        {
            let mut pass = enc.begin_compute_pass(&Default::default());
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bg, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }
        self.queue.submit(std::iter::once(enc.finish()));

        let result = self.download_u32(&output)?;
        RgbFrame::from_raw(frame.width(), frame.height(), unpack_rgb(&result))
            .map_err(|e| e.to_string())
    }
}

impl FilterBackend for WgpuBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_gpu(&self) -> bool {
        true
    }

    fn apply(&self, frame: &RgbFrame, vector: &CorrectionVector) -> Result<RgbFrame> {
        self.run(frame, vector)
            .map_err(DiveColorError::BackendUnavailable)
    }
}

fn pack_rgb(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks_exact(3)
        .map(|p| u32::from(p[0]) | (u32::from(p[1]) << 8) | (u32::from(p[2]) << 16))
        .collect()
}

fn unpack_rgb(pixels: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixels.len() * 3);
    for &px in pixels {
        out.extend_from_slice(&[(px & 0xff) as u8, ((px >> 8) & 0xff) as u8, ((px >> 16) & 0xff) as u8]);
    }
    out
}
