pub mod cpu;
#[cfg(feature = "gpu")]
pub mod wgpu_backend;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::correction::CorrectionVector;
use crate::error::Result;
use crate::frame::RgbFrame;

pub use cpu::CpuBackend;

/// A device that can apply a correction vector to a whole frame.
pub trait FilterBackend: Send + Sync {
    fn name(&self) -> &str;

    fn is_gpu(&self) -> bool {
        false
    }

    fn apply(&self, frame: &RgbFrame, vector: &CorrectionVector) -> Result<RgbFrame>;
}

/// Native GPU API found on this machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GpuBackendKind {
    #[default]
    None,
    Metal,
    Vulkan,
}

impl std::fmt::Display for GpuBackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Metal => write!(f, "Metal"),
            Self::Vulkan => write!(f, "Vulkan"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GpuCapability {
    pub available: bool,
    pub backend: GpuBackendKind,
}

impl GpuCapability {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_backend(backend: GpuBackendKind) -> Self {
        Self {
            available: backend != GpuBackendKind::None,
            backend,
        }
    }

    /// Probe for a Metal or Vulkan adapter. Without the `gpu` feature this
    /// always reports no GPU.
    pub fn detect() -> Self {
        #[cfg(feature = "gpu")]
        {
            wgpu_backend::probe_capability()
        }
        #[cfg(not(feature = "gpu"))]
        {
            Self::none()
        }
    }
}

/// Pick the filter backend for a run.
///
/// | use_gpu | detected   | backend                          |
/// |---------|------------|----------------------------------|
/// | false   | any        | CPU                              |
/// | true    | none       | CPU                              |
/// | true    | Metal      | wgpu on Metal, CPU if init fails |
/// | true    | Vulkan     | wgpu on Vulkan, CPU if init fails|
pub fn create_backend(use_gpu: bool, capability: GpuCapability) -> Arc<dyn FilterBackend> {
    match (use_gpu, capability.backend) {
        (false, _) | (true, GpuBackendKind::None) => Arc::new(CpuBackend),
        (true, kind) => gpu_backend(kind),
    }
}

#[cfg(feature = "gpu")]
fn gpu_backend(kind: GpuBackendKind) -> Arc<dyn FilterBackend> {
    match wgpu_backend::WgpuBackend::new(kind) {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            warn!(backend = %kind, error = %e, "GPU init failed, using CPU");
            Arc::new(CpuBackend)
        }
    }
}

#[cfg(not(feature = "gpu"))]
fn gpu_backend(kind: GpuBackendKind) -> Arc<dyn FilterBackend> {
    warn!(backend = %kind, "Built without GPU support, using CPU");
    Arc::new(CpuBackend)
}

/// Applies correction vectors through the selected backend.
///
/// A GPU failure falls back to the CPU for that frame and disables the GPU for
/// every later call on this applicator.
pub struct FilterApplicator {
    primary: Arc<dyn FilterBackend>,
    fallback: CpuBackend,
    gpu_disabled: AtomicBool,
}

impl FilterApplicator {
    pub fn new(primary: Arc<dyn FilterBackend>) -> Self {
        info!(backend = primary.name(), "Filter backend selected");
        Self {
            primary,
            fallback: CpuBackend,
            gpu_disabled: AtomicBool::new(false),
        }
    }

    pub fn cpu() -> Self {
        Self::new(Arc::new(CpuBackend))
    }

    /// Name of the backend currently serving requests.
    pub fn backend_name(&self) -> &str {
        if self.gpu_active() || !self.primary.is_gpu() {
            self.primary.name()
        } else {
            self.fallback.name()
        }
    }

    pub fn gpu_active(&self) -> bool {
        self.primary.is_gpu() && !self.gpu_disabled.load(Ordering::Acquire)
    }

    pub fn apply(&self, frame: &RgbFrame, vector: &CorrectionVector) -> Result<RgbFrame> {
        if !self.primary.is_gpu() {
            return self.primary.apply(frame, vector);
        }
        if !self.gpu_disabled.load(Ordering::Acquire) {
            match self.primary.apply(frame, vector) {
                Ok(out) => return Ok(out),
                Err(e) => {
                    if !self.gpu_disabled.swap(true, Ordering::AcqRel) {
                        warn!(
                            backend = self.primary.name(),
                            error = %e,
                            "GPU filter failed, continuing on CPU"
                        );
                    }
                }
            }
        }
        self.fallback.apply(frame, vector)
    }
}
