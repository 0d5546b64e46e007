use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::compute::GpuCapability;
use crate::error::Result;

use super::performance::{PerformanceConfig, PerformanceUpdate};

/// Snapshot of the tunables plus the detected environment.
#[derive(Clone, Debug, Serialize)]
pub struct PerformanceInfo {
    pub config: PerformanceConfig,
    pub gpu: GpuCapability,
    pub core_count: usize,
}

/// Process-wide performance settings, persisted as TOML.
///
/// Readers take a copy with [`snapshot`](Self::snapshot); a running pass never
/// observes a change made by [`configure`](Self::configure) mid-way.
pub struct PerformanceStore {
    path: PathBuf,
    state: RwLock<PerformanceConfig>,
    gpu: GpuCapability,
    core_count: usize,
}

impl PerformanceStore {
    /// Load from `path`, detecting GPU support and core count once.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_environment(path, GpuCapability::detect(), num_cpus::get())
    }

    /// Load from `path` with an explicit environment.
    pub fn with_environment(path: impl Into<PathBuf>, gpu: GpuCapability, core_count: usize) -> Self {
        let path = path.into();
        let core_count = core_count.max(1);
        let config = load(&path, core_count);
        info!(
            path = %path.display(),
            batch_size = config.batch_size,
            max_processes = config.max_processes,
            gpu = %gpu.backend,
            "Performance configuration loaded"
        );
        Self {
            path,
            state: RwLock::new(config),
            gpu,
            core_count,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn gpu(&self) -> GpuCapability {
        self.gpu
    }

    pub fn core_count(&self) -> usize {
        self.core_count
    }

    pub fn snapshot(&self) -> PerformanceConfig {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn info(&self) -> PerformanceInfo {
        PerformanceInfo {
            config: self.snapshot(),
            gpu: self.gpu,
            core_count: self.core_count,
        }
    }

    /// Apply a partial update. The file is written first; the in-memory state
    /// only changes if the write succeeds.
    pub fn configure(&self, update: &PerformanceUpdate) -> Result<PerformanceConfig> {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let next = guard.merged(update, self.core_count);
        persist(&self.path, &next)?;
        *guard = next.clone();
        info!(
            batch_size = next.batch_size,
            max_processes = next.max_processes,
            video_quality = next.video_quality,
            use_gpu = next.use_gpu,
            codec = %next.codec,
            "Performance configuration updated"
        );
        Ok(next)
    }
}

fn load(path: &Path, core_count: usize) -> PerformanceConfig {
    let recommended = PerformanceConfig::recommended(core_count);
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "No saved configuration, using defaults");
            return recommended;
        }
    };
    match toml::from_str::<PerformanceConfig>(&contents) {
        Ok(config) => config.clamped(core_count),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring invalid configuration file");
            recommended
        }
    }
}

fn persist(path: &Path, config: &PerformanceConfig) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(config)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
