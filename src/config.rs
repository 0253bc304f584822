use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Immutable experiment parameters. Constructed once per experiment and passed
/// explicitly into every call site; nothing reads a process-wide default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub n_samples: usize,
    pub blur_sigma: f64,
    pub kernel_radius: usize,
    /// Named noise levels mapped to their Gaussian standard deviations,
    /// evaluated in insertion order.
    pub noise_levels: IndexMap<String, f64>,
    /// Base seed for per-level noise generators.
    pub noise_seed: u64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        let mut noise_levels = IndexMap::new();
        noise_levels.insert("low".to_string(), 0.001);
        noise_levels.insert("medium".to_string(), 0.01);
        noise_levels.insert("high".to_string(), 0.05);
        Self {
            n_samples: 200,
            blur_sigma: 2.5,
            kernel_radius: 10,
            noise_levels,
            noise_seed: 42,
        }
    }
}

impl ExperimentConfig {
    pub fn sigma_for(&self, level: &str) -> Option<f64> {
        self.noise_levels.get(level).copied()
    }

    pub fn level_names(&self) -> Vec<String> {
        self.noise_levels.keys().cloned().collect()
    }

    /// Deterministic per-level seed derived from the base seed and the level's
    /// position in the ordered table.
    pub fn level_seed(&self, level: &str) -> Option<u64> {
        self.noise_levels
            .get_index_of(level)
            .map(|index| self.noise_seed.wrapping_add(index as u64))
    }
}
