use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::operator::OperatorSpec;
use crate::spectral::SpectralDecomposition;

const CACHE_DIR: &str = "cache";
const DECOMPOSITION_SUBDIR: &str = "decompositions";
const METADATA_FILE: &str = "meta.json";
const DECOMPOSITION_FILE: &str = "decomposition.json";
const CACHE_VERSION: u32 = 1;

/// Content-addressed on-disk cache for spectral decompositions. Entries are
/// keyed by the canonical JSON bytes of the producing operator spec, so any
/// change to the operator yields a fresh entry.
#[derive(Debug, Clone)]
pub struct DecompositionCache {
    root: PathBuf,
}

impl Default for DecompositionCache {
    fn default() -> Self {
        Self::new(CACHE_DIR)
    }
}

impl DecompositionCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn load(&self, spec: &OperatorSpec) -> Result<Option<SpectralDecomposition>> {
        let dir = self.entry_dir(spec)?;
        let meta_path = dir.join(METADATA_FILE);
        if !meta_path.exists() {
            return Ok(None);
        }

        let meta: CachedMeta = read_json(&meta_path)
            .with_context(|| format!("deserialize cache metadata from {:?}", meta_path))?;
        if meta.version != CACHE_VERSION || meta.spec != *spec {
            return Ok(None);
        }

        let decomposition_path = dir.join(DECOMPOSITION_FILE);
        if !decomposition_path.exists() {
            return Ok(None);
        }
        let decomposition = read_json(&decomposition_path).with_context(|| {
            format!("deserialize cached decomposition from {:?}", decomposition_path)
        })?;
        Ok(Some(decomposition))
    }

    pub fn store(&self, spec: &OperatorSpec, decomposition: &SpectralDecomposition) -> Result<()> {
        let dir = self.entry_dir(spec)?;
        fs::create_dir_all(&dir).with_context(|| format!("create cache directory {:?}", dir))?;

        let meta = CachedMeta {
            version: CACHE_VERSION,
            spec: spec.clone(),
        };
        write_json(&dir.join(METADATA_FILE), &meta)
            .with_context(|| format!("write cache metadata to {:?}", dir))?;
        write_json(&dir.join(DECOMPOSITION_FILE), decomposition)
            .with_context(|| format!("write cached decomposition to {:?}", dir))?;
        Ok(())
    }

    fn entry_dir(&self, spec: &OperatorSpec) -> Result<PathBuf> {
        let key = serde_json::to_vec(spec).context("serialize operator spec for cache key")?;
        let mut hasher = blake3::Hasher::new();
        hasher.update(&key);
        let dirname = hasher.finalize().to_hex().to_string();
        Ok(self.root.join(DECOMPOSITION_SUBDIR).join(dirname))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedMeta {
    version: u32,
    spec: OperatorSpec,
}

fn read_json<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned,
{
    let file = File::open(path).with_context(|| format!("open cached json file {:?}", path))?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .with_context(|| format!("deserialize cached json file {:?}", path))
}

fn write_json<T>(path: &Path, value: &T) -> Result<()>
where
    T: Serialize,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create cache parent directory {:?}", parent))?;
    }
    let file = File::create(path).with_context(|| format!("create cache json file {:?}", path))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer(writer, value)
        .with_context(|| format!("serialize cache json file {:?}", path))
}
