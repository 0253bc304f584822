use std::sync::Arc;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;

use crate::cache::DecompositionCache;
use crate::operator::ForwardOperator;
use crate::spectral::{SpectralDecomposer, SpectralDecomposition};

/// An operator paired with its lazily computed spectral decomposition. The
/// decomposition is computed (or loaded from the cache) on first access and
/// shared read-only afterwards; recomputation never happens for the same
/// operator.
#[derive(Debug)]
pub struct PreparedOperator {
    operator: Arc<ForwardOperator>,
    decomposition: OnceCell<Arc<SpectralDecomposition>>,
    cache: Option<DecompositionCache>,
}

impl PreparedOperator {
    pub fn new(operator: ForwardOperator) -> Self {
        Self {
            operator: Arc::new(operator),
            decomposition: OnceCell::new(),
            cache: None,
        }
    }

    pub fn with_cache(operator: ForwardOperator, cache: DecompositionCache) -> Self {
        Self {
            operator: Arc::new(operator),
            decomposition: OnceCell::new(),
            cache: Some(cache),
        }
    }

    pub fn operator(&self) -> &ForwardOperator {
        &self.operator
    }

    pub fn operator_arc(&self) -> Arc<ForwardOperator> {
        Arc::clone(&self.operator)
    }

    pub fn decomposition(&self) -> Result<Arc<SpectralDecomposition>> {
        self.decomposition
            .get_or_try_init(|| {
                if let Some(cache) = &self.cache {
                    if let Some(cached) = cache
                        .load(self.operator.spec())
                        .with_context(|| "load cached decomposition")?
                    {
                        return Ok(Arc::new(cached));
                    }
                }
                let computed = SpectralDecomposer::decompose(&self.operator)
                    .with_context(|| "decompose forward operator")?;
                if let Some(cache) = &self.cache {
                    cache
                        .store(self.operator.spec(), &computed)
                        .with_context(|| "store decomposition in cache")?;
                }
                Ok(Arc::new(computed))
            })
            .map(Arc::clone)
    }
}
