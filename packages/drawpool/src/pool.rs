//! Pool bootstrap and administrative reset.
//!
//! The raw source is a CSV grid; every non-blank cell (after trimming)
//! becomes one code, row-major, position discarded. Duplicate cells are
//! preserved: the draw algorithm consumes duplicates one occurrence at a
//! time, so deduplicating here would silently change pool odds.

use std::sync::Arc;

use serde_json::json;

use crate::error::{DrawError, Result};
use crate::store::KeyValueStore;

/// Seeds and resets the code pool stored under a single well-known key.
#[derive(Clone)]
pub struct PoolInitializer {
    store: Arc<dyn KeyValueStore>,
    pool_key: String,
}

impl PoolInitializer {
    pub fn new(store: Arc<dyn KeyValueStore>, pool_key: impl Into<String>) -> Self {
        Self {
            store,
            pool_key: pool_key.into(),
        }
    }

    pub fn pool_key(&self) -> &str {
        &self.pool_key
    }

    /// Load the current pool. Absent and malformed-absent are distinct:
    /// a stored value that is not a list of strings is a fatal error.
    pub async fn current(&self) -> Result<Option<Vec<String>>> {
        match self.store.get(&self.pool_key).await? {
            Some(value) => {
                let codes: Vec<String> = serde_json::from_value(value).map_err(|e| {
                    DrawError::malformed(format!(
                        "pool at '{}' is not a list of strings: {e}",
                        self.pool_key
                    ))
                })?;
                Ok(Some(codes))
            }
            None => Ok(None),
        }
    }

    /// Seed the pool from `source` only if it is currently absent or empty.
    ///
    /// Idempotent by design: once a non-empty pool exists, any source is
    /// ignored so a re-sent bootstrap request cannot overwrite depletion
    /// progress. Returns the pool in effect afterwards.
    pub async fn ensure(&self, source: &str) -> Result<Vec<String>> {
        if let Some(existing) = self.current().await? {
            if !existing.is_empty() {
                return Ok(existing);
            }
        }

        let codes = parse_codes(source)?;
        if !codes.is_empty() {
            self.store.set(&self.pool_key, json!(codes)).await?;
        }
        Ok(codes)
    }

    /// Overwrite the pool wholesale from `source`, bypassing the
    /// only-if-empty guard. Used to restock after exhaustion. Rejects a
    /// source that yields no codes. Returns the new pool size.
    pub async fn reset(&self, source: &str) -> Result<usize> {
        let codes = parse_codes(source)?;
        if codes.is_empty() {
            return Err(DrawError::InvalidSource {
                reason: "no valid codes found in source".to_string(),
            });
        }
        self.store.set(&self.pool_key, json!(codes)).await?;
        tracing::info!(count = codes.len(), key = %self.pool_key, "pool reset");
        Ok(codes.len())
    }
}

/// Flatten a CSV grid into trimmed non-empty cells, row-major.
pub fn parse_codes(source: &str) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(source.as_bytes());

    let mut codes = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DrawError::InvalidSource {
            reason: format!("CSV parse error: {e}"),
        })?;
        for cell in record.iter() {
            let cell = cell.trim();
            if !cell.is_empty() {
                codes.push(cell.to_string());
            }
        }
    }
    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::MemoryStore;

    fn initializer() -> PoolInitializer {
        PoolInitializer::new(Arc::new(MemoryStore::new()), "codes")
    }

    #[test]
    fn parse_flattens_grid_row_major() {
        let codes = parse_codes("A1,B2,C3\nD4,E5\nF6").unwrap();
        assert_eq!(codes, vec!["A1", "B2", "C3", "D4", "E5", "F6"]);
    }

    #[test]
    fn parse_trims_and_drops_blank_cells() {
        let codes = parse_codes("  A1 , ,B2\n,,\n C3 ").unwrap();
        assert_eq!(codes, vec!["A1", "B2", "C3"]);
    }

    #[test]
    fn parse_preserves_duplicates() {
        let codes = parse_codes("A1,A1\nA1").unwrap();
        assert_eq!(codes, vec!["A1", "A1", "A1"]);
    }

    #[test]
    fn parse_empty_source_yields_no_codes() {
        assert!(parse_codes("").unwrap().is_empty());
        assert!(parse_codes(" , ,\n,").unwrap().is_empty());
    }

    #[tokio::test]
    async fn ensure_seeds_an_absent_pool() {
        let init = initializer();
        let codes = init.ensure("A,B,C").await.unwrap();
        assert_eq!(codes, vec!["A", "B", "C"]);
        assert_eq!(init.current().await.unwrap(), Some(codes));
    }

    #[tokio::test]
    async fn ensure_is_idempotent_across_different_sources() {
        let init = initializer();
        init.ensure("A,B,C").await.unwrap();

        // A second bootstrap with a different source is a no-op.
        let codes = init.ensure("X,Y,Z").await.unwrap();
        assert_eq!(codes, vec!["A", "B", "C"]);
        assert_eq!(
            init.current().await.unwrap(),
            Some(vec!["A".to_string(), "B".to_string(), "C".to_string()])
        );
    }

    #[tokio::test]
    async fn ensure_reseeds_an_emptied_pool() {
        let init = initializer();
        init.ensure("A").await.unwrap();
        init.store.set("codes", json!([])).await.unwrap();

        let codes = init.ensure("X,Y").await.unwrap();
        assert_eq!(codes, vec!["X", "Y"]);
    }

    #[tokio::test]
    async fn ensure_with_empty_source_writes_nothing() {
        let init = initializer();
        let codes = init.ensure("").await.unwrap();
        assert!(codes.is_empty());
        assert_eq!(init.current().await.unwrap(), None);
    }

    #[tokio::test]
    async fn reset_overwrites_a_populated_pool() {
        let init = initializer();
        init.ensure("A,B,C").await.unwrap();

        let count = init.reset("X,Y").await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            init.current().await.unwrap(),
            Some(vec!["X".to_string(), "Y".to_string()])
        );
    }

    #[tokio::test]
    async fn reset_rejects_a_source_without_codes() {
        let init = initializer();
        init.ensure("A").await.unwrap();

        let err = init.reset(" , ,").await.unwrap_err();
        assert!(matches!(err, DrawError::InvalidSource { .. }));
        // Existing pool untouched
        assert_eq!(init.current().await.unwrap(), Some(vec!["A".to_string()]));
    }

    #[tokio::test]
    async fn malformed_stored_pool_is_fatal() {
        let init = initializer();
        init.store.set("codes", json!({"not": "a list"})).await.unwrap();

        let err = init.current().await.unwrap_err();
        assert!(matches!(err, DrawError::StoreFatal(_)));
    }
}
