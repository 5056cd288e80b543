//! In-memory embedding cache keyed by content hash.
//!
//! Oracles are deterministic per text, so a blake3 hash of the text is a
//! sufficient key. TinyLFU admission, bounded entry count.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::sync::Cache;
use recall_core::config::EmbeddingConfig;
use recall_core::errors::{EmbeddingError, RecallResult};
use recall_core::traits::IEmbeddingProvider;
use tracing::debug;

/// Wraps any provider with an L1 cache. Batch calls only send misses to the
/// provider, in chunks of at most `batch_size`.
pub struct CachedEmbeddings<P> {
    inner: P,
    cache: Cache<String, Vec<f32>>,
    batch_size: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<P: IEmbeddingProvider> CachedEmbeddings<P> {
    pub fn new(inner: P, config: &EmbeddingConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.l1_cache_size)
            .time_to_idle(Duration::from_secs(3600))
            .build();
        Self {
            inner,
            cache,
            batch_size: config.batch_size.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// blake3 hex digest of the text.
    pub fn content_key(text: &str) -> String {
        blake3::hash(text.as_bytes()).to_hex().to_string()
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.cache.invalidate_all();
    }
}

impl<P: IEmbeddingProvider> IEmbeddingProvider for CachedEmbeddings<P> {
    fn embed(&self, text: &str) -> RecallResult<Vec<f32>> {
        let key = Self::content_key(text);
        if let Some(vec) = self.cache.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(vec);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let vec = self.inner.embed(text)?;
        self.cache.insert(key, vec.clone());
        Ok(vec)
    }

    fn embed_batch(&self, texts: &[String]) -> RecallResult<Vec<Vec<f32>>> {
        let keys: Vec<String> = texts.iter().map(|t| Self::content_key(t)).collect();
        let mut out: Vec<Option<Vec<f32>>> = keys.iter().map(|k| self.cache.get(k)).collect();

        let missing: Vec<usize> = (0..texts.len()).filter(|&i| out[i].is_none()).collect();
        let hit_count = (texts.len() - missing.len()) as u64;
        self.hits.fetch_add(hit_count, Ordering::Relaxed);
        self.misses.fetch_add(missing.len() as u64, Ordering::Relaxed);

        for chunk in missing.chunks(self.batch_size) {
            let batch: Vec<String> = chunk.iter().map(|&i| texts[i].clone()).collect();
            let vectors = self.inner.embed_batch(&batch)?;
            if vectors.len() != batch.len() {
                return Err(EmbeddingError::InferenceFailed {
                    reason: format!(
                        "{} returned {} vectors for {} texts",
                        self.inner.name(),
                        vectors.len(),
                        batch.len()
                    ),
                }
                .into());
            }
            for (&i, vec) in chunk.iter().zip(vectors) {
                self.cache.insert(keys[i].clone(), vec.clone());
                out[i] = Some(vec);
            }
        }

        debug!(
            total = texts.len(),
            hits = hit_count,
            provider = self.inner.name(),
            "embedding batch resolved"
        );
        Ok(out.into_iter().map(Option::unwrap_or_default).collect())
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }
}
