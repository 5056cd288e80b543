//! Deterministic hashed term-frequency provider.
//!
//! Terms are hashed into signed buckets (FNV-1a), weighted by sublinear term
//! frequency, and L2-normalized. No model, no I/O: always available, and the
//! same text always yields the same vector.

use std::collections::BTreeMap;

use recall_core::errors::RecallResult;
use recall_core::traits::IEmbeddingProvider;

pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn fnv1a(term: &str) -> u64 {
        let mut h: u64 = 0xcbf29ce484222325;
        for b in term.as_bytes() {
            h ^= *b as u64;
            h = h.wrapping_mul(0x100000001b3);
        }
        h
    }

    /// Lowercase alphanumeric terms of two or more characters.
    fn terms(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|s| s.chars().count() >= 2)
            .map(str::to_lowercase)
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for term in Self::terms(text) {
            *counts.entry(term).or_default() += 1;
        }

        let mut vec = vec![0.0f32; self.dimensions];
        for (term, count) in &counts {
            let h = Self::fnv1a(term);
            let bucket = (h % self.dimensions as u64) as usize;
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            vec[bucket] += sign * (1.0 + (*count as f32).ln());
        }

        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for v in &mut vec {
                *v /= norm;
            }
        }
        vec
    }
}

impl IEmbeddingProvider for HashingEmbedder {
    fn embed(&self, text: &str) -> RecallResult<Vec<f32>> {
        Ok(self.vector(text))
    }

    fn embed_batch(&self, texts: &[String]) -> RecallResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vector(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hashing"
    }

    fn is_available(&self) -> bool {
        true
    }
}
