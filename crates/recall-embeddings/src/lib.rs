//! # recall-embeddings
//!
//! Embedding oracle plumbing for the optimizer and the vector origin.
//! The oracle itself is external; this crate wraps it.
//!
//! ## Architecture
//!
//! ```text
//! CachedEmbeddings (moka L1, blake3 content keys)
//! └── DegradationChain (provider fallback, degradation events)
//!     ├── <injected provider>
//!     └── HashingEmbedder (always available)
//! ```

pub mod cache;
pub mod degradation;
pub mod providers;
pub mod similarity;

pub use cache::CachedEmbeddings;
pub use degradation::DegradationChain;
pub use providers::HashingEmbedder;
pub use similarity::cosine_similarity;
