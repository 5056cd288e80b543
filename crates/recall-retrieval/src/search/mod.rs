pub mod hybrid_search;
pub mod request;
pub mod rrf_fusion;

pub use hybrid_search::{HybridSearcher, HybridSearcherBuilder};
pub use request::SearchRequest;
pub use rrf_fusion::{fuse, rrf_contribution, WeightedRanking};
