// Single source of truth for all default values.

// --- Retrieval ---
pub const DEFAULT_RRF_K: u32 = 60;
pub const DEFAULT_SEARCH_LIMIT: usize = 20;
pub const DEFAULT_OVER_FETCH_FACTOR: usize = 3;
pub const DEFAULT_ORIGIN_TIMEOUT_MS: u64 = 2_000;
pub const DEFAULT_SEARCH_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_MAX_CONCURRENT_ORIGINS: usize = 4;
pub const DEFAULT_ORIGIN_WEIGHT: f64 = 1.0;

// --- Optimizer ---
pub const DEFAULT_MAX_TOTAL_TOKENS: usize = 4_000;
pub const DEFAULT_MAX_PER_SOURCE: usize = 10;
pub const DEFAULT_ITEM_DUP_THRESHOLD: f64 = 0.85;
pub const DEFAULT_CLAUSE_DUP_THRESHOLD: f64 = 0.88;
pub const DEFAULT_ENTROPY_THRESHOLD: f64 = 0.3;
pub const DEFAULT_MIN_LENGTH: usize = 10;
pub const DEFAULT_RELEVANCE_THRESHOLD: f64 = 0.65;
pub const DEFAULT_MAX_ITERATIONS: usize = 3;
pub const DEFAULT_MIN_RETENTION: usize = 3;
pub const DEFAULT_CHARS_PER_TOKEN: usize = 4;
pub const DEFAULT_MIN_USEFUL_TOKENS: usize = 100;
pub const DEFAULT_MAX_COMPRESSED_CLAUSES: usize = 5;
pub const DEFAULT_MIN_COMPRESSION_SAVINGS: f64 = 0.10;

// --- Embeddings ---
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 384;
pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 64;
pub const DEFAULT_L1_CACHE_SIZE: u64 = 10_000;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = true;
pub const DEFAULT_QUERY_LOG_CAPACITY: usize = 10_000;
