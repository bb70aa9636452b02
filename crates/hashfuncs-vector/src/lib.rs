//! Vectorized hash dispatch over [`ColumnBatch`](hashfuncs_types::ColumnBatch)es.
//!
//! - [`byte_view`]: per-row byte extraction chosen by type tag.
//! - [`seed`]: per-row seed resolution and seed-column boundary checks.
//! - [`dispatch`]: the generic per-row loop, [`hash_batch`] and [`HashEngine`].
//! - [`output`]: empty / constant / dense output batches.
//! - [`config`]: [`DispatchConfig`].
//! - [`metrics`]: process-wide counters.

pub mod byte_view;
pub mod config;
pub mod dispatch;
pub mod metrics;
pub mod output;
pub mod seed;

pub use byte_view::{ByteViewResolver, Extraction, byte_view, extraction_for};
pub use config::DispatchConfig;
pub use dispatch::{HashEngine, hash_batch};
pub use metrics::{HashMetricsSnapshot, hash_metrics_snapshot, reset_hash_metrics};
pub use output::{DigestColumn, HashOutput, OutputBatch, Representation};
pub use seed::{SeedResolver, SeedSlot, check_seed_column};
