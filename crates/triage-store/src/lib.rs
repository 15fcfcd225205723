//! Seed import and results files: JSON Lines (always), Parquet (feature `parquet`).

mod error;
pub use error::StoreError;

mod seed;
pub use seed::{SeedRecord, parse_seed_jsonl, read_seed_jsonl};

#[cfg(feature = "parquet")]
mod columnar;
#[cfg(feature = "parquet")]
pub use columnar::read_seed_parquet;

mod results;
pub use results::{apply_prior_results, render_labelled, write_labelled};
