/// Data layer: core types, loading, filtering, summaries and export.
///
/// Architecture:
/// ```text
///  .csv / .xlsx / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bytes → Table   (memoized by content hash)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  range, then categorical selections → filtered Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  summary  │  target-column proportions, raw vs filtered
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  filtered Table → delimited text / xlsx bytes
///   └──────────┘
/// ```

pub mod cache;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod summary;
