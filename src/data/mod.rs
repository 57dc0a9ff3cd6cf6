/// Data layer: core types, loading, derivation and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → RawTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  derive  │  primary genre, title key, rating bounds → MovieTable
///   └──────────┘        (memoized per path by `cache`)
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  genre selection + rating range → row indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  genre histogram, title search, top-N popularity
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod derive;
pub mod filter;
pub mod loader;
pub mod model;
