/// Data layer: table model, loading, and derived statistics.
///
/// Architecture:
/// ```text
///  upload bytes / default .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse CSV → Table (column types fixed here)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table   │  Vec<Column>, shared row count
///   └──────────┘
///        │
///        ├──────────────┐
///        ▼              ▼
///   ┌─────────┐   ┌─────────────┐
///   │  stats  │   │ correlation │  numeric columns only
///   └─────────┘   └─────────────┘
/// ```

pub mod correlation;
pub mod loader;
pub mod model;
pub mod stats;
