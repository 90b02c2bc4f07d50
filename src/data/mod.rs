/// Data layer: core types and loading.
///
/// Architecture:
/// ```text
///   closed/S001.csv  open/S001.csv ...
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  CSV column → Signal, folder → SubjectCollection
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ SubjectCollection │  Vec<Subject>, one per file
///   └──────────────────┘
///        │
///        ▼   (analysis::BandAggregator)
///   ┌────────────────┐
///   │ BandPowerTable  │  band name → mean power
///   └────────────────┘
/// ```

pub mod loader;
pub mod model;
