//! Data layer: core types, loading, and filtering.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Dataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Dataset  │  named numeric / categorical columns
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  apply row predicates → row indices → Dataset::take
//!   └──────────┘
//!        │
//!        ▼
//!   Dataset::select → Selection (fixed shape) → aggregate
//! ```

pub mod filter;
pub mod loader;
pub mod model;
