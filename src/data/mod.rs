//! Data layer: core types, folder discovery, loading, and filtering.
//!
//! Architecture:
//! ```text
//!   data folder (*.txt)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  folder   │  file name → DayFile (date at chars 4..12)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  skip preamble, parse rows → TimeSeries
//!   └──────────┘
//!        │  uses
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  hour-of-day window → retained row indices
//!   └──────────┘
//! ```

pub mod filter;
pub mod folder;
pub mod loader;
pub mod model;
