//! Racecard - horse racing program extraction and scoring
//!
//! This library provides:
//! - Byte decoding with an encoding fallback chain
//! - Entrant extraction from loosely formatted program text
//! - Weighted heuristic scoring with win probabilities summing to 100
//! - CSV export of ranked predictions
//!
//! # Example
//!
//! ```
//! use racecard::{Extractor, RaceContext, Scorer};
//!
//! let text = "1 Midnight Storm 55 1-2-1\n2 Coastal Comet 57 3-3-2\n3 Thunderbolt 56 6-4-5\n";
//! let entrants = Extractor::default().extract(text);
//!
//! let predictions = Scorer::default().predict(&entrants, &RaceContext::default());
//! assert_eq!(predictions[0].name, "Midnight Storm");
//!
//! let total: f64 = predictions.iter().map(|p| p.win_probability).sum();
//! assert!((total - 100.0).abs() < 1e-6);
//! ```

pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod export;
pub mod models;
pub mod scorer;
pub mod session;

// Re-export commonly used types
pub use config::{Config, ScorerConfig, ScoringProfile};
pub use data::{Extraction, Extractor, TextDecoder};
pub use error::RaceCardError;
pub use export::{save_csv, to_csv, write_csv};
pub use models::{Entrant, ManualEntry, Prediction, RaceContext, TrackCondition};
pub use scorer::Scorer;
pub use session::PredictionSession;
