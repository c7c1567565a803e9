//! Program text decoding and entrant extraction

pub mod decode;
pub mod names;
pub mod parser;
pub mod strategies;

// Re-export commonly used types
pub use decode::{DecodedText, TextDecoder};
pub use names::NameClassifier;
pub use parser::{Extraction, Extractor};
pub use strategies::{Candidate, ExtractionStrategy, LineRules};
