//! Tunable tables for decoding, extraction and scoring
//!
//! Every heuristic table lives here and is handed to the decoder, extractor
//! and scorer at construction time. A JSON file may override any subset of
//! fields; missing fields keep their defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::RaceCardError;
use crate::models::{TrackCondition, DEFAULT_FINISHES, DEFAULT_WEIGHT};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub decode: DecodeConfig,
    pub extractor: ExtractorConfig,
    pub scorer: ScorerConfig,
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RaceCardError> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RaceCardError> {
        if self.decode.encodings.is_empty() {
            return Err(RaceCardError::Config(
                "at least one encoding is required".to_string(),
            ));
        }
        if self.extractor.max_entrants == 0 {
            return Err(RaceCardError::Config(
                "max_entrants must be positive".to_string(),
            ));
        }
        if self.extractor.min_weight > self.extractor.max_weight {
            return Err(RaceCardError::Config(format!(
                "weight range is empty: {}..{}",
                self.extractor.min_weight, self.extractor.max_weight
            )));
        }
        if self.scorer.post_table.is_empty() {
            return Err(RaceCardError::Config(
                "post table must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Text decoding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Encoding labels tried in order
    pub encodings: Vec<String>,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        Self {
            encodings: vec![
                "utf-8".to_string(),
                "windows-1252".to_string(),
                "iso-8859-1".to_string(),
            ],
        }
    }
}

/// Jockey/handler name rejection rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NameRules {
    /// Single all-uppercase tokens up to this length read as surnames
    pub max_upper_len: usize,
    /// Two capitalized tokens both up to this length read as "First Last"
    pub max_short_token_len: usize,
    /// Family names that mark a token sequence as a person
    pub surnames: Vec<String>,
}

impl Default for NameRules {
    fn default() -> Self {
        let surnames = [
            "Perez", "Rodriguez", "Gonzalez", "Garcia", "Hernandez", "Martinez", "Lopez",
            "Sanchez", "Ramirez", "Torres", "Flores", "Diaz", "Castillo", "Morales", "Ortiz",
            "Rosario", "Velazquez", "Castellano", "Saez", "Prat", "Gaffalione", "Smith",
            "Johnson", "Lezcano", "Ortega", "Silva", "Mendoza", "Rivas",
        ];
        Self {
            max_upper_len: 8,
            max_short_token_len: 6,
            surnames: surnames.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Line extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Lines shorter than this (in characters, after trimming) are skipped
    pub min_line_length: usize,
    pub max_entrants: usize,
    /// A strategy is committed to once it yields this many entrants
    pub min_committed_entrants: usize,
    pub name_min_len: usize,
    pub name_max_len: usize,
    pub min_weight: f64,
    pub max_weight: f64,
    pub default_weight: f64,
    pub max_finish: u32,
    pub max_recent_finishes: usize,
    pub default_finishes: Vec<u32>,
    /// Tokens never taken as a horse name (case-insensitive)
    pub stopwords: Vec<String>,
    pub names: NameRules,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        let stopwords = [
            // PDF object leakage
            "obj", "endobj", "stream", "endstream", "xref", "trailer", "startxref",
            "flatedecode", "filter", "length", "type", "page", "pages", "font", "catalog",
            "parent", "resources", "mediabox", "contents", "procset", "encoding", "basefont",
            "subtype", "width", "height", "null", "true", "false", "pdf",
            // column headings
            "horse", "name", "post", "weight", "jockey", "trainer", "odds", "race", "form",
            "ejemplar", "jinete", "peso", "entrenador", "carrera", "kg", "lbs",
        ];
        Self {
            min_line_length: 6,
            max_entrants: 20,
            min_committed_entrants: 2,
            name_min_len: 3,
            name_max_len: 20,
            min_weight: 10.0,
            max_weight: 70.0,
            default_weight: DEFAULT_WEIGHT,
            max_finish: 20,
            max_recent_finishes: 3,
            default_finishes: DEFAULT_FINISHES.to_vec(),
            stopwords: stopwords.iter().map(|s| s.to_string()).collect(),
            names: NameRules::default(),
        }
    }
}

/// Named weight sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringProfile {
    /// Seven factors expressed as shares of the total
    Weighted,
    /// Speed, form and post only
    Simple,
}

/// Component weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub speed: f64,
    pub form: f64,
    pub class: f64,
    pub post: f64,
    pub jockey: f64,
    pub trainer: f64,
    pub distance: f64,
}

impl ScoreWeights {
    pub fn weighted() -> Self {
        Self {
            speed: 0.30,
            form: 0.25,
            class: 0.15,
            post: 0.10,
            jockey: 0.10,
            trainer: 0.08,
            distance: 0.02,
        }
    }

    pub fn simple() -> Self {
        Self {
            speed: 0.5,
            form: 0.4,
            class: 0.0,
            post: 0.1,
            jockey: 0.0,
            trainer: 0.0,
            distance: 0.0,
        }
    }

    pub fn for_profile(profile: ScoringProfile) -> Self {
        match profile {
            ScoringProfile::Weighted => Self::weighted(),
            ScoringProfile::Simple => Self::simple(),
        }
    }

    pub fn total(&self) -> f64 {
        self.speed + self.form + self.class + self.post + self.jockey + self.trainer + self.distance
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::weighted()
    }
}

/// Post position ratings (0-100), index 0 is post 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostTable(Vec<f64>);

impl PostTable {
    pub fn new(ratings: Vec<f64>) -> Self {
        Self(ratings)
    }

    /// Rating for a post; posts past the end of the table use the last entry
    pub fn rating(&self, post: u32) -> f64 {
        let idx = (post.max(1) - 1) as usize;
        self.0
            .get(idx)
            .or_else(|| self.0.last())
            .copied()
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for PostTable {
    /// Inside posts favoured, 4-8 neutral, -5 per post beyond 8 up to post 20
    fn default() -> Self {
        let mut ratings = vec![100.0, 95.0, 90.0];
        ratings.extend(std::iter::repeat(85.0).take(5));
        ratings.extend((9..=20).map(|post| 85.0 - 5.0 * (post - 8) as f64));
        Self(ratings)
    }
}

/// Cut-offs for the descriptive analysis text
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisThresholds {
    pub good_post_max: u32,
    pub wide_post_min: u32,
    pub strong_form_max: f64,
    pub struggling_form_min: f64,
    pub light_weight_max: f64,
    pub heavy_weight_min: f64,
}

impl Default for AnalysisThresholds {
    fn default() -> Self {
        Self {
            good_post_max: 3,
            wide_post_min: 9,
            strong_form_max: 3.0,
            struggling_form_min: 7.0,
            light_weight_max: 52.0,
            heavy_weight_min: 58.0,
        }
    }
}

/// Scoring settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    pub weights: ScoreWeights,
    /// Speed rating for horses without one
    pub default_speed_rating: f64,
    /// Rating for factors the program does not expose (jockey, trainer)
    pub neutral_rating: f64,
    pub nominal_weight: f64,
    /// Offset subtracted from scores before normalizing to win probabilities
    pub baseline: f64,
    pub post_table: PostTable,
    pub track_multipliers: BTreeMap<TrackCondition, f64>,
    pub analysis: AnalysisThresholds,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        let track_multipliers = BTreeMap::from([
            (TrackCondition::Fast, 1.0),
            (TrackCondition::Good, 0.98),
            (TrackCondition::Sloppy, 0.94),
            (TrackCondition::Muddy, 0.92),
            (TrackCondition::TurfFirm, 1.0),
            (TrackCondition::TurfGood, 0.97),
        ]);
        Self {
            weights: ScoreWeights::weighted(),
            default_speed_rating: 75.0,
            neutral_rating: 50.0,
            nominal_weight: DEFAULT_WEIGHT,
            baseline: 50.0,
            post_table: PostTable::default(),
            track_multipliers,
            analysis: AnalysisThresholds::default(),
        }
    }
}

impl ScorerConfig {
    pub fn with_profile(profile: ScoringProfile) -> Self {
        Self {
            weights: ScoreWeights::for_profile(profile),
            ..Default::default()
        }
    }

    pub fn track_multiplier(&self, track: TrackCondition) -> f64 {
        self.track_multipliers.get(&track).copied().unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_weights_sum_to_one() {
        assert!((ScoreWeights::weighted().total() - 1.0).abs() < 1e-9);
        assert!((ScoreWeights::simple().total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_post_table_shape() {
        let table = PostTable::default();
        assert_eq!(table.len(), 20);
        assert_eq!(table.rating(1), 100.0);
        assert_eq!(table.rating(3), 90.0);
        assert_eq!(table.rating(4), 85.0);
        assert_eq!(table.rating(8), 85.0);
        assert_eq!(table.rating(9), 80.0);
        assert_eq!(table.rating(20), 25.0);
        // beyond the table and post 0 are clamped
        assert_eq!(table.rating(24), 25.0);
        assert_eq!(table.rating(0), 100.0);
    }

    #[test]
    fn test_post_table_monotonic() {
        let table = PostTable::default();
        for post in 1..20 {
            assert!(table.rating(post) >= table.rating(post + 1));
        }
    }

    #[test]
    fn test_track_multiplier_fallback() {
        let mut config = ScorerConfig::default();
        assert_eq!(config.track_multiplier(TrackCondition::Fast), 1.0);
        config.track_multipliers.remove(&TrackCondition::Muddy);
        assert_eq!(config.track_multiplier(TrackCondition::Muddy), 1.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "scorer": { "baseline": 70.0, "post_table": [90, 80] } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.scorer.baseline, 70.0);
        assert_eq!(config.scorer.post_table.rating(5), 80.0);
        assert_eq!(config.scorer.weights, ScoreWeights::weighted());
        assert_eq!(config.extractor.max_entrants, 20);
        assert_eq!(config.decode.encodings.len(), 3);
    }

    #[test]
    fn test_track_multipliers_from_json() {
        let json = r#"{ "track_multipliers": { "muddy": 0.8, "turf-good": 0.9 } }"#;
        let config: ScorerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.track_multiplier(TrackCondition::Muddy), 0.8);
        assert_eq!(config.track_multiplier(TrackCondition::TurfGood), 0.9);
        assert_eq!(config.track_multiplier(TrackCondition::Fast), 1.0);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "extractor": {{ "max_entrants": 8 }} }}"#).unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.extractor.max_entrants, 8);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "decode": {{ "encodings": [] }} }}"#).unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(RaceCardError::Config(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(RaceCardError::ConfigParse(_))
        ));
    }
}
