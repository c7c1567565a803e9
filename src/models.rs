use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{
    validate_form_rating, validate_post_position, validate_speed_figure, RaceCardError,
};

/// Carried weight used when the program does not give a plausible one
pub const DEFAULT_WEIGHT: f64 = 55.0;

/// Neutral form placeholder for horses without a readable history
pub const DEFAULT_FINISHES: [u32; 3] = [5, 5, 5];

/// Horse entry parsed from a race program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entrant {
    pub name: String,
    pub post_position: u32,
    pub weight: f64,
    /// Finishing positions of past starts, most recent last
    pub recent_finishes: Vec<u32>,
    /// Speed figure when known (manual entry); extracted horses leave it unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_rating: Option<f64>,
}

impl Entrant {
    pub fn new(name: impl Into<String>, post_position: u32) -> Self {
        Self {
            name: name.into(),
            post_position,
            weight: DEFAULT_WEIGHT,
            recent_finishes: DEFAULT_FINISHES.to_vec(),
            speed_rating: None,
        }
    }

    /// Average recent finishing position (neutral 5.0 when there is no history)
    pub fn average_finish(&self) -> f64 {
        if self.recent_finishes.is_empty() {
            return 5.0;
        }
        let total: u32 = self.recent_finishes.iter().sum();
        total as f64 / self.recent_finishes.len() as f64
    }

    /// Recent form as printed in exports, e.g. `1-2-1`
    pub fn form_string(&self) -> String {
        self.recent_finishes
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Horse typed in by hand when extraction finds nothing usable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualEntry {
    pub name: String,
    /// Speed figure (50-120)
    pub speed_figure: f64,
    /// Recent form rating (1-10, higher is better)
    pub form_rating: u8,
    pub post_position: u32,
}

impl ManualEntry {
    /// Validate the entry against a field of `max_post` runners and convert
    /// it into an [`Entrant`]
    ///
    /// The form rating becomes a single synthetic finish, `11 - rating`,
    /// so a rating of 10 reads as a recent win.
    pub fn into_entrant(self, max_post: u32) -> Result<Entrant, RaceCardError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(RaceCardError::Validation(
                "Horse name must not be empty".to_string(),
            ));
        }
        validate_speed_figure(self.speed_figure)?;
        validate_form_rating(self.form_rating)?;
        validate_post_position(self.post_position, max_post)?;

        Ok(Entrant {
            name,
            post_position: self.post_position,
            weight: DEFAULT_WEIGHT,
            recent_finishes: vec![11 - u32::from(self.form_rating)],
            speed_rating: Some(self.speed_figure),
        })
    }
}

/// Going / surface of the race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackCondition {
    Fast,
    Good,
    Sloppy,
    Muddy,
    TurfFirm,
    TurfGood,
}

impl TrackCondition {
    pub const ALL: [TrackCondition; 6] = [
        TrackCondition::Fast,
        TrackCondition::Good,
        TrackCondition::Sloppy,
        TrackCondition::Muddy,
        TrackCondition::TurfFirm,
        TrackCondition::TurfGood,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackCondition::Fast => "fast",
            TrackCondition::Good => "good",
            TrackCondition::Sloppy => "sloppy",
            TrackCondition::Muddy => "muddy",
            TrackCondition::TurfFirm => "turf-firm",
            TrackCondition::TurfGood => "turf-good",
        }
    }
}

impl fmt::Display for TrackCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackCondition {
    type Err = RaceCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match key.as_str() {
            "fast" | "dirt" | "rapida" => Ok(TrackCondition::Fast),
            "good" | "buena" => Ok(TrackCondition::Good),
            "sloppy" | "wet" => Ok(TrackCondition::Sloppy),
            "muddy" | "heavy" | "pesada" => Ok(TrackCondition::Muddy),
            "turf-firm" | "firm" | "turf" => Ok(TrackCondition::TurfFirm),
            "turf-good" | "yielding" | "soft" => Ok(TrackCondition::TurfGood),
            _ => Err(RaceCardError::Validation(format!(
                "Unknown track condition: {}",
                s
            ))),
        }
    }
}

/// Race-level parameters supplied by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceContext {
    pub distance_furlongs: f64,
    pub track: TrackCondition,
    /// Overrides the entrant count when set (e.g. programs listing scratches)
    pub field_size: Option<usize>,
}

impl Default for RaceContext {
    fn default() -> Self {
        Self {
            distance_furlongs: 6.0,
            track: TrackCondition::Fast,
            field_size: None,
        }
    }
}

impl RaceContext {
    /// Field size used for scoring: the override, or the number of entrants
    pub fn effective_field_size(&self, entrant_count: usize) -> usize {
        self.field_size
            .filter(|&n| n > 0)
            .unwrap_or(entrant_count)
            .max(1)
    }
}

/// Ranked output for one horse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub rank: usize,
    pub name: String,
    pub post_position: u32,
    pub weight: f64,
    pub recent_finishes: Vec<u32>,
    pub score: f64,
    /// Percentage points; all predictions of a race sum to 100
    pub win_probability: f64,
    pub analysis: String,
}

impl Prediction {
    pub fn form_string(&self) -> String {
        self.recent_finishes
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join("-")
    }
}
