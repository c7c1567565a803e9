//! Entrant list held between user actions

use tracing::info;

use crate::config::ExtractorConfig;
use crate::data::decode::TextDecoder;
use crate::data::parser::Extractor;
use crate::error::RaceCardError;
use crate::models::{Entrant, ManualEntry, Prediction, RaceContext};
use crate::scorer::Scorer;

/// Current race card: loaded from a program or typed in by hand
#[derive(Debug, Clone)]
pub struct PredictionSession {
    entrants: Vec<Entrant>,
    /// Highest post a hand-entered horse may take
    max_post: u32,
}

impl Default for PredictionSession {
    fn default() -> Self {
        Self::for_config(&ExtractorConfig::default())
    }
}

impl PredictionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session whose manual entries share the extractor's field limit
    pub fn for_config(config: &ExtractorConfig) -> Self {
        Self {
            entrants: Vec::new(),
            max_post: config.max_entrants as u32,
        }
    }

    pub fn entrants(&self) -> &[Entrant] {
        &self.entrants
    }

    pub fn len(&self) -> usize {
        self.entrants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entrants.is_empty()
    }

    /// Swap in a new entrant list
    pub fn replace(&mut self, entrants: Vec<Entrant>) {
        self.entrants = entrants;
    }

    /// Extract entrants from program text, replacing the current list
    ///
    /// Returns the number of entrants now loaded.
    pub fn load_text(&mut self, extractor: &Extractor, text: &str) -> usize {
        self.replace(extractor.extract(text));
        info!("Session loaded {} entrants", self.entrants.len());
        self.entrants.len()
    }

    /// Decode raw program bytes, then extract as with [`load_text`](Self::load_text)
    ///
    /// On a decode error the current list is left untouched.
    pub fn load_bytes(
        &mut self,
        decoder: &TextDecoder,
        extractor: &Extractor,
        bytes: &[u8],
    ) -> Result<usize, RaceCardError> {
        let decoded = decoder.decode(bytes)?;
        Ok(self.load_text(extractor, &decoded.text))
    }

    /// Append a hand-entered horse
    pub fn add_manual(&mut self, entry: ManualEntry) -> Result<&Entrant, RaceCardError> {
        let entrant = entry.into_entrant(self.max_post)?;
        if self
            .entrants
            .iter()
            .any(|e| e.name.eq_ignore_ascii_case(&entrant.name))
        {
            return Err(RaceCardError::Validation(format!(
                "Horse {} is already entered",
                entrant.name
            )));
        }
        self.entrants.push(entrant);
        Ok(&self.entrants[self.entrants.len() - 1])
    }

    pub fn clear(&mut self) {
        self.entrants.clear();
    }

    pub fn predict(&self, scorer: &Scorer, ctx: &RaceContext) -> Vec<Prediction> {
        scorer.predict(&self.entrants, ctx)
    }
}
