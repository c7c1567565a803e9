//! Race program text parser
//!
//! Turns loosely structured program text into [`Entrant`] records. Several
//! line grammars are tried in a fixed order; the first one that reads a real
//! field (at least two horses) wins. Otherwise each line is read by the first
//! grammar that fits it, and by a permissive word scan when none does.
//!
//! # Example
//!
//! ```
//! use racecard::config::ExtractorConfig;
//! use racecard::data::parser::Extractor;
//!
//! let extractor = Extractor::new(ExtractorConfig::default());
//! let entrants = extractor.extract("1 Midnight Storm 55 1-2-1\n2 Coastal Comet 57 3-3-2\n");
//! assert_eq!(entrants.len(), 2);
//! assert_eq!(entrants[0].name, "Midnight Storm");
//! ```

use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::strategies::{
    Candidate, ExtractionStrategy, LineRules, NameFirstGrammar, PermissiveScan, PostFirstGrammar,
    VenezuelanGrammar,
};
use crate::config::ExtractorConfig;
use crate::models::Entrant;

/// Extraction output with diagnostics
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub entrants: Vec<Entrant>,
    /// Strategy that produced the entrants, `None` when nothing was found
    pub strategy: Option<&'static str>,
    /// Lines the committed strategy could not read (including too-short ones)
    pub skipped_lines: usize,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.entrants.is_empty()
    }
}

/// Flatten column separators, then trim
pub fn normalize_line(line: &str) -> String {
    line.chars()
        .map(|c| if c == '\t' || c == '|' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Program text extractor
pub struct Extractor {
    config: ExtractorConfig,
    rules: LineRules,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    fallback: Box<dyn ExtractionStrategy>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

impl Extractor {
    /// Extractor with the standard grammars: post-first, name-first, Venezuelan
    pub fn new(config: ExtractorConfig) -> Self {
        Self::with_strategies(
            config,
            vec![
                Box::new(PostFirstGrammar::new()),
                Box::new(NameFirstGrammar::new()),
                Box::new(VenezuelanGrammar::new()),
            ],
            Box::new(PermissiveScan),
        )
    }

    /// Extractor with a custom strategy order and fallback
    pub fn with_strategies(
        config: ExtractorConfig,
        strategies: Vec<Box<dyn ExtractionStrategy>>,
        fallback: Box<dyn ExtractionStrategy>,
    ) -> Self {
        let rules = LineRules::new(&config);
        Self {
            config,
            rules,
            strategies,
            fallback,
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract entrants; empty when no line looks like an entrant
    pub fn extract(&self, text: &str) -> Vec<Entrant> {
        self.extract_with_report(text).entrants
    }

    pub fn extract_with_report(&self, text: &str) -> Extraction {
        let lines: Vec<String> = text.lines().map(normalize_line).collect();

        for strategy in &self.strategies {
            let extraction = self.run(strategy.name(), &lines, |line| {
                strategy.parse_line(line, &self.rules)
            });
            if extraction.entrants.len() >= self.config.min_committed_entrants {
                info!(
                    "Extracted {} entrants with {} strategy",
                    extraction.entrants.len(),
                    strategy.name()
                );
                return extraction;
            }
            debug!(
                "{} strategy found {} entrants, trying next",
                strategy.name(),
                extraction.entrants.len()
            );
        }

        // no grammar reads a whole field: take each line with the first
        // grammar that fits it, the fallback otherwise
        let extraction = self.run(self.fallback.name(), &lines, |line| {
            self.strategies
                .iter()
                .find_map(|s| s.parse_line(line, &self.rules))
                .or_else(|| self.fallback.parse_line(line, &self.rules))
        });
        if extraction.is_empty() {
            warn!("No entrants found in {} lines of text", lines.len());
            return Extraction {
                entrants: Vec::new(),
                strategy: None,
                skipped_lines: extraction.skipped_lines,
            };
        }

        info!(
            "Extracted {} entrants with {} fallback",
            extraction.entrants.len(),
            self.fallback.name()
        );
        extraction
    }

    fn run<F>(&self, name: &'static str, lines: &[String], parse: F) -> Extraction
    where
        F: Fn(&str) -> Option<Candidate>,
    {
        let mut candidates = Vec::new();
        let mut skipped_lines = 0;

        for line in lines {
            if line.is_empty() {
                continue;
            }
            if line.chars().count() < self.config.min_line_length {
                skipped_lines += 1;
                continue;
            }
            match parse(line) {
                Some(candidate) => candidates.push(candidate),
                None => {
                    skipped_lines += 1;
                    debug!("{}: no entrant in line {:?}", name, line);
                }
            }
        }

        Extraction {
            entrants: self.assemble(candidates),
            strategy: Some(name),
            skipped_lines,
        }
    }

    /// Dedup names, cap the field, settle post positions and fill defaults
    fn assemble(&self, candidates: Vec<Candidate>) -> Vec<Entrant> {
        let mut seen = HashSet::new();
        let mut unique: Vec<Candidate> = candidates
            .into_iter()
            .filter(|c| seen.insert(c.name.to_lowercase()))
            .collect();
        unique.truncate(self.config.max_entrants);

        let max_post = self.config.max_entrants as u32;
        let mut used: HashSet<u32> = HashSet::new();
        let mut posts: Vec<Option<u32>> = unique
            .iter()
            .map(|c| {
                c.post
                    .filter(|p| (1..=max_post).contains(p))
                    .filter(|p| used.insert(*p))
            })
            .collect();

        for (idx, post) in posts.iter_mut().enumerate() {
            if post.is_some() {
                continue;
            }
            let preferred = idx as u32 + 1;
            let assigned = if used.contains(&preferred) {
                (1..).find(|p| !used.contains(p)).unwrap_or(preferred)
            } else {
                preferred
            };
            used.insert(assigned);
            *post = Some(assigned);
        }

        unique
            .into_iter()
            .zip(posts)
            .enumerate()
            .map(|(idx, (candidate, post))| Entrant {
                name: candidate.name,
                post_position: post.unwrap_or(idx as u32 + 1),
                weight: candidate.weight.unwrap_or(self.config.default_weight),
                recent_finishes: if candidate.finishes.is_empty() {
                    self.config.default_finishes.clone()
                } else {
                    candidate.finishes
                },
                speed_rating: None,
            })
            .collect()
    }
}
