//! Weighted entrant scoring and ranking

use tracing::debug;

use crate::config::{ScorerConfig, ScoringProfile};
use crate::core::probability::{is_degenerate, win_probabilities};
use crate::models::{Entrant, Prediction, RaceContext};

/// Per-factor ratings, each on a 0-100 scale
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub speed: f64,
    pub form: f64,
    pub class: f64,
    pub post: f64,
    pub jockey: f64,
    pub trainer: f64,
    pub distance: f64,
}

/// Heuristic race scorer
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    config: ScorerConfig,
}

impl Scorer {
    pub fn new(config: ScorerConfig) -> Self {
        Self { config }
    }

    /// Scorer with the default tables and a named weight profile
    pub fn with_profile(profile: ScoringProfile) -> Self {
        Self::new(ScorerConfig::with_profile(profile))
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Rate each factor for one entrant
    pub fn components(
        &self,
        entrant: &Entrant,
        ctx: &RaceContext,
        field_size: usize,
    ) -> ScoreBreakdown {
        let cfg = &self.config;
        let weight_delta = entrant.weight - cfg.nominal_weight;

        let speed = entrant.speed_rating.unwrap_or(cfg.default_speed_rating)
            * cfg.track_multiplier(ctx.track);
        let form = ((10.0 - entrant.average_finish()) / 10.0).max(0.0) * 100.0;
        let class = clamp_rating(50.0 + weight_delta * 5.0);

        // a post beyond the field (e.g. after scratches) rates as the widest runner
        let post = entrant.post_position.min(field_size.max(1) as u32);
        let post = cfg.post_table.rating(post);

        let distance = clamp_rating(50.0 - weight_delta * 2.0 * ctx.distance_furlongs / 8.0);

        ScoreBreakdown {
            speed,
            form,
            class,
            post,
            jockey: cfg.neutral_rating,
            trainer: cfg.neutral_rating,
            distance,
        }
    }

    /// Weighted total for one entrant
    pub fn score(&self, entrant: &Entrant, ctx: &RaceContext, field_size: usize) -> f64 {
        let c = self.components(entrant, ctx, field_size);
        let w = &self.config.weights;

        c.speed * w.speed
            + c.form * w.form
            + c.class * w.class
            + c.post * w.post
            + c.jockey * w.jockey
            + c.trainer * w.trainer
            + c.distance * w.distance
    }

    /// Score, normalize and rank a field
    ///
    /// Entrants with equal scores keep their input order.
    pub fn predict(&self, entrants: &[Entrant], ctx: &RaceContext) -> Vec<Prediction> {
        if entrants.is_empty() {
            return Vec::new();
        }

        let field_size = ctx.effective_field_size(entrants.len());
        let scores: Vec<f64> = entrants
            .iter()
            .map(|e| self.score(e, ctx, field_size))
            .collect();

        if is_degenerate(&scores, self.config.baseline) {
            debug!(
                "No score above baseline {}, splitting probability equally",
                self.config.baseline
            );
        }
        let probabilities = win_probabilities(&scores, self.config.baseline);

        let mut ranked: Vec<(usize, f64)> = scores.iter().copied().enumerate().collect();
        // sort_by is stable, so ties stay in discovery order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        ranked
            .into_iter()
            .enumerate()
            .map(|(position, (idx, score))| {
                let entrant = &entrants[idx];
                Prediction {
                    rank: position + 1,
                    name: entrant.name.clone(),
                    post_position: entrant.post_position,
                    weight: entrant.weight,
                    recent_finishes: entrant.recent_finishes.clone(),
                    score,
                    win_probability: probabilities[idx],
                    analysis: self.analysis(entrant),
                }
            })
            .collect()
    }

    /// Short rationale, e.g. "Good post, strong form, light weight"
    pub fn analysis(&self, entrant: &Entrant) -> String {
        let t = &self.config.analysis;
        let mut notes = Vec::new();

        if entrant.post_position <= t.good_post_max {
            notes.push("good post");
        } else if entrant.post_position >= t.wide_post_min {
            notes.push("wide post");
        }

        let avg = entrant.average_finish();
        if avg <= t.strong_form_max {
            notes.push("strong form");
        } else if avg >= t.struggling_form_min {
            notes.push("struggling");
        } else {
            notes.push("steady form");
        }

        if entrant.weight <= t.light_weight_max {
            notes.push("light weight");
        } else if entrant.weight >= t.heavy_weight_min {
            notes.push("heavy weight");
        }

        capitalize_first(&notes.join(", "))
    }
}

fn clamp_rating(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
