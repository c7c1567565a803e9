//! Line grammars for race program text
//!
//! Each strategy turns one normalized line into at most one [`Candidate`].
//! The extractor runs them in priority order and keeps the first that finds
//! a real field.

use regex::Regex;
use std::collections::HashSet;

use super::names::NameClassifier;
use crate::config::ExtractorConfig;

/// Fields read from a single line, before defaults and dedup
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub name: String,
    pub post: Option<u32>,
    pub weight: Option<f64>,
    pub finishes: Vec<u32>,
}

/// A way of reading entrant lines
pub trait ExtractionStrategy {
    fn name(&self) -> &'static str;

    /// Parse one normalized, non-empty line; `None` when the line doesn't fit
    fn parse_line(&self, line: &str, rules: &LineRules) -> Option<Candidate>;
}

/// Plausibility checks shared by every strategy
#[derive(Debug, Clone)]
pub struct LineRules {
    classifier: NameClassifier,
    stopwords: HashSet<String>,
    form_pattern: Regex,
    name_min_len: usize,
    name_max_len: usize,
    min_weight: f64,
    max_weight: f64,
    max_finish: u32,
    max_recent_finishes: usize,
    max_post: u32,
}

impl LineRules {
    pub fn new(config: &ExtractorConfig) -> Self {
        Self {
            classifier: NameClassifier::new(&config.names),
            stopwords: config.stopwords.iter().map(|s| s.to_lowercase()).collect(),
            form_pattern: Regex::new(r"(?:^|\s)(\d{1,2}(?:[-;,/]\d{1,2})+)(?:\s|$)")
                .expect("form pattern is valid"),
            name_min_len: config.name_min_len,
            name_max_len: config.name_max_len,
            min_weight: config.min_weight,
            max_weight: config.max_weight,
            max_finish: config.max_finish,
            max_recent_finishes: config.max_recent_finishes,
            max_post: config.max_entrants as u32,
        }
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(&token.to_lowercase())
    }

    /// Validate a captured name and return it with whitespace collapsed
    pub fn accept_name(&self, raw: &str) -> Option<String> {
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        if tokens.is_empty() {
            return None;
        }

        let letters = tokens
            .iter()
            .flat_map(|t| t.chars())
            .filter(|c| c.is_alphabetic())
            .count();
        if letters < self.name_min_len {
            return None;
        }
        if tokens
            .iter()
            .any(|t| t.chars().count() > self.name_max_len || self.is_stopword(t))
        {
            return None;
        }
        if !self.classifier.is_horse_name(&tokens) {
            return None;
        }

        Some(tokens.join(" "))
    }

    /// Plain name token for the permissive scan: letters only, length-bounded
    pub fn accept_name_token(&self, token: &str) -> bool {
        let len = token.chars().count();
        (self.name_min_len..=self.name_max_len).contains(&len)
            && token.chars().all(char::is_alphabetic)
            && !self.is_stopword(token)
            && self.classifier.is_horse_name(&[token])
    }

    pub fn plausible_weight(&self, weight: f64) -> Option<f64> {
        (self.min_weight..=self.max_weight)
            .contains(&weight)
            .then_some(weight)
    }

    /// A finishing position: a whole number in 1..=max_finish
    pub fn finish(&self, value: f64) -> Option<u32> {
        if value.fract() != 0.0 || value < 1.0 || value > f64::from(self.max_finish) {
            return None;
        }
        Some(value as u32)
    }

    /// Recent finishes from the remainder of a line
    ///
    /// A composite token such as `1-2-1`, `1;2;1` or `1/2/1` wins; the last
    /// `max_recent_finishes` of it are kept. Otherwise the first standalone
    /// integers are used.
    pub fn form_from_rest(&self, rest: &str) -> Vec<u32> {
        if let Some(caps) = self.form_pattern.captures(rest) {
            let finishes: Vec<u32> = caps[1]
                .split(['-', ';', ',', '/'])
                .filter_map(|part| part.parse::<f64>().ok())
                .filter_map(|v| self.finish(v))
                .collect();
            let skip = finishes.len().saturating_sub(self.max_recent_finishes);
            return finishes[skip..].to_vec();
        }

        rest.split_whitespace()
            .filter_map(parse_number)
            .take(self.max_recent_finishes)
            .filter_map(|v| self.finish(v))
            .collect()
    }
}

/// Parse a numeric token; a decimal comma is accepted
pub fn parse_number(token: &str) -> Option<f64> {
    let value: f64 = token.replace(',', ".").parse().ok()?;
    value.is_finite().then_some(value)
}

const WORD: &str = r"[A-Za-zÀ-ÖØ-öø-ÿ][A-Za-zÀ-ÖØ-öø-ÿ'’.\-]*";
const UPPER_WORD: &str = r"[A-ZÀ-ÖØ-Þ][A-ZÀ-ÖØ-Þ'.\-]*";
const WEIGHT: &str = r"(?P<weight>\d{1,3}(?:[.,]\d+)?)(?:\s*(?i:kg|lbs?))?";

fn name_group(word: &str) -> String {
    format!(r"(?P<name>{word}(?:\s+{word})*?)")
}

/// Build a candidate from a grammar match
fn candidate_from(caps: &regex::Captures<'_>, rules: &LineRules) -> Option<Candidate> {
    let name = rules.accept_name(caps.name("name")?.as_str())?;
    // a post number outside the field means the grammar misread the line
    let post = match caps.name("post") {
        Some(m) => Some(
            m.as_str()
                .parse::<u32>()
                .ok()
                .filter(|p| (1..=rules.max_post).contains(p))?,
        ),
        None => None,
    };
    let weight = caps
        .name("weight")
        .and_then(|m| parse_number(m.as_str()))
        .and_then(|w| rules.plausible_weight(w));
    let rest = caps.name("rest").map_or("", |m| m.as_str());

    Some(Candidate {
        name,
        post,
        weight,
        finishes: rules.form_from_rest(rest),
    })
}

/// `3 Midnight Storm 55 J. Perez 1-2-1`
pub struct PostFirstGrammar {
    pattern: Regex,
}

impl Default for PostFirstGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl PostFirstGrammar {
    pub fn new() -> Self {
        let pattern = format!(
            r"^(?P<post>\d{{1,2}})[.):\-]?\s+{}\s+{}(?P<rest>\s.*)?$",
            name_group(WORD),
            WEIGHT
        );
        Self {
            pattern: Regex::new(&pattern).expect("post-first pattern is valid"),
        }
    }
}

impl ExtractionStrategy for PostFirstGrammar {
    fn name(&self) -> &'static str {
        "post-first"
    }

    fn parse_line(&self, line: &str, rules: &LineRules) -> Option<Candidate> {
        let caps = self.pattern.captures(line)?;
        candidate_from(&caps, rules)
    }
}

/// `MULTIVERSO 8 55 1;2;1`
pub struct NameFirstGrammar {
    pattern: Regex,
}

impl Default for NameFirstGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl NameFirstGrammar {
    pub fn new() -> Self {
        let pattern = format!(
            r"^{}\s+(?P<post>\d{{1,2}})\s+{}(?P<rest>\s.*)?$",
            name_group(WORD),
            WEIGHT
        );
        Self {
            pattern: Regex::new(&pattern).expect("name-first pattern is valid"),
        }
    }
}

impl ExtractionStrategy for NameFirstGrammar {
    fn name(&self) -> &'static str {
        "name-first"
    }

    fn parse_line(&self, line: &str, rules: &LineRules) -> Option<Candidate> {
        let caps = self.pattern.captures(line)?;
        candidate_from(&caps, rules)
    }
}

/// Venezuelan program rows: `3 PEÑA BRAVA (VEN) 54,5 kg J. RIVAS 2-1-4`
pub struct VenezuelanGrammar {
    pattern: Regex,
}

impl Default for VenezuelanGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl VenezuelanGrammar {
    pub fn new() -> Self {
        let pattern = format!(
            r"^(?P<post>\d{{1,2}})[.):\-]?\s+{}\s*\([A-Z]{{2,3}}\)\s*(?P<weight>\d{{2}}(?:[.,]\d)?)(?:\s*(?i:kg))?(?P<rest>\s.*)?$",
            name_group(UPPER_WORD)
        );
        Self {
            pattern: Regex::new(&pattern).expect("venezuelan pattern is valid"),
        }
    }
}

impl ExtractionStrategy for VenezuelanGrammar {
    fn name(&self) -> &'static str {
        "venezuelan"
    }

    fn parse_line(&self, line: &str, rules: &LineRules) -> Option<Candidate> {
        let caps = self.pattern.captures(line)?;
        candidate_from(&caps, rules)
    }
}

/// Last resort: first plausible run of words is the name, the first number
/// is the weight and form is read from what follows it
#[derive(Debug, Default)]
pub struct PermissiveScan;

impl PermissiveScan {
    /// Extend an accepted name token over the plain words right after it
    fn name_from(tokens: &[&str], start: usize, rules: &LineRules) -> String {
        let mut end = start + 1;
        while end < tokens.len()
            && tokens[end].chars().all(char::is_alphabetic)
            && rules.accept_name(&tokens[start..=end].join(" ")).is_some()
        {
            end += 1;
        }
        tokens[start..end].join(" ")
    }
}

impl ExtractionStrategy for PermissiveScan {
    fn name(&self) -> &'static str {
        "permissive"
    }

    fn parse_line(&self, line: &str, rules: &LineRules) -> Option<Candidate> {
        let tokens: Vec<&str> = line.split_whitespace().collect();

        let name_idx = tokens
            .iter()
            .position(|t| parse_number(t).is_none() && rules.accept_name_token(t))?;
        let name = Self::name_from(&tokens, name_idx, rules);

        let weight_idx = tokens.iter().position(|t| parse_number(t).is_some())?;
        let weight = parse_number(tokens[weight_idx]).and_then(|w| rules.plausible_weight(w));
        let rest = tokens[weight_idx + 1..].join(" ");

        Some(Candidate {
            name,
            post: None,
            weight,
            finishes: rules.form_from_rest(&rest),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> LineRules {
        LineRules::new(&ExtractorConfig::default())
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("55"), Some(55.0));
        assert_eq!(parse_number("54,5"), Some(54.5));
        assert_eq!(parse_number("1;2;1"), None);
        assert_eq!(parse_number("12abc"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_form_from_rest_composite() {
        let rules = rules();
        assert_eq!(rules.form_from_rest(" 1;2;1"), vec![1, 2, 1]);
        assert_eq!(rules.form_from_rest(" J. Perez 3-1-2"), vec![3, 1, 2]);
        assert_eq!(rules.form_from_rest(" 4/2/6 58"), vec![4, 2, 6]);
        // most recent three of a longer history
        assert_eq!(rules.form_from_rest(" 9-8-7-2-1"), vec![7, 2, 1]);
        // out-of-range finishes are dropped
        assert_eq!(rules.form_from_rest(" 1-25-3"), vec![1, 3]);
    }

    #[test]
    fn test_form_from_rest_standalone() {
        let rules = rules();
        assert_eq!(rules.form_from_rest(" 4 2 6 9"), vec![4, 2, 6]);
        assert_eq!(rules.form_from_rest(" 4 30 2"), vec![4, 2]);
        assert!(rules.form_from_rest("").is_empty());
        assert!(rules.form_from_rest(" Perez").is_empty());
    }

    #[test]
    fn test_accept_name() {
        let rules = rules();
        assert_eq!(
            rules.accept_name("Midnight   Storm").as_deref(),
            Some("Midnight Storm")
        );
        assert_eq!(rules.accept_name("PEREZ"), None);
        assert_eq!(rules.accept_name("Juan Cruz"), None);
        assert_eq!(rules.accept_name("Horse"), None);
        assert_eq!(rules.accept_name("Al"), None);
    }

    #[test]
    fn test_post_first_grammar() {
        let grammar = PostFirstGrammar::new();
        let candidate = grammar
            .parse_line("3 Midnight Storm 55 J. Perez 1-2-1", &rules())
            .unwrap();
        assert_eq!(candidate.name, "Midnight Storm");
        assert_eq!(candidate.post, Some(3));
        assert_eq!(candidate.weight, Some(55.0));
        assert_eq!(candidate.finishes, vec![1, 2, 1]);
    }

    #[test]
    fn test_post_first_grammar_variants() {
        let grammar = PostFirstGrammar::new();
        let rules = rules();

        let candidate = grammar.parse_line("12. Thunderbolt 56kg", &rules).unwrap();
        assert_eq!(candidate.post, Some(12));
        assert_eq!(candidate.weight, Some(56.0));
        assert!(candidate.finishes.is_empty());

        // implausible weight (pounds) is dropped, not fatal
        let candidate = grammar.parse_line("1 Coastal Comet 122 4 2 1", &rules).unwrap();
        assert_eq!(candidate.weight, None);
        assert_eq!(candidate.finishes, vec![4, 2, 1]);

        assert!(grammar.parse_line("MULTIVERSO 8 55 1;2;1", &rules).is_none());
        assert!(grammar.parse_line("1 Juan Cruz 55", &rules).is_none());
    }

    #[test]
    fn test_name_first_grammar() {
        let grammar = NameFirstGrammar::new();
        let candidate = grammar
            .parse_line("MULTIVERSO 8 55 1;2;1", &rules())
            .unwrap();
        assert_eq!(candidate.name, "MULTIVERSO");
        assert_eq!(candidate.post, Some(8));
        assert_eq!(candidate.weight, Some(55.0));
        assert_eq!(candidate.finishes, vec![1, 2, 1]);

        assert!(grammar.parse_line("8 MULTIVERSO 55", &rules()).is_none());
    }

    #[test]
    fn test_venezuelan_grammar() {
        let grammar = VenezuelanGrammar::new();
        let candidate = grammar
            .parse_line("3 PEÑA BRAVA (VEN) 54,5 kg J. RIVAS 2-1-4", &rules())
            .unwrap();
        assert_eq!(candidate.name, "PEÑA BRAVA");
        assert_eq!(candidate.post, Some(3));
        assert_eq!(candidate.weight, Some(54.5));
        assert_eq!(candidate.finishes, vec![2, 1, 4]);

        assert!(grammar.parse_line("3 Peña Brava 54", &rules()).is_none());
    }

    #[test]
    fn test_permissive_scan() {
        let scan = PermissiveScan;
        let rules = rules();

        let candidate = scan.parse_line("Thunderbolt 56 2 1 4 3", &rules).unwrap();
        assert_eq!(candidate.name, "Thunderbolt");
        assert_eq!(candidate.post, None);
        assert_eq!(candidate.weight, Some(56.0));
        assert_eq!(candidate.finishes, vec![2, 1, 4]);

        // first number out of weight range falls back to default later
        let candidate = scan.parse_line("obj Silverado 3 30 2", &rules).unwrap();
        assert_eq!(candidate.name, "Silverado");
        assert_eq!(candidate.weight, None);
        assert_eq!(candidate.finishes, vec![2]);
    }

    #[test]
    fn test_permissive_scan_requires_name_and_number() {
        let scan = PermissiveScan;
        let rules = rules();
        assert!(scan.parse_line("Thunderbolt Express", &rules).is_none());
        assert!(scan.parse_line("12 55 1;2;1", &rules).is_none());
        // malformed tokens are ignored rather than failing the line
        assert!(scan.parse_line("PEREZ 12abc", &rules).is_none());
        let candidate = scan.parse_line("Silverado 12abc 57", &rules).unwrap();
        assert_eq!(candidate.weight, Some(57.0));
    }

    #[test]
    fn test_permissive_scan_keeps_multi_word_names_and_composite_form() {
        let scan = PermissiveScan;
        let rules = rules();

        let candidate = scan.parse_line("Coastal Comet 57 3-3-2", &rules).unwrap();
        assert_eq!(candidate.name, "Coastal Comet");
        assert_eq!(candidate.weight, Some(57.0));
        assert_eq!(candidate.finishes, vec![3, 3, 2]);

        // the name stops before a rider's surname
        let candidate = scan
            .parse_line("Midnight Storm Perez 55 1;2;1", &rules)
            .unwrap();
        assert_eq!(candidate.name, "Midnight Storm");
        assert_eq!(candidate.finishes, vec![1, 2, 1]);
    }
}
