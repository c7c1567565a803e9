//! Horse-name versus jockey-name heuristics
//!
//! Race programs print horse, jockey and trainer names side by side, so a
//! line scan easily picks up a rider instead of the horse. These rules reject
//! the common person-name shapes. They are best-effort: a short all-caps horse
//! name is rejected and a long unfamiliar surname is accepted.

use crate::config::NameRules;

#[derive(Debug, Clone)]
pub struct NameClassifier {
    max_upper_len: usize,
    max_short_token_len: usize,
    surnames: Vec<String>,
}

impl NameClassifier {
    pub fn new(rules: &NameRules) -> Self {
        Self {
            max_upper_len: rules.max_upper_len,
            max_short_token_len: rules.max_short_token_len,
            surnames: rules.surnames.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// True when the token sequence plausibly names a horse
    pub fn is_horse_name(&self, tokens: &[&str]) -> bool {
        let Some(last) = tokens.last() else {
            return false;
        };

        if let [only] = tokens {
            if is_all_upper(only) && only.chars().count() <= self.max_upper_len {
                return false;
            }
        }

        if let [first, second] = tokens {
            let short = |t: &str| t.chars().count() <= self.max_short_token_len;
            if is_capitalized(first)
                && is_capitalized(second)
                && short(*first)
                && short(*second)
            {
                return false;
            }
        }

        if is_all_lower(last) {
            return false;
        }

        let last = last.to_lowercase();
        !self.surnames.iter().any(|s| *s == last)
    }
}

impl Default for NameClassifier {
    fn default() -> Self {
        Self::new(&NameRules::default())
    }
}

fn letters(token: &str) -> impl Iterator<Item = char> + '_ {
    token.chars().filter(|c| c.is_alphabetic())
}

fn is_all_upper(token: &str) -> bool {
    letters(token).next().is_some() && letters(token).all(char::is_uppercase)
}

fn is_all_lower(token: &str) -> bool {
    letters(token).next().is_some() && letters(token).all(char::is_lowercase)
}

/// `Juan`, `Perez`: leading uppercase letter followed by lowercase only
fn is_capitalized(token: &str) -> bool {
    let mut chars = letters(token);
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            let mut rest = chars.peekable();
            rest.peek().is_some() && rest.all(char::is_lowercase)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> NameClassifier {
        NameClassifier::default()
    }

    #[test]
    fn test_rejects_short_uppercase_token() {
        assert!(!classifier().is_horse_name(&["PEREZ"]));
        assert!(!classifier().is_horse_name(&["CASTRO"]));
    }

    #[test]
    fn test_accepts_long_uppercase_token() {
        assert!(classifier().is_horse_name(&["MULTIVERSO"]));
    }

    #[test]
    fn test_rejects_firstname_lastname_shape() {
        assert!(!classifier().is_horse_name(&["Juan", "Cruz"]));
        assert!(!classifier().is_horse_name(&["Ana", "Mora"]));
    }

    #[test]
    fn test_accepts_two_tokens_when_one_is_long() {
        assert!(classifier().is_horse_name(&["Midnight", "Storm"]));
    }

    #[test]
    fn test_rejects_lowercase_last_token() {
        assert!(!classifier().is_horse_name(&["J.", "castro"]));
        assert!(!classifier().is_horse_name(&["value"]));
    }

    #[test]
    fn test_rejects_known_surname() {
        assert!(!classifier().is_horse_name(&["Jose", "Alberto", "Rodriguez"]));
        assert!(!classifier().is_horse_name(&["J.", "VELAZQUEZ"]));
        assert!(!classifier().is_horse_name(&["Castellano"]));
    }

    #[test]
    fn test_accepts_ordinary_horse_names() {
        assert!(classifier().is_horse_name(&["Thunderbolt"]));
        assert!(classifier().is_horse_name(&["EL", "GRAN", "CAPITAN"]));
        assert!(classifier().is_horse_name(&["Desert", "Comet", "Rising"]));
    }

    #[test]
    fn test_rejects_empty_sequence() {
        assert!(!classifier().is_horse_name(&[]));
    }

    #[test]
    fn test_custom_surname_list() {
        let rules = NameRules {
            surnames: vec!["Storm".to_string()],
            ..Default::default()
        };
        let classifier = NameClassifier::new(&rules);
        assert!(!classifier.is_horse_name(&["Midnight", "Storm"]));
        assert!(classifier.is_horse_name(&["Garcia", "Maravilla"]));
    }
}
