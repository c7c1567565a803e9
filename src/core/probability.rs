//! Win probability normalization
//!
//! Scores are turned into percentages by their margin over a baseline:
//!     p_i = max(0, s_i - baseline) / sum_j max(0, s_j - baseline) * 100
//!
//! Results are rounded to one decimal with the largest-remainder method, so
//! a race always sums to exactly 100.0. When no horse clears the baseline
//! every horse gets an equal share.

/// Percentage points are distributed in tenths
const TENTHS: u64 = 1000;

/// Convert scores to win probabilities (percent, one decimal)
///
/// # Examples
/// ```
/// use racecard::core::probability::win_probabilities;
/// let probs = win_probabilities(&[90.0, 80.0, 70.0], 70.0);
/// assert_eq!(probs, vec![66.7, 33.3, 0.0]);
/// ```
pub fn win_probabilities(scores: &[f64], baseline: f64) -> Vec<f64> {
    if scores.is_empty() {
        return Vec::new();
    }

    let offsets: Vec<f64> = scores
        .iter()
        .map(|&s| {
            let offset = s - baseline;
            if offset.is_finite() && offset > 0.0 {
                offset
            } else {
                0.0
            }
        })
        .collect();
    let total: f64 = offsets.iter().sum();

    let shares: Vec<f64> = if total > 0.0 {
        offsets.iter().map(|o| o / total).collect()
    } else {
        vec![1.0 / scores.len() as f64; scores.len()]
    };

    round_to_tenths(&shares)
        .into_iter()
        .map(|t| t as f64 / 10.0)
        .collect()
}

/// True when no score clears the baseline and the equal split applies
pub fn is_degenerate(scores: &[f64], baseline: f64) -> bool {
    !scores.iter().any(|&s| (s - baseline).is_finite() && s > baseline)
}

/// Largest-remainder apportionment of `TENTHS` by share
fn round_to_tenths(shares: &[f64]) -> Vec<u64> {
    let exact: Vec<f64> = shares.iter().map(|s| s * TENTHS as f64).collect();
    let mut tenths: Vec<u64> = exact.iter().map(|e| e.floor() as u64).collect();

    let assigned: u64 = tenths.iter().sum();
    let mut leftover = TENTHS.saturating_sub(assigned) as usize;

    // biggest fractional part first, ties to the earlier horse
    let mut order: Vec<usize> = (0..exact.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = exact[a] - exact[a].floor();
        let fb = exact[b] - exact[b].floor();
        fb.total_cmp(&fa).then(a.cmp(&b))
    });

    for idx in order.into_iter().cycle() {
        if leftover == 0 {
            break;
        }
        tenths[idx] += 1;
        leftover -= 1;
    }

    tenths
}
