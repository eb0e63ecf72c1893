use std::collections::HashMap;

use serde::Serialize;

use crate::combinations::Combination;

/// Per-combination values recorded across permutations
#[derive(Debug, Clone, Default, Serialize)]
pub struct CombinationStat {
    pub name: String,
    pub components: Vec<String>,
    pub counts: Vec<u64>,
    pub covered: Vec<u64>,
}

impl CombinationStat {
    pub fn new(combo: &Combination) -> Self {
        CombinationStat {
            name: combo.name().to_string(),
            components: combo.components.clone(),
            counts: vec![],
            covered: vec![],
        }
    }

    pub fn push(&mut self, tally: (u64, u64)) {
        self.counts.push(tally.0);
        self.covered.push(tally.1);
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Empirical chance of seeing at least as much overlap as the real data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Probability {
    pub name: String,
    pub count_prob: f64,
    pub covered_prob: f64,
}

/// Number of values in a sorted distribution that are `<= value`
pub fn rank(value: u64, sorted: &[u64]) -> usize {
    sorted.partition_point(|v| *v <= value)
}

/// Fraction of the distribution strictly greater than `observed`
fn upper_tail(observed: u64, dist: &[u64]) -> f64 {
    if dist.is_empty() {
        return f64::NAN;
    }
    let mut sorted = dist.to_vec();
    sorted.sort_unstable();
    (sorted.len() - rank(observed, &sorted)) as f64 / sorted.len() as f64
}

impl Probability {
    pub fn new(combo: &Combination, stat: Option<&CombinationStat>) -> Self {
        let (count, covered) = combo.tally();
        let (count_prob, covered_prob) = match stat {
            Some(s) if !s.is_empty() => (
                upper_tail(count, &s.counts),
                upper_tail(covered, &s.covered),
            ),
            _ => {
                warn!(
                    "no permutations recorded for '{}'; probability undefined",
                    combo.name()
                );
                (f64::NAN, f64::NAN)
            }
        };
        Probability {
            name: combo.name().to_string(),
            count_prob,
            covered_prob,
        }
    }
}

/// Match each real combination to its permuted values by name
pub fn probabilities(real: &[Combination], stats: &[CombinationStat]) -> Vec<Probability> {
    let by_name: HashMap<&str, &CombinationStat> =
        stats.iter().map(|s| (s.name.as_str(), s)).collect();
    real.iter()
        .map(|c| Probability::new(c, by_name.get(c.name()).copied()))
        .collect()
}

pub fn mean_std(v: &[u64]) -> (f64, f64) {
    let n = v.len() as f64;
    let mean = v.iter().sum::<u64>() as f64 / n;
    let variance = v.iter().map(|x| (*x as f64 - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Observed values next to their permuted distribution for one combination
#[derive(Serialize)]
pub struct PermSummary {
    pub name: String,
    pub components: Vec<String>,
    pub num_perms: usize,
    pub obs_count: u64,
    pub count_mean: f64,
    pub count_std: f64,
    pub count_prob: f64,
    pub obs_covered: u64,
    pub covered_mean: f64,
    pub covered_std: f64,
    pub covered_prob: f64,
}

impl PermSummary {
    pub fn new(combo: &Combination, stat: &CombinationStat, prob: &Probability) -> Self {
        let (obs_count, obs_covered) = combo.tally();
        let (count_mean, count_std) = mean_std(&stat.counts);
        let (covered_mean, covered_std) = mean_std(&stat.covered);
        PermSummary {
            name: combo.name().to_string(),
            components: combo.components.clone(),
            num_perms: stat.len(),
            obs_count,
            count_mean,
            count_std,
            count_prob: prob.count_prob,
            obs_covered,
            covered_mean,
            covered_std,
            covered_prob: prob.covered_prob,
        }
    }
}
