//! Repeatedly relocate input sets and re-enumerate their combinations
use std::borrow::Cow;
use std::thread;

use tinyrand::{Seeded, StdRand};

use crate::combinations::{enumerate, Combination};
use crate::errors::Result;
use crate::intervals::IntervalSet;
use crate::randomizers::shuffle_set;
use crate::stats::CombinationStat;

/// Settings for a permutation run
#[derive(Debug, Clone)]
pub struct PermConfig {
    pub iterations: u32,
    pub seed: u64,
    pub max_comps: i64,
    /// indices of the sets to relocate; empty relocates every set
    pub to_permute: Vec<usize>,
    pub threads: usize,
}

impl PermConfig {
    fn permutes(&self, idx: usize) -> bool {
        self.to_permute.is_empty() || self.to_permute.contains(&idx)
    }

    /// Each iteration draws from its own generator so results don't depend on `threads`
    fn rand_for(&self, iteration: u32) -> StdRand {
        StdRand::seed(self.seed.wrapping_add(iteration as u64))
    }
}

/// One permutation: relocate the selected sets, pass the rest through, and
/// enumerate combinations of the result
pub fn permute_once(
    sets: &[IntervalSet],
    genome: &IntervalSet,
    conf: &PermConfig,
    rand: &mut StdRand,
) -> Result<Vec<Combination>> {
    let shuffled = sets
        .iter()
        .enumerate()
        .map(|(i, s)| {
            if conf.permutes(i) {
                shuffle_set(s, genome, rand).map(Cow::Owned)
            } else {
                Ok(Cow::Borrowed(s))
            }
        })
        .collect::<Result<Vec<Cow<IntervalSet>>>>()?;
    Ok(enumerate(&shuffled, conf.max_comps))
}

/// Append one iteration's combinations to `stats`, aligned by position
fn record(stats: &mut Vec<CombinationStat>, combos: &[Combination]) {
    if stats.is_empty() {
        stats.extend(combos.iter().map(CombinationStat::new));
    }
    for (stat, combo) in stats.iter_mut().zip(combos) {
        debug_assert_eq!(stat.name, combo.name());
        stat.push(combo.tally());
    }
}

/// Fold a later chunk of iterations onto an earlier one
fn merge(into: &mut Vec<CombinationStat>, part: Vec<CombinationStat>) {
    if into.is_empty() {
        *into = part;
        return;
    }
    for (dst, src) in into.iter_mut().zip(part) {
        dst.counts.extend(src.counts);
        dst.covered.extend(src.covered);
    }
}

/// Run `conf.iterations` permutations spread over `conf.threads` threads.
///
/// Iterations are split into contiguous chunks and the chunks are merged back
/// in order, so every stat holds its values in iteration order.
pub fn permutations(
    sets: &[IntervalSet],
    genome: &IntervalSet,
    conf: &PermConfig,
) -> Result<Vec<CombinationStat>> {
    let threads = conf.threads.max(1) as u32;
    let chunk_size: u32 = conf.iterations.div_ceil(threads);
    info!(
        "running {} permutations on {} thread(s)",
        conf.iterations, threads
    );

    #[cfg(feature = "progbars")]
    let pbar = indicatif::ProgressBar::new(conf.iterations as u64);

    let parts: Vec<Result<Vec<CombinationStat>>> = thread::scope(|scope| {
        #[cfg(feature = "progbars")]
        let pbar = &pbar;

        let handles: Vec<_> = (0..threads)
            .map(|t| {
                let start_iter = t * chunk_size;
                let stop_iter = std::cmp::min(start_iter + chunk_size, conf.iterations);
                scope.spawn(move || -> Result<Vec<CombinationStat>> {
                    let mut m_stats: Vec<CombinationStat> = vec![];
                    for j in start_iter..stop_iter {
                        let combos = permute_once(sets, genome, conf, &mut conf.rand_for(j))?;
                        record(&mut m_stats, &combos);
                        debug!("permutation {} done", j);
                        #[cfg(feature = "progbars")]
                        pbar.inc(1);
                    }
                    Ok(m_stats)
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    });

    #[cfg(feature = "progbars")]
    pbar.finish();

    let mut stats: Vec<CombinationStat> = vec![];
    for part in parts {
        merge(&mut stats, part?);
    }
    info!("recorded {} combinations per permutation", stats.len());
    Ok(stats)
}
