extern crate pretty_env_logger;
#[macro_use]
extern crate log;

use std::io::Write;

use clap::Parser;

mod cli;
mod combinations;
mod errors;
mod intervals;
mod io;
mod permutations;
mod randomizers;
mod stats;

use combinations::{enumerate, Combination};
use errors::Result;
use intervals::IntervalSet;
use permutations::{permutations, PermConfig};
use stats::{probabilities, CombinationStat, PermSummary, Probability};

/// Real combinations, and when permuted, their permuted values and probabilities
struct Comparison {
    overlaps: Vec<Combination>,
    stats: Vec<CombinationStat>,
    probs: Vec<Probability>,
}

impl Comparison {
    fn new(sets: &[IntervalSet], genome: &IntervalSet, conf: &PermConfig) -> Result<Self> {
        let overlaps = enumerate(sets, conf.max_comps);
        info!("{} combinations", overlaps.len());

        let (stats, probs) = if conf.iterations > 0 {
            let stats = permutations(sets, genome, conf)?;
            let probs = probabilities(&overlaps, &stats);
            (stats, probs)
        } else {
            (vec![], vec![])
        };
        Ok(Comparison {
            overlaps,
            stats,
            probs,
        })
    }

    fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        io::write_combinations(w, &self.overlaps)?;
        io::write_probabilities(w, &self.probs)?;
        Ok(())
    }

    fn summaries(&self) -> Vec<PermSummary> {
        self.overlaps
            .iter()
            .zip(self.probs.iter())
            .filter_map(|(c, p)| {
                self.stats
                    .iter()
                    .find(|s| s.name == c.name())
                    .map(|s| PermSummary::new(c, s, p))
            })
            .collect()
    }
}

/// Trim masked regions out of the genome and drop any input interval touching them
fn apply_mask(
    mask: &IntervalSet,
    genome: &mut IntervalSet,
    sets: Vec<IntervalSet>,
) -> Vec<IntervalSet> {
    let before = genome.covered();
    genome.subtract(mask);
    info!("masked {} bases", before - genome.covered());

    sets.into_iter()
        .map(|s| {
            let kept = s.subtract_full(mask);
            info!("masked {} intervals from {}", s.len() - kept.len(), s.name);
            kept
        })
        .collect()
}

fn run(args: &cli::ArgParser) -> Result<()> {
    let mut genome = io::read_genome(&args.genome)?;
    let mut sets = io::read_collection(&args.beds)?;
    if let Some(path) = &args.mask {
        let mask = io::read_bed(path, "mask")?;
        sets = apply_mask(&mask, &mut genome, sets);
    }
    let conf = args.perm_config(sets.len())?;

    for set in sets.iter() {
        debug!("{}", set.name);
        for span in set.spans() {
            debug!("{}", span);
        }
    }

    let comp = Comparison::new(&sets, &genome, &conf)?;

    let mut out = io::writer(args.output.as_deref())?;
    comp.write(&mut out)?;
    out.flush()?;

    if let Some(path) = &args.json {
        if conf.iterations > 0 {
            io::write_json(path, &comp.summaries())?;
        }
    }
    Ok(())
}

fn main() {
    let args = cli::ArgParser::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    pretty_env_logger::formatted_timed_builder()
        .filter_level(level)
        .init();

    if !args.validate() {
        error!("please fix arguments");
        std::process::exit(1);
    }

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intervals::Span;

    fn inputs() -> Vec<IntervalSet> {
        vec![
            IntervalSet::from_spans(
                "first",
                vec![
                    Span::new("one", 2, 7),
                    Span::new("one", 99, 110),
                    Span::new("two", 0, 11),
                ],
            ),
            IntervalSet::from_spans(
                "second",
                vec![
                    Span::new("one", 5, 22),
                    Span::new("one", 80, 105),
                    Span::new("two", 3, 20),
                    Span::new("three", 0, 11),
                ],
            ),
        ]
    }

    fn genome() -> IntervalSet {
        IntervalSet::from_spans(
            "genome",
            vec![
                Span::new("one", 0, 200),
                Span::new("two", 0, 100),
                Span::new("three", 0, 50),
            ],
        )
    }

    fn conf(iterations: u32, seed: u64) -> PermConfig {
        PermConfig {
            iterations,
            seed,
            max_comps: -1,
            to_permute: vec![],
            threads: 2,
        }
    }

    fn render(seed: u64) -> Vec<u8> {
        let comp = Comparison::new(&inputs(), &genome(), &conf(50, seed)).unwrap();
        let mut out: Vec<u8> = vec![];
        comp.write(&mut out).unwrap();
        out
    }

    #[test]
    fn test_same_seed_same_output() {
        assert_eq!(render(3), render(3));
    }

    #[test]
    fn test_comparison() {
        let comp = Comparison::new(&inputs(), &genome(), &conf(50, 1)).unwrap();
        assert_eq!(comp.overlaps.len(), 4);
        assert_eq!(comp.probs.len(), 4);
        assert!(comp
            .probs
            .iter()
            .all(|p| (0.0..=1.0).contains(&p.count_prob)
                && (0.0..=1.0).contains(&p.covered_prob)));
        assert_eq!(comp.summaries().len(), 4);
        assert!(comp.summaries().iter().all(|s| s.num_perms == 50));
    }

    #[test]
    fn test_apply_mask() {
        let mut g = genome();
        let mask = IntervalSet::from_spans("mask", vec![Span::new("one", 100, 150)]);
        let sets = apply_mask(&mask, &mut g, inputs());
        assert_eq!(g.covered(), 350 - 50);
        assert_eq!(
            g.spans()[..2],
            [Span::new("one", 0, 100), Span::new("one", 150, 200)]
        );
        // (one,99,110) touches the mask and is dropped whole
        assert_eq!(
            sets[0].spans(),
            vec![Span::new("one", 2, 7), Span::new("two", 0, 11)]
        );
        assert_eq!(sets[1].len(), 3);
    }

    #[test]
    fn test_no_iterations_no_probabilities() {
        let comp = Comparison::new(&inputs(), &genome(), &conf(0, 1)).unwrap();
        assert!(comp.probs.is_empty());
        assert!(comp.stats.is_empty());
        let mut out: Vec<u8> = vec![];
        comp.write(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("one\t5\t7\t2\t2\t16\tfirst:second\n"));
    }
}
