use tinyrand::{Rand, RandRange};

use crate::errors::{PermError, Result};
use crate::intervals::{IntervalSet, Span};

/// Number of places `span` fits inside the genome's chromosome extents.
/// Extents narrower than the span contribute nothing.
pub fn count_valid_positions(span: &Span, genome: &IntervalSet) -> u64 {
    let width = span.width();
    genome
        .iter()
        .map(|(_, c)| c.stop - c.start)
        .filter(|cw| *cw >= width)
        .map(|cw| cw - width + 1)
        .sum()
}

/// Treat `raw` as an offset into the concatenation of every extent's valid
/// positions and build the span of the same width found there.
/// Returns `None` when `raw` is past the last valid position.
pub fn place_at(raw: u64, span: &Span, genome: &IntervalSet) -> Option<Span> {
    let width = span.width();
    let mut raw = raw;
    for (chrom, c) in genome.iter() {
        let cw = c.stop - c.start;
        if cw < width {
            continue;
        }
        let n_pos = cw - width + 1;
        if raw < n_pos {
            return Some(Span::new(chrom, c.start + raw, c.start + raw + width));
        }
        raw -= n_pos;
    }
    None
}

/// Move a span to a uniformly random position anywhere in the genome
pub fn random_placement<R: Rand + RandRange<u64>>(
    span: &Span,
    genome: &IntervalSet,
    rand: &mut R,
) -> Result<Span> {
    let invalid = || PermError::InvalidPlacement {
        chrom: span.chrom.clone(),
        start: span.start,
        stop: span.stop,
        width: span.width(),
    };

    let n_pos = count_valid_positions(span, genome);
    if n_pos == 0 {
        error!(
            "no room for {} in a genome of {} chromosomes",
            span,
            genome.chroms().len()
        );
        return Err(invalid());
    }
    let raw = rand.next_range(0..n_pos);
    place_at(raw, span, genome).ok_or_else(invalid)
}

/// Independently relocate every interval of `set` into a fresh set of the same name.
/// Relocated intervals that land on one another are merged.
pub fn shuffle_set<R: Rand + RandRange<u64>>(
    set: &IntervalSet,
    genome: &IntervalSet,
    rand: &mut R,
) -> Result<IntervalSet> {
    let moved = set
        .spans()
        .iter()
        .map(|s| random_placement(s, genome, rand))
        .collect::<Result<Vec<Span>>>()?;
    Ok(IntervalSet::from_spans(set.name.clone(), moved))
}
