//! Named sets of genomic intervals and the algebra between them
use std::collections::HashMap;
use std::fmt;

use rust_lapper::{Interval, Lapper};
use serde::Serialize;

pub type Iv = Interval<u64, u64>;
pub type Bucket = Lapper<u64, u64>;

/// A chromosome-qualified half-open interval `[start, stop)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Span {
    pub chrom: String,
    pub start: u64,
    pub stop: u64,
}

impl Span {
    pub fn new(chrom: impl Into<String>, start: u64, stop: u64) -> Self {
        Span {
            chrom: chrom.into(),
            start,
            stop,
        }
    }

    pub fn width(&self) -> u64 {
        self.stop - self.start
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.chrom, self.start, self.stop)
    }
}

/// Sort and coalesce overlapping or touching intervals into a bucket
fn bucket(ivs: Vec<Iv>) -> Bucket {
    let mut lap = Lapper::new(ivs.into_iter().filter(|i| i.start < i.stop).collect());
    lap.merge_overlaps();
    lap
}

fn empty_bucket() -> Bucket {
    Lapper::new(vec![])
}

/// Per-chromosome sorted, non-overlapping intervals under a name.
///
/// Chromosomes are remembered in the order they were first added. Every
/// bucket is kept merged, so a bucket's intervals never overlap or touch.
#[derive(Debug, Clone, Default)]
pub struct IntervalSet {
    pub name: String,
    chroms: Vec<String>,
    buckets: HashMap<String, Bucket>,
}

impl IntervalSet {
    pub fn new(name: impl Into<String>) -> Self {
        IntervalSet {
            name: name.into(),
            chroms: vec![],
            buckets: HashMap::new(),
        }
    }

    pub fn from_spans<I>(name: impl Into<String>, spans: I) -> Self
    where
        I: IntoIterator<Item = Span>,
    {
        let mut ret = IntervalSet::new(name);
        ret.add_spans(spans);
        ret
    }

    /// Union spans into the set
    pub fn add_spans<I>(&mut self, spans: I)
    where
        I: IntoIterator<Item = Span>,
    {
        let mut load: HashMap<String, Vec<Iv>> = HashMap::new();
        for s in spans {
            if !self.buckets.contains_key(&s.chrom) && !load.contains_key(&s.chrom) {
                self.chroms.push(s.chrom.clone());
            }
            load.entry(s.chrom).or_default().push(Iv {
                start: s.start,
                stop: s.stop,
                val: 0,
            });
        }

        for (chrom, mut ivs) in load {
            if let Some(existing) = self.buckets.get(&chrom) {
                ivs.extend(existing.iter().cloned());
            }
            self.buckets.insert(chrom, bucket(ivs));
        }
    }

    /// Chromosomes in first-seen order
    pub fn chroms(&self) -> &[String] {
        &self.chroms
    }

    /// Every interval, walking chromosomes in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Iv)> + '_ {
        self.chroms.iter().flat_map(move |c| {
            self.buckets
                .get(c)
                .into_iter()
                .flat_map(move |b| b.iter().map(move |i| (c.as_str(), i)))
        })
    }

    pub fn spans(&self) -> Vec<Span> {
        self.iter()
            .map(|(c, i)| Span::new(c, i.start, i.stop))
            .collect()
    }

    /// Number of intervals
    pub fn len(&self) -> usize {
        self.buckets.values().map(|b| b.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Base pairs covered by the set
    pub fn covered(&self) -> u64 {
        self.buckets.values().map(|b| b.cov()).sum()
    }

    /// New set holding everything in either operand, named after `self`
    pub fn union(&self, other: &IntervalSet) -> IntervalSet {
        let mut ret = self.clone();
        ret.add_spans(other.spans());
        ret
    }

    /// Keep only the portions of `self` also covered by `other`
    pub fn intersect(&mut self, other: &IntervalSet) {
        for chrom in self.chroms.iter() {
            let new = match (self.buckets.get(chrom), other.buckets.get(chrom)) {
                (Some(mine), Some(theirs)) => {
                    let mut ivs = vec![];
                    for a in mine.iter() {
                        for b in theirs.find(a.start, a.stop) {
                            ivs.push(Iv {
                                start: a.start.max(b.start),
                                stop: a.stop.min(b.stop),
                                val: 0,
                            });
                        }
                    }
                    bucket(ivs)
                }
                _ => empty_bucket(),
            };
            self.buckets.insert(chrom.clone(), new);
        }
    }

    /// Trim away every portion of `self` covered by `other`.
    /// Intervals partially covered are shortened or split.
    pub fn subtract(&mut self, other: &IntervalSet) {
        for chrom in self.chroms.iter() {
            let (Some(mine), Some(theirs)) = (self.buckets.get(chrom), other.buckets.get(chrom))
            else {
                continue;
            };
            let mut ivs = vec![];
            for a in mine.iter() {
                let mut cursor = a.start;
                for b in theirs.find(a.start, a.stop) {
                    if b.start > cursor {
                        ivs.push(Iv {
                            start: cursor,
                            stop: b.start,
                            val: 0,
                        });
                    }
                    cursor = cursor.max(b.stop);
                }
                if cursor < a.stop {
                    ivs.push(Iv {
                        start: cursor,
                        stop: a.stop,
                        val: 0,
                    });
                }
            }
            let new = bucket(ivs);
            self.buckets.insert(chrom.clone(), new);
        }
    }

    /// Drop whole intervals of `self` touching anything in `other`.
    /// Survivors are kept unclipped.
    pub fn subtract_full(&self, other: &IntervalSet) -> IntervalSet {
        let mut ret = IntervalSet::new(self.name.clone());
        for chrom in self.chroms.iter() {
            let Some(mine) = self.buckets.get(chrom) else {
                continue;
            };
            let kept: Vec<Iv> = match other.buckets.get(chrom) {
                Some(theirs) => mine
                    .iter()
                    .filter(|a| theirs.find(a.start, a.stop).next().is_none())
                    .cloned()
                    .collect(),
                None => mine.iter().cloned().collect(),
            };
            ret.chroms.push(chrom.clone());
            ret.buckets.insert(chrom.clone(), bucket(kept));
        }
        ret
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first() -> IntervalSet {
        IntervalSet::from_spans(
            "first",
            vec![
                Span::new("one", 2, 7),
                Span::new("one", 99, 110),
                Span::new("two", 0, 11),
            ],
        )
    }

    fn second() -> IntervalSet {
        IntervalSet::from_spans(
            "second",
            vec![
                Span::new("one", 5, 22),
                Span::new("one", 80, 105),
                Span::new("two", 3, 20),
                Span::new("three", 0, 11),
            ],
        )
    }

    #[test]
    fn test_add_merges_and_keeps_chrom_order() {
        let s = IntervalSet::from_spans(
            "x",
            vec![
                Span::new("chr2", 10, 20),
                Span::new("chr1", 5, 10),
                Span::new("chr2", 15, 30),
                Span::new("chr1", 10, 12),
                Span::new("chr2", 40, 50),
            ],
        );
        assert_eq!(s.chroms(), &["chr2".to_string(), "chr1".to_string()]);
        assert_eq!(
            s.spans(),
            vec![
                Span::new("chr2", 10, 30),
                Span::new("chr2", 40, 50),
                Span::new("chr1", 5, 12),
            ]
        );
        assert_eq!(s.len(), 3);
        assert_eq!(s.covered(), 20 + 10 + 7);
    }

    #[test]
    fn test_union() {
        let u = first().union(&second());
        assert_eq!(u.name, "first");
        assert_eq!(
            u.spans(),
            vec![
                Span::new("one", 2, 22),
                Span::new("one", 80, 110),
                Span::new("two", 0, 20),
                Span::new("three", 0, 11),
            ]
        );
    }

    #[test]
    fn test_intersect() {
        let mut a = first();
        a.intersect(&second());
        assert_eq!(
            a.spans(),
            vec![
                Span::new("one", 5, 7),
                Span::new("one", 99, 105),
                Span::new("two", 3, 11),
            ]
        );
    }

    #[test]
    fn test_intersect_commutes() {
        let mut ab = first();
        ab.intersect(&second());
        let mut ba = second();
        ba.intersect(&first());
        let mut ab = ab.spans();
        let mut ba = ba.spans();
        ab.sort();
        ba.sort();
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_intersect_missing_chrom() {
        let mut a = second();
        a.intersect(&first());
        assert!(a.chroms().contains(&"three".to_string()));
        assert!(a.spans().iter().all(|s| s.chrom != "three"));
    }

    #[test]
    fn test_subtract_trims() {
        let mut a = first();
        a.subtract(&second());
        assert_eq!(
            a.spans(),
            vec![
                Span::new("one", 2, 5),
                Span::new("one", 105, 110),
                Span::new("two", 0, 3),
            ]
        );
    }

    #[test]
    fn test_subtract_splits() {
        let mut a = IntervalSet::from_spans("a", vec![Span::new("chr1", 100, 300)]);
        let b = IntervalSet::from_spans(
            "b",
            vec![Span::new("chr1", 150, 200), Span::new("chr1", 250, 260)],
        );
        a.subtract(&b);
        assert_eq!(
            a.spans(),
            vec![
                Span::new("chr1", 100, 150),
                Span::new("chr1", 200, 250),
                Span::new("chr1", 260, 300),
            ]
        );
    }

    #[test]
    fn test_subtract_empty_is_identity() {
        let mut a = first();
        a.subtract(&IntervalSet::new("nothing"));
        assert_eq!(a.spans(), first().spans());

        // a chromosome only present in the subtrahend stays absent
        let mut b = first();
        b.subtract(&second());
        assert!(!b.chroms().contains(&"three".to_string()));
    }

    #[test]
    fn test_subtract_full() {
        let a = first();
        let b = IntervalSet::from_spans(
            "second",
            vec![
                Span::new("one", 80, 105),
                Span::new("two", 3, 20),
                Span::new("three", 0, 11),
            ],
        );
        let out = a.subtract_full(&b);
        assert_eq!(out.spans(), vec![Span::new("one", 2, 7)]);
    }

    #[test]
    fn test_subtract_full_never_clips() {
        let a = first();
        let b = second();
        let kept = a.subtract_full(&b).spans();
        let orig = a.spans();
        assert!(kept.iter().all(|s| orig.contains(s)));

        let mut trimmed = first();
        trimmed.subtract(&b);
        assert!(trimmed.spans().iter().any(|s| !orig.contains(s)));
    }
}
