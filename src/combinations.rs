//! Every intersection among subsets of a collection of interval sets
use std::borrow::Borrow;

use num_bigint::BigUint;

use crate::intervals::IntervalSet;

/// Intersection of a subset of input sets, tagged with the inputs it came from
#[derive(Debug, Clone)]
pub struct Combination {
    pub components: Vec<String>,
    pub set: IntervalSet,
}

impl Combination {
    fn new(members: Vec<&IntervalSet>) -> Self {
        let components: Vec<String> = members.iter().map(|m| m.name.clone()).collect();
        let name = components.join(":");
        let mut set = match members.split_first() {
            None => IntervalSet::new(String::new()),
            Some((only, [])) => (*only).clone(),
            Some((head, rest)) => {
                let mut acc = head.union(head);
                for m in rest {
                    acc.intersect(m);
                }
                acc
            }
        };
        set.name = name;
        Combination { components, set }
    }

    /// Component names joined by `:`
    pub fn name(&self) -> &str {
        &self.set.name
    }

    /// (interval count, covered base pairs)
    pub fn tally(&self) -> (u64, u64) {
        (self.set.len() as u64, self.set.covered())
    }
}

/// Members of `sets` whose bit is set in `pattern`, bit `i` selecting `sets[i]`
fn select<'a, S: Borrow<IntervalSet>>(sets: &'a [S], pattern: &BigUint) -> Vec<&'a IntervalSet> {
    sets.iter()
        .enumerate()
        .filter(|(i, _)| pattern.bit(*i as u64))
        .map(|(_, s)| s.borrow())
        .collect()
}

/// Intersect every subset of `sets`, in ascending bit-pattern order.
///
/// Patterns run from `0` to `2^n - 1` as a `BigUint`, so there is no ceiling on
/// the number of sets. When `max_comps` is non-negative, subsets with more
/// members than `max_comps` are skipped. The output order and names depend
/// only on `sets.len()`, their names and `max_comps`, so calls with the same
/// shape line up position by position.
pub fn enumerate<S: Borrow<IntervalSet>>(sets: &[S], max_comps: i64) -> Vec<Combination> {
    let limit = BigUint::from(1u8) << sets.len();
    let mut ret = vec![];
    let mut pattern = BigUint::from(0u8);
    while pattern < limit {
        if max_comps < 0 || pattern.count_ones() <= max_comps as u64 {
            ret.push(Combination::new(select(sets, &pattern)));
        }
        pattern += 1u8;
    }
    ret
}
