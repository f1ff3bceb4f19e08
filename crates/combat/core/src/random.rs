//! Random selection used by the decision cycle and ambient flavor text.
//!
//! Any [`rand::Rng`] is a [`RandomSource`]; seeding it (e.g. `SmallRng`)
//! makes an encounter reproducible. [`SequenceRandom`] replays fixed picks.

use std::collections::VecDeque;

/// Uniform index selection.
pub trait RandomSource {
    /// Returns an index in `0..len`. Callers never pass `len == 0`.
    fn pick_index(&mut self, len: usize) -> usize;
}

impl<R: rand::Rng + ?Sized> RandomSource for R {
    fn pick_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "pick_index called with an empty range");
        self.gen_range(0..len)
    }
}

/// Picks one element uniformly, or `None` for an empty slice.
///
/// A single candidate is returned without consulting the source.
pub fn choose<'a, T, R>(rng: &mut R, items: &'a [T]) -> Option<&'a T>
where
    R: RandomSource + ?Sized,
{
    match items.len() {
        0 => None,
        1 => items.first(),
        len => items.get(rng.pick_index(len)),
    }
}

/// Replays a fixed list of picks, wrapping each into range. Falls back to 0
/// once exhausted.
#[derive(Clone, Debug, Default)]
pub struct SequenceRandom {
    picks: VecDeque<usize>,
}

impl SequenceRandom {
    pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            picks: picks.into_iter().collect(),
        }
    }

    pub fn push(&mut self, pick: usize) {
        self.picks.push_back(pick);
    }

    pub fn remaining(&self) -> usize {
        self.picks.len()
    }
}

impl RandomSource for SequenceRandom {
    fn pick_index(&mut self, len: usize) -> usize {
        self.picks.pop_front().map_or(0, |pick| pick % len.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn choose_skips_the_source_for_single_candidates() {
        let mut rng = SequenceRandom::new([1]);
        assert_eq!(choose(&mut rng, &["only"]), Some(&"only"));
        assert_eq!(rng.remaining(), 1);
    }

    #[test]
    fn choose_on_empty_returns_none() {
        let mut rng = SequenceRandom::default();
        let empty: [u8; 0] = [];
        assert!(choose(&mut rng, &empty).is_none());
    }

    #[test]
    fn sequence_wraps_into_range() {
        let mut rng = SequenceRandom::new([5, 2]);
        assert_eq!(rng.pick_index(3), 2);
        assert_eq!(rng.pick_index(3), 2);
        assert_eq!(rng.pick_index(3), 0);
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let mut a = SmallRng::seed_from_u64(7);
        let mut b = SmallRng::seed_from_u64(7);
        let picks_a: Vec<usize> = (0..32).map(|_| a.pick_index(4)).collect();
        let picks_b: Vec<usize> = (0..32).map(|_| b.pick_index(4)).collect();
        assert_eq!(picks_a, picks_b);
        assert!(picks_a.iter().all(|&i| i < 4));
    }
}
