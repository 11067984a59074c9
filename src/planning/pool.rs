//! # Weighted Pools
//!
//! Without-replacement weighted sampling over a fixed candidate set.

use crate::{PlannerError, PlannerResult};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// A bag of candidates drawn with probability proportional to their weight.
///
/// Every draw removes the drawn candidate, so a pool never issues the same
/// entry twice. Weights are relative and do not need to sum to 1.
///
/// # Examples
///
/// ```
/// use dungeon_planner::WeightedPool;
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let mut rng = StdRng::seed_from_u64(7);
/// let mut pool = WeightedPool::new(vec![("a", 1.0), ("b", 1.0)]).unwrap();
/// let first = pool.draw(&mut rng).unwrap();
/// let second = pool.draw(&mut rng).unwrap();
/// assert_ne!(first, second);
/// assert!(pool.draw(&mut rng).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedPool<T> {
    remaining: Vec<(T, f64)>,
}

impl<T> WeightedPool<T> {
    /// Creates a pool from `(candidate, relative weight)` pairs.
    ///
    /// Every weight must be finite and strictly positive.
    pub fn new(candidates: Vec<(T, f64)>) -> PlannerResult<Self> {
        if let Some(&(_, weight)) = candidates
            .iter()
            .find(|(_, weight)| !weight.is_finite() || *weight <= 0.0)
        {
            return Err(PlannerError::InvalidWeight(weight));
        }

        Ok(Self {
            remaining: candidates,
        })
    }

    /// Draws one candidate and removes it from the pool.
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> PlannerResult<T> {
        if self.remaining.is_empty() {
            return Err(PlannerError::ExhaustedPool);
        }

        let index = WeightedIndex::new(self.remaining.iter().map(|(_, weight)| *weight))
            .map_err(|err| PlannerError::InvalidConfig(format!("Weighted draw failed: {}", err)))?
            .sample(rng);

        Ok(self.remaining.remove(index).0)
    }

    /// Draws `count` candidates without replacement.
    ///
    /// The first candidate drawn is the LAST element of the returned vector,
    /// so popping from the end replays the same stream that `count` calls to
    /// [`WeightedPool::draw`] would have produced. Asking for more than is
    /// left fails without touching the pool.
    pub fn draw_many<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) -> PlannerResult<Vec<T>> {
        if count > self.remaining.len() {
            return Err(PlannerError::InsufficientCandidates {
                requested: count,
                available: self.remaining.len(),
            });
        }

        let mut drawn = Vec::with_capacity(count);
        for _ in 0..count {
            drawn.push(self.draw(rng)?);
        }
        drawn.reverse();
        Ok(drawn)
    }

    /// Number of candidates still available.
    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    /// Whether every candidate has been drawn.
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Sum of the weights still in the pool.
    pub fn total_weight(&self) -> f64 {
        self.remaining.iter().map(|(_, weight)| weight).sum()
    }

    /// Iterates the candidates still available with their weights.
    pub fn remaining(&self) -> impl Iterator<Item = (&T, f64)> {
        self.remaining.iter().map(|(candidate, weight)| (candidate, *weight))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn abc() -> WeightedPool<&'static str> {
        WeightedPool::new(vec![("a", 1.0), ("b", 1.0), ("c", 1.0)]).unwrap()
    }

    #[test]
    fn test_draws_each_candidate_once_then_exhausts() {
        let mut rng = StdRng::seed_from_u64(12345);
        let mut pool = abc();

        let drawn: HashSet<_> = (0..3).map(|_| pool.draw(&mut rng).unwrap()).collect();
        assert_eq!(drawn, ["a", "b", "c"].into_iter().collect());
        assert!(pool.is_empty());
        assert!(matches!(pool.draw(&mut rng), Err(PlannerError::ExhaustedPool)));
    }

    #[test]
    fn test_oversized_batch_leaves_pool_intact() {
        let mut rng = StdRng::seed_from_u64(12345);
        let mut pool = abc();

        let result = pool.draw_many(4, &mut rng);
        assert!(matches!(
            result,
            Err(PlannerError::InsufficientCandidates {
                requested: 4,
                available: 3
            })
        ));
        assert_eq!(pool, abc());

        let batch = pool.draw_many(3, &mut rng).unwrap();
        assert_eq!(batch.len(), 3);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_batch_pops_in_single_draw_order() {
        let mut single = abc();
        let mut batched = abc();
        let mut rng_single = StdRng::seed_from_u64(99);
        let mut rng_batched = StdRng::seed_from_u64(99);

        let singles: Vec<_> = (0..3).map(|_| single.draw(&mut rng_single).unwrap()).collect();
        let mut batch = batched.draw_many(3, &mut rng_batched).unwrap();

        let mut popped = Vec::new();
        while let Some(item) = batch.pop() {
            popped.push(item);
        }
        assert_eq!(popped, singles);
    }

    #[test]
    fn test_zero_sized_batch() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut pool = abc();
        assert!(pool.draw_many(0, &mut rng).unwrap().is_empty());
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_rejects_bad_weights() {
        assert!(matches!(
            WeightedPool::new(vec![("a", 1.0), ("b", 0.0)]),
            Err(PlannerError::InvalidWeight(w)) if w == 0.0
        ));
        assert!(WeightedPool::new(vec![("a", -2.0)]).is_err());
        assert!(WeightedPool::new(vec![("a", f64::NAN)]).is_err());
        assert!(WeightedPool::new(vec![("a", f64::INFINITY)]).is_err());
        assert!(WeightedPool::<&str>::new(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_heavier_candidates_come_first_more_often() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut heavy_first = 0;

        for _ in 0..1000 {
            let mut pool = WeightedPool::new(vec![("light", 1.0), ("heavy", 9.0)]).unwrap();
            if pool.draw(&mut rng).unwrap() == "heavy" {
                heavy_first += 1;
            }
        }

        // Expected 900; leave generous slack for sampling noise
        assert!(heavy_first > 820, "heavy drawn first {} times", heavy_first);
    }

    #[test]
    fn test_total_weight_shrinks_with_draws() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut pool = WeightedPool::new(vec![("a", 2.0), ("b", 3.0)]).unwrap();
        assert_eq!(pool.total_weight(), 5.0);

        let first = pool.draw(&mut rng).unwrap();
        let expected = if first == "a" { 3.0 } else { 2.0 };
        assert_eq!(pool.total_weight(), expected);
        assert_eq!(pool.remaining().count(), 1);
    }
}
