//! Random picks over small candidate lists
//!
//! None of these panic on degenerate input: too few candidates degrade to the
//! first one with a warning.

use rand::Rng;
use rand::seq::IndexedRandom;

/// Uniform float in [a, b] regardless of argument order
pub fn range_f32<R: Rng + ?Sized>(rng: &mut R, a: f32, b: f32) -> f32 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if lo == hi {
        return lo;
    }
    rng.random_range(lo..=hi)
}

/// Random sign, -1.0 or 1.0
pub fn random_sign<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    if rng.random_bool(0.5) { -1.0 } else { 1.0 }
}

/// Pick an index in `0..len` different from `last`.
///
/// Returns `None` for an empty list. A list of one returns 0.
pub fn pick_different<R: Rng + ?Sized>(
    rng: &mut R,
    len: usize,
    last: Option<usize>,
) -> Option<usize> {
    if len == 0 {
        log::warn!("Nothing to pick from");
        return None;
    }
    if len < 2 {
        if last.is_some() {
            log::warn!("List has a single element, can't pick a different one");
        }
        return Some(0);
    }

    let mut idx = rng.random_range(0..len);
    while Some(idx) == last {
        idx = rng.random_range(0..len);
    }
    Some(idx)
}

/// Pick an element of `items` that is not in `picked`.
///
/// When every element has already been picked, the first element is returned.
pub fn pick_excluding<R, T>(rng: &mut R, items: &[T], picked: &[T]) -> Option<T>
where
    R: Rng + ?Sized,
    T: PartialEq + Clone,
{
    let first = items.first()?;
    if items.len() < 2 {
        log::warn!("List has a single element, can't pick a different one");
        return Some(first.clone());
    }

    let candidates: Vec<&T> = items.iter().filter(|item| !picked.contains(item)).collect();
    match candidates.choose(rng) {
        Some(item) => Some((*item).clone()),
        None => {
            log::warn!("All {} elements were already picked", items.len());
            Some(first.clone())
        }
    }
}
