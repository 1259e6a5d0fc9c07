//! Shuffle selection
//!
//! Shuffle does not reorder the queue. Each `next` picks a uniformly random
//! index, retrying until it differs from the current one. This only avoids
//! back-to-back repeats; a track may come up again before the others have
//! all played.

use rand::Rng;

/// Pick a random index in `0..len` other than `current`
///
/// With a single track there is no alternative, so `current` is returned
/// without drawing. Returns `None` for an empty queue.
pub fn pick_index<R: Rng + ?Sized>(rng: &mut R, current: usize, len: usize) -> Option<usize> {
    match len {
        0 => None,
        1 => Some(0),
        _ => loop {
            let candidate = rng.gen_range(0..len);
            if candidate != current {
                break Some(candidate);
            }
        },
    }
}
