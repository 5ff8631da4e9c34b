//! Deterministic pseudo-embeddings for visual styling.
//!
//! A pseudo-embedding is a short vector derived from a label by a linear
//! congruential generator. It has no semantic meaning; the frontend only
//! uses it to pick colours and offsets that stay stable across rebuilds.
//!
//! The arithmetic is fixed-width and masked to 31 bits after every step so
//! the output is bit-identical to every other implementation of the same
//! generator.

/// Default number of dimensions.
pub const DEFAULT_DIMENSIONS: usize = 3;

const LCG_MULTIPLIER: u64 = 1_103_515_245;
const LCG_INCREMENT: u64 = 12_345;
const LOW_31_BITS: u64 = 0x7FFF_FFFF;

/// Pseudo-embedding of `label` with [`DEFAULT_DIMENSIONS`] components.
pub fn pseudo_embedding(label: &str) -> Vec<f64> {
    pseudo_embedding_with_dims(label, DEFAULT_DIMENSIONS)
}

/// Pseudo-embedding of `label` with `dims` components, each in `[0, 1)`
/// with three decimal places.
///
/// The seed is the sum of each character's code point times its 1-based
/// position. Each dimension `i` advances the seed with
/// `seed = (1103515245 * (seed + i) + 12345) & 0x7FFFFFFF` and emits
/// `(seed % 1000) / 1000`.
#[allow(clippy::arithmetic_side_effects)] // wrapping ops, masked below
pub fn pseudo_embedding_with_dims(label: &str, dims: usize) -> Vec<f64> {
    let mut seed = label_seed(label) & LOW_31_BITS;
    (0..dims)
        .map(|i| {
            let step = seed.wrapping_add(i as u64);
            seed = LCG_MULTIPLIER
                .wrapping_mul(step)
                .wrapping_add(LCG_INCREMENT)
                & LOW_31_BITS;
            // seed % 1000 < 1000, exactly representable.
            let milli = u32::try_from(seed % 1000).unwrap_or(0);
            f64::from(milli) / 1000.0
        })
        .collect()
}

/// Sum of `code_point * (index + 1)` over the label's characters.
///
/// Wraps on overflow; only the low 31 bits matter to the generator and
/// wrapping preserves them.
fn label_seed(label: &str) -> u64 {
    label
        .chars()
        .zip(1_u64..)
        .fold(0_u64, |acc, (ch, position)| {
            acc.wrapping_add(u64::from(u32::from(ch)).wrapping_mul(position))
        })
}
