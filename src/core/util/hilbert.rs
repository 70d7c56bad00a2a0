//! Hilbert space-filling curve ordering for 3D points.
//!
//! Pure ordering primitives: coordinates are quantized onto an integer grid and
//! mapped to a 1D Hilbert index. Sorting an insertion batch by this index keeps
//! consecutive points spatially close, so point location walks stay short.
//!
//! ## Scope
//! - No triangulation types (no `Vertex`, no keys, no TDS access)

use num_traits::cast::ToPrimitive;

/// Maximum bits per axis; `3 * 21` bits fit in a `u64` index.
pub const MAX_HILBERT_BITS: u32 = 21;

/// Axis-aligned bounds `(min, max)` applied to every axis.
pub type HilbertBounds = (f64, f64);

/// Quantize coordinates into integer grid coordinates in `[0, 2^bits)`.
///
/// Coordinates are normalized by `bounds` and clamped to `[0, 1]`; degenerate or
/// non-finite input maps to `0`. `bits` is clamped to `1..=MAX_HILBERT_BITS`.
///
/// # Examples
///
/// ```rust
/// use causal_dynamical_triangulations::core::util::hilbert::hilbert_quantize;
///
/// let q = hilbert_quantize(&[0.5, 0.25, 2.0], (0.0, 1.0), 2);
/// assert_eq!(q[2], 3);
/// assert!(q[0] <= 3 && q[1] <= 3);
/// ```
#[must_use]
pub fn hilbert_quantize(coords: &[f64; 3], bounds: HilbertBounds, bits: u32) -> [u32; 3] {
    let bits = bits.clamp(1, MAX_HILBERT_BITS);
    let extent = bounds.1 - bounds.0;
    let max_val = (1_u32 << bits) - 1;

    let mut quantized = [0_u32; 3];
    for (q, &coord) in quantized.iter_mut().zip(coords) {
        let normalized = if extent > 0.0 {
            let t = (coord - bounds.0) / extent;
            if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 }
        } else {
            0.0
        };
        let scaled = normalized * f64::from(max_val);
        *q = scaled.to_u32().unwrap_or(0).min(max_val);
    }
    quantized
}

/// Hilbert curve index of a point.
///
/// # Examples
///
/// ```rust
/// use causal_dynamical_triangulations::core::util::hilbert::hilbert_index;
///
/// assert_eq!(hilbert_index(&[0.0, 0.0, 0.0], (0.0, 1.0), 4), 0);
/// ```
#[must_use]
pub fn hilbert_index(coords: &[f64; 3], bounds: HilbertBounds, bits: u32) -> u64 {
    let bits = bits.clamp(1, MAX_HILBERT_BITS);
    hilbert_index_from_quantized(&hilbert_quantize(coords, bounds, bits), bits)
}

/// Skilling's transpose algorithm ("Programming the Hilbert curve", 2004).
fn hilbert_index_from_quantized(coords: &[u32; 3], bits: u32) -> u64 {
    let mut transposed = *coords;

    // Inverse undo excess work
    let highest_bit_mask: u32 = 1_u32 << (bits - 1);
    let mut bit_mask = highest_bit_mask;
    while bit_mask > 1 {
        let mask_minus_one = bit_mask - 1;
        for i in 0..3 {
            if transposed[i] & bit_mask != 0 {
                transposed[0] ^= mask_minus_one;
            } else {
                let toggle = (transposed[0] ^ transposed[i]) & mask_minus_one;
                transposed[0] ^= toggle;
                transposed[i] ^= toggle;
            }
        }
        bit_mask >>= 1;
    }

    // Gray encode
    transposed[1] ^= transposed[0];
    transposed[2] ^= transposed[1];

    let mut gray_mask: u32 = 0;
    bit_mask = highest_bit_mask;
    while bit_mask > 1 {
        if transposed[2] & bit_mask != 0 {
            gray_mask ^= bit_mask - 1;
        }
        bit_mask >>= 1;
    }
    for coord in &mut transposed {
        *coord ^= gray_mask;
    }

    let mut index: u64 = 0;
    for bit_pos in (0..bits).rev() {
        for &coord in &transposed {
            index = (index << 1) | u64::from((coord >> bit_pos) & 1);
        }
    }
    index
}

/// Scalar bounds covering every coordinate of `coords`, or `(0.0, 0.0)` when empty.
#[must_use]
pub fn hilbert_bounds<'a, I>(coords: I) -> HilbertBounds
where
    I: IntoIterator<Item = &'a [f64; 3]>,
{
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for c in coords {
        for &x in c {
            if x.is_finite() {
                lo = lo.min(x);
                hi = hi.max(x);
            }
        }
    }
    if lo <= hi { (lo, hi) } else { (0.0, 0.0) }
}

/// Stable sort of `items` by Hilbert index, tie-broken by quantized coordinates.
///
/// # Examples
///
/// ```rust
/// use causal_dynamical_triangulations::core::util::hilbert::hilbert_sort_by_stable;
///
/// let mut points = vec![[0.9, 0.9, 0.9], [0.1, 0.1, 0.1], [0.5, 0.5, 0.5]];
/// hilbert_sort_by_stable(&mut points, (0.0, 1.0), 8, |p| *p);
/// assert_eq!(points[0], [0.1, 0.1, 0.1]);
/// ```
pub fn hilbert_sort_by_stable<Item, F>(
    items: &mut [Item],
    bounds: HilbertBounds,
    bits: u32,
    coords_of: F,
) where
    F: Fn(&Item) -> [f64; 3],
{
    let bits = bits.clamp(1, MAX_HILBERT_BITS);
    items.sort_by_cached_key(|item| {
        let q = hilbert_quantize(&coords_of(item), bounds, bits);
        (hilbert_index_from_quantized(&q, bits), q)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_has_index_zero() {
        assert_eq!(hilbert_index(&[0.0, 0.0, 0.0], (0.0, 1.0), 10), 0);
    }

    #[test]
    fn index_is_a_bijection_on_a_small_grid() {
        let bits = 2;
        let mut seen = std::collections::BTreeSet::new();
        for x in 0..4_u32 {
            for y in 0..4_u32 {
                for z in 0..4_u32 {
                    seen.insert(hilbert_index_from_quantized(&[x, y, z], bits));
                }
            }
        }
        assert_eq!(seen.len(), 64);
        assert_eq!(seen.iter().next_back(), Some(&63));
    }

    #[test]
    fn curve_is_continuous_on_grid() {
        let bits = 2;
        let mut cells: Vec<(u64, [u32; 3])> = Vec::new();
        for x in 0..4_u32 {
            for y in 0..4_u32 {
                for z in 0..4_u32 {
                    cells.push((hilbert_index_from_quantized(&[x, y, z], bits), [x, y, z]));
                }
            }
        }
        cells.sort_unstable();
        for pair in cells.windows(2) {
            let step: u32 = pair[0]
                .1
                .iter()
                .zip(&pair[1].1)
                .map(|(a, b)| a.abs_diff(*b))
                .sum();
            assert_eq!(step, 1, "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn quantize_clamps_and_handles_degenerate_bounds() {
        assert_eq!(hilbert_quantize(&[-5.0, 0.0, 9.0], (0.0, 1.0), 4), [0, 0, 15]);
        assert_eq!(hilbert_quantize(&[0.3, 0.6, 0.9], (1.0, 1.0), 4), [0, 0, 0]);
        assert_eq!(hilbert_quantize(&[f64::NAN, 0.0, 0.0], (0.0, 1.0), 4)[0], 0);
    }

    #[test]
    fn quantize_reaches_the_last_cell_at_full_resolution() {
        let max = (1_u32 << MAX_HILBERT_BITS) - 1;
        assert_eq!(
            hilbert_quantize(&[1.0, 0.0, 0.5], (0.0, 1.0), MAX_HILBERT_BITS + 5),
            [max, 0, max / 2]
        );
        assert_eq!(
            hilbert_index(&[1.0, 1.0, 1.0], (0.0, 1.0), 1),
            hilbert_index_from_quantized(&[1, 1, 1], 1)
        );
    }

    #[test]
    fn bounds_cover_all_coordinates() {
        let pts = [[1.0, -2.0, 0.5], [3.0, 0.0, -0.5]];
        assert_eq!(hilbert_bounds(&pts), (-2.0, 3.0));
        assert_eq!(hilbert_bounds(std::iter::empty()), (0.0, 0.0));
    }
}
