//! Dot placement: rejection sampling inside one polygon and area-proportional
//! allocation across the parts of a region.

pub mod allocate;
pub mod sampler;

pub use allocate::RegionAllocator;
pub use sampler::{PolygonSampler, SamplerConfig};

/// Round half to even and clamp to a non-negative count.
///
/// Non-finite input yields 0.
pub fn round_half_even(value: f64) -> usize {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.round_ties_even() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_half_even(0.5), 0);
        assert_eq!(round_half_even(1.5), 2);
        assert_eq!(round_half_even(2.5), 2);
        assert_eq!(round_half_even(3.5), 4);
        assert_eq!(round_half_even(2.4999), 2);
        assert_eq!(round_half_even(2.5001), 3);
        assert_eq!(round_half_even(7.0), 7);
    }

    #[test]
    fn test_round_half_even_clamps() {
        assert_eq!(round_half_even(-3.0), 0);
        assert_eq!(round_half_even(f64::NAN), 0);
        assert_eq!(round_half_even(f64::INFINITY), 0);
    }
}
