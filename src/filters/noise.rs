//! Salt-and-pepper noise injection.
//!
//! Produces the impulse-noise inputs the median filters are built to clean
//! up. Noise placement is deterministic for a given seed so filter runs can
//! be compared against each other.

use ndarray::{ArrayD, ArrayViewD, Ix2, Ix3};

use crate::error::{MedianFilterError, MedianFilterResult};

// ============================================================================
// Simple RNG (deterministic for parity testing)
// ============================================================================

/// Simple linear congruential generator for deterministic noise.
/// Uses MINSTD parameters.
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng {
            state: seed.wrapping_add(1), // Avoid zero
        }
    }

    /// Generate next random u32.
    fn next_u32(&mut self) -> u32 {
        // MINSTD LCG
        self.state = self.state.wrapping_mul(48271).wrapping_add(1) % 2147483647;
        self.state as u32
    }

    /// Generate uniform random f32 in [0, 1).
    fn next_f32(&mut self) -> f32 {
        (self.next_u32() as f32) / (2147483647.0f32)
    }
}

// ============================================================================
// Salt & Pepper
// ============================================================================

/// Return a noisy copy of the input image.
///
/// One uniform draw per pixel decides its fate: draws below
/// `amount * salt_vs_pepper` become salt (255), draws below `amount` become
/// pepper (0), the rest keep their value. A 3D image gets the same mask on
/// every channel of a pixel, so impulses stay colorless.
///
/// # Arguments
/// * `image` - 2D channel or 3D (height, width, channels) image
/// * `amount` - fraction of pixels to corrupt, in [0, 1]
/// * `salt_vs_pepper` - salt share of the corrupted pixels, in [0, 1]
/// * `seed` - random seed for deterministic results
///
/// # Returns
/// Noisy image with the input's shape, or an error for invalid arguments.
pub fn add_salt_pepper_noise(
    image: ArrayViewD<'_, u8>,
    amount: f32,
    salt_vs_pepper: f32,
    seed: u64,
) -> MedianFilterResult<ArrayD<u8>> {
    if !(0.0..=1.0).contains(&amount) {
        return Err(MedianFilterError::InvalidParameter(
            "amount must lie in [0, 1]".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&salt_vs_pepper) {
        return Err(MedianFilterError::InvalidParameter(
            "salt_vs_pepper must lie in [0, 1]".to_string(),
        ));
    }
    if image.ndim() != 2 && image.ndim() != 3 {
        return Err(MedianFilterError::InvalidRank(image.ndim()));
    }

    let mut noisy = image.to_owned();
    if amount == 0.0 {
        return Ok(noisy);
    }

    let salt_threshold = amount * salt_vs_pepper;
    let pepper_threshold = amount;
    let mut rng = SimpleRng::new(seed);

    if noisy.ndim() == 2 {
        let mut channel = noisy
            .view_mut()
            .into_dimensionality::<Ix2>()
            .expect("rank checked above");
        let (height, width) = channel.dim();
        for row in 0..height {
            for col in 0..width {
                let draw = rng.next_f32();
                if draw < salt_threshold {
                    channel[[row, col]] = 255;
                } else if draw < pepper_threshold {
                    channel[[row, col]] = 0;
                }
            }
        }
    } else {
        let mut stacked = noisy
            .view_mut()
            .into_dimensionality::<Ix3>()
            .expect("rank checked above");
        let (height, width, channels) = stacked.dim();
        for row in 0..height {
            for col in 0..width {
                let draw = rng.next_f32();
                if draw < salt_threshold {
                    for c in 0..channels {
                        stacked[[row, col, c]] = 255;
                    }
                } else if draw < pepper_threshold {
                    for c in 0..channels {
                        stacked[[row, col, c]] = 0;
                    }
                }
            }
        }
    }

    Ok(noisy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3, IxDyn};

    #[test]
    fn test_deterministic_for_same_seed() {
        let image = Array2::<u8>::from_elem((16, 16), 128);
        let first = add_salt_pepper_noise(image.view().into_dyn(), 0.2, 0.5, 77).unwrap();
        let second = add_salt_pepper_noise(image.view().into_dyn(), 0.2, 0.5, 77).unwrap();
        assert_eq!(first, second);

        let other_seed = add_salt_pepper_noise(image.view().into_dyn(), 0.2, 0.5, 78).unwrap();
        assert_ne!(first, other_seed);
    }

    #[test]
    fn test_zero_amount_leaves_image_untouched() {
        let image = Array2::<u8>::from_elem((8, 8), 42);
        let noisy = add_salt_pepper_noise(image.view().into_dyn(), 0.0, 0.5, 1).unwrap();
        assert_eq!(noisy, image.into_dyn());
    }

    #[test]
    fn test_full_amount_saturates_every_pixel() {
        let image = Array2::<u8>::from_elem((8, 8), 42);

        let salted = add_salt_pepper_noise(image.view().into_dyn(), 1.0, 1.0, 5).unwrap();
        assert!(salted.iter().all(|&v| v == 255));

        let peppered = add_salt_pepper_noise(image.view().into_dyn(), 1.0, 0.0, 5).unwrap();
        assert!(peppered.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_impulses_are_colorless_on_color_images() {
        let image = Array3::<u8>::from_elem((12, 12, 3), 100);
        let noisy = add_salt_pepper_noise(image.view().into_dyn(), 0.5, 0.5, 9).unwrap();
        for row in 0..12 {
            for col in 0..12 {
                let pixel: Vec<u8> = (0..3).map(|c| noisy[IxDyn(&[row, col, c])]).collect();
                assert!(
                    pixel == vec![255, 255, 255]
                        || pixel == vec![0, 0, 0]
                        || pixel == vec![100, 100, 100]
                );
            }
        }
    }

    #[test]
    fn test_out_of_range_amounts_rejected() {
        let image = Array2::<u8>::zeros((4, 4));
        assert!(add_salt_pepper_noise(image.view().into_dyn(), -0.1, 0.5, 0).is_err());
        assert!(add_salt_pepper_noise(image.view().into_dyn(), 1.1, 0.5, 0).is_err());
        assert!(add_salt_pepper_noise(image.view().into_dyn(), 0.5, -0.1, 0).is_err());
        assert!(add_salt_pepper_noise(image.view().into_dyn(), 0.5, 1.1, 0).is_err());
    }
}
