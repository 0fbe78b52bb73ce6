//! Image quality metrics for comparing filter output against a reference.

use ndarray::ArrayViewD;

use crate::error::{MedianFilterError, MedianFilterResult};

/// Peak Signal-to-Noise Ratio in decibels.
///
/// Returns `f64::INFINITY` when the images are identical.
///
/// # Arguments
/// * `reference` - ground-truth image
/// * `test` - image to score, same shape as `reference`
/// * `max_value` - maximum representable intensity (255 for u8 images)
pub fn psnr(
    reference: ArrayViewD<'_, u8>,
    test: ArrayViewD<'_, u8>,
    max_value: f64,
) -> MedianFilterResult<f64> {
    if reference.shape() != test.shape() {
        return Err(MedianFilterError::InvalidParameter(
            "psnr requires images of the same shape".to_string(),
        ));
    }

    let mut squared_error = 0.0f64;
    for (&a, &b) in reference.iter().zip(test.iter()) {
        let diff = a as f64 - b as f64;
        squared_error += diff * diff;
    }
    let mse = squared_error / reference.len() as f64;

    if mse == 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok(10.0 * ((max_value * max_value) / mse).log10())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_identical_images_have_infinite_psnr() {
        let image = Array2::<u8>::from_elem((8, 8), 17);
        let score = psnr(image.view().into_dyn(), image.view().into_dyn(), 255.0).unwrap();
        assert!(score.is_infinite());
    }

    #[test]
    fn test_maximally_different_images_score_zero() {
        let black = Array2::<u8>::zeros((4, 4));
        let white = Array2::<u8>::from_elem((4, 4), 255);
        let score = psnr(black.view().into_dyn(), white.view().into_dyn(), 255.0).unwrap();
        assert!(score.abs() < 1e-9);
    }

    #[test]
    fn test_known_error_level() {
        let reference = Array2::<u8>::from_elem((4, 4), 100);
        let test = Array2::<u8>::from_elem((4, 4), 102);
        // MSE of 4 against a 255 peak: 10 * log10(255^2 / 4).
        let score = psnr(reference.view().into_dyn(), test.view().into_dyn(), 255.0).unwrap();
        assert!((score - 42.11).abs() < 1e-2);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let a = Array2::<u8>::zeros((4, 4));
        let b = Array2::<u8>::zeros((4, 5));
        assert!(psnr(a.view().into_dyn(), b.view().into_dyn(), 255.0).is_err());
    }
}
