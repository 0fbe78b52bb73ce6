//! Median Filtering Toolkit
//!
//! High-performance sliding-window median filtering implemented in Rust
//! with optional Python bindings via PyO3.
//!
//! ## Image Format
//! Filters operate on `u8` intensity arrays of rank 2 or 3:
//! - **Grayscale**: (height, width)
//! - **Color**: (height, width, channels) - each channel filtered
//!   independently
//!
//! ## Architecture
//! Three interchangeable backends compute the window median:
//! - **heap**: incremental dual-heap engine with a Fenwick intensity
//!   histogram driving a saturation-aware blend of median and source pixel
//! - **vectorized**: batch partition selection over every window, exact
//!   medians with no heuristics
//! - **brute force**: full sort of every window, the correctness oracle
//!
//! The `auto` backend picks heap or vectorized from the image's pixel
//! count. Salt-and-pepper injection and a PSNR metric round out the
//! toolkit for end-to-end denoising runs.

pub mod dual_heap;
pub mod error;
pub mod fenwick;
pub mod filters;
pub mod metrics;
pub mod sliding_window;

pub use dual_heap::DualHeap;
pub use error::{MedianFilterError, MedianFilterResult};
pub use fenwick::FenwickTree;
pub use filters::median::{
    brute_force_median, optimized_median_filter, optimized_median_filter_with, Backend,
    FusionConfig, AUTO_HEAP_THRESHOLD,
};
pub use filters::noise::add_salt_pepper_noise;
pub use metrics::psnr;
pub use sliding_window::{pad_channel, ColumnCache, PadMode};

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArrayDyn, PyReadonlyArrayDyn};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::filters::median::{self, AUTO_HEAP_THRESHOLD};
    use crate::filters::noise;
    use crate::metrics;

    /// Reference median filter that sorts every kernel-sized window.
    #[pyfunction]
    pub fn brute_force_median<'py>(
        py: Python<'py>,
        image: PyReadonlyArrayDyn<'py, u8>,
        kernel: usize,
    ) -> PyResult<Bound<'py, PyArrayDyn<u8>>> {
        let result = median::brute_force_median(image.as_array(), kernel)
            .map_err(|err| PyValueError::new_err(err.to_string()))?;
        Ok(result.into_pyarray(py))
    }

    /// Optimized sliding-window median with adaptive backend selection.
    ///
    /// # Arguments
    /// * `image` - 2D grayscale or 3D (H, W, C) u8 array
    /// * `kernel` - odd window side length, at least 3
    /// * `pad_mode` - "reflect" (default) or "edge"
    /// * `backend` - "auto" (default), "heap" or "vectorized"
    /// * `auto_threshold` - pixel cutoff for the "auto" backend
    #[pyfunction]
    #[pyo3(signature = (image, kernel, pad_mode="reflect", backend="auto", auto_threshold=AUTO_HEAP_THRESHOLD))]
    pub fn optimized_median_filter<'py>(
        py: Python<'py>,
        image: PyReadonlyArrayDyn<'py, u8>,
        kernel: usize,
        pad_mode: &str,
        backend: &str,
        auto_threshold: usize,
    ) -> PyResult<Bound<'py, PyArrayDyn<u8>>> {
        let result = median::optimized_median_filter(
            image.as_array(),
            kernel,
            pad_mode,
            backend,
            auto_threshold,
        )
        .map_err(|err| PyValueError::new_err(err.to_string()))?;
        Ok(result.into_pyarray(py))
    }

    /// Inject deterministic salt-and-pepper noise.
    #[pyfunction]
    #[pyo3(signature = (image, amount=0.05, salt_vs_pepper=0.5, seed=0))]
    pub fn add_salt_pepper_noise<'py>(
        py: Python<'py>,
        image: PyReadonlyArrayDyn<'py, u8>,
        amount: f32,
        salt_vs_pepper: f32,
        seed: u64,
    ) -> PyResult<Bound<'py, PyArrayDyn<u8>>> {
        let result = noise::add_salt_pepper_noise(image.as_array(), amount, salt_vs_pepper, seed)
            .map_err(|err| PyValueError::new_err(err.to_string()))?;
        Ok(result.into_pyarray(py))
    }

    /// Peak Signal-to-Noise Ratio between two same-shape images.
    #[pyfunction]
    #[pyo3(signature = (reference, test, max_value=255.0))]
    pub fn psnr(
        reference: PyReadonlyArrayDyn<'_, u8>,
        test: PyReadonlyArrayDyn<'_, u8>,
        max_value: f64,
    ) -> PyResult<f64> {
        metrics::psnr(reference.as_array(), test.as_array(), max_value)
            .map_err(|err| PyValueError::new_err(err.to_string()))
    }

    /// Median filtering extension module
    #[pymodule]
    pub fn medfilt_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(brute_force_median, m)?)?;
        m.add_function(wrap_pyfunction!(optimized_median_filter, m)?)?;
        m.add_function(wrap_pyfunction!(add_salt_pepper_noise, m)?)?;
        m.add_function(wrap_pyfunction!(psnr, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::medfilt_rust;
