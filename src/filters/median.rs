//! Median filters: brute-force reference and optimized backends.
//!
//! The optimized filter slides a kernel-sized window across every row of a
//! channel while a dual-heap tracks the running median and a Fenwick
//! histogram tracks the intensity distribution. Moving the window one column
//! only touches `2 * kernel` samples instead of re-sorting the whole window.
//! A fully vectorized partition-selection backend covers large images, and
//! the brute-force filter is the correctness oracle both are checked
//! against.
//!
//! ## Supported Formats
//!
//! All entry points accept a 2D (height, width) channel or a 3D
//! (height, width, channels) image of `u8` intensities. Channels are
//! filtered independently and restacked in order.

use std::str::FromStr;

use ndarray::{s, Array2, Array3, ArrayD, ArrayView2, ArrayViewD, Axis, Ix2, Ix3};
use rayon::prelude::*;

use crate::dual_heap::DualHeap;
use crate::error::{MedianFilterError, MedianFilterResult};
use crate::fenwick::FenwickTree;
use crate::sliding_window::{pad_channel, ColumnCache, PadMode};

/// Pixel count up to which the auto backend keeps using the heap engine.
pub const AUTO_HEAP_THRESHOLD: usize = 320 * 320;

/// Selectable filtering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Heap engine for small images, vectorized backend above the
    /// pixel-count threshold.
    Auto,
    /// Force the incremental dual-heap engine.
    Heap,
    /// Force the partition-selection backend.
    Vectorized,
}

impl FromStr for Backend {
    type Err = MedianFilterError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "auto" => Ok(Backend::Auto),
            "heap" => Ok(Backend::Heap),
            "vectorized" => Ok(Backend::Vectorized),
            _ => Err(MedianFilterError::UnknownBackend(name.to_string())),
        }
    }
}

/// Saturation-aware blending constants used by the heap backend.
///
/// The defaults are empirical: windows whose near-black/near-white fraction
/// exceeds the threshold are treated as impulse noise and get the raw
/// median; everything else is blended toward the original pixel to keep
/// detail.
#[derive(Debug, Clone, Copy)]
pub struct FusionConfig {
    /// Saturated-sample fraction above which the median is trusted fully.
    pub saturation_threshold: f32,
    /// Weight of the median in the blended output.
    pub median_weight: f32,
    /// Weight of the original center pixel in the blended output.
    pub center_weight: f32,
    /// Top of the near-black intensity range (inclusive).
    pub dark_max: isize,
    /// Bottom of the near-white intensity range (inclusive).
    pub bright_min: isize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        FusionConfig {
            saturation_threshold: 0.25,
            median_weight: 0.7,
            center_weight: 0.3,
            dark_max: 8,
            bright_min: 247,
        }
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Reference implementation that sorts every kernel-sized window.
///
/// # Arguments
/// * `image` - 2D channel or 3D (height, width, channels) image
/// * `kernel` - odd window side length, at least 3
///
/// # Returns
/// Filtered array of the same shape, or an error for invalid arguments.
pub fn brute_force_median(
    image: ArrayViewD<'_, u8>,
    kernel: usize,
) -> MedianFilterResult<ArrayD<u8>> {
    validate_kernel(kernel)?;
    apply_per_channel(image, |channel| brute_force_channel(channel, kernel))
}

/// Optimized sliding-window median with adaptive backend selection.
///
/// # Arguments
/// * `image` - 2D channel or 3D (height, width, channels) image
/// * `kernel` - odd window side length, at least 3
/// * `pad_mode` - boundary rule for the heap backend, "reflect" or "edge"
/// * `backend` - "auto", "heap" or "vectorized"
/// * `auto_threshold` - pixel count up to which "auto" stays on the heap
///   engine; 0 disables the heap engine for "auto"
///
/// # Returns
/// Filtered array of the same shape, or an error for invalid arguments.
pub fn optimized_median_filter(
    image: ArrayViewD<'_, u8>,
    kernel: usize,
    pad_mode: &str,
    backend: &str,
    auto_threshold: usize,
) -> MedianFilterResult<ArrayD<u8>> {
    optimized_median_filter_with(
        image,
        kernel,
        pad_mode,
        backend,
        auto_threshold,
        &FusionConfig::default(),
    )
}

/// Like [`optimized_median_filter`], with caller-supplied fusion constants.
pub fn optimized_median_filter_with(
    image: ArrayViewD<'_, u8>,
    kernel: usize,
    pad_mode: &str,
    backend: &str,
    auto_threshold: usize,
    fusion: &FusionConfig,
) -> MedianFilterResult<ArrayD<u8>> {
    validate_kernel(kernel)?;
    let backend = Backend::from_str(backend)?;
    let pad_mode = PadMode::from_str(pad_mode)?;
    if image.ndim() != 2 && image.ndim() != 3 {
        return Err(MedianFilterError::InvalidRank(image.ndim()));
    }

    let pixel_count = image.shape()[0] * image.shape()[1];
    let use_heap = backend == Backend::Heap
        || (backend == Backend::Auto && auto_threshold > 0 && pixel_count <= auto_threshold);

    if use_heap {
        apply_per_channel(image, |channel| {
            heap_channel(channel, kernel, pad_mode, fusion)
        })
    } else {
        apply_per_channel(image, |channel| vectorized_channel(channel, kernel))
    }
}

fn validate_kernel(kernel: usize) -> MedianFilterResult<()> {
    if kernel % 2 == 0 || kernel < 3 {
        return Err(MedianFilterError::InvalidKernel(kernel));
    }
    Ok(())
}

/// Run a channel filter over a rank-2 or rank-3 array.
///
/// Channels of a rank-3 image share no state, so they fan out across the
/// rayon pool and are restacked in their original order.
fn apply_per_channel<F>(image: ArrayViewD<'_, u8>, filter: F) -> MedianFilterResult<ArrayD<u8>>
where
    F: Fn(ArrayView2<'_, u8>) -> Array2<u8> + Sync,
{
    match image.ndim() {
        2 => {
            let channel = image
                .into_dimensionality::<Ix2>()
                .expect("rank checked above");
            Ok(filter(channel).into_dyn())
        }
        3 => {
            let stacked = image
                .into_dimensionality::<Ix3>()
                .expect("rank checked above");
            let (height, width, channels) = stacked.dim();
            let filtered: Vec<Array2<u8>> = (0..channels)
                .into_par_iter()
                .map(|idx| filter(stacked.index_axis(Axis(2), idx)))
                .collect();
            let mut output = Array3::<u8>::zeros((height, width, channels));
            for (idx, channel) in filtered.into_iter().enumerate() {
                output.index_axis_mut(Axis(2), idx).assign(&channel);
            }
            Ok(output.into_dyn())
        }
        other => Err(MedianFilterError::InvalidRank(other)),
    }
}

// ============================================================================
// Brute-force reference
// ============================================================================

fn brute_force_channel(channel: ArrayView2<'_, u8>, kernel: usize) -> Array2<u8> {
    let padded = pad_channel(channel, kernel, PadMode::Reflect);
    let (height, width) = channel.dim();
    let mut window = Vec::with_capacity(kernel * kernel);
    let mut output = Array2::<u8>::zeros((height, width));

    for row in 0..height {
        for col in 0..width {
            window.clear();
            window.extend(padded.slice(s![row..row + kernel, col..col + kernel]).iter());
            output[[row, col]] = sorted_median(&mut window);
        }
    }

    output
}

/// Median of a non-empty window by full sort.
pub fn sorted_median(window: &mut [u8]) -> u8 {
    window.sort_unstable();
    window[window.len() / 2]
}

/// Median of a non-empty window by insertion sort.
///
/// Elementary reference level kept alongside [`sorted_median`] so the test
/// suite can show both agree with the incremental structures.
pub fn insertion_median(window: &mut [u8]) -> u8 {
    for i in 1..window.len() {
        let mut j = i;
        while j > 0 && window[j - 1] > window[j] {
            window.swap(j - 1, j);
            j -= 1;
        }
    }
    window[window.len() / 2]
}

// ============================================================================
// Vectorized backend
// ============================================================================

/// Exact window medians by partition selection, no incremental state and no
/// fusion heuristic. Always reflect-padded so it matches the brute-force
/// reference element for element.
fn vectorized_channel(channel: ArrayView2<'_, u8>, kernel: usize) -> Array2<u8> {
    let padded = pad_channel(channel, kernel, PadMode::Reflect);
    let (height, width) = channel.dim();
    let median_index = kernel * kernel / 2;
    let mut window = Vec::with_capacity(kernel * kernel);
    let mut output = Array2::<u8>::zeros((height, width));

    for row in 0..height {
        for col in 0..width {
            window.clear();
            window.extend(padded.slice(s![row..row + kernel, col..col + kernel]).iter());
            let (_, median, _) = window.select_nth_unstable(median_index);
            output[[row, col]] = *median;
        }
    }

    output
}

// ============================================================================
// Heap backend
// ============================================================================

/// Incremental window engine for one channel.
///
/// Every output row gets a fresh dual-heap, histogram and column cache; the
/// window is seeded from the first kernel-sized block and then slid one
/// column at a time.
fn heap_channel(
    channel: ArrayView2<'_, u8>,
    kernel: usize,
    pad_mode: PadMode,
    fusion: &FusionConfig,
) -> Array2<u8> {
    let pad = kernel / 2;
    let padded = pad_channel(channel, kernel, pad_mode);
    let (height, width) = channel.dim();
    let window_area = (kernel * kernel) as f32;
    let mut output = Array2::<f32>::zeros((height, width));

    for row in 0..height {
        let mut heap = DualHeap::new();
        let mut histogram = FenwickTree::new(255);
        let mut cache = ColumnCache::new(padded.view(), kernel, row);

        for &value in padded.slice(s![row..row + kernel, 0..kernel]).iter() {
            add_sample(&mut heap, &mut histogram, value);
        }

        for col in 0..width {
            let center = padded[[row + pad, col + pad]] as f32;
            output[[row, col]] = fuse_pixel(center, &mut heap, &histogram, window_area, fusion);
            if col == width - 1 {
                continue;
            }
            slide_column(&mut heap, &mut histogram, &mut cache, col, kernel);
        }
    }

    output.mapv(|v| v.clamp(0.0, 255.0) as u8)
}

/// Retire the outgoing column and admit the incoming one, keeping the
/// histogram in lockstep with every heap update.
fn slide_column(
    heap: &mut DualHeap,
    histogram: &mut FenwickTree,
    cache: &mut ColumnCache<'_>,
    col: usize,
    kernel: usize,
) {
    for &value in cache.get(col) {
        remove_sample(heap, histogram, value);
    }
    for &value in cache.get(col + kernel) {
        add_sample(heap, histogram, value);
    }
}

fn add_sample(heap: &mut DualHeap, histogram: &mut FenwickTree, value: u8) {
    heap.insert(u32::from(value));
    histogram.update(value as isize, 1);
}

fn remove_sample(heap: &mut DualHeap, histogram: &mut FenwickTree, value: u8) {
    heap.erase(u32::from(value));
    histogram.update(value as isize, -1);
}

/// Blend the window median with the center pixel based on how saturated the
/// window's intensity distribution is.
fn fuse_pixel(
    center: f32,
    heap: &mut DualHeap,
    histogram: &FenwickTree,
    window_area: f32,
    fusion: &FusionConfig,
) -> f32 {
    let median = heap.median();
    let saturated =
        histogram.range_sum(0, fusion.dark_max) + histogram.range_sum(fusion.bright_min, 255);
    let ratio = saturated as f32 / window_area.max(1.0);
    if ratio > fusion.saturation_threshold {
        median
    } else {
        fusion.median_weight * median + fusion.center_weight * center
    }
}
