//! Sliding-window helpers shared by the brute-force and optimized filters.
//!
//! Provides boundary padding for a single channel and the per-row column
//! cache that lets the window engine re-read vertical strips without going
//! back to the padded array.

use std::collections::HashMap;
use std::str::FromStr;

use ndarray::{s, Array2, ArrayView2};

use crate::error::MedianFilterError;

/// Boundary extension rule applied before filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadMode {
    /// Mirror across the edge without repeating the edge pixel.
    Reflect,
    /// Repeat the edge pixel.
    Edge,
}

impl FromStr for PadMode {
    type Err = MedianFilterError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "reflect" => Ok(PadMode::Reflect),
            "edge" => Ok(PadMode::Edge),
            other => Err(MedianFilterError::UnknownPadMode(other.to_string())),
        }
    }
}

/// Map a possibly out-of-range coordinate back into `0..len`.
///
/// Reflection has period `2 * (len - 1)`, which keeps the mapping correct
/// even when the pad is wider than the channel itself.
fn resolve_index(x: isize, len: usize, mode: PadMode) -> usize {
    match mode {
        PadMode::Edge => x.clamp(0, len as isize - 1) as usize,
        PadMode::Reflect => {
            if len == 1 {
                return 0;
            }
            let period = 2 * (len as isize - 1);
            let x = x.rem_euclid(period);
            if x >= len as isize {
                (period - x) as usize
            } else {
                x as usize
            }
        }
    }
}

/// Extend a channel by `kernel / 2` pixels on every side.
pub fn pad_channel(channel: ArrayView2<u8>, kernel: usize, mode: PadMode) -> Array2<u8> {
    let pad = kernel / 2;
    let (height, width) = channel.dim();
    Array2::from_shape_fn((height + 2 * pad, width + 2 * pad), |(row, col)| {
        let src_row = resolve_index(row as isize - pad as isize, height, mode);
        let src_col = resolve_index(col as isize - pad as isize, width, mode);
        channel[[src_row, src_col]]
    })
}

/// Memoizes the vertical strips of one row band of the padded channel.
///
/// Strips are copied out of the padded array on first access and served
/// from the store afterwards; a cache lives for exactly one output row, so
/// there is no eviction.
pub struct ColumnCache<'a> {
    padded: ArrayView2<'a, u8>,
    kernel: usize,
    base_row: usize,
    store: HashMap<usize, Vec<u8>>,
    fetches: usize,
}

impl<'a> ColumnCache<'a> {
    pub fn new(padded: ArrayView2<'a, u8>, kernel: usize, base_row: usize) -> Self {
        ColumnCache {
            padded,
            kernel,
            base_row,
            store: HashMap::new(),
            fetches: 0,
        }
    }

    /// Vertical strip of `kernel` pixels at `column` within the row band.
    pub fn get(&mut self, column: usize) -> &[u8] {
        if !self.store.contains_key(&column) {
            let strip = self
                .padded
                .slice(s![self.base_row..self.base_row + self.kernel, column])
                .to_vec();
            self.fetches += 1;
            self.store.insert(column, strip);
        }
        &self.store[&column]
    }

    /// Number of reads that went back to the padded array.
    pub fn fetches(&self) -> usize {
        self.fetches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_pad_reflect() {
        let channel = array![[1u8, 2], [3, 4]];
        let padded = pad_channel(channel.view(), 3, PadMode::Reflect);
        let expected = array![
            [4u8, 3, 4, 3],
            [2, 1, 2, 1],
            [4, 3, 4, 3],
            [2, 1, 2, 1],
        ];
        assert_eq!(padded, expected);
    }

    #[test]
    fn test_pad_edge() {
        let channel = array![[1u8, 2], [3, 4]];
        let padded = pad_channel(channel.view(), 3, PadMode::Edge);
        let expected = array![
            [1u8, 1, 2, 2],
            [1, 1, 2, 2],
            [3, 3, 4, 4],
            [3, 3, 4, 4],
        ];
        assert_eq!(padded, expected);
    }

    #[test]
    fn test_pad_wider_than_channel() {
        // kernel 7 on a 2-row channel: the reflection has to bounce more
        // than once.
        let channel = array![[10u8, 20]];
        let padded = pad_channel(channel.view(), 7, PadMode::Reflect);
        assert_eq!(padded.dim(), (7, 8));
        for row in 0..7 {
            assert_eq!(padded[[row, 3]], 10);
            assert_eq!(padded[[row, 4]], 20);
        }
    }

    #[test]
    fn test_pad_mode_names() {
        assert_eq!("reflect".parse::<PadMode>().unwrap(), PadMode::Reflect);
        assert_eq!("edge".parse::<PadMode>().unwrap(), PadMode::Edge);
        assert!("mirror".parse::<PadMode>().is_err());
    }

    #[test]
    fn test_column_cache_fetches_once() {
        let padded = array![
            [1u8, 2, 3],
            [4, 5, 6],
            [7, 8, 9],
        ];
        let mut cache = ColumnCache::new(padded.view(), 3, 0);

        let first = cache.get(1).to_vec();
        assert_eq!(first, vec![2, 5, 8]);
        assert_eq!(cache.fetches(), 1);

        let second = cache.get(1).to_vec();
        assert_eq!(second, first);
        assert_eq!(cache.fetches(), 1);

        cache.get(0);
        assert_eq!(cache.fetches(), 2);
    }

    #[test]
    fn test_column_cache_respects_base_row() {
        let padded = array![
            [1u8, 2],
            [3, 4],
            [5, 6],
            [7, 8],
        ];
        let mut cache = ColumnCache::new(padded.view(), 3, 1);
        assert_eq!(cache.get(0), &[3, 5, 7]);
    }
}
