//! Hierarchical binning geometry shared by CSI and TBI.
//!
//! Bins form a fixed-depth 8-ary interval tree over one contig's coordinate
//! space. Level 0 is a single bin covering the whole contig; level `L` holds
//! `8^L` bins. Bin ids are assigned breadth-first, so the first bin of level
//! `L` is the number of bins in all shallower levels, `(8^L - 1) / 7`.
//!
//! Default CSI parameters (min_shift=14, depth=5), also fixed for TBI:
//! - Level 0: 1 bin (512 Mbp)
//! - Level 1: 8 bins (64 Mbp each)
//! - Level 2: 64 bins (8 Mbp each)
//! - Level 3: 512 bins (1 Mbp each)
//! - Level 4: 4096 bins (128 Kbp each)
//! - Level 5: 32768 bins (16 Kbp each)
//!
//! The id one past the last real bin is the *pseudo-bin*, which stores
//! per-contig record counts instead of interval data.

use crate::error::{PartitionError, Result};

/// Largest `min_shift + 3 * depth` accepted; keeps the root span within `u64`.
const MAX_TOTAL_SHIFT: u32 = 62;

/// Deepest tree whose bin ids (including the pseudo-bin) fit in a `u32`.
const MAX_DEPTH: u32 = 10;

/// Number of bins in all levels shallower than `level`.
#[inline]
pub fn first_bin_in_level(level: u32) -> u32 {
    (((1u64 << (3 * level)) - 1) / 7) as u32
}

/// Number of bins at `level`.
#[inline]
pub fn level_size(level: u32) -> u32 {
    (1u64 << (3 * level)) as u32
}

/// Binning parameters of one index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binning {
    min_shift: u32,
    depth: u32,
}

impl Binning {
    /// The fixed scheme used by BAI and TBI (16 Kbp leaves, 5 levels).
    pub const TABIX: Binning = Binning {
        min_shift: 14,
        depth: 5,
    };

    /// Validate header values read from an index.
    pub fn new(min_shift: i32, depth: i32) -> Result<Self> {
        if min_shift < 0 || depth < 0 {
            return Err(PartitionError::invalid_format(format!(
                "Invalid binning parameters: min_shift={}, depth={}",
                min_shift, depth
            )));
        }

        let (min_shift, depth) = (min_shift as u32, depth as u32);
        if depth > MAX_DEPTH || min_shift + 3 * depth > MAX_TOTAL_SHIFT {
            return Err(PartitionError::invalid_format(format!(
                "Unsupported binning parameters: min_shift={}, depth={}",
                min_shift, depth
            )));
        }

        Ok(Binning { min_shift, depth })
    }

    /// log2 of the smallest bin's genomic span.
    pub fn min_shift(&self) -> u32 {
        self.min_shift
    }

    /// Number of levels below the root.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Total number of real bins, `(8^(depth+1) - 1) / 7`.
    pub fn bin_limit(&self) -> u32 {
        first_bin_in_level(self.depth + 1)
    }

    /// Reserved id holding per-contig record counts.
    pub fn pseudo_bin(&self) -> u32 {
        self.bin_limit() + 1
    }

    /// Tree level of `bin`: the deepest level whose first bin is `<= bin`.
    pub fn level_for_bin(&self, bin: u32) -> u32 {
        (0..=self.depth)
            .rev()
            .find(|&level| first_bin_in_level(level) <= bin)
            // level 0 starts at bin 0, so the search never comes up empty
            .unwrap_or(0)
    }

    /// Genomic span of the root bin, `2^(min_shift + 3*depth)`.
    pub fn root_span(&self) -> u64 {
        1u64 << (self.min_shift + 3 * self.depth)
    }

    /// Reject bin ids past the pseudo-bin.
    pub fn check_bin(&self, bin: u32) -> Result<()> {
        if bin > self.pseudo_bin() {
            return Err(PartitionError::invalid_format(format!(
                "bin {} out of range for min_shift={}, depth={} (pseudo-bin is {})",
                bin,
                self.min_shift,
                self.depth,
                self.pseudo_bin()
            )));
        }
        Ok(())
    }

    /// Leftmost 1-based genomic coordinate covered by `bin`.
    ///
    /// Only meaningful for real bins (`bin < bin_limit()`); larger ids
    /// saturate instead of overflowing.
    pub fn first_locus_in_bin(&self, bin: u32) -> u64 {
        let level = self.level_for_bin(bin);
        let first = first_bin_in_level(level);
        let span = self.root_span() / level_size(level) as u64;
        ((bin - first) as u64).saturating_mul(span).saturating_add(1)
    }
}

impl Default for Binning {
    fn default() -> Self {
        Binning::TABIX
    }
}
