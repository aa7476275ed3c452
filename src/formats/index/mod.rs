//! Index formats for block-compressed variant files
//!
//! Two sibling formats map genomic bins to BGZF file offsets:
//!
//! - **TBI (Tabix)**: fixed binning (min_shift=14, depth=5), stores sequence names
//! - **CSI**: configurable binning, supports larger references, no sequence names
//!
//! The partition planner never looks at either format directly. Both parsed
//! indexes implement [`OffsetIndex`], which flattens the index into three
//! aligned arrays of (file offset, contig index, 1-based genomic start).
//!
//! # Example
//!
//! ```no_run
//! use vcf_partition::formats::index::{read_index, OffsetIndex};
//!
//! # fn main() -> vcf_partition::Result<()> {
//! let index = read_index("variants.bcf.csi")?;
//! let offsets = index.offsets();
//! println!("{} bins over {} contigs", offsets.len(), index.record_counts().len());
//! # Ok(())
//! # }
//! ```

pub mod binning;
pub mod csi;
pub mod tbi;

pub use binning::Binning;
pub use csi::CsiIndex;
pub use tbi::TbiIndex;

use crate::error::{PartitionError, Result};
use crate::io::bgzf::Chunk;
use std::io::Read;
use std::path::Path;

/// File extension of CSI indexes
pub const CSI_EXTENSION: &str = ".csi";

/// File extension of Tabix indexes
pub const TABIX_EXTENSION: &str = ".tbi";

/// Flattened view of an index: parallel arrays, one entry per real bin
/// (CSI) or linear-index interval (TBI).
///
/// Within a contig `file_offsets` is non-decreasing. Across contigs it is
/// non-decreasing only if contigs are stored in file order, see
/// [`IndexOffsets::check_sorted`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexOffsets {
    /// Compressed byte offsets into the variant file
    pub file_offsets: Vec<u64>,
    /// Contig index (position in the sequence name list) of each entry
    pub contig_indexes: Vec<usize>,
    /// 1-based genomic start position of each entry
    pub positions: Vec<u64>,
}

impl IndexOffsets {
    /// Create empty offset arrays with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        IndexOffsets {
            file_offsets: Vec::with_capacity(capacity),
            contig_indexes: Vec::with_capacity(capacity),
            positions: Vec::with_capacity(capacity),
        }
    }

    /// Append one aligned entry.
    pub fn push(&mut self, file_offset: u64, contig_index: usize, position: u64) {
        self.file_offsets.push(file_offset);
        self.contig_indexes.push(contig_index);
        self.positions.push(position);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.file_offsets.len()
    }

    /// True if the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.file_offsets.is_empty()
    }

    /// Verify the combined file-offset sequence is non-decreasing, which
    /// binary search over it relies on.
    pub fn check_sorted(&self) -> Result<()> {
        match self.file_offsets.windows(2).position(|w| w[0] > w[1]) {
            None => Ok(()),
            Some(i) => Err(PartitionError::corrupt(format!(
                "file offsets not sorted: offset {} (contig {}) precedes offset {} (contig {})",
                self.file_offsets[i],
                self.contig_indexes[i],
                self.file_offsets[i + 1],
                self.contig_indexes[i + 1]
            ))),
        }
    }
}

/// Capability shared by CSI and TBI indexes: flatten into [`IndexOffsets`].
pub trait OffsetIndex {
    /// File offsets, contig indexes and genomic start positions, grouped by
    /// contig in stored order and sorted by file offset within each contig.
    fn offsets(&self) -> IndexOffsets;

    /// Sequence names embedded in the index, if the format stores them.
    fn sequence_names(&self) -> Option<&[String]> {
        None
    }

    /// Per-contig record counts; `-1` where the contig has no pseudo-bin.
    fn record_counts(&self) -> &[i64];
}

/// An index of either supported format.
#[derive(Debug, Clone)]
pub enum VariantIndex {
    /// Coordinate-sorted index
    Csi(CsiIndex),
    /// Tabix index
    Tbi(TbiIndex),
}

impl OffsetIndex for VariantIndex {
    fn offsets(&self) -> IndexOffsets {
        match self {
            VariantIndex::Csi(index) => index.offsets(),
            VariantIndex::Tbi(index) => index.offsets(),
        }
    }

    fn sequence_names(&self) -> Option<&[String]> {
        match self {
            VariantIndex::Csi(index) => OffsetIndex::sequence_names(index),
            VariantIndex::Tbi(index) => OffsetIndex::sequence_names(index),
        }
    }

    fn record_counts(&self) -> &[i64] {
        match self {
            VariantIndex::Csi(index) => OffsetIndex::record_counts(index),
            VariantIndex::Tbi(index) => OffsetIndex::record_counts(index),
        }
    }
}

/// Read a `.tbi` or `.csi` index, choosing the parser by file extension.
pub fn read_index<P: AsRef<Path>>(path: P) -> Result<VariantIndex> {
    let path = path.as_ref();
    let name = path.to_string_lossy();

    if name.ends_with(TABIX_EXTENSION) {
        Ok(VariantIndex::Tbi(TbiIndex::from_path(path)?))
    } else if name.ends_with(CSI_EXTENSION) {
        Ok(VariantIndex::Csi(CsiIndex::from_path(path)?))
    } else {
        Err(PartitionError::invalid_input(format!(
            "Only .tbi or .csi indexes are supported: {}",
            path.display()
        )))
    }
}

// Helper functions for reading binary data (little-endian)

pub(crate) fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

pub(crate) fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub(crate) fn read_u64<R: Read>(reader: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    reader.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

/// Read a count field that must not be negative.
pub(crate) fn read_count<R: Read>(reader: &mut R, what: &str) -> Result<usize> {
    let value = read_i32(reader)?;
    if value < 0 {
        return Err(PartitionError::invalid_format(format!(
            "Invalid {} count: {}",
            what, value
        )));
    }
    Ok(value as usize)
}

/// Upper bound on capacity reserved from a header count before any data backs it.
const MAX_PREALLOC: usize = 1024;

/// Empty vector for `count` items read from an untrusted header.
pub(crate) fn vec_for_count<T>(count: usize) -> Vec<T> {
    Vec::with_capacity(count.min(MAX_PREALLOC))
}

/// Read exactly `len` bytes without trusting `len` for the allocation.
pub(crate) fn read_bytes<R: Read>(reader: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec_for_count(len);
    reader.take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("expected {} bytes, stream ended after {}", len, buf.len()),
        )
        .into());
    }
    Ok(buf)
}

/// Fill `buf` as far as the stream allows; returns bytes read.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}

/// Read the optional trailing `n_no_coor` field.
///
/// A clean end of stream means the field is absent; a partial field is corruption.
pub(crate) fn read_optional_u64<R: Read>(reader: &mut R) -> Result<Option<u64>> {
    let mut buf = [0u8; 8];
    match read_up_to(reader, &mut buf)? {
        0 => Ok(None),
        8 => Ok(Some(u64::from_le_bytes(buf))),
        n => Err(PartitionError::corrupt(format!(
            "truncated n_no_coor field ({} of 8 bytes)",
            n
        ))),
    }
}

/// Total records stored in a pseudo-bin: its second chunk holds
/// (n_mapped, n_unmapped) instead of virtual offsets.
pub(crate) fn pseudo_bin_record_count(bin_id: u32, chunks: &[Chunk]) -> Result<i64> {
    if chunks.len() != 2 {
        return Err(PartitionError::corrupt(format!(
            "pseudo-bin {} has {} chunks, expected 2",
            bin_id,
            chunks.len()
        )));
    }
    let (n_mapped, n_unmapped) = (chunks[1].start.as_raw(), chunks[1].end.as_raw());
    Ok(n_mapped.wrapping_add(n_unmapped) as i64)
}

/// Require the stream to be exhausted.
pub(crate) fn expect_eof<R: Read>(reader: &mut R) -> Result<()> {
    let mut byte = [0u8; 1];
    if read_up_to(reader, &mut byte)? != 0 {
        return Err(PartitionError::corrupt(
            "unexpected trailing bytes after end of index",
        ));
    }
    Ok(())
}
