//! BGZF virtual file offsets and chunks.
//!
//! Both CSI and TBI indexes address the compressed variant file through BGZF
//! virtual file offsets, which combine:
//! - **Compressed offset** (high 48 bits): byte position of a BGZF block in the file
//! - **Uncompressed offset** (low 16 bits): position within the decompressed block
//!
//! Partition planning only ever needs the compressed component, see [`file_offset`].

/// Mask for the 48-bit compressed block address.
const ADDRESS_MASK: u64 = 0xFFFF_FFFF_FFFF;

/// Convert a block-compressed virtual file pointer to a real file byte offset.
///
/// Total over all 64-bit inputs; the low 16 bits never affect the result.
///
/// # Example
///
/// ```
/// use vcf_partition::io::bgzf::file_offset;
///
/// assert_eq!(file_offset(1024 << 16 | 77), 1024);
/// assert_eq!(file_offset(u64::MAX), 0xFFFF_FFFF_FFFF);
/// ```
#[inline]
pub fn file_offset(vfp: u64) -> u64 {
    (vfp >> 16) & ADDRESS_MASK
}

/// Virtual file offset in BGZF format.
///
/// A 64-bit value combining:
/// - Bits 63-16: Compressed file offset
/// - Bits 15-0: Uncompressed offset within decompressed block
///
/// # Example
///
/// ```
/// # use vcf_partition::io::bgzf::VirtualOffset;
/// let offset = VirtualOffset::new(1024, 512);
/// assert_eq!(offset.compressed_offset(), 1024);
/// assert_eq!(offset.uncompressed_offset(), 512);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualOffset(u64);

impl VirtualOffset {
    /// Create a new virtual offset from compressed and uncompressed components.
    pub fn new(compressed: u64, uncompressed: u16) -> Self {
        VirtualOffset((compressed << 16) | (uncompressed as u64))
    }

    /// Create from raw 64-bit value.
    pub fn from_raw(value: u64) -> Self {
        VirtualOffset(value)
    }

    /// Get raw 64-bit value.
    pub fn as_raw(self) -> u64 {
        self.0
    }

    /// Get compressed file offset (high 48 bits).
    pub fn compressed_offset(self) -> u64 {
        file_offset(self.0)
    }

    /// Get uncompressed offset within block (low 16 bits).
    pub fn uncompressed_offset(self) -> u16 {
        (self.0 & 0xFFFF) as u16
    }
}

impl From<u64> for VirtualOffset {
    fn from(value: u64) -> Self {
        VirtualOffset(value)
    }
}

/// A contiguous run of compressed data relevant to a bin.
///
/// Each chunk is defined by start and end virtual file offsets. In the
/// pseudo-bin of a contig the same two fields hold record counters instead;
/// the index parsers reinterpret them, the type itself stays generic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// Virtual file offset where chunk starts
    pub start: VirtualOffset,
    /// Virtual file offset where chunk ends
    pub end: VirtualOffset,
}

impl Chunk {
    /// Create a new chunk.
    pub fn new(start: VirtualOffset, end: VirtualOffset) -> Self {
        Chunk { start, end }
    }
}
