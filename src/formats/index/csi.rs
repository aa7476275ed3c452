//! CSI (Coordinate-Sorted Index) format support
//!
//! This module implements parsing of CSI index files (.csi), the index format
//! `bcftools index` writes for BCF and VCF files. Unlike TBI it has
//! configurable binning parameters and does not store sequence names.
//!
//! # Format Specification
//!
//! All integers little-endian:
//!
//! ## Header
//! - Magic: "CSI\1" (4 bytes)
//! - min_shift: log2 of the smallest bin span (int32, typically 14 = 16kb)
//! - depth: Number of binning levels below the root (int32, typically 5)
//! - l_aux: Size of auxiliary data (int32)
//! - aux: Opaque auxiliary data (l_aux bytes)
//! - n_ref: Number of reference sequences (int32)
//!
//! ## Index Data (per reference)
//! - n_bin (int32), then per bin: bin (uint32), loffset (uint64),
//!   n_chunk (int32), then per chunk: chunk_beg (uint64), chunk_end (uint64)
//!
//! ## Trailer
//! - n_no_coor: Records without coordinate (uint64, optional)
//!
//! # Pseudo-bin
//!
//! The bin with id `bin_limit + 1` is not a genomic interval. It carries two
//! chunks; the second one's fields are the contig's mapped and unmapped
//! record counts.
//!
//! # Example
//!
//! ```no_run
//! use vcf_partition::formats::index::{CsiIndex, OffsetIndex};
//!
//! # fn main() -> vcf_partition::Result<()> {
//! let index = CsiIndex::from_path("variants.bcf.csi")?;
//!
//! println!("Min shift: {}", index.min_shift());
//! println!("Depth: {}", index.depth());
//! println!("Records per contig: {:?}", index.record_counts());
//!
//! let offsets = index.offsets();
//! println!("{} bins", offsets.len());
//! # Ok(())
//! # }
//! ```

use super::{
    expect_eof, pseudo_bin_record_count, read_bytes, read_count, read_i32, read_optional_u64,
    read_u32, read_u64, vec_for_count, Binning, IndexOffsets, OffsetIndex,
};
use crate::error::{PartitionError, Result};
use crate::io::bgzf::{file_offset, Chunk, VirtualOffset};
use crate::io::compression;
use std::io::Read;
use std::path::Path;

/// CSI file format magic string
const CSI_MAGIC: &[u8; 4] = b"CSI\x01";

/// A bin in the hierarchical binning index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsiBin {
    /// Bin number
    pub bin_id: u32,
    /// Virtual offset of the first record overlapping the bin
    pub loffset: VirtualOffset,
    /// Chunks of data in this bin
    pub chunks: Vec<Chunk>,
}

impl CsiBin {
    /// Create a new bin
    pub fn new(bin_id: u32, loffset: VirtualOffset) -> Self {
        CsiBin {
            bin_id,
            loffset,
            chunks: Vec::new(),
        }
    }
}

/// CSI (Coordinate-Sorted Index)
///
/// Immutable once parsed. Contigs are identified by their position only;
/// names come from the variant file header.
#[derive(Debug, Clone)]
pub struct CsiIndex {
    /// Binning parameters
    binning: Binning,
    /// Auxiliary data, stored uninterpreted
    aux_data: Vec<u8>,
    /// Bins of each reference, in file order (pseudo-bins included)
    bins: Vec<Vec<CsiBin>>,
    /// Mapped + unmapped records per reference, -1 if unknown
    record_counts: Vec<i64>,
    /// Records without coordinate (0 if absent)
    n_no_coor: u64,
}

impl CsiIndex {
    /// Load CSI index from a file, BGZF-compressed or not
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = compression::open(path.as_ref())?;
        Self::parse(&mut reader)
    }

    /// Parse CSI index from a decompressed reader
    ///
    /// The reader must be positioned at the magic string and is consumed to
    /// the end; trailing bytes are an error.
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        // Read and verify magic string
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != CSI_MAGIC {
            return Err(PartitionError::invalid_format(format!(
                "Invalid CSI magic: expected {:?}, got {:?}",
                CSI_MAGIC, magic
            )));
        }

        let min_shift = read_i32(reader)?;
        let depth = read_i32(reader)?;
        let binning = Binning::new(min_shift, depth)?;

        let l_aux = read_count(reader, "auxiliary byte")?;
        let aux_data = read_bytes(reader, l_aux)?;

        let n_ref = read_count(reader, "reference")?;
        let pseudo_bin = binning.pseudo_bin();

        let mut bins = vec_for_count(n_ref);
        let mut record_counts = vec_for_count(n_ref);

        for _ in 0..n_ref {
            let n_bin = read_count(reader, "bin")?;
            let mut seq_bins = vec_for_count(n_bin);
            let mut record_count = -1i64;

            for _ in 0..n_bin {
                let bin_id = read_u32(reader)?;
                binning.check_bin(bin_id)?;
                let loffset = VirtualOffset::from_raw(read_u64(reader)?);
                let n_chunk = read_count(reader, "chunk")?;

                let mut bin = CsiBin::new(bin_id, loffset);
                for _ in 0..n_chunk {
                    let chunk_beg = VirtualOffset::from_raw(read_u64(reader)?);
                    let chunk_end = VirtualOffset::from_raw(read_u64(reader)?);
                    bin.chunks.push(Chunk::new(chunk_beg, chunk_end));
                }

                if bin_id == pseudo_bin {
                    record_count = pseudo_bin_record_count(bin_id, &bin.chunks)?;
                }
                seq_bins.push(bin);
            }

            bins.push(seq_bins);
            record_counts.push(record_count);
        }

        let n_no_coor = read_optional_u64(reader)?.unwrap_or(0);
        expect_eof(reader)?;

        log::debug!(
            "Parsed CSI index: min_shift={}, depth={}, {} references, {} bins",
            binning.min_shift(),
            binning.depth(),
            bins.len(),
            bins.iter().map(Vec::len).sum::<usize>()
        );

        Ok(CsiIndex {
            binning,
            aux_data,
            bins,
            record_counts,
            n_no_coor,
        })
    }

    /// Binning parameters
    pub fn binning(&self) -> Binning {
        self.binning
    }

    /// log2 of the smallest bin span
    pub fn min_shift(&self) -> u32 {
        self.binning.min_shift()
    }

    /// Number of binning levels below the root
    pub fn depth(&self) -> u32 {
        self.binning.depth()
    }

    /// Get auxiliary data
    pub fn aux_data(&self) -> &[u8] {
        &self.aux_data
    }

    /// Bins of every reference, in file order
    pub fn bins(&self) -> &[Vec<CsiBin>] {
        &self.bins
    }

    /// Mapped + unmapped record count per reference; -1 if the reference has no pseudo-bin
    pub fn record_counts(&self) -> &[i64] {
        &self.record_counts
    }

    /// Number of records without a coordinate
    pub fn n_no_coor(&self) -> u64 {
        self.n_no_coor
    }

    /// Leftmost 1-based position covered by `bin`
    pub fn first_locus_in_bin(&self, bin: u32) -> u64 {
        self.binning.first_locus_in_bin(bin)
    }
}

impl OffsetIndex for CsiIndex {
    fn offsets(&self) -> IndexOffsets {
        let pseudo_bin = self.binning.pseudo_bin();
        let mut offsets = IndexOffsets::with_capacity(self.bins.iter().map(Vec::len).sum());

        for (contig_index, seq_bins) in self.bins.iter().enumerate() {
            // bins may be in any order within a contig
            let mut sorted: Vec<&CsiBin> = seq_bins.iter().collect();
            sorted.sort_by_key(|bin| bin.loffset);

            for bin in sorted.into_iter().filter(|bin| bin.bin_id != pseudo_bin) {
                offsets.push(
                    file_offset(bin.loffset.as_raw()),
                    contig_index,
                    self.first_locus_in_bin(bin.bin_id),
                );
            }
        }

        offsets
    }

    fn record_counts(&self) -> &[i64] {
        &self.record_counts
    }
}
