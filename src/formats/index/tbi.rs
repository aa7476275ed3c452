//! TBI (Tabix) index format support
//!
//! This module implements parsing of Tabix index files (.tbi), written by
//! `tabix` for BGZF-compressed VCF and other tab-delimited files.
//!
//! # Format Specification
//!
//! ## Header
//! - Magic: "TBI\1" (4 bytes)
//! - n_ref: Number of reference sequences (int32)
//! - format: File format (int32: 0=generic, 1=SAM, 2=VCF; 0x10000 flags 0-based coordinates)
//! - col_seq: Column for sequence name (int32)
//! - col_beg: Column for start position (int32)
//! - col_end: Column for end position (int32, 0 if absent)
//! - meta: Comment character for header lines (int32)
//! - skip: Number of lines to skip (int32)
//! - l_nm: Length of concatenated sequence names (int32)
//! - names: Sequence names (null-terminated strings)
//!
//! ## Index Data (per reference)
//! - Binning index: Hierarchical bins with chunks (no per-bin loffset)
//! - Linear index: virtual offset of the first record in each 16kb window
//!
//! ## Trailer
//! - n_no_coor: Records without coordinate (uint64, optional)
//!
//! Binning is fixed (min_shift=14, depth=5), so the pseudo-bin is 37450.
//! Partition offsets come from the linear index rather than from bins.

use super::{
    expect_eof, pseudo_bin_record_count, read_bytes, read_count, read_i32, read_optional_u64,
    read_u32, read_u64, vec_for_count, Binning, IndexOffsets, OffsetIndex,
};
use crate::error::{PartitionError, Result};
use crate::io::bgzf::{file_offset, Chunk, VirtualOffset};
use crate::io::compression;
use std::io::Read;
use std::path::Path;

/// TBI file format magic string
const TBI_MAGIC: &[u8; 4] = b"TBI\x01";

/// Genomic span of one linear-index window (16 Kbp)
pub const LINEAR_INDEX_INTERVAL_SIZE: u64 = 1 << 14;

/// Format flag marking 0-based, half-open coordinates (UCSC style)
const ZERO_BASED_FLAG: i32 = 0x10000;

/// File format types recognized by tabix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TbiFormat {
    /// Generic tab-delimited file
    Generic = 0,
    /// SAM format
    Sam = 1,
    /// VCF format
    Vcf = 2,
}

impl TbiFormat {
    /// Parse format from the low 16 bits of the header field
    fn from_i32(value: i32) -> Result<Self> {
        match value & 0xFFFF {
            0 => Ok(TbiFormat::Generic),
            1 => Ok(TbiFormat::Sam),
            2 => Ok(TbiFormat::Vcf),
            _ => Err(PartitionError::invalid_format(format!(
                "Unknown TBI format code: {}",
                value
            ))),
        }
    }
}

/// A bin in the hierarchical binning index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TbiBin {
    /// Bin number (0-37450)
    pub bin_id: u32,
    /// Chunks of data in this bin
    pub chunks: Vec<Chunk>,
}

impl TbiBin {
    /// Create a new bin
    pub fn new(bin_id: u32) -> Self {
        TbiBin {
            bin_id,
            chunks: Vec::new(),
        }
    }
}

/// Reference sequence index data
#[derive(Debug, Clone)]
pub struct TbiReference {
    /// Bins for this reference (pseudo-bin included)
    pub bins: Vec<TbiBin>,
    /// Linear index: virtual file offsets for 16kb intervals
    pub intervals: Vec<VirtualOffset>,
}

/// TBI (Tabix) index
#[derive(Debug, Clone)]
pub struct TbiIndex {
    /// File format type
    format: TbiFormat,
    /// Coordinates are 0-based
    zero_based: bool,
    /// Column for sequence name (1-based)
    col_seq: i32,
    /// Column for start position (1-based)
    col_beg: i32,
    /// Column for end position (1-based, 0 if same as col_beg)
    col_end: i32,
    /// Comment character code for header lines
    meta: i32,
    /// Number of header lines to skip
    skip_lines: i32,
    /// Sequence names, one per reference
    names: Vec<String>,
    /// Reference sequences
    references: Vec<TbiReference>,
    /// Records per reference, -1 if unknown
    record_counts: Vec<i64>,
    /// Records without coordinate (0 if absent)
    n_no_coor: u64,
}

impl TbiIndex {
    /// Load TBI index from a file, BGZF-compressed or not
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = compression::open(path.as_ref())?;
        Self::parse(&mut reader)
    }

    /// Parse TBI index from a decompressed reader
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != TBI_MAGIC {
            return Err(PartitionError::invalid_format(format!(
                "Invalid TBI magic: expected {:?}, got {:?}",
                TBI_MAGIC, magic
            )));
        }

        let n_ref = read_count(reader, "reference")?;
        let format_code = read_i32(reader)?;
        let format = TbiFormat::from_i32(format_code)?;
        let col_seq = read_i32(reader)?;
        let col_beg = read_i32(reader)?;
        let col_end = read_i32(reader)?;
        let meta = read_i32(reader)?;
        let skip = read_i32(reader)?;
        let l_nm = read_count(reader, "name byte")?;

        let names_buf = read_bytes(reader, l_nm)?;
        let names = parse_sequence_names(&names_buf)?;

        if names.len() != n_ref {
            return Err(PartitionError::invalid_format(format!(
                "TBI header claims {} references but got {} names",
                n_ref,
                names.len()
            )));
        }

        let binning = Binning::TABIX;
        let pseudo_bin = binning.pseudo_bin();
        let mut references = vec_for_count(n_ref);
        let mut record_counts = vec_for_count(n_ref);

        for _ in 0..n_ref {
            let n_bin = read_count(reader, "bin")?;
            let mut bins = vec_for_count(n_bin);
            let mut record_count = -1i64;

            for _ in 0..n_bin {
                let bin_id = read_u32(reader)?;
                binning.check_bin(bin_id)?;
                let n_chunk = read_count(reader, "chunk")?;

                let mut bin = TbiBin::new(bin_id);
                for _ in 0..n_chunk {
                    let chunk_beg = VirtualOffset::from_raw(read_u64(reader)?);
                    let chunk_end = VirtualOffset::from_raw(read_u64(reader)?);
                    bin.chunks.push(Chunk::new(chunk_beg, chunk_end));
                }

                if bin_id == pseudo_bin {
                    record_count = pseudo_bin_record_count(bin_id, &bin.chunks)?;
                }
                bins.push(bin);
            }

            let n_intv = read_count(reader, "interval")?;
            let mut intervals = vec_for_count(n_intv);
            for _ in 0..n_intv {
                intervals.push(VirtualOffset::from_raw(read_u64(reader)?));
            }

            references.push(TbiReference { bins, intervals });
            record_counts.push(record_count);
        }

        let n_no_coor = read_optional_u64(reader)?.unwrap_or(0);
        expect_eof(reader)?;

        log::debug!(
            "Parsed TBI index: format={:?}, {} references",
            format,
            references.len()
        );

        Ok(TbiIndex {
            format,
            zero_based: format_code & ZERO_BASED_FLAG != 0,
            col_seq,
            col_beg,
            col_end,
            meta,
            skip_lines: skip,
            names,
            references,
            record_counts,
            n_no_coor,
        })
    }

    /// Get file format type
    pub fn format(&self) -> TbiFormat {
        self.format
    }

    /// True if the indexed file uses 0-based coordinates
    pub fn is_zero_based(&self) -> bool {
        self.zero_based
    }

    /// Get column for sequence name
    pub fn col_seq(&self) -> i32 {
        self.col_seq
    }

    /// Get column for start position
    pub fn col_beg(&self) -> i32 {
        self.col_beg
    }

    /// Get column for end position
    pub fn col_end(&self) -> i32 {
        self.col_end
    }

    /// Raw comment character code from the header
    pub fn meta(&self) -> i32 {
        self.meta
    }

    /// Comment character, if the header code is a valid Unicode scalar
    pub fn meta_char(&self) -> Option<char> {
        u32::try_from(self.meta).ok().and_then(char::from_u32)
    }

    /// Get number of header lines to skip
    pub fn skip_lines(&self) -> i32 {
        self.skip_lines
    }

    /// Sequence names, in reference order
    pub fn sequence_names(&self) -> &[String] {
        &self.names
    }

    /// Get all references
    pub fn references(&self) -> &[TbiReference] {
        &self.references
    }

    /// Records per reference; -1 if the reference has no pseudo-bin
    pub fn record_counts(&self) -> &[i64] {
        &self.record_counts
    }

    /// Number of records without a coordinate
    pub fn n_no_coor(&self) -> u64 {
        self.n_no_coor
    }
}

impl OffsetIndex for TbiIndex {
    fn offsets(&self) -> IndexOffsets {
        let total = self.references.iter().map(|r| r.intervals.len()).sum();
        let mut offsets = IndexOffsets::with_capacity(total);

        for (contig_index, reference) in self.references.iter().enumerate() {
            for (i, ioff) in reference.intervals.iter().enumerate() {
                offsets.push(
                    file_offset(ioff.as_raw()),
                    contig_index,
                    i as u64 * LINEAR_INDEX_INTERVAL_SIZE + 1,
                );
            }
        }

        offsets
    }

    fn sequence_names(&self) -> Option<&[String]> {
        Some(&self.names)
    }

    fn record_counts(&self) -> &[i64] {
        &self.record_counts
    }
}

/// Parse null-terminated sequence names from buffer
fn parse_sequence_names(buf: &[u8]) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut start = 0;

    for (i, &byte) in buf.iter().enumerate() {
        if byte == 0 {
            if i > start {
                let name = std::str::from_utf8(&buf[start..i])
                    .map_err(|e| {
                        PartitionError::invalid_format(format!(
                            "Invalid UTF-8 in sequence name: {}",
                            e
                        ))
                    })?
                    .to_string();
                names.push(name);
            }
            start = i + 1;
        }
    }

    Ok(names)
}
