//! Contig names from variant file headers.
//!
//! CSI indexes do not store sequence names, so the partition planner falls
//! back to the `##contig` lines of the variant file itself. Both encodings are
//! supported once decompressed:
//!
//! - **VCF**: `#`-prefixed text lines, terminated by the `#CHROM` line
//! - **BCF**: magic `BCF\2\x`, a `u32` text length, then the same VCF header text
//!
//! Names are returned in header order, which is the order contig indexes in
//! CSI/TBI indexes refer to.

use crate::error::{PartitionError, Result};
use crate::io::compression;
use std::io::{BufRead, Read};
use std::path::Path;

/// BCF magic prefix (major version 2)
const BCF_MAGIC: &[u8; 4] = b"BCF\x02";

/// Contig names declared by a variant file header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantHeader {
    contigs: Vec<String>,
}

impl VariantHeader {
    /// Read the header of a (possibly BGZF-compressed) VCF or BCF file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = compression::open(path.as_ref())?;
        Self::parse(&mut reader)
    }

    /// Parse a header from a decompressed VCF or BCF stream.
    pub fn parse<R: BufRead>(reader: &mut R) -> Result<Self> {
        let is_bcf = {
            let buf = reader.fill_buf()?;
            buf.len() >= BCF_MAGIC.len() && &buf[..BCF_MAGIC.len()] == BCF_MAGIC
        };

        if is_bcf {
            Self::parse_bcf(reader)
        } else {
            Self::parse_vcf(reader)
        }
    }

    fn parse_bcf<R: Read>(reader: &mut R) -> Result<Self> {
        // magic (3 bytes + major + minor)
        let mut magic = [0u8; 5];
        reader.read_exact(&mut magic)?;

        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf)?;
        let text_len = u32::from_le_bytes(len_buf) as u64;

        // grow with the data rather than trusting the declared length
        let mut text_buf = Vec::new();
        reader.take(text_len).read_to_end(&mut text_buf)?;
        if text_buf.len() as u64 != text_len {
            return Err(PartitionError::invalid_input(format!(
                "BCF header declares {} bytes but only {} are present",
                text_len,
                text_buf.len()
            )));
        }
        let text = String::from_utf8(text_buf).map_err(|e| {
            PartitionError::invalid_input(format!("Invalid UTF-8 in BCF header: {}", e))
        })?;

        let mut header = VariantHeader::default();
        for line in text.lines() {
            let line = line.trim_end_matches('\0');
            if line.starts_with("#CHROM") {
                break;
            }
            header.push_line(line);
        }
        Ok(header)
    }

    fn parse_vcf<R: BufRead>(reader: &mut R) -> Result<Self> {
        let mut header = VariantHeader::default();
        let mut line = String::new();

        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            let trimmed = line.trim_end();
            if !trimmed.starts_with('#') || trimmed.starts_with("#CHROM") {
                break;
            }
            header.push_line(trimmed);
        }

        Ok(header)
    }

    fn push_line(&mut self, line: &str) {
        if let Some(value) = line.strip_prefix("##contig=") {
            if let Some(id) = extract_id(value) {
                self.contigs.push(id);
            }
        }
    }

    /// Contig names in header order.
    pub fn contigs(&self) -> &[String] {
        &self.contigs
    }

    /// Consume the header, keeping only the contig names.
    pub fn into_contigs(self) -> Vec<String> {
        self.contigs
    }
}

/// Extract ID from a structured header value.
///
/// Parses values like: `<ID=chr1,length=248956422>`
fn extract_id(value: &str) -> Option<String> {
    let inner = value.trim().strip_prefix('<')?.trim_end_matches('>');
    inner
        .split(',')
        .find_map(|field| field.trim().strip_prefix("ID="))
        .filter(|id| !id.is_empty())
        .map(|id| id.to_string())
}
