//! Region query strings and the emitter that stitches them together.
//!
//! Regions use 1-based, inclusive coordinates, the form accepted by
//! `bcftools view -r` and `tabix`:
//!
//! - `chr1` (whole contig)
//! - `chr1:1001-` (from a position to the end of the contig)
//! - `chr1:1001-2000` (closed interval)

use crate::error::{PartitionError, Result};
use std::fmt;

/// A genomic region to extract from a variant file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Region {
    /// The whole contig
    Contig(String),
    /// From `start` to the end of the contig
    From {
        /// Contig name
        contig: String,
        /// 1-based start position
        start: u64,
    },
    /// `start..=end`
    Span {
        /// Contig name
        contig: String,
        /// 1-based start position
        start: u64,
        /// 1-based inclusive end position
        end: u64,
    },
}

impl Region {
    /// Name of the contig this region lies on.
    pub fn contig(&self) -> &str {
        match self {
            Region::Contig(contig)
            | Region::From { contig, .. }
            | Region::Span { contig, .. } => contig,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Contig(contig) => write!(f, "{}", contig),
            Region::From { contig, start } => write!(f, "{}:{}-", contig, start),
            Region::Span { contig, start, end } => write!(f, "{}:{}-{}", contig, start, end),
        }
    }
}

/// Builds the ordered region list while tracking which contig it is in.
///
/// Every move forward to a later contig first emits a whole-contig region
/// for each contig strictly in between, so skipped contigs stay covered.
/// [`RegionEmitter::finish`] does the same for trailing contigs.
#[derive(Debug)]
pub(crate) struct RegionEmitter<'a> {
    sequence_names: &'a [String],
    /// Contig the last emitted region belongs to; `None` before the first.
    current: Option<usize>,
    regions: Vec<Region>,
}

impl<'a> RegionEmitter<'a> {
    pub(crate) fn new(sequence_names: &'a [String]) -> Self {
        RegionEmitter {
            sequence_names,
            current: None,
            regions: Vec::new(),
        }
    }

    fn name(&self, contig: usize) -> Result<&'a str> {
        self.sequence_names
            .get(contig)
            .map(String::as_str)
            .ok_or_else(|| {
                PartitionError::invalid_input(format!(
                    "contig index {} has no sequence name ({} names known)",
                    contig,
                    self.sequence_names.len()
                ))
            })
    }

    /// Move to `contig`, emitting whole-contig regions for any contigs skipped.
    pub(crate) fn enter(&mut self, contig: usize) -> Result<()> {
        let first_skipped = match self.current {
            Some(current) if contig <= current => return Ok(()),
            Some(current) => current + 1,
            None => 0,
        };
        self.name(contig)?;
        for skipped in first_skipped..contig {
            let name = self.name(skipped)?;
            self.regions.push(Region::Contig(name.to_string()));
        }
        self.current = Some(contig);
        Ok(())
    }

    /// Emit `contig:start-`.
    pub(crate) fn open_ended(&mut self, contig: usize, start: u64) -> Result<()> {
        self.enter(contig)?;
        let name = self.name(contig)?;
        self.regions.push(Region::From {
            contig: name.to_string(),
            start,
        });
        Ok(())
    }

    /// Emit `contig:start-end`.
    pub(crate) fn span(&mut self, contig: usize, start: u64, end: u64) -> Result<()> {
        self.enter(contig)?;
        let name = self.name(contig)?;
        self.regions.push(Region::Span {
            contig: name.to_string(),
            start,
            end,
        });
        Ok(())
    }

    /// Emit whole-contig regions for all contigs after the current one.
    pub(crate) fn finish(mut self) -> Vec<Region> {
        let first_trailing = self.current.map_or(0, |current| current + 1);
        for name in self.sequence_names.iter().skip(first_trailing) {
            self.regions.push(Region::Contig(name.clone()));
        }
        self.regions
    }
}
