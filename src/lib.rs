//! vcf-partition: split indexed variant files into roughly equal regions
//!
//! # Overview
//!
//! Block-compressed, coordinate-sorted VCF and BCF files come with a CSI or
//! TBI index that maps genomic bins to compressed byte offsets. This crate
//! reads those indexes and picks region boundaries so that each region covers
//! about the same number of compressed bytes, which lets downstream tools
//! process one file in parallel with `bcftools view -r` or `tabix`.
//!
//! Variant records are never decoded: only index metadata, file lengths and
//! `##contig` header lines are read.
//!
//! ## Quick Start
//!
//! ```no_run
//! use vcf_partition::partition_into_regions;
//!
//! # fn main() -> vcf_partition::Result<()> {
//! // Looks for variants.vcf.gz.tbi, then variants.vcf.gz.csi
//! if let Some(regions) = partition_into_regions("variants.vcf.gz", None, Some(16), None)? {
//!     for region in regions {
//!         println!("{}", region);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`formats`]: CSI and TBI index parsers, bin geometry, the flattened offset view
//! - [`io`]: BGZF virtual offsets, transparent decompression, variant headers
//! - [`partition`]: the partition planner and region strings
//! - [`error`]: error type shared by all of the above

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod formats;
pub mod io;
pub mod partition;

pub use error::{PartitionError, Result};
pub use formats::index::{
    read_index, CsiIndex, IndexOffsets, OffsetIndex, TbiIndex, VariantIndex,
};
pub use io::file_offset;
pub use partition::{partition_into_regions, plan, PartitionTarget, Region};
