//! Partitioning of indexed variant files into region queries.
//!
//! The entry point for files on disk is [`partition_into_regions`]: it finds
//! the `.tbi` or `.csi` index next to the variant file, reads it, resolves
//! contig names, and hands the flattened offsets to [`plan`].
//!
//! # Example
//!
//! ```no_run
//! use vcf_partition::partition::partition_into_regions;
//!
//! # fn main() -> vcf_partition::Result<()> {
//! match partition_into_regions("variants.vcf.gz", None, Some(8), None)? {
//!     Some(regions) => {
//!         for region in regions {
//!             println!("{}", region);
//!         }
//!     }
//!     None => println!("not partitioning"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod planner;
pub mod region;

pub use planner::{plan, PartitionTarget};
pub use region::Region;

use crate::error::{PartitionError, Result};
use crate::formats::index::{
    read_index, OffsetIndex, VariantIndex, CSI_EXTENSION, TABIX_EXTENSION,
};
use crate::io::{file_length, VariantHeader};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Append an extension to a path (`a.vcf.gz` -> `a.vcf.gz.tbi`).
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os: OsString = path.as_os_str().to_owned();
    os.push(suffix);
    PathBuf::from(os)
}

/// Find the index of a variant file: `<path>.tbi` first, then `<path>.csi`.
pub fn locate_index<P: AsRef<Path>>(vcf_path: P) -> Result<PathBuf> {
    let vcf_path = vcf_path.as_ref();

    for extension in [TABIX_EXTENSION, CSI_EXTENSION] {
        let candidate = with_suffix(vcf_path, extension);
        if candidate.is_file() {
            log::debug!("Using index {}", candidate.display());
            return Ok(candidate);
        }
    }

    Err(PartitionError::IndexNotFound {
        path: vcf_path.to_path_buf(),
    })
}

/// Contig names for `index`: embedded names for TBI, the variant file's
/// header for CSI.
pub fn sequence_names<P: AsRef<Path>>(vcf_path: P, index: &VariantIndex) -> Result<Vec<String>> {
    let names = match index.sequence_names() {
        Some(names) => names.to_vec(),
        None => VariantHeader::from_path(vcf_path)?.into_contigs(),
    };

    let n_contigs = index.record_counts().len();
    if names.len() != n_contigs {
        log::warn!(
            "Index has {} contigs but {} sequence names were found",
            n_contigs,
            names.len()
        );
    }

    Ok(names)
}

/// Split a variant file into region strings of roughly equal compressed size.
///
/// Exactly one of `num_parts` and `target_part_size` must be given. When
/// `index_path` is `None` the index is looked up next to `vcf_path`.
///
/// Returns `Ok(None)` if the file should be processed as a single part.
pub fn partition_into_regions<P: AsRef<Path>>(
    vcf_path: P,
    index_path: Option<&Path>,
    num_parts: Option<u64>,
    target_part_size: Option<u64>,
) -> Result<Option<Vec<String>>> {
    let target = PartitionTarget::from_options(num_parts, target_part_size)?;
    let vcf_path = vcf_path.as_ref();

    let index_path = match index_path {
        Some(path) => path.to_path_buf(),
        None => locate_index(vcf_path)?,
    };

    let length = file_length(vcf_path)?;
    if target.num_parts(length) <= 1 {
        log::info!("{} is a single part; not partitioning", vcf_path.display());
        return Ok(None);
    }

    let index = read_index(&index_path)?;
    let names = sequence_names(vcf_path, &index)?;
    let offsets = index.offsets();

    log::info!(
        "Partitioning {} ({} bytes) using {}",
        vcf_path.display(),
        length,
        index_path.display()
    );

    let regions = plan(&offsets, &names, length, target)?;
    Ok(regions.map(|regions| regions.iter().map(Region::to_string).collect()))
}
