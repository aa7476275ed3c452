//! Partition boundary planning.
//!
//! Target byte boundaries `0, size, 2*size, ...` are located in the index's
//! sorted file offsets by binary search. Each boundary snaps to the first
//! indexed bin at or after it, and the genomic start of that bin becomes the
//! start of a region. Regions are then stitched end to end so that together
//! they cover every contig exactly once.

use super::region::{Region, RegionEmitter};
use crate::error::{PartitionError, Result};
use crate::formats::index::IndexOffsets;

/// How to size the partitions. Both forms are hints: the planner may return
/// more or fewer parts, since boundaries snap to indexed bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionTarget {
    /// Desired number of parts
    NumParts(u64),
    /// Desired compressed size of each part, in bytes
    PartSize(u64),
}

impl PartitionTarget {
    /// Build a target from two optional arguments, exactly one of which must be set.
    ///
    /// # Example
    ///
    /// ```
    /// use vcf_partition::partition::PartitionTarget;
    ///
    /// assert_eq!(
    ///     PartitionTarget::from_options(Some(4), None).unwrap(),
    ///     PartitionTarget::NumParts(4)
    /// );
    /// assert!(PartitionTarget::from_options(Some(4), Some(1000)).is_err());
    /// assert!(PartitionTarget::from_options(None, None).is_err());
    /// ```
    pub fn from_options(num_parts: Option<u64>, target_part_size: Option<u64>) -> Result<Self> {
        let target = match (num_parts, target_part_size) {
            (None, None) => {
                return Err(PartitionError::invalid_input(
                    "One of num_parts or target_part_size must be specified",
                ))
            }
            (Some(_), Some(_)) => {
                return Err(PartitionError::invalid_input(
                    "Only one of num_parts or target_part_size may be specified",
                ))
            }
            (Some(n), None) => PartitionTarget::NumParts(n),
            (None, Some(size)) => PartitionTarget::PartSize(size),
        };
        target.validate()?;
        Ok(target)
    }

    /// Reject zero counts and sizes.
    pub fn validate(&self) -> Result<()> {
        match *self {
            PartitionTarget::NumParts(0) => {
                Err(PartitionError::invalid_input("num_parts must be positive"))
            }
            PartitionTarget::PartSize(0) => Err(PartitionError::invalid_input(
                "target_part_size must be positive",
            )),
            _ => Ok(()),
        }
    }

    /// Resolve to `(num_parts, target_part_size)` for a file of `file_length` bytes.
    pub fn resolve(&self, file_length: u64) -> (u64, u64) {
        match *self {
            PartitionTarget::NumParts(n) => (n, file_length / n.max(1)),
            PartitionTarget::PartSize(size) => {
                let size = size.max(1);
                (file_length.div_ceil(size), size)
            }
        }
    }

    /// Number of parts for a file of `file_length` bytes.
    pub fn num_parts(&self, file_length: u64) -> u64 {
        self.resolve(file_length).0
    }
}

/// Plan region strings that split a variant file into roughly equal parts.
///
/// Returns `Ok(None)` when the file should not be partitioned (a single part).
///
/// # Example
///
/// ```
/// use vcf_partition::formats::index::IndexOffsets;
/// use vcf_partition::partition::{plan, PartitionTarget};
///
/// # fn main() -> vcf_partition::Result<()> {
/// let mut offsets = IndexOffsets::default();
/// for (offset, position) in [(100, 1), (500, 1001), (1200, 2001), (3000, 3001)] {
///     offsets.push(offset, 0, position);
/// }
/// let names = vec!["contig".to_string()];
///
/// // boundaries 0, 875, 1750, 2625 land on offsets 100, 1200, 3000
/// let regions = plan(&offsets, &names, 3500, PartitionTarget::NumParts(4))?.unwrap();
/// let regions: Vec<String> = regions.iter().map(|r| r.to_string()).collect();
/// assert_eq!(regions, ["contig:1-2000", "contig:2001-3000", "contig:3001-"]);
/// # Ok(())
/// # }
/// ```
pub fn plan(
    offsets: &IndexOffsets,
    sequence_names: &[String],
    file_length: u64,
    target: PartitionTarget,
) -> Result<Option<Vec<Region>>> {
    target.validate()?;

    let (num_parts, part_size) = target.resolve(file_length);
    if num_parts <= 1 {
        log::info!(
            "File of {} bytes resolves to {} part(s); not partitioning",
            file_length,
            num_parts
        );
        return Ok(None);
    }

    offsets.check_sorted()?;

    let indexes = boundary_indexes(&offsets.file_offsets, num_parts, part_size);
    let regions = stitch_regions(offsets, &indexes, sequence_names)?;

    log::info!(
        "Planned {} regions for {} target parts of {} bytes ({} indexed offsets)",
        regions.len(),
        num_parts,
        part_size,
        offsets.len()
    );

    Ok(Some(regions))
}

/// Leftmost insertion point of each target boundary in `file_offsets`,
/// dropping boundaries past the last offset and duplicates.
///
/// Boundaries that would land on an index already taken are skipped without
/// being searched, so the work is bounded by the number of distinct
/// insertion points rather than by `num_parts`.
fn boundary_indexes(file_offsets: &[u64], num_parts: u64, part_size: u64) -> Vec<usize> {
    let mut indexes = Vec::new();
    let mut i = 0u64;

    while i < num_parts {
        // a boundary past u64::MAX is past every offset
        let Some(boundary) = i.checked_mul(part_size) else {
            break;
        };
        let k = file_offsets.partition_point(|&offset| offset < boundary);
        if k >= file_offsets.len() {
            break;
        }
        indexes.push(k);

        // every boundary is 0
        if part_size == 0 {
            break;
        }
        // first boundary strictly past file_offsets[k]
        i = file_offsets[k] / part_size + 1;
    }

    indexes
}

/// Turn surviving offset indexes into an ordered, gap-free region list.
fn stitch_regions(
    offsets: &IndexOffsets,
    indexes: &[usize],
    sequence_names: &[String],
) -> Result<Vec<Region>> {
    let mut emitter = RegionEmitter::new(sequence_names);

    for (i, &k) in indexes.iter().enumerate() {
        let contig = offsets.contig_indexes[k];
        let start = offsets.positions[k];

        let Some(&next) = indexes.get(i + 1) else {
            emitter.open_ended(contig, start)?;
            break;
        };

        let next_contig = offsets.contig_indexes[next];
        // positions are 1-based and inclusive
        let end = offsets.positions[next].saturating_sub(1);

        if next_contig == contig {
            emitter.span(contig, start, end)?;
        } else {
            emitter.open_ended(contig, start)?;
            // nothing precedes a boundary at the very start of next_contig
            if end > 0 {
                emitter.span(next_contig, 1, end)?;
            }
        }
    }

    Ok(emitter.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets(entries: &[(u64, usize, u64)]) -> IndexOffsets {
        let mut offsets = IndexOffsets::default();
        for &(offset, contig, position) in entries {
            offsets.push(offset, contig, position);
        }
        offsets
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn strings(regions: Option<Vec<Region>>) -> Vec<String> {
        regions
            .expect("expected partitioning")
            .iter()
            .map(Region::to_string)
            .collect()
    }

    #[test]
    fn test_resolve_num_parts() {
        assert_eq!(PartitionTarget::NumParts(4).resolve(3500), (4, 875));
        assert_eq!(PartitionTarget::NumParts(10).resolve(5), (10, 0));
    }

    #[test]
    fn test_resolve_part_size() {
        assert_eq!(PartitionTarget::PartSize(1000).resolve(3500), (4, 1000));
        assert_eq!(PartitionTarget::PartSize(1000).resolve(3000), (3, 1000));
        assert_eq!(PartitionTarget::PartSize(1000).resolve(0), (0, 1000));
    }

    #[test]
    fn test_from_options_rejects_zero() {
        assert!(PartitionTarget::from_options(Some(0), None).is_err());
        assert!(PartitionTarget::from_options(None, Some(0)).is_err());
        assert_eq!(
            PartitionTarget::from_options(None, Some(10)).unwrap(),
            PartitionTarget::PartSize(10)
        );
    }

    #[test]
    fn test_boundary_indexes() {
        let file_offsets = [100, 500, 1200, 3000];
        assert_eq!(boundary_indexes(&file_offsets, 4, 875), vec![0, 2, 3]);
        assert_eq!(boundary_indexes(&file_offsets, 2, 5000), vec![0]);
        assert_eq!(boundary_indexes(&[], 4, 875), Vec::<usize>::new());
    }

    /// Search every boundary, then drop and dedup.
    fn boundary_indexes_by_scan(file_offsets: &[u64], num_parts: u64, part_size: u64) -> Vec<usize> {
        let mut indexes: Vec<usize> = (0..num_parts)
            .map(|i| file_offsets.partition_point(|&offset| offset < i * part_size))
            .filter(|&k| k < file_offsets.len())
            .collect();
        indexes.dedup();
        indexes
    }

    #[test]
    fn test_boundary_indexes_match_scan() {
        let layouts: [&[u64]; 5] = [
            &[100, 500, 1200, 3000],
            &[0, 0, 0, 10, 10, 4000],
            &[7],
            &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
            &[250, 250, 251, 999, 1000, 1001],
        ];
        for file_offsets in layouts {
            for length in [1u64, 9, 10, 999, 1000, 3500, 5000] {
                for num_parts in 1..=40u64 {
                    let (_, part_size) = PartitionTarget::NumParts(num_parts).resolve(length);
                    assert_eq!(
                        boundary_indexes(file_offsets, num_parts, part_size),
                        boundary_indexes_by_scan(file_offsets, num_parts, part_size),
                        "offsets {:?}, length {}, {} parts",
                        file_offsets,
                        length,
                        num_parts
                    );
                }
            }
        }
    }

    #[test]
    fn test_boundary_indexes_zero_part_size() {
        assert_eq!(boundary_indexes(&[0, 10, 20], u64::MAX, 0), vec![0]);
        assert_eq!(boundary_indexes(&[5, 10, 20], u64::MAX, 0), vec![0]);
    }

    #[test]
    fn test_boundary_indexes_huge_part_size() {
        assert_eq!(boundary_indexes(&[0, 10, 20], 3, u64::MAX), vec![0]);
        assert_eq!(boundary_indexes(&[5, 10, u64::MAX], 3, u64::MAX), vec![0, 2]);
    }

    #[test]
    fn test_plan_more_parts_than_bytes() {
        let offsets = offsets(&[(0, 0, 1), (400, 0, 16385), (900, 1, 1)]);
        let names = names(&["chr1", "chr2"]);
        let regions = plan(&offsets, &names, 1000, PartitionTarget::NumParts(u64::MAX)).unwrap();
        // part size resolves to 0, so every boundary is the first offset
        assert_eq!(strings(regions), vec!["chr1:1-", "chr2"]);
    }

    #[test]
    fn test_plan_one_byte_parts() {
        let offsets = offsets(&[(0, 0, 1), (400, 0, 16385), (900, 1, 1)]);
        let names = names(&["chr1", "chr2"]);
        let regions = plan(&offsets, &names, 1 << 40, PartitionTarget::PartSize(1)).unwrap();
        assert_eq!(strings(regions), vec!["chr1:1-16384", "chr1:16385-", "chr2:1-"]);
    }

    #[test]
    fn test_boundary_on_exact_offset() {
        // lower bound: a boundary equal to an offset lands on that offset
        let file_offsets = [0, 500, 1000];
        assert_eq!(boundary_indexes(&file_offsets, 3, 500), vec![0, 1, 2]);
    }

    #[test]
    fn test_plan_single_part() {
        let offsets = offsets(&[(100, 0, 1)]);
        let names = names(&["chr1"]);
        assert_eq!(plan(&offsets, &names, 1 << 30, PartitionTarget::NumParts(1)).unwrap(), None);
        assert_eq!(plan(&offsets, &names, 999, PartitionTarget::PartSize(1000)).unwrap(), None);
        assert_eq!(plan(&offsets, &names, 0, PartitionTarget::PartSize(1000)).unwrap(), None);
    }

    #[test]
    fn test_plan_rejects_invalid_target() {
        let offsets = offsets(&[(100, 0, 1)]);
        let names = names(&["chr1"]);
        assert!(plan(&offsets, &names, 1000, PartitionTarget::NumParts(0)).is_err());
        assert!(plan(&offsets, &names, 1000, PartitionTarget::PartSize(0)).is_err());
    }

    #[test]
    fn test_plan_single_contig() {
        let offsets = offsets(&[(100, 0, 1), (500, 0, 1001), (1200, 0, 2001), (3000, 0, 3001)]);
        let names = names(&["contig"]);
        let regions = plan(&offsets, &names, 3500, PartitionTarget::NumParts(4)).unwrap();
        assert_eq!(
            strings(regions),
            vec!["contig:1-2000", "contig:2001-3000", "contig:3001-"]
        );
    }

    #[test]
    fn test_plan_boundaries_on_offsets() {
        let offsets = offsets(&[(0, 0, 1), (875, 0, 1001), (1750, 0, 2001), (1750, 0, 3001)]);
        let names = names(&["contig"]);
        let regions = plan(&offsets, &names, 3500, PartitionTarget::NumParts(4)).unwrap();
        // 2625 lands past the last offset and is dropped
        assert_eq!(
            strings(regions),
            vec!["contig:1-1000", "contig:1001-2000", "contig:2001-"]
        );
    }

    #[test]
    fn test_plan_contig_change() {
        let offsets = offsets(&[(0, 0, 1), (1000, 0, 16385), (2000, 1, 1), (3000, 1, 16385)]);
        let names = names(&["chr1", "chr2"]);
        let regions = plan(&offsets, &names, 4000, PartitionTarget::NumParts(4)).unwrap();
        // the boundary at 2000 is exactly the start of chr2, so no chr2:1-0
        assert_eq!(
            strings(regions),
            vec!["chr1:1-16384", "chr1:16385-", "chr2:1-16384", "chr2:16385-"]
        );
    }

    #[test]
    fn test_plan_contig_change_mid_contig() {
        let offsets = offsets(&[(0, 0, 1), (1000, 0, 16385), (2000, 1, 32769), (3000, 1, 49153)]);
        let names = names(&["chr1", "chr2"]);
        let regions = plan(&offsets, &names, 4000, PartitionTarget::NumParts(4)).unwrap();
        assert_eq!(
            strings(regions),
            vec!["chr1:1-16384", "chr1:16385-", "chr2:1-32768", "chr2:32769-49152", "chr2:49153-"]
        );
    }

    #[test]
    fn test_plan_skipped_and_trailing_contigs() {
        let offsets = offsets(&[(0, 0, 1), (100, 0, 16385), (3000, 3, 16385)]);
        let names = names(&["chr1", "chr2", "chr3", "chr4", "chr5", "chr6"]);
        let regions = plan(&offsets, &names, 4000, PartitionTarget::NumParts(2)).unwrap();
        // boundaries [0, 2000] -> indexes [0, 2]
        assert_eq!(
            strings(regions),
            vec!["chr1:1-", "chr2", "chr3", "chr4:1-16384", "chr4:16385-", "chr5", "chr6"]
        );
    }

    #[test]
    fn test_plan_without_offsets() {
        let names = names(&["chr1", "chr2"]);
        let regions = plan(&IndexOffsets::default(), &names, 4000, PartitionTarget::NumParts(2));
        assert_eq!(strings(regions.unwrap()), vec!["chr1", "chr2"]);
    }

    #[test]
    fn test_plan_rejects_unsorted_offsets() {
        let offsets = offsets(&[(0, 0, 1), (5000, 0, 16385), (100, 1, 1)]);
        let names = names(&["chr1", "chr2"]);
        let err = plan(&offsets, &names, 6000, PartitionTarget::NumParts(3)).unwrap_err();
        assert!(matches!(err, PartitionError::CorruptIndex { .. }));
    }

    #[test]
    fn test_plan_missing_sequence_name() {
        let offsets = offsets(&[(0, 0, 1), (1000, 1, 1)]);
        let names = names(&["chr1"]);
        let err = plan(&offsets, &names, 2000, PartitionTarget::NumParts(2)).unwrap_err();
        assert!(matches!(err, PartitionError::InvalidInput { .. }));
    }
}
