//! Property-based tests for bin geometry, virtual offsets and the planner.
//!
//! Uses proptest for randomized testing with thousands of generated inputs.

use proptest::prelude::*;
use vcf_partition::formats::index::binning::{first_bin_in_level, level_size, Binning};
use vcf_partition::formats::index::IndexOffsets;
use vcf_partition::partition::{plan, PartitionTarget, Region};
use vcf_partition::file_offset;

// ============================================================================
// Bin Geometry Property Tests
// ============================================================================

mod binning_properties {
    use super::*;

    /// Binning parameters with a level and a bin offset inside that level
    fn arb_bin_in_level() -> impl Strategy<Value = (Binning, u32, u32)> {
        (10i32..=20, 1i32..=7)
            .prop_map(|(min_shift, depth)| Binning::new(min_shift, depth).unwrap())
            .prop_flat_map(|binning| {
                (Just(binning), 0..=binning.depth())
                    .prop_flat_map(|(binning, level)| {
                        (Just(binning), Just(level), 0..level_size(level))
                    })
            })
    }

    proptest! {
        #[test]
        fn level_for_bin_inverts_first_bin_in_level((binning, level, j) in arb_bin_in_level()) {
            let bin = first_bin_in_level(level) + j;
            prop_assert_eq!(binning.level_for_bin(bin), level);
        }

        #[test]
        fn first_locus_strictly_increasing_within_level((binning, level, j) in arb_bin_in_level()) {
            prop_assume!(j + 1 < level_size(level));
            let bin = first_bin_in_level(level) + j;
            prop_assert!(binning.first_locus_in_bin(bin) < binning.first_locus_in_bin(bin + 1));
        }

        #[test]
        fn first_bin_of_level_starts_at_one((binning, level, _j) in arb_bin_in_level()) {
            prop_assert_eq!(binning.first_locus_in_bin(first_bin_in_level(level)), 1);
        }

        #[test]
        fn pseudo_bin_follows_bin_limit(min_shift in 10i32..=20, depth in 0i32..=7) {
            let binning = Binning::new(min_shift, depth).unwrap();
            prop_assert_eq!(binning.bin_limit(), first_bin_in_level(binning.depth() + 1));
            prop_assert_eq!(binning.pseudo_bin(), binning.bin_limit() + 1);
        }
    }

    #[test]
    fn csi_defaults() {
        let binning = Binning::new(14, 5).unwrap();
        assert_eq!(binning.pseudo_bin(), 37450);
        assert_eq!(binning.first_locus_in_bin(first_bin_in_level(5)), 1);
        assert_eq!(binning.first_locus_in_bin(first_bin_in_level(5) + 1), 16385);
    }
}

// ============================================================================
// Virtual Offset Property Tests
// ============================================================================

mod offset_properties {
    use super::*;

    proptest! {
        #[test]
        fn file_offset_ignores_low_bits(v in any::<u64>()) {
            prop_assert_eq!(file_offset(v), file_offset(v | 0xFFFF));
            prop_assert_eq!(file_offset(v), file_offset(v & !0xFFFF));
        }

        #[test]
        fn file_offset_fits_48_bits(v in any::<u64>()) {
            prop_assert!(file_offset(v) < 1 << 48);
            prop_assert_eq!(file_offset(v), v >> 16);
        }
    }
}

// ============================================================================
// Planner Property Tests
// ============================================================================

mod planner_properties {
    use super::*;

    /// Index layout: per contig a list of (offset increment, position increment).
    /// Every contig with entries starts at position 1; offsets never decrease.
    fn arb_index() -> impl Strategy<Value = (IndexOffsets, Vec<String>, u64)> {
        (
            prop::collection::vec(
                prop::collection::vec((0u64..5000, 1u64..100_000), 0..8),
                1..6,
            ),
            1u64..10_000,
        )
            .prop_map(|(contigs, tail)| {
                let mut offsets = IndexOffsets::default();
                let mut file_offset = 0u64;
                for (contig, entries) in contigs.iter().enumerate() {
                    let mut position = 1u64;
                    for (i, &(offset_step, position_step)) in entries.iter().enumerate() {
                        file_offset += offset_step;
                        if i > 0 {
                            position += position_step;
                        }
                        offsets.push(file_offset, contig, position);
                    }
                }
                let names = (0..contigs.len()).map(|i| format!("c{}", i)).collect();
                (offsets, names, file_offset + tail)
            })
    }

    /// Regions must visit contigs in order, and each contig's regions must
    /// tile it from position 1 to its end.
    fn check_tiling(regions: &[Region], names: &[String]) -> Result<(), TestCaseError> {
        let mut i = 0;
        for name in names {
            let mut expected_start = 1u64;
            let mut open = false;
            while i < regions.len() && regions[i].contig() == name {
                prop_assert!(!open, "region after open-ended region on {}", name);
                match &regions[i] {
                    Region::Contig(_) => {
                        prop_assert_eq!(expected_start, 1);
                        open = true;
                    }
                    Region::From { start, .. } => {
                        prop_assert_eq!(*start, expected_start);
                        open = true;
                    }
                    Region::Span { start, end, .. } => {
                        prop_assert_eq!(*start, expected_start);
                        prop_assert!(end >= start);
                        expected_start = end + 1;
                    }
                }
                i += 1;
            }
            prop_assert!(open, "{} not covered to its end", name);
        }
        prop_assert_eq!(i, regions.len());
        Ok(())
    }

    proptest! {
        #[test]
        fn single_part_never_partitions((offsets, names, length) in arb_index()) {
            let result = plan(&offsets, &names, length, PartitionTarget::NumParts(1)).unwrap();
            prop_assert!(result.is_none());
        }

        #[test]
        fn regions_tile_every_contig(
            (offsets, names, length) in arb_index(),
            num_parts in 2u64..32,
        ) {
            let regions = plan(&offsets, &names, length, PartitionTarget::NumParts(num_parts))
                .unwrap()
                .unwrap();
            check_tiling(&regions, &names)?;
        }

        #[test]
        fn part_size_mode_tiles_every_contig(
            (offsets, names, length) in arb_index(),
            size in 1u64..20_000,
        ) {
            let target = PartitionTarget::PartSize(size);
            match plan(&offsets, &names, length, target).unwrap() {
                Some(regions) => {
                    prop_assert!(target.num_parts(length) > 1);
                    check_tiling(&regions, &names)?;
                }
                None => prop_assert!(target.num_parts(length) <= 1),
            }
        }

        #[test]
        fn region_count_bounded_by_parts_and_contigs(
            (offsets, names, length) in arb_index(),
            num_parts in 2u64..32,
        ) {
            let regions = plan(&offsets, &names, length, PartitionTarget::NumParts(num_parts))
                .unwrap()
                .unwrap();
            // each surviving boundary adds at most two regions
            prop_assert!(regions.len() as u64 <= 2 * num_parts + names.len() as u64);
        }
    }
}
