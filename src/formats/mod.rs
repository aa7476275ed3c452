//! Index file formats
//!
//! - [`index`]: CSI and TBI binning indexes for BGZF-compressed variant files

pub mod index;
