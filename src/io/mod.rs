//! I/O module: BGZF offsets, compressed file access and variant headers
//!
//! Nothing here decodes variant records; the partition planner only needs
//! byte offsets, file lengths and contig names.

pub mod bgzf;
pub mod compression;
pub mod header;

pub use bgzf::{file_offset, Chunk, VirtualOffset};
pub use compression::file_length;
pub use header::VariantHeader;
