//! Transparent opening of BGZF/gzip-compressed and plain files.
//!
//! Index files written by `bcftools index` and `tabix` are BGZF-compressed,
//! and so are the variant files they describe. BGZF is a series of
//! concatenated gzip members, so decoding must continue past the first member
//! ([`MultiGzDecoder`], not `GzDecoder`).

use crate::error::Result;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// gzip member magic bytes
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Returns true if the buffered stream starts with the gzip magic bytes.
///
/// Does not consume anything from the reader.
pub fn is_gzip<R: BufRead>(reader: &mut R) -> Result<bool> {
    let buf = reader.fill_buf()?;
    Ok(buf.len() >= 2 && buf[..2] == GZIP_MAGIC)
}

/// Wrap a reader so that gzip/BGZF input is decompressed and anything else
/// is passed through untouched.
pub fn decompressed<R: Read + 'static>(reader: R) -> Result<Box<dyn BufRead>> {
    let mut reader = BufReader::new(reader);
    if is_gzip(&mut reader)? {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader))))
    } else {
        Ok(Box::new(reader))
    }
}

/// Open a local file, decompressing it if it is gzip/BGZF-compressed.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let file = File::open(path.as_ref())?;
    decompressed(file)
}

/// Length in bytes of a file as stored on disk (compressed size).
pub fn file_length<P: AsRef<Path>>(path: P) -> Result<u64> {
    Ok(std::fs::metadata(path.as_ref())?.len())
}
