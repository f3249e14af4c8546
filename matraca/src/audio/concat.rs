//! Binary-safe MP3 concatenation.
//!
//! Per-chunk files from the speech service are complete MP3 containers, each
//! possibly wrapped in its own ID3 metadata. Merging them is a byte-level
//! operation: keep the first file's leading ID3v2 header as the output's
//! metadata, strip the header from every later file, strip the fixed-size
//! ID3v1 trailer from all of them, and append the remaining frames in order.
//! No frame is re-encoded or parsed.

use crate::error::{PipelineError, Result};
use log::debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// ID3v2 tag magic at the start of a file.
const ID3V2_MAGIC: &[u8] = b"ID3";
/// ID3v1 tag magic at `len - 128`.
const ID3V1_MAGIC: &[u8] = b"TAG";
/// Fixed length of an ID3v2 tag header.
const ID3V2_HEADER_LEN: usize = 10;
/// Fixed length of an ID3v1 trailer.
const ID3V1_LEN: usize = 128;

/// Decode a 4-byte synchsafe integer: the low 7 bits of each byte, most
/// significant byte first.
fn synchsafe_len(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .take(4)
        .fold(0usize, |acc, b| (acc << 7) | (b & 0x7F) as usize)
}

/// Strip a leading ID3v2 tag, if present.
fn strip_id3v2(data: &[u8]) -> &[u8] {
    if data.len() < ID3V2_HEADER_LEN || &data[..ID3V2_MAGIC.len()] != ID3V2_MAGIC {
        return data;
    }
    let total = ID3V2_HEADER_LEN + synchsafe_len(&data[6..10]);
    if total >= data.len() {
        &[]
    } else {
        &data[total..]
    }
}

/// Strip a trailing ID3v1 tag, if present.
fn strip_id3v1(data: &[u8]) -> &[u8] {
    if data.len() >= ID3V1_LEN {
        let tag_start = data.len() - ID3V1_LEN;
        if &data[tag_start..tag_start + ID3V1_MAGIC.len()] == ID3V1_MAGIC {
            return &data[..tag_start];
        }
    }
    data
}

/// Merge ordered MP3 files into a single container at `output_path`.
///
/// The merge is written to a temporary file in the destination directory and
/// moved into place with a single rename, so a failure part-way through never
/// leaves a corrupt or partial file at `output_path`. The temporary file is
/// removed on every failure path.
pub fn concatenate_mp3(inputs: &[PathBuf], output_path: &Path) -> Result<()> {
    if inputs.is_empty() {
        return Err(PipelineError::NoSegments);
    }

    // Same directory as the destination keeps the final rename on one
    // filesystem; the NamedTempFile guard deletes it unless persisted.
    let out_dir = output_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut merged = NamedTempFile::new_in(out_dir)?;

    let mut written = 0usize;
    for (idx, path) in inputs.iter().enumerate() {
        let data = fs::read(path).map_err(|source| PipelineError::SegmentRead {
            path: path.clone(),
            source,
        })?;
        if data.is_empty() {
            return Err(PipelineError::EmptySegment(path.clone()));
        }

        // The first file's header becomes the single output header.
        let frames = if idx > 0 { strip_id3v2(&data) } else { &data[..] };
        let frames = strip_id3v1(frames);
        merged.write_all(frames)?;
        written += frames.len();
    }

    if written == 0 {
        return Err(PipelineError::EmptyOutput);
    }

    merged.flush()?;
    merged
        .persist(output_path)
        .map_err(|e| PipelineError::Io(e.error))?;
    debug!(
        "merged {} segment(s), {written} bytes -> {}",
        inputs.len(),
        output_path.display()
    );
    Ok(())
}
