//! File helpers: line iteration over possibly large hash files and creation of
//! pipeline artifacts.
//!
//! Artifacts are written once to a fresh, uniquely named file inside the
//! working directory and then persisted; nothing here ever deletes them.
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use memmap2::Mmap;

/// Hash files at or above this size are memory-mapped instead of read
/// through a buffered reader.
pub const DEFAULT_MMAP_THRESHOLD_BYTES: u64 = 16 * 1024 * 1024; // 16 MiB

pub type LineIter = Box<dyn Iterator<Item = io::Result<String>> + Send + 'static>;

pub fn should_use_mmap(file_size_bytes: u64, threshold_bytes: u64) -> bool {
    file_size_bytes >= threshold_bytes
}

pub fn iter_lines_bufread<P: AsRef<Path>>(path: P) -> Result<LineIter> {
    let file = File::open(&path).with_context(|| format!("open {}", path.as_ref().display()))?;
    Ok(Box::new(BufReader::new(file).lines()))
}

pub fn iter_lines_mmap<P: AsRef<Path>>(path: P) -> Result<LineIter> {
    let file = File::open(&path).with_context(|| format!("open {}", path.as_ref().display()))?;
    let mmap =
        unsafe { Mmap::map(&file) }.with_context(|| format!("mmap {}", path.as_ref().display()))?;
    Ok(Box::new(MmapLines { mmap, pos: 0 }))
}

struct MmapLines {
    mmap: Mmap,
    pos: usize,
}

impl Iterator for MmapLines {
    type Item = io::Result<String>;
    fn next(&mut self) -> Option<Self::Item> {
        let data: &[u8] = &self.mmap;
        if self.pos >= data.len() {
            return None;
        }
        let start = self.pos;
        let end = match memchr::memchr(b'\n', &data[start..]) {
            Some(off) => start + off,
            None => data.len(),
        };
        self.pos = end + 1;
        Some(Ok(line_from_bytes(&data[start..end])))
    }
}

/// Decode one line, dropping a trailing `\r`. Hash files from Windows tools
/// are not always valid UTF-8, so decoding is lossy.
pub fn line_from_bytes(bytes: &[u8]) -> String {
    let slice = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(slice).into_owned()
}

pub fn iter_lines_auto<P: AsRef<Path>>(path: P, threshold_bytes: u64) -> Result<LineIter> {
    let meta =
        std::fs::metadata(&path).with_context(|| format!("stat {}", path.as_ref().display()))?;
    if meta.is_file() && should_use_mmap(meta.len(), threshold_bytes) {
        iter_lines_mmap(path)
    } else {
        iter_lines_bufread(path)
    }
}

/// Write `lines` (each terminated by `\n`) to a new file named
/// `<prefix><random>` in `dir` and keep it on disk.
pub fn write_artifact<I, L>(dir: &Path, prefix: &str, lines: I) -> io::Result<PathBuf>
where
    I: IntoIterator<Item = L>,
    L: AsRef<[u8]>,
{
    let tmp = tempfile::Builder::new().prefix(prefix).tempfile_in(dir)?;
    let (file, path) = tmp.keep().map_err(|e| e.error)?;
    let mut w = BufWriter::new(file);
    for line in lines {
        w.write_all(line.as_ref())?;
        w.write_all(b"\n")?;
    }
    w.flush()?;
    Ok(path)
}
