//! Append-only entry store.
//!
//! Format: a small header (magic, version, library provenance, dimension),
//! a stream of length-prefixed records, and a trailing CRC32 over every
//! record byte. There is no delete or update path — entries are appended
//! until the writer is closed, and a reader only ever sees a fixed, ordered
//! snapshot validated against that checksum at open time.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::codec::{self, Reader};
use crate::entry::{Entry, LibraryRef};
use crate::error::{Error, Result};

const MAGIC: &[u8; 4] = b"FRST";
const VERSION: u8 = 1;

fn write_header<W: Write>(w: &mut W, library: &LibraryRef) -> std::io::Result<()> {
    w.write_all(MAGIC)?;
    codec::write_u8(w, VERSION)?;
    codec::write_library(w, library)
}

fn read_header(r: &mut Reader<'_>) -> std::result::Result<LibraryRef, String> {
    let magic: [u8; 4] = r
        .read_bytes_exact(4)?
        .try_into()
        .map_err(|_| "truncated magic".to_string())?;
    if &magic != MAGIC {
        return Err(format!("bad magic: expected {MAGIC:?}, got {magic:?}"));
    }
    let version = r.read_u8()?;
    if version != VERSION {
        return Err(format!(
            "unsupported store format version: expected {VERSION}, got {version}"
        ));
    }
    r.read_library()
}

/// A writable, append-only entry store.
pub struct EntryStoreWriter {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    library: LibraryRef,
    body_crc: crc32fast::Hasher,
}

impl EntryStoreWriter {
    /// Creates a new store at `path`, writing the header immediately.
    pub fn create(library: LibraryRef, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| Error::io(&path, e))?;
        let mut writer = BufWriter::new(file);
        write_header(&mut writer, &library).map_err(|e| Error::io(&path, e))?;

        Ok(Self {
            path,
            writer: Some(writer),
            library,
            body_crc: crc32fast::Hasher::new(),
        })
    }

    /// Appends one entry. Fails with [`Error::ClosedStore`] after [`close`](Self::close).
    pub fn add(&mut self, entry: &Entry) -> Result<()> {
        if entry.vector.dimension() != self.library.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.library.dimension,
                got: entry.vector.dimension(),
            });
        }
        let writer = self.writer.as_mut().ok_or(Error::ClosedStore)?;
        let mut record = Vec::new();
        codec::write_entry(&mut record, entry).map_err(|e| Error::io(&self.path, e))?;
        self.body_crc.update(&record);
        writer
            .write_all(&record)
            .map_err(|e| Error::io(&self.path, e))?;
        Ok(())
    }

    /// Flushes, appends the body checksum, and finalizes the store. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut w) = self.writer.take() {
            let crc = std::mem::replace(&mut self.body_crc, crc32fast::Hasher::new()).finalize();
            codec::write_u32(&mut w, crc).map_err(|e| Error::io(&self.path, e))?;
            w.flush().map_err(|e| Error::io(&self.path, e))?;
        }
        Ok(())
    }

    pub fn library(&self) -> &LibraryRef {
        &self.library
    }
}

/// A read-only, memory-mapped view of an entry store.
pub struct EntryStoreReader {
    library: LibraryRef,
    mmap: Mmap,
    header_len: usize,
    offsets: Vec<usize>,
}

impl EntryStoreReader {
    /// Opens a store without checking its dimension against an expected one.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_inner(path, None)
    }

    /// Opens a store and fails with [`Error::LibraryMismatch`] if its
    /// dimension disagrees with `expected_dimension`.
    pub fn open_expecting(path: impl AsRef<Path>, expected_dimension: usize) -> Result<Self> {
        Self::open_inner(path, Some(expected_dimension))
    }

    fn open_inner(path: impl AsRef<Path>, expected_dimension: Option<usize>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::io(path, e))?;

        let mut r = Reader::new(&mmap);
        let library =
            read_header(&mut r).map_err(|msg| Error::ArtifactCorrupt(format!("{path:?}: {msg}")))?;

        if let Some(expected) = expected_dimension {
            if expected != library.dimension {
                return Err(Error::LibraryMismatch {
                    expected: format!("dimension {expected}"),
                    got: library.describe(),
                });
            }
        }

        let header_len = r.position();
        if mmap.len() < header_len + 4 {
            return Err(Error::ArtifactCorrupt(format!(
                "{path:?}: truncated store, missing trailing checksum"
            )));
        }
        let body_end = mmap.len() - 4;

        let mut offsets = Vec::new();
        while r.position() < body_end {
            offsets.push(r.position());
            r.skip_entry(library.dimension)
                .map_err(|msg| Error::ArtifactCorrupt(format!("{path:?}: {msg}")))?;
        }
        if r.position() != body_end {
            return Err(Error::ArtifactCorrupt(format!(
                "{path:?}: trailing bytes do not form a whole record"
            )));
        }

        let expected_crc = u32::from_le_bytes(
            mmap[body_end..body_end + 4]
                .try_into()
                .expect("exactly 4 bytes"),
        );
        let actual_crc = crc32fast::hash(&mmap[header_len..body_end]);
        if actual_crc != expected_crc {
            return Err(Error::ArtifactCorrupt(format!(
                "{path:?}: checksum mismatch: expected {expected_crc:08x}, got {actual_crc:08x}"
            )));
        }

        Ok(Self {
            library,
            mmap,
            header_len,
            offsets,
        })
    }

    pub fn library(&self) -> &LibraryRef {
        &self.library
    }

    pub fn dimension(&self) -> usize {
        self.library.dimension
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Returns every entry, in insertion order.
    pub fn read_all(&self) -> Vec<Entry> {
        self.offsets
            .iter()
            .map(|&offset| {
                let mut r = Reader::new(&self.mmap);
                r.seek(offset);
                r.read_entry(self.library.dimension)
                    .expect("offset table was built from a validated scan of this same file")
            })
            .collect()
    }

    #[allow(dead_code)]
    fn header_len(&self) -> usize {
        self.header_len
    }
}
