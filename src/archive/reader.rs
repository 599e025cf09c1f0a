//! Typed reads over a seekable byte source.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::Result;

use super::{parse_file_header, Endian, StreamRef};

/// Endian-aware reader over any `Read + Seek` source.
///
/// Construction consumes and validates the 8-byte file header; the byte
/// order it declares governs every subsequent multi-byte read.
#[derive(Debug)]
pub struct Reader<R: Read + Seek> {
    inner: R,
    endian: Endian,
}

impl Reader<BufReader<File>> {
    /// Open a table binary from disk.
    pub fn open(path: &Path) -> Result<Self> {
        Reader::new(BufReader::new(File::open(path)?))
    }
}

impl<R: Read + Seek> Reader<R> {
    /// Wrap a source, reading and validating the file header.
    pub fn new(mut inner: R) -> Result<Self> {
        let mut header = [0u8; 8];
        inner.read_exact(&mut header).map_err(|_| {
            crate::error::Error::Format(crate::error::FormatError::TruncatedHeader)
        })?;
        let endian = parse_file_header(&header)?;
        Ok(Reader { inner, endian })
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Current byte position.
    pub fn tell(&mut self) -> Result<u32> {
        let pos = self.inner.stream_position()?;
        Ok(pos as u32)
    }

    /// Absolute seek.
    pub fn seek_to(&mut self, pos: u32) -> Result<()> {
        self.inner.seek(SeekFrom::Start(u64::from(pos)))?;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let mut b = [0u8; 1];
        self.inner.read_exact(&mut b)?;
        Ok(b[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let mut b = [0u8; 2];
        self.inner.read_exact(&mut b)?;
        Ok(self.endian.get_u16(&b))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let mut b = [0u8; 4];
        self.inner.read_exact(&mut b)?;
        Ok(self.endian.get_u32(&b))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let mut b = [0u8; 8];
        self.inner.read_exact(&mut b)?;
        Ok(self.endian.get_u64(&b))
    }

    pub fn read_u16_vec(&mut self, count: usize) -> Result<Vec<u16>> {
        let mut raw = vec![0u8; count * 2];
        self.inner.read_exact(&mut raw)?;
        Ok(raw.chunks_exact(2).map(|c| self.endian.get_u16(c)).collect())
    }

    pub fn read_u32_vec(&mut self, count: usize) -> Result<Vec<u32>> {
        let mut raw = vec![0u8; count * 4];
        self.inner.read_exact(&mut raw)?;
        Ok(raw.chunks_exact(4).map(|c| self.endian.get_u32(c)).collect())
    }

    /// Deserialize a reference: `size`, then `pos`.
    pub fn read_ref(&mut self) -> Result<StreamRef> {
        let size = self.read_u32()?;
        let pos = self.read_u32()?;
        Ok(StreamRef { size, pos })
    }

    pub fn read_ref_vec(&mut self, count: usize) -> Result<Vec<StreamRef>> {
        let mut refs = Vec::with_capacity(count);
        for _ in 0..count {
            refs.push(self.read_ref()?);
        }
        Ok(refs)
    }

    /// A 16-bit length followed by that many bytes, no terminator.
    pub fn read_u16_str(&mut self) -> Result<Vec<u8>> {
        let len = self.read_u16()? as usize;
        let mut bytes = vec![0u8; len];
        self.inner.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    /// The NUL-terminated byte string addressed by `r`.
    ///
    /// Reads the whole referenced range and trims at the first NUL; an
    /// empty reference yields an empty string.
    pub fn read_ref_str(&mut self, r: StreamRef) -> Result<Vec<u8>> {
        if r.empty() {
            return Ok(Vec::new());
        }
        self.seek_to(r.pos)?;
        let mut bytes = vec![0u8; r.size as usize];
        self.inner.read_exact(&mut bytes)?;
        if let Some(nul) = bytes.iter().position(|&b| b == 0) {
            bytes.truncate(nul);
        }
        Ok(bytes)
    }
}
