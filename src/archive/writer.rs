//! Forward-only typed writer.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};

use super::{file_header, Endian, Sink, FILE_HEADER_LEN};

/// Endian-aware writer over any `Write` target.
///
/// The file header is emitted at construction, so the position starts at
/// [`FILE_HEADER_LEN`].  The container layout is strictly sequential —
/// offsets come from the [`super::NullSink`] layout pass, never from
/// seeking back.
pub struct Writer<W: Write> {
    inner: W,
    endian: Endian,
    pos: u32,
}

impl Writer<BufWriter<File>> {
    /// Create a table binary on disk for `endian`.
    pub fn create(path: &Path, endian: Endian) -> Result<Self> {
        Writer::new(BufWriter::new(File::create(path)?), endian)
    }
}

impl<W: Write> Writer<W> {
    /// Wrap a target, emitting the file header.
    pub fn new(mut inner: W, endian: Endian) -> Result<Self> {
        inner.write_all(&file_header(endian))?;
        Ok(Writer {
            inner,
            endian,
            pos: FILE_HEADER_LEN,
        })
    }

    /// Flush and return the underlying target.
    pub fn into_inner(mut self) -> W {
        let _ = self.inner.flush();
        self.inner
    }

    /// Flush buffered bytes to the target.
    pub fn finish(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

impl<W: Write> Sink for Writer<W> {
    fn endian(&self) -> Endian {
        self.endian
    }

    fn pos(&self) -> u32 {
        self.pos
    }

    fn put_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let len = u32::try_from(bytes.len())
            .ok()
            .and_then(|n| self.pos.checked_add(n))
            .ok_or_else(|| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "archive exceeds 4 GiB",
                ))
            })?;
        self.inner.write_all(bytes)?;
        self.pos = len;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_emitted_up_front() {
        let w = Writer::new(Vec::new(), Endian::Big).unwrap();
        assert_eq!(w.pos(), 8);
        let bytes = w.into_inner();
        assert_eq!(&bytes, b"GAR5\x10\0\0\0");
    }

    #[test]
    fn position_tracks_writes() {
        let mut w = Writer::new(Vec::new(), Endian::Little).unwrap();
        w.put_u32(7).unwrap();
        w.put_u8(1).unwrap();
        assert_eq!(w.pos(), 13);
        w.align4().unwrap();
        assert_eq!(w.pos(), 16);
    }

    #[test]
    fn ref_brackets_measure_a_region() {
        let mut w = Writer::new(Vec::new(), Endian::Little).unwrap();
        let mut r = w.ref_begin();
        w.put_u32_slice(&[1, 2, 3]).unwrap();
        w.ref_end(&mut r);
        assert_eq!(r.pos, 8);
        assert_eq!(r.size, 12);
    }
}
