//! Position-only sink for the layout pass.

use crate::error::{Error, Result};

use super::{Endian, Sink, FILE_HEADER_LEN};

/// A sink that tracks the byte position but discards all data.
///
/// The container writer runs its full write sequence against this first to
/// learn every section offset, then replays the sequence against the real
/// [`super::Writer`].  Positions start at [`FILE_HEADER_LEN`] like the real
/// writer's.
pub struct NullSink {
    endian: Endian,
    pos: u32,
}

impl NullSink {
    pub fn new(endian: Endian) -> Self {
        NullSink {
            endian,
            pos: FILE_HEADER_LEN,
        }
    }
}

impl Sink for NullSink {
    fn endian(&self) -> Endian {
        self.endian
    }

    fn pos(&self) -> u32 {
        self.pos
    }

    fn put_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.pos = u32::try_from(bytes.len())
            .ok()
            .and_then(|n| self.pos.checked_add(n))
            .ok_or_else(|| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "archive exceeds 4 GiB",
                ))
            })?;
        Ok(())
    }
}
