//! Endian-aware binary archive primitives.
//!
//! Every multi-byte value in a table binary honors the byte order declared
//! in the fixed 8-byte file header (`"GAR5"`, endian byte, three zero
//! bytes).  The submodules provide the three access paths:
//!
//! - [`Reader`] — typed reads over any `Read + Seek` source,
//! - [`Writer`] — typed writes over any `Write` target (strictly forward;
//!   the container is laid out so nothing ever seeks back),
//! - [`NullSink`] — a position-only sink used for the first pass of the
//!   two-pass writer, so all section offsets are known before a single
//!   real byte is emitted.
//!
//! [`Writer`] and [`NullSink`] share the [`Sink`] trait; the container
//! writer is generic over it and replays the identical write sequence on
//! both passes.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{Error, FormatError, Result};

pub mod reader;
pub mod sink;
pub mod writer;

pub use reader::Reader;
pub use sink::NullSink;
pub use writer::Writer;

// ─────────────────────────────────────────────────────────────────────────────
// File header
// ─────────────────────────────────────────────────────────────────────────────

/// Size of the fixed file header; all stream positions start past it.
pub const FILE_HEADER_LEN: u32 = 8;

const MAGIC: [u8; 3] = *b"GAR";
const ARCHIVE_VERSION: u8 = b'5';
const ENDIAN_BIG: u8 = 0x10;
const ENDIAN_LITTLE: u8 = 0x20;

/// Validate the 8-byte file header and extract the byte order.
pub fn parse_file_header(data: &[u8; 8]) -> Result<Endian> {
    if data[..3] != MAGIC {
        return Err(FormatError::BadSignature.into());
    }
    if data[3] != ARCHIVE_VERSION {
        return Err(FormatError::BadVersion.into());
    }
    let endian = match data[4] {
        ENDIAN_BIG => Endian::Big,
        ENDIAN_LITTLE => Endian::Little,
        _ => return Err(FormatError::BadEndian.into()),
    };
    if data[5] != 0 || data[6] != 0 || data[7] != 0 {
        return Err(FormatError::BadSignature.into());
    }
    Ok(endian)
}

/// Build the 8-byte file header for `endian`.
pub fn file_header(endian: Endian) -> [u8; 8] {
    let e = match endian {
        Endian::Big => ENDIAN_BIG,
        Endian::Little => ENDIAN_LITTLE,
    };
    [MAGIC[0], MAGIC[1], MAGIC[2], ARCHIVE_VERSION, e, 0, 0, 0]
}

// ─────────────────────────────────────────────────────────────────────────────
// Byte order
// ─────────────────────────────────────────────────────────────────────────────

/// Byte order of all multi-byte values in a table binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

impl Endian {
    pub fn is_big(self) -> bool {
        self == Endian::Big
    }

    #[inline]
    pub(crate) fn u16_bytes(self, v: u16) -> [u8; 2] {
        let mut b = [0; 2];
        match self {
            Endian::Big => BigEndian::write_u16(&mut b, v),
            Endian::Little => LittleEndian::write_u16(&mut b, v),
        }
        b
    }

    #[inline]
    pub(crate) fn u32_bytes(self, v: u32) -> [u8; 4] {
        let mut b = [0; 4];
        match self {
            Endian::Big => BigEndian::write_u32(&mut b, v),
            Endian::Little => LittleEndian::write_u32(&mut b, v),
        }
        b
    }

    #[inline]
    pub(crate) fn u64_bytes(self, v: u64) -> [u8; 8] {
        let mut b = [0; 8];
        match self {
            Endian::Big => BigEndian::write_u64(&mut b, v),
            Endian::Little => LittleEndian::write_u64(&mut b, v),
        }
        b
    }

    #[inline]
    pub(crate) fn get_u16(self, b: &[u8]) -> u16 {
        match self {
            Endian::Big => BigEndian::read_u16(b),
            Endian::Little => LittleEndian::read_u16(b),
        }
    }

    #[inline]
    pub(crate) fn get_u32(self, b: &[u8]) -> u32 {
        match self {
            Endian::Big => BigEndian::read_u32(b),
            Endian::Little => LittleEndian::read_u32(b),
        }
    }

    #[inline]
    pub(crate) fn get_u64(self, b: &[u8]) -> u64 {
        match self {
            Endian::Big => BigEndian::read_u64(b),
            Endian::Little => LittleEndian::read_u64(b),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Target platforms
// ─────────────────────────────────────────────────────────────────────────────

/// Table binary target platform; determines byte order and default version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Pc,
    X64,
    Ps3,
    Ps4,
    X360,
    XOne,
}

impl Platform {
    /// All platforms, in CLI help order.
    pub const ALL: [Platform; 6] = [
        Platform::Pc,
        Platform::X64,
        Platform::Ps3,
        Platform::Ps4,
        Platform::X360,
        Platform::XOne,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Platform::Pc => "pc",
            Platform::X64 => "x64",
            Platform::Ps3 => "ps3",
            Platform::Ps4 => "ps4",
            Platform::X360 => "x360",
            Platform::XOne => "xone",
        }
    }

    pub fn desc(self) -> &'static str {
        match self {
            Platform::Pc => "Windows (32-bit)",
            Platform::X64 => "Windows (64-bit)",
            Platform::Ps3 => "PlayStation 3",
            Platform::Ps4 => "PlayStation 4",
            Platform::X360 => "Xbox 360",
            Platform::XOne => "Xbox One",
        }
    }

    pub fn from_name(name: &str) -> Option<Platform> {
        Platform::ALL.into_iter().find(|p| p.name() == name)
    }

    /// The console generation that shipped big-endian binaries.
    pub fn endian(self) -> Endian {
        match self {
            Platform::Ps3 | Platform::X360 => Endian::Big,
            _ => Endian::Little,
        }
    }

    /// Default table version when the CLI does not pin one.
    pub fn default_version(self) -> u8 {
        match self.endian() {
            Endian::Big => 5,
            Endian::Little => 6,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Stream references
// ─────────────────────────────────────────────────────────────────────────────

/// An `(offset, size)` pair addressing a byte range within the binary.
///
/// Wire form is two `u32`s in the order `size`, `pos`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamRef {
    pub size: u32,
    pub pos: u32,
}

impl StreamRef {
    pub fn new(pos: u32, size: u32) -> Self {
        StreamRef { size, pos }
    }

    /// A reference with zero size addresses nothing.
    pub fn empty(self) -> bool {
        self.size == 0
    }

    /// A usable reference starts past the file header and does not wrap.
    pub fn valid(self) -> bool {
        self.pos >= FILE_HEADER_LEN && self.pos.checked_add(self.size).is_some()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared sink interface
// ─────────────────────────────────────────────────────────────────────────────

const STR_NUL: [u8; 1] = [0];

/// Common interface of the real [`Writer`] and the layout-pass [`NullSink`].
///
/// Positions are `u32` because that is all the container can address; a
/// write that would push the position past `u32::MAX` fails.
pub trait Sink {
    fn endian(&self) -> Endian;
    fn pos(&self) -> u32;
    fn put_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    fn put_u8(&mut self, v: u8) -> Result<()> {
        self.put_bytes(&[v])
    }

    fn put_u16(&mut self, v: u16) -> Result<()> {
        let b = self.endian().u16_bytes(v);
        self.put_bytes(&b)
    }

    fn put_u32(&mut self, v: u32) -> Result<()> {
        let b = self.endian().u32_bytes(v);
        self.put_bytes(&b)
    }

    fn put_u64(&mut self, v: u64) -> Result<()> {
        let b = self.endian().u64_bytes(v);
        self.put_bytes(&b)
    }

    fn put_u16_slice(&mut self, values: &[u16]) -> Result<()> {
        for &v in values {
            self.put_u16(v)?;
        }
        Ok(())
    }

    fn put_u32_slice(&mut self, values: &[u32]) -> Result<()> {
        for &v in values {
            self.put_u32(v)?;
        }
        Ok(())
    }

    /// Serialize a reference: `size`, then `pos`.
    fn put_ref(&mut self, r: StreamRef) -> Result<()> {
        self.put_u32(r.size)?;
        self.put_u32(r.pos)
    }

    fn put_ref_slice(&mut self, refs: &[StreamRef]) -> Result<()> {
        for &r in refs {
            self.put_ref(r)?;
        }
        Ok(())
    }

    /// A 16-bit length followed by that many bytes, no terminator.
    fn put_u16_str(&mut self, bytes: &[u8]) -> Result<()> {
        let len = u16::try_from(bytes.len()).map_err(|_| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "string exceeds 65535 bytes",
            ))
        })?;
        self.put_u16(len)?;
        self.put_bytes(bytes)
    }

    /// A NUL-terminated byte string addressed by the returned reference.
    ///
    /// The trailing NUL counts toward `size`; extra NULs pad the stream to
    /// the next 4-byte boundary and count as well.
    fn put_ref_str(&mut self, bytes: &[u8]) -> Result<StreamRef> {
        let mut r = self.ref_begin();
        self.put_bytes(bytes)?;
        self.put_bytes(&STR_NUL)?;
        self.align4()?;
        self.ref_end(&mut r);
        Ok(r)
    }

    /// Pad with zero bytes until the position is 4-byte aligned.
    fn align4(&mut self) -> Result<()> {
        while self.pos() % 4 != 0 {
            self.put_u8(0)?;
        }
        Ok(())
    }

    /// Open a reference at the current position.
    fn ref_begin(&self) -> StreamRef {
        StreamRef::new(self.pos(), 0)
    }

    /// Close a reference, recording the bytes written since `ref_begin`.
    fn ref_end(&self, r: &mut StreamRef) {
        if self.pos() >= r.pos {
            r.size = self.pos() - r.pos;
        }
    }
}
