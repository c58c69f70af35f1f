use thiserror::Error;

/// Failures raised by save stores.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Filesystem access failed (includes zstd stream errors).
    #[error("save store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// bincode could not encode or decode the payload.
    #[error("failed to encode save payload: {0}")]
    Encode(#[from] bincode::Error),
    /// The slot name cannot be mapped to a file.
    #[error("invalid save slot name `{0}`")]
    InvalidSlot(String),
    /// File shorter than the fixed header.
    #[error("save file too short ({0} bytes)")]
    Truncated(usize),
    /// Header magic did not match.
    #[error("invalid save magic: expected 0x{expected:08X}, got 0x{found:08X}")]
    BadMagic {
        /// Magic this build writes.
        expected: u32,
        /// Magic read from the file.
        found: u32,
    },
    /// Written by a newer or unknown format version.
    #[error("unsupported save version {0}")]
    UnsupportedVersion(u16),
    /// Body checksum did not match the header.
    #[error("CRC32 mismatch: expected {expected:08X}, got {found:08X}")]
    Checksum {
        /// Checksum stored in the header.
        expected: u32,
        /// Checksum of the body on disk.
        found: u32,
    },
    /// Body length did not match the header.
    #[error("save body length mismatch: header says {expected}, file has {found}")]
    Length {
        /// Length stored in the header.
        expected: usize,
        /// Bytes actually present.
        found: usize,
    },
}
