//! File-per-slot save store with zstd compression.
//!
//! Each slot is written to `<root>/<slot>.sav`. A file is a 14-byte header
//! (magic, version, CRC32 of the body, body length) followed by the
//! zstd-compressed bincode payload.

use crc32fast::Hasher;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::PersistError;
use super::payload::SavePayload;
use super::store::SaveStore;

/// Magic number for save file identification ("SATC").
const SAVE_MAGIC: u32 = 0x5341_5443;

/// Current save file format version.
const SAVE_VERSION: u16 = 1;

const HEADER_LEN: usize = 14;

const SAVE_EXTENSION: &str = "sav";

/// zstd level 3 for balanced speed/compression.
const ZSTD_LEVEL: i32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
struct SaveHeader {
    magic: u32,
    version: u16,
    crc32: u32,
    payload_len: u32,
}

impl SaveHeader {
    fn new(crc32: u32, payload_len: u32) -> Self {
        Self {
            magic: SAVE_MAGIC,
            version: SAVE_VERSION,
            crc32,
            payload_len,
        }
    }

    fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&self.magic.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.version.to_le_bytes());
        bytes[6..10].copy_from_slice(&self.crc32.to_le_bytes());
        bytes[10..14].copy_from_slice(&self.payload_len.to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, PersistError> {
        if bytes.len() < HEADER_LEN {
            return Err(PersistError::Truncated(bytes.len()));
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != SAVE_MAGIC {
            return Err(PersistError::BadMagic {
                expected: SAVE_MAGIC,
                found: magic,
            });
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != SAVE_VERSION {
            return Err(PersistError::UnsupportedVersion(version));
        }

        let crc32 = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
        let payload_len = u32::from_le_bytes([bytes[10], bytes[11], bytes[12], bytes[13]]);

        Ok(Self {
            magic,
            version,
            crc32,
            payload_len,
        })
    }
}

fn checksum(bytes: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    hasher.finalize()
}

/// Serialize a payload into the on-disk file format.
pub fn encode_save(payload: &SavePayload) -> Result<Vec<u8>, PersistError> {
    let serialized = bincode::serialize(payload)?;
    let compressed = zstd::encode_all(&serialized[..], ZSTD_LEVEL)?;
    let payload_len = u32::try_from(compressed.len()).map_err(|_| PersistError::Length {
        expected: u32::MAX as usize,
        found: compressed.len(),
    })?;
    let header = SaveHeader::new(checksum(&compressed), payload_len);

    let mut bytes = Vec::with_capacity(HEADER_LEN + compressed.len());
    bytes.extend_from_slice(&header.to_bytes());
    bytes.extend_from_slice(&compressed);
    Ok(bytes)
}

/// Parse a save file, validating header, length and checksum.
pub fn decode_save(bytes: &[u8]) -> Result<SavePayload, PersistError> {
    let header = SaveHeader::from_bytes(bytes)?;
    let body = &bytes[HEADER_LEN..];

    let expected = header.payload_len as usize;
    if body.len() != expected {
        return Err(PersistError::Length {
            expected,
            found: body.len(),
        });
    }

    let found = checksum(body);
    if found != header.crc32 {
        return Err(PersistError::Checksum {
            expected: header.crc32,
            found,
        });
    }

    let decompressed = zstd::decode_all(body)?;
    Ok(bincode::deserialize(&decompressed)?)
}

/// Map a slot name onto a filename stem: `[A-Za-z0-9_-]` pass through, every
/// other byte becomes `%XX`.
fn encode_slot(slot: &str) -> Result<String, PersistError> {
    if slot.is_empty() {
        return Err(PersistError::InvalidSlot(slot.to_owned()));
    }
    let mut stem = String::with_capacity(slot.len());
    for byte in slot.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            stem.push(char::from(byte));
        } else {
            let _ = write!(stem, "%{byte:02X}");
        }
    }
    Ok(stem)
}

fn decode_slot(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = stem.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Save store rooted at a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    /// Create a store rooted at `root`, creating the directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Self, PersistError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store rooted at the `class` sub-directory. The directory is created on
    /// first save.
    pub fn scoped(&self, class: &str) -> Result<DiskStore, PersistError> {
        Ok(Self {
            root: self.root.join(encode_slot(class)?),
        })
    }

    fn slot_path(&self, slot: &str) -> Result<PathBuf, PersistError> {
        Ok(self
            .root
            .join(format!("{}.{SAVE_EXTENSION}", encode_slot(slot)?)))
    }

    /// Whether a save file exists for `slot`.
    pub fn exists(&self, slot: &str) -> bool {
        self.slot_path(slot).is_ok_and(|path| path.is_file())
    }

    /// Write `payload` for `slot`. Goes through a temp file and a rename so a
    /// crash never leaves a half-written save behind.
    pub fn save(&self, slot: &str, payload: &SavePayload) -> Result<(), PersistError> {
        let path = self.slot_path(slot)?;
        let bytes = encode_save(payload)?;
        fs::create_dir_all(&self.root)?;

        let tmp = path.with_extension(format!("{SAVE_EXTENSION}.tmp"));
        {
            let mut file = File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        debug!(slot, bytes = bytes.len(), path = %path.display(), "wrote save file");
        Ok(())
    }

    /// Read the payload for `slot`; `Ok(None)` when no file exists.
    pub fn load(&self, slot: &str) -> Result<Option<SavePayload>, PersistError> {
        let path = self.slot_path(slot)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        decode_save(&bytes).map(Some)
    }

    /// Delete the file for `slot`. Returns whether one existed.
    pub fn delete(&self, slot: &str) -> Result<bool, PersistError> {
        let path = self.slot_path(slot)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Slot names with a save file in this directory, sorted.
    pub fn list_slots(&self) -> Result<Vec<String>, PersistError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut slots = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some(SAVE_EXTENSION)
            {
                continue;
            }
            if let Some(slot) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(decode_slot)
            {
                slots.push(slot);
            }
        }
        slots.sort();
        Ok(slots)
    }

    /// Delete every save file in this directory (sub-directories are kept).
    pub fn clear(&self) -> Result<(), PersistError> {
        for slot in self.list_slots()? {
            self.delete(&slot)?;
        }
        Ok(())
    }
}

impl SaveStore for DiskStore {
    fn store(&mut self, key: &str, payload: &SavePayload) -> Result<(), PersistError> {
        self.save(key, payload)
    }

    fn retrieve(&mut self, key: &str) -> Result<Option<SavePayload>, PersistError> {
        self.load(key)
    }

    fn remove(&mut self, key: &str) -> Result<bool, PersistError> {
        self.delete(key)
    }

    fn clear_all(&mut self) -> Result<(), PersistError> {
        self.clear()
    }

    fn contains(&self, key: &str) -> bool {
        self.exists(key)
    }
}
