//! Save file layout.
//!
//! ```text
//! offset  size  field
//! 0       4     magic "MDSV"
//! 4       4     format version (u32 LE)
//! 8       4     xxh32 checksum of the stored payload (u32 LE)
//! 12      4     stored payload length in bytes (u32 LE)
//! 16      ..    payload: lz4 block (size-prepended) of bitcode `SaveData`
//! ```

use std::collections::BTreeMap;

use xxhash_rust::xxh32::xxh32;

use crate::save_error::SaveError;

pub const MAGIC: [u8; 4] = *b"MDSV";
pub const FORMAT_VERSION: u32 = 1;
pub const HEADER_SIZE: usize = 16;

const CHECKSUM_SEED: u32 = 0;

/// Everything written to disk: one entry per registered `Saveable`.
#[derive(bitcode::Encode, bitcode::Decode, Debug, Default, Clone, PartialEq)]
pub struct SaveData {
    pub version: u32,
    pub extensions: BTreeMap<String, Vec<u8>>,
}

impl SaveData {
    pub fn new(extensions: BTreeMap<String, Vec<u8>>) -> Self {
        Self {
            version: FORMAT_VERSION,
            extensions,
        }
    }
}

// =============================================================================
// Header
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub version: u32,
    pub checksum: u32,
    pub payload_len: u32,
}

impl FileHeader {
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&MAGIC);
        out[4..8].copy_from_slice(&self.version.to_le_bytes());
        out[8..12].copy_from_slice(&self.checksum.to_le_bytes());
        out[12..16].copy_from_slice(&self.payload_len.to_le_bytes());
        out
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, SaveError> {
        if bytes.len() < MAGIC.len() || bytes[0..4] != MAGIC {
            return Err(SaveError::BadMagic);
        }
        if bytes.len() < HEADER_SIZE {
            return Err(SaveError::Truncated {
                len: bytes.len(),
                needed: HEADER_SIZE,
            });
        }
        Ok(Self {
            version: read_u32(bytes, 4),
            checksum: read_u32(bytes, 8),
            payload_len: read_u32(bytes, 12),
        })
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(word)
}

// =============================================================================
// Encode / decode
// =============================================================================

/// Serialize, compress and frame `data`.
pub fn encode_save(data: &SaveData) -> Result<Vec<u8>, SaveError> {
    let raw = bitcode::encode(data);
    let payload = lz4_flex::compress_prepend_size(&raw);
    let payload_len = u32::try_from(payload.len())
        .map_err(|_| SaveError::Encode(format!("payload too large: {} bytes", payload.len())))?;

    let header = FileHeader {
        version: FORMAT_VERSION,
        checksum: xxh32(&payload, CHECKSUM_SEED),
        payload_len,
    };

    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Validate the frame and recover the `SaveData` it carries.
pub fn decode_save(bytes: &[u8]) -> Result<SaveData, SaveError> {
    let header = FileHeader::parse(bytes)?;
    if header.version > FORMAT_VERSION {
        return Err(SaveError::VersionMismatch {
            expected_max: FORMAT_VERSION,
            found: header.version,
        });
    }

    let needed = HEADER_SIZE + header.payload_len as usize;
    if bytes.len() < needed {
        return Err(SaveError::Truncated {
            len: bytes.len(),
            needed,
        });
    }
    let payload = &bytes[HEADER_SIZE..needed];

    let found = xxh32(payload, CHECKSUM_SEED);
    if found != header.checksum {
        return Err(SaveError::ChecksumMismatch {
            expected: header.checksum,
            found,
        });
    }

    let raw = lz4_flex::decompress_size_prepended(payload)?;
    let data: SaveData = bitcode::decode(&raw)?;
    Ok(data)
}
