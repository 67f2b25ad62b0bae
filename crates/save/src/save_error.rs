// ---------------------------------------------------------------------------
// SaveError: error type for save/load operations
// ---------------------------------------------------------------------------

use std::fmt;

/// Errors that can occur while writing or reading a save file.
#[derive(Debug)]
pub enum SaveError {
    /// I/O error (file not found, permission denied, disk full, etc.)
    Io(std::io::Error),
    /// Bitcode encoding failed.
    Encode(String),
    /// Payload could not be decompressed or decoded.
    Decode(String),
    /// The file does not start with the save magic bytes.
    BadMagic,
    /// The file is shorter than its header says it should be.
    Truncated { len: usize, needed: usize },
    /// Save file format is newer than this build supports.
    VersionMismatch { expected_max: u32, found: u32 },
    /// Stored checksum does not match the payload.
    ChecksumMismatch { expected: u32, found: u32 },
    /// A load was requested with no bytes pending.
    NoData,
    /// A required resource was missing from the ECS world.
    MissingResource(&'static str),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "I/O error: {e}"),
            SaveError::Encode(msg) => write!(f, "Encoding error: {msg}"),
            SaveError::Decode(msg) => write!(f, "Decoding error: {msg}"),
            SaveError::BadMagic => write!(f, "Not a save file (bad magic bytes)"),
            SaveError::Truncated { len, needed } => {
                write!(f, "Save file truncated: {len} bytes, need {needed}")
            }
            SaveError::VersionMismatch {
                expected_max,
                found,
            } => write!(
                f,
                "Version mismatch: save is v{found}, but this build only supports up to v{expected_max}"
            ),
            SaveError::ChecksumMismatch { expected, found } => write!(
                f,
                "Checksum mismatch: header says {expected:#010X}, payload hashes to {found:#010X}"
            ),
            SaveError::NoData => write!(f, "No save data available to load"),
            SaveError::MissingResource(name) => write!(f, "Missing required resource: {name}"),
        }
    }
}

impl std::error::Error for SaveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SaveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<bitcode::Error> for SaveError {
    fn from(e: bitcode::Error) -> Self {
        SaveError::Decode(e.to_string())
    }
}

impl From<lz4_flex::block::DecompressError> for SaveError {
    fn from(e: lz4_flex::block::DecompressError) -> Self {
        SaveError::Decode(format!("lz4: {e}"))
    }
}
