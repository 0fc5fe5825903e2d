//! Container header parsing.
//!
//! A packaged extension starts with a fixed binary header:
//! 4-byte magic `Cr24`, a little-endian `u32` version, then
//! version-specific length fields that locate the embedded ZIP payload.

use crate::CrxError;
use crate::Result;
use crate::bytes::ByteCursor;

/// Magic bytes every container starts with.
pub const CRX_MAGIC: [u8; 4] = *b"Cr24";

/// Supported container format versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrxVersion {
    /// Version 2: public key and signature lengths precede the payload.
    V2,
    /// Version 3: a single protobuf header of declared size precedes the
    /// payload.
    V3,
}

impl std::fmt::Display for CrxVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V2 => write!(f, "2"),
            Self::V3 => write!(f, "3"),
        }
    }
}

/// Parsed container header.
///
/// Derived once from the raw bytes and never mutated. Parsing the same
/// buffer always yields the same header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrxHeader {
    /// Container format version.
    pub version: CrxVersion,
    /// Byte offset where the embedded archive payload begins.
    /// Invariant: strictly less than the container length.
    pub payload_offset: u32,
}

/// Parses a container header from the full container bytes.
///
/// Layout:
/// - V2: `magic | version | pk_len | sig_len | pk | sig | payload`,
///   so `payload_offset = 16 + pk_len + sig_len`.
/// - V3: `magic | version | header_size | header | payload`,
///   so `payload_offset = 12 + header_size`.
///
/// # Errors
///
/// - `CrxError::MalformedInput` when the magic is wrong, the header is
///   truncated, or the computed offset is not inside the buffer.
/// - `CrxError::UnsupportedVersion` for any version other than 2 or 3.
pub fn parse(data: &[u8]) -> Result<CrxHeader> {
    let mut cursor = ByteCursor::new(data);

    let magic = cursor.read_bytes(4)?;
    if magic != CRX_MAGIC {
        return Err(CrxError::MalformedInput {
            reason: "bad container magic".to_string(),
        });
    }

    let version = cursor.read_u32_le()?;
    let (version, payload_offset) = match version {
        2 => {
            let public_key_len = u64::from(cursor.read_u32_le()?);
            let signature_len = u64::from(cursor.read_u32_le()?);
            let offset = cursor.position() as u64 + public_key_len + signature_len;
            (CrxVersion::V2, offset)
        }
        3 => {
            let header_size = u64::from(cursor.read_u32_le()?);
            let offset = cursor.position() as u64 + header_size;
            (CrxVersion::V3, offset)
        }
        other => return Err(CrxError::UnsupportedVersion { version: other }),
    };

    if payload_offset >= data.len() as u64 {
        return Err(CrxError::MalformedInput {
            reason: format!(
                "payload offset {payload_offset} exceeds file size {}",
                data.len()
            ),
        });
    }

    // The offset fits in u32: it is below the buffer length, which the
    // acquisition size gate bounds well under u32::MAX.
    let payload_offset =
        u32::try_from(payload_offset).map_err(|_| CrxError::MalformedInput {
            reason: format!("payload offset {payload_offset} does not fit in 32 bits"),
        })?;

    Ok(CrxHeader {
        version,
        payload_offset,
    })
}
