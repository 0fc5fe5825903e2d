//! Minimal structural validation of the extracted manifest.
//!
//! Only the fields needed to report extension identity are checked;
//! permission semantics, icon maps, and the rest of the manifest schema
//! are out of scope and pass through untouched.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::CrxError;
use crate::Result;

/// Manifest filename at the output-directory root.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Identity summary read from a validated manifest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestSummary {
    /// Extension display name, trimmed.
    pub name: String,
    /// Extension version string.
    pub version: String,
    /// Manifest schema version (2 or 3 in practice, unchecked).
    pub manifest_version: u64,
    /// Optional description.
    pub description: Option<String>,
    /// Declared permissions; non-string elements are filtered out.
    pub permissions: Vec<String>,
}

/// Validates parsed manifest data.
///
/// Required: `name` (non-empty after trimming), `version` (non-empty
/// string), `manifest_version` (number). Optional fields are type-checked
/// when present. Unknown fields are ignored.
///
/// # Errors
///
/// Returns `CrxError::InvalidManifest` naming the first missing or
/// malformed field.
pub fn validate(value: &Value) -> Result<ManifestSummary> {
    let object = value.as_object().ok_or_else(|| CrxError::InvalidManifest {
        field: "manifest".to_string(),
    })?;

    let name = object
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| CrxError::InvalidManifest {
            field: "name".to_string(),
        })?;

    let version = object
        .get("version")
        .and_then(Value::as_str)
        .filter(|version| !version.is_empty())
        .ok_or_else(|| CrxError::InvalidManifest {
            field: "version".to_string(),
        })?;

    let manifest_version = object
        .get("manifest_version")
        .and_then(Value::as_u64)
        .ok_or_else(|| CrxError::InvalidManifest {
            field: "manifest_version".to_string(),
        })?;

    let description = match object.get("description") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(CrxError::InvalidManifest {
                field: "description".to_string(),
            });
        }
    };

    let permissions = match object.get("permissions") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(_) => {
            return Err(CrxError::InvalidManifest {
                field: "permissions".to_string(),
            });
        }
    };

    Ok(ManifestSummary {
        name: name.to_string(),
        version: version.to_string(),
        manifest_version,
        description,
        permissions,
    })
}

/// Reads and validates `manifest.json` at the output-directory root.
///
/// # Errors
///
/// Returns `CrxError::InvalidManifest` when the file is missing,
/// unparseable, or fails validation. Callers treat this as a warning, not
/// a pipeline failure.
pub fn read_from_dir(output_dir: &Path) -> Result<ManifestSummary> {
    let path = output_dir.join(MANIFEST_FILE);
    let contents = std::fs::read_to_string(&path).map_err(|_| CrxError::InvalidManifest {
        field: "manifest".to_string(),
    })?;
    let value: Value =
        serde_json::from_str(&contents).map_err(|_| CrxError::InvalidManifest {
            field: "manifest".to_string(),
        })?;
    validate(&value)
}
