//! Output-path containment and display-name sanitization.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::CrxError;
use crate::Result;

/// Longest name `sanitize_name` will produce.
const MAX_NAME_LEN: usize = 200;

/// Substituted when sanitization leaves nothing usable.
const NAME_PLACEHOLDER: &str = "extension";

/// Validates that filesystem paths stay inside a fixed set of allowed
/// roots.
///
/// The working directory is captured once at construction and stored;
/// later changes to the process working directory cannot move the trust
/// boundary. Relative allowed roots are resolved against that snapshot,
/// and the literal root `"."` resolves to the snapshot itself.
///
/// # Examples
///
/// ```
/// use crxtract_core::security::PathGuard;
/// use std::path::{Path, PathBuf};
///
/// let guard = PathGuard::new(&[PathBuf::from(".")], PathBuf::from("/work"));
///
/// assert!(guard.resolve(Path::new("extensions/foo"), None).is_ok());
/// assert!(guard.resolve(Path::new("../../etc/passwd"), None).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct PathGuard {
    roots: Vec<PathBuf>,
    working_dir: PathBuf,
}

impl PathGuard {
    /// Creates a guard from allowed-root paths and a working-directory
    /// snapshot.
    ///
    /// Each root is resolved to a normalized absolute path immediately;
    /// validation later is purely lexical against this list.
    #[must_use]
    pub fn new(allowed_roots: &[PathBuf], working_dir: PathBuf) -> Self {
        let roots = allowed_roots
            .iter()
            .map(|root| {
                if root.is_absolute() {
                    normalize(root)
                } else {
                    normalize(&working_dir.join(root))
                }
            })
            .collect();
        Self { roots, working_dir }
    }

    /// Resolves a candidate path and proves it lies under an allowed root.
    ///
    /// The candidate is joined onto `base` when given, used verbatim when
    /// absolute, and otherwise joined onto the captured working directory.
    /// The joined path is lexically normalized (`.` dropped, `..` pops,
    /// clamped at the filesystem root) and accepted iff it equals an
    /// allowed root or is a strict descendant of one.
    ///
    /// Call this immediately before every directory creation or write:
    /// path composition after an earlier check can still produce a path
    /// that check never saw.
    ///
    /// # Errors
    ///
    /// Returns `CrxError::PathOutsideAllowedRoots` otherwise.
    pub fn resolve(&self, candidate: &Path, base: Option<&Path>) -> Result<PathBuf> {
        let joined = match base {
            Some(base) => base.join(candidate),
            None if candidate.is_absolute() => candidate.to_path_buf(),
            None => self.working_dir.join(candidate),
        };
        let normalized = normalize(&joined);

        if self.roots.iter().any(|root| normalized.starts_with(root)) {
            Ok(normalized)
        } else {
            Err(CrxError::PathOutsideAllowedRoots { path: normalized })
        }
    }

    /// The working-directory snapshot this guard was built with.
    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

/// Lexically normalizes a path: drops `.`, pops a component for each
/// `..`, and clamps at the root so traversal cannot climb above it.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Only pop real name components; at the root there is
                // nothing left to climb out of.
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                }
            }
            Component::RootDir | Component::Prefix(_) | Component::Normal(_) => {
                out.push(component);
            }
        }
    }
    out
}

/// Sanitizes an untrusted display name into a filesystem-legal name.
///
/// Strips path separators, control characters, and other
/// filesystem-illegal characters; collapses runs of `.` to a single dot;
/// trims whitespace; truncates to 200 characters; and substitutes a
/// fixed placeholder when nothing survives.
///
/// The result is idempotent: sanitizing a sanitized name returns it
/// unchanged.
#[must_use]
pub fn sanitize_name(raw: &str) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    let mut last_was_dot = false;
    for ch in raw.chars() {
        if ch.is_control() || matches!(ch, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
            continue;
        }
        if ch == '.' {
            if last_was_dot {
                continue;
            }
            last_was_dot = true;
        } else {
            last_was_dot = false;
        }
        cleaned.push(ch);
    }

    let trimmed = cleaned.trim();
    let truncated: String = trimmed.chars().take(MAX_NAME_LEN).collect();
    // Truncation can expose trailing whitespace that was interior before.
    let name = truncated.trim_end();

    if name.is_empty() {
        NAME_PLACEHOLDER.to_string()
    } else {
        name.to_string()
    }
}
