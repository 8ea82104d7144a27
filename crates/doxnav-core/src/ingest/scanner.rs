//! Discovery of index scripts under a generated-documentation root.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::errors::IndexResult;
use crate::models::{QualifiedName, ANNOTATED_VAR, HIERARCHY_VAR};

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// What a discovered index script contributes to the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptRole {
    /// `navtreedata.js`: navigation tree, shard boundaries, sync messages.
    NavTree,
    /// `hierarchy.js`: inheritance listing.
    Hierarchy,
    /// `annotated_dup.js`: namespace/class/struct listing.
    Annotated,
    /// `namespace….js`: member listing of one namespace (enums, enumerators).
    NamespaceMembers(QualifiedName),
}

/// A discovered script: its path, file stem, role, and raw text.
#[derive(Debug)]
pub struct ScriptSource {
    pub path: PathBuf,
    pub stem: String,
    pub role: ScriptRole,
    pub text: String,
}

// ---------------------------------------------------------------------------
// Stem decoding
// ---------------------------------------------------------------------------

/// Reverse Doxygen's file-stem escaping for the forms present in index
/// scripts: `_1` encodes `:` (so `_1_1` is `::`) and `__` encodes `_`.
pub fn decode_stem(escaped: &str) -> String {
    let bytes = escaped.as_bytes();
    let mut out = String::with_capacity(escaped.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'_' && i + 1 < bytes.len() {
            match bytes[i + 1] {
                b'_' => {
                    out.push('_');
                    i += 2;
                    continue;
                }
                b'1' => {
                    out.push(':');
                    i += 2;
                    continue;
                }
                _ => {}
            }
        }
        out.push(bytes[i] as char);
        i += 1;
    }
    out
}

/// Classify a file stem, or `None` for scripts the model does not consume
/// (search indices, resize helpers, per-class member pages, …).
pub fn classify_stem(stem: &str) -> Option<ScriptRole> {
    // The listing scripts declare a variable named after their file stem.
    if stem == "navtreedata" {
        return Some(ScriptRole::NavTree);
    } else if stem == HIERARCHY_VAR {
        return Some(ScriptRole::Hierarchy);
    } else if stem == ANNOTATED_VAR {
        return Some(ScriptRole::Annotated);
    }
    if let Some(escaped) = stem.strip_prefix("namespace") {
        if !escaped.is_empty() {
            let decoded = decode_stem(escaped);
            if let Ok(name) = QualifiedName::parse(&decoded) {
                return Some(ScriptRole::NamespaceMembers(name));
            }
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Scanning
// ---------------------------------------------------------------------------

/// Walk `root` and read every index script the model consumes.
///
/// Traversal is sorted by file name so load order (and therefore catalog
/// order) is deterministic across platforms.
pub fn scan_doc_root(root: &Path) -> IndexResult<Vec<ScriptSource>> {
    let mut sources = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("js") {
            continue;
        }
        let stem = match path.file_stem() {
            Some(s) => s.to_string_lossy().to_string(),
            None => continue,
        };
        let role = match classify_stem(&stem) {
            Some(role) => role,
            None => continue,
        };
        debug!(path = %path.display(), ?role, "discovered index script");
        let text = std::fs::read_to_string(path)?;
        sources.push(ScriptSource {
            path: path.to_path_buf(),
            stem,
            role,
            text,
        });
    }

    Ok(sources)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
