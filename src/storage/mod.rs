//! Local persistence of generated images.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::error::{ImageError, Result};
use crate::models::GenerationRequest;

/// Expands `{model}`, `{timestamp}` and `{id}` in a destination template.
///
/// Templates without placeholders are returned unchanged, so plain paths work
/// as-is.
pub fn expand_template(template: &str, request: &GenerationRequest) -> PathBuf {
    let mut expanded = template.to_string();

    if expanded.contains("{model}") {
        expanded = expanded.replace("{model}", &sanitize(&request.model));
    }
    if expanded.contains("{timestamp}") {
        expanded = expanded.replace("{timestamp}", &Utc::now().timestamp().to_string());
    }
    if expanded.contains("{id}") {
        expanded = expanded.replace("{id}", &Uuid::new_v4().to_string());
    }

    PathBuf::from(expanded)
}

fn sanitize(model: &str) -> String {
    model.replace(['.', ':', '/', '\\'], "_")
}

/// Resolves `path` against the current directory and collapses `.` and `..`
/// lexically, without touching the filesystem.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = std::env::current_dir().map_err(|source| ImageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        cwd.join(path)
    };
    Ok(normalize(&joined))
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Writes `bytes` to `path`, replacing any existing file.
///
/// The data goes to a temporary file in the destination directory first and is
/// renamed into place, so readers never see a truncated image. On failure the
/// temporary file is removed when it drops.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    let target = absolute(path)?;
    let io_err = |source: std::io::Error| ImageError::Io {
        path: target.clone(),
        source,
    };

    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(&target).map_err(|e| io_err(e.error))?;

    log::debug!("Wrote {} bytes to {}", bytes.len(), target.display());
    Ok(target)
}
