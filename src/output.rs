//! Writing the generated document

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::prelude::SchematsError;

/// Write a document, creating missing parent directories
pub fn write_output(path: &Path, contents: &str) -> Result<(), SchematsError> {
    let output_error = |source| SchematsError::Output {
        path: path.to_path_buf(),
        source,
    };

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(output_error)?;
            debug!(path = ?parent, "Created output directory");
        }
    }

    fs::write(path, contents).map_err(output_error)
}
