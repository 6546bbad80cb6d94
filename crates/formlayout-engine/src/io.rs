use std::fs;
use std::path::{Path, PathBuf};

pub const FORM_EXTENSION: &str = "form";

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid forms directory: {0}")]
    InvalidFormsDir(String),
}

/// Read a form descriptor.
pub fn read_form(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::Io)
}

/// Find all `.form` files under `forms_root`, sorted by path.
pub fn list_forms(forms_root: &Path) -> Result<Vec<PathBuf>, IoError> {
    if !forms_root.is_dir() {
        return Err(IoError::InvalidFormsDir(format!(
            "{} is not a directory",
            forms_root.display()
        )));
    }

    let mut files = Vec::new();
    scan_directory_recursive(forms_root, &mut files)?;
    files.sort();
    log::debug!("found {} forms in {}", files.len(), forms_root.display());
    Ok(files)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == FORM_EXTENSION
        {
            files.push(path);
        }
    }

    Ok(())
}
