//! Reading corpus text from local files.
//!
//! A corpus is one text. A directory is read as the concatenation of its
//! `.txt` files in path order, separated by blank lines so that file
//! boundaries become paragraph boundaries for the chunker.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};

pub fn load_corpus(path: &Path) -> Result<String> {
    if path.is_file() {
        return read_file_content(path);
    }
    if !path.is_dir() {
        return Err(Error::InvalidInput(format!(
            "{} is neither a file nor a directory",
            path.display()
        )));
    }
    let files = list_txt_files(path);
    if files.is_empty() {
        info!(dir = %path.display(), "No .txt files found");
        return Ok(String::new());
    }
    let mut parts = Vec::with_capacity(files.len());
    for (file_index, file_path) in files.iter().enumerate() {
        debug!("Reading file {}/{}: {}", file_index + 1, files.len(), file_path.display());
        parts.push(read_file_content(file_path)?);
    }
    info!("Read {} files from {}", files.len(), path.display());
    Ok(parts.join("\n\n"))
}

fn read_file_content(file_path: &Path) -> Result<String> {
    match fs::read_to_string(file_path) {
        Ok(content) => Ok(content),
        Err(_) => Ok(String::from_utf8_lossy(&fs::read(file_path)?).to_string()),
    }
}

fn list_txt_files(root: &Path) -> Vec<PathBuf> {
    let mut txt_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("txt"))
        .collect();
    txt_files.sort();
    txt_files
}
