//! Packaging of local model inputs for upload.
//!
//! A bare input file is uploaded as-is. When auxiliary data files accompany
//! it (rainfall, temperature, ...), everything is staged into a deflate zip
//! archive inside a temp directory that lives until the POST has gone out.

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use tempfile::TempDir;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),
    #[error("input file has no valid UTF-8 file name: {0}")]
    InvalidFileName(PathBuf),
    #[error("duplicate file name in upload archive: {0}")]
    DuplicateName(String),
    #[error("failed to stage upload archive: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write upload archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Where the model input comes from: a remote URL the server fetches itself,
/// or a local file this client uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Url(String),
    LocalFile(PathBuf),
}

impl InputSource {
    /// Classify a CLI argument. Local paths are checked for existence here,
    /// before any network I/O happens.
    pub fn from_arg(arg: &str) -> Result<Self, PayloadError> {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            Ok(InputSource::Url(arg.to_string()))
        } else {
            let path = PathBuf::from(arg);
            if !path.exists() {
                return Err(PayloadError::InputNotFound(path));
            }
            Ok(InputSource::LocalFile(path))
        }
    }

    /// A human label for the input: file stem for local files, "Remote" for
    /// URLs.
    pub fn label_stem(&self) -> String {
        match self {
            InputSource::Url(_) => "Remote".to_string(),
            InputSource::LocalFile(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Remote".to_string()),
        }
    }
}

/// A staged upload: the file to send and the name the server should see.
///
/// When aux files are present, `path` points inside `_tempdir`; the guard
/// keeps the archive alive until the payload is dropped after the POST.
#[derive(Debug)]
pub struct UploadPayload {
    pub upload_name: String,
    pub path: PathBuf,
    _tempdir: Option<TempDir>,
}

impl UploadPayload {
    pub fn stage(input: &Path, aux_files: &[PathBuf]) -> Result<Self, PayloadError> {
        if !input.exists() {
            return Err(PayloadError::InputNotFound(input.to_path_buf()));
        }
        let input_name = utf8_file_name(input)?;

        // Aux paths that do not exist are skipped with a warning rather than
        // failing the submission.
        let existing_aux: Vec<&PathBuf> = aux_files
            .iter()
            .filter(|aux| {
                if aux.exists() {
                    true
                } else {
                    warn!("Auxiliary file not found: {}", aux.display());
                    false
                }
            })
            .collect();

        if existing_aux.is_empty() {
            return Ok(Self {
                upload_name: input_name,
                path: input.to_path_buf(),
                _tempdir: None,
            });
        }

        // Archive entries are flat base names; collisions would silently
        // overwrite, so reject them up front.
        let mut seen = HashSet::new();
        seen.insert(input_name.clone());
        for aux in &existing_aux {
            let name = utf8_file_name(aux)?;
            if !seen.insert(name.clone()) {
                return Err(PayloadError::DuplicateName(name));
            }
        }

        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());
        let upload_name = format!("{}.zip", stem);

        let tempdir = TempDir::new()?;
        let zip_path = tempdir.path().join(&upload_name);
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut writer = zip::ZipWriter::new(File::create(&zip_path)?);
        writer.start_file(input_name.as_str(), options)?;
        io::copy(&mut File::open(input)?, &mut writer)?;
        for aux in &existing_aux {
            writer.start_file(utf8_file_name(aux)?, options)?;
            io::copy(&mut File::open(aux)?, &mut writer)?;
        }
        writer.finish()?;

        Ok(Self {
            upload_name,
            path: zip_path,
            _tempdir: Some(tempdir),
        })
    }
}

fn utf8_file_name(path: &Path) -> Result<String, PayloadError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| PayloadError::InvalidFileName(path.to_path_buf()))
}
