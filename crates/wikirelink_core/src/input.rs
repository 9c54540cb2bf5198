use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const READ_FAILURE_MESSAGE: &str = "Couldn't read the file. Try again!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOrigin {
    Empty,
    File(PathBuf),
    Unreadable { path: PathBuf, reason: String },
}

/// One exported page, read once and handed to the rewriter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub origin: DocumentOrigin,
    pub text: String,
}

impl Document {
    pub fn empty() -> Self {
        Self {
            origin: DocumentOrigin::Empty,
            text: String::new(),
        }
    }

    /// Read `path` when given. A failed read is recovered here: the document
    /// is empty and its origin carries the failure for the caller to report.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::empty();
        };
        match read_document(path) {
            Ok(text) => Self {
                origin: DocumentOrigin::File(path.to_path_buf()),
                text,
            },
            Err(error) => {
                log::debug!("{error:#}");
                Self {
                    origin: DocumentOrigin::Unreadable {
                        path: path.to_path_buf(),
                        reason: format!("{error:#}"),
                    },
                    text: String::new(),
                }
            }
        }
    }

    pub fn read_failed(&self) -> bool {
        matches!(self.origin, DocumentOrigin::Unreadable { .. })
    }

    pub fn describe_origin(&self) -> String {
        match &self.origin {
            DocumentOrigin::Empty => "<none>".to_string(),
            DocumentOrigin::File(path) => normalize_for_display(path),
            DocumentOrigin::Unreadable { path, reason } => {
                format!("{} (unreadable: {reason})", normalize_for_display(path))
            }
        }
    }
}

pub fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn normalize_for_display(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
