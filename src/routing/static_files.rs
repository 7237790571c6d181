//! Static file delivery.
//!
//! # Responsibilities
//! - Claim GET requests whose path sits under a configured URL prefix
//! - Map the remainder onto a document root without escaping it
//! - Stream file contents in fixed-size chunks with a guessed media type
//!
//! # Design Decisions
//! - Confinement is belt and braces: `..` segments are rejected before
//!   touching the filesystem, and the canonicalized result must still sit
//!   under the canonicalized root
//! - Misses, directories and escape attempts all collapse to not-found;
//!   the client learns nothing about what exists outside the root

use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use crate::error::DispatchError;
use crate::http::{Method, Payload, Response};

const CHUNK_SIZE: usize = 8192;

/// A URL prefix bound to a directory on disk.
#[derive(Debug, Clone)]
pub struct StaticRoute {
    prefix: String,
    root: PathBuf,
}

impl StaticRoute {
    pub fn new(prefix: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
            root: root.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The path remainder under this prefix, for GET requests only.
    pub fn matches<'p>(&self, method: Method, path: &'p str) -> Option<&'p str> {
        if method != Method::Get {
            return None;
        }
        path.strip_prefix(self.prefix.as_str())
    }

    /// Open the file named by `remainder` and stream it.
    ///
    /// Anything that is not a regular file inside the root reports
    /// `NotFound` for the original path.
    pub fn respond(
        &self,
        remainder: &str,
        path: &str,
        response: &mut Response,
    ) -> Result<Payload, DispatchError> {
        let target = self
            .resolve(remainder)
            .ok_or_else(|| DispatchError::not_found(path))?;

        if let Some(mime) = mime_guess::from_path(&target).first_raw() {
            response.set_content_type(mime);
        }

        let file = File::open(&target)?;
        Ok(Payload::Stream(Box::new(FileChunks::new(file))))
    }

    fn resolve(&self, remainder: &str) -> Option<PathBuf> {
        let relative = Path::new(remainder);
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return None;
        }

        let root = self.root.canonicalize().ok()?;
        let target = root.join(relative).canonicalize().ok()?;
        if !target.starts_with(&root) || !target.is_file() {
            return None;
        }
        Some(target)
    }
}

/// Fixed-size read chunks over an open file.
pub struct FileChunks {
    file: File,
    done: bool,
}

impl FileChunks {
    pub fn new(file: File) -> Self {
        Self { file, done: false }
    }
}

impl Iterator for FileChunks {
    type Item = std::io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut chunk = vec![0u8; CHUNK_SIZE];
        match self.file.read(&mut chunk) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(n) => {
                chunk.truncate(n);
                Some(Ok(chunk))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
