//! Input selection: standard input, a file, or an in-memory buffer.

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;

/// Where the raw request text comes from.
#[derive(Debug, Clone)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
    Memory(Vec<u8>),
}

impl InputSource {
    /// Build from an optional `--input` path.
    pub fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => Self::File(path),
            None => Self::Stdin,
        }
    }

    /// Human-readable name for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Self::Stdin => "<stdin>".to_string(),
            Self::File(path) => path.display().to_string(),
            Self::Memory(_) => "<memory>".to_string(),
        }
    }

    /// Read the complete input. Blocks until EOF.
    pub fn read_all(self) -> io::Result<Vec<u8>> {
        match self {
            Self::Stdin => {
                let mut buf = Vec::new();
                io::stdin().lock().read_to_end(&mut buf)?;
                Ok(buf)
            }
            Self::File(path) => {
                let mut buf = Vec::new();
                File::open(&path)?.read_to_end(&mut buf)?;
                Ok(buf)
            }
            Self::Memory(buf) => Ok(buf),
        }
    }
}
