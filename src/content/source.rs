//! Disk access behind the post store

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Where post files come from.
///
/// The store lists one directory, checks whether a file is there, and
/// reads a file by name.
pub trait PostSource: Send + Sync {
    /// Names of the entries in the posts directory
    fn list(&self) -> io::Result<Vec<String>>;

    /// Whether the named file exists
    fn exists(&self, name: &str) -> bool;

    /// Read the named file as UTF-8
    fn read(&self, name: &str) -> io::Result<String>;

    /// Location used in log messages
    fn location(&self, name: &str) -> PathBuf;
}

/// Posts stored as files in a directory
#[derive(Debug, Clone)]
pub struct FsSource {
    dir: PathBuf,
}

impl FsSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl PostSource for FsSource {
    fn list(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn exists(&self, name: &str) -> bool {
        self.dir.join(name).is_file()
    }

    fn read(&self, name: &str) -> io::Result<String> {
        fs::read_to_string(self.dir.join(name))
    }

    fn location(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}
