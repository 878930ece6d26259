//! Destinations for generated source files.
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use indexmap::IndexMap;

pub trait Filer {
    type Writer: SourceFile;

    /// Open the source file for the fully-qualified type name `fqn`.
    fn create_source_file(&mut self, fqn: &str) -> io::Result<Self::Writer>;
}

/// A file opened by a [`Filer`]. Written once, then closed.
pub trait SourceFile {
    fn write(&mut self, text: &str) -> io::Result<()>;

    fn close(self) -> io::Result<()>;
}

// ————————————————————————————————————————————————————————————————————————————
// DIRECTORY
// ————————————————————————————————————————————————————————————————————————————

/// Writes `a/b/C.java` below a root directory.
#[derive(Debug, Clone)]
pub struct DirectoryFiler {
    root: PathBuf,
}

impl DirectoryFiler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, fqn: &str) -> PathBuf {
        let mut path = self.root.clone();
        let mut parts: Vec<&str> = fqn.split('.').collect();
        let name = parts.pop().unwrap_or(fqn);
        path.extend(parts);
        path.push(format!("{name}.java"));
        path
    }
}

impl Filer for DirectoryFiler {
    type Writer = DirectoryFile;

    fn create_source_file(&mut self, fqn: &str) -> io::Result<DirectoryFile> {
        let path = self.path_for(fqn);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(DirectoryFile { path, buffer: String::new() })
    }
}

pub struct DirectoryFile {
    path: PathBuf,
    buffer: String,
}

impl SourceFile for DirectoryFile {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.buffer.push_str(text);
        Ok(())
    }

    fn close(self) -> io::Result<()> {
        fs::write(&self.path, self.buffer)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// MEMORY
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Default)]
struct MemoryState {
    files: IndexMap<String, String>,
    opened: usize,
    closed: usize,
}

/// Keeps generated files in memory. Clones share the same store, so a handle
/// kept by the caller sees what the pipeline wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryFiler {
    state: Rc<RefCell<MemoryState>>,
    fail_writes: bool,
}

impl MemoryFiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `write` fails; opening and closing still succeed.
    pub fn failing_writes() -> Self {
        Self { fail_writes: true, ..Self::default() }
    }

    pub fn file(&self, fqn: &str) -> Option<String> {
        self.state.borrow().files.get(fqn).cloned()
    }

    /// Names of the files written, in write order.
    pub fn names(&self) -> Vec<String> {
        self.state.borrow().files.keys().cloned().collect()
    }

    pub fn opened(&self) -> usize {
        self.state.borrow().opened
    }

    pub fn closed(&self) -> usize {
        self.state.borrow().closed
    }
}

impl Filer for MemoryFiler {
    type Writer = MemoryFile;

    fn create_source_file(&mut self, fqn: &str) -> io::Result<MemoryFile> {
        self.state.borrow_mut().opened += 1;
        Ok(MemoryFile {
            state: Rc::clone(&self.state),
            fqn: fqn.to_string(),
            buffer: String::new(),
            fail: self.fail_writes,
        })
    }
}

pub struct MemoryFile {
    state: Rc<RefCell<MemoryState>>,
    fqn: String,
    buffer: String,
    fail: bool,
}

impl SourceFile for MemoryFile {
    fn write(&mut self, text: &str) -> io::Result<()> {
        if self.fail {
            return Err(io::Error::other(format!("refusing to write {}", self.fqn)));
        }
        self.buffer.push_str(text);
        Ok(())
    }

    fn close(self) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        state.closed += 1;
        if !self.fail {
            state.files.insert(self.fqn, self.buffer);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_filer_lays_out_packages() {
        let dir = tempfile::tempdir().unwrap();
        let mut filer = DirectoryFiler::new(dir.path());
        let mut file = filer.create_source_file("a.b.Widget").unwrap();
        file.write("class Widget {}\n").unwrap();
        file.close().unwrap();

        let path = dir.path().join("a").join("b").join("Widget.java");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "class Widget {}\n");
    }

    #[test]
    fn memory_filer_counts_opens_and_closes() {
        let handle = MemoryFiler::failing_writes();
        let mut filer = handle.clone();
        let mut file = filer.create_source_file("a.B").unwrap();
        assert!(file.write("x").is_err());
        file.close().unwrap();
        assert_eq!((handle.opened(), handle.closed()), (1, 1));
        assert_eq!(handle.file("a.B"), None);
    }
}
