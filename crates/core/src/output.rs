//! Output routing: console, a named file, or a generated file in a directory.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use crate::{Error, Result};

/// Extension given to files generated inside a directory target.
pub const OUTPUT_EXTENSION: &str = "txt";

/// Where extracted text goes, decided once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Print to standard output.
    Console,
    /// Write to this exact file.
    File(PathBuf),
    /// Write one `<stem>.txt` per input inside this directory.
    Directory(PathBuf),
}

impl OutputTarget {
    /// Build the target from the `--output` argument.
    ///
    /// The output is directory-shaped when several inputs were given, when the
    /// path already is a directory, or when it ends with a path separator.
    pub fn from_args(output: Option<&Path>, input_count: usize) -> Self {
        match output {
            None => Self::Console,
            Some(path) if input_count > 1 || is_directory_shaped(path) => {
                Self::Directory(path.to_path_buf())
            }
            Some(path) => Self::File(path.to_path_buf()),
        }
    }

    /// Concrete destination for one input file, or `None` for the console.
    ///
    /// A directory target is created here if it does not exist yet.
    pub fn destination_for(&self, input: &Path) -> Result<Option<PathBuf>> {
        match self {
            Self::Console => Ok(None),
            Self::File(path) => Ok(Some(path.clone())),
            Self::Directory(dir) => {
                fs::create_dir_all(dir).map_err(|source| Error::Write {
                    path: dir.clone(),
                    source,
                })?;
                Ok(Some(dir.join(output_file_name(input))))
            }
        }
    }
}

/// What the router did with a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The text was empty; nothing happened.
    Skipped,
    /// The text was printed.
    Printed,
    /// The text was written to this file.
    Written(PathBuf),
}

/// Print or persist `text` extracted from `input`.
///
/// Console text and the confirmation line for written files go to `out`.
/// Empty text is skipped without touching `out` or the filesystem.
pub fn route<W: Write>(out: &mut W, text: &str, target: Option<&Path>, input: &Path) -> Result<WriteOutcome> {
    if text.is_empty() {
        return Ok(WriteOutcome::Skipped);
    }

    let Some(target) = target else {
        writeln!(out, "{}", text)?;
        return Ok(WriteOutcome::Printed);
    };

    let path = if is_directory_shaped(target) {
        create_dir(target)?;
        target.join(output_file_name(input))
    } else {
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                create_dir(parent)?;
            }
        }
        target.to_path_buf()
    };

    log::debug!("Writing {} bytes to {}", text.len(), path.display());
    fs::write(&path, text).map_err(|source| Error::Write {
        path: path.clone(),
        source,
    })?;
    writeln!(out, "Text extracted to: {}", path.display())?;

    Ok(WriteOutcome::Written(path))
}

/// `<input stem>.txt`.
pub fn output_file_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_else(|| "output".into());
    format!("{}.{}", stem, OUTPUT_EXTENSION)
}

/// An existing directory, or a path that does not exist and ends with a separator.
fn is_directory_shaped(path: &Path) -> bool {
    path.is_dir() || (!path.exists() && ends_with_separator(path))
}

fn ends_with_separator(path: &Path) -> bool {
    let s = path.as_os_str().to_string_lossy();
    s.ends_with(MAIN_SEPARATOR) || s.ends_with('/')
}

fn create_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| Error::Write {
        path: dir.to_path_buf(),
        source,
    })
}
