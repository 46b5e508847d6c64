//! Fork selection and host-side resource fork ("shadow") paths.
//!
//! Host filesystems without native dual-fork support keep resource fork bytes
//! in a separate host file. The shadow path of a data-fork host path `P` is
//! always `P` with a fixed suffix appended, so the mapping is a pure string
//! transform with an exact inverse. A data path that already carries the
//! suffix is refused outright, which keeps two different files from ever
//! sharing one shadow.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Fork identifier of the data fork
pub const DATA_FORK: u8 = 0;
/// Fork identifier of the resource fork
pub const RESOURCE_FORK: u8 = 1;

/// One of the two byte streams of an HFS file
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum Fork {
  /// Primary content stream
  Data = DATA_FORK,
  /// Resource stream
  Resource = RESOURCE_FORK,
}

/// Which forks a copy operation touches
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ForkChoice {
  /// Only the named fork
  Only(Fork),
  /// Data fork, plus the resource fork where one exists
  Both,
}

/// Convention used to place resource fork bytes on the host
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShadowScheme {
  /// Sidecar file next to the data file: `name` -> `name.rsrc`
  Sidecar,
  /// macOS named fork accessor: `name` -> `name/..namedfork/rsrc`
  NamedFork,
}

/// Fork resolution errors
#[derive(Debug, Error)]
pub enum ForkError {
  #[error("path has no file name: {0:?}")]
  NoFileName(PathBuf),
  #[error("path is not valid UTF-8: {0:?}")]
  NotUnicode(PathBuf),
  #[error("path already names a resource fork: {0:?}")]
  ShadowForm(PathBuf),
  #[error("not a resource fork path: {0:?}")]
  NotShadow(PathBuf),
  #[error("host rejected resource fork path {path:?}: {source}")]
  Host {
    path: PathBuf,
    source: io::Error,
  },
}

impl Fork {
  /// Select a fork from an explicit resource fork flag
  pub fn from_flag(rsrc: bool) -> Self {
    if rsrc {
      Fork::Resource
    } else {
      Fork::Data
    }
  }

  /// Numeric fork identifier
  pub fn id(self) -> u8 {
    self as u8
  }

  /// Human-readable fork name
  pub fn name(self) -> &'static str {
    match self {
      Fork::Data => "data",
      Fork::Resource => "resource",
    }
  }
}

impl fmt::Display for Fork {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl ForkChoice {
  /// Build a choice from `--data` / `--rsrc` style flags. Neither (or both)
  /// selects both forks.
  pub fn from_flags(data: bool, rsrc: bool) -> Self {
    match (data, rsrc) {
      (true, false) => ForkChoice::Only(Fork::Data),
      (false, true) => ForkChoice::Only(Fork::Resource),
      _ => ForkChoice::Both,
    }
  }

  /// Whether the given fork takes part
  pub fn includes(self, fork: Fork) -> bool {
    match self {
      ForkChoice::Only(f) => f == fork,
      ForkChoice::Both => true,
    }
  }

  /// Forks taking part, data first
  pub fn forks(self) -> Vec<Fork> {
    match self {
      ForkChoice::Only(f) => vec![f],
      ForkChoice::Both => vec![Fork::Data, Fork::Resource],
    }
  }
}

impl Default for ShadowScheme {
  #[cfg(target_os = "macos")]
  fn default() -> Self {
    ShadowScheme::NamedFork
  }

  #[cfg(not(target_os = "macos"))]
  fn default() -> Self {
    ShadowScheme::Sidecar
  }
}

impl ShadowScheme {
  /// Suffix appended to a data path to form its shadow path
  pub fn suffix(self) -> &'static str {
    match self {
      ShadowScheme::Sidecar => ".rsrc",
      ShadowScheme::NamedFork => "/..namedfork/rsrc",
    }
  }

  /// Whether a host path has the shadow form for this scheme
  pub fn is_shadow(self, path: &Path) -> bool {
    match path.to_str() {
      Some(s) => s.ends_with(self.suffix()),
      None => false,
    }
  }

  /// Compute the host path holding the resource fork of `data`
  pub fn shadow_path(self, data: &Path) -> Result<PathBuf, ForkError> {
    let s = self.check_data_path(data)?;
    Ok(PathBuf::from(format!("{}{}", s, self.suffix())))
  }

  /// Recover the data-fork host path from a shadow path
  pub fn data_path(self, shadow: &Path) -> Result<PathBuf, ForkError> {
    let s = shadow.to_str().ok_or_else(|| ForkError::NotUnicode(shadow.to_path_buf()))?;
    let data = match s.strip_suffix(self.suffix()) {
      Some(data) => Path::new(data),
      None => return Err(ForkError::NotShadow(shadow.to_path_buf())),
    };

    // Only the image of a valid data path is a valid shadow path
    match self.check_data_path(data) {
      Ok(_) => Ok(data.to_path_buf()),
      Err(_) => Err(ForkError::NotShadow(shadow.to_path_buf())),
    }
  }

  /// Write resource fork bytes to the shadow of `data`
  pub fn write_shadow(self, data: &Path, bytes: &[u8]) -> Result<PathBuf, ForkError> {
    let shadow = self.shadow_path(data)?;
    debug!(path = ?shadow, len = bytes.len(), "writing resource fork");
    match fs::write(&shadow, bytes) {
      Ok(()) => Ok(shadow),
      Err(source) => Err(ForkError::Host { path: shadow, source }),
    }
  }

  /// Read resource fork bytes from the shadow of `data`. A missing shadow
  /// file is `None`; any other host failure is an error.
  pub fn read_shadow(self, data: &Path) -> Result<Option<Vec<u8>>, ForkError> {
    let shadow = self.shadow_path(data)?;
    match fs::read(&shadow) {
      Ok(bytes) => Ok(Some(bytes)),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(source) => Err(ForkError::Host { path: shadow, source }),
    }
  }

  /// Validate a data-fork host path, returning it as a string
  fn check_data_path(self, data: &Path) -> Result<&str, ForkError> {
    let s = data.to_str().ok_or_else(|| ForkError::NotUnicode(data.to_path_buf()))?;
    let name = match data.file_name().and_then(|n| n.to_str()) {
      Some(name) => name,
      None => return Err(ForkError::NoFileName(data.to_path_buf())),
    };
    // "dir/" and "dir/." have a file name but do not end in it
    if !s.ends_with(name) {
      return Err(ForkError::NoFileName(data.to_path_buf()));
    }
    if self.is_shadow(data) {
      return Err(ForkError::ShadowForm(data.to_path_buf()));
    }
    Ok(s)
  }
}
