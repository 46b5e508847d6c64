//! Seam to the volume-access layer: the library that opens volumes, and the
//! volume handle every command works through.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::command::MountMode;
use crate::fork::Fork;
use crate::path::QualifiedPath;
use crate::HfsError;

/// Opens volumes
pub trait VolumeLibrary {
  /// Mount the volume stored at `image`. A `ReadWrite` request may still
  /// produce a read-only handle when the host or the volume forbids writing;
  /// callers check `Volume::is_read_only`.
  fn mount(&self, image: &Path, mode: MountMode) -> Result<Box<dyn Volume>, HfsError>;
}

/// A mounted volume
pub trait Volume {
  /// Volume-level summary
  fn info(&self) -> VolumeInfo;

  /// Whether mutating operations will be refused
  fn is_read_only(&self) -> bool;

  /// Look up one catalog entry
  fn stat(&self, path: &QualifiedPath) -> Result<Entry, HfsError>;

  /// List a directory in catalog order
  fn read_dir(&self, path: &QualifiedPath) -> Result<Vec<Entry>, HfsError>;

  /// Read a whole fork of a file
  fn read_fork(&self, path: &QualifiedPath, fork: Fork) -> Result<Vec<u8>, HfsError>;

  /// Create an empty file
  fn create_file(&mut self, path: &QualifiedPath, file_type: OsType, creator: OsType) -> Result<(), HfsError>;

  /// Replace the contents of one fork of an existing file
  fn write_fork(&mut self, path: &QualifiedPath, fork: Fork, data: &[u8]) -> Result<(), HfsError>;

  /// Change type and/or creator of a file
  fn set_file_info(&mut self, path: &QualifiedPath, file_type: Option<OsType>, creator: Option<OsType>) -> Result<(), HfsError>;

  fn mkdir(&mut self, path: &QualifiedPath) -> Result<(), HfsError>;

  fn remove_file(&mut self, path: &QualifiedPath) -> Result<(), HfsError>;

  /// Remove an empty directory
  fn remove_dir(&mut self, path: &QualifiedPath) -> Result<(), HfsError>;

  /// Rename or move an entry; `to` must not exist
  fn rename(&mut self, from: &QualifiedPath, to: &QualifiedPath) -> Result<(), HfsError>;

  /// Flush pending changes and release the volume
  fn unmount(self: Box<Self>) -> Result<(), HfsError>;
}

/// Four-character type or creator code
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OsType(pub [u8; 4]);

/// Catalog entry
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Entry {
  /// Catalog name, case preserved
  pub name: String,
  /// Location of the entry
  pub path: QualifiedPath,
  pub kind: EntryKind,
  pub created: DateTime<Utc>,
  pub modified: DateTime<Utc>,
}

/// File or directory specific catalog data
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum EntryKind {
  File {
    file_type: OsType,
    creator: OsType,
    /// Logical length of the data fork
    data_len: u64,
    /// Logical length of the resource fork
    rsrc_len: u64,
  },
  Directory {
    /// Number of direct children
    valence: usize,
  },
}

/// Volume-level summary
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct VolumeInfo {
  pub name: String,
  pub created: DateTime<Utc>,
  pub modified: DateTime<Utc>,
  pub file_count: usize,
  pub directory_count: usize,
  pub data_bytes: u64,
  pub rsrc_bytes: u64,
  /// Volume software lock
  pub locked: bool,
  pub read_only: bool,
}

impl OsType {
  /// Code used for files with no declared type or creator
  pub const UNKNOWN: OsType = OsType(*b"????");
}

impl Default for OsType {
  fn default() -> Self {
    OsType::UNKNOWN
  }
}

impl FromStr for OsType {
  type Err = HfsError;

  /// Parse a code of exactly four characters, each Latin-1 representable
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let bytes = s.chars()
      .map(|c| u8::try_from(u32::from(c)).ok())
      .collect::<Option<Vec<u8>>>();
    match bytes.as_deref().map(<[u8; 4]>::try_from) {
      Some(Ok(code)) => Ok(OsType(code)),
      _ => Err(HfsError::BadOsType(s.to_string())),
    }
  }
}

impl TryFrom<String> for OsType {
  type Error = HfsError;

  fn try_from(s: String) -> Result<Self, Self::Error> {
    s.parse()
  }
}

impl From<OsType> for String {
  fn from(code: OsType) -> Self {
    code.to_string()
  }
}

impl fmt::Display for OsType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = self.0.iter()
      .map(|b| char::from(*b))
      .collect::<String>();
    f.write_str(&s)
  }
}

impl Entry {
  pub fn is_dir(&self) -> bool {
    matches!(self.kind, EntryKind::Directory { .. })
  }

  /// Logical length of a fork; zero for directories
  pub fn fork_len(&self, fork: Fork) -> u64 {
    match (&self.kind, fork) {
      (EntryKind::File { data_len, .. }, Fork::Data) => *data_len,
      (EntryKind::File { rsrc_len, .. }, Fork::Resource) => *rsrc_len,
      (EntryKind::Directory { .. }, _) => 0,
    }
  }
}

#[cfg(test)]
mod tests {
  use rstest::rstest;

  use super::*;

  #[rstest]
  #[case("TEXT")]
  #[case("ttxt")]
  #[case("APPL")]
  #[case("????")]
  #[case("ab c")]
  fn test_ostype_parse(#[case] s: &str) {
    let code = s.parse::<OsType>().unwrap();
    assert_eq!(code.to_string(), s);
  }

  #[rstest]
  #[case("")]
  #[case("TXT")]
  #[case("TEXTS")]
  #[case("T\u{2022}XT")]
  fn test_ostype_rejects(#[case] s: &str) {
    assert!(matches!(s.parse::<OsType>(), Err(HfsError::BadOsType(_))));
  }

  #[test]
  fn test_ostype_serde() {
    let json = serde_json::to_string(&OsType(*b"APPL")).unwrap();
    assert_eq!(json, "\"APPL\"");
    let code: OsType = serde_json::from_str("\"MACS\"").unwrap();
    assert_eq!(code, OsType(*b"MACS"));
    assert!(serde_json::from_str::<OsType>("\"MAC\"").is_err());
  }
}
