use std::fmt;

use thiserror::Error;

/// Longest file or directory name the HFS catalog stores, in bytes
pub const MAX_NAME_LEN: usize = 31;

/// Separator used in user-facing paths
pub const SEPARATOR: char = '/';

/// Absolute, normalized location inside a mounted volume's catalog.
/// Holds no empty, `.` or `..` components.
#[derive(Debug, Clone, Default, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct QualifiedPath {
  components: Vec<String>,
}

/// Resolves user paths against the current location within the volume
#[derive(Debug, Clone, Default)]
pub struct PathQualifier {
  cwd: QualifiedPath,
}

/// Path qualification errors
#[derive(Debug, Error, Eq, PartialEq)]
pub enum PathError {
  #[error("empty path")]
  Empty,
  #[error("name {name:?} contains disallowed character {ch:?}")]
  InvalidChar {
    name: String,
    ch: char,
  },
  #[error("name {name:?} is {len} bytes long (limit 31)")]
  NameTooLong {
    name: String,
    len: usize,
  },
}

impl QualifiedPath {
  /// Root directory of the volume
  pub fn root() -> Self {
    Self::default()
  }

  pub fn is_root(&self) -> bool {
    self.components.is_empty()
  }

  /// Catalog names from the root down
  pub fn components(&self) -> impl Iterator<Item = &str> {
    self.components.iter().map(String::as_str)
  }

  /// Last component, or `None` for the root
  pub fn name(&self) -> Option<&str> {
    self.components.last().map(String::as_str)
  }

  /// Enclosing directory, or `None` for the root
  pub fn parent(&self) -> Option<QualifiedPath> {
    if self.is_root() {
      return None;
    }
    Some(Self {
      components: self.components[..self.components.len() - 1].to_vec(),
    })
  }

  /// Path of a child entry named `name`
  pub fn join(&self, name: &str) -> Result<QualifiedPath, PathError> {
    check_name(name)?;
    let mut components = self.components.clone();
    components.push(name.to_string());
    Ok(Self { components })
  }

  /// Whether `self` is `other` or lies below it
  pub fn starts_with(&self, other: &QualifiedPath) -> bool {
    self.components.len() >= other.components.len() &&
      self.components.iter()
        .zip(other.components.iter())
        .all(|(a, b)| same_name(a, b))
  }

  /// HFS colon notation, relative to the volume root (`:Folder:File`)
  pub fn to_hfs(&self) -> String {
    if self.is_root() {
      return ":".to_string();
    }
    self.components.iter()
      .map(|c| format!(":{}", c))
      .collect::<Vec<String>>()
      .concat()
  }
}

impl fmt::Display for QualifiedPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_root() {
      return f.write_str("/");
    }
    for c in &self.components {
      write!(f, "{}{}", SEPARATOR, c)?;
    }
    Ok(())
  }
}

impl PathQualifier {
  /// Build a qualifier whose current location is `cwd`, taken relative to the root
  pub fn with_cwd(cwd: &str) -> Result<Self, PathError> {
    let cwd = Self::default().qualify(cwd)?;
    Ok(Self { cwd })
  }

  /// Current location within the volume
  pub fn cwd(&self) -> &QualifiedPath {
    &self.cwd
  }

  /// Normalize a user path into a qualified path. Relative paths start at the
  /// current location; `..` above the root stays at the root.
  pub fn qualify(&self, raw: &str) -> Result<QualifiedPath, PathError> {
    if raw.is_empty() {
      return Err(PathError::Empty);
    }

    let mut components = if raw.starts_with(SEPARATOR) {
      Vec::new()
    } else {
      self.cwd.components.clone()
    };

    for segment in raw.split(SEPARATOR) {
      match segment {
        "" | "." => continue,
        ".." => {
          components.pop();
        }
        name => {
          check_name(name)?;
          components.push(name.to_string());
        }
      }
    }

    Ok(QualifiedPath { components })
  }
}

/// Check a single catalog name
pub fn check_name(name: &str) -> Result<(), PathError> {
  if name.is_empty() {
    return Err(PathError::Empty);
  }
  if let Some(ch) = name.chars().find(|c| matches!(*c, ':' | '\0' | SEPARATOR)) {
    return Err(PathError::InvalidChar {
      name: name.to_string(),
      ch,
    });
  }
  if name.len() > MAX_NAME_LEN {
    return Err(PathError::NameTooLong {
      name: name.to_string(),
      len: name.len(),
    });
  }
  Ok(())
}

/// Catalog name comparison: case-insensitive, case-preserving
pub fn same_name(a: &str, b: &str) -> bool {
  a.chars().flat_map(char::to_lowercase)
    .eq(b.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
  use rstest::rstest;

  use super::*;

  fn qualifier(cwd: &str) -> PathQualifier {
    PathQualifier::with_cwd(cwd).unwrap()
  }

  #[rstest]
  #[case("/", "/", "/")]
  #[case("/", "System Folder", "/System Folder")]
  #[case("/", "//System Folder///Finder", "/System Folder/Finder")]
  #[case("/Apps", "SimpleText", "/Apps/SimpleText")]
  #[case("/Apps", "./SimpleText/.", "/Apps/SimpleText")]
  #[case("/Apps/Games", "../Tools", "/Apps/Tools")]
  #[case("/Apps", "/Desktop Folder", "/Desktop Folder")]
  #[case("/Apps", "../../..", "/")]
  #[case("/", "..", "/")]
  #[case("/", "a/b/../c", "/a/c")]
  fn test_qualify(#[case] cwd: &str, #[case] raw: &str, #[case] expected: &str) {
    let q = qualifier(cwd).qualify(raw).unwrap();
    assert_eq!(q.to_string(), expected);
  }

  #[rstest]
  #[case("/", "a//b/./c/..")]
  #[case("/Apps", "Games/../Tools/x")]
  #[case("/Apps/Games", "..")]
  #[case("/", "/")]
  fn test_qualify_idempotent(#[case] cwd: &str, #[case] raw: &str) {
    let q = qualifier(cwd);
    let once = q.qualify(raw).unwrap();
    let twice = q.qualify(&once.to_string()).unwrap();
    assert_eq!(once, twice);
  }

  #[test]
  fn test_qualify_empty() {
    assert_eq!(PathQualifier::default().qualify(""), Err(PathError::Empty));
  }

  #[rstest]
  #[case("Disk:Folder", ':')]
  #[case("nul\0byte", '\0')]
  fn test_qualify_invalid_char(#[case] raw: &str, #[case] ch: char) {
    match PathQualifier::default().qualify(raw) {
      Err(PathError::InvalidChar { ch: found, .. }) => assert_eq!(found, ch),
      other => panic!("expected invalid character error, got {:?}", other),
    }
  }

  #[test]
  fn test_qualify_name_too_long() {
    let name = "x".repeat(MAX_NAME_LEN + 1);
    assert!(matches!(PathQualifier::default().qualify(&name), Err(PathError::NameTooLong { len: 32, .. })));
    assert!(PathQualifier::default().qualify(&"x".repeat(MAX_NAME_LEN)).is_ok());
  }

  #[test]
  fn test_hfs_notation() {
    let q = PathQualifier::default().qualify("/System Folder/Finder").unwrap();
    assert_eq!(q.to_hfs(), ":System Folder:Finder");
    assert_eq!(QualifiedPath::root().to_hfs(), ":");
  }

  #[test]
  fn test_parent_and_join() {
    let q = PathQualifier::default().qualify("/a/b").unwrap();
    assert_eq!(q.name(), Some("b"));
    assert_eq!(q.parent().unwrap().to_string(), "/a");
    assert_eq!(q.parent().unwrap().join("b").unwrap(), q);
    assert!(QualifiedPath::root().parent().is_none());
    assert!(q.join("x/y").is_err());
  }

  #[test]
  fn test_starts_with_ignores_case() {
    let q = PathQualifier::default();
    let dir = q.qualify("/Apps").unwrap();
    assert!(q.qualify("/apps/Games").unwrap().starts_with(&dir));
    assert!(!q.qualify("/Applications").unwrap().starts_with(&dir));
    assert!(dir.starts_with(&QualifiedPath::root()));
  }
}
