use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::path::same_name;
use crate::volume::OsType;

/// Current catalog image format revision
pub(crate) const FORMAT_VERSION: u32 = 1;

/// On-host layout of a catalog image
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RawImage {
  /// Image format revision
  pub(crate) format: u32,
  /// Volume name
  pub(crate) name: String,
  /// Volume software lock; a locked volume only ever mounts read-only
  #[serde(default)]
  pub(crate) locked: bool,
  pub(crate) created: DateTime<Utc>,
  pub(crate) modified: DateTime<Utc>,
  /// Root directory
  pub(crate) root: RawNode,
}

/// Catalog record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub(crate) enum RawNode {
  Directory {
    name: String,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
    /// Children in catalog (case-insensitive name) order
    children: Vec<RawNode>,
  },
  File {
    name: String,
    file_type: OsType,
    creator: OsType,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
    #[serde(default)]
    data: Vec<u8>,
    #[serde(default)]
    rsrc: Vec<u8>,
  },
}

impl RawNode {
  /// Empty directory record
  pub(crate) fn directory(name: &str, now: DateTime<Utc>) -> Self {
    RawNode::Directory {
      name: name.to_string(),
      created: now,
      modified: now,
      children: Vec::new(),
    }
  }

  /// Empty file record
  pub(crate) fn file(name: &str, file_type: OsType, creator: OsType, now: DateTime<Utc>) -> Self {
    RawNode::File {
      name: name.to_string(),
      file_type,
      creator,
      created: now,
      modified: now,
      data: Vec::new(),
      rsrc: Vec::new(),
    }
  }

  pub(crate) fn name(&self) -> &str {
    match self {
      RawNode::Directory { name, .. } => name,
      RawNode::File { name, .. } => name,
    }
  }

  pub(crate) fn set_name(&mut self, new_name: &str) {
    match self {
      RawNode::Directory { name, .. } => *name = new_name.to_string(),
      RawNode::File { name, .. } => *name = new_name.to_string(),
    }
  }

  pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
    match self {
      RawNode::Directory { modified, .. } => *modified = now,
      RawNode::File { modified, .. } => *modified = now,
    }
  }
}

/// Index of the child named `name` (case-insensitive)
pub(crate) fn child_index(children: &[RawNode], name: &str) -> Option<usize> {
  children.iter().position(|c| same_name(c.name(), name))
}

/// Insert a child keeping catalog order. The caller has checked the name is free.
pub(crate) fn insert_child(children: &mut Vec<RawNode>, node: RawNode) {
  let key = catalog_key(node.name());
  let at = children.iter()
    .position(|c| catalog_key(c.name()) > key)
    .unwrap_or(children.len());
  children.insert(at, node);
}

/// Sort key for catalog order
fn catalog_key(name: &str) -> String {
  name.to_lowercase()
}
