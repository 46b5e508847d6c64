//! Catalog images: volumes persisted on the host as a JSON catalog snapshot.
//!
//! This backend applies HFS catalog rules (case-insensitive, case-preserving
//! names; two forks per file; type and creator codes) without dealing with
//! the physical HFS layout.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::command::MountMode;
use crate::fork::Fork;
use crate::path::{check_name, QualifiedPath};
use crate::volume::{Entry, EntryKind, OsType, Volume, VolumeInfo, VolumeLibrary};
use crate::HfsError;

mod raw;

use raw::{child_index, insert_child, RawImage, RawNode, FORMAT_VERSION};

/// Longest volume name HFS stores, in bytes
pub const MAX_VOLUME_NAME_LEN: usize = 27;

/// Volume library mounting catalog images
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageLibrary;

/// A mounted (or in-memory) catalog image
#[derive(Debug)]
pub struct CatalogImage {
  /// Host file backing the image, if any
  path: Option<PathBuf>,
  read_only: bool,
  dirty: bool,
  raw: RawImage,
}

impl VolumeLibrary for ImageLibrary {
  fn mount(&self, image: &Path, mode: MountMode) -> Result<Box<dyn Volume>, HfsError> {
    Ok(Box::new(CatalogImage::open(image, mode)?))
  }
}

impl CatalogImage {
  /// New, empty, writable volume held in memory
  pub fn new(name: &str) -> Result<Self, HfsError> {
    check_volume_name(name)?;
    let now = Utc::now();
    Ok(Self {
      path: None,
      read_only: false,
      dirty: false,
      raw: RawImage {
        format: FORMAT_VERSION,
        name: name.to_string(),
        locked: false,
        created: now,
        modified: now,
        root: RawNode::directory(name, now),
      },
    })
  }

  /// Write a new, empty image to `path`
  pub fn create(path: &Path, name: &str) -> Result<Self, HfsError> {
    let mut image = Self::new(name)?;
    image.path = Some(path.to_path_buf());
    image.save()?;
    Ok(image)
  }

  /// Synchronously read / deserialize a CatalogImage. The result is read-only
  /// if the volume is locked.
  pub fn read<R: ?Sized>(reader: &mut R) -> Result<Self, HfsError>
    where R: Read {
    let raw: RawImage = serde_json::from_reader(reader)?;
    if raw.format != FORMAT_VERSION {
      return Err(HfsError::Value(format!("Unsupported catalog image format: {}", raw.format)));
    }
    if !matches!(raw.root, RawNode::Directory { .. }) {
      return Err(HfsError::Value("Catalog root is not a directory".to_string()));
    }

    Ok(Self {
      path: None,
      read_only: raw.locked,
      dirty: false,
      raw,
    })
  }

  /// Synchronously serialize the image
  pub fn write<W: ?Sized>(&self, writer: &mut W) -> Result<(), HfsError>
    where W: Write {
    serde_json::to_writer(&mut *writer, &self.raw)?;
    writer.flush()?;
    Ok(())
  }

  /// Open an image file. A read-write request against a host file that
  /// cannot be opened for writing, or against a locked volume, yields a
  /// read-only volume.
  pub fn open(path: &Path, mode: MountMode) -> Result<Self, HfsError> {
    let host_writable = match mode {
      MountMode::ReadOnly => false,
      MountMode::ReadWrite => match OpenOptions::new().write(true).open(path) {
        Ok(_) => true,
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
          warn!(?path, "image is write-protected on the host, mounting read-only");
          false
        }
        Err(e) => return Err(e.into()),
      },
      MountMode::None => return Err(HfsError::Value("Refusing to mount with mount mode none".to_string())),
    };

    let file = File::open(path)?;
    let mut image = Self::read(&mut BufReader::new(file))?;
    if image.raw.locked && mode == MountMode::ReadWrite {
      warn!(name = %image.raw.name, "volume is locked, mounting read-only");
    }
    image.read_only = image.read_only || !host_writable;
    image.path = Some(path.to_path_buf());
    debug!(?path, %mode, read_only = image.read_only, "mounted catalog image");
    Ok(image)
  }

  /// Write the image back to its host file.
  ///
  /// The new catalog is staged next to the image and renamed over it, so a
  /// failed write leaves the previous image intact.
  pub fn save(&mut self) -> Result<(), HfsError> {
    if let Some(path) = &self.path {
      let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
      };
      let mut staged = NamedTempFile::new_in(dir)?;
      self.write(&mut BufWriter::new(staged.as_file_mut()))?;
      if let Ok(meta) = fs::metadata(path) {
        staged.as_file().set_permissions(meta.permissions())?;
      }
      staged.persist(path).map_err(|e| e.error)?;
      debug!(?path, "saved catalog image");
    }
    self.dirty = false;
    Ok(())
  }

  /// Set the volume software lock; takes effect at the next mount
  pub fn set_locked(&mut self, locked: bool) {
    self.raw.locked = locked;
    self.dirty = true;
  }

  fn check_writable(&self) -> Result<(), HfsError> {
    if self.read_only {
      Err(HfsError::ReadOnly)
    } else {
      Ok(())
    }
  }

  /// Mark the volume changed at `now`
  fn touch(&mut self, now: DateTime<Utc>) {
    self.raw.modified = now;
    self.dirty = true;
  }

  fn node(&self, path: &QualifiedPath) -> Result<&RawNode, HfsError> {
    let mut node = &self.raw.root;
    for name in path.components() {
      node = match node {
        RawNode::Directory { children, .. } => match child_index(children, name) {
          Some(i) => &children[i],
          None => return Err(HfsError::NotFound(path.to_string())),
        },
        RawNode::File { .. } => return Err(HfsError::NotADirectory(path.to_string())),
      };
    }
    Ok(node)
  }

  fn node_mut(&mut self, path: &QualifiedPath) -> Result<&mut RawNode, HfsError> {
    let mut node = &mut self.raw.root;
    for name in path.components() {
      node = match node {
        RawNode::Directory { children, .. } => match child_index(children, name) {
          Some(i) => &mut children[i],
          None => return Err(HfsError::NotFound(path.to_string())),
        },
        RawNode::File { .. } => return Err(HfsError::NotADirectory(path.to_string())),
      };
    }
    Ok(node)
  }

  /// Children and modification date of a directory
  fn dir_mut(&mut self, path: &QualifiedPath) -> Result<(&mut Vec<RawNode>, &mut DateTime<Utc>), HfsError> {
    match self.node_mut(path)? {
      RawNode::Directory { children, modified, .. } => Ok((children, modified)),
      RawNode::File { .. } => Err(HfsError::NotADirectory(path.to_string())),
    }
  }

  /// Split a non-root path into parent and name
  fn split(path: &QualifiedPath) -> Option<(QualifiedPath, &str)> {
    Some((path.parent()?, path.name()?))
  }

  /// Add a new record at `path`
  fn insert(&mut self, path: &QualifiedPath, node: RawNode) -> Result<(), HfsError> {
    self.check_writable()?;
    let (parent, name) = match Self::split(path) {
      Some(split) => split,
      None => return Err(HfsError::Exists(path.to_string())),
    };

    let now = Utc::now();
    let (children, modified) = self.dir_mut(&parent)?;
    if child_index(children, name).is_some() {
      return Err(HfsError::Exists(path.to_string()));
    }
    insert_child(children, node);
    *modified = now;
    self.touch(now);
    Ok(())
  }

  /// Remove the record at `path`, which must be a file or an empty directory
  fn remove(&mut self, path: &QualifiedPath, want_dir: bool) -> Result<(), HfsError> {
    self.check_writable()?;
    let (parent, name) = match Self::split(path) {
      Some(split) => split,
      None if want_dir => return Err(HfsError::Value("Cannot remove the root directory".to_string())),
      None => return Err(HfsError::IsADirectory(path.to_string())),
    };

    let now = Utc::now();
    let (children, modified) = self.dir_mut(&parent)?;
    let index = match child_index(children, name) {
      Some(i) => i,
      None => return Err(HfsError::NotFound(path.to_string())),
    };
    match (&children[index], want_dir) {
      (RawNode::File { .. }, true) => return Err(HfsError::NotADirectory(path.to_string())),
      (RawNode::Directory { .. }, false) => return Err(HfsError::IsADirectory(path.to_string())),
      (RawNode::Directory { children: c, .. }, true) if !c.is_empty() => return Err(HfsError::DirectoryNotEmpty(path.to_string())),
      _ => {}
    }
    children.remove(index);
    *modified = now;
    self.touch(now);
    Ok(())
  }
}

impl Volume for CatalogImage {
  fn info(&self) -> VolumeInfo {
    let mut info = VolumeInfo {
      name: self.raw.name.clone(),
      created: self.raw.created,
      modified: self.raw.modified,
      file_count: 0,
      directory_count: 0,
      data_bytes: 0,
      rsrc_bytes: 0,
      locked: self.raw.locked,
      read_only: self.read_only,
    };

    // The root directory is not counted
    let mut pending = vec![&self.raw.root];
    while let Some(node) = pending.pop() {
      if let RawNode::Directory { children, .. } = node {
        for child in children {
          match child {
            RawNode::Directory { .. } => {
              info.directory_count += 1;
              pending.push(child);
            }
            RawNode::File { data, rsrc, .. } => {
              info.file_count += 1;
              info.data_bytes += data.len() as u64;
              info.rsrc_bytes += rsrc.len() as u64;
            }
          }
        }
      }
    }
    info
  }

  fn is_read_only(&self) -> bool {
    self.read_only
  }

  fn stat(&self, path: &QualifiedPath) -> Result<Entry, HfsError> {
    let node = self.node(path)?;
    let name = match path.name() {
      Some(_) => node.name().to_string(),
      None => self.raw.name.clone(),
    };
    Ok(entry(name, path.clone(), node))
  }

  fn read_dir(&self, path: &QualifiedPath) -> Result<Vec<Entry>, HfsError> {
    match self.node(path)? {
      RawNode::Directory { children, .. } => children.iter()
        .map(|c| -> Result<Entry, HfsError> {
          Ok(entry(c.name().to_string(), path.join(c.name())?, c))
        })
        .collect(),
      RawNode::File { .. } => Err(HfsError::NotADirectory(path.to_string())),
    }
  }

  fn read_fork(&self, path: &QualifiedPath, fork: Fork) -> Result<Vec<u8>, HfsError> {
    match (self.node(path)?, fork) {
      (RawNode::File { data, .. }, Fork::Data) => Ok(data.clone()),
      (RawNode::File { rsrc, .. }, Fork::Resource) => Ok(rsrc.clone()),
      (RawNode::Directory { .. }, _) => Err(HfsError::IsADirectory(path.to_string())),
    }
  }

  fn create_file(&mut self, path: &QualifiedPath, file_type: OsType, creator: OsType) -> Result<(), HfsError> {
    let name = path.name().unwrap_or_default();
    let node = RawNode::file(name, file_type, creator, Utc::now());
    self.insert(path, node)
  }

  fn write_fork(&mut self, path: &QualifiedPath, fork: Fork, bytes: &[u8]) -> Result<(), HfsError> {
    self.check_writable()?;
    let now = Utc::now();
    match self.node_mut(path)? {
      RawNode::File { data, rsrc, modified, .. } => {
        let target = match fork {
          Fork::Data => data,
          Fork::Resource => rsrc,
        };
        *target = bytes.to_vec();
        *modified = now;
      }
      RawNode::Directory { .. } => return Err(HfsError::IsADirectory(path.to_string())),
    }
    debug!(%path, fork = fork.id(), len = bytes.len(), "wrote fork");
    self.touch(now);
    Ok(())
  }

  fn set_file_info(&mut self, path: &QualifiedPath, new_type: Option<OsType>, new_creator: Option<OsType>) -> Result<(), HfsError> {
    self.check_writable()?;
    let now = Utc::now();
    match self.node_mut(path)? {
      RawNode::File { file_type, creator, modified, .. } => {
        if let Some(t) = new_type {
          *file_type = t;
        }
        if let Some(c) = new_creator {
          *creator = c;
        }
        *modified = now;
      }
      RawNode::Directory { .. } => return Err(HfsError::IsADirectory(path.to_string())),
    }
    self.touch(now);
    Ok(())
  }

  fn mkdir(&mut self, path: &QualifiedPath) -> Result<(), HfsError> {
    let name = path.name().unwrap_or_default();
    let node = RawNode::directory(name, Utc::now());
    self.insert(path, node)
  }

  fn remove_file(&mut self, path: &QualifiedPath) -> Result<(), HfsError> {
    self.remove(path, false)
  }

  fn remove_dir(&mut self, path: &QualifiedPath) -> Result<(), HfsError> {
    self.remove(path, true)
  }

  fn rename(&mut self, from: &QualifiedPath, to: &QualifiedPath) -> Result<(), HfsError> {
    self.check_writable()?;
    let (from_parent, from_name) = match Self::split(from) {
      Some(split) => split,
      None => return Err(HfsError::Value("Cannot rename the root directory".to_string())),
    };
    let (to_parent, to_name) = match Self::split(to) {
      Some(split) => split,
      None => return Err(HfsError::Exists(to.to_string())),
    };

    let is_dir = matches!(self.node(from)?, RawNode::Directory { .. });
    let same_entry = to.starts_with(from) && from.starts_with(to);
    if is_dir && to.starts_with(from) && !same_entry {
      return Err(HfsError::Value(format!("Cannot move {} into itself", from)));
    }

    let now = Utc::now();
    if same_entry {
      // Only the case of the name changes
      let node = self.node_mut(from)?;
      node.set_name(to_name);
      node.touch(now);
      self.touch(now);
      return Ok(());
    }

    match self.node(&to_parent)? {
      RawNode::Directory { children, .. } => if child_index(children, to_name).is_some() {
        return Err(HfsError::Exists(to.to_string()));
      },
      RawNode::File { .. } => return Err(HfsError::NotADirectory(to_parent.to_string())),
    }

    // Detach from the old parent, attach to the new one
    let (children, modified) = self.dir_mut(&from_parent)?;
    let index = match child_index(children, from_name) {
      Some(i) => i,
      None => return Err(HfsError::NotFound(from.to_string())),
    };
    let mut node = children.remove(index);
    *modified = now;
    node.set_name(to_name);

    let (children, modified) = self.dir_mut(&to_parent)?;
    insert_child(children, node);
    *modified = now;
    self.touch(now);
    debug!(%from, %to, "renamed");
    Ok(())
  }

  fn unmount(mut self: Box<Self>) -> Result<(), HfsError> {
    if self.dirty && !self.read_only {
      self.save()?;
    }
    debug!(name = %self.raw.name, "unmounted catalog image");
    Ok(())
  }
}

/// Build a catalog entry from a record
fn entry(name: String, path: QualifiedPath, node: &RawNode) -> Entry {
  match node {
    RawNode::Directory { created, modified, children, .. } => Entry {
      name,
      path,
      kind: EntryKind::Directory {
        valence: children.len(),
      },
      created: *created,
      modified: *modified,
    },
    RawNode::File { file_type, creator, created, modified, data, rsrc, .. } => Entry {
      name,
      path,
      kind: EntryKind::File {
        file_type: *file_type,
        creator: *creator,
        data_len: data.len() as u64,
        rsrc_len: rsrc.len() as u64,
      },
      created: *created,
      modified: *modified,
    },
  }
}

/// Check a volume name
fn check_volume_name(name: &str) -> Result<(), HfsError> {
  check_name(name)?;
  if name.len() > MAX_VOLUME_NAME_LEN {
    return Err(HfsError::Value(format!("Volume name {:?} is longer than {} bytes", name, MAX_VOLUME_NAME_LEN)));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::path::PathQualifier;

  fn p(raw: &str) -> QualifiedPath {
    PathQualifier::default().qualify(raw).unwrap()
  }

  fn sample() -> CatalogImage {
    let mut image = CatalogImage::new("Macintosh HD").unwrap();
    image.mkdir(&p("/System Folder")).unwrap();
    image.create_file(&p("/System Folder/Finder"), OsType(*b"FNDR"), OsType(*b"MACS")).unwrap();
    image.write_fork(&p("/System Folder/Finder"), Fork::Data, b"finder code").unwrap();
    image.write_fork(&p("/System Folder/Finder"), Fork::Resource, b"CODE resources").unwrap();
    image.create_file(&p("/Read Me"), OsType(*b"TEXT"), OsType(*b"ttxt")).unwrap();
    image
  }

  #[test]
  fn test_lookup_is_case_insensitive() {
    let image = sample();
    let entry = image.stat(&p("/system folder/FINDER")).unwrap();
    assert_eq!(entry.name, "Finder");
    assert_eq!(entry.fork_len(Fork::Data), 11);
    assert_eq!(entry.fork_len(Fork::Resource), 14);
    assert_eq!(image.read_fork(&p("/SYSTEM FOLDER/finder"), Fork::Resource).unwrap(), b"CODE resources".to_vec());
  }

  #[test]
  fn test_root_entry_carries_volume_name() {
    let image = sample();
    let root = image.stat(&QualifiedPath::root()).unwrap();
    assert_eq!(root.name, "Macintosh HD");
    assert_eq!(root.kind, EntryKind::Directory { valence: 2 });
  }

  #[test]
  fn test_read_dir_in_catalog_order() {
    let mut image = sample();
    image.mkdir(&p("/apps")).unwrap();
    let names = image.read_dir(&QualifiedPath::root()).unwrap()
      .into_iter()
      .map(|e| e.name)
      .collect::<Vec<String>>();
    assert_eq!(names, vec!["apps", "Read Me", "System Folder"]);
    assert!(matches!(image.read_dir(&p("/Read Me")), Err(HfsError::NotADirectory(_))));
  }

  #[test]
  fn test_create_rejects_duplicates_ignoring_case() {
    let mut image = sample();
    assert!(matches!(image.create_file(&p("/READ ME"), OsType::UNKNOWN, OsType::UNKNOWN), Err(HfsError::Exists(_))));
    assert!(matches!(image.mkdir(&p("/Missing/Dir")), Err(HfsError::NotFound(_))));
    assert!(matches!(image.mkdir(&p("/Read Me/Dir")), Err(HfsError::NotADirectory(_))));
  }

  #[test]
  fn test_remove() {
    let mut image = sample();
    assert!(matches!(image.remove_dir(&p("/System Folder")), Err(HfsError::DirectoryNotEmpty(_))));
    assert!(matches!(image.remove_file(&p("/System Folder")), Err(HfsError::IsADirectory(_))));
    assert!(matches!(image.remove_dir(&p("/Read Me")), Err(HfsError::NotADirectory(_))));
    image.remove_file(&p("/System Folder/Finder")).unwrap();
    image.remove_dir(&p("/system folder")).unwrap();
    assert!(matches!(image.stat(&p("/System Folder")), Err(HfsError::NotFound(_))));
    assert!(image.remove_dir(&QualifiedPath::root()).is_err());
  }

  #[test]
  fn test_rename_and_move() {
    let mut image = sample();
    image.rename(&p("/Read Me"), &p("/System Folder/About")).unwrap();
    assert_eq!(image.stat(&p("/System Folder/About")).unwrap().name, "About");
    assert!(image.stat(&p("/Read Me")).is_err());

    // Case-only rename of the same entry
    image.rename(&p("/System Folder"), &p("/SYSTEM FOLDER")).unwrap();
    assert_eq!(image.stat(&p("/system folder")).unwrap().name, "SYSTEM FOLDER");

    assert!(matches!(image.rename(&p("/System Folder"), &p("/System Folder/Inner")), Err(HfsError::Value(_))));
    image.create_file(&p("/Other"), OsType::UNKNOWN, OsType::UNKNOWN).unwrap();
    assert!(matches!(image.rename(&p("/Other"), &p("/System Folder/about")), Err(HfsError::Exists(_))));
  }

  #[test]
  fn test_set_file_info() {
    let mut image = sample();
    image.set_file_info(&p("/Read Me"), None, Some(OsType(*b"R*ch"))).unwrap();
    match image.stat(&p("/Read Me")).unwrap().kind {
      EntryKind::File { file_type, creator, .. } => {
        assert_eq!(file_type, OsType(*b"TEXT"));
        assert_eq!(creator, OsType(*b"R*ch"));
      }
      other => panic!("expected a file, got {:?}", other),
    }
  }

  #[test]
  fn test_info_counts() {
    let info = sample().info();
    assert_eq!(info.name, "Macintosh HD");
    assert_eq!(info.file_count, 2);
    assert_eq!(info.directory_count, 1);
    assert_eq!(info.data_bytes, 11);
    assert_eq!(info.rsrc_bytes, 14);
    assert!(!info.read_only);
  }

  #[test]
  fn test_volume_name_limits() {
    assert!(CatalogImage::new("").is_err());
    assert!(CatalogImage::new("Disk:1").is_err());
    assert!(CatalogImage::new(&"v".repeat(MAX_VOLUME_NAME_LEN + 1)).is_err());
  }

  #[test]
  fn test_locked_volume_reads_back_read_only() {
    let mut image = sample();
    image.set_locked(true);
    let mut buf = Vec::new();
    image.write(&mut buf).unwrap();

    let mut locked = CatalogImage::read(&mut buf.as_slice()).unwrap();
    assert!(locked.is_read_only());
    assert!(locked.info().locked);
    assert!(matches!(locked.mkdir(&p("/New")), Err(HfsError::ReadOnly)));
    assert!(matches!(locked.write_fork(&p("/Read Me"), Fork::Data, b"x"), Err(HfsError::ReadOnly)));
  }

  #[test]
  fn test_mount_save_and_remount() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("disk.json");
    CatalogImage::create(&path, "Work").unwrap();

    let library = ImageLibrary;
    let mut vol = library.mount(&path, MountMode::ReadWrite).unwrap();
    assert!(!vol.is_read_only());
    vol.mkdir(&p("/Projects")).unwrap();
    vol.unmount().unwrap();

    let vol = library.mount(&path, MountMode::ReadOnly).unwrap();
    assert!(vol.is_read_only());
    assert!(vol.stat(&p("/projects")).unwrap().is_dir());
  }

  #[test]
  fn test_read_only_mount_never_saves() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("disk.json");
    CatalogImage::create(&path, "Work").unwrap();
    let before = std::fs::read(&path).unwrap();

    let mut vol = ImageLibrary.mount(&path, MountMode::ReadOnly).unwrap();
    assert!(matches!(vol.mkdir(&p("/x")), Err(HfsError::ReadOnly)));
    vol.unmount().unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), before);
  }

  #[test]
  fn test_mount_missing_or_corrupt() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(ImageLibrary.mount(&dir.path().join("none.json"), MountMode::ReadOnly), Err(HfsError::Io(_))));

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, b"{ not json").unwrap();
    assert!(matches!(ImageLibrary.mount(&bad, MountMode::ReadOnly), Err(HfsError::Image(_))));
    assert!(ImageLibrary.mount(&bad, MountMode::None).is_err());
  }

  #[test]
  fn test_locked_image_mounts_read_only_for_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("disk.json");
    let mut image = CatalogImage::create(&path, "Locked").unwrap();
    image.set_locked(true);
    image.save().unwrap();

    let mut vol = ImageLibrary.mount(&path, MountMode::ReadWrite).unwrap();
    assert!(vol.is_read_only());
    assert!(vol.info().locked);
    assert!(matches!(vol.mkdir(&p("/x")), Err(HfsError::ReadOnly)));
  }

  #[cfg(unix)]
  #[test]
  fn test_write_protected_image_mounts_read_only_for_writes() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("disk.json");
    CatalogImage::create(&path, "Work").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o444)).unwrap();
    // Root ignores file modes
    if OpenOptions::new().write(true).open(&path).is_ok() {
      return;
    }

    let vol = ImageLibrary.mount(&path, MountMode::ReadWrite).unwrap();
    assert!(vol.is_read_only());
    assert!(!vol.info().locked);
  }

  #[test]
  fn test_save_replaces_image_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("disk.json");
    let backup = dir.path().join("backup.json");
    CatalogImage::create(&path, "Work").unwrap();
    fs::hard_link(&path, &backup).unwrap();

    let mut vol = ImageLibrary.mount(&path, MountMode::ReadWrite).unwrap();
    vol.mkdir(&p("/Projects")).unwrap();
    vol.unmount().unwrap();

    // The old file was renamed over, never rewritten in place
    let old = CatalogImage::open(&backup, MountMode::ReadOnly).unwrap();
    assert!(matches!(old.stat(&p("/Projects")), Err(HfsError::NotFound(_))));
    let new = CatalogImage::open(&path, MountMode::ReadOnly).unwrap();
    assert!(new.stat(&p("/Projects")).unwrap().is_dir());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
  }
}
