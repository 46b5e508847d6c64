use thiserror::Error;

pub mod command;
pub mod fork;
pub mod image;
pub mod path;
pub mod report;
pub mod volume;

pub use command::{Command, CommandTable, Failure, MountMode, Session};
pub use fork::{Fork, ForkChoice, ForkError, ShadowScheme, DATA_FORK, RESOURCE_FORK};
pub use image::{CatalogImage, ImageLibrary};
pub use path::{PathError, PathQualifier, QualifiedPath};
pub use report::ErrorReporter;
pub use volume::{Entry, EntryKind, OsType, Volume, VolumeInfo, VolumeLibrary};

/// Errors raised by the volume-access layer
#[derive(Debug, Error)]
pub enum HfsError {
  #[error("no such file or directory: {0}")]
  NotFound(String),
  #[error("file already exists: {0}")]
  Exists(String),
  #[error("not a directory: {0}")]
  NotADirectory(String),
  #[error("is a directory: {0}")]
  IsADirectory(String),
  #[error("directory not empty: {0}")]
  DirectoryNotEmpty(String),
  #[error("volume is locked (mounted read-only)")]
  ReadOnly,
  #[error("invalid type/creator code: {0:?}")]
  BadOsType(String),
  #[error("bad catalog name: {0}")]
  BadName(#[from] PathError),
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
  #[error("corrupt catalog image: {0}")]
  Image(#[from] serde_json::Error),
  #[error("{0}")]
  Value(String),
}
