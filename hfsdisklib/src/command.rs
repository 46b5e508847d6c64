//! The command capability and the per-invocation session commands run in.

use std::fmt;
use std::io::Write;

use thiserror::Error;

use crate::fork::{ForkError, ShadowScheme};
use crate::path::{PathError, PathQualifier, QualifiedPath};
use crate::report::ErrorReporter;
use crate::volume::Volume;
use crate::HfsError;

/// Mode a volume must be mounted in before a command runs
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MountMode {
  ReadOnly,
  ReadWrite,
  /// The command does not touch a volume; nothing gets mounted
  None,
}

/// Terminal outcome of a failed command. The diagnostic has already been
/// reported by the time one of these is returned.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
pub enum Failure {
  /// Wrong argument count or shape, or unknown command
  #[error("usage error")]
  Usage,
  /// Volume could not be mounted in the required mode
  #[error("mount error")]
  Mount,
  /// Path qualification or fork path resolution failed
  #[error("resolution error")]
  Resolution,
  /// Volume or host I/O failed mid-command
  #[error("I/O error")]
  Io,
}

/// A named, self-describing unit of work
pub trait Command: Sync {
  /// Dispatch key; unique and case-sensitive
  fn name(&self) -> &'static str;

  /// One-line synopsis
  fn usage(&self) -> &'static str;

  fn mount_mode(&self) -> MountMode;

  /// Run with `volume` mounted per `mount_mode` (`None` exactly when the mode
  /// is `MountMode::None`). `args` excludes the command name.
  fn execute_on_volume(&self, volume: Option<&mut dyn Volume>, session: &mut Session<'_>, args: &[String]) -> Result<(), Failure>;
}

/// Closed, build-time set of commands
#[derive(Clone, Copy)]
pub struct CommandTable<'a> {
  commands: &'a [&'a dyn Command],
}

/// Process-local state and I/O channels lent to a command
pub struct Session<'a> {
  /// Current location within the volume
  pub paths: PathQualifier,
  /// Host convention for resource fork files
  pub shadow: ShadowScheme,
  /// Standard output
  pub out: &'a mut dyn Write,
  /// Diagnostic channel
  pub reporter: ErrorReporter<'a>,
}

impl MountMode {
  /// Whether a volume has to be mounted at all
  pub fn needs_volume(self) -> bool {
    self != MountMode::None
  }
}

impl fmt::Display for MountMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      MountMode::ReadOnly => "read-only",
      MountMode::ReadWrite => "read-write",
      MountMode::None => "none",
    })
  }
}

impl<'a> CommandTable<'a> {
  pub fn new(commands: &'a [&'a dyn Command]) -> Self {
    Self { commands }
  }

  /// Exact, case-sensitive lookup by name
  pub fn find(&self, name: &str) -> Option<&'a dyn Command> {
    self.commands.iter()
      .copied()
      .find(|c| c.name() == name)
  }

  pub fn iter(&self) -> impl Iterator<Item = &'a dyn Command> + 'a {
    self.commands.iter().copied()
  }

  /// Names that are empty or registered more than once
  pub fn conflicts(&self) -> Vec<&'static str> {
    let mut conflicts = Vec::new();
    for (i, c) in self.commands.iter().enumerate() {
      let name = c.name();
      if name.is_empty() || self.commands[..i].iter().any(|o| o.name() == name) {
        conflicts.push(name);
      }
    }
    conflicts
  }
}

impl<'a> Session<'a> {
  pub fn new(paths: PathQualifier, shadow: ShadowScheme, out: &'a mut dyn Write, reporter: ErrorReporter<'a>) -> Self {
    Self {
      paths,
      shadow,
      out,
      reporter,
    }
  }

  /// Report a usage error for `command`
  pub fn usage(&mut self, command: &dyn Command) -> Failure {
    self.reporter.report_message(command.name(), &format!("usage: {}", command.usage()));
    Failure::Usage
  }

  /// Qualify a user path, reporting failure under `prefix`
  pub fn qualify(&mut self, prefix: &str, raw: &str) -> Result<QualifiedPath, Failure> {
    match self.paths.qualify(raw) {
      Ok(path) => Ok(path),
      Err(e) => Err(self.path_error(prefix, &e)),
    }
  }

  pub fn path_error(&mut self, prefix: &str, err: &PathError) -> Failure {
    self.reporter.report(prefix, err);
    Failure::Resolution
  }

  /// Report a shadow path failure, including the host refusing the path
  pub fn fork_error(&mut self, prefix: &str, err: &ForkError) -> Failure {
    self.reporter.report(prefix, err);
    Failure::Resolution
  }

  /// Report a volume-layer failure
  pub fn volume_error(&mut self, prefix: &str, err: &HfsError) -> Failure {
    self.reporter.report(prefix, err);
    match err {
      HfsError::BadName(_) => Failure::Resolution,
      HfsError::BadOsType(_) => Failure::Usage,
      _ => Failure::Io,
    }
  }

  /// Report a host-side I/O failure
  pub fn io_error(&mut self, prefix: &str, err: &std::io::Error) -> Failure {
    self.reporter.report(prefix, err);
    Failure::Io
  }

  /// Unwrap the volume a mounting command was given
  pub fn require_volume<'v>(&mut self, command: &dyn Command, volume: Option<&'v mut dyn Volume>) -> Result<&'v mut dyn Volume, Failure> {
    match volume {
      Some(volume) => Ok(volume),
      None => {
        self.reporter.report_message(command.name(), "no volume mounted");
        Err(Failure::Mount)
      }
    }
  }
}
