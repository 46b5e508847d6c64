use std::path::PathBuf;

use tracing::debug;

use hfsdisklib::{CommandTable, Failure, HfsError, MountMode, Session, VolumeLibrary};

/// Resolves commands by name and mounts the volume each one asks for
pub(crate) struct Dispatcher<'a> {
  commands: CommandTable<'a>,
  library: &'a dyn VolumeLibrary,
  /// Volume image, when one was named
  image: Option<PathBuf>,
}

impl<'a> Dispatcher<'a> {
  pub(crate) fn new(commands: CommandTable<'a>, library: &'a dyn VolumeLibrary, image: Option<PathBuf>) -> Self {
    Self {
      commands,
      library,
      image,
    }
  }

  /// Run one command to completion. Every failure has been reported on the
  /// session's reporter by the time this returns.
  pub(crate) fn run(&self, name: &str, args: &[String], session: &mut Session<'_>) -> Result<(), Failure> {
    let command = match self.commands.find(name) {
      Some(command) => command,
      None => {
        session.reporter.report_message(name, "unknown command (see 'help')");
        return Err(Failure::Usage);
      }
    };

    let mode = command.mount_mode();
    debug!(command = name, %mode, "dispatching");
    if !mode.needs_volume() {
      return command.execute_on_volume(None, session, args);
    }

    let image = match &self.image {
      Some(image) => image,
      None => {
        session.reporter.report_message(name, "no volume image given (use -f IMAGE or set HFSDISK_IMAGE)");
        return Err(Failure::Usage);
      }
    };

    let mut volume = match self.library.mount(image, mode) {
      Ok(volume) => volume,
      Err(e) => {
        session.reporter.report(name, &e);
        return Err(Failure::Mount);
      }
    };

    // The library may hand back a read-only volume for a read-write request
    if mode == MountMode::ReadWrite && volume.is_read_only() {
      session.reporter.report(name, &HfsError::ReadOnly);
      if let Err(e) = volume.unmount() {
        session.reporter.report(name, &e);
      }
      return Err(Failure::Mount);
    }

    let result = command.execute_on_volume(Some(volume.as_mut()), session, args);
    match volume.unmount() {
      Ok(()) => result,
      Err(e) => {
        session.reporter.report(name, &e);
        result.and(Err(Failure::Io))
      }
    }
  }
}
