use clap::Arg;

use hfsdisklib::{Command, Failure, MountMode, Session, Volume};

/// Delete empty directories
pub(crate) struct Rmdir;

impl Command for Rmdir {
  fn name(&self) -> &'static str {
    "rmdir"
  }

  fn usage(&self) -> &'static str {
    "rmdir <path>..."
  }

  fn mount_mode(&self) -> MountMode {
    MountMode::ReadWrite
  }

  fn execute_on_volume(&self, volume: Option<&mut dyn Volume>, session: &mut Session<'_>, args: &[String]) -> Result<(), Failure> {
    let app = super::app(self)
      .arg(Arg::with_name("paths")
        .required(true)
        .multiple(true));
    let matches = match super::parse(self, app, session, args)? {
      Some(matches) => matches,
      None => return Ok(()),
    };
    let volume = session.require_volume(self, volume)?;

    for path in super::qualify_all(self, session, &matches, "paths")? {
      volume.remove_dir(&path)
        .map_err(|e| session.volume_error(self.name(), &e))?;
    }
    Ok(())
  }
}
