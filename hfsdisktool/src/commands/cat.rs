use clap::Arg;

use hfsdisklib::{Command, Failure, Fork, MountMode, Session, Volume};

/// Write one fork of a file to standard output
pub(crate) struct Cat;

impl Command for Cat {
  fn name(&self) -> &'static str {
    "cat"
  }

  fn usage(&self) -> &'static str {
    "cat [-r] <path>"
  }

  fn mount_mode(&self) -> MountMode {
    MountMode::ReadOnly
  }

  fn execute_on_volume(&self, volume: Option<&mut dyn Volume>, session: &mut Session<'_>, args: &[String]) -> Result<(), Failure> {
    let app = super::app(self)
      .arg(super::rsrc_arg())
      .arg(Arg::with_name("path")
        .required(true));
    let matches = match super::parse(self, app, session, args)? {
      Some(matches) => matches,
      None => return Ok(()),
    };
    let volume = session.require_volume(self, volume)?;

    let fork = Fork::from_flag(matches.is_present("rsrc"));
    let path = session.qualify(self.name(), matches.value_of("path").unwrap_or_default())?;
    let bytes = volume.read_fork(&path, fork)
      .map_err(|e| session.volume_error(self.name(), &e))?;

    session.out.write_all(&bytes)
      .map_err(|e| session.io_error(self.name(), &e))
  }
}
