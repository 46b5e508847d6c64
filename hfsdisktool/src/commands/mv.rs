use clap::Arg;

use hfsdisklib::{Command, Failure, MountMode, Session, Volume};

/// Rename or move an entry
pub(crate) struct Mv;

impl Command for Mv {
  fn name(&self) -> &'static str {
    "mv"
  }

  fn usage(&self) -> &'static str {
    "mv <source> <destination>"
  }

  fn mount_mode(&self) -> MountMode {
    MountMode::ReadWrite
  }

  fn execute_on_volume(&self, volume: Option<&mut dyn Volume>, session: &mut Session<'_>, args: &[String]) -> Result<(), Failure> {
    let app = super::app(self)
      .arg(Arg::with_name("src")
        .required(true))
      .arg(Arg::with_name("dest")
        .required(true));
    let matches = match super::parse(self, app, session, args)? {
      Some(matches) => matches,
      None => return Ok(()),
    };
    let volume = session.require_volume(self, volume)?;

    let src = session.qualify(self.name(), matches.value_of("src").unwrap_or_default())?;
    let mut dest = session.qualify(self.name(), matches.value_of("dest").unwrap_or_default())?;

    // Moving into a directory keeps the name; a case-only rename of a
    // directory names the directory itself
    let same_entry = src.starts_with(&dest) && dest.starts_with(&src);
    if !same_entry {
      if let (Ok(entry), Some(name)) = (volume.stat(&dest), src.name()) {
        if entry.is_dir() {
          dest = dest.join(name)
            .map_err(|e| session.path_error(self.name(), &e))?;
        }
      }
    }

    volume.rename(&src, &dest)
      .map_err(|e| session.volume_error(self.name(), &e))
  }
}
