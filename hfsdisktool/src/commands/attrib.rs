use clap::Arg;

use hfsdisklib::{Command, EntryKind, Failure, HfsError, MountMode, Session, Volume};

/// Show or change file type and creator codes
pub(crate) struct Attrib;

impl Command for Attrib {
  fn name(&self) -> &'static str {
    "attrib"
  }

  fn usage(&self) -> &'static str {
    "attrib [-t TYPE] [-c CREATOR] <path>..."
  }

  fn mount_mode(&self) -> MountMode {
    MountMode::ReadWrite
  }

  fn execute_on_volume(&self, volume: Option<&mut dyn Volume>, session: &mut Session<'_>, args: &[String]) -> Result<(), Failure> {
    let app = super::app(self)
      .args(&super::os_type_args())
      .arg(Arg::with_name("paths")
        .required(true)
        .multiple(true));
    let matches = match super::parse(self, app, session, args)? {
      Some(matches) => matches,
      None => return Ok(()),
    };
    let volume = session.require_volume(self, volume)?;
    let file_type = super::os_type(self, session, &matches, "type")?;
    let creator = super::os_type(self, session, &matches, "creator")?;

    for path in super::qualify_all(self, session, &matches, "paths")? {
      if file_type.is_some() || creator.is_some() {
        volume.set_file_info(&path, file_type, creator)
          .map_err(|e| session.volume_error(self.name(), &e))?;
        continue;
      }

      let entry = volume.stat(&path)
        .map_err(|e| session.volume_error(self.name(), &e))?;
      match entry.kind {
        EntryKind::File { file_type: current_type, creator: current_creator, .. } => {
          writeln!(session.out, "{} {} {}", current_type, current_creator, path)
            .map_err(|e| session.io_error(self.name(), &e))?;
        }
        EntryKind::Directory { .. } => {
          return Err(session.volume_error(self.name(), &HfsError::IsADirectory(path.to_string())));
        }
      }
    }
    Ok(())
  }
}
