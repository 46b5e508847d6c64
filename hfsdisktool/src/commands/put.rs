use std::fs;
use std::path::PathBuf;

use clap::Arg;

use hfsdisklib::{Command, Failure, Fork, ForkChoice, ForkError, HfsError, MountMode, Session, Volume};

/// Copy a host file onto the volume
pub(crate) struct Put;

impl Command for Put {
  fn name(&self) -> &'static str {
    "put"
  }

  fn usage(&self) -> &'static str {
    "put [-d|-r] [-t TYPE] [-c CREATOR] [-v] <host path> <volume path>"
  }

  fn mount_mode(&self) -> MountMode {
    MountMode::ReadWrite
  }

  fn execute_on_volume(&self, volume: Option<&mut dyn Volume>, session: &mut Session<'_>, args: &[String]) -> Result<(), Failure> {
    let app = super::app(self)
      .args(&super::fork_args())
      .args(&super::os_type_args())
      .arg(Arg::with_name("verbose")
        .short("v")
        .long("verbose")
        .help("List each copied fork"))
      .arg(Arg::with_name("src")
        .required(true))
      .arg(Arg::with_name("dest")
        .required(true));
    let matches = match super::parse(self, app, session, args)? {
      Some(matches) => matches,
      None => return Ok(()),
    };
    let volume = session.require_volume(self, volume)?;
    let choice = super::fork_choice(&matches);
    let verbose = matches.is_present("verbose");
    let file_type = super::os_type(self, session, &matches, "type")?;
    let creator = super::os_type(self, session, &matches, "creator")?;

    let host = PathBuf::from(matches.value_of_os("src").unwrap_or_default());
    let mut dest = session.qualify(self.name(), matches.value_of("dest").unwrap_or_default())?;

    // Copying into a directory keeps the host file name
    let existing = match volume.stat(&dest) {
      Ok(entry) if entry.is_dir() => {
        let name = match host.file_name().and_then(|n| n.to_str()) {
          Some(name) => name,
          None => return Err(session.fork_error(self.name(), &ForkError::NoFileName(host.clone()))),
        };
        dest = dest.join(name)
          .map_err(|e| session.path_error(self.name(), &e))?;
        match volume.stat(&dest) {
          Ok(entry) => Some(entry),
          Err(HfsError::NotFound(_)) => None,
          Err(e) => return Err(session.volume_error(self.name(), &e)),
        }
      }
      Ok(entry) => Some(entry),
      Err(HfsError::NotFound(_)) => None,
      Err(e) => return Err(session.volume_error(self.name(), &e)),
    };
    if let Some(entry) = &existing {
      if entry.is_dir() {
        return Err(session.volume_error(self.name(), &HfsError::IsADirectory(dest.to_string())));
      }
    }

    // Read everything from the host before touching the volume
    let data = if choice.includes(Fork::Data) {
      Some(fs::read(&host).map_err(|e| session.io_error(self.name(), &e))?)
    } else {
      None
    };
    let rsrc = if choice.includes(Fork::Resource) {
      match session.shadow.read_shadow(&host) {
        Ok(Some(bytes)) => Some(bytes),
        // A plain host file has an empty resource fork
        Ok(None) if choice == ForkChoice::Both => Some(Vec::new()),
        Ok(None) => {
          let message = format!("no resource fork for {}", host.display());
          session.reporter.report_message(self.name(), &message);
          return Err(Failure::Io);
        }
        Err(e) => return Err(session.fork_error(self.name(), &e)),
      }
    } else {
      None
    };

    let written = match existing {
      Some(_) => volume.set_file_info(&dest, file_type, creator),
      None => volume.create_file(&dest, file_type.unwrap_or_default(), creator.unwrap_or_default()),
    };
    written.map_err(|e| session.volume_error(self.name(), &e))?;

    for (fork, bytes) in [(Fork::Data, data), (Fork::Resource, rsrc)] {
      let bytes = match bytes {
        Some(bytes) => bytes,
        None => continue,
      };
      volume.write_fork(&dest, fork, &bytes)
        .map_err(|e| session.volume_error(self.name(), &e))?;
      if verbose {
        writeln!(session.out, "{} -> {} ({} fork)", host.display(), dest, fork)
          .map_err(|e| session.io_error(self.name(), &e))?;
      }
    }
    Ok(())
  }
}
