use clap::Arg;
use tracing::debug;

use hfsdisklib::{Command, Failure, HfsError, MountMode, QualifiedPath, Session, Volume};

/// Create directories
pub(crate) struct Mkdir;

impl Command for Mkdir {
  fn name(&self) -> &'static str {
    "mkdir"
  }

  fn usage(&self) -> &'static str {
    "mkdir [-p] <path>..."
  }

  fn mount_mode(&self) -> MountMode {
    MountMode::ReadWrite
  }

  fn execute_on_volume(&self, volume: Option<&mut dyn Volume>, session: &mut Session<'_>, args: &[String]) -> Result<(), Failure> {
    let app = super::app(self)
      .arg(Arg::with_name("parents")
        .short("p")
        .long("parents")
        .help("Create missing parent directories; existing directories are not an error"))
      .arg(Arg::with_name("paths")
        .required(true)
        .multiple(true));
    let matches = match super::parse(self, app, session, args)? {
      Some(matches) => matches,
      None => return Ok(()),
    };
    let volume = session.require_volume(self, volume)?;
    let parents = matches.is_present("parents");

    for path in super::qualify_all(self, session, &matches, "paths")? {
      let made = if parents {
        make_parents(volume, &path)
      } else {
        volume.mkdir(&path)
      };
      made.map_err(|e| session.volume_error(self.name(), &e))?;
    }
    Ok(())
  }
}

/// Create `path` and any missing ancestors
fn make_parents(volume: &mut dyn Volume, path: &QualifiedPath) -> Result<(), HfsError> {
  let mut current = QualifiedPath::root();
  for name in path.components() {
    current = current.join(name)?;
    match volume.stat(&current) {
      Ok(entry) if entry.is_dir() => continue,
      Ok(_) => return Err(HfsError::NotADirectory(current.to_string())),
      Err(HfsError::NotFound(_)) => {
        debug!(path = %current, "creating directory");
        volume.mkdir(&current)?;
      }
      Err(e) => return Err(e),
    }
  }
  Ok(())
}
