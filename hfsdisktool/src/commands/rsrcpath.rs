use std::path::Path;

use clap::Arg;

use hfsdisklib::{Command, Failure, MountMode, Session, Volume};

/// Shows where the resource fork of a host file lives
pub(crate) struct RsrcPath;

impl Command for RsrcPath {
  fn name(&self) -> &'static str {
    "rsrcpath"
  }

  fn usage(&self) -> &'static str {
    "rsrcpath [-u] <host path>..."
  }

  fn mount_mode(&self) -> MountMode {
    MountMode::None
  }

  fn execute_on_volume(&self, _volume: Option<&mut dyn Volume>, session: &mut Session<'_>, args: &[String]) -> Result<(), Failure> {
    let app = super::app(self)
      .arg(Arg::with_name("undo")
        .short("u")
        .long("data-path")
        .help("Map resource fork paths back to their data fork paths"))
      .arg(Arg::with_name("paths")
        .required(true)
        .multiple(true));
    let matches = match super::parse(self, app, session, args)? {
      Some(matches) => matches,
      None => return Ok(()),
    };
    let undo = matches.is_present("undo");

    for raw in super::values(&matches, "paths") {
      let path = Path::new(raw);
      let mapped = if undo {
        session.shadow.data_path(path)
      } else {
        session.shadow.shadow_path(path)
      };
      match mapped {
        Ok(mapped) => if let Err(e) = writeln!(session.out, "{}", mapped.display()) {
          return Err(session.io_error(self.name(), &e));
        },
        Err(e) => return Err(session.fork_error(self.name(), &e)),
      }
    }
    Ok(())
  }
}
