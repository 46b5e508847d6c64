use std::io::{self, Write};

use clap::Arg;

use hfsdisklib::{Command, Failure, MountMode, QualifiedPath, Session, Volume, VolumeInfo};

/// Volume information
pub(crate) struct Vol;

impl Command for Vol {
  fn name(&self) -> &'static str {
    "vol"
  }

  fn usage(&self) -> &'static str {
    "vol [--json]"
  }

  fn mount_mode(&self) -> MountMode {
    MountMode::ReadOnly
  }

  fn execute_on_volume(&self, volume: Option<&mut dyn Volume>, session: &mut Session<'_>, args: &[String]) -> Result<(), Failure> {
    let app = super::app(self)
      .arg(Arg::with_name("json")
        .long("json")
        .help("Print as JSON"));
    let matches = match super::parse(self, app, session, args)? {
      Some(matches) => matches,
      None => return Ok(()),
    };
    let volume = session.require_volume(self, volume)?;
    let info = volume.info();

    let written = if matches.is_present("json") {
      match serde_json::to_string(&info) {
        Ok(json) => writeln!(session.out, "{}", json),
        Err(e) => {
          session.reporter.report(self.name(), &e);
          return Err(Failure::Io);
        }
      }
    } else {
      print_info(session.out, &info, session.paths.cwd())
    };
    written.map_err(|e| session.io_error(self.name(), &e))
  }
}

/// Formatted print of volume information
fn print_info(out: &mut dyn Write, info: &VolumeInfo, cwd: &QualifiedPath) -> io::Result<()> {
  writeln!(out, "Volume name: {}", info.name)?;
  writeln!(out, "Created: {}", info.created.format(crate::DATE_FMT))?;
  writeln!(out, "Modified: {}", info.modified.format(crate::DATE_FMT))?;
  writeln!(out, "Locked: {}", yes_no(info.locked))?;
  writeln!(out, "Mounted read-only: {}", yes_no(info.read_only))?;
  writeln!(out, "Files: {} ({} data bytes, {} resource bytes)", info.file_count, info.data_bytes, info.rsrc_bytes)?;
  writeln!(out, "Directories: {}", info.directory_count)?;
  writeln!(out, "Current directory: {} ({})", cwd, cwd.to_hfs())?;
  Ok(())
}

fn yes_no(b: bool) -> &'static str {
  if b {
    "yes"
  } else {
    "no"
  }
}
