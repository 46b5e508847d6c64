use clap::Arg;

use hfsdisklib::{Command, Failure, MountMode, Session, Volume};

/// Delete files
pub(crate) struct Rm;

impl Command for Rm {
  fn name(&self) -> &'static str {
    "rm"
  }

  fn usage(&self) -> &'static str {
    "rm <path>..."
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
      volume.remove_file(&path)
        .map_err(|e| session.volume_error(self.name(), &e))?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use hfsdisklib::Failure;

  use crate::testing::{empty_image, Harness};

  #[test]
  fn test_rm() {
    let dir = tempfile::tempdir().unwrap();
    let image = empty_image(dir.path());
    let host = dir.path().join("Junk");
    std::fs::write(&host, b"junk").unwrap();
    let mut h = Harness::new();
    h.run_on(&image, "put", &[host.to_str().unwrap(), "/"]).unwrap();
    h.run_on(&image, "mkdir", &["/Keep"]).unwrap();

    assert_eq!(h.run_on(&image, "rm", &["/Keep"]), Err(Failure::Io));
    assert_eq!(h.stderr(), "rm: is a directory: /Keep\n");

    h.run_on(&image, "rm", &["/JUNK"]).unwrap();
    h.run_on(&image, "ls", &[]).unwrap();
    assert_eq!(h.stdout(), "Keep/\n");

    assert_eq!(h.run_on(&image, "rm", &["/Junk"]), Err(Failure::Io));
    assert_eq!(h.stderr(), "rm: no such file or directory: /Junk\n");
  }

  #[test]
  fn test_rm_diagnostic_stays_on_one_line() {
    let dir = tempfile::tempdir().unwrap();
    let image = empty_image(dir.path());
    let mut h = Harness::new();
    assert_eq!(h.run_on(&image, "rm", &["/a\nb"]), Err(Failure::Io));
    assert_eq!(h.stderr(), "rm: no such file or directory: /a\\nb\n");
    assert_eq!(h.stderr().lines().count(), 1);
  }
}
