use std::fs;
use std::path::{Path, PathBuf};

use clap::Arg;
use glob::Pattern;
use tracing::debug;

use hfsdisklib::{Command, Entry, Failure, Fork, ForkChoice, HfsError, MountMode, QualifiedPath, Session, Volume};

/// Copy files out of the volume onto the host
pub(crate) struct Get;

impl Command for Get {
  fn name(&self) -> &'static str {
    "get"
  }

  fn usage(&self) -> &'static str {
    "get [-d|-r] [-v] <volume path> <host path>"
  }

  fn mount_mode(&self) -> MountMode {
    MountMode::ReadOnly
  }

  fn execute_on_volume(&self, volume: Option<&mut dyn Volume>, session: &mut Session<'_>, args: &[String]) -> Result<(), Failure> {
    let app = super::app(self)
      .args(&super::fork_args())
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

    // Exact name first, then the last component as a glob within its parent
    let src = session.qualify(self.name(), matches.value_of("src").unwrap_or_default())?;
    let sources = match volume.stat(&src) {
      Ok(entry) => vec![entry],
      Err(HfsError::NotFound(missing)) => {
        let found = glob_matches(volume, &src);
        if found.is_empty() {
          return Err(session.volume_error(self.name(), &HfsError::NotFound(missing)));
        }
        found
      }
      Err(e) => return Err(session.volume_error(self.name(), &e)),
    };

    // Figure out whether dest argument is a directory
    let dest = matches.value_of("dest").unwrap_or_default();
    let dest_is_dir = match fs::metadata(dest) {
      Ok(meta) => meta.is_dir(),
      Err(_) => false,
    };

    // If there is more than one matching file, they need to go to a named directory
    if sources.len() > 1 && !dest_is_dir {
      let message = format!("There were {} matching files but '{}' is not a directory", sources.len(), dest);
      session.reporter.report_message(self.name(), &message);
      return Err(Failure::Usage);
    }

    // Resolve every host path before anything gets written
    let mut plan = Vec::with_capacity(sources.len());
    for entry in sources {
      if entry.is_dir() {
        return Err(session.volume_error(self.name(), &HfsError::IsADirectory(entry.path.to_string())));
      }
      let mut host = PathBuf::from(dest);
      if dest_is_dir {
        host.push(&entry.name);
      }
      if choice.includes(Fork::Resource) {
        if let Err(e) = session.shadow.shadow_path(&host) {
          return Err(session.fork_error(self.name(), &e));
        }
      }
      plan.push((entry, host));
    }

    for (entry, host) in plan {
      self.copy_out(volume, session, choice, &entry, &host, verbose)?;
    }
    Ok(())
  }
}

impl Get {
  /// Copy the chosen forks of one file to `host` and its shadow. A rejected
  /// shadow path takes the freshly written data file back out.
  fn copy_out(&self, volume: &dyn Volume, session: &mut Session<'_>, choice: ForkChoice, entry: &Entry, host: &Path, verbose: bool) -> Result<(), Failure> {
    let mut data = None;
    let mut rsrc = None;
    for fork in choice.forks() {
      let bytes = volume.read_fork(&entry.path, fork)
        .map_err(|e| session.volume_error(self.name(), &e))?;
      match fork {
        Fork::Data => data = Some(bytes),
        // No shadow file for files without a resource fork
        Fork::Resource if choice == ForkChoice::Both && bytes.is_empty() => {}
        Fork::Resource => rsrc = Some(bytes),
      }
    }

    if let Some(bytes) = &data {
      fs::write(host, bytes)
        .map_err(|e| session.io_error(self.name(), &e))?;
    }
    let shadow = match &rsrc {
      Some(bytes) => match session.shadow.write_shadow(host, bytes) {
        Ok(shadow) => Some(shadow),
        Err(e) => {
          if data.is_some() {
            if let Err(rm) = fs::remove_file(host) {
              debug!(path = ?host, error = %rm, "could not remove data file");
            }
          }
          return Err(session.fork_error(self.name(), &e));
        }
      },
      None => None,
    };

    if verbose && data.is_some() {
      writeln!(session.out, "{} -> {}", entry.path, host.display())
        .map_err(|e| session.io_error(self.name(), &e))?;
    }
    if let (true, Some(shadow)) = (verbose, &shadow) {
      writeln!(session.out, "{} ({} fork) -> {}", entry.path, Fork::Resource, shadow.display())
        .map_err(|e| session.io_error(self.name(), &e))?;
    }
    Ok(())
  }
}

/// Files in the parent of `src` whose names match its last component as a
/// glob pattern
fn glob_matches(volume: &dyn Volume, src: &QualifiedPath) -> Vec<Entry> {
  let (parent, name) = match (src.parent(), src.name()) {
    (Some(parent), Some(name)) => (parent, name),
    _ => return Vec::new(),
  };
  let pattern = match Pattern::new(name) {
    Ok(p) => p,
    Err(e) => {
      debug!(pattern = name, error = %e, "not a glob pattern");
      return Vec::new();
    }
  };
  match volume.read_dir(&parent) {
    Ok(entries) => entries.into_iter()
      .filter(|e| !e.is_dir())
      .filter(|e| pattern.matches_with(&e.name, crate::GLOB_OPT))
      .collect(),
    Err(_) => Vec::new(),
  }
}
