use clap::Arg;
use tabled::{Table, Tabled};

use hfsdisklib::{Command, Entry, EntryKind, Failure, MountMode, Session, Volume};

/// Directory listing
pub(crate) struct Ls;

impl Command for Ls {
  fn name(&self) -> &'static str {
    "ls"
  }

  fn usage(&self) -> &'static str {
    "ls [-l] [path...]"
  }

  fn mount_mode(&self) -> MountMode {
    MountMode::ReadOnly
  }

  fn execute_on_volume(&self, volume: Option<&mut dyn Volume>, session: &mut Session<'_>, args: &[String]) -> Result<(), Failure> {
    let app = super::app(self)
      .arg(Arg::with_name("long")
        .short("l")
        .help("Long listing with type, creator, fork sizes and dates"))
      .arg(Arg::with_name("paths")
        .multiple(true));
    let matches = match super::parse(self, app, session, args)? {
      Some(matches) => matches,
      None => return Ok(()),
    };
    let volume = session.require_volume(self, volume)?;
    let long = matches.is_present("long");

    // Default to the current directory
    let mut targets = super::qualify_all(self, session, &matches, "paths")?;
    if targets.is_empty() {
      targets.push(session.paths.cwd().clone());
    }

    let many = targets.len() > 1;
    for (i, path) in targets.iter().enumerate() {
      let entry = volume.stat(path).map_err(|e| session.volume_error(self.name(), &e))?;
      let entries = if entry.is_dir() {
        volume.read_dir(path).map_err(|e| session.volume_error(self.name(), &e))?
      } else {
        vec![entry.clone()]
      };

      let mut listing = String::new();
      if many && entry.is_dir() {
        if i > 0 {
          listing.push('\n');
        }
        listing.push_str(&format!("{}:\n", path));
      }
      if long {
        listing.push_str(&long_listing(entries));
      } else {
        for e in &entries {
          listing.push_str(&short_name(e));
          listing.push('\n');
        }
      }
      if let Err(e) = session.out.write_all(listing.as_bytes()) {
        return Err(session.io_error(self.name(), &e));
      }
    }
    Ok(())
  }
}

/// Entry name, with a trailing separator for directories
fn short_name(entry: &Entry) -> String {
  if entry.is_dir() {
    format!("{}/", entry.name)
  } else {
    entry.name.clone()
  }
}

/// Table of entries with catalog details
fn long_listing(entries: Vec<Entry>) -> String {
  #[derive(Tabled)]
  struct DisplayEntry {
    #[header("Kind")]
    kind: &'static str,
    #[header("Type")]
    file_type: String,
    #[header("Creator")]
    creator: String,
    #[header("Data (bytes)")]
    data: String,
    #[header("Rsrc (bytes)")]
    rsrc: String,
    #[header("Modified")]
    modified: String,
    #[header("Name")]
    name: String,
  }

  let tab = entries.into_iter()
    .map(|e| {
      let modified = e.modified.format(crate::DATE_FMT).to_string();
      match e.kind {
        EntryKind::File { file_type, creator, data_len, rsrc_len } => DisplayEntry {
          kind: "F",
          file_type: file_type.to_string(),
          creator: creator.to_string(),
          data: data_len.to_string(),
          rsrc: rsrc_len.to_string(),
          modified,
          name: e.name,
        },
        EntryKind::Directory { valence } => DisplayEntry {
          kind: "D",
          file_type: String::new(),
          creator: String::new(),
          data: format!("{} items", valence),
          rsrc: String::new(),
          modified,
          name: e.name,
        },
      }
    })
    .collect::<Vec<DisplayEntry>>();

  Table::new(tab).with(crate::table_fmt()).to_string()
}

#[cfg(test)]
mod tests {
  use hfsdisklib::Failure;

  use crate::testing::{empty_image, Harness};

  #[test]
  fn test_ls_root_and_subdirectory() {
    let dir = tempfile::tempdir().unwrap();
    let image = empty_image(dir.path());
    let mut h = Harness::new();
    h.run_on(&image, "mkdir", &["/System Folder"]).unwrap();
    h.run_on(&image, "mkdir", &["/Apps"]).unwrap();
    h.run_on(&image, "mkdir", &["/Apps/Games"]).unwrap();

    h.run_on(&image, "ls", &[]).unwrap();
    assert_eq!(h.stdout(), "Apps/\nSystem Folder/\n");

    h.paths = hfsdisklib::PathQualifier::with_cwd("/apps").unwrap();
    h.run_on(&image, "ls", &[]).unwrap();
    assert_eq!(h.stdout(), "Games/\n");

    h.run_on(&image, "ls", &["/", ".."]).unwrap();
    assert_eq!(h.stdout(), "/:\nApps/\nSystem Folder/\n\n/:\nApps/\nSystem Folder/\n");
  }

  #[test]
  fn test_ls_long() {
    let dir = tempfile::tempdir().unwrap();
    let image = empty_image(dir.path());
    let host = dir.path().join("Read Me");
    std::fs::write(&host, b"hello").unwrap();
    let mut h = Harness::new();
    h.run_on(&image, "put", &["-t", "TEXT", "-c", "ttxt", host.to_str().unwrap(), "/"]).unwrap();

    h.run_on(&image, "ls", &["-l"]).unwrap();
    let out = h.stdout();
    assert!(out.contains("TEXT"));
    assert!(out.contains("ttxt"));
    assert!(out.contains("Read Me"));
  }

  #[test]
  fn test_ls_missing() {
    let dir = tempfile::tempdir().unwrap();
    let image = empty_image(dir.path());
    let mut h = Harness::new();
    assert_eq!(h.run_on(&image, "ls", &["/Nowhere"]), Err(Failure::Io));
    assert_eq!(h.stderr(), "ls: no such file or directory: /Nowhere\n");
  }

  #[test]
  fn test_ls_bad_path() {
    let dir = tempfile::tempdir().unwrap();
    let image = empty_image(dir.path());
    let mut h = Harness::new();
    assert_eq!(h.run_on(&image, "ls", &["Disk:Folder"]), Err(Failure::Resolution));
    assert!(h.stderr().starts_with("ls: name \"Disk:Folder\" contains disallowed character ':'"));
  }
}
