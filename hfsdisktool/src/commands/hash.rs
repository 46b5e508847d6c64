use clap::Arg;
use sha2::{Digest, Sha256};
use tabled::{Table, Tabled};

use hfsdisklib::{Command, Failure, Fork, MountMode, Session, Volume};

/// Hash one fork of each named file
pub(crate) struct Hash;

impl Command for Hash {
  fn name(&self) -> &'static str {
    "hash"
  }

  fn usage(&self) -> &'static str {
    "hash [-r] <path>..."
  }

  fn mount_mode(&self) -> MountMode {
    MountMode::ReadOnly
  }

  fn execute_on_volume(&self, volume: Option<&mut dyn Volume>, session: &mut Session<'_>, args: &[String]) -> Result<(), Failure> {
    let app = super::app(self)
      .arg(super::rsrc_arg())
      .arg(Arg::with_name("paths")
        .required(true)
        .multiple(true));
    let matches = match super::parse(self, app, session, args)? {
      Some(matches) => matches,
      None => return Ok(()),
    };
    let volume = session.require_volume(self, volume)?;
    let fork = Fork::from_flag(matches.is_present("rsrc"));

    let mut items = Vec::new();
    for path in super::qualify_all(self, session, &matches, "paths")? {
      let bytes = volume.read_fork(&path, fork)
        .map_err(|e| session.volume_error(self.name(), &e))?;
      let mut hash = MultiHash::new();
      hash.update(&bytes);
      items.push((path.to_string(), bytes.len(), hash.finalize()));
    }

    let table = file_hashes(fork, items);
    session.out.write_all(table.as_bytes())
      .map_err(|e| session.io_error(self.name(), &e))
  }
}

/// Table of fork hashes
fn file_hashes(fork: Fork, items: Vec<(String, usize, MultiHashResult)>) -> String {
  #[derive(Tabled)]
  struct FileHash {
    file: String,
    fork: &'static str,
    size: usize,
    hash_type: &'static str,
    hash: String,
  }

  let tab = items.into_iter()
    .flat_map(|(file, size, h)| {
      vec![
        FileHash {
          file: file.clone(),
          fork: fork.name(),
          size,
          hash_type: "SHA-256",
          hash: h.sha256,
        },
        FileHash {
          file,
          fork: fork.name(),
          size,
          hash_type: "BLAKE3",
          hash: h.blake3,
        },
      ]
    })
    .collect::<Vec<FileHash>>();

  Table::new(tab).with(crate::table_fmt()).to_string()
}

/// Hashes with BLAKE3, SHA-256
pub(crate) struct MultiHash {
  blake3: blake3::Hasher,
  sha256: Sha256,
}

/// Results from MultiHash hashes
#[derive(Debug)]
pub(crate) struct MultiHashResult {
  pub(crate) blake3: String,
  pub(crate) sha256: String,
}

impl MultiHash {
  pub fn new() -> Self {
    MultiHash {
      blake3: blake3::Hasher::new(),
      sha256: Sha256::new(),
    }
  }

  /// Update hash with data
  pub fn update(&mut self, b: &[u8]) {
    self.blake3.update(b);
    self.sha256.update(b);
  }

  /// Finalize hash and populate results
  pub fn finalize(self) -> MultiHashResult {
    MultiHashResult {
      blake3: Self::bytes_to_hex(self.blake3.finalize().as_bytes()),
      sha256: Self::bytes_to_hex(&self.sha256.finalize()[..]),
    }
  }

  /// Uppercase hex
  fn bytes_to_hex(b: &[u8]) -> String {
    b.iter()
      .map(|b| format!("{:02X}", b))
      .collect::<Vec<String>>()
      .concat()
  }
}
