use std::path::Path;

use hfsdisklib::{CatalogImage, ErrorReporter, Failure, ImageLibrary, PathQualifier, Session, ShadowScheme};

use crate::dispatch::Dispatcher;

/// Captures the output of dispatched commands
pub(crate) struct Harness {
  pub(crate) paths: PathQualifier,
  pub(crate) shadow: ShadowScheme,
  out: Vec<u8>,
  err: Vec<u8>,
}

impl Harness {
  pub(crate) fn new() -> Self {
    Self {
      paths: PathQualifier::default(),
      shadow: ShadowScheme::Sidecar,
      out: Vec::new(),
      err: Vec::new(),
    }
  }

  /// Dispatch one command, replacing previously captured output
  pub(crate) fn run(&mut self, dispatcher: &Dispatcher<'_>, name: &str, args: &[&str]) -> Result<(), Failure> {
    self.out.clear();
    self.err.clear();
    let args = args.iter()
      .map(|a| a.to_string())
      .collect::<Vec<String>>();
    let mut session = Session::new(self.paths.clone(), self.shadow, &mut self.out, ErrorReporter::new(&mut self.err));
    dispatcher.run(name, &args, &mut session)
  }

  /// Dispatch against a catalog image file through the real volume library
  pub(crate) fn run_on(&mut self, image: &Path, name: &str, args: &[&str]) -> Result<(), Failure> {
    let library = ImageLibrary;
    let dispatcher = Dispatcher::new(crate::commands::table(), &library, Some(image.to_path_buf()));
    self.run(&dispatcher, name, args)
  }

  pub(crate) fn stdout(&self) -> String {
    String::from_utf8_lossy(&self.out).into_owned()
  }

  pub(crate) fn stderr(&self) -> String {
    String::from_utf8_lossy(&self.err).into_owned()
  }
}

/// Write a fresh, empty image named "Test" into `dir`
pub(crate) fn empty_image(dir: &Path) -> std::path::PathBuf {
  let path = dir.join("test.img");
  CatalogImage::create(&path, "Test").unwrap();
  path
}
