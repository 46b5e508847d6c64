use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::exit;

use clap::{load_yaml, App};
use glob::MatchOptions;
use tabled::Style;

use hfsdisklib::{ErrorReporter, ImageLibrary, PathQualifier, Session, ShadowScheme};

use crate::dispatch::Dispatcher;

mod commands;
mod dispatch;
mod exit_codes;
mod logging;
#[cfg(test)]
mod testing;

/// Environment variable naming the volume image when `-f` is not given
const IMAGE_ENV: &str = "HFSDISK_IMAGE";

/// Catalog date display format
pub(crate) const DATE_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Glob matching follows catalog name rules
pub(crate) const GLOB_OPT: MatchOptions = MatchOptions {
  case_sensitive: false,
  require_literal_separator: true,
  require_literal_leading_dot: false,
};

/// Main hfsdisktool CLI entry point
fn main() {
  // Parse CLI arguments
  let cli_yaml = load_yaml!("cli.yaml");
  let cli_matches = App::from_yaml(cli_yaml).get_matches();

  logging::init(cli_matches.occurrences_of("verbose"));

  let mut reporter = ErrorReporter::stderr();

  // Starting location within the volume
  let paths = match PathQualifier::with_cwd(cli_matches.value_of("cwd").unwrap_or("/")) {
    Ok(paths) => paths,
    Err(e) => {
      reporter.report("--cwd", &e);
      exit(exit_codes::RESOLVE_ERR);
    }
  };

  let shadow = match cli_matches.value_of("rsrc_scheme") {
    Some("sidecar") => ShadowScheme::Sidecar,
    Some("namedfork") => ShadowScheme::NamedFork,
    _ => ShadowScheme::default(),
  };

  let image = cli_matches.value_of_os("file")
    .map(PathBuf::from)
    .or_else(|| env::var_os(IMAGE_ENV).map(PathBuf::from));

  // Command name, then everything after it verbatim; clap enforces at least the name
  let mut words = match cli_matches.values_of("command") {
    Some(values) => values.map(String::from).collect::<Vec<String>>(),
    None => Vec::new(),
  };
  let command = if words.is_empty() {
    String::new()
  } else {
    words.remove(0)
  };
  let args = words;

  // Run the command
  let stdout = io::stdout();
  let mut out = stdout.lock();
  let result = {
    let mut session = Session::new(paths, shadow, &mut out, reporter);
    let library = ImageLibrary;
    let dispatcher = Dispatcher::new(commands::table(), &library, image);
    dispatcher.run(&command, &args, &mut session)
  };
  let _ = out.flush();

  if let Err(failure) = result {
    exit(exit_codes::for_failure(failure));
  }
}

/// Standard table formatting
pub(crate) fn table_fmt() -> Style {
  Style::pseudo_clean()
}
