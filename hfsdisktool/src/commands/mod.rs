use clap::{App, AppSettings, Arg, ArgMatches, ErrorKind};
use tracing::debug;

use hfsdisklib::{Command, CommandTable, Failure, ForkChoice, OsType, QualifiedPath, Session};

mod attrib;
mod cat;
mod get;
mod hash;
mod help;
mod ls;
mod mkdir;
mod mv;
mod put;
mod rm;
mod rmdir;
mod rsrcpath;
mod vol;

/// Every command the tool knows, in help order
static COMMANDS: &[&dyn Command] = &[
  &help::Help,
  &rsrcpath::RsrcPath,
  &vol::Vol,
  &ls::Ls,
  &cat::Cat,
  &hash::Hash,
  &get::Get,
  &put::Put,
  &mkdir::Mkdir,
  &rm::Rm,
  &rmdir::Rmdir,
  &mv::Mv,
  &attrib::Attrib,
];

/// Command registry
pub(crate) fn table() -> CommandTable<'static> {
  CommandTable::new(COMMANDS)
}

/// Argument parser skeleton for a command
pub(crate) fn app(command: &dyn Command) -> App<'static, 'static> {
  App::new(command.name())
    .setting(AppSettings::NoBinaryName)
    .setting(AppSettings::DisableVersion)
}

/// Parse command arguments. `Ok(None)` means help was asked for and printed.
pub(crate) fn parse<'a>(command: &dyn Command, app: App<'a, 'a>, session: &mut Session<'_>, args: &[String]) -> Result<Option<ArgMatches<'a>>, Failure> {
  match app.get_matches_from_safe(args) {
    Ok(matches) => Ok(Some(matches)),
    Err(e) if e.kind == ErrorKind::HelpDisplayed => {
      match writeln!(session.out, "usage: {}", command.usage()) {
        Ok(()) => Ok(None),
        Err(e) => Err(session.io_error(command.name(), &e)),
      }
    }
    Err(e) => {
      debug!(command = command.name(), error = %e.message, "rejected arguments");
      Err(session.usage(command))
    }
  }
}

/// `-d/--data` and `-r/--rsrc` fork selection flags
pub(crate) fn fork_args() -> [Arg<'static, 'static>; 2] {
  [
    Arg::with_name("data")
      .short("d")
      .long("data")
      .conflicts_with("rsrc")
      .help("Data fork only"),
    Arg::with_name("rsrc")
      .short("r")
      .long("rsrc")
      .help("Resource fork only"),
  ]
}

/// Fork choice from the flags added by `fork_args`
pub(crate) fn fork_choice(matches: &ArgMatches) -> ForkChoice {
  ForkChoice::from_flags(matches.is_present("data"), matches.is_present("rsrc"))
}

/// `-r/--rsrc` flag for commands reading a single fork
pub(crate) fn rsrc_arg() -> Arg<'static, 'static> {
  Arg::with_name("rsrc")
    .short("r")
    .long("rsrc")
    .help("Use the resource fork instead of the data fork")
}

/// `-t TYPE` and `-c CREATOR` options
pub(crate) fn os_type_args() -> [Arg<'static, 'static>; 2] {
  [
    Arg::with_name("type")
      .short("t")
      .long("type")
      .takes_value(true)
      .value_name("TYPE")
      .help("Four-character file type"),
    Arg::with_name("creator")
      .short("c")
      .long("creator")
      .takes_value(true)
      .value_name("CREATOR")
      .help("Four-character creator code"),
  ]
}

/// Parse an optional type/creator option
pub(crate) fn os_type(command: &dyn Command, session: &mut Session<'_>, matches: &ArgMatches, name: &str) -> Result<Option<OsType>, Failure> {
  match matches.value_of(name) {
    None => Ok(None),
    Some(s) => match s.parse::<OsType>() {
      Ok(code) => Ok(Some(code)),
      Err(e) => Err(session.volume_error(command.name(), &e)),
    },
  }
}

/// All values of a multi-valued argument
pub(crate) fn values<'a>(matches: &'a ArgMatches, name: &str) -> Vec<&'a str> {
  match matches.values_of(name) {
    Some(values) => values.collect(),
    None => Vec::new(),
  }
}

/// Qualify every path of a multi-valued argument before any of them is acted on
pub(crate) fn qualify_all(command: &dyn Command, session: &mut Session<'_>, matches: &ArgMatches, name: &str) -> Result<Vec<QualifiedPath>, Failure> {
  values(matches, name).into_iter()
    .map(|raw| session.qualify(command.name(), raw))
    .collect()
}

#[cfg(test)]
mod tests {
  use hfsdisklib::MountMode;
  use rstest::rstest;

  use super::*;
  use crate::testing::{empty_image, Harness};

  #[test]
  fn test_registry_names_and_usage() {
    let table = table();
    assert!(table.conflicts().is_empty());
    for command in table.iter() {
      assert!(!command.name().is_empty());
      assert!(!command.usage().is_empty(), "{} has no usage", command.name());
      assert!(command.usage().starts_with(command.name()), "{} usage does not start with its name", command.name());
      assert!(table.find(command.name()).is_some());
    }
  }

  #[test]
  fn test_registry_mount_modes() {
    let table = table();
    let mode = |name: &str| table.find(name).map(|c| c.mount_mode());
    assert_eq!(mode("help"), Some(MountMode::None));
    assert_eq!(mode("rsrcpath"), Some(MountMode::None));
    assert_eq!(mode("ls"), Some(MountMode::ReadOnly));
    assert_eq!(mode("get"), Some(MountMode::ReadOnly));
    assert_eq!(mode("put"), Some(MountMode::ReadWrite));
    assert_eq!(mode("rm"), Some(MountMode::ReadWrite));
  }

  #[rstest]
  #[case("ls", &["-x"])]
  #[case("cat", &[])]
  #[case("hash", &[])]
  #[case("get", &["/only-one"])]
  #[case("put", &["a", "b", "c"])]
  #[case("mkdir", &[])]
  #[case("rm", &[])]
  #[case("rmdir", &[])]
  #[case("mv", &["/a"])]
  #[case("attrib", &["-t"])]
  fn test_bad_arguments_are_usage_errors(#[case] name: &str, #[case] args: &[&str]) {
    let dir = tempfile::tempdir().unwrap();
    let image = empty_image(dir.path());
    let mut h = Harness::new();
    assert_eq!(h.run_on(&image, name, args), Err(Failure::Usage));
    let usage = table().find(name).map(|c| c.usage()).unwrap();
    assert_eq!(h.stderr(), format!("{}: usage: {}\n", name, usage));
  }

  #[test]
  fn test_help_flag_prints_usage() {
    let dir = tempfile::tempdir().unwrap();
    let image = empty_image(dir.path());
    let mut h = Harness::new();
    h.run_on(&image, "ls", &["--help"]).unwrap();
    assert_eq!(h.stdout(), "usage: ls [-l] [path...]\n");
  }
}
