use std::io::{self, Write};

use clap::Arg;

use hfsdisklib::{Command, CommandTable, Failure, MountMode, Session, Volume};

/// Lists commands, or shows the usage of one
pub(crate) struct Help;

impl Command for Help {
  fn name(&self) -> &'static str {
    "help"
  }

  fn usage(&self) -> &'static str {
    "help [command]"
  }

  fn mount_mode(&self) -> MountMode {
    MountMode::None
  }

  fn execute_on_volume(&self, _volume: Option<&mut dyn Volume>, session: &mut Session<'_>, args: &[String]) -> Result<(), Failure> {
    let app = super::app(self)
      .arg(Arg::with_name("command").index(1));
    let matches = match super::parse(self, app, session, args)? {
      Some(matches) => matches,
      None => return Ok(()),
    };

    let table = super::table();
    let written = match matches.value_of("command") {
      Some(name) => match table.find(name) {
        Some(command) => writeln!(session.out, "usage: {}", command.usage()),
        None => {
          session.reporter.report_message(name, "unknown command");
          return Err(Failure::Usage);
        }
      },
      None => print_summary(session.out, table),
    };
    written.map_err(|e| session.io_error(self.name(), &e))
  }
}

/// Print every command with its usage and mount mode
fn print_summary(out: &mut dyn Write, table: CommandTable<'_>) -> io::Result<()> {
  writeln!(out, "usage: hfsdisktool [-f IMAGE] [--cwd PATH] <command> [args...]")?;
  writeln!(out)?;
  writeln!(out, "Commands (volume access in parentheses):")?;
  for command in table.iter() {
    writeln!(out, "  {:<52} ({})", command.usage(), command.mount_mode())?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use crate::dispatch::Dispatcher;
  use crate::testing::Harness;

  fn dispatcher() -> Dispatcher<'static> {
    Dispatcher::new(crate::commands::table(), &hfsdisklib::ImageLibrary, None)
  }

  #[test]
  fn test_help_lists_every_command() {
    let mut h = Harness::new();
    h.run(&dispatcher(), "help", &[]).unwrap();
    let out = h.stdout();
    for command in crate::commands::table().iter() {
      assert!(out.contains(command.usage()), "help is missing {}", command.name());
    }
    assert!(out.contains("(read-write)"));
  }

  #[test]
  fn test_help_for_one_command() {
    let mut h = Harness::new();
    h.run(&dispatcher(), "help", &["mv"]).unwrap();
    assert_eq!(h.stdout(), "usage: mv <source> <destination>\n");
  }

  #[test]
  fn test_help_unknown_command() {
    let mut h = Harness::new();
    assert!(h.run(&dispatcher(), "help", &["format"]).is_err());
    assert_eq!(h.stderr(), "format: unknown command\n");
  }
}
