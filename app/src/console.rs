//! Console front end used when the tray feature is off.
//!
//! Reads one command per line from stdin and hands it to the dispatcher.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::command::{CommandDispatcher, Flow, MenuCommand, format_stats};

const HELP: &str = "commands: start | stop | path [DIR] | stats | open | quit";

/// Run the prompt loop until `quit` or end of input.
pub fn run(dispatcher: &CommandDispatcher) -> io::Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();

    println!("{}", format_stats(&dispatcher.controller().snapshot()));
    println!("{HELP}");

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let Some(command) = parse_line(&line) else {
            if !line.trim().is_empty() {
                println!("{HELP}");
            }
            continue;
        };

        if dispatcher.dispatch(command) == Flow::Exit {
            break;
        }
    }

    Ok(())
}

/// Map one input line to a command, `None` when unrecognized.
fn parse_line(line: &str) -> Option<MenuCommand> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match (word, rest) {
        ("start", "") => Some(MenuCommand::Start),
        ("stop" | "pause", "") => Some(MenuCommand::Stop),
        ("path", "") => Some(MenuCommand::ChangePath(None)),
        ("path", dir) => Some(MenuCommand::ChangePath(Some(PathBuf::from(dir)))),
        ("stats", "") => Some(MenuCommand::ShowStats),
        ("open", "") => Some(MenuCommand::OpenFolder),
        ("quit" | "exit", "") => Some(MenuCommand::Exit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_bare_commands() {
        assert_eq!(parse_line("start"), Some(MenuCommand::Start));
        assert_eq!(parse_line("stop"), Some(MenuCommand::Stop));
        assert_eq!(parse_line("pause"), Some(MenuCommand::Stop));
        assert_eq!(parse_line("stats"), Some(MenuCommand::ShowStats));
        assert_eq!(parse_line("open"), Some(MenuCommand::OpenFolder));
        assert_eq!(parse_line("quit"), Some(MenuCommand::Exit));
        assert_eq!(parse_line("exit\n"), Some(MenuCommand::Exit));
    }

    #[test]
    fn parses_path_with_and_without_argument() {
        assert_eq!(parse_line("path"), Some(MenuCommand::ChangePath(None)));
        assert_eq!(
            parse_line("path /data/inbox"),
            Some(MenuCommand::ChangePath(Some(PathBuf::from("/data/inbox"))))
        );
        assert_eq!(
            parse_line("path  /with spaces/dir \n"),
            Some(MenuCommand::ChangePath(Some(PathBuf::from(
                "/with spaces/dir"
            ))))
        );
    }

    #[test]
    fn rejects_unknown_input() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("bogus"), None);
        assert_eq!(parse_line("start now"), None);
    }
}
