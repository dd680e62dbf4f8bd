use crate::events::UiEvent;
use std::path::PathBuf;

pub const HELP: &str = "\
Commands:
  list | refresh                        reload activities
  account                               open login, or offer logout when logged in
  login <username> <password>           submit the login form
  close                                 close the login form
  logout                                log out
  signup <email> <activity name>        register a student
  unregister <email> <activity name>    remove a student
  show                                  print the page again
  html <path>                           write the page as HTML to <path>
  help                                  show this help
  quit                                  exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Event(UiEvent),
    Logout,
    Show,
    SavePage(PathBuf),
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    let Some((verb, rest)) = split_word(line) else {
        return Ok(None);
    };

    let command = match verb {
        "list" | "refresh" => Command::Event(UiEvent::Refresh),
        "account" => Command::Event(UiEvent::UserIconClicked),
        "close" => Command::Event(UiEvent::LoginClosed),
        "logout" => Command::Logout,
        "show" => Command::Show,
        "html" => {
            if rest.is_empty() {
                return Err("usage: html <path>".to_string());
            }
            Command::SavePage(PathBuf::from(rest))
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "login" => {
            let (username, password) =
                split_word(rest).ok_or_else(|| "usage: login <username> <password>".to_string())?;
            if password.is_empty() {
                return Err("usage: login <username> <password>".to_string());
            }
            Command::Event(UiEvent::LoginSubmitted {
                username: username.to_string(),
                password: password.to_string(),
            })
        }
        "signup" => {
            let (email, activity) = participant_args(rest, "signup")?;
            Command::Event(UiEvent::SignupSubmitted { email, activity })
        }
        "unregister" => {
            let (email, activity) = participant_args(rest, "unregister")?;
            Command::Event(UiEvent::DeleteClicked { activity, email })
        }
        other => return Err(format!("unknown command `{other}`, try `help`")),
    };

    Ok(Some(command))
}

fn participant_args(rest: &str, verb: &str) -> Result<(String, String), String> {
    match split_word(rest) {
        Some((email, activity)) if !activity.is_empty() => {
            Ok((email.to_string(), activity.to_string()))
        }
        _ => Err(format!("usage: {verb} <email> <activity name>")),
    }
}

fn split_word(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => Some((word, rest.trim())),
        None => Some((input, "")),
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
