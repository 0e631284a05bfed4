// # phonebook - Terminal Front End
//
// Line-oriented front end for the phonebook service.
//
// ## Configuration
//
// - `PHONEBOOK_API_URL`: API base URL (default: http://localhost:5000/api)
// - `PHONEBOOK_LOG_LEVEL`: trace, debug, info, warn, error (default: warn)
//
// Logs go to stderr so they do not interleave with the screen.
//
// ## Commands
//
// ```text
// search <term>     filter by name or phone (empty clears)
// name <text>       set the form's name
// phone <digits>    set the form's phone number
// birth <date>      set the birth date (YYYY-MM-DD, empty clears)
// address <text>    set the address (empty clears)
// save              add or update the contact in the form
// edit <n>          load contact n into the form
// cancel            leave edit mode
// delete <n>        delete contact n (asks for y/n)
// dismiss           close the error banner
// refresh           reload the list
// help              show this list
// quit              exit
// ```

use anyhow::{Context, Result};
use phonebook_client::{Action, Controller, DEFAULT_API_URL, Field, HttpContactApi, render};
use phonebook_core::ContactId;
use std::env;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::LinesStream;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const HELP: &str = "\
Commands:
  search <term>    filter by name or phone (empty clears)
  name <text>      set name
  phone <digits>   set phone number
  birth <date>     set birth date (YYYY-MM-DD, empty clears)
  address <text>   set address (empty clears)
  save             add or update the contact
  edit <n>         edit contact n
  cancel           leave edit mode
  delete <n>       delete contact n
  dismiss          close the error banner
  refresh          reload contacts
  help             show this help
  quit             exit";

/// A parsed input line
#[derive(Debug, PartialEq)]
enum Command {
    Dispatch(Action),
    Edit(usize),
    Delete(usize),
    Help,
    Quit,
    Invalid(String),
}

fn parse_command(line: &str, confirming_delete: bool) -> Command {
    let line = line.trim();

    if confirming_delete {
        return match line.to_lowercase().as_str() {
            "y" | "yes" => Command::Dispatch(Action::ConfirmDelete),
            _ => Command::Dispatch(Action::AbortDelete),
        };
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let set = |field| Command::Dispatch(Action::SetField(field, rest.to_string()));

    match word {
        "search" => Command::Dispatch(Action::SearchChanged(rest.to_string())),
        "name" => set(Field::Name),
        "phone" => set(Field::PhoneNumber),
        "birth" => set(Field::BirthDate),
        "address" => set(Field::Address),
        "save" => Command::Dispatch(Action::Submit),
        "cancel" => Command::Dispatch(Action::CancelEdit),
        "dismiss" => Command::Dispatch(Action::DismissError),
        "refresh" => Command::Dispatch(Action::Load),
        "edit" | "delete" => match rest.parse::<usize>() {
            Ok(n) if n > 0 && word == "edit" => Command::Edit(n),
            Ok(n) if n > 0 => Command::Delete(n),
            _ => Command::Invalid(format!("Usage: {} <number>", word)),
        },
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        "" => Command::Invalid(String::new()),
        other => Command::Invalid(format!("Unknown command '{}'. Type help.", other)),
    }
}

fn log_level(raw: Option<String>) -> Level {
    match raw.unwrap_or_default().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    }
}

fn show(controller: &Controller) {
    print!("{}\n> ", render(controller.state()));
    let _ = std::io::stdout().flush();
}

/// Id of the n-th listed contact, counting from 1
fn contact_at(controller: &Controller, n: usize) -> Option<ContactId> {
    let visible = controller.state().visible_contacts();
    visible.get(n.checked_sub(1)?).map(|c| c.id.clone())
}

/// Handle one input line; returns false when the user quits
async fn handle_line(controller: &mut Controller, line: &str) -> bool {
    let confirming = controller.state().pending_delete.is_some();

    let action = match parse_command(line, confirming) {
        Command::Dispatch(action) => action,
        Command::Edit(n) => match contact_at(controller, n) {
            Some(id) => Action::Edit(id),
            None => {
                println!("No contact number {}", n);
                return true;
            }
        },
        Command::Delete(n) => match contact_at(controller, n) {
            Some(id) => Action::RequestDelete(id),
            None => {
                println!("No contact number {}", n);
                return true;
            }
        },
        Command::Help => {
            println!("{}", HELP);
            return true;
        }
        Command::Quit => return false,
        Command::Invalid(message) => {
            if !message.is_empty() {
                println!("{}", message);
            }
            return true;
        }
    };

    controller.dispatch(action).await;
    true
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(env::var("PHONEBOOK_LOG_LEVEL").ok()))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let base_url = env::var("PHONEBOOK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let api = HttpContactApi::new(base_url).context("Failed to build HTTP client")?;
    tracing::info!("Using API at {}", api.base_url());

    let (mut controller, mut delayed) = Controller::new(Arc::new(api));
    println!("Phonebook - type help for commands");
    controller.dispatch(Action::Load).await;
    show(&controller);

    let mut lines = LinesStream::new(BufReader::new(tokio::io::stdin()).lines());

    loop {
        tokio::select! {
            line = lines.next() => match line {
                Some(Ok(line)) => {
                    if !handle_line(&mut controller, &line).await {
                        break;
                    }
                    show(&controller);
                }
                Some(Err(e)) => return Err(e).context("Failed to read input"),
                None => break,
            },
            Some(action) = delayed.recv() => {
                controller.dispatch(action).await;
                show(&controller);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_form_commands() {
        assert_eq!(
            parse_command("name Jane Doe", false),
            Command::Dispatch(Action::SetField(Field::Name, "Jane Doe".to_string()))
        );
        assert_eq!(
            parse_command("birth", false),
            Command::Dispatch(Action::SetField(Field::BirthDate, String::new()))
        );
        assert_eq!(parse_command("save", false), Command::Dispatch(Action::Submit));
        assert_eq!(
            parse_command("search  ann ", false),
            Command::Dispatch(Action::SearchChanged("ann".to_string()))
        );
    }

    #[test]
    fn test_parse_numbered_commands() {
        assert_eq!(parse_command("edit 2", false), Command::Edit(2));
        assert_eq!(parse_command("delete 1", false), Command::Delete(1));
        assert!(matches!(parse_command("delete 0", false), Command::Invalid(_)));
        assert!(matches!(parse_command("edit x", false), Command::Invalid(_)));
    }

    #[test]
    fn test_confirmation_answers() {
        assert_eq!(
            parse_command("y", true),
            Command::Dispatch(Action::ConfirmDelete)
        );
        assert_eq!(
            parse_command("YES", true),
            Command::Dispatch(Action::ConfirmDelete)
        );
        assert_eq!(
            parse_command("n", true),
            Command::Dispatch(Action::AbortDelete)
        );
        assert_eq!(
            parse_command("save", true),
            Command::Dispatch(Action::AbortDelete)
        );
    }

    #[test]
    fn test_log_level_defaults_to_warn() {
        assert_eq!(log_level(None), Level::WARN);
        assert_eq!(log_level(Some("DEBUG".to_string())), Level::DEBUG);
    }
}
