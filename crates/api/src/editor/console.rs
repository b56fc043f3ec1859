//! Line-oriented operator console driving the [`Editor`].
//!
//! ```text
//! list                          positions and who is on them
//! events                        event instances, * marks the selected one
//! add                           append a position
//! remove <n>                    remove position n
//! label <n> [text]              set or clear the label of position n
//! assign <n> <name>             put a person on position n
//! unassign <n>                  clear position n
//! photo <n> <file>|clear        reference photo of position n
//! person-photo <file> <name>    personal photo of a person
//! person-photo-clear <name>     remove a personal photo
//! select <i>                    select event i from `events`
//! new-event <YYYY-MM-DD> <name> create an event
//! rename-event <name>           rename the selected event
//! import <file.json>            merge roster plans from a file
//! quit                          stop the server
//! ```

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use vox_core::types::PositionId;

use super::{Editor, EditorError, RosterImport};

const USAGE: &[(&str, &str)] = &[
    ("list", "list"),
    ("events", "events"),
    ("add", "add"),
    ("remove", "remove <n>"),
    ("label", "label <n> [text]"),
    ("assign", "assign <n> <name>"),
    ("unassign", "unassign <n>"),
    ("photo", "photo <n> <file>|clear"),
    ("person-photo", "person-photo <file> <name>"),
    ("person-photo-clear", "person-photo-clear <name>"),
    ("select", "select <i>"),
    ("new-event", "new-event <YYYY-MM-DD> <name>"),
    ("rename-event", "rename-event <name>"),
    ("import", "import <file.json>"),
    ("quit", "quit"),
];

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("Unknown command '{0}', type 'help' for a list")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("No position {0}")]
    UnknownPosition(u32),

    #[error("No event {0}, see 'events'")]
    UnknownEvent(usize),

    #[error("No event is selected")]
    NoEventSelected,

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid roster file: {0}")]
    Json(#[from] serde_json::Error),
}

/// A parsed console command. Positions are addressed by number, events by
/// their 1-based index in the `events` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    List,
    Events,
    Add,
    Remove(u32),
    Label(u32, Option<String>),
    Assign(u32, String),
    Unassign(u32),
    Photo(u32, PathBuf),
    ClearPhoto(u32),
    PersonPhoto(PathBuf, String),
    ClearPersonPhoto(String),
    Select(usize),
    NewEvent(NaiveDate, String),
    RenameEvent(String),
    Import(PathBuf),
    Quit,
}

/// How the console loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    Quit,
    EndOfInput,
}

/// Parse one input line. Blank lines are `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, ConsoleError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = split_word(line);

    let command = match word {
        "help" | "?" => Command::Help,
        "list" | "ls" => Command::List,
        "events" => Command::Events,
        "add" => Command::Add,
        "remove" | "rm" => Command::Remove(parse_number(rest, usage("remove"))?),
        "label" => {
            let (number, text) = split_word(rest);
            let number = parse_number(number, usage("label"))?;
            Command::Label(number, (!text.is_empty()).then(|| text.to_string()))
        }
        "assign" => {
            let (number, name) = split_word(rest);
            let number = parse_number(number, usage("assign"))?;
            if name.is_empty() {
                return Err(ConsoleError::Usage(usage("assign")));
            }
            Command::Assign(number, name.to_string())
        }
        "unassign" => Command::Unassign(parse_number(rest, usage("unassign"))?),
        "photo" => {
            let (number, file) = split_word(rest);
            let number = parse_number(number, usage("photo"))?;
            match file {
                "" => return Err(ConsoleError::Usage(usage("photo"))),
                "clear" => Command::ClearPhoto(number),
                file => Command::Photo(number, PathBuf::from(file)),
            }
        }
        "person-photo" => {
            let (file, name) = split_word(rest);
            if file.is_empty() || name.is_empty() {
                return Err(ConsoleError::Usage(usage("person-photo")));
            }
            Command::PersonPhoto(PathBuf::from(file), name.to_string())
        }
        "person-photo-clear" => Command::ClearPersonPhoto(required(rest, "person-photo-clear")?),
        "select" => {
            let index = rest
                .parse::<usize>()
                .map_err(|_| ConsoleError::Usage(usage("select")))?;
            Command::Select(index)
        }
        "new-event" => {
            let (date, name) = split_word(rest);
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .map_err(|_| ConsoleError::Usage(usage("new-event")))?;
            Command::NewEvent(date, name.to_string())
        }
        "rename-event" => Command::RenameEvent(required(rest, "rename-event")?),
        "import" => Command::Import(PathBuf::from(required(rest, "import")?)),
        "quit" | "exit" => Command::Quit,
        other => return Err(ConsoleError::UnknownCommand(other.to_string())),
    };

    Ok(Some(command))
}

/// Run one command against the editor and return the text to show.
pub fn execute(editor: &mut Editor, command: Command) -> Result<String, ConsoleError> {
    let message = match command {
        Command::Help => USAGE
            .iter()
            .map(|(_, line)| format!("  {line}"))
            .collect::<Vec<_>>()
            .join("\n"),
        Command::List => list_positions(editor),
        Command::Events => list_events(editor),
        Command::Quit => "bye".to_string(),
        Command::Add => format!("Added position {}", editor.add_position()),
        Command::Remove(number) => {
            let id = position_id(editor, number)?;
            editor.remove_position(id)?;
            format!("Removed position {number}")
        }
        Command::Label(number, label) => {
            let id = position_id(editor, number)?;
            editor.set_label(id, label);
            format!("Updated position {number}")
        }
        Command::Assign(number, name) => {
            let id = position_id(editor, number)?;
            editor.assign(id, &name, None);
            format!("{name} is on position {number}")
        }
        Command::Unassign(number) => {
            let id = position_id(editor, number)?;
            editor.unassign(id);
            format!("Position {number} is unassigned")
        }
        Command::Photo(number, file) => {
            let id = position_id(editor, number)?;
            let bytes = fs::read(&file)?;
            editor.set_position_photo(id, &bytes)?;
            format!("Set reference photo of position {number}")
        }
        Command::ClearPhoto(number) => {
            let id = position_id(editor, number)?;
            editor.clear_position_photo(id)?;
            format!("Cleared reference photo of position {number}")
        }
        Command::PersonPhoto(file, name) => {
            let bytes = fs::read(&file)?;
            editor.set_person_photo(&name, &bytes)?;
            format!("Set photo of {name}")
        }
        Command::ClearPersonPhoto(name) => {
            editor.remove_person_photo(&name)?;
            format!("Removed photo of {name}")
        }
        Command::Select(index) => {
            let id = index
                .checked_sub(1)
                .and_then(|i| editor.store().events().get(i))
                .map(|e| e.id)
                .ok_or(ConsoleError::UnknownEvent(index))?;
            editor.select_event(id);
            list_positions(editor)
        }
        Command::NewEvent(date, name) => {
            let service_date = date.and_time(NaiveTime::MIN).and_utc();
            editor.add_event(&name, service_date)?;
            list_events(editor)
        }
        Command::RenameEvent(name) => {
            let id = editor
                .store()
                .selected_event_id()
                .ok_or(ConsoleError::NoEventSelected)?;
            editor.rename_event(id, &name)?;
            list_events(editor)
        }
        Command::Import(file) => {
            let import: RosterImport = serde_json::from_slice(&fs::read(&file)?)?;
            let members = editor.import_roster(&import);
            let mut lines = vec![format!("Imported {} plan(s)", import.plans.len())];
            lines.extend(members.iter().map(|m| {
                let photo = if m.photo_filename.is_some() { " (photo)" } else { "" };
                format!("  {}{photo}", m.name)
            }));
            lines.join("\n")
        }
    };

    Ok(message)
}

/// Read commands until `quit` or end of input, writing results to `output`.
pub fn run_console<R: BufRead, W: Write>(
    editor: &mut Editor,
    input: R,
    mut output: W,
) -> io::Result<ConsoleExit> {
    writeln!(output, "Type 'help' for commands.")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        match parse_command(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Quit)) => return Ok(ConsoleExit::Quit),
            Ok(Some(command)) => match execute(editor, command) {
                Ok(message) => writeln!(output, "{message}")?,
                Err(e) => writeln!(output, "error: {e}")?,
            },
            Err(e) => writeln!(output, "error: {e}")?,
        }
        output.flush()?;
    }

    Ok(ConsoleExit::EndOfInput)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn usage(command: &str) -> &'static str {
    USAGE
        .iter()
        .find(|(name, _)| *name == command)
        .map(|(_, line)| *line)
        .unwrap_or("help")
}

fn split_word(text: &str) -> (&str, &str) {
    match text.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (text, ""),
    }
}

fn parse_number(text: &str, usage: &'static str) -> Result<u32, ConsoleError> {
    text.trim().parse().map_err(|_| ConsoleError::Usage(usage))
}

fn required(text: &str, command: &str) -> Result<String, ConsoleError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ConsoleError::Usage(usage(command)));
    }
    Ok(text.to_string())
}

fn position_id(editor: &Editor, number: u32) -> Result<PositionId, ConsoleError> {
    editor
        .store()
        .position_by_number(number)
        .map(|p| p.id)
        .ok_or(ConsoleError::UnknownPosition(number))
}

fn list_positions(editor: &Editor) -> String {
    let store = editor.store();
    let header = match store.selected_event() {
        Some(event) => format!(
            "{} ({})",
            event.service_name,
            event.service_date.format("%a %b %-d, %Y")
        ),
        None => "No event selected".to_string(),
    };

    let mut lines = vec![header];
    for position in store.positions() {
        let label = position.label.as_deref().unwrap_or("-");
        let name = store
            .assignment_for(position.id)
            .and_then(|a| a.operator_name.as_deref())
            .unwrap_or("Unassigned");
        let photo = if position.angle_photo_filename.is_some() { " [photo]" } else { "" };
        lines.push(format!("  {}. {label:<12} {name}{photo}", position.number));
    }
    lines.join("\n")
}

fn list_events(editor: &Editor) -> String {
    let store = editor.store();
    let selected = store.selected_event_id();
    store
        .events()
        .iter()
        .enumerate()
        .map(|(i, event)| {
            let marker = if Some(event.id) == selected { '*' } else { ' ' };
            format!(
                "{marker} {}. {} ({})",
                i + 1,
                event.service_name,
                event.service_date.format("%Y-%m-%d")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use vox_core::publish::PublishSink;
    use vox_storage::{ImageStore, StateStore};

    use super::*;

    fn editor(dir: &tempfile::TempDir) -> (Editor, Arc<PublishSink>) {
        let sink = Arc::new(PublishSink::new());
        let state = StateStore::open(dir.path().join("data")).unwrap();
        let images = Arc::new(ImageStore::open(dir.path().join("images")).unwrap());
        let editor = Editor::open(state, images, Arc::clone(&sink), None).unwrap();
        (editor, sink)
    }

    #[test]
    fn parses_commands_with_free_text() {
        assert_eq!(
            parse_command("assign 2 Mary Jane").unwrap(),
            Some(Command::Assign(2, "Mary Jane".into()))
        );
        assert_eq!(
            parse_command("  label 1   Soprano lead ").unwrap(),
            Some(Command::Label(1, Some("Soprano lead".into())))
        );
        assert_eq!(parse_command("label 1").unwrap(), Some(Command::Label(1, None)));
        assert_eq!(parse_command("photo 3 clear").unwrap(), Some(Command::ClearPhoto(3)));
        assert_eq!(
            parse_command("person-photo ./bob.png Bob Smith").unwrap(),
            Some(Command::PersonPhoto("./bob.png".into(), "Bob Smith".into()))
        );
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn rejects_malformed_commands() {
        assert_matches!(
            parse_command("dance"),
            Err(ConsoleError::UnknownCommand(c)) if c == "dance"
        );
        assert_matches!(parse_command("remove two"), Err(ConsoleError::Usage("remove <n>")));
        assert_matches!(parse_command("assign 1"), Err(ConsoleError::Usage(_)));
        assert_matches!(parse_command("new-event tomorrow Easter"), Err(ConsoleError::Usage(_)));
        assert_matches!(parse_command("import"), Err(ConsoleError::Usage(_)));
    }

    #[test]
    fn unknown_position_number_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (mut editor, _sink) = editor(&dir);
        assert_matches!(
            execute(&mut editor, Command::Assign(9, "Alice".into())),
            Err(ConsoleError::UnknownPosition(9))
        );
        assert_matches!(
            execute(&mut editor, Command::Select(0)),
            Err(ConsoleError::UnknownEvent(0))
        );
    }

    #[test]
    fn session_drives_the_published_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let (mut editor, sink) = editor(&dir);
        let input = Cursor::new(
            "assign 1 Alice\nlabel 1 Lead\nassign 2 Alice\nremove 5\nbogus\nquit\nassign 3 Never\n",
        );
        let mut output = Vec::new();

        let exit = run_console(&mut editor, input, &mut output).unwrap();

        assert_eq!(exit, ConsoleExit::Quit);
        let published = sink.current();
        let snapshot = published.snapshot().unwrap();
        assert_eq!(snapshot.vocalists.len(), 4);
        assert_eq!(snapshot.vocalists[0].label.as_deref(), Some("Lead"));
        assert_eq!(snapshot.vocalists[0].operator_name, None);
        assert_eq!(snapshot.vocalists[1].operator_name.as_deref(), Some("Alice"));
        assert_eq!(snapshot.vocalists[2].operator_name, None);

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("Alice is on position 2"));
        assert!(text.contains("error: Unknown command 'bogus'"));
    }

    #[test]
    fn end_of_input_is_not_quit() {
        let dir = tempfile::tempdir().unwrap();
        let (mut editor, _sink) = editor(&dir);
        let exit = run_console(&mut editor, Cursor::new("list\n"), Vec::new()).unwrap();
        assert_eq!(exit, ConsoleExit::EndOfInput);
    }

    #[test]
    fn new_event_and_select_switch_the_display() {
        let dir = tempfile::tempdir().unwrap();
        let (mut editor, sink) = editor(&dir);

        execute(&mut editor, Command::Assign(1, "Alice".into())).unwrap();
        let date = NaiveDate::from_ymd_opt(2030, 12, 25).unwrap();
        let listing = execute(&mut editor, Command::NewEvent(date, "Christmas".into())).unwrap();
        assert!(listing.contains("2. Christmas (2030-12-25)"));

        execute(&mut editor, Command::Select(2)).unwrap();
        let published = sink.current();
        let snapshot = published.snapshot().unwrap();
        assert_eq!(snapshot.service_name, "Christmas");
        assert!(snapshot.vocalists.iter().all(|v| v.operator_name.is_none()));
    }

    #[test]
    fn import_reads_a_roster_file() {
        let dir = tempfile::tempdir().unwrap();
        let (mut editor, _sink) = editor(&dir);
        let file = dir.path().join("roster.json");
        fs::write(
            &file,
            r#"{"plans": [{"id": "p9", "title": "Easter", "dates": "April 20, 2031",
                           "sort_date": "2031-04-20T09:00:00Z"}],
                "members": [{"id": "m1", "person_name": "Bob", "team_id": null,
                             "photo_thumbnail_url": null}]}"#,
        )
        .unwrap();

        let message = execute(&mut editor, Command::Import(file)).unwrap();

        assert!(message.starts_with("Imported 1 plan(s)"));
        assert!(message.contains("  Bob"));
        assert!(editor.store().events().iter().any(|e| e.service_name == "Easter"));
    }
}
