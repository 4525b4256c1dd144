//! Line-oriented front end: reads commands from stdin and drives a
//! [`TaskSession`], closing the undo window when its deadline passes.

use crate::plugins::tasks::undo::UndoEffect;
use crate::plugins::tasks::{Task, TaskDraft, TaskError, TaskSession};
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  list                              show all tasks
  add <title> [| description]       add a task (use `add!` to mark it important)
  edit <id> <title> [| description] change title and description
  important <id>                    toggle the important flag
  image <id> <uri|none>             attach or detach an image reference
  delete <id>                       delete a task (undoable for a short while)
  undo                              bring back the last deleted task
  clear                             delete every task, no undo
  help                              show this text
  quit                              save and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Add(TaskDraft),
    Edit {
        id: u32,
        title: String,
        description: Option<String>,
    },
    Important(u32),
    Image {
        id: u32,
        uri: Option<String>,
    },
    Delete(u32),
    Undo,
    Clear,
    Help,
    Quit,
}

fn parse_id(arg: &str) -> Result<u32, String> {
    arg.trim()
        .parse()
        .map_err(|_| format!("Not a task id: {:?}", arg.trim()))
}

/// `title | description` with the description optional.
fn split_title(rest: &str) -> (String, Option<String>) {
    match rest.split_once('|') {
        Some((title, description)) => (
            title.trim().to_string(),
            Some(description.trim().to_string()),
        ),
        None => (rest.trim().to_string(), None),
    }
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    match word {
        "list" | "ls" | "" => Ok(Command::List),
        "add" | "add!" => {
            let (title, description) = split_title(rest);
            Ok(Command::Add(
                TaskDraft::new(title, description.unwrap_or_default()).important(word == "add!"),
            ))
        }
        "edit" => {
            let (id, rest) = rest
                .trim()
                .split_once(char::is_whitespace)
                .ok_or("Usage: edit <id> <title> [| description]")?;
            let (title, description) = split_title(rest);
            Ok(Command::Edit {
                id: parse_id(id)?,
                title,
                description,
            })
        }
        "important" => Ok(Command::Important(parse_id(rest)?)),
        "image" => {
            let (id, uri) = rest
                .trim()
                .split_once(char::is_whitespace)
                .ok_or("Usage: image <id> <uri|none>")?;
            let uri = match uri.trim() {
                "none" | "" => None,
                uri => Some(uri.to_string()),
            };
            Ok(Command::Image {
                id: parse_id(id)?,
                uri,
            })
        }
        "delete" | "rm" => Ok(Command::Delete(parse_id(rest)?)),
        "undo" => Ok(Command::Undo),
        "clear" => Ok(Command::Clear),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("Unknown command: {} (try `help`)", other)),
    }
}

pub fn render_task(task: &Task) -> String {
    let mut line = format!(
        "{:>3}. {}{}  ({})",
        task.id,
        if task.is_important { "[!] " } else { "" },
        task.title,
        task.added_time
    );
    if !task.description.is_empty() {
        line.push_str(&format!("\n     {}", task.description));
    }
    if let Some(uri) = &task.image_uri {
        line.push_str(&format!("\n     image: {}", uri));
    }
    line
}

fn print_tasks(session: &TaskSession) {
    let store = session.store();
    if store.is_empty() {
        println!("No tasks yet. Add one with `add <title>`.");
        return;
    }
    for task in store.tasks() {
        println!("{}", render_task(task));
    }
}

/// Run one command. Returns `Ok(false)` when the user asked to quit.
///
/// Input mistakes are printed and leave the store alone; only storage
/// failures are returned.
pub fn handle_command(
    session: &mut TaskSession,
    command: Command,
    now: Instant,
) -> Result<bool, TaskError> {
    let result = match command {
        Command::List => {
            print_tasks(session);
            Ok(())
        }
        Command::Add(draft) => session.add(draft).map(|task| {
            println!("Task added.\n{}", render_task(&task));
        }),
        Command::Edit {
            id,
            title,
            description,
        } => match session.store().get(id) {
            Some(task) => {
                let mut draft = TaskDraft::from_task(task);
                draft.title = title;
                if let Some(description) = description {
                    draft.description = description;
                }
                session.edit(id, draft).map(|task| {
                    println!("Task updated.\n{}", render_task(&task));
                })
            }
            None => Err(TaskError::NotFound(id)),
        },
        Command::Important(id) => session.toggle_important(id).map(|task| {
            println!("{}", render_task(&task));
        }),
        Command::Image { id, uri } => session.set_image(id, uri).map(|task| {
            println!("{}", render_task(&task));
        }),
        Command::Delete(id) => session.delete(id, now).map(|effects| {
            for effect in effects {
                if let UndoEffect::ShowUndoPrompt { deadline, .. } = effect {
                    let secs = deadline.saturating_duration_since(now).as_secs_f32();
                    println!("Task deleted. Type `undo` within {:.1}s to bring it back.", secs);
                }
            }
        }),
        Command::Undo => session.undo().map(|restored| match restored {
            Some(task) => println!("Restored.\n{}", render_task(&task)),
            None => println!("Nothing to undo."),
        }),
        Command::Clear => {
            session.clear();
            println!("All tasks removed.");
            Ok(())
        }
        Command::Help => {
            println!("{}", HELP);
            Ok(())
        }
        Command::Quit => return Ok(false),
    };

    match result {
        Ok(()) => Ok(true),
        Err(TaskError::Validation) => {
            println!("{}", TaskError::Validation);
            Ok(true)
        }
        Err(TaskError::NotFound(id)) => {
            tracing::warn!(target: "tasks", id, "Command referenced unknown task");
            println!("No task with id {}.", id);
            Ok(true)
        }
        Err(TaskError::IdsExhausted) => {
            tracing::warn!(target: "tasks", "Add refused, id space exhausted");
            println!("{}", TaskError::IdsExhausted);
            Ok(true)
        }
        Err(e) => Err(e),
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => std::future::pending::<()>().await,
    }
}

/// Main loop over stdin. Returns once stdin closes or the user quits; the
/// session is stopped (pending delete settled, list saved) on the way out.
pub async fn run_console(session: TaskSession) -> Result<(), TaskError> {
    run_console_with(session, BufReader::new(tokio::io::stdin())).await
}

pub async fn run_console_with<R>(mut session: TaskSession, input: R) -> Result<(), TaskError>
where
    R: AsyncBufRead + Unpin,
{
    session.store_mut().subscribe(|change| {
        tracing::trace!(target: "tasks", ?change, "List changed");
    });

    let mut lines = input.lines();
    print_tasks(&session);

    loop {
        let deadline = session.undo_deadline();

        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!(target: "system", "Failed to read input: {}", e);
                        break;
                    }
                };

                let command = match parse_command(&line) {
                    Ok(command) => command,
                    Err(msg) => {
                        println!("{}", msg);
                        continue;
                    }
                };

                if !handle_command(&mut session, command, Instant::now())? {
                    break;
                }
            }
            _ = wait_for(deadline) => {
                session.tick(Instant::now())?;
            }
        }
    }

    session.stop()
}
