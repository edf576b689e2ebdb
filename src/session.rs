use std::io::{ErrorKind, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::controller::{CatalogController, Completion, Intent, Mode, PageSize, PendingCall, SortSpec};
use crate::error::AppError;

pub const HELP: &str = "\
commands:
  page N        go to page N (1-based)
  size N        page size: 6, 10, 12 or 24
  sort KEY      e.g. title,asc  createdAt,desc  rating,desc  totalVisits,desc
  type TEXT     edit the search text without submitting
  search [TEXT] submit a search (empty text goes back to browsing)
  clear         clear the search and show all courses
  refresh       reload the current view
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Apply(Vec<Intent>),
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<SessionCommand>, AppError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "page" => {
            let page = rest
                .parse::<u32>()
                .ok()
                .filter(|page| *page >= 1)
                .ok_or_else(|| AppError::InvalidInput(format!("not a page number: {}", rest)))?;
            SessionCommand::Apply(vec![Intent::ChangePage(page - 1)])
        }
        "size" => {
            let size = rest
                .parse::<u32>()
                .map_err(|_| AppError::InvalidInput(format!("not a page size: {}", rest)))?;
            SessionCommand::Apply(vec![Intent::ChangeSize(PageSize::try_from(size)?)])
        }
        "sort" => SessionCommand::Apply(vec![Intent::ChangeSort(rest.parse::<SortSpec>()?)]),
        "type" => SessionCommand::Apply(vec![Intent::EditSearch(rest.to_string())]),
        "search" if rest.is_empty() => SessionCommand::Apply(vec![Intent::SubmitSearch]),
        "search" => SessionCommand::Apply(vec![
            Intent::EditSearch(rest.to_string()),
            Intent::SubmitSearch,
        ]),
        "clear" => SessionCommand::Apply(vec![Intent::ClearSearch]),
        "refresh" => SessionCommand::Apply(vec![Intent::Refresh]),
        "help" => SessionCommand::Help,
        "quit" | "exit" => SessionCommand::Quit,
        other => return Err(AppError::InvalidInput(format!("unknown command: {}", other))),
    };

    Ok(Some(command))
}

/// Runs until `quit` or end of input, then waits for calls still in flight.
/// Every issued call runs on its own task and reports back over a channel.
pub async fn run<R, W>(mut controller: CatalogController, input: R, mut out: W) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
    let mut lines = input.lines();
    let mut in_flight = 0usize;
    let mut input_error = None;

    spawn_call(controller.start(), &tx);
    in_flight += 1;
    render(&controller, &mut out)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) if e.kind() == ErrorKind::InvalidData => {
                        writeln!(out, "{}", AppError::from(e))?;
                        continue;
                    }
                    Err(e) => {
                        input_error = Some(e);
                        break;
                    }
                };
                match parse_command(&line) {
                    Ok(None) => {}
                    Ok(Some(SessionCommand::Quit)) => break,
                    Ok(Some(SessionCommand::Help)) => writeln!(out, "{}", HELP)?,
                    Ok(Some(SessionCommand::Apply(intents))) => {
                        for intent in intents {
                            if let Some(call) = controller.apply(intent) {
                                spawn_call(call, &tx);
                                in_flight += 1;
                            }
                        }
                        render(&controller, &mut out)?;
                    }
                    Err(e) => writeln!(out, "{}", e)?,
                }
            }
            Some(completion) = rx.recv() => {
                in_flight -= 1;
                if controller.complete(completion) {
                    render(&controller, &mut out)?;
                }
            }
        }
    }

    drop(tx);
    while in_flight > 0 {
        let Some(completion) = rx.recv().await else { break };
        in_flight -= 1;
        if controller.complete(completion) {
            render(&controller, &mut out)?;
        }
    }

    match input_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

fn spawn_call(call: PendingCall, tx: &mpsc::UnboundedSender<Completion>) {
    let tx = tx.clone();
    tokio::spawn(async move {
        let completion = call.finish().await;
        if tx.send(completion).is_err() {
            debug!("session ended before the response arrived");
        }
    });
}

pub fn render<W: Write>(controller: &CatalogController, out: &mut W) -> Result<(), AppError> {
    let state = controller.state();
    let view = controller.display();

    match &state.mode {
        Mode::Browse => {
            let sort = state
                .sort
                .label()
                .map(str::to_string)
                .unwrap_or_else(|| state.sort.to_string());
            let page = match controller.page_count() {
                Some(pages) => format!("page {}/{}", state.page + 1, pages.max(1)),
                None => format!("page {}", state.page + 1),
            };
            writeln!(
                out,
                "== Course Catalog | {} | {} per page | {} ==",
                page, state.size, sort
            )?;
        }
        Mode::Search { query } => {
            writeln!(out, "== Search results for: {} ==", query)?;
        }
    }

    if view.loading {
        writeln!(out, "loading...")?;
    }
    if let Some(error) = &view.error {
        writeln!(out, "! {}", error)?;
    }

    for (i, course) in view.records.iter().enumerate() {
        writeln!(
            out,
            "{:>3}. {} - {} | rating {:.1} ({}) | {} visits",
            i + 1,
            course.title,
            course.instructor_label(),
            course.rating(),
            course.total_ratings,
            course.total_visits
        )?;
        writeln!(out, "     {}", course.description_label())?;
        if !course.tags.is_empty() {
            writeln!(out, "     tags: {}", course.tags.join(", "))?;
        }
    }

    if let Some(empty) = view.empty_state {
        writeln!(out, "No courses found. {}", empty.message())?;
        if empty.recovery() == Some(Intent::ClearSearch) {
            writeln!(out, "(type 'clear' to view all courses)")?;
        }
    } else if !view.records.is_empty() {
        writeln!(out, "Showing {} of {} courses", view.records.len(), view.total)?;
    }

    Ok(())
}
