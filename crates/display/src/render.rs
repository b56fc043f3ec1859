//! Turning a snapshot into what the display shows.

use std::io::{self, Write};
use std::sync::Mutex;

use vox_core::snapshot::PublishedSnapshot;

pub const NO_VOCALISTS: &str = "No vocalists configured";
pub const UNASSIGNED: &str = "Unassigned";

/// What to draw for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayView {
    /// A single centered message instead of columns.
    Placeholder(&'static str),
    /// One column per vocalist, left to right in snapshot order.
    Columns(Vec<Column>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub number: u32,
    pub label: Option<String>,
    /// Operator name, or [`UNASSIGNED`].
    pub name: String,
    pub assigned: bool,
    /// `/api/images/{name}` of the server-resolved background photo.
    pub background_url: Option<String>,
}

impl DisplayView {
    /// Build the view. Entry order is kept exactly as published.
    pub fn from_snapshot(snapshot: &PublishedSnapshot) -> Self {
        if snapshot.vocalists.is_empty() {
            return DisplayView::Placeholder(NO_VOCALISTS);
        }

        let columns = snapshot
            .vocalists
            .iter()
            .map(|entry| Column {
                number: entry.number,
                label: entry.label.clone(),
                name: entry
                    .operator_name
                    .clone()
                    .unwrap_or_else(|| UNASSIGNED.to_string()),
                assigned: entry.operator_name.is_some(),
                background_url: entry
                    .background_photo_filename
                    .as_ref()
                    .map(|name| format!("/api/images/{name}")),
            })
            .collect();

        DisplayView::Columns(columns)
    }
}

/// A display surface. Shared between the poll loop and the clock task, so
/// both calls take `&self`.
pub trait Renderer: Send + Sync + 'static {
    fn render(&self, view: &DisplayView);
    fn show_clock(&self, time: &str);
}

/// Draws the display as text on an ANSI terminal: the clock on the first
/// line, one line per column below it.
pub struct TerminalRenderer<W> {
    out: Mutex<W>,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send + 'static> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Consume the renderer and return the writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self, draw: impl FnOnce(&mut W) -> io::Result<()>) {
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = draw(&mut *out).and_then(|()| out.flush()) {
            tracing::warn!(error = %e, "Failed to draw display");
        }
    }
}

impl<W: Write + Send + 'static> Renderer for TerminalRenderer<W> {
    fn render(&self, view: &DisplayView) {
        self.write(|out| {
            // Clear everything below the clock line.
            write!(out, "\x1b[2;1H\x1b[J")?;
            match view {
                DisplayView::Placeholder(message) => writeln!(out, "\n    {message}"),
                DisplayView::Columns(columns) => {
                    for column in columns {
                        let label = column.label.as_deref().unwrap_or("");
                        let photo = column.background_url.as_deref().unwrap_or("no photo");
                        let name = format!("{:<24}", column.name);
                        // Unassigned names are dimmed.
                        let (dim, reset) = if column.assigned {
                            ("", "")
                        } else {
                            ("\x1b[2m", "\x1b[0m")
                        };
                        writeln!(
                            out,
                            "  {:>2}  {label:<16} {dim}{name}{reset} {photo}",
                            column.number
                        )?;
                    }
                    Ok(())
                }
            }
        });
    }

    fn show_clock(&self, time: &str) {
        self.write(|out| write!(out, "\x1b7\x1b[1;1H\x1b[2K  {time}\x1b8"));
    }
}
