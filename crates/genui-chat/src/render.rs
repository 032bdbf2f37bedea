use std::collections::HashSet;
use std::io::{self, Write};

use genui_core::{Fragment, FragmentId, UiUpdate};

/// Writes UI updates to a terminal as they arrive.
///
/// Streamed text is printed inline; each tool component rendering gets its
/// own line, so a tool shows a loading line followed by its final rendering.
pub struct Renderer<W: Write> {
    out: W,
    text_fragments: HashSet<FragmentId>,
    mid_line: bool,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            text_fragments: HashSet::new(),
            mid_line: false,
        }
    }

    pub fn render(&mut self, update: &UiUpdate) -> io::Result<()> {
        match update {
            UiUpdate::Appended {
                fragment: Fragment::Tool(component),
                ..
            }
            | UiUpdate::Replaced {
                fragment: Fragment::Tool(component),
                ..
            } => {
                self.break_line()?;
                writeln!(self.out, "{component}")?;
            }
            UiUpdate::Appended {
                id,
                fragment: Fragment::StreamingText(text),
            } => {
                self.text_fragments.insert(*id);
                self.write_text(text)?;
            }
            UiUpdate::Replaced {
                fragment: Fragment::StreamingText(text),
                ..
            } => {
                self.break_line()?;
                self.write_text(text)?;
            }
            UiUpdate::TextDelta { text, .. } => self.write_text(text)?,
            UiUpdate::Closed { id } => {
                if self.text_fragments.remove(id) {
                    self.break_line()?;
                }
            }
        }
        self.out.flush()
    }

    /// Ends a dangling line of streamed text.
    pub fn finish(&mut self) -> io::Result<()> {
        self.break_line()?;
        self.out.flush()
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }

    fn write_text(&mut self, text: &str) -> io::Result<()> {
        if !text.is_empty() {
            write!(self.out, "{text}")?;
            self.mid_line = !text.ends_with('\n');
        }
        Ok(())
    }

    fn break_line(&mut self) -> io::Result<()> {
        if self.mid_line {
            writeln!(self.out)?;
            self.mid_line = false;
        }
        Ok(())
    }
}
