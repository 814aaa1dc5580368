use std::io::{self, Write};

use anyhow::Result;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use randverse_core::{CategoryEntry, Messages, VerseLine, VersePick, LABEL_SEPARATOR};
use tracing::debug;

const HIGHLIGHT: Color = Color::DarkGreen;

/// How much of the book to print after the selected line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerseSpan {
    #[default]
    Single,
    Remaining,
}

pub struct VersePrinter<W: Write> {
    writer: W,
    color: bool,
}

impl<W: Write> VersePrinter<W> {
    pub fn new(writer: W, color: bool) -> Self {
        Self { writer, color }
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Prints the header and the verses of `pick`, returning how many
    /// verse lines were written.
    pub fn print_pick(&mut self, pick: &mut VersePick<'_>, span: VerseSpan) -> Result<usize> {
        self.write_header(pick.book_name(), pick.offset, pick.total_lines())?;
        let mut printed = 0;
        for line in pick.verses.by_ref() {
            self.write_verse(&line?)?;
            printed += 1;
            if span == VerseSpan::Single {
                break;
            }
        }
        if printed == 0 {
            debug!(book = pick.book_name(), offset = pick.offset, "no verse content after skip");
        }
        self.writer.flush()?;
        Ok(printed)
    }

    pub fn write_header(&mut self, book: &str, offset: usize, total: usize) -> io::Result<()> {
        queue!(self.writer, Print(book), Print(" (line "))?;
        self.highlighted(&offset.to_string())?;
        queue!(self.writer, Print("/"))?;
        self.highlighted(&total.to_string())?;
        queue!(self.writer, Print(")\n\n"))?;
        Ok(())
    }

    pub fn write_verse(&mut self, line: &VerseLine) -> io::Result<()> {
        if !line.token.is_empty() {
            self.highlighted(&line.token)?;
            queue!(self.writer, Print(" "))?;
        }
        queue!(self.writer, Print(&line.text), Print("\n"))?;
        Ok(())
    }

    fn highlighted(&mut self, text: &str) -> io::Result<()> {
        if self.color {
            queue!(
                self.writer,
                SetForegroundColor(HIGHLIGHT),
                Print(text),
                ResetColor
            )
        } else {
            queue!(self.writer, Print(text))
        }
    }
}

/// Writes the rejected key followed by every accepted category.
pub fn write_invalid_category<W: Write>(
    writer: &mut W,
    messages: &Messages,
    key: &str,
    entries: &[CategoryEntry],
) -> io::Result<()> {
    writeln!(writer, "{}", messages.invalid_param(key))?;
    writeln!(writer, "{}", messages.accepted_values_message)?;
    write_categories(writer, entries)
}

pub fn write_categories<W: Write>(writer: &mut W, entries: &[CategoryEntry]) -> io::Result<()> {
    for entry in entries {
        writeln!(writer, "  {}{}{}", entry.key, LABEL_SEPARATOR, entry.label)?;
    }
    writer.flush()
}
