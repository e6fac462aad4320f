//! Plain-text tables with multi-line cells
//!
//! ```text
//! +-------------------------------+
//! | H1 Belongs To                 |
//! +------+---------+--------------+
//! | Name | Type    | Extra        |
//! +------+---------+--------------+
//! | H1   | host    | 10.0.0.5     |
//! | N1   | network | 10.0.0.0/24  |
//! +------+---------+--------------+
//! ```
//!
//! A cell containing `\n` spans several physical lines; every other cell of
//! that row is padded to the same height. Rows are separated by a rule line
//! when any row in the table is multi-line, so entries stay distinguishable.

use std::fmt;

/// A titled table with a fixed column count.
#[derive(Debug, Clone)]
pub struct Table<const N: usize> {
    title: String,
    headers: [&'static str; N],
    rows: Vec<[String; N]>,
}

impl<const N: usize> Table<N> {
    pub fn new(title: impl Into<String>, headers: [&'static str; N]) -> Self {
        Self {
            title: title.into(),
            headers,
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, values: [String; N]) {
        self.rows.push(values);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_widths(&self) -> [usize; N] {
        let mut widths = self.headers.map(|h| h.chars().count());
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                let longest = cell.lines().map(|l| l.chars().count()).max().unwrap_or(0);
                *width = (*width).max(longest);
            }
        }

        // Widen the last column if the title would not fit.
        let inner = widths.iter().sum::<usize>() + 3 * N.saturating_sub(1);
        let title_len = self.title.chars().count();
        if title_len > inner
            && let Some(last) = widths.last_mut()
        {
            *last += title_len - inner;
        }
        widths
    }
}

fn write_rule(f: &mut fmt::Formatter<'_>, widths: &[usize]) -> fmt::Result {
    f.write_str("+")?;
    for w in widths {
        write!(f, "{}+", "-".repeat(w + 2))?;
    }
    f.write_str("\n")
}

fn write_cells<S: AsRef<str>>(f: &mut fmt::Formatter<'_>, widths: &[usize], cells: &[S]) -> fmt::Result {
    let split: Vec<Vec<&str>> = cells.iter().map(|c| c.as_ref().lines().collect()).collect();
    let height = split.iter().map(Vec::len).max().unwrap_or(0).max(1);

    for line in 0..height {
        f.write_str("|")?;
        for (lines, &w) in split.iter().zip(widths) {
            let text = lines.get(line).copied().unwrap_or("");
            write!(f, " {text}{} |", " ".repeat(w - text.chars().count()))?;
        }
        f.write_str("\n")?;
    }
    Ok(())
}

impl<const N: usize> fmt::Display for Table<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.column_widths();
        let inner = widths.iter().sum::<usize>() + 3 * N.saturating_sub(1);

        writeln!(f, "+{}+", "-".repeat(inner + 2))?;
        let title_pad = inner - self.title.chars().count();
        writeln!(f, "| {}{} |", self.title, " ".repeat(title_pad))?;

        write_rule(f, &widths)?;
        write_cells(f, &widths, self.headers.as_slice())?;
        write_rule(f, &widths)?;

        let multiline = self.rows.iter().flatten().any(|c| c.contains('\n'));
        for (i, row) in self.rows.iter().enumerate() {
            if multiline && i > 0 {
                write_rule(f, &widths)?;
            }
            write_cells(f, &widths, row.as_slice())?;
        }
        if !self.rows.is_empty() {
            write_rule(f, &widths)?;
        }
        Ok(())
    }
}
