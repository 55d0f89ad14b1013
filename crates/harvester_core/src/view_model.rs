use crate::{Cell, DivergenceReport};

pub const MISSING_CELL: &str = "N/A";
const FIRST_COLUMN: &str = "Book + Chapter";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportViewModel {
    pub columns: Vec<String>,
    pub rows: Vec<ReportRowView>,
    pub divergent_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRowView {
    pub label: String,
    pub cells: Vec<String>,
    pub flagged: Vec<bool>,
}

impl ReportViewModel {
    /// Builds display rows; `only_divergent` drops rows where all versions agree.
    pub fn from_report(report: &DivergenceReport, only_divergent: bool) -> Self {
        let columns = report
            .versions
            .iter()
            .map(|version| version.to_uppercase())
            .collect();
        let rows = report
            .entries
            .iter()
            .filter(|entry| !only_divergent || entry.is_divergent())
            .map(|entry| ReportRowView {
                label: format!("{} {}", entry.work, entry.section),
                cells: entry.cells.iter().map(|cell| format_cell(*cell)).collect(),
                flagged: entry.cells.iter().map(|cell| cell.is_flagged()).collect(),
            })
            .collect();

        Self {
            columns,
            rows,
            divergent_rows: report.divergent().count(),
        }
    }

    /// Plain-text table: first column left aligned, counts right aligned.
    pub fn render(&self) -> String {
        let mut widths = Vec::with_capacity(self.columns.len() + 1);
        widths.push(
            self.rows
                .iter()
                .map(|row| row.label.chars().count())
                .chain(std::iter::once(FIRST_COLUMN.len()))
                .max()
                .unwrap_or(0),
        );
        for (index, column) in self.columns.iter().enumerate() {
            widths.push(
                self.rows
                    .iter()
                    .filter_map(|row| row.cells.get(index))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(column.chars().count()))
                    .max()
                    .unwrap_or(0),
            );
        }

        let mut out = String::new();
        let header: Vec<&str> = std::iter::once(FIRST_COLUMN)
            .chain(self.columns.iter().map(String::as_str))
            .collect();
        push_line(&mut out, &header, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(
            &mut out,
            &rule.iter().map(String::as_str).collect::<Vec<_>>(),
            &widths,
        );
        for row in &self.rows {
            let line: Vec<&str> = std::iter::once(row.label.as_str())
                .chain(row.cells.iter().map(String::as_str))
                .collect();
            push_line(&mut out, &line, &widths);
        }
        out
    }
}

fn format_cell(cell: Cell) -> String {
    match cell {
        Cell::Count {
            count,
            divergent: false,
        } => format!("{count} verses"),
        Cell::Count {
            count,
            divergent: true,
        } => format!("{count} verses (!)"),
        Cell::Missing => MISSING_CELL.to_string(),
    }
}

fn push_line(out: &mut String, cells: &[&str], widths: &[usize]) {
    let mut line = String::new();
    for (index, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if index == 0 {
            line.push_str(&format!("{cell:<width$}"));
        } else {
            line.push_str(&format!("  {cell:>width$}"));
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}
