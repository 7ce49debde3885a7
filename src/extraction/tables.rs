//! Table detection over extracted page text.
//!
//! PDF text extraction loses cell geometry, but column gaps survive as tabs
//! or runs of spaces. A table is a maximal run of at least two consecutive
//! lines that each split into two or more cells.

use crate::types::{Table, TableRow};

const MIN_ROWS: usize = 2;
const MIN_CELLS: usize = 2;

/// Split a line into cells on tabs or runs of two or more spaces.
pub fn split_cells(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut spaces = 0usize;

    for ch in line.trim().chars() {
        match ch {
            '\t' => {
                if !current.is_empty() {
                    cells.push(std::mem::take(&mut current));
                }
                spaces = 0;
            }
            ' ' => spaces += 1,
            _ => {
                if spaces >= 2 && !current.is_empty() {
                    cells.push(std::mem::take(&mut current));
                } else if spaces == 1 && !current.is_empty() {
                    current.push(' ');
                }
                spaces = 0;
                current.push(ch);
            }
        }
    }
    if !current.is_empty() {
        cells.push(current);
    }

    cells
}

/// Find tables in `text`. Rows are padded with `None` to the widest row.
pub fn detect_tables(text: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut run: Vec<Vec<String>> = Vec::new();

    for line in text.lines() {
        let cells = split_cells(line);
        if cells.len() >= MIN_CELLS {
            run.push(cells);
        } else {
            flush(&mut run, &mut tables);
        }
    }
    flush(&mut run, &mut tables);

    tables
}

fn flush(run: &mut Vec<Vec<String>>, tables: &mut Vec<Table>) {
    if run.len() >= MIN_ROWS {
        let width = run.iter().map(Vec::len).max().unwrap_or(0);
        let table = run
            .drain(..)
            .map(|cells| {
                let mut row: TableRow = cells.into_iter().map(Some).collect();
                row.resize(width, None);
                row
            })
            .collect();
        tables.push(table);
    }
    run.clear();
}
