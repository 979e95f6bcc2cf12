//! Table rendering of normalized chart records.

use std::fmt::Write;

use log::warn;
use unicode_width::UnicodeWidthStr;

use crate::{
    domain::{
        category::columns::{LINK, PREVIEW_URL},
        record::{ChartTable, Record, Value},
    },
    present::{error::ViewError, escape_html, pad_right},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub descending: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TableOptions {
    pub sort: Option<SortKey>,
    /// appended to the query string of header sort links
    pub query_suffix: String,
}

/// Rows in display order. Sorting never touches the `Position` cells.
pub fn display_rows<'a>(table: &'a ChartTable, options: &TableOptions) -> Vec<&'a Record> {
    let mut rows: Vec<&Record> = table.records.iter().collect();

    let Some(sort) = &options.sort else {
        return rows;
    };
    if !table.columns().contains(&sort.column.as_str()) {
        warn!(
            "ignoring sort on unknown column '{}' for {}",
            sort.column, table.category
        );
        return rows;
    }

    rows.sort_by(|a, b| {
        let (a, b) = (cell(a, &sort.column), cell(b, &sort.column));
        match (a, b, sort.descending) {
            // missing values stay at the bottom in both directions
            (Value::Missing, _, _) | (_, Value::Missing, _) => a.sort_cmp(b),
            (_, _, true) => b.sort_cmp(a),
            (_, _, false) => a.sort_cmp(b),
        }
    });
    rows
}

fn cell<'a>(record: &'a Record, column: &str) -> &'a Value {
    record.get(column).unwrap_or(&Value::Missing)
}

fn cell_text(record: &Record, column: &str) -> String {
    cell(record, column).display().unwrap_or_default()
}

/// Column-aligned plain-text table.
pub fn render_text(table: &ChartTable, options: &TableOptions) -> Result<String, ViewError> {
    if table.is_empty() {
        return Err(ViewError::EmptyResult {
            category: table.category,
        });
    }

    let rows = display_rows(table, options);
    let columns = table.columns();
    let widths: Vec<usize> = columns
        .iter()
        .map(|column| {
            rows.iter()
                .map(|r| cell_text(r, column).width())
                .chain(std::iter::once(column.width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let line = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| pad_right(c, *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    out.push_str(&line(columns.iter().map(|c| c.to_string()).collect()));
    out.push('\n');
    out.push_str(&line(widths.iter().map(|w| "-".repeat(*w)).collect()));
    out.push('\n');
    for row in rows {
        out.push_str(&line(columns.iter().map(|c| cell_text(row, c)).collect()));
        out.push('\n');
    }
    Ok(out)
}

/// `<table>` element with sortable headers.
pub fn render_html(table: &ChartTable, options: &TableOptions) -> Result<String, ViewError> {
    if table.is_empty() {
        return Err(ViewError::EmptyResult {
            category: table.category,
        });
    }

    let mut out = String::from("<table class=\"chart\">\n<thead><tr>");
    for column in table.columns() {
        let descending = matches!(
            &options.sort,
            Some(SortKey { column: c, descending: false }) if c == column
        );
        let _ = write!(
            out,
            "<th><a href=\"?category={}&amp;sort={column}&amp;desc={}{}\">{column}</a></th>",
            table.category,
            u8::from(descending),
            escape_html(&options.query_suffix),
        );
    }
    out.push_str("</tr></thead>\n<tbody>\n");

    for row in display_rows(table, options) {
        out.push_str("<tr>");
        for column in table.columns() {
            let _ = write!(out, "<td>{}</td>", html_cell(column, cell(row, column)));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n");
    Ok(out)
}

fn html_cell(column: &str, value: &Value) -> String {
    match (column, value) {
        (PREVIEW_URL, Value::Text(url)) => format!(
            "<audio controls preload=\"none\" src=\"{}\"></audio>",
            escape_html(url)
        ),
        (LINK, Value::Text(url)) if url.starts_with("http") => format!(
            "<a href=\"{0}\" target=\"_blank\">{0}</a>",
            escape_html(url)
        ),
        (_, value) => escape_html(&value.display().unwrap_or_default()),
    }
}
