//! HTML parsing for economic-calendar release-history tables.

use impact_core::{ImpactError, ReleaseRow, Result};
use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

lazy_static! {
    // Reference period inside parentheses, e.g. "Aug 12, 2025  (Jul)" -> "Jul"
    static ref REFERENCE_REGEX: Regex = Regex::new(r"\(([^)]+)\)").unwrap();
}

/// Extract the reference period from a release-date cell.
///
/// Returns an empty string when no parenthetical annotation is present.
#[must_use]
pub fn extract_reference_period(release_date_text: &str) -> String {
    REFERENCE_REGEX
        .captures(release_date_text)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Parse a release-history table out of an HTML document.
///
/// Looks for `table#eventHistoryTable<table_id>`; within it, each `<tr>`
/// yields one [`ReleaseRow`] from cells `[0]`=release date, `[1]`=time
/// (unused), `[2]`=actual, `[3]`=forecast, `[4]`=previous. Rows without a
/// reported actual value are upcoming releases and are skipped, as are rows
/// with too few cells. Non-breaking-space cells count as blank.
///
/// Rows are returned in table order, newest first.
pub fn parse_history_table(html: &str, table_id: &str) -> Result<Vec<ReleaseRow>> {
    let document = Html::parse_document(html);

    let table_selector = Selector::parse(&format!("table#eventHistoryTable{table_id}"))
        .map_err(|e| ImpactError::Parse(format!("Invalid table selector: {e:?}")))?;
    let row_selector = Selector::parse("tr")
        .map_err(|e| ImpactError::Parse(format!("Invalid row selector: {e:?}")))?;
    let cell_selector = Selector::parse("td")
        .map_err(|e| ImpactError::Parse(format!("Invalid cell selector: {e:?}")))?;

    let table = document.select(&table_selector).next().ok_or_else(|| {
        ImpactError::Parse(format!(
            "Release table not found (eventHistoryTable{table_id})"
        ))
    })?;

    let mut rows = Vec::new();
    let mut skipped_upcoming = 0;

    for tr in table.select(&row_selector) {
        let cells: Vec<ElementRef<'_>> = tr.select(&cell_selector).collect();
        if cells.len() < 5 {
            continue;
        }

        let actual = clean_cell_text(cells[2]);
        // Upcoming releases appear with an empty or N/A actual cell.
        if actual.is_empty() || actual.eq_ignore_ascii_case("n/a") {
            skipped_upcoming += 1;
            continue;
        }

        let release_date = clean_cell_text(cells[0]);
        let forecast = clean_cell_text(cells[3]);
        let previous = clean_cell_text(cells[4]);
        let reference_period = extract_reference_period(&release_date);

        rows.push(ReleaseRow::new(
            release_date,
            reference_period,
            actual,
            forecast,
            previous,
        ));
    }

    if skipped_upcoming > 0 {
        debug!(
            table_id,
            skipped_upcoming, "Skipped rows without a reported actual value"
        );
    }

    Ok(rows)
}

/// Stripped text of a cell, with non-breaking spaces treated as blanks.
fn clean_cell_text(cell: ElementRef<'_>) -> String {
    let text = cell.text().collect::<String>();
    let trimmed = text.trim();
    if trimmed == "\u{a0}" {
        String::new()
    } else {
        trimmed.to_string()
    }
}
