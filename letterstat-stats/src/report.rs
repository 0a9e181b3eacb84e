//! Report rendering

use letterstat_core::LetterStatResult;
use serde::Serialize;
use std::fmt::Write;

use crate::histogram::LetterHistogram;

/// One row of the frequency report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LetterCount {
    pub letter: char,
    pub count: u64,
}

/// Rows ordered by count descending, ties by letter ascending
pub fn render(histogram: &LetterHistogram) -> Vec<LetterCount> {
    let mut rows: Vec<LetterCount> = histogram
        .iter()
        .map(|(letter, count)| LetterCount { letter, count })
        .collect();

    rows.sort_by(|a, b| b.count.cmp(&a.count).then(a.letter.cmp(&b.letter)));
    rows
}

/// `letter: count` lines
pub fn render_text(rows: &[LetterCount]) -> String {
    rows.iter().fold(String::new(), |mut out, row| {
        let _ = writeln!(out, "{}: {}", row.letter, row.count);
        out
    })
}

pub fn render_json(rows: &[LetterCount]) -> LetterStatResult<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}
