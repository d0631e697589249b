//! Console table rendering
//!
//! Draws the cookie grid shown on the terminal and embedded in text reports.

use crate::reporting::{CookieReport, ReportSummary};
use crate::scanner::Severity;

/// Title printed above the console table
pub const TITLE: &str = "Cookie Security Analysis Results";

const HEADERS: [&str; 8] = [
    "Cookie Name",
    "Value",
    "HttpOnly",
    "Secure",
    "SameSite",
    "Path",
    "Expires",
    "Warnings",
];

const MAX_CELL_CHARS: usize = 20;

/// Render cookies as a bordered grid
pub fn render(cookies: &[CookieReport]) -> String {
    let rows: Vec<[String; 8]> = cookies.iter().map(row).collect();

    let mut widths = HEADERS.map(display_width);
    for r in &rows {
        for (i, cell) in r.iter().enumerate() {
            for line in cell.lines() {
                widths[i] = widths[i].max(display_width(line));
            }
        }
    }

    let mut out = String::new();
    out.push_str(&border(&widths, '-'));
    out.push_str(&line(&widths, &HEADERS.map(String::from)));
    out.push_str(&border(&widths, '='));
    for r in &rows {
        out.push_str(&line(&widths, r));
        out.push_str(&border(&widths, '-'));
    }

    // Drop the trailing newline so callers control spacing
    out.pop();
    out
}

/// Non-zero severity counts, most severe first
pub fn render_summary(summary: &ReportSummary) -> Vec<String> {
    Severity::all()
        .into_iter()
        .filter(|s| summary.count(*s) > 0)
        .map(|s| format!("{} {}: {} issues", s.icon(), s.name(), summary.count(s)))
        .collect()
}

fn row(cookie: &CookieReport) -> [String; 8] {
    let warnings = if cookie.warnings.is_empty() {
        "No warnings".to_string()
    } else {
        cookie
            .warnings
            .iter()
            .map(|w| w.message.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    };

    [
        cookie.name.clone(),
        truncate(&cookie.value),
        flag(cookie.httponly).to_string(),
        flag(cookie.secure).to_string(),
        title_case(&cookie.samesite),
        cookie.path.clone(),
        truncate(&cookie.expires),
        warnings,
    ]
}

fn flag(set: bool) -> &'static str {
    if set {
        "✅"
    } else {
        "❌"
    }
}

/// Keep the first 20 characters, marking anything cut
pub fn truncate(value: &str) -> String {
    if value.chars().count() > MAX_CELL_CHARS {
        let head: String = value.chars().take(MAX_CELL_CHARS).collect();
        format!("{}...", head)
    } else {
        value.to_string()
    }
}

/// Uppercase the first letter of each alphabetic run, lowercase the rest
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_alpha = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Approximate terminal column width; emoji occupy two columns.
fn display_width(s: &str) -> usize {
    s.chars()
        .map(|c| match c {
            '\u{FE0F}' | '\u{200D}' => 0,
            '\u{2600}'..='\u{27BF}' | '\u{1F300}'..='\u{1FAFF}' => 2,
            _ => 1,
        })
        .sum()
}

fn border(widths: &[usize; 8], fill: char) -> String {
    let mut out = String::from("+");
    for w in widths {
        out.extend(std::iter::repeat(fill).take(w + 2));
        out.push('+');
    }
    out.push('\n');
    out
}

fn line(widths: &[usize; 8], cells: &[String; 8]) -> String {
    let height = cells.iter().map(|c| c.lines().count().max(1)).max().unwrap_or(1);

    let mut out = String::new();
    for i in 0..height {
        out.push('|');
        for (cell, w) in cells.iter().zip(widths) {
            let text = cell.lines().nth(i).unwrap_or("");
            out.push(' ');
            out.push_str(text);
            out.extend(std::iter::repeat(' ').take(w - display_width(text)));
            out.push_str(" |");
        }
        out.push('\n');
    }
    out
}
