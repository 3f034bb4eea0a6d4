use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::domain::entities::column::ColumnKind;

/// Reads a dot-separated field path out of a JSON record.
pub fn cell_text(record: &Value, path: &str) -> String {
    let mut current = record;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => match map.get(segment) {
                Some(value) => value,
                None => return String::new(),
            },
            Value::Array(items) => match segment.parse::<usize>().ok().and_then(|i| items.get(i)) {
                Some(value) => value,
                None => return String::new(),
            },
            _ => return String::new(),
        };
    }

    match current {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => (if *flag { "Yes" } else { "No" }).to_string(),
        other => other.to_string(),
    }
}

pub fn format_number_with_commas(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match formatted.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (idx, ch) in integer.chars().enumerate() {
        if idx > 0 && (integer.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}

pub fn format_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.format("%Y-%m-%d").to_string());
    }
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .ok()
        .map(|date| date.format("%Y-%m-%d").to_string())
}

pub fn format_status(raw: &str) -> String {
    let spaced = raw.trim().replace(['_', '-'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn format_cell_value(kind: ColumnKind, raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }
    match kind {
        ColumnKind::Money => raw
            .trim()
            .parse::<f64>()
            .map(|value| format_number_with_commas(value, 2))
            .unwrap_or_else(|_| raw.to_string()),
        ColumnKind::Number => match raw.trim().parse::<f64>() {
            Ok(value) if value.fract() == 0.0 => format_number_with_commas(value, 0),
            Ok(value) => format_number_with_commas(value, 2),
            Err(_) => raw.to_string(),
        },
        ColumnKind::Date => format_date(raw).unwrap_or_else(|| raw.to_string()),
        ColumnKind::Status => format_status(raw),
        ColumnKind::Identifier | ColumnKind::Text => raw.to_string(),
    }
}

pub fn column_alignment(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Identifier | ColumnKind::Money | ColumnKind::Number => "right",
        ColumnKind::Text | ColumnKind::Date | ColumnKind::Status => "left",
    }
}
