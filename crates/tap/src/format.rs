//! Printed forms — the textual rendering of every value kind, shared by
//! the `print` primitive and the CLI's final-value report.

use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::expr::{Expr, ExprKind, StrFlag};
use crate::types_registry::TypeRegistry;

/// Renders `expr` the way the CLI and `print` show it: tag-bracketed
/// placeholders for non-lexical values, decimal numbers, literal strings,
/// the default date format, and `::name` for types.
#[must_use]
pub fn printed_form(expr: &Expr, registry: &TypeRegistry) -> String {
    match &expr.kind {
        ExprKind::Nil => "[nil]".to_string(),
        ExprKind::Container(..) => "[expression]".to_string(),
        ExprKind::Lazy(_) => "[lazy expression]".to_string(),
        ExprKind::Int(n) => n.to_string(),
        ExprKind::Float(f) => format!("{f:.6}"),
        ExprKind::Str(s, StrFlag::Literal | StrFlag::VarRef) => s.clone(),
        ExprKind::Array(_) => "[array]".to_string(),
        ExprKind::Date(secs) => format_date(*secs, "%M/%D/%Y %H:%U:%S %P").unwrap_or_else(|| "[nil]".to_string()),
        ExprKind::Object(_) => "[object]".to_string(),
        ExprKind::Function(_) => "[function]".to_string(),
        ExprKind::Type(tag) => format!("::{}", type_name(*tag, registry)),
    }
}

const INTRINSIC_TYPE_NAMES: [&str; 12] = [
    "unknown",
    "nil",
    "expression",
    "lazy expression",
    "integer",
    "float",
    "string",
    "array",
    "date",
    "object",
    "function",
    "type",
];

/// Resolves a type tag's printable name: intrinsic tags use the fixed
/// table above, composite tags are looked up in the registry.
#[must_use]
pub fn type_name(tag: crate::types_registry::TypeTag, registry: &TypeRegistry) -> String {
    if let Some(name) = INTRINSIC_TYPE_NAMES.get(tag.0 as usize) {
        return (*name).to_string();
    }
    registry.get(tag).map_or_else(|| "unknown".to_string(), |t| t.name.clone())
}

/// Interprets the Tap date-format mini-language: `%`-prefixed codes for
/// month/day/year/weekday/hour/minute/second/AM-PM/day-of-year/
/// week-of-year, plus `%%`. An unrecognized code aborts the whole format
/// and yields `None` rather than a partially-rendered string.
#[must_use]
pub fn format_date(epoch_seconds: i64, fmt: &str) -> Option<String> {
    let dt: DateTime<Utc> = DateTime::from_timestamp(epoch_seconds, 0)?;
    let mut out = String::new();
    let mut chars = fmt.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let code = chars.next()?;
        match code {
            '%' => out.push('%'),
            'M' => out.push_str(&format!("{:02}", dt.month())),
            'n' => out.push_str(&dt.month().to_string()),
            'B' => out.push_str(long_month_name(dt.month())),
            'b' => out.push_str(short_month_name(dt.month())),
            'D' => out.push_str(&format!("{:02}", dt.day())),
            'd' => out.push_str(&dt.day().to_string()),
            'A' => out.push_str(long_weekday_name(dt.weekday())),
            'a' => out.push_str(short_weekday_name(dt.weekday())),
            'Y' => out.push_str(&dt.year().to_string()),
            'y' => out.push_str(&format!("{:02}", dt.year().rem_euclid(100))),
            'H' => out.push_str(&format!("{:02}", twelve_hour(dt.hour()))),
            'h' => out.push_str(&format!("{:02}", dt.hour())),
            'U' => out.push_str(&format!("{:02}", dt.minute())),
            'S' => out.push_str(&format!("{:02}", dt.second())),
            'P' => out.push_str(if dt.hour() < 12 { "AM" } else { "PM" }),
            'j' => out.push_str(&dt.ordinal().to_string()),
            'w' => out.push_str(&iso_week(dt).to_string()),
            _ => return None,
        }
    }
    Some(out)
}

fn twelve_hour(hour24: u32) -> u32 {
    match hour24 % 12 {
        0 => 12,
        h => h,
    }
}

fn iso_week(dt: DateTime<Utc>) -> u32 {
    dt.iso_week().week()
}

fn long_month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January", "February", "March", "April", "May", "June", "July", "August", "September", "October",
        "November", "December",
    ];
    NAMES[(month.saturating_sub(1) % 12) as usize]
}

fn short_month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] =
        ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];
    NAMES[(month.saturating_sub(1) % 12) as usize]
}

fn long_weekday_name(weekday: chrono::Weekday) -> &'static str {
    use chrono::Weekday::{Fri, Mon, Sat, Sun, Thu, Tue, Wed};
    match weekday {
        Mon => "Monday",
        Tue => "Tuesday",
        Wed => "Wednesday",
        Thu => "Thursday",
        Fri => "Friday",
        Sat => "Saturday",
        Sun => "Sunday",
    }
}

fn short_weekday_name(weekday: chrono::Weekday) -> &'static str {
    use chrono::Weekday::{Fri, Mon, Sat, Sun, Thu, Tue, Wed};
    match weekday {
        Mon => "Mon",
        Tue => "Tue",
        Wed => "Wed",
        Thu => "Thu",
        Fri => "Fri",
        Sat => "Sat",
        Sun => "Sun",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nil_prints_bracketed() {
        let registry = TypeRegistry::new();
        assert_eq!(printed_form(&Expr::nil(), &registry), "[nil]");
    }

    #[test]
    fn integer_prints_decimal() {
        let registry = TypeRegistry::new();
        assert_eq!(printed_form(&Expr::int(42), &registry), "42");
    }

    #[test]
    fn unknown_format_code_aborts() {
        assert_eq!(format_date(0, "%Q"), None);
    }

    #[test]
    fn percent_literal_escapes() {
        assert_eq!(format_date(0, "100%%"), Some("100%".to_string()));
    }
}
