//! Input masks, shape checks and pt-BR rendering helpers.

use chrono::{DateTime, Local, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Digits in a CPF.
pub const CPF_DIGITS: usize = 11;

lazy_static! {
    static ref EMAIL_SHAPE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// Keeps only ASCII digits, capped at [`CPF_DIGITS`].
pub fn cpf_digits(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit())
        .take(CPF_DIGITS)
        .collect()
}

/// Masks raw input as `000.000.000-00`.
///
/// Separators appear only once a digit follows them, so partial input
/// renders as typed so far (`1234` -> `123.4`). Never fails; anything
/// without digits becomes the empty string.
pub fn format_cpf(raw: &str) -> String {
    let digits = cpf_digits(raw);
    let mut out = String::with_capacity(CPF_DIGITS + 3);
    for (i, c) in digits.chars().enumerate() {
        match i {
            3 | 6 => out.push('.'),
            9 => out.push('-'),
            _ => {}
        }
        out.push(c);
    }
    out
}

pub fn is_complete_cpf(raw: &str) -> bool {
    cpf_digits(raw).len() == CPF_DIGITS
}

/// Loose `local@domain.tld` check. The server has the final word.
pub fn is_valid_email(s: &str) -> bool {
    EMAIL_SHAPE.is_match(s)
}

/// Parses a typed amount, accepting `,` or `.` as the decimal mark.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned = raw.trim().replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}

/// `1234.5` -> `1.234,50`
pub fn format_money(value: Decimal) -> String {
    let rounded = value
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded);
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if value.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{},{}", sign, grouped, frac_part)
}

/// `R$ 1.234,50`
pub fn format_brl(value: Decimal) -> String {
    format!("R$ {}", format_money(value))
}

/// Full timestamp in the viewer's local time, `dd/mm/yyyy hh:mm:ss`.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local)
        .format("%d/%m/%Y %H:%M:%S")
        .to_string()
}

/// Compact day label for the recent activity card, `dd/mm`.
pub fn format_short_date(ts: &DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%d/%m").to_string()
}
