// Terminal rendering of dashboard state. Pure: every function returns the
// text and the caller decides where it goes.
use std::fmt::Write;

use crate::account::types::{AccountSnapshot, AdminAccount, Role, Transaction};
use crate::account::view::{self, FilterState};
use crate::dashboard::SelectedAccount;
use crate::format::{format_brl, format_short_date, format_timestamp};

const RULE: &str = "----------------------------------------------------------------------------";

pub fn balance_card(snapshot: &AccountSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Hello, {}!", snapshot.user.full_name);
    let subtitle = match snapshot.user.role {
        Role::Admin => "Management panel: monitor users and reverse transactions.",
        Role::User => "Manage your balance and follow your statement.",
    };
    let _ = writeln!(out, "{}", subtitle);
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Balance: {}", format_brl(snapshot.balance));
    let badge = match snapshot.user.role {
        Role::Admin => "Administrator",
        Role::User => "Active account",
    };
    let _ = writeln!(out, "[{}]", badge);
    out
}

fn signed_amount(tx: &Transaction) -> String {
    let dir = view::direction(tx.kind);
    format!("{} {}", dir.sign(), format_brl(tx.value))
}

pub fn recent_activity(txs: &[&Transaction]) -> String {
    let mut out = String::from("Recent activity\n");
    if txs.is_empty() {
        out.push_str("No activity yet.\n");
        return out;
    }
    for tx in txs {
        let _ = writeln!(
            out,
            "  {:<10} {:<6} {:>18}",
            tx.kind.label(),
            format_short_date(&tx.created_at),
            signed_amount(tx)
        );
    }
    out
}

pub fn filter_summary(filters: &FilterState) -> String {
    if filters.is_empty() {
        return "Filters: none".to_string();
    }
    let mut parts = Vec::new();
    if let Some(start) = filters.start_date {
        parts.push(format!("from {}", start.format("%d/%m/%Y")));
    }
    if let Some(end) = filters.end_date {
        parts.push(format!("until {}", end.format("%d/%m/%Y")));
    }
    if let Some(kind) = filters.kind {
        parts.push(format!("type {}", kind.wire_name()));
    }
    format!("Filters: {}", parts.join(", "))
}

pub fn statement(txs: &[&Transaction]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<20} {:<10} {:<24} {:>16} {:>16}",
        "Date", "Type", "Details", "Value", "Balance"
    );
    let _ = writeln!(out, "{}", RULE);
    if txs.is_empty() {
        out.push_str("No transactions match.\n");
        return out;
    }
    for tx in txs {
        let _ = writeln!(
            out,
            "{:<20} {:<10} {:<24} {:>16} {:>16}",
            format_timestamp(&tx.created_at),
            tx.kind.label(),
            truncate(&view::describe(tx), 24),
            signed_amount(tx),
            format_brl(tx.balance_after)
        );
    }
    out
}

pub fn users(users: &[AdminAccount]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>6}  {:<24} {:<28} {:>14}", "Id", "Name", "E-mail", "Balance");
    let _ = writeln!(out, "{}", RULE);
    if users.is_empty() {
        out.push_str("No user accounts.\n");
        return out;
    }
    for account in users {
        let _ = writeln!(
            out,
            "{:>6}  {:<24} {:<28} {:>14}",
            account.id,
            truncate(&account.user.full_name, 24),
            truncate(&account.user.email, 28),
            format_brl(account.balance)
        );
    }
    out
}

/// Statement of a managed account; outgoing transfers carry their id so
/// they can be reversed.
pub fn managed_statement(selected: &SelectedAccount) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Statement: {}", selected.account.user.full_name);
    let _ = writeln!(out, "{:<20} {:<10} {:>16}  {}", "Date", "Type", "Value", "Action");
    let _ = writeln!(out, "{}", RULE);
    let rows = selected.newest_first();
    if rows.is_empty() {
        out.push_str("No transactions.\n");
        return out;
    }
    for tx in rows {
        let action = if view::is_reversible(tx) {
            format!("reverse #{}", tx.id)
        } else {
            String::new()
        };
        let _ = writeln!(
            out,
            "{:<20} {:<10} {:>16}  {}",
            format_timestamp(&tx.created_at),
            tx.kind.label(),
            signed_amount(tx),
            action
        );
    }
    out
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}
