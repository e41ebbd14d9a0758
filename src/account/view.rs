//! Derived statement views
//!
//! Everything here is recomputed from the full fetched list on every call.
//! The server returns transactions oldest first; views present them newest
//! first.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use super::types::{Transaction, TransactionType};

/// Entries shown on the recent activity card.
pub const RECENT_ACTIVITY_LEN: usize = 5;

/// Shown when a transaction has no description and no counterparty.
pub const GENERIC_DESCRIPTION: &str = "Account movement";

/// User-adjustable statement constraints. Never sent to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub kind: Option<TransactionType>,
}

impl FilterState {
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none() && self.kind.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// All three predicates must hold; an unset one always holds.
    pub fn matches(&self, tx: &Transaction) -> bool {
        let date = transaction_date(tx);
        let after_start = self.start_date.map_or(true, |start| date >= start);
        let before_end = self.end_date.map_or(true, |end| date <= end);
        let same_kind = self.kind.map_or(true, |kind| tx.kind == kind);
        after_start && before_end && same_kind
    }
}

/// Calendar date of a transaction (UTC), time of day dropped.
pub fn transaction_date(tx: &Transaction) -> NaiveDate {
    tx.created_at.date_naive()
}

/// Full statement: newest first, filtered.
pub fn visible_transactions<'a>(txs: &'a [Transaction], filters: &FilterState) -> Vec<&'a Transaction> {
    txs.iter().rev().filter(|tx| filters.matches(tx)).collect()
}

/// The last [`RECENT_ACTIVITY_LEN`] transactions, newest first, unfiltered.
pub fn recent_activity(txs: &[Transaction]) -> Vec<&Transaction> {
    let start = txs.len().saturating_sub(RECENT_ACTIVITY_LEN);
    txs[start..].iter().rev().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    pub fn sign(&self) -> char {
        match self {
            Direction::Incoming => '+',
            Direction::Outgoing => '-',
        }
    }
}

/// Only deposits and received transfers count as incoming. Reversals are
/// rendered as outgoing even though they restore funds; this mirrors what
/// the service's web client shows and is kept until the service clarifies
/// the semantics.
pub fn direction(kind: TransactionType) -> Direction {
    match kind {
        TransactionType::Deposit | TransactionType::TransferIn => Direction::Incoming,
        TransactionType::TransferOut | TransactionType::Reversal => Direction::Outgoing,
    }
}

pub fn signed_value(tx: &Transaction) -> Decimal {
    match direction(tx.kind) {
        Direction::Incoming => tx.value,
        Direction::Outgoing => -tx.value,
    }
}

pub fn describe(tx: &Transaction) -> String {
    if let Some(desc) = non_blank(&tx.description) {
        return desc.to_string();
    }
    match tx.kind {
        TransactionType::TransferOut => {
            if let Some(name) = non_blank(&tx.destination_name) {
                return format!("To {}", name);
            }
        }
        TransactionType::TransferIn => {
            if let Some(name) = non_blank(&tx.origin_name) {
                return format!("From {}", name);
            }
        }
        _ => {}
    }
    GENERIC_DESCRIPTION.to_string()
}

/// Admins may reverse outgoing transfers only.
pub fn is_reversible(tx: &Transaction) -> bool {
    tx.kind == TransactionType::TransferOut
}

fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
