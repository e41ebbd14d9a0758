//! Wire types for the banking API

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type AccountId = u64;
pub type TransactionId = u64;

/// Access profile of the logged-in user
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserProfile {
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
}

/// Balance plus owner profile, replaced wholesale on every fetch
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AccountSnapshot {
    pub balance: Decimal,
    pub user: UserProfile,
}

impl AccountSnapshot {
    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionType {
    #[serde(rename = "depósito")]
    Deposit,
    #[serde(rename = "envio")]
    TransferOut,
    #[serde(rename = "recebimento")]
    TransferIn,
    #[serde(rename = "estorno")]
    Reversal,
}

impl TransactionType {
    pub const ALL: [TransactionType; 4] = [
        TransactionType::Deposit,
        TransactionType::TransferOut,
        TransactionType::TransferIn,
        TransactionType::Reversal,
    ];

    /// Name as it appears on the wire.
    pub fn wire_name(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "depósito",
            TransactionType::TransferOut => "envio",
            TransactionType::TransferIn => "recebimento",
            TransactionType::Reversal => "estorno",
        }
    }

    /// Badge text for tables
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "Deposit",
            TransactionType::TransferOut => "Sent",
            TransactionType::TransferIn => "Received",
            TransactionType::Reversal => "Reversal",
        }
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    /// Accepts wire names (with or without the accent) and English labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "depósito" | "deposito" | "deposit" => Ok(TransactionType::Deposit),
            "envio" | "sent" | "send" => Ok(TransactionType::TransferOut),
            "recebimento" | "received" | "receive" => Ok(TransactionType::TransferIn),
            "estorno" | "reversal" => Ok(TransactionType::Reversal),
            other => Err(format!(
                "unknown transaction type '{}' (expected depósito, envio, recebimento or estorno)",
                other
            )),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Transaction {
    pub id: TransactionId,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub value: Decimal,
    pub balance_after: Decimal,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub destination_name: Option<String>,
    #[serde(default)]
    pub origin_name: Option<String>,
}

/// One row of the admin management list
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AdminAccount {
    pub id: AccountId,
    pub user: UserProfile,
    pub balance: Decimal,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct RegisterRequest {
    pub full_name: String,
    pub cpf: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DepositRequest {
    pub value: Decimal,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct TransferRequest {
    pub identifier: String,
    pub value: Decimal,
    pub description: String,
}
