//! In-process stand-in for the banking API, used by tests.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use crate::account::types::{AdminAccount, Role, Transaction, TransactionType, UserProfile};

pub const USER_EMAIL: &str = "joao@email.com";
pub const USER_PASSWORD: &str = "user123";
pub const USER_TOKEN: &str = "tok-joao";
pub const ADMIN_EMAIL: &str = "admin@sulivam.com";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const ADMIN_TOKEN: &str = "tok-admin";
pub const INSUFFICIENT_FUNDS: &str = "Saldo insuficiente.";

pub type Shared = Arc<Mutex<MockBank>>;

type Reply = (StatusCode, Json<Value>);

pub struct MockBank {
    pub balance: Decimal,
    pub transactions: Vec<Transaction>,
    pub accounts: Vec<AdminAccount>,
    pub account_statements: HashMap<u64, Vec<Transaction>>,
    /// `"METHOD path"` of every request received, in order.
    pub hits: Vec<String>,
    pub revoke_tokens: bool,
    pub break_statement: bool,
    /// Answer admins with 403 on the balance endpoint, as the real service does.
    pub refuse_admin_balance: bool,
    /// Body of a 400 reply to every registration.
    pub register_rejection: Option<Value>,
    next_id: u64,
}

impl Default for MockBank {
    fn default() -> Self {
        Self {
            balance: Decimal::new(300, 0),
            transactions: Vec::new(),
            accounts: Vec::new(),
            account_statements: HashMap::new(),
            hits: Vec::new(),
            revoke_tokens: false,
            break_statement: false,
            refuse_admin_balance: false,
            register_rejection: None,
            next_id: 100,
        }
    }
}

pub fn transaction(id: u64, kind: TransactionType, value: i64, balance_after: i64) -> Transaction {
    Transaction {
        id,
        kind,
        value: Decimal::new(value, 0),
        balance_after: Decimal::new(balance_after, 0),
        created_at: Utc::now(),
        description: None,
        destination_name: None,
        origin_name: None,
    }
}

impl MockBank {
    /// Balance 70 after a deposit of 100 and a transfer of 30 to Ana.
    pub fn with_history() -> Self {
        let mut sent = transaction(2, TransactionType::TransferOut, 30, 70);
        sent.destination_name = Some("Ana".to_string());
        Self {
            balance: Decimal::new(70, 0),
            transactions: vec![transaction(1, TransactionType::Deposit, 100, 100), sent],
            ..Self::default()
        }
    }

    /// Adds Maria's account (id 7) with one outgoing transfer (id 71).
    pub fn with_managed_account() -> Self {
        let mut bank = Self::with_history();
        let maria = UserProfile {
            full_name: "Maria Souza".to_string(),
            email: "maria@email.com".to_string(),
            role: Role::User,
        };
        bank.accounts.push(AdminAccount {
            id: 7,
            user: maria,
            balance: Decimal::new(200, 0),
        });
        let mut sent = transaction(71, TransactionType::TransferOut, 50, 200);
        sent.destination_name = Some("João Silva".to_string());
        bank.account_statements.insert(
            7,
            vec![transaction(70, TransactionType::Deposit, 250, 250), sent],
        );
        bank
    }

    fn hit(&mut self, what: String) {
        self.hits.push(what);
    }

    fn caller(&self, headers: &HeaderMap) -> Option<Role> {
        if self.revoke_tokens {
            return None;
        }
        let value = headers.get("authorization")?.to_str().ok()?;
        match value.strip_prefix("Bearer ")? {
            USER_TOKEN => Some(Role::User),
            ADMIN_TOKEN => Some(Role::Admin),
            _ => None,
        }
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

pub async fn spawn(bank: MockBank) -> (String, Shared) {
    let state: Shared = Arc::new(Mutex::new(bank));
    let app = Router::new()
        .route("/auth/login/", post(login))
        .route("/auth/register/", post(register))
        .route("/account/balance/", get(balance))
        .route("/account/statement/", get(statement))
        .route("/account/deposit/", post(deposit))
        .route("/account/transfer/", post(transfer))
        .route("/account/admin/users/", get(admin_users))
        .route("/account/admin/users/:id/statement/", get(admin_statement))
        .route("/account/admin/transactions/:id/reverse/", post(admin_reverse))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), state)
}

fn unauthorized() -> Reply {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Given token not valid for any token type"})),
    )
}

fn forbidden() -> Reply {
    (
        StatusCode::FORBIDDEN,
        Json(json!({"detail": "Você não tem permissão para executar essa ação."})),
    )
}

fn amount(body: &Value) -> Option<Decimal> {
    match body.get("value")? {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut bank = state.lock().unwrap();
    bank.hit("POST /auth/login/".to_string());
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let token = match (email, password) {
        (USER_EMAIL, USER_PASSWORD) => USER_TOKEN,
        (ADMIN_EMAIL, ADMIN_PASSWORD) => ADMIN_TOKEN,
        _ => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "No active account found with the given credentials"})),
            )
        }
    };
    (StatusCode::OK, Json(json!({"access": token, "refresh": "refresh-token"})))
}

async fn register(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut bank = state.lock().unwrap();
    bank.hit("POST /auth/register/".to_string());
    if let Some(reply) = bank.register_rejection.clone() {
        return (StatusCode::BAD_REQUEST, Json(reply));
    }
    if body["email"] == USER_EMAIL || body["email"] == ADMIN_EMAIL {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"email": ["E-mail já cadastrado"]})),
        );
    }
    (StatusCode::CREATED, Json(body))
}

async fn balance(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let mut bank = state.lock().unwrap();
    bank.hit("GET /account/balance/".to_string());
    let role = match bank.caller(&headers) {
        Some(role) => role,
        None => return unauthorized(),
    };
    if role == Role::Admin && bank.refuse_admin_balance {
        return forbidden();
    }
    let (full_name, email) = match role {
        Role::User => ("João Silva", USER_EMAIL),
        Role::Admin => ("Admin Sulivam", ADMIN_EMAIL),
    };
    (
        StatusCode::OK,
        Json(json!({
            "id": 1,
            "balance": bank.balance.to_string(),
            "status": "ativo",
            "user": {"id": 1, "full_name": full_name, "email": email, "role": role.as_str()}
        })),
    )
}

async fn statement(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let mut bank = state.lock().unwrap();
    bank.hit("GET /account/statement/".to_string());
    if bank.caller(&headers).is_none() {
        return unauthorized();
    }
    if bank.break_statement {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!("Server Error (500)")));
    }
    (StatusCode::OK, Json(json!(bank.transactions)))
}

async fn deposit(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    let mut bank = state.lock().unwrap();
    bank.hit("POST /account/deposit/".to_string());
    if bank.caller(&headers).is_none() {
        return unauthorized();
    }
    let value = match amount(&body) {
        Some(v) => v,
        None => return (StatusCode::BAD_REQUEST, Json(json!({"value": ["Um número válido é necessário."]}))),
    };
    if value > Decimal::new(10_000, 0) {
        return (StatusCode::BAD_REQUEST, Json(json!({"value": "too large"})));
    }
    bank.balance += value;
    let id = bank.next_id();
    let mut tx = transaction(id, TransactionType::Deposit, 0, 0);
    tx.value = value;
    tx.balance_after = bank.balance;
    bank.transactions.push(tx);
    (StatusCode::CREATED, Json(json!({"balance": bank.balance.to_string()})))
}

async fn transfer(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Reply {
    let mut bank = state.lock().unwrap();
    bank.hit("POST /account/transfer/".to_string());
    if bank.caller(&headers).is_none() {
        return unauthorized();
    }
    let value = amount(&body).unwrap_or_default();
    if value > bank.balance {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"non_field_errors": [INSUFFICIENT_FUNDS]})),
        );
    }
    bank.balance -= value;
    let id = bank.next_id();
    let mut tx = transaction(id, TransactionType::TransferOut, 0, 0);
    tx.value = value;
    tx.balance_after = bank.balance;
    tx.destination_name = body["identifier"].as_str().map(str::to_string);
    tx.description = body["description"].as_str().filter(|d| !d.is_empty()).map(str::to_string);
    bank.transactions.push(tx);
    (StatusCode::CREATED, Json(json!({"detail": "ok"})))
}

async fn admin_users(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    let mut bank = state.lock().unwrap();
    bank.hit("GET /account/admin/users/".to_string());
    match bank.caller(&headers) {
        Some(Role::Admin) => (StatusCode::OK, Json(json!(bank.accounts))),
        Some(Role::User) => forbidden(),
        None => unauthorized(),
    }
}

async fn admin_statement(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<u64>) -> Reply {
    let mut bank = state.lock().unwrap();
    bank.hit(format!("GET /account/admin/users/{}/statement/", id));
    match bank.caller(&headers) {
        Some(Role::Admin) => {}
        Some(Role::User) => return forbidden(),
        None => return unauthorized(),
    }
    match bank.account_statements.get(&id) {
        Some(txs) => (StatusCode::OK, Json(json!(txs))),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Conta não encontrada."}))),
    }
}

async fn admin_reverse(State(state): State<Shared>, headers: HeaderMap, Path(id): Path<u64>) -> Reply {
    let mut bank = state.lock().unwrap();
    bank.hit(format!("POST /account/admin/transactions/{}/reverse/", id));
    match bank.caller(&headers) {
        Some(Role::Admin) => {}
        Some(Role::User) => return forbidden(),
        None => return unauthorized(),
    }
    let found = bank.account_statements.iter().find_map(|(account, txs)| {
        txs.iter()
            .find(|t| t.id == id && t.kind == TransactionType::TransferOut)
            .map(|t| (*account, t.value))
    });
    let (account, value) = match found {
        Some(hit) => hit,
        None => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"detail": "Transação não pode ser estornada."})),
            )
        }
    };
    let reversal_id = bank.next_id();
    let mut new_balance = Decimal::ZERO;
    if let Some(row) = bank.accounts.iter_mut().find(|a| a.id == account) {
        row.balance += value;
        new_balance = row.balance;
    }
    let mut reversal = transaction(reversal_id, TransactionType::Reversal, 0, 0);
    reversal.value = value;
    reversal.balance_after = new_balance;
    if let Some(txs) = bank.account_statements.get_mut(&account) {
        txs.push(reversal);
    }
    (StatusCode::OK, Json(json!({"detail": "Estorno realizado."})))
}
