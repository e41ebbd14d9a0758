// HTTP client for the banking API
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::account::types::{
    AccountId, AccountSnapshot, AdminAccount, DepositRequest, LoginRequest, RegisterRequest,
    TokenPair, Transaction, TransactionId, TransferRequest,
};
use crate::config::ApiConfig;
use crate::error::{ApiErrorBody, ClientError};
use crate::session::SessionContext;

pub const INVALID_CREDENTIALS: &str = "Invalid email or password.";

/// Protected operations of the banking API.
///
/// Every call is a single request/response; nothing is retried. Mutations
/// return nothing useful on purpose: callers re-fetch the snapshot and
/// statement to see the effect.
#[async_trait]
pub trait AccountApi: Send + Sync {
    async fn fetch_account_snapshot(&self) -> Result<AccountSnapshot, ClientError>;
    async fn fetch_statement(&self) -> Result<Vec<Transaction>, ClientError>;
    async fn deposit(&self, req: &DepositRequest) -> Result<(), ClientError>;
    async fn transfer(&self, req: &TransferRequest) -> Result<(), ClientError>;
    async fn fetch_all_users(&self) -> Result<Vec<AdminAccount>, ClientError>;
    async fn fetch_user_statement(&self, account_id: AccountId) -> Result<Vec<Transaction>, ClientError>;
    async fn reverse_transaction(&self, transaction_id: TransactionId) -> Result<(), ClientError>;
}

pub struct BankClient {
    base_url: String,
    paths: ApiConfig,
    client: Client,
    session: Arc<SessionContext>,
}

impl BankClient {
    pub fn new(api: ApiConfig, session: Arc<SessionContext>) -> Self {
        Self {
            base_url: api.base_url.trim_end_matches('/').to_string(),
            paths: api,
            client: Client::new(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchanges credentials for a token pair and hands it to the session.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ClientError> {
        let body = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .post(self.url("/auth/login/"))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        debug!("POST /auth/login/ -> {}", status);

        if matches!(status, StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED) {
            return Err(ClientError::Rejected(ApiErrorBody::general(INVALID_CREDENTIALS)));
        }
        let tokens: TokenPair = read_json(check_public(response).await?).await?;
        self.session.create(tokens)
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.url("/auth/register/"))
            .json(req)
            .send()
            .await?;
        debug!("POST /auth/register/ -> {}", response.status());
        check_public(response).await?;
        Ok(())
    }

    pub fn logout(&self) {
        self.session.destroy();
    }

    async fn send_authorized(&self, method: &str, path: &str, request: RequestBuilder) -> Result<Response, ClientError> {
        let token = match self.session.access_token() {
            Some(t) => t,
            None => {
                self.session.destroy();
                return Err(ClientError::Unauthorized);
            }
        };
        let response = request.bearer_auth(token).send().await?;
        let status = response.status();
        debug!("{} {} -> {}", method, path, status);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!("{} {} was refused ({}); ending session", method, path, status);
            self.session.destroy();
            return Err(ClientError::Unauthorized);
        }
        check_public(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let request = self.client.get(self.url(path));
        let response = self.send_authorized("GET", path, request).await?;
        read_json(response).await
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ClientError> {
        let request = self.client.post(self.url(path)).json(body);
        self.send_authorized("POST", path, request).await?;
        Ok(())
    }
}

#[async_trait]
impl AccountApi for BankClient {
    async fn fetch_account_snapshot(&self) -> Result<AccountSnapshot, ClientError> {
        self.get_json("/account/balance/").await
    }

    async fn fetch_statement(&self) -> Result<Vec<Transaction>, ClientError> {
        self.get_json("/account/statement/").await
    }

    async fn deposit(&self, req: &DepositRequest) -> Result<(), ClientError> {
        self.post_json("/account/deposit/", req).await
    }

    async fn transfer(&self, req: &TransferRequest) -> Result<(), ClientError> {
        self.post_json("/account/transfer/", req).await
    }

    async fn fetch_all_users(&self) -> Result<Vec<AdminAccount>, ClientError> {
        let path = self.paths.admin_users_path.clone();
        self.get_json(&path).await
    }

    async fn fetch_user_statement(&self, account_id: AccountId) -> Result<Vec<Transaction>, ClientError> {
        let path = self.paths.admin_statement_path_for(account_id);
        self.get_json(&path).await
    }

    async fn reverse_transaction(&self, transaction_id: TransactionId) -> Result<(), ClientError> {
        let path = self.paths.admin_reverse_path_for(transaction_id);
        self.post_json(&path, &json!({})).await
    }
}

/// Turns a non-success status into an error, normalizing the payload.
async fn check_public(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let bytes = response.bytes().await.unwrap_or_default();
    let payload: serde_json::Value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    let body = ApiErrorBody::from_payload(&payload);

    if status.is_client_error() {
        return Err(ClientError::Rejected(body));
    }
    match body.general_error {
        Some(msg) => Err(ClientError::Network(format!("server answered {}: {}", status, msg))),
        None => Err(ClientError::Network(format!("server answered {}", status))),
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(format!("Failed to parse response: {}", e)))
}
