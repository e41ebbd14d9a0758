//! View-state orchestrator
//!
//! Holds the last fetched snapshot and statement plus the user's filters.
//! Every mutation is followed by a full re-fetch; nothing is patched
//! locally. Any fetch refused for authorization ends the session.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::account::forms::{DepositForm, TransferForm};
use crate::account::types::{AccountId, AccountSnapshot, AdminAccount, Transaction, TransactionId};
use crate::account::view::{self, FilterState};
use crate::client::AccountApi;
use crate::config::LimitsConfig;
use crate::error::{ClientError, FormError, GENERIC_FAILURE};
use crate::session::{gate, Gate, SessionContext};

pub const DEPOSIT_FAILED: &str = "Could not complete the deposit.";
pub const TRANSFER_FAILED: &str = "Transfer failed.";
pub const REVERSAL_FAILED: &str = "Could not reverse the transaction.";
pub const ADMIN_ONLY: &str = "Administrator access required.";

#[derive(Debug, Clone, PartialEq)]
pub struct AccountView {
    pub snapshot: AccountSnapshot,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    Loading,
    Ready(AccountView),
    /// Session gone; the caller must show the entry view.
    Redirect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedAccount {
    pub account: AdminAccount,
    pub transactions: Vec<Transaction>,
}

impl SelectedAccount {
    /// Statement of the selected user, newest first.
    pub fn newest_first(&self) -> Vec<&Transaction> {
        self.transactions.iter().rev().collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminView {
    pub users: Vec<AdminAccount>,
    pub selected: Option<SelectedAccount>,
}

pub struct Dashboard<A: AccountApi> {
    api: A,
    session: Arc<SessionContext>,
    limits: LimitsConfig,
    state: ViewState,
    filters: FilterState,
    admin: Option<AdminView>,
    /// Set once an admin endpoint has answered for this session.
    admin_confirmed: bool,
}

impl<A: AccountApi> Dashboard<A> {
    pub fn new(api: A, session: Arc<SessionContext>, limits: LimitsConfig) -> Self {
        Self {
            api,
            session,
            limits,
            state: ViewState::Idle,
            filters: FilterState::default(),
            admin: None,
            admin_confirmed: false,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_redirect(&self) -> bool {
        self.state == ViewState::Redirect
    }

    pub fn view(&self) -> Option<&AccountView> {
        match &self.state {
            ViewState::Ready(view) => Some(view),
            _ => None,
        }
    }

    pub fn balance(&self) -> Option<Decimal> {
        self.view().map(|v| v.snapshot.balance)
    }

    pub fn is_admin(&self) -> bool {
        self.view().map_or(false, |v| v.snapshot.is_admin())
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: FilterState) {
        self.filters = filters;
    }

    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    pub fn admin(&self) -> Option<&AdminView> {
        self.admin.as_ref()
    }

    /// Entry to the protected area. Without a token nothing is fetched.
    pub async fn open(&mut self) -> &ViewState {
        if gate(&self.session) == Gate::Redirect {
            debug!("No session; redirecting to entry");
            self.redirect();
            return &self.state;
        }
        self.refresh().await
    }

    /// Fetches balance and statement together; if either fails the whole
    /// load fails and the session ends.
    pub async fn refresh(&mut self) -> &ViewState {
        self.state = ViewState::Loading;
        let api = &self.api;
        let result = tokio::try_join!(api.fetch_account_snapshot(), api.fetch_statement());
        match result {
            Ok((snapshot, transactions)) => {
                debug!("Loaded balance and {} transactions", transactions.len());
                self.state = ViewState::Ready(AccountView { snapshot, transactions });
            }
            Err(e) => {
                warn!("Dashboard load failed: {}", e);
                self.redirect();
            }
        }
        &self.state
    }

    /// Ends the session and drops all protected state.
    pub fn redirect(&mut self) {
        self.session.destroy();
        self.state = ViewState::Redirect;
        self.admin = None;
        self.admin_confirmed = false;
    }

    pub fn logout(&mut self) {
        info!("Logging out");
        self.redirect();
    }

    pub fn visible_transactions(&self) -> Vec<&Transaction> {
        match self.view() {
            Some(v) => view::visible_transactions(&v.transactions, &self.filters),
            None => Vec::new(),
        }
    }

    pub fn recent_activity(&self) -> Vec<&Transaction> {
        match self.view() {
            Some(v) => view::recent_activity(&v.transactions),
            None => Vec::new(),
        }
    }

    pub fn transfer_warning(&self, form: &TransferForm) -> Option<String> {
        self.balance().and_then(|b| form.balance_warning(b))
    }

    pub async fn deposit(&mut self, form: &DepositForm) -> Result<(), FormError> {
        let req = form.check(&self.limits)?;
        if let Err(e) = self.api.deposit(&req).await {
            return Err(self.form_error(e, &["value"], DEPOSIT_FAILED));
        }
        info!("Deposit of {} accepted", req.value);
        self.after_mutation().await
    }

    /// Guarded by the last known balance; a blocked form sends nothing.
    pub async fn transfer(&mut self, form: &TransferForm) -> Result<(), FormError> {
        let balance = match self.balance() {
            Some(b) => b,
            None => return Err(FormError::Blocked("Account data not loaded yet.".to_string())),
        };
        let req = form.check(balance)?;
        if let Err(e) = self.api.transfer(&req).await {
            return Err(self.form_error(e, &["value", "identifier"], TRANSFER_FAILED));
        }
        info!("Transfer of {} to {} accepted", req.value, req.identifier);
        self.after_mutation().await
    }

    async fn after_mutation(&mut self) -> Result<(), FormError> {
        self.refresh().await;
        if self.is_redirect() {
            Err(FormError::Redirect)
        } else {
            Ok(())
        }
    }

    /// Maps a client error to what the form shows. Authorization failures
    /// end the session; other failures leave all held state untouched.
    fn form_error(&mut self, err: ClientError, fields: &[&str], fallback: &str) -> FormError {
        match err {
            ClientError::Unauthorized => {
                self.redirect();
                FormError::Redirect
            }
            ClientError::Rejected(body) => {
                let msg = fields
                    .iter()
                    .find_map(|f| body.field(f))
                    .or(body.general_error.as_deref())
                    .unwrap_or_else(|| body.message_or(fallback));
                FormError::Rejected(msg.to_string())
            }
            ClientError::Network(e) | ClientError::Decode(e) => {
                warn!("Request failed: {}", e);
                FormError::Failed(fallback.to_string())
            }
            other => FormError::Failed(other.to_string()),
        }
    }

    fn require_admin(&self) -> Result<(), FormError> {
        if self.is_admin() || self.admin_confirmed {
            Ok(())
        } else {
            Err(FormError::Blocked(ADMIN_ONLY.to_string()))
        }
    }

    /// Opens the management view with the list of user accounts.
    pub async fn open_admin(&mut self) -> Result<&AdminView, FormError> {
        self.require_admin()?;
        self.load_users().await
    }

    /// Management view without loading the caller's own account. The
    /// users endpoint decides the role: a refusal ends the session.
    pub async fn enter_admin(&mut self) -> Result<&AdminView, FormError> {
        if gate(&self.session) == Gate::Redirect {
            debug!("No session; redirecting to entry");
            self.redirect();
            return Err(FormError::Redirect);
        }
        self.load_users().await?;
        self.admin_confirmed = true;
        Ok(self.admin.get_or_insert_with(AdminView::default))
    }

    async fn load_users(&mut self) -> Result<&AdminView, FormError> {
        let users = match self.api.fetch_all_users().await {
            Ok(users) => users,
            Err(e) => return Err(self.form_error(e, &[], GENERIC_FAILURE)),
        };
        let admin = self.admin.get_or_insert_with(AdminView::default);
        admin.users = users;
        Ok(admin)
    }

    pub async fn select_account(&mut self, account_id: AccountId) -> Result<&SelectedAccount, FormError> {
        self.require_admin()?;
        let account = self
            .admin
            .as_ref()
            .and_then(|a| a.users.iter().find(|u| u.id == account_id))
            .cloned()
            .ok_or_else(|| FormError::Invalid(format!("No account with id {}.", account_id)))?;

        let transactions = match self.api.fetch_user_statement(account_id).await {
            Ok(txs) => txs,
            Err(e) => return Err(self.form_error(e, &[], GENERIC_FAILURE)),
        };
        let admin = self.admin.get_or_insert_with(AdminView::default);
        Ok(admin.selected.insert(SelectedAccount { account, transactions }))
    }

    pub fn close_selection(&mut self) {
        if let Some(admin) = self.admin.as_mut() {
            admin.selected = None;
        }
    }

    /// Reverses an outgoing transfer of the selected account, then
    /// re-fetches that statement and the user list.
    pub async fn reverse(&mut self, transaction_id: TransactionId) -> Result<(), FormError> {
        self.require_admin()?;
        let selected = self
            .admin
            .as_ref()
            .and_then(|a| a.selected.as_ref())
            .ok_or_else(|| FormError::Invalid("Select an account first.".to_string()))?;
        let account_id = selected.account.id;
        let reversible = selected
            .transactions
            .iter()
            .any(|t| t.id == transaction_id && view::is_reversible(t));
        if !reversible {
            return Err(FormError::Invalid(format!(
                "Transaction {} is not an outgoing transfer of this account.",
                transaction_id
            )));
        }

        if let Err(e) = self.api.reverse_transaction(transaction_id).await {
            return Err(self.form_error(e, &[], REVERSAL_FAILED));
        }
        info!("Transaction {} reversed", transaction_id);

        self.open_admin().await?;
        self.select_account(account_id).await?;
        Ok(())
    }
}
