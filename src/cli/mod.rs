pub mod account;
pub mod admin;
pub mod auth;
pub mod render;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use crate::account::types::{Role, TransactionType};
use crate::client::BankClient;
use crate::config::ClientConfig;
use crate::dashboard::Dashboard;
use crate::error::{ClientError, FormError};
use crate::session::SessionContext;

#[derive(Parser)]
#[command(name = "conta_digital")]
#[command(about = "Conta Digital banking client", long_about = None)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = "conta_digital.toml")]
    pub config: String,
    /// Overrides api.base_url from the config
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and keep the session for later commands
    Login {
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create a new account
    Register {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        cpf: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long, default_value = "user")]
        role: Role,
    },
    /// Forget the stored session
    Logout,
    /// Balance and the most recent transactions
    Dashboard,
    /// Full statement, newest first
    Statement {
        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        /// depósito, envio, recebimento or estorno
        #[arg(long = "type")]
        kind: Option<TransactionType>,
    },
    /// Deposit into your own account
    Deposit {
        value: String,
    },
    /// Send money to another account
    Transfer {
        /// Recipient e-mail or CPF
        #[arg(long)]
        to: String,
        #[arg(long)]
        value: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Account management (administrators)
    Admin {
        #[command(subcommand)]
        cmd: admin::AdminCommands,
    },
}

/// Everything a command needs: config plus the one session context.
pub struct App {
    pub config: ClientConfig,
    pub session: Arc<SessionContext>,
}

impl App {
    pub fn new(mut config: ClientConfig, api_url: Option<String>) -> Result<Self, ClientError> {
        if let Some(url) = api_url {
            config.api.base_url = url;
        }
        let session = SessionContext::from_file(config.session.path.clone())?;
        Ok(Self { config, session })
    }

    pub fn client(&self) -> BankClient {
        BankClient::new(self.config.api.clone(), self.session.clone())
    }

    pub fn dashboard(&self) -> Dashboard<BankClient> {
        Dashboard::new(self.client(), self.session.clone(), self.config.limits.clone())
    }
}

/// Opens the dashboard or reports that the user has to log in first.
pub async fn open_dashboard(app: &App) -> Result<Dashboard<BankClient>, FormError> {
    let mut dash = app.dashboard();
    dash.open().await;
    if dash.is_redirect() {
        return Err(FormError::Redirect);
    }
    Ok(dash)
}

pub async fn dispatch(app: &App, command: Commands) -> Result<(), FormError> {
    match command {
        Commands::Login { email, password } => auth::handle_login(app, email, password).await,
        Commands::Register { full_name, cpf, email, password, role } => {
            auth::handle_register(app, full_name, cpf, email, password, role).await
        }
        Commands::Logout => {
            auth::handle_logout(app);
            Ok(())
        }
        Commands::Dashboard => account::handle_dashboard(app).await,
        Commands::Statement { from, to, kind } => account::handle_statement(app, from, to, kind).await,
        Commands::Deposit { value } => account::handle_deposit(app, value).await,
        Commands::Transfer { to, value, description } => {
            account::handle_transfer(app, to, value, description).await
        }
        Commands::Admin { cmd } => admin::handle_admin_command(app, cmd).await,
    }
}
