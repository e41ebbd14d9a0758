use clap::Subcommand;

use super::{render, App};
use crate::account::types::{AccountId, TransactionId};
use crate::error::FormError;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// List user accounts with their balances
    Users,
    /// Statement of one user account
    Statement {
        account_id: AccountId,
    },
    /// Reverse an outgoing transfer of a user account
    Reverse {
        transaction_id: TransactionId,
        /// Account the transfer belongs to
        #[arg(long)]
        account: AccountId,
    },
}

pub async fn handle_admin_command(app: &App, cmd: AdminCommands) -> Result<(), FormError> {
    let mut dash = app.dashboard();
    dash.enter_admin().await?;

    match cmd {
        AdminCommands::Users => {
            if let Some(admin) = dash.admin() {
                print!("{}", render::users(&admin.users));
            }
        }
        AdminCommands::Statement { account_id } => {
            let selected = dash.select_account(account_id).await?;
            print!("{}", render::managed_statement(selected));
        }
        AdminCommands::Reverse { transaction_id, account } => {
            dash.select_account(account).await?;
            dash.reverse(transaction_id).await?;
            println!("Transaction {} reversed.", transaction_id);
            if let Some(selected) = dash.admin().and_then(|a| a.selected.as_ref()) {
                print!("{}", render::managed_statement(selected));
            }
        }
    }
    Ok(())
}
