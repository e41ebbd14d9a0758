use chrono::NaiveDate;

use super::{open_dashboard, render, App};
use crate::account::forms::{DepositForm, TransferForm};
use crate::account::types::TransactionType;
use crate::account::view::FilterState;
use crate::error::FormError;
use crate::format::format_brl;

pub async fn handle_dashboard(app: &App) -> Result<(), FormError> {
    let dash = open_dashboard(app).await?;
    if let Some(view) = dash.view() {
        println!("{}", render::balance_card(&view.snapshot));
    }
    print!("{}", render::recent_activity(&dash.recent_activity()));
    Ok(())
}

pub async fn handle_statement(
    app: &App,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    kind: Option<TransactionType>,
) -> Result<(), FormError> {
    let mut dash = open_dashboard(app).await?;
    dash.set_filters(FilterState {
        start_date: from,
        end_date: to,
        kind,
    });
    println!("{}", render::filter_summary(dash.filters()));
    print!("{}", render::statement(&dash.visible_transactions()));
    Ok(())
}

pub async fn handle_deposit(app: &App, value: String) -> Result<(), FormError> {
    let mut dash = open_dashboard(app).await?;
    dash.deposit(&DepositForm::new(value)).await?;
    println!("Deposit completed.");
    if let Some(balance) = dash.balance() {
        println!("Balance: {}", format_brl(balance));
    }
    Ok(())
}

pub async fn handle_transfer(app: &App, to: String, value: String, description: String) -> Result<(), FormError> {
    let mut dash = open_dashboard(app).await?;
    dash.transfer(&TransferForm::new(to, value, description)).await?;
    println!("Transfer completed.");
    if let Some(balance) = dash.balance() {
        println!("Balance: {}", format_brl(balance));
    }
    Ok(())
}
