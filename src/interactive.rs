//! Menu-driven terminal front end. Entry view when logged out, dashboard
//! when logged in; every action goes through the same dashboard the
//! one-shot commands use.

use std::io::{self, BufRead, Write};
use tracing::debug;

use crate::account::forms::{DepositForm, RegisterForm, TransferForm};
use crate::account::types::{AccountId, Role, TransactionId, TransactionType};
use crate::account::view::FilterState;
use crate::cli::{auth, render, App};
use crate::client::BankClient;
use crate::dashboard::Dashboard;
use crate::error::FormError;
use crate::format::{format_brl, format_cpf, is_valid_email};

enum Flow {
    Continue,
    Exit,
}

/// Where the menus read answers from. `None` means input is exhausted.
pub trait Input {
    fn line(&mut self, label: &str) -> io::Result<Option<String>>;
    fn secret(&mut self, label: &str) -> io::Result<Option<String>>;
}

/// Stdin, with passwords read without echo.
pub struct Terminal;

impl Input for Terminal {
    fn line(&mut self, label: &str) -> io::Result<Option<String>> {
        print!("{}", label);
        io::stdout().flush()?;
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn secret(&mut self, label: &str) -> io::Result<Option<String>> {
        rpassword::prompt_password(label).map(Some)
    }
}

/// Prints a form error; returns whether the session ended.
fn report(err: &FormError) -> bool {
    println!("  ! {}", err);
    err.is_redirect()
}

pub async fn run(app: &App, input: &mut impl Input) -> io::Result<()> {
    println!("\n=== Conta Digital ===");
    loop {
        let flow = if app.session.is_active() {
            dashboard_menu(app, input).await?
        } else {
            entry_menu(app, input).await?
        };
        if let Flow::Exit = flow {
            println!("Bye.");
            return Ok(());
        }
    }
}

async fn entry_menu(app: &App, input: &mut impl Input) -> io::Result<Flow> {
    println!("\n1. Login");
    println!("2. Create account");
    println!("3. Exit");
    let choice = match input.line("Select: ")? {
        Some(c) => c,
        None => return Ok(Flow::Exit),
    };
    match choice.as_str() {
        "1" => {
            let Some(email) = input.line("E-mail: ")? else { return Ok(Flow::Exit) };
            let Some(password) = input.secret("Password: ")? else { return Ok(Flow::Exit) };
            match auth::login(app, &email, &password).await {
                Ok(()) => println!("Welcome!"),
                Err(e) => {
                    report(&e);
                }
            }
        }
        "2" => register_form(app, input).await?,
        "3" => return Ok(Flow::Exit),
        _ => println!("Invalid option."),
    }
    Ok(Flow::Continue)
}

async fn register_form(app: &App, input: &mut impl Input) -> io::Result<()> {
    let Some(full_name) = input.line("Full name: ")? else { return Ok(()) };
    let Some(cpf) = input.line("CPF: ")? else { return Ok(()) };
    println!("  CPF: {}", format_cpf(&cpf));
    let Some(email) = input.line("E-mail: ")? else { return Ok(()) };
    if !is_valid_email(&email) {
        println!("  ! Enter a valid e-mail address.");
        return Ok(());
    }
    let Some(password) = input.secret("Choose a password: ")? else { return Ok(()) };
    let role = match input.line("Profile [user/admin] (user): ")? {
        Some(r) if !r.is_empty() => match r.parse::<Role>() {
            Ok(role) => role,
            Err(e) => {
                println!("  ! {}", e);
                return Ok(());
            }
        },
        _ => Role::User,
    };
    let form = RegisterForm {
        full_name,
        cpf,
        email,
        password,
        role,
    };
    match auth::register(app, &form).await {
        Ok(()) => println!("Account created. You can log in now."),
        Err(e) => {
            report(&e);
        }
    }
    Ok(())
}

async fn dashboard_menu(app: &App, input: &mut impl Input) -> io::Result<Flow> {
    let mut dash = app.dashboard();
    dash.open().await;

    loop {
        let Some(view) = dash.view() else {
            println!("  ! Your session has ended. Please log in again.");
            return Ok(Flow::Continue);
        };
        println!();
        println!("{}", render::balance_card(&view.snapshot));
        print!("{}", render::recent_activity(&dash.recent_activity()));

        println!("\n1. New deposit");
        println!("2. Transfer");
        println!("3. Statement");
        if dash.is_admin() {
            println!("4. Manage users");
        }
        println!("5. Logout");
        println!("6. Exit");
        let choice = match input.line("Select: ")? {
            Some(c) => c,
            None => return Ok(Flow::Exit),
        };
        debug!("Dashboard choice {}", choice);
        let ended = match choice.as_str() {
            "1" => deposit_form(&mut dash, input).await?,
            "2" => transfer_form(&mut dash, input).await?,
            "3" => statement_view(&mut dash, input)?,
            "4" if dash.is_admin() => admin_view(&mut dash, input).await?,
            "5" => {
                dash.logout();
                println!("Logged out.");
                return Ok(Flow::Continue);
            }
            "6" => return Ok(Flow::Exit),
            _ => {
                println!("Invalid option.");
                false
            }
        };
        if ended {
            return Ok(Flow::Continue);
        }
    }
}

async fn deposit_form(dash: &mut Dashboard<BankClient>, input: &mut impl Input) -> io::Result<bool> {
    let Some(value) = input.line("Amount (R$): ")? else { return Ok(false) };
    match dash.deposit(&DepositForm::new(value)).await {
        Ok(()) => {
            println!("Deposit completed.");
            Ok(false)
        }
        Err(e) => Ok(report(&e)),
    }
}

async fn transfer_form(dash: &mut Dashboard<BankClient>, input: &mut impl Input) -> io::Result<bool> {
    let Some(identifier) = input.line("Recipient (e-mail or CPF): ")? else { return Ok(false) };
    let Some(value) = input.line("Amount (R$): ")? else { return Ok(false) };
    let mut form = TransferForm::new(identifier, value, "");

    if let Some(warning) = dash.transfer_warning(&form) {
        println!("  ! {}", warning);
        return Ok(false);
    }
    let Some(description) = input.line("Description (optional): ")? else { return Ok(false) };
    form.description = description;

    match input.line("Confirm transfer? [y/N]: ")? {
        Some(answer) if answer.eq_ignore_ascii_case("y") => {}
        _ => {
            println!("Cancelled.");
            return Ok(false);
        }
    }
    match dash.transfer(&form).await {
        Ok(()) => {
            println!("Transfer completed.");
            Ok(false)
        }
        Err(e) => Ok(report(&e)),
    }
}

fn read_date(input: &mut impl Input, label: &str) -> io::Result<Result<Option<chrono::NaiveDate>, String>> {
    let Some(text) = input.line(label)? else { return Ok(Ok(None)) };
    if text.is_empty() {
        return Ok(Ok(None));
    }
    Ok(chrono::NaiveDate::parse_from_str(&text, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("'{}' is not a date (YYYY-MM-DD)", text)))
}

/// Full statement with filters; `f` edits them, `c` clears, `b` goes back.
fn statement_view(dash: &mut Dashboard<BankClient>, input: &mut impl Input) -> io::Result<bool> {
    loop {
        println!();
        println!("{}", render::filter_summary(dash.filters()));
        print!("{}", render::statement(&dash.visible_transactions()));
        let Some(choice) = input.line("[f] filter  [c] clear  [b] back: ")? else { return Ok(false) };
        match choice.as_str() {
            "f" => {
                let start = match read_date(input, "Start (YYYY-MM-DD, blank for none): ")? {
                    Ok(d) => d,
                    Err(e) => {
                        println!("  ! {}", e);
                        continue;
                    }
                };
                let end = match read_date(input, "End (YYYY-MM-DD, blank for none): ")? {
                    Ok(d) => d,
                    Err(e) => {
                        println!("  ! {}", e);
                        continue;
                    }
                };
                let kind = match input.line("Type (depósito/envio/recebimento/estorno, blank for all): ")? {
                    Some(t) if !t.is_empty() => match t.parse::<TransactionType>() {
                        Ok(k) => Some(k),
                        Err(e) => {
                            println!("  ! {}", e);
                            continue;
                        }
                    },
                    _ => None,
                };
                dash.set_filters(FilterState {
                    start_date: start,
                    end_date: end,
                    kind,
                });
            }
            "c" => dash.clear_filters(),
            _ => return Ok(false),
        }
    }
}

async fn admin_view(dash: &mut Dashboard<BankClient>, input: &mut impl Input) -> io::Result<bool> {
    if let Err(e) = dash.open_admin().await {
        return Ok(report(&e));
    }
    loop {
        if let Some(admin) = dash.admin() {
            println!();
            print!("{}", render::users(&admin.users));
        }
        let Some(choice) = input.line("Account id to open ([b] back): ")? else { return Ok(false) };
        let account_id: AccountId = match choice.parse() {
            Ok(id) => id,
            Err(_) => return Ok(false),
        };
        if let Err(e) = dash.select_account(account_id).await {
            if report(&e) {
                return Ok(true);
            }
            continue;
        }
        if managed_account_view(dash, input).await? {
            return Ok(true);
        }
        dash.close_selection();
    }
}

async fn managed_account_view(dash: &mut Dashboard<BankClient>, input: &mut impl Input) -> io::Result<bool> {
    loop {
        if let Some(selected) = dash.admin().and_then(|a| a.selected.as_ref()) {
            println!();
            print!("{}", render::managed_statement(selected));
            println!("Account balance: {}", format_brl(selected.account.balance));
        }
        let Some(choice) = input.line("Transaction id to reverse ([b] back): ")? else { return Ok(false) };
        let transaction_id: TransactionId = match choice.parse() {
            Ok(id) => id,
            Err(_) => return Ok(false),
        };
        match dash.reverse(transaction_id).await {
            Ok(()) => println!("Transaction {} reversed.", transaction_id),
            Err(e) => {
                if report(&e) {
                    return Ok(true);
                }
            }
        }
    }
}
