//! Account domain: wire types, form checks and derived statement views.

pub mod types;
pub mod forms;
pub mod view;

pub use types::{AccountSnapshot, AdminAccount, Role, Transaction, TransactionType, TokenPair};
pub use forms::{DepositForm, RegisterForm, TransferForm};
pub use view::FilterState;
