// Client module
pub mod api_client;
#[cfg(test)]
pub(crate) mod mock_server;

pub use api_client::{AccountApi, BankClient};
