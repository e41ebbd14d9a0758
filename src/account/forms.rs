//! Form checks run before anything is sent. They are conveniences only:
//! the balance they compare against may be stale and the server validates
//! every request again.

use rust_decimal::Decimal;
use crate::config::LimitsConfig;
use crate::error::FormError;
use crate::format::{cpf_digits, format_brl, is_complete_cpf, is_valid_email, parse_amount};
use super::types::{DepositRequest, RegisterRequest, Role, TransferRequest};

pub const INSUFFICIENT_BALANCE: &str = "insufficient balance";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferForm {
    pub identifier: String,
    pub value: String,
    pub description: String,
}

impl TransferForm {
    pub fn new(identifier: impl Into<String>, value: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            value: value.into(),
            description: description.into(),
        }
    }

    /// Inline warning under the amount field, if any.
    pub fn balance_warning(&self, balance: Decimal) -> Option<String> {
        match parse_amount(&self.value) {
            Some(value) if value > balance => Some(format!(
                "{} (available: {})",
                INSUFFICIENT_BALANCE,
                format_brl(balance)
            )),
            _ => None,
        }
    }

    /// Submit is disabled while the amount is empty or above the balance.
    pub fn can_submit(&self, balance: Decimal) -> bool {
        self.check(balance).is_ok()
    }

    pub fn check(&self, balance: Decimal) -> Result<TransferRequest, FormError> {
        if self.value.trim().is_empty() {
            return Err(FormError::Blocked("Enter an amount.".to_string()));
        }
        let value = parse_amount(&self.value)
            .ok_or_else(|| FormError::Invalid(format!("'{}' is not a valid amount.", self.value.trim())))?;
        if value <= Decimal::ZERO {
            return Err(FormError::Invalid("The amount must be greater than zero.".to_string()));
        }
        if let Some(warning) = self.balance_warning(balance) {
            return Err(FormError::Blocked(warning));
        }
        let identifier = self.identifier.trim();
        if identifier.is_empty() {
            return Err(FormError::Invalid("Enter the recipient's e-mail or CPF.".to_string()));
        }
        Ok(TransferRequest {
            identifier: identifier.to_string(),
            value,
            description: self.description.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepositForm {
    pub value: String,
}

impl DepositForm {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }

    pub fn check(&self, limits: &LimitsConfig) -> Result<DepositRequest, FormError> {
        let value = parse_amount(&self.value)
            .ok_or_else(|| FormError::Invalid("Enter a valid amount.".to_string()))?;
        if value != value.round_dp(2) {
            return Err(FormError::Invalid("Use at most two decimal places.".to_string()));
        }
        if value < limits.deposit_min || value > limits.deposit_max {
            return Err(FormError::Invalid(format!(
                "The amount must be between {} and {}.",
                format_brl(limits.deposit_min),
                format_brl(limits.deposit_max)
            )));
        }
        Ok(DepositRequest { value })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub full_name: String,
    pub cpf: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl RegisterForm {
    /// The CPF goes out digits-only; the mask is display sugar.
    pub fn check(&self) -> Result<RegisterRequest, FormError> {
        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            return Err(FormError::Invalid("Enter your full name.".to_string()));
        }
        if !is_complete_cpf(&self.cpf) {
            return Err(FormError::Invalid("The CPF must have 11 digits.".to_string()));
        }
        let email = self.email.trim();
        if !is_valid_email(email) {
            return Err(FormError::Invalid("Enter a valid e-mail address.".to_string()));
        }
        if self.password.is_empty() {
            return Err(FormError::Invalid("Enter a password.".to_string()));
        }
        Ok(RegisterRequest {
            full_name: full_name.to_string(),
            cpf: cpf_digits(&self.cpf),
            email: email.to_string(),
            password: self.password.clone(),
            role: self.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brl(units: i64) -> Decimal {
        Decimal::new(units, 0)
    }

    #[test]
    fn test_transfer_above_balance_is_blocked() {
        let form = TransferForm::new("ana@email.com", "500", "");
        assert!(!form.can_submit(brl(300)));
        match form.check(brl(300)) {
            Err(FormError::Blocked(msg)) => {
                assert!(msg.starts_with(INSUFFICIENT_BALANCE));
                assert!(msg.contains("R$ 300,00"));
            }
            other => panic!("expected block, got {:?}", other),
        }
        assert!(form.balance_warning(brl(300)).is_some());
    }

    #[test]
    fn test_transfer_equal_to_balance_is_allowed() {
        let form = TransferForm::new(" 12345678901 ", "300,00", " rent ");
        let req = form.check(brl(300)).unwrap();
        assert_eq!(req.identifier, "12345678901");
        assert_eq!(req.value, brl(300));
        assert_eq!(req.description, "rent");
        assert!(form.balance_warning(brl(300)).is_none());
    }

    #[test]
    fn test_transfer_empty_value_disables_submit() {
        let form = TransferForm::new("ana@email.com", "", "");
        assert!(!form.can_submit(brl(300)));
        assert!(matches!(form.check(brl(300)), Err(FormError::Blocked(_))));
    }

    #[test]
    fn test_transfer_rejects_bad_amounts() {
        assert!(matches!(
            TransferForm::new("a@b.com", "abc", "").check(brl(10)),
            Err(FormError::Invalid(_))
        ));
        assert!(matches!(
            TransferForm::new("a@b.com", "-5", "").check(brl(10)),
            Err(FormError::Invalid(_))
        ));
        assert!(matches!(
            TransferForm::new("  ", "5", "").check(brl(10)),
            Err(FormError::Invalid(_))
        ));
    }

    #[test]
    fn test_deposit_bounds() {
        let limits = LimitsConfig::default();
        assert_eq!(
            DepositForm::new("1").check(&limits).unwrap().value,
            brl(1)
        );
        assert!(DepositForm::new("10000.00").check(&limits).is_ok());
        assert!(DepositForm::new("0.99").check(&limits).is_err());
        assert!(DepositForm::new("10000.01").check(&limits).is_err());
        assert!(DepositForm::new("10.005").check(&limits).is_err());
        assert!(DepositForm::new("10.500").check(&limits).is_ok());
        assert!(DepositForm::new("").check(&limits).is_err());
    }

    #[test]
    fn test_register_form() {
        let mut form = RegisterForm {
            full_name: " João Silva ".to_string(),
            cpf: "222.222.222-22".to_string(),
            email: "joao@email.com".to_string(),
            password: "user123".to_string(),
            role: Role::User,
        };
        let req = form.check().unwrap();
        assert_eq!(req.cpf, "22222222222");
        assert_eq!(req.full_name, "João Silva");

        form.email = "joao".to_string();
        assert!(matches!(form.check(), Err(FormError::Invalid(_))));

        form.email = "joao@email.com".to_string();
        form.cpf = "2222".to_string();
        assert!(matches!(form.check(), Err(FormError::Invalid(_))));
    }
}
