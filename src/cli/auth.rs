use tracing::warn;

use super::App;
use crate::account::forms::RegisterForm;
use crate::account::types::Role;
use crate::error::{ClientError, FormError, GENERIC_FAILURE};
use crate::format::format_cpf;

/// Takes the password from the flag or asks for it without echo.
pub fn read_password(password: Option<String>, label: &str) -> Result<String, FormError> {
    match password {
        Some(p) => Ok(p),
        None => rpassword::prompt_password(label)
            .map_err(|e| FormError::Failed(format!("Could not read password: {}", e))),
    }
}

pub async fn handle_login(app: &App, email: String, password: Option<String>) -> Result<(), FormError> {
    let password = read_password(password, "Password: ")?;
    login(app, &email, &password).await?;
    println!("Logged in as {}", email.trim());
    Ok(())
}

pub async fn login(app: &App, email: &str, password: &str) -> Result<(), FormError> {
    app.client().login(email, password).await.map_err(|e| match e {
        ClientError::Rejected(body) => FormError::Rejected(body.message_or(GENERIC_FAILURE).to_string()),
        other => {
            warn!("Login failed: {}", other);
            FormError::Failed(GENERIC_FAILURE.to_string())
        }
    })
}

pub async fn handle_register(
    app: &App,
    full_name: String,
    cpf: String,
    email: String,
    password: Option<String>,
    role: Role,
) -> Result<(), FormError> {
    let password = read_password(password, "Choose a password: ")?;
    let form = RegisterForm {
        full_name,
        cpf,
        email,
        password,
        role,
    };
    register(app, &form).await?;
    println!("Account created for {} (CPF {}). You can log in now.", form.email.trim(), format_cpf(&form.cpf));
    Ok(())
}

/// Server field errors come back as `field: message` entries joined by `; `.
pub async fn register(app: &App, form: &RegisterForm) -> Result<(), FormError> {
    let req = form.check()?;
    app.client().register(&req).await.map_err(|e| match e {
        ClientError::Rejected(body) => FormError::Rejected(body.to_string()),
        other => {
            warn!("Registration failed: {}", other);
            FormError::Failed("Could not create the account.".to_string())
        }
    })
}

pub fn handle_logout(app: &App) {
    app.client().logout();
    println!("Logged out.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::api_client::INVALID_CREDENTIALS;
    use crate::client::mock_server::{self, MockBank};
    use crate::config::ClientConfig;
    use crate::session::SessionContext;
    use serde_json::json;

    async fn app_for(bank: MockBank) -> (App, mock_server::Shared) {
        let (base_url, state) = mock_server::spawn(bank).await;
        let mut config = ClientConfig::default();
        config.api.base_url = base_url;
        let app = App {
            config,
            session: SessionContext::in_memory(),
        };
        (app, state)
    }

    fn maria() -> RegisterForm {
        RegisterForm {
            full_name: "Maria Souza".to_string(),
            cpf: "123.456.789-09".to_string(),
            email: "maria@email.com".to_string(),
            password: "segredo".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_register_rejection_lists_general_then_fields() {
        let mut bank = MockBank::default();
        bank.register_rejection = Some(json!({
            "non_field_errors": ["x"],
            "cpf": "CPF já cadastrado",
            "email": ["E-mail já cadastrado"]
        }));
        let (app, _state) = app_for(bank).await;

        assert_eq!(
            register(&app, &maria()).await.unwrap_err(),
            FormError::Rejected("x; cpf: CPF já cadastrado; email: E-mail já cadastrado".to_string())
        );
    }

    #[tokio::test]
    async fn test_register_invalid_form_sends_nothing() {
        let (app, state) = app_for(MockBank::default()).await;
        let mut form = maria();
        form.email = "not-an-email".to_string();

        assert!(matches!(register(&app, &form).await, Err(FormError::Invalid(_))));
        assert!(state.lock().unwrap().hits.is_empty());
    }

    #[tokio::test]
    async fn test_bad_login_shows_fixed_message() {
        let (app, _state) = app_for(MockBank::default()).await;

        assert_eq!(
            login(&app, mock_server::USER_EMAIL, "wrong").await.unwrap_err(),
            FormError::Rejected(INVALID_CREDENTIALS.to_string())
        );
        assert!(!app.session.is_active());
    }

    #[tokio::test]
    async fn test_login_then_logout() {
        let (app, _state) = app_for(MockBank::default()).await;

        login(&app, mock_server::USER_EMAIL, mock_server::USER_PASSWORD).await.unwrap();
        assert!(app.session.is_active());
        handle_logout(&app);
        assert!(!app.session.is_active());
    }
}
