//! Admin login and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use threadline_core::Email;
use threadline_core::validation::{ValidationError, required};

use super::{inline_failure, redirect};
use crate::components::Toast;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::HxRequest;
use crate::middleware::auth::{LOGIN_PATH, sign_in, sign_out};
use crate::state::AppState;

/// Where a fresh sign-in lands.
pub const HOME_PATH: &str = "/products";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub toasts: Vec<Toast>,
}

/// Display the login page.
pub async fn login_page() -> LoginTemplate {
    LoginTemplate {
        email: String::new(),
        toasts: Vec::new(),
    }
}

async fn authenticate(session: &Session, state: &AppState, form: &LoginForm) -> Result<()> {
    let email = Email::parse(&form.email).map_err(ValidationError::from)?;
    let password = required("Password", &form.password)?;

    let login = state.api().admin_login(email.as_str(), password).await?;
    if login.user.as_ref().is_some_and(|user| !user.is_admin) {
        tracing::warn!(email = %email.masked(), "non-admin account refused");
        return Err(AppError::Validation(ValidationError::Invalid {
            field: "Account",
            reason: "not an administrator".to_string(),
        }));
    }

    sign_in(session, state, &login.token, email.as_str()).await
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    session: Session,
    State(state): State<AppState>,
    hx: HxRequest,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    match authenticate(&session, &state, &form).await {
        Ok(()) => {
            tracing::info!("admin signed in");
            Ok(redirect(hx, HOME_PATH))
        }
        Err(err) if hx.0 => Err(err),
        Err(err) => Ok(LoginTemplate {
            email: form.email,
            toasts: vec![inline_failure(err)?],
        }
        .into_response()),
    }
}

/// Forget the admin token and return to the login page.
#[instrument(skip_all)]
pub async fn logout(session: Session, State(state): State<AppState>, hx: HxRequest) -> Result<Response> {
    sign_out(&session, &state).await?;
    Ok(redirect(hx, LOGIN_PATH))
}
