//! Login, registration and logout.
//!
//! A successful login or registration stores the returned token under
//! `token` in the visitor's local storage and publishes `AuthChanged`, so
//! every open tab re-renders its header. Failures re-render the form with a
//! toast (or just the toast, for htmx submissions).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::Query,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use threadline_core::Email;
use threadline_core::validation::{ValidationError, required};

use super::{redirect, safe_next};
use crate::components::{HeaderProps, Toast};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::HxRequest;
use crate::page::{Chrome, PageContext};
use crate::visitor::Visitor;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub next: Option<String>,
}

/// Where to go after logging in.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/login.html")]
pub struct LoginTemplate {
    pub page: Chrome,
    pub next: String,
    pub email: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/register.html")]
pub struct RegisterTemplate {
    pub page: Chrome,
    pub next: String,
    pub name: String,
    pub email: String,
}

fn with_next(path: &str, next: &str) -> String {
    if next == "/" {
        return path.to_string();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    format!("{path}?{query}")
}

impl LoginTemplate {
    /// Link to registration that keeps the destination.
    #[must_use]
    pub fn switch_href(&self) -> String {
        with_next("/auth/register", &self.next)
    }
}

impl RegisterTemplate {
    #[must_use]
    pub fn switch_href(&self) -> String {
        with_next("/auth/login", &self.next)
    }
}

fn email(raw: &str) -> Result<Email> {
    Ok(Email::parse(raw).map_err(ValidationError::from)?)
}

/// Toast for a failed submission, or the error itself when it should not be
/// shown inline (htmx requests and cancelled calls).
fn inline_failure(hx: HxRequest, err: AppError) -> Result<Toast> {
    match err.toast_message() {
        Some(message) if !hx.0 => {
            tracing::warn!(error = %err, "form submission failed");
            Ok(Toast::error(message))
        }
        _ => Err(err),
    }
}

/// Display the login page.
pub async fn login_page(ctx: PageContext, Query(query): Query<NextQuery>) -> Result<LoginTemplate> {
    Ok(LoginTemplate {
        page: ctx.chrome("Log in").await?,
        next: safe_next(query.next.as_deref()).to_string(),
        email: String::new(),
    })
}

async fn sign_in(visitor: &Visitor, form: &LoginForm) -> Result<()> {
    let email = email(&form.email)?;
    let password = required("Password", &form.password)?;
    let session = visitor.api().login(email.as_str(), password).await?;
    visitor.sign_in(&session.token)?;
    Ok(())
}

/// Handle login form submission.
#[instrument(skip_all, fields(visitor = %ctx.visitor.id))]
pub async fn login(ctx: PageContext, hx: HxRequest, Form(form): Form<LoginForm>) -> Result<Response> {
    let next = safe_next(form.next.as_deref()).to_string();
    match sign_in(&ctx.visitor, &form).await {
        Ok(()) => {
            add_breadcrumb("auth", "logged in");
            Ok(redirect(hx, &next))
        }
        Err(err) => {
            let toast = inline_failure(hx, err)?;
            let page = ctx
                .chrome_with("Log in", HeaderProps::default(), vec![toast])
                .await?;
            Ok(LoginTemplate {
                page,
                next,
                email: form.email,
            }
            .into_response())
        }
    }
}

/// Display the registration page.
pub async fn register_page(ctx: PageContext, Query(query): Query<NextQuery>) -> Result<RegisterTemplate> {
    Ok(RegisterTemplate {
        page: ctx.chrome("Create account").await?,
        next: safe_next(query.next.as_deref()).to_string(),
        name: String::new(),
        email: String::new(),
    })
}

async fn create_account(visitor: &Visitor, form: &RegisterForm) -> Result<()> {
    let name = required("Name", &form.name)?;
    let email = email(&form.email)?;
    let password = required("Password", &form.password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::Invalid {
            field: "Password",
            reason: format!("must be at least {MIN_PASSWORD_LEN} characters"),
        }
        .into());
    }
    if form.password != form.password_confirm {
        return Err(AppError::BadRequest("Passwords do not match".to_string()));
    }

    let session = visitor.api().register(name, email.as_str(), password).await?;
    visitor.sign_in(&session.token)?;
    Ok(())
}

/// Handle registration form submission. The new account is logged in.
#[instrument(skip_all, fields(visitor = %ctx.visitor.id))]
pub async fn register(ctx: PageContext, hx: HxRequest, Form(form): Form<RegisterForm>) -> Result<Response> {
    let next = safe_next(form.next.as_deref()).to_string();
    match create_account(&ctx.visitor, &form).await {
        Ok(()) => {
            add_breadcrumb("auth", "registered");
            Ok(redirect(hx, &next))
        }
        Err(err) => {
            let toast = inline_failure(hx, err)?;
            let page = ctx
                .chrome_with("Create account", HeaderProps::default(), vec![toast])
                .await?;
            Ok(RegisterTemplate {
                page,
                next,
                name: form.name,
                email: form.email,
            }
            .into_response())
        }
    }
}

/// Forget the token and go home.
#[instrument(skip_all, fields(visitor = %visitor.id))]
pub async fn logout(visitor: Visitor, hx: HxRequest) -> Result<Response> {
    visitor.sign_out()?;
    add_breadcrumb("auth", "logged out");
    Ok(redirect(hx, "/"))
}
