//! List, create, edit and delete pages shared by the six CRUD resources.
//!
//! A resource plugs in by implementing [`ResourcePage`]: its table columns,
//! its form fields, and how a submitted form becomes an API input. Saving
//! never updates the table in place; the response triggers
//! [`RESOURCE_CHANGED`] and the table reloads from the API.

use std::collections::HashMap;
use std::str::FromStr;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use tracing::instrument;

use threadline_client::{AdminResource, ApiClient};
use threadline_core::validation::ValidationError;

use super::{SearchQuery, inline_failure};
use crate::components::{DataTableConfig, FormField, RowLink, TableRow, Toast};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::middleware::htmx::{trigger, with_toast};
use crate::page::Chrome;
use crate::state::AppState;

/// Event that makes a visible table reload.
pub const RESOURCE_CHANGED: &str = "resourceChanged";

/// How one admin resource is listed and edited.
pub trait ResourcePage: AdminResource<Id: DeserializeOwned + PartialEq> {
    /// Page heading, e.g. "Coupons".
    const TITLE: &'static str;

    fn table() -> DataTableConfig;

    fn id(record: &Self::Record) -> Self::Id;

    /// Display cells, in [`Self::table`] column order.
    fn row(record: &Self::Record) -> Vec<String>;

    fn row_links(_record: &Self::Record) -> Vec<RowLink> {
        Vec::new()
    }

    /// Form fields, prefilled from `record` when editing.
    fn fields(record: Option<&Self::Record>) -> Vec<FormField>;

    /// Validate a submitted form.
    ///
    /// # Errors
    ///
    /// Returns the first failed field check; nothing is sent when this fails.
    fn parse(form: &FormValues) -> std::result::Result<Self::Input, ValidationError>;
}

/// A submitted form, keyed by field name.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(transparent)]
pub struct FormValues(HashMap<String, String>);

impl FormValues {
    /// Raw value; empty when the field was not sent.
    #[must_use]
    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map_or("", String::as_str)
    }

    /// Value, or `None` when blank.
    #[must_use]
    pub fn opt(&self, name: &str) -> Option<&str> {
        threadline_core::validation::optional(self.0.get(name).map(String::as_str))
    }

    /// Checkboxes are only sent when ticked.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Put the operator's input back into `fields`.
    #[must_use]
    pub fn refill(&self, fields: Vec<FormField>) -> Vec<FormField> {
        fields
            .into_iter()
            .map(|field| {
                if field.is_checkbox() {
                    let on = self.flag(field.name);
                    field.checked(on)
                } else {
                    let value = self.get(field.name).to_string();
                    field.value(value)
                }
            })
            .collect()
    }
}

impl<const N: usize> From<[(&str, &str); N]> for FormValues {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// Parse an optional numeric id field.
///
/// # Errors
///
/// Returns [`ValidationError::NotANumber`] when present but not an id.
pub fn optional_id<T: FromStr>(
    field: &'static str,
    value: Option<&str>,
) -> std::result::Result<Option<T>, ValidationError> {
    value
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|_| ValidationError::NotANumber { field })
        })
        .transpose()
}

// =============================================================================
// Templates
// =============================================================================

/// List page: search box, table, and an empty modal slot.
#[derive(Template, WebTemplate)]
#[template(path = "resources/index.html")]
pub struct ResourceIndexTemplate {
    pub page: Chrome,
    pub debounce_ms: u128,
    pub base_path: String,
    pub noun: &'static str,
    pub table: DataTableConfig,
    pub rows: Vec<TableRow>,
}

/// Table fragment, swapped in on search and after every change.
#[derive(Template, WebTemplate)]
#[template(path = "resources/list.html")]
pub struct ResourceListTemplate {
    pub base_path: String,
    pub noun: &'static str,
    pub table: DataTableConfig,
    pub rows: Vec<TableRow>,
}

/// Create/edit modal, swapped into `#modal`.
#[derive(Template, WebTemplate)]
#[template(path = "resources/form.html")]
pub struct FormModalTemplate {
    pub title: String,
    pub action: String,
    pub fields: Vec<FormField>,
}

fn base_path<R: AdminResource>() -> String {
    format!("/{}", R::PATH)
}

async fn load_rows<R: ResourcePage>(api: &ApiClient, search: &str) -> Result<Vec<TableRow>> {
    let records = api.admin_list::<R>(Some(search)).await?;
    Ok(records
        .iter()
        .map(|record| TableRow {
            id: R::id(record).to_string(),
            cells: R::row(record),
            links: R::row_links(record),
        })
        .collect())
}

// =============================================================================
// Handlers
// =============================================================================

/// List page. A failed load still renders the page, with a toast.
#[instrument(skip_all, fields(resource = R::PATH))]
pub async fn index<R: ResourcePage>(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<ResourceIndexTemplate> {
    let (rows, toast) = match load_rows::<R>(&admin.api, query.term()).await {
        Ok(rows) => (rows, None),
        Err(err) => (Vec::new(), Some(inline_failure(err)?)),
    };

    Ok(ResourceIndexTemplate {
        page: Chrome::new(&admin, R::TITLE, base_path::<R>()).with_toast(toast),
        debounce_ms: state.config().search_debounce_ms(),
        base_path: base_path::<R>(),
        noun: R::NOUN,
        table: R::table(),
        rows,
    })
}

/// Table fragment for searches and reloads.
#[instrument(skip_all, fields(resource = R::PATH))]
pub async fn list<R: ResourcePage>(
    RequireAdminAuth(admin): RequireAdminAuth,
    Query(query): Query<SearchQuery>,
) -> Result<ResourceListTemplate> {
    Ok(ResourceListTemplate {
        base_path: base_path::<R>(),
        noun: R::NOUN,
        table: R::table(),
        rows: load_rows::<R>(&admin.api, query.term()).await?,
    })
}

pub async fn new_form<R: ResourcePage>(
    RequireAdminAuth(_admin): RequireAdminAuth,
) -> FormModalTemplate {
    FormModalTemplate {
        title: format!("New {}", R::NOUN),
        action: base_path::<R>(),
        fields: R::fields(None),
    }
}

/// Edit modal, prefilled from the current list.
#[instrument(skip_all, fields(resource = R::PATH, id = %id))]
pub async fn edit_form<R: ResourcePage>(
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<R::Id>,
) -> Result<FormModalTemplate> {
    let records = admin.api.admin_list::<R>(None).await?;
    let record = records
        .iter()
        .find(|record| R::id(record) == id)
        .ok_or_else(|| AppError::NotFound(format!("{} {id}", capitalize(R::NOUN))))?;

    Ok(FormModalTemplate {
        title: format!("Edit {}", R::NOUN),
        action: format!("{}/{id}", base_path::<R>()),
        fields: R::fields(Some(record)),
    })
}

#[instrument(skip_all, fields(resource = R::PATH))]
pub async fn create<R: ResourcePage>(
    RequireAdminAuth(admin): RequireAdminAuth,
    Form(values): Form<FormValues>,
) -> Result<Response> {
    let modal = FormModalTemplate {
        title: format!("New {}", R::NOUN),
        action: base_path::<R>(),
        fields: values.refill(R::fields(None)),
    };
    save::<R>(&admin.api, None, &values, modal).await
}

#[instrument(skip_all, fields(resource = R::PATH, id = %id))]
pub async fn update<R: ResourcePage>(
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<R::Id>,
    Form(values): Form<FormValues>,
) -> Result<Response> {
    let modal = FormModalTemplate {
        title: format!("Edit {}", R::NOUN),
        action: format!("{}/{id}", base_path::<R>()),
        fields: values.refill(R::fields(None)),
    };
    save::<R>(&admin.api, Some(id), &values, modal).await
}

/// Validate, send, and answer with either a closed modal or the same modal
/// with the operator's input and an error toast.
async fn save<R: ResourcePage>(
    api: &ApiClient,
    id: Option<R::Id>,
    values: &FormValues,
    modal: FormModalTemplate,
) -> Result<Response> {
    let outcome = match R::parse(values) {
        Ok(input) => match id {
            Some(id) => api.admin_update::<R>(id, &input).await,
            None => api.admin_create::<R>(&input).await,
        }
        .map_err(AppError::from),
        Err(err) => Err(err.into()),
    };

    match outcome {
        Ok(()) => {
            tracing::info!(resource = R::PATH, "saved");
            let toast = Toast::success(format!("{} saved", capitalize(R::NOUN)));
            Ok(trigger(with_toast(String::new(), &toast)?, RESOURCE_CHANGED))
        }
        Err(err) => {
            let toast = inline_failure(err)?;
            Ok(with_toast(modal.render()?, &toast)?.into_response())
        }
    }
}

#[instrument(skip_all, fields(resource = R::PATH, id = %id))]
pub async fn delete<R: ResourcePage>(
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<R::Id>,
) -> Result<Response> {
    admin.api.admin_delete::<R>(id).await?;
    tracing::info!(resource = R::PATH, %id, "deleted");
    let toast = Toast::success(format!("{} deleted", capitalize(R::NOUN)));
    Ok(trigger(with_toast(String::new(), &toast)?, RESOURCE_CHANGED))
}

/// Routes for one resource under `/{R::PATH}`.
pub fn resource_routes<R: ResourcePage>() -> Router<AppState> {
    let base = base_path::<R>();
    Router::new()
        .route(&base, get(index::<R>).post(create::<R>))
        .route(&format!("{base}/list"), get(list::<R>))
        .route(&format!("{base}/new"), get(new_form::<R>))
        .route(
            &format!("{base}/{{id}}"),
            post(update::<R>).delete(delete::<R>),
        )
        .route(&format!("{base}/{{id}}/edit"), get(edit_form::<R>))
}

fn capitalize(noun: &str) -> String {
    let mut chars = noun.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_refill_keeps_operator_input() {
        let values = FormValues::from([("code", "SPRING"), ("discount", "abc")]);
        let fields = values.refill(vec![
            FormField::text("code", "Code"),
            FormField::number("discount", "Discount").value("10"),
            FormField::checkbox("active", "Active").checked(true),
        ]);
        assert_eq!(fields[0].value, "SPRING");
        assert_eq!(fields[1].value, "abc");
        assert!(!fields[2].is_checked());
    }

    #[test]
    fn test_blank_values_are_absent() {
        let values = FormValues::from([("brand", "  "), ("active", "on")]);
        assert_eq!(values.opt("brand"), None);
        assert_eq!(values.opt("material"), None);
        assert!(values.flag("active"));
        assert!(!values.flag("featured"));
    }

    #[test]
    fn test_optional_id() {
        let id: Option<threadline_core::CategoryId> = optional_id("Category", Some("7")).unwrap();
        assert_eq!(id.map(|id| id.as_i64()), Some(7));
        assert_eq!(
            optional_id::<threadline_core::CategoryId>("Category", Some("seven")),
            Err(ValidationError::NotANumber { field: "Category" })
        );
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("carousel item"), "Carousel item");
        assert_eq!(capitalize(""), "");
    }
}
