//! Product listing and detail handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::instrument;

use threadline_client::{Category, ContentBlock, Product, ProductQuery};
use threadline_core::ProductId;
use threadline_core::ui::Accordion;

use super::Fallbacks;
use crate::components::HeaderProps;
use crate::error::Result;
use crate::filters;
use crate::filters::PLACEHOLDER_IMAGE;
use crate::page::{Chrome, PageContext};
use crate::state::AppState;

/// Products per listing page.
pub const PAGE_SIZE: u32 = 24;

/// Listing filters from the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilters {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub category: String,
    pub page: Option<u32>,
}

impl ProductFilters {
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    #[must_use]
    pub fn to_query(&self) -> ProductQuery {
        ProductQuery {
            search: Some(self.search.clone()),
            category: Some(self.category.clone()),
            page: Some(self.page()),
            limit: Some(PAGE_SIZE),
        }
    }

    /// Query string for another page of the same listing.
    #[must_use]
    pub fn page_href(&self, page: u32) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if !self.search.trim().is_empty() {
            query.append_pair("search", self.search.trim());
        }
        if !self.category.is_empty() {
            query.append_pair("category", &self.category);
        }
        query.append_pair("page", &page.to_string());
        format!("/products?{}", query.finish())
    }
}

/// One page of listing results.
#[derive(Debug, Clone, Default)]
pub struct ProductResults {
    pub products: Vec<Product>,
    pub filters: ProductFilters,
    pub total: Option<u64>,
}

impl ProductResults {
    /// A next page exists when the API reported more matches, or, without a
    /// total, when this page came back full.
    #[must_use]
    pub fn has_next(&self) -> bool {
        let shown = u64::from(self.filters.page()) * u64::from(PAGE_SIZE);
        self.total.map_or_else(
            || self.products.len() >= PAGE_SIZE as usize,
            |total| total > shown,
        )
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.filters.page() > 1
    }

    #[must_use]
    pub fn image<'a>(&self, product: &'a Product) -> &'a str {
        product.primary_image().unwrap_or(PLACEHOLDER_IMAGE)
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/products.html")]
pub struct ProductsTemplate {
    pub page: Chrome,
    pub categories: Vec<Category>,
    pub results: ProductResults,
}

/// Listing results fragment, swapped by the search box.
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_results.html")]
pub struct ProductResultsTemplate {
    pub results: ProductResults,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/product.html")]
pub struct ProductTemplate {
    pub page: Chrome,
    pub product: Product,
    pub details: ProductDetailsTemplate,
}

impl ProductTemplate {
    #[must_use]
    pub fn image(&self) -> &str {
        self.product.primary_image().unwrap_or(PLACEHOLDER_IMAGE)
    }
}

/// Content blocks as an accordion: at most one section open.
#[derive(Debug, Clone, Template, WebTemplate)]
#[template(path = "partials/product_details.html")]
pub struct ProductDetailsTemplate {
    pub product_id: ProductId,
    pub blocks: Vec<ContentBlock>,
    pub accordion: Accordion,
}

/// One accordion section as the template shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailsSection<'a> {
    pub heading: &'a str,
    pub body: &'a str,
    pub open: bool,
    pub toggle_href: String,
}

impl ProductDetailsTemplate {
    /// Link that toggles `section` from the current state.
    #[must_use]
    pub fn toggle_href(&self, section: usize) -> String {
        let mut href = format!("/products/{}/details?toggle={section}", self.product_id);
        if let Some(open) = self.accordion.expanded() {
            href.push_str(&format!("&open={open}"));
        }
        href
    }

    #[must_use]
    pub fn sections(&self) -> Vec<DetailsSection<'_>> {
        self.blocks
            .iter()
            .enumerate()
            .map(|(index, block)| DetailsSection {
                heading: &block.heading,
                body: &block.body,
                open: self.accordion.is_expanded(index),
                toggle_href: self.toggle_href(index),
            })
            .collect()
    }
}

/// Display the product listing.
#[instrument(skip(ctx))]
pub async fn index(ctx: PageContext, Query(filters): Query<ProductFilters>) -> Result<ProductsTemplate> {
    let api = ctx.visitor.api();
    let query = filters.to_query();
    let (listing, categories) = tokio::join!(
        api.list_products(&query),
        api.list_categories()
    );

    let mut fallbacks = Fallbacks::default();
    let listing = fallbacks.take("products", listing);
    let categories = fallbacks.take("categories", categories);

    let page = ctx
        .chrome_with(
            "Shop",
            HeaderProps::default().with_search(filters.search.clone()),
            fallbacks.into_toasts(),
        )
        .await?;

    Ok(ProductsTemplate {
        page,
        categories,
        results: ProductResults {
            products: listing.items,
            total: listing.total,
            filters,
        },
    })
}

/// Listing results only, for the debounced search box.
///
/// Errors surface as a toast; the previous results stay on screen.
#[instrument(skip(state))]
pub async fn results(
    State(state): State<AppState>,
    Query(filters): Query<ProductFilters>,
) -> Result<ProductResultsTemplate> {
    let listing = state.api().list_products(&filters.to_query()).await?;
    Ok(ProductResultsTemplate {
        results: ProductResults {
            products: listing.items,
            total: listing.total,
            filters,
        },
    })
}

/// Display one product with its detail sections.
#[instrument(skip(ctx), fields(product_id = %id))]
pub async fn show(ctx: PageContext, Path(id): Path<ProductId>) -> Result<ProductTemplate> {
    let api = ctx.visitor.api();
    let (product, blocks) = tokio::join!(api.get_product(id), api.product_content(id));
    let product = product?;

    let mut fallbacks = Fallbacks::default();
    let blocks = fallbacks.take("product content", blocks);
    let page = ctx
        .chrome_with(product.name.clone(), HeaderProps::default(), fallbacks.into_toasts())
        .await?;

    Ok(ProductTemplate {
        page,
        product,
        details: ProductDetailsTemplate {
            product_id: id,
            blocks,
            accordion: Accordion::with_expanded(Some(0)),
        },
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct DetailsQuery {
    /// Section open before the click.
    pub open: Option<usize>,
    /// Section that was clicked.
    pub toggle: Option<usize>,
}

/// Re-render the detail accordion after a section header was clicked.
#[instrument(skip(state), fields(product_id = %id))]
pub async fn details(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Query(query): Query<DetailsQuery>,
) -> Result<ProductDetailsTemplate> {
    let blocks = state.api().product_content(id).await?;
    let mut accordion = Accordion::with_expanded(query.open.filter(|&i| i < blocks.len()));
    if let Some(section) = query.toggle.filter(|&i| i < blocks.len()) {
        accordion.toggle(section);
    }

    Ok(ProductDetailsTemplate {
        product_id: id,
        blocks,
        accordion,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_filters_are_left_out_of_page_links() {
        let filters = ProductFilters {
            search: " linen ".to_string(),
            ..ProductFilters::default()
        };
        assert_eq!(filters.page_href(2), "/products?search=linen&page=2");
        assert_eq!(filters.page(), 1);
    }

    #[test]
    fn test_next_page_from_total_or_full_page() {
        let mut results = ProductResults {
            total: Some(30),
            ..ProductResults::default()
        };
        assert!(results.has_next());
        results.filters.page = Some(2);
        assert!(!results.has_next());
        assert!(results.has_previous());

        results.total = None;
        assert!(!results.has_next());
    }

    #[test]
    fn test_toggle_links_carry_the_open_section() {
        let details = ProductDetailsTemplate {
            product_id: ProductId::new(9),
            blocks: Vec::new(),
            accordion: Accordion::with_expanded(Some(1)),
        };
        assert_eq!(details.toggle_href(2), "/products/9/details?toggle=2&open=1");
    }

    #[test]
    fn test_only_one_section_renders_open() {
        let block = |i: i64| ContentBlock {
            id: threadline_core::ContentBlockId::new(i),
            heading: format!("Heading {i}"),
            body: format!("Body {i}"),
        };
        let details = ProductDetailsTemplate {
            product_id: ProductId::new(9),
            blocks: vec![block(1), block(2)],
            accordion: Accordion::with_expanded(Some(1)),
        };
        let html = details.render().unwrap();
        assert!(html.contains("Body 2"));
        assert!(!html.contains("Body 1"));
        assert!(html.contains(r#"aria-expanded="true""#));
        assert!(html.contains(r#"aria-expanded="false""#));
        assert!(html.contains("/products/9/details?toggle=0&amp;open=1"));
    }
}
