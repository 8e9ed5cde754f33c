//! Product and category listings.

use std::io::Write;

use threadline_client::{ApiClient, Category, Product, ProductQuery};
use threadline_core::Price;

use super::CliError;

fn product_line(product: &Product) -> String {
    let price = Price::usd(product.effective_price()).display();
    let list = if product.is_on_sale() {
        format!("{price} (was {})", Price::usd(product.price).display())
    } else {
        price
    };
    let stock = if product.in_stock() { "" } else { "  [out of stock]" };
    format!(
        "{:>6}  {:<32}  {list}{stock}",
        product.id.to_string(),
        product.name
    )
}

fn category_line(category: &Category, all: &[Category]) -> String {
    let parent = category
        .parent_id
        .and_then(|id| all.iter().find(|c| c.id == id))
        .map(|parent| format!("  (in {})", parent.name))
        .unwrap_or_default();
    format!("{:>6}  {}{parent}", category.id.to_string(), category.name)
}

/// Print the product listing, optionally filtered.
///
/// # Errors
///
/// Returns an error if the request fails or output cannot be written.
pub async fn list_products(
    api: &ApiClient,
    search: Option<String>,
    category: Option<String>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let query = ProductQuery {
        search,
        category,
        ..ProductQuery::default()
    };
    let listing = api.list_products(&query).await?;

    if listing.items.is_empty() {
        writeln!(out, "No products found")?;
        return Ok(());
    }
    for product in &listing.items {
        writeln!(out, "{}", product_line(product))?;
    }
    let total = listing.total.unwrap_or(listing.items.len() as u64);
    writeln!(out, "{} of {total} products", listing.items.len())?;
    Ok(())
}

/// Print every category.
///
/// # Errors
///
/// Returns an error if the request fails or output cannot be written.
pub async fn list_categories(api: &ApiClient, out: &mut impl Write) -> Result<(), CliError> {
    let categories = api.list_categories().await?;
    if categories.is_empty() {
        writeln!(out, "No categories")?;
    }
    for category in &categories {
        writeln!(out, "{}", category_line(category, &categories))?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn test_products_list_forwards_filters_and_shows_sale_prices() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products"))
            .and(query_param("search", "linen"))
            .and(query_param("category", "shirts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "products": [
                    {"_id": 1, "name": "Linen Shirt", "price": 40, "discount": 25},
                    {"_id": 2, "name": "Linen Cap", "price": 12, "stock": 0}
                ],
                "total": 7
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::new(&format!("{}/api", server.uri())).unwrap();
        let mut out = Vec::new();
        list_products(
            &api,
            Some("linen".to_string()),
            Some("shirts".to_string()),
            &mut out,
        )
        .await
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("$30.00 (was $40.00)"));
        assert!(text.contains("Linen Cap"));
        assert!(text.contains("[out of stock]"));
        assert!(text.ends_with("2 of 7 products\n"));
    }

    #[tokio::test]
    async fn test_server_message_becomes_the_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/categories"))
            .respond_with(
                ResponseTemplate::new(503).set_body_json(json!({"message": "Catalog offline"})),
            )
            .mount(&server)
            .await;

        let api = ApiClient::new(&format!("{}/api", server.uri())).unwrap();
        let err = list_categories(&api, &mut Vec::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "Catalog offline");
    }

    #[test]
    fn test_category_line_names_the_parent() {
        let all: Vec<Category> = serde_json::from_value(json!([
            {"_id": 1, "name": "Tops"},
            {"_id": 2, "name": "Shirts", "parentId": 1}
        ]))
        .unwrap();
        assert_eq!(category_line(&all[1], &all), "     2  Shirts  (in Tops)");
    }
}
