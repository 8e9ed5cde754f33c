//! Product comparison: a table on web, stacked cards on mobile.

use askama::Template;

use threadline_client::Product;
use threadline_core::Price;

use crate::dispatch::responsive;
use crate::filters::PLACEHOLDER_IMAGE;

/// Shown for attributes a product does not have.
pub const MISSING: &str = "N/A";

/// One compared attribute across every product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareRow {
    pub label: &'static str,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompareProps {
    pub products: Vec<Product>,
}

impl CompareProps {
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Attribute rows in display order, one value per product.
    #[must_use]
    pub fn rows(&self) -> Vec<CompareRow> {
        let products = &self.products;
        vec![
            row(products, "Price", |p| Some(Price::usd(p.effective_price()).display())),
            row(products, "Brand", |p| p.brand.clone()),
            row(products, "Category", |p| p.category_name.clone()),
            row(products, "Material", |p| p.material.clone()),
            row(products, "Sizes", |p| Some(p.sizes.join(", "))),
            row(products, "Colors", |p| Some(p.colors.join(", "))),
            row(products, "Availability", |p| {
                Some(if p.in_stock() { "In stock" } else { "Out of stock" }.to_string())
            }),
        ]
    }

    /// Each product with its `(label, value)` pairs, for the card layout.
    #[must_use]
    pub fn cards(&self) -> Vec<(&Product, Vec<(&'static str, String)>)> {
        let rows = self.rows();
        self.products
            .iter()
            .enumerate()
            .map(|(index, product)| {
                let fields = rows
                    .iter()
                    .filter_map(|row| row.values.get(index).map(|v| (row.label, v.clone())))
                    .collect();
                (product, fields)
            })
            .collect()
    }

    #[must_use]
    pub fn image<'a>(&self, product: &'a Product) -> &'a str {
        product.primary_image().unwrap_or(PLACEHOLDER_IMAGE)
    }
}

fn row(
    products: &[Product],
    label: &'static str,
    value: impl Fn(&Product) -> Option<String>,
) -> CompareRow {
    CompareRow {
        label,
        values: products
            .iter()
            .map(|p| {
                value(p)
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(|| MISSING.to_string())
            })
            .collect(),
    }
}

#[derive(Template)]
#[template(path = "components/compare_web.html")]
pub struct CompareWeb<'a> {
    pub props: &'a CompareProps,
}

#[derive(Template)]
#[template(path = "components/compare_mobile.html")]
pub struct CompareMobile<'a> {
    pub props: &'a CompareProps,
}

responsive!(CompareProps => CompareWeb, CompareMobile);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use threadline_core::{Device, ProductId};

    use super::*;
    use crate::dispatch::render;

    fn product(id: i64, brand: Option<&str>) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Tee {id}"),
            description: None,
            price: Decimal::new(2500, 2),
            sale_price: None,
            discount: None,
            category_id: None,
            category_name: None,
            images: Vec::new(),
            sizes: vec!["S".into(), "M".into()],
            colors: Vec::new(),
            stock: Some(0),
            brand: brand.map(str::to_string),
            material: None,
        }
    }

    #[test]
    fn test_missing_attributes_show_na() {
        let props = CompareProps::new(vec![product(1, Some("Northwind")), product(2, None)]);
        let rows = props.rows();
        let brand = rows.iter().find(|r| r.label == "Brand").unwrap();
        assert_eq!(brand.values, vec!["Northwind", MISSING]);
        let colors = rows.iter().find(|r| r.label == "Colors").unwrap();
        assert_eq!(colors.values, vec![MISSING, MISSING]);
    }

    #[test]
    fn test_card_transposes_rows() {
        let props = CompareProps::new(vec![product(1, Some("Northwind")), product(2, None)]);
        let cards = props.cards();
        let (product, card) = &cards[1];
        assert_eq!(product.name, "Tee 2");
        assert!(card.contains(&("Price", "$25.00".to_string())));
        assert!(card.contains(&("Availability", "Out of stock".to_string())));
    }

    #[test]
    fn test_variants_use_different_markup() {
        let props = CompareProps::new(vec![product(1, None)]);
        assert!(render(&props, Device::Web).unwrap().contains("<table"));
        let mobile = render(&props, Device::Mobile).unwrap();
        assert!(!mobile.contains("<table"));
        assert!(mobile.contains(PLACEHOLDER_IMAGE));
    }
}
