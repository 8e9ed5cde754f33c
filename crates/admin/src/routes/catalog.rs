//! Product and category pages.

use threadline_client::{
    Category, CategoryInput, CategoryResource, Product, ProductInput, ProductResource,
};
use threadline_core::validation::{
    ValidationError, comma_list, decimal, non_negative, optional, optional_decimal, percentage,
    required, whole_number,
};
use threadline_core::{CategoryId, ProductId};

use super::resources::{FormValues, ResourcePage, optional_id};
use crate::components::{DataTableConfig, FormField, RowLink, TableColumn};
use crate::filters::display_money;

fn owned(value: Option<&str>) -> Option<String> {
    optional(value).map(str::to_string)
}

impl ResourcePage for ProductResource {
    const TITLE: &'static str = "Products";

    fn table() -> DataTableConfig {
        DataTableConfig::new("products-table")
            .column(TableColumn::new("name", "Name"))
            .column(TableColumn::new("category", "Category"))
            .column(TableColumn::numeric("price", "Price"))
            .column(TableColumn::numeric("sale_price", "Sale price"))
            .column(TableColumn::numeric("stock", "Stock"))
            .search_placeholder("Search products...")
            .empty_state("No products found", Some("Try a different search or add a product."))
    }

    fn id(record: &Product) -> ProductId {
        record.id
    }

    fn row(product: &Product) -> Vec<String> {
        vec![
            product.name.clone(),
            product.category_name.clone().unwrap_or_else(|| "-".to_string()),
            display_money(&product.price.to_string()),
            product
                .sale_price
                .map_or_else(|| "-".to_string(), |p| display_money(&p.to_string())),
            product.stock.map_or_else(|| "N/A".to_string(), |s| s.to_string()),
        ]
    }

    fn row_links(product: &Product) -> Vec<RowLink> {
        vec![RowLink {
            href: format!("/products/{}/content", product.id),
            label: "Content",
        }]
    }

    fn fields(product: Option<&Product>) -> Vec<FormField> {
        vec![
            FormField::text("name", "Name")
                .required()
                .maybe(product.map(|p| &p.name)),
            FormField::textarea("description", "Description")
                .maybe(product.and_then(|p| p.description.as_ref())),
            FormField::number("price", "Price")
                .required()
                .maybe(product.map(|p| p.price)),
            FormField::number("sale_price", "Sale price")
                .maybe(product.and_then(|p| p.sale_price)),
            FormField::number("discount", "Discount (%)")
                .hint("Percent between 0 and 100")
                .maybe(product.and_then(|p| p.discount)),
            FormField::number("category_id", "Category id")
                .maybe(product.and_then(|p| p.category_id)),
            FormField::textarea("images", "Image URLs")
                .hint("Comma separated")
                .maybe(product.map(|p| p.images.join(", "))),
            FormField::text("sizes", "Sizes")
                .hint("Comma separated, e.g. S, M, L")
                .maybe(product.map(|p| p.sizes.join(", "))),
            FormField::text("colors", "Colors")
                .hint("Comma separated")
                .maybe(product.map(|p| p.colors.join(", "))),
            FormField::number("stock", "Stock")
                .required()
                .maybe(product.and_then(|p| p.stock)),
            FormField::text("brand", "Brand").maybe(product.and_then(|p| p.brand.as_ref())),
            FormField::text("material", "Material")
                .maybe(product.and_then(|p| p.material.as_ref())),
        ]
    }

    fn parse(form: &FormValues) -> Result<ProductInput, ValidationError> {
        let name = required("Name", form.get("name"))?.to_string();
        let price = non_negative("Price", decimal("Price", form.get("price"))?)?;
        let sale_price = optional_decimal("Sale price", form.opt("sale_price"))?
            .map(|value| non_negative("Sale price", value))
            .transpose()?;
        let discount = optional_decimal("Discount", form.opt("discount"))?
            .map(|value| percentage("Discount", value))
            .transpose()?;
        let category_id: Option<CategoryId> = optional_id("Category", form.opt("category_id"))?;
        let stock = whole_number("Stock", form.get("stock"))?;

        Ok(ProductInput {
            name,
            description: owned(form.opt("description")),
            price,
            sale_price,
            discount,
            category_id,
            images: comma_list(form.opt("images")),
            sizes: comma_list(form.opt("sizes")),
            colors: comma_list(form.opt("colors")),
            stock,
            brand: owned(form.opt("brand")),
            material: owned(form.opt("material")),
        })
    }
}

impl ResourcePage for CategoryResource {
    const TITLE: &'static str = "Categories";

    fn table() -> DataTableConfig {
        DataTableConfig::new("categories-table")
            .column(TableColumn::new("name", "Name"))
            .column(TableColumn::new("slug", "Slug"))
            .column(TableColumn::new("parent", "Parent"))
            .search_placeholder("Search categories...")
            .empty_state("No categories yet", None)
    }

    fn id(record: &Category) -> CategoryId {
        record.id
    }

    fn row(category: &Category) -> Vec<String> {
        vec![
            category.name.clone(),
            category.slug.clone().unwrap_or_default(),
            category
                .parent_id
                .map_or_else(|| "-".to_string(), |id| id.to_string()),
        ]
    }

    fn fields(category: Option<&Category>) -> Vec<FormField> {
        vec![
            FormField::text("name", "Name")
                .required()
                .maybe(category.map(|c| &c.name)),
            FormField::text("slug", "Slug").maybe(category.and_then(|c| c.slug.as_ref())),
            FormField::textarea("description", "Description")
                .maybe(category.and_then(|c| c.description.as_ref())),
            FormField::url("image", "Image URL").maybe(category.and_then(|c| c.image.as_ref())),
            FormField::number("parent_id", "Parent category id")
                .maybe(category.and_then(|c| c.parent_id)),
        ]
    }

    fn parse(form: &FormValues) -> Result<CategoryInput, ValidationError> {
        Ok(CategoryInput {
            name: required("Name", form.get("name"))?.to_string(),
            slug: owned(form.opt("slug")),
            description: owned(form.opt("description")),
            image: owned(form.opt("image")),
            parent_id: optional_id("Parent category", form.opt("parent_id"))?,
        })
    }
}
