//! Product content block editor.
//!
//! Deleting a block is optimistic: the browser hides it as soon as the
//! request starts, and the response re-renders the list. When the API
//! refuses the delete the block is put back where it was, with a toast.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::Path,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use threadline_client::{ContentBlock, ContentBlockInput};
use threadline_core::validation::required;
use threadline_core::{ContentBlockId, ProductId};

use super::inline_failure;
use crate::components::Toast;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::middleware::htmx::with_toast;
use crate::page::Chrome;

/// Blocks as displayed, with at most one removal awaiting confirmation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentList {
    blocks: Vec<ContentBlock>,
    pending: Option<(usize, ContentBlock)>,
}

impl ContentList {
    #[must_use]
    pub const fn new(blocks: Vec<ContentBlock>) -> Self {
        Self {
            blocks,
            pending: None,
        }
    }

    /// Take `id` out of the displayed list. Returns whether it was shown.
    pub fn remove(&mut self, id: ContentBlockId) -> bool {
        self.restore();
        let Some(index) = self.blocks.iter().position(|block| block.id == id) else {
            return false;
        };
        let block = self.blocks.remove(index);
        self.pending = Some((index, block));
        true
    }

    /// The server refused: put the pending block back in its slot.
    pub fn restore(&mut self) {
        if let Some((index, block)) = self.pending.take() {
            let index = index.min(self.blocks.len());
            self.blocks.insert(index, block);
        }
    }

    /// The server accepted: forget the pending block.
    pub fn confirm(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub fn blocks(&self) -> &[ContentBlock] {
        &self.blocks
    }

    #[must_use]
    pub fn into_blocks(self) -> Vec<ContentBlock> {
        self.blocks
    }
}

#[derive(Debug, Deserialize)]
pub struct BlockForm {
    pub heading: String,
    pub body: String,
}

/// Editor page template.
#[derive(Template, WebTemplate)]
#[template(path = "content/editor.html")]
pub struct ContentEditorTemplate {
    pub page: Chrome,
    pub product_id: ProductId,
    pub product_name: String,
    pub blocks: Vec<ContentBlock>,
}

/// Block list fragment, swapped into `#content-blocks`.
#[derive(Template)]
#[template(path = "content/blocks.html")]
pub struct ContentBlocksTemplate {
    pub product_id: ProductId,
    pub blocks: Vec<ContentBlock>,
}

fn blocks_with_toast(product_id: ProductId, blocks: Vec<ContentBlock>, toast: &Toast) -> Result<Html<String>> {
    let html = ContentBlocksTemplate { product_id, blocks }.render()?;
    Ok(with_toast(html, toast)?)
}

/// Editor page handler.
#[instrument(skip_all, fields(product_id = %product_id))]
pub async fn editor(
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(product_id): Path<ProductId>,
) -> Result<ContentEditorTemplate> {
    let (product, blocks) = tokio::join!(
        admin.api.get_product(product_id),
        admin.api.admin_product_content(product_id),
    );

    let product_name = match product {
        Ok(product) => product.name,
        Err(err) => {
            tracing::warn!(error = %err, "product name unavailable");
            format!("Product {product_id}")
        }
    };
    let (blocks, toast) = match blocks {
        Ok(blocks) => (blocks, None),
        Err(err) => (Vec::new(), Some(inline_failure(err.into())?)),
    };

    Ok(ContentEditorTemplate {
        page: Chrome::new(
            &admin,
            format!("Content: {product_name}"),
            format!("/products/{product_id}/content"),
        )
        .with_toast(toast),
        product_id,
        product_name,
        blocks,
    })
}

/// Add a block, then re-render the list from the API.
#[instrument(skip_all, fields(product_id = %product_id))]
pub async fn add_block(
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(product_id): Path<ProductId>,
    Form(form): Form<BlockForm>,
) -> Result<Response> {
    let block = ContentBlockInput {
        heading: required("Heading", &form.heading)?.to_string(),
        body: required("Body", &form.body)?.to_string(),
    };
    admin.api.admin_add_content_block(product_id, &block).await?;
    tracing::info!("content block added");

    let blocks = admin.api.admin_product_content(product_id).await?;
    Ok(blocks_with_toast(product_id, blocks, &Toast::success("Block added"))?.into_response())
}

/// Remove a block optimistically.
#[instrument(skip_all, fields(product_id = %product_id, block_id = %block_id))]
pub async fn remove_block(
    RequireAdminAuth(admin): RequireAdminAuth,
    Path((product_id, block_id)): Path<(ProductId, ContentBlockId)>,
) -> Result<Response> {
    let mut list = ContentList::new(admin.api.admin_product_content(product_id).await?);
    list.remove(block_id);

    let toast = match admin
        .api
        .admin_delete_content_block(product_id, block_id)
        .await
    {
        Ok(()) => {
            list.confirm();
            tracing::info!("content block removed");
            Toast::success("Block removed")
        }
        Err(err) => {
            list.restore();
            inline_failure(err.into())?
        }
    };

    Ok(blocks_with_toast(product_id, list.into_blocks(), &toast)?.into_response())
}
