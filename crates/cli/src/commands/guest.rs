//! Guest cart inspection from a file-backed store.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use threadline_client::{FileStore, LocalStorage};

use super::CliError;

/// Print the header badge count for a visitor's guest cart.
///
/// A missing or malformed cart counts as empty.
///
/// # Errors
///
/// Returns an error if the storage directory cannot be opened or output
/// cannot be written.
pub fn cart_count(storage_dir: &Path, scope: &str, out: &mut impl Write) -> Result<(), CliError> {
    let store = FileStore::open(storage_dir)?;
    let storage = LocalStorage::new(Arc::new(store), scope);
    let cart = storage.guest_cart();

    tracing::debug!(scope, lines = cart.lines().len(), "guest cart read");
    writeln!(out, "{}", cart.total_quantity())?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use threadline_client::storage::keys;
    use threadline_client::KeyValueStore;

    use super::*;

    fn count(dir: &Path, scope: &str) -> String {
        let mut out = Vec::new();
        cart_count(dir, scope, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_count_is_the_sum_of_quantities() {
        let dir = tempfile::tempdir().unwrap();
        FileStore::open(dir.path())
            .unwrap()
            .set(
                "visitor-1",
                keys::CART_GUEST,
                r#"[{"productId": 1, "quantity": 2}, {"productId": 2}, {"productId": 3, "quantity": 4}]"#,
            )
            .unwrap();

        assert_eq!(count(dir.path(), "visitor-1"), "7\n");
        assert_eq!(count(dir.path(), "visitor-2"), "0\n");
    }

    #[test]
    fn test_malformed_cart_counts_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        FileStore::open(dir.path())
            .unwrap()
            .set("visitor-1", keys::CART_GUEST, "{not json")
            .unwrap();

        assert_eq!(count(dir.path(), "visitor-1"), "0\n");
    }
}
