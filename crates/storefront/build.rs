//! Build script for the storefront crate.
//!
//! Fingerprints the stylesheet and page script so templates can reference
//! them with a cache-busting query string.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");

    fingerprint(&manifest_dir, "static/css/main.css", "CSS_HASH");
    fingerprint(&manifest_dir, "static/js/app.js", "JS_HASH");
}

/// Hash `relative` and expose the first 8 hex chars as `env_name`.
fn fingerprint(manifest_dir: &str, relative: &str, env_name: &str) {
    let path = Path::new(manifest_dir).join(relative);
    println!("cargo:rerun-if-changed={}", path.display());

    let Ok(content) = fs::read(&path) else {
        println!("cargo:warning=Could not read {relative}; asset will not be fingerprinted");
        println!("cargo:rustc-env={env_name}=dev");
        return;
    };

    let hash = format!("{:x}", Sha256::digest(&content));
    println!("cargo:rustc-env={env_name}={}", &hash[..8]);
}
