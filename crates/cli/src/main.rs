//! Threadline CLI - operator tools over the Threadline REST API.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! threadline products list --search linen --category shirts
//! threadline categories list
//!
//! # Manage coupons (needs THREADLINE_ADMIN_TOKEN)
//! threadline coupons list
//! threadline coupons create --code SPRING --type percentage --discount 15
//! threadline coupons delete 42
//!
//! # Watch the sale countdowns tick
//! threadline sales watch
//!
//! # Inspect a visitor's guest cart badge count
//! threadline guest cart-count --storage-dir ./storage --scope 3f2a...
//!
//! # Check which presentation a viewport gets
//! threadline device classify 768
//! ```
//!
//! # Environment Variables
//!
//! - `THREADLINE_API_URL` - REST API base URL (default `http://localhost:5001/api`)
//! - `THREADLINE_ADMIN_TOKEN` - administrator bearer token for `coupons`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use threadline_core::CouponId;

mod commands;

use commands::CliError;
use commands::coupons::NewCoupon;

#[derive(Parser)]
#[command(name = "threadline")]
#[command(author, version, about = "Threadline operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Browse categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Manage coupons
    Coupons {
        #[command(subcommand)]
        action: CouponAction,
    },
    /// Sale strip countdowns
    Sales {
        #[command(subcommand)]
        action: SaleAction,
    },
    /// Inspect guest state kept in local storage
    Guest {
        #[command(subcommand)]
        action: GuestAction,
    },
    /// Viewport classification
    Device {
        #[command(subcommand)]
        action: DeviceAction,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List products
    List {
        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Category id or slug
        #[arg(short, long)]
        category: Option<String>,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List categories
    List,
}

#[derive(Subcommand)]
enum CouponAction {
    /// List coupons
    List {
        /// Filter by code
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Create a coupon
    Create {
        /// Coupon code (stored uppercase)
        #[arg(short, long)]
        code: String,

        /// Discount type (`percentage` or `fixed`)
        #[arg(short = 't', long = "type", default_value = "percentage")]
        kind: String,

        /// Percentage or amount off; not capped at 100
        #[arg(short, long)]
        discount: Decimal,

        /// Cap on the amount taken off
        #[arg(long)]
        max_discount: Option<Decimal>,

        /// Minimum order subtotal
        #[arg(long)]
        min_order: Option<Decimal>,

        /// Expiry timestamp
        #[arg(long)]
        expires_at: Option<String>,

        /// Create the coupon switched off
        #[arg(long)]
        inactive: bool,
    },
    /// Delete a coupon
    Delete {
        /// Coupon id
        id: i64,
    },
}

#[derive(Subcommand)]
enum SaleAction {
    /// Live countdown for the active sales
    Watch {
        /// Stop after this many frames
        #[arg(long)]
        frames: Option<u64>,
    },
}

#[derive(Subcommand)]
enum GuestAction {
    /// Print the cart badge count for a visitor
    CartCount {
        /// Directory of the file-backed store
        #[arg(long)]
        storage_dir: PathBuf,

        /// Visitor id the values are stored under
        #[arg(long)]
        scope: String,
    },
}

#[derive(Subcommand)]
enum DeviceAction {
    /// Classify a viewport width in CSS pixels
    Classify { width: u32 },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "threadline_cli=info,threadline_client=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let stdout = std::io::stdout();
    let result = run(cli, &mut stdout.lock()).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, out: &mut impl Write) -> Result<(), CliError> {
    match cli.command {
        Commands::Products { action } => match action {
            ProductAction::List { search, category } => {
                let api = commands::api_client()?;
                commands::catalog::list_products(&api, search, category, out).await?;
            }
        },
        Commands::Categories { action } => match action {
            CategoryAction::List => {
                let api = commands::api_client()?;
                commands::catalog::list_categories(&api, out).await?;
            }
        },
        Commands::Coupons { action } => {
            let api = commands::admin_client()?;
            match action {
                CouponAction::List { search } => {
                    commands::coupons::list(&api, search.as_deref(), out).await?;
                }
                CouponAction::Create {
                    code,
                    kind,
                    discount,
                    max_discount,
                    min_order,
                    expires_at,
                    inactive,
                } => {
                    let coupon = NewCoupon {
                        code,
                        kind,
                        discount,
                        max_discount,
                        min_order_amount: min_order,
                        expires_at,
                        inactive,
                    };
                    commands::coupons::create(&api, coupon, out).await?;
                }
                CouponAction::Delete { id } => {
                    commands::coupons::delete(&api, CouponId::new(id), out).await?;
                }
            }
        }
        Commands::Sales { action } => match action {
            SaleAction::Watch { frames } => {
                let api = commands::api_client()?;
                commands::sales::watch(&api, frames, out).await?;
            }
        },
        Commands::Guest { action } => match action {
            GuestAction::CartCount { storage_dir, scope } => {
                commands::guest::cart_count(&storage_dir, &scope, out)?;
            }
        },
        Commands::Device { action } => match action {
            DeviceAction::Classify { width } => commands::device::classify(width, out)?,
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_coupon_create_parses_decimal_amounts() {
        let cli = Cli::try_parse_from([
            "threadline", "coupons", "create", "--code", "big150", "--discount", "150",
        ])
        .unwrap();
        let Commands::Coupons {
            action: CouponAction::Create { kind, discount, inactive, .. },
        } = cli.command
        else {
            panic!("expected coupons create");
        };
        assert_eq!(kind, "percentage");
        assert_eq!(discount, Decimal::from(150));
        assert!(!inactive);
    }

    #[tokio::test]
    async fn test_device_command_runs_offline() {
        let cli = Cli::try_parse_from(["threadline", "device", "classify", "1024"]).unwrap();
        let mut out = Vec::new();
        run(cli, &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "web (1024px > 768px)\n");
    }
}
