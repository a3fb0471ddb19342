//! Shop CLI - Command line front-end for the storefront cart engine.
//!
//! Commands:
//! - `shop catalog` - Browse or search the catalog
//! - `shop add` / `qty` / `remove` / `select` - Edit the cart
//! - `shop cart` - Show the cart and its totals
//! - `shop favorite` / `favorites` - Toggle and list favorites
//! - `shop checkout` - Check out the selection or the whole cart
//! - `shop profile` - Show or edit the stored profile
//! - `shop config` - Manage configuration

mod commands;
mod config;
mod context;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    CatalogArgs, CheckoutArgs, ConfigArgs, EntryArgs, FavoriteArgs, ProfileArgs, QuantityArgs,
};

/// Shop CLI - Keep a cart and favorites against a local store
#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog items
    Catalog(CatalogArgs),

    /// Add one unit of an item to the cart
    Add(EntryArgs),

    /// Set the quantity of a cart entry
    Qty(QuantityArgs),

    /// Remove a cart entry
    Remove(EntryArgs),

    /// Toggle whether a cart entry is selected for checkout
    Select(EntryArgs),

    /// Show the cart
    Cart,

    /// Toggle an item as favorite
    Favorite(FavoriteArgs),

    /// List favorites
    Favorites,

    /// Check out selected entries (or the whole cart)
    Checkout(CheckoutArgs),

    /// Show or update the profile
    Profile(ProfileArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = match context::Context::load(config_path, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init(&ctx.config.logging, cli.verbose) {
        ctx.output.warn(&format!("{:#}", e));
    }

    // Execute command
    let result = match cli.command {
        Commands::Catalog(args) => commands::catalog::run(args, &ctx).await,
        Commands::Add(args) => commands::cart::add(args, &ctx).await,
        Commands::Qty(args) => commands::cart::quantity(args, &ctx).await,
        Commands::Remove(args) => commands::cart::remove(args, &ctx).await,
        Commands::Select(args) => commands::cart::select(args, &ctx).await,
        Commands::Cart => commands::cart::show(&ctx).await,
        Commands::Favorite(args) => commands::favorites::toggle(args, &ctx).await,
        Commands::Favorites => commands::favorites::list(&ctx).await,
        Commands::Checkout(args) => commands::checkout::run(args, &ctx).await,
        Commands::Profile(args) => commands::profile::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_checkout() {
        let cli = Cli::try_parse_from([
            "shop", "checkout", "--all", "--code", "NAT", "--payment", "paypal", "--yes",
        ])
        .unwrap();
        match cli.command {
            Commands::Checkout(args) => {
                assert!(args.all);
                assert_eq!(args.code.as_deref(), Some("NAT"));
                assert_eq!(
                    args.payment,
                    Some(shop_commerce::checkout::PaymentMethod::PayPal)
                );
            }
            _ => panic!("expected checkout"),
        }
    }

    #[test]
    fn test_parse_negative_quantity() {
        let cli = Cli::try_parse_from(["shop", "qty", "shirt", "-1", "--variant", "M"]).unwrap();
        match cli.command {
            Commands::Qty(args) => assert_eq!(args.quantity, -1),
            _ => panic!("expected qty"),
        }
    }

    #[test]
    fn test_abandon_conflicts_with_payment() {
        assert!(Cli::try_parse_from(["shop", "checkout", "--abandon", "--payment", "cod"]).is_err());
    }
}
