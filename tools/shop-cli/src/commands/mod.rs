//! CLI command implementations.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod favorites;
pub mod profile;

use clap::{Args, Subcommand};
use shop_commerce::checkout::PaymentMethod;

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    /// Only show items whose name contains this text (case-insensitive).
    #[arg(short, long)]
    pub search: Option<String>,
}

/// Identifies one cart entry.
#[derive(Args)]
pub struct EntryArgs {
    /// Catalog item id.
    pub id: String,

    /// Size or variant.
    #[arg(long)]
    pub variant: Option<String>,
}

/// Arguments for the qty command.
#[derive(Args)]
pub struct QuantityArgs {
    /// Catalog item id.
    pub id: String,

    /// New quantity; 0 or less removes the entry.
    #[arg(allow_negative_numbers = true)]
    pub quantity: i64,

    /// Size or variant.
    #[arg(long)]
    pub variant: Option<String>,
}

/// Arguments for the favorite command.
#[derive(Args)]
pub struct FavoriteArgs {
    /// Catalog item id.
    pub id: String,
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Check out the whole cart instead of the selected entries.
    #[arg(long)]
    pub all: bool,

    /// Discount code.
    #[arg(long)]
    pub code: Option<String>,

    /// Payment method: cod, credit-card or paypal.
    #[arg(long)]
    pub payment: Option<PaymentMethod>,

    /// Show the batch, then abandon it without paying.
    #[arg(long, conflicts_with = "payment")]
    pub abandon: bool,

    /// Skip the confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the profile command.
#[derive(Args)]
pub struct ProfileArgs {
    /// Set the phone number.
    #[arg(long)]
    pub phone: Option<String>,

    /// Set the avatar URL; an empty value clears it.
    #[arg(long)]
    pub avatar: Option<String>,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
