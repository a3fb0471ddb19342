//! Checkout command.
//!
//! A batch never outlives the process, so one invocation prepares it,
//! collects the payment method and either confirms or abandons it.

use anyhow::{bail, Result};
use chrono::Utc;
use dialoguer::{theme::ColorfulTheme, Confirm, Select};
use serde_json::json;
use shop_commerce::checkout::{CheckoutBatch, PaymentMethod};
use shop_commerce::CommerceError;

use super::cart::settle;
use super::CheckoutArgs;
use crate::context::Context;
use crate::output::entry_label;

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session().await?;
    let code = args.code.as_deref();

    let batch = if args.all {
        session.prepare_whole_cart(code)?
    } else {
        session.prepare_checkout(code)?
    };
    let batch_id = batch.id.clone();
    if batch.code_rejected() {
        ctx.output.warn(&format!(
            "Discount code {} is not valid; continuing without a discount",
            code.unwrap_or_default()
        ));
    }
    print_batch(batch, ctx);

    if args.abandon {
        let batch = session.checkout.abandon(&batch_id)?;
        if ctx.output.is_json() {
            ctx.output.json(&json!({ "status": "abandoned", "batchId": batch.id }));
        } else {
            ctx.output.info("Checkout abandoned; cart unchanged.");
        }
        return Ok(());
    }

    let method = match args.payment {
        Some(method) => Some(method),
        None if ctx.output.is_json() => None,
        None => prompt_payment()?,
    };
    if let Some(method) = method {
        session.checkout.choose_payment(method)?;
    }

    if !args.yes && !ctx.output.is_json() {
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Place order?")
            .default(true)
            .interact()?;
        if !proceed {
            session.checkout.abandon(&batch_id)?;
            ctx.output.info("Checkout abandoned; cart unchanged.");
            return Ok(());
        }
    }

    let batch = match session.confirm_checkout(&batch_id).await {
        Ok(batch) => batch,
        Err(CommerceError::PaymentMethodRequired) => {
            session.checkout.abandon(&batch_id)?;
            bail!("Choose a payment method with --payment (cod, credit-card or paypal)");
        }
        Err(e) => return Err(e.into()),
    };
    settle(&mut session, ctx).await;

    let confirmed_at = Utc::now();
    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "status": "confirmed",
            "batchId": batch.id,
            "payment": batch.payment,
            "totals": batch.totals,
            "confirmedAt": confirmed_at.to_rfc3339(),
            "remainingItems": session.cart.quantity_total(),
        }));
        return Ok(());
    }

    ctx.output.success(&format!(
        "Order placed: {} paid by {}",
        batch.totals.final_total.display(),
        batch
            .payment
            .map(|method| method.display_name())
            .unwrap_or_default()
    ));
    ctx.output
        .kv("Confirmed", &confirmed_at.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    ctx.output
        .kv("Left in cart", &session.cart.quantity_total().to_string());
    Ok(())
}

fn prompt_payment() -> Result<Option<PaymentMethod>> {
    let labels: Vec<&str> = PaymentMethod::ALL
        .iter()
        .map(|method| method.display_name())
        .collect();
    let choice = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Payment method")
        .items(&labels)
        .default(0)
        .interact_opt()?;
    Ok(choice.map(|index| PaymentMethod::ALL[index]))
}

fn print_batch(batch: &CheckoutBatch, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "status": "prepared",
            "batchId": batch.id,
            "wholeCart": batch.whole_cart,
            "items": batch.items,
            "code": batch.applied_code(),
            "totals": batch.totals,
        }));
        return;
    }

    ctx.output.header("Checkout");
    for item in &batch.items {
        ctx.output.list_item(&format!(
            "{} x{}  {}",
            entry_label(&item.name, item.variant.as_deref()),
            item.quantity,
            item.unit_price.display()
        ));
    }
    ctx.output.kv("Subtotal", &batch.totals.subtotal.display());
    if let Some(code) = batch.applied_code() {
        ctx.output.kv(
            "Discount",
            &format!("-{} ({})", batch.totals.applied_discount.display(), code),
        );
    }
    ctx.output.kv("Total", &batch.totals.final_total.display());
}
