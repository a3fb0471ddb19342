//! Cart commands.

use anyhow::Result;
use serde_json::json;
use shop_commerce::cart::{price_lines, CartView, QuantityChange};
use shop_commerce::session::ShopSession;
use shop_commerce::CatalogId;

use super::{EntryArgs, QuantityArgs};
use crate::context::Context;
use crate::output::{entry_label, selection_mark};

/// Add one unit of a catalog item.
pub async fn add(args: EntryArgs, ctx: &Context) -> Result<()> {
    let item = ctx.catalog_item(&args.id).await?;
    let mut session = ctx.open_session().await?;

    let entry = session.cart.add(&item, args.variant.as_deref()).await?;
    settle(&mut session, ctx).await;

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "entry": entry,
            "quantityTotal": session.cart.quantity_total(),
        }));
        return Ok(());
    }

    ctx.output.success(&format!(
        "{} x{} in cart ({} items total)",
        entry_label(&entry.name, entry.variant.as_deref()),
        entry.quantity,
        session.cart.quantity_total()
    ));
    Ok(())
}

/// Set the quantity of an entry.
pub async fn quantity(args: QuantityArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session().await?;
    let id = CatalogId::new(args.id);

    let change = session
        .cart
        .update_quantity(&id, args.variant.as_deref(), args.quantity)
        .await?;
    settle(&mut session, ctx).await;

    if ctx.output.is_json() {
        let (status, quantity) = match change {
            QuantityChange::Updated(quantity) => ("updated", Some(quantity)),
            QuantityChange::Removed => ("removed", None),
            QuantityChange::Absent => ("absent", None),
        };
        ctx.output.json(&json!({
            "status": status,
            "quantity": quantity,
            "quantityTotal": session.cart.quantity_total(),
        }));
        return Ok(());
    }

    let label = entry_label(id.as_str(), args.variant.as_deref());
    match change {
        QuantityChange::Updated(quantity) => {
            ctx.output.success(&format!("{} set to {}", label, quantity))
        }
        QuantityChange::Removed => ctx.output.success(&format!("Removed {}", label)),
        QuantityChange::Absent => ctx.output.info(&format!("{} is not in the cart", label)),
    }
    Ok(())
}

/// Remove an entry.
pub async fn remove(args: EntryArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session().await?;
    let id = CatalogId::new(args.id);

    let removed = session.cart.remove(&id, args.variant.as_deref()).await;
    settle(&mut session, ctx).await;

    if ctx.output.is_json() {
        ctx.output.json(&json!({ "removed": removed }));
        return Ok(());
    }

    let label = entry_label(id.as_str(), args.variant.as_deref());
    if removed {
        ctx.output.success(&format!("Removed {}", label));
    } else {
        ctx.output.info(&format!("{} is not in the cart", label));
    }
    Ok(())
}

/// Toggle whether an entry is selected for checkout.
pub async fn select(args: EntryArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session().await?;
    let id = CatalogId::new(args.id);

    let selected = session.cart.toggle_select(&id, args.variant.as_deref()).await;
    settle(&mut session, ctx).await;

    if ctx.output.is_json() {
        ctx.output.json(&json!({ "selected": selected }));
        return Ok(());
    }

    let label = entry_label(id.as_str(), args.variant.as_deref());
    match selected {
        Some(true) => ctx.output.success(&format!("{} selected for checkout", label)),
        Some(false) => ctx.output.success(&format!("{} deselected", label)),
        None => ctx.output.info(&format!("{} is not in the cart", label)),
    }
    Ok(())
}

/// Show the cart.
pub async fn show(ctx: &Context) -> Result<()> {
    let session = ctx.open_session().await?;
    let cart = &session.cart;
    let subtotal = cart.subtotal(CartView::All)?;
    let selected = cart.subtotal(CartView::Selected)?;

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "items": cart.items(),
            "subtotal": subtotal,
            "selectedSubtotal": selected,
            "quantityTotal": cart.quantity_total(),
        }));
        return Ok(());
    }

    ctx.output.header("Cart");
    if cart.is_empty() {
        ctx.output.info("Your cart is empty.");
        return Ok(());
    }

    let widths = [3, 12, 32, 6, 14];
    for (entry, pricing) in cart.items().iter().zip(price_lines(cart.items())?) {
        let mark = selection_mark(entry.selected);
        let label = entry_label(&entry.name, entry.variant.as_deref());
        let quantity = format!("x{}", entry.quantity);
        let total = pricing.total.display();
        ctx.output.table_row(
            &[
                mark.as_str(),
                entry.catalog_id.as_str(),
                label.as_str(),
                quantity.as_str(),
                total.as_str(),
            ],
            &widths,
        );
    }

    println!();
    ctx.output.kv("Items", &cart.quantity_total().to_string());
    ctx.output.kv("Subtotal", &subtotal.display());
    ctx.output.kv("Selected", &selected.display());
    Ok(())
}

/// Retry any write that failed during the command before the process exits.
pub(crate) async fn settle(session: &mut ShopSession, ctx: &Context) {
    if !session.has_pending_writes() {
        return;
    }
    if let Err(e) = session.flush().await {
        ctx.output
            .warn(&format!("Changes are kept for this run only and were not saved: {}", e));
    }
}
