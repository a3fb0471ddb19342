//! Catalog listing.

use anyhow::Result;
use serde_json::json;
use shop_commerce::catalog::search_by_name;

use super::CatalogArgs;
use crate::context::Context;
use crate::output::favorite_mark;

/// Run the catalog command.
pub async fn run(args: CatalogArgs, ctx: &Context) -> Result<()> {
    let items = ctx.catalog().await;
    let matches = search_by_name(&items, args.search.as_deref().unwrap_or(""));
    let session = ctx.open_session().await?;

    if ctx.output.is_json() {
        let rows: Vec<_> = matches
            .iter()
            .map(|item| {
                json!({
                    "item": item,
                    "favorite": session.favorites.is_favorite(&item.id),
                })
            })
            .collect();
        ctx.output.json(&rows);
        return Ok(());
    }

    match &args.search {
        Some(text) => ctx.output.header(&format!("Catalog matching \"{}\"", text)),
        None => ctx.output.header("Catalog"),
    }

    if matches.is_empty() {
        ctx.output.info("No items found.");
        return Ok(());
    }

    let widths = [1, 12, 28, 14, 20];
    for item in &matches {
        let mark = favorite_mark(session.favorites.is_favorite(&item.id));
        let price = item.unit_price.display();
        let variants = item.available_variants.join("/");
        ctx.output.table_row(
            &[
                mark.as_str(),
                item.id.as_str(),
                item.name.as_str(),
                price.as_str(),
                variants.as_str(),
            ],
            &widths,
        );
    }
    ctx.output.info(&format!("{} of {} items", matches.len(), items.len()));

    Ok(())
}
