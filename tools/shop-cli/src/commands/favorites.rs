//! Favorites commands.

use anyhow::Result;
use serde_json::json;
use shop_commerce::CatalogId;

use super::cart::settle;
use super::FavoriteArgs;
use crate::context::Context;

/// Toggle a favorite.
pub async fn toggle(args: FavoriteArgs, ctx: &Context) -> Result<()> {
    let mut session = ctx.open_session().await?;
    let id = CatalogId::new(args.id);

    let favorite = session.favorites.toggle(&id).await;
    settle(&mut session, ctx).await;

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "id": id,
            "favorite": favorite,
            "count": session.favorites.count(),
        }));
        return Ok(());
    }

    if favorite {
        ctx.output.success(&format!("Added {} to favorites", id));
    } else {
        ctx.output.success(&format!("Removed {} from favorites", id));
    }
    ctx.output.kv("Favorites", &session.favorites.count().to_string());
    Ok(())
}

/// List favorites.
pub async fn list(ctx: &Context) -> Result<()> {
    let session = ctx.open_session().await?;
    let catalog = ctx.catalog().await;
    let items = session.favorites.favorite_items(&catalog);
    let missing: Vec<&CatalogId> = session
        .favorites
        .ids()
        .filter(|id| !catalog.iter().any(|item| &item.id == *id))
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "items": items,
            "missing": missing,
            "count": session.favorites.count(),
        }));
        return Ok(());
    }

    ctx.output.header(&format!("Favorites ({})", session.favorites.count()));
    if session.favorites.count() == 0 {
        ctx.output.info("No favorites yet.");
        return Ok(());
    }

    for item in &items {
        ctx.output.list_item(&format!(
            "{}  {}  {}",
            item.id,
            item.name,
            item.unit_price.display()
        ));
    }
    for id in &missing {
        ctx.output.list_item(&format!("{}  (no longer in the catalog)", id));
    }
    Ok(())
}
