//! Profile command.

use anyhow::Result;

use super::ProfileArgs;
use crate::context::Context;

/// Show or update the stored profile.
pub async fn run(args: ProfileArgs, ctx: &Context) -> Result<()> {
    let cache = ctx.open_cache().await?;
    let mut profile = shop_commerce::profile::UserProfile::load(&cache).await;

    let changed = args.phone.is_some() || args.avatar.is_some();
    if let Some(phone) = args.phone {
        profile.phone = phone.trim().to_string();
    }
    if let Some(avatar) = args.avatar {
        profile.avatar_url = Some(avatar.trim().to_string()).filter(|url| !url.is_empty());
    }
    if changed {
        profile.save(&cache).await?;
    }

    if ctx.output.is_json() {
        ctx.output.json(&profile);
        return Ok(());
    }

    if changed {
        ctx.output.success("Profile updated");
    }
    ctx.output.header("Profile");
    ctx.output.kv(
        "Phone",
        if profile.phone.is_empty() {
            "(not set)"
        } else {
            profile.phone.as_str()
        },
    );
    ctx.output
        .kv("Avatar", profile.avatar_url.as_deref().unwrap_or("(not set)"));
    Ok(())
}
