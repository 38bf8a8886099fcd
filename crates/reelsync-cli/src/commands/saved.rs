use super::AppContext;
use anyhow::{Context, Result};
use reelsync_core::route::Route;

pub async fn toggle(ctx: &mut AppContext, id: u64) -> Result<()> {
    let session = ctx.require(Route::Movie(id)).await?;
    let movie = ctx
        .search
        .details(id)
        .await
        .context("Failed to load movie")?
        .to_movie();

    let state = ctx
        .saved
        .toggle(session.user_id(), &movie)
        .await
        .context("Could not update saved list")?;
    if state.is_saved() {
        println!("Saved '{}'.", movie.title);
    } else {
        println!("Removed '{}' from saved.", movie.title);
    }
    Ok(())
}

pub async fn list(ctx: &mut AppContext) -> Result<()> {
    let session = ctx.require(Route::Saved).await?;
    let items = ctx
        .saved
        .list(session.user_id())
        .await
        .context("Could not load saved list")?;

    if items.is_empty() {
        println!("Nothing saved yet.");
        return Ok(());
    }
    for item in &items {
        println!(
            "{:>8}  {:>4.1}  {}  (saved {})",
            item.movie_id,
            item.rating,
            item.title,
            item.saved_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}
