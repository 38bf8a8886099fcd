use super::AppContext;
use anyhow::{Context, Result};
use reelsync_core::catalog::{Movie, poster_url};
use reelsync_core::route::Route;

fn year(release_date: Option<&str>) -> &str {
    release_date
        .and_then(|d| d.get(..4))
        .unwrap_or("----")
}

pub(crate) fn print_movie(movie: &Movie) {
    println!(
        "{:>8}  {}  {:>4.1}  {}",
        movie.id,
        year(movie.release_date.as_deref()),
        movie.vote_average,
        movie.title
    );
}

pub async fn search(ctx: &mut AppContext, query: &str) -> Result<()> {
    ctx.require(Route::Search).await?;
    let movies = ctx.search.search(query).await.context("Search failed")?;

    if movies.is_empty() {
        println!("No movies found for '{query}'.");
        return Ok(());
    }
    for movie in &movies {
        print_movie(movie);
    }
    Ok(())
}

pub async fn details(ctx: &mut AppContext, id: u64) -> Result<()> {
    let session = ctx.require(Route::Movie(id)).await?;
    let detail = ctx.search.details(id).await.context("Failed to load movie")?;

    println!("{} ({})", detail.title, year(detail.release_date.as_deref()));
    if let Some(tagline) = detail.tagline.as_deref().filter(|t| !t.is_empty()) {
        println!("\"{tagline}\"");
    }
    println!(
        "rating {:.1} ({} votes){}",
        detail.vote_average,
        detail.vote_count,
        detail
            .runtime
            .map(|m| format!(", {m} min"))
            .unwrap_or_default()
    );
    if !detail.genres.is_empty() {
        let genres: Vec<&str> = detail.genres.iter().map(|g| g.name.as_str()).collect();
        println!("genres: {}", genres.join(", "));
    }
    if let Some(overview) = detail.overview.as_deref() {
        println!("\n{overview}\n");
    }
    if let Some(url) = poster_url(&ctx.config.catalog.image_base_url, detail.poster_path.as_deref()) {
        println!("poster: {url}");
    }

    let saved = ctx.saved.is_saved(session.user_id(), id).await?;
    println!("{}", if saved { "[saved]" } else { "[not saved]" });
    Ok(())
}

pub async fn trending(ctx: &mut AppContext, limit: usize) -> Result<()> {
    ctx.require(Route::Home).await?;

    println!("Most searched");
    match ctx.trending.top_terms(limit).await {
        Ok(entries) if entries.is_empty() => println!("  (nothing yet)"),
        Ok(entries) => {
            for (rank, entry) in entries.iter().enumerate() {
                println!("  {}. {} ({} searches)", rank + 1, entry.term, entry.count);
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "trending terms unavailable");
            println!("  (unavailable)");
        }
    }

    println!("\nTrending this week");
    let movies = ctx
        .search
        .trending_movies()
        .await
        .context("Failed to load trending movies")?;
    for movie in movies.iter().take(10) {
        print_movie(movie);
    }
    Ok(())
}
