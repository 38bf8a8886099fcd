use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reelsync_core::ReelsyncError;
use reelsync_infrastructure::{ConfigService, ReelsyncPaths};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::AppContext;

#[derive(Parser)]
#[command(name = "reelsync")]
#[command(about = "Reelsync - browse movies, keep a saved list, see what others search", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/reelsync/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding config.toml and the session file
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
    },
    /// Sign out (works offline)
    Logout,
    /// Show the signed-in user
    Whoami {
        /// Re-check the session with the server
        #[arg(long)]
        refresh: bool,
    },
    /// Search movies; no query lists popular movies
    Search { query: Vec<String> },
    /// Show details for a movie
    Details { id: u64 },
    /// Add a movie to the saved list, or remove it if already saved
    Save { id: u64 },
    /// List saved movies, newest first
    Saved,
    /// Most searched terms and this week's trending movies
    Trending {
        #[arg(long, default_value_t = reelsync_core::trending::DEFAULT_TOP_LIMIT)]
        limit: usize,
    },
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = ReelsyncPaths::new(cli.config_dir.as_deref());
    let config_service = ConfigService::new(paths, cli.config);
    let config = config_service
        .get_config()
        .context("Failed to load configuration")?;
    init_tracing(&config.log_filter);

    let token_file = config_service.token_file(&config)?;
    let mut ctx = AppContext::build(config, token_file)?;
    ctx.session.restore().await;

    let result = run(&mut ctx, cli.command).await;
    if let Err(err) = &result {
        if let Some(kind) = err.downcast_ref::<ReelsyncError>() {
            if ctx.session.report_failure(kind).await {
                eprintln!("Your session has ended. Run `reelsync login` to sign in again.");
            }
        }
    }
    result
}

async fn run(ctx: &mut AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Login { email, password } => commands::auth::login(ctx, &email, &password).await,
        Commands::Signup {
            email,
            password,
            name,
        } => commands::auth::signup(ctx, &email, &password, &name).await,
        Commands::Logout => commands::auth::logout(ctx).await,
        Commands::Whoami { refresh } => commands::auth::whoami(ctx, refresh).await,
        Commands::Search { query } => commands::movies::search(ctx, &query.join(" ")).await,
        Commands::Details { id } => commands::movies::details(ctx, id).await,
        Commands::Save { id } => commands::saved::toggle(ctx, id).await,
        Commands::Saved => commands::saved::list(ctx).await,
        Commands::Trending { limit } => commands::movies::trending(ctx, limit).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_joins_words() {
        let cli = Cli::try_parse_from(["reelsync", "search", "blade", "runner"]).unwrap();
        match cli.command {
            Commands::Search { query } => assert_eq!(query.join(" "), "blade runner"),
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_parse_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["reelsync", "saved", "--config", "/tmp/r.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/r.toml")));
        assert!(matches!(cli.command, Commands::Saved));
    }

    #[test]
    fn test_trending_limit_defaults_to_five() {
        let cli = Cli::try_parse_from(["reelsync", "trending"]).unwrap();
        assert!(matches!(cli.command, Commands::Trending { limit: 5 }));
    }

    #[test]
    fn test_signup_requires_name() {
        assert!(
            Cli::try_parse_from(["reelsync", "signup", "--email", "a@b.c", "--password", "pw"])
                .is_err()
        );
    }
}
