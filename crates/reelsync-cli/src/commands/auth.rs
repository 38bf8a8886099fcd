use super::AppContext;
use anyhow::{Context, Result};
use reelsync_application::VerifyOutcome;
use reelsync_core::route::Route;

pub async fn login(ctx: &mut AppContext, email: &str, password: &str) -> Result<()> {
    ctx.enter(Route::Login).await?;
    let profile = ctx
        .session
        .login(email, password)
        .await
        .context("Login failed")?;
    println!("Signed in as {} <{}>", profile.display_name, profile.email);
    Ok(())
}

pub async fn signup(ctx: &mut AppContext, email: &str, password: &str, name: &str) -> Result<()> {
    ctx.enter(Route::Signup).await?;
    let profile = ctx
        .session
        .signup(email, password, name)
        .await
        .context("Signup failed")?;
    println!("Welcome, {}! You are signed in.", profile.display_name);
    Ok(())
}

pub async fn logout(ctx: &mut AppContext) -> Result<()> {
    let outcome = ctx.session.logout().await;
    if outcome.revoked() {
        println!("Signed out.");
    } else {
        println!("Signed out locally.");
    }
    Ok(())
}

pub async fn whoami(ctx: &mut AppContext, refresh: bool) -> Result<()> {
    ctx.require(Route::Profile).await?;

    if refresh {
        match ctx.session.reverify().await? {
            VerifyOutcome::Rejected => {
                println!("Your session has expired. Run `reelsync login` to sign in again.");
                return Ok(());
            }
            VerifyOutcome::Deferred => {
                println!("(could not reach {}, showing cached profile)", ctx.config.backend_url);
            }
            VerifyOutcome::Verified | VerifyOutcome::NoCredential => {}
        }
    }

    let profile = ctx.session.require_session()?.profile;
    println!("{} <{}>", profile.display_name, profile.email);
    println!("user id: {}", profile.user_id);
    Ok(())
}
