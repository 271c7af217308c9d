//! Example: Token pair lifecycle with session tracking
//!
//! Walks through issuance, verification, rotation and revocation. The
//! cache engine comes from the environment (`CACHE_TYPE=memory` or
//! `CACHE_TYPE=redis` with `REDIS_URL`); `CACHE_ENABLED=false` runs cacheless.
//!
//! Run with: CACHE_TYPE=memory cargo run --example session_demo -p tp_infra

use anyhow::Context;
use serde_json::json;
use tp_core::{ClaimMap, SessionCoordinator, TokenKind};
use tp_infra::cache::create_cache_engine;
use tp_shared::{init_tracing, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    init_tracing(&config.logging);

    let cache = create_cache_engine(&config.cache)
        .await
        .context("Failed to create cache engine")?;
    let coordinator = SessionCoordinator::new(config.token.clone(), cache, config.session.clone())
        .context("Failed to create session coordinator")?;

    println!("=== Session demo ({:?}) ===", coordinator);

    let mut payload = ClaimMap::new();
    payload.insert("role".to_string(), json!("editor"));

    // 1. Issue pairs on two devices
    let laptop = coordinator.issue_pair("42", Some(payload.clone()), None).await?;
    let phone = coordinator.issue_pair("42", Some(payload), None).await?;
    println!("Issued access token: {}...", &laptop.access_token[..24]);

    // 2. Verify
    let verified = coordinator.verify(&laptop.access_token, TokenKind::Access).await?;
    println!("Verified subject {} with payload {:?}", verified.subject, verified.payload);

    // 3. Rotate the laptop session
    let laptop = coordinator.refresh_pair(&laptop.refresh_token).await?;
    println!("Rotated laptop session");

    // 4. Change claims mid-session
    let mut upgraded = ClaimMap::new();
    upgraded.insert("role".to_string(), json!("admin"));
    let laptop = coordinator
        .update_user_data(&laptop.access_token, TokenKind::Access, Some(upgraded), None)
        .await?;
    let verified = coordinator.verify(&laptop.access_token, TokenKind::Access).await?;
    println!("Updated payload: {:?}", verified.payload);

    // 5. Log out everywhere else
    coordinator
        .clear_other_sessions(&laptop.refresh_token, TokenKind::Refresh)
        .await?;
    match coordinator.verify(&phone.access_token, TokenKind::Access).await {
        Ok(_) => println!("Phone session still valid (cacheless mode)"),
        Err(e) => println!("Phone session rejected: {}", e),
    }

    let sessions = coordinator.list_sessions("42").await?;
    println!("Live sessions for subject 42: {}", sessions.len());

    // 6. Log out
    coordinator
        .delete_pair(&laptop.access_token, TokenKind::Access)
        .await?;
    println!("Revoked remaining sessions: {}", coordinator.revoke_all("42").await?);

    Ok(())
}
