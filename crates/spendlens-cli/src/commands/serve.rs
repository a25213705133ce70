//! Server command implementation

use std::path::Path;

use anyhow::Result;
use spendlens_core::AppConfig;
use spendlens_server::ServerConfig;

use super::open_db;

/// Server settings from the `serve` flags and `SPENDLENS_API_KEYS`
pub fn server_config(no_auth: bool) -> ServerConfig {
    let api_keys = spendlens_server::parse_api_keys(
        &std::env::var(spendlens_server::API_KEYS_ENV).unwrap_or_default(),
    );

    ServerConfig {
        require_auth: !no_auth,
        allowed_origins: vec![],
        api_keys,
    }
}

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
    app_config: AppConfig,
) -> Result<()> {
    println!("🚀 Starting SpendLens web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);

    let config = server_config(no_auth);

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else {
        println!("   🔒 Authentication: Cloudflare Access (header)");
        if !config.api_keys.is_empty() {
            println!(
                "   🔑 API keys: {} configured ({})",
                config.api_keys.len(),
                spendlens_server::API_KEYS_ENV
            );
        }
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    spendlens_server::serve_with_config(db, host, port, config, app_config).await?;

    Ok(())
}
