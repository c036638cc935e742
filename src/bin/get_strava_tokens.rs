// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One-time OAuth bootstrap for Strava.
//!
//! Prints the authorization URL, waits for the code pasted back from the
//! redirect, exchanges it for tokens, and writes the token file the sync
//! daemon picks up on its next start.

use anyhow::Context;
use std::io::{BufRead, Write};
use strava_garmin_sync::config::DEFAULT_TOKEN_PATH;
use strava_garmin_sync::services::StravaClient;

const REDIRECT_URI: &str = "http://127.0.0.1:5000/authorization";
const SCOPES: &str = "read,activity:read_all,activity:write";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let client_id = std::env::var("STRAVA_CLIENT_ID").context("STRAVA_CLIENT_ID not set")?;
    let client_secret =
        std::env::var("STRAVA_CLIENT_SECRET").context("STRAVA_CLIENT_SECRET not set")?;
    let token_path =
        std::env::var("STRAVA_TOKEN_PATH").unwrap_or_else(|_| DEFAULT_TOKEN_PATH.to_string());

    let url = format!(
        "https://www.strava.com/oauth/authorize?client_id={}&redirect_uri={}&response_type=code&approval_prompt=auto&scope={}",
        client_id,
        urlencoding::encode(REDIRECT_URI),
        SCOPES,
    );
    println!("Please visit this URL to authorize the application:\n\n{}\n", url);

    print!("Enter the code you received after authorization: ");
    std::io::stdout().flush()?;
    let mut code = String::new();
    std::io::stdin().lock().read_line(&mut code)?;
    let code = code.trim();

    let client = StravaClient::new(client_id, client_secret);
    let tokens = client
        .exchange_code(code)
        .await
        .context("code exchange failed")?;

    println!("Access Token:  {}", tokens.access_token);
    println!("Refresh Token: {}", tokens.refresh_token);
    println!("Expires At:    {}", tokens.expires_at);

    let path = std::path::Path::new(&token_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, serde_json::to_string_pretty(&tokens)?)?;
    println!("Tokens written to {}", token_path);

    Ok(())
}
