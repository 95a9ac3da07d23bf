//! TextMate Client Binary
//!
//! Command-line client for the TextMate HTTP API. Holds the client-side
//! durable state: the anonymous session id and, after login, the bearer
//! token. Anonymous operations are attributed to the session id; logging in
//! merges that history into the account and switches attribution to the
//! token.
//!
//! ## Usage
//!
//! ```bash
//! # Anonymous transform (logged under this client's session id)
//! cargo run --bin textmate-client -- uppercase "hello world"
//!
//! # Sign up, log in (merges anonymous history), view it
//! cargo run --bin textmate-client -- signup alice secret
//! cargo run --bin textmate-client -- login alice secret
//! cargo run --bin textmate-client -- history
//! ```

use clap::{Parser, Subcommand};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::path::PathBuf;

use textmate::rest::dto::{
    AnalyzeResponse, HistoryResponse, LoginResponse, StatusResponse, TransformResponse,
};
use textmate::session::{self, ClientState};

#[derive(Debug, Parser)]
#[command(name = "textmate-client", about = "TextMate command-line client")]
struct Args {
    /// Server base URL
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server: String,

    /// Client state file (session id + token)
    #[arg(long, default_value = ".textmate.toml")]
    state: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert text to uppercase
    Uppercase { text: String },
    /// Convert text to lowercase
    Lowercase { text: String },
    /// Convert text to title case
    Titlecase { text: String },
    /// Reverse the text
    Reverse { text: String },
    /// Word, character, sentence counts and estimated read time
    Analyze { text: String },
    /// Create an account
    Signup { username: String, password: String },
    /// Log in; merges this client's anonymous history into the account
    Login { username: String, password: String },
    /// Forget the stored token
    Logout,
    /// Show the account's operation history (requires login)
    History,
}

/// Error body shape shared by all endpoints.
#[derive(Debug, Deserialize)]
struct ErrorReply {
    message: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let client = Client::new();

    match &args.command {
        Command::Uppercase { text } => transform(&args, &client, "uppercase", text).await,
        Command::Lowercase { text } => transform(&args, &client, "lowercase", text).await,
        Command::Titlecase { text } => transform(&args, &client, "titlecase", text).await,
        Command::Reverse { text } => transform(&args, &client, "reverse", text).await,
        Command::Analyze { text } => analyze(&args, &client, text).await,
        Command::Signup { username, password } => signup(&args, &client, username, password).await,
        Command::Login { username, password } => login(&args, &client, username, password).await,
        Command::Logout => logout(&args),
        Command::History => history(&args, &client).await,
    }
}

/// Attach the caller's identity: the bearer token when logged in, otherwise
/// this client's durable session id. Never both.
fn with_identity(args: &Args, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    let state = ClientState::load(&args.state);
    match state.token {
        Some(token) => request.bearer_auth(token),
        None => {
            let session_id = session::get_or_create_session_id(&args.state);
            request.header("X-Session-ID", session_id.as_str())
        }
    }
}

async fn transform(args: &Args, client: &Client, op: &str, text: &str) -> anyhow::Result<()> {
    let request = client
        .post(format!("{}/api/{op}", args.server))
        .json(&serde_json::json!({ "text": text }));
    let response = with_identity(args, request).send().await?;

    if handle_auth_failure(args, response.status())? {
        return Ok(());
    }
    if !response.status().is_success() {
        return fail(response).await;
    }

    let reply: TransformResponse = response.json().await?;
    println!("{}", reply.transformed_text);
    if let Some(warning) = reply.warning {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

async fn analyze(args: &Args, client: &Client, text: &str) -> anyhow::Result<()> {
    let request = client
        .post(format!("{}/api/analyze", args.server))
        .json(&serde_json::json!({ "text": text }));
    let response = with_identity(args, request).send().await?;

    if handle_auth_failure(args, response.status())? {
        return Ok(());
    }
    if !response.status().is_success() {
        return fail(response).await;
    }

    let reply: AnalyzeResponse = response.json().await?;
    let analysis = reply.analysis;
    println!("words:     {}", analysis.word_count);
    println!("chars:     {}", analysis.char_count);
    println!("sentences: {}", analysis.sentence_count);
    println!("read time: {} min", analysis.read_time);
    Ok(())
}

async fn signup(
    args: &Args,
    client: &Client,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    let response = client
        .post(format!("{}/api/signup", args.server))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await?;

    if !response.status().is_success() {
        return fail(response).await;
    }
    let reply: StatusResponse = response.json().await?;
    println!("{}", reply.message);
    Ok(())
}

async fn login(args: &Args, client: &Client, username: &str, password: &str) -> anyhow::Result<()> {
    // Send the session id along so the server merges this client's anonymous
    // history into the account.
    let session_id = session::get_or_create_session_id(&args.state);
    let response = client
        .post(format!("{}/api/login", args.server))
        .json(&serde_json::json!({
            "username": username,
            "password": password,
            "sessionId": session_id.as_str(),
        }))
        .send()
        .await?;

    if !response.status().is_success() {
        return fail(response).await;
    }

    let reply: LoginResponse = response.json().await?;
    let mut state = ClientState::load(&args.state);
    state.token = Some(reply.token);
    state.save(&args.state)?;
    println!("{}", reply.message);
    Ok(())
}

fn logout(args: &Args) -> anyhow::Result<()> {
    let mut state = ClientState::load(&args.state);
    if state.token.take().is_some() {
        state.save(&args.state)?;
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

async fn history(args: &Args, client: &Client) -> anyhow::Result<()> {
    let state = ClientState::load(&args.state);
    let Some(token) = state.token else {
        println!("Not logged in. History requires an account; run `login` first.");
        return Ok(());
    };

    let response = client
        .get(format!("{}/api/history", args.server))
        .bearer_auth(token)
        .send()
        .await?;

    if handle_auth_failure(args, response.status())? {
        return Ok(());
    }
    if !response.status().is_success() {
        return fail(response).await;
    }

    let reply: HistoryResponse = response.json().await?;
    if reply.data.is_empty() {
        println!("{}", reply.message);
        return Ok(());
    }
    for entry in &reply.data {
        let result = entry
            .transformed_text
            .as_deref()
            .map(str::to_owned)
            .or_else(|| {
                entry
                    .analysis
                    .map(|a| format!("{} words, {} min read", a.word_count, a.read_time))
            })
            .unwrap_or_default();
        println!(
            "{}  {:<10} {:?} -> {result}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.operation_type.to_string(),
            entry.original_text,
        );
    }
    Ok(())
}

/// On 401 the stored token is stale: drop it and ask the user to log in
/// again. Operations are never silently retried under the session id.
fn handle_auth_failure(args: &Args, status: StatusCode) -> anyhow::Result<bool> {
    if status != StatusCode::UNAUTHORIZED {
        return Ok(false);
    }
    let mut state = ClientState::load(&args.state);
    if state.token.take().is_some() {
        state.save(&args.state)?;
    }
    eprintln!("Session expired or invalid. Please log in again.");
    Ok(true)
}

async fn fail(response: reqwest::Response) -> anyhow::Result<()> {
    let status = response.status();
    let message = response
        .json::<ErrorReply>()
        .await
        .ok()
        .and_then(|r| r.message)
        .unwrap_or_else(|| "request failed".to_string());
    anyhow::bail!("{status}: {message}")
}
