//! Hiroba terminal chat client.
//!
//! Logs in over HTTP, then connects to the chat over WebSocket and sends lines from stdin.
//! `/online` lists connected users, `/quit` exits.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval);
//! a rejected token ends the client immediately.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-client -- --username alice --register
//! HIROBA_PASSWORD=secret cargo run --bin hiroba-client -- -u bob
//! ```
//!
//! Without `--password` or `HIROBA_PASSWORD` the password is prompted for on the terminal.

use clap::Parser;
use hiroba_client::{ClientOptions, run_client, ui::prompt_password};
use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-client")]
#[command(about = "Terminal client for the Hiroba chat server", long_about = None)]
struct Args {
    /// Username to log in as
    #[arg(short = 'u', long)]
    username: String,

    /// Password (prompted for when omitted)
    #[arg(short = 'p', long, env = "HIROBA_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Register the account before logging in
    #[arg(long)]
    register: bool,

    /// HTTP API base URL
    #[arg(long, env = "HIROBA_API_URL", default_value = "http://127.0.0.1:8080")]
    api_url: String,

    /// WebSocket endpoint URL
    #[arg(long, env = "HIROBA_WS_URL", default_value = "ws://127.0.0.1:8080/ws")]
    ws_url: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let password = match args.password {
        Some(password) => password,
        None => {
            let prompt = if args.register {
                "Enter new password: "
            } else {
                "Password: "
            };
            match tokio::task::spawn_blocking(move || prompt_password(prompt)).await {
                Ok(Ok(password)) => password,
                Ok(Err(e)) => {
                    tracing::error!("Failed to read password: {}", e);
                    std::process::exit(1);
                }
                Err(e) => {
                    tracing::error!("Password prompt task failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let options = ClientOptions {
        api_url: args.api_url,
        ws_url: args.ws_url,
        username: args.username,
        password,
        register: args.register,
    };

    if let Err(e) = run_client(options).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
