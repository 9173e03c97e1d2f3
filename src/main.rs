//! `webbubble [port]` — reads a WebBubble script from stdin, parses it once,
//! and serves it over HTTP on `port` (default 8080).
//!
//! The CLI surface is deliberately thin: a single optional positional port
//! argument, no flags, no environment variables. The startup program that
//! constructs a server around a hard-coded demo script is out of scope for
//! this crate's core; reading the script from stdin keeps the binary
//! runnable without reintroducing that demo driver.

use std::io::Read;
use std::net::TcpListener;
use std::process::ExitCode;

use clap::Parser;

use webbubble::dispatcher;
use webbubble::Script;

#[derive(Parser)]
#[command(name = "webbubble", about = "Serves a WebBubble script over HTTP")]
struct Cli {
    /// TCP port to listen on. Invalid or out-of-range values fall back to
    /// 8080 with a stderr note rather than failing CLI parsing.
    port: Option<String>,
}

fn resolve_port(raw: Option<&str>) -> u16 {
    let Some(raw) = raw else {
        return 8080;
    };
    match raw.parse::<i64>() {
        Ok(port) if port > 0 && port <= 65535 => port as u16,
        _ => {
            eprintln!("webbubble: invalid port {raw:?}, falling back to 8080");
            8080
        }
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse();
    let port = resolve_port(cli.port.as_deref());

    let mut source = String::new();
    if let Err(err) = std::io::stdin().read_to_string(&mut source) {
        tracing::error!(error = %err, "failed to read script from stdin");
        return ExitCode::FAILURE;
    }

    let script = match Script::parse(&source) {
        Ok(script) => script,
        Err(err) => {
            tracing::error!(error = %err, "failed to parse script");
            return ExitCode::FAILURE;
        }
    };

    let address = format!("0.0.0.0:{port}");
    let listener = match TcpListener::bind(&address) {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(error = %err, %address, "failed to bind listener");
            return ExitCode::FAILURE;
        }
    };

    dispatcher::run(listener, &script);
    ExitCode::SUCCESS
}
