use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use restwire::echo::EchoHandler;
use restwire::middleware::{AuthMiddleware, TracingMiddleware};
use restwire::server::WireServer;
use restwire::{handler_fn, Dispatcher, Router};

/// Demo server exposing a small endpoint table over framed TCP.
#[derive(Parser, Debug)]
#[command(name = "restwire", version, about)]
struct Args {
    /// Address to bind.
    #[arg(long, env = "RESTWIRE_ADDR", default_value = "127.0.0.1:9565")]
    addr: String,

    /// Require this token on every request (enables the auth middleware).
    #[arg(long, env = "RESTWIRE_TOKEN")]
    token: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut router = Router::new();
    router.register(
        "health",
        handler_fn(|_req, _args| Ok(serde_json::json!({ "status": "ok" }))),
        "GET",
        Some("health"),
    )?;
    router.register(
        "echo/{message}",
        Arc::new(EchoHandler),
        ["GET", "POST"],
        Some("echo"),
    )?;

    let mut dispatcher = Dispatcher::new(router);
    dispatcher.add_middleware(Arc::new(TracingMiddleware));
    if let Some(token) = args.token {
        dispatcher.add_middleware(Arc::new(AuthMiddleware::new(token)));
    }

    let handle = WireServer::new(Arc::new(dispatcher)).start(&args.addr)?;
    info!(addr = %handle.addr(), "restwire demo server started");
    handle
        .join()
        .map_err(|_| anyhow::anyhow!("server coroutine panicked"))
}
