//! Hireboard application entry point.
//!
//! Bootstraps the server:
//! 1. Load configuration from environment
//! 2. Connect to Redis
//! 3. Seed demo identities when enabled
//! 4. Build router with API routes, pages, route guard and static files
//! 5. Start Axum server
//!
//! Also supports a `hash-password` subcommand for provisioning identities.

use hireboard::{auth::password::hash_password, auth::AppState, config::Config, routes, seed};
use std::net::SocketAddr;

fn print_hash_usage() {
    eprintln!("Usage: hireboard hash-password <password>");
    eprintln!();
    eprintln!("Print an Argon2id PHC string for storing an identity's password.");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  hireboard hash-password correcthorse");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() >= 2 && args[1] == "hash-password" {
        if args.len() != 3 {
            print_hash_usage();
            std::process::exit(1);
        }
        match hash_password(&args[2]) {
            Ok(hash) => println!("{}", hash),
            Err(e) => {
                eprintln!("Error hashing password: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    // RUST_LOG controls verbosity
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting hireboard on {}", config.bind_addr);

    let redis_client = redis::Client::open(config.redis_url.as_str())?;

    // Fail fast if Redis is unreachable
    let mut con = redis_client.get_multiplexed_async_connection().await?;

    if config.seed_demo_identities {
        let seeded = seed::seed_demo_identities(&mut con).await?;
        tracing::info!("Seeded {} demo identities", seeded.len());
    }

    let bind_addr = config.bind_addr;
    let state = AppState::new(redis_client, config);
    for (prefix, role) in state.policy.rules() {
        tracing::info!(prefix = %prefix, role = %role, "Route policy rule");
    }
    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Listening on {}", bind_addr);

    // ConnectInfo<SocketAddr> is needed by the login rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
