/// Onionet Daemon - Onion Routing Simulation
///
/// Runs the services of a minimal onion-routing network:
/// - a node registry (directory of relays)
/// - relay nodes that peel one encryption layer and forward
/// - user services that build circuits and send layered messages

use anyhow::Result;
use std::time::Duration;
use tracing::{info, warn, Level};

use onionet_common::{NetworkConfig, NodeId, UserId};
use onionet_daemon::{RegistryService, RelayService, UserService};

const DEFAULT_RELAY_COUNT: u16 = 10;
const DEFAULT_USER_COUNT: u16 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Starting Onionet Daemon v{}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().collect();
    let config = NetworkConfig::default();

    if args.len() > 1 {
        match args[1].as_str() {
            "help" | "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "version" | "--version" | "-v" => {
                println!("Onionet Daemon v{}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "registry" => {
                RegistryService::new(config).start().await?;
            }
            "relay" => {
                let node_id = parse_id(args.get(2))?;
                RelayService::new(NodeId(node_id), config).start().await?;
            }
            "user" => {
                let user_id = parse_id(args.get(2))?;
                UserService::new(UserId(user_id), config).start().await?;
            }
            "sim" => {
                let relays = args
                    .get(2)
                    .map(|s| s.parse())
                    .transpose()?
                    .unwrap_or(DEFAULT_RELAY_COUNT);
                let users = args
                    .get(3)
                    .map(|s| s.parse())
                    .transpose()?
                    .unwrap_or(DEFAULT_USER_COUNT);
                run_simulation(config, relays, users).await?;
            }
            _ => {
                eprintln!("Unknown command: {}", args[1]);
                eprintln!("Run with 'help' to see available commands");
                std::process::exit(1);
            }
        }
    } else {
        // Default: run the full simulation
        run_simulation(config, DEFAULT_RELAY_COUNT, DEFAULT_USER_COUNT).await?;
    }

    Ok(())
}

fn parse_id(arg: Option<&String>) -> Result<u16> {
    arg.ok_or_else(|| anyhow::anyhow!("Missing id argument"))?
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid id: {}", e))
}

/// Launch the registry, `relays` relay nodes and `users` user services
/// in one process and run until interrupted.
async fn run_simulation(config: NetworkConfig, relays: u16, users: u16) -> Result<()> {
    info!(
        "Running simulation with {} relays and {} users",
        relays, users
    );

    let registry = RegistryService::new(config.clone());
    tokio::spawn(async move {
        if let Err(e) = registry.start().await {
            warn!("Registry error: {}", e);
        }
    });

    // Relays register themselves on startup; give the registry a moment
    // to bind first.
    tokio::time::sleep(Duration::from_millis(250)).await;

    for id in 0..relays {
        let relay = RelayService::new(NodeId(id), config.clone());
        tokio::spawn(async move {
            if let Err(e) = relay.start().await {
                warn!("Relay {} error: {}", id, e);
            }
        });
    }

    for id in 0..users {
        let user = UserService::new(UserId(id), config.clone());
        tokio::spawn(async move {
            if let Err(e) = user.start().await {
                warn!("User {} error: {}", id, e);
            }
        });
    }

    info!("Simulation is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    Ok(())
}

/// Print help message
fn print_help() {
    println!("Onionet Daemon - Onion Routing Simulation");
    println!();
    println!("USAGE:");
    println!("    onionet-daemon [COMMAND]");
    println!();
    println!("COMMANDS:");
    println!("    sim [RELAYS] [USERS]    Run registry, relays and users in one process (default)");
    println!("    registry                Run only the node registry");
    println!("    relay <ID>              Run a single relay node");
    println!("    user <ID>               Run a single user service");
    println!("    help                    Show this help message");
    println!("    version                 Show version information");
    println!();
    println!("PORTS:");
    println!("    Registry:   8080");
    println!("    Relay n:    4000 + n");
    println!("    User u:     3000 + u");
    println!();
    println!("EXAMPLES:");
    println!("    # Start the default simulation (10 relays, 2 users)");
    println!("    onionet-daemon");
    println!();
    println!("    # Send a message from user 0 to user 1:");
    println!("    curl -X POST http://localhost:3000/sendMessage \\");
    println!("         -H 'Content-Type: application/json' \\");
    println!("         -d '{{\"message\": \"hello\", \"destinationUserId\": 1}}'");
    println!();
    println!("    # Check what user 1 received:");
    println!("    curl http://localhost:3001/getLastReceivedMessage");
}
