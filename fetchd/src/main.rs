/// Entry point for fetchd, a service that polls registered URLs and records their responses.
mod adding;
mod api;
mod config;
mod error;
mod executor;
mod job_pool;
mod latency;
mod logger;
mod message;
mod poller;
mod reporters;
mod responding;
mod server;
mod storage;

use clap::Parser;
use std::path::PathBuf;

pub use config::Config;
use server::Server;

/// Define command line arguments using clap
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file; built-in defaults apply when omitted
    #[arg(short, long, value_name = "FILE", env = "FETCHD_CONFIG")]
    config: Option<PathBuf>,
}

/// Loads `.env`, starts logging, reads the configuration and runs the server until a
/// shutdown signal arrives.
#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let _logger = logger::init();

    let cli = Cli::parse();
    tracing::debug!("Config path: {:?}", cli.config);
    let conf = match cli.config {
        Some(ref path) => Config::new(path),
        None => Ok(Config::default()),
    };
    let conf = match conf {
        Ok(conf) => conf,
        Err(e) => {
            eprintln!("Failed to initialize configuration: {:?}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::new(conf) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Failed to start fetchd: {:?}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        eprintln!("fetchd terminated: {:?}", e);
        std::process::exit(1);
    }
}
