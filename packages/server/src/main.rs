#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Access map API server.
//!
//! ```text
//! cargo run -p access_map_server -- [--bind-addr 0.0.0.0] [--port 8080] [--database-path data/access_map.db]
//! ```
//!
//! Flags override the `BIND_ADDR`, `PORT`, and `DATABASE_PATH` environment
//! variables.

use std::path::PathBuf;

use access_map_server::{ServerConfig, run_server};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "access_map_server",
    about = "Serve access map records and analytics"
)]
struct Cli {
    /// Interface to bind
    #[arg(long)]
    bind_addr: Option<String>,
    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,
    /// Path to the records `SQLite` database
    #[arg(long)]
    database_path: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> ServerConfig {
        let env = ServerConfig::from_env();
        ServerConfig {
            bind_addr: self.bind_addr.unwrap_or(env.bind_addr),
            port: self.port.unwrap_or(env.port),
            database_path: self.database_path.unwrap_or(env.database_path),
            frontend_url: env.frontend_url,
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    run_server(Cli::parse().into_config()).await
}
