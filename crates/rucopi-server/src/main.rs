// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Rucopi user provisioning server binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rucopi_server::{cors_layer, create_app_state, create_router};
use rucopi_server_config::LogFormat;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod version;

/// Rucopi server - admin-gated user provisioning.
#[derive(Parser, Debug)]
#[command(
	name = "rucopi-server",
	about = "Rucopi user provisioning server",
	version
)]
struct Args {
	/// Path to a TOML config file (defaults to /etc/rucopi/server.toml)
	#[arg(long, env = "RUCOPI_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	// Load .env file if present; clap reads RUCOPI_SERVER_CONFIG from it
	dotenvy::dotenv().ok();

	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	let config = match &args.config {
		Some(path) => rucopi_server_config::load_config_with_file(path)?,
		None => rucopi_server_config::load_config()?,
	};

	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());
	let registry = tracing_subscriber::registry().with(filter);
	match config.logging.format {
		LogFormat::Json => registry
			.with(tracing_subscriber::fmt::layer().json())
			.init(),
		LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
	}

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		backend_url = %config.backend.url,
		mode = %config.provisioning.mode,
		"starting rucopi-server"
	);

	let state = create_app_state(&config);
	let app = create_router(state)
		.layer(TraceLayer::new_for_http())
		.layer(cors_layer());

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);

	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}
