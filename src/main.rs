mod api;
mod banner;
mod cache;
mod cli;
mod commands;
mod config;
mod constants;
mod help;
mod history;
mod navigation;
mod parser;
mod persist;
mod repl;
mod session;
mod state;
mod ui;
mod version;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::api::{ApiClient, Auth};
use crate::cli::Cli;
use crate::commands::builtin_registry;
use crate::config::Config;
use crate::persist::PersistedState;
use crate::state::AppContext;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match config::load_config() {
        Ok(cfg) => cfg,
        Err(err) => {
            config::print_config_error(&err);
            Config::default()
        }
    };

    if let Err(err) = run(cli, config) {
        eprintln!("❌ {err:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "antbox_cli=debug"
    } else {
        "antbox_cli=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli, config: Config) -> Result<()> {
    let client = connect(&cli, &config)?;
    let server_url = client.base_url().to_string();
    let auth_mode = client.auth().describe();

    let mut ctx = AppContext::new(config, Arc::new(client), Arc::new(builtin_registry()))
        .with_server(&server_url, auth_mode);

    match persist::state_path() {
        Ok(path) => {
            let saved = PersistedState::load_or_default(&path);
            ctx = ctx.with_state_path(path);
            ctx.restore(saved);
        }
        Err(err) => warn!("session state will not be kept: {err}"),
    }

    repl::run(&mut ctx)
}

fn connect(cli: &Cli, config: &Config) -> Result<ApiClient> {
    let client = ApiClient::new(&cli.server_url, Auth::Anonymous, config.http.timeout());

    let auth = if let Some(password) = &cli.root_passwd {
        let jwt = client
            .login_root(password)
            .context("root login failed")?;
        debug!("logged in as root");
        Auth::Bearer(jwt)
    } else if let Some(jwt) = &cli.jwt {
        Auth::Bearer(jwt.clone())
    } else if let Some(key) = &cli.api_key {
        Auth::ApiKey(key.clone())
    } else {
        Auth::Anonymous
    };

    Ok(client.with_auth(auth))
}
