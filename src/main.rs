use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use notion_mcp_server::{NotionClient, NotionConfig, NotionMcpServer, NotionServerConfig};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("notion-mcp-server")
        .version(VERSION)
        .about("A Notion MCP server exposing workspace tools with a uniform result envelope")
        .subcommand(
            Command::new("stdio")
                .about("Start stdio server")
                .long_about("Start a server that communicates via standard input/output streams using JSON-RPC messages")
                .arg(
                    Arg::new("toolsets")
                        .long("toolsets")
                        .value_name("TOOLSETS")
                        .help("Comma separated list of groups of tools to allow")
                        .default_value("all")
                        .action(ArgAction::Set)
                )
                .arg(
                    Arg::new("read-only")
                        .long("read-only")
                        .help("Restrict the server to read-only operations")
                        .action(ArgAction::SetTrue)
                )
                .arg(
                    Arg::new("log-file")
                        .long("log-file")
                        .value_name("FILE")
                        .help("Path to log file")
                        .action(ArgAction::Set)
                )
                .arg(
                    Arg::new("enable-command-logging")
                        .long("enable-command-logging")
                        .help("Enable logging of all command requests and responses")
                        .action(ArgAction::SetTrue)
                )
        )
        .get_matches();

    dotenvy::dotenv().ok();

    match matches.subcommand() {
        Some(("stdio", sub_matches)) => {
            init_logging(sub_matches.get_one::<String>("log-file").map(String::as_str))?;

            let notion_config = NotionConfig::from_env()?;
            let config = server_config(sub_matches);

            info!("Starting Notion MCP Server v{}", VERSION);
            info!("Configuration: {:?} {:?}", config, notion_config);

            let client = NotionClient::new(&notion_config)?;
            let server = NotionMcpServer::new(config, client);
            server.run_stdio().await?;
        }
        _ => {
            eprintln!("No subcommand specified. Use 'stdio' to start the server.");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn server_config(matches: &ArgMatches) -> NotionServerConfig {
    let enabled_toolsets = matches
        .get_one::<String>("toolsets")
        .map(|s| {
            s.split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_else(|| vec!["all".to_string()]);

    NotionServerConfig {
        version: VERSION.to_string(),
        enabled_toolsets,
        read_only: matches.get_flag("read-only"),
        enable_command_logging: matches.get_flag("enable-command-logging"),
    }
}

/// Stdout carries the protocol, so logs go to stderr or to `log_file`.
fn init_logging(log_file: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("notion_mcp_server=info"));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let stderr_layer = if file_layer.is_none() {
        Some(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}
