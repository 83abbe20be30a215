//! `devportal` command-line tool.
//!
//! Finds a GrayJay developer server (or uses the configured/flagged host)
//! and runs one operation against it.  Results go to stdout as JSON; logs go
//! to stderr.
//!
//! # Settings precedence
//!
//! ```text
//! built-in defaults  <  config file  <  DEVPORTAL_* env vars  <  flags
//! ```
//!
//! clap resolves env vars and flags together, so the file only ever has to
//! be overlaid once.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use devportal_client::infrastructure::storage::config::{
    default_config_path, load_config, ToolConfig,
};
use devportal_client::{connect_discovered, DevPortalClient, DiscoveryEngine, RpcTarget};
use devportal_core::{protocol::routes, PluginConfig};

#[derive(Debug, Parser)]
#[command(
    name = "devportal",
    version,
    about = "Find and drive a GrayJay plugin developer server"
)]
struct Cli {
    /// Path to the config file.
    #[arg(long, global = true, env = "DEVPORTAL_CONFIG")]
    config: Option<PathBuf>,

    /// Developer server host; skips discovery.
    #[arg(long, global = true, env = "DEVPORTAL_HOST")]
    host: Option<String>,

    #[arg(long, global = true, env = "DEVPORTAL_PORT")]
    port: Option<u16>,

    /// Discovery timeout in milliseconds.
    #[arg(long, global = true, env = "DEVPORTAL_TIMEOUT_MS")]
    timeout_ms: Option<u64>,

    /// Do not browse for mDNS advertisements.
    #[arg(long, global = true, env = "DEVPORTAL_SKIP_MDNS")]
    skip_mdns: bool,

    /// Go straight to network probing.
    #[arg(long, global = true, env = "DEVPORTAL_SCAN")]
    scan: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List developer servers on the local network.
    Discover,
    /// Check that the developer server is up.
    Ping {
        /// Wait this long after a successful ping.
        #[arg(long, default_value_t = 0)]
        wait_ms: u64,
    },
    /// Inject a plugin: script URL plus its config file.
    Inject {
        script_url: String,
        config: PathBuf,
    },
    /// Call a plugin method.  Arguments are JSON, or plain strings.
    Call {
        method: String,
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
        /// Call on this server-side object instead of the test plugin.
        #[arg(long)]
        id: Option<String>,
    },
    /// Read a property of a server-side object.
    Prop { id: String, prop: String },
    /// Developer log entries.
    Logs {
        #[arg(long, default_value_t = routes::ALL_LOGS, allow_hyphen_values = true)]
        index: i64,
    },
    /// Plugin warnings.
    Warnings,
    /// Source of a plugin package.
    Package { name: String },
    /// Fetch a URL through the developer server.
    Fetch {
        url: String,
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Whether the test plugin is logged in.
    LoginState,
}

impl Cli {
    /// Overlays flags and env vars onto the file config.
    fn apply(&self, config: &mut ToolConfig) {
        if let Some(host) = &self.host {
            config.target.host = Some(host.clone());
        }
        if let Some(port) = self.port {
            config.target.port = port;
        }
        if let Some(ms) = self.timeout_ms {
            config.discovery.timeout_ms = Some(ms);
        }
        if self.skip_mdns {
            config.discovery.skip_advertisement = true;
        }
        if self.scan {
            config.discovery.force_sweep = true;
        }
    }
}

/// A JSON literal if it parses, otherwise the text as a string.
fn parse_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_tool_config(cli: &Cli) -> anyhow::Result<ToolConfig> {
    let path = match &cli.config {
        Some(path) => Some(path.clone()),
        None => default_config_path().ok(),
    };
    let mut config = match path {
        Some(path) => load_config(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ToolConfig::default(),
    };
    cli.apply(&mut config);
    Ok(config)
}

async fn resolve_client(config: &ToolConfig) -> anyhow::Result<DevPortalClient> {
    let timeouts = config.to_timeouts();
    if let Some(host) = &config.target.host {
        debug!("using configured target {host}:{}", config.target.port);
        let client = DevPortalClient::new(RpcTarget::new(host.clone(), config.target.port))
            .context("building HTTP client")?;
        return Ok(client.with_timeouts(timeouts));
    }
    let engine = DiscoveryEngine::system().context("building HTTP client")?;
    connect_discovered(&engine, &config.to_discovery_config(), timeouts)
        .await
        .context("discovering a developer server")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_tool_config(&cli)?;

    // Structured logging on stderr.  `RUST_LOG` overrides the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Command::Discover = cli.command {
        let engine = DiscoveryEngine::system().context("building HTTP client")?;
        let devices = engine.discover(&config.to_discovery_config()).await;
        info!("discovery finished with {} device(s)", devices.len());
        return print_json(&devices);
    }

    let client = resolve_client(&config).await?;
    info!("using developer server at {}", client.base_url());

    match cli.command {
        // Answered before a client was needed.
        Command::Discover => Ok(()),
        Command::Ping { wait_ms } => {
            let alive = client.load_portal(Duration::from_millis(wait_ms)).await;
            print_json(&json!({ "alive": alive }))
        }
        Command::Inject { script_url, config } => {
            let text = std::fs::read_to_string(&config)
                .with_context(|| format!("reading plugin config {}", config.display()))?;
            let plugin = PluginConfig::from_json(&text)
                .with_context(|| format!("parsing plugin config {}", config.display()))?;
            let result = client
                .update_test_plugin(&script_url, &plugin)
                .await
                .context("injecting plugin")?;
            print_json(&json!({ "success": true, "result": result }))
        }
        Command::Call { method, args, id } => {
            let args: Vec<Value> = args.iter().map(String::as_str).map(parse_arg).collect();
            let outcome = match id {
                Some(id) => client.call_by_id(&id, &method, &args).await,
                None => client.call(&method, &args).await,
            };
            print_json(&outcome)
        }
        Command::Prop { id, prop } => {
            let value = client
                .get_property(&id, &prop)
                .await
                .context("reading property")?;
            print_json(&value)
        }
        Command::Logs { index } => print_json(&client.get_dev_logs(index).await),
        Command::Warnings => {
            let warnings = client.get_warnings().await.context("reading warnings")?;
            print_json(&warnings)
        }
        Command::Package { name } => {
            let source = client
                .get_package(&name)
                .await
                .with_context(|| format!("reading package {name}"))?;
            print_json(&source)
        }
        Command::Fetch { url, content_type } => {
            let body = client
                .fetch_content(&url, content_type.as_deref())
                .await
                .with_context(|| format!("fetching {url}"))?;
            print_json(&body)
        }
        Command::LoginState => {
            let logged_in = client.is_logged_in().await;
            print_json(&json!({ "loggedIn": logged_in }))
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
