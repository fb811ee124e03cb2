use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::{ArgGroup, Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use vignette_config::{Config, ConfigLoader};
use vignette_core::{
    InMemoryClientRegistry, OriginMatcher, ServerClient, SourceResolver,
    resolver::Resolution,
};
use vignette_model::{
    CachePolicy, Headers, ImageRequest, ImageSource, RemoteSource,
    ServerIdentity,
};

#[derive(Debug, Parser)]
#[command(
    name = "vignettectl",
    version,
    about = "Inspect how image sources resolve against a server"
)]
struct Cli {
    /// Path to a TOML config file (overrides VIGNETTE_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Load environment variables from this file instead of ./.env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve an image source and optional placeholder into request descriptors
    Resolve(ResolveArgs),
    /// Print the cache partition name used for a server
    CachePath {
        /// Server base URL (defaults to the configured server)
        #[arg(long)]
        server: Option<String>,
    },
    /// Report whether a URI would receive the server's auth headers
    CheckAuth {
        /// Image URI to check
        uri: String,
        /// Server base URL (defaults to the configured server)
        #[arg(long)]
        server: Option<String>,
    },
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("source").required(true).args(["uri", "asset"])))]
struct ResolveArgs {
    /// Server base URL (defaults to the configured server)
    #[arg(long)]
    server: Option<String>,

    /// Network URI of the primary image
    #[arg(long)]
    uri: Option<String>,

    /// Bundled asset handle of the primary image
    #[arg(long)]
    asset: Option<u32>,

    /// Network URI of the placeholder image
    #[arg(long, conflicts_with = "placeholder_asset")]
    placeholder_uri: Option<String>,

    /// Bundled asset handle of the placeholder image
    #[arg(long)]
    placeholder_asset: Option<u32>,

    /// Image id used for the persistent cache key
    #[arg(long)]
    id: Option<String>,

    /// Keep the image out of the persistent cache
    #[arg(long)]
    memory_only: bool,

    /// Bearer token of the server's authenticated client
    #[arg(long)]
    token: Option<String>,

    /// Caller header as NAME=VALUE (repeatable)
    #[arg(long = "header", value_name = "NAME=VALUE", value_parser = parse_header)]
    headers: Vec<(String, String)>,

    /// Print JSON on a single line
    #[arg(long)]
    compact: bool,
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in '{raw}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Command::Resolve(args) => run_resolve(args, &config),
        Command::CachePath { server } => {
            let server = active_server(server, &config)?;
            let path = Resolution::new(&config.resolver)
                .deriver()
                .cache_path_for(&server);
            println!("{path}");
            Ok(())
        }
        Command::CheckAuth { uri, server } => {
            let server = active_server(server, &config)?;
            let attach = OriginMatcher::new(&config.resolver.auth_path_prefix)
                .should_attach_auth(Some(uri.as_str()), &server);
            println!("{attach}");
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = &cli.env_file {
        loader = loader.with_env_file(path);
    }
    let load = loader.load().context("failed to load configuration")?;
    if load.config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    Ok(load.config)
}

fn active_server(
    explicit: Option<String>,
    config: &Config,
) -> Result<ServerIdentity> {
    explicit
        .map(ServerIdentity::new)
        .or_else(|| config.server_url.clone())
        .ok_or_else(|| {
            anyhow!("no server configured; pass --server or set VIGNETTE_SERVER_URL")
        })
}

fn run_resolve(args: ResolveArgs, config: &Config) -> Result<()> {
    let server = active_server(args.server, config)?;

    let registry = Arc::new(InMemoryClientRegistry::new());
    if let Some(token) = args.token {
        let client = ServerClient::new(server.clone());
        client.set_token(Some(token));
        registry.register(server.clone(), Arc::new(client));
    } else {
        debug!(%server, "no token given; resolving without a client");
    }
    let resolver = SourceResolver::with_config(registry, &config.resolver);

    let caller_headers = (!args.headers.is_empty())
        .then(|| args.headers.into_iter().collect::<Headers>());
    let source = match (args.uri, args.asset) {
        (Some(uri), _) => {
            let mut remote = RemoteSource::new(uri);
            remote.headers = caller_headers;
            ImageSource::Remote(remote)
        }
        (None, Some(handle)) => ImageSource::bundled(handle),
        (None, None) => return Err(anyhow!("either --uri or --asset is required")),
    };
    let placeholder = match (args.placeholder_uri, args.placeholder_asset) {
        (Some(uri), _) => Some(ImageSource::remote(uri)),
        (None, Some(handle)) => Some(ImageSource::bundled(handle)),
        (None, None) => None,
    };

    let mut request = ImageRequest::new(
        source,
        CachePolicy::from_props(args.id.as_deref(), args.memory_only),
    );
    request.placeholder = placeholder;

    let resolved = resolver.resolve(&request, &server);
    let json = if args.compact {
        serde_json::to_string(&resolved)
    } else {
        serde_json::to_string_pretty(&resolved)
    }
    .context("failed to serialize resolved image")?;
    println!("{json}");
    Ok(())
}
