use aep_explorer::client::{Api, Backend, HttpTransport};
use aep_explorer::config::Config;
use aep_explorer::mock::MockStore;
use aep_explorer::schema::{validation, Catalogue, Document, ParentParameters, Resource};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Version injected at compile time via AEP_EXPLORER_VERSION env var (set by
/// CI/CD), or "dev" for local builds.
pub const VERSION: &str = match option_env!("AEP_EXPLORER_VERSION") {
    Some(v) => v,
    None => "dev",
};

/// CRUD console for AEP-compliant APIs
#[derive(Parser, Debug)]
#[command(name = "aep-explorer", version = VERSION, about, long_about = None)]
struct Args {
    /// OpenAPI document to explore (URL or file path)
    #[arg(short, long)]
    spec: Option<String>,

    /// Server base URL override (defaults to the document's first server)
    #[arg(long)]
    server: Option<String>,

    /// Request headers as "K1:V1,K2:V2"
    #[arg(long)]
    headers: Option<String>,

    /// Use the in-memory mock backend instead of live HTTP
    #[arg(long)]
    mock: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the resource types the document declares
    Resources,
    /// List a collection
    List {
        /// Plural resource name
        resource: String,
        /// Parent bindings as name=value (repeatable)
        #[arg(short = 'p', long = "parent", value_parser = parse_binding)]
        parents: Vec<(String, String)>,
    },
    /// Fetch one record
    Get {
        resource: String,
        id: String,
        #[arg(short = 'p', long = "parent", value_parser = parse_binding)]
        parents: Vec<(String, String)>,
    },
    /// Create a record from a JSON body
    Create {
        resource: String,
        /// JSON object with the record's properties
        #[arg(long)]
        data: String,
        /// Caller-assigned identifier (only for resources with a writable id)
        #[arg(long)]
        id: Option<String>,
        #[arg(short = 'p', long = "parent", value_parser = parse_binding)]
        parents: Vec<(String, String)>,
    },
    /// Patch a record with a partial JSON body
    Update {
        resource: String,
        id: String,
        #[arg(long)]
        data: String,
        #[arg(short = 'p', long = "parent", value_parser = parse_binding)]
        parents: Vec<(String, String)>,
    },
    /// Delete a record
    Delete {
        resource: String,
        id: String,
        #[arg(short = 'p', long = "parent", value_parser = parse_binding)]
        parents: Vec<(String, String)>,
    },
    /// Show the child resource types of one record
    Children {
        resource: String,
        id: String,
        #[arg(short = 'p', long = "parent", value_parser = parse_binding)]
        parents: Vec<(String, String)>,
    },
    /// Invoke a custom method on one record
    Call {
        resource: String,
        id: String,
        /// Custom method name (e.g. "archive")
        method: String,
        /// Optional JSON request body
        #[arg(long)]
        data: Option<String>,
        #[arg(short = 'p', long = "parent", value_parser = parse_binding)]
        parents: Vec<(String, String)>,
    },
}

fn parse_binding(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got \"{raw}\""))
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let tracing_level = level.to_tracing_level()?;

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .expect("Failed to open log file");

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("aep-explorer started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Some(guard)
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("aep-explorer").join("aep-explorer.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".aep-explorer").join("aep-explorer.log");
    }
    PathBuf::from("aep-explorer.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let mut config = Config::load();
    let spec = config
        .effective_spec(args.spec.clone())
        .context("No OpenAPI document configured. Pass --spec <url|file>")?;
    let server = config.effective_server(args.server.clone());
    let headers = config.effective_headers(args.headers.clone());
    let mock = args.mock || config.mock;

    tracing::info!("Loading document from {}", spec);
    let text = load_document(&spec).await?;
    let document = Document::parse(&text)?;

    let mut catalogue = Catalogue::from_document(&document)?;
    if let Some(server) = &server {
        catalogue.set_server_url(server);
    }

    if let Err(e) = config.remember(&spec, server.as_deref(), &headers, mock) {
        tracing::warn!("Failed to persist config: {}", e);
    }

    let backend = if mock {
        Backend::Mock(MockStore::new())
    } else {
        Backend::Http(HttpTransport::new()?)
    };
    let api = Api::new(catalogue, backend, &headers);

    run_command(&api, args.command).await
}

/// Fetch the document text from an HTTP(S) URL or read it from disk.
async fn load_document(spec: &str) -> Result<String> {
    if spec.starts_with("http://") || spec.starts_with("https://") {
        let response = reqwest::get(spec)
            .await
            .with_context(|| format!("Failed to fetch OpenAPI document from {spec}"))?;
        let text = response
            .text()
            .await
            .context("Failed to read OpenAPI document body")?;
        Ok(text)
    } else {
        std::fs::read_to_string(spec)
            .with_context(|| format!("Failed to read OpenAPI document from {spec}"))
    }
}

fn bound_resource(api: &Api, plural: &str, parents: Vec<(String, String)>) -> Result<Resource> {
    let mut resource = api.resource(plural)?.clone();
    resource.bindings = parents.into_iter().collect::<ParentParameters>();
    Ok(resource)
}

fn parse_body(data: &str) -> Result<Map<String, Value>> {
    let value: Value = serde_json::from_str(data).context("Body is not valid JSON")?;
    value
        .as_object()
        .cloned()
        .context("Body must be a JSON object")
}

async fn run_command(api: &Api, command: Command) -> Result<()> {
    match command {
        Command::Resources => {
            for resource in api.catalogue().resources() {
                let parents = resource.parent_resources().join(", ");
                println!(
                    "{}  (singular: {}, pattern: {}, parents: [{}])",
                    resource.plural,
                    resource.singular,
                    resource.pattern(),
                    parents
                );
            }
        }
        Command::List { resource, parents } => {
            let resource = bound_resource(api, &resource, parents)?;
            let instances = api.list(&resource).await?;
            if instances.is_empty() {
                println!("No {}", resource.plural);
            }
            for instance in instances {
                println!("{}", serde_json::to_string_pretty(&instance.properties)?);
            }
        }
        Command::Get { resource, id, parents } => {
            let resource = bound_resource(api, &resource, parents)?;
            let instance = api.get(&resource, &id).await?;
            println!("{}", serde_json::to_string_pretty(&instance.properties)?);
        }
        Command::Create { resource, data, id, parents } => {
            let resource = bound_resource(api, &resource, parents)?;
            let mut body = parse_body(&data)?;
            validation::strip_read_only(resource.properties(), &mut body);

            let tree = validation::constraints(resource.properties(), resource.required());
            let violations = validation::evaluate(&tree, &Value::Object(body.clone()));
            if !violations.is_empty() {
                anyhow::bail!("Invalid body: {}", violations.join("; "));
            }

            api.create(&resource, &body, id.as_deref()).await?;
            println!("Created {}", resource.singular);
        }
        Command::Update { resource, id, data, parents } => {
            let resource = bound_resource(api, &resource, parents)?;
            let mut body = parse_body(&data)?;
            validation::strip_read_only(resource.properties(), &mut body);
            api.update(&resource, &id, &body).await?;
            println!("Updated {}/{}", resource.plural, id);
        }
        Command::Delete { resource, id, parents } => {
            let resource = bound_resource(api, &resource, parents)?;
            api.delete(&resource, &id).await?;
            println!("Deleted {}/{}", resource.plural, id);
        }
        Command::Children { resource, id, parents } => {
            let resource = bound_resource(api, &resource, parents)?;
            let children = api.children_of(&resource, &id);
            if children.is_empty() {
                println!("{}/{} has no child resource types", resource.plural, id);
            }
            for child in children {
                let bindings = child
                    .bindings
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("{}  (parents: {})", child.plural, bindings);
            }
        }
        Command::Call { resource, id, method, data, parents } => {
            let resource = bound_resource(api, &resource, parents)?;
            let instance = api.get(&resource, &id).await?;
            let Some(custom) = instance
                .resource
                .custom_methods()
                .iter()
                .find(|m| m.name == method)
                .cloned()
            else {
                anyhow::bail!("{} declares no custom method \"{}\"", resource.plural, method);
            };

            let body = data.map(|d| serde_json::from_str(&d)).transpose()
                .context("Body is not valid JSON")?;
            let response = api.call(&instance, &custom, body.as_ref()).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }
    Ok(())
}
