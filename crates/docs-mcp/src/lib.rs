use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use docs_config::{Config, CredentialSource, LoadOptions};
use docs_edit_core::{
    load_content, BatchPlan, BatchUpdateBody, ContentSource, Credentials, DocsService, Endpoints,
    ExitCode, GoogleDocs, ServiceAccountKey, ServiceSettings,
};
use tracing::info;

pub mod logging;
pub mod server;
pub mod tools;

pub use server::McpServer;

/// Entry point for CLI execution. Returns the desired exit code.
pub fn run() -> Result<i32> {
    let cli = Cli::parse();

    let mut options = LoadOptions::default();
    if let Some(path) = &cli.config {
        options = options.with_override_path(path);
    }
    let config = Config::load(options)?;
    logging::init(&logging::filter_directive(cli.verbose, &config.log.filter))?;
    for layer in &config.sources.layers {
        info!("Loaded {}", layer.describe());
    }

    match cli.command {
        Command::Serve => handle_serve(&config),
        Command::Compile(args) => handle_compile(&config, args),
    }
}

/// Service settings derived from loaded configuration.
pub fn service_settings(config: &Config) -> ServiceSettings {
    ServiceSettings {
        root_folder_id: config.drive.root_folder_id.clone(),
        max_content_chars: config.limits.max_content_chars,
    }
}

/// API credentials from loaded configuration. A key that is present but
/// unreadable fails here; missing credentials fail per request.
pub fn credentials(config: &Config) -> Result<Credentials> {
    Ok(match config.auth.resolve_credentials()? {
        CredentialSource::ServiceAccountKey(json) => {
            let key = ServiceAccountKey::from_json(&json)?;
            info!("Using service account {}", key.client_email);
            Credentials::ServiceAccount(key)
        }
        CredentialSource::AccessToken(token) => Credentials::AccessToken(token),
        CredentialSource::Missing => Credentials::Missing,
    })
}

fn handle_serve(config: &Config) -> Result<i32> {
    let credentials = credentials(config)?;
    let endpoints = Endpoints {
        docs: config.endpoints.docs.clone(),
        drive: config.endpoints.drive.clone(),
    };
    let store = GoogleDocs::new(endpoints, credentials)?;
    let server = McpServer::new(DocsService::new(store, service_settings(config)));

    let stdin = io::stdin();
    let stdout = io::stdout();
    server.serve(stdin.lock(), stdout.lock())?;
    Ok(ExitCode::Success as i32)
}

fn handle_compile(config: &Config, args: CompileArgs) -> Result<i32> {
    let CompileArgs {
        file,
        with_string,
        existing_end,
        pretty,
    } = args;

    let source = match (with_string, file) {
        (Some(text), _) => ContentSource::Inline(text),
        (None, Some(path)) if path.as_os_str() != "-" => ContentSource::File(path),
        (None, _) => ContentSource::Stdin,
    };

    let limit = config.limits.max_content_chars;
    let plan = load_content(source).and_then(|markdown| match existing_end {
        Some(end) => BatchPlan::for_replacement(&markdown, Some(end), limit),
        None => BatchPlan::for_new_document(&markdown, limit),
    });
    let plan = match plan {
        Ok(plan) => plan,
        Err(err) => {
            eprintln!("docs-mcp: {err}");
            return Ok(err.exit_code() as i32);
        }
    };

    let body = BatchUpdateBody::from(&plan);
    let rendered = if pretty {
        serde_json::to_string_pretty(&body)?
    } else {
        serde_json::to_string(&body)?
    };
    emit(&rendered)?;
    Ok(ExitCode::Success as i32)
}

fn emit(content: &str) -> Result<()> {
    print!("{}", content);
    if !content.ends_with('\n') {
        println!();
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Markdown to Google Docs tool server",
    propagate_version = true
)]
struct Cli {
    /// Configuration file to apply over discovered ones
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the MCP server over stdin/stdout
    Serve,
    /// Print the batchUpdate body for a markdown payload
    Compile(CompileArgs),
}

#[derive(Args)]
struct CompileArgs {
    /// Markdown file (use '-' or omit for stdin)
    #[arg(value_name = "FILE", conflicts_with = "with_string")]
    file: Option<PathBuf>,

    /// Inline markdown with escape sequences (\\n, \\t, \\\\ , \\")
    #[arg(long = "with-string", value_name = "TEXT", allow_hyphen_values = true)]
    with_string: Option<String>,

    /// End index of the document body being replaced
    #[arg(long = "existing-end", value_name = "N")]
    existing_end: Option<usize>,

    /// Pretty-print the JSON body
    #[arg(long)]
    pretty: bool,
}
