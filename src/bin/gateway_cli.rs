//! aorium-gateway CLI: send prompts through the model gateway from a shell.
//!
//! Usage:
//!   aorium-gateway-cli invoke [--json] [--config <path>] <prompt>
//!   aorium-gateway-cli chat [--file <path>] [--config <path>] <message>
//!   aorium-gateway-cli analyze <task> [--file <path>] [--config <path>] <prompt>
//!   aorium-gateway-cli config [--config <path>]

use anyhow::{bail, Context};
use aorium_gateway::facade::analysis::{is_textual, mime_from_filename, AnalysisContext, FileInfo};
use aorium_gateway::facade::chat::user_facing_error;
use aorium_gateway::prelude::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Options {
    json: bool,
    config: Option<PathBuf>,
    file: Option<PathBuf>,
    positional: Vec<String>,
}

fn parse_options(args: &[String]) -> anyhow::Result<Options> {
    let mut opts = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => opts.json = true,
            "--config" => {
                let v = iter.next().context("--config needs a path")?;
                opts.config = Some(PathBuf::from(v));
            }
            "--file" => {
                let v = iter.next().context("--file needs a path")?;
                opts.file = Some(PathBuf::from(v));
            }
            other if other.starts_with("--") => bail!("Unknown option: {other}"),
            other => opts.positional.push(other.to_string()),
        }
    }
    Ok(opts)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("aorium_gateway=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let outcome = match args[1].as_str() {
        "invoke" => cmd_invoke(&args[2..]).await,
        "chat" => cmd_chat(&args[2..]).await,
        "analyze" => cmd_analyze(&args[2..]).await,
        "config" => cmd_config(&args[2..]),
        "version" | "--version" | "-V" => {
            println!("aorium-gateway-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = outcome {
        match e.downcast_ref::<Error>() {
            Some(gw) => {
                tracing::error!(error = %gw, "command failed");
                eprintln!("{}", user_facing_error(gw));
            }
            None => eprintln!("error: {e:#}"),
        }
        std::process::exit(2);
    }
}

fn print_usage() {
    println!(
        r#"aorium-gateway-cli: model invocation gateway

USAGE:
    aorium-gateway-cli <COMMAND> [OPTIONS]

COMMANDS:
    invoke [--json] <prompt>            Send one user message, print the result
    chat [--file <path>] <message>      Chat reply, optionally with an attached text file
    analyze <task> [--file <path>] <prompt>
                                        Run an analysis task (file-analysis,
                                        business-analysis, benchmarking, market-potential)
    config                              Print the effective configuration
    version                             Show version information
    help                                Show this help message

OPTIONS:
    --config <path>                     YAML configuration file

ENVIRONMENT:
    AORIUM_API_KEY / OPEN_ROUTER_API_KEY   Provider API key
    AORIUM_MODELS                          Comma-separated candidate models
    AORIUM_RETRY_MAX_ATTEMPTS              Attempts per candidate (default 3)
    AORIUM_RETRY_BASE_DELAY_MS             Backoff base in ms (default 1000)
    RUST_LOG                               Log filter (default aorium_gateway=info)"#
    );
}

fn load_client(opts: &Options) -> anyhow::Result<GatewayClient> {
    let config = GatewayConfig::load(opts.config.as_deref())?;
    Ok(GatewayClient::new(config)?)
}

fn prompt_of(opts: &Options, skip: usize) -> String {
    opts.positional
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join(" ")
}

async fn cmd_invoke(args: &[String]) -> anyhow::Result<()> {
    let opts = parse_options(args)?;
    let prompt = prompt_of(&opts, 0);
    let client = load_client(&opts)?;
    let result = client.invoke(&[Message::user(prompt)], opts.json).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn cmd_chat(args: &[String]) -> anyhow::Result<()> {
    let opts = parse_options(args)?;
    let message = prompt_of(&opts, 0);
    let file_content = match &opts.file {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?,
        ),
        None => None,
    };
    let client = load_client(&opts)?;
    let reply = client.chat_reply(&message, file_content.as_deref()).await?;
    println!("{}", reply.reply);
    Ok(())
}

async fn cmd_analyze(args: &[String]) -> anyhow::Result<()> {
    let opts = parse_options(args)?;
    let task: AnalysisTask = opts
        .positional
        .first()
        .context("analyze needs a task")?
        .parse()?;
    let mut ctx = AnalysisContext::new(prompt_of(&opts, 1));
    if let Some(path) = &opts.file {
        let (info, content) = read_for_analysis(path)?;
        ctx = ctx.with_file_info(info).with_content(content);
    }

    let client = load_client(&opts)?;
    let result = client.analyze(task, &ctx).await?;
    if result.is_invalid_response() {
        tracing::warn!(model = result.model_used.as_str(), "model returned invalid JSON");
    }
    println!("{}", serde_json::to_string_pretty(&result.content)?);
    Ok(())
}

/// File metadata plus its text when the format is plain text; binary formats
/// are described but not inlined.
fn read_for_analysis(path: &Path) -> anyhow::Result<(FileInfo, String)> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let mime = mime_from_filename(&name);
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let content = if is_textual(&name, mime) {
        String::from_utf8_lossy(&bytes).to_string()
    } else {
        String::new()
    };
    let info = FileInfo {
        name,
        size: Some(bytes.len() as u64),
        mime: Some(mime.to_string()).filter(|m| !m.is_empty()),
        url: None,
    };
    Ok((info, content))
}

fn cmd_config(args: &[String]) -> anyhow::Result<()> {
    let opts = parse_options(args)?;
    let mut config = GatewayConfig::load(opts.config.as_deref())?;
    if config.api_key.is_some() {
        config.api_key = Some("<redacted>".to_string());
    }
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}
