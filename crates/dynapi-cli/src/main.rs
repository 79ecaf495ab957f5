use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde_json::Value;

use dynapi_core::binder::{self, Arguments, BODY_KEY};
use dynapi_core::config::{self, CONFIG_FILE_NAME, DynapiConfig};
use dynapi_core::engine::HttpEngine;
use dynapi_core::loader;
use dynapi_core::{Catalog, ClientError, ClientOptions, OpenApiClient};

#[derive(Parser)]
#[command(name = "dynapi", about = "Call any OpenAPI 3.x operation by name", version)]
struct Cli {
    /// URL or path of the OpenAPI document (defaults to `spec` in .dynapi.yaml)
    #[arg(short, long, global = true)]
    spec: Option<String>,

    /// Override the base URL derived from the document
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "json")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the callable operations
    List,

    /// Show the parameters of one operation
    Info {
        /// Operation name (case-insensitive) or alias
        operation: String,
    },

    /// Call an operation and print the response record
    Call {
        /// Operation name (case-insensitive) or alias
        operation: String,

        /// Named argument as key=value; the value is parsed as JSON when possible
        #[arg(short = 'a', long = "arg", value_name = "KEY=VALUE")]
        args: Vec<String>,

        /// Positional argument, paired with parameters in declaration order
        #[arg(short = 'p', long = "positional", value_name = "VALUE", conflicts_with = "args")]
        positional: Vec<String>,

        /// Request body as JSON
        #[arg(long)]
        body: Option<String>,

        /// Print the request instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate an OpenAPI document and summarise its operations
    Validate,

    /// Initialize a new dynapi configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Init { force } => cmd_init(*force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(*shell, &mut cmd, "dynapi", &mut std::io::stdout());
            Ok(ExitCode::SUCCESS)
        }

        Commands::Validate => cmd_validate(&cli).await,

        Commands::List => {
            let (client, _) = open_client(&cli).await?;
            let rows: Vec<Value> = client
                .catalog()
                .operations()
                .map(|op| {
                    serde_json::json!({
                        "operationId": op.operation_id,
                        "method": op.method.as_str(),
                        "path": op.path,
                        "summary": op.summary.clone().unwrap_or_default(),
                    })
                })
                .collect();
            print_value(&Value::Array(rows), cli.format)?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Info { operation } => {
            let (client, cfg) = open_client(&cli).await?;
            let info = client.info(cfg.resolve_alias(operation))?;
            print_value(&serde_json::to_value(info)?, cli.format)?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Call {
            operation,
            args,
            positional,
            body,
            dry_run,
        } => {
            let (client, cfg) = open_client(&cli).await?;
            let name = cfg.resolve_alias(operation);
            let body = body
                .as_deref()
                .map(|b| serde_json::from_str::<Value>(b).context("--body is not valid JSON"))
                .transpose()?;

            let named = if positional.is_empty() {
                let mut named = parse_named_args(args)?;
                if let Some(body) = body {
                    named.insert(BODY_KEY.to_string(), body);
                }
                named
            } else {
                if body.is_some() {
                    anyhow::bail!("--body cannot be combined with positional arguments");
                }
                let op = client
                    .catalog()
                    .lookup(name)
                    .ok_or_else(|| ClientError::UnknownOperation(name.to_string()))?;
                let values: Vec<Value> = positional.iter().map(|v| parse_value(v)).collect();
                binder::name_positional(op, &values)
            };

            if *dry_run {
                let request = client.prepare(name, &named)?;
                print_value(&request.describe(), cli.format)?;
                return Ok(ExitCode::SUCCESS);
            }

            let record = client.call_named(name, &named).await?;
            print_value(&serde_json::to_value(&record)?, cli.format)?;
            if let Some(error) = &record.error {
                log::error!("{name}: {error}");
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<DynapiConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

fn spec_location(cli: &Cli, cfg: &DynapiConfig) -> Result<String> {
    cli.spec
        .clone()
        .or_else(|| cfg.spec.clone())
        .with_context(|| format!("no spec given; pass --spec or set `spec` in {CONFIG_FILE_NAME}"))
}

fn client_options(cli: &Cli, cfg: &DynapiConfig) -> Result<ClientOptions> {
    let mut options = cfg.client_options()?;
    if let Some(base_url) = &cli.base_url {
        options = options.with_base_url(base_url);
    }
    Ok(options)
}

async fn open_client(cli: &Cli) -> Result<(OpenApiClient, DynapiConfig)> {
    let cfg = try_load_config()?.unwrap_or_default();
    let location = spec_location(cli, &cfg)?;
    let options = client_options(cli, &cfg)?;
    let client = OpenApiClient::connect(&location, options)
        .await
        .with_context(|| format!("failed to open {location}"))?;
    Ok((client, cfg))
}

async fn cmd_validate(cli: &Cli) -> Result<ExitCode> {
    let cfg = try_load_config()?.unwrap_or_default();
    let location = spec_location(cli, &cfg)?;
    let engine = HttpEngine::new(&client_options(cli, &cfg)?)?;
    let spec = loader::load(engine.http(), &location)
        .await
        .with_context(|| format!("failed to load {location}"))?;

    eprintln!("Valid OpenAPI {} spec: {}", spec.openapi, spec.info.title);
    eprintln!("  Version: {}", spec.info.version);
    eprintln!("  Paths: {}", spec.paths.len());

    let catalog = Catalog::build(&spec);
    let synthesized = catalog.operations().filter(|op| op.synthesized_id).count();
    eprintln!("  Operations: {}", catalog.len());
    if synthesized > 0 {
        eprintln!("  Synthesised operationIds: {synthesized}");
    }

    let dangling: Vec<&str> = cfg
        .aliases
        .iter()
        .filter(|(_, target)| !catalog.contains(target))
        .map(|(alias, _)| alias.as_str())
        .collect();
    if !dangling.is_empty() {
        anyhow::bail!("aliases point at unknown operations: {}", dangling.join(", "));
    }

    eprintln!("Validation successful.");
    Ok(ExitCode::SUCCESS)
}

/// `key=value` pairs in command-line order.
fn parse_named_args(args: &[String]) -> Result<Arguments> {
    args.iter()
        .map(|arg| -> Result<(String, Value)> {
            let (key, value) = arg
                .split_once('=')
                .with_context(|| format!("argument '{arg}' is not in key=value form"))?;
            Ok((key.to_string(), parse_value(value)))
        })
        .collect()
}

/// JSON if it parses, otherwise the literal text.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn print_value(value: &Value, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml_ng::to_string(value)?),
    }
    Ok(())
}

fn cmd_init(force: bool) -> Result<ExitCode> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("42"), json!(42));
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value(r#"{"a":1}"#), json!({"a": 1}));
        assert_eq!(parse_value("hello world"), json!("hello world"));
    }

    #[test]
    fn test_parse_named_args_keeps_order() {
        let args = vec!["b=2".to_string(), "a=x=y".to_string()];
        let named = parse_named_args(&args).unwrap();
        let keys: Vec<_> = named.keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(named["a"], json!("x=y"));
        assert!(parse_named_args(&["novalue".to_string()]).is_err());
    }

    #[test]
    fn test_cli_parses_call() {
        let cli = Cli::try_parse_from([
            "dynapi",
            "--spec",
            "openapi.yaml",
            "call",
            "getUser",
            "-a",
            "id=1",
            "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Commands::Call { operation, args, dry_run, .. } => {
                assert_eq!(operation, "getUser");
                assert_eq!(args, vec!["id=1"]);
                assert!(dry_run);
            }
            _ => panic!("expected call"),
        }
    }
}
