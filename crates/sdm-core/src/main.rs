use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{error::ErrorKind, value_parser, Arg, ArgAction, ArgMatches, Command};
use sdm_core::{ConfigError, LocalOrRemoteFetcher, Workspace, WorkspaceConfig, WorkspaceError};
use sdm_lifecycle::ExportFormat;
use sdm_store::oxrdf::NamedNode;
use tracing_subscriber::EnvFilter;

/// Bad command-line input
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct UsageError(String);

/// Unreadable or malformed data file
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct DataError(String);

fn cli() -> Command {
    Command::new("sdm")
        .version(sdm_core::VERSION)
        .about("Maintenance utility over an N-Quads dump of shape-described resources")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("data")
                .long("data")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("N-Quads dump to operate on"),
        )
        .arg(
            Arg::new("shapes")
                .long("shapes")
                .global(true)
                .action(ArgAction::Append)
                .help("Shape document (file path or URL); repeatable, overrides the config"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Log filter (overrides RUST_LOG), e.g. debug or sdm_lifecycle=trace"),
        )
        .subcommand(
            Command::new("list")
                .about("List resources of every discovered shape")
                .arg(
                    Arg::new("all")
                        .long("all")
                        .action(ArgAction::SetTrue)
                        .help("Include retired resources"),
                ),
        )
        .subcommand(
            Command::new("references")
                .about("List subjects referring to a resource")
                .arg(Arg::new("iri").required(true).help("Resource IRI")),
        )
        .subcommand(
            Command::new("dangling")
                .about("Find statements pointing at retired resources")
                .arg(
                    Arg::new("repair")
                        .long("repair")
                        .action(ArgAction::SetTrue)
                        .help("Remove them and rewrite the data file"),
                ),
        )
        .subcommand(
            Command::new("export")
                .about("Write the dump to stdout")
                .arg(
                    Arg::new("flat")
                        .long("flat")
                        .action(ArgAction::SetTrue)
                        .help("N-Triples, graphs dropped"),
                ),
        )
}

fn init_tracing(level: Option<&String>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<WorkspaceConfig, ConfigError> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => WorkspaceConfig::from_file(path)?,
        None => WorkspaceConfig::default(),
    };
    let shapes: Vec<String> = matches
        .get_many::<String>("shapes")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    if !shapes.is_empty() {
        config = config.with_shape_sources(shapes);
    }
    if matches
        .subcommand_matches("list")
        .is_some_and(|args| args.get_flag("all"))
    {
        config = config.with_include_expired(true);
    }
    config.validate()?;
    Ok(config)
}

async fn load_data(workspace: &Workspace, path: Option<&PathBuf>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DataError(format!("{}: {e}", path.display())))?;
    let count = workspace
        .import_nquads(&text)
        .await
        .map_err(|e| DataError(format!("{}: {e}", path.display())))?;
    tracing::info!(count, path = %path.display(), "Data loaded");
    Ok(())
}

async fn write_data(workspace: &Workspace, path: &Path) -> anyhow::Result<()> {
    let text = workspace.export(ExportFormat::NQuads).await?;
    tokio::fs::write(path, text)
        .await
        .map_err(|e| DataError(format!("{}: {e}", path.display())))?;
    Ok(())
}

async fn run(matches: ArgMatches) -> anyhow::Result<()> {
    let config = load_config(&matches)?;
    let workspace = Workspace::in_memory(config, Arc::new(LocalOrRemoteFetcher::new()))?;
    let data = matches.get_one::<PathBuf>("data");
    load_data(&workspace, data).await?;

    match matches.subcommand() {
        Some(("list", _)) => {
            workspace.refresh_shapes(false).await?;
            for record in workspace.list_resources().await {
                let status = if record.expired { "\tretired" } else { "" };
                println!(
                    "{}\t{}\t{}{status}",
                    record.descriptor.label,
                    record.label,
                    record.subject.as_str()
                );
            }
        }
        Some(("references", args)) => {
            let raw = args
                .get_one::<String>("iri")
                .ok_or_else(|| UsageError("missing IRI".into()))?;
            let subject = NamedNode::new(raw.as_str())
                .map_err(|e| UsageError(format!("invalid IRI '{raw}': {e}")))?;
            for referrer in workspace.list_incoming_references(&subject).await {
                println!("{}", referrer.as_str());
            }
        }
        Some(("dangling", args)) => {
            workspace.refresh_shapes(false).await?;
            let dangling = workspace.find_dangling_references().await;
            for reference in &dangling {
                println!("{}\t{}", reference.target.as_str(), reference.statement);
            }
            if args.get_flag("repair") && !dangling.is_empty() {
                let path = data
                    .ok_or_else(|| UsageError("--repair needs --data to rewrite".into()))?;
                let report = workspace.repair_dangling_references(&dangling).await;
                write_data(&workspace, path).await?;
                eprintln!(
                    "Removed {} statement(s) in {} graph(s); {} graph(s) failed",
                    report.removed,
                    report.graphs.len(),
                    report.failed.len()
                );
            }
        }
        Some(("export", args)) => {
            let syntax = if args.get_flag("flat") {
                ExportFormat::NTriples
            } else {
                ExportFormat::NQuads
            };
            print!("{}", workspace.export(syntax).await?);
        }
        _ => return Err(UsageError("unknown command".into())).context("see --help"),
    }
    Ok(())
}

/// 1 for argument and configuration errors, 2 for everything else
fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if cause.is::<UsageError>() || cause.is::<ConfigError>() {
            return 1;
        }
        if let Some(e) = cause.downcast_ref::<WorkspaceError>() {
            return if e.is_configuration() { 1 } else { 2 };
        }
    }
    2
}

#[tokio::main]
async fn main() {
    let matches = match cli().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };
    init_tracing(matches.get_one::<String>("log-level"));

    if let Err(err) = run(matches).await {
        eprintln!("error: {err:#}");
        std::process::exit(exit_code(&err));
    }
}
