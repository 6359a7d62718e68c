mod demo;
mod logging;
mod render;

use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cmdtree_core::{
    CommandManager, DispatcherConfig, NodeId, SimplePrincipal, Suggestions, load_config_from_str,
};
use cmdtree_diagnostics as diag;

use crate::render::{Format, render_command_error};

// ── CLI definition ──────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "cmdtree",
    version,
    about = "Execute, complete, and inspect commands against a demo cmdtree dispatcher"
)]
struct Cli {
    /// Output mode: "pretty" for coloured terminal output, "json" for
    /// machine-readable JSON. Defaults to "pretty" when stdout is a TTY,
    /// "json" otherwise.
    #[arg(long, global = true, value_parser = ["pretty", "json"])]
    output: Option<String>,

    /// Dispatcher configuration file (JSON).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Name of the principal commands run as.
    #[arg(long = "as", global = true, default_value = "console")]
    principal: String,

    /// Grant the principal a capability. Repeatable.
    #[arg(long, global = true)]
    grant: Vec<String>,

    /// Grant the principal every capability.
    #[arg(long, global = true)]
    op: bool,

    /// Debug logging to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Parse and execute one command line.
    Exec { input: String },

    /// Execute command lines read from stdin, one per line.
    Repl,

    /// Completion candidates for a partial command line.
    Suggest {
        input: String,
        /// Byte offset to complete at. Defaults to the end of the input.
        #[arg(long)]
        cursor: Option<usize>,
    },

    /// Compact usage of every visible command, or help for one alias.
    Usage { alias: Option<String> },

    /// Every executable path visible to the principal.
    Paths,

    /// Registered commands with their owners and aliases.
    Commands,

    /// Explain a diagnostic ID (e.g. CMD2003).
    Explain { id: String },
}

// ── Main ────────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    let format = Format::resolve_or_detect(cli.output.as_deref());

    if let Err(e) = logging::initialize_logging(cli.verbose, cli.quiet, format) {
        eprintln!("warning: could not initialize logging: {e}");
    }

    match run(&cli, format) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            match format {
                Format::Json => {
                    let out = serde_json::json!({
                        "success": false,
                        "error": "command_failed",
                        "message": format!("{e:#}"),
                    });
                    println!("{out}");
                }
                Format::Pretty => eprintln!("error: {e:#}"),
            }
            process::exit(1);
        }
    }
}

/// Run the selected subcommand. `Ok(false)` means a command failed and was
/// already reported.
fn run(cli: &Cli, format: Format) -> Result<bool> {
    if let Cmd::Explain { id } = &cli.cmd {
        cmd_explain(id, format)?;
        return Ok(true);
    }

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => DispatcherConfig::default(),
    };
    let manager = demo::manager(config)?;
    let principal = Arc::new(principal(cli));

    match &cli.cmd {
        Cmd::Exec { input } => cmd_exec(&manager, &principal, input, format),
        Cmd::Repl => cmd_repl(&manager, &principal, format),
        Cmd::Suggest { input, cursor } => {
            cmd_suggest(&manager, &principal, input, *cursor, format)?;
            Ok(true)
        }
        Cmd::Usage { alias } => cmd_usage(&manager, &principal, alias.as_deref(), format),
        Cmd::Paths => {
            let paths = manager.inspect(|d| d.all_usage(NodeId::ROOT, &principal, true));
            print_lines(&paths, format)?;
            Ok(true)
        }
        Cmd::Commands => {
            let mappings = manager.mappings();
            match format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&mappings)?),
                Format::Pretty => {
                    for m in &mappings {
                        let description = m.description.as_deref().unwrap_or("");
                        println!(
                            "{:<16} {:<8} {} {}",
                            m.primary_alias,
                            m.owner,
                            m.all_aliases.join(","),
                            description
                        );
                    }
                }
            }
            Ok(true)
        }
        Cmd::Explain { .. } => Ok(true),
    }
}

// ── Commands ────────────────────────────────────────────────────────────

fn cmd_exec(
    manager: &CommandManager<SimplePrincipal>,
    principal: &Arc<SimplePrincipal>,
    input: &str,
    format: Format,
) -> Result<bool> {
    match manager.execute(Arc::clone(principal), input) {
        Ok(result) => {
            match format {
                Format::Json => {
                    let out = serde_json::json!({
                        "success": true,
                        "input": input,
                        "result": result,
                    });
                    println!("{out}");
                }
                Format::Pretty => println!("{result}"),
            }
            Ok(true)
        }
        Err(error) => {
            render_command_error(input, &error, format);
            Ok(false)
        }
    }
}

fn cmd_repl(
    manager: &CommandManager<SimplePrincipal>,
    principal: &Arc<SimplePrincipal>,
    format: Format,
) -> Result<bool> {
    let mut all_ok = true;
    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        let input = line.trim_end_matches(['\r', '\n']);
        if input.trim().is_empty() || input.starts_with('#') {
            continue;
        }
        all_ok &= cmd_exec(manager, principal, input, format)?;
    }
    Ok(all_ok)
}

fn cmd_suggest(
    manager: &CommandManager<SimplePrincipal>,
    principal: &Arc<SimplePrincipal>,
    input: &str,
    cursor: Option<usize>,
    format: Format,
) -> Result<()> {
    let suggestions: Suggestions = match cursor {
        Some(cursor) => manager.inspect(|d| {
            let parse = d.parse(input, Arc::clone(principal));
            d.completion_suggestions(&parse, cursor)
        }),
        None => manager.suggestions(Arc::clone(principal), input),
    };
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&suggestions)?),
        Format::Pretty => {
            for candidate in &suggestions.list {
                println!("{candidate}");
            }
        }
    }
    Ok(())
}

fn cmd_usage(
    manager: &CommandManager<SimplePrincipal>,
    principal: &SimplePrincipal,
    alias: Option<&str>,
    format: Format,
) -> Result<bool> {
    let Some(alias) = alias else {
        print_lines(&manager.usage(principal), format)?;
        return Ok(true);
    };
    let Some(help) = manager.help(principal, alias) else {
        match format {
            Format::Json => {
                let out = serde_json::json!({
                    "success": false,
                    "error": "unknown_command",
                    "message": format!("no command '{alias}'"),
                });
                println!("{out}");
            }
            Format::Pretty => eprintln!("error: no command '{alias}'"),
        }
        return Ok(false);
    };
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&help)?),
        Format::Pretty => {
            if let Some(description) = &help.mapping.description {
                println!("{description}");
            }
            if let Some(details) = &help.mapping.extended_description {
                println!("{details}");
            }
            if help.mapping.all_aliases.len() > 1 {
                println!("aliases: {}", help.mapping.all_aliases.join(", "));
            }
            for line in &help.usage {
                println!("  {line}");
            }
        }
    }
    Ok(true)
}

fn cmd_explain(id: &str, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let out = serde_json::json!({
                "id": id,
                "explanation": diag::explain(id),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Format::Pretty => {
            if let Some(text) = diag::explain(id) {
                use ariadne::Fmt;
                println!("{}: {}", id.fg(ariadne::Color::Cyan), text);
            } else {
                println!("{id}: (no explanation available)");
            }
        }
    }
    Ok(())
}

// ── Helpers ─────────────────────────────────────────────────────────────

fn principal(cli: &Cli) -> SimplePrincipal {
    let mut principal = if cli.op {
        SimplePrincipal::operator(&cli.principal)
    } else {
        SimplePrincipal::new(&cli.principal)
    };
    for capability in &cli.grant {
        principal = principal.grant(capability);
    }
    principal
}

fn load_config(path: &Path) -> Result<DispatcherConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config '{}'", path.display()))?;
    load_config_from_str(&text)
        .with_context(|| format!("failed to load config '{}'", path.display()))
}

fn print_lines(lines: &[String], format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(lines)?),
        Format::Pretty => {
            for line in lines {
                println!("{line}");
            }
        }
    }
    Ok(())
}
