//! predsql: predicate and query compiler CLI
//!
//! # Usage
//!
//! ```bash
//! # Compile a JSON predicate tree into a filter fragment
//! predsql compile filter.json
//! echo '{"node":"member","path":"Active"}' | predsql compile -
//!
//! # Render a TOML query description
//! predsql query users.toml --format json
//!
//! # List the placeholders of a statement
//! predsql params "SELECT * FROM Users WHERE Id = @Id"
//! ```

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use predsql::prelude::*;
use predsql::query::QueryDefinition;
use predsql::transpiler::Parameter;

#[derive(Parser)]
#[command(name = "predsql")]
#[command(version)]
#[command(about = "Compile predicate trees and query descriptions to T-SQL", long_about = None)]
#[command(after_help = "EXAMPLES:
    predsql compile filter.json
    predsql compile filter.json --bound
    predsql query users.toml
    predsql params 'SELECT * FROM Users WHERE Id = @Id'")]
struct Cli {
    /// Config file (default: ./predsql.toml, then the user config dir)
    #[arg(short, long, global = true, env = "PREDSQL_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a JSON predicate tree (file path, or - for stdin)
    Compile {
        input: String,

        /// Route literals into bound parameters
        #[arg(short, long)]
        bound: bool,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Render a TOML query description
    Query {
        file: PathBuf,

        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// List the @name placeholders of a SQL statement
    Params { sql: String },
    /// Print the effective configuration
    Config,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "predsql=debug" } else { "predsql=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::discover()?,
    };
    Ok(config)
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match &cli.command {
        Commands::Compile {
            input,
            bound,
            format,
        } => compile(&config, input, *bound, *format),
        Commands::Query { file, format } => query(&config, file, *format),
        Commands::Params { sql } => {
            show_params(sql);
            Ok(())
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        fs::read_to_string(input).with_context(|| format!("reading {}", input))
    }
}

fn compile(config: &Config, input: &str, bound: bool, format: OutputFormat) -> Result<()> {
    let predicate: Predicate = serde_json::from_str(&read_input(input)?).context("parsing predicate JSON")?;

    let mut options = config.compiler.clone();
    if bound {
        options.literals = LiteralMode::Bound;
    }
    let compiled = PredicateCompiler::new(options).compile(&predicate)?;

    match format {
        OutputFormat::Json => {
            let prepared = PreparedQuery::new(compiled.sql).with_params(compiled.params);
            println!("{}", serde_json::to_string_pretty(&prepared)?);
        }
        OutputFormat::Text => {
            if compiled.is_empty() {
                println!("{}", "(no constraint)".dimmed());
            } else {
                println!("{}", compiled.sql.white());
            }
            print_params(&compiled.params);
        }
    }
    Ok(())
}

fn query(config: &Config, file: &Path, format: OutputFormat) -> Result<()> {
    let text = fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let definition = QueryDefinition::from_toml(&text)?;
    let prepared = definition
        .into_builder(&config.compiler(), config.query.clone())?
        .build();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&prepared)?),
        OutputFormat::Text => {
            println!("{}", "Generated SQL:".green().bold());
            println!("{}", prepared.sql.white());
            print_params(&prepared.params);
        }
    }
    Ok(())
}

fn print_params(params: &[Parameter]) {
    if params.is_empty() {
        return;
    }
    println!();
    println!("{}", "Parameters:".cyan());
    for param in params {
        println!(
            "  {} {} = {}",
            param.name.yellow(),
            param.sql_type.to_string().dimmed(),
            param.value
        );
    }
}

fn show_params(sql: &str) {
    let names = predsql::parser::parameter_names(sql);
    if names.is_empty() {
        println!("{}", "No placeholders.".dimmed());
        return;
    }
    for (i, name) in names.iter().enumerate() {
        println!("  {} @{}", format!("{}.", i + 1).dimmed(), name.yellow());
    }
}
