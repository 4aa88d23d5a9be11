//! Launchmon CLI - run reports against the search API
//!
//! Usage:
//!   launchmon compile --from <source> --field <path>... [--where <predicate>]...
//!   launchmon ids <list>
//!   launchmon accounts [--customers <ids>] [--login <id>]
//!   launchmon fetch <report> [--customers <ids>] [--login <id>] [--where <predicate>]... [--format json|tsv]
//!   launchmon reports
//!
//! Examples:
//!   launchmon compile --from campaign --field campaign.id --field campaign.name
//!   launchmon ids "123-456-7890, 111 222 3333"
//!   launchmon fetch campaigns --customers 1234567890 --format tsv

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use launchmon::api::ClientFactory;
use launchmon::config::Settings;
use launchmon::query::QueryDefinition;
use launchmon::report::{catalog, ReportFactory};
use launchmon::tenant::parse_customer_ids;

#[derive(Parser)]
#[command(name = "launchmon")]
#[command(about = "Launchmon - fetch flattened advertising reports")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the query text for a source and fields
    Compile {
        /// Source resource
        #[arg(long)]
        from: String,

        /// Selected field path (repeatable)
        #[arg(long = "field", required = true)]
        fields: Vec<String>,

        /// Extra predicate (repeatable)
        #[arg(long = "where")]
        wheres: Vec<String>,
    },

    /// Validate and normalize customer ids
    Ids {
        /// Comma-separated ids
        list: String,
    },

    /// Print the leaf accounts under a scope
    Accounts {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Fetch a catalog report
    Fetch {
        /// Report name (see `launchmon reports`)
        report: String,

        #[command(flatten)]
        scope: ScopeArgs,

        /// Extra predicate (repeatable)
        #[arg(long = "where")]
        wheres: Vec<String>,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// List catalog reports
    Reports,
}

#[derive(clap::Args)]
struct ScopeArgs {
    /// Comma-separated customer ids (defaults to [scope] customer_ids)
    #[arg(long)]
    customers: Option<String>,

    /// Login customer id (defaults to [scope] login_customer_id)
    #[arg(long)]
    login: Option<String>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Records keyed by primary key, as JSON
    Json,
    /// Header plus one tab-separated line per record
    Tsv,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    settings.logging.init();

    match cli.command {
        Commands::Compile {
            from,
            fields,
            wheres,
        } => cmd_compile(&from, fields, &wheres),
        Commands::Ids { list } => cmd_ids(&list),
        Commands::Accounts { scope } => cmd_accounts(&settings, &scope).await,
        Commands::Fetch {
            report,
            scope,
            wheres,
            format,
        } => cmd_fetch(&settings, &report, &scope, &wheres, format).await,
        Commands::Reports => cmd_reports(),
    }
}

fn cmd_compile(from: &str, fields: Vec<String>, wheres: &[String]) -> ExitCode {
    let query = QueryDefinition::new(from).select(fields);
    println!("{}", query.compile(wheres));
    ExitCode::SUCCESS
}

fn cmd_ids(list: &str) -> ExitCode {
    match parse_customer_ids(list) {
        Ok(ids) => {
            for id in ids {
                println!("{}", id);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn report_factory(settings: &Settings, scope: &ScopeArgs) -> Result<ReportFactory, String> {
    let tenants = settings
        .scope
        .resolve(scope.customers.as_deref(), scope.login.as_deref())
        .map_err(|e| e.to_string())?;
    let clients = ClientFactory::from_settings(settings).map_err(|e| e.to_string())?;
    Ok(ReportFactory::new(tenants, Arc::new(clients)))
}

async fn cmd_accounts(settings: &Settings, scope: &ScopeArgs) -> ExitCode {
    let factory = match report_factory(settings, scope) {
        Ok(factory) => factory,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match factory.leaf_accounts().await {
        Ok(leaves) => {
            for id in leaves {
                println!("{}", id);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn cmd_fetch(
    settings: &Settings,
    name: &str,
    scope: &ScopeArgs,
    wheres: &[String],
    format: OutputFormat,
) -> ExitCode {
    let definition = match catalog::lookup(name) {
        Ok(definition) => definition,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let factory = match report_factory(settings, scope) {
        Ok(factory) => factory,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = match factory.create(definition).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let output = match report.fetch(wheres).await {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        },
        OutputFormat::Tsv => {
            for line in report.to_table(&output) {
                println!("{}", line.join("\t"));
            }
        }
    }
    ExitCode::SUCCESS
}

fn cmd_reports() -> ExitCode {
    println!("Reports:");
    for name in catalog::REPORT_NAMES {
        match catalog::lookup(name) {
            Ok(definition) => {
                let joins: Vec<&str> = definition.joins().map(|(path, _)| path).collect();
                if joins.is_empty() {
                    println!("  - {} (from: {})", name, definition.query().from);
                } else {
                    println!(
                        "  - {} (from: {}, joins: {})",
                        name,
                        definition.query().from,
                        joins.join(", ")
                    );
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
