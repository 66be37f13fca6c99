//! Moneygrowth main entry point

use anyhow::Context;
use clap::{Parser, Subcommand};
use moneygrowth_config::Config;
use moneygrowth_core::{
    find_snippet, parse_scalar, push_snippet, CoreError, DefaultErrorLogger, ErrorContext,
    ErrorLogger, InsertIndex, RowInput, TableManager, TableSpec,
};
use moneygrowth_store::PostgrestStore;
use moneygrowth_utils::split_columns;
use moneygrowth_viewer::{LineInput, Reader, TerminalInput};
use rust_decimal::Decimal;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "moneygrowth")]
#[command(version = "0.1.0")]
#[command(about = "Manage a personal finance table from the terminal", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a row
    Add {
        /// Row data: separated values, or a JSON object/list with --json
        data: String,
        /// Comma separated column names for non-mapping data
        #[arg(short = 'C', long)]
        columns: Option<String>,
        /// Separator between values in DATA
        #[arg(short, long, default_value = ";")]
        separator: String,
        /// '-' to append, or 'N+' to insert after the row at index N
        #[arg(short, long, default_value = "-", allow_hyphen_values = true)]
        index: String,
        /// Parse DATA as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove the row with this id
    Rm { id: String },
    /// Remove rows at logical indexes START..=END
    RmRange { start: usize, end: usize },
    /// Remove rows whose COLUMN matches PATTERN
    RmRegex {
        pattern: String,
        column: String,
        /// Null the matching cell instead of deleting the row
        #[arg(long)]
        clear: bool,
    },
    /// Set COLUMN on the row with this id
    Patch { id: String, column: String, value: String },
    /// Set COLUMN on every row matching PATTERN
    PatchRegex {
        pattern: String,
        column: String,
        value: String,
        /// Column tested against PATTERN (defaults to COLUMN)
        #[arg(short, long = "match-column")]
        match_column: Option<String>,
    },
    /// List one page sorted by COLUMN
    Sort {
        column: String,
        /// "Newest" for descending, anything else ascending
        #[arg(long, default_value = "Newest")]
        method: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        page_size: Option<usize>,
    },
    /// Browse the table page by page
    V {
        rows: Option<usize>,
        cols: Option<usize>,
    },
    /// Record a transaction from a configured snippet
    Push {
        snippet: String,
        amount: Decimal,
        description: String,
        /// Column overrides, e.g. "mode=card;priority=needs"
        #[arg(default_value = "")]
        modify: String,
    },
    /// Print a default configuration file
    InitConfig,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Add { .. } => "add",
            Commands::Rm { .. } => "rm",
            Commands::RmRange { .. } => "rm-range",
            Commands::RmRegex { .. } => "rm-regex",
            Commands::Patch { .. } => "patch",
            Commands::PatchRegex { .. } => "patch-regex",
            Commands::Sort { .. } => "sort",
            Commands::V { .. } => "v",
            Commands::Push { .. } => "push",
            Commands::InitConfig => "init-config",
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Commands::InitConfig = args.command {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = Config::load(args.config.clone())
        .map_err(|e| anyhow::anyhow!("{}", e.to_details()))
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.logging.level))
        .init();
    log::debug!("Config loaded: table={}", config.store.table);

    let store = PostgrestStore::with_timeout(
        config.store.url.clone(),
        &config.store.key,
        config.store.timeout_secs,
    )
    .context("Failed to build the store client")?;
    let manager = TableManager::new(Arc::new(store), TableSpec::from(&config.store));

    let rt = Runtime::new()?;
    let context = ErrorContext::new(args.command.name()).with_table(&config.store.table);

    if let Commands::V { rows, cols } = args.command {
        let reader = rt.block_on(Reader::load(
            &manager,
            rows.unwrap_or(config.viewer.rows),
            cols.unwrap_or(config.viewer.cols),
            config.viewer.max_cell_width,
        ));
        let mut reader = match reader {
            Ok(reader) => reader,
            Err(moneygrowth_viewer::ViewerError::Core(e)) => return Err(report(e, &context)),
            Err(e) => return Err(e.into()),
        };
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        if stdin.is_terminal() {
            reader.show(&mut TerminalInput::new(std::io::stdout()), &mut stdout)?;
        } else {
            reader.show(&mut LineInput::new(stdin.lock()), &mut stdout)?;
        }
        return Ok(());
    }

    rt.block_on(run(args.command, &config, &manager))
        .map_err(|e| report(e, &context))
}

async fn run(command: Commands, config: &Config, manager: &TableManager) -> Result<(), CoreError> {
    match command {
        Commands::Add {
            data,
            columns,
            separator,
            index,
            json,
        } => {
            let input = if json {
                let value: serde_json::Value =
                    serde_json::from_str(&data).map_err(|e| CoreError::InvalidFormat {
                        message: format!("DATA is not valid JSON: {}", e),
                    })?;
                RowInput::try_from(value)?
            } else {
                RowInput::DelimitedText(data)
            };
            let columns = columns.as_deref().map(split_columns);
            let index: InsertIndex = index.parse()?;

            let row = manager
                .add_row(input, columns.as_deref(), &separator, index)
                .await?;
            println!("Added: {}", serde_json::Value::Object(row));
        }
        Commands::Rm { id } => {
            let removed = manager.remove_by_id(parse_scalar(&id)).await?;
            println!("Removed {} row(s)", removed);
        }
        Commands::RmRange { start, end } => {
            let removed = manager.remove_by_range(start, end).await?;
            println!("Removed {} row(s)", removed);
        }
        Commands::RmRegex {
            pattern,
            column,
            clear,
        } => {
            let affected = manager.remove_by_regex(&pattern, &column, clear).await?;
            let verb = if clear { "Cleared" } else { "Removed" };
            println!("{} {} row(s)", verb, affected);
        }
        Commands::Patch { id, column, value } => {
            let patched = manager
                .patch_by_id(parse_scalar(&id), &column, parse_scalar(&value))
                .await?;
            println!("Patched {} row(s)", patched);
        }
        Commands::PatchRegex {
            pattern,
            column,
            value,
            match_column,
        } => {
            let patched = manager
                .patch_by_regex(&pattern, &column, parse_scalar(&value), match_column.as_deref())
                .await?;
            println!("Patched {} row(s)", patched);
        }
        Commands::Sort {
            column,
            method,
            page,
            page_size,
        } => {
            let page_size = page_size.unwrap_or(config.pagination.page_size);
            let page = manager.sort_by(&column, &method, page, page_size).await?;
            let text = serde_json::to_string_pretty(&page).map_err(|e| CoreError::InvalidFormat {
                message: e.to_string(),
            })?;
            println!("{}", text);
        }
        Commands::Push {
            snippet,
            amount,
            description,
            modify,
        } => {
            let snippet = find_snippet(config, &snippet)?;
            let row = push_snippet(manager, snippet, amount, &description, &modify).await?;
            println!("Pushed: {}", serde_json::Value::Object(row));
        }
        Commands::V { .. } | Commands::InitConfig => {}
    }
    Ok(())
}

fn report(error: CoreError, context: &ErrorContext) -> anyhow::Error {
    DefaultErrorLogger.log_error(&error, context);
    anyhow::Error::new(error).context(format!("{} failed", context.operation))
}
