//! fxtable - Convert country pricing tables into one currency
//!
//! Scrapes a pricing page or reads a spreadsheet, converts every price into a
//! base currency, and lists the cheapest countries.

use anyhow::Result;
use clap::{Parser, Subcommand};
use fxtable::commands::sheet::SheetTarget;
use fxtable::commands::{
    ConvertCommand, Output, PackagesCommand, RatesCommand, RpcCommand, SheetCommand,
};
use fxtable::config::{Config, OutputFormat, Provider};
use fxtable::format::Formatter;
use fxtable::pricing::currency;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fxtable",
    version,
    about = "Convert country pricing tables into one currency",
    long_about = "Scrapes a pricing table or reads a spreadsheet, maps countries to currencies, fetches exchange rates and lists the cheapest countries."
)]
struct Cli {
    /// Base currency to convert into
    #[arg(short, long, global = true)]
    base: Option<String>,

    /// Exchange-rate provider (exchangerate-api, exchangerate-host)
    #[arg(long, global = true)]
    provider: Option<Provider>,

    /// API key for the rate provider
    #[arg(long, global = true, env = "FXTABLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Proxy URL for page fetches (e.g., socks5://host:port)
    #[arg(long, global = true)]
    proxy: Option<String>,

    /// Ignore the rate cache
    #[arg(long, global = true)]
    no_cache: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a pricing page and convert it
    #[command(alias = "c")]
    Convert {
        /// Pricing page URL
        url: String,

        /// Package (column header) to convert
        #[arg(short, long, conflicts_with = "column")]
        package: Option<String>,

        /// Price column index (0 is the country column)
        #[arg(long)]
        column: Option<usize>,

        /// Number of cheapest countries to list
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// List the packages of a pricing page
    #[command(alias = "p")]
    Packages {
        /// Pricing page URL
        url: String,
    },

    /// Convert the price column of a CSV/TSV sheet
    Sheet {
        /// Sheet file
        file: PathBuf,

        /// Header of the price column
        #[arg(long)]
        price_header: Option<String>,

        /// Write the sheet here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Treat the file as tab-separated
        #[arg(long)]
        tsv: bool,
    },

    /// Fill the "Currency Code" column of a CSV/TSV sheet
    MapCodes {
        /// Sheet file
        file: PathBuf,

        /// Write the sheet here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Treat the file as tab-separated
        #[arg(long)]
        tsv: bool,
    },

    /// List supported currency codes
    Currencies,

    /// Look up the currency of a country
    Resolve {
        /// Country name, as written in pricing tables
        country: String,
    },

    /// Show exchange rates for the base currency
    Rates,

    /// Serve JSON requests on stdin, one per line
    Rpc {
        /// Pricing page to load for the session
        url: Option<String>,
    },
}

fn emit(output: Output) {
    if !output.text.is_empty() {
        println!("{}", output.text);
    }
    for note in output.notes {
        eprintln!("{}", note);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(base) = cli.base {
        config.base_currency = base;
    }
    if let Some(provider) = cli.provider {
        config.provider = provider;
    }
    if let Some(key) = cli.api_key {
        config.api_key = Some(key);
    }
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    config.no_cache |= cli.no_cache;

    match cli.command {
        Commands::Convert { url, package, column, top } => {
            if let Some(column) = column {
                config.price_column = column;
                config.package = None;
            }
            if package.is_some() {
                config.package = package;
            }
            if let Some(top) = top {
                config.top_n = top;
            }

            emit(ConvertCommand::new(config).execute(&url).await?);
        }

        Commands::Packages { url } => {
            emit(PackagesCommand::new(config).execute(&url).await?);
        }

        Commands::Sheet { file, price_header, output, tsv } => {
            if let Some(header) = price_header {
                config.sheet_price_header = header;
            }

            let target = SheetTarget { output, tsv };
            emit(SheetCommand::new(config).convert(&file, &target).await?);
        }

        Commands::MapCodes { file, output, tsv } => {
            let target = SheetTarget { output, tsv };
            emit(SheetCommand::new(config).map_codes(&file, &target)?);
        }

        Commands::Currencies => {
            let codes: Vec<String> = currency::currencies().into_iter().map(String::from).collect();
            println!("{}", Formatter::new(config.format).format_list("Currencies", &codes));
        }

        Commands::Resolve { country } => match currency::resolve(country.trim()) {
            Some(code) => println!("{}", code),
            None => anyhow::bail!("No currency known for country: {}", country.trim()),
        },

        Commands::Rates => {
            emit(RatesCommand::new(config).execute().await?);
        }

        Commands::Rpc { url } => {
            RpcCommand::new(config).execute(url.as_deref()).await?;
        }
    }

    Ok(())
}
