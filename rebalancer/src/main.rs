//! CLI entry point for the driftbook rebalancer.

use std::io;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use driftbook_broker::BrokerError;
use driftbook_broker::wealthsimple::WealthsimpleBroker;
use zeroize::Zeroizing;

use driftbook_rebalancer::config::Config;
use driftbook_rebalancer::error::{Error, Result};
use driftbook_rebalancer::execution::{self, CalcOptions, DriftOptions, Quotes, RebalanceOptions};
use driftbook_rebalancer::prompt::{Prompter, TerminalPrompter};

const DEFAULT_CONFIG: &str = "config.toml";

#[derive(Parser)]
#[command(name = "rebalancer")]
#[command(about = "Whole-share portfolio rebalancer: buy toward your target allocation")]
#[command(version)]
struct Cli {
    /// Path to config.toml [default: config.toml, optional]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recommend buys for a sum to invest, from a portfolio CSV
    Calc {
        /// Dollars to invest
        sum: String,

        /// CSV with rows TICKER,SHARES_OWNED,TARGET_ALLOCATION
        #[arg(short, long)]
        portfolio: PathBuf,

        /// JSON object of ticker -> unit price in dollars
        #[arg(long, conflicts_with = "email")]
        prices: Option<PathBuf>,

        /// Quote prices from Wealthsimple Trade with this login instead
        #[arg(long, required_unless_present = "prices")]
        email: Option<String>,

        /// Wealthsimple password (prompted when omitted)
        #[arg(long, env = "WS_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Ask for a two-factor code before logging in
        #[arg(long = "2fa")]
        two_factor: bool,

        /// Never prompt; fail where input would be needed
        #[arg(long)]
        no_input: bool,
    },

    /// Recommend buys for a Wealthsimple Trade account's buying power
    Rebalance {
        /// CSV with rows TICKER,TARGET_ALLOCATION
        #[arg(short, long = "target-allocations")]
        targets: PathBuf,

        /// Wealthsimple login email
        #[arg(long)]
        email: String,

        /// Wealthsimple password (prompted when omitted)
        #[arg(long, env = "WS_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Ask for a two-factor code before logging in
        #[arg(long = "2fa")]
        two_factor: bool,

        /// Account id to use instead of choosing interactively
        #[arg(long)]
        account: Option<String>,

        /// Never prompt; fail where a choice would be needed
        #[arg(long)]
        no_input: bool,
    },

    /// Show current allocation and drift from a portfolio CSV
    Drift {
        /// CSV with rows TICKER,SHARES_OWNED,TARGET_ALLOCATION
        #[arg(short, long)]
        portfolio: PathBuf,

        /// JSON object of ticker -> unit price in dollars
        #[arg(long)]
        prices: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_or_default(path, true)?,
        None => Config::load_or_default(&PathBuf::from(DEFAULT_CONFIG), false)?,
    };
    let mut stdout = io::stdout().lock();

    match cli.command {
        Command::Calc {
            sum,
            portfolio,
            prices,
            email,
            password,
            two_factor,
            no_input,
        } => {
            let opts = CalcOptions { portfolio, sum };
            match (prices, email) {
                (Some(prices), _) => {
                    execution::run_calc(&config, &opts, Quotes::File(&prices), &mut stdout)?;
                }
                (None, Some(email)) => {
                    let interactive = config.prompt.interactive && !no_input;
                    let mut prompter = TerminalPrompter::new(interactive);
                    let mut broker =
                        wealthsimple(&config, &email, password, two_factor, &mut prompter)?;
                    execution::run_calc(&config, &opts, Quotes::Broker(&mut broker), &mut stdout)?;
                }
                (None, None) => {
                    return Err(Error::Config("calc needs --prices or --email".into()));
                }
            }
        }
        Command::Rebalance {
            targets,
            email,
            password,
            two_factor,
            account,
            no_input,
        } => {
            let interactive = config.prompt.interactive && !no_input;
            let mut prompter = TerminalPrompter::new(interactive);
            let mut broker = wealthsimple(&config, &email, password, two_factor, &mut prompter)?;

            let opts = RebalanceOptions { targets, account };
            execution::run_rebalance(&config, &mut broker, &opts, &mut prompter, &mut stdout)?;
        }
        Command::Drift { portfolio, prices } => {
            let opts = DriftOptions { portfolio, prices };
            execution::run_drift(&config, &opts, &mut stdout)?;
        }
    }
    Ok(())
}

/// Build a Wealthsimple session that asks for a password and 2FA code as
/// needed. Nothing is sent until the broker connects.
fn wealthsimple(
    config: &Config,
    email: &str,
    password: Option<String>,
    two_factor: bool,
    prompter: &mut TerminalPrompter,
) -> Result<WealthsimpleBroker> {
    let password = match password {
        Some(pw) => Zeroizing::new(pw),
        None => prompter.password("Wealthsimple password")?,
    };
    let interactive = prompter.is_interactive();
    let mut broker = WealthsimpleBroker::new(email, password)
        .with_base_url(&config.broker.base_url)
        .with_timeout(config.timeout())
        .with_otp_provider(Box::new(move || {
            TerminalPrompter::new(interactive)
                .input("Enter 2FA code")
                .map_err(|e| BrokerError::Auth(e.to_string()))
        }));
    if two_factor {
        let code = prompter.input("Enter 2FA code")?;
        broker = broker.with_otp(Zeroizing::new(code));
    }
    Ok(broker)
}
