use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use wsnap::core::currency::Currency;
use wsnap::core::log::init_logging;
use wsnap::core::model::{DepositKind, MaturityAction};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for wsnap::AppCommand {
    fn from(cmd: Commands) -> wsnap::AppCommand {
        match cmd {
            Commands::Overview => wsnap::AppCommand::Overview,
            Commands::Update(action) => wsnap::AppCommand::Update(action.into()),
            Commands::Deposits(action) => wsnap::AppCommand::Deposits(action.into()),
            Commands::History => wsnap::AppCommand::History,
            Commands::Goal { target } => wsnap::AppCommand::Goal { target },
            Commands::Import { file } => wsnap::AppCommand::Import { file },
            Commands::Sync(action) => wsnap::AppCommand::Sync(action.into()),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display accounts, deposits and net worth
    Overview,
    /// Change account balances, quantities and prices
    #[command(subcommand)]
    Update(UpdateCommands),
    /// Manage fixed and savings deposits
    #[command(subcommand)]
    Deposits(DepositCommands),
    /// Display the monthly net worth ledger
    History,
    /// Show or set the wealth goal
    Goal {
        /// New goal in whole HKD; omit to show the current goal
        target: Option<i64>,
    },
    /// Import accounts from a scanned-statement JSON file
    Import {
        /// JSON file holding the scanned assets
        file: PathBuf,
    },
    /// Push, pull or watch the shared remote snapshot
    #[command(subcommand)]
    Sync(SyncCommands),
}

#[derive(Subcommand)]
enum UpdateCommands {
    /// Set the balance of a cash or crypto account
    SetBalance { account_id: String, amount: f64 },
    /// Set the share quantity of a stock account
    SetQuantity { account_id: String, quantity: f64 },
    /// Set the last price of a stock account
    SetPrice { account_id: String, price: f64 },
    /// Re-quote every stock holding
    Refresh,
    /// Add a cash account
    AddCash {
        name: String,
        balance: f64,
        /// Account currency
        #[arg(long, default_value = "HKD")]
        currency: Currency,
    },
    /// Add a stock holding
    AddStock {
        name: String,
        symbol: String,
        quantity: f64,
        /// Last traded price; quoted on the spot when omitted
        #[arg(long)]
        price: Option<f64>,
        /// Account currency; inferred from the symbol when omitted
        #[arg(long)]
        currency: Option<Currency>,
    },
    /// Remove an account
    Remove { account_id: String },
}

impl From<UpdateCommands> for wsnap::UpdateAction {
    fn from(cmd: UpdateCommands) -> wsnap::UpdateAction {
        match cmd {
            UpdateCommands::SetBalance { account_id, amount } => {
                wsnap::UpdateAction::SetBalance { account_id, amount }
            }
            UpdateCommands::SetQuantity {
                account_id,
                quantity,
            } => wsnap::UpdateAction::SetQuantity {
                account_id,
                quantity,
            },
            UpdateCommands::SetPrice { account_id, price } => {
                wsnap::UpdateAction::SetPrice { account_id, price }
            }
            UpdateCommands::Refresh => wsnap::UpdateAction::Refresh,
            UpdateCommands::AddCash {
                name,
                balance,
                currency,
            } => wsnap::UpdateAction::AddCash {
                name,
                balance,
                currency,
            },
            UpdateCommands::AddStock {
                name,
                symbol,
                quantity,
                price,
                currency,
            } => wsnap::UpdateAction::AddStock {
                name,
                symbol,
                quantity,
                price,
                currency,
            },
            UpdateCommands::Remove { account_id } => wsnap::UpdateAction::Remove { account_id },
        }
    }
}

#[derive(Subcommand)]
enum DepositCommands {
    /// List deposits by maturity
    List,
    /// Add a deposit
    Add {
        bank: String,
        principal: f64,
        /// Deposit currency
        #[arg(long, default_value = "HKD")]
        currency: Currency,
        /// Annual interest rate in percent
        #[arg(long, default_value_t = 0.0)]
        rate: f64,
        /// Term length; maturity lands this many months from today
        #[arg(long, default_value_t = 3)]
        months: u32,
        /// fixed or savings
        #[arg(long, default_value = "fixed")]
        kind: DepositKind,
        /// Plan at maturity: renew or transfer
        #[arg(long)]
        action: Option<MaturityAction>,
        /// Renew automatically at maturity
        #[arg(long)]
        auto_roll: bool,
    },
    /// Remove a deposit
    Remove { deposit_id: String },
    /// Renew a deposit for another term
    Rollover {
        deposit_id: String,
        /// Interest earned over the finished term; estimated when omitted
        #[arg(long)]
        interest: Option<f64>,
        /// New annual rate in percent; unchanged when omitted
        #[arg(long)]
        rate: Option<f64>,
        /// New term in months
        #[arg(long, default_value_t = 3)]
        months: u32,
    },
    /// Close a deposit out into a cash account
    Settle {
        deposit_id: String,
        target_account_id: String,
        /// Interest earned; estimated when omitted
        #[arg(long)]
        interest: Option<f64>,
    },
}

impl From<DepositCommands> for wsnap::DepositAction {
    fn from(cmd: DepositCommands) -> wsnap::DepositAction {
        match cmd {
            DepositCommands::List => wsnap::DepositAction::List,
            DepositCommands::Add {
                bank,
                principal,
                currency,
                rate,
                months,
                kind,
                action,
                auto_roll,
            } => wsnap::DepositAction::Add {
                bank,
                principal,
                currency,
                rate,
                months,
                kind,
                action,
                auto_roll,
            },
            DepositCommands::Remove { deposit_id } => {
                wsnap::DepositAction::Remove { deposit_id }
            }
            DepositCommands::Rollover {
                deposit_id,
                interest,
                rate,
                months,
            } => wsnap::DepositAction::Rollover {
                deposit_id,
                interest,
                rate,
                months,
            },
            DepositCommands::Settle {
                deposit_id,
                target_account_id,
                interest,
            } => wsnap::DepositAction::Settle {
                deposit_id,
                target_account_id,
                interest,
            },
        }
    }
}

#[derive(Subcommand)]
enum SyncCommands {
    /// Push the local snapshot to the remote
    Push,
    /// Fetch the remote snapshot and adopt it if newer
    Pull,
    /// Poll the remote until ctrl-c, adopting newer snapshots
    Listen,
    /// Show sync configuration and how the remote compares
    Status,
}

impl From<SyncCommands> for wsnap::SyncAction {
    fn from(cmd: SyncCommands) -> wsnap::SyncAction {
        match cmd {
            SyncCommands::Push => wsnap::SyncAction::Push,
            SyncCommands::Pull => wsnap::SyncAction::Pull,
            SyncCommands::Listen => wsnap::SyncAction::Listen,
            SyncCommands::Status => wsnap::SyncAction::Status,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => wsnap::cli::setup::setup(),
        Some(cmd) => wsnap::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
