use anyhow::Context as _;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Select, Text, validator::Validation};
use patterns_core::{Config, OperationId, StrategyConfig, demo};
use std::io::{self, Write};
use tracing::debug;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "patterns", version, about = "Observer and strategy pattern demos")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Broadcast weather updates to subscribed apps.
    Observer,

    /// Run an arithmetic strategy, then swap it out and run again.
    Strategy {
        /// Left operand; defaults to the configured value.
        #[arg(long, allow_hyphen_values = true)]
        a: Option<i32>,

        /// Right operand; defaults to the configured value.
        #[arg(long, allow_hyphen_values = true)]
        b: Option<i32>,

        /// Operations to switch to after the initial one, e.g. `--op sub --op mul`.
        #[arg(long = "op", value_parser = parse_operation)]
        ops: Vec<OperationId>,
    },

    /// Run both demos.
    All,

    /// Interactively edit the strategy demo settings.
    Configure,

    /// Print where the config file lives.
    ConfigPath,
}

fn parse_operation(s: &str) -> Result<OperationId, String> {
    OperationId::try_from(s).map_err(|e| e.to_string())
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Observer => {
                let config = Config::load()?;
                run_observer(&config)?;
            }
            Command::Strategy { a, b, ops } => {
                let mut config = Config::load()?;
                apply_overrides(&mut config.strategy, a, b, ops);
                run_strategy(&config)?;
            }
            Command::All => {
                let config = Config::load()?;
                println!("== Observer ==");
                run_observer(&config)?;
                println!();
                println!("== Strategy ==");
                run_strategy(&config)?;
            }
            Command::Configure => configure()?,
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
            }
        }

        Ok(())
    }
}

/// Command-line values win over the loaded config; an empty `ops` keeps the
/// configured sequence.
fn apply_overrides(
    strategy: &mut StrategyConfig,
    a: Option<i32>,
    b: Option<i32>,
    ops: Vec<OperationId>,
) {
    if let Some(a) = a {
        strategy.a = a;
    }
    if let Some(b) = b {
        strategy.b = b;
    }
    if !ops.is_empty() {
        strategy.sequence = ops;
    }
}

/// Parse a comma-separated list of operation names, keeping order and repeats.
fn parse_sequence(input: &str) -> anyhow::Result<Vec<OperationId>> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(OperationId::try_from)
        .collect()
}

fn format_sequence(sequence: &[OperationId]) -> String {
    sequence
        .iter()
        .map(OperationId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn run_observer(config: &Config) -> anyhow::Result<()> {
    demo::run_observer(&config.observer, io::stdout)
}

fn run_strategy(config: &Config) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    let results = demo::run_strategy(&config.strategy, &mut out)?;
    out.flush().context("Failed to flush stdout")?;
    debug!(?results, "strategy demo finished");
    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;
    let ops = OperationId::all().to_vec();

    let start = ops
        .iter()
        .position(|id| *id == config.strategy.initial)
        .unwrap_or(0);
    let initial = Select::new("Initial operation:", ops)
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read initial operation")?;

    let current = format_sequence(&config.strategy.sequence);
    let sequence = Text::new("Operations to switch to afterwards, in order:")
        .with_default(&current)
        .with_help_message("comma-separated, e.g. subtraction, multiplication, addition")
        .with_validator(|input: &str| {
            Ok::<_, inquire::CustomUserError>(match parse_sequence(input) {
                Ok(_) => Validation::Valid,
                Err(err) => Validation::Invalid(err.to_string().into()),
            })
        })
        .prompt()
        .context("Failed to read operation sequence")?;
    let sequence = parse_sequence(&sequence)?;

    let a = CustomType::<i32>::new("Left operand (a):")
        .with_default(config.strategy.a)
        .with_error_message("Please enter a 32-bit integer")
        .prompt()
        .context("Failed to read left operand")?;
    let b = CustomType::<i32>::new("Right operand (b):")
        .with_default(config.strategy.b)
        .with_error_message("Please enter a 32-bit integer")
        .prompt()
        .context("Failed to read right operand")?;

    config.strategy.initial = initial;
    config.strategy.sequence = sequence;
    config.strategy.a = a;
    config.strategy.b = b;
    config.validate()?;
    config.save()?;

    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}
