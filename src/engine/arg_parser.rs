use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::types::ChannelType;
use crate::utils::check_bounds;
use crate::utils::config::{AgeBounds, BatchBounds};

/// Find channels with no recent activity; list them or archive them in batches.
#[derive(Clone, Parser)]
#[command(name = "chanarchiver")]
#[command(about = "Manage and archive stale channels.")]
pub struct Cli {
    /// Platform database. Default: CHANARCHIVER_DB from the environment or `.env`.
    #[arg(long, short, global = true)]
    pub db: Option<PathBuf>,

    /// Config file. Default: `.chanarchiver.toml` in the current directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output (debug logging and a progress counter).
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Print the run result as JSON after the reply.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Archive stale channels
    Archive(RunArgs),
    /// List stale channels that would be archived
    List(RunArgs),
    /// Run once with the settings in the `[archiver]` config section
    Scheduled,
}

/// Arguments shared by `archive` and `list`.
#[derive(Clone, Args)]
pub struct RunArgs {
    /// Number of days of inactivity for a channel to be considered stale.
    #[arg(long, value_parser = clap::value_parser!(u32).range(AgeBounds::MIN as i64..=AgeBounds::MAX as i64))]
    pub days: u32,

    /// Channels are fetched (and archived) in batches of this size. Default: 100 archive, 1000 list.
    #[arg(long, value_parser = parse_batch_size)]
    pub batch_size: Option<usize>,

    /// Comma separated list of channel names/IDs to exclude. No spaces.
    #[arg(long, value_delimiter = ',', value_parser = parse_exclude_item)]
    pub exclude: Vec<String>,

    /// Channel id receiving the report. Overrides the config file.
    #[arg(long)]
    pub admin_channel: Option<String>,

    /// Channel types to consider.
    #[arg(long, value_enum, value_delimiter = ',', default_values_t = [TypeArg::Open, TypeArg::Private])]
    pub types: Vec<TypeArg>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TypeArg {
    Open,
    Private,
    Direct,
    Group,
}

impl From<TypeArg> for ChannelType {
    fn from(t: TypeArg) -> Self {
        match t {
            TypeArg::Open => ChannelType::Open,
            TypeArg::Private => ChannelType::Private,
            TypeArg::Direct => ChannelType::Direct,
            TypeArg::Group => ChannelType::Group,
        }
    }
}

fn parse_batch_size(s: &str) -> Result<usize, String> {
    let n: usize = s.trim().parse().map_err(|e| format!("{e}"))?;
    check_bounds("batch-size", n, BatchBounds::MIN, BatchBounds::MAX).map_err(|e| e.to_string())?;
    Ok(n)
}

fn parse_exclude_item(s: &str) -> Result<String, String> {
    if s.is_empty() {
        return Err("empty channel name or id".to_string());
    }
    if s.chars().any(char::is_whitespace) {
        return Err(format!("'{s}' contains whitespace; separate entries with commas only"));
    }
    Ok(s.to_string())
}
