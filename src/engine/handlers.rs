//! Turn CLI arguments or the config file into a [`RunRequest`].

use anyhow::{Result, bail};

use crate::engine::arg_parser::RunArgs;
use crate::pipeline::RunRequest;
use crate::types::{ChannelType, RunMode, StaleChannelCriteria};
use crate::utils::ArchiverSection;
use crate::utils::config::{BatchBounds, Pauses};

/// `archive` / `list`: explicit arguments first, config-file excludes and admin channel merged in.
pub fn request_from_args(args: &RunArgs, list: bool, config: &ArchiverSection) -> RunRequest {
    let mut exclude = args.exclude.clone();
    exclude.extend(config.exclude_list());
    let admin = args
        .admin_channel
        .clone()
        .or_else(|| config.admin_channel_id());

    let criteria = StaleChannelCriteria::new(args.days)
        .with_excludes(exclude)
        .with_types(args.types.iter().copied().map(ChannelType::from))
        .with_admin_channel(admin);

    RunRequest {
        criteria,
        mode: if list { RunMode::List } else { RunMode::Archive },
        batch_size: args
            .batch_size
            .unwrap_or_else(|| BatchBounds::default_for(list)),
        pauses: Pauses::default(),
    }
}

/// `scheduled`: everything comes from the `[archiver]` section; `dry_run` means list only.
pub fn request_from_config(config: &ArchiverSection) -> Result<RunRequest> {
    if !config.enabled {
        bail!("channel archiver is disabled in config ([archiver] enabled = false)");
    }
    config.validate()?;
    let criteria = StaleChannelCriteria::new(config.age_in_days)
        .with_excludes(config.exclude_list())
        .with_admin_channel(config.admin_channel_id());
    Ok(RunRequest {
        criteria,
        mode: if config.dry_run {
            RunMode::List
        } else {
            RunMode::Archive
        },
        batch_size: config.batch_size,
        pauses: Pauses::default(),
    })
}
