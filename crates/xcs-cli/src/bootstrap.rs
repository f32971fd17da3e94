use anyhow::Context;
use xcs_config::XcsConfig;

use crate::cli::GlobalFlags;

/// Load layered configuration, apply command-line overrides, and check it.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<XcsConfig> {
    let mut config = XcsConfig::load_with_dotenv().context("failed to load xcsync configuration")?;
    apply_overrides(&mut config, flags);
    config.validate()?;
    prepare_store_dir(&config)?;
    tracing::debug!(
        store = %config.store.path,
        reports = %config.reports.directory,
        concurrency = config.batch.concurrency,
        "configuration loaded"
    );
    Ok(config)
}

fn apply_overrides(config: &mut XcsConfig, flags: &GlobalFlags) {
    if let Some(store) = &flags.store {
        config.store.path.clone_from(store);
    }
    if let Some(concurrency) = flags.concurrency {
        config.batch.concurrency = concurrency;
    }
}

fn prepare_store_dir(config: &XcsConfig) -> anyhow::Result<()> {
    if let Some(parent) = config.store.parent_dir() {
        std::fs::create_dir_all(&parent).with_context(|| {
            format!("failed to create store directory {}", parent.display())
        })?;
    }
    Ok(())
}
