use anyhow::Context;
use xcs_config::XcsConfig;
use xcs_core::translation::TranslationSet;
use xcs_db::modtime::FsModTime;
use xcs_db::owners::ConfiguredOwners;
use xcs_db::proposal::ProposalExtractor;
use xcs_db::service::SyncService;
use xcs_db::tracker::StatusTracker;
use xcs_db::transfer::TransferEngine;
use xcs_db::validate::{FileReportSink, ReconciliationValidator};

/// Shared state for one command invocation.
pub struct AppContext {
    pub config: XcsConfig,
    pub service: SyncService,
    owners: ConfiguredOwners,
    mtime: FsModTime,
    sink: FileReportSink,
}

impl AppContext {
    pub async fn init(config: XcsConfig) -> anyhow::Result<Self> {
        let service = SyncService::new_local(&config.store.path)
            .await
            .with_context(|| format!("failed to open canonical store {}", config.store.path))?;
        let owners = ConfiguredOwners::new(config.owners.clone());
        let sink = FileReportSink::new(config.reports.directory_path());
        Ok(Self {
            config,
            service,
            owners,
            mtime: FsModTime,
            sink,
        })
    }

    pub const fn concurrency(&self) -> usize {
        self.config.batch.concurrency
    }

    pub fn tracker(&self) -> StatusTracker<'_> {
        StatusTracker::new(&self.service, &self.mtime, self.config.legacy.visit_segment)
    }

    pub fn proposals(&self) -> ProposalExtractor<'_> {
        ProposalExtractor::new(&self.service, &self.owners, self.config.legacy.visit_segment)
    }

    pub fn transfer_engine(&self) -> anyhow::Result<TransferEngine<'_>> {
        TransferEngine::new(
            &self.service,
            TranslationSet::standard(),
            self.proposals(),
            &self.mtime,
            &self.config.legacy,
        )
        .context("invalid translation maps")
    }

    pub fn validator(&self) -> anyhow::Result<ReconciliationValidator<'_>> {
        ReconciliationValidator::new(
            &self.service,
            TranslationSet::standard(),
            &self.mtime,
            &self.sink,
            &self.config.legacy,
        )
        .context("invalid translation maps")
    }
}
