use futures::future::try_join_all;
use log::{info, warn};
use std::time::Duration;

use crate::cache::Fingerprint;
use crate::config::Config;
use crate::error::{DashboardError, Result};

use super::client::GitLabClient;
use super::selection::RefSelector;
use super::stages::merge_stage_statuses;
use super::types::{DashboardPipeline, PipelineRecord};

/// GitLab data source for the dashboard.
///
/// Selects the newest pipeline of each of the `size` most recently active refs
/// and reduces their jobs to one status per stage.
pub struct GitLabProvider {
    client: GitLabClient,
    project: String,
    size: usize,
    max_pages: usize,
}

impl GitLabProvider {
    /// Creates a provider from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or project URL cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        let client = GitLabClient::new(
            &config.url,
            &config.id,
            &config.token(),
            config.timeout_secs.map(Duration::from_secs),
        )?;

        Ok(Self {
            client,
            project: config.id.clone(),
            size: config.size,
            max_pages: config.max_pages,
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Fingerprint of the project-wide job list.
    pub async fn fingerprint(&self) -> Result<Fingerprint> {
        let jobs = self.client.fetch_project_jobs().await?;
        Fingerprint::from_value(&jobs)
    }

    /// Pages through the pipeline list until `size` distinct refs are found.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::InsufficientData`] when the list runs out or
    /// `max_pages` pages were read before enough refs were found.
    pub async fn select_pipelines(&self) -> Result<Vec<PipelineRecord>> {
        let mut selector = RefSelector::new(self.size);
        let mut page = 0;

        while !selector.is_full() {
            if page >= self.max_pages {
                warn!(
                    "Page budget of {} reached with {} of {} refs",
                    self.max_pages,
                    selector.found(),
                    selector.wanted()
                );
                return Err(insufficient(&selector, page));
            }

            page += 1;
            let pipelines = self.client.fetch_pipeline_page(page).await?;

            if pipelines.is_empty() {
                warn!(
                    "Pipeline list exhausted at page {page} with {} of {} refs",
                    selector.found(),
                    selector.wanted()
                );
                return Err(insufficient(&selector, page));
            }

            let kept = selector.offer_page(pipelines);
            if kept > 0 {
                info!(
                    "Pipeline refs found: {}/{} (page {page})",
                    selector.found(),
                    selector.wanted()
                );
            }
        }

        Ok(selector.into_pipelines())
    }

    /// Selects pipelines and merges the stage statuses of each.
    pub async fn collect_dashboard(&self) -> Result<Vec<DashboardPipeline>> {
        let pipelines = self.select_pipelines().await?;

        info!("Fetching jobs for {} pipelines...", pipelines.len());

        let futures = pipelines
            .into_iter()
            .map(|pipeline| self.with_stages(pipeline));

        try_join_all(futures).await
    }

    async fn with_stages(&self, pipeline: PipelineRecord) -> Result<DashboardPipeline> {
        let jobs = self.client.fetch_pipeline_jobs(pipeline.id).await?;
        let stages = merge_stage_statuses(&jobs);
        Ok(DashboardPipeline::new(pipeline, stages))
    }
}

fn insufficient(selector: &RefSelector, pages: usize) -> DashboardError {
    DashboardError::InsufficientData {
        found: selector.found(),
        wanted: selector.wanted(),
        pages,
    }
}
