use log::debug;
use serde_json::Value;

use super::core::{GitLabClient, JOBS_PER_PAGE};
use crate::error::Result;
use crate::providers::gitlab::types::{JobRecord, PipelineRecord};

impl GitLabClient {
    /// One page of the project's pipelines, newest first. Pages start at 1.
    pub async fn fetch_pipeline_page(&self, page: usize) -> Result<Vec<PipelineRecord>> {
        debug!("Fetching pipeline list page {page}");

        let mut url = self.endpoint("pipelines")?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string());

        self.get_records(url, "pipelines").await
    }

    /// Jobs of a single pipeline, newest first.
    pub async fn fetch_pipeline_jobs(&self, pipeline_id: u64) -> Result<Vec<JobRecord>> {
        debug!("Fetching jobs for pipeline {pipeline_id}");

        let mut url = self.endpoint(&format!("pipelines/{pipeline_id}/jobs"))?;
        url.query_pairs_mut()
            .append_pair("per_page", &JOBS_PER_PAGE.to_string());

        self.get_records(url, "pipeline jobs").await
    }

    /// The project-wide job list, left undecoded.
    pub async fn fetch_project_jobs(&self) -> Result<Value> {
        let url = self.endpoint("jobs")?;
        self.get_json(url).await
    }
}
