use indexmap::IndexMap;
use serde::Deserialize;

use crate::status::Status;

/// A pipeline as listed by `GET /projects/:id/pipelines`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PipelineRecord {
    /// Numeric pipeline id
    pub id: u64,
    /// Branch or tag the pipeline ran for
    #[serde(rename = "ref")]
    pub ref_: String,
    /// Overall pipeline status as reported by GitLab
    pub status: String,
    /// Link to the pipeline page, when GitLab provides one
    #[serde(default)]
    pub web_url: Option<String>,
}

/// A job as listed by `GET /projects/:id/pipelines/:pipeline_id/jobs`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobRecord {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    /// Stage this job belongs to
    pub stage: String,
    /// Raw job status; unknown or missing values rank as undefined
    #[serde(default)]
    pub status: String,
}

/// One dashboard row: the newest pipeline of a ref with merged stage statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardPipeline {
    pub id: u64,
    pub ref_: String,
    pub status: String,
    pub web_url: String,
    /// Stage name to merged status, in display order
    pub stages: IndexMap<String, Status>,
}

impl DashboardPipeline {
    pub fn new(pipeline: PipelineRecord, stages: IndexMap<String, Status>) -> Self {
        Self {
            id: pipeline.id,
            ref_: pipeline.ref_,
            status: pipeline.status,
            web_url: pipeline.web_url.unwrap_or_default(),
            stages,
        }
    }
}
