use indexmap::IndexMap;

use super::types::JobRecord;
use crate::status::Status;

/// Merges job statuses into one status per stage.
///
/// GitLab lists jobs newest first, so jobs are walked in reverse to get stages
/// in roughly the order they ran. Each stage keeps the most severe status of
/// its jobs: one failed job marks the whole stage failed.
pub fn merge_stage_statuses(jobs: &[JobRecord]) -> IndexMap<String, Status> {
    let mut stages: IndexMap<String, Status> = IndexMap::new();

    for job in jobs.iter().rev() {
        let status = Status::from_name(&job.status);
        stages
            .entry(job.stage.clone())
            .and_modify(|merged| *merged = merged.merge(status))
            .or_insert(status);
    }

    stages
}
