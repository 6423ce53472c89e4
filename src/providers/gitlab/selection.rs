use indexmap::IndexSet;

use super::types::PipelineRecord;

/// Keeps the first pipeline seen for each ref until enough refs are found.
///
/// Pipeline pages come newest first, so the first pipeline of a ref is its
/// latest one and later ones are dropped.
#[derive(Debug)]
pub struct RefSelector {
    wanted: usize,
    refs: IndexSet<String>,
    pipelines: Vec<PipelineRecord>,
}

impl RefSelector {
    pub fn new(wanted: usize) -> Self {
        Self {
            wanted,
            refs: IndexSet::new(),
            pipelines: Vec::new(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.pipelines.len() >= self.wanted
    }

    pub fn found(&self) -> usize {
        self.pipelines.len()
    }

    pub fn wanted(&self) -> usize {
        self.wanted
    }

    /// Returns `true` if the pipeline was kept.
    pub fn offer(&mut self, pipeline: PipelineRecord) -> bool {
        if self.is_full() || self.refs.contains(&pipeline.ref_) {
            return false;
        }

        self.refs.insert(pipeline.ref_.clone());
        self.pipelines.push(pipeline);
        true
    }

    /// Offers a page in order, stopping as soon as the selector is full.
    pub fn offer_page(&mut self, page: Vec<PipelineRecord>) -> usize {
        let mut kept = 0;
        for pipeline in page {
            if self.is_full() {
                break;
            }
            if self.offer(pipeline) {
                kept += 1;
            }
        }
        kept
    }

    pub fn into_pipelines(self) -> Vec<PipelineRecord> {
        self.pipelines
    }
}
