mod gitlab;

pub use gitlab::{DashboardPipeline, GitLabProvider};
