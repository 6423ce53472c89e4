mod client;
mod provider;
mod selection;
mod stages;
mod types;

pub use provider::GitLabProvider;
pub use types::DashboardPipeline;
