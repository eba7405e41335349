pub mod config;
pub mod dashboard;
pub mod error;
pub mod github;
pub mod models;

pub use config::{Config, SessionContext};
pub use dashboard::{
    DashboardPipeline, DashboardService, FailureMode, QueryState, RepoEnricher, ResourceKind,
    ViewCache,
};
pub use error::{Error, Result};
pub use github::GitHubClient;
