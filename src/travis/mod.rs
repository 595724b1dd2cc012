//! Travis CI build plugin: API client, job model, plugin operations and
//! their REST endpoints.

pub mod client;
pub mod job;
pub mod plugin;
pub mod resource;

#[cfg(test)]
pub mod mock;

pub use job::{Job, JobStatus};
pub use plugin::TravisPlugin;

/// REST path of the plugin, relative to the REST root.
pub const URL: &str = "service/build/travis";

/// Plugin key, also the prefix of its parameters and messages.
pub const KEY: &str = "service:build:travis";

/// Travis user name able to connect to the instance.
pub const PARAMETER_USER: &str = "service:build:travis:user";

/// Travis API token.
pub const PARAMETER_TOKEN: &str = "service:build:travis:api-token";

/// Travis job (repository slug).
pub const PARAMETER_JOB: &str = "service:build:travis:job";

/// Job used as a template when creating a job.
pub const PARAMETER_TEMPLATE_JOB: &str = "service:build:travis:template-job";

/// API endpoint.
pub const PARAMETER_URL: &str = "service:build:travis:url-api";

/// Web site, prefix of the job pages.
pub const PARAMETER_URL_SITE: &str = "service:build:travis:url-site";
