use async_trait::async_trait;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::db::node::Node;
use crate::db::parameter_value::{node_parameters, subscription_parameters};
use crate::db::subscription::SubscriptionRecord;
use crate::db::Parameters;
use crate::error::{format_error_chain, AppError, AppResult};
use crate::metrics;
use crate::travis::client::TravisClient;
use crate::travis::job::{RepoEnvelope, ReposEnvelope};
use crate::travis::{Job, PARAMETER_JOB};
use crate::view::JobBackend;

/// Rule of a validation error on a job Travis does not know.
pub const JOB_NOT_FOUND: &str = "travis-job";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Up,
    Down,
}

/// Live data attached to a subscription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionData {
    #[serde(default)]
    pub job: Option<Job>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionStatusWithData {
    pub status: NodeStatus,
    pub data: SubscriptionData,
}

/// Job names created for a project are the project key, optionally followed
/// by a dash and lower case letters or digits.
pub fn job_name_pattern(pkey: &str) -> Result<Regex, regex::Error> {
    let pkey = regex::escape(pkey);
    Regex::new(&format!("^(?:{0}|{0}-[a-z0-9]*)$", pkey))
}

pub fn is_valid_job_name(pkey: &str, name: &str) -> bool {
    job_name_pattern(pkey)
        .map(|pattern| pattern.is_match(name))
        .unwrap_or(false)
}

#[derive(Clone)]
pub struct TravisPlugin {
    pool: Pool<SqliteConnectionManager>,
}

impl TravisPlugin {
    pub fn new(pool: Pool<SqliteConnectionManager>) -> Self {
        Self { pool }
    }

    pub fn node_parameters(&self, node: &str) -> AppResult<Parameters> {
        let conn = self.pool.get()?;
        if Node::get_by_id(node, &conn)?.is_none() {
            return Err(AppError::NotFound(format!("Node {}", node)));
        }
        node_parameters(node, &conn)
    }

    pub fn subscription_parameters(&self, subscription: i64) -> AppResult<Parameters> {
        let conn = self.pool.get()?;
        if SubscriptionRecord::get_by_id(subscription, &conn)?.is_none() {
            return Err(AppError::NotFound(format!("Subscription {}", subscription)));
        }
        subscription_parameters(subscription, &conn)
    }

    /// Fetch the job named by the `job` parameter.
    ///
    /// An unknown job is a validation error on the job field.
    pub async fn validate_job(parameters: &Parameters) -> AppResult<Job> {
        let job = parameters.get(PARAMETER_JOB).cloned().unwrap_or_default();
        let not_found =
            || AppError::validation(PARAMETER_JOB, JOB_NOT_FOUND, vec![job.clone()]);
        if job.trim().is_empty() {
            return Err(not_found());
        }

        let client = TravisClient::new(parameters)?;
        let url = client.endpoint(std::iter::once("repos").chain(job.split('/')))?;
        if let Some(metrics) = metrics::get() {
            metrics.job_lookups.add(1, &[]);
        }

        let body = client.get(url).await?.ok_or_else(not_found)?;
        let envelope: RepoEnvelope = serde_json::from_str(&body)?;
        Ok(envelope.repo.into())
    }

    /// Search the jobs of a node whose name matches `criteria`, at most ten,
    /// ordered by name. A failing search gives no job.
    pub async fn find_all_by_name(&self, node: &str, criteria: &str) -> AppResult<Vec<Job>> {
        let parameters = self.node_parameters(node)?;
        let client = TravisClient::new(&parameters)?;
        let mut url = client.endpoint(["repos"])?;
        url.query_pairs_mut()
            .append_pair("search", criteria)
            .append_pair("orderBy", "name")
            .append_pair("limit", "10");

        let body = match client.get(url).await {
            Ok(Some(body)) => body,
            Ok(None) => return Ok(Vec::new()),
            Err(e) => {
                log::warn!(
                    "Searching Travis jobs of {} failed: {}",
                    node,
                    format_error_chain(&e)
                );
                return Ok(Vec::new());
            }
        };

        let envelope: ReposEnvelope = serde_json::from_str(&body)?;
        Ok(envelope.repos.into_iter().map(Job::from).collect())
    }

    /// The job `id` of the node.
    pub async fn find_by_id(&self, node: &str, id: &str) -> AppResult<Job> {
        let mut parameters = self.node_parameters(node)?;
        parameters.insert(PARAMETER_JOB.to_string(), id.to_string());
        Self::validate_job(&parameters).await
    }

    /// Whether the node answers with its configuration.
    pub async fn check_status(parameters: &Parameters) -> AppResult<bool> {
        let client = TravisClient::new(parameters)?;
        let url = client.endpoint(["config"])?;
        match client.get(url).await {
            Ok(body) => Ok(body.is_some()),
            Err(AppError::Travis(failure)) => {
                log::warn!("Travis node check failed: {}", failure);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn check_subscription_status(
        parameters: &Parameters,
    ) -> AppResult<SubscriptionStatusWithData> {
        let job = Self::validate_job(parameters).await?;
        Ok(SubscriptionStatusWithData {
            status: NodeStatus::Up,
            data: SubscriptionData { job: Some(job) },
        })
    }

    /// Validate the parameters of a subscription linked to an existing job.
    pub async fn link(parameters: &Parameters) -> AppResult<Job> {
        Self::validate_job(parameters).await
    }

    /// Validate the parameters of a subscription for a job yet to exist.
    ///
    /// A failed existence check counts as "does not exist".
    pub async fn create(pkey: &str, parameters: &Parameters) -> AppResult<()> {
        let name = parameters.get(PARAMETER_JOB).cloned().unwrap_or_default();
        if !is_valid_job_name(pkey, &name) {
            return Err(AppError::validation(
                PARAMETER_JOB,
                "validation-job-name",
                vec![pkey.to_string()],
            ));
        }

        match Self::validate_job(parameters).await {
            Ok(_) => Err(AppError::validation(
                PARAMETER_JOB,
                "already-exist",
                vec![PARAMETER_JOB.to_string(), name],
            )),
            Err(e) => {
                log::debug!("Job {} is available: {}", name, e);
                Ok(())
            }
        }
    }

    /// Restart the last build of the subscription's job.
    pub async fn build(&self, subscription: i64) -> AppResult<()> {
        let parameters = self.subscription_parameters(subscription)?;
        let failed = || {
            AppError::Business(format!(
                "Launching the job for the subscription {} failed.",
                subscription
            ))
        };

        let job = match Self::validate_job(&parameters).await {
            Ok(job) => job,
            Err(AppError::Validation(_)) => return Err(failed()),
            Err(e) => return Err(e),
        };

        let Some(last_build_id) = job.last_build_id.as_deref() else {
            return Err(failed());
        };
        if !Self::restart(&parameters, last_build_id).await? {
            return Err(failed());
        }

        log::info!(
            "Restarted build {} of {} for subscription {}",
            last_build_id,
            job.name,
            subscription
        );
        if let Some(metrics) = metrics::get() {
            metrics.builds_triggered.add(1, &[]);
        }
        Ok(())
    }

    async fn restart(parameters: &Parameters, build_id: &str) -> AppResult<bool> {
        let client = TravisClient::new(parameters)?;
        let url = client.endpoint(["builds", build_id, "restart"])?;
        Ok(client.post(url).await.unwrap_or_else(|e| {
            log::warn!("Restarting build {} failed: {}", build_id, e);
            false
        }))
    }
}

#[async_trait]
impl JobBackend for TravisPlugin {
    async fn find_job(&self, node: &str, name: &str) -> AppResult<Job> {
        self.find_by_id(node, name).await
    }

    async fn trigger_build(&self, subscription: i64) -> AppResult<()> {
        self.build(subscription).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::node::Node;
    use crate::db::parameter_value::set_node_parameter;
    use crate::db::project::{Project, ProjectEgg};
    use crate::db::subscription::SubscriptionEgg;
    use crate::db::testing::memory_pool;
    use crate::error::TravisFailure;
    use crate::travis::mock::{self, MockTravis};
    use crate::travis::JobStatus;

    const NODE: &str = "service:build:travis:bpr";
    const JOB: &str = "ligoj/plugin-vm-google";

    /// Register the node of `travis` and a subscription of project `gstack`
    /// to the job under test.
    fn prepare(travis: &MockTravis) -> AppResult<(TravisPlugin, i64)> {
        let pool = memory_pool();
        let conn = pool.get()?;
        Node {
            id: NODE.to_string(),
            name: "Travis".to_string(),
        }
        .upsert(&conn)?;
        for (parameter, data) in travis.parameters() {
            set_node_parameter(NODE, &parameter, &data, &conn)?;
        }
        let project = Project::upsert(
            &ProjectEgg {
                pkey: "gstack".to_string(),
                name: "gStack".to_string(),
            },
            &conn,
        )?;
        let own = Parameters::from([(PARAMETER_JOB.to_string(), JOB.to_string())]);
        let subscription = SubscriptionRecord::insert(
            &SubscriptionEgg {
                project_id: project.id,
                node_id: NODE,
                parameters: &own,
            },
            &conn,
        )?;
        drop(conn);
        Ok((TravisPlugin::new(pool), subscription))
    }

    fn with_job(travis: &MockTravis, job: &str) -> Parameters {
        let mut parameters = travis.parameters();
        parameters.insert(PARAMETER_JOB.to_string(), job.to_string());
        parameters
    }

    fn check_job(job: &Job, building: bool, status: JobStatus) {
        assert_eq!(job.id, JOB);
        assert_eq!(job.name, JOB);
        assert_eq!(job.description.as_deref(), Some(mock::DESCRIPTION));
        assert_eq!(job.status, status);
        assert_eq!(job.building, building);
    }

    fn assert_validation(result: AppResult<impl std::fmt::Debug>, rule: &str) {
        match result {
            Err(AppError::Validation(error)) => {
                assert_eq!(error.field, PARAMETER_JOB);
                assert_eq!(error.rule, rule);
            }
            other => panic!("expected a {} validation error, got {:?}", rule, other),
        }
    }

    fn assert_business(result: AppResult<()>) {
        assert!(
            matches!(result, Err(AppError::Business(_))),
            "expected a business error, got {:?}",
            result
        );
    }

    #[test]
    fn job_names_start_with_the_project_key() {
        assert!(is_valid_job_name("crm", "crm"));
        assert!(is_valid_job_name("crm", "crm-42"));
        assert!(is_valid_job_name("crm", "crm-"));
        assert!(!is_valid_job_name("crm", "crmx"));
        assert!(!is_valid_job_name("crm", "crm-A"));
        assert!(!is_valid_job_name("crm", "xcrm"));
        assert!(!is_valid_job_name("c.m", "crm"));
    }

    #[actix_web::test]
    async fn validate_job_not_found() {
        let travis = mock::start(|cfg| {
            cfg.route("/repos/gfi/bootstrap", mock::status(404));
        });
        assert_validation(
            TravisPlugin::validate_job(&with_job(&travis, "gfi/bootstrap")).await,
            "travis-job",
        );
        travis.stop().await;
    }

    #[actix_web::test]
    async fn validate_job() -> AppResult<()> {
        let travis = mock::start(|cfg| {
            cfg.route("/repos/ligoj/plugin-vm-google", mock::ok(mock::REPO_PASSED));
        });
        let job = TravisPlugin::validate_job(&with_job(&travis, JOB)).await?;
        check_job(&job, false, JobStatus::Blue);
        travis.stop().await;
        Ok(())
    }

    #[actix_web::test]
    async fn validate_job_building() -> AppResult<()> {
        let travis = mock::start(|cfg| {
            cfg.route("/repos/ligoj/plugin-vm-google", mock::ok(mock::REPO_STARTED));
        });
        let job = TravisPlugin::validate_job(&with_job(&travis, JOB)).await?;
        check_job(&job, true, JobStatus::Yellow);
        travis.stop().await;
        Ok(())
    }

    #[actix_web::test]
    async fn validate_job_refused_credentials() {
        let travis = mock::start(|cfg| {
            cfg.route("/repos/ligoj/plugin-vm-google", mock::status(401));
        });
        assert!(matches!(
            TravisPlugin::validate_job(&with_job(&travis, JOB)).await,
            Err(AppError::Travis(TravisFailure::Login))
        ));
        travis.stop().await;
    }

    #[actix_web::test]
    async fn check_status() -> AppResult<()> {
        let travis = mock::start(|cfg| {
            cfg.route("/config", mock::ok(mock::CONFIG));
        });
        assert!(TravisPlugin::check_status(&travis.parameters()).await?);
        travis.stop().await;
        Ok(())
    }

    #[actix_web::test]
    async fn check_status_failed() -> AppResult<()> {
        let travis = mock::start(|_| {});
        assert!(!TravisPlugin::check_status(&travis.parameters()).await?);
        travis.stop().await;
        Ok(())
    }

    #[actix_web::test]
    async fn check_subscription_status() -> AppResult<()> {
        let travis = mock::start(|cfg| {
            cfg.route("/repos/ligoj/plugin-vm-google", mock::ok(mock::REPO_PASSED));
        });
        let (plugin, subscription) = prepare(&travis)?;
        let status = TravisPlugin::check_subscription_status(
            &plugin.subscription_parameters(subscription)?,
        )
        .await?;
        assert_eq!(status.status, NodeStatus::Up);
        let job = status.data.job.unwrap_or_else(|| panic!("job data expected"));
        check_job(&job, false, JobStatus::Blue);
        travis.stop().await;
        Ok(())
    }

    #[actix_web::test]
    async fn find_jobs_by_name() -> AppResult<()> {
        let travis = mock::start(|cfg| {
            cfg.route("/repos", mock::search("ligo"));
        });
        let (plugin, _) = prepare(&travis)?;
        let jobs = plugin.find_all_by_name(NODE, "ligo").await?;
        assert_eq!(jobs.len(), 5);
        assert_eq!(jobs[1].name, "ligoj/plugin-vm-aws");
        assert_eq!(jobs[1].id, "ligoj/plugin-vm-aws");
        assert_eq!(
            jobs[1].description.as_deref(),
            Some("Ligoj plugin for AWS EC2 instance life cycle management : scheduled ON/OFF")
        );
        assert_eq!(jobs[1].status, JobStatus::Blue);
        assert_eq!(jobs[3].status, JobStatus::Yellow);
        assert!(jobs[3].building);
        travis.stop().await;
        Ok(())
    }

    #[actix_web::test]
    async fn find_jobs_by_name_auth_failed() -> AppResult<()> {
        let travis = mock::start(|cfg| {
            cfg.route("/repos", mock::status(401));
        });
        let (plugin, _) = prepare(&travis)?;
        assert!(plugin.find_all_by_name(NODE, "ligo").await?.is_empty());
        travis.stop().await;
        Ok(())
    }

    #[actix_web::test]
    async fn find_jobs_of_unknown_node() -> AppResult<()> {
        let travis = mock::start(|_| {});
        let (plugin, _) = prepare(&travis)?;
        assert!(matches!(
            plugin.find_all_by_name("service:build:travis:none", "ligo").await,
            Err(AppError::NotFound(_))
        ));
        travis.stop().await;
        Ok(())
    }

    #[actix_web::test]
    async fn find_job_by_id() -> AppResult<()> {
        let travis = mock::start(|cfg| {
            cfg.route("/repos/ligoj/plugin-vm-google", mock::ok(mock::REPO_STARTED));
        });
        let (plugin, _) = prepare(&travis)?;
        check_job(&plugin.find_by_id(NODE, JOB).await?, true, JobStatus::Yellow);
        travis.stop().await;
        Ok(())
    }

    #[actix_web::test]
    async fn find_job_by_id_not_found() -> AppResult<()> {
        let travis = mock::start(|cfg| {
            cfg.route("/repos/ligoj/any", mock::status(404));
        });
        let (plugin, _) = prepare(&travis)?;
        assert_validation(plugin.find_by_id(NODE, "ligoj/any").await, "travis-job");
        travis.stop().await;
        Ok(())
    }

    #[actix_web::test]
    async fn build() -> AppResult<()> {
        let travis = mock::start(|cfg| {
            cfg.route("/repos/ligoj/plugin-vm-google", mock::ok(mock::REPO_PASSED))
                .route(
                    "/builds/274572860/restart",
                    actix_web::web::post().to(|| async {
                        actix_web::HttpResponse::Ok().json(serde_json::json!({ "result": true }))
                    }),
                );
        });
        let (plugin, subscription) = prepare(&travis)?;
        plugin.build(subscription).await?;
        travis.stop().await;
        Ok(())
    }

    #[actix_web::test]
    async fn build_not_exists() -> AppResult<()> {
        let travis = mock::start(|_| {});
        let (plugin, subscription) = prepare(&travis)?;
        assert_business(plugin.build(subscription).await);
        travis.stop().await;
        Ok(())
    }

    #[actix_web::test]
    async fn build_failed() -> AppResult<()> {
        let travis = mock::start(|cfg| {
            cfg.route("/repos/ligoj/plugin-vm-google", mock::ok(mock::REPO_PASSED))
                .route("/builds/274572860/restart", mock::status(403));
        });
        let (plugin, subscription) = prepare(&travis)?;
        assert_business(plugin.build(subscription).await);
        travis.stop().await;
        Ok(())
    }

    #[actix_web::test]
    async fn build_without_previous_build() -> AppResult<()> {
        let travis = mock::start(|cfg| {
            cfg.route("/repos/ligoj/plugin-vm-google", mock::ok(mock::REPO_NO_BUILD));
        });
        let (plugin, subscription) = prepare(&travis)?;
        assert_business(plugin.build(subscription).await);
        travis.stop().await;
        Ok(())
    }

    #[actix_web::test]
    async fn build_unknown_subscription() -> AppResult<()> {
        let travis = mock::start(|_| {});
        let (plugin, _) = prepare(&travis)?;
        assert!(matches!(
            plugin.build(9999).await,
            Err(AppError::NotFound(_))
        ));
        travis.stop().await;
        Ok(())
    }

    #[actix_web::test]
    async fn create_checks_name_and_availability() {
        let travis = mock::start(|cfg| {
            cfg.route("/repos/gstack-taken", mock::ok(mock::REPO_PASSED))
                .route("/repos/gstack-free", mock::status(404));
        });

        assert_validation(
            TravisPlugin::create("gstack", &with_job(&travis, "gstackx")).await,
            "validation-job-name",
        );
        assert_validation(
            TravisPlugin::create("gstack", &with_job(&travis, "gstack-taken")).await,
            "already-exist",
        );
        assert!(TravisPlugin::create("gstack", &with_job(&travis, "gstack-free"))
            .await
            .is_ok());
        travis.stop().await;
    }
}
