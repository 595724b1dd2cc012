use std::sync::Arc;

use maud::{html, Markup};

use crate::error::{AppResult, ValidationError};
use crate::nls::Messages;
use crate::travis::plugin::is_valid_job_name;
use crate::travis::{PARAMETER_JOB, PARAMETER_TEMPLATE_JOB, PARAMETER_URL_SITE, URL};
use crate::view::{
    status_presentation, ConfigurationMode, FieldValidator, JobBackend, Notifier,
    StatusStyles, Subscription, SubscriptionConfiguration, ValidationReporter, ViewHost,
};

/// Renders a subscription's Travis job and handles the build and job name
/// validation actions.
#[derive(Clone)]
pub struct JobStatusView {
    host: Arc<dyn ViewHost>,
    reporter: Arc<dyn ValidationReporter>,
    notifier: Arc<dyn Notifier>,
    backend: Arc<dyn JobBackend>,
    messages: Messages,
    styles: StatusStyles,
}

impl JobStatusView {
    pub fn new(
        host: Arc<dyn ViewHost>,
        reporter: Arc<dyn ValidationReporter>,
        notifier: Arc<dyn Notifier>,
        backend: Arc<dyn JobBackend>,
        messages: Messages,
        styles: StatusStyles,
    ) -> Self {
        Self {
            host,
            reporter,
            notifier,
            backend,
            messages,
            styles,
        }
    }

    pub fn render_key(&self, subscription: &Subscription) -> Markup {
        self.host.render_key(subscription, PARAMETER_JOB)
    }

    /// Link to the job page, build button and help link.
    pub fn render_features(&self, subscription: &Subscription) -> Markup {
        let href = format!(
            "{}{}",
            subscription.parameter(PARAMETER_URL_SITE).unwrap_or_default(),
            subscription.parameter(PARAMETER_JOB).unwrap_or_default()
        );
        html! {
            (self.host.render_service_link("home", &href, PARAMETER_JOB, true))
            button.service-build-travis-build.btn-link
                hx-post=(format!("/fragments/build/{}", subscription.id))
                hx-target="#notifications"
                hx-swap="afterbegin"
            {
                i class=(self.styles.play())
                    data-toggle="tooltip"
                    title=(self.messages.label("service:build:travis:build")) {}
            }
            (self.host.render_service_help_link(&subscription.parameters, "service:build:help"))
        }
    }

    /// Name and description of the job, the live data first.
    pub fn render_details_key(&self, subscription: &Subscription) -> Markup {
        let job = subscription.job();
        let name = job
            .map(|j| j.name.as_str())
            .filter(|n| !n.is_empty())
            .or_else(|| subscription.parameter(PARAMETER_JOB))
            .unwrap_or_default()
            .to_string();
        let description = job
            .and_then(|j| j.description.clone())
            .unwrap_or_default();

        self.host.generate_carousel(
            subscription,
            &[("name", name), ("description", description)],
            0,
        )
    }

    /// Status icon of the job, nothing while the job is unknown.
    pub fn render_details_features(&self, subscription: &Subscription) -> Markup {
        let Some(job) = subscription.job() else {
            return html! {};
        };
        let presentation =
            status_presentation(&self.messages, &self.styles, &job.status, job.building);
        html! {
            i data-toggle="tooltip" title=(presentation.title) class=(presentation.class) {}
        }
    }

    pub fn configure_subscription_parameters(&self, configuration: &mut SubscriptionConfiguration) {
        match configuration.mode {
            ConfigurationMode::Create => {
                self.host.register_select(
                    configuration,
                    PARAMETER_TEMPLATE_JOB,
                    &format!("{}/template/", URL),
                );
                configuration
                    .validators
                    .insert(PARAMETER_JOB.to_string(), FieldValidator::JobCreateMode);
            }
            ConfigurationMode::Link => {
                self.host
                    .register_select(configuration, PARAMETER_JOB, &format!("{}/", URL));
            }
        }
    }

    /// Check the name of a job to create.
    ///
    /// A name not matching the project key is rejected at once. Otherwise
    /// this returns true while a background lookup reports whether the job
    /// already exists; a failed lookup counts as "does not exist".
    pub fn validate_job_create_mode(&self, job_name: &str) -> bool {
        self.reporter.reset(PARAMETER_JOB);

        let pkey = self.host.pkey();
        if !is_valid_job_name(pkey, job_name) {
            self.reporter.add_error(ValidationError::new(
                PARAMETER_JOB,
                "validation-job-name",
                vec![pkey.to_string()],
            ));
            return false;
        }

        self.reporter.add_message(PARAMETER_JOB, self.styles.spinner());

        let node = self.host.selected_node().to_string();
        let name = job_name.to_string();
        let label = self.messages.label(PARAMETER_JOB).to_string();
        let backend = self.backend.clone();
        let reporter = self.reporter.clone();
        tokio::spawn(async move {
            match backend.find_job(&node, &name).await {
                Ok(_) => reporter.add_error(ValidationError::new(
                    PARAMETER_JOB,
                    "already-exist",
                    vec![label, name],
                )),
                Err(e) => {
                    log::debug!("Job {} not found on {}: {}", name, node, e);
                    reporter.add_success(PARAMETER_JOB);
                }
            }
        });

        true
    }

    /// Launch the job of a subscription and notify the user.
    pub async fn service_build_travis_build(&self, subscription: i64) -> AppResult<()> {
        self.backend.trigger_build(subscription).await?;

        let job = self
            .host
            .subscription(subscription)
            .and_then(|s| s.parameter(PARAMETER_JOB).map(str::to_string))
            .filter(|job| !job.is_empty())
            .unwrap_or_else(|| subscription.to_string());
        self.notifier
            .notify(self.messages.format("travis-build-job-success", &[&job]));
        Ok(())
    }
}
