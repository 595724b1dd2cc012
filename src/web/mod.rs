//! Console pages hosting the job status view.

mod fragments;
mod header;
mod host;
mod subscriptions;

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::error::{AppError, ValidationError};
use crate::nls::{render_template, Messages};
use crate::prelude::*;
use crate::travis::{TravisPlugin, KEY};
use crate::view::{ChannelReporter, JobStatusView, StatusStyles, ValidationEvent};

pub use fragments::*;
pub use host::{CollectingNotifier, ConsoleHost};
pub use subscriptions::*;

/// The job status view of one request, with the channels it reports on.
pub struct RequestView {
    pub view: JobStatusView,
    pub notifier: Arc<CollectingNotifier>,
    pub events: UnboundedReceiver<ValidationEvent>,
}

impl RequestView {
    pub fn new(
        host: ConsoleHost,
        plugin: &TravisPlugin,
        messages: Messages,
        styles: &StatusStyles,
    ) -> Self {
        let (reporter, events) = ChannelReporter::channel();
        let notifier = Arc::new(CollectingNotifier::default());
        let view = JobStatusView::new(
            Arc::new(host.with_styles(styles.clone())),
            Arc::new(reporter),
            notifier.clone(),
            Arc::new(plugin.clone()),
            messages,
            styles.clone(),
        );
        Self {
            view,
            notifier,
            events,
        }
    }
}

/// Localized text of a validation error. Parameters naming a plugin field
/// are localized too; project keys and job names are shown as given.
pub fn validation_message(messages: &Messages, error: &ValidationError) -> String {
    let template = messages
        .get(&error.rule)
        .or_else(|| messages.error(&error.rule))
        .unwrap_or(error.rule.as_str());
    let parameters: Vec<&str> = error
        .parameters
        .iter()
        .map(|p| {
            if p.starts_with(KEY) {
                messages.label(p)
            } else {
                p.as_str()
            }
        })
        .collect();
    render_template(template, &parameters)
}

/// Text shown to the user for a failed action.
pub fn error_message(messages: &Messages, error: &AppError) -> String {
    match error {
        AppError::Validation(error) => validation_message(messages, error),
        AppError::Travis(failure) => messages
            .error(failure.key())
            .unwrap_or(failure.key())
            .to_string(),
        other => other.to_string(),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(subscriptions_page)
        .service(new_subscription_page)
        .service(create_subscription_form)
        .service(build_fragment)
        .service(validate_job_fragment)
        .service(job_options_fragment);
}
