//! The Travis job status view of a subscription.
//!
//! The view renders markup and reacts to two user actions. Everything it
//! needs from the console around it comes through the capability traits
//! below, handed over at construction.

mod job_status_view;
mod status;

use std::collections::HashMap;

use async_trait::async_trait;
use maud::Markup;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::db::Parameters;
use crate::error::{AppResult, ValidationError};
use crate::travis::plugin::SubscriptionData;
use crate::travis::Job;

pub use job_status_view::JobStatusView;
pub use status::{status_presentation, StatusPresentation, StatusStyle, StatusStyles};

/// A subscription as the view sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub data: SubscriptionData,
}

impl Subscription {
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }

    pub fn job(&self) -> Option<&Job> {
        self.data.job.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigurationMode {
    /// Subscribe to a job that does not exist yet
    Create,
    /// Subscribe to an existing job
    #[default]
    Link,
}

/// A parameter whose value is picked from a search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectBinding {
    pub parameter: String,
    pub endpoint: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValidator {
    JobCreateMode,
}

/// The subscription form being configured.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionConfiguration {
    pub mode: ConfigurationMode,
    pub selects: Vec<SelectBinding>,
    pub validators: HashMap<String, FieldValidator>,
}

impl SubscriptionConfiguration {
    pub fn new(mode: ConfigurationMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }
}

/// Rendering helpers and context owned by the console.
pub trait ViewHost: Send + Sync {
    /// The display key of a subscription, from one of its parameters.
    fn render_key(&self, subscription: &Subscription, parameter: &str) -> Markup;

    /// An icon link to an external page, titled with the message `title_key`.
    fn render_service_link(&self, icon: &str, href: &str, title_key: &str, new_tab: bool)
        -> Markup;

    /// A link to the help page configured under `key`, if any.
    fn render_service_help_link(&self, parameters: &Parameters, key: &str) -> Markup;

    /// Items shown one at a time, `index` first.
    fn generate_carousel(
        &self,
        subscription: &Subscription,
        items: &[(&str, String)],
        index: usize,
    ) -> Markup;

    fn register_select(
        &self,
        configuration: &mut SubscriptionConfiguration,
        parameter: &str,
        endpoint: &str,
    );

    /// Key of the project being edited.
    fn pkey(&self) -> &str;

    /// Node selected in the subscription form.
    fn selected_node(&self) -> &str;

    fn subscription(&self, id: i64) -> Option<Subscription>;
}

/// Per-field feedback of a form.
pub trait ValidationReporter: Send + Sync {
    fn reset(&self, field: &str);
    fn add_error(&self, error: ValidationError);
    /// Feedback shown while a check is running.
    fn add_message(&self, field: &str, icon: &str);
    fn add_success(&self, field: &str);
}

pub trait Notifier: Send + Sync {
    fn notify(&self, message: String);
}

/// The plugin endpoints the view calls.
#[async_trait]
pub trait JobBackend: Send + Sync {
    async fn find_job(&self, node: &str, name: &str) -> AppResult<Job>;
    async fn trigger_build(&self, subscription: i64) -> AppResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationEvent {
    Reset(String),
    Error(ValidationError),
    Pending { field: String, icon: String },
    Success(String),
}

impl ValidationEvent {
    /// Whether the event ends the validation of its field.
    pub fn is_final(&self) -> bool {
        matches!(self, ValidationEvent::Error(_) | ValidationEvent::Success(_))
    }
}

/// Forwards every report as a [`ValidationEvent`] on a channel.
pub struct ChannelReporter {
    sender: UnboundedSender<ValidationEvent>,
}

impl ChannelReporter {
    pub fn channel() -> (Self, UnboundedReceiver<ValidationEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(&self, event: ValidationEvent) {
        // The receiver may be gone when nobody waits for late results
        if self.sender.send(event).is_err() {
            log::debug!("Validation event dropped, no receiver");
        }
    }
}

impl ValidationReporter for ChannelReporter {
    fn reset(&self, field: &str) {
        self.send(ValidationEvent::Reset(field.to_string()));
    }

    fn add_error(&self, error: ValidationError) {
        self.send(ValidationEvent::Error(error));
    }

    fn add_message(&self, field: &str, icon: &str) {
        self.send(ValidationEvent::Pending {
            field: field.to_string(),
            icon: icon.to_string(),
        });
    }

    fn add_success(&self, field: &str) {
        self.send(ValidationEvent::Success(field.to_string()));
    }
}
