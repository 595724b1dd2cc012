use std::sync::Mutex;

use maud::{html, Markup};

use crate::db::Parameters;
use crate::nls::Messages;
use crate::view::{
    Notifier, SelectBinding, StatusStyles, Subscription, SubscriptionConfiguration, ViewHost,
};

/// The console side of the job status view: rendering helpers and the
/// context of the page being served.
pub struct ConsoleHost {
    messages: Messages,
    pkey: String,
    node: String,
    subscriptions: Vec<Subscription>,
    styles: StatusStyles,
}

impl ConsoleHost {
    pub fn new(messages: Messages, pkey: &str, node: &str) -> Self {
        Self {
            messages,
            pkey: pkey.to_string(),
            node: node.to_string(),
            subscriptions: Vec::new(),
            styles: StatusStyles::default(),
        }
    }

    /// The icon set of the page.
    pub fn with_styles(mut self, styles: StatusStyles) -> Self {
        self.styles = styles;
        self
    }

    /// The subscriptions shown on the page.
    pub fn with_subscriptions(mut self, subscriptions: Vec<Subscription>) -> Self {
        self.subscriptions = subscriptions;
        self
    }
}

impl ViewHost for ConsoleHost {
    fn render_key(&self, subscription: &Subscription, parameter: &str) -> Markup {
        html! {
            span.subscription-key title=(self.messages.label(parameter)) {
                (subscription.parameter(parameter).unwrap_or_default())
            }
        }
    }

    fn render_service_link(&self, icon: &str, href: &str, title_key: &str, new_tab: bool) -> Markup {
        html! {
            a.service-link
                href=(href)
                title=(self.messages.label(title_key))
                target=[new_tab.then_some("_blank")]
                rel=[new_tab.then_some("noopener")]
            {
                i class=(self.styles.named(icon)) {}
            }
        }
    }

    fn render_service_help_link(&self, parameters: &Parameters, key: &str) -> Markup {
        html! {
            @if let Some(href) = parameters.get(key).filter(|h| !h.is_empty()) {
                a.service-help-link href=(href) target="_blank" rel="noopener" title=(self.messages.label(key)) {
                    i class=(self.styles.named("question-circle")) {}
                }
            }
        }
    }

    fn generate_carousel(
        &self,
        subscription: &Subscription,
        items: &[(&str, String)],
        index: usize,
    ) -> Markup {
        html! {
            div.carousel id=(format!("carousel-{}", subscription.id)) {
                @for (i, (name, value)) in items.iter().enumerate() {
                    div
                        class=(if i == index { "carousel-item active" } else { "carousel-item" })
                        title=(self.messages.label(name))
                    {
                        (value)
                    }
                }
            }
        }
    }

    fn register_select(
        &self,
        configuration: &mut SubscriptionConfiguration,
        parameter: &str,
        endpoint: &str,
    ) {
        configuration.selects.push(SelectBinding {
            parameter: parameter.to_string(),
            endpoint: endpoint.to_string(),
        });
    }

    fn pkey(&self) -> &str {
        &self.pkey
    }

    fn selected_node(&self) -> &str {
        &self.node
    }

    fn subscription(&self, id: i64) -> Option<Subscription> {
        self.subscriptions.iter().find(|s| s.id == id).cloned()
    }
}

/// Keeps the notifications of one request, shown in its response.
#[derive(Default)]
pub struct CollectingNotifier {
    messages: Mutex<Vec<String>>,
}

impl CollectingNotifier {
    pub fn take(&self) -> Vec<String> {
        match self.messages.lock() {
            Ok(mut messages) => std::mem::take(&mut *messages),
            Err(e) => {
                log::error!("Notification lock poisoned: {}", e);
                Vec::new()
            }
        }
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, message: String) {
        log::info!("Notification: {}", message);
        match self.messages.lock() {
            Ok(mut messages) => messages.push(message),
            Err(e) => log::error!("Notification lock poisoned: {}", e),
        }
    }
}
