use std::collections::HashMap;

use crate::config::Config;
use crate::db::parameter_value::subscription_parameters;
use crate::db::subscription::SubscriptionRecord;
use crate::nls::Messages;
use crate::prelude::*;
use crate::travis::{TravisPlugin, PARAMETER_JOB, URL};
use crate::view::{Subscription, ValidationEvent};
use crate::web::{error_message, validation_message, ConsoleHost, RequestView};

fn fragment(markup: Markup) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(markup.into_string())
}

/// Launch the job of a subscription, answering with the notification.
#[post("/fragments/build/{subscription}")]
pub async fn build_fragment(
    req: HttpRequest,
    path: web::Path<i64>,
    pool: web::Data<Pool<SqliteConnectionManager>>,
    plugin: web::Data<TravisPlugin>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let messages = Messages::for_request(&req, config.default_locale);
    let (record, parameters) = {
        let conn = pool.get()?;
        let record = SubscriptionRecord::get_by_id(id, &conn)?
            .ok_or_else(|| AppError::NotFound(format!("Subscription {}", id)))?;
        (record, subscription_parameters(id, &conn)?)
    };

    let host = ConsoleHost::new(messages, &record.pkey, &record.node_id).with_subscriptions(vec![
        Subscription {
            id,
            parameters,
            ..Default::default()
        },
    ]);
    let request_view = RequestView::new(host, &plugin, messages, &config.styles);

    let markup = match request_view.view.service_build_travis_build(id).await {
        Ok(()) => html! {
            @for message in request_view.notifier.take() {
                div.alert.alert-success { (message) }
            }
        },
        Err(e) => {
            log::warn!("Build of subscription {} failed: {}", id, e);
            html! {
                div.alert.alert-danger { (error_message(&messages, &e)) }
            }
        }
    };
    Ok(fragment(markup))
}

/// Feedback on the name of a job to create, once the check is over.
#[post("/fragments/validate-job")]
pub async fn validate_job_fragment(
    req: HttpRequest,
    plugin: web::Data<TravisPlugin>,
    config: web::Data<Config>,
    form: web::Form<HashMap<String, String>>,
) -> AppResult<HttpResponse> {
    let messages = Messages::for_request(&req, config.default_locale);
    let field = |name: &str| form.get(name).map(String::as_str).unwrap_or_default();

    let host = ConsoleHost::new(messages, field("project"), field("node"));
    let RequestView {
        view, mut events, ..
    } = RequestView::new(host, &plugin, messages, &config.styles);
    view.validate_job_create_mode(field(PARAMETER_JOB));
    // Only a pending lookup keeps the channel open from now on
    drop(view);

    let mut outcome = None;
    while let Some(event) = events.recv().await {
        if event.is_final() {
            outcome = Some(event);
            break;
        }
    }

    let markup = match outcome {
        Some(ValidationEvent::Error(error)) => html! {
            span.text-danger { i class=(config.styles.named("times")) {} " " (validation_message(&messages, &error)) }
        },
        Some(ValidationEvent::Success(_)) => html! {
            span.text-success { i class=(config.styles.named("check")) {} }
        },
        _ => html! {},
    };
    Ok(fragment(markup))
}

/// Options of a job selector, searched on the node of the form.
#[get("/fragments/job-options")]
pub async fn job_options_fragment(
    plugin: web::Data<TravisPlugin>,
    query: web::Query<HashMap<String, String>>,
) -> AppResult<HttpResponse> {
    let get = |name: &str| query.get(name).map(String::as_str).unwrap_or_default();
    let endpoint = get("endpoint");
    if endpoint != format!("{}/", URL) && endpoint != format!("{}/template/", URL) {
        return Err(AppError::InvalidInput(format!("Unknown endpoint {}", endpoint)));
    }

    let criteria = get(get("parameter")).trim();
    let jobs = if criteria.is_empty() {
        Vec::new()
    } else {
        plugin.find_all_by_name(get("node"), criteria).await?
    };

    Ok(fragment(html! {
        @for job in &jobs {
            option value=(job.id) { (job.name) }
        }
    }))
}
