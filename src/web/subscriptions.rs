use std::collections::HashMap;

use crate::api::{subscribe, SubscriptionRequest};
use crate::config::Config;
use crate::db::node::Node;
use crate::db::parameter_value::subscription_parameters;
use crate::db::project::Project;
use crate::db::subscription::SubscriptionRecord;
use crate::metrics;
use crate::nls::Messages;
use crate::prelude::*;
use crate::travis::plugin::SubscriptionData;
use crate::travis::{TravisPlugin, KEY, PARAMETER_JOB};
use crate::view::{
    ConfigurationMode, FieldValidator, JobStatusView, SelectBinding, Subscription,
    SubscriptionConfiguration,
};
use crate::web::{error_message, header, ConsoleHost, RequestView};

struct Row {
    record: SubscriptionRecord,
    subscription: Subscription,
}

/// Every subscription with the live data of its job. A job that cannot be
/// read is shown without data.
async fn load_rows(pool: &Pool<SqliteConnectionManager>) -> AppResult<Vec<Row>> {
    let records = {
        let conn = pool.get()?;
        SubscriptionRecord::list(&conn)?
            .into_iter()
            .map(|record| -> AppResult<_> {
                let parameters = subscription_parameters(record.id, &conn)?;
                Ok((record, parameters))
            })
            .collect::<AppResult<Vec<_>>>()?
    };

    let statuses = join_all(
        records
            .iter()
            .map(|(_, parameters)| TravisPlugin::check_subscription_status(parameters)),
    )
    .await;

    let rows = records
        .into_iter()
        .zip(statuses)
        .map(|((record, parameters), status)| {
            metrics::record_subscription_up(record.id, status.is_ok());
            let data = match status {
                Ok(status) => status.data,
                Err(e) => {
                    log::warn!("Status of subscription {} unavailable: {}", record.id, e);
                    SubscriptionData::default()
                }
            };
            Row {
                subscription: Subscription {
                    id: record.id,
                    parameters,
                    data,
                },
                record,
            }
        })
        .collect();

    Ok(rows)
}

fn render_row(view: &JobStatusView, row: &Row) -> Markup {
    let subscription = &row.subscription;
    html! {
        tr id=(format!("subscription-{}", subscription.id)) {
            td { (row.record.pkey) }
            td { (row.record.node_id) }
            td { (view.render_key(subscription)) }
            td.features { (view.render_features(subscription)) }
            td { (view.render_details_key(subscription)) }
            td.status { (view.render_details_features(subscription)) }
        }
    }
}

fn page(title: &str, active: &str, messages: &Messages, config: &Config, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(messages.locale().tag()) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                (header::scripts(&config.styles))
            }
            body {
                (header::render(active, messages, &config.styles))
                div class="content" {
                    (content)
                }
            }
        }
    }
}

#[get("/")]
pub async fn subscriptions_page(
    req: HttpRequest,
    pool: web::Data<Pool<SqliteConnectionManager>>,
    plugin: web::Data<TravisPlugin>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let messages = Messages::for_request(&req, config.default_locale);
    let rows = load_rows(&pool).await?;

    let content = html! {
        div id="notifications" {}
        table.subscriptions {
            thead {
                tr {
                    th { (messages.label("project")) }
                    th { (messages.label("node")) }
                    th { (messages.label(PARAMETER_JOB)) }
                    th {}
                    th { (messages.label("name")) }
                    th {}
                }
            }
            tbody {
                @for row in &rows {
                    @let host = ConsoleHost::new(messages, &row.record.pkey, &row.record.node_id)
                        .with_subscriptions(vec![row.subscription.clone()]);
                    (render_row(&RequestView::new(host, &plugin, messages, &config.styles).view, row))
                }
            }
        }
    };

    let markup = page(
        messages.label("subscriptions"),
        "subscriptions",
        &messages,
        &config,
        content,
    );
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(markup.into_string()))
}

/// Element id safe in CSS selectors.
fn dom_id(prefix: &str, parameter: &str) -> String {
    format!("{}-{}", prefix, parameter.replace(':', "-"))
}

fn render_select(binding: &SelectBinding, node: &str, messages: &Messages) -> Markup {
    let list = dom_id("options", &binding.parameter);
    let vals = serde_json::json!({
        "endpoint": binding.endpoint,
        "node": node,
        "parameter": binding.parameter,
    });
    html! {
        div.field {
            label for=(dom_id("field", &binding.parameter)) { (messages.label(&binding.parameter)) }
            input id=(dom_id("field", &binding.parameter))
                name=(binding.parameter)
                list=(list)
                autocomplete="off"
                hx-get="/fragments/job-options"
                hx-trigger="keyup changed delay:300ms"
                hx-target=(format!("#{}", list))
                hx-vals=(vals.to_string());
            datalist id=(list) {}
        }
    }
}

fn render_validated_field(field: &str, validator: FieldValidator, messages: &Messages) -> Markup {
    let endpoint = match validator {
        FieldValidator::JobCreateMode => "/fragments/validate-job",
    };
    let feedback = dom_id("feedback", field);
    html! {
        div.field {
            label for=(dom_id("field", field)) { (messages.label(field)) }
            input id=(dom_id("field", field))
                name=(field)
                autocomplete="off"
                hx-post=(endpoint)
                hx-trigger="keyup changed delay:500ms"
                hx-include="closest form"
                hx-target=(format!("#{}", feedback));
            span.field-feedback id=(feedback) {}
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewSubscriptionQuery {
    project: Option<String>,
    node: Option<String>,
    #[serde(default)]
    mode: ConfigurationMode,
}

/// Form subscribing a project to a Travis job, existing or to create.
#[get("/subscriptions/new")]
pub async fn new_subscription_page(
    req: HttpRequest,
    query: web::Query<NewSubscriptionQuery>,
    pool: web::Data<Pool<SqliteConnectionManager>>,
    plugin: web::Data<TravisPlugin>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let messages = Messages::for_request(&req, config.default_locale);
    let (projects, nodes) = {
        let conn = pool.get()?;
        (Project::list(&conn)?, Node::list(&conn)?)
    };

    let pkey = query
        .project
        .clone()
        .or_else(|| projects.first().map(|p| p.pkey.clone()))
        .unwrap_or_default();
    let node = query
        .node
        .clone()
        .or_else(|| nodes.first().map(|n| n.id.clone()))
        .unwrap_or_default();

    let request_view = RequestView::new(
        ConsoleHost::new(messages, &pkey, &node),
        &plugin,
        messages,
        &config.styles,
    );
    let mut configuration = SubscriptionConfiguration::new(query.mode);
    request_view
        .view
        .configure_subscription_parameters(&mut configuration);
    let mut validators: Vec<_> = configuration.validators.iter().collect();
    validators.sort_by(|a, b| a.0.cmp(b.0));

    let mode = match query.mode {
        ConfigurationMode::Create => "create",
        ConfigurationMode::Link => "link",
    };
    let content = html! {
        h1 { (messages.label("subscription-new")) }
        div.modes {
            @for (value, label) in [("link", "Link"), ("create", "Create")] {
                a href=(format!("/subscriptions/new?mode={}", value))
                    class=(if value == mode { "mode active" } else { "mode" }) { (label) }
                " "
            }
        }
        form method="post" action="/subscriptions" {
            input type="hidden" name="mode" value=(mode);
            div.field {
                label for="project" { (messages.label("project")) }
                select id="project" name="project" {
                    @for project in &projects {
                        option value=(project.pkey) selected[project.pkey == pkey] { (project.name) }
                    }
                }
            }
            div.field {
                label for="node" { (messages.label("node")) }
                select id="node" name="node" {
                    @for n in &nodes {
                        option value=(n.id) selected[n.id == node] { (n.name) }
                    }
                }
            }
            @for binding in &configuration.selects {
                (render_select(binding, &node, &messages))
            }
            @for (field, validator) in validators {
                (render_validated_field(field, *validator, &messages))
            }
            button type="submit" { (messages.label("save")) }
        }
    };

    let markup = page(
        messages.label("subscription-new"),
        "new",
        &messages,
        &config,
        content,
    );
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(markup.into_string()))
}

/// Record the subscription of the form, back to the list when it is valid.
#[post("/subscriptions")]
pub async fn create_subscription_form(
    req: HttpRequest,
    pool: web::Data<Pool<SqliteConnectionManager>>,
    config: web::Data<Config>,
    form: web::Form<HashMap<String, String>>,
) -> AppResult<HttpResponse> {
    let messages = Messages::for_request(&req, config.default_locale);
    let mut fields = form.into_inner();
    let project = fields.remove("project").unwrap_or_default();
    let node = fields.remove("node").unwrap_or_default();
    let mode = match fields.remove("mode").as_deref() {
        Some("create") => ConfigurationMode::Create,
        _ => ConfigurationMode::Link,
    };
    fields.retain(|parameter, value| parameter.starts_with(KEY) && !value.is_empty());

    let request = SubscriptionRequest {
        project,
        node,
        mode,
        parameters: fields,
    };
    match subscribe(&pool, &request).await {
        Ok(_) => Ok(HttpResponse::SeeOther()
            .insert_header((actix_web::http::header::LOCATION, "/"))
            .finish()),
        Err(e @ (AppError::Validation(_) | AppError::NotFound(_) | AppError::Travis(_))) => {
            log::warn!("Subscription of {} refused: {}", request.project, e);
            let content = html! {
                div.alert.alert-danger { (error_message(&messages, &e)) }
                a href="/subscriptions/new" { (messages.label("subscription-new")) }
            };
            let markup = page(
                messages.label("subscription-new"),
                "new",
                &messages,
                &config,
                content,
            );
            Ok(HttpResponse::BadRequest()
                .content_type("text/html; charset=utf-8")
                .body(markup.into_string()))
        }
        Err(e) => Err(e),
    }
}
