use crate::config::NodeSeed;
use crate::db::node::Node;
use crate::db::parameter_value::{node_parameters, set_node_parameter};
use crate::db::project::{Project, ProjectEgg};
use crate::db::subscription::{SubscriptionEgg, SubscriptionRecord};
use crate::metrics;
use crate::prelude::*;
use crate::travis::plugin::{NodeStatus, SubscriptionStatusWithData};
use crate::travis::{
    TravisPlugin, PARAMETER_TOKEN, PARAMETER_URL, PARAMETER_URL_SITE, PARAMETER_USER,
};
use crate::view::ConfigurationMode;

/// A subscription of a project to a node.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionRequest {
    /// Key of the subscribing project
    pub project: String,
    pub node: String,
    #[serde(default)]
    pub mode: ConfigurationMode,
    /// The subscription's own parameters, overlaid on the node's
    #[serde(default)]
    pub parameters: Parameters,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeRequest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parameters: Parameters,
}

impl From<&NodeSeed> for NodeRequest {
    fn from(seed: &NodeSeed) -> Self {
        let mut parameters = Parameters::from([
            (PARAMETER_URL.to_string(), seed.url_api.clone()),
            (PARAMETER_URL_SITE.to_string(), seed.url_site.clone()),
            (PARAMETER_TOKEN.to_string(), seed.api_token.clone()),
        ]);
        if let Some(user) = &seed.user {
            parameters.insert(PARAMETER_USER.to_string(), user.clone());
        }
        NodeRequest {
            id: seed.id.clone(),
            name: "Travis CI".to_string(),
            parameters,
        }
    }
}

/// Create or update a node and its parameters.
pub fn register_node(
    node: &NodeRequest,
    conn: &PooledConnection<SqliteConnectionManager>,
) -> AppResult<()> {
    Node {
        id: node.id.clone(),
        name: node.name.clone(),
    }
    .upsert(conn)?;
    for (parameter, data) in &node.parameters {
        set_node_parameter(&node.id, parameter, data, conn)?;
    }
    log::info!(
        "Registered node {} with {} parameters",
        node.id,
        node.parameters.len()
    );
    Ok(())
}

/// Validate then record a subscription.
///
/// In link mode the job must exist. In create mode its name must match the
/// project key and no job may have it yet.
pub async fn subscribe(
    pool: &Pool<SqliteConnectionManager>,
    request: &SubscriptionRequest,
) -> AppResult<i64> {
    let (project, mut parameters) = {
        let conn = pool.get()?;
        let project = Project::get_by_pkey(&request.project, &conn)?
            .ok_or_else(|| AppError::NotFound(format!("Project {}", request.project)))?;
        if Node::get_by_id(&request.node, &conn)?.is_none() {
            return Err(AppError::NotFound(format!("Node {}", request.node)));
        }
        (project, node_parameters(&request.node, &conn)?)
    };
    parameters.extend(request.parameters.clone());

    match request.mode {
        ConfigurationMode::Link => {
            TravisPlugin::link(&parameters).await?;
        }
        ConfigurationMode::Create => TravisPlugin::create(&project.pkey, &parameters).await?,
    }

    let conn = pool.get()?;
    let id = SubscriptionRecord::insert(
        &SubscriptionEgg {
            project_id: project.id,
            node_id: &request.node,
            parameters: &request.parameters,
        },
        &conn,
    )?;
    log::info!(
        "Subscribed project {} to {} as subscription {}",
        project.pkey,
        request.node,
        id
    );
    Ok(id)
}

#[post("/rest/subscription")]
pub async fn create_subscription(
    pool: web::Data<Pool<SqliteConnectionManager>>,
    request: Json<SubscriptionRequest>,
) -> AppResult<Json<i64>> {
    Ok(Json(subscribe(&pool, &request).await?))
}

/// Status of a subscription with its live job data.
#[get("/rest/subscription/{id}/status")]
pub async fn subscription_status(
    plugin: web::Data<TravisPlugin>,
    path: web::Path<i64>,
) -> AppResult<Json<SubscriptionStatusWithData>> {
    let subscription = path.into_inner();
    let parameters = plugin.subscription_parameters(subscription)?;
    let status = TravisPlugin::check_subscription_status(&parameters).await;
    metrics::record_subscription_up(subscription, status.is_ok());
    Ok(Json(status?))
}

#[post("/rest/project")]
pub async fn create_project(
    pool: web::Data<Pool<SqliteConnectionManager>>,
    egg: Json<ProjectEgg>,
) -> AppResult<Json<Project>> {
    let conn = pool.get()?;
    Ok(Json(Project::upsert(&egg, &conn)?))
}

#[put("/rest/node")]
pub async fn save_node(
    pool: web::Data<Pool<SqliteConnectionManager>>,
    request: Json<NodeRequest>,
) -> AppResult<HttpResponse> {
    let conn = pool.get()?;
    register_node(&request, &conn)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Whether the Travis server of the node answers.
#[get("/rest/node/{node}/status")]
pub async fn node_status(
    plugin: web::Data<TravisPlugin>,
    path: web::Path<String>,
) -> AppResult<Json<NodeStatus>> {
    let parameters = plugin.node_parameters(&path)?;
    let up = TravisPlugin::check_status(&parameters).await?;
    Ok(Json(if up { NodeStatus::Up } else { NodeStatus::Down }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(create_subscription)
        .service(subscription_status)
        .service(create_project)
        .service(save_node)
        .service(node_status);
}
