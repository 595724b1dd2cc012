use crate::prelude::*;
use crate::travis::{Job, TravisPlugin};

/// Jobs whose name matches the criteria, used by the template-job selector.
#[get("/rest/service/build/travis/template/{node}/{criteria}")]
pub async fn find_templates_by_name(
    plugin: web::Data<TravisPlugin>,
    path: web::Path<(String, String)>,
) -> AppResult<Json<Vec<Job>>> {
    let (node, criteria) = path.into_inner();
    Ok(Json(plugin.find_all_by_name(&node, &criteria).await?))
}

/// One job of the node. The id is a repository slug and may contain a slash.
#[get("/rest/service/build/travis/{node}/job/{id:.*}")]
pub async fn find_job_by_id(
    plugin: web::Data<TravisPlugin>,
    path: web::Path<(String, String)>,
) -> AppResult<Json<Job>> {
    let (node, id) = path.into_inner();
    Ok(Json(plugin.find_by_id(&node, &id).await?))
}

#[get("/rest/service/build/travis/{node}/{criteria}")]
pub async fn find_jobs_by_name(
    plugin: web::Data<TravisPlugin>,
    path: web::Path<(String, String)>,
) -> AppResult<Json<Vec<Job>>> {
    let (node, criteria) = path.into_inner();
    Ok(Json(plugin.find_all_by_name(&node, &criteria).await?))
}

/// Launch the job of the subscription.
#[post("/rest/service/build/travis/build/{subscription}")]
pub async fn build(
    plugin: web::Data<TravisPlugin>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let subscription = path.into_inner();
    log::info!("Request to build the job of subscription {}", subscription);
    plugin.build(subscription).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the plugin endpoints, most specific paths first.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(build)
        .service(find_templates_by_name)
        .service(find_job_by_id)
        .service(find_jobs_by_name);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::node::Node;
    use crate::db::parameter_value::set_node_parameter;
    use crate::db::testing::memory_pool;
    use crate::travis::mock;
    use actix_web::{http::StatusCode, test, App};

    const NODE: &str = "service:build:travis:bpr";

    fn plugin_for(travis: &mock::MockTravis) -> AppResult<TravisPlugin> {
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
        drop(conn);
        Ok(TravisPlugin::new(pool))
    }

    #[actix_web::test]
    async fn job_lookup_answers_found_and_not_found() -> AppResult<()> {
        let travis = mock::start(|cfg| {
            cfg.route("/repos/ligoj/plugin-vm-google", mock::ok(mock::REPO_PASSED));
        });
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(plugin_for(&travis)?))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/rest/service/build/travis/service:build:travis:bpr/job/ligoj/plugin-vm-google")
            .to_request();
        let job: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(job["name"], "ligoj/plugin-vm-google");
        assert_eq!(job["status"], "blue");

        let req = test::TestRequest::get()
            .uri("/rest/service/build/travis/service:build:travis:bpr/job/crm-42")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(
            body["errors"]["service:build:travis:job"][0]["rule"],
            "travis-job"
        );

        travis.stop().await;
        Ok(())
    }

    #[actix_web::test]
    async fn search_routes_share_the_same_results() -> AppResult<()> {
        let travis = mock::start(|cfg| {
            cfg.route("/repos", mock::search("ligo"));
        });
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(plugin_for(&travis)?))
                .configure(configure),
        )
        .await;

        for uri in [
            "/rest/service/build/travis/service:build:travis:bpr/ligo",
            "/rest/service/build/travis/template/service:build:travis:bpr/ligo",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let jobs: Vec<serde_json::Value> = test::call_and_read_body_json(&app, req).await;
            assert_eq!(jobs.len(), 5, "{}", uri);
        }

        travis.stop().await;
        Ok(())
    }

    #[actix_web::test]
    async fn build_of_unknown_subscription_is_not_found() -> AppResult<()> {
        let travis = mock::start(|_| {});
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(plugin_for(&travis)?))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/rest/service/build/travis/build/42")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        travis.stop().await;
        Ok(())
    }
}
