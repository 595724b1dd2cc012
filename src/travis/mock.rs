//! A local stand-in for the Travis API, serving canned responses.

use std::collections::HashMap;

use actix_web::{dev::ServerHandle, web, App, HttpResponse, HttpServer, Route};

use crate::db::Parameters;
use crate::travis::{PARAMETER_TOKEN, PARAMETER_URL, PARAMETER_URL_SITE};

pub const DESCRIPTION: &str =
    "Ligoj plugin for Google instance life cycle management : scheduled ON/OFF";

pub const REPO_PASSED: &str = r#"{
  "repo": {
    "id": 11950284,
    "slug": "ligoj/plugin-vm-google",
    "active": true,
    "description": "Ligoj plugin for Google instance life cycle management : scheduled ON/OFF",
    "last_build_id": 274572860,
    "last_build_number": "12",
    "last_build_state": "passed",
    "last_build_duration": 242,
    "last_build_language": null,
    "last_build_started_at": "2017-09-01T09:12:45Z",
    "last_build_finished_at": "2017-09-01T09:16:47Z",
    "github_language": "Java"
  }
}"#;

pub const REPO_STARTED: &str = r#"{
  "repo": {
    "id": 11950284,
    "slug": "ligoj/plugin-vm-google",
    "active": true,
    "description": "Ligoj plugin for Google instance life cycle management : scheduled ON/OFF",
    "last_build_id": 274572999,
    "last_build_number": "13",
    "last_build_state": "started",
    "last_build_duration": null,
    "last_build_started_at": "2017-09-02T10:00:00Z",
    "last_build_finished_at": null,
    "github_language": "Java"
  }
}"#;

pub const REPO_NO_BUILD: &str = r#"{
  "repo": {
    "id": 11950284,
    "slug": "ligoj/plugin-vm-google",
    "active": true,
    "description": "Ligoj plugin for Google instance life cycle management : scheduled ON/OFF",
    "last_build_id": null,
    "last_build_number": null,
    "last_build_state": null,
    "github_language": "Java"
  }
}"#;

pub const REPOS_SEARCH: &str = r#"{
  "repos": [
    { "id": 1, "slug": "ligoj/ligoj", "description": "Ligoj core", "last_build_id": 1001, "last_build_state": "failed" },
    { "id": 2, "slug": "ligoj/plugin-vm-aws", "description": "Ligoj plugin for AWS EC2 instance life cycle management : scheduled ON/OFF", "last_build_id": 1002, "last_build_state": "passed" },
    { "id": 3, "slug": "ligoj/plugin-vm-google", "description": "Ligoj plugin for Google instance life cycle management : scheduled ON/OFF", "last_build_id": 274572860, "last_build_state": "passed" },
    { "id": 4, "slug": "ligoj/plugin-build-travis", "description": null, "last_build_id": 1004, "last_build_state": "started" },
    { "id": 5, "slug": "ligoj/plugin-vm", "description": "VM plugin", "last_build_id": null, "last_build_state": null }
  ]
}"#;

pub const CONFIG: &str = r#"{"config":{"host":"travis-ci.org","shorten_host":"trvs.io","assets":{"host":"travis-ci.org"},"pusher":{"key":"5df8ac576dcccf4fd076"},"github":{"api_url":"https://api.github.com","scopes":["read:org","user:email","repo_deployment","repo:status","write:repo_hook"]}}}"#;

/// Answer GET requests with a JSON body.
pub fn ok(body: &'static str) -> Route {
    web::get().to(move || async move {
        HttpResponse::Ok()
            .content_type("application/json")
            .body(body)
    })
}

/// Answer any request with a bare status.
pub fn status(code: u16) -> Route {
    web::route().to(move || async move {
        HttpResponse::build(
            actix_web::http::StatusCode::from_u16(code)
                .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR),
        )
        .finish()
    })
}

/// The search endpoint, matching the query the plugin sends.
pub fn search(expected: &'static str) -> Route {
    web::get().to(move |query: web::Query<HashMap<String, String>>| async move {
        let matches = query.get("search").map(String::as_str) == Some(expected)
            && query.get("orderBy").map(String::as_str) == Some("name")
            && query.get("limit").map(String::as_str) == Some("10");
        if matches {
            HttpResponse::Ok()
                .content_type("application/json")
                .body(REPOS_SEARCH)
        } else {
            HttpResponse::BadRequest().finish()
        }
    })
}

pub struct MockTravis {
    pub url: String,
    handle: ServerHandle,
}

impl MockTravis {
    /// Node parameters pointing at this server.
    pub fn parameters(&self) -> Parameters {
        Parameters::from([
            (PARAMETER_URL.to_string(), self.url.clone()),
            (PARAMETER_TOKEN.to_string(), "token".to_string()),
            (
                PARAMETER_URL_SITE.to_string(),
                "https://travis-ci.org/".to_string(),
            ),
        ])
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

/// Start a server on an ephemeral port with the routes `configure` adds.
#[allow(clippy::expect_used)]
pub fn start<F>(configure: F) -> MockTravis
where
    F: Fn(&mut web::ServiceConfig) + Send + Clone + 'static,
{
    let server = HttpServer::new(move || App::new().configure(configure.clone()))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind mock Travis server");
    let address = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_web::rt::spawn(server);

    MockTravis {
        url: format!("http://{}/", address),
        handle,
    }
}
