use super::Bundle;

/// Base bundle, also the fallback of every other locale.
pub const BUNDLE: Bundle = Bundle {
    messages: &[
        ("service:build:travis:job", "Job"),
        ("service:build:travis:job-description", "Travis repository slug, for instance owner/repository"),
        ("service:build:travis:template-job", "Template job"),
        ("service:build:travis:url", "URL"),
        ("service:build:travis:url-api", "API URL"),
        (
            "service:build:travis:url-api-description",
            "API endpoint to use, see <a href=\"https://docs.travis-ci.com/api\">docs.travis-ci.com</a>",
        ),
        ("service:build:travis:url-site", "URL"),
        (
            "service:build:travis:url-site-description",
            "Web URL. For open source projects use https://travis-ci.org/",
        ),
        ("service:build:travis:user", "User"),
        ("service:build:travis:api-token", "API Token"),
        (
            "service:build:travis:api-token-description",
            "Run: gem install travis && travis login && travis token",
        ),
        ("service:build:travis:build", "Build"),
        ("service:build:travis:status-blue", "Success"),
        ("service:build:travis:status-yellow", "Unstable"),
        ("service:build:travis:status-disabled", "Unknown"),
        ("service:build:travis:status-red", "Failure"),
        ("service:build:travis:building", "Building"),
        ("service:build:help", "Help"),
        ("travis-build-job-success", "Launching the job {{this}} succeed"),
        (
            "validation-job-name",
            "Must start with {{this}}-, contain only lower case characters, without special characters",
        ),
        ("already-exist", "{{0}} \"{{1}}\" already exists"),
        ("name", "Name"),
        ("description", "Description"),
        ("subscriptions", "Subscriptions"),
        ("subscription-new", "New subscription"),
        ("project", "Project"),
        ("node", "Node"),
        ("save", "Save"),
    ],
    errors: &[
        ("travis-job", "Job not found"),
        ("travis-connection", "Unreachable server"),
        ("travis-login", "Authentication failed"),
        ("travis-rights", "No right to read jobs"),
    ],
    fallback: false,
};
