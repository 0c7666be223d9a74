//! Workflow-platform (FireCloud orchestration API) smoke check.
//!
//! An anonymous submission must be turned away with `401 Unauthorized`.
//! Anything else means the API is down, misrouted, or accepting
//! unauthenticated work.

use serde::Serialize;

use crate::http::{HttpClient, Method, RequestError};
use crate::retry::{run_with_retry_using, RetryPolicy, Sleeper};

pub const DEFAULT_WORKFLOW_URL: &str = "https://api.firecloud.org/api";

/// Text the platform puts in the body of a rejected request.
pub const UNAUTHORIZED_MARKER: &str = "401 Unauthorized";

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("{url} answered 401 without {marker:?} in the body: {body}")]
    MissingMarker {
        url: String,
        marker: &'static str,
        body: String,
    },
}

/// Body of `POST /workspaces/{namespace}/{name}/submissions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub method_configuration_namespace: String,
    pub method_configuration_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    pub use_call_cache: bool,
}

impl Submission {
    /// Placeholder submission with no entity, call caching on.
    pub fn placeholder(config_namespace: &str, config_name: &str) -> Self {
        Self {
            method_configuration_namespace: config_namespace.to_string(),
            method_configuration_name: config_name.to_string(),
            entity_type: None,
            entity_name: None,
            expression: None,
            use_call_cache: true,
        }
    }
}

pub fn submissions_path(namespace: &str, workspace: &str) -> String {
    format!("/workspaces/{}/{}/submissions", namespace, workspace)
}

/// POST `submission` with no credentials and require a 401 whose body
/// carries [`UNAUTHORIZED_MARKER`].
///
/// `client` must not carry a bearer token. Statuses other than 401 come back
/// as [`RequestError::UnexpectedStatus`] and are retried per `policy`.
pub fn check_submission_unauthorized<S>(
    client: &HttpClient,
    namespace: &str,
    workspace: &str,
    submission: &Submission,
    policy: &RetryPolicy,
    sleeper: &S,
) -> Result<(), WorkflowError>
where
    S: Sleeper + ?Sized,
{
    let path = submissions_path(namespace, workspace);
    let body = serde_json::to_value(submission).map_err(|source| RequestError::Encode {
        method: Method::Post.as_str().into(),
        url: path.clone(),
        source,
    })?;

    let resp = run_with_retry_using(policy, sleeper, "workflow: anonymous submission", || {
        client
            .request(Method::Post, &path, &[], Some(&body))?
            .expect_status(401)
    })?;

    let text = resp.text();
    if !text.contains(UNAUTHORIZED_MARKER) {
        return Err(WorkflowError::MissingMarker {
            url: resp.url,
            marker: UNAUTHORIZED_MARKER,
            body: text,
        });
    }
    tracing::info!("anonymous submission to {} rejected as expected", resp.url);
    Ok(())
}
