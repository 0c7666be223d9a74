//! Anonymous workflow submission against a local fake orchestration API.

mod common;

use bdit_core::http::{HttpClient, RequestError};
use bdit_core::retry::FailureMatcher;
use bdit_core::workflow::{check_submission_unauthorized, Submission, WorkflowError};
use common::json_server::{self, Route};
use common::RecordingSleeper;

const SUBMISSIONS: &str = "/workspaces/default/default/submissions";
const REJECTED: &str = r#"{"statusCode":401,"message":"401 Unauthorized"}"#;

fn check(server: &json_server::JsonServer, retries: usize) -> Result<(), WorkflowError> {
    check_submission_unauthorized(
        &HttpClient::new(&server.base_url).unwrap(),
        "default",
        "default",
        &Submission::placeholder("default", "default"),
        &common::instant_policy(retries, FailureMatcher::status_codes([500, 502, 503, 504])),
        &RecordingSleeper::default(),
    )
}

#[test]
fn anonymous_submission_is_rejected() {
    let server = json_server::start(vec![Route::new("POST", SUBMISSIONS).respond(401, REJECTED)]);

    check(&server, 0).expect("401 with marker");

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].target, SUBMISSIONS);
    assert_eq!(requests[0].header("authorization"), None);
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["methodConfigurationName"], "default");
    assert_eq!(body["useCallCache"], true);
}

#[test]
fn gateway_error_retried_before_rejection() {
    let server = json_server::start(vec![Route::new("POST", SUBMISSIONS)
        .respond(503, "")
        .respond(401, REJECTED)]);

    check(&server, 2).expect("second attempt rejected");
    assert_eq!(server.count("POST", SUBMISSIONS), 2);
}

#[test]
fn accepted_submission_fails_the_check() {
    let server = json_server::start(vec![Route::new("POST", SUBMISSIONS).respond(201, "{}")]);

    match check(&server, 3).unwrap_err() {
        WorkflowError::Request(RequestError::UnexpectedStatus {
            expected, status, ..
        }) => {
            assert_eq!(expected, 401);
            assert_eq!(status, 201);
        }
        other => panic!("expected UnexpectedStatus, got {:?}", other),
    }
    assert_eq!(server.count("POST", SUBMISSIONS), 1, "201 is not a retryable status");
}

#[test]
fn rejection_without_marker_fails_the_check() {
    let server = json_server::start(vec![
        Route::new("POST", SUBMISSIONS).respond(401, r#"{"message":"nope"}"#),
    ]);

    match check(&server, 0).unwrap_err() {
        WorkflowError::MissingMarker { body, .. } => assert!(body.contains("nope")),
        other => panic!("expected MissingMarker, got {:?}", other),
    }
}
