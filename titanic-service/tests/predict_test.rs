mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use common::{router_with, shipped_router, FailingClassifier, TestApp, TEST_API_KEY};
use serde_json::{json, Value};
use std::sync::Arc;
use titanic_service::dtos::PredictResponse;
use tower::util::ServiceExt;

async fn post_predict(app: Router, api_key: Option<&str>, body: &str) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/predict")
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }

    let response = app
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn third_class_man_did_not_survive() {
    let app = TestApp::spawn().await;

    let response = app
        .post_predict(Some(TEST_API_KEY), r#"{"features":[3,1,22,7.25]}"#)
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: PredictResponse = response.json().await.expect("Failed to parse JSON");
    assert_eq!(
        body,
        PredictResponse {
            prediction: 0,
            survived: "No".to_string()
        }
    );
}

#[tokio::test]
async fn first_class_woman_survived() {
    let (status, body) = post_predict(
        shipped_router(),
        Some(TEST_API_KEY),
        r#"{"features":[1,0,38,71.2833]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "prediction": 1, "survived": "Yes" }));
}

#[tokio::test]
async fn survived_text_always_matches_prediction() {
    let passengers = [
        "[3,1,22,7.25]",
        "[1,0,38,71.2833]",
        "[3,0,26,7.925]",
        "[1,1,54,51.8625]",
        "[3,1,2,21.075]",
        "[2,1,4,23]",
        "[2,0,14,30.0708]",
        "[1,1,11,120]",
    ];

    for features in passengers {
        let (status, body) = post_predict(
            shipped_router(),
            Some(TEST_API_KEY),
            &format!(r#"{{"features":{}}}"#, features),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "features {}", features);
        let prediction = body["prediction"].as_i64().unwrap();
        assert!(prediction == 0 || prediction == 1, "features {}", features);
        let expected = if prediction == 1 { "Yes" } else { "No" };
        assert_eq!(body["survived"], expected, "features {}", features);
    }
}

#[tokio::test]
async fn missing_api_key_is_unauthorized() {
    let app = TestApp::spawn().await;

    let response = app
        .post_predict(None, r#"{"features":[3,1,22,7.25]}"#)
        .await;

    assert_eq!(response.status().as_u16(), 401);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, json!({ "error": "Unauthorized" }));
}

#[tokio::test]
async fn wrong_api_key_is_unauthorized_regardless_of_body() {
    let bodies = [
        r#"{"features":[3,1,22,7.25]}"#,
        r#"{"features":[1,2]}"#,
        "not json at all",
        "",
    ];

    for body in bodies {
        for key in ["123", "test-api-key-12", "test-api-key-1234", ""] {
            let (status, json_body) = post_predict(shipped_router(), Some(key), body).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "key {:?} body {:?}", key, body);
            assert_eq!(json_body["error"], "Unauthorized");
        }
    }
}

#[tokio::test]
async fn wrong_feature_count_is_bad_request() {
    for features in ["[]", "[3]", "[3,1,22]", "[3,1,22,7.25,0]"] {
        let (status, body) = post_predict(
            shipped_router(),
            Some(TEST_API_KEY),
            &format!(r#"{{"features":{}}}"#, features),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "features {}", features);
        assert_eq!(body["error"], "Expected 4 features: [Pclass, Sex, Age, Fare]");
    }
}

#[tokio::test]
async fn missing_features_is_bad_request() {
    for payload in [r#"{}"#, r#"{"features":null}"#, r#"{"feature":[3,1,22,7.25]}"#] {
        let (status, body) = post_predict(shipped_router(), Some(TEST_API_KEY), payload).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
        assert_eq!(body["error"], "Expected 4 features: [Pclass, Sex, Age, Fare]");
    }
}

#[tokio::test]
async fn non_numeric_feature_is_bad_request() {
    let (status, body) = post_predict(
        shipped_router(),
        Some(TEST_API_KEY),
        r#"{"features":[3,"male",22,7.25]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "feature 1 (sex) must be a number");
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let (status, body) =
        post_predict(shipped_router(), Some(TEST_API_KEY), r#"{"features":[3,1,"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid JSON body"));
}

#[tokio::test]
async fn prediction_failure_is_server_error() {
    let app = router_with(Arc::new(FailingClassifier));

    let (status, body) =
        post_predict(app, Some(TEST_API_KEY), r#"{"features":[3,1,22,7.25]}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "Model failed to produce a prediction: estimator is not fitted"
    );
}

#[tokio::test]
async fn numeric_strings_are_not_coerced() {
    let (status, body) = post_predict(
        shipped_router(),
        Some(TEST_API_KEY),
        r#"{"features":["3","1","22","7.25"]}"#,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "feature 0 (pclass) must be a number");
}
