use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;

use super::common::*;
use crate::scoring::router::{
    clear_inputs_handler, evaluate_handler, score_application_handler, upsert_inputs_handler,
};
use crate::scoring::service::ScorecardService;

#[tokio::test]
async fn evaluate_handler_returns_result_payload() {
    let (service, _repository) = build_service();
    let service = Arc::new(service);

    let response = evaluate_handler(
        State(service),
        Path("SME_DEFAULT".to_string()),
        axum::Json(inputs(&[("RATIO_EXP_AGE_WOE", "0.05")])),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["scenario"], "SME_DEFAULT");
    let probability = payload["probability_of_default"]
        .as_f64()
        .expect("probability is a number");
    assert!(probability > 0.0 && probability < 1.0);
    assert!(payload["details"].as_array().is_some_and(|rows| !rows.is_empty()));
}

#[tokio::test]
async fn evaluate_handler_maps_unknown_scenario_to_not_found() {
    let (service, _repository) = build_service();
    let service = Arc::new(service);

    let response = evaluate_handler(
        State(service),
        Path("MISSING".to_string()),
        axum::Json(inputs(&[])),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .is_some_and(|message| message.contains("MISSING")));
}

#[tokio::test]
async fn evaluate_handler_maps_repository_failure_to_internal_error() {
    let service = Arc::new(ScorecardService::new(Arc::new(UnavailableRepository)));

    let response = evaluate_handler(
        State(service),
        Path("SME_DEFAULT".to_string()),
        axum::Json(inputs(&[])),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn input_staging_roundtrip_through_handlers() {
    let (service, _repository) = build_service();
    let service = Arc::new(service);

    let response = upsert_inputs_handler(
        State(service.clone()),
        Path("app-900".to_string()),
        axum::Json(vec![
            entry("RATIO_EXP_AGE_WOE", "0.05"),
            entry("INDUSTRY_CATG_WOE", "TRADING"),
        ]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["stored"], 2);

    let response = score_application_handler(
        State(service.clone()),
        Path(("app-900".to_string(), "SME_DEFAULT".to_string())),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["scenario"], "SME_DEFAULT");

    let response = clear_inputs_handler(State(service), Path("app-900".to_string())).await;
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["cleared"], 2);
}
