use crate::infra::{AppService, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use exekutor_cestovne::reimbursement::reimbursement_router;
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_reimbursement_routes(service: Arc<AppService>) -> axum::Router {
    reimbursement_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::ConfiguredRoutes;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use exekutor_cestovne::reimbursement::{
        ReimbursementCalculator, ReimbursementService, StatementComposer, VehicleTable,
    };
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    fn app(ready: bool) -> (axum::Router, Arc<AtomicBool>) {
        let service = Arc::new(ReimbursementService::new(
            Arc::new(ConfiguredRoutes::Unavailable("offline".to_string())),
            VehicleTable::standard(),
            ReimbursementCalculator::default(),
            StatementComposer::default(),
        ));
        let readiness = Arc::new(AtomicBool::new(ready));
        let state = AppState {
            readiness: readiness.clone(),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        };
        (
            with_reimbursement_routes(service).layer(Extension(state)),
            readiness,
        )
    }

    async fn get(router: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let (router, _) = app(false);
        let (status, body) = get(router, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn readiness_follows_the_flag() {
        let (router, readiness) = app(false);
        let (status, body) = get(router.clone(), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "initializing");

        readiness.store(true, Ordering::Release);
        let (status, _) = get(router, "/ready").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn unconfigured_routing_yields_bad_gateway() {
        let (router, _) = app(true);
        let response = router
            .oneshot(
                Request::post("/api/v1/reimbursements")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"destination":"Brno","vehicle":"6AB3517","period":2025}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn manual_measurement_works_without_routing() {
        let (router, _) = app(true);
        let response = router
            .oneshot(
                Request::post("/api/v1/reimbursements")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        r#"{"destination":"Brno","vehicle":"6AB3517","period":"2024",
                            "measurement":{"one_way_km":66.25,"one_way_minutes":80}}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["result"]["total_amount"], 1041);
    }
}
