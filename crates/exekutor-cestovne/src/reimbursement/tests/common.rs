use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::to_bytes;
use axum::response::Response;
use serde_json::Value;

use crate::reimbursement::{
    ReimbursementCalculator, ReimbursementService, StatementComposer, VehicleTable,
};
use crate::routing::{RouteError, RouteLeg, RouteProvider};

pub(super) const KOLIN: &str = "Husova 12, 280 02 Kolín";
pub(super) const BRNO: &str = "Masarykova 1, Brno";

/// 66.25 km and 80 minutes one way.
pub(super) fn kolin_leg() -> RouteLeg {
    RouteLeg {
        distance_meters: 66_250.0,
        duration_seconds: 4_800.0,
    }
}

/// Answers from a fixed table and records every lookup.
#[derive(Debug, Default)]
pub(super) struct FixedRoutes {
    legs: HashMap<String, RouteLeg>,
    calls: Mutex<Vec<(String, String)>>,
}

impl FixedRoutes {
    pub(super) fn with(mut self, destination: &str, leg: RouteLeg) -> Self {
        self.legs.insert(destination.to_string(), leg);
        self
    }

    pub(super) fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().expect("calls mutex").clone()
    }
}

impl RouteProvider for FixedRoutes {
    fn route(&self, start: &str, end: &str) -> Result<RouteLeg, RouteError> {
        self.calls
            .lock()
            .expect("calls mutex")
            .push((start.to_string(), end.to_string()));
        self.legs
            .get(end)
            .copied()
            .ok_or_else(|| RouteError::AddressNotFound(end.to_string()))
    }
}

#[derive(Debug)]
pub(super) struct UnavailableRoutes;

impl RouteProvider for UnavailableRoutes {
    fn route(&self, _start: &str, _end: &str) -> Result<RouteLeg, RouteError> {
        Err(RouteError::Transport("connection refused".to_string()))
    }
}

pub(super) fn service_with<P: RouteProvider + 'static>(
    routes: Arc<P>,
    composer: StatementComposer,
) -> ReimbursementService<P> {
    ReimbursementService::new(
        routes,
        VehicleTable::standard(),
        ReimbursementCalculator::default(),
        composer,
    )
}

pub(super) fn kolin_service() -> (Arc<ReimbursementService<FixedRoutes>>, Arc<FixedRoutes>) {
    let routes = Arc::new(FixedRoutes::default().with(KOLIN, kolin_leg()));
    let service = Arc::new(service_with(routes.clone(), StatementComposer::default()));
    (service, routes)
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
