use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use serde::Deserialize;
use tracing::debug;

use super::{RouteError, RouteLeg, RouteProvider};

/// Connection settings for the Mapy.cz REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapySettings {
    pub api_key: String,
    pub base_url: String,
    pub referer: Option<String>,
    pub timeout: Duration,
}

/// Geocodes both addresses and asks for the fastest car route between them.
pub struct MapyClient {
    http: Client,
    settings: MapySettings,
}

impl MapyClient {
    pub fn new(settings: MapySettings) -> Result<Self, RouteError> {
        if settings.api_key.trim().is_empty() {
            return Err(RouteError::NotConfigured("missing Mapy.cz API key".to_string()));
        }

        let mut headers = HeaderMap::new();
        if let Some(referer) = settings.referer.as_deref() {
            let value = HeaderValue::from_str(referer)
                .map_err(|err| RouteError::NotConfigured(format!("invalid referer: {err}")))?;
            headers.insert(REFERER, value);
        }

        let http = Client::builder()
            .timeout(settings.timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| RouteError::NotConfigured(err.to_string()))?;

        Ok(Self { http, settings })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    fn geocode(&self, address: &str) -> Result<(f64, f64), RouteError> {
        debug!(address, "geocoding address");
        let response = self
            .http
            .get(self.endpoint("/v1/geocode"))
            .query(&[
                ("apikey", self.settings.api_key.as_str()),
                ("query", address),
                ("limit", "1"),
            ])
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| RouteError::Transport(err.to_string()))?;
        let body = response
            .text()
            .map_err(|err| RouteError::Transport(err.to_string()))?;

        parse_geocode(address, &body)
    }
}

impl std::fmt::Debug for MapyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapyClient")
            .field("base_url", &self.settings.base_url)
            .field("timeout", &self.settings.timeout)
            .finish_non_exhaustive()
    }
}

impl RouteProvider for MapyClient {
    fn route(&self, start: &str, end: &str) -> Result<RouteLeg, RouteError> {
        let (start_lon, start_lat) = self.geocode(start)?;
        let (end_lon, end_lat) = self.geocode(end)?;

        let start_point = format!("{start_lon},{start_lat}");
        let end_point = format!("{end_lon},{end_lat}");
        debug!(start, end, "requesting route");
        let response = self
            .http
            .get(self.endpoint("/v1/routing/route"))
            .query(&[
                ("apikey", self.settings.api_key.as_str()),
                ("start", start_point.as_str()),
                ("end", end_point.as_str()),
                ("routeType", "car_fast"),
                ("lang", "cs"),
            ])
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| RouteError::Transport(err.to_string()))?;
        let body = response
            .text()
            .map_err(|err| RouteError::Transport(err.to_string()))?;

        parse_route(start, end, &body)
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    items: Vec<GeocodeItem>,
}

#[derive(Debug, Deserialize)]
struct GeocodeItem {
    position: Position,
}

#[derive(Debug, Deserialize)]
struct Position {
    lon: f64,
    lat: f64,
}

#[derive(Debug, Deserialize)]
struct RouteResponse {
    length: Option<f64>,
    duration: Option<f64>,
}

fn parse_geocode(address: &str, body: &str) -> Result<(f64, f64), RouteError> {
    let response: GeocodeResponse =
        serde_json::from_str(body).map_err(|err| RouteError::InvalidResponse(err.to_string()))?;
    response
        .items
        .into_iter()
        .next()
        .map(|item| (item.position.lon, item.position.lat))
        .ok_or_else(|| RouteError::AddressNotFound(address.to_string()))
}

fn parse_route(start: &str, end: &str, body: &str) -> Result<RouteLeg, RouteError> {
    let response: RouteResponse =
        serde_json::from_str(body).map_err(|err| RouteError::InvalidResponse(err.to_string()))?;
    match (response.length, response.duration) {
        (Some(distance_meters), Some(duration_seconds)) => Ok(RouteLeg {
            distance_meters,
            duration_seconds,
        }),
        _ => Err(RouteError::NoRoute {
            start: start.to_string(),
            end: end.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(api_key: &str) -> MapySettings {
        MapySettings {
            api_key: api_key.to_string(),
            base_url: "https://api.mapy.cz/".to_string(),
            referer: Some("https://206cestovne.streamlit.app/".to_string()),
            timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn geocode_takes_first_item() {
        let body = r#"{"items":[{"name":"Kolín","position":{"lon":15.2,"lat":50.02}},{"position":{"lon":1.0,"lat":2.0}}]}"#;
        assert_eq!(parse_geocode("Kolín", body).expect("position"), (15.2, 50.02));
    }

    #[test]
    fn geocode_without_items_is_address_not_found() {
        match parse_geocode("Nowhere 1", r#"{"items":[]}"#) {
            Err(RouteError::AddressNotFound(address)) => assert_eq!(address, "Nowhere 1"),
            other => panic!("expected address not found, got {other:?}"),
        }
    }

    #[test]
    fn route_reads_length_and_duration() {
        let leg = parse_route("A", "B", r#"{"length":66250,"duration":4800,"geometry":{}}"#)
            .expect("route parses");
        assert_eq!(leg.distance_meters, 66_250.0);
        assert_eq!(leg.duration_seconds, 4_800.0);
    }

    #[test]
    fn route_without_length_is_no_route() {
        assert!(matches!(
            parse_route("A", "B", r#"{"duration":10}"#),
            Err(RouteError::NoRoute { .. })
        ));
        assert!(matches!(
            parse_route("A", "B", "<html>"),
            Err(RouteError::InvalidResponse(_))
        ));
    }

    #[test]
    fn client_requires_api_key() {
        assert!(matches!(
            MapyClient::new(settings("  ")),
            Err(RouteError::NotConfigured(_))
        ));
    }

    #[test]
    fn endpoint_joins_base_url() {
        let client = MapyClient::new(settings("secret")).expect("client builds");
        assert_eq!(
            client.endpoint("/v1/geocode"),
            "https://api.mapy.cz/v1/geocode"
        );
    }
}
