use axum::{
    Json,
    body::Body,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::Deserialize;

use crate::config::API_CACHE_CONTROL;
use crate::dataset::Payload;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CompaniesQuery {
    #[serde(default)]
    pub city: Option<String>,
}

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "companies": state.dataset.len(),
        "with_coordinates": state.dataset.with_coordinates(),
    }))
}

/// Active organizations with coordinates, optionally narrowed to a city.
pub async fn get_companies(
    State(state): State<AppState>,
    Query(query): Query<CompaniesQuery>,
    headers: HeaderMap,
) -> Response {
    let city = query
        .city
        .as_deref()
        .map(str::trim)
        .filter(|city| !city.is_empty());

    let Some(city) = city else {
        return payload_response(state.dataset.located(), &headers);
    };

    match state.dataset.located_in_city(city) {
        Ok(payload) => payload_response(&payload, &headers),
        Err(e) => {
            tracing::error!(error = %e, city, "failed to encode city-filtered companies");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Every active organization, including ones not yet geocoded.
pub async fn get_all_companies(State(state): State<AppState>, headers: HeaderMap) -> Response {
    payload_response(state.dataset.all(), &headers)
}

fn payload_response(payload: &Payload, headers: &HeaderMap) -> Response {
    if if_none_match_matches(headers, &payload.etag) {
        return not_modified_response(API_CACHE_CONTROL, Some(&payload.etag));
    }
    json_bytes_response(payload.body.clone(), API_CACHE_CONTROL, Some(&payload.etag))
}

fn json_bytes_response(body: Bytes, cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn not_modified_response(cache_control: &'static str, etag: Option<&str>) -> Response {
    let mut response = StatusCode::NOT_MODIFIED.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(cache_control),
    );
    if let Some(etag) = etag
        && let Ok(etag_header) = HeaderValue::from_str(etag)
    {
        headers.insert(header::ETAG, etag_header);
    }
    response
}

fn normalize_etag(candidate: &str) -> &str {
    candidate.strip_prefix("W/").unwrap_or(candidate).trim()
}

fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    let Some(value) = headers.get(header::IF_NONE_MATCH) else {
        return false;
    };
    let Ok(raw) = value.to_str() else {
        return false;
    };

    raw.split(',').any(|candidate| {
        let candidate = candidate.trim();
        candidate == "*" || normalize_etag(candidate) == normalize_etag(etag)
    })
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use axum::body::to_bytes;
    use axum::http::{HeaderMap, HeaderValue, Request, StatusCode, header};
    use tower::ServiceExt;

    use super::if_none_match_matches;
    use crate::app::build_app;
    use crate::dataset::fixtures;
    use crate::state::AppState;
    use techmap_shared::Entity;

    fn app() -> axum::Router {
        build_app(
            AppState::new(fixtures::dataset()),
            Path::new("target/techmap-no-static-dir"),
        )
    }

    async fn get(uri: &str, if_none_match: Option<&str>) -> axum::response::Response {
        let mut request = Request::builder()
            .uri(uri)
            .header(header::ORIGIN, "https://partner.example.al");
        if let Some(tag) = if_none_match {
            request = request.header(header::IF_NONE_MATCH, tag);
        }
        app()
            .oneshot(request.body(axum::body::Body::empty()).expect("request"))
            .await
            .expect("router is infallible")
    }

    async fn entity_ids(response: axum::response::Response) -> Vec<u64> {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let entities: Vec<Entity> = serde_json::from_slice(&body).expect("json array");
        entities.into_iter().map(|e| e.id).collect()
    }

    #[test]
    fn if_none_match_handles_lists_weak_tags_and_wildcard() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::IF_NONE_MATCH,
            HeaderValue::from_static("\"other\", W/\"abc\""),
        );
        assert!(if_none_match_matches(&headers, "\"abc\""));
        assert!(!if_none_match_matches(&headers, "\"def\""));

        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("*"));
        assert!(if_none_match_matches(&headers, "\"anything\""));

        assert!(!if_none_match_matches(&HeaderMap::new(), "\"abc\""));
    }

    #[tokio::test]
    async fn companies_serves_located_entities_with_cors() {
        let response = get("/techmap/api/companies", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE),
            Some(&HeaderValue::from_static("application/json"))
        );
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("*"))
        );
        assert!(response.headers().contains_key(header::ETAG));
        assert_eq!(entity_ids(response).await, vec![1, 2]);
    }

    #[tokio::test]
    async fn companies_filters_by_city() {
        let response = get("/techmap/api/companies?city=durr", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(entity_ids(response).await, vec![2]);

        let response = get("/techmap/api/companies?city=%20%20", None).await;
        assert_eq!(entity_ids(response).await, vec![1, 2]);
    }

    #[tokio::test]
    async fn all_companies_includes_unlocated_but_not_inactive() {
        let response = get("/techmap/api/companies/all", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(entity_ids(response).await, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn matching_etag_yields_not_modified() {
        let first = get("/techmap/api/companies", None).await;
        let etag = first
            .headers()
            .get(header::ETAG)
            .and_then(|v| v.to_str().ok())
            .expect("etag header")
            .to_string();

        let second = get("/techmap/api/companies", Some(&etag)).await;
        assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
        let body = to_bytes(second.into_body(), usize::MAX)
            .await
            .expect("read body");
        assert!(body.is_empty());

        let all = get("/techmap/api/companies/all", Some(&etag)).await;
        assert_eq!(all.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_reports_counts() {
        let response = get("/api/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let value: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(value["status"], "ok");
        assert_eq!(value["companies"], 3);
        assert_eq!(value["with_coordinates"], 2);
    }

    #[tokio::test]
    async fn unknown_paths_fall_through_to_static_files() {
        let response = get("/does-not-exist.txt", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
