//! CARE REST API client.

use crate::error::ApiResult;
use crate::{base_url, ensure_success, USER_AGENT};
use async_trait::async_trait;
use desk_core::query::QueryParams;
use desk_core::remote::{CareApi, Facility, GeographyNode, PatientPage};
use desk_core::{DeskConfig, DeskResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Paginated list envelope used by the CARE list endpoints.
#[derive(Deserialize)]
struct Paginated<T> {
    results: Vec<T>,
}

#[derive(Clone, Debug)]
pub struct CareClient {
    http: reqwest::Client,
    base: Url,
    access_token: Option<String>,
}

impl CareClient {
    pub fn new(cfg: &DeskConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base: base_url(cfg.api_base_url()),
            access_token: cfg.access_token().map(str::to_string),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<&QueryParams>,
    ) -> ApiResult<T> {
        let mut url = self.base.join(path)?;
        if let Some(params) = params.filter(|p| !p.is_empty()) {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params.iter() {
                pairs.append_pair(key, &value.to_string());
            }
        }

        tracing::debug!(%url, "CARE request");
        let mut request = self.http.get(url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = ensure_success(request.send().await?, path)?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_results<T: DeserializeOwned>(&self, path: &str) -> ApiResult<Vec<T>> {
        let page: Paginated<T> = self.get_json(path, None).await?;
        Ok(page.results)
    }
}

#[async_trait]
impl CareApi for CareClient {
    async fn list_patients(&self, params: &QueryParams) -> DeskResult<PatientPage> {
        Ok(self.get_json("api/v1/patient/", Some(params)).await?)
    }

    async fn list_states(&self) -> DeskResult<Vec<GeographyNode>> {
        Ok(self.get_results("api/v1/state/").await?)
    }

    async fn districts_by_state(&self, state_id: i64) -> DeskResult<Vec<GeographyNode>> {
        let path = format!("api/v1/state/{state_id}/districts/");
        Ok(self.get_json(&path, None).await?)
    }

    async fn local_bodies_by_district(&self, district_id: i64) -> DeskResult<Vec<GeographyNode>> {
        let path = format!("api/v1/district/{district_id}/local_bodies/");
        Ok(self.get_json(&path, None).await?)
    }

    async fn wards_by_local_body(&self, local_body_id: i64) -> DeskResult<Vec<GeographyNode>> {
        let path = format!("api/v1/ward/lsg/{local_body_id}/");
        Ok(self.get_results(&path).await?)
    }

    async fn permitted_facilities(&self) -> DeskResult<Vec<Facility>> {
        Ok(self.get_results("api/v1/facility/").await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::serve;
    use axum::extract::{Path, RawQuery};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use desk_core::query::QueryValue;
    use desk_core::DeskError;
    use serde_json::{json, Value};

    fn config(base: Url, token: Option<&str>) -> DeskConfig {
        DeskConfig::new(base, Url::parse("http://pincode.invalid").unwrap())
            .unwrap()
            .with_access_token(token.map(str::to_string))
    }

    async fn echo_patients(headers: HeaderMap, RawQuery(query): RawQuery) -> Json<Value> {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        Json(json!({
            "count": 1,
            "results": [{
                "id": "00000000-0000-0000-0000-000000000001",
                "name": query.unwrap_or_default(),
                "phone_number": auth,
            }]
        }))
    }

    async fn districts(Path(state): Path<i64>) -> Json<Value> {
        Json(json!([{ "id": state * 10, "name": "Ernakulam", "state": state }]))
    }

    fn router() -> Router {
        Router::new()
            .route("/api/v1/patient/", get(echo_patients))
            .route(
                "/api/v1/state/",
                get(|| async {
                    Json(json!({ "count": 1, "results": [{ "id": 1, "name": "Kerala" }] }))
                }),
            )
            .route("/api/v1/state/:id/districts/", get(districts))
            .route(
                "/api/v1/district/:id/local_bodies/",
                get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            )
            .route("/api/v1/facility/", get(|| async { "<html>maintenance</html>" }))
            .route(
                "/api/v1/ward/lsg/:id/",
                get(|| async {
                    Json(json!({
                        "results": [{ "id": 801, "name": "Fort Kochi", "number": 3 }]
                    }))
                }),
            )
    }

    #[tokio::test]
    async fn lists_patients_with_params_and_token() {
        let base = serve(router()).await;
        let client = CareClient::new(&config(base, Some("secret"))).unwrap();

        let mut params = QueryParams::new();
        params.set("name", "asha");
        params.set("page", QueryValue::Number(2));
        params.set("is_active", false);

        let page = client.list_patients(&params).await.unwrap();
        assert_eq!(page.count, 1);
        let row = &page.results[0];
        assert_eq!(row.name, "is_active=false&name=asha&page=2");
        assert_eq!(row.phone_number.as_deref(), Some("Bearer secret"));
    }

    #[tokio::test]
    async fn anonymous_requests_send_no_token() {
        let base = serve(router()).await;
        let client = CareClient::new(&config(base, None)).unwrap();

        let page = client.list_patients(&QueryParams::new()).await.unwrap();
        assert_eq!(page.results[0].name, "");
        assert_eq!(page.results[0].phone_number.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn reads_geography_envelopes() {
        let base = serve(router()).await;
        let client = CareClient::new(&config(base, None)).unwrap();

        let states = client.list_states().await.unwrap();
        assert_eq!(states, vec![GeographyNode::new(1, "Kerala")]);

        let districts = client.districts_by_state(1).await.unwrap();
        assert_eq!(districts[0].id, 10);
        assert_eq!(districts[0].name, "Ernakulam");

        let wards = client.wards_by_local_body(80).await.unwrap();
        assert_eq!(wards[0].name, "Fort Kochi");
    }

    #[tokio::test]
    async fn error_status_becomes_remote_status() {
        let base = serve(router()).await;
        let client = CareClient::new(&config(base, None)).unwrap();

        let err = client.local_bodies_by_district(8).await.unwrap_err();
        match err {
            DeskError::RemoteStatus { status, path } => {
                assert_eq!(status, 500);
                assert_eq!(path, "api/v1/district/8/local_bodies/");
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let base = serve(router()).await;
        let client = CareClient::new(&config(base, None)).unwrap();

        let err = client.permitted_facilities().await.unwrap_err();
        assert!(matches!(err, DeskError::Decode(_)));
    }

    #[tokio::test]
    async fn base_path_is_preserved() {
        let base = serve(Router::new().nest("/care", router())).await;
        let client = CareClient::new(&config(base.join("care").unwrap(), None)).unwrap();
        assert_eq!(client.list_states().await.unwrap().len(), 1);
    }
}
