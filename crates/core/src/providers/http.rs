use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use super::traits::FundService;
use crate::errors::CoreError;
use crate::models::fund::{Fund, FundPage, FundQuery, HealthStatus, Horizon};
use crate::models::portfolio::{PortfolioRequest, PortfolioSuggestion};
use crate::models::settings::ClientSettings;
use crate::models::stats::FundStats;
use crate::models::trunk::{
    validate_allocation_band, BrainRegistryItem, ContradictionReport, FundCompositeScore,
    TrunkRankingEntry, TrunkRankingQuery, TrunkStats,
};

const SERVICE_NAME: &str = "min-trade";

/// Longest slice of an error body kept in `CoreError::Server` messages.
const MAX_ERROR_BODY: usize = 200;

/// JSON-over-HTTP client for the Min-Trade fund service.
///
/// - `GET  /api/top-week?limit=`
/// - `GET  /api/ranked?target_sri=&horizon=&limit=`
/// - `GET  /api/stats`
/// - `POST /api/portfolio/suggest`
/// - `GET  /api/funds`, `GET /api/funds/{isin}`, `GET /healthz`
/// - `GET  /trunk/ranking`, `/trunk/funds_for_allocation`, `/trunk/brains`,
///   `/trunk/stats`, `/trunk/composite/{fund_id}`, `/trunk/contradictions`
pub struct HttpFundService {
    client: Client,
    settings: ClientSettings,
}

impl HttpFundService {
    pub fn new(settings: ClientSettings) -> Result<Self, CoreError> {
        settings.validate()?;

        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = match settings.request_timeout_secs {
            Some(secs) => builder.timeout(Duration::from_secs(secs)),
            None => builder,
        };
        let client = builder
            .build()
            .map_err(|e| CoreError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CoreError> {
        let url = self.settings.endpoint(path);
        tracing::debug!(%url, "GET");
        let resp = self.client.get(&url).query(query).send().await?;
        decode(path, resp).await
    }

    /// GET `{collection}/{id}`, mapping 404 to `CoreError::NotFound(id)`.
    async fn get_by_id<T: DeserializeOwned>(
        &self,
        collection: &str,
        label: &str,
        id: &str,
    ) -> Result<T, CoreError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(CoreError::ValidationError(format!("{label} must not be empty")));
        }

        let mut url = Url::parse(&self.settings.endpoint(collection))
            .map_err(|e| CoreError::Config(format!("invalid base_url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| CoreError::Config("base_url cannot carry a path".into()))?
            .push(id);

        tracing::debug!(%url, "GET");
        let resp = self.client.get(url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(CoreError::NotFound(id.to_string()));
        }
        decode(collection, resp).await
    }
}

// ── Response handling ───────────────────────────────────────────────

/// FastAPI error body: `{"detail": "..."}`.
#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

async fn decode<T: DeserializeOwned>(path: &str, resp: Response) -> Result<T, CoreError> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(server_error(status, &body));
    }

    serde_json::from_str(&body).map_err(|e| {
        CoreError::MalformedResponse(format!("Unexpected response shape from {path}: {e}"))
    })
}

fn server_error(status: StatusCode, body: &str) -> CoreError {
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string(),
        Err(_) => body.chars().take(MAX_ERROR_BODY).collect(),
    };
    CoreError::Server {
        status: status.as_u16(),
        message,
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl FundService for HttpFundService {
    fn name(&self) -> &str {
        SERVICE_NAME
    }

    async fn get_top_of_week(&self, limit: u32) -> Result<Vec<Fund>, CoreError> {
        self.get_json("/api/top-week", &[("limit", limit.to_string())])
            .await
    }

    async fn get_fundamental_ranking(
        &self,
        target_sri: u8,
        horizon: Horizon,
        limit: u32,
    ) -> Result<Vec<Fund>, CoreError> {
        self.get_json(
            "/api/ranked",
            &[
                ("target_sri", target_sri.to_string()),
                ("horizon", horizon.as_str().to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    async fn get_stats(&self) -> Result<FundStats, CoreError> {
        self.get_json("/api/stats", &[]).await
    }

    async fn suggest_portfolio(
        &self,
        request: &PortfolioRequest,
    ) -> Result<PortfolioSuggestion, CoreError> {
        let path = "/api/portfolio/suggest";
        let url = self.settings.endpoint(path);
        tracing::debug!(
            %url,
            amount = request.amount,
            horizon = %request.horizon,
            target_sri = request.target_sri,
            "POST"
        );
        let resp = self.client.post(&url).json(request).send().await?;
        decode(path, resp).await
    }

    async fn list_funds(&self, query: &FundQuery) -> Result<FundPage, CoreError> {
        query.validate()?;
        self.get_json("/api/funds", &query.to_query_pairs()).await
    }

    async fn get_fund(&self, isin: &str) -> Result<Fund, CoreError> {
        self.get_by_id("/api/funds", "ISIN", isin).await
    }

    async fn health_check(&self) -> Result<HealthStatus, CoreError> {
        self.get_json("/healthz", &[]).await
    }

    async fn get_trunk_ranking(
        &self,
        query: &TrunkRankingQuery,
    ) -> Result<Vec<TrunkRankingEntry>, CoreError> {
        query.validate()?;
        self.get_json("/trunk/ranking", &query.to_query_pairs()).await
    }

    async fn get_funds_for_allocation(
        &self,
        sri_target: u8,
        tolerance: f64,
    ) -> Result<Vec<TrunkRankingEntry>, CoreError> {
        validate_allocation_band(sri_target, tolerance)?;
        self.get_json(
            "/trunk/funds_for_allocation",
            &[
                ("sri_target", sri_target.to_string()),
                ("tolerance", tolerance.to_string()),
            ],
        )
        .await
    }

    async fn list_brains(&self, active_only: bool) -> Result<Vec<BrainRegistryItem>, CoreError> {
        self.get_json("/trunk/brains", &[("active_only", active_only.to_string())])
            .await
    }

    async fn get_trunk_stats(&self) -> Result<TrunkStats, CoreError> {
        self.get_json("/trunk/stats", &[]).await
    }

    async fn get_composite_score(&self, fund_id: &str) -> Result<FundCompositeScore, CoreError> {
        self.get_by_id("/trunk/composite", "fund id", fund_id).await
    }

    async fn get_contradictions(&self) -> Result<ContradictionReport, CoreError> {
        self.get_json("/trunk/contradictions", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_uses_fastapi_detail() {
        let err = server_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":"amount must be positive"}"#,
        );
        match err {
            CoreError::Server { status, message } => {
                assert_eq!(status, 422);
                assert_eq!(message, "amount must be positive");
            }
            other => panic!("expected Server error, got {other:?}"),
        }
    }

    #[test]
    fn server_error_with_structured_detail_keeps_json() {
        let err = server_error(StatusCode::UNPROCESSABLE_ENTITY, r#"{"detail":[{"loc":["body"]}]}"#);
        match err {
            CoreError::Server { message, .. } => assert!(message.contains("loc")),
            other => panic!("expected Server error, got {other:?}"),
        }
    }

    #[test]
    fn server_error_with_empty_body_uses_reason_phrase() {
        let err = server_error(StatusCode::SERVICE_UNAVAILABLE, "");
        assert_eq!(err.to_string(), "Server error (503): Service Unavailable");
        assert!(err.is_retryable());
    }

    #[test]
    fn server_error_truncates_plain_text_body() {
        let body = "x".repeat(1000);
        match server_error(StatusCode::INTERNAL_SERVER_ERROR, &body) {
            CoreError::Server { message, .. } => assert_eq!(message.len(), MAX_ERROR_BODY),
            other => panic!("expected Server error, got {other:?}"),
        }
    }
}
