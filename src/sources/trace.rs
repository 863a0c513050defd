use http::Extensions;
use reqwest::Url;
use reqwest_middleware::{Middleware, Next};
use tokio::time::Instant;
use tracing::{debug, warn};

/// Logs every upstream call with its status and latency.
#[derive(Clone, Debug, Default)]
pub(crate) struct UpstreamTraceMiddleware;

impl UpstreamTraceMiddleware {
    pub(crate) fn new() -> Self {
        Self
    }
}

/// Renders a URL for logs with credential-bearing query values masked.
pub(crate) fn redacted_url(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == "api_key") {
        return url.to_string();
    }

    let mut out = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "api_key" {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    out.query_pairs_mut().clear().extend_pairs(pairs);
    out.to_string()
}

#[async_trait::async_trait]
impl Middleware for UpstreamTraceMiddleware {
    async fn handle(
        &self,
        req: reqwest::Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<reqwest::Response> {
        let method = req.method().clone();
        let url = redacted_url(req.url());
        let start = Instant::now();

        let result = next.run(req, extensions).await;
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &result {
            Ok(resp) => debug!(
                %method,
                url = %url,
                status = resp.status().as_u16(),
                elapsed_ms,
                "upstream response"
            ),
            Err(err) => warn!(%method, url = %url, elapsed_ms, error = %err, "upstream request failed"),
        }
        result
    }
}
