use std::borrow::Cow;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::OpenClinicError;
use crate::utils::serde::StringOrVec;

const OPENFDA_BASE: &str = "https://api.fda.gov";
const OPENFDA_API: &str = "openfda";
const OPENFDA_BASE_ENV: &str = "OPENCLINIC_OPENFDA_BASE";
const OPENFDA_API_KEY_ENV: &str = "OPENFDA_API_KEY";

/// Something that can answer a single openFDA label search expression.
///
/// `Ok(None)` means the expression matched nothing; `Err` is a failed
/// attempt (transport, status, or decoding).
#[async_trait::async_trait]
pub trait LabelSource: Send + Sync {
    async fn first_label(&self, search: &str) -> Result<Option<LabelResult>, OpenClinicError>;
}

pub struct OpenFdaClient {
    client: reqwest_middleware::ClientWithMiddleware,
    base: Cow<'static, str>,
    api_key: Option<String>,
}

impl OpenFdaClient {
    pub fn new(request_timeout: Duration) -> Result<Self, OpenClinicError> {
        Ok(Self {
            client: crate::sources::http_client(request_timeout)?,
            base: crate::sources::env_base(OPENFDA_BASE, OPENFDA_BASE_ENV),
            api_key: std::env::var(OPENFDA_API_KEY_ENV)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }

    #[cfg(test)]
    pub(crate) fn new_for_test(
        base: String,
        api_key: Option<String>,
    ) -> Result<Self, OpenClinicError> {
        Ok(Self {
            client: crate::sources::http_client(Duration::from_secs(5))?,
            base: Cow::Owned(base),
            api_key: api_key
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }

    #[cfg(test)]
    pub(crate) fn new_for_test_with_timeout(
        base: String,
        request_timeout: Duration,
    ) -> Result<Self, OpenClinicError> {
        Ok(Self {
            client: crate::sources::http_client(request_timeout)?,
            base: Cow::Owned(base),
            api_key: None,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.as_ref().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn get_json_optional<T: DeserializeOwned>(
        &self,
        req: reqwest_middleware::RequestBuilder,
    ) -> Result<Option<T>, OpenClinicError> {
        let resp = req.send().await?;
        let status = resp.status();
        let content_type = resp.headers().get(reqwest::header::CONTENT_TYPE).cloned();
        let bytes = crate::sources::read_limited_body(resp, OPENFDA_API).await?;

        // openFDA answers 404 NOT_FOUND when a search matches no documents.
        if status.as_u16() == 404 {
            return Ok(None);
        }

        if !status.is_success() {
            let excerpt = crate::sources::body_excerpt(&bytes);
            return Err(OpenClinicError::Api {
                api: OPENFDA_API.to_string(),
                message: format!("HTTP {status}: {excerpt}"),
            });
        }

        crate::sources::ensure_json_content_type(OPENFDA_API, content_type.as_ref(), &bytes)?;
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| OpenClinicError::ApiJson {
                api: OPENFDA_API.to_string(),
                source,
            })
    }

    /// Runs a raw search expression against `drug/label.json`.
    pub async fn label_search(
        &self,
        search: &str,
        limit: usize,
    ) -> Result<Option<OpenFdaResponse<LabelResult>>, OpenClinicError> {
        let search = search.trim();
        if search.is_empty() {
            return Err(OpenClinicError::InvalidInput(
                "Label search expression is required.".into(),
            ));
        }
        if search.len() > 1024 {
            return Err(OpenClinicError::InvalidInput(
                "Label search expression is too long.".into(),
            ));
        }
        if limit == 0 || limit > 100 {
            return Err(OpenClinicError::InvalidInput(
                "limit must be between 1 and 100".into(),
            ));
        }

        let url = self.endpoint("drug/label.json");
        let mut req = self
            .client
            .get(&url)
            .query(&[("search", search), ("limit", &limit.to_string())]);
        if let Some(key) = self.api_key.as_deref() {
            req = req.query(&[("api_key", key)]);
        }
        self.get_json_optional(req).await
    }
}

#[async_trait::async_trait]
impl LabelSource for OpenFdaClient {
    async fn first_label(&self, search: &str) -> Result<Option<LabelResult>, OpenClinicError> {
        Ok(self
            .label_search(search, 1)
            .await?
            .and_then(|resp| resp.results.into_iter().next()))
    }
}

#[derive(Debug, Deserialize)]
pub struct OpenFdaResponse<T> {
    #[serde(default)]
    pub results: Vec<T>,
}

/// The subset of an openFDA drug label this service reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelResult {
    #[serde(default)]
    pub openfda: Option<LabelOpenFda>,
    #[serde(default)]
    pub indications_and_usage: StringOrVec,
    #[serde(default)]
    pub mechanism_of_action: StringOrVec,
    #[serde(default)]
    pub adverse_reactions: StringOrVec,
    #[serde(default)]
    pub dosage_and_administration: StringOrVec,
    #[serde(default)]
    pub warnings: StringOrVec,
    #[serde(default)]
    pub precautions: StringOrVec,
    #[serde(default)]
    pub contraindications: StringOrVec,
    #[serde(default)]
    pub drug_interactions: StringOrVec,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabelOpenFda {
    #[serde(default)]
    pub brand_name: StringOrVec,
    #[serde(default)]
    pub generic_name: StringOrVec,
    #[serde(default)]
    pub manufacturer_name: StringOrVec,
}
