use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tokio_util::task::AbortOnDropHandle;
use tracing::{error, info, warn};

use crate::error::OpenClinicError;
use crate::sources::openfda::{LabelResult, LabelSource};
use crate::transform;
use crate::utils::query::{has_min_chars, sanitize_medicine_name};

const NAME_REQUIRED: &str = "Medicine name is required. Please enter a valid medicine name.";
const NAME_TOO_SHORT: &str = "Medicine name must be at least 2 characters long.";
const SERVICE_INITIALIZING: &str = "Service is initializing. Please try again in a moment.";

/// Remediation hints attached to every not-found response.
pub const NOT_FOUND_SUGGESTIONS: [&str; 3] = [
    "Check the spelling of the medicine name",
    "Try using the generic name instead of brand name (or vice versa)",
    "Use the full medicine name without abbreviations",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineInfo {
    pub name: String,
    pub brand_name: String,
    pub generic_name: String,
    pub manufacturer: String,
    pub indications: String,
    pub mechanism: String,
    pub side_effects: String,
    pub dosage: String,
    pub precautions: String,
    pub contraindications: String,
    pub drug_interactions: String,
}

/// openFDA query formulations, tried in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    ExactBrandName,
    ExactGenericName,
    BrandName,
    GenericName,
}

impl SearchStrategy {
    pub const ORDERED: [SearchStrategy; 4] = [
        SearchStrategy::ExactBrandName,
        SearchStrategy::ExactGenericName,
        SearchStrategy::BrandName,
        SearchStrategy::GenericName,
    ];

    /// Builds the openFDA `search` expression for an already sanitized name.
    pub fn expression(self, name: &str) -> String {
        match self {
            Self::ExactBrandName => format!("openfda.brand_name:\"{name}\""),
            Self::ExactGenericName => format!("openfda.generic_name:\"{name}\""),
            Self::BrandName => format!("openfda.brand_name:{name}"),
            Self::GenericName => format!("openfda.generic_name:{name}"),
        }
    }
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ExactBrandName => "exact brand name",
            Self::ExactGenericName => "exact generic name",
            Self::BrandName => "brand name",
            Self::GenericName => "generic name",
        };
        f.write_str(label)
    }
}

/// Validates and sanitizes a raw `name` parameter.
///
/// # Errors
///
/// Returns [`OpenClinicError::InvalidInput`] when the name is missing, blank,
/// or shorter than two characters once sanitized.
pub fn validate_query(raw: Option<&str>) -> Result<String, OpenClinicError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(OpenClinicError::InvalidInput(NAME_REQUIRED.into()));
    }

    let sanitized = sanitize_medicine_name(raw);
    if !has_min_chars(&sanitized) {
        return Err(OpenClinicError::InvalidInput(NAME_TOO_SHORT.into()));
    }
    Ok(sanitized)
}

/// Tries every strategy in order and returns the first label found.
///
/// Failed attempts are logged and skipped; they never abort the walk.
async fn first_match(
    source: &dyn LabelSource,
    name: &str,
) -> Option<(SearchStrategy, String, LabelResult)> {
    for strategy in SearchStrategy::ORDERED {
        let expression = strategy.expression(name);
        info!(strategy = %strategy, search = %expression, "Trying search strategy");

        match source.first_label(&expression).await {
            Ok(Some(label)) => return Some((strategy, expression, label)),
            Ok(None) => {}
            Err(err) => warn!(search = %expression, error = %err, "Strategy failed"),
        }
    }
    None
}

/// The medicine lookup service.
///
/// Holds the upstream label source once it has been installed; until then
/// every search fails fast with [`OpenClinicError::ServiceUnavailable`].
#[derive(Default)]
pub struct MedicineLookup {
    source: OnceLock<Arc<dyn LabelSource>>,
}

impl MedicineLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(source: Arc<dyn LabelSource>) -> Self {
        let lookup = Self::new();
        lookup.install(source);
        lookup
    }

    /// Marks the service ready. Returns `false` if a source was already installed.
    pub fn install(&self, source: Arc<dyn LabelSource>) -> bool {
        self.source.set(source).is_ok()
    }

    pub fn is_ready(&self) -> bool {
        self.source.get().is_some()
    }

    /// Looks up a medicine by free-text name.
    ///
    /// # Errors
    ///
    /// - [`OpenClinicError::InvalidInput`] for a missing or too-short name
    /// - [`OpenClinicError::ServiceUnavailable`] before the upstream client is ready
    /// - [`OpenClinicError::NotFound`] when no strategy matched
    /// - [`OpenClinicError::Upstream`] when the lookup task itself failed
    pub async fn search(&self, raw: Option<&str>) -> Result<MedicineInfo, OpenClinicError> {
        let name = validate_query(raw)?;

        let Some(source) = self.source.get().cloned() else {
            return Err(OpenClinicError::ServiceUnavailable(
                SERVICE_INITIALIZING.into(),
            ));
        };

        // The walk is aborted if the caller stops waiting, e.g. on client disconnect.
        let task_name = name.clone();
        let outcome = AbortOnDropHandle::new(tokio::spawn(async move {
            first_match(source.as_ref(), &task_name).await
        }))
        .await;

        match outcome {
            Ok(Some((strategy, expression, label))) => {
                info!(strategy = %strategy, search = %expression, "Found medicine data");
                Ok(transform::medicine::from_label(&label, &name))
            }
            Ok(None) => Err(OpenClinicError::NotFound {
                query: name,
                suggestions: NOT_FOUND_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            }),
            Err(err) => {
                error!(query = %name, error = %err, "Error fetching medicine data");
                Err(OpenClinicError::Upstream(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    pub(crate) enum Scripted {
        Miss,
        Fail,
        Hit(serde_json::Value),
        Panic,
    }

    /// Answers searches from a script keyed by strategy position and records calls.
    pub(crate) struct ScriptedSource {
        script: Vec<Scripted>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedSource {
        pub(crate) fn new(script: Vec<Scripted>) -> Arc<Self> {
            Arc::new(Self {
                script,
                calls: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl LabelSource for ScriptedSource {
        async fn first_label(
            &self,
            search: &str,
        ) -> Result<Option<LabelResult>, OpenClinicError> {
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(search.to_string());
                calls.len() - 1
            };
            match self.script.get(index).unwrap_or(&Scripted::Miss) {
                Scripted::Miss => Ok(None),
                Scripted::Fail => Err(OpenClinicError::Api {
                    api: "openfda".into(),
                    message: "HTTP 503 Service Unavailable".into(),
                }),
                Scripted::Hit(value) => Ok(Some(serde_json::from_value(value.clone()).unwrap())),
                Scripted::Panic => panic!("scripted upstream panic"),
            }
        }
    }

    #[test]
    fn strategy_expressions_follow_fixed_order() {
        let expressions: Vec<String> = SearchStrategy::ORDERED
            .iter()
            .map(|s| s.expression("Advil"))
            .collect();
        assert_eq!(
            expressions,
            vec![
                "openfda.brand_name:\"Advil\"",
                "openfda.generic_name:\"Advil\"",
                "openfda.brand_name:Advil",
                "openfda.generic_name:Advil",
            ]
        );
    }

    #[test]
    fn validate_query_rejects_blank_and_short_names() {
        for raw in [None, Some(""), Some("   "), Some("a"), Some("!a!"), Some("@@@")] {
            let err = validate_query(raw).unwrap_err();
            assert!(matches!(err, OpenClinicError::InvalidInput(_)), "{raw:?}");
        }
        assert_eq!(
            validate_query(None).unwrap_err().to_string(),
            NAME_REQUIRED
        );
        assert_eq!(
            validate_query(Some("x?")).unwrap_err().to_string(),
            NAME_TOO_SHORT
        );
        assert_eq!(validate_query(Some(" Tylenol® ")).unwrap(), "Tylenol");
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_upstream() {
        let source = ScriptedSource::new(Vec::new());
        let lookup = MedicineLookup::with_source(source.clone());

        for raw in [None, Some(""), Some(" \t "), Some("b"), Some("#$%")] {
            let err = lookup.search(raw).await.unwrap_err();
            assert!(matches!(err, OpenClinicError::InvalidInput(_)));
        }
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn search_fails_fast_before_source_is_installed() {
        let lookup = MedicineLookup::new();
        assert!(!lookup.is_ready());

        let err = lookup.search(Some("aspirin")).await.unwrap_err();
        assert!(matches!(err, OpenClinicError::ServiceUnavailable(_)));
        assert_eq!(err.to_string(), SERVICE_INITIALIZING);
    }

    #[test]
    fn install_only_succeeds_once() {
        let lookup = MedicineLookup::new();
        assert!(lookup.install(ScriptedSource::new(Vec::new())));
        assert!(lookup.is_ready());
        assert!(!lookup.install(ScriptedSource::new(Vec::new())));
    }

    #[tokio::test]
    async fn first_successful_strategy_wins_and_later_ones_are_skipped() {
        let source = ScriptedSource::new(vec![
            Scripted::Miss,
            Scripted::Fail,
            Scripted::Hit(serde_json::json!({
                "openfda": {"brand_name": ["Advil"], "generic_name": ["IBUPROFEN"]},
                "indications_and_usage": ["Minor aches"]
            })),
            Scripted::Hit(serde_json::json!({"openfda": {"brand_name": ["Wrong"]}})),
        ]);
        let lookup = MedicineLookup::with_source(source.clone());

        let info = lookup.search(Some("advil")).await.unwrap();
        assert_eq!(info.name, "advil");
        assert_eq!(info.brand_name, "Advil");
        assert_eq!(info.generic_name, "IBUPROFEN");
        assert_eq!(info.indications, "Minor aches");
        assert_eq!(
            source.calls(),
            vec![
                "openfda.brand_name:\"advil\"",
                "openfda.generic_name:\"advil\"",
                "openfda.brand_name:advil",
            ]
        );
    }

    #[tokio::test]
    async fn exhausted_strategies_report_not_found_with_three_hints() {
        let source = ScriptedSource::new(vec![
            Scripted::Fail,
            Scripted::Fail,
            Scripted::Fail,
            Scripted::Fail,
        ]);
        let lookup = MedicineLookup::with_source(source.clone());

        let err = lookup.search(Some("  notarealdrug!! ")).await.unwrap_err();
        match err {
            OpenClinicError::NotFound { query, suggestions } => {
                assert_eq!(query, "notarealdrug");
                assert_eq!(suggestions.len(), 3);
                assert_eq!(suggestions[0], NOT_FOUND_SUGGESTIONS[0]);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
        assert_eq!(source.calls().len(), 4);
    }

    #[tokio::test]
    async fn panicking_source_surfaces_as_upstream_error() {
        let source = ScriptedSource::new(vec![Scripted::Panic]);
        let lookup = MedicineLookup::with_source(source);

        let err = lookup.search(Some("aspirin")).await.unwrap_err();
        assert!(matches!(err, OpenClinicError::Upstream(_)));
    }

    #[tokio::test]
    async fn abandoned_search_cancels_the_strategy_walk() {
        struct StallingSource(Mutex<Option<tokio::sync::oneshot::Sender<()>>>);

        #[async_trait::async_trait]
        impl LabelSource for StallingSource {
            async fn first_label(
                &self,
                _search: &str,
            ) -> Result<Option<LabelResult>, OpenClinicError> {
                let _in_flight = self.0.lock().unwrap().take();
                std::future::pending().await
            }
        }

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let lookup = MedicineLookup::with_source(Arc::new(StallingSource(Mutex::new(Some(tx)))));

        let abandoned =
            tokio::time::timeout(Duration::from_millis(50), lookup.search(Some("aspirin"))).await;
        assert!(abandoned.is_err());

        let cancelled = tokio::time::timeout(Duration::from_secs(1), rx)
            .await
            .expect("strategy walk should be dropped");
        assert!(cancelled.is_err());
    }

    #[tokio::test]
    async fn timed_out_strategy_falls_through_to_the_next() {
        use crate::sources::openfda::OpenFdaClient;
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drug/label.json"))
            .and(query_param("search", "openfda.brand_name:\"aspirin\""))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(3))
                    .set_body_json(serde_json::json!({
                        "results": [{"openfda": {"brand_name": ["Too Slow"]}}]
                    })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/drug/label.json"))
            .and(query_param("search", "openfda.generic_name:\"aspirin\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{
                    "openfda": {"brand_name": ["Bayer Aspirin"], "generic_name": ["ASPIRIN"]}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            OpenFdaClient::new_for_test_with_timeout(server.uri(), Duration::from_millis(300))
                .unwrap();
        let lookup = MedicineLookup::with_source(Arc::new(client));

        let started = std::time::Instant::now();
        let info = lookup.search(Some("aspirin")).await.unwrap();
        assert_eq!(info.brand_name, "Bayer Aspirin");
        assert_eq!(info.generic_name, "ASPIRIN");
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn concurrent_searches_do_not_interfere() {
        struct EchoSource;

        #[async_trait::async_trait]
        impl LabelSource for EchoSource {
            async fn first_label(
                &self,
                search: &str,
            ) -> Result<Option<LabelResult>, OpenClinicError> {
                let name = search.rsplit(':').next().unwrap_or_default().trim_matches('"');
                tokio::task::yield_now().await;
                Ok(Some(
                    serde_json::from_value(serde_json::json!({
                        "openfda": {"generic_name": [name.to_uppercase()]}
                    }))
                    .unwrap(),
                ))
            }
        }

        let lookup = Arc::new(MedicineLookup::with_source(Arc::new(EchoSource)));
        let names = ["aspirin", "metformin", "losartan", "omeprazole"];
        let handles: Vec<_> = names
            .iter()
            .map(|name| {
                let lookup = lookup.clone();
                let name = name.to_string();
                tokio::spawn(async move { lookup.search(Some(&name)).await })
            })
            .collect();

        for (name, handle) in names.iter().zip(handles) {
            let info = handle.await.unwrap().unwrap();
            assert_eq!(info.name, *name);
            assert_eq!(info.generic_name, name.to_uppercase());
        }
    }
}
