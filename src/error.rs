#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum OpenClinicError {
    #[error("HTTP client initialization failed: {0}")]
    HttpClientInit(reqwest::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP middleware error: {0}")]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    #[error("API error from {api}: {message}")]
    Api { api: String, message: String },

    #[error("API JSON error from {api}: {source}")]
    ApiJson {
        api: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error(
        "No information found for \"{query}\". Please check the spelling or try a different medicine name."
    )]
    NotFound {
        query: String,
        suggestions: Vec<String>,
    },

    #[error("Upstream lookup failed: {0}")]
    Upstream(String),

    #[error("Timestamp formatting failed: {0}")]
    Timestamp(#[from] time::error::Format),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
