use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the remote market-data and text-generation services.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to reach {service}: {source}")]
    Network {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} API error {status}: {body}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("failed to parse {service} response: {detail}")]
    Decode {
        service: &'static str,
        detail: String,
    },

    #[error("{0} returned no content")]
    Empty(&'static str),
}
