use crate::errors::ClientError;
use reqwest::Url;
use std::{env, path::PathBuf};

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_SESSION_PATH: &str = "data/session.json";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: Url,
    pub session_path: PathBuf,
}

impl ClientConfig {
    pub fn new(api_url: &str, session_path: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let api_url = Url::parse(api_url)
            .map_err(|err| ClientError::config(format!("invalid api url {api_url:?}: {err}")))?;
        if api_url.cannot_be_a_base() {
            return Err(ClientError::config(format!(
                "api url {api_url} cannot be used as a base"
            )));
        }

        Ok(Self {
            api_url,
            session_path: session_path.into(),
        })
    }

    pub fn from_env() -> Result<Self, ClientError> {
        let api_url = env::var("ACTIVITY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let session_path = env::var("ACTIVITY_SESSION_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SESSION_PATH));
        Self::new(&api_url, session_path)
    }
}
