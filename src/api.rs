use crate::errors::ClientError;
use crate::models::{
    Activity, ActivityList, ErrorDetail, LoginRequest, LoginResponse, MessageResponse,
};
use reqwest::{Client, Response, Url, header::AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

pub const UNAUTHORIZED: u16 = 401;

/// Outcome of a call the directory answered, successful or not.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Accepted(T),
    Rejected { status: u16, detail: Option<String> },
}

/// The Activity Directory Service as seen by the client.
///
/// Transport and decode failures are `Err`; a non-2xx answer from the service
/// is `Ok(Reply::Rejected)` so callers can read the status and `detail`.
pub trait DirectoryApi {
    fn list_activities(&self) -> impl Future<Output = Result<ActivityList, ClientError>> + Send;

    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<Reply<LoginResponse>, ClientError>> + Send;

    fn logout(&self, token: &str) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn signup(
        &self,
        token: &str,
        activity: &str,
        email: &str,
    ) -> impl Future<Output = Result<Reply<MessageResponse>, ClientError>> + Send;

    fn unregister(
        &self,
        token: &str,
        activity: &str,
        email: &str,
    ) -> impl Future<Output = Result<Reply<MessageResponse>, ClientError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpDirectory {
    client: Client,
    base_url: Url,
}

impl HttpDirectory {
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::config(format!("{} cannot be a base url", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn participant_endpoint(
        &self,
        activity: &str,
        action: &str,
        email: &str,
    ) -> Result<Url, ClientError> {
        let mut url = self.endpoint(&["activities", activity, action])?;
        url.query_pairs_mut().append_pair("email", email);
        Ok(url)
    }
}

impl DirectoryApi for HttpDirectory {
    async fn list_activities(&self) -> Result<ActivityList, ClientError> {
        let url = self.endpoint(&["activities"])?;
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::transport(format!(
                "activity directory answered {status}"
            )));
        }

        let raw: Map<String, Value> = resp.json().await?;
        let mut activities = Vec::with_capacity(raw.len());
        for (name, details) in raw {
            let activity: Activity = serde_json::from_value(details)?;
            activities.push((name, activity));
        }
        Ok(activities)
    }

    async fn login(&self, request: &LoginRequest) -> Result<Reply<LoginResponse>, ClientError> {
        let url = self.endpoint(&["login"])?;
        let resp = self.client.post(url).json(request).send().await?;
        read_reply(resp).await
    }

    async fn logout(&self, token: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["logout"])?;
        let resp = self
            .client
            .post(url)
            .header(AUTHORIZATION, token)
            .send()
            .await?;
        debug!(status = %resp.status(), "logout acknowledged");
        Ok(())
    }

    async fn signup(
        &self,
        token: &str,
        activity: &str,
        email: &str,
    ) -> Result<Reply<MessageResponse>, ClientError> {
        let url = self.participant_endpoint(activity, "signup", email)?;
        let resp = self
            .client
            .post(url)
            .header(AUTHORIZATION, token)
            .send()
            .await?;
        read_reply(resp).await
    }

    async fn unregister(
        &self,
        token: &str,
        activity: &str,
        email: &str,
    ) -> Result<Reply<MessageResponse>, ClientError> {
        let url = self.participant_endpoint(activity, "unregister", email)?;
        let resp = self
            .client
            .delete(url)
            .header(AUTHORIZATION, token)
            .send()
            .await?;
        read_reply(resp).await
    }
}

async fn read_reply<T: DeserializeOwned>(resp: Response) -> Result<Reply<T>, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(Reply::Accepted(resp.json().await?));
    }

    let body = resp.bytes().await?;
    let detail = serde_json::from_slice::<ErrorDetail>(&body)
        .ok()
        .and_then(|err| err.detail);
    Ok(Reply::Rejected {
        status: status.as_u16(),
        detail,
    })
}
