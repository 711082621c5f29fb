use api_types::{
    ErrorBody,
    month::{LatestMonth, MonthClose, MonthView},
    session::SessionUser,
};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};

#[derive(Debug)]
pub enum ClientError {
    Unauthorized,
    NotFound,
    Validation(String),
    Server(String),
    Transport(reqwest::Error),
}

/// Credentials kept for the lifetime of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

fn error_for_status(status: StatusCode, body: String) -> ClientError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Unauthorized,
        StatusCode::NOT_FOUND => ClientError::NotFound,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ClientError::Validation(body),
        _ => ClientError::Server(body),
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> std::result::Result<T, ClientError> {
    if res.status().is_success() {
        return res.json::<T>().await.map_err(ClientError::Transport);
    }

    let status = res.status();
    let body = res
        .json::<ErrorBody>()
        .await
        .map(|err| err.error)
        .unwrap_or_else(|_| "unknown error".to_string());
    Err(error_for_status(status, body))
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| AppError::Terminal(format!("invalid base_url: {err}")))?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Server(format!("invalid base_url: {err}")))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        credentials: &Credentials,
    ) -> std::result::Result<T, ClientError> {
        let res = request
            .basic_auth(&credentials.username, Some(&credentials.password))
            .send()
            .await
            .map_err(ClientError::Transport)?;
        decode(res).await
    }

    /// Checks the credentials against the server.
    pub async fn sign_in(
        &self,
        credentials: &Credentials,
    ) -> std::result::Result<SessionUser, ClientError> {
        let endpoint = self.endpoint("session")?;
        self.send(self.http.post(endpoint), credentials).await
    }

    pub async fn close_month(
        &self,
        credentials: &Credentials,
        payload: &MonthClose,
    ) -> std::result::Result<MonthView, ClientError> {
        let endpoint = self.endpoint("months")?;
        tracing::debug!("closing {} with {} entries", payload.month, payload.entries.len());
        self.send(self.http.post(endpoint).json(payload), credentials)
            .await
    }

    pub async fn latest_month(
        &self,
        credentials: &Credentials,
    ) -> std::result::Result<Option<MonthView>, ClientError> {
        let endpoint = self.endpoint("months/latest")?;
        let latest: LatestMonth = self.send(self.http.get(endpoint), credentials).await?;
        Ok(latest.month)
    }
}

/// Human readable message shown in the login box or a toast.
pub fn message_for_error(err: ClientError) -> String {
    match err {
        ClientError::Unauthorized => "Wrong username or password.".to_string(),
        ClientError::NotFound => "Not found.".to_string(),
        ClientError::Validation(message) => format!("Rejected: {message}"),
        ClientError::Server(message) => format!("Server error: {message}"),
        ClientError::Transport(err) => format!("Server unreachable: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_client_errors() {
        assert!(matches!(
            error_for_status(StatusCode::UNAUTHORIZED, String::new()),
            ClientError::Unauthorized
        ));
        assert!(matches!(
            error_for_status(StatusCode::NOT_FOUND, String::new()),
            ClientError::NotFound
        ));
        assert!(matches!(
            error_for_status(StatusCode::UNPROCESSABLE_ENTITY, "bad month".into()),
            ClientError::Validation(message) if message == "bad month"
        ));
        assert!(matches!(
            error_for_status(StatusCode::INTERNAL_SERVER_ERROR, "internal server error".into()),
            ClientError::Server(_)
        ));
    }

    #[test]
    fn endpoints_join_base_url() {
        let client = Client::new("http://127.0.0.1:3000/").unwrap();
        assert_eq!(
            client.endpoint("months/latest").unwrap().as_str(),
            "http://127.0.0.1:3000/months/latest"
        );
    }
}
