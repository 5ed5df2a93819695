//! HTTP access to the remote `/todos` collection.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::model::{NewTodo, Todo};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Network(#[source] reqwest::Error),
    #[error("server responded with status {status}")]
    Server { status: u16 },
    #[error("request rejected with status {status}: {message}")]
    Validation { status: u16, message: String },
    #[error("todo {id} not found")]
    NotFound { id: u64 },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Network(err)
        }
    }
}

/// The three operations the view state needs from a todo backend.
#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    async fn list(&self, user_id: u64) -> Result<Vec<Todo>, StoreError>;

    async fn create(&self, todo: &NewTodo) -> Result<Todo, StoreError>;

    /// Succeeds without checking that `id` existed unless the server says otherwise.
    async fn delete(&self, id: u64) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: Client,
    base_url: String,
}

impl RemoteStore {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("todos/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: config.api_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl TodoStore for RemoteStore {
    async fn list(&self, user_id: u64) -> Result<Vec<Todo>, StoreError> {
        let url = collection_url(&self.base_url);
        debug!(url = url.as_str(), user_id, "fetching todos");
        let response = self
            .client
            .get(&url)
            .query(&[("userId", user_id)])
            .send()
            .await?;
        let response = check_status(response, None).await?;
        let todos: Vec<Todo> = response.json().await?;
        debug!(count = todos.len(), "fetched todos");
        Ok(todos)
    }

    async fn create(&self, todo: &NewTodo) -> Result<Todo, StoreError> {
        let url = collection_url(&self.base_url);
        debug!(url = url.as_str(), title = todo.title.as_str(), "creating todo");
        let response = self.client.post(&url).json(todo).send().await?;
        let response = check_status(response, None).await?;
        let created: Todo = response.json().await?;
        debug!(todo_id = created.id, "created todo");
        Ok(created)
    }

    async fn delete(&self, id: u64) -> Result<(), StoreError> {
        let url = item_url(&self.base_url, id);
        debug!(url = url.as_str(), todo_id = id, "deleting todo");
        let response = self.client.delete(&url).send().await?;
        check_status(response, Some(id)).await?;
        debug!(todo_id = id, "deleted todo");
        Ok(())
    }
}

async fn check_status(response: Response, target: Option<u64>) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let err = classify_status(status, target, body);
    warn!(status = status.as_u16(), error = %err, "todo request failed");
    Err(err)
}

pub(crate) fn classify_status(status: StatusCode, target: Option<u64>, body: String) -> StoreError {
    match (status, target) {
        (StatusCode::NOT_FOUND, Some(id)) => StoreError::NotFound { id },
        (StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY, _) => {
            StoreError::Validation {
                status: status.as_u16(),
                message: body.trim().to_string(),
            }
        }
        _ => StoreError::Server {
            status: status.as_u16(),
        },
    }
}

pub(crate) fn collection_url(base: &str) -> String {
    format!("{}/todos", base.trim_end_matches('/'))
}

pub(crate) fn item_url(base: &str, id: u64) -> String {
    format!("{}/{}", collection_url(base), id)
}
