//! REST task service client.
//!
//! Endpoints (relative to the configured base URL):
//! - `GET  tasks?userId={uid}`          -> `{"data": [Task]}`
//! - `PUT  tasks/{id}`                  -> `{"data": Task}`
//! - `POST tasks/{id}/focused-time`     body `{"timeInSeconds": n}`
//! - `GET  tasks/{id}/focused-time`     -> stats object
//! - `GET  tasks/status-count/{uid}`               -> `{"data": TaskStatusCount}`
//! - `GET  tasks/focused-time-count/{uid}`         -> `{"data": [FocusedTimeByDate]}`
//! - `GET  tasks/focused-time-count-7-days/{uid}`  -> `{"data": summary}`

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use super::{FocusTimeRecorder, TaskGateway};
use crate::error::GatewayError;
use crate::stats::{
    fill_last_days, DailyFocus, FocusSummary, FocusedTimeByDate, FocusedTimeSummaryWire,
    TaskStatusCount,
};
use crate::storage::ApiConfig;
use crate::task::{Task, TaskStatus};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    access_token: Option<String>,
}

impl HttpGateway {
    pub fn new(
        base_url: &str,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let base_url =
            Url::parse(base_url).map_err(|e| GatewayError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(GatewayError::InvalidUrl(format!(
                "{base_url} cannot carry endpoint paths"
            )));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            access_token: access_token.filter(|t| !t.is_empty()),
        })
    }

    pub fn from_config(api: &ApiConfig) -> Result<Self, GatewayError> {
        Self::new(
            &api.base_url,
            api.access_token.clone(),
            Duration::from_secs(api.timeout_secs),
        )
    }

    /// List the tasks belonging to `user_id`.
    pub async fn fetch_tasks(&self, user_id: &str) -> Result<Vec<Task>, GatewayError> {
        let mut url = self.endpoint(&["tasks"])?;
        url.query_pairs_mut().append_pair("userId", user_id);

        self.get_data(url, "fetch tasks").await
    }

    /// Number of `user_id`'s tasks in each status.
    pub async fn task_status_count(&self, user_id: &str) -> Result<TaskStatusCount, GatewayError> {
        let url = self.endpoint(&["tasks", "status-count", user_id])?;
        self.get_data(url, "fetch status count").await
    }

    /// Focused minutes per day over the week ending at `today`.
    pub async fn focused_time_by_date(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<DailyFocus>, GatewayError> {
        let url = self.endpoint(&["tasks", "focused-time-count", user_id])?;
        let rows: Vec<FocusedTimeByDate> = self.get_data(url, "fetch focused time by date").await?;
        Ok(fill_last_days(&rows, today))
    }

    /// Seven-day focused time against estimated time.
    pub async fn focused_time_summary(&self, user_id: &str) -> Result<FocusSummary, GatewayError> {
        let url = self.endpoint(&["tasks", "focused-time-count-7-days", user_id])?;
        let wire: FocusedTimeSummaryWire = self.get_data(url, "fetch focused time summary").await?;
        Ok(wire.into())
    }

    /// Focused-time statistics for a task, as reported by the service.
    pub async fn focused_time_stats(&self, task_id: &str) -> Result<serde_json::Value, GatewayError> {
        let url = self.endpoint(&["tasks", task_id, "focused-time"])?;
        let resp = self.request(Method::GET, url).send().await?;
        let resp = check(resp, "fetch focused time", Some(task_id))?;
        resp.json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        url: Url,
        operation: &'static str,
    ) -> Result<T, GatewayError> {
        let resp = self.request(Method::GET, url).send().await?;
        let resp = check(resp, operation, None)?;
        let body: Envelope<T> = resp
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        Ok(body.data)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GatewayError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

fn check(
    resp: Response,
    operation: &'static str,
    task_id: Option<&str>,
) -> Result<Response, GatewayError> {
    match resp.status() {
        s if s.is_success() => Ok(resp),
        StatusCode::UNAUTHORIZED => Err(GatewayError::Unauthorized),
        StatusCode::NOT_FOUND => match task_id {
            Some(id) => Err(GatewayError::NotFound(id.to_string())),
            None => Err(GatewayError::Status {
                operation,
                status: 404,
            }),
        },
        s => Err(GatewayError::Status {
            operation,
            status: s.as_u16(),
        }),
    }
}

impl TaskGateway for HttpGateway {
    async fn update_task_status(
        &self,
        task_id: &str,
        status: TaskStatus,
    ) -> Result<Task, GatewayError> {
        let url = self.endpoint(&["tasks", task_id])?;
        debug!(task_id, %status, "updating task status");

        let resp = self
            .request(Method::PUT, url)
            .json(&json!({ "status": status }))
            .send()
            .await?;
        let resp = check(resp, "update task", Some(task_id))?;
        let body: Envelope<Task> = resp
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        Ok(body.data)
    }
}

impl FocusTimeRecorder for HttpGateway {
    async fn record_focused_seconds(&self, task_id: &str, seconds: u64) -> Result<(), GatewayError> {
        let url = self.endpoint(&["tasks", task_id, "focused-time"])?;
        debug!(task_id, seconds, "saving focused time");

        let resp = self
            .request(Method::POST, url)
            .json(&json!({ "timeInSeconds": seconds }))
            .send()
            .await?;
        check(resp, "save focused time", Some(task_id))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn gateway(server: &mockito::ServerGuard, token: Option<&str>) -> HttpGateway {
        HttpGateway::new(&server.url(), token.map(String::from), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn update_status_puts_wire_spelling() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PUT", "/tasks/t1")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::Json(json!({ "status": "In Progress" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":{"id":"t1","name":"Essay","status":"In Progress"}}"#)
            .create_async()
            .await;

        let task = gateway(&server, Some("secret"))
            .update_task_status("t1", TaskStatus::InProgress)
            .await
            .unwrap();

        assert_eq!(task.status, TaskStatus::InProgress);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn record_posts_seconds() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/tasks/t1/focused-time")
            .match_body(Matcher::Json(json!({ "timeInSeconds": 600 })))
            .with_status(201)
            .create_async()
            .await;

        gateway(&server, None)
            .record_focused_seconds("t1", 600)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn fetch_tasks_passes_user_id() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tasks")
            .match_query(Matcher::UrlEncoded("userId".into(), "u1".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data":[
                    {"id":"a","name":"One","status":"Todo"},
                    {"id":"b","name":"Two","status":"Completed","priority":"Low"}
                ]}"#,
            )
            .create_async()
            .await;

        let tasks = gateway(&server, None).fetch_tasks("u1").await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn focused_time_by_date_fills_the_week() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tasks/focused-time-count/u1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data":[
                    {"date":"2025-03-02","totalSeconds":3000},
                    {"date":"2025-02-27","totalSeconds":30}
                ]}"#,
            )
            .create_async()
            .await;

        let today = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let week = gateway(&server, None)
            .focused_time_by_date("u1", today)
            .await
            .unwrap();

        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, NaiveDate::from_ymd_opt(2025, 2, 24).unwrap());
        let minutes: Vec<f64> = week.iter().map(|d| d.minutes).collect();
        assert_eq!(minutes, vec![0.0, 0.0, 0.0, 0.5, 0.0, 0.0, 50.0]);
    }

    #[tokio::test]
    async fn status_count_and_summary_decode() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/tasks/status-count/u1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":{"Todo":2,"In Progress":1,"Completed":4,"Expired":0}}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/tasks/focused-time-count-7-days/u1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data":{"total_focused_time_in_7_days":5400,"total_estimated_time_in_7_days":150}}"#,
            )
            .create_async()
            .await;

        let gw = gateway(&server, None);
        let count = gw.task_status_count("u1").await.unwrap();
        assert_eq!(count.get(TaskStatus::Completed), 4);
        assert_eq!(count.total(), 7);

        let summary = gw.focused_time_summary("u1").await.unwrap();
        assert_eq!(summary.focused_minutes, 90.0);
        assert_eq!(summary.estimated_time, 150);
    }

    #[tokio::test]
    async fn status_codes_map_to_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/tasks/t1/focused-time")
            .with_status(401)
            .create_async()
            .await;
        server
            .mock("PUT", "/tasks/missing")
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("POST", "/tasks/t2/focused-time")
            .with_status(500)
            .create_async()
            .await;

        let gw = gateway(&server, None);
        assert!(matches!(
            gw.record_focused_seconds("t1", 5).await,
            Err(GatewayError::Unauthorized)
        ));
        assert!(matches!(
            gw.update_task_status("missing", TaskStatus::Completed).await,
            Err(GatewayError::NotFound(id)) if id == "missing"
        ));
        assert!(matches!(
            gw.record_focused_seconds("t2", 5).await,
            Err(GatewayError::Status { status: 500, .. })
        ));
    }

    #[test]
    fn endpoint_keeps_base_path_and_escapes_ids() {
        let gw = HttpGateway::new("http://localhost:3000/api/", None, Duration::from_secs(1)).unwrap();
        let url = gw.endpoint(&["tasks", "a b", "focused-time"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/tasks/a%20b/focused-time");
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(HttpGateway::new("not a url", None, Duration::from_secs(1)).is_err());
        assert!(HttpGateway::new("mailto:someone@example.com", None, Duration::from_secs(1)).is_err());
    }
}
