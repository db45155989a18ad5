use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use shopfront_client::{ApiError, ApiRequest, Gateway};
use shopfront_core::{NotificationConfig, Page, PageQuery};

use crate::feed::NotificationSource;
use crate::model::Notification;

/// Notification endpoints, called through the gateway.
pub struct NotificationApi {
    gateway: Arc<Gateway>,
    path: String,
}

impl NotificationApi {
    pub fn new(gateway: Arc<Gateway>, config: &NotificationConfig) -> Self {
        Self {
            gateway,
            path: config.path.trim_end_matches('/').to_string(),
        }
    }

    async fn call(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.gateway
            .send::<Value>(request)
            .await?
            .into_result()
            .map(|_| ())
    }
}

#[async_trait]
impl NotificationSource for NotificationApi {
    async fn fetch_page(&self, query: PageQuery) -> Result<Page<Notification>, ApiError> {
        let request = ApiRequest::get(self.path.clone()).page(query);
        self.gateway.send(request).await?.into_result()
    }

    async fn mark_read(&self, ids: &[i64]) -> Result<(), ApiError> {
        let request = ApiRequest::patch(format!("{}/read", self.path)).json(&json!({ "ids": ids }))?;
        self.call(request).await
    }

    async fn mark_all_read(&self) -> Result<(), ApiError> {
        self.call(ApiRequest::patch(format!("{}/read-all", self.path)))
            .await
    }

    async fn remove(&self, ids: &[i64]) -> Result<(), ApiError> {
        let request = ApiRequest::delete(self.path.clone()).json(&json!({ "ids": ids }))?;
        self.call(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use reqwest::StatusCode;
    use shopfront_client::{CredentialStore, RawResponse, Transport};

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, String, Vec<(String, String)>, Option<Value>)>>,
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn execute(
            &self,
            request: &ApiRequest,
            _bearer: Option<&str>,
        ) -> Result<RawResponse, ApiError> {
            self.seen.lock().unwrap().push((
                request.method.to_string(),
                request.path.clone(),
                request.query.clone(),
                request.body.clone(),
            ));
            let body = if request.method == reqwest::Method::GET {
                json!({
                    "message": "ok",
                    "data": {
                        "items": [{"id": 4, "title": "Order shipped", "isRead": true, "referenceId": "A-4"}],
                        "total": 11
                    }
                })
            } else {
                json!({"message": "ok"})
            };
            Ok(RawResponse::new(StatusCode::OK, body.to_string()))
        }
    }

    fn api(recorder: Arc<Recorder>) -> NotificationApi {
        let gateway = Gateway::new(
            recorder,
            Arc::new(CredentialStore::in_memory()),
            "/api/v1/auth/refresh",
        );
        NotificationApi::new(Arc::new(gateway), &NotificationConfig::default())
    }

    #[tokio::test]
    async fn fetch_page_queries_and_decodes() {
        let recorder = Arc::new(Recorder::default());
        let page = api(recorder.clone())
            .fetch_page(PageQuery::new(3, 5))
            .await
            .unwrap();
        assert_eq!(page.total, 11);
        assert_eq!(page.items[0].id, 4);
        assert_eq!(page.items[0].reference_id.as_deref(), Some("A-4"));

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen[0].0, "GET");
        assert_eq!(seen[0].1, "/api/v1/notifications");
        assert_eq!(
            seen[0].2,
            vec![("page".to_string(), "3".to_string()), ("size".to_string(), "5".to_string())]
        );
    }

    #[tokio::test]
    async fn writes_use_documented_routes() {
        let recorder = Arc::new(Recorder::default());
        let api = api(recorder.clone());
        api.mark_read(&[1, 2]).await.unwrap();
        api.mark_all_read().await.unwrap();
        api.remove(&[7]).await.unwrap();

        let seen = recorder.seen.lock().unwrap();
        let routes: Vec<(&str, &str)> = seen.iter().map(|s| (s.0.as_str(), s.1.as_str())).collect();
        assert_eq!(
            routes,
            vec![
                ("PATCH", "/api/v1/notifications/read"),
                ("PATCH", "/api/v1/notifications/read-all"),
                ("DELETE", "/api/v1/notifications"),
            ]
        );
        assert_eq!(seen[0].3, Some(json!({"ids": [1, 2]})));
        assert_eq!(seen[1].3, None);
        assert_eq!(seen[2].3, Some(json!({"ids": [7]})));
    }
}
