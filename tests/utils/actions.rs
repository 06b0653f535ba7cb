use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use serde_json::Value;
use tower::ServiceExt; // for `oneshot`

use usergen::event::AccountEvent;

use super::setup::TestSetup;

pub async fn body_text(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

impl TestSetup {
    /// POST /api/generate as the admin
    pub async fn generate(
        &self,
        prefix: &str,
        index: u64,
        count: u32,
        password: &str,
    ) -> (StatusCode, Value) {
        let body = serde_json::json!({
            "usernameprefix": prefix,
            "usernameindex": index,
            "usercount": count,
            "password": password,
        });
        let request = Request::builder()
            .method("POST")
            .uri("/api/generate")
            .header("authorization", format!("Bearer {}", self.admin_token))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let value = serde_json::from_str(&body_text(response).await).unwrap();
        (status, value)
    }

    /// POST / with an urlencoded form body
    pub async fn submit_form(&self, token: &str, form: &str) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("authorization", format!("Bearer {}", token))
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();

        self.app.clone().oneshot(request).await.unwrap()
    }

    /// GET with the admin token
    pub async fn get(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .uri(uri)
            .header("authorization", format!("Bearer {}", self.admin_token))
            .body(Body::empty())
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, body_text(response).await)
    }

    /// Every event published so far
    pub fn drain_events(&mut self) -> Vec<AccountEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}
