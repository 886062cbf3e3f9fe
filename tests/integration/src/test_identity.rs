//! Identity service and health endpoint tests.

#[cfg(test)]
mod tests {
    use ruststack_cosi_core::CosiConfig;
    use ruststack_cosi_model::operations::CosiOperation;
    use serde_json::json;

    use crate::TestServer;

    #[tokio::test]
    async fn test_should_report_driver_name() {
        let server = TestServer::start().await.unwrap();
        let (status, body) = server
            .call(CosiOperation::DriverGetInfo, json!({}))
            .await
            .unwrap();
        assert_eq!(status, 200);
        assert_eq!(body["name"], "cosi.ruststack.dev");
    }

    #[tokio::test]
    async fn test_should_report_configured_driver_name() {
        let config = CosiConfig::builder()
            .driver_name("objectstorage.example.com".into())
            .build();
        let server = TestServer::start_with(config).await.unwrap();
        let (_, body) = server
            .call(CosiOperation::DriverGetInfo, json!({}))
            .await
            .unwrap();
        assert_eq!(body["name"], "objectstorage.example.com");
    }

    #[tokio::test]
    async fn test_should_answer_health_endpoint() {
        let server = TestServer::start().await.unwrap();
        let resp = server
            .client()
            .get(format!("{}/healthz", server.base_url()))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["server"], "RustStack");
        assert!(resp.headers().contains_key("x-cosi-request-id"));

        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "ok");
    }
}
