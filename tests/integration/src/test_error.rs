//! Transport error mapping tests.

#[cfg(test)]
mod tests {
    use ruststack_cosi_model::operations::CosiOperation;
    use serde_json::json;

    use crate::TestServer;

    #[tokio::test]
    async fn test_should_return_not_found_for_unknown_method() {
        let server = TestServer::start().await.unwrap();
        let resp = server
            .client()
            .post(format!(
                "{}/cosi.v1alpha1.Provisioner/DriverFrobnicate",
                server.base_url()
            ))
            .json(&json!({}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 404);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["code"], "NotFound");
    }

    #[tokio::test]
    async fn test_should_reject_get_on_rpc_path() {
        let server = TestServer::start().await.unwrap();
        let resp = server
            .client()
            .get(format!(
                "{}{}",
                server.base_url(),
                CosiOperation::DriverCreateBucket.path()
            ))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 405);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["code"], "MethodNotAllowed");
    }

    #[tokio::test]
    async fn test_should_reject_malformed_json() {
        let server = TestServer::start().await.unwrap();
        let resp = server
            .client()
            .post(format!(
                "{}{}",
                server.base_url(),
                CosiOperation::DriverCreateBucket.path()
            ))
            .header("content-type", "application/json")
            .body("{\"name\":")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        let body: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(body["code"], "InvalidArgument");
    }

    #[tokio::test]
    async fn test_should_reject_missing_bucket_name() {
        let server = TestServer::start().await.unwrap();
        let (status, body) = server
            .call(CosiOperation::DriverCreateBucket, json!({}))
            .await
            .unwrap();
        assert_eq!(status, 400);
        assert_eq!(body["code"], "InvalidArgument");
        assert!(server.storage().list_buckets().is_empty());
    }
}
