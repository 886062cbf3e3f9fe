//! Provisioner lifecycle tests over HTTP.

#[cfg(test)]
mod tests {
    use ruststack_cosi_model::operations::CosiOperation;
    use serde_json::json;

    use crate::{TestServer, test_bucket_name};

    fn keys(body: &serde_json::Value) -> (String, String) {
        let secrets = &body["credentials"]["s3"]["secrets"];
        (
            secrets["accessKeyID"].as_str().unwrap().to_owned(),
            secrets["accessSecretKey"].as_str().unwrap().to_owned(),
        )
    }

    #[tokio::test]
    async fn test_should_create_bucket_idempotently() {
        let server = TestServer::start().await.unwrap();
        let bucket = test_bucket_name("create");
        let request = json!({"name": bucket, "parameters": {"region": "eu-west-1"}});

        let (status, first) = server
            .call(CosiOperation::DriverCreateBucket, request.clone())
            .await
            .unwrap();
        assert_eq!(status, 200);
        assert_eq!(first["bucketId"], bucket.as_str());
        assert_eq!(first["bucketInfo"]["s3"]["region"], "eu-west-1");
        assert_eq!(first["bucketInfo"]["s3"]["signatureVersion"], "S3V2");

        let (status, second) = server
            .call(CosiOperation::DriverCreateBucket, request)
            .await
            .unwrap();
        assert_eq!(status, 200);
        assert_eq!(first, second);
        assert_eq!(server.storage().list_buckets(), vec![bucket]);
    }

    #[tokio::test]
    async fn test_should_conflict_on_different_parameters() {
        let server = TestServer::start().await.unwrap();
        let bucket = test_bucket_name("conflict");

        server
            .call(
                CosiOperation::DriverCreateBucket,
                json!({"name": bucket, "parameters": {"region": "eu"}}),
            )
            .await
            .unwrap();
        let (status, body) = server
            .call(
                CosiOperation::DriverCreateBucket,
                json!({"name": bucket, "parameters": {"region": "us"}}),
            )
            .await
            .unwrap();
        assert_eq!(status, 409);
        assert_eq!(body["code"], "AlreadyExists");
    }

    #[tokio::test]
    async fn test_should_delete_bucket_idempotently() {
        let server = TestServer::start().await.unwrap();
        let bucket = test_bucket_name("delete");
        server
            .call(CosiOperation::DriverCreateBucket, json!({"name": bucket}))
            .await
            .unwrap();

        for _ in 0..2 {
            let (status, body) = server
                .call(CosiOperation::DriverDeleteBucket, json!({"bucketId": bucket}))
                .await
                .unwrap();
            assert_eq!(status, 200);
            assert_eq!(body, json!({}));
        }
        assert!(server.storage().list_buckets().is_empty());
    }

    #[tokio::test]
    async fn test_should_grant_stable_credentials() {
        let server = TestServer::start().await.unwrap();
        let request = json!({"bucketId": "photos", "name": "alice"});

        let (status, first) = server
            .call(CosiOperation::DriverGrantBucketAccess, request.clone())
            .await
            .unwrap();
        assert_eq!(status, 200);
        assert_eq!(first["accountId"], "alice");

        let (_, second) = server
            .call(CosiOperation::DriverGrantBucketAccess, request)
            .await
            .unwrap();
        assert_eq!(keys(&first), keys(&second));

        let (ak, sk) = keys(&first);
        assert_eq!(ak.len(), 20);
        assert_eq!(sk.len(), 40);
    }

    #[tokio::test]
    async fn test_should_handle_concurrent_creates() {
        let server = TestServer::start().await.unwrap();
        let bucket = test_bucket_name("concurrent");

        let calls = (0..16).map(|_| {
            server.call(
                CosiOperation::DriverCreateBucket,
                json!({"name": bucket, "parameters": {"region": "eu"}}),
            )
        });
        let results = futures::future::join_all(calls).await;

        for result in results {
            let (status, body) = result.unwrap();
            assert_eq!(status, 200);
            assert_eq!(body["bucketId"], bucket.as_str());
        }
        assert_eq!(server.storage().list_buckets(), vec![bucket]);
    }

    #[tokio::test]
    async fn test_should_run_photos_alice_scenario() {
        let server = TestServer::start().await.unwrap();

        let create = json!({"name": "photos", "parameters": {"region": "eu"}});
        let (status, _) = server
            .call(CosiOperation::DriverCreateBucket, create.clone())
            .await
            .unwrap();
        assert_eq!(status, 200);
        let (status, _) = server
            .call(CosiOperation::DriverCreateBucket, create)
            .await
            .unwrap();
        assert_eq!(status, 200);

        let (status, _) = server
            .call(
                CosiOperation::DriverCreateBucket,
                json!({"name": "photos", "parameters": {"region": "us"}}),
            )
            .await
            .unwrap();
        assert_eq!(status, 409);

        let grant = json!({"bucketId": "photos", "name": "alice"});
        let (_, first) = server
            .call(CosiOperation::DriverGrantBucketAccess, grant.clone())
            .await
            .unwrap();
        let (_, second) = server
            .call(CosiOperation::DriverGrantBucketAccess, grant)
            .await
            .unwrap();
        assert_eq!(first["accountId"], "alice");
        assert_eq!(keys(&first), keys(&second));

        let revoke = json!({"bucketId": "photos", "accountId": "alice"});
        for _ in 0..2 {
            let (status, _) = server
                .call(CosiOperation::DriverRevokeBucketAccess, revoke.clone())
                .await
                .unwrap();
            assert_eq!(status, 200);
        }

        let delete = json!({"bucketId": "photos"});
        for _ in 0..2 {
            let (status, _) = server
                .call(CosiOperation::DriverDeleteBucket, delete.clone())
                .await
                .unwrap();
            assert_eq!(status, 200);
        }

        assert!(server.storage().list_buckets().is_empty());
        assert!(server.storage().list_users().is_empty());
    }
}
