//! Object storage state: buckets and credential principals.
//!
//! [`StorageBackend`] is the seam between the provisioner and whatever holds
//! the object-storage state. [`InMemoryStorage`] is the bundled
//! implementation; it is not durable and loses all state on restart.
//!
//! Every check-then-mutate pair runs under the `DashMap` entry lock for that
//! key, so concurrent calls for the same name observe a single outcome.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::{StorageError, StorageResult};
use crate::keygen::{KeyGenerator, RandomKeyGenerator};

/// Bucket creation parameters, e.g. `region`.
pub type BucketParameters = BTreeMap<String, String>;

/// Parameter key carrying the bucket region.
pub const REGION_PARAMETER: &str = "region";

/// A provisioned bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// Bucket name, also its external identifier.
    pub name: String,
    /// Parameters supplied at creation time.
    pub parameters: BucketParameters,
    /// When the bucket was created.
    pub creation_date: DateTime<Utc>,
}

impl Bucket {
    /// The `region` parameter, if one was supplied.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.parameters.get(REGION_PARAMETER).map(String::as_str)
    }
}

/// A credential principal.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    /// User name, the idempotency key for grants.
    pub name: String,
    /// Access key ID.
    pub access_key: String,
    /// Secret access key.
    pub secret_key: String,
    /// When the user was created.
    pub creation_date: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("name", &self.name)
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("creation_date", &self.creation_date)
            .finish()
    }
}

/// Outcome of an idempotent create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provisioned<T> {
    /// The resource did not exist and was created by this call.
    Created(T),
    /// A compatible resource already existed and was left untouched.
    Existing(T),
}

impl<T> Provisioned<T> {
    /// Unwrap the resource regardless of how it was obtained.
    #[must_use]
    pub fn into_inner(self) -> T {
        match self {
            Self::Created(v) | Self::Existing(v) => v,
        }
    }

    /// Whether this call created the resource.
    #[must_use]
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Storage operations required by the provisioner.
///
/// Absence is never an error: lookups return `false`/`None` and deletes of
/// missing names succeed. Errors are reserved for backend failures and for
/// incompatible duplicate buckets.
#[async_trait]
pub trait StorageBackend: Send + Sync + fmt::Debug {
    /// Whether a bucket with this name exists.
    async fn bucket_exists(&self, name: &str) -> StorageResult<bool>;

    /// Fetch a bucket by name.
    async fn get_bucket(&self, name: &str) -> StorageResult<Option<Bucket>>;

    /// Create a bucket unless one with equal parameters already exists.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::BucketConflict`] if the name is taken by a
    /// bucket with different parameters.
    async fn create_bucket(
        &self,
        name: &str,
        parameters: BucketParameters,
    ) -> StorageResult<Provisioned<Bucket>>;

    /// Remove a bucket, returning it if it existed.
    async fn delete_bucket(&self, name: &str) -> StorageResult<Option<Bucket>>;

    /// Fetch a user (including keys) by name.
    async fn user_exists(&self, name: &str) -> StorageResult<Option<User>>;

    /// Return the named user, creating it with a fresh key pair if absent.
    async fn create_user(&self, name: &str) -> StorageResult<Provisioned<User>>;

    /// Remove a user, returning it if it existed.
    async fn delete_user(&self, name: &str) -> StorageResult<Option<User>>;
}

/// In-memory [`StorageBackend`].
#[derive(Debug)]
pub struct InMemoryStorage {
    buckets: DashMap<String, Bucket>,
    users: DashMap<String, User>,
    keygen: Arc<dyn KeyGenerator>,
}

impl InMemoryStorage {
    /// Create an empty store using [`RandomKeyGenerator`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_key_generator(Arc::new(RandomKeyGenerator))
    }

    /// Create an empty store with a custom key source.
    #[must_use]
    pub fn with_key_generator(keygen: Arc<dyn KeyGenerator>) -> Self {
        Self {
            buckets: DashMap::new(),
            users: DashMap::new(),
            keygen,
        }
    }

    /// List all bucket names (sorted).
    #[must_use]
    pub fn list_buckets(&self) -> Vec<String> {
        let mut names: Vec<String> = self.buckets.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    /// List all user names (sorted).
    #[must_use]
    pub fn list_users(&self) -> Vec<String> {
        let mut names: Vec<String> = self.users.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    /// Reset all state (remove all buckets and users).
    pub fn reset(&self) {
        self.buckets.clear();
        self.users.clear();
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    async fn bucket_exists(&self, name: &str) -> StorageResult<bool> {
        Ok(self.buckets.contains_key(name))
    }

    async fn get_bucket(&self, name: &str) -> StorageResult<Option<Bucket>> {
        Ok(self.buckets.get(name).map(|r| r.value().clone()))
    }

    async fn create_bucket(
        &self,
        name: &str,
        parameters: BucketParameters,
    ) -> StorageResult<Provisioned<Bucket>> {
        match self.buckets.entry(name.to_owned()) {
            Entry::Occupied(e) => {
                if e.get().parameters == parameters {
                    Ok(Provisioned::Existing(e.get().clone()))
                } else {
                    Err(StorageError::BucketConflict {
                        bucket: e.key().clone(),
                    })
                }
            }
            Entry::Vacant(e) => {
                let bucket = Bucket {
                    name: name.to_owned(),
                    parameters,
                    creation_date: Utc::now(),
                };
                e.insert(bucket.clone());
                Ok(Provisioned::Created(bucket))
            }
        }
    }

    async fn delete_bucket(&self, name: &str) -> StorageResult<Option<Bucket>> {
        Ok(self.buckets.remove(name).map(|(_, b)| b))
    }

    async fn user_exists(&self, name: &str) -> StorageResult<Option<User>> {
        Ok(self.users.get(name).map(|r| r.value().clone()))
    }

    async fn create_user(&self, name: &str) -> StorageResult<Provisioned<User>> {
        match self.users.entry(name.to_owned()) {
            Entry::Occupied(e) => Ok(Provisioned::Existing(e.get().clone())),
            Entry::Vacant(e) => {
                let (access_key, secret_key) = self.keygen.key_pair();
                let user = User {
                    name: name.to_owned(),
                    access_key,
                    secret_key,
                    creation_date: Utc::now(),
                };
                e.insert(user.clone());
                Ok(Provisioned::Created(user))
            }
        }
    }

    async fn delete_user(&self, name: &str) -> StorageResult<Option<User>> {
        Ok(self.users.remove(name).map(|(_, u)| u))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keygen::{ACCESS_KEY_LEN, SECRET_KEY_LEN, SeededKeyGenerator};

    fn params(pairs: &[(&str, &str)]) -> BucketParameters {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[tokio::test]
    async fn test_should_report_missing_bucket_as_absent() {
        let store = InMemoryStorage::new();
        assert!(!store.bucket_exists("photos").await.unwrap());
        assert!(store.get_bucket("photos").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_should_create_bucket_once() {
        let store = InMemoryStorage::new();
        let first = store
            .create_bucket("photos", params(&[("region", "eu")]))
            .await
            .unwrap();
        assert!(first.is_created());

        let second = store
            .create_bucket("photos", params(&[("region", "eu")]))
            .await
            .unwrap();
        assert!(!second.is_created());
        assert_eq!(first.into_inner(), second.into_inner());
        assert_eq!(store.list_buckets(), vec!["photos".to_owned()]);
    }

    #[tokio::test]
    async fn test_should_reject_bucket_with_different_parameters() {
        let store = InMemoryStorage::new();
        store
            .create_bucket("photos", params(&[("region", "eu")]))
            .await
            .unwrap();

        let err = store
            .create_bucket("photos", params(&[("region", "us")]))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::BucketConflict { ref bucket } if bucket == "photos"));

        let stored = store.get_bucket("photos").await.unwrap().unwrap();
        assert_eq!(stored.region(), Some("eu"));
    }

    #[tokio::test]
    async fn test_should_delete_only_named_bucket() {
        let store = InMemoryStorage::new();
        store.create_bucket("a", params(&[])).await.unwrap();
        store.create_bucket("b", params(&[])).await.unwrap();

        let removed = store.delete_bucket("a").await.unwrap();
        assert_eq!(removed.map(|b| b.name), Some("a".to_owned()));
        assert!(store.delete_bucket("a").await.unwrap().is_none());
        assert!(store.bucket_exists("b").await.unwrap());
    }

    #[tokio::test]
    async fn test_should_keep_user_keys_stable() {
        let store = InMemoryStorage::new();
        let created = store.create_user("alice").await.unwrap();
        assert!(created.is_created());
        let created = created.into_inner();
        assert_eq!(created.access_key.len(), ACCESS_KEY_LEN);
        assert_eq!(created.secret_key.len(), SECRET_KEY_LEN);

        let again = store.create_user("alice").await.unwrap();
        assert!(!again.is_created());
        assert_eq!(again.into_inner(), created);

        let looked_up = store.user_exists("alice").await.unwrap();
        assert_eq!(looked_up, Some(created));
        assert_eq!(store.list_users(), vec!["alice".to_owned()]);
    }

    #[tokio::test]
    async fn test_should_delete_user_idempotently() {
        let store = InMemoryStorage::new();
        store.create_user("alice").await.unwrap();
        assert!(store.delete_user("alice").await.unwrap().is_some());
        assert!(store.delete_user("alice").await.unwrap().is_none());
        assert!(store.user_exists("alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_should_use_injected_key_generator() {
        let a = InMemoryStorage::with_key_generator(Arc::new(SeededKeyGenerator::new(9)));
        let b = InMemoryStorage::with_key_generator(Arc::new(SeededKeyGenerator::new(9)));
        let ua = a.create_user("alice").await.unwrap().into_inner();
        let ub = b.create_user("alice").await.unwrap().into_inner();
        assert_eq!(ua.access_key, ub.access_key);
        assert_eq!(ua.secret_key, ub.secret_key);
    }

    #[tokio::test]
    async fn test_should_reset_all_state() {
        let store = InMemoryStorage::new();
        store.create_bucket("photos", params(&[])).await.unwrap();
        store.create_user("alice").await.unwrap();
        store.reset();
        assert!(store.list_buckets().is_empty());
        assert!(store.list_users().is_empty());
    }

    #[test]
    fn test_should_redact_secret_in_debug() {
        let user = User {
            name: "alice".to_owned(),
            access_key: "AK".to_owned(),
            secret_key: "topsecret".to_owned(),
            creation_date: Utc::now(),
        };
        let debug = format!("{user:?}");
        assert!(!debug.contains("topsecret"));
        assert!(debug.contains("<redacted>"));
    }
}
