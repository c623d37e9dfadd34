//! In-memory secret store implementation
// Copyright 2025 Francisco F. Pinochet
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use crate::error::SecretStoreError;
use crate::secret_store::SecretStore;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Process-local secret store with Secrets Manager create/update semantics.
/// Nothing is written to disk.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: RwLock<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `secrets`
    pub fn with_secrets<I, K, V>(secrets: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            secrets: RwLock::new(
                secrets
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Remove a secret, returning its value
    pub async fn remove(&self, name: &str) -> Option<String> {
        self.secrets.write().await.remove(name)
    }

    pub async fn len(&self) -> usize {
        self.secrets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.secrets.read().await.is_empty()
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    async fn secret_exists(&self, name: &str) -> Result<bool, SecretStoreError> {
        Ok(self.secrets.read().await.contains_key(name))
    }

    async fn create_secret(&self, name: &str, value: &str) -> Result<(), SecretStoreError> {
        let mut secrets = self.secrets.write().await;
        if secrets.contains_key(name) {
            return Err(SecretStoreError::AlreadyExists {
                name: name.to_string(),
            });
        }
        secrets.insert(name.to_string(), value.to_string());
        debug!(secret = name, "Secret created in memory");
        Ok(())
    }

    async fn update_secret(&self, name: &str, value: &str) -> Result<(), SecretStoreError> {
        let mut secrets = self.secrets.write().await;
        match secrets.get_mut(name) {
            Some(current) => {
                *current = value.to_string();
                debug!(secret = name, "Secret updated in memory");
                Ok(())
            }
            None => Err(SecretStoreError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    async fn get_secret(&self, name: &str) -> Result<String, SecretStoreError> {
        self.secrets
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| SecretStoreError::NotFound {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_exists() {
        let store = MemorySecretStore::new();
        assert!(!store.secret_exists("svc/a").await.unwrap());

        store.create_secret("svc/a", "v1").await.unwrap();
        assert!(store.secret_exists("svc/a").await.unwrap());
        assert_eq!(store.get_secret("svc/a").await.unwrap(), "v1");
    }

    #[tokio::test]
    async fn test_create_existing_fails() {
        let store = MemorySecretStore::with_secrets([("svc/a", "v1")]);
        let err = store.create_secret("svc/a", "v2").await.unwrap_err();
        assert!(matches!(err, SecretStoreError::AlreadyExists { .. }));
        assert_eq!(store.get_secret("svc/a").await.unwrap(), "v1");
    }

    #[tokio::test]
    async fn test_update_missing_fails() {
        let store = MemorySecretStore::new();
        let err = store.update_secret("svc/a", "v1").await.unwrap_err();
        assert!(matches!(err, SecretStoreError::NotFound { .. }));
        assert!(store.is_empty().await);
    }

    #[test]
    fn test_with_secrets_is_visible() {
        let store = MemorySecretStore::with_secrets([("svc/a", "v1"), ("svc/b", "v2")]);
        tokio_test::block_on(async {
            assert_eq!(store.len().await, 2);
            assert!(store.secret_exists("svc/b").await.unwrap());
            assert!(!store.secret_exists("svc/c").await.unwrap());
        });
    }

    #[tokio::test]
    async fn test_update_replaces_value() {
        let store = MemorySecretStore::with_secrets([("svc/a", "v1")]);
        store.update_secret("svc/a", "v2").await.unwrap();
        assert_eq!(store.get_secret("svc/a").await.unwrap(), "v2");
        assert_eq!(store.len().await, 1);

        assert_eq!(store.remove("svc/a").await.as_deref(), Some("v2"));
        assert!(store.get_secret("svc/a").await.is_err());
    }
}
