//! Secret store interface and the AWS Secrets Manager backend
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
use async_trait::async_trait;
use aws_sdk_secretsmanager::error::{DisplayErrorContext, SdkError};
use tracing::{debug, info};

/// Trait for hierarchical-name secret stores
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Check if a secret exists; "not found" is `Ok(false)`
    async fn secret_exists(&self, name: &str) -> Result<bool, SecretStoreError>;

    /// Create a new secret, failing with `AlreadyExists` if the name is taken
    async fn create_secret(&self, name: &str, value: &str) -> Result<(), SecretStoreError>;

    /// Replace the value of an existing secret, failing with `NotFound` if absent
    async fn update_secret(&self, name: &str, value: &str) -> Result<(), SecretStoreError>;

    /// Read the current value of a secret
    async fn get_secret(&self, name: &str) -> Result<String, SecretStoreError>;
}

/// AWS Secrets Manager backend
pub struct SecretsManagerStore {
    client: aws_sdk_secretsmanager::Client,
}

impl SecretsManagerStore {
    pub fn new(client: aws_sdk_secretsmanager::Client) -> Self {
        Self { client }
    }
}

fn backend_error<E, R>(operation: &'static str, name: &str, err: &SdkError<E, R>) -> SecretStoreError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    SecretStoreError::Backend {
        operation,
        name: name.to_string(),
        message: DisplayErrorContext(err).to_string(),
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    async fn secret_exists(&self, name: &str) -> Result<bool, SecretStoreError> {
        match self.client.describe_secret().secret_id(name).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.as_service_error()
                    .is_some_and(|se| se.is_resource_not_found_exception())
                {
                    debug!(secret = name, "Secret does not exist");
                    Ok(false)
                } else {
                    Err(backend_error("describe", name, &e))
                }
            }
        }
    }

    async fn create_secret(&self, name: &str, value: &str) -> Result<(), SecretStoreError> {
        info!(secret = name, "Creating new secret");
        self.client
            .create_secret()
            .name(name)
            .secret_string(value)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|se| se.is_resource_exists_exception())
                {
                    SecretStoreError::AlreadyExists {
                        name: name.to_string(),
                    }
                } else {
                    backend_error("create", name, &e)
                }
            })?;
        info!(secret = name, "Successfully created secret");
        Ok(())
    }

    async fn update_secret(&self, name: &str, value: &str) -> Result<(), SecretStoreError> {
        info!(secret = name, "Updating secret");
        self.client
            .put_secret_value()
            .secret_id(name)
            .secret_string(value)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|se| se.is_resource_not_found_exception())
                {
                    SecretStoreError::NotFound {
                        name: name.to_string(),
                    }
                } else {
                    backend_error("update", name, &e)
                }
            })?;
        info!(secret = name, "Successfully updated secret");
        Ok(())
    }

    async fn get_secret(&self, name: &str) -> Result<String, SecretStoreError> {
        let output = self
            .client
            .get_secret_value()
            .secret_id(name)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|se| se.is_resource_not_found_exception())
                {
                    SecretStoreError::NotFound {
                        name: name.to_string(),
                    }
                } else {
                    backend_error("get", name, &e)
                }
            })?;

        output
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| SecretStoreError::Backend {
                operation: "get",
                name: name.to_string(),
                message: "secret has no string value".to_string(),
            })
    }
}
