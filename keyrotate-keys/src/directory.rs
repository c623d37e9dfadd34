//! Warehouse user directory update
//!
//! Pushing the public key to the warehouse user record is not enabled yet.
//! [`InertDirectoryUpdater`] renders the statement that would be issued and
//! returns success without contacting the warehouse.
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


use crate::error::DirectoryUpdateError;
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Trait for warehouse user directories
#[async_trait]
pub trait DirectoryUpdater: Send + Sync {
    /// Set the RSA public key on the user record
    async fn update_directory_user_key(
        &self,
        username: &str,
        public_key_pem: &str,
    ) -> Result<(), DirectoryUpdateError>;

    /// Whether the update reaches a real directory
    fn is_enabled(&self) -> bool;
}

/// `ALTER USER <user> SET RSA_PUBLIC_KEY='<key>'`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterUserStatement {
    user: String,
    key_body: String,
}

impl AlterUserStatement {
    pub fn new(user: &str, public_key_pem: &str) -> Result<Self, DirectoryUpdateError> {
        if user.is_empty() || user.chars().any(char::is_control) {
            return Err(DirectoryUpdateError::InvalidUser(user.to_string()));
        }

        // The warehouse expects the base64 body without PEM armor or newlines
        let key_body: String = public_key_pem
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with("-----"))
            .collect();

        if key_body.is_empty() {
            return Err(DirectoryUpdateError::InvalidKey {
                user: user.to_string(),
                message: "public key is empty".to_string(),
            });
        }
        if !key_body
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        {
            return Err(DirectoryUpdateError::InvalidKey {
                user: user.to_string(),
                message: "public key body is not base64".to_string(),
            });
        }

        Ok(Self {
            user: user.to_string(),
            key_body,
        })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn key_body(&self) -> &str {
        &self.key_body
    }

    /// User as a SQL identifier; names that are not bare identifiers are quoted
    pub fn user_identifier(&self) -> String {
        if is_unquoted_identifier(&self.user) {
            self.user.clone()
        } else {
            format!("\"{}\"", self.user.replace('"', "\"\""))
        }
    }

    pub fn to_sql(&self) -> String {
        format!(
            "ALTER USER {} SET RSA_PUBLIC_KEY='{}'",
            self.user_identifier(),
            self.key_body
        )
    }
}

fn is_unquoted_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Directory updater that renders the statement and stops there. Never fails.
#[derive(Debug, Default)]
pub struct InertDirectoryUpdater;

#[async_trait]
impl DirectoryUpdater for InertDirectoryUpdater {
    async fn update_directory_user_key(
        &self,
        username: &str,
        public_key_pem: &str,
    ) -> Result<(), DirectoryUpdateError> {
        match AlterUserStatement::new(username, public_key_pem) {
            Ok(statement) => {
                debug!(sql = %statement.to_sql(), "Rendered directory update statement");
            }
            Err(e) => {
                warn!(user = username, error = %e, "Could not render directory update statement");
            }
        }
        info!(user = username, "Directory update is not enabled, skipping");
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
