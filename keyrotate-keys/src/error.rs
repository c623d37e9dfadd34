//! Error types for key rotation
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


use thiserror::Error;

/// Key pair generation errors
#[derive(Error, Debug)]
pub enum KeySourceError {
    #[error("Invalid key identifier: {0:?}")]
    InvalidKeyId(String),

    #[error("Key provider error for {key_id}: {message}")]
    Provider { key_id: String, message: String },

    #[error("Key provider response for {key_id} is missing {field}")]
    MissingField { key_id: String, field: &'static str },

    #[error("Failed to decode {what} DER: {message}")]
    Decode { what: &'static str, message: String },

    #[error("Failed to encode {what} PEM: {message}")]
    Encode { what: &'static str, message: String },

    #[error("Invalid key material: {0}")]
    InvalidMaterial(String),
}

/// Secret store errors, one per failed store call
#[derive(Error, Debug)]
pub enum SecretStoreError {
    #[error("Secret already exists: {name}")]
    AlreadyExists { name: String },

    #[error("Secret not found: {name}")]
    NotFound { name: String },

    #[error("Secret store {operation} failed for {name}: {message}")]
    Backend {
        operation: &'static str,
        name: String,
        message: String,
    },
}

impl SecretStoreError {
    /// Name of the secret the failed call targeted
    pub fn secret_name(&self) -> &str {
        match self {
            SecretStoreError::AlreadyExists { name }
            | SecretStoreError::NotFound { name }
            | SecretStoreError::Backend { name, .. } => name,
        }
    }
}

/// Only one secret of the pair exists; needs manual reconciliation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Secret pair is inconsistent: {present} exists but {missing} is missing")]
pub struct PairInconsistencyError {
    pub present: String,
    pub missing: String,
}

/// Warehouse user directory update errors
#[derive(Error, Debug)]
pub enum DirectoryUpdateError {
    #[error("Invalid directory user: {0:?}")]
    InvalidUser(String),

    #[error("Invalid public key for {user}: {message}")]
    InvalidKey { user: String, message: String },

    #[error("Directory update failed for {user}: {message}")]
    Backend { user: String, message: String },
}

/// Errors that abort a rotation run
#[derive(Error, Debug)]
pub enum RotationError {
    #[error("Key source error: {0}")]
    KeySource(#[from] KeySourceError),

    #[error("Secret store error: {0}")]
    SecretStore(#[from] SecretStoreError),

    #[error(transparent)]
    PairInconsistency(#[from] PairInconsistencyError),

    #[error("Secret {written} was written before the failure: {source}")]
    PartialWrite {
        written: String,
        #[source]
        source: SecretStoreError,
    },

    #[error("Directory update error: {0}")]
    DirectoryUpdate(#[from] DirectoryUpdateError),

    #[error("Invalid secret name: {0}")]
    InvalidName(String),
}

/// Result type for rotation operations
pub type RotationResult<T> = Result<T, RotationError>;
