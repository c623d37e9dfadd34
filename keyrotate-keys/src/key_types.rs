//! Key and secret type definitions
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


use crate::error::{KeySourceError, RotationError};
use serde::Serialize;
use std::fmt;

/// Identifier passed to the key source (KMS key id or ARN)
pub type KeyId = String;

/// PEM encoded key pair produced once per run
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    private_pem: String,
    public_pem: String,
}

impl KeyMaterial {
    pub fn new(private_pem: String, public_pem: String) -> Result<Self, KeySourceError> {
        if private_pem.trim().is_empty() {
            return Err(KeySourceError::InvalidMaterial("private key PEM is empty".to_string()));
        }
        if public_pem.trim().is_empty() {
            return Err(KeySourceError::InvalidMaterial("public key PEM is empty".to_string()));
        }
        Ok(Self {
            private_pem,
            public_pem,
        })
    }

    pub fn private_pem(&self) -> &str {
        &self.private_pem
    }

    pub fn public_pem(&self) -> &str {
        &self.public_pem
    }

    /// PEM value for one half of the pair
    pub fn pem_for(&self, role: SecretRole) -> &str {
        match role {
            SecretRole::Private => &self.private_pem,
            SecretRole::Public => &self.public_pem,
        }
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("private_pem", &"<redacted>")
            .field("public_pem", &self.public_pem)
            .finish()
    }
}

/// Which half of the key pair a secret holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretRole {
    Private,
    Public,
}

impl SecretRole {
    /// Write order within a pair
    pub const ORDER: [SecretRole; 2] = [SecretRole::Private, SecretRole::Public];
}

impl fmt::Display for SecretRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretRole::Private => f.write_str("private_key"),
            SecretRole::Public => f.write_str("public_key"),
        }
    }
}

/// Names of the two secrets belonging to one identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretNames {
    private: String,
    public: String,
}

impl SecretNames {
    /// `<namespace>/<user>/private_key` and `<namespace>/<user>/public_key`
    pub fn for_user(namespace: &str, user: &str) -> Result<Self, RotationError> {
        let namespace = namespace.trim_matches('/');
        if namespace.is_empty() {
            return Err(RotationError::InvalidName("secret namespace is empty".to_string()));
        }
        if user.is_empty() || user.contains('/') {
            return Err(RotationError::InvalidName(format!(
                "user {:?} cannot be part of a secret name",
                user
            )));
        }
        Self::new(
            format!("{}/{}/{}", namespace, user, SecretRole::Private),
            format!("{}/{}/{}", namespace, user, SecretRole::Public),
        )
    }

    pub fn new(private: String, public: String) -> Result<Self, RotationError> {
        if private.is_empty() || public.is_empty() {
            return Err(RotationError::InvalidName("secret name is empty".to_string()));
        }
        if private == public {
            return Err(RotationError::InvalidName(format!(
                "private and public secrets share the name {}",
                private
            )));
        }
        Ok(Self { private, public })
    }

    pub fn private(&self) -> &str {
        &self.private
    }

    pub fn public(&self) -> &str {
        &self.public
    }

    pub fn name_for(&self, role: SecretRole) -> &str {
        match role {
            SecretRole::Private => &self.private,
            SecretRole::Public => &self.public,
        }
    }
}

/// A secret name with its observed existence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRef {
    pub name: String,
    pub exists: bool,
}

impl SecretRef {
    pub fn new(name: impl Into<String>, exists: bool) -> Self {
        Self {
            name: name.into(),
            exists,
        }
    }
}

/// Joint existence state of a secret pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairState {
    NeitherExists,
    BothExist,
    /// Never valid for a well-formed identity
    ExactlyOneExists { present: String, missing: String },
}

impl PairState {
    pub fn classify(private: &SecretRef, public: &SecretRef) -> Self {
        match (private.exists, public.exists) {
            (false, false) => PairState::NeitherExists,
            (true, true) => PairState::BothExist,
            (true, false) => PairState::ExactlyOneExists {
                present: private.name.clone(),
                missing: public.name.clone(),
            },
            (false, true) => PairState::ExactlyOneExists {
                present: public.name.clone(),
                missing: private.name.clone(),
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PairState::NeitherExists => "neither_exists",
            PairState::BothExist => "both_exist",
            PairState::ExactlyOneExists { .. } => "exactly_one_exists",
        }
    }
}

/// Write performed on both secrets of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairAction {
    Create,
    Update,
}

impl fmt::Display for PairAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairAction::Create => f.write_str("create"),
            PairAction::Update => f.write_str("update"),
        }
    }
}
