//! RSA key pair rotation for warehouse service accounts
//!
//! Requests a key pair from a key source, stores the private and public PEM
//! in a secret store as a pair, and hands the public key to the user directory.
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


pub mod directory;
pub mod error;
pub mod key_types;
pub mod kms;
pub mod local_store;
pub mod observer;
pub mod reconcile;
pub mod rotation;
pub mod secret_store;
pub mod service_integration;

pub use directory::{AlterUserStatement, DirectoryUpdater, InertDirectoryUpdater};
pub use error::{
    DirectoryUpdateError, KeySourceError, PairInconsistencyError, RotationError, RotationResult,
    SecretStoreError,
};
pub use key_types::{KeyId, KeyMaterial, PairAction, PairState, SecretNames, SecretRef, SecretRole};
pub use kms::{KeySource, KmsKeySource, LocalKeySource};
pub use local_store::MemorySecretStore;
pub use observer::{NoopObserver, ReconcileObserver, TracingObserver};
pub use reconcile::Reconciler;
pub use rotation::{KeyRotator, RotationReport, RotationRequest};
pub use secret_store::{SecretStore, SecretsManagerStore};
pub use service_integration::*;
