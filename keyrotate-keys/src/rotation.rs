//! One rotation run: generate, reconcile, update the directory
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


use crate::directory::DirectoryUpdater;
use crate::error::{RotationError, RotationResult};
use crate::key_types::{KeyId, PairAction, SecretNames};
use crate::kms::KeySource;
use crate::observer::ReconcileObserver;
use crate::reconcile::Reconciler;
use crate::secret_store::SecretStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, Instrument};
use uuid::Uuid;

/// What to rotate
#[derive(Debug, Clone)]
pub struct RotationRequest {
    /// Warehouse user owning the key pair
    pub user: String,
    /// Identifier handed to the key source
    pub key_id: KeyId,
    pub names: SecretNames,
}

/// Summary of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct RotationReport {
    pub run_id: Uuid,
    pub user: String,
    pub key_source: &'static str,
    pub action: PairAction,
    pub private_secret: String,
    pub public_secret: String,
    pub directory_updated: bool,
    pub rotated_at: DateTime<Utc>,
}

/// Collaborators for a rotation run
pub struct KeyRotator<'a> {
    key_source: &'a dyn KeySource,
    store: &'a dyn SecretStore,
    directory: &'a dyn DirectoryUpdater,
    observer: &'a dyn ReconcileObserver,
}

impl<'a> KeyRotator<'a> {
    pub fn new(
        key_source: &'a dyn KeySource,
        store: &'a dyn SecretStore,
        directory: &'a dyn DirectoryUpdater,
        observer: &'a dyn ReconcileObserver,
    ) -> Self {
        Self {
            key_source,
            store,
            directory,
            observer,
        }
    }

    /// Run one rotation. Any error aborts the run; writes already made stay.
    pub async fn rotate(&self, request: &RotationRequest) -> RotationResult<RotationReport> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("rotation", run_id = %run_id, user = %request.user);

        async move {
            info!(key_source = self.key_source.source_name(), "Starting key rotation");

            let material = self.key_source.generate_keypair(&request.key_id).await?;

            let reconciler = Reconciler::new(self.store, self.observer);
            let action = reconciler.plan(&request.names).await?;
            reconciler.apply(&request.names, &material, action).await?;

            self.directory
                .update_directory_user_key(&request.user, material.public_pem())
                .await?;

            let report = RotationReport {
                run_id,
                user: request.user.clone(),
                key_source: self.key_source.source_name(),
                action,
                private_secret: request.names.private().to_string(),
                public_secret: request.names.public().to_string(),
                directory_updated: self.directory.is_enabled(),
                rotated_at: Utc::now(),
            };
            info!(action = %action, "Key rotation finished");
            Ok::<_, RotationError>(report)
        }
        .instrument(span)
        .await
    }
}
