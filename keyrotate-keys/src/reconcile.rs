//! Create-vs-update reconciliation of a private/public secret pair
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


use crate::error::{PairInconsistencyError, RotationError, RotationResult};
use crate::key_types::{KeyMaterial, PairAction, PairState, SecretNames, SecretRef, SecretRole};
use crate::observer::ReconcileObserver;
use crate::secret_store::SecretStore;

/// Keeps both secrets of an identity in step.
///
/// Both secrets are created together, updated together, or left alone when
/// the store holds only one of them. Existence checks and writes are separate
/// store calls with no lock between them.
pub struct Reconciler<'a> {
    store: &'a dyn SecretStore,
    observer: &'a dyn ReconcileObserver,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn SecretStore, observer: &'a dyn ReconcileObserver) -> Self {
        Self { store, observer }
    }

    /// Check existence of both secrets, private first
    pub async fn observe(&self, names: &SecretNames) -> RotationResult<PairState> {
        let private = SecretRef::new(names.private(), self.check(names.private()).await?);
        let public = SecretRef::new(names.public(), self.check(names.public()).await?);

        let state = PairState::classify(&private, &public);
        self.observer.observed(names, &state);
        Ok(state)
    }

    async fn check(&self, name: &str) -> RotationResult<bool> {
        self.store.secret_exists(name).await.map_err(|e| {
            self.observer.check_failed(name, &e);
            e.into()
        })
    }

    /// Decide the pair action from live store state
    pub async fn plan(&self, names: &SecretNames) -> RotationResult<PairAction> {
        let action = match self.observe(names).await? {
            PairState::BothExist => PairAction::Update,
            PairState::NeitherExists => PairAction::Create,
            PairState::ExactlyOneExists { present, missing } => {
                let err = PairInconsistencyError { present, missing };
                self.observer.inconsistent(&err);
                return Err(err.into());
            }
        };
        self.observer.action_chosen(names, action);
        Ok(action)
    }

    /// Write both secrets with `action`, private first. No retry, no rollback.
    pub async fn apply(
        &self,
        names: &SecretNames,
        material: &KeyMaterial,
        action: PairAction,
    ) -> RotationResult<()> {
        let mut written: Option<&str> = None;

        for role in SecretRole::ORDER {
            let name = names.name_for(role);
            let value = material.pem_for(role);

            let result = match action {
                PairAction::Create => self.store.create_secret(name, value).await,
                PairAction::Update => self.store.update_secret(name, value).await,
            };

            if let Err(e) = result {
                self.observer.write_failed(name, action, written, &e);
                return Err(match written {
                    Some(w) => RotationError::PartialWrite {
                        written: w.to_string(),
                        source: e,
                    },
                    None => e.into(),
                });
            }

            self.observer.secret_written(name, role, action);
            written = Some(name);
        }

        self.observer.completed(names, action);
        Ok(())
    }

    /// Ensure both secrets hold `material`
    pub async fn reconcile(&self, names: &SecretNames, material: &KeyMaterial) -> RotationResult<()> {
        let action = self.plan(names).await?;
        self.apply(names, material, action).await
    }
}
