//! Hooks invoked by the reconciler at each decision point
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


use crate::error::{PairInconsistencyError, SecretStoreError};
use crate::key_types::{PairAction, PairState, SecretNames, SecretRole};
use tracing::{error, info};

/// Receives reconciliation events; every method defaults to a no-op
pub trait ReconcileObserver: Send + Sync {
    /// Existence of both secrets was checked
    fn observed(&self, _names: &SecretNames, _state: &PairState) {}

    /// An existence check failed; nothing was written
    fn check_failed(&self, _name: &str, _error: &SecretStoreError) {}

    /// Create or update was chosen for the pair
    fn action_chosen(&self, _names: &SecretNames, _action: PairAction) {}

    /// One secret of the pair was written
    fn secret_written(&self, _name: &str, _role: SecretRole, _action: PairAction) {}

    /// A write failed; `written` names the secret already written in this run, if any
    fn write_failed(
        &self,
        _name: &str,
        _action: PairAction,
        _written: Option<&str>,
        _error: &SecretStoreError,
    ) {
    }

    /// Only one secret of the pair exists; nothing was written
    fn inconsistent(&self, _error: &PairInconsistencyError) {}

    /// Both secrets hold the new values
    fn completed(&self, _names: &SecretNames, _action: PairAction) {}
}

/// Observer that ignores every event
#[derive(Debug, Default)]
pub struct NoopObserver;

impl ReconcileObserver for NoopObserver {}

/// Observer emitting structured `tracing` events
#[derive(Debug, Default)]
pub struct TracingObserver;

impl ReconcileObserver for TracingObserver {
    fn observed(&self, names: &SecretNames, state: &PairState) {
        info!(
            private_secret = names.private(),
            public_secret = names.public(),
            state = state.as_str(),
            "Observed secret pair state"
        );
    }

    fn check_failed(&self, name: &str, error: &SecretStoreError) {
        error!(secret = name, error = %error, "Secret existence check failed");
    }

    fn action_chosen(&self, names: &SecretNames, action: PairAction) {
        info!(
            private_secret = names.private(),
            public_secret = names.public(),
            action = %action,
            "Reconciling secret pair"
        );
    }

    fn secret_written(&self, name: &str, role: SecretRole, action: PairAction) {
        info!(secret = name, role = %role, action = %action, "Secret written");
    }

    fn write_failed(
        &self,
        name: &str,
        action: PairAction,
        written: Option<&str>,
        error: &SecretStoreError,
    ) {
        error!(
            secret = name,
            action = %action,
            already_written = written.unwrap_or("none"),
            error = %error,
            "Secret write failed"
        );
    }

    fn inconsistent(&self, error: &PairInconsistencyError) {
        error!(
            present = %error.present,
            missing = %error.missing,
            "Secret pair is inconsistent, manual reconciliation required"
        );
    }

    fn completed(&self, names: &SecretNames, action: PairAction) {
        info!(
            private_secret = names.private(),
            public_secret = names.public(),
            action = %action,
            "Secret pair reconciled"
        );
    }
}
