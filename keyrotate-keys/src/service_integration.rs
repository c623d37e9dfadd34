//! Wiring from configuration to rotation collaborators
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


use crate::error::RotationResult;
use crate::key_types::SecretNames;
use crate::kms::{KeySource, KmsKeySource, LocalKeySource};
use crate::rotation::RotationRequest;
use aws_config::{BehaviorVersion, Region};
use keyrotate_config::{KeySourceKind, RotationConfig};
use tracing::info;

/// Key id recorded for the local key source, which has no provider key
pub const LOCAL_KEY_ID: &str = "local";

/// AWS service clients sharing one SDK configuration
#[derive(Clone, Debug)]
pub struct AwsClients {
    pub kms: aws_sdk_kms::Client,
    pub secrets_manager: aws_sdk_secretsmanager::Client,
}

/// Build AWS clients from the default credential chain
pub async fn init_aws_clients(region: Option<&str>) -> AwsClients {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    let sdk_config = loader.load().await;

    info!(
        region = sdk_config.region().map(|r| r.as_ref()).unwrap_or("unset"),
        "AWS clients initialized"
    );

    AwsClients {
        kms: aws_sdk_kms::Client::new(&sdk_config),
        secrets_manager: aws_sdk_secretsmanager::Client::new(&sdk_config),
    }
}

/// Key source selected by configuration
pub fn key_source_for(kind: KeySourceKind, kms: &aws_sdk_kms::Client) -> Box<dyn KeySource> {
    match kind {
        KeySourceKind::Kms => Box::new(KmsKeySource::new(kms.clone())),
        KeySourceKind::Local => Box::new(LocalKeySource::new()),
    }
}

/// Rotation request for the configured identity
pub fn rotation_request(config: &RotationConfig) -> RotationResult<RotationRequest> {
    let names = SecretNames::for_user(&config.secret_namespace, &config.target_user)?;
    let key_id = match config.key_source {
        KeySourceKind::Kms => config.kms_key_arn.clone().unwrap_or_default(),
        KeySourceKind::Local => config
            .kms_key_arn
            .clone()
            .unwrap_or_else(|| LOCAL_KEY_ID.to_string()),
    };

    Ok(RotationRequest {
        user: config.target_user.clone(),
        key_id,
        names,
    })
}
