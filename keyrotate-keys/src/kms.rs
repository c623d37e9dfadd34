//! Key sources for RSA key pair generation
//!
//! [`KeySource`] is implemented by:
//! - AWS KMS (`GenerateDataKeyPair`, RSA 2048)
//! - Local in-process RSA generation
//!
//! Both hand back PKCS#8 private and SubjectPublicKeyInfo public PEM.
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


use crate::error::KeySourceError;
use crate::key_types::{KeyId, KeyMaterial};
use async_trait::async_trait;
use aws_sdk_kms::error::DisplayErrorContext;
use aws_sdk_kms::types::DataKeyPairSpec;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};
use tracing::{debug, info};

/// Modulus size for generated keys
pub const RSA_KEY_BITS: usize = 2048;

/// Trait for key pair providers
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Generate a fresh key pair for `key_id`
    async fn generate_keypair(&self, key_id: &KeyId) -> Result<KeyMaterial, KeySourceError>;

    /// Short name used in logs
    fn source_name(&self) -> &'static str;
}

/// AWS KMS data key pair generation
pub struct KmsKeySource {
    client: aws_sdk_kms::Client,
}

impl KmsKeySource {
    pub fn new(client: aws_sdk_kms::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl KeySource for KmsKeySource {
    async fn generate_keypair(&self, key_id: &KeyId) -> Result<KeyMaterial, KeySourceError> {
        if key_id.trim().is_empty() {
            return Err(KeySourceError::InvalidKeyId(key_id.clone()));
        }

        info!(key_id = %key_id, "Requesting data key pair from KMS");

        let response = self
            .client
            .generate_data_key_pair()
            .key_id(key_id)
            .key_pair_spec(DataKeyPairSpec::Rsa2048)
            .send()
            .await
            .map_err(|e| KeySourceError::Provider {
                key_id: key_id.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        let private_der = response
            .private_key_plaintext()
            .ok_or_else(|| KeySourceError::MissingField {
                key_id: key_id.clone(),
                field: "PrivateKeyPlaintext",
            })?;
        let public_der = response
            .public_key()
            .ok_or_else(|| KeySourceError::MissingField {
                key_id: key_id.clone(),
                field: "PublicKey",
            })?;

        let material = der_to_pem(private_der.as_ref(), public_der.as_ref())?;
        debug!(key_id = %key_id, "KMS key pair converted to PEM");
        Ok(material)
    }

    fn source_name(&self) -> &'static str {
        "kms"
    }
}

/// In-process RSA generation; the key identifier is only used for logging
#[derive(Debug, Default)]
pub struct LocalKeySource;

impl LocalKeySource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl KeySource for LocalKeySource {
    async fn generate_keypair(&self, key_id: &KeyId) -> Result<KeyMaterial, KeySourceError> {
        info!(key_id = %key_id, bits = RSA_KEY_BITS, "Generating RSA key pair locally");

        // Key generation is CPU bound, keep it off the runtime thread
        let private_key = tokio::task::spawn_blocking(|| {
            let mut rng = rsa::rand_core::OsRng;
            RsaPrivateKey::new(&mut rng, RSA_KEY_BITS)
        })
        .await
        .map_err(|e| KeySourceError::Provider {
            key_id: key_id.clone(),
            message: format!("Key generation task failed: {}", e),
        })?
        .map_err(|e| KeySourceError::Provider {
            key_id: key_id.clone(),
            message: e.to_string(),
        })?;

        encode_pem(&private_key, &private_key.to_public_key())
    }

    fn source_name(&self) -> &'static str {
        "local"
    }
}

/// Convert a PKCS#8 DER private key and SPKI DER public key to PEM
pub fn der_to_pem(private_der: &[u8], public_der: &[u8]) -> Result<KeyMaterial, KeySourceError> {
    let private_key =
        RsaPrivateKey::from_pkcs8_der(private_der).map_err(|e| KeySourceError::Decode {
            what: "private key",
            message: e.to_string(),
        })?;
    let public_key =
        RsaPublicKey::from_public_key_der(public_der).map_err(|e| KeySourceError::Decode {
            what: "public key",
            message: e.to_string(),
        })?;

    if private_key.to_public_key() != public_key {
        return Err(KeySourceError::InvalidMaterial(
            "public key does not match private key".to_string(),
        ));
    }

    encode_pem(&private_key, &public_key)
}

fn encode_pem(
    private_key: &RsaPrivateKey,
    public_key: &RsaPublicKey,
) -> Result<KeyMaterial, KeySourceError> {
    let private_pem = private_key
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| KeySourceError::Encode {
            what: "private key",
            message: e.to_string(),
        })?;
    let public_pem = public_key
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| KeySourceError::Encode {
            what: "public key",
            message: e.to_string(),
        })?;

    KeyMaterial::new(private_pem.to_string(), public_pem)
}
