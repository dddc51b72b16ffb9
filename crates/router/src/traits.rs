//! The traits that make up the router's interfaces.
//!
//! [`KeyManager`] is both the contract of the host backend and the contract the router itself
//! exposes. [`MnemonicSource`] and [`PrivateKeyImporter`] are the host collaborators a router
//! needs to serve derived keys.

use std::{error::Error, future::Future};

use seedpass_key_deriv::Curve;

use crate::{CreateKeyRequest, KeyInfo, SeedPhrase};

/// Key management backend.
pub trait KeyManager: Send + Sync {
    /// Error returned by every operation.
    type Error: Error + Send + Sync + 'static;

    /// Human readable name of this manager.
    fn name(&self) -> &str;

    /// Creates a key.
    fn create_key(
        &self,
        request: CreateKeyRequest,
    ) -> impl Future<Output = Result<KeyInfo, Self::Error>> + Send;

    /// Looks up a key by identifier.
    fn public_key(&self, key_id: &str) -> impl Future<Output = Result<KeyInfo, Self::Error>> + Send;

    /// Deletes a key.
    fn delete_key(&self, key_id: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Returns `len` random bytes.
    fn random_bytes(&self, len: usize) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send;

    /// Signs `data` with the key `key_id`.
    fn sign(
        &self,
        key_id: &str,
        data: &[u8],
    ) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send;

    /// Checks `signature` over `data` against the key `key_id`.
    fn verify(
        &self,
        key_id: &str,
        data: &[u8],
        signature: &[u8],
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Encrypts `plaintext` under the key `key_id`.
    fn encrypt(
        &self,
        key_id: &str,
        plaintext: &[u8],
    ) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send;

    /// Decrypts `ciphertext` under the key `key_id`.
    fn decrypt(
        &self,
        key_id: &str,
        ciphertext: &[u8],
    ) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send;
}

/// Source of the seed phrase derived keys come from.
///
/// Called once per derivation; the router keeps nothing between calls.
pub trait MnemonicSource: Send + Sync {
    /// Error returned when the phrase is unavailable.
    type Error: Error + Send + Sync + 'static;

    /// Fetches the seed phrase.
    fn seed_phrase(&self) -> impl Future<Output = Result<SeedPhrase, Self::Error>> + Send;
}

/// Host path for installing a derived private key into the backend.
pub trait PrivateKeyImporter: Send + Sync {
    /// Error returned when the import fails.
    type Error: Error + Send + Sync + 'static;

    /// Stores `private_key` on `curve` under `key_id`.
    fn import_private_key(
        &self,
        key_id: &str,
        curve: Curve,
        private_key: &[u8; 32],
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
