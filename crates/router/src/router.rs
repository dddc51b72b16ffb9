//! Key router: serves derived keys and forwards everything else to a backend.

use std::fmt;

use seedpass_key_deriv::{
    derive_domain_key, derive_hierarchical_key, encode_domain, encode_hierarchical, Curve,
    DerivationContext, DerivationPath, DomainContext, MainSecret,
};
use tracing::{debug, info, warn};

use crate::{
    CreateKeyRequest, KeyInfo, KeyManager, KeyType, MnemonicSource, PrivateKeyImporter,
    RouterConfig, RouterError, SeedPhrase,
};

/// [`KeyManager`] that derives keys from a seed phrase and delegates the rest to `B`.
///
/// Routing of [`KeyManager::create_key`]:
///
/// | key type                          | context        | served by                    |
/// |-----------------------------------|----------------|------------------------------|
/// | `P256`                            | none           | rejected                     |
/// | any other                         | none           | backend, unchanged           |
/// | `P256`                            | `Domain`       | passkey derivation           |
/// | `Secp256k1`, `Ed25519`, `X25519`  | `Hierarchical` | tree derivation + import     |
/// | anything else                     | any            | rejected                     |
///
/// Every other operation is forwarded to the backend as is. The router holds no state between
/// calls and can be shared across tasks.
pub struct KeyRouter<B, S, I> {
    name: String,
    backend: B,
    mnemonic_source: S,
    importer: I,
}

impl<B, S, I> fmt::Debug for KeyRouter<B, S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRouter")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<B, S, I> KeyRouter<B, S, I>
where
    B: KeyManager,
    S: MnemonicSource,
    I: PrivateKeyImporter,
{
    /// Wraps `backend`.
    pub fn new(config: RouterConfig, backend: B, mnemonic_source: S, importer: I) -> Self {
        let name = config.resolve_name(backend.name());
        debug!(%name, backend = %backend.name(), "key router created");
        Self {
            name,
            backend,
            mnemonic_source,
            importer,
        }
    }

    /// The wrapped backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    async fn seed_phrase(&self) -> Result<SeedPhrase, RouterError> {
        self.mnemonic_source
            .seed_phrase()
            .await
            .map_err(|e| RouterError::MnemonicSource(Box::new(e)))
    }

    async fn create_domain_key(&self, ctx: DomainContext) -> Result<KeyInfo, RouterError> {
        ctx.validate()?;
        let phrase = self.seed_phrase().await?;

        // Passkeys never take the passphrase, so they survive a passphrase change.
        let secret = MainSecret::from_mnemonic(phrase.mnemonic(), None)?;
        let key = derive_domain_key(&secret, &ctx)?;
        let record = encode_domain(&key, &ctx)?;

        info!(key_id = %record.id(), "derived passkey");
        Ok(KeyInfo {
            id: record.id().to_owned(),
            key_type: KeyType::P256,
            public_key: Some(record),
        })
    }

    async fn create_hierarchical_key(
        &self,
        key_type: KeyType,
        curve: Curve,
        path: &DerivationPath,
    ) -> Result<KeyInfo, RouterError> {
        let phrase = self.seed_phrase().await?;
        let secret = MainSecret::from_mnemonic(phrase.mnemonic(), phrase.passphrase())?;
        let key = derive_hierarchical_key(&secret, path, curve)?;
        let record = encode_hierarchical(&key, path)?;

        self.importer
            .import_private_key(record.id(), curve, key.private_key())
            .await
            .map_err(|e| RouterError::Import(Box::new(e)))?;

        info!(key_id = %record.id(), %curve, "derived hierarchical key");
        Ok(KeyInfo {
            id: record.id().to_owned(),
            key_type,
            public_key: Some(record),
        })
    }
}

impl<B, S, I> KeyManager for KeyRouter<B, S, I>
where
    B: KeyManager,
    S: MnemonicSource,
    I: PrivateKeyImporter,
{
    type Error = RouterError;

    fn name(&self) -> &str {
        &self.name
    }

    async fn create_key(&self, request: CreateKeyRequest) -> Result<KeyInfo, RouterError> {
        let CreateKeyRequest { key_type, context } = request;
        match context {
            None if key_type == KeyType::P256 => {
                warn!(%key_type, "refusing to create a passkey without a derivation context");
                Err(RouterError::MissingDerivationContext(key_type))
            }
            None => {
                debug!(%key_type, "forwarding key creation to backend");
                self.backend
                    .create_key(CreateKeyRequest::generated(key_type))
                    .await
                    .map_err(RouterError::backend)
            }
            Some(DerivationContext::Domain(ctx)) if key_type == KeyType::P256 => {
                self.create_domain_key(ctx).await
            }
            Some(DerivationContext::Hierarchical { path }) => match hierarchical_curve(key_type) {
                Some(curve) => self.create_hierarchical_key(key_type, curve, &path).await,
                None => Err(RouterError::UnsupportedCurve {
                    key_type,
                    pipeline: "hierarchical",
                }),
            },
            Some(ctx) => Err(RouterError::UnsupportedCurve {
                key_type,
                pipeline: ctx.pipeline(),
            }),
        }
    }

    async fn public_key(&self, key_id: &str) -> Result<KeyInfo, RouterError> {
        self.backend
            .public_key(key_id)
            .await
            .map_err(RouterError::backend)
    }

    async fn delete_key(&self, key_id: &str) -> Result<(), RouterError> {
        self.backend
            .delete_key(key_id)
            .await
            .map_err(RouterError::backend)
    }

    async fn random_bytes(&self, len: usize) -> Result<Vec<u8>, RouterError> {
        self.backend
            .random_bytes(len)
            .await
            .map_err(RouterError::backend)
    }

    async fn sign(&self, key_id: &str, data: &[u8]) -> Result<Vec<u8>, RouterError> {
        self.backend
            .sign(key_id, data)
            .await
            .map_err(RouterError::backend)
    }

    async fn verify(
        &self,
        key_id: &str,
        data: &[u8],
        signature: &[u8],
    ) -> Result<bool, RouterError> {
        self.backend
            .verify(key_id, data, signature)
            .await
            .map_err(RouterError::backend)
    }

    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>, RouterError> {
        self.backend
            .encrypt(key_id, plaintext)
            .await
            .map_err(RouterError::backend)
    }

    async fn decrypt(&self, key_id: &str, ciphertext: &[u8]) -> Result<Vec<u8>, RouterError> {
        self.backend
            .decrypt(key_id, ciphertext)
            .await
            .map_err(RouterError::backend)
    }
}

/// Curves the hierarchical pipeline serves.
const fn hierarchical_curve(key_type: KeyType) -> Option<Curve> {
    match key_type {
        KeyType::Secp256k1 => Some(Curve::Secp256k1),
        KeyType::Ed25519 => Some(Curve::Ed25519),
        KeyType::X25519 => Some(Curve::X25519),
        KeyType::P256 | KeyType::Aes256Gcm | KeyType::ChaCha20Poly1305 => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    };

    use seedpass_key_deriv::{DerivationError, DomainContext};

    use super::*;

    const ABANDON_ABOUT: &str = "abandon abandon abandon abandon abandon abandon \
                                 abandon abandon abandon abandon abandon about";

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct FakeError(&'static str);

    #[derive(Debug, Default)]
    struct MemoryBackend {
        created: Mutex<Vec<CreateKeyRequest>>,
    }

    impl MemoryBackend {
        fn created(&self) -> Vec<CreateKeyRequest> {
            self.created.lock().unwrap().clone()
        }
    }

    impl KeyManager for MemoryBackend {
        type Error = FakeError;

        fn name(&self) -> &str {
            "memory"
        }

        async fn create_key(&self, request: CreateKeyRequest) -> Result<KeyInfo, FakeError> {
            let mut created = self.created.lock().unwrap();
            created.push(request.clone());
            Ok(KeyInfo {
                id: format!("mem-{}", created.len()),
                key_type: request.key_type,
                public_key: None,
            })
        }

        async fn public_key(&self, key_id: &str) -> Result<KeyInfo, FakeError> {
            Ok(KeyInfo {
                id: key_id.to_owned(),
                key_type: KeyType::Ed25519,
                public_key: None,
            })
        }

        async fn delete_key(&self, key_id: &str) -> Result<(), FakeError> {
            match key_id {
                "missing" => Err(FakeError("no such key")),
                _ => Ok(()),
            }
        }

        async fn random_bytes(&self, len: usize) -> Result<Vec<u8>, FakeError> {
            Ok(vec![7; len])
        }

        async fn sign(&self, _key_id: &str, data: &[u8]) -> Result<Vec<u8>, FakeError> {
            Ok(data.iter().rev().copied().collect())
        }

        async fn verify(
            &self,
            _key_id: &str,
            data: &[u8],
            signature: &[u8],
        ) -> Result<bool, FakeError> {
            Ok(data.iter().rev().eq(signature.iter()))
        }

        async fn encrypt(&self, _key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>, FakeError> {
            Ok(plaintext.iter().map(|b| b ^ 0x5a).collect())
        }

        async fn decrypt(&self, _key_id: &str, ciphertext: &[u8]) -> Result<Vec<u8>, FakeError> {
            Ok(ciphertext.iter().map(|b| b ^ 0x5a).collect())
        }
    }

    #[derive(Debug, Default)]
    struct StaticSource {
        mnemonic: Option<&'static str>,
        passphrase: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl StaticSource {
        fn new(mnemonic: &'static str) -> Self {
            Self {
                mnemonic: Some(mnemonic),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl MnemonicSource for StaticSource {
        type Error = FakeError;

        async fn seed_phrase(&self) -> Result<SeedPhrase, FakeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mnemonic = self.mnemonic.ok_or(FakeError("keystore locked"))?;
            Ok(SeedPhrase::new(
                mnemonic,
                self.passphrase.map(str::to_owned),
            ))
        }
    }

    type Imported = (String, Curve, [u8; 32]);

    #[derive(Debug, Default)]
    struct RecordingImporter {
        imported: Mutex<Vec<Imported>>,
        reject: bool,
    }

    impl RecordingImporter {
        fn imported(&self) -> Vec<Imported> {
            self.imported.lock().unwrap().clone()
        }
    }

    impl PrivateKeyImporter for RecordingImporter {
        type Error = FakeError;

        async fn import_private_key(
            &self,
            key_id: &str,
            curve: Curve,
            private_key: &[u8; 32],
        ) -> Result<(), FakeError> {
            if self.reject {
                return Err(FakeError("import disabled"));
            }
            self.imported
                .lock()
                .unwrap()
                .push((key_id.to_owned(), curve, *private_key));
            Ok(())
        }
    }

    type TestRouter = KeyRouter<MemoryBackend, StaticSource, RecordingImporter>;

    fn router_with(source: StaticSource) -> TestRouter {
        KeyRouter::new(
            RouterConfig::default(),
            MemoryBackend::default(),
            source,
            RecordingImporter::default(),
        )
    }

    fn router() -> TestRouter {
        router_with(StaticSource::new(ABANDON_ABOUT))
    }

    fn passkey_request(counter: u32) -> CreateKeyRequest {
        let ctx = DomainContext::new("https://example.com", "user123", counter).unwrap();
        CreateKeyRequest::derived(KeyType::P256, ctx)
    }

    fn tree_request(key_type: KeyType, path: &str) -> CreateKeyRequest {
        let path: DerivationPath = path.parse().unwrap();
        CreateKeyRequest::derived(key_type, path)
    }

    #[tokio::test]
    async fn derives_passkey() {
        let router = router();
        let info = router.create_key(passkey_request(0)).await.unwrap();

        assert_eq!(info.id, "p256-https://example.com-user123-0");
        assert_eq!(info.key_type, KeyType::P256);
        let record = info.public_key.unwrap();
        assert_eq!(record.id(), info.id);
        let (x, y) = record.coordinates().unwrap();
        assert_eq!(x.len(), 32);
        assert_eq!(y.len(), 32);

        assert!(router.backend().created().is_empty());
        assert!(router.importer.imported().is_empty());
    }

    #[tokio::test]
    async fn counter_selects_a_new_passkey() {
        let router = router();
        let first = router.create_key(passkey_request(0)).await.unwrap();
        let second = router.create_key(passkey_request(1)).await.unwrap();

        assert_eq!(second.id, "p256-https://example.com-user123-1");
        assert_ne!(first.public_key, second.public_key);

        let again = router.create_key(passkey_request(0)).await.unwrap();
        assert_eq!(first, again);
    }

    #[tokio::test]
    async fn passkey_requires_context() {
        let router = router();
        let err = router
            .create_key(CreateKeyRequest::generated(KeyType::P256))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RouterError::MissingDerivationContext(KeyType::P256)
        ));
        assert!(router.backend().created().is_empty());
        assert_eq!(router.mnemonic_source.calls(), 0);
    }

    #[tokio::test]
    async fn contextless_requests_pass_through() {
        let router = router();
        for key_type in [KeyType::Aes256Gcm, KeyType::Ed25519, KeyType::ChaCha20Poly1305] {
            let info = router
                .create_key(CreateKeyRequest::generated(key_type))
                .await
                .unwrap();
            assert_eq!(info.key_type, key_type);
            assert!(info.public_key.is_none());
        }

        let created = router.backend().created();
        assert_eq!(created.len(), 3);
        assert_eq!(created[0], CreateKeyRequest::generated(KeyType::Aes256Gcm));
        assert_eq!(router.mnemonic_source.calls(), 0);
    }

    #[tokio::test]
    async fn derives_hierarchical_keys() {
        let router = router();
        let a = router
            .create_key(tree_request(KeyType::Secp256k1, "m/44'/0'/0'/0/0"))
            .await
            .unwrap();
        let b = router
            .create_key(tree_request(KeyType::Secp256k1, "m/44'/0'/0'/0/1"))
            .await
            .unwrap();

        assert_eq!(a.id, "secp256k1-m/44'/0'/0'/0/0");
        assert_eq!(a.key_type, KeyType::Secp256k1);
        assert_ne!(a.public_key, b.public_key);
        let record = a.public_key.clone().unwrap();
        assert_eq!(
            record.public_key(),
            [
                0x03, 0xaa, 0xeb, 0x52, 0xdd, 0x74, 0x94, 0xc3, 0x61, 0x04, 0x9d, 0xe6, 0x7c,
                0xc6, 0x80, 0xe8, 0x3e, 0xbc, 0xbb, 0xbd, 0xbe, 0xb1, 0x36, 0x37, 0xd9, 0x2c,
                0xd8, 0x45, 0xf7, 0x03, 0x08, 0xaf, 0x5e,
            ]
        );

        let again = router
            .create_key(tree_request(KeyType::Secp256k1, "m/44'/0'/0'/0/0"))
            .await
            .unwrap();
        assert_eq!(a, again);

        let imported = router.importer.imported();
        assert_eq!(imported.len(), 3);
        assert_eq!(imported[0].0, a.id);
        assert_eq!(imported[0].1, Curve::Secp256k1);
        assert_eq!(imported[0].2, imported[2].2);
        assert_ne!(imported[0].2, imported[1].2);
        assert!(router.backend().created().is_empty());
    }

    #[tokio::test]
    async fn passphrase_only_reaches_hierarchical_keys() {
        let plain = router();
        let salted = router_with(StaticSource {
            passphrase: Some("TREZOR"),
            ..StaticSource::new(ABANDON_ABOUT)
        });

        let a = plain.create_key(passkey_request(0)).await.unwrap();
        let b = salted.create_key(passkey_request(0)).await.unwrap();
        assert_eq!(a, b);

        let req = tree_request(KeyType::Ed25519, "m/44'/501'/0'");
        let a = plain.create_key(req.clone()).await.unwrap();
        let b = salted.create_key(req).await.unwrap();
        assert_eq!(a.id, b.id);
        assert_ne!(a.public_key, b.public_key);
    }

    #[tokio::test]
    async fn mismatched_pairings_are_unsupported() {
        let router = router();
        let domain = DomainContext::new("https://example.com", "user123", 0).unwrap();

        for (request, pipeline) in [
            (CreateKeyRequest::derived(KeyType::Ed25519, domain.clone()), "domain"),
            (CreateKeyRequest::derived(KeyType::Aes256Gcm, domain), "domain"),
            (tree_request(KeyType::P256, "m/0'"), "hierarchical"),
            (tree_request(KeyType::ChaCha20Poly1305, "m/0'"), "hierarchical"),
        ] {
            let key_type = request.key_type;
            let err = router.create_key(request).await.unwrap_err();
            assert!(
                matches!(
                    err,
                    RouterError::UnsupportedCurve { key_type: k, pipeline: p }
                        if k == key_type && p == pipeline
                ),
                "{key_type} via {pipeline}: {err}"
            );
        }

        assert_eq!(router.mnemonic_source.calls(), 0);
        assert!(router.backend().created().is_empty());
    }

    #[tokio::test]
    async fn derivation_errors_surface() {
        let router = router();
        let err = router
            .create_key(tree_request(KeyType::Ed25519, "m/44'/0'/0"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RouterError::Derivation(DerivationError::InvalidDerivationPath { .. })
        ));
        assert!(router.importer.imported().is_empty());

        let router = router_with(StaticSource::new("abandon abandon abandon"));
        let err = router.create_key(passkey_request(0)).await.unwrap_err();
        assert!(matches!(
            err,
            RouterError::Derivation(DerivationError::InvalidMnemonic(_))
        ));
    }

    #[tokio::test]
    async fn host_failures_surface() {
        let router = router_with(StaticSource::default());
        let err = router.create_key(passkey_request(0)).await.unwrap_err();
        assert!(matches!(err, RouterError::MnemonicSource(_)));
        assert_eq!(router.mnemonic_source.calls(), 1);

        let router = KeyRouter::new(
            RouterConfig::default(),
            MemoryBackend::default(),
            StaticSource::new(ABANDON_ABOUT),
            RecordingImporter {
                reject: true,
                ..Default::default()
            },
        );
        let err = router
            .create_key(tree_request(KeyType::X25519, "m/0'"))
            .await
            .unwrap_err();
        assert!(matches!(err, RouterError::Import(_)));
        assert_eq!(err.to_string(), "private key import failed: import disabled");
    }

    #[tokio::test]
    async fn other_operations_pass_through() {
        let router = router();

        let sig = router.sign("k1", b"hello").await.unwrap();
        assert_eq!(sig, b"olleh");
        assert!(router.verify("k1", b"hello", &sig).await.unwrap());
        assert!(!router.verify("k1", b"hello", b"hello").await.unwrap());

        let ct = router.encrypt("k2", b"secret").await.unwrap();
        assert_ne!(ct, b"secret");
        assert_eq!(router.decrypt("k2", &ct).await.unwrap(), b"secret");

        assert_eq!(router.random_bytes(4).await.unwrap(), vec![7; 4]);
        assert_eq!(router.public_key("k3").await.unwrap().id, "k3");
        router.delete_key("k3").await.unwrap();

        let err = router.delete_key("missing").await.unwrap_err();
        assert!(matches!(err, RouterError::Backend(_)));
        assert_eq!(err.to_string(), "backend failed: no such key");
    }

    #[tokio::test]
    async fn name_follows_config() {
        assert_eq!(router().name(), "memory+seed");

        let named = KeyRouter::new(
            RouterConfig {
                name: Some("vault".to_owned()),
            },
            MemoryBackend::default(),
            StaticSource::new(ABANDON_ABOUT),
            RecordingImporter::default(),
        );
        assert_eq!(named.name(), "vault");
    }

    #[tokio::test]
    async fn concurrent_requests_agree() {
        let router = Arc::new(router());
        let tasks = (0..8)
            .map(|_| {
                let router = router.clone();
                tokio::spawn(async move { router.create_key(passkey_request(3)).await })
            })
            .collect::<Vec<_>>();

        let mut infos = Vec::new();
        for task in tasks {
            infos.push(task.await.unwrap().unwrap());
        }
        assert!(infos.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(router.mnemonic_source.calls(), 8);
    }
}
