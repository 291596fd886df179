use crate::domain::models::{LimitedBody, VerifiedPayload};
use pgp::{Deserializable, SignedPublicKey, SignedPublicSubKey, StandaloneSignature};
use sha2::{Digest, Sha256};

#[derive(thiserror::Error, Debug)]
pub enum KeyRingError {
    #[error("no trusted public key was embedded at build time")]
    Empty,
    #[error("embedded key ring is not valid armored OpenPGP: {0}")]
    Parse(#[source] pgp::errors::Error),
    #[error("embedded key for {identity} failed self-signature check: {source}")]
    InvalidKey {
        identity: String,
        #[source]
        source: pgp::errors::Error,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum SignatureError {
    #[error("malformed signature: {0}")]
    Malformed(#[source] pgp::errors::Error),
    #[error("content and signature mismatch: no trusted key produced this signature")]
    Mismatch,
    #[error("content exceeds {limit} bytes and the truncated prefix does not match the signature")]
    ContentTooLarge { limit: u64 },
}

/// Immutable set of trusted public keys, loaded once per process.
#[derive(Debug)]
pub struct TrustedKeyRing {
    keys: Vec<SignedPublicKey>,
}

impl TrustedKeyRing {
    pub fn from_armored(armored: &str) -> Result<Self, KeyRingError> {
        if armored.trim().is_empty() {
            return Err(KeyRingError::Empty);
        }
        let (parsed, _headers) =
            SignedPublicKey::from_armor_many(armored.as_bytes()).map_err(KeyRingError::Parse)?;
        let keys = parsed
            .collect::<Result<Vec<_>, _>>()
            .map_err(KeyRingError::Parse)?;
        for key in &keys {
            key.verify().map_err(|source| KeyRingError::InvalidKey {
                identity: identities(key).join(", "),
                source,
            })?;
        }
        if keys.is_empty() {
            return Err(KeyRingError::Empty);
        }
        Ok(Self { keys })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Display names of every key in the ring, in ring order.
    pub fn identities(&self) -> Vec<String> {
        self.keys.iter().flat_map(identities).collect()
    }

    /// Checks `signature` (armored, detached) over the content body.
    ///
    /// The content is moved into the payload only when some key in the ring
    /// validates the signature; on every failure path it is dropped here.
    pub fn verify(
        &self,
        content: LimitedBody,
        signature: &[u8],
        limit: u64,
    ) -> Result<VerifiedPayload, SignatureError> {
        let (sig, _headers) =
            StandaloneSignature::from_armor_single(signature).map_err(SignatureError::Malformed)?;

        let signer = self.keys.iter().find(|key| signed_by(key, &sig, &content.bytes));
        match signer {
            Some(key) => Ok(VerifiedPayload {
                content: content.bytes,
                signers: identities(key),
                truncated: content.truncated,
            }),
            None if content.truncated => Err(SignatureError::ContentTooLarge { limit }),
            None => Err(SignatureError::Mismatch),
        }
    }
}

fn signed_by(key: &SignedPublicKey, sig: &StandaloneSignature, content: &[u8]) -> bool {
    if sig.verify(key, content).is_ok() {
        return true;
    }
    key.public_subkeys
        .iter()
        .filter(|subkey| may_sign(subkey))
        .any(|subkey| sig.verify(subkey, content).is_ok())
}

/// Subkeys count as signers only when a binding signature grants the sign flag.
fn may_sign(subkey: &SignedPublicSubKey) -> bool {
    subkey
        .signatures
        .iter()
        .any(|binding| binding.key_flags().sign())
}

fn identities(key: &SignedPublicKey) -> Vec<String> {
    key.details
        .users
        .iter()
        .map(|user| display_name(&String::from_utf8_lossy(user.id.id())))
        .collect()
}

/// Name part of an OpenPGP user id: `Name (comment) <email>` -> `Name`.
pub fn display_name(user_id: &str) -> String {
    let end = user_id.find(['(', '<']).unwrap_or(user_id.len());
    let name = user_id[..end].trim();
    if name.is_empty() {
        user_id.trim().to_string()
    } else {
        name.to_string()
    }
}

pub fn content_digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}
