use quill_core::error::QuillError;
use quill_core::transaction::Signature;
use quill_core::types::Address;
use ripemd::Ripemd160;
use secp256k1::ecdsa;
use secp256k1::rand::rngs::OsRng;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use sha2::Digest;
use zeroize::Zeroizing;

use crate::hash::{sha256, sha256d};

/// Version byte prepended to the hash160 before base58check encoding.
pub const ADDRESS_VERSION: u8 = 0;

// ── Address derivation ───────────────────────────────────────────────────────

/// Address of a serialized (compressed) public key:
/// base58check(ADDRESS_VERSION ‖ ripemd160(sha256(pubkey))).
pub fn address_from_pubkey(pubkey: &[u8]) -> Address {
    let h160 = Ripemd160::digest(sha256(pubkey));
    Address::new(
        bs58::encode(h160.as_slice())
            .with_check_version(ADDRESS_VERSION)
            .into_string(),
    )
}

// ── KeyPair ──────────────────────────────────────────────────────────────────

/// A SECP256K1 keypair with its derived address.
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    /// Generate a fresh random keypair.
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret, public) = secp.generate_keypair(&mut OsRng);
        Self { secret, public }
    }

    /// Restore a keypair from 32 raw secret-key bytes.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, QuillError> {
        let secret =
            SecretKey::from_slice(bytes).map_err(|e| QuillError::Crypto(e.to_string()))?;
        let secp = Secp256k1::new();
        let public = PublicKey::from_secret_key(&secp, &secret);
        Ok(Self { secret, public })
    }

    /// Derive the wallet's single private key from a seed phrase.
    ///
    /// Deterministic with no index: the same seed always yields the same key.
    pub fn from_seed_phrase(seed: &str) -> Result<Self, QuillError> {
        let digest = Zeroizing::new(sha256(seed.as_bytes()));
        Self::from_secret_bytes(digest.as_ref())
    }

    pub fn address(&self) -> Address {
        address_from_pubkey(&self.public.serialize())
    }

    /// Compressed public key (33 bytes).
    pub fn public_bytes(&self) -> [u8; 33] {
        self.public.serialize()
    }

    /// Raw secret-key bytes, wiped on drop.
    pub fn secret_bytes(&self) -> Zeroizing<[u8; 32]> {
        Zeroizing::new(self.secret.secret_bytes())
    }

    /// Sign canonical transaction body bytes. The signed digest is the
    /// transaction hash (double SHA-256 of the body).
    pub fn sign_body(&self, body_bytes: &[u8]) -> Signature {
        let secp = Secp256k1::new();
        let msg = Message::from_digest(sha256d(body_bytes));
        let sig = secp.sign_ecdsa(&msg, &self.secret);
        Signature {
            pubkey: self.public.serialize().to_vec(),
            sig: sig.serialize_compact().to_vec(),
        }
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyPair {{ address: {} }}", self.address())
    }
}

// ── Verification ─────────────────────────────────────────────────────────────

/// Verify a signature over canonical body bytes against its embedded pubkey.
pub fn verify_body(body_bytes: &[u8], signature: &Signature) -> Result<(), QuillError> {
    let secp = Secp256k1::verification_only();
    let public =
        PublicKey::from_slice(&signature.pubkey).map_err(|e| QuillError::Crypto(e.to_string()))?;
    let sig = ecdsa::Signature::from_compact(&signature.sig)
        .map_err(|e| QuillError::Crypto(e.to_string()))?;
    let msg = Message::from_digest(sha256d(body_bytes));
    secp.verify_ecdsa(&msg, &sig, &public)
        .map_err(|e| QuillError::Crypto(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_verify_roundtrip() {
        let kp = KeyPair::generate();
        let body = b"some canonical body bytes";
        let sig = kp.sign_body(body);
        verify_body(body, &sig).expect("signature verifies");

        // Tampered body fails.
        assert!(verify_body(b"other bytes", &sig).is_err());
    }

    #[test]
    fn seed_phrase_key_is_deterministic() {
        let a = KeyPair::from_seed_phrase("alpha beta gamma").unwrap();
        let b = KeyPair::from_seed_phrase("alpha beta gamma").unwrap();
        assert_eq!(a.address(), b.address());
        assert_eq!(*a.secret_bytes(), *b.secret_bytes());

        let c = KeyPair::from_seed_phrase("alpha beta delta").unwrap();
        assert_ne!(a.address(), c.address());
    }

    #[test]
    fn signature_pubkey_derives_signer_address() {
        let kp = KeyPair::generate();
        let sig = kp.sign_body(b"body");
        assert_eq!(address_from_pubkey(&sig.pubkey), kp.address());
    }
}
