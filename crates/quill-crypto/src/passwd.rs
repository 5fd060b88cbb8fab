//! Password-derived encryption of wallet secrets.
//!
//! The password→key transform is fixed by the legacy wallet format and must
//! stay bit-exact: pad or truncate the UTF-8 password bytes to exactly 32
//! bytes (truncate to the first 32 if longer, zero-pad on the right if
//! shorter) and use them directly as the AES-256 key; the IV is the first 16
//! bytes of that key. This is NOT a KDF — no salt, no stretching. A versioned
//! format migration is the only way to change it without orphaning wallets.

use aes::cipher::{block_padding::NoPadding, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use quill_core::error::QuillError;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES block size in bytes; all plaintexts must be a multiple of this.
pub const BLOCK_SIZE: usize = 16;

/// Derive the fixed AES-256 key and IV from a password.
pub fn password_key(password: &str) -> (Zeroizing<[u8; 32]>, [u8; 16]) {
    let mut key = Zeroizing::new([0u8; 32]);
    let bytes = password.as_bytes();
    let n = bytes.len().min(32);
    key[..n].copy_from_slice(&bytes[..n]);
    let mut iv = [0u8; 16];
    iv.copy_from_slice(&key[..16]);
    (key, iv)
}

/// Hash stored to verify the password when no cached copy exists.
pub fn password_hash(password: &str) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(password.as_bytes()));
    out
}

// ── Wrap / unwrap ────────────────────────────────────────────────────────────

/// AES-256-CBC encrypt without padding. The plaintext length must already be
/// a multiple of the block size; ciphertext length equals plaintext length.
pub fn encrypt(password: &str, plaintext: &[u8]) -> Result<Vec<u8>, QuillError> {
    if plaintext.len() % BLOCK_SIZE != 0 {
        return Err(QuillError::BadCipherLength { len: plaintext.len() });
    }
    let (key, iv) = password_key(password);
    let cipher = Aes256CbcEnc::new((&*key).into(), (&iv).into());
    Ok(cipher.encrypt_padded_vec_mut::<NoPadding>(plaintext))
}

/// AES-256-CBC decrypt without padding.
pub fn decrypt(password: &str, ciphertext: &[u8]) -> Result<Vec<u8>, QuillError> {
    if ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(QuillError::BadCipherLength { len: ciphertext.len() });
    }
    let (key, iv) = password_key(password);
    let cipher = Aes256CbcDec::new((&*key).into(), (&iv).into());
    cipher
        .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
        .map_err(|e| QuillError::Crypto(e.to_string()))
}

// ── Text helpers ─────────────────────────────────────────────────────────────

/// Encrypt UTF-8 text, zero-padding to the block size. Used for the mnemonic
/// seed, whose byte length is arbitrary. The text must not contain NUL.
pub fn encrypt_text(password: &str, text: &str) -> Result<Vec<u8>, QuillError> {
    let bytes = text.as_bytes();
    let padded_len = bytes.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE;
    let mut padded = Zeroizing::new(vec![0u8; padded_len]);
    padded[..bytes.len()].copy_from_slice(bytes);
    encrypt(password, &padded)
}

/// Decrypt text produced by [`encrypt_text`], stripping the zero padding.
pub fn decrypt_text(password: &str, ciphertext: &[u8]) -> Result<String, QuillError> {
    let padded = Zeroizing::new(decrypt(password, ciphertext)?);
    let end = padded
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(padded.len());
    String::from_utf8(padded[..end].to_vec())
        .map_err(|e| QuillError::Crypto(e.to_string()))
}

// ── Hex-wrapped private keys ─────────────────────────────────────────────────

/// Encrypt raw private-key bytes as hex text (64-byte ciphertext for a
/// 32-byte key). Hex-encoding first makes corruption detectable: decrypting
/// a damaged ciphertext under the right password, or a good one under the
/// wrong password, yields bytes that fail hex parsing.
pub fn encrypt_privkey(password: &str, privkey: &[u8]) -> Result<Vec<u8>, QuillError> {
    let hex_text = Zeroizing::new(hex::encode(privkey));
    encrypt(password, hex_text.as_bytes())
}

/// Recover raw private-key bytes from [`encrypt_privkey`] output.
pub fn decrypt_privkey(password: &str, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>, QuillError> {
    let hex_bytes = Zeroizing::new(decrypt(password, ciphertext)?);
    let hex_text = std::str::from_utf8(&hex_bytes)
        .map_err(|e| QuillError::Crypto(e.to_string()))?;
    hex::decode(hex_text)
        .map(Zeroizing::new)
        .map_err(|e| QuillError::Crypto(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_key_pads_and_truncates() {
        let (key, iv) = password_key("hunter2");
        assert_eq!(&key[..7], b"hunter2");
        assert!(key[7..].iter().all(|&b| b == 0));
        assert_eq!(&iv[..], &key[..16]);

        let long = "x".repeat(40);
        let (key, _) = password_key(&long);
        assert_eq!(&key[..], &long.as_bytes()[..32]);
    }

    #[test]
    fn encrypt_decrypt_is_bijective() {
        for len in [16usize, 32, 64, 128] {
            let plain: Vec<u8> = (0..len as u8).collect();
            let ct = encrypt("pw", &plain).unwrap();
            assert_eq!(ct.len(), plain.len());
            assert_eq!(&*decrypt("pw", &ct).unwrap(), &plain[..]);
        }
    }

    #[test]
    fn unaligned_length_is_rejected() {
        assert!(matches!(
            encrypt("pw", &[0u8; 15]),
            Err(QuillError::BadCipherLength { len: 15 })
        ));
        assert!(matches!(
            decrypt("pw", &[0u8; 17]),
            Err(QuillError::BadCipherLength { len: 17 })
        ));
    }

    #[test]
    fn text_roundtrip_strips_padding() {
        let seed = "word1 word2 word3";
        let ct = encrypt_text("pw", seed).unwrap();
        assert_eq!(ct.len() % BLOCK_SIZE, 0);
        assert_eq!(decrypt_text("pw", &ct).unwrap(), seed);
    }

    #[test]
    fn corrupt_privkey_ciphertext_fails_hex_parse() {
        let key = [7u8; 32];
        let ct = encrypt_privkey("pw", &key).unwrap();
        assert_eq!(ct.len(), 64);
        assert_eq!(&decrypt_privkey("pw", &ct).unwrap()[..], &key[..]);

        let mut bad = ct.clone();
        bad[0] ^= 0xff;
        assert!(decrypt_privkey("pw", &bad).is_err());
        // Wrong password is likewise detected.
        assert!(decrypt_privkey("other", &ct).is_err());
    }
}
