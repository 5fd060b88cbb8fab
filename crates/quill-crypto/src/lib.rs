pub mod hash;
pub mod keys;
pub mod mnemonic;
pub mod passwd;

pub use hash::{sha256, sha256d, tx_hash_from_body};
pub use keys::{address_from_pubkey, verify_body, KeyPair};
pub use mnemonic::SeedLang;
pub use passwd::{password_hash, password_key};
