use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuillError {
    // ── Wallet state ─────────────────────────────────────────────────────────
    #[error("wallet is locked")]
    WalletLocked,

    #[error("save seed first")]
    SaveSeedFirst,

    #[error("unlock wallet first")]
    UnlockFirst,

    #[error("bad password")]
    BadPassword,

    #[error("bad mnemonic: expected {expected} words, got {got}")]
    BadMnemonic { expected: usize, got: usize },

    #[error("mnemonic is not a valid seed phrase")]
    InvalidMnemonic,

    #[error("a seed is already saved")]
    SeedExists,

    // ── Conflicts ────────────────────────────────────────────────────────────
    #[error("label already in use: {0}")]
    LabelTaken(String),

    #[error("address already in use: {0}")]
    AddressTaken(String),

    #[error("private key already present")]
    PrivKeyAlreadyPresent,

    #[error("address exists with a different private key")]
    PrivKeyConflict,

    #[error("insufficient balance: need {need}, have {have}")]
    InsufficientBalance { need: i64, have: i64 },

    // ── Input ────────────────────────────────────────────────────────────────
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("fee below minimum ({min} required)")]
    FeeTooLow { min: i64 },

    // ── Crypto ───────────────────────────────────────────────────────────────
    #[error("ciphertext length {len} is not a multiple of the cipher block size")]
    BadCipherLength { len: usize },

    #[error("crypto error: {0}")]
    Crypto(String),

    // ── Downstream collaborators ─────────────────────────────────────────────
    #[error("{op}: {msg}")]
    Downstream { op: &'static str, msg: String },

    // ── Serialization / storage ──────────────────────────────────────────────
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl QuillError {
    /// Wrap a collaborator failure with the originating operation name.
    pub fn downstream(op: &'static str, err: impl std::fmt::Display) -> Self {
        QuillError::Downstream { op, msg: err.to_string() }
    }
}
