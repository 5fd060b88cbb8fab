use bip39::{Language, Mnemonic};
use quill_core::constants::SEED_WORD_COUNT;
use quill_core::error::QuillError;
use serde::{Deserialize, Serialize};

/// Wordlist selector for mnemonic seeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeedLang {
    English,
    SimplifiedChinese,
}

impl SeedLang {
    /// Persisted language tag (`SeedLang` store record).
    pub fn code(self) -> u8 {
        match self {
            SeedLang::English => 0,
            SeedLang::SimplifiedChinese => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(SeedLang::English),
            1 => Some(SeedLang::SimplifiedChinese),
            _ => None,
        }
    }

    fn language(self) -> Language {
        match self {
            SeedLang::English => Language::English,
            SeedLang::SimplifiedChinese => Language::SimplifiedChinese,
        }
    }
}

/// Produce a fresh 15-word mnemonic phrase.
pub fn generate(lang: SeedLang) -> String {
    Mnemonic::generate_in(lang.language(), SEED_WORD_COUNT)
        .expect("15 is a valid bip39 word count")
        .to_string()
}

/// Validate a user-supplied seed phrase and canonicalize its whitespace.
///
/// Returns the space-joined phrase and the wordlist it parsed under.
pub fn validate(phrase: &str) -> Result<(String, SeedLang), QuillError> {
    let words: Vec<&str> = phrase.split_whitespace().collect();
    if words.len() != SEED_WORD_COUNT {
        return Err(QuillError::BadMnemonic { expected: SEED_WORD_COUNT, got: words.len() });
    }
    let canonical = words.join(" ");
    for lang in [SeedLang::English, SeedLang::SimplifiedChinese] {
        if Mnemonic::parse_in_normalized(lang.language(), &canonical).is_ok() {
            return Ok((canonical, lang));
        }
    }
    Err(QuillError::InvalidMnemonic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_seed_validates() {
        for lang in [SeedLang::English, SeedLang::SimplifiedChinese] {
            let phrase = generate(lang);
            assert_eq!(phrase.split_whitespace().count(), SEED_WORD_COUNT);
            let (canonical, detected) = validate(&phrase).expect("generated seed is valid");
            assert_eq!(canonical, phrase);
            assert_eq!(detected, lang);
        }
    }

    #[test]
    fn wrong_word_count_is_rejected() {
        let err = validate("one two three").unwrap_err();
        assert!(matches!(err, QuillError::BadMnemonic { expected: 15, got: 3 }));
    }

    #[test]
    fn garbage_words_are_rejected() {
        let phrase = vec!["zzzz"; SEED_WORD_COUNT].join(" ");
        assert!(matches!(validate(&phrase), Err(QuillError::InvalidMnemonic)));
    }

    #[test]
    fn whitespace_is_canonicalized() {
        let phrase = generate(SeedLang::English);
        let sloppy = phrase.replace(' ', "  ");
        let (canonical, _) = validate(&sloppy).unwrap();
        assert_eq!(canonical, phrase);
    }

    #[test]
    fn lang_codes_roundtrip() {
        for lang in [SeedLang::English, SeedLang::SimplifiedChinese] {
            assert_eq!(SeedLang::from_code(lang.code()), Some(lang));
        }
        assert_eq!(SeedLang::from_code(9), None);
    }
}
