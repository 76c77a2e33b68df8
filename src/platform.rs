//! Platform capability probe and UI language setting.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// Whether this build can persist records. Targets without a filesystem
/// (wasm) fall back to the sample catalog.
pub fn is_database_supported() -> bool {
    !cfg!(target_arch = "wasm32")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    Italian,
    English,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Italian => "it",
            Self::English => "en",
        }
    }

    /// Match a locale tag such as `en-US` or `it_IT.UTF-8`.
    pub fn from_locale(tag: &str) -> Option<Self> {
        let primary = tag
            .split(['-', '_', '.'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "it" => Some(Self::Italian),
            "en" => Some(Self::English),
            _ => None,
        }
    }
}

/// Current UI language, shared by whoever holds the handle.
#[derive(Debug, Default)]
pub struct LanguageSetting {
    current: RwLock<Language>,
}

impl LanguageSetting {
    pub fn new(initial: Language) -> Self {
        Self {
            current: RwLock::new(initial),
        }
    }

    /// Seed from a system locale tag, defaulting to Italian.
    pub fn from_locale(tag: &str) -> Self {
        Self::new(Language::from_locale(tag).unwrap_or_default())
    }

    pub fn current(&self) -> Language {
        // A poisoned lock still holds a valid `Copy` value.
        match self.current.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    pub fn change(&self, language: Language) {
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *guard != language {
            tracing::info!(from = guard.code(), to = language.code(), "UI language changed");
            *guard = language;
        }
    }
}
