//! Typed message catalog
//!
//! Stable keys map to localized strings. A lookup never fails: a missing
//! language/key pair falls back to English, and an uncatalogued key falls back
//! to its stable name, so callers always get something printable.

use serde::{Deserialize, Serialize};

/// Languages the API can respond in, negotiated from `Accept-Language`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    /// Pick a language from an `Accept-Language` header value. Anything that
    /// is not recognized resolves to English.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some(value) if value.trim().to_lowercase().starts_with("hi") => Language::Hi,
            _ => Language::En,
        }
    }
}

/// Stable keys for every user-visible API message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    LoginSuccess,
    LoginFailed,
    SignupSuccess,
    UsernameTaken,
    CredentialsRequired,
    EmptyText,
    MissingIdentity,
    AmbiguousIdentity,
    InvalidToken,
    TokenExpired,
    Uppercased,
    Lowercased,
    Titlecased,
    Reversed,
    Analyzed,
    HistoryRetrieved,
    HistoryEmpty,
    HistoryUnavailable,
}

impl MessageKey {
    /// The stable name, used as the last-resort fallback text.
    pub fn name(self) -> &'static str {
        match self {
            MessageKey::LoginSuccess => "messages.loginSuccess",
            MessageKey::LoginFailed => "messages.loginFailed",
            MessageKey::SignupSuccess => "messages.signupSuccess",
            MessageKey::UsernameTaken => "messages.usernameTaken",
            MessageKey::CredentialsRequired => "messages.credentialsRequired",
            MessageKey::EmptyText => "messages.emptyText",
            MessageKey::MissingIdentity => "messages.missingIdentity",
            MessageKey::AmbiguousIdentity => "messages.ambiguousIdentity",
            MessageKey::InvalidToken => "messages.invalidToken",
            MessageKey::TokenExpired => "messages.tokenExpired",
            MessageKey::Uppercased => "messages.uppercased",
            MessageKey::Lowercased => "messages.lowercased",
            MessageKey::Titlecased => "messages.titlecased",
            MessageKey::Reversed => "messages.reversed",
            MessageKey::Analyzed => "messages.analyzed",
            MessageKey::HistoryRetrieved => "messages.historyRetrieved",
            MessageKey::HistoryEmpty => "messages.historyEmpty",
            MessageKey::HistoryUnavailable => "messages.historyUnavailable",
        }
    }

    /// Every key, for catalog completeness checks.
    pub fn all() -> &'static [MessageKey] {
        &[
            MessageKey::LoginSuccess,
            MessageKey::LoginFailed,
            MessageKey::SignupSuccess,
            MessageKey::UsernameTaken,
            MessageKey::CredentialsRequired,
            MessageKey::EmptyText,
            MessageKey::MissingIdentity,
            MessageKey::AmbiguousIdentity,
            MessageKey::InvalidToken,
            MessageKey::TokenExpired,
            MessageKey::Uppercased,
            MessageKey::Lowercased,
            MessageKey::Titlecased,
            MessageKey::Reversed,
            MessageKey::Analyzed,
            MessageKey::HistoryRetrieved,
            MessageKey::HistoryEmpty,
            MessageKey::HistoryUnavailable,
        ]
    }
}

/// Resolve a message. Falls back to English, then to the key's stable name.
pub fn lookup(lang: Language, key: MessageKey) -> &'static str {
    localized(lang, key)
        .or_else(|| localized(Language::En, key))
        .unwrap_or_else(|| key.name())
}

fn localized(lang: Language, key: MessageKey) -> Option<&'static str> {
    match (lang, key) {
        (Language::En, MessageKey::LoginSuccess) => Some("Logged in successfully!"),
        (Language::En, MessageKey::LoginFailed) => Some("Invalid username or password."),
        (Language::En, MessageKey::SignupSuccess) => Some("Signed up successfully! Please log in."),
        (Language::En, MessageKey::UsernameTaken) => Some("Username already taken."),
        (Language::En, MessageKey::CredentialsRequired) => {
            Some("Username and password are required.")
        }
        (Language::En, MessageKey::EmptyText) => {
            Some("Please enter some text to perform operations.")
        }
        (Language::En, MessageKey::MissingIdentity) => {
            Some("Missing identity: supply an Authorization or X-Session-ID header.")
        }
        (Language::En, MessageKey::AmbiguousIdentity) => {
            Some("Provide either a bearer token or a session id, not both.")
        }
        (Language::En, MessageKey::InvalidToken) => Some("Invalid token. Please log in again."),
        (Language::En, MessageKey::TokenExpired) => Some("Session expired. Please log in again."),
        (Language::En, MessageKey::Uppercased) => Some("Converted to uppercase."),
        (Language::En, MessageKey::Lowercased) => Some("Converted to lowercase."),
        (Language::En, MessageKey::Titlecased) => Some("Converted to title case."),
        (Language::En, MessageKey::Reversed) => Some("Text reversed successfully."),
        (Language::En, MessageKey::Analyzed) => Some("Text analyzed successfully."),
        (Language::En, MessageKey::HistoryRetrieved) => Some("History retrieved successfully."),
        (Language::En, MessageKey::HistoryEmpty) => Some("No history found."),
        (Language::En, MessageKey::HistoryUnavailable) => {
            Some("Result computed, but history could not be recorded.")
        }

        (Language::Hi, MessageKey::LoginSuccess) => Some("सफलतापूर्वक लॉग इन हो गए!"),
        (Language::Hi, MessageKey::LoginFailed) => Some("अमान्य उपयोगकर्ता नाम या पासवर्ड।"),
        (Language::Hi, MessageKey::SignupSuccess) => Some("सफलतापूर्वक साइन अप हो गए! कृपया लॉग इन करें।"),
        (Language::Hi, MessageKey::Uppercased) => Some("अपरकेस में बदल दिया गया।"),
        (Language::Hi, MessageKey::Lowercased) => Some("लोअरकेस में बदल दिया गया।"),
        (Language::Hi, MessageKey::Titlecased) => Some("टाइटल केस में बदल दिया गया।"),
        (Language::Hi, MessageKey::Reversed) => Some("पाठ सफलतापूर्वक उलट दिया गया।"),
        (Language::Hi, MessageKey::Analyzed) => Some("पाठ का विश्लेषण हो गया।"),

        _ => None,
    }
}
