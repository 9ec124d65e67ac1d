//! Best-effort browser classification from a User-Agent signature.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Browser family of the kiosk client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientClass {
    Edge,
    Opera,
    Chrome,
    Firefox,
    Safari,
    /// Signature missing or unrecognised. Not an error.
    Unknown,
}

// Chromium derivatives carry the Chrome token and everything carries Safari,
// so the more specific families come first.
const SIGNATURES: &[(&str, ClientClass)] = &[
    ("Edg/", ClientClass::Edge),
    ("Edge/", ClientClass::Edge),
    ("EdgiOS", ClientClass::Edge),
    ("OPR/", ClientClass::Opera),
    ("Opera", ClientClass::Opera),
    ("Chrome/", ClientClass::Chrome),
    ("CriOS", ClientClass::Chrome),
    ("Firefox/", ClientClass::Firefox),
    ("FxiOS", ClientClass::Firefox),
    ("Safari/", ClientClass::Safari),
];

impl ClientClass {
    /// Classifies a User-Agent header value.
    #[must_use]
    pub fn classify(signature: Option<&str>) -> Self {
        let Some(signature) = signature else {
            return Self::Unknown;
        };
        SIGNATURES
            .iter()
            .find(|(token, _)| signature.contains(token))
            .map_or(Self::Unknown, |(_, class)| *class)
    }

    /// Lowercase wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Edge => "edge",
            Self::Opera => "opera",
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
            Self::Safari => "safari",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ClientClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
