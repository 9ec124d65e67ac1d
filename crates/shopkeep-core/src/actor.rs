//! Actor kinds that can walk up to the counter.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// The kind of NPC. The eleven base kinds always exist; guest kinds are
/// unlocked at runtime by bonus content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ActorType {
    Gatherer,
    GraveDigger,
    Hunter,
    King,
    Knight,
    KnightHorse,
    Lumberjack,
    Merchant,
    Miner,
    Nun,
    Wanderer,
    /// A conditional kind unlocked by client or visit-count bonuses.
    Guest(String),
}

impl ActorType {
    /// All base kinds, in asset-catalog order.
    pub const BASE: [ActorType; 11] = [
        ActorType::Gatherer,
        ActorType::GraveDigger,
        ActorType::Hunter,
        ActorType::King,
        ActorType::Knight,
        ActorType::KnightHorse,
        ActorType::Lumberjack,
        ActorType::Merchant,
        ActorType::Miner,
        ActorType::Nun,
        ActorType::Wanderer,
    ];

    /// The stable key used for asset folders and wire formats.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Gatherer => "gatherer",
            Self::GraveDigger => "graveDigger",
            Self::Hunter => "hunter",
            Self::King => "king",
            Self::Knight => "knight",
            Self::KnightHorse => "knightHorse",
            Self::Lumberjack => "lumberjack",
            Self::Merchant => "merchant",
            Self::Miner => "miner",
            Self::Nun => "nun",
            Self::Wanderer => "wanderer",
            Self::Guest(key) => key,
        }
    }

    /// Whether this kind was unlocked by bonus content.
    #[must_use]
    pub fn is_guest(&self) -> bool {
        matches!(self, Self::Guest(_))
    }

    /// Resolves a key to a kind. Unknown keys become guest kinds.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if the key is blank.
    pub fn from_key(key: &str) -> Result<Self, DomainError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(DomainError::InvalidInput(
                "actor type key must not be empty".to_owned(),
            ));
        }
        Ok(Self::BASE
            .iter()
            .find(|base| base.key() == key)
            .cloned()
            .unwrap_or_else(|| Self::Guest(key.to_owned())))
    }
}

impl fmt::Display for ActorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl TryFrom<String> for ActorType {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_key(&value)
    }
}

impl From<ActorType> for String {
    fn from(value: ActorType) -> Self {
        value.key().to_owned()
    }
}
