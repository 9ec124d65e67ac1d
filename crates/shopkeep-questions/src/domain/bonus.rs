//! Conditional bonus content: browser-specific and visit-count-gated NPCs.

use serde::{Deserialize, Serialize};
use shopkeep_core::actor::ActorType;
use shopkeep_core::client::ClientClass;
use shopkeep_core::error::DomainError;

/// A guest NPC shown only to one browser family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientBonus {
    /// Browser family that unlocks the guest.
    pub client: ClientClass,
    /// The guest kind added to the spawn set.
    pub actor_type: ActorType,
    /// Question pushed to the front of the pool.
    pub question: String,
}

/// Guests and questions unlocked after a number of visits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitTier {
    /// Visits required, inclusive.
    pub min_visits: u32,
    /// The guest kind added to the spawn set.
    pub actor_type: ActorType,
    /// Questions appended to the pool.
    pub questions: Vec<String>,
}

/// All conditional content known to the kiosk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BonusContent {
    #[serde(default)]
    pub client_bonuses: Vec<ClientBonus>,
    #[serde(default)]
    pub visit_tiers: Vec<VisitTier>,
}

/// The slice of bonus content a given visitor qualifies for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BonusSelection {
    /// Questions to put at the front of the pool.
    pub front: Vec<String>,
    /// Questions to append to the pool.
    pub back: Vec<String>,
    /// Actor kinds to add, in unlock order.
    pub actor_types: Vec<ActorType>,
}

impl BonusSelection {
    /// Whether the visitor qualified for nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.front.is_empty() && self.back.is_empty() && self.actor_types.is_empty()
    }
}

impl BonusContent {
    /// Parses bonus content from YAML.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if the document does not parse.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, DomainError> {
        serde_yaml::from_str(yaml)
            .map_err(|e| DomainError::InvalidInput(format!("bonus content is not valid: {e}")))
    }

    /// Selects the content unlocked by `client` and `visit_count`.
    #[must_use]
    pub fn select(&self, client: ClientClass, visit_count: u32) -> BonusSelection {
        let mut selection = BonusSelection::default();

        for bonus in self.client_bonuses.iter().filter(|b| b.client == client) {
            selection.front.push(bonus.question.clone());
            push_unique(&mut selection.actor_types, &bonus.actor_type);
        }

        for tier in self.visit_tiers.iter().filter(|t| visit_count >= t.min_visits) {
            selection.back.extend(tier.questions.iter().cloned());
            push_unique(&mut selection.actor_types, &tier.actor_type);
        }

        selection
    }
}

fn push_unique(actor_types: &mut Vec<ActorType>, actor_type: &ActorType) {
    if !actor_types.contains(actor_type) {
        actor_types.push(actor_type.clone());
    }
}

impl Default for BonusContent {
    fn default() -> Self {
        let guest = |key: &str| ActorType::Guest(key.to_owned());
        Self {
            client_bonuses: vec![
                ClientBonus {
                    client: ClientClass::Firefox,
                    actor_type: guest("emberFox"),
                    question: "Prithee, how doth a fox of flame guard mine secrets from prying trackers?".to_owned(),
                },
                ClientBonus {
                    client: ClientClass::Safari,
                    actor_type: guest("compassPilgrim"),
                    question: "Mine compass spinneth wildly upon every voyage. What ails mine web navigator?".to_owned(),
                },
            ],
            visit_tiers: vec![
                VisitTier {
                    min_visits: 3,
                    actor_type: guest("travellingBard"),
                    questions: vec![
                        "Why doth mine lute's melody stutter when streamed across the realm?".to_owned(),
                        "How might a humble bard keep his ballads safe from a failing scroll-drive?".to_owned(),
                    ],
                },
                VisitTier {
                    min_visits: 10,
                    actor_type: guest("courtAlchemist"),
                    questions: vec![
                        "What elixir cureth a machine that groweth hot as a dragon's breath?".to_owned(),
                        "Wherefore doth mine password potion fail when mixed a second time?".to_owned(),
                    ],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_matches_client_and_visit_tiers() {
        let content = BonusContent::default();

        let selection = content.select(ClientClass::Firefox, 3);

        assert_eq!(selection.front.len(), 1);
        assert_eq!(selection.back.len(), 2);
        assert_eq!(
            selection.actor_types,
            vec![
                ActorType::Guest("emberFox".to_owned()),
                ActorType::Guest("travellingBard".to_owned()),
            ]
        );
    }

    #[test]
    fn test_select_for_first_time_unknown_client_is_empty() {
        let selection = BonusContent::default().select(ClientClass::Unknown, 1);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_select_never_duplicates_actor_types() {
        let content = BonusContent {
            client_bonuses: vec![],
            visit_tiers: vec![
                VisitTier {
                    min_visits: 1,
                    actor_type: ActorType::Guest("bard".to_owned()),
                    questions: vec!["a?".to_owned()],
                },
                VisitTier {
                    min_visits: 2,
                    actor_type: ActorType::Guest("bard".to_owned()),
                    questions: vec!["b?".to_owned()],
                },
            ],
        };

        let selection = content.select(ClientClass::Chrome, 5);

        assert_eq!(selection.actor_types.len(), 1);
        assert_eq!(selection.back, vec!["a?".to_owned(), "b?".to_owned()]);
    }

    #[test]
    fn test_from_yaml_str_parses_document() {
        let yaml = r"
clientBonuses:
  - client: edge
    actorType: blueKnight
    question: Why doth mine browser beg to be the default?
visitTiers:
  - minVisits: 5
    actorType: king
    questions:
      - How doth a king back up the royal archives?
";
        let content = BonusContent::from_yaml_str(yaml).unwrap();
        assert_eq!(content.client_bonuses[0].client, ClientClass::Edge);
        assert_eq!(content.visit_tiers[0].actor_type, ActorType::King);
    }

    #[test]
    fn test_from_yaml_str_rejects_garbage() {
        assert!(matches!(
            BonusContent::from_yaml_str("clientBonuses: 12"),
            Err(DomainError::InvalidInput(_))
        ));
    }
}
