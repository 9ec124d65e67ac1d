//! Static default questions. The terminal fallback; never exhausted.

use shopkeep_core::actor::ActorType;

/// Asked by guest kinds that have no entry of their own.
pub const GUEST_FALLBACK_QUESTION: &str = "What counsel wouldst thou give a weary traveller whose scrying glass hath gone dark?";

/// Returns the default question for `actor_type`.
#[must_use]
pub fn default_question(actor_type: &ActorType) -> &'static str {
    match actor_type {
        ActorType::Gatherer => "How fixeth a frozen crystal ball?",
        ActorType::GraveDigger => "What dark arts revive a dead battery?",
        ActorType::Hunter => "How doth one track the elusive wireless signal?",
        ActorType::King => "Wherefore doth mine royal email refuse to send?",
        ActorType::Knight => "How might one vanquish the dreaded blue screen of death?",
        ActorType::KnightHorse => "What sorcery makes mine steed's GPS falter?",
        ActorType::Lumberjack => "How sharpeneth one the edges of pixelated images?",
        ActorType::Merchant => "Wherefore do mine online transactions fail?",
        ActorType::Miner => "What pickaxe best mines cryptocurrency?",
        ActorType::Nun => "How doth one purify a virus-infected device?",
        ActorType::Wanderer => "Which path leads through the maze of pop-up windows?",
        ActorType::Guest(_) => GUEST_FALLBACK_QUESTION,
    }
}

/// The default question of every base kind, in catalog order.
#[must_use]
pub fn default_pool() -> Vec<String> {
    ActorType::BASE
        .iter()
        .map(|actor| default_question(actor).to_owned())
        .collect()
}
