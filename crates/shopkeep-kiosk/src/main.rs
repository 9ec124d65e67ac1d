//! Shopkeep counter kiosk.
//!
//! A terminal rendition of the shop counter: villagers walk up, ask a
//! question, and the shopkeeper types an answer.

use std::sync::{Arc, Mutex};

use shopkeep_core::rng::{DeterministicRng, OsSeededRng};
use shopkeep_kiosk::actor::ActorPhase;
use shopkeep_kiosk::api_client::ShopkeepApiClient;
use shopkeep_kiosk::bridge::SessionBridge;
use shopkeep_kiosk::config::KioskConfig;
use shopkeep_kiosk::dialogue::{DialoguePanel, Evaluation};
use shopkeep_kiosk::error::KioskError;
use shopkeep_kiosk::lifecycle::{
    AllowAllSprites, AssetDirectory, LifecycleEvent, NpcLifecycle, SpriteCatalog,
};
use shopkeep_questions::pool::QuestionPoolManager;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const HINTS_COMMAND: &str = "/hints";

#[tokio::main]
async fn main() -> Result<(), KioskError> {
    // Logs go to stderr so they do not interleave with the counter.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = KioskConfig::from_env()?;
    info!(api_url = %config.api_url, visitor_id = %config.visitor_id, "kiosk starting");

    let client = Arc::new(ShopkeepApiClient::new(
        &config.api_url,
        Some(config.visitor_id.clone()),
        &config.user_agent,
    ));
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(OsSeededRng::new()));
    let pool = QuestionPoolManager::new(client.clone(), Arc::clone(&rng));
    let bonus = config.load_bonus_content().await?;

    match client.fetch_profile().await {
        Ok(remote) => {
            println!(
                "Welcome back, {}. Visit {} to the shop.",
                remote.current_title, remote.visit_count
            );
            if pool.merge_bonus(&bonus, remote.browser, remote.visit_count) {
                info!(browser = %remote.browser.as_str(), "bonus content merged");
            }
        }
        Err(e) => warn!(error = %e, "profile lookup failed, continuing without bonus content"),
    }
    pool.trigger_refill();

    let bridge = SessionBridge::new();
    let mut dialogue = bridge.attach();
    let sprites: Arc<dyn SpriteCatalog> = match &config.assets_dir {
        Some(dir) => Arc::new(AssetDirectory::new(dir.clone())),
        None => Arc::new(AllowAllSprites),
    };
    let lifecycle = NpcLifecycle::new(pool, bridge.clone(), sprites, rng, config.timings);
    let mut events = lifecycle.subscribe();
    let handle = lifecycle.start();

    let mut panel = DialoguePanel::new(bridge.clone(), client.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Some(message) = dialogue.recv() => panel.apply(message),
            event = events.recv() => match event {
                Ok(event) => narrate(&event),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "kiosk fell behind the lifecycle"),
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                handle_line(&mut panel, &client, line.trim()).await;
            }
        }
    }

    handle.shutdown().await;
    bridge.detach();
    info!("kiosk stopped");
    Ok(())
}

fn narrate(event: &LifecycleEvent) {
    match event {
        LifecycleEvent::Phase {
            actor_type, phase, ..
        } => match phase {
            ActorPhase::Approaching => println!("A {actor_type} approaches the counter."),
            ActorPhase::Departing => println!("The {actor_type} takes their leave."),
            _ => {}
        },
        LifecycleEvent::ResourceMissing { actor_type } => {
            warn!(%actor_type, "no sprites for actor kind");
        }
        LifecycleEvent::QuestionShown { question, .. } => {
            println!("\n  \"{question}\"\n");
            println!("(type thy answer and press enter)");
        }
        LifecycleEvent::AnswerReceived { .. } => {}
    }
}

async fn handle_line(panel: &mut DialoguePanel, client: &ShopkeepApiClient, line: &str) {
    if let Some(phone_number) = line.strip_prefix(HINTS_COMMAND) {
        match client.request_hints(phone_number.trim()).await {
            Ok(true) => println!("A scroll of hints is on its way."),
            Ok(false) => println!("The messenger could not find that number."),
            Err(e) => warn!(error = %e, "hint request failed"),
        }
        return;
    }

    if line.is_empty() || !panel.is_visible() {
        return;
    }

    panel.set_draft(line);
    let Some(evaluation) = panel.submit().await else {
        return;
    };
    if let Some(reaction) = evaluation.reaction() {
        println!("{}", reaction.line());
    }
    match evaluation {
        Evaluation::Success { feedback_text, .. } => println!("{feedback_text}"),
        Evaluation::Failed { reason } => {
            println!("{reason}");
            return;
        }
        Evaluation::Pending => return,
    }
    panel.dismiss();
}
