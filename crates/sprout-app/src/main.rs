use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use sprout_core::{Accounts, Session, sync::DEFAULT_POLL_INTERVAL};
use sprout_store::Store;
use sprout_types::Role;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sprout=info,sprout_core=debug,sprout_store=debug".into()),
        )
        .init();

    // Config
    let db_path = std::env::var("SPROUT_DB_PATH").unwrap_or_else(|_| "sprout.db".into());
    let poll_interval = match std::env::var("SPROUT_POLL_MS") {
        // A zero period would panic the interval timer.
        Ok(ms) => match ms.parse::<u64>()? {
            0 => {
                warn!("SPROUT_POLL_MS=0 is invalid, using default");
                DEFAULT_POLL_INTERVAL
            }
            ms => Duration::from_millis(ms),
        },
        Err(_) => DEFAULT_POLL_INTERVAL,
    };

    // Open the store and seed the showcase accounts
    let store = Arc::new(Store::open(&PathBuf::from(&db_path))?);
    let accounts = Accounts::new(store.clone());
    accounts.seed_demo_accounts()?;

    // Walk the demo exchange: the parent asks, the teacher's polling session
    // picks the message up, answers, and the parent sees the labeled reply.
    let parent = Session::new(
        store.clone(),
        accounts.login_parent("hazem@family.net", "sprout-demo")?,
    );
    let teacher = Session::new(
        store.clone(),
        accounts.login_teacher("habiba@sprout.school", "sprout-demo")?,
    );

    let mut teacher_sync = teacher.start_sync(poll_interval);
    let mut parent_sync = parent.start_sync(poll_interval);

    parent.send_message(
        "habiba@sprout.school",
        Role::Teacher,
        "Reading practice",
        "How is Omar getting on with his reading?",
    )?;
    info!("parent sent a message, waiting for the teacher's poll to surface it");

    let incoming = loop {
        let view = teacher_sync.view();
        if let Some(msg) = view.iter().find(|m| !m.outgoing && !m.is_read) {
            break msg.clone();
        }
        if !teacher_sync.changed().await {
            anyhow::bail!("teacher sync stopped unexpectedly");
        }
    };
    info!("teacher sees \"{}\" from {}", incoming.subject, incoming.from);

    teacher.mark_as_read(&incoming.id)?;
    teacher.reply(&incoming.id, "He is doing wonderfully — two new books this week!")?;

    let answered = loop {
        let view = parent_sync.view();
        if let Some(msg) = view.iter().find(|m| !m.replies.is_empty()) {
            break msg.clone();
        }
        if !parent_sync.changed().await {
            anyhow::bail!("parent sync stopped unexpectedly");
        }
    };
    info!(
        "parent sees reply from {}: {}",
        answered.replies[0].author, answered.replies[0].body
    );

    // Logout tears the pollers down with the sessions.
    drop(teacher_sync);
    drop(parent_sync);
    teacher.logout()?;
    parent.logout()?;
    info!("demo complete");

    Ok(())
}
