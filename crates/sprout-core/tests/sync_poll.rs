//! Polling synchronization across sessions sharing one store — the
//! "second browser tab" scenario: an external write must surface in a
//! running session's view within one poll interval, without a restart.

use std::sync::Arc;
use std::time::Duration;

use sprout_core::{Accounts, MessageStore, Session};
use sprout_store::{Store, keys};
use sprout_types::Role;

fn setup() -> (Arc<Store>, Session) {
    let store = Arc::new(Store::open_in_memory().unwrap());
    let accounts = Accounts::new(store.clone());
    accounts
        .register_teacher("Habiba", "habiba@x.com", "teach-pass")
        .unwrap();
    accounts
        .register_parent("Hazem", "hazem@x.com", "parent-pass", "OMAR01")
        .unwrap();

    let snapshot = accounts.login_teacher("habiba@x.com", "teach-pass").unwrap();
    (store.clone(), Session::new(store, snapshot))
}

#[tokio::test]
async fn external_message_surfaces_within_one_poll() {
    let (store, teacher) = setup();

    let mut sync = teacher.start_sync(Duration::from_millis(20));
    assert!(sync.view().is_empty());

    // Simulate another tab writing directly through its own store handle.
    let other_tab = MessageStore::new(store);
    other_tab
        .add_message(
            "hazem@x.com",
            Role::Parent,
            "habiba@x.com",
            Role::Teacher,
            "Pickup time",
            "Can we talk today?",
        )
        .unwrap();

    let surfaced = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if sync.view().iter().any(|m| m.subject == "Pickup time") {
                break;
            }
            assert!(sync.changed().await);
        }
    })
    .await;

    assert!(surfaced.is_ok(), "poller never surfaced the external message");
    let view = sync.view();
    assert_eq!(view[0].from, "Hazem");
    assert!(!view[0].is_read);
}

#[tokio::test]
async fn reply_from_other_session_surfaces_and_is_labeled() {
    let (store, teacher) = setup();

    let accounts = Accounts::new(store.clone());
    let parent = Session::new(
        store,
        accounts.login_parent("hazem@x.com", "parent-pass").unwrap(),
    );

    let msg = teacher
        .send_message("hazem@x.com", Role::Parent, "Report", "Omar did great")
        .unwrap();

    let mut sync = teacher.start_sync(Duration::from_millis(20));
    parent.reply(&msg.id, "Proud of him!").unwrap();

    let surfaced = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            let view = sync.view();
            if view.iter().any(|m| !m.replies.is_empty()) {
                return view;
            }
            assert!(sync.changed().await);
        }
    })
    .await
    .expect("reply never surfaced");

    assert_eq!(surfaced[0].replies[0].author, "Parent");
    assert_eq!(surfaced[0].replies[0].body, "Proud of him!");
}

#[tokio::test]
async fn failed_poll_keeps_last_good_view() {
    let (store, teacher) = setup();

    MessageStore::new(store.clone())
        .add_message(
            "hazem@x.com",
            Role::Parent,
            "habiba@x.com",
            Role::Teacher,
            "Q1",
            "Hi",
        )
        .unwrap();

    let mut sync = teacher.start_sync(Duration::from_millis(20));
    tokio::time::timeout(Duration::from_secs(2), async {
        while sync.view().is_empty() {
            assert!(sync.changed().await);
        }
    })
    .await
    .expect("first poll never landed");

    // Corrupt the stored list out from under the poller.
    store.set_raw(keys::GLOBAL_MESSAGES, "{not json").unwrap();

    // Several intervals pass; each cycle is skipped and the last good view
    // stays published.
    tokio::time::sleep(Duration::from_millis(150)).await;
    let view = sync.view();
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].subject, "Q1");
}

#[tokio::test]
async fn subscribed_receiver_observes_updates() {
    let (store, teacher) = setup();

    let sync = teacher.start_sync(Duration::from_millis(20));
    let mut rx = sync.subscribe();

    MessageStore::new(store)
        .add_message(
            "hazem@x.com",
            Role::Parent,
            "habiba@x.com",
            Role::Teacher,
            "Field trip",
            "Forms are due Friday",
        )
        .unwrap();

    let surfaced = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if rx.borrow().iter().any(|m| m.subject == "Field trip") {
                break;
            }
            rx.changed().await.unwrap();
        }
    })
    .await;

    assert!(surfaced.is_ok(), "subscriber never saw the new message");
}

#[tokio::test]
async fn stopped_poller_goes_quiet() {
    let (store, teacher) = setup();

    let mut sync = teacher.start_sync(Duration::from_millis(10));
    // Let the first refresh land.
    assert!(sync.changed().await);

    sync.stop();

    // After cancellation the watch sender is dropped and no further updates
    // arrive, even when the store keeps changing.
    let other_tab = MessageStore::new(store);
    other_tab
        .add_message("hazem@x.com", Role::Parent, "habiba@x.com", Role::Teacher, "Late", "x")
        .unwrap();

    let quiet = tokio::time::timeout(Duration::from_millis(200), async {
        while sync.changed().await {}
    })
    .await;
    assert!(quiet.is_ok(), "poller kept publishing after stop()");
}
