//! Unit tests for notification creation, click routing and named timers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use px2connect::host::memory::MemoryHost;
use px2connect::services::notification_dispatcher::NotificationDispatcher;
use px2connect::storage::MemoryStore;
use px2connect::types::notification::{NavigationAction, Notification, NotificationKind};
use rstest::rstest;
use serde_json::{json, Map};

const URL: &str = "https://github.com/jphermans/Px2Connect_browser_extension/releases/tag/v2.0.0";

fn setup() -> (NotificationDispatcher, Arc<MemoryHost>) {
    let mut entries = Map::new();
    entries.insert("updateUrl".to_string(), json!(URL));
    let host = Arc::new(MemoryHost::new());
    let dispatcher = NotificationDispatcher::new(
        host.clone(),
        host.clone(),
        Arc::new(MemoryStore::with_entries(entries)),
    );
    (dispatcher, host)
}

// ─── Notifications ───

#[tokio::test]
async fn notify_creates_persistent_notification() {
    let (dispatcher, host) = setup();

    dispatcher.notify(&Notification::manual_update("2.0.0")).await.unwrap();

    let created = host.notifications();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].id, "manual-update");
    assert_eq!(created[0].title, "Px2 Connect Update Available");
    assert_eq!(created[0].buttons, vec!["Download Update", "Later"]);
    assert!(created[0].require_interaction);
    assert_eq!(created[0].priority, 2);
}

#[tokio::test]
async fn notify_replaces_same_id() {
    let (dispatcher, host) = setup();

    dispatcher.notify(&Notification::manual_update("2.0.0")).await.unwrap();
    dispatcher.notify(&Notification::manual_update("2.1.0")).await.unwrap();

    let created = host.notifications();
    assert_eq!(created.len(), 1);
    assert!(created[0].message.contains("2.1.0"));
}

#[tokio::test]
async fn notify_surface_failure_is_returned() {
    let (dispatcher, host) = setup();
    host.set_fail_notifications(true);

    assert!(dispatcher.notify(&Notification::new_install()).await.is_err());
}

// ─── Routing ───

#[rstest]
#[case(NotificationKind::ManualUpdate, None, Some(NavigationAction::OpenUrl(URL.to_string())))]
#[case(NotificationKind::ManualUpdate, Some(0), Some(NavigationAction::OpenUrl(URL.to_string())))]
#[case(NotificationKind::ManualUpdate, Some(1), None)]
#[case(NotificationKind::SettingsRestored, None, Some(NavigationAction::OpenExtensionsPage))]
#[case(NotificationKind::SettingsRestored, Some(0), Some(NavigationAction::OpenExtensionsPage))]
#[case(NotificationKind::SettingsRestored, Some(1), None)]
#[case(NotificationKind::NewInstall, None, Some(NavigationAction::OpenOptionsPage))]
#[case(NotificationKind::NewInstall, Some(0), Some(NavigationAction::OpenOptionsPage))]
#[case(NotificationKind::NewInstall, Some(1), None)]
#[tokio::test]
async fn routes_clicks(
    #[case] kind: NotificationKind,
    #[case] button: Option<usize>,
    #[case] expected: Option<NavigationAction>,
) {
    let (dispatcher, host) = setup();

    let action = dispatcher.on_action(kind.id(), button).await;

    assert_eq!(action, expected);
    assert_eq!(host.navigations(), expected.into_iter().collect::<Vec<_>>());
}

#[tokio::test]
async fn unknown_notification_is_ignored() {
    let (dispatcher, host) = setup();
    assert_eq!(dispatcher.on_action("update-available", None).await, None);
    assert!(host.navigations().is_empty());
}

// ─── Timers ───

fn counting_task(counter: Arc<AtomicUsize>) -> impl Fn() -> std::future::Ready<()> + Send + Sync + 'static {
    move || {
        counter.fetch_add(1, Ordering::SeqCst);
        std::future::ready(())
    }
}

#[tokio::test(start_paused = true)]
async fn timer_fires_every_period_after_first_period() {
    let (dispatcher, _host) = setup();
    let fired = Arc::new(AtomicUsize::new(0));

    dispatcher.schedule("update-check", Duration::from_secs(360 * 60), counting_task(fired.clone()));
    assert!(dispatcher.is_scheduled("update-check"));

    tokio::time::sleep(Duration::from_secs(359 * 60)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_secs(2 * 60)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_secs(360 * 60)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_timer() {
    let (dispatcher, _host) = setup();
    let fired = Arc::new(AtomicUsize::new(0));

    dispatcher.schedule("update-check", Duration::from_secs(60), counting_task(fired.clone()));
    assert!(dispatcher.cancel("update-check"));
    assert!(!dispatcher.cancel("update-check"));

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert!(!dispatcher.is_scheduled("update-check"));
}

#[tokio::test(start_paused = true)]
async fn invalid_periods_arm_nothing() {
    let (dispatcher, _host) = setup();
    let fired = Arc::new(AtomicUsize::new(0));

    dispatcher.schedule("zero", Duration::ZERO, counting_task(fired.clone()));
    dispatcher.schedule("forever", Duration::MAX, counting_task(fired.clone()));

    assert!(!dispatcher.is_scheduled("zero"));
    assert!(!dispatcher.is_scheduled("forever"));
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn timers_with_different_names_coexist() {
    let (dispatcher, _host) = setup();
    let a = Arc::new(AtomicUsize::new(0));
    let b = Arc::new(AtomicUsize::new(0));

    dispatcher.schedule("a", Duration::from_secs(10), counting_task(a.clone()));
    dispatcher.schedule("b", Duration::from_secs(25), counting_task(b.clone()));

    tokio::time::sleep(Duration::from_secs(51)).await;
    assert_eq!(a.load(Ordering::SeqCst), 5);
    assert_eq!(b.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn dropping_dispatcher_stops_timers() {
    let (dispatcher, _host) = setup();
    let fired = Arc::new(AtomicUsize::new(0));
    dispatcher.schedule("update-check", Duration::from_secs(60), counting_task(fired.clone()));

    drop(dispatcher);
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}
