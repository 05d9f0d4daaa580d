//! Property-based tests for settings persistence and backup restore.
//!
//! These tests verify that any valid settings record saved through the
//! settings engine loads back unchanged, that address lists are clamped, and
//! that a backup taken before a reinstall restores the same record.

use std::sync::Arc;

use px2connect::host::memory::{ManualClock, MemoryHost};
use px2connect::services::backup::SettingsBackup;
use px2connect::services::notification_dispatcher::NotificationDispatcher;
use px2connect::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use px2connect::services::settings_migration::SettingsMigrationController;
use px2connect::storage::{KeyValueStore, MemoryStore};
use px2connect::types::lifecycle::{InstallEvent, MigrationOutcome};
use px2connect::types::settings::{
    keys, AddressType, IpType, PartialSettings, SettingsRecord, MAX_ADDRESSES, SETTINGS_VERSION,
    THEMES,
};
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime")
}

fn arb_theme() -> impl Strategy<Value = String> {
    proptest::sample::select(THEMES).prop_map(str::to_string)
}

/// Strategy for a valid dotted-quad address.
fn arb_ip() -> impl Strategy<Value = String> {
    (0u8..=255, 0u8..=255, 0u8..=255, 0u8..=255)
        .prop_map(|(a, b, c, d)| format!("{}.{}.{}.{}", a, b, c, d))
}

/// Strategy for settings that pass validation, with up to `max` addresses.
fn arb_valid_settings(max: usize) -> impl Strategy<Value = SettingsRecord> {
    (
        prop_oneof![Just(IpType::Default), Just(IpType::Custom)],
        arb_theme(),
        proptest::collection::vec(arb_ip(), 1..=max),
    )
        .prop_map(|(ip_type, theme, addresses)| SettingsRecord {
            ip_type,
            theme,
            addresses,
            address_type: AddressType::Ip,
            settings_version: SETTINGS_VERSION.to_string(),
        })
}

// **Property: save then load**
//
// *For any* valid settings record, saving it through the settings engine
// then loading SHALL return the same record, with at most MAX_ADDRESSES
// addresses and the current schema tag.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn saved_settings_load_back(settings in arb_valid_settings(MAX_ADDRESSES)) {
        let rt = runtime();
        let engine = SettingsEngine::new(Arc::new(MemoryStore::new()));

        let loaded = rt.block_on(async {
            engine.save(&PartialSettings::from(&settings)).await.expect("valid settings must save");
            engine.load().await
        });

        prop_assert_eq!(loaded, settings);
    }

    #[test]
    fn long_address_lists_are_clamped(settings in arb_valid_settings(12)) {
        let rt = runtime();
        let store = Arc::new(MemoryStore::new());
        let engine = SettingsEngine::new(store.clone());

        let saved = rt
            .block_on(engine.save(&PartialSettings::from(&settings)))
            .expect("valid settings must save");

        prop_assert!(saved.addresses.len() <= MAX_ADDRESSES);
        prop_assert_eq!(&saved.addresses[..], &settings.addresses[..saved.addresses.len()]);
        let stored = store.snapshot();
        prop_assert_eq!(stored[keys::SETTINGS_VERSION].as_str(), Some(SETTINGS_VERSION));
    }
}

// **Property: backup survives reinstall**
//
// *For any* settings record present before an update, removing the extension
// (clearing the synchronized store) and installing again SHALL restore that
// record from the local backup.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn backup_restores_after_reinstall(settings in arb_valid_settings(MAX_ADDRESSES)) {
        let rt = runtime();
        let sync = Arc::new(MemoryStore::new());
        let local = Arc::new(MemoryStore::new());
        let host = Arc::new(MemoryHost::new());
        let engine = Arc::new(SettingsEngine::new(sync.clone()));
        let backup = Arc::new(SettingsBackup::new(local.clone(), Arc::new(ManualClock::new(0)), "1.0.0"));
        let dispatcher = Arc::new(NotificationDispatcher::new(host.clone(), host.clone(), sync.clone()));
        let controller = SettingsMigrationController::new(engine.clone(), backup, dispatcher);

        let (outcome, restored) = rt.block_on(async {
            engine.write(&settings).await.expect("write must succeed");
            controller.on_lifecycle_event(&InstallEvent::update("0.9.0")).await;

            sync.remove(keys::ALL).await.expect("clear must succeed");
            let outcome = controller.on_lifecycle_event(&InstallEvent::install()).await;
            (outcome, engine.load().await)
        });

        prop_assert_eq!(outcome, MigrationOutcome::Restored);
        prop_assert_eq!(restored, settings);
    }
}
