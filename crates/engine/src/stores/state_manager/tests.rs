use std::sync::Mutex;
use std::time::Duration;

use serde_json::json;

use super::*;
use crate::infrastructure::host::InMemoryHost;
use crate::infrastructure::ports::{
    HostError, MockDebouncedSavePort, MockHostPort, SaveCapabilities,
};

fn manager_with(host: &Arc<InMemoryHost>) -> StateManager {
    StateManager::with_host(DEFAULT_STORAGE_KEY, Arc::clone(host) as Arc<dyn HostPort>)
}

async fn stored(host: &InMemoryHost) -> Option<Value> {
    host.metadata()?.get(DEFAULT_STORAGE_KEY).await
}

// =============================================================================
// Reads
// =============================================================================

#[tokio::test]
async fn first_read_materializes_defaults_without_committing() {
    let host = Arc::new(InMemoryHost::new());
    let manager = manager_with(&host);

    let state = manager.get_state().await;
    assert_eq!(state.level, 1);
    assert_eq!(state.hp, rpgtrack_domain::character::Meter::full(100));

    let raw = stored(&host).await.unwrap();
    assert_eq!(raw["level"], json!(1));
    assert_eq!(host.immediate_saves(), 0);

    // Second read returns the stored document, not a fresh one.
    let again = manager.get_state().await;
    assert_eq!(again.loadouts[0].id, state.loadouts[0].id);
}

#[tokio::test]
async fn unavailable_host_reads_defaults_and_rejects_writes() {
    let host = Arc::new(InMemoryHost::unavailable());
    let manager = manager_with(&host);
    let notified = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&notified);
    manager.subscribe(move |_| *counter.lock().unwrap() += 1);

    assert_eq!(manager.get_state().await.level, 1);
    assert!(!manager.update_field("hp.current", json!(5)).await);
    assert!(!manager.update_state(json!({"level": 3})).await);
    assert!(!manager.set_state(create_empty_state()).await);

    assert_eq!(*notified.lock().unwrap(), 0);
    assert_eq!(host.immediate_saves(), 0);
}

#[tokio::test]
async fn detached_manager_behaves_like_unavailable_host() {
    let manager = StateManager::default();
    assert_eq!(manager.storage_key(), "rpgTracker");
    assert_eq!(manager.get_field("mp.max").await, Some(json!(50)));
    assert!(!manager.update_field("level", json!(2)).await);
}

#[tokio::test]
async fn malformed_sections_are_read_leniently_and_left_in_storage() {
    let host = Arc::new(InMemoryHost::new());
    let metadata = host.metadata().unwrap();
    metadata
        .insert(
            DEFAULT_STORAGE_KEY,
            json!({"level": "high", "hp": {"current": 12, "max": 80}}),
        )
        .await;
    let manager = manager_with(&host);

    let state = manager.get_state().await;
    assert_eq!(state.level, 1);
    assert_eq!(state.hp.current, 12);
    assert_eq!(stored(&host).await.unwrap()["level"], json!("high"));
}

#[tokio::test]
async fn get_field_reads_dynamic_paths() {
    let host = Arc::new(InMemoryHost::new());
    let manager = manager_with(&host);

    assert!(manager.update_field("customSections.lore.origin", json!("north")).await);
    assert_eq!(
        manager.get_field("customSections.lore.origin").await,
        Some(json!("north"))
    );
    assert_eq!(manager.get_field("customSections.missing").await, None);
}

// =============================================================================
// Writes
// =============================================================================

#[tokio::test]
async fn update_field_writes_and_commits() {
    let host = Arc::new(InMemoryHost::new());
    let manager = manager_with(&host);

    assert!(manager.update_field("hp.current", json!(42)).await);

    assert_eq!(manager.get_state().await.hp.current, 42);
    assert_eq!(host.immediate_saves(), 1);
    let saved = host.last_saved().unwrap();
    assert_eq!(saved[DEFAULT_STORAGE_KEY]["hp"]["current"], json!(42));
    // Untouched sections come from defaults.
    assert_eq!(saved[DEFAULT_STORAGE_KEY]["mp"]["max"], json!(50));
}

#[tokio::test]
async fn update_state_deep_merges() {
    let host = Arc::new(InMemoryHost::new());
    let manager = manager_with(&host);
    manager.update_field("hp.max", json!(120)).await;

    assert!(manager.update_state(json!({"hp": {"current": 7}, "notes": "ambushed"})).await);

    let state = manager.get_state().await;
    assert_eq!(state.hp.current, 7);
    assert_eq!(state.hp.max, 120);
    assert_eq!(state.notes, "ambushed");
}

#[tokio::test]
async fn set_state_replaces_document() {
    let host = Arc::new(InMemoryHost::new());
    let manager = manager_with(&host);
    manager.update_field("notes", json!("old")).await;

    let mut document = create_empty_state();
    document.character_name = "Ysolde".to_string();
    document.level = 9;
    assert!(manager.set_state(document).await);

    let state = manager.get_state().await;
    assert_eq!(state.character_name, "Ysolde");
    assert_eq!(state.level, 9);
    assert_eq!(state.notes, "");
}

#[tokio::test]
async fn read_modify_replace_keeps_data_outside_the_schema() {
    let host = Arc::new(InMemoryHost::new());
    let manager = manager_with(&host);
    assert!(manager.update_field("hp.temp", json!(5)).await);
    assert!(
        manager
            .update_state(json!({
                "skills": [{"name": "Lockpicking", "level": 3}],
                "experience": {"current": 12.5, "toNextLevel": 100}
            }))
            .await
    );
    let before = stored(&host).await.unwrap();

    let mut document = manager.get_state().await;
    document.level = 2;
    assert!(manager.set_state(document).await);

    let mut expected = before;
    expected["level"] = json!(2);
    assert_eq!(stored(&host).await.unwrap(), expected);
}

#[tokio::test]
async fn set_state_with_unchanged_view_is_a_no_op_on_storage() {
    let host = Arc::new(InMemoryHost::new());
    let manager = manager_with(&host);
    manager.update_field("attributes.STR.bonusSource", json!("ring")).await;
    let before = stored(&host).await.unwrap();

    let document = manager.get_state().await;
    assert!(manager.set_state(document).await);
    assert_eq!(stored(&host).await.unwrap(), before);
}

#[tokio::test]
async fn non_object_partial_is_rejected() {
    let host = Arc::new(InMemoryHost::new());
    let manager = manager_with(&host);
    assert!(manager.update_field("characterName", json!("Aria")).await);
    let before = stored(&host).await.unwrap();
    let saves = host.immediate_saves();

    for partial in [Value::Null, json!(7), json!("x"), json!([1])] {
        assert!(!manager.update_state(partial).await);
    }

    assert_eq!(stored(&host).await.unwrap(), before);
    assert_eq!(host.immediate_saves(), saves);
    assert_eq!(manager.get_state().await.character_name, "Aria");
}

#[tokio::test]
async fn concurrent_field_updates_are_both_retained() {
    let host = Arc::new(InMemoryHost::new().with_save_delay(Duration::from_millis(20)));
    let manager = Arc::new(manager_with(&host));
    manager.get_state().await;

    let hp = {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.update_field("hp.current", json!(40)).await })
    };
    let mp = {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.update_field("mp.current", json!(10)).await })
    };
    assert!(hp.await.unwrap());
    assert!(mp.await.unwrap());

    let state = manager.get_state().await;
    assert_eq!(state.hp.current, 40);
    assert_eq!(state.mp.current, 10);

    let saved = host.last_saved().unwrap();
    assert_eq!(saved[DEFAULT_STORAGE_KEY]["hp"]["current"], json!(40));
    assert_eq!(saved[DEFAULT_STORAGE_KEY]["mp"]["current"], json!(10));
}

#[tokio::test]
async fn notifications_follow_write_order() {
    let host = Arc::new(InMemoryHost::new().with_save_delay(Duration::from_millis(5)));
    let manager = Arc::new(manager_with(&host));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    manager.subscribe(move |document| sink.lock().unwrap().push(document.level));

    let mut handles = Vec::new();
    for level in 2..=6u32 {
        let manager = Arc::clone(&manager);
        handles.push(tokio::spawn(async move {
            manager.update_field("level", json!(level)).await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap());
    }

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 5);
    // The last notification matches what ended up stored.
    assert_eq!(Some(manager.get_state().await.level), seen.last().copied());
}

#[tokio::test]
async fn failed_commit_still_reports_applied_write() {
    let metadata = ChatMetadata::new();
    let shared = metadata.clone();
    let mut host = MockHostPort::new();
    host.expect_chat_metadata()
        .returning(move || Ok(Some(shared.clone())));
    host.expect_save_capabilities()
        .returning(|| SaveCapabilities::IMMEDIATE);
    host.expect_save_metadata()
        .returning(|| Err(HostError::storage("save_metadata", "disk full")));

    let manager = StateManager::with_host(DEFAULT_STORAGE_KEY, Arc::new(host));
    assert!(manager.update_field("level", json!(4)).await);
    assert_eq!(
        metadata.get(DEFAULT_STORAGE_KEY).await.unwrap()["level"],
        json!(4)
    );
}

#[tokio::test]
async fn debounced_hint_is_used_when_host_cannot_save() {
    let host = Arc::new(InMemoryHost::new().with_capabilities(SaveCapabilities::NONE));
    let mut hint = MockDebouncedSavePort::new();
    hint.expect_request_save().times(1).return_const(());

    let manager = StateManager::new(DEFAULT_STORAGE_KEY);
    manager.init(Some(host as Arc<dyn HostPort>), Some(Arc::new(hint)));
    assert!(manager.update_field("level", json!(2)).await);
}

#[tokio::test]
async fn reinit_switches_host() {
    let first = Arc::new(InMemoryHost::new());
    let second = Arc::new(InMemoryHost::new());
    let manager = manager_with(&first);

    manager.update_field("notes", json!("first")).await;
    manager.init(Some(Arc::clone(&second) as Arc<dyn HostPort>), None);
    manager.update_field("notes", json!("second")).await;

    assert_eq!(stored(&first).await.unwrap()["notes"], json!("first"));
    assert_eq!(stored(&second).await.unwrap()["notes"], json!("second"));
}

// =============================================================================
// Derived stats
// =============================================================================

#[tokio::test]
async fn attribute_writes_refresh_derived_stats() {
    let host = Arc::new(InMemoryHost::new());
    let manager = manager_with(&host);
    assert_eq!(manager.get_state().await.derived_stats.attack_power, 20);

    assert!(manager.update_field("attributes.STR.base", json!(16)).await);

    let state = manager.get_state().await;
    assert_eq!(state.derived_stats.attack_power, 29);
    assert_eq!(state.derived_stats.defense, 16);
}

#[tokio::test]
async fn merged_attributes_refresh_derived_stats() {
    let host = Arc::new(InMemoryHost::new());
    let manager = manager_with(&host);

    manager
        .update_state(json!({
            "attributes": {
                "STR": {"base": 16}, "DEX": {"base": 12}, "CON": {"base": 11},
                "INT": {"base": 8}, "WIS": {"base": 10}
            }
        }))
        .await;

    let stats = manager.get_state().await.derived_stats;
    assert_eq!(
        (stats.attack_power, stats.defense, stats.magic_power),
        (30, 18, 17)
    );
    assert_eq!((stats.crit_chance, stats.evasion, stats.speed), (9, 11, 16));
}

#[tokio::test]
async fn auto_derive_can_be_disabled() {
    let host = Arc::new(InMemoryHost::new());
    let manager = manager_with(&host);
    manager
        .update_field("settings.autoCalculateDerived", json!(false))
        .await;

    manager.update_field("attributes.STR.base", json!(30)).await;
    assert_eq!(manager.get_state().await.derived_stats.attack_power, 20);

    let stats = manager.recalculate_derived_stats().await;
    assert_eq!(stats.attack_power, 50);
    assert_eq!(manager.get_state().await.derived_stats.attack_power, 50);
}

#[tokio::test]
async fn non_attribute_writes_leave_stale_stats_alone() {
    let host = Arc::new(InMemoryHost::new());
    let manager = manager_with(&host);
    manager.update_field("derivedStats.attackPower", json!(999)).await;
    manager.update_field("hp.current", json!(1)).await;

    assert_eq!(manager.get_state().await.derived_stats.attack_power, 999);
}

// =============================================================================
// Listeners
// =============================================================================

#[tokio::test]
async fn listeners_see_post_write_state_until_unsubscribed() {
    let host = Arc::new(InMemoryHost::new());
    let manager = manager_with(&host);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = manager.subscribe(move |document| {
        sink.lock().unwrap().push(document.hp.current);
    });
    assert_eq!(manager.subscriber_count(), 1);

    manager.update_field("hp.current", json!(55)).await;
    assert!(subscription.unsubscribe());
    assert!(!subscription.unsubscribe());
    manager.update_field("hp.current", json!(60)).await;

    assert_eq!(*seen.lock().unwrap(), vec![55]);
    assert_eq!(manager.subscriber_count(), 0);
}

#[tokio::test]
async fn failing_listener_does_not_fail_the_write() {
    let host = Arc::new(InMemoryHost::new());
    let manager = manager_with(&host);
    manager.subscribe_fallible(|_| Err("refused".into()));
    manager.subscribe(|_| panic!("listener bug"));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    manager.subscribe(move |document| sink.lock().unwrap().push(document.level));

    assert!(manager.update_field("level", json!(3)).await);
    assert_eq!(manager.get_state().await.level, 3);
    assert_eq!(*seen.lock().unwrap(), vec![3]);
}
