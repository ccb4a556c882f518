//! End-to-end discovery pass scenarios: describe, filter, reconcile and the
//! batched host calls.

mod helpers;

use std::sync::Arc;

use helpers::{device, MockController, MockHandle, RecordingHost, StaticSource};
use rstest::rstest;
use sonos_bridge::{
    AccessoryId, AccessoryRecord, BridgeConfig, BridgeError, DeviceRule, PassWarning,
    SonosPlatform,
};

fn names_config(names: &[&str]) -> BridgeConfig {
    BridgeConfig {
        device_names: Some(names.iter().map(|n| n.to_string()).collect()),
        ..Default::default()
    }
}

fn platform(config: BridgeConfig, host: Arc<RecordingHost>) -> SonosPlatform {
    SonosPlatform::new(config, host, Arc::new(MockController::default())).unwrap()
}

fn names(records: &[AccessoryRecord]) -> Vec<String> {
    let mut names: Vec<_> = records.iter().map(|r| r.display_name.clone()).collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_failed_describe_does_not_affect_other_devices() {
    let host = Arc::new(RecordingHost::default());
    let platform = platform(names_config(&["Den", "Kitchen", "Office"]), host.clone());
    let source = StaticSource::new(vec![
        MockHandle::ok(device("10.0.0.1", Some("uuid:A"), "Den")),
        MockHandle::failing("10.0.0.2", "connection reset"),
        MockHandle::ok(device("10.0.0.3", Some("uuid:C"), "Office")),
    ]);

    let report = platform.run_discovery_pass(&source).await.unwrap();

    assert_eq!(names(&report.registered), vec!["Den", "Office"]);
    assert_eq!(
        report.warnings,
        vec![PassWarning::DescribeFailed {
            host: "10.0.0.2".to_string(),
            cause: "Network error: connection reset".to_string(),
        }]
    );

    let calls = host.register_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(names(&calls[0]), vec!["Den", "Office"]);
    assert!(calls[0].iter().all(|r| r.host() != "10.0.0.2"));
    assert!(host.update_calls().is_empty());
}

#[tokio::test]
async fn test_second_pass_updates_instead_of_registering() {
    let host = Arc::new(RecordingHost::default());
    let platform = platform(names_config(&["Den"]), host.clone());
    let source = StaticSource::new(vec![MockHandle::ok(device("10.0.0.1", Some("uuid:A"), "Den"))]);

    let first = platform.run_discovery_pass(&source).await.unwrap();
    let second = platform.run_discovery_pass(&source).await.unwrap();

    assert_eq!(first.registered.len(), 1);
    assert!(first.updated.is_empty());
    assert!(second.registered.is_empty());
    assert_eq!(second.updated.len(), 1);
    assert_eq!(second.updated[0].id, first.registered[0].id);

    assert_eq!(host.register_calls().len(), 1);
    assert_eq!(host.update_calls().len(), 1);
}

#[tokio::test]
async fn test_cached_accessory_is_never_registered_again() {
    let cached = AccessoryRecord::new(device("10.0.0.1", Some("uuid:A"), "Den"));
    let host = Arc::new(RecordingHost::with_cache(vec![cached.clone()]));
    let platform = platform(names_config(&["Den"]), host.clone());
    assert_eq!(platform.accessories().len(), 1);

    // Same UDN, new address after a DHCP renewal
    let source = StaticSource::new(vec![MockHandle::ok(device("10.0.0.42", Some("uuid:A"), "Den"))]);
    let report = platform.run_discovery_pass(&source).await.unwrap();

    assert!(host.register_calls().is_empty());
    let updates = host.update_calls();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0][0].id, cached.id);
    assert_eq!(updates[0][0].host(), "10.0.0.42");
    assert_eq!(report.updated[0].host(), "10.0.0.42");
}

#[tokio::test]
async fn test_rejected_registration_is_retried_next_pass() {
    let kitchen = AccessoryRecord::new(device("10.0.0.2", Some("uuid:K"), "Kitchen"));
    let host = Arc::new(RecordingHost::with_cache(vec![kitchen.clone()]).rejecting_registrations(1));
    let platform = platform(names_config(&["Den", "Kitchen"]), host.clone());
    let source = StaticSource::new(vec![
        MockHandle::ok(device("10.0.0.1", Some("uuid:A"), "Den")),
        MockHandle::ok(device("10.0.0.9", Some("uuid:K"), "Kitchen")),
    ]);

    let err = platform.run_discovery_pass(&source).await.unwrap_err();
    assert!(matches!(err, BridgeError::Host(_)));

    // Refreshed records still reach the host; the rejected one is not kept
    let updates = host.update_calls();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0][0].id, kitchen.id);
    assert_eq!(updates[0][0].host(), "10.0.0.9");
    assert!(platform.accessory_by_name("Den").is_none());
    assert!(host.register_calls().is_empty());

    let report = platform.run_discovery_pass(&source).await.unwrap();

    assert_eq!(names(&report.registered), vec!["Den"]);
    assert_eq!(names(&report.updated), vec!["Kitchen"]);
    let calls = host.register_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(names(&calls[0]), vec!["Den"]);
    assert!(platform.accessory_by_name("Den").is_some());
}

#[tokio::test]
async fn test_empty_configuration_skips_discovery() {
    let host = Arc::new(RecordingHost::default());
    let platform = platform(BridgeConfig::default(), host.clone());
    let source = StaticSource::new(vec![MockHandle::ok(device("10.0.0.1", Some("uuid:A"), "Den"))]);

    let report = platform.run_discovery_pass(&source).await.unwrap();

    assert!(report.skipped());
    assert_eq!(report.warnings, vec![PassWarning::ConfigurationEmpty]);
    assert_eq!(source.polls(), 0);
    assert!(host.register_calls().is_empty());
    assert!(host.update_calls().is_empty());
}

#[tokio::test]
async fn test_duplicate_sighting_in_one_pass_registers_once() {
    let host = Arc::new(RecordingHost::default());
    let platform = platform(names_config(&["Den"]), host.clone());
    let source = StaticSource::new(vec![
        MockHandle::ok(device("10.0.0.1", Some("uuid:A"), "Den")),
        MockHandle::ok(device("10.0.0.1", Some("uuid:A"), "Den")),
    ]);

    let report = platform.run_discovery_pass(&source).await.unwrap();

    assert_eq!(report.registered.len(), 1);
    assert!(report.updated.is_empty());
    let calls = host.register_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 1);
    assert!(host.update_calls().is_empty());
}

#[tokio::test]
async fn test_devices_without_udn_are_keyed_by_host() {
    let host = Arc::new(RecordingHost::default());
    let platform = platform(names_config(&["Sonos Device"]), host.clone());
    let source = StaticSource::new(vec![
        MockHandle::ok(sonos_discovery::DeviceDescriptor::new("10.0.0.1", None, None)),
        MockHandle::ok(sonos_discovery::DeviceDescriptor::new("10.0.0.2", None, None)),
    ]);

    let report = platform.run_discovery_pass(&source).await.unwrap();

    let ids: Vec<_> = report.registered.iter().map(|r| r.id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&AccessoryId::from_unique_id("10.0.0.1")));
    assert!(ids.contains(&AccessoryId::from_unique_id("10.0.0.2")));
}

#[rstest]
#[case::name_only(DeviceRule::named("Den"), true)]
#[case::matching_ip(DeviceRule::named("Den").with_ip("10.0.0.1"), true)]
#[case::other_ip(DeviceRule::named("Den").with_ip("10.0.0.9"), false)]
#[case::serial_mac(DeviceRule::named("Den").with_mac("00-0E-58-AA-BB-CC"), true)]
#[case::other_mac(DeviceRule::named("Den").with_mac("00-0E-58-AA-BB-CD"), false)]
#[tokio::test]
async fn test_strict_rules_in_pass(#[case] rule: DeviceRule, #[case] registered: bool) {
    let host = Arc::new(RecordingHost::default());
    let config = BridgeConfig {
        device_names: Some(vec!["Den".to_string()]),
        devices: Some(vec![rule]),
        ..Default::default()
    };
    let platform = platform(config, host.clone());
    let den = device("10.0.0.1", Some("uuid:A"), "Den")
        .with_serial_fallback(Some("00-0E-58-AA-BB-CC:3".to_string()));
    let source = StaticSource::new(vec![MockHandle::ok(den)]);

    let report = platform.run_discovery_pass(&source).await.unwrap();

    assert_eq!(report.registered.len(), usize::from(registered));
    assert_eq!(report.rejected.len(), usize::from(!registered));
    assert_eq!(host.register_calls().len(), usize::from(registered));
}

#[tokio::test]
async fn test_rejected_devices_are_reported_not_registered() {
    let host = Arc::new(RecordingHost::default());
    let platform = platform(names_config(&["Den"]), host.clone());
    let source = StaticSource::new(vec![
        MockHandle::ok(device("10.0.0.1", Some("uuid:A"), "Den")),
        MockHandle::ok(device("10.0.0.2", Some("uuid:B"), "Garage")),
    ]);

    let report = platform.run_discovery_pass(&source).await.unwrap();

    assert_eq!(names(&report.registered), vec!["Den"]);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].display_name, "Garage");
    assert!(report.warnings.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_hanging_describe_times_out() {
    let host = Arc::new(RecordingHost::default());
    let config = BridgeConfig {
        describe_timeout_secs: Some(2),
        ..names_config(&["Den"])
    };
    let platform = platform(config, host.clone());
    let source = StaticSource::new(vec![
        MockHandle::hanging("10.0.0.5"),
        MockHandle::ok(device("10.0.0.1", Some("uuid:A"), "Den")),
    ]);

    let report = platform.run_discovery_pass(&source).await.unwrap();

    assert_eq!(names(&report.registered), vec!["Den"]);
    assert!(matches!(
        &report.warnings[..],
        [PassWarning::DescribeTimedOut { host, .. }] if host == "10.0.0.5"
    ));
}
