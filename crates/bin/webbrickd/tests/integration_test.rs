//! End-to-end tests for the full bridge stack.
//!
//! Each test starts a real driver on top of the simulated bus and the
//! in-memory platform, then watches what the platform receives.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use webbrick_adapter_virtual::{
    BusInjector, InMemoryPlatform, SimulatedDeviceConfig, VirtualBus, VirtualBusConfig,
};
use webbrick_app::{Driver, DriverConfig};
use webbrick_domain::category::DeviceCategory;
use webbrick_domain::channel::ChannelKind;
use webbrick_domain::error::BridgeError;
use webbrick_domain::notification::NotificationKind;

struct Bridge {
    driver: Driver,
    platform: Arc<InMemoryPlatform>,
    injector: BusInjector,
}

fn bus_config() -> VirtualBusConfig {
    VirtualBusConfig {
        poll_interval_ms: 5,
        devices: vec![
            SimulatedDeviceConfig::new("1", "lightchannel", "Kitchen").level(20.0),
            SimulatedDeviceConfig::new("2", "pir", "Hall"),
            SimulatedDeviceConfig::new("3", "temp", "Lounge").level(21.5),
            SimulatedDeviceConfig::new("5", "button", "Doorbell"),
        ],
        ..VirtualBusConfig::default()
    }
}

/// Start a bridge and wait until every simulated device is onboarded.
async fn bridge() -> Bridge {
    let bus = VirtualBus::new(&bus_config());
    let injector = bus.injector();
    let platform = Arc::new(InMemoryPlatform::new());
    let driver = Driver::start(DriverConfig::default(), bus, Arc::clone(&platform))
        .await
        .expect("driver should start on a ready bus");

    let exported = &platform;
    eventually(move || async move { exported.devices().len() == 4 }).await;

    Bridge {
        driver,
        platform,
        injector,
    }
}

async fn eventually<F, Fut>(condition: F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..400 {
        if condition().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met in time");
}

// ---------------------------------------------------------------------------
// Onboarding
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_export_each_device_once_with_category_channels() {
    let bridge = bridge().await;

    // Give the bus a few more polls to re-announce anything it still could.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let devices = bridge.platform.devices();
    assert_eq!(devices.len(), 4);

    let light = bridge.platform.device(&"1".into()).unwrap();
    assert_eq!(light.descriptor.category, DeviceCategory::Light);
    assert_eq!(light.descriptor.natural_id, "device1");
    assert_eq!(light.channels, vec![ChannelKind::OnOff, ChannelKind::Brightness]);

    let pir = bridge.platform.device(&"2".into()).unwrap();
    assert_eq!(pir.channels, vec![ChannelKind::Motion]);

    let button = bridge.platform.device(&"5".into()).unwrap();
    assert!(button.channels.is_empty());
}

#[tokio::test]
async fn should_publish_initial_values_when_onboarding() {
    let bridge = bridge().await;

    let light: Vec<_> = bridge
        .platform
        .notifications_for(&"1".into())
        .into_iter()
        .map(|n| n.kind)
        .collect();
    assert_eq!(
        light[..2],
        [NotificationKind::OnOff(false), NotificationKind::Brightness(20.0)]
    );

    let temp = bridge.platform.notifications_for(&"3".into());
    assert_eq!(temp[0].kind, NotificationKind::Temperature(21.5));
    assert!(bridge.platform.notifications_for(&"2".into()).is_empty());
}

#[tokio::test]
async fn should_announce_effective_config_to_platform() {
    let bridge = bridge().await;
    assert_eq!(bridge.platform.config(), Some(DriverConfig::default()));
}

// ---------------------------------------------------------------------------
// Bus activity
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_pulse_motion_once_when_sensor_fires() {
    let bridge = bridge().await;

    bridge.injector.trigger("2").unwrap();
    let platform = &bridge.platform;
    eventually(move || async move { !platform.notifications_for(&"2".into()).is_empty() }).await;
    tokio::time::sleep(Duration::from_millis(30)).await;

    let pir = bridge.platform.notifications_for(&"2".into());
    assert_eq!(pir.len(), 1);
    assert_eq!(pir[0].kind, NotificationKind::Motion);
}

#[tokio::test]
async fn should_follow_local_changes_reported_by_bus() {
    let bridge = bridge().await;

    bridge.injector.report("1", true, 42.0).unwrap();
    let driver = &bridge.driver;
    eventually(move || async move {
        let light = driver.device("1".into()).await.unwrap().unwrap();
        light.state == Some(true) && light.level == Some(42.0)
    })
    .await;

    let last = bridge.platform.notifications_for(&"1".into());
    assert_eq!(last.last().unwrap().kind, NotificationKind::Brightness(42.0));
}

// ---------------------------------------------------------------------------
// Platform commands
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_dim_light_through_driver() {
    let bridge = bridge().await;

    bridge.driver.set_brightness("1".into(), 75.0).await.unwrap();

    let driver = &bridge.driver;
    eventually(move || async move {
        let light = driver.device("1".into()).await.unwrap().unwrap();
        light.level == Some(75.0) && light.state == Some(true)
    })
    .await;
}

#[tokio::test]
async fn should_toggle_light_through_driver() {
    let bridge = bridge().await;

    bridge.driver.toggle_on_off("1".into()).await.unwrap();

    let driver = &bridge.driver;
    eventually(move || async move {
        let light = driver.device("1".into()).await.unwrap().unwrap();
        light.state == Some(true)
    })
    .await;
}

#[tokio::test]
async fn should_rename_device_with_sanitized_name() {
    let bridge = bridge().await;

    let name = bridge
        .driver
        .set_name("3".into(), "Living Room #1!")
        .await
        .unwrap();

    assert_eq!(name, "livingroom1");
    let renamed = bridge.platform.notifications_for(&"3".into());
    assert_eq!(
        renamed.last().unwrap().kind,
        NotificationKind::Renamed("livingroom1".to_string())
    );
}

#[tokio::test]
async fn should_reject_rename_to_nothing() {
    let bridge = bridge().await;

    let result = bridge.driver.set_name("3".into(), "###").await;

    assert!(matches!(result, Err(BridgeError::Validation(_))));
}

#[tokio::test]
async fn should_ignore_brightness_for_temperature_sensor() {
    let bridge = bridge().await;
    let before = bridge.platform.notifications().len();

    bridge.driver.set_brightness("3".into(), 50.0).await.unwrap();

    assert_eq!(bridge.platform.notifications().len(), before);
}

#[tokio::test]
async fn should_list_devices_in_identity_order() {
    let bridge = bridge().await;

    let devices = bridge.driver.devices().await.unwrap();

    let ids: Vec<&str> = devices.iter().map(|d| d.identity.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3", "5"]);
    assert!(devices.iter().all(|d| d.onboarded));
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_keep_running_after_stop_request() {
    let bridge = bridge().await;

    assert!(matches!(bridge.driver.stop(), Err(BridgeError::Unsupported(_))));
    assert!(bridge.driver.is_running());

    bridge.driver.press_button("5".into()).await.unwrap();
    assert_eq!(bridge.driver.devices().await.unwrap().len(), 4);
}

#[tokio::test]
async fn should_refuse_to_start_on_unready_bus() {
    let bus = VirtualBus::new(&VirtualBusConfig {
        ready: false,
        ..bus_config()
    });

    let result = Driver::start(DriverConfig::default(), bus, InMemoryPlatform::new()).await;

    assert!(matches!(result, Err(BridgeError::NotReady)));
}
