//! End-to-end tests: subscribers and a publisher sharing an in-process
//! `LocalRealtime` hub.

mod test_helpers;

use std::time::Duration;

use asset_tracking_subscriber::{
    Accuracy, ConnectionConfiguration, ConnectionState, EnhancedLocationUpdate, LocalRealtime,
    Location, Resolution, SubscriberBuilder, TrackableConnectionStatus, TrackingError,
    TransportError,
};
use asset_tracking_transport::LocalOperation;
use test_helpers::{
    base_builder, completed, completion_channel, settle, wait_until, with_timeout,
    RecordingDelegate, TRACKING_ID,
};
use TrackableConnectionStatus::{Failed, Offline, Online};

#[tokio::test]
async fn test_existing_publisher_brings_subscriber_online() {
    let realtime = LocalRealtime::new();
    let publisher = realtime.publisher(TRACKING_ID);
    publisher.enter().unwrap();

    let delegate = RecordingDelegate::new();
    let (handler, rx) = completion_channel();
    let subscriber = base_builder()
        .delegate(&delegate)
        .transport(realtime.clone())
        .start(handler)
        .unwrap();

    assert_eq!(completed(rx).await, Ok(()));
    wait_until(|| delegate.statuses() == vec![Online]).await;
    assert_eq!(realtime.attachment_count(TRACKING_ID), 1);

    publisher.leave().unwrap();
    wait_until(|| delegate.statuses() == vec![Online, Offline]).await;

    assert_eq!(with_timeout(subscriber.stop_async()).await, Ok(()));
    assert_eq!(realtime.attachment_count(TRACKING_ID), 0);

    settle().await;
    assert_eq!(delegate.statuses(), vec![Online, Offline]);
}

#[tokio::test]
async fn test_publisher_arriving_later_is_noticed() {
    let realtime = LocalRealtime::new();
    let delegate = RecordingDelegate::new();
    let subscriber = base_builder()
        .delegate(&delegate)
        .transport(realtime.clone())
        .start(|_| {})
        .unwrap();
    wait_until(|| realtime.attachment_count(TRACKING_ID) == 1).await;
    assert_eq!(subscriber.connection_status(), Offline);

    realtime.publisher(TRACKING_ID).enter().unwrap();

    wait_until(|| delegate.statuses() == vec![Online]).await;
    assert_eq!(subscriber.connection_status(), Online);
}

#[tokio::test]
async fn test_published_locations_are_delivered() {
    let realtime = LocalRealtime::new();
    let publisher = realtime.publisher(TRACKING_ID);
    let delegate = RecordingDelegate::new();
    let _subscriber = base_builder()
        .delegate(&delegate)
        .transport(realtime.clone())
        .start(|_| {})
        .unwrap();
    wait_until(|| realtime.attachment_count(TRACKING_ID) == 1).await;

    let update = EnhancedLocationUpdate::actual(Location::new(52.52, 13.405));
    let raw = Location::new(52.521, 13.404);
    assert_eq!(publisher.publish_enhanced_location(update.clone()), 1);
    assert_eq!(publisher.publish_raw_location(raw.clone()), 1);

    wait_until(|| delegate.raw().len() == 1).await;
    assert_eq!(delegate.enhanced(), vec![update]);
    assert_eq!(delegate.raw(), vec![raw]);
}

#[tokio::test]
async fn test_resolution_preferences_are_visible_to_publisher() {
    let realtime = LocalRealtime::new();
    let publisher = realtime.publisher(TRACKING_ID);
    let initial = Resolution::new(Accuracy::Low, Duration::from_secs(10), 50.0);
    let (handler, rx) = completion_channel();

    let subscriber = base_builder()
        .resolution(initial)
        .transport(realtime.clone())
        .start(handler)
        .unwrap();
    assert_eq!(completed(rx).await, Ok(()));
    assert_eq!(publisher.requested_resolutions(), vec![Some(initial)]);

    let precise = Resolution::new(Accuracy::Maximum, Duration::from_millis(500), 1.0);
    assert_eq!(
        with_timeout(subscriber.change_resolution_preference_async(Some(precise))).await,
        Ok(())
    );
    assert_eq!(publisher.requested_resolutions(), vec![Some(precise)]);

    assert_eq!(with_timeout(subscriber.stop_async()).await, Ok(()));
    assert!(publisher.requested_resolutions().is_empty());
}

#[tokio::test]
async fn test_injected_failures_surface_as_transport_errors() {
    let realtime = LocalRealtime::new();
    realtime.fail_next(
        LocalOperation::Start,
        TransportError::ChannelAttach {
            channel: "tracking:order-42".into(),
            reason: "capability denied".into(),
        },
    );
    let (handler, rx) = completion_channel();

    let subscriber = base_builder()
        .transport(realtime.clone())
        .start(handler)
        .unwrap();

    let result = completed(rx).await;
    assert!(matches!(
        result,
        Err(TrackingError::Transport(TransportError::ChannelAttach { .. }))
    ));
    assert_eq!(realtime.attachment_count(TRACKING_ID), 0);

    // The failure was one-shot, so a retry attaches.
    assert_eq!(with_timeout(subscriber.start_async()).await, Ok(()));
    assert_eq!(realtime.attachment_count(TRACKING_ID), 1);
}

#[tokio::test]
async fn test_blank_api_key_is_rejected_by_transport() {
    let realtime = LocalRealtime::new();
    let (handler, rx) = completion_channel();

    let _subscriber = SubscriberBuilder::new()
        .connection(ConnectionConfiguration::new("  ", "dispatch-desk"))
        .tracking_id(TRACKING_ID)
        .transport(realtime.clone())
        .start(handler)
        .unwrap();

    assert!(matches!(
        completed(rx).await,
        Err(TrackingError::Transport(TransportError::Connection(_)))
    ));
}

#[tokio::test]
async fn test_client_failure_and_channel_errors_reach_delegate() {
    let realtime = LocalRealtime::new();
    realtime.publisher(TRACKING_ID).enter().unwrap();
    let delegate = RecordingDelegate::new();
    let _subscriber = base_builder()
        .delegate(&delegate)
        .transport(realtime.clone())
        .start(|_| {})
        .unwrap();
    wait_until(|| delegate.statuses() == vec![Online]).await;

    realtime.emit_failure(TRACKING_ID, TransportError::Publish("message too large".into()));
    realtime.set_client_state("dispatch-desk", ConnectionState::Failed);

    wait_until(|| delegate.statuses() == vec![Online, Failed]).await;
    assert_eq!(
        delegate.errors(),
        vec![TrackingError::Transport(TransportError::Publish(
            "message too large".into()
        ))]
    );
}

#[tokio::test]
async fn test_subscribers_on_one_trackable_are_independent() {
    let realtime = LocalRealtime::new();
    let publisher = realtime.publisher(TRACKING_ID);
    publisher.enter().unwrap();

    let template = base_builder().transport(realtime.clone());
    let first_delegate = RecordingDelegate::new();
    let second_delegate = RecordingDelegate::new();

    let first = template
        .connection(ConnectionConfiguration::new("key:secret", "viewer-1"))
        .delegate(&first_delegate)
        .start(|_| {})
        .unwrap();
    let _second = template
        .connection(ConnectionConfiguration::new("key:secret", "viewer-2"))
        .delegate(&second_delegate)
        .start(|_| {})
        .unwrap();

    wait_until(|| realtime.attachment_count(TRACKING_ID) == 2).await;
    wait_until(|| second_delegate.statuses() == vec![Online]).await;
    wait_until(|| first_delegate.statuses() == vec![Online]).await;

    assert_eq!(with_timeout(first.stop_async()).await, Ok(()));
    assert_eq!(realtime.attachment_count(TRACKING_ID), 1);

    let update = EnhancedLocationUpdate::actual(Location::new(40.7, -74.0));
    assert_eq!(publisher.publish_enhanced_location(update.clone()), 1);
    wait_until(|| second_delegate.enhanced() == vec![update.clone()]).await;
    assert!(first_delegate.enhanced().is_empty());
}

#[tokio::test]
async fn test_dropping_after_failed_stop_detaches_from_hub() {
    let realtime = LocalRealtime::new();
    let publisher = realtime.publisher(TRACKING_ID);
    let (handler, rx) = completion_channel();
    let subscriber = base_builder()
        .transport(realtime.clone())
        .start(handler)
        .unwrap();
    assert_eq!(completed(rx).await, Ok(()));

    realtime.fail_next(LocalOperation::Stop, TransportError::Closed);
    assert_eq!(
        with_timeout(subscriber.stop_async()).await,
        Err(TrackingError::Transport(TransportError::Closed))
    );
    assert_eq!(realtime.attachment_count(TRACKING_ID), 1);

    drop(subscriber);

    wait_until(|| realtime.attachment_count(TRACKING_ID) == 0).await;
    assert!(publisher.requested_resolutions().is_empty());
}
