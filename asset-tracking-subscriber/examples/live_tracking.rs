//! Live Tracking - follows a simulated courier through an in-process hub
//!
//! A publisher thread walks a short route on a `LocalRealtime` hub while a
//! subscriber prints every status change and location it receives:
//! - Connection status derived from client, channel and publisher presence
//! - Enhanced and raw location updates
//! - Changing the resolution preference mid-route
//!
//! Run with: cargo run -p asset-tracking-subscriber --example live_tracking
//! Set ASSET_TRACKING_LOG_MODE=development for SDK logs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use asset_tracking_subscriber::prelude::*;
use asset_tracking_subscriber::logging;

const TRACKING_ID: &str = "courier-7";

const ROUTE: [(f64, f64); 6] = [
    (51.5007, -0.1246),
    (51.5014, -0.1219),
    (51.5033, -0.1196),
    (51.5055, -0.1180),
    (51.5079, -0.1161),
    (51.5101, -0.1145),
];

struct ConsolePrinter;

impl SubscriberDelegate for ConsolePrinter {
    fn on_connection_status_changed(&self, status: TrackableConnectionStatus) {
        println!("[{}] status: {}", TRACKING_ID, status);
    }

    fn on_enhanced_location(&self, update: &EnhancedLocationUpdate) {
        println!(
            "[{}] location: {:.4}, {:.4} ({} skipped)",
            TRACKING_ID,
            update.location.latitude,
            update.location.longitude,
            update.skipped_locations.len()
        );
    }

    fn on_raw_location(&self, location: &Location) {
        println!(
            "[{}] raw fix: {:.4}, {:.4}",
            TRACKING_ID, location.latitude, location.longitude
        );
    }

    fn on_error(&self, error: &TrackingError) {
        eprintln!("[{}] error: {}", TRACKING_ID, error);
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    println!("=== Asset Tracking: Live Subscriber ===\n");

    let realtime = LocalRealtime::new();
    let printer = Arc::new(ConsolePrinter);

    let (started_tx, started_rx) = mpsc::channel();
    let subscriber = SubscriberBuilder::new()
        .connection(ConnectionConfiguration::with_generated_client_id("demo:secret"))
        .log(LogConfiguration::new(logging::mode_from_env()))
        .tracking_id(TRACKING_ID)
        .resolution(Resolution::new(
            Accuracy::Balanced,
            Duration::from_secs(5),
            10.0,
        ))
        .delegate(&printer)
        .transport(realtime.clone())
        .start(move |result| {
            let _ = started_tx.send(result);
        })?;
    started_rx.recv_timeout(Duration::from_secs(5))??;
    println!("Subscribed to {}", TRACKING_ID);

    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let publisher = realtime.publisher(TRACKING_ID);
    let courier_running = Arc::clone(&running);
    let courier = thread::spawn(move || {
        if let Err(e) = publisher.enter() {
            eprintln!("Publisher could not enter presence: {}", e);
            return;
        }
        for (i, (lat, lon)) in ROUTE.iter().enumerate() {
            if !courier_running.load(Ordering::SeqCst) {
                break;
            }
            let fix = Location::new(*lat, *lon);
            publisher.publish_raw_location(fix.clone());
            publisher.publish_enhanced_location(EnhancedLocationUpdate::actual(fix));
            if i == ROUTE.len() / 2 {
                println!("Publisher sees requests: {:?}", publisher.requested_resolutions());
            }
            thread::sleep(Duration::from_millis(500));
        }
        let _ = publisher.leave();
    });

    thread::sleep(Duration::from_millis(1200));
    let (resolution_tx, resolution_rx) = mpsc::channel();
    subscriber.change_resolution_preference(
        Some(Resolution::new(Accuracy::High, Duration::from_secs(1), 2.0)),
        move |result| {
            let _ = resolution_tx.send(result);
        },
    );
    match resolution_rx.recv_timeout(Duration::from_secs(5))? {
        Ok(()) => println!("Asked for a higher resolution"),
        Err(e) => eprintln!("Resolution change failed: {}", e),
    }

    if courier.join().is_err() {
        eprintln!("Courier thread panicked");
    }

    let (stopped_tx, stopped_rx) = mpsc::channel();
    subscriber.stop(move |result| {
        let _ = stopped_tx.send(result);
    });
    stopped_rx.recv_timeout(Duration::from_secs(5))??;

    println!("\nStopped. Final status: {}", subscriber.connection_status());
    Ok(())
}
