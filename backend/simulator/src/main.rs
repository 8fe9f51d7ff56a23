//! Device simulator.
//!
//! Publishes synthetic readings for one device on a fixed interval,
//! following a rough household load curve. Readings ride the same data
//! queue as real devices, so the monitoring service cannot tell them
//! apart.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};
use event_schema::Measurement;
use lapin::Channel;
use rand::Rng;
use sync_fabric::{
    supervise, topology, ChannelHandle, FabricConfig, FabricRole, MeasurementPublisher,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Synthesize one reading for the given instant. Values follow the hour
/// of day: near-idle at night, a small daytime base, an evening peak.
fn generate_measurement(device_id: i64, now: DateTime<Utc>) -> Measurement {
    let mut rng = rand::thread_rng();
    let value = match now.hour() {
        0..=6 => 0.05 + rng.gen::<f64>() * 0.1,
        17..=22 => 0.5 + rng.gen::<f64>() * 0.8,
        _ => 0.1 + rng.gen::<f64>() * 0.4,
    };

    Measurement {
        device_id,
        measurement_value: (value * 1000.0).round() / 1000.0,
        timestamp: now,
    }
}

/// Publisher-only role: assert the data queue and park.
struct SimulatorRole;

#[async_trait]
impl FabricRole for SimulatorRole {
    async fn declare(&self, channel: &Channel) -> Result<(), lapin::Error> {
        topology::declare_data_queue(channel).await
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,lapin=warn"));
    fmt().with_env_filter(env_filter).with_target(false).init();

    let device_id = env::var("SIMULATED_DEVICE_ID")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(1);
    let interval_secs = env::var("SIM_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(600);

    info!(device_id, interval_secs, "starting simulator");

    let channel = ChannelHandle::new();
    let publisher = MeasurementPublisher::new(channel.clone());
    tokio::spawn(supervise(
        FabricConfig::from_env(),
        channel,
        Arc::new(SimulatorRole),
    ));

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    loop {
        ticker.tick().await;
        let measurement = generate_measurement(device_id, Utc::now());
        publisher.publish(&measurement).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn night_readings_stay_low() {
        let night = Utc.with_ymd_and_hms(2024, 3, 7, 3, 0, 0).unwrap();
        for _ in 0..100 {
            let m = generate_measurement(1, night);
            assert!(m.measurement_value >= 0.05 && m.measurement_value <= 0.15);
        }
    }

    #[test]
    fn evening_readings_peak() {
        let evening = Utc.with_ymd_and_hms(2024, 3, 7, 19, 0, 0).unwrap();
        for _ in 0..100 {
            let m = generate_measurement(1, evening);
            assert!(m.measurement_value >= 0.5 && m.measurement_value <= 1.3);
        }
    }

    #[test]
    fn values_are_rounded_to_three_decimals() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap();
        let m = generate_measurement(1, now);
        let scaled = m.measurement_value * 1000.0;
        assert!((scaled - scaled.round()).abs() < 1e-9);
    }
}
