//! Publisher port — everything the bridge tells the outside world.
//!
//! The MQTT adapter is the real implementation; a disabled stand-in exists
//! for configurations without a broker. Publish failures are reported but
//! must never block or fail the caller's own work.

use std::future::Future;

use meticulous_domain::error::BridgeError;
use meticulous_domain::profile::ProfileCatalog;
use meticulous_domain::value::SensorValue;

use crate::health::HealthReport;
use crate::ports::machine::DeviceIdentity;

/// Outbound publication port.
pub trait StatePublisher: Send + Sync {
    /// Publish a flat key → value payload. Keys without a known sensor
    /// mapping are silently dropped.
    fn publish_states(
        &self,
        states: &[(String, SensorValue)],
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Publish `online`/`offline` to the retained availability topic.
    fn publish_availability(
        &self,
        online: bool,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Publish (or republish) every discovery config. Idempotent; called
    /// again whenever the profile catalog changes.
    fn publish_discovery(
        &self,
        device: &DeviceIdentity,
        profiles: &ProfileCatalog,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Forward a machine notification for the dashboard to surface.
    fn publish_notification(
        &self,
        title: &str,
        message: &str,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;

    /// Publish the periodic health metrics document.
    fn publish_health(
        &self,
        report: &HealthReport,
    ) -> impl Future<Output = Result<(), BridgeError>> + Send;
}
