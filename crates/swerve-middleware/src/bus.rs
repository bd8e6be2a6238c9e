//! Headless, topic-based publish/subscribe event bus.
//!
//! Uses [`tokio::sync::broadcast`] channels under the hood so that every
//! subscriber receives every message without any single subscriber blocking
//! the publisher.  The control loop publishes and moves on; a slow dashboard
//! lags and drops, it never stalls a cycle.
//!
//! # Topics
//!
//! | Topic | Typical traffic |
//! |---|---|
//! | [`Topic::Telemetry`] | Per-cycle module states, fused pose, heading |
//! | [`Topic::SystemAlerts`] | Operator-facing faults (autonomy disabled, shutdown) |
//! | [`Topic::DriveCommands`] | Chassis commands issued by the autonomy bridge |

use swerve_types::Event;
use tokio::sync::broadcast;
use tracing::{trace, warn};

/// Default channel capacity (number of buffered events before old ones are
/// dropped for slow subscribers).
const DEFAULT_CAPACITY: usize = 256;

/// Routing lanes on the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// High-frequency drive state published every control cycle.
    Telemetry,
    /// Faults and warnings that an operator should see.
    SystemAlerts,
    /// Chassis commands issued by autonomy routines.
    DriveCommands,
}

/// Shared event bus. Clone it cheaply – all clones share the same underlying
/// broadcast channels.
#[derive(Clone, Debug)]
pub struct EventBus {
    telemetry: broadcast::Sender<Event>,
    system_alerts: broadcast::Sender<Event>,
    drive_commands: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new bus with the given channel capacity.
    ///
    /// The `capacity` is applied to every topic channel independently and
    /// must be non-zero.
    pub fn new(capacity: usize) -> Self {
        let (telemetry, _) = broadcast::channel(capacity);
        let (system_alerts, _) = broadcast::channel(capacity);
        let (drive_commands, _) = broadcast::channel(capacity);
        Self {
            telemetry,
            system_alerts,
            drive_commands,
        }
    }

    /// Publish `event` to the given [`Topic`] channel.
    ///
    /// Returns the number of active receivers that were handed the event,
    /// `0` when nobody is listening on the topic.  Publishing never fails:
    /// a robot with no dashboard attached is a normal condition.
    pub fn publish_to(&self, topic: Topic, event: Event) -> usize {
        match self.topic_sender(topic).send(event) {
            Ok(n) => n,
            Err(broadcast::error::SendError(_)) => {
                trace!(?topic, "published with no subscribers");
                0
            }
        }
    }

    /// Subscribe to a specific [`Topic`] channel.
    pub fn subscribe_to(&self, topic: Topic) -> TopicReceiver {
        TopicReceiver {
            topic,
            receiver: self.topic_sender(topic).subscribe(),
        }
    }

    /// Number of live subscribers on `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.topic_sender(topic).receiver_count()
    }

    fn topic_sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Telemetry => &self.telemetry,
            Topic::SystemAlerts => &self.system_alerts,
            Topic::DriveCommands => &self.drive_commands,
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Topic-based receiver
// ---------------------------------------------------------------------------

/// An async receiver bound to a single [`Topic`] channel.
///
/// Obtained via [`EventBus::subscribe_to`].
pub struct TopicReceiver {
    topic: Topic,
    receiver: broadcast::Receiver<Event>,
}

impl TopicReceiver {
    /// Wait for the next event on this topic.
    ///
    /// Returns:
    /// * `Ok(event)` – a successfully received event.
    /// * `Err(broadcast::error::RecvError::Lagged(n))` – the subscriber fell
    ///   behind and `n` messages were dropped.
    /// * `Err(broadcast::error::RecvError::Closed)` – the bus has shut down.
    pub async fn recv(&mut self) -> Result<Event, broadcast::error::RecvError> {
        self.receiver.recv().await
    }

    /// Like [`TopicReceiver::recv`], but skips over lag and returns `None`
    /// once the bus has shut down.
    pub async fn next(&mut self) -> Option<Event> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(topic = ?self.topic, lagged_by = n, "subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking poll; `None` when nothing is queued.
    pub fn try_next(&mut self) -> Option<Event> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!(topic = ?self.topic, lagged_by = n, "subscriber lagged");
                }
                Err(_) => return None,
            }
        }
    }

    /// The [`Topic`] this receiver is bound to.
    pub fn topic(&self) -> Topic {
        self.topic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swerve_types::{DriveTelemetry, EventPayload, Pose2d, SwerveModuleState};

    fn make_event(source: &str) -> Event {
        Event::new(
            source,
            EventPayload::Telemetry(DriveTelemetry {
                module_states: [SwerveModuleState::default(); 4],
                pose: Pose2d::origin(),
                pose_array: [0.0; 3],
                heading_rad: 0.0,
            }),
        )
    }

    #[test]
    fn publish_without_subscribers_is_not_an_error() {
        let bus = EventBus::default();
        assert_eq!(bus.publish_to(Topic::Telemetry, make_event("drive")), 0);
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() -> Result<(), Box<dyn std::error::Error>> {
        let bus = EventBus::default();
        let mut subscriber1 = bus.subscribe_to(Topic::Telemetry);
        let mut subscriber2 = bus.subscribe_to(Topic::Telemetry);
        assert_eq!(bus.subscriber_count(Topic::Telemetry), 2);

        let event = make_event("drive");
        assert_eq!(bus.publish_to(Topic::Telemetry, event.clone()), 2);

        assert_eq!(subscriber1.recv().await?.id, event.id);
        assert_eq!(subscriber2.recv().await?.id, event.id);
        Ok(())
    }

    /// A subscriber on `SystemAlerts` must not receive events published to
    /// `Telemetry` because they are routed through separate channels.
    #[tokio::test]
    async fn topics_are_isolated() -> Result<(), Box<dyn std::error::Error>> {
        let bus = EventBus::default();
        let mut alerts = bus.subscribe_to(Topic::SystemAlerts);
        let _telemetry = bus.subscribe_to(Topic::Telemetry);

        assert_eq!(bus.publish_to(Topic::Telemetry, make_event("drive")), 1);

        let result =
            tokio::time::timeout(std::time::Duration::from_millis(50), alerts.recv()).await;
        assert!(result.is_err(), "SystemAlerts subscriber must not see telemetry");
        assert_eq!(alerts.topic(), Topic::SystemAlerts);
        Ok(())
    }

    /// Flooding a low-capacity channel while a subscriber sleeps must produce
    /// a `Lagged` error rather than panicking or blocking the publisher.
    #[tokio::test]
    async fn slow_subscriber_lags() {
        let bus = EventBus::new(64);
        let mut slow = bus.subscribe_to(Topic::Telemetry);

        for _ in 0..1_000 {
            bus.publish_to(Topic::Telemetry, make_event("flood"));
        }

        let result = slow.recv().await;
        assert!(
            matches!(result, Err(broadcast::error::RecvError::Lagged(_))),
            "expected Lagged error, got: {result:?}"
        );
    }

    #[tokio::test]
    async fn next_skips_lag_and_keeps_reading() {
        let bus = EventBus::new(4);
        let mut slow = bus.subscribe_to(Topic::Telemetry);
        for i in 0..10 {
            bus.publish_to(Topic::Telemetry, make_event(&format!("cycle-{i}")));
        }
        let event = slow.next().await.expect("bus still open");
        assert_eq!(event.source, "cycle-6");
    }

    #[test]
    fn try_next_is_empty_until_published() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe_to(Topic::DriveCommands);
        assert!(rx.try_next().is_none());
        assert_eq!(bus.publish_to(Topic::DriveCommands, make_event("auto")), 1);
        assert_eq!(rx.try_next().map(|e| e.source), Some("auto".to_string()));
    }

    #[tokio::test]
    async fn next_returns_none_once_bus_is_dropped() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe_to(Topic::SystemAlerts);
        drop(bus);
        assert!(rx.next().await.is_none());
    }
}
