//! `swerve-middleware` – the robot's nervous system.
//!
//! Routes asynchronous data between the drive loop, autonomy routines and
//! whatever is listening (dashboards, loggers, the CLI) without caring about
//! the data's meaning.
//!
//! # Modules
//!
//! - [`bus`] – headless, topic-based publish/subscribe event bus built on
//!   Tokio broadcast channels.

pub mod bus;

pub use bus::{EventBus, Topic, TopicReceiver};
