//! # Wakeguard Core Library
//!
//! This library provides the wake-verification engine for the Wakeguard
//! alarm: the user must prove sustained wakefulness through repeated,
//! escalating challenges before the alarm signal is released. Hosts (mobile
//! shells, demo harnesses) are thin layers over this crate -- they own the
//! screens and the real sensors, the engine owns every decision.
//!
//! ## Architecture
//!
//! - **Round Controller**: A caller-driven state machine across three
//!   wake/verify rounds; hosts invoke `tick()` periodically and push sensor
//!   readings in
//! - **Alarm Signal**: Sole owner of the audio/vibration/speech channel,
//!   with idempotent start/duck/stop and a spoken-announcement cadence
//! - **Strategies**: Pluggable proofs of wakefulness (steps, hand-wave,
//!   mental challenges) with graceful fallback when sensing fails
//! - **Content**: Remote challenge generation with strict validation and an
//!   offline curated fallback; callers never see a failure
//!
//! ## Key Components
//!
//! - [`RoundController`]: Session orchestrator
//! - [`AlarmSignalController`]: Alarm signal lifecycle
//! - [`ChallengeContentSource`]: Challenge supply with anti-repetition
//! - [`WakeTrigger`]: The durable session parameter bundle

pub mod alarm;
pub mod content;
pub mod error;
pub mod events;
pub mod profile;
pub mod sensors;
pub mod session;
pub mod simulation;
pub mod strategy;
pub mod trigger;

pub use alarm::{AlarmSignalController, AnnouncementContext, SignalPhase};
pub use content::{ChallengeContentSource, ChallengeItem, ChallengeKind, RemoteContentClient};
pub use error::{AudioError, ContentError, CoreError, SensorError};
pub use events::Event;
pub use profile::{PersonalityProfile, SoundProfile, VerificationMethod};
pub use sensors::SensorSignal;
pub use session::{RoundController, RoundState, WakeSession, TARGET_ROUNDS};
pub use strategy::{StrategyProgress, VerificationStrategy};
pub use trigger::{DemoOverrides, ScheduledWake, WakeScheduler, WakeTrigger};
