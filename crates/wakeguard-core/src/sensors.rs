//! Device collaborator capabilities.
//!
//! The engine never talks to hardware. Hosts implement these traits over
//! whatever the platform provides (pedometer, camera, TTS, haptics, media
//! player) and push readings into the session through [`SensorSignal`].
//! Scripted implementations for tests and demos live in
//! [`crate::simulation`].

use serde::{Deserialize, Serialize};

use crate::error::{AudioError, SensorError};
use crate::profile::SoundProfile;

/// A reading pushed into the engine by the host platform layer.
///
/// Signals are routed to the active strategy only while the session is
/// verifying; anything delivered outside that window is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SensorSignal {
    /// Cumulative step-count reading from the live step stream.
    Steps { raw: u32 },
    /// One periodic motion-detection sample. `detected` is the binary
    /// "motion occurred since the previous sample" signal.
    Motion { detected: bool },
    /// Answer text submitted for the current mental challenge.
    Answer { text: String },
    /// Manual "I'm up" confirmation tap on the fallback path.
    ManualConfirm,
}

/// Step-count sensor.
///
/// Live readings arrive as [`SensorSignal::Steps`] pushes; this trait covers
/// the synchronous parts: the availability probe and the short historical
/// window used to baseline a round.
pub trait StepCounter: Send + Sync {
    /// Check that step counting can start. Errors map to the fallback path.
    fn probe(&self) -> Result<(), SensorError>;

    /// Steps recorded in the trailing `window_secs` seconds. Used to
    /// establish the session baseline so steps taken before the task began
    /// are not counted. Platforms without historical queries return 0.
    fn steps_in_window(&self, window_secs: u64) -> Result<u32, SensorError>;
}

/// Periodic binary motion signal.
///
/// The concrete sensing technique (frame-compression delta, optical flow,
/// anything else) stays behind this interface; the engine only sees the
/// cadence and the per-sample boolean pushed via [`SensorSignal::Motion`].
pub trait MotionSignalSource: Send + Sync {
    /// Check that motion sampling can start.
    fn probe(&self) -> Result<(), SensorError>;

    /// Interval between samples in milliseconds.
    fn sample_interval_ms(&self) -> u64 {
        300
    }
}

/// Speech synthesis collaborator.
pub trait SpeechSynthesizer: Send {
    fn speak(&mut self, text: &str);

    /// Whether an utterance is currently in flight. The announcement cadence
    /// checks this before speaking so utterances never overlap.
    fn is_speaking(&self) -> bool;

    fn stop(&mut self);
}

/// Haptic vibration collaborator.
pub trait VibrationMotor: Send {
    /// Start a vibration pattern (millisecond on/off segments, first entry
    /// is a leading delay). `repeat` loops the pattern until cancelled.
    fn vibrate(&mut self, pattern: &[u64], repeat: bool);

    /// One-shot feedback pulse (wrong-answer shake). Independent of the
    /// alarm pattern and allowed while the signal is ducked.
    fn feedback(&mut self, duration_ms: u64);

    fn cancel(&mut self);
}

/// Looping alarm-audio collaborator.
pub trait AudioSink: Send {
    /// Begin looping the bed for `profile` at `volume` (0.0..=1.0).
    fn play_loop(&mut self, profile: SoundProfile, volume: f32) -> Result<(), AudioError>;

    /// Adjust volume without interrupting the loop.
    fn set_volume(&mut self, volume: f32);

    /// Halt playback and release the underlying resource.
    fn stop(&mut self);
}
