//! Scripted collaborators for tests and demos.
//!
//! Real sessions run against platform sensors; these implementations run
//! against scripts and shared inspectable state instead. The test suite is
//! built on them, and hosts use them for demo mode, where a presenter
//! drives a whole session without walking thirty steps.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::content::{ChallengeKind, ContentProvider};
use crate::error::{AudioError, ContentError, SensorError};
use crate::profile::SoundProfile;
use crate::sensors::{
    AudioSink, MotionSignalSource, SpeechSynthesizer, StepCounter, VibrationMotor,
};

// ── Step counter ─────────────────────────────────────────────────────

/// Step counter with a scripted availability result and baseline window.
pub struct ScriptedStepCounter {
    result: Result<(), SensorError>,
    window_steps: u32,
}

impl ScriptedStepCounter {
    pub fn available() -> Self {
        Self {
            result: Ok(()),
            window_steps: 0,
        }
    }

    pub fn unavailable(error: SensorError) -> Self {
        Self {
            result: Err(error),
            window_steps: 0,
        }
    }

    /// Steps reported for the historical baseline window.
    pub fn with_window_steps(mut self, steps: u32) -> Self {
        self.window_steps = steps;
        self
    }
}

impl StepCounter for ScriptedStepCounter {
    fn probe(&self) -> Result<(), SensorError> {
        self.result
    }

    fn steps_in_window(&self, _window_secs: u64) -> Result<u32, SensorError> {
        self.result.map(|()| self.window_steps)
    }
}

// ── Motion source ────────────────────────────────────────────────────

/// Motion source with a scripted availability result. Samples themselves
/// are pushed by the test as [`SensorSignal::Motion`] values.
///
/// [`SensorSignal::Motion`]: crate::sensors::SensorSignal::Motion
pub struct ScriptedMotionSource {
    result: Result<(), SensorError>,
    interval_ms: u64,
}

impl ScriptedMotionSource {
    pub fn available() -> Self {
        Self {
            result: Ok(()),
            interval_ms: 300,
        }
    }

    pub fn unavailable(error: SensorError) -> Self {
        Self {
            result: Err(error),
            interval_ms: 300,
        }
    }
}

impl MotionSignalSource for ScriptedMotionSource {
    fn probe(&self) -> Result<(), SensorError> {
        self.result
    }

    fn sample_interval_ms(&self) -> u64 {
        self.interval_ms
    }
}

// ── Audio sink ───────────────────────────────────────────────────────

/// Inspectable audio-channel state.
#[derive(Debug, Default)]
pub struct AudioState {
    pub playing: bool,
    pub volume: f32,
    pub profile: Option<SoundProfile>,
}

pub type AudioHandle = Arc<Mutex<AudioState>>;

/// Audio sink recording into shared state.
pub struct ScriptedAudioSink {
    state: AudioHandle,
    fail_load: bool,
}

impl ScriptedAudioSink {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(AudioState::default())),
            fail_load: false,
        }
    }

    /// Sink whose bed always fails to load (degraded-signal path).
    pub fn failing() -> Self {
        Self {
            state: Arc::new(Mutex::new(AudioState::default())),
            fail_load: true,
        }
    }

    pub fn handle(&self) -> AudioHandle {
        Arc::clone(&self.state)
    }
}

impl Default for ScriptedAudioSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSink for ScriptedAudioSink {
    fn play_loop(&mut self, profile: SoundProfile, volume: f32) -> Result<(), AudioError> {
        if self.fail_load {
            return Err(AudioError::LoadFailed {
                profile: profile.bed_name().to_string(),
                message: "scripted load failure".to_string(),
            });
        }
        let mut state = self.state.lock().expect("audio state lock");
        state.playing = true;
        state.volume = volume;
        state.profile = Some(profile);
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.lock().expect("audio state lock").volume = volume;
    }

    fn stop(&mut self) {
        let mut state = self.state.lock().expect("audio state lock");
        state.playing = false;
        state.profile = None;
    }
}

// ── Vibration motor ──────────────────────────────────────────────────

/// Inspectable vibration state.
#[derive(Debug, Default)]
pub struct VibrationState {
    pub repeating: bool,
    pub last_pattern: Vec<u64>,
    pub feedback_count: u32,
}

pub type VibrationHandle = Arc<Mutex<VibrationState>>;

/// Vibration motor recording into shared state.
pub struct ScriptedVibrationMotor {
    state: VibrationHandle,
}

impl ScriptedVibrationMotor {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(VibrationState::default())),
        }
    }

    pub fn handle(&self) -> VibrationHandle {
        Arc::clone(&self.state)
    }
}

impl Default for ScriptedVibrationMotor {
    fn default() -> Self {
        Self::new()
    }
}

impl VibrationMotor for ScriptedVibrationMotor {
    fn vibrate(&mut self, pattern: &[u64], repeat: bool) {
        let mut state = self.state.lock().expect("vibration state lock");
        state.repeating = repeat;
        state.last_pattern = pattern.to_vec();
    }

    fn feedback(&mut self, _duration_ms: u64) {
        self.state.lock().expect("vibration state lock").feedback_count += 1;
    }

    fn cancel(&mut self) {
        self.state.lock().expect("vibration state lock").repeating = false;
    }
}

// ── Speech synthesizer ───────────────────────────────────────────────

/// Inspectable speech state. Utterances finish instantly unless a test
/// pins `speaking` to simulate a long one.
#[derive(Debug, Default)]
pub struct SpeechState {
    pub spoken: Vec<String>,
    pub speaking: bool,
}

pub type SpeechHandle = Arc<Mutex<SpeechState>>;

/// Speech synthesizer recording into shared state.
pub struct ScriptedSpeech {
    state: SpeechHandle,
}

impl ScriptedSpeech {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(SpeechState::default())),
        }
    }

    pub fn handle(&self) -> SpeechHandle {
        Arc::clone(&self.state)
    }
}

impl Default for ScriptedSpeech {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechSynthesizer for ScriptedSpeech {
    fn speak(&mut self, text: &str) {
        self.state
            .lock()
            .expect("speech state lock")
            .spoken
            .push(text.to_string());
    }

    fn is_speaking(&self) -> bool {
        self.state.lock().expect("speech state lock").speaking
    }

    fn stop(&mut self) {
        self.state.lock().expect("speech state lock").speaking = false;
    }
}

// ── Content provider ─────────────────────────────────────────────────

/// Content provider serving a fixed script of responses, in order. An
/// exhausted script reports a transport failure, which the content source
/// recovers from locally.
pub struct ScriptedContentProvider {
    responses: VecDeque<Result<Value, ContentError>>,
}

impl ScriptedContentProvider {
    pub fn new(responses: Vec<Result<Value, ContentError>>) -> Self {
        Self {
            responses: responses.into(),
        }
    }
}

impl ContentProvider for ScriptedContentProvider {
    fn generate(&mut self, _kind: ChallengeKind) -> Result<Value, ContentError> {
        self.responses
            .pop_front()
            .unwrap_or_else(|| Err(ContentError::Http("script exhausted".to_string())))
    }
}
