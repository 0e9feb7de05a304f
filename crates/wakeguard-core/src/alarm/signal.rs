//! Alarm signal lifecycle.
//!
//! `AlarmSignalController` is the sole owner of the audio/vibration/speech
//! channel. Everything else in the engine reaches the channel through this
//! controller; nothing drives the collaborators directly.
//!
//! All commands are idempotent: `start` while started, `duck` while not at
//! full level, and `stop` while stopped are guarded no-ops.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::AudioError;
use crate::events::Event;
use crate::profile::SoundProfile;
use crate::sensors::{AudioSink, SpeechSynthesizer, VibrationMotor};

use super::announcer::{AnnouncementContext, Announcer};

/// Repeating alarm vibration: leading delay, then long/short pulses.
pub const ALARM_VIBRATION_PATTERN: [u64; 5] = [0, 900, 500, 900, 500];

/// Audio level while a verification task is active. Low enough not to
/// drown the task, high enough to signal the alarm is not dismissed.
pub const DUCK_LEVEL: f32 = 0.2;

/// One-shot wrong-answer shake.
const FEEDBACK_MS: u64 = 100;

/// Current level of the alarm signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalPhase {
    /// Nothing audible, nothing vibrating.
    Stopped,
    /// Full audio, vibration pattern, speech cadence.
    Full,
    /// Audio loop at reduced volume; vibration and speech silenced.
    Ducked,
}

/// Owner of the audible/haptic/spoken alarm signal.
pub struct AlarmSignalController {
    audio: Box<dyn AudioSink>,
    vibration: Box<dyn VibrationMotor>,
    speech: Box<dyn SpeechSynthesizer>,
    announcer: Announcer,
    phase: SignalPhase,
    audio_degraded: bool,
}

impl AlarmSignalController {
    pub fn new(
        audio: Box<dyn AudioSink>,
        vibration: Box<dyn VibrationMotor>,
        speech: Box<dyn SpeechSynthesizer>,
        ctx: AnnouncementContext,
    ) -> Self {
        Self {
            audio,
            vibration,
            speech,
            announcer: Announcer::new(ctx),
            phase: SignalPhase::Stopped,
            audio_degraded: false,
        }
    }

    pub fn phase(&self) -> SignalPhase {
        self.phase
    }

    /// Whether the audio bed failed and the signal runs on vibration +
    /// speech alone.
    pub fn is_audio_degraded(&self) -> bool {
        self.audio_degraded
    }

    /// Start the full signal. No-op if already started.
    pub fn start(&mut self, profile: SoundProfile, now_ms: u64) -> Vec<Event> {
        if self.phase != SignalPhase::Stopped {
            return Vec::new();
        }
        let mut out = Vec::new();

        if let Err(AudioError::LoadFailed { message, .. }) = self.audio.play_loop(profile, 1.0) {
            // Degrade to vibration + speech; the wake check still runs.
            self.audio_degraded = true;
            out.push(Event::AlarmDegraded {
                message,
                at: Utc::now(),
            });
        }
        self.vibration.vibrate(&ALARM_VIBRATION_PATTERN, true);
        self.announcer.begin(now_ms);
        self.phase = SignalPhase::Full;
        out.push(Event::AlarmStarted {
            profile,
            at: Utc::now(),
        });
        self.pump_announcement(now_ms, &mut out);
        out
    }

    /// Reduce the audio level without stopping the loop; silence vibration
    /// and speech. No-op unless at full level.
    pub fn duck(&mut self, level: f32, _now_ms: u64) -> Vec<Event> {
        if self.phase != SignalPhase::Full {
            return Vec::new();
        }
        self.audio.set_volume(level);
        self.vibration.cancel();
        self.speech.stop();
        self.announcer.pause();
        self.phase = SignalPhase::Ducked;
        vec![Event::AlarmDucked {
            level,
            at: Utc::now(),
        }]
    }

    /// Stop everything and release the audio resource. No-op if stopped.
    pub fn stop(&mut self) -> Vec<Event> {
        if self.phase == SignalPhase::Stopped {
            return Vec::new();
        }
        self.vibration.cancel();
        self.audio.stop();
        self.speech.stop();
        self.announcer.pause();
        self.phase = SignalPhase::Stopped;
        self.audio_degraded = false;
        vec![Event::AlarmStopped { at: Utc::now() }]
    }

    /// One-shot haptic feedback (wrong answer). Allowed in any phase;
    /// independent of the repeating alarm pattern.
    pub fn feedback(&mut self) {
        self.vibration.feedback(FEEDBACK_MS);
    }

    /// Advance the speech cadence.
    pub fn tick_at(&mut self, now_ms: u64) -> Vec<Event> {
        let mut out = Vec::new();
        if self.phase == SignalPhase::Full {
            self.pump_announcement(now_ms, &mut out);
        }
        out
    }

    fn pump_announcement(&mut self, now_ms: u64, out: &mut Vec<Event>) {
        if self.announcer.cadence_due(now_ms) && !self.speech.is_speaking() {
            let text = self.announcer.message().to_string();
            self.speech.speak(&text);
            out.push(Event::AnnouncementSpoken {
                text,
                at: Utc::now(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::SPEECH_INTERVAL_MS;
    use crate::profile::PersonalityProfile;
    use crate::simulation::{ScriptedAudioSink, ScriptedSpeech, ScriptedVibrationMotor};

    fn controller() -> (
        AlarmSignalController,
        crate::simulation::AudioHandle,
        crate::simulation::VibrationHandle,
        crate::simulation::SpeechHandle,
    ) {
        let audio = ScriptedAudioSink::new();
        let vibration = ScriptedVibrationMotor::new();
        let speech = ScriptedSpeech::new();
        let (ah, vh, sh) = (audio.handle(), vibration.handle(), speech.handle());
        let ctx = AnnouncementContext::new("Ada", "the marathon", PersonalityProfile::Motivational);
        (
            AlarmSignalController::new(Box::new(audio), Box::new(vibration), Box::new(speech), ctx),
            ah,
            vh,
            sh,
        )
    }

    #[test]
    fn start_brings_up_audio_vibration_and_speech() {
        let (mut alarm, audio, vibration, speech) = controller();
        let events = alarm.start(SoundProfile::Rock, 0);
        assert_eq!(alarm.phase(), SignalPhase::Full);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::AlarmStarted { .. })));

        let audio = audio.lock().unwrap();
        assert!(audio.playing);
        assert_eq!(audio.volume, 1.0);
        assert_eq!(audio.profile, Some(SoundProfile::Rock));
        assert!(vibration.lock().unwrap().repeating);
        assert_eq!(speech.lock().unwrap().spoken.len(), 1);
    }

    #[test]
    fn start_twice_is_a_no_op() {
        let (mut alarm, _, _, speech) = controller();
        alarm.start(SoundProfile::Energetic, 0);
        let events = alarm.start(SoundProfile::Energetic, 1);
        assert!(events.is_empty());
        assert_eq!(speech.lock().unwrap().spoken.len(), 1);
    }

    #[test]
    fn round_trip_leaves_nothing_active_and_stop_twice_is_a_no_op() {
        let (mut alarm, audio, vibration, speech) = controller();
        alarm.start(SoundProfile::Calm, 0);
        let events = alarm.stop();
        assert_eq!(events.len(), 1);
        assert_eq!(alarm.phase(), SignalPhase::Stopped);
        assert!(!audio.lock().unwrap().playing);
        assert!(!vibration.lock().unwrap().repeating);
        assert!(!speech.lock().unwrap().speaking);

        assert!(alarm.stop().is_empty());
    }

    #[test]
    fn duck_keeps_the_loop_and_silences_the_rest() {
        let (mut alarm, audio, vibration, _) = controller();
        alarm.start(SoundProfile::Calm, 0);
        let events = alarm.duck(DUCK_LEVEL, 10);
        assert_eq!(alarm.phase(), SignalPhase::Ducked);
        assert!(events.iter().any(|e| matches!(
            e,
            Event::AlarmDucked { level, .. } if (*level - DUCK_LEVEL).abs() < f32::EPSILON
        )));

        {
            let audio = audio.lock().unwrap();
            assert!(audio.playing, "duck must not stop the loop");
            assert!((audio.volume - DUCK_LEVEL).abs() < f32::EPSILON);
        }
        assert!(!vibration.lock().unwrap().repeating);

        // Ducked speech cadence is silent.
        assert!(alarm.tick_at(SPEECH_INTERVAL_MS * 2).is_empty());
    }

    #[test]
    fn duck_before_start_is_a_no_op() {
        let (mut alarm, audio, _, _) = controller();
        assert!(alarm.duck(DUCK_LEVEL, 0).is_empty());
        assert!(!audio.lock().unwrap().playing);
    }

    #[test]
    fn announcements_repeat_on_cadence() {
        let (mut alarm, _, _, speech) = controller();
        alarm.start(SoundProfile::Energetic, 0);
        alarm.tick_at(SPEECH_INTERVAL_MS - 1);
        assert_eq!(speech.lock().unwrap().spoken.len(), 1);
        alarm.tick_at(SPEECH_INTERVAL_MS);
        assert_eq!(speech.lock().unwrap().spoken.len(), 2);
    }

    #[test]
    fn busy_synthesizer_skips_the_utterance() {
        let (mut alarm, _, _, speech) = controller();
        alarm.start(SoundProfile::Energetic, 0);
        speech.lock().unwrap().speaking = true;
        let events = alarm.tick_at(SPEECH_INTERVAL_MS);
        assert!(events.is_empty());
        assert_eq!(speech.lock().unwrap().spoken.len(), 1);
    }

    #[test]
    fn audio_failure_degrades_instead_of_failing() {
        let audio = ScriptedAudioSink::failing();
        let vibration = ScriptedVibrationMotor::new();
        let speech = ScriptedSpeech::new();
        let vh = vibration.handle();
        let ctx = AnnouncementContext::new("Ada", "work", PersonalityProfile::Zen);
        let mut alarm =
            AlarmSignalController::new(Box::new(audio), Box::new(vibration), Box::new(speech), ctx);

        let events = alarm.start(SoundProfile::Energetic, 0);
        assert!(alarm.is_audio_degraded());
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::AlarmDegraded { .. })));
        // The rest of the signal still runs.
        assert_eq!(alarm.phase(), SignalPhase::Full);
        assert!(vh.lock().unwrap().repeating);
    }
}
