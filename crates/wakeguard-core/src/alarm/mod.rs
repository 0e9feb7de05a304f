mod announcer;
mod signal;

pub use announcer::{AnnouncementContext, Announcer, SPEECH_INTERVAL_MS};
pub use signal::{AlarmSignalController, SignalPhase, ALARM_VIBRATION_PATTERN, DUCK_LEVEL};
