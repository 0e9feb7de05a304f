mod controller;

pub use controller::{RoundController, RoundState, WakeSession, TARGET_ROUNDS};
