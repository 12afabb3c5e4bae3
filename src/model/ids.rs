//! Identifier generation.
//!
//! One [`IdGenerator`] is owned by each sync run and threaded through every
//! conversion that needs fresh identifiers, so runs never share state.

use uuid::Uuid;

/// Serial ids handed out when nothing larger is known.
pub const DEFAULT_SERIAL_FLOOR: u64 = 1000;

/// Source of fresh identifiers for a single sync run.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    last_serial: u64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::starting_after(DEFAULT_SERIAL_FLOOR)
    }
}

impl IdGenerator {
    /// Generator whose serial ids start right after `floor`.
    #[must_use]
    pub const fn starting_after(floor: u64) -> Self {
        Self { last_serial: floor }
    }

    /// Next decimal serial id (the form Chromium-style stores use).
    pub fn next_serial(&mut self) -> String {
        self.last_serial += 1;
        self.last_serial.to_string()
    }

    /// Fresh UUID in upper-case hyphenated form.
    #[must_use]
    pub fn uuid(&self) -> String {
        Uuid::new_v4().hyphenated().to_string().to_uppercase()
    }

    /// Fresh UUID in lower-case hyphenated form.
    #[must_use]
    pub fn guid(&self) -> String {
        Uuid::new_v4().hyphenated().to_string()
    }

    /// Return `id` unchanged when it is UUID-shaped, otherwise a fresh UUID.
    #[must_use]
    pub fn normalize_uuid(&self, id: &str) -> String {
        if is_uuid(id) {
            id.to_string()
        } else {
            self.uuid()
        }
    }
}

/// Whether `value` is a hyphenated UUID string.
#[must_use]
pub fn is_uuid(value: &str) -> bool {
    value.len() == 36 && Uuid::parse_str(value).is_ok()
}
