//! The taint flag.

use serde::{Deserialize, Serialize};

/// Contamination flag carried on every data message.
///
/// Taint only ever goes from clean to tainted: there is no way to clear it
/// once set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Taint(bool);

impl Taint {
    /// A clean flag.
    pub const CLEAN: Self = Taint(false);

    /// A tainted flag.
    pub const TAINTED: Self = Taint(true);

    /// Whether the flag is set.
    pub fn is_tainted(self) -> bool {
        self.0
    }

    /// Merge incoming taint. Returns true if this call flipped the flag.
    pub fn absorb(&mut self, incoming: bool) -> bool {
        if incoming && !self.0 {
            self.0 = true;
            true
        } else {
            false
        }
    }
}
