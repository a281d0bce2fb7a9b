use super::{SlotError, TokenSlot};

/// A slot that refuses every operation, used when persistence is disabled.
pub struct NoSlot;

impl NoSlot {
    pub fn new() -> Self {
        NoSlot
    }
}

impl Default for NoSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenSlot for NoSlot {
    fn read(&self) -> Result<Option<String>, SlotError> {
        Err(SlotError::Disabled)
    }

    fn write(&self, _token: &str) -> Result<(), SlotError> {
        Err(SlotError::Disabled)
    }

    fn clear(&self) -> Result<(), SlotError> {
        Err(SlotError::Disabled)
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
