pub mod base;
pub mod file_slot;
pub mod memory_slot;
pub mod no_slot;

// Re-export the primary slot items so code outside can do
// "use crate::storage::{TokenSlot, create_slot};"
pub use base::{create_slot, SlotError, TokenSlot};
pub use file_slot::FileSlot;
pub use memory_slot::MemorySlot;
pub use no_slot::NoSlot;
