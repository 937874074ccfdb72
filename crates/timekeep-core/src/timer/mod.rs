mod record;

pub use record::{Priority, TimerDraft, TimerPatch, TimerRecord, MASK};
