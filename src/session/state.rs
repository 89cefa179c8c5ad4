use std::sync::atomic::{AtomicU8, Ordering};

/// Recording session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    Idle = 0,
    Recording = 1,
    Draining = 2,
    Finalizing = 3,
    Complete = 4,
}

/// Lock-free session state shared between the controller and the worker
/// loop. The worker reads it every tick, so it must never block.
#[derive(Debug, Default)]
pub struct StateCell(AtomicU8);

impl StateCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(SessionState::Idle as u8))
    }

    pub fn get(&self) -> SessionState {
        match self.0.load(Ordering::SeqCst) {
            0 => SessionState::Idle,
            1 => SessionState::Recording,
            2 => SessionState::Draining,
            3 => SessionState::Finalizing,
            _ => SessionState::Complete,
        }
    }

    pub fn set(&self, state: SessionState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }

    /// Transition only when the current state matches `from`.
    pub fn transition(&self, from: SessionState, to: SessionState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_and_transitions_in_order() {
        let cell = StateCell::new();
        assert_eq!(cell.get(), SessionState::Idle);
        assert!(cell.transition(SessionState::Idle, SessionState::Recording));
        assert!(!cell.transition(SessionState::Idle, SessionState::Recording));
        assert!(cell.transition(SessionState::Recording, SessionState::Draining));
        cell.set(SessionState::Complete);
        assert_eq!(cell.get(), SessionState::Complete);
    }
}
