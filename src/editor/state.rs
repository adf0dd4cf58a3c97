/// Lifecycle of one panel editor.
///
/// ```text
/// Uninitialized ──initialize──► Ready ──dispose──► Disposed
/// ```
///
/// There is no way back to `Uninitialized`; a new panel needs a new editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorLifecycle {
    #[default]
    Uninitialized,
    Ready,
    Disposed,
}

impl EditorLifecycle {
    /// Validates whether a transition to the new state is allowed
    pub fn can_transition_to(self, next: EditorLifecycle) -> bool {
        matches!(
            (self, next),
            (EditorLifecycle::Uninitialized, EditorLifecycle::Ready)
                | (EditorLifecycle::Uninitialized, EditorLifecycle::Disposed)
                | (EditorLifecycle::Ready, EditorLifecycle::Disposed)
        )
    }

    pub fn is_ready(self) -> bool {
        self == EditorLifecycle::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::EditorLifecycle::*;

    #[test]
    fn test_transitions() {
        assert!(Uninitialized.can_transition_to(Ready));
        assert!(Ready.can_transition_to(Disposed));
        assert!(Uninitialized.can_transition_to(Disposed));
        assert!(!Ready.can_transition_to(Uninitialized));
        assert!(!Disposed.can_transition_to(Ready));
        assert!(!Ready.can_transition_to(Ready));
    }
}
