/// Which controller session was last turned into a verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub last_processed_session: i64,
    pub max_session: i64,
}

impl SessionState {
    pub fn new(last_processed_session: i64, max_session: i64) -> Self {
        Self {
            last_processed_session,
            max_session,
        }
    }

    /// A session is new when it differs from the last processed one.
    pub fn should_process(&self, current_session: i64) -> bool {
        current_session != self.last_processed_session
    }

    /// State after `current_session` was processed; the maximum wraps to 0.
    pub fn advance(&self, current_session: i64) -> SessionState {
        let last = if current_session == self.max_session {
            0
        } else {
            current_session
        };
        SessionState {
            last_processed_session: last,
            max_session: self.max_session,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_session_is_not_processed_again() {
        let s = SessionState::new(2, 5);
        assert!(!s.should_process(2));
        assert!(s.should_process(3));
    }

    #[test]
    fn advance_records_session() {
        let s = SessionState::new(2, 5).advance(3);
        assert_eq!(s, SessionState::new(3, 5));
        assert!(!s.should_process(3));
    }

    #[test]
    fn advance_at_max_wraps_to_zero_from_any_state() {
        for last in [0, 2, 4, 5] {
            let s = SessionState::new(last, 5).advance(5);
            assert_eq!(s.last_processed_session, 0);
            assert_eq!(s.max_session, 5);
        }
    }

    #[test]
    fn full_counter_cycle() {
        let mut s = SessionState::new(0, 3);
        let mut processed = Vec::new();
        for current in [1, 1, 2, 3, 3, 1, 2] {
            if s.should_process(current) {
                processed.push(current);
                s = s.advance(current);
            }
        }
        // 3 wraps the state to 0, so the repeated 3 is seen as new once more
        assert_eq!(processed, vec![1, 2, 3, 3, 1, 2]);
    }
}
