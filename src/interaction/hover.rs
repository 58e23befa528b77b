#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoverState {
    #[default]
    Idle,
    Hovering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverTransition {
    Enter,
    Exit,
}

/// Debounces per-event intersection results into enter/exit transitions.
/// Only the latest result is kept.
#[derive(Debug, Default)]
pub struct HoverTracker {
    state: HoverState,
}

impl HoverTracker {
    pub fn state(&self) -> HoverState {
        self.state
    }

    pub fn update(&mut self, hit: bool) -> Option<HoverTransition> {
        match (self.state, hit) {
            (HoverState::Idle, true) => {
                self.state = HoverState::Hovering;
                Some(HoverTransition::Enter)
            }
            (HoverState::Hovering, false) => {
                self.state = HoverState::Idle;
                Some(HoverTransition::Exit)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn starts_idle() {
        assert_eq!(HoverTracker::default().state(), HoverState::Idle);
    }

    #[test]
    fn repeated_results_do_not_retrigger() {
        let mut tracker = HoverTracker::default();

        assert_eq!(tracker.update(false), None);
        assert_eq!(tracker.update(true), Some(HoverTransition::Enter));
        assert_eq!(tracker.update(true), None);
        assert_eq!(tracker.state(), HoverState::Hovering);
        assert_eq!(tracker.update(false), Some(HoverTransition::Exit));
        assert_eq!(tracker.update(false), None);
        assert_eq!(tracker.state(), HoverState::Idle);
    }

    #[test]
    fn transitions_strictly_alternate() {
        let mut tracker = HoverTracker::default();
        let mut rng = StdRng::seed_from_u64(7);
        let mut last = None;

        for _ in 0..1000 {
            if let Some(transition) = tracker.update(rng.gen_bool(0.5)) {
                match last {
                    None => assert_eq!(transition, HoverTransition::Enter),
                    Some(previous) => assert_ne!(transition, previous),
                }
                last = Some(transition);
            }
        }

        assert!(last.is_some());
    }
}
