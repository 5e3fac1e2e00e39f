// Animation Clock - Frame counter and phase state machine
// Phases advance only with the frame count; restart is the one external transition

use serde::{Deserialize, Serialize};

use crate::config::AnimationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Meteor approaching the impact point
    #[default]
    Flight,
    /// Impact tick: explosion burst, left within the same tick
    Exploding,
    Expanding,
    CraterForming,
    /// Rings at full size, restart control shown
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnimationState {
    pub frame: u32,
    pub phase: Phase,
}

impl AnimationState {
    pub fn exploded(&self) -> bool {
        self.phase >= Phase::Exploding
    }

    pub fn crater_formed(&self) -> bool {
        self.phase >= Phase::CraterForming
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }
}

/// One-shot transitions that fired on the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickEvents {
    pub exploded: bool,
    pub crater_started: bool,
    pub completed: bool,
}

#[derive(Debug, Clone)]
pub struct AnimationClock {
    state: AnimationState,
    travel_frames: u32,
    expansion_frames: u32,
    crater_frame: u32, // absolute frame
    crater_formation_frames: u32,
}

impl AnimationClock {
    pub fn new(config: &AnimationConfig) -> Self {
        Self {
            state: AnimationState::default(),
            travel_frames: config.travel_frames,
            expansion_frames: config.expansion_frames,
            crater_frame: config.travel_frames + config.crater_start_frames,
            crater_formation_frames: config.crater_formation_frames,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn frame(&self) -> u32 {
        self.state.frame
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn in_flight(&self) -> bool {
        self.state.frame < self.travel_frames
    }

    /// Meteor progress along its path, 0..=1
    pub fn flight_progress(&self) -> f64 {
        (self.state.frame as f64 / self.travel_frames as f64).min(1.0)
    }

    /// Raw (un-eased) ring expansion, 0..=1
    pub fn expansion(&self) -> f64 {
        if self.in_flight() {
            return 0.0;
        }
        let elapsed = (self.state.frame - self.travel_frames) as f64;
        (elapsed / self.expansion_frames as f64).min(1.0)
    }

    /// Linear crater growth, 0 before the crater frame
    pub fn crater_progress(&self) -> f64 {
        let elapsed = self.state.frame as f64 - self.crater_frame as f64;
        (elapsed / self.crater_formation_frames as f64).clamp(0.0, 1.0)
    }

    /// Step to the next frame and apply the transitions that frame triggers,
    /// so the published state always agrees with its frame number. Each
    /// transition fires at most once per run.
    pub fn advance(&mut self) -> TickEvents {
        self.state.frame = self.state.frame.saturating_add(1);
        self.enter_frame()
    }

    fn enter_frame(&mut self) -> TickEvents {
        let mut events = TickEvents::default();
        if self.in_flight() {
            return events;
        }

        if self.state.phase == Phase::Flight {
            self.transition(Phase::Exploding);
            events.exploded = true;
            self.transition(Phase::Expanding);
        }

        // With the default timing the crater frame is also the first frame
        // with full expansion, so CraterForming only lasts within that step
        if self.state.frame >= self.crater_frame && self.state.phase < Phase::CraterForming {
            self.transition(Phase::CraterForming);
            events.crater_started = true;
        }

        if self.expansion() >= 1.0 && self.state.phase != Phase::Complete {
            self.transition(Phase::Complete);
            events.completed = true;
        }

        events
    }

    pub fn reset(&mut self) {
        self.state = AnimationState::default();
    }

    fn transition(&mut self, next: Phase) {
        tracing::debug!(frame = self.state.frame, from = ?self.state.phase, to = ?next, "phase transition");
        self.state.phase = next;
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn run(clock: &mut AnimationClock, ticks: u32) -> Vec<TickEvents> {
        (0..ticks).map(|_| clock.advance()).collect()
    }

    #[test]
    fn test_flight_before_travel_frames() {
        let mut clock = AnimationClock::new(&AnimationConfig::default());
        assert_eq!(clock.phase(), Phase::Flight);
        let events = run(&mut clock, 89);
        assert!(events.iter().all(|e| *e == TickEvents::default()));
        assert_eq!(clock.frame(), 89);
        assert_eq!(clock.phase(), Phase::Flight);
        assert!(clock.in_flight());
    }

    #[test]
    fn test_leaves_flight_after_exactly_travel_ticks() {
        let mut clock = AnimationClock::new(&AnimationConfig::default());
        let events = run(&mut clock, 90);
        assert_eq!(clock.frame(), 90);
        assert_eq!(clock.phase(), Phase::Expanding);
        assert!(events[89].exploded);
        assert!((clock.flight_progress() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_explodes_exactly_once() {
        let mut clock = AnimationClock::new(&AnimationConfig::default());
        let events = run(&mut clock, 150);
        let explosions: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.exploded)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(explosions, vec![89]);
        assert_eq!(clock.phase(), Phase::Expanding);
        assert!(clock.state().exploded());
        assert!(!clock.state().crater_formed());
    }

    #[test]
    fn test_published_frame_never_flight_after_travel() {
        let mut clock = AnimationClock::new(&AnimationConfig::default());
        for _ in 0..300 {
            clock.advance();
            let state = clock.state();
            assert_eq!(state.phase == Phase::Flight, state.frame < 90, "{:?}", state);
        }
    }

    #[test]
    fn test_expansion_fraction() {
        let mut clock = AnimationClock::new(&AnimationConfig::default());
        run(&mut clock, 135);
        assert!((clock.expansion() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_crater_then_complete() {
        let mut clock = AnimationClock::new(&AnimationConfig::default());
        let events = run(&mut clock, 400);

        let crater: Vec<usize> = (0..events.len()).filter(|&i| events[i].crater_started).collect();
        let complete: Vec<usize> = (0..events.len()).filter(|&i| events[i].completed).collect();
        // Tick 180 moves to frame 180
        assert_eq!(crater, vec![179]);
        assert_eq!(complete, vec![179]);
        assert_eq!(clock.phase(), Phase::Complete);
        assert!(clock.state().crater_formed());
        assert_eq!(clock.crater_progress(), 1.0);
    }

    #[test]
    fn test_default_timing_crater_starts_on_completion_step() {
        let mut clock = AnimationClock::new(&AnimationConfig::default());
        run(&mut clock, 179);
        assert_eq!(clock.phase(), Phase::Expanding);
        assert!(!clock.state().crater_formed());

        // CraterForming is entered and left within the step to frame 180
        let events = clock.advance();
        assert!(events.crater_started);
        assert!(events.completed);
        assert_eq!(clock.frame(), 180);
        assert_eq!(clock.phase(), Phase::Complete);
        assert!(clock.state().crater_formed());
        assert_eq!(clock.crater_progress(), 0.0);
    }

    #[test]
    fn test_crater_during_expansion_with_shorter_delay() {
        let config = AnimationConfig {
            crater_start_frames: 30,
            ..AnimationConfig::default()
        };
        let mut clock = AnimationClock::new(&config);
        run(&mut clock, 121);
        assert_eq!(clock.phase(), Phase::CraterForming);
        run(&mut clock, 60);
        assert_eq!(clock.phase(), Phase::Complete);
    }

    #[test]
    fn test_crater_progress_linear() {
        let mut clock = AnimationClock::new(&AnimationConfig::default());
        run(&mut clock, 210);
        assert!((clock.crater_progress() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_reset_restores_flight() {
        let mut clock = AnimationClock::new(&AnimationConfig::default());
        run(&mut clock, 200);
        clock.reset();
        assert_eq!(clock.state(), AnimationState::default());
        assert!(!clock.state().exploded());

        let events = run(&mut clock, 90);
        assert!(events[89].exploded);
        assert_eq!(clock.phase(), Phase::Expanding);
    }
}
