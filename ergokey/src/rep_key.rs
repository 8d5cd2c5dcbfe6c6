//! Software key repeat for keys held in typing mode.

use embassy_time::Instant;
use heapless::Vec;

use crate::REP_KEY_MAX_NUM;
use crate::config::RepKeyConfig;
use crate::types::keycode::HidKeyCode;
use crate::types::position::KeyPosition;

/// Repeat timer of a single held key
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RepKeyState {
    pub pos: KeyPosition,
    pub keycode: HidKeyCode,
    pub start_time: Instant,
    pub last_repeat_time: Option<Instant>,
}

impl RepKeyState {
    /// Time of the next repeat
    pub fn deadline(&self, config: &RepKeyConfig) -> Instant {
        match self.last_repeat_time {
            None => self.start_time + config.initial_wait_time,
            Some(last) => last + config.keypress_frequency,
        }
    }
}

pub struct RepKeyEngine {
    config: RepKeyConfig,
    states: Vec<RepKeyState, REP_KEY_MAX_NUM>,
}

impl RepKeyEngine {
    pub fn new(config: RepKeyConfig) -> Self {
        Self {
            config,
            states: Vec::new(),
        }
    }

    /// Start repeating the key at `pos`, a running timer at the same position restarts.
    pub fn start(&mut self, pos: KeyPosition, keycode: HidKeyCode, now: Instant) -> bool {
        self.cancel(pos);
        let state = RepKeyState {
            pos,
            keycode,
            start_time: now,
            last_repeat_time: None,
        };
        if self.states.push(state).is_err() {
            warn!("Rep-Key is full, {:?} won't repeat", pos);
            return false;
        }
        true
    }

    /// Stop repeating the key at `pos`. Returns whether a timer was running.
    pub fn cancel(&mut self, pos: KeyPosition) -> bool {
        let before = self.states.len();
        self.states.retain(|s| s.pos != pos);
        before != self.states.len()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn is_active(&self, pos: KeyPosition) -> bool {
        self.states.iter().any(|s| s.pos == pos)
    }

    pub fn get(&self, pos: KeyPosition) -> Option<&RepKeyState> {
        self.states.iter().find(|s| s.pos == pos)
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Earliest pending repeat
    pub fn next_deadline(&self) -> Option<Instant> {
        self.states.iter().map(|s| s.deadline(&self.config)).min()
    }

    /// Positions due at `now`, in start order.
    ///
    /// Each due key fires once. A key which is late by a whole period or more is
    /// rescheduled from `now` instead of catching up.
    pub fn poll(&mut self, now: Instant) -> Vec<KeyPosition, REP_KEY_MAX_NUM> {
        let mut due = Vec::new();
        for state in self.states.iter_mut() {
            let deadline = state.deadline(&self.config);
            if deadline > now {
                continue;
            }
            let late = now - deadline >= self.config.keypress_frequency;
            state.last_repeat_time = Some(if late { now } else { deadline });
            let _ = due.push(state.pos);
        }
        due
    }
}
