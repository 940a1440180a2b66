//! Mode registry and switching
//!
//! Modes are registered once at startup; registration order is the cycle
//! order for next/previous. A mode can be gated unavailable (screen-art
//! before a host connects), in which case cycling skips it and direct
//! switches to it are refused.

use heapless::Vec;

use super::{Mode, ModeContext};
use crate::input::Event;

/// Handle returned by [`ModeController::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeId(usize);

impl ModeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A completed switch, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub from: Option<&'static str>,
    pub to: &'static str,
}

struct Slot<'m> {
    mode: &'m mut dyn Mode,
    available: bool,
}

/// Owns up to `N` modes and the single current-mode pointer
pub struct ModeController<'m, const N: usize> {
    slots: Vec<Slot<'m>, N>,
    current: Option<usize>,
    switch_event: Event,
}

impl<'m, const N: usize> ModeController<'m, N> {
    /// Controller that cycles modes on `switch_event`
    pub fn new(switch_event: Event) -> Self {
        Self {
            slots: Vec::new(),
            current: None,
            switch_event,
        }
    }

    /// Append an always-available mode
    ///
    /// Returns `None` if the registry is full or already initialized.
    pub fn register(&mut self, mode: &'m mut dyn Mode) -> Option<ModeId> {
        self.register_gated(mode, true)
    }

    /// Append a mode with an initial availability
    pub fn register_gated(&mut self, mode: &'m mut dyn Mode, available: bool) -> Option<ModeId> {
        if self.current.is_some() {
            return None;
        }
        let id = ModeId(self.slots.len());
        self.slots.push(Slot { mode, available }).ok()?;
        Some(id)
    }

    /// Enter the first available registered mode
    ///
    /// Does nothing if already initialized or nothing is available.
    pub fn init(&mut self, cx: &mut ModeContext<'_>) -> Option<Transition> {
        if self.current.is_some() {
            return None;
        }
        let first = self.slots.iter().position(|s| s.available)?;
        Some(self.transition(first, cx))
    }

    pub fn count(&self) -> usize {
        self.slots.len()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_mode(&self) -> Option<&dyn Mode> {
        self.current.map(|i| &*self.slots[i].mode)
    }

    pub fn current_name(&self) -> Option<&'static str> {
        self.current_mode().map(|m| m.name())
    }

    pub fn is_available(&self, id: ModeId) -> bool {
        self.slots.get(id.0).map(|s| s.available).unwrap_or(false)
    }

    /// Change a mode's availability
    ///
    /// If the active mode becomes unavailable the controller moves on to the
    /// next available one.
    pub fn set_available(
        &mut self,
        id: ModeId,
        available: bool,
        cx: &mut ModeContext<'_>,
    ) -> Option<Transition> {
        let slot = self.slots.get_mut(id.0)?;
        slot.available = available;
        if !available && self.current == Some(id.0) {
            return self.switch_to_next(cx);
        }
        None
    }

    /// Cycle forward, skipping unavailable modes
    pub fn switch_to_next(&mut self, cx: &mut ModeContext<'_>) -> Option<Transition> {
        let target = self.find_available(true)?;
        Some(self.transition(target, cx))
    }

    /// Cycle backward, skipping unavailable modes
    pub fn switch_to_previous(&mut self, cx: &mut ModeContext<'_>) -> Option<Transition> {
        let target = self.find_available(false)?;
        Some(self.transition(target, cx))
    }

    /// Jump to a registry index
    ///
    /// Refused for invalid, unavailable, or already-current indices.
    pub fn switch_to_index(
        &mut self,
        index: usize,
        cx: &mut ModeContext<'_>,
    ) -> Option<Transition> {
        let slot = self.slots.get(index)?;
        if !slot.available || self.current == Some(index) {
            return None;
        }
        Some(self.transition(index, cx))
    }

    pub fn switch_to_mode(&mut self, id: ModeId, cx: &mut ModeContext<'_>) -> Option<Transition> {
        self.switch_to_index(id.0, cx)
    }

    /// Dispatch one event
    ///
    /// The switch event cycles modes; anything else goes to the active mode.
    pub fn handle_event(&mut self, event: Event, cx: &mut ModeContext<'_>) -> Option<Transition> {
        if event == self.switch_event {
            return self.switch_to_next(cx);
        }
        if let Some(i) = self.current {
            self.slots[i].mode.handle_event(event, cx);
        }
        None
    }

    /// One mode-task iteration: dispatch the event (if any), then update
    pub fn step(&mut self, event: Option<Event>, cx: &mut ModeContext<'_>) -> Option<Transition> {
        let transition = event.and_then(|e| self.handle_event(e, cx));
        if let Some(i) = self.current {
            self.slots[i].mode.update(cx);
        }
        transition
    }

    /// Nearest available mode other than the current one
    fn find_available(&self, forward: bool) -> Option<usize> {
        let len = self.slots.len();
        let current = self.current?;
        let step = if forward { 1 } else { len - 1 };
        let mut index = current;
        for _ in 0..len - 1 {
            index = (index + step) % len;
            if self.slots[index].available {
                return Some(index);
            }
        }
        None
    }

    fn transition(&mut self, to: usize, cx: &mut ModeContext<'_>) -> Transition {
        let mut from = None;
        if let Some(i) = self.current {
            self.slots[i].mode.exit(cx);
            from = Some(self.slots[i].mode.name());
        }
        self.current = Some(to);
        self.slots[to].mode.begin(cx);
        Transition {
            from,
            to: self.slots[to].mode.name(),
        }
    }
}
