use embassy_futures::select::{Either, select};
use embassy_time::{Instant, Timer};
use heapless::Vec;

use crate::action::{Binding, Effect, FunctionContext, LayerId};
use crate::channel::{KEYBOARD_REPORT_CHANNEL, ReportChannel, TRANSITION_CHANNEL, TransitionChannel, send_report};
use crate::config::BehaviorConfig;
use crate::descriptor::KeyboardReport;
use crate::event::{Edge, Transition};
use crate::hid_state::build_report;
use crate::keyboard::registry::{ActiveBindingRegistry, RegistryEntry, ReleaseHandler};
use crate::keymap::KeyMap;
use crate::layer::{LayerActivation, LayerKind, LayerStack};
use crate::mode::ModeController;
use crate::rep_key::RepKeyEngine;
use crate::types::mode::Mode;
use crate::types::position::KeyPosition;
use crate::unicode::char_reports;
use crate::{FUNCTION_EFFECT_MAX_NUM, Runnable};

pub mod registry;

impl<const ROW: usize, const COL: usize, const NUM_LAYER: usize> Runnable for Keyboard<'_, ROW, COL, NUM_LAYER> {
    /// Main keyboard processing task, it receives transitions from the matrix and fires Rep-Key repeats.
    ///
    /// Transitions and repeats go through the same loop, so they are never interleaved.
    async fn run(&mut self) {
        let transitions = self.transitions;
        loop {
            match self.rep_key.next_deadline() {
                Some(deadline) => match select(transitions.receive(), Timer::at(deadline)).await {
                    Either::First(transition) => self.process(transition).await,
                    Either::Second(()) => self.fire_repeats(Instant::now()).await,
                },
                None => {
                    let transition = transitions.receive().await;
                    self.process(transition).await;
                }
            }
        }
    }
}

/// The key-event state machine.
///
/// It owns the mode, the layer stack, the registry of held bindings and the Rep-Key
/// timers, and is the only place where they change.
pub struct Keyboard<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> {
    /// Keymap
    keymap: KeyMap<'a, ROW, COL, NUM_LAYER>,

    /// Current mode
    mode: ModeController,

    /// Active layers
    layers: LayerStack,

    /// Bindings of the held keys, with their release handlers
    registry: ActiveBindingRegistry,

    /// Repeat timers of held keys
    rep_key: RepKeyEngine,

    /// Options for configurable action behavior
    behavior: BehaviorConfig,

    /// Incoming debounced transitions
    transitions: &'a TransitionChannel,

    /// Outgoing keyboard reports
    reports: &'a ReportChannel,
}

impl<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> Keyboard<'a, ROW, COL, NUM_LAYER> {
    /// Create a keyboard which uses the default static channels
    pub fn new(keymap: KeyMap<'a, ROW, COL, NUM_LAYER>, behavior: BehaviorConfig) -> Self {
        Self::with_channels(keymap, behavior, &TRANSITION_CHANNEL, &KEYBOARD_REPORT_CHANNEL)
    }

    pub fn with_channels(
        keymap: KeyMap<'a, ROW, COL, NUM_LAYER>,
        behavior: BehaviorConfig,
        transitions: &'a TransitionChannel,
        reports: &'a ReportChannel,
    ) -> Self {
        Keyboard {
            keymap,
            mode: ModeController::new(behavior.default_mode),
            layers: LayerStack::new(),
            registry: ActiveBindingRegistry::new(),
            rep_key: RepKeyEngine::new(behavior.rep_key),
            behavior,
            transitions,
            reports,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode.current()
    }

    /// Layer which currently has the highest precedence
    pub fn current_layer(&self) -> LayerId {
        self.layers.current_layer(self.mode.discipline())
    }

    pub fn layer_stack(&self) -> &LayerStack {
        &self.layers
    }

    pub fn registry(&self) -> &ActiveBindingRegistry {
        &self.registry
    }

    pub fn rep_key(&self) -> &RepKeyEngine {
        &self.rep_key
    }

    /// Process a single transition
    pub async fn process(&mut self, transition: Transition) {
        match transition.edge {
            Edge::Pressed => self.on_press(transition).await,
            Edge::Released => self.on_release(transition).await,
        }
    }

    async fn on_press(&mut self, transition: Transition) {
        let pos = transition.pos;
        if self.registry.contains(pos) {
            debug!("{:?} is already pressed, ignore", pos);
            return;
        }

        let mode = self.mode.current();
        let (layer, binding) = self.keymap.resolve(mode, &self.layers, pos);
        debug!("Press {:?} in {:?} layer {}: {:?}", pos, mode, layer, binding);

        match binding {
            Binding::No | Binding::Transparent => {
                debug!("No binding at {:?}", pos);
            }
            Binding::SendKey(keycode, _) => {
                if !self.register(pos, binding) {
                    return;
                }
                if self.mode.rep_key_enabled() && keycode.is_basic() {
                    self.rep_key.start(pos, keycode, transition.timestamp);
                }
                self.send_held_report().await;
            }
            Binding::Modifier(_) => {
                if self.register(pos, binding) {
                    self.send_held_report().await;
                }
            }
            Binding::LayerHold(l) | Binding::LayerTap(l) => {
                if self.registry.is_full() {
                    warn!("Too many held keys, ignore layer key {:?}", pos);
                    return;
                }
                let kind = if matches!(binding, Binding::LayerTap(_)) {
                    LayerKind::Tap
                } else {
                    LayerKind::Hold
                };
                if self
                    .layers
                    .push(LayerActivation::new(pos, l, kind, transition.timestamp))
                {
                    self.register(pos, binding);
                }
            }
            Binding::ModeSwitch(m) => self.switch_mode(m).await,
            Binding::Function(f) => {
                // Registered first, so a mode switch effect also releases this key
                if !self.register(pos, binding) {
                    return;
                }
                let mut ctx = FunctionContext::new(mode, layer, pos);
                (f.press)(&mut ctx);
                self.run_effects(ctx.into_effects()).await;
            }
        }
    }

    async fn on_release(&mut self, transition: Transition) {
        match self.registry.take(transition.pos) {
            Some(entry) => {
                debug!("Release {:?}: {:?}", transition.pos, entry.handler);
                self.run_release_handler(entry, transition.timestamp).await;
            }
            None => debug!("No registered binding at {:?}, ignore release", transition.pos),
        }
    }

    fn register(&mut self, pos: KeyPosition, binding: Binding) -> bool {
        let entry = RegistryEntry {
            pos,
            binding,
            handler: ReleaseHandler::for_binding(&binding),
        };
        if self.registry.insert(entry).is_err() {
            warn!("Too many held keys, ignore {:?}", pos);
            return false;
        }
        true
    }

    async fn run_release_handler(&mut self, entry: RegistryEntry, now: Instant) {
        let discipline = self.mode.discipline();
        match entry.handler {
            ReleaseHandler::Nothing => (),
            ReleaseHandler::ReleaseKey => {
                self.rep_key.cancel(entry.pos);
                self.send_held_report().await;
            }
            ReleaseHandler::ReleaseModifier => self.send_held_report().await,
            ReleaseHandler::PopLayer(_) => {
                self.layers.remove(entry.pos, discipline);
            }
            ReleaseHandler::EndLayerTap(layer) => {
                let tapped = self.layers.activation(entry.pos).is_some_and(|a| {
                    now.checked_duration_since(a.pressed_at)
                        .is_none_or(|held| held <= self.behavior.layer_tap.tap_timeout)
                });
                if tapped {
                    debug!("Layer {} tapped, clear layer stack", layer);
                    self.layers.clear();
                } else {
                    self.layers.remove(entry.pos, discipline);
                }
            }
            ReleaseHandler::Function(release) => {
                let mut ctx = FunctionContext::new(self.mode.current(), self.current_layer(), entry.pos);
                release(&mut ctx);
                self.run_effects(ctx.into_effects()).await;
            }
        }
    }

    /// Release everything, then switch to `mode`.
    ///
    /// Every release handler runs, layers go back to the base layer and every repeat stops.
    /// This also happens when `mode` is already active.
    async fn switch_mode(&mut self, mode: Mode) {
        info!("Mode switch to {:?}, release all held keys", mode);
        self.release_all().await;
        self.mode.set(mode);
    }

    async fn release_all(&mut self) {
        let entries = self.registry.drain();
        for entry in entries.iter() {
            if let ReleaseHandler::Function(release) = entry.handler {
                let mut ctx = FunctionContext::new(self.mode.current(), self.current_layer(), entry.pos);
                release(&mut ctx);
                for effect in ctx.into_effects() {
                    match effect {
                        Effect::SwitchMode(m) => warn!("Ignore mode switch to {:?} while releasing all keys", m),
                        e => self.run_output_effect(e).await,
                    }
                }
            }
        }
        self.layers.clear();
        self.rep_key.clear();
        self.send_held_report().await;
    }

    async fn run_effects(&mut self, effects: Vec<Effect, FUNCTION_EFFECT_MAX_NUM>) {
        let mut typed = false;
        for effect in effects {
            match effect {
                Effect::SwitchMode(m) => {
                    self.switch_mode(m).await;
                    typed = false;
                }
                e => {
                    self.run_output_effect(e).await;
                    typed = true;
                }
            }
        }
        // Typing suppressed the held keys, bring them back
        if typed {
            let held = build_report(&self.registry, None);
            if !held.is_empty() {
                self.send_report(held).await;
            }
        }
    }

    async fn run_output_effect(&mut self, effect: Effect) {
        match effect {
            Effect::TypeChar(c) => self.type_char(c).await,
            Effect::TypeStr(s) => {
                for c in s.chars() {
                    self.type_char(c).await;
                }
            }
            Effect::Tap(keycode, modifiers) => {
                let mut keycodes = [0; 6];
                if keycode.is_basic() {
                    keycodes[0] = keycode as u8;
                }
                let down = modifiers | keycode.to_hid_modifiers();
                self.send_report(KeyboardReport::new(down.into_bits(), keycodes)).await;
                self.send_report(KeyboardReport::default()).await;
            }
            Effect::SwitchMode(m) => warn!("Mode switch to {:?} is not an output effect", m),
        }
    }

    async fn type_char(&mut self, c: char) {
        for report in char_reports(c, self.behavior.unicode.mode) {
            self.send_report(report).await;
        }
    }

    /// Send a release + press pair for every key whose repeat is due at `now`
    pub async fn fire_repeats(&mut self, now: Instant) {
        if !self.mode.rep_key_enabled() {
            self.rep_key.clear();
            return;
        }
        for pos in self.rep_key.poll(now) {
            if !self.registry.contains(pos) {
                self.rep_key.cancel(pos);
                continue;
            }
            trace!("Repeat {:?}", pos);
            self.send_report(build_report(&self.registry, Some(pos))).await;
            self.send_held_report().await;
        }
    }

    async fn send_held_report(&mut self) {
        self.send_report(build_report(&self.registry, None)).await;
    }

    async fn send_report(&self, report: KeyboardReport) {
        send_report(self.reports, report, self.behavior.report.retry_backoff).await;
    }
}

#[cfg(test)]
mod test {
    use embassy_futures::block_on;
    use embassy_sync::channel::Channel;
    use embassy_time::Duration;

    use super::*;
    use crate::types::keycode::HidKeyCode;
    use crate::types::modifier::HidModifiers;
    use crate::{a, func, k, layer, lt, md, mo, mode};

    #[rustfmt::skip]
    static LAYERS: [[[Binding; 5]; 1]; 2] = [
        layer!([[k!(A), mo!(1), md!(LSHIFT), lt!(1), a!(No)]]),
        layer!([[k!(B), a!(Transparent), func!(hello), a!(Transparent), mode!(Gaming)]]),
    ];

    fn hello(ctx: &mut FunctionContext) {
        ctx.tap(HidKeyCode::H, HidModifiers::new());
    }

    fn keyboard(
        transitions: &'static TransitionChannel,
        reports: &'static ReportChannel,
    ) -> Keyboard<'static, 1, 5, 2> {
        Keyboard::with_channels(KeyMap::single(&LAYERS), BehaviorConfig::default(), transitions, reports)
    }

    fn channels() -> (&'static TransitionChannel, &'static ReportChannel) {
        (Box::leak(Box::new(Channel::new())), Box::leak(Box::new(Channel::new())))
    }

    fn at(col: u8, edge: Edge, ms: u64) -> Transition {
        Transition::new(KeyPosition::new(0, col), edge, Instant::from_millis(ms))
    }

    fn drain(reports: &ReportChannel) -> std::vec::Vec<KeyboardReport> {
        let mut out = std::vec::Vec::new();
        while let Ok(r) = reports.try_receive() {
            out.push(r);
        }
        out
    }

    #[test]
    fn test_press_release_registry() {
        let (transitions, reports) = channels();
        let mut kb = keyboard(transitions, reports);
        block_on(async {
            kb.process(at(0, Edge::Pressed, 0)).await;
            assert!(kb.registry().contains(KeyPosition::new(0, 0)));
            assert!(kb.rep_key().is_active(KeyPosition::new(0, 0)));
            kb.process(at(0, Edge::Released, 10)).await;
        });
        assert!(kb.registry().is_empty());
        assert!(kb.rep_key().is_empty());
        assert_eq!(
            drain(reports),
            [KeyboardReport::new(0, [4, 0, 0, 0, 0, 0]), KeyboardReport::default()]
        );
    }

    #[test]
    fn test_layer_tap_window() {
        let (transitions, reports) = channels();
        let mut kb = keyboard(transitions, reports);
        block_on(async {
            // Hold layer 1 with mo!, then tap the layer tap key: the whole stack clears
            kb.process(at(1, Edge::Pressed, 0)).await;
            kb.process(at(3, Edge::Pressed, 10)).await;
            assert_eq!(kb.layer_stack().len(), 2);
            kb.process(at(3, Edge::Released, 100)).await;
            assert!(kb.layer_stack().is_empty());
            assert_eq!(kb.current_layer(), 0);
            // mo! release is now a no-op on the layers
            kb.process(at(1, Edge::Released, 120)).await;

            kb.process(at(1, Edge::Pressed, 200)).await;
            kb.process(at(3, Edge::Pressed, 210)).await;
            kb.process(at(3, Edge::Released, 210 + 201)).await;
            assert_eq!(kb.layer_stack().len(), 1);
            assert_eq!(kb.current_layer(), 1);
        });
        assert!(drain(reports).is_empty());
    }

    #[test]
    fn test_function_binding_restores_held_state() {
        let (transitions, reports) = channels();
        let mut kb = keyboard(transitions, reports);
        block_on(async {
            kb.process(at(2, Edge::Pressed, 0)).await;
            kb.process(at(1, Edge::Pressed, 1)).await;
            // Layer 1 turns the modifier key position into the function
            kb.process(at(2, Edge::Released, 2)).await;
            kb.process(at(2, Edge::Pressed, 3)).await;
        });
        let h = HidKeyCode::H as u8;
        assert_eq!(
            drain(reports),
            [
                KeyboardReport::new(0x02, [0; 6]),
                KeyboardReport::default(),
                KeyboardReport::new(0, [h, 0, 0, 0, 0, 0]),
                KeyboardReport::default(),
            ]
        );
        assert_eq!(kb.registry().len(), 2);
    }

    #[test]
    fn test_mode_switch_releases_everything() {
        let (transitions, reports) = channels();
        let mut kb = keyboard(transitions, reports);
        block_on(async {
            kb.process(at(0, Edge::Pressed, 0)).await;
            kb.process(at(1, Edge::Pressed, 1)).await;
            kb.process(at(4, Edge::Pressed, 2)).await;
            assert_eq!(kb.mode(), Mode::Gaming);
            assert!(kb.registry().is_empty());
            assert!(kb.layer_stack().is_empty());
            assert!(kb.rep_key().is_empty());
            // Releases of keys held across the switch produce nothing
            kb.process(at(0, Edge::Released, 3)).await;
            kb.process(at(1, Edge::Released, 4)).await;
            kb.process(at(4, Edge::Released, 5)).await;
        });
        assert_eq!(
            drain(reports),
            [KeyboardReport::new(0, [4, 0, 0, 0, 0, 0]), KeyboardReport::default()]
        );
    }

    #[test]
    fn test_fire_repeats() {
        let (transitions, reports) = channels();
        let mut kb = keyboard(transitions, reports);
        block_on(async {
            kb.process(at(0, Edge::Pressed, 0)).await;
            kb.fire_repeats(Instant::from_millis(499)).await;
            kb.fire_repeats(Instant::from_millis(500)).await;
        });
        let down = KeyboardReport::new(0, [4, 0, 0, 0, 0, 0]);
        assert_eq!(drain(reports), [down, KeyboardReport::default(), down]);
        assert_eq!(
            kb.rep_key().next_deadline(),
            Some(Instant::from_millis(500) + Duration::from_millis(33))
        );
    }
}
