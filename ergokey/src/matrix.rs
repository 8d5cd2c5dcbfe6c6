use embassy_time::{Duration, Instant, Ticker, Timer};
use embedded_hal::digital::{InputPin, OutputPin};

use crate::Runnable;
use crate::channel::{TRANSITION_CHANNEL, TransitionChannel, push_transition};
use crate::config::MatrixConfig;
use crate::debounce::{DebounceState, DebouncerTrait};
use crate::event::Transition;
use crate::types::position::KeyPosition;

/// KeyState represents the state of a key.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyState {
    // True if the key is pressed
    pub pressed: bool,
}

impl KeyState {
    pub fn new() -> Self {
        KeyState { pressed: false }
    }

    pub fn toggle_pressed(&mut self) {
        self.pressed = !self.pressed;
    }
}

/// Matrix is the physical pcb layout of the keyboard matrix.
///
/// Output pins are driven high one at a time and the input pins are sampled. Without
/// the `col2row` feature, output pins are rows and input pins are columns.
pub struct Matrix<
    'a,
    In: InputPin,
    Out: OutputPin,
    D: DebouncerTrait,
    const INPUT_PIN_NUM: usize,
    const OUTPUT_PIN_NUM: usize,
> {
    /// Input pins of the pcb matrix
    input_pins: [In; INPUT_PIN_NUM],
    /// Output pins of the pcb matrix
    output_pins: [Out; OUTPUT_PIN_NUM],
    /// Debouncer
    debouncer: D,
    /// Key state matrix
    key_states: [[KeyState; INPUT_PIN_NUM]; OUTPUT_PIN_NUM],
    /// Where debounced transitions go
    transitions: &'a TransitionChannel,
    /// Period of a full scan
    scan_interval: Duration,
}

impl<In: InputPin, Out: OutputPin, D: DebouncerTrait, const INPUT_PIN_NUM: usize, const OUTPUT_PIN_NUM: usize>
    Matrix<'static, In, Out, D, INPUT_PIN_NUM, OUTPUT_PIN_NUM>
{
    /// Create a matrix from input and output pins, sending to the default transition channel.
    pub fn new(
        input_pins: [In; INPUT_PIN_NUM],
        output_pins: [Out; OUTPUT_PIN_NUM],
        debouncer: D,
        config: MatrixConfig,
    ) -> Self {
        Self::with_channel(input_pins, output_pins, debouncer, config, &TRANSITION_CHANNEL)
    }
}

impl<'a, In: InputPin, Out: OutputPin, D: DebouncerTrait, const INPUT_PIN_NUM: usize, const OUTPUT_PIN_NUM: usize>
    Matrix<'a, In, Out, D, INPUT_PIN_NUM, OUTPUT_PIN_NUM>
{
    pub fn with_channel(
        input_pins: [In; INPUT_PIN_NUM],
        output_pins: [Out; OUTPUT_PIN_NUM],
        debouncer: D,
        config: MatrixConfig,
        transitions: &'a TransitionChannel,
    ) -> Self {
        Matrix {
            input_pins,
            output_pins,
            debouncer,
            key_states: [[KeyState::new(); INPUT_PIN_NUM]; OUTPUT_PIN_NUM],
            transitions,
            scan_interval: config.scan_interval,
        }
    }

    #[cfg(feature = "col2row")]
    fn position(in_idx: usize, out_idx: usize) -> KeyPosition {
        KeyPosition::new(in_idx as u8, out_idx as u8)
    }

    #[cfg(not(feature = "col2row"))]
    fn position(in_idx: usize, out_idx: usize) -> KeyPosition {
        KeyPosition::new(out_idx as u8, in_idx as u8)
    }

    /// Registered state of the key at `pos`
    pub fn key_state(&self, pos: KeyPosition) -> Option<KeyState> {
        #[cfg(feature = "col2row")]
        let (in_idx, out_idx) = (pos.row as usize, pos.col as usize);
        #[cfg(not(feature = "col2row"))]
        let (in_idx, out_idx) = (pos.col as usize, pos.row as usize);
        self.key_states.get(out_idx).and_then(|r| r.get(in_idx)).copied()
    }

    /// Scan the whole matrix once, pushing a transition for every debounced change.
    ///
    /// Never blocks on the channel. Returns the number of transitions pushed.
    pub async fn scan(&mut self) -> usize {
        let mut pushed = 0;
        for (out_idx, out_pin) in self.output_pins.iter_mut().enumerate() {
            // Pull up output pin, wait 1us ensuring the change comes into effect
            out_pin.set_high().ok();
            Timer::after_micros(1).await;
            for (in_idx, in_pin) in self.input_pins.iter_mut().enumerate() {
                let pin_state = in_pin.is_high().unwrap_or_default();
                let key_state = &mut self.key_states[out_idx][in_idx];
                let debounce_state = self
                    .debouncer
                    .detect_change_with_debounce(in_idx, out_idx, pin_state, key_state);
                if let DebounceState::Debounced = debounce_state {
                    key_state.toggle_pressed();
                    let pos = Self::position(in_idx, out_idx);
                    let transition = Transition::new(pos, key_state.pressed.into(), Instant::now());
                    trace!("Debounced {:?}", transition);
                    push_transition(self.transitions, transition);
                    pushed += 1;
                }
            }
            // Pull it back to low
            out_pin.set_low().ok();
        }
        pushed
    }
}

impl<In: InputPin, Out: OutputPin, D: DebouncerTrait, const INPUT_PIN_NUM: usize, const OUTPUT_PIN_NUM: usize> Runnable
    for Matrix<'_, In, Out, D, INPUT_PIN_NUM, OUTPUT_PIN_NUM>
{
    /// Scan the matrix on a fixed period
    async fn run(&mut self) {
        info!("Start scanning matrix every {}us", self.scan_interval.as_micros());
        let mut ticker = Ticker::every(self.scan_interval);
        loop {
            self.scan().await;
            ticker.next().await;
        }
    }
}
