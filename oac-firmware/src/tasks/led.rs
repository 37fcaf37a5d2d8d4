//! Status LED task
//!
//! Renders the requested color and animation on a three-channel LED. Each
//! channel is a plain GPIO, so colors are snapped to the nearest of the
//! six primary and secondary hues.

use defmt::*;
use embassy_rp::gpio::{Level, Output};
use embassy_time::{with_timeout, Duration};

use oac_core::traits::{Animation, Color};

use crate::channels::LED_STATE;

/// Animation frame period
const FRAME_MS: u64 = 50;

/// Hue advance per rainbow frame
const RAINBOW_STEP: u32 = 300;

/// Frames per blink half-period (on, then off)
const BLINK_FRAMES: u32 = 8;

/// Frames of darkness between blink groups
const BLINK_PAUSE_FRAMES: u32 = 40;

/// What the LED should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub struct LedState {
    pub color: Option<Color>,
    pub animation: Option<Animation>,
}

impl LedState {
    pub const OFF: LedState = LedState {
        color: None,
        animation: None,
    };
}

/// LED task - pins are red, green, blue
#[embassy_executor::task]
pub async fn led_task(mut pins: [Output<'static>; 3]) {
    info!("LED task started");

    let mut state = LedState::OFF;
    let mut frame: u32 = 0;

    loop {
        write(&mut pins, render(&state, frame));

        match with_timeout(Duration::from_millis(FRAME_MS), LED_STATE.wait()).await {
            Ok(next) => {
                trace!("LED: {:?}", next);
                state = next;
                frame = 0;
            }
            Err(_) => frame = frame.wrapping_add(1),
        }
    }
}

/// Color shown at `frame` frames into the current state, `None` for dark
fn render(state: &LedState, frame: u32) -> Option<Color> {
    match state.animation {
        None => state.color,
        Some(Animation::Rainbow) => Some(Color {
            hue: (frame.wrapping_mul(RAINBOW_STEP) & 0xFFFF) as u16,
            sat: 255,
            val: 255,
        }),
        Some(Animation::Blink { count }) => {
            let blinks = count.max(1) as u32 * 2 * BLINK_FRAMES;
            let pos = frame % (blinks + BLINK_PAUSE_FRAMES);
            let lit = pos < blinks && (pos % (2 * BLINK_FRAMES)) < BLINK_FRAMES;
            if lit {
                state.color
            } else {
                None
            }
        }
    }
}

fn write(pins: &mut [Output<'static>; 3], color: Option<Color>) {
    let rgb = color.map_or([false; 3], snap);
    for (pin, on) in pins.iter_mut().zip(rgb) {
        pin.set_level(Level::from(on));
    }
}

/// Nearest on/off RGB combination
fn snap(color: Color) -> [bool; 3] {
    if color.val < 128 {
        return [false; 3];
    }
    if color.sat < 128 {
        return [true; 3];
    }

    let sector = ((color.hue as u32 * 6 + 32_768) / 65_536) % 6;
    match sector {
        0 => [true, false, false],
        1 => [true, true, false],
        2 => [false, true, false],
        3 => [false, true, true],
        4 => [false, false, true],
        _ => [true, false, true],
    }
}
