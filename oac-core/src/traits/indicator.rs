//! Status LED trait
//!
//! The lifecycle only asks for a color and, optionally, an animation. How
//! either is rendered is up to the implementation.

/// Full hue circle
const HUE_MAX: u32 = 65_535;

/// HSV color on a 16-bit hue circle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color {
    pub hue: u16,
    pub sat: u8,
    pub val: u8,
}

impl Color {
    /// Host ready
    pub const GREEN: Color = Color::from_degrees(120);
    /// Recording
    pub const WHITE: Color = Color {
        hue: 0,
        sat: 0,
        val: 255,
    };
    /// Error blink color
    pub const RED: Color = Color::from_degrees(0);

    /// Fully saturated color at `degrees` on the hue circle
    pub const fn from_degrees(degrees: u16) -> Self {
        Self {
            hue: ((HUE_MAX * (degrees % 360) as u32) / 360) as u16,
            sat: 255,
            val: 255,
        }
    }
}

/// Animations the indicator can run on top of the base color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Animation {
    /// Hue cycle while the host boots or shuts down
    Rainbow,
    /// Repeating group of `count` blinks followed by a pause
    Blink { count: u8 },
}

/// Status LED driven by the lifecycle
pub trait Indicator {
    /// Set the steady color
    fn set_color(&mut self, color: Color);

    /// Start an animation, or stop the current one with `None`
    fn set_animation(&mut self, animation: Option<Animation>);

    /// Stop any animation and turn the LED off
    fn off(&mut self);
}
