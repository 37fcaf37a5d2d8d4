//! GPIO pin abstractions
//!
//! The device drives exactly one output that matters for safety (the gate
//! of the host power MOSFET) and samples two inputs: the button and, during
//! the shutdown handshake, the host's UART TX line.

/// Digital output pin
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Check if the pin is currently driven high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently driven low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockPin {
        high: bool,
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
        }

        fn set_low(&mut self) {
            self.high = false;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    impl InputPin for MockPin {
        fn is_high(&self) -> bool {
            self.high
        }
    }

    #[test]
    fn test_output_level() {
        let mut pin = MockPin { high: false };
        pin.set_high();
        assert!(pin.is_set_high());
        pin.set_low();
        assert!(pin.is_set_low());
    }

    #[test]
    fn test_input_default_is_low() {
        let pin = MockPin { high: false };
        assert!(pin.is_low());
        assert!(!pin.is_high());
    }
}
