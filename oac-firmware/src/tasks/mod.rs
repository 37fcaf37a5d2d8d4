//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod battery;
pub mod button;
pub mod controller;
pub mod led;
pub mod link_rx;
pub mod tick;

pub use battery::battery_task;
pub use button::button_task;
pub use controller::controller_task;
pub use led::led_task;
pub use link_rx::link_rx_task;
pub use tick::tick_task;
