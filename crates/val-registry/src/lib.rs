//! Action registries
//!
//! `ActionCategory` dispatches named actions synchronously or on the tokio
//! blocking pool. The built-in categories wrap one each with typed entry
//! points: `SeatActions` for seat climate, `WindowActions`, `DoorActions`
//! and `SteeringWheelActions`. `VehicleActions` holds all of them.

mod builder;
mod category;
mod door;
mod seat;
mod steering_wheel;
mod vehicle;
mod window;

pub use category::{ActionCategory, ActionFuture};
pub use door::*;
pub use seat::*;
pub use steering_wheel::*;
pub use vehicle::{VehicleActions, VehicleActionsConfig};
pub use window::*;
