//! Interaction engine for the car-wash locator.
//!
//! The pure layer (`state`, `dispatch`, `drawing`, `recommend`, `counties`,
//! `pins`) owns every piece of client-side view state and never performs
//! I/O; map clicks and mode switches mutate state synchronously and return
//! typed [`dispatch::Action`] values describing the network work to do. The
//! [`driver`] executes those actions against the gateway and applies the
//! responses back onto the state.

pub mod counties;
pub mod dispatch;
pub mod drawing;
pub mod driver;
pub mod pins;
pub mod recommend;
pub mod state;

pub use dispatch::Action;
pub use driver::Session;
pub use state::{AppState, BusinessParams, Mode, RecommendMode};
