//! Runs Vietcong and Fish sessions on top of the `cardroom` rule engines.
//!
//! Every session is owned by its own task, which applies submitted turns one
//! at a time and publishes a [`Snapshot`] after each accepted turn.

mod autoplay;
mod dealer;
mod error;
mod recording;
mod session;
pub use autoplay::*;
pub use dealer::*;
pub use error::*;
pub use recording::*;
pub use session::{SessionId, Snapshot};
