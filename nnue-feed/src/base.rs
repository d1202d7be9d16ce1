//! Interfaces of the external collaborators.
mod learner;
mod stream;
pub use learner::Learner;
pub use stream::{PositionStream, StreamOpener};
