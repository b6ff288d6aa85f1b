mod countdown;
mod indicator;

pub use countdown::{Countdown, Status};
