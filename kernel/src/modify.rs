mod fine;
mod lending;

pub use self::{fine::*, lending::*};
