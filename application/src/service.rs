pub use self::{fine::*, lending::*};

mod fine;
mod lending;

#[cfg(test)]
mod fixture;
