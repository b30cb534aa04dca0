mod book;
mod fine;
mod lending;
mod reader;

pub use self::{book::*, fine::*, lending::*, reader::*};
