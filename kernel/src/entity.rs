mod book;
mod common;
mod fine;
mod lending;
mod policy;
mod reader;

pub use self::{book::*, common::*, fine::*, lending::*, policy::*, reader::*};
