mod operation;
mod version;

pub use self::{operation::*, version::*};
