pub use self::lending::*;

mod lending;
