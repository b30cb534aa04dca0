use time::Date;

/// Source of the current calendar day.
///
/// Every date-dependent rule in the kernel receives "today" from here instead of reading the
/// system clock, so the same lending always yields the same derived values for a given day.
pub trait Clock: 'static + Sync + Send {
    fn today(&self) -> Date;
}

pub trait DependOnClock: 'static + Sync + Send {
    type Clock: Clock;
    fn clock(&self) -> &Self::Clock;
}
