use serde::{Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;

/// Optimistic-concurrency token of an entity.
///
/// A fresh entity starts at `0` and every accepted mutation moves it to [`Version::next`].
/// Writers must present the version they read; a mismatch means someone else got there first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version<T>(i64, PhantomData<T>);

impl<T> Version<T> {
    pub fn new(version: impl Into<i64>) -> Self {
        Self(version.into(), PhantomData)
    }

    pub fn initial() -> Self {
        Self::new(0)
    }

    pub fn next(&self) -> Self {
        Self::new(self.0 + 1)
    }
}

impl<T> From<i64> for Version<T> {
    fn from(version: i64) -> Self {
        Self::new(version)
    }
}

impl<T> From<Version<T>> for i64 {
    fn from(version: Version<T>) -> Self {
        version.0
    }
}

impl<T> AsRef<i64> for Version<T> {
    fn as_ref(&self) -> &i64 {
        &self.0
    }
}

impl<T> Display for Version<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T> Serialize for Version<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

#[cfg(test)]
mod test {
    use super::Version;

    struct Marker;

    #[test]
    fn next_increments_by_one() {
        let version = Version::<Marker>::initial();
        assert_eq!(*version.as_ref(), 0);
        assert_eq!(*version.next().as_ref(), 1);
        assert_eq!(*version.next().next().as_ref(), 2);
    }
}
