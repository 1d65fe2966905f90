use std::cmp::Ordering;
use std::fmt;

/// Execution priority of a listener.
///
/// Listeners run in descending `(primary, secondary)` order: a higher primary
/// always runs first, and the secondary breaks ties within one primary band.
/// The named primaries describe the usual phases around an action:
/// [`PRE_ACTION`](Self::PRE_ACTION) listeners can inspect or veto before the
/// action's own [`ACTION_DEFAULT`](Self::ACTION_DEFAULT) handler runs, and
/// [`POST_ACTION`](Self::POST_ACTION) listeners observe the result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Priority {
    pub primary: i32,
    pub secondary: i32,
}

impl Priority {
    pub const PRE_ACTION: i32 = 100;
    pub const ACTION_DEFAULT: i32 = 0;
    pub const POST_ACTION: i32 = -100;

    pub const fn new(primary: i32, secondary: i32) -> Self {
        Self { primary, secondary }
    }

    pub const fn pre_action(secondary: i32) -> Self {
        Self::new(Self::PRE_ACTION, secondary)
    }

    pub const fn action_default(secondary: i32) -> Self {
        Self::new(Self::ACTION_DEFAULT, secondary)
    }

    pub const fn post_action(secondary: i32) -> Self {
        Self::new(Self::POST_ACTION, secondary)
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.primary, self.secondary).cmp(&(other.primary, other.secondary))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.primary, self.secondary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_phases_are_ordered() {
        assert!(Priority::pre_action(0) > Priority::action_default(100));
        assert!(Priority::action_default(-100) > Priority::post_action(100));
    }

    #[test]
    fn secondary_breaks_ties() {
        assert!(Priority::new(0, 2) > Priority::new(0, 1));
        assert!(Priority::new(1, -50) > Priority::new(0, 50));
    }
}
