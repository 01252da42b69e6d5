//! Identity types for the block graph.
//!
//! Both IDs are newtypes over `u32` that serve as direct indices into the
//! graph's storage vectors, providing O(1) lookup. An `ObserverId` held by a
//! node is the non-owning observer reference: the observer itself lives in the
//! graph's registry.

use std::fmt;

/// Index into the graph's node registry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const INVALID: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "NodeId(INVALID)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Index into the graph's observer registry.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub u32);

impl ObserverId {
    pub const INVALID: ObserverId = ObserverId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::INVALID
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "ObserverId(INVALID)")
        } else {
            write!(f, "ObserverId({})", self.0)
        }
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId(42);
        assert!(id.is_valid());
        assert_eq!(id.index(), 42);
        assert!(!NodeId::INVALID.is_valid());
    }

    #[test]
    fn test_observer_id() {
        let id = ObserverId(3);
        assert!(id.is_valid());
        assert_eq!(id.index(), 3);
        assert!(!ObserverId::INVALID.is_valid());
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", NodeId(7)), "NodeId(7)");
        assert_eq!(format!("{}", ObserverId::INVALID), "ObserverId(INVALID)");
    }
}
