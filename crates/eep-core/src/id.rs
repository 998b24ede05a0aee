use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a GUI element in the [`Gui`](crate::gui::Gui) arena.
    ///
    /// Keys are generational: once an element is destroyed its key never
    /// resolves again, which is what widget validity checks rely on.
    pub struct ElementId;
}

/// Identifies a connected player session. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

/// Game tick counter.
pub type Tick = u64;

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn player_id_equality() {
        assert_eq!(PlayerId(1), PlayerId(1));
        assert_ne!(PlayerId(1), PlayerId(2));
    }

    #[test]
    fn removed_element_key_does_not_resolve() {
        let mut sm = SlotMap::<ElementId, ()>::with_key();
        let a = sm.insert(());
        sm.remove(a);
        let b = sm.insert(());
        assert_ne!(a, b);
        assert!(!sm.contains_key(a));
    }
}
