//! Outbound "state changed" notification.

use vstat_types::TrackedItem;

/// Receives one notification per item as states are applied.
///
/// Called on the controlling context only, after the item's new state has
/// been stored. Typically refreshes a visual representation.
pub trait StateObserver {
    fn state_changed(&mut self, item: &TrackedItem);
}

impl<F> StateObserver for F
where
    F: FnMut(&TrackedItem),
{
    fn state_changed(&mut self, item: &TrackedItem) {
        self(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vstat_types::ItemState;

    #[test]
    fn closures_are_observers() {
        let mut seen = Vec::new();
        {
            let mut record = |item: &TrackedItem| seen.push(item.state());
            let observer: &mut dyn StateObserver = &mut record;
            observer.state_changed(&TrackedItem::file("a").with_state(ItemState::Added));
        }
        assert_eq!(seen, vec![ItemState::Added]);
    }
}
