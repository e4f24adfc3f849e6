use std::collections::HashMap;
use tabgate_api::message::{Activated, Attached, Detached, Moved, Removed, TabEvent, Updated};
use tabgate_api::tab::{Tab, TabId};
use thiserror::Error;

/// The gateway's in-memory mirror of browser tab state, and the
/// authoritative copy for locally-served reads.  Mutated only by the
/// dispatcher task: seeded once from the browser's initial tab list, then
/// patched by events in arrival order.
#[derive(Debug, Default)]
pub struct TabStore {
    open: HashMap<TabId, Tab>,
    closed: Vec<Tab>,
}

impl TabStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the open set from the browser's initial `list` response.
    pub fn seed(&mut self, tabs: Vec<Tab>) {
        self.open = tabs.into_iter().map(|tab| (tab.id, tab)).collect();
    }

    pub fn get(&self, id: TabId) -> Result<&Tab, TabStoreError> {
        self.open.get(&id).ok_or(TabStoreError::TabNotFound(id))
    }

    fn get_mut(&mut self, id: TabId) -> Result<&mut Tab, TabStoreError> {
        self.open.get_mut(&id).ok_or(TabStoreError::TabNotFound(id))
    }

    /// Snapshot of the open tabs.  Order is unspecified, but stable within
    /// one call.
    pub fn tabs(&self) -> impl Iterator<Item = &Tab> {
        self.open.values()
    }

    /// Tabs that have been removed, in close order.
    pub fn closed(&self) -> &[Tab] {
        &self.closed
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn apply(&mut self, event: &TabEvent) -> Result<(), TabStoreError> {
        event.apply(self)
    }
}

/// One event's transition on the tab store.  Implemented per payload, so
/// adding an event variant is a local change.
pub trait StoreEvent {
    fn apply(&self, store: &mut TabStore) -> Result<(), TabStoreError>;
}

impl StoreEvent for TabEvent {
    fn apply(&self, store: &mut TabStore) -> Result<(), TabStoreError> {
        match self {
            TabEvent::Created(tab) => tab.apply(store),
            TabEvent::Activated(activated) => activated.apply(store),
            TabEvent::Updated(updated) => updated.apply(store),
            TabEvent::Moved(moved) => moved.apply(store),
            TabEvent::Removed(removed) => removed.apply(store),
            TabEvent::Attached(attached) => attached.apply(store),
            TabEvent::Detached(detached) => detached.apply(store),
        }
    }
}

/// A `created` event carries the full tab record.
impl StoreEvent for Tab {
    fn apply(&self, store: &mut TabStore) -> Result<(), TabStoreError> {
        if store.open.contains_key(&self.id) {
            return Err(TabStoreError::Duplicate(self.id));
        }

        store.open.insert(self.id, self.clone());
        Ok(())
    }
}

impl StoreEvent for Activated {
    fn apply(&self, store: &mut TabStore) -> Result<(), TabStoreError> {
        // the previously active tab may already be closed; that's not an error
        if let Some(previous) = self.previous {
            if let Ok(tab) = store.get_mut(previous) {
                tab.active = false;
            }
        }

        let tab = store.get_mut(self.tab_id)?;
        tab.active = true;

        Ok(())
    }
}

impl StoreEvent for Updated {
    fn apply(&self, store: &mut TabStore) -> Result<(), TabStoreError> {
        let tab = store.get_mut(self.tab_id)?;
        let delta = &self.delta;

        if let Some(attention) = delta.attention {
            tab.attention = attention;
        }
        if let Some(audible) = delta.audible {
            tab.audible = audible;
        }
        if let Some(discarded) = delta.discarded {
            tab.discarded = discarded;
        }
        if let Some(ref fav_icon_url) = delta.fav_icon_url {
            tab.fav_icon_url = Some(fav_icon_url.clone());
        }
        if let Some(hidden) = delta.hidden {
            tab.hidden = hidden;
        }
        if let Some(is_article) = delta.is_article {
            tab.is_article = is_article;
        }
        if let Some(ref muted_info) = delta.muted_info {
            tab.muted_info = Some(muted_info.clone());
        }
        if let Some(pinned) = delta.pinned {
            tab.pinned = pinned;
        }
        if let Some(ref sharing_state) = delta.sharing_state {
            tab.sharing_state = Some(sharing_state.clone());
        }
        if let Some(ref status) = delta.status {
            tab.status = status.clone();
        }
        if let Some(ref title) = delta.title {
            tab.title = title.clone();
        }
        if let Some(ref url) = delta.url {
            tab.url = url.clone();
        }

        Ok(())
    }
}

impl StoreEvent for Moved {
    fn apply(&self, store: &mut TabStore) -> Result<(), TabStoreError> {
        // siblings are not reshuffled; the browser is the index authority
        // and its next event corrects any drift
        let tab = store.get_mut(self.tab_id)?;
        tab.index = self.to_index;

        Ok(())
    }
}

impl StoreEvent for Removed {
    fn apply(&self, store: &mut TabStore) -> Result<(), TabStoreError> {
        let tab = store
            .open
            .remove(&self.tab_id)
            .ok_or(TabStoreError::TabNotFound(self.tab_id))?;
        store.closed.push(tab);

        Ok(())
    }
}

impl StoreEvent for Attached {
    fn apply(&self, store: &mut TabStore) -> Result<(), TabStoreError> {
        let tab = store.get_mut(self.tab_id)?;
        tab.window_id = self.window_id;
        tab.index = self.position;

        Ok(())
    }
}

impl StoreEvent for Detached {
    fn apply(&self, store: &mut TabStore) -> Result<(), TabStoreError> {
        let tab = store.get_mut(self.tab_id)?;
        tab.window_id = self.window_id;
        tab.index = self.position;

        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TabStoreError {
    #[error("tab {0} not found")]
    TabNotFound(TabId),
    #[error("tab {0} already exists")]
    Duplicate(TabId),
}

#[cfg(test)]
mod tests {
    use super::{TabStore, TabStoreError};
    use tabgate_api::message::{Activated, Attached, Detached, Moved, Removed, TabEvent, Updated};
    use tabgate_api::tab::{Tab, TabDelta, TabId};

    fn tab_id(id: u32) -> TabId {
        TabId::new(id).expect("nonzero id")
    }

    fn tab(id: u32) -> Tab {
        let mut tab = Tab::new(tab_id(id));
        tab.window_id = 10;
        tab.index = id - 1;
        tab.url = format!("https://example.com/{}", id);
        tab.title = format!("Tab {}", id);
        tab
    }

    fn store_with(ids: &[u32]) -> TabStore {
        let mut store = TabStore::new();
        store.seed(ids.iter().map(|id| tab(*id)).collect());
        store
    }

    #[test]
    fn seed_replaces_open_tabs() {
        let mut store = store_with(&[1, 2]);
        assert_eq!(2, store.len());

        store.seed(vec![tab(3)]);
        assert_eq!(1, store.len());
        assert!(store.get(tab_id(1)).is_err());
        assert!(store.get(tab_id(3)).is_ok());
    }

    #[test]
    fn created_inserts() {
        let mut store = store_with(&[1]);

        store
            .apply(&TabEvent::Created(tab(2)))
            .expect("create should insert");

        assert_eq!("https://example.com/2", store.get(tab_id(2)).unwrap().url);
    }

    #[test]
    fn created_duplicate_fails() {
        let mut store = store_with(&[1]);

        let result = store.apply(&TabEvent::Created(tab(1)));
        assert_eq!(Err(TabStoreError::Duplicate(tab_id(1))), result);
    }

    #[test]
    fn activated_sets_active_and_clears_previous() {
        let mut store = store_with(&[1, 2]);
        store
            .apply(&TabEvent::Activated(Activated {
                tab_id: tab_id(1),
                previous: None,
                window_id: 10,
            }))
            .expect("first activation");

        store
            .apply(&TabEvent::Activated(Activated {
                tab_id: tab_id(2),
                previous: Some(tab_id(1)),
                window_id: 10,
            }))
            .expect("second activation");

        assert!(!store.get(tab_id(1)).unwrap().active);
        assert!(store.get(tab_id(2)).unwrap().active);
    }

    #[test]
    fn activated_missing_previous_is_silent() {
        let mut store = store_with(&[1]);

        store
            .apply(&TabEvent::Activated(Activated {
                tab_id: tab_id(1),
                previous: Some(tab_id(9)),
                window_id: 10,
            }))
            .expect("missing previous tab is skipped");

        assert!(store.get(tab_id(1)).unwrap().active);
    }

    #[test]
    fn activated_unknown_target_fails() {
        let mut store = store_with(&[1]);

        let result = store.apply(&TabEvent::Activated(Activated {
            tab_id: tab_id(9),
            previous: Some(tab_id(1)),
            window_id: 10,
        }));

        assert_eq!(Err(TabStoreError::TabNotFound(tab_id(9))), result);
    }

    #[test]
    fn updated_overwrites_present_fields_only() {
        let mut store = store_with(&[1]);

        store
            .apply(&TabEvent::Updated(Updated {
                tab_id: tab_id(1),
                delta: TabDelta {
                    title: Some("New".into()),
                    pinned: Some(true),
                    ..TabDelta::default()
                },
            }))
            .expect("update should apply");

        let tab = store.get(tab_id(1)).unwrap();
        assert_eq!("New", tab.title);
        assert!(tab.pinned);
        assert_eq!("https://example.com/1", tab.url);
    }

    #[test]
    fn updated_unknown_fails() {
        let mut store = store_with(&[1]);

        let result = store.apply(&TabEvent::Updated(Updated {
            tab_id: tab_id(9),
            delta: TabDelta::default(),
        }));

        assert_eq!(Err(TabStoreError::TabNotFound(tab_id(9))), result);
    }

    #[test]
    fn moved_sets_index_and_leaves_siblings() {
        let mut store = store_with(&[1, 2]);

        store
            .apply(&TabEvent::Moved(Moved {
                tab_id: tab_id(1),
                window_id: 10,
                from_index: 0,
                to_index: 5,
            }))
            .expect("move should apply");

        assert_eq!(5, store.get(tab_id(1)).unwrap().index);
        assert_eq!(1, store.get(tab_id(2)).unwrap().index);
    }

    #[test]
    fn removed_moves_tab_to_closed() {
        let mut store = store_with(&[1, 2]);

        store
            .apply(&TabEvent::Removed(Removed {
                tab_id: tab_id(1),
                window_id: 10,
                is_window_closing: false,
            }))
            .expect("remove should apply");
        store
            .apply(&TabEvent::Removed(Removed {
                tab_id: tab_id(2),
                window_id: 10,
                is_window_closing: true,
            }))
            .expect("remove should apply");

        assert!(store.is_empty());
        assert_eq!(Err(TabStoreError::TabNotFound(tab_id(1))), store.get(tab_id(1)).map(|_| ()));

        // close order is preserved
        let closed: Vec<u32> = store.closed().iter().map(|tab| tab.id.0.get()).collect();
        assert_eq!(vec![1, 2], closed);
    }

    #[test]
    fn removed_unknown_fails() {
        let mut store = store_with(&[1]);

        let result = store.apply(&TabEvent::Removed(Removed {
            tab_id: tab_id(9),
            window_id: 10,
            is_window_closing: false,
        }));

        assert_eq!(Err(TabStoreError::TabNotFound(tab_id(9))), result);
    }

    #[test]
    fn attached_sets_window_and_index_together() {
        let mut store = store_with(&[1]);

        store
            .apply(&TabEvent::Attached(Attached {
                tab_id: tab_id(1),
                window_id: 11,
                position: 4,
            }))
            .expect("attach should apply");

        let tab = store.get(tab_id(1)).unwrap();
        assert_eq!(11, tab.window_id);
        assert_eq!(4, tab.index);
    }

    #[test]
    fn detached_sets_window_and_index_together() {
        let mut store = store_with(&[1]);

        store
            .apply(&TabEvent::Detached(Detached {
                tab_id: tab_id(1),
                window_id: 0,
                position: 0,
            }))
            .expect("detach should apply");

        let tab = store.get(tab_id(1)).unwrap();
        assert_eq!(0, tab.window_id);
        assert_eq!(0, tab.index);
    }
}
