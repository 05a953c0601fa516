use slotmap::{new_key_type, SlotMap};

use crate::math::Pose;

new_key_type! {
    /// Handle to a body or surface that owns a collision model.
    pub struct ContactableId;
}

/// Source of current world placements for contactables.
///
/// Implemented by whatever registry owns the bodies; a collision model only
/// keeps a [`ContactableId`] and asks this trait during synchronization.
pub trait PlacementSource {
    /// Returns the current world placement, or `None` if `id` is stale.
    fn placement(&self, id: ContactableId) -> Option<Pose>;
}

/// A body or surface as seen by collision detection.
#[derive(Debug, Clone)]
pub struct ContactableData {
    /// World placement of the body reference frame.
    pub placement: Pose,
}

/// Arena of contactables, keyed by generational handles.
#[derive(Debug, Default)]
pub struct ContactableRegistry {
    items: SlotMap<ContactableId, ContactableData>,
}

impl ContactableRegistry {
    /// Creates a new, empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a contactable at `placement` and returns its handle.
    pub fn add(&mut self, placement: Pose) -> ContactableId {
        self.items.insert(ContactableData { placement })
    }

    /// Removes a contactable. Models still referring to it fail to sync.
    pub fn remove(&mut self, id: ContactableId) -> Option<ContactableData> {
        self.items.remove(id)
    }

    /// Moves a contactable; returns `false` if the handle is stale.
    pub fn set_placement(&mut self, id: ContactableId, placement: Pose) -> bool {
        match self.items.get_mut(id) {
            Some(item) => {
                item.placement = placement;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn get(&self, id: ContactableId) -> Option<&ContactableData> {
        self.items.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl PlacementSource for ContactableRegistry {
    fn placement(&self, id: ContactableId) -> Option<Pose> {
        self.items.get(id).map(|item| item.placement)
    }
}
