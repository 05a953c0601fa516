use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// Number of collision families.
pub const NUM_FAMILIES: i32 = 16;

/// Family membership and mask of one collision model.
///
/// A model belongs to exactly one of 16 families (`group` has a single bit
/// set) and lists in `mask` the families it accepts contacts with. Two models
/// may collide only if each one's mask admits the other's family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFilter")]
pub struct CollisionFilter {
    group: u16,
    mask: u16,
}

#[derive(Deserialize)]
struct RawFilter {
    group: u16,
    mask: u16,
}

impl TryFrom<RawFilter> for CollisionFilter {
    type Error = FilterError;

    fn try_from(raw: RawFilter) -> Result<Self, Self::Error> {
        Self::new(raw.group, raw.mask)
    }
}

impl Default for CollisionFilter {
    /// Family 0, colliding with every family.
    fn default() -> Self {
        Self {
            group: 1,
            mask: u16::MAX,
        }
    }
}

fn family_bit(family: i32) -> Result<u16, FilterError> {
    if (0..NUM_FAMILIES).contains(&family) {
        Ok(1 << family)
    } else {
        Err(FilterError::FamilyOutOfRange(family))
    }
}

impl CollisionFilter {
    /// Creates a filter from raw group and mask values.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::GroupNotSingleBit`] if `group` is not a power of two.
    pub fn new(group: u16, mask: u16) -> Result<Self, FilterError> {
        let mut filter = Self::default();
        filter.set_group(group)?;
        filter.mask = mask;
        Ok(filter)
    }

    /// Raw group value; the family is the position of its single set bit.
    #[must_use]
    pub fn group(&self) -> u16 {
        self.group
    }

    #[must_use]
    pub fn mask(&self) -> u16 {
        self.mask
    }

    /// Returns the family index in `[0, 15]`.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn family(&self) -> i32 {
        // Single bit set, so the index is below 16.
        self.group.trailing_zeros() as i32
    }

    /// Moves the model into `family`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::FamilyOutOfRange`] outside `[0, 15]`.
    pub fn set_family(&mut self, family: i32) -> Result<(), FilterError> {
        self.group = family_bit(family)?;
        Ok(())
    }

    /// Sets the raw group value.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::GroupNotSingleBit`] if `group` is not a power of two.
    pub fn set_group(&mut self, group: u16) -> Result<(), FilterError> {
        if !group.is_power_of_two() {
            return Err(FilterError::GroupNotSingleBit(group));
        }
        self.group = group;
        Ok(())
    }

    pub fn set_mask(&mut self, mask: u16) {
        self.mask = mask;
    }

    /// Allows contacts with models of `family`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::FamilyOutOfRange`] outside `[0, 15]`.
    pub fn do_collision_with_family(&mut self, family: i32) -> Result<(), FilterError> {
        self.mask |= family_bit(family)?;
        Ok(())
    }

    /// Suppresses contacts with models of `family`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::FamilyOutOfRange`] outside `[0, 15]`.
    pub fn no_collision_with_family(&mut self, family: i32) -> Result<(), FilterError> {
        self.mask &= !family_bit(family)?;
        Ok(())
    }

    /// Returns `true` if the mask admits `family`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::FamilyOutOfRange`] outside `[0, 15]`.
    pub fn does_collision_with_family(&self, family: i32) -> Result<bool, FilterError> {
        Ok(self.mask & family_bit(family)? != 0)
    }

    /// Symmetric pairwise check: each side must admit the other's family.
    #[must_use]
    pub fn can_collide(&self, other: &Self) -> bool {
        (self.mask & other.group) != 0 && (other.mask & self.group) != 0
    }
}
