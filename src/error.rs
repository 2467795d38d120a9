use core::fmt;

/// A bounded bit-queue operation asked for more bits than the queue could provide.
///
/// For pushes, `available` is the free space; for indexed reads it is the number of stored
/// bits from the requested offset onwards.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CapacityError {
    pub requested: usize,
    pub available: usize,
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "requested {} bits but only {} available",
            self.requested, self.available
        )
    }
}

impl core::error::Error for CapacityError {}
