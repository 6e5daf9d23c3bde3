use std::fmt;

use crate::error::{PlatemixError, Result};

const ROW_LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// The name of a well on a plate, e.g. `A1` or `H12`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct WellName(String);

impl WellName {
    /// Wraps an existing well name.
    pub fn new(name: impl Into<String>) -> Self {
        WellName(name.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WellName {
    fn from(name: &str) -> Self {
        WellName::new(name)
    }
}

impl fmt::Display for WellName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Order in which a plate's wells are handed out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WellOrder {
    /// A1, B1, C1, ... then A2, B2, ... (the robot API's well listing order).
    #[default]
    ColumnMajor,

    /// A1, A2, A3, ... then B1, B2, ...
    RowMajor,
}

/// Grid geometry of the destination plate.
///
/// # Example
///
/// ```
/// use platemix_core::{PlateLayout, WellOrder};
///
/// let plate = PlateLayout::new(8, 12, WellOrder::ColumnMajor).unwrap();
/// assert_eq!(plate.capacity(), 96);
/// assert_eq!(plate.well_name(0).unwrap().as_str(), "A1");
/// assert_eq!(plate.well_name(8).unwrap().as_str(), "A2");
/// assert!(plate.well_name(96).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlateLayout {
    rows: usize,
    columns: usize,
    order: WellOrder,
}

impl PlateLayout {
    /// Creates a plate layout.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty grid, more rows than
    /// there are row letters, or a well count that does not fit in a `usize`.
    pub fn new(rows: usize, columns: usize, order: WellOrder) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(PlatemixError::Config(format!(
                "plate must have at least one row and column (got {}x{})",
                rows, columns
            )));
        }
        if rows > ROW_LETTERS.len() {
            return Err(PlatemixError::Config(format!(
                "plate has {} rows, at most {} are addressable",
                rows,
                ROW_LETTERS.len()
            )));
        }
        if rows.checked_mul(columns).is_none() {
            return Err(PlatemixError::Config(format!(
                "plate of {}x{} wells is too large",
                rows, columns
            )));
        }
        Ok(PlateLayout {
            rows,
            columns,
            order,
        })
    }

    /// A standard 8x12 plate listed column by column.
    pub fn standard_96() -> Self {
        PlateLayout {
            rows: 8,
            columns: 12,
            order: WellOrder::ColumnMajor,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn order(&self) -> WellOrder {
        self.order
    }

    /// Total number of wells.
    pub fn capacity(&self) -> usize {
        self.rows * self.columns
    }

    /// Returns the name of the `index`-th well in allocation order.
    pub fn well_name(&self, index: usize) -> Option<WellName> {
        if index >= self.capacity() {
            return None;
        }
        let (row, column) = match self.order {
            WellOrder::ColumnMajor => (index % self.rows, index / self.rows),
            WellOrder::RowMajor => (index / self.columns, index % self.columns),
        };
        let letter = ROW_LETTERS[row] as char;
        Some(WellName(format!("{}{}", letter, column + 1)))
    }
}

/// Hands out destination wells one at a time, never reusing a well.
#[derive(Debug, Clone)]
pub struct WellAllocator {
    layout: PlateLayout,
    next: usize,
}

impl WellAllocator {
    pub fn new(layout: PlateLayout) -> Self {
        WellAllocator { layout, next: 0 }
    }

    /// Returns the next unused well.
    ///
    /// # Errors
    ///
    /// Returns [`PlatemixError::WellsExhausted`] once every well has been
    /// handed out. The allocator does not wrap around.
    pub fn next_well(&mut self) -> Result<WellName> {
        let well = self
            .layout
            .well_name(self.next)
            .ok_or(PlatemixError::WellsExhausted {
                mixture_index: self.next,
                capacity: self.layout.capacity(),
            })?;
        self.next += 1;
        Ok(well)
    }

    /// Number of wells handed out so far.
    pub fn allocated(&self) -> usize {
        self.next
    }

    /// Number of wells still available.
    pub fn remaining(&self) -> usize {
        self.layout.capacity() - self.next
    }

    pub fn layout(&self) -> &PlateLayout {
        &self.layout
    }
}
