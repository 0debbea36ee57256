//! Locker documents and axis bookkeeping.
//!
//! Every locker sits on exactly one axis of the grid: row-axis lockers have
//! `column == 0`, column-axis lockers have `row == 0`. Axis indices start at
//! 1 and are dense.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{DocId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Prefix of every locker document id.
pub const LOCKER_ID_PREFIX: &str = "locker_";

/// Row-axis locker numbers are `ROW_NUMBER_BASE + row`.
pub const ROW_NUMBER_BASE: u32 = 1000;

/// Column-axis locker numbers are `COLUMN_NUMBER_BASE + column`.
pub const COLUMN_NUMBER_BASE: u32 = 1006;

/// Row-axis lockers seeded on first initialization (1001-1006).
pub const INITIAL_ROWS: u32 = 6;

/// Column-axis lockers seeded on first initialization (1007-1016).
pub const INITIAL_COLUMNS: u32 = 10;

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

/// The two mutually exclusive strips of the locker grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Row,
    Column,
}

impl Axis {
    /// Number base used when minting a locker number for this axis.
    pub fn number_base(self) -> u32 {
        match self {
            Self::Row => ROW_NUMBER_BASE,
            Self::Column => COLUMN_NUMBER_BASE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::Column => "column",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Locker
// ---------------------------------------------------------------------------

/// A locker document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Locker {
    pub id: DocId,
    /// Display label, unique across lockers.
    pub number: String,
    #[cfg_attr(feature = "db", sqlx(rename = "row_index"))]
    pub row: i32,
    #[cfg_attr(feature = "db", sqlx(rename = "column_index"))]
    pub column: i32,
    pub is_occupied: bool,
    pub student_id: Option<DocId>,
    pub assigned_at: Option<Timestamp>,
    pub is_broken: bool,
    pub broken_remarks: Option<String>,
}

/// Occupancy half of a locker's state; the broken flag is orthogonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occupancy {
    Available,
    Occupied,
}

/// Build the document id for a locker number.
pub fn locker_id(number: u32) -> DocId {
    format!("{LOCKER_ID_PREFIX}{number}")
}

/// Strip the `locker_` prefix from a locker id, yielding its display number.
pub fn number_from_id(id: &str) -> &str {
    id.strip_prefix(LOCKER_ID_PREFIX).unwrap_or(id)
}

impl Locker {
    /// Build a fresh, unoccupied locker at `index` on `axis`.
    ///
    /// The locker number is `axis.number_base() + index`.
    pub fn on_axis(axis: Axis, index: u32) -> Self {
        let number = axis.number_base() + index;
        let index = index as i32;
        let (row, column) = match axis {
            Axis::Row => (index, 0),
            Axis::Column => (0, index),
        };
        Self {
            id: locker_id(number),
            number: number.to_string(),
            row,
            column,
            is_occupied: false,
            student_id: None,
            assigned_at: None,
            is_broken: false,
            broken_remarks: None,
        }
    }

    /// The axis this locker belongs to, or `None` when the XOR invariant
    /// (`row > 0` xor `column > 0`) does not hold.
    pub fn axis(&self) -> Option<Axis> {
        match (self.row > 0, self.column > 0) {
            (true, false) if self.column == 0 => Some(Axis::Row),
            (false, true) if self.row == 0 => Some(Axis::Column),
            _ => None,
        }
    }

    /// Position on the locker's own axis.
    pub fn axis_index(&self) -> i32 {
        match self.axis() {
            Some(Axis::Row) => self.row,
            Some(Axis::Column) => self.column,
            None => 0,
        }
    }

    /// Numeric value of the display label, if it parses.
    pub fn number_value(&self) -> Option<u64> {
        self.number.trim().parse().ok()
    }

    pub fn occupancy(&self) -> Occupancy {
        if self.is_occupied {
            Occupancy::Occupied
        } else {
            Occupancy::Available
        }
    }
}

/// Order lockers by the numeric value of `number` (`"999"` before `"1000"`).
///
/// Labels that do not parse sort after every numeric label, lexicographically.
pub fn compare_by_number(a: &Locker, b: &Locker) -> Ordering {
    match (a.number_value(), b.number_value()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.number.cmp(&b.number),
    }
}

/// Sort lockers in display order.
pub fn sort_by_number(lockers: &mut [Locker]) {
    lockers.sort_by(compare_by_number);
}

// ---------------------------------------------------------------------------
// Invariant checks
// ---------------------------------------------------------------------------

/// Check the structural invariants of a full locker set.
///
/// - every locker sits on exactly one axis
/// - each axis is the dense sequence `1..=n` with no duplicates
pub fn check_axis_invariants(lockers: &[Locker]) -> Result<(), String> {
    let mut rows = Vec::new();
    let mut columns = Vec::new();

    for locker in lockers {
        match locker.axis() {
            Some(Axis::Row) => rows.push(locker.row),
            Some(Axis::Column) => columns.push(locker.column),
            None => {
                return Err(format!(
                    "locker {} has row={} column={}; exactly one must be nonzero",
                    locker.id, locker.row, locker.column
                ))
            }
        }
    }

    for (axis, mut indices) in [(Axis::Row, rows), (Axis::Column, columns)] {
        indices.sort_unstable();
        for (position, index) in indices.iter().enumerate() {
            let expected = position as i32 + 1;
            if *index != expected {
                return Err(format!(
                    "{axis} axis is not dense: expected index {expected}, found {index}"
                ));
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
