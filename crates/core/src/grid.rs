//! Grid layout engine.
//!
//! Derives the 2-D display matrix from a flat locker set and drives the
//! axis growth / shrink operations against a [`Store`].
//!
//! The layout has one display row per row-axis locker. Column-axis lockers
//! fill the remaining cells column-major: cell `(i, c)` holds
//! `column_axis[c * rows + i]`. Keeping this exact formula means appending a
//! column locker only ever fills the next empty slot, so existing cells never
//! move when an axis grows.

use serde::Serialize;

use crate::error::CoreError;
use crate::locker::{self, Axis, Locker};
use crate::store::Store;
use crate::types::Principal;

// ---------------------------------------------------------------------------
// Partition
// ---------------------------------------------------------------------------

/// Lockers split by axis, each side sorted by axis index ascending.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AxisPartition {
    pub row_axis: Vec<Locker>,
    pub column_axis: Vec<Locker>,
}

impl AxisPartition {
    /// Partition `lockers` into row-axis (`column == 0 && row > 0`) and
    /// column-axis (`row == 0 && column > 0`). Lockers on neither axis are
    /// dropped from the layout.
    pub fn from_lockers(lockers: &[Locker]) -> Self {
        let mut row_axis: Vec<Locker> = lockers
            .iter()
            .filter(|l| l.axis() == Some(Axis::Row))
            .cloned()
            .collect();
        let mut column_axis: Vec<Locker> = lockers
            .iter()
            .filter(|l| l.axis() == Some(Axis::Column))
            .cloned()
            .collect();

        row_axis.sort_by(|a, b| a.row.cmp(&b.row).then_with(|| locker::compare_by_number(a, b)));
        column_axis.sort_by(|a, b| {
            a.column
                .cmp(&b.column)
                .then_with(|| locker::compare_by_number(a, b))
        });

        Self {
            row_axis,
            column_axis,
        }
    }

    pub fn axis(&self, axis: Axis) -> &[Locker] {
        match axis {
            Axis::Row => &self.row_axis,
            Axis::Column => &self.column_axis,
        }
    }

    /// The locker with the greatest index on `axis`.
    pub fn terminal(&self, axis: Axis) -> Option<&Locker> {
        self.axis(axis).iter().max_by_key(|l| l.axis_index())
    }

    /// `max(index) + 1` on `axis`, or 1 for an empty axis.
    pub fn next_index(&self, axis: Axis) -> u32 {
        self.terminal(axis)
            .map(|l| l.axis_index().max(0) as u32 + 1)
            .unwrap_or(1)
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// One cell of the column-axis area. Absent lockers render as placeholders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "locker", rename_all = "snake_case")]
pub enum GridCell {
    Locker(Locker),
    Empty,
}

impl GridCell {
    pub fn locker(&self) -> Option<&Locker> {
        match self {
            Self::Locker(l) => Some(l),
            Self::Empty => None,
        }
    }
}

/// A display row: the row-axis locker followed by its column-axis cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRow {
    pub row_locker: Locker,
    pub cells: Vec<GridCell>,
}

/// The rectangular display matrix.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GridLayout {
    /// Number of column-axis slots per display row.
    pub columns_per_row: usize,
    pub rows: Vec<GridRow>,
}

impl GridLayout {
    /// Compute the layout for the full locker set.
    ///
    /// Yields an empty layout when there are no row-axis lockers.
    pub fn compute(lockers: &[Locker]) -> Self {
        let partition = AxisPartition::from_lockers(lockers);
        Self::from_partition(&partition)
    }

    pub fn from_partition(partition: &AxisPartition) -> Self {
        let row_count = partition.row_axis.len();
        if row_count == 0 {
            return Self::default();
        }

        let columns_per_row = partition.column_axis.len().div_ceil(row_count);

        let rows = partition
            .row_axis
            .iter()
            .enumerate()
            .map(|(i, row_locker)| {
                let cells = (0..columns_per_row)
                    .map(|c| match partition.column_axis.get(c * row_count + i) {
                        Some(l) => GridCell::Locker(l.clone()),
                        None => GridCell::Empty,
                    })
                    .collect();
                GridRow {
                    row_locker: row_locker.clone(),
                    cells,
                }
            })
            .collect();

        Self {
            columns_per_row,
            rows,
        }
    }

    /// Cell at display row `row`, column-axis slot `col`.
    pub fn cell(&self, row: usize, col: usize) -> Option<&GridCell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }
}

// ---------------------------------------------------------------------------
// Planning (pure)
// ---------------------------------------------------------------------------

/// Lockers written on first initialization: rows 1001-1006, columns 1007-1016.
pub fn initial_seed() -> Vec<Locker> {
    (1..=locker::INITIAL_ROWS)
        .map(|i| Locker::on_axis(Axis::Row, i))
        .chain((1..=locker::INITIAL_COLUMNS).map(|i| Locker::on_axis(Axis::Column, i)))
        .collect()
}

/// The locker `grow(axis)` would create.
pub fn plan_growth(lockers: &[Locker], axis: Axis) -> Locker {
    let partition = AxisPartition::from_lockers(lockers);
    Locker::on_axis(axis, partition.next_index(axis))
}

/// The locker `shrink(axis)` would delete.
///
/// Rejects before any write is attempted:
/// - [`CoreError::LastElement`] when the axis holds one locker or none
/// - [`CoreError::OccupiedAxisElement`] when the terminal locker is occupied
pub fn plan_shrink(lockers: &[Locker], axis: Axis) -> Result<Locker, CoreError> {
    let partition = AxisPartition::from_lockers(lockers);
    if partition.axis(axis).len() <= 1 {
        return Err(CoreError::LastElement { axis });
    }
    let terminal = partition
        .terminal(axis)
        .cloned()
        .ok_or(CoreError::LastElement { axis })?;
    if terminal.is_occupied {
        return Err(CoreError::OccupiedAxisElement {
            locker_id: terminal.id,
        });
    }
    Ok(terminal)
}

// ---------------------------------------------------------------------------
// Store-backed operations
// ---------------------------------------------------------------------------

/// Summary of a seeding pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InitReport {
    pub created: Vec<String>,
    pub existing: usize,
    pub failed: Vec<String>,
}

/// Seed the initial grid, never overwriting an existing locker.
///
/// Without a signed-in principal nothing is written. A failure on one
/// locker is logged and does not stop the remaining writes.
pub async fn initialize(
    store: &dyn Store,
    principal: Option<&Principal>,
) -> Result<InitReport, CoreError> {
    let Some(principal) = principal else {
        tracing::debug!("No signed-in principal, skipping locker initialization");
        return Ok(InitReport::default());
    };

    let mut report = InitReport::default();
    for locker in initial_seed() {
        match store.insert_locker_if_absent(&locker).await {
            Ok(true) => report.created.push(locker.id),
            Ok(false) => report.existing += 1,
            Err(e) => {
                tracing::error!(locker_id = %locker.id, error = %e, "Failed to seed locker");
                report.failed.push(locker.id);
            }
        }
    }

    tracing::info!(
        principal = %principal.id,
        created = report.created.len(),
        existing = report.existing,
        failed = report.failed.len(),
        "Locker grid initialized",
    );
    Ok(report)
}

/// Outcome of an axis growth request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Growth {
    pub locker: Locker,
    /// `false` when an identical locker already existed (idempotent retry).
    pub created: bool,
}

/// Append one locker to `axis`.
///
/// Creation is conditional on the id being absent. If the id is already
/// taken by a locker on the other axis the number ranges collide and the
/// request is rejected with [`CoreError::Conflict`] instead of clobbering it.
pub async fn grow(store: &dyn Store, axis: Axis) -> Result<Growth, CoreError> {
    let lockers = store.list_lockers().await?;
    let planned = plan_growth(&lockers, axis);

    if store.insert_locker_if_absent(&planned).await? {
        tracing::info!(locker_id = %planned.id, %axis, "Axis grown");
        return Ok(Growth {
            locker: planned,
            created: true,
        });
    }

    let existing = store
        .get_locker(&planned.id)
        .await?
        .ok_or_else(|| CoreError::Internal(format!("locker {} vanished", planned.id)))?;

    if existing.axis() == Some(axis) && existing.axis_index() == planned.axis_index() {
        Ok(Growth {
            locker: existing,
            created: false,
        })
    } else {
        Err(CoreError::Conflict(format!(
            "Locker number {} is already used by another {} locker",
            existing.number,
            existing.axis().map(Axis::as_str).unwrap_or("unplaced"),
        )))
    }
}

/// Remove the terminal locker of `axis`.
///
/// The vacancy check is repeated at write time so a concurrent assignment
/// cannot be deleted out from under its student.
pub async fn shrink(store: &dyn Store, axis: Axis) -> Result<Locker, CoreError> {
    let lockers = store.list_lockers().await?;
    let target = plan_shrink(&lockers, axis)?;

    if !store.delete_locker_if_vacant(&target.id).await? {
        return match store.get_locker(&target.id).await? {
            Some(current) if current.is_occupied => Err(CoreError::OccupiedAxisElement {
                locker_id: current.id,
            }),
            _ => Err(CoreError::NotFound {
                entity: "Locker",
                id: target.id,
            }),
        };
    }

    tracing::info!(locker_id = %target.id, %axis, "Axis shrunk");
    Ok(target)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::locker::check_axis_invariants;
    use crate::store::memory::MemoryStore;

    fn principal() -> Principal {
        Principal {
            id: "admin".into(),
            role: "admin".into(),
        }
    }

    fn grid(rows: u32, columns: u32) -> Vec<Locker> {
        (1..=rows)
            .map(|i| Locker::on_axis(Axis::Row, i))
            .chain((1..=columns).map(|i| Locker::on_axis(Axis::Column, i)))
            .collect()
    }

    #[test]
    fn seed_is_six_rows_and_ten_columns() {
        let seed = initial_seed();
        let numbers: Vec<&str> = seed.iter().map(|l| l.number.as_str()).collect();
        assert_eq!(seed.len(), 16);
        assert_eq!(numbers.first(), Some(&"1001"));
        assert_eq!(numbers.last(), Some(&"1016"));
        assert!(check_axis_invariants(&seed).is_ok());
    }

    #[test]
    fn layout_dimensions() {
        let layout = GridLayout::compute(&initial_seed());
        assert_eq!(layout.rows.len(), 6);
        // ceil(10 / 6) = 2
        assert_eq!(layout.columns_per_row, 2);
    }

    #[test]
    fn layout_fills_column_major() {
        let layout = GridLayout::compute(&initial_seed());
        // (i, c) -> column_axis[c * 6 + i]
        assert_eq!(layout.cell(0, 0).and_then(GridCell::locker).unwrap().column, 1);
        assert_eq!(layout.cell(5, 0).and_then(GridCell::locker).unwrap().column, 6);
        assert_eq!(layout.cell(0, 1).and_then(GridCell::locker).unwrap().column, 7);
        assert_eq!(layout.cell(3, 1).and_then(GridCell::locker).unwrap().column, 10);
        assert_eq!(layout.cell(4, 1), Some(&GridCell::Empty));
        assert_eq!(layout.cell(5, 1), Some(&GridCell::Empty));
    }

    #[test]
    fn appending_a_column_keeps_existing_cells() {
        let before = GridLayout::compute(&grid(6, 10));
        let after = GridLayout::compute(&grid(6, 11));
        for row in 0..6 {
            for col in 0..before.columns_per_row {
                if let Some(GridCell::Locker(l)) = before.cell(row, col) {
                    assert_eq!(after.cell(row, col).and_then(GridCell::locker), Some(l));
                }
            }
        }
        assert_eq!(after.cell(4, 1).and_then(GridCell::locker).unwrap().column, 11);
    }

    #[test]
    fn layout_without_row_lockers_is_empty() {
        let lockers: Vec<Locker> = (1..=3).map(|i| Locker::on_axis(Axis::Column, i)).collect();
        let layout = GridLayout::compute(&lockers);
        assert!(layout.rows.is_empty());
        assert_eq!(layout.columns_per_row, 0);
    }

    #[test]
    fn partition_sorts_by_axis_index() {
        let mut lockers = grid(3, 3);
        lockers.reverse();
        let partition = AxisPartition::from_lockers(&lockers);
        let rows: Vec<i32> = partition.row_axis.iter().map(|l| l.row).collect();
        let cols: Vec<i32> = partition.column_axis.iter().map(|l| l.column).collect();
        assert_eq!(rows, vec![1, 2, 3]);
        assert_eq!(cols, vec![1, 2, 3]);
    }

    #[test]
    fn growth_plan_uses_axis_base() {
        assert_eq!(plan_growth(&grid(6, 10), Axis::Column).number, "1017");
        assert_eq!(plan_growth(&grid(3, 0), Axis::Row).number, "1004");
        assert_eq!(plan_growth(&[], Axis::Row).number, "1001");
    }

    #[test]
    fn shrink_plan_rejects_last_element() {
        assert_matches!(
            plan_shrink(&grid(1, 3), Axis::Row),
            Err(CoreError::LastElement { axis: Axis::Row })
        );
        assert_matches!(
            plan_shrink(&grid(2, 0), Axis::Column),
            Err(CoreError::LastElement { axis: Axis::Column })
        );
    }

    #[test]
    fn shrink_plan_rejects_occupied_terminal() {
        let mut lockers = grid(2, 3);
        lockers[4].is_occupied = true;
        assert_matches!(
            plan_shrink(&lockers, Axis::Column),
            Err(CoreError::OccupiedAxisElement { locker_id }) if locker_id == "locker_1009"
        );
    }

    #[tokio::test]
    async fn initialize_without_principal_writes_nothing() {
        let store = MemoryStore::new();
        let report = initialize(&store, None).await.unwrap();
        assert_eq!(report, InitReport::default());
        assert!(store.list_lockers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn initialize_does_not_overwrite_existing() {
        let store = MemoryStore::new();
        let mut occupied = Locker::on_axis(Axis::Row, 3);
        occupied.is_occupied = true;
        occupied.student_id = Some("resp-1".into());
        store.insert_locker_if_absent(&occupied).await.unwrap();

        let report = initialize(&store, Some(&principal())).await.unwrap();
        assert_eq!(report.created.len(), 15);
        assert_eq!(report.existing, 1);

        let kept = store.get_locker("locker_1003").await.unwrap().unwrap();
        assert!(kept.is_occupied);
        assert_eq!(kept.student_id.as_deref(), Some("resp-1"));

        let again = initialize(&store, Some(&principal())).await.unwrap();
        assert!(again.created.is_empty());
        assert_eq!(again.existing, 16);
    }

    #[tokio::test]
    async fn grow_and_shrink_column_keep_invariants() {
        let store = MemoryStore::new();
        initialize(&store, Some(&principal())).await.unwrap();

        let growth = grow(&store, Axis::Column).await.unwrap();
        assert!(growth.created);
        assert_eq!(growth.locker.id, "locker_1017");
        assert!(check_axis_invariants(&store.list_lockers().await.unwrap()).is_ok());

        let removed = shrink(&store, Axis::Column).await.unwrap();
        assert_eq!(removed.id, "locker_1017");
        let lockers = store.list_lockers().await.unwrap();
        assert_eq!(lockers.len(), 16);
        assert!(check_axis_invariants(&lockers).is_ok());
    }

    #[tokio::test]
    async fn grow_row_collides_with_seeded_column() {
        let store = MemoryStore::new();
        initialize(&store, Some(&principal())).await.unwrap();

        // Row 7 would be number 1007, which column 1 already holds.
        assert_matches!(grow(&store, Axis::Row).await, Err(CoreError::Conflict(_)));
        let column_one = store.get_locker("locker_1007").await.unwrap().unwrap();
        assert_eq!(column_one.axis(), Some(Axis::Column));
    }

    #[tokio::test]
    async fn shrink_last_row_leaves_set_unchanged() {
        let store = MemoryStore::new();
        store
            .insert_locker_if_absent(&Locker::on_axis(Axis::Row, 1))
            .await
            .unwrap();
        let before = store.list_lockers().await.unwrap();

        assert_matches!(
            shrink(&store, Axis::Row).await,
            Err(CoreError::LastElement { axis: Axis::Row })
        );
        assert_eq!(store.list_lockers().await.unwrap(), before);
    }

    #[tokio::test]
    async fn shrink_occupied_terminal_leaves_set_unchanged() {
        let store = MemoryStore::new();
        initialize(&store, Some(&principal())).await.unwrap();
        store
            .occupy_locker("locker_1006", "resp-9", chrono::Utc::now())
            .await
            .unwrap();
        let before = store.list_lockers().await.unwrap();

        assert_matches!(
            shrink(&store, Axis::Row).await,
            Err(CoreError::OccupiedAxisElement { locker_id }) if locker_id == "locker_1006"
        );
        assert_eq!(store.list_lockers().await.unwrap(), before);
    }
}
