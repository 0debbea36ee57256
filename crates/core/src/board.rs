//! The live locker board.
//!
//! [`LockerBoard`] holds the latest snapshot of each collection the board
//! depends on, one slot per collection. Every slot is replaced wholesale and
//! [`LockerBoard::view`] recomputes the whole [`BoardView`] from the slots,
//! so snapshots may arrive in any order.

use std::collections::HashMap;

use serde::Serialize;

use crate::assignment::Assignment;
use crate::grid::GridLayout;
use crate::locker::{self, Locker, Occupancy};
use crate::store::{Collection, Snapshot};
use crate::student::Response;
use crate::types::DocId;

/// Who holds a locker, as resolved from its assignment and registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occupant {
    pub student_id: DocId,
    pub name: String,
    pub school_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LockerTile {
    pub locker_id: DocId,
    pub number: String,
    pub status: Occupancy,
    pub is_broken: bool,
    pub broken_remarks: Option<String>,
    pub assignment_id: Option<DocId>,
    /// `None` when no assignment exists or its registration is gone.
    pub occupant: Option<Occupant>,
    pub signed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OccupancySummary {
    pub total: usize,
    pub occupied: usize,
    pub available: usize,
    pub broken: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoardView {
    /// `false` until lockers and assignments have both been received.
    pub loaded: bool,
    pub layout: GridLayout,
    /// One tile per locker, in display order.
    pub tiles: Vec<LockerTile>,
    pub summary: OccupancySummary,
}

#[derive(Debug, Clone, Default)]
pub struct LockerBoard {
    lockers: Option<Vec<Locker>>,
    assignments: Option<Vec<Assignment>>,
    responses: Option<Vec<Response>>,
}

impl LockerBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collections the board is derived from.
    pub const SOURCES: [Collection; 3] = [
        Collection::Lockers,
        Collection::Assignments,
        Collection::Responses,
    ];

    /// Replace the slot for the snapshot's collection. Returns `false` for
    /// collections the board does not track.
    pub fn apply(&mut self, snapshot: Snapshot) -> bool {
        match snapshot {
            Snapshot::Lockers(l) => self.lockers = Some(l),
            Snapshot::Assignments(a) => self.assignments = Some(a),
            Snapshot::Responses(r) => self.responses = Some(r),
            Snapshot::Forms(_) | Snapshot::Signatures(_) => return false,
        }
        true
    }

    pub fn is_loaded(&self) -> bool {
        self.lockers.is_some() && self.assignments.is_some()
    }

    pub fn view(&self) -> BoardView {
        let empty_lockers = Vec::new();
        let empty_assignments = Vec::new();
        let empty_responses = Vec::new();
        let lockers = self.lockers.as_ref().unwrap_or(&empty_lockers);
        let assignments = self.assignments.as_ref().unwrap_or(&empty_assignments);
        let responses = self.responses.as_ref().unwrap_or(&empty_responses);
        compute_view(self.is_loaded(), lockers, assignments, responses)
    }
}

/// Derive the board from full collection contents.
pub fn compute_view(
    loaded: bool,
    lockers: &[Locker],
    assignments: &[Assignment],
    responses: &[Response],
) -> BoardView {
    let by_locker: HashMap<&str, &Assignment> = assignments
        .iter()
        .map(|a| (a.locker_id.as_str(), a))
        .collect();
    let by_id: HashMap<&str, &Response> = responses.iter().map(|r| (r.id.as_str(), r)).collect();

    let mut sorted = lockers.to_vec();
    locker::sort_by_number(&mut sorted);

    let tiles: Vec<LockerTile> = sorted
        .iter()
        .map(|l| {
            let assignment = by_locker.get(l.id.as_str()).copied();
            let occupant = assignment
                .and_then(|a| by_id.get(a.student_id.as_str()))
                .map(|r| Occupant {
                    student_id: r.id.clone(),
                    name: r.student_data.name.clone(),
                    school_number: r.student_data.school_number.clone(),
                });
            LockerTile {
                locker_id: l.id.clone(),
                number: l.number.clone(),
                status: l.occupancy(),
                is_broken: l.is_broken,
                broken_remarks: l.broken_remarks.clone(),
                assignment_id: assignment.map(|a| a.id.clone()),
                occupant,
                signed: assignment.is_some_and(Assignment::is_signed),
            }
        })
        .collect();

    let summary = OccupancySummary {
        total: lockers.len(),
        occupied: lockers.iter().filter(|l| l.is_occupied).count(),
        available: lockers.iter().filter(|l| !l.is_occupied).count(),
        broken: lockers.iter().filter(|l| l.is_broken).count(),
    };

    BoardView {
        loaded,
        layout: GridLayout::compute(lockers),
        tiles,
        summary,
    }
}
