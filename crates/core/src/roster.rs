//! Roster export: registered students with their locker numbers as CSV.

use serde::Serialize;

use crate::assignment::Assignment;
use crate::locker;
use crate::student::Response;
use crate::types::Timestamp;

/// Locker column value for students without an assignment.
pub const UNASSIGNED_LABEL: &str = "no rent";

const HEADER: [&str; 5] = ["NO.", "LOCKER NO.", "NAME", "CLASS", "SCHOOL NUMBER"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterRow {
    pub locker_number: String,
    pub name: String,
    pub class: String,
    pub school_number: String,
}

impl RosterRow {
    fn sort_key(&self) -> (u8, u64) {
        match self.locker_number.parse::<u64>() {
            Ok(n) => (0, n),
            Err(_) if self.locker_number == UNASSIGNED_LABEL => (2, 0),
            Err(_) => (1, 0),
        }
    }
}

/// Join responses with assignments and order by locker number, unassigned
/// students last.
pub fn build_rows(responses: &[Response], assignments: &[Assignment]) -> Vec<RosterRow> {
    let mut rows: Vec<RosterRow> = responses
        .iter()
        .map(|response| {
            let locker_number = assignments
                .iter()
                .find(|a| a.student_id == response.id)
                .map(|a| locker::number_from_id(&a.locker_id).to_string())
                .unwrap_or_else(|| UNASSIGNED_LABEL.to_string());
            RosterRow {
                locker_number,
                name: response.student_data.name.clone(),
                class: response.student_data.class.clone(),
                school_number: response.student_data.school_number.clone(),
            }
        })
        .collect();
    rows.sort_by_key(RosterRow::sort_key);
    rows
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Render rows as CSV with a sequential `NO.` column.
pub fn to_csv(rows: &[RosterRow]) -> String {
    let header = HEADER.iter().map(|h| quote(h)).collect::<Vec<_>>().join(",");
    std::iter::once(header)
        .chain(rows.iter().enumerate().map(|(i, row)| {
            let position = (i + 1).to_string();
            let fields: [&str; 5] = [
                &position,
                &row.locker_number,
                &row.name,
                &row.class,
                &row.school_number,
            ];
            fields.iter().map(|f| quote(f)).collect::<Vec<_>>().join(",")
        }))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Download filename for an export taken at `at`.
pub fn file_name(at: Timestamp) -> String {
    format!("student_responses_{}.csv", at.format("%Y-%m-%d"))
}
