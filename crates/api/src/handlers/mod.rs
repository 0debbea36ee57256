pub mod assignments;
pub mod dashboard;
pub mod forms;
pub mod lockers;
pub mod register;
pub mod responses;
pub mod signatures;
pub mod students;
