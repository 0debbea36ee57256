//! Zero-sized repository structs, one per table. Every method takes the
//! pool explicitly and returns raw `sqlx` results.

pub mod assignment_repo;
pub mod form_repo;
pub mod locker_repo;
pub mod response_repo;
pub mod signature_repo;

pub use assignment_repo::AssignmentRepo;
pub use form_repo::FormRepo;
pub use locker_repo::LockerRepo;
pub use response_repo::ResponseRepo;
pub use signature_repo::SignatureRepo;
