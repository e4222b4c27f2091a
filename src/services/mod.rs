// Per-resource query services. Each function issues one or two queries
// against the portal database and reshapes rows into response DTOs;
// error translation happens in `crate::error`, not here.

pub mod attendance;
pub mod benefits;
pub mod certificates;
pub mod grades;
pub mod justifications;
pub mod school;
pub mod student;
