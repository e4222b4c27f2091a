// Protected handlers - every route here sits behind the auth gate, so an
// `Extension<AuthStudent>` is always present, and behind the rate limiter.

pub mod attendance;
pub mod benefits;
pub mod certificates;
pub mod grades;
pub mod justifications;
pub mod me;
pub mod school;

pub use attendance::{attendance_absences_get, attendance_get, attendance_summary_get};
pub use benefits::benefits_get;
pub use certificates::{certificates_get, certificates_post};
pub use grades::{grades_get, grades_semester_get};
pub use justifications::{justifications_get, justifications_post};
pub use me::{me_attendance_get, me_details_patch, me_get};
pub use school::school_get;
