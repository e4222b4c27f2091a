// Public auth endpoints - login, registration, password recovery and
// session maintenance. Credential checks themselves are delegated to the
// identity provider; this layer adds the student-role gatekeeping.

pub mod login;
pub mod password;
pub mod register;
pub mod session;

pub use login::login;
pub use password::{forgot_password, reset_password};
pub use register::register;
pub use session::{logout, refresh};
