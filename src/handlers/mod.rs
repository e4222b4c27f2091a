// Route handlers, split by security level.
//
// public/    - token acquisition and account management, no auth required
// protected/ - student data endpoints behind the auth gate + rate limiter

pub mod protected;
pub mod public;
