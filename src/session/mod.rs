//! Authenticated identity for signed requests.

mod bootstrap;
pub mod cookie;

pub use bootstrap::{bootstrap, decrypt_session_key, Credentials};
pub use cookie::{extract_bduss, normalize_cookie, parse_cookie};
