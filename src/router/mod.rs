//! In-app navigation: the route table, the authentication guard, and the
//! forced-logout redirect.
//!
//! Every ordinary navigation goes through [`guard::resolve`], which may
//! substitute the requested destination. The one exception is the
//! [`LogoutSignal`] redirect raised on authorization failure, which the
//! app loop applies without consulting the guard.

pub mod guard;
pub mod redirect;
pub mod routes;

pub use redirect::LogoutSignal;
pub use routes::{Route, LANDING};
