//! Browser-side counterpart of the auth handlers.
//!
//! [`ClientAuthState`] mirrors "who is logged in" for one browsing context.
//! It is built from explicit collaborators instead of globals:
//!
//! - [`CookieJar`]: the browser's cookies, shared by all its tabs.
//! - [`SyncChannel`]: how tabs tell each other to re-read the cookies.
//! - [`AuthBackend`]: the login/logout/session endpoints.
//! - [`Navigator`]: page loads, which always go through the route guard.
//!
//! Nothing here is trusted by the server. The guard only ever looks at the
//! authority cookie.

mod backend;
mod channel;
mod error;
mod jar;
mod navigator;
mod state;

pub use backend::{AuthBackend, HttpAuthBackend, LoginGranted};
pub use channel::{BroadcastChannel, Subscription, SyncChannel, SyncEvent, SyncHandler, SyncKind};
pub use error::{ClientError, LOGIN_FAILED_MESSAGE};
pub use jar::CookieJar;
pub use navigator::{HttpNavigator, Navigator};
pub use state::{AuthSnapshot, ClientAuthState};
