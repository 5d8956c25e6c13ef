//! # API crate: passcode authentication and notes for the notes server
//!
//! Everything the HTTP layer in `web` calls lives here. Collaborators with real I/O
//! (database, mail, OAuth) are injected through traits so the whole flow can run
//! against in-memory fakes.
//!
//! ## Modules
//!
//! | Module | Feature gate | Purpose |
//! |--------|-------------|---------|
//! | [`auth`] | none | Passcode issuer, session tokens, the [`AuthFlow`](auth::AuthFlow) controller, federated identity seam; Google OAuth with `server` |
//! | [`notify`] | none | [`Notifier`](notify::Notifier) seam, email rendering, log notifier; Brevo with `server` |
//! | [`notes`] | none | Notes access layer scoped to a verified identity |
//! | [`settings`] | none | Layered configuration (`config` crate) |
//! | [`clock`] | none | Injectable time source |
//! | [`error`] | none | The [`AuthError`] taxonomy |
//! | [`db`] | `server` | PostgreSQL pool, migrations, and [`PgStore`](db::PgStore) |
//! | [`models`] | `server` | Database rows (`User`, `NoteRow`) |
//! | [`testutil`] | `testutil` | Manual clock, recording notifier, static provider |
//!
//! ## Request flows
//!
//! - **Signup**: `request_signup_code` → email with passcode → `verify_signup` → identity + token
//! - **Login**: `request_login_code` → email with passcode → `verify_login` → token
//! - **Federated**: `federated_authorization_url` → provider → `federated_callback` → token
//! - **Authenticated calls**: `authenticate(bearer)` → [`NotesService`](notes::NotesService)

pub mod auth;
pub mod clock;
#[cfg(feature = "server")]
pub mod db;
pub mod error;
#[cfg(feature = "server")]
pub mod models;
pub mod notes;
pub mod notify;
pub mod settings;
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use auth::{AuthFlow, AuthSuccess, SessionTokenService};
pub use clock::{Clock, SystemClock};
pub use error::AuthError;
pub use notes::NotesService;
pub use settings::Settings;
pub use store::{Identity, Note};
