//! Async client for the hosted backend that stores senda's herd records.
//!
//! Two surfaces are covered:
//!
//! - **REST** (`/rest/v1/`): PostgREST-style table access with `select`,
//!   `eq`/`gte`/`lte` filters, ordering, limits and embedded relations.
//! - **Auth** (`/auth/v1/`): GoTrue password sign-in, token refresh,
//!   user lookup and sign-out.
//!
//! Every request carries the project's anonymous key in the `apikey`
//! header. Row access additionally needs a user access token, passed
//! explicitly per call so this crate never holds ambient session state.

pub mod auth;
pub mod error;
pub mod rest;
pub mod transport;

pub use auth::{AuthClient, AuthUser, TokenResponse};
pub use error::Error;
pub use rest::models::{
    AnimalRef, AnimalRow, AnimalUpdateRow, NewAnimalRow, NewReproductionRow, NewVaccineRow,
    RecentAnimalRow, ReproductionRow, StatusUpdateRow, VaccineRow,
};
pub use rest::{Order, Query, RestClient};
pub use transport::{TlsMode, TransportConfig};

use url::Url;

/// Join a service prefix (`"rest/v1"`, `"auth/v1"`) onto a project URL.
///
/// Accepts project URLs with or without a trailing slash, and URLs that
/// already end in the prefix.
pub(crate) fn service_url(raw: &str, prefix: &str) -> Result<Url, Error> {
    let mut url = Url::parse(raw)?;
    let path = url.path().trim_end_matches('/').to_owned();

    if path.ends_with(prefix) {
        url.set_path(&format!("{path}/"));
    } else {
        url.set_path(&format!("{path}/{prefix}/"));
    }

    Ok(url)
}
