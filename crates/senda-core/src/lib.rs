//! Herd records, dashboard aggregation and form handling for senda.
//!
//! This crate sits between `senda-api` and the command-line front end:
//!
//! - **[`Backend`]**: one HTTP client shared by the auth and REST surfaces.
//!   [`sign_in()`](Backend::sign_in) yields an explicit [`Session`] that
//!   every data call takes; nothing is held globally.
//!
//! - **[`DataAccess`]**: typed reads and writes over the `animals`,
//!   `vaccines` and `reproductions` tables, always scoped to the session's
//!   user.
//!
//! - **Aggregation** ([`aggregate`], [`filter`]): pure functions from
//!   record lists to KPI figures, upcoming events and filtered tables.
//!
//! - **Views** ([`views`]): render-ready models for the herd table, the
//!   general dashboard (with SVG charts from [`chart`]), reports, the
//!   per-animal carnet, the activity feed and notifications.
//!
//! - **Forms** ([`forms`]): field validation and single-call submission
//!   for creating and editing records.
//!
//! - **[`ViewState<T>`]** and [`Poller`]: latest-request-wins snapshots and
//!   cancellable background refresh for watched views.

pub mod access;
pub mod aggregate;
pub mod backend;
pub mod chart;
pub mod config;
pub mod convert;
pub mod display;
pub mod error;
pub mod filter;
pub mod forms;
pub mod model;
pub mod poll;
pub mod session;
pub mod state;
pub mod views;

// ── Primary re-exports ──────────────────────────────────────────────
pub use access::{AnimalQuery, DataAccess};
pub use backend::Backend;
pub use config::{BackendConfig, Credentials, TlsVerification};
pub use display::{Labelled, Locale};
pub use error::CoreError;
pub use filter::{CattleFilter, ColumnFilter, FilterColumn};
pub use poll::{DEFAULT_POLL_INTERVAL, Poller};
pub use session::{Session, UserIdentity};
pub use state::{FileReadState, MemoryReadState, ReadStateStore, ViewState, ViewStream};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Activity, ActivityKind, Animal, AnimalSummary, AnimalUpdate, Category, EarTagColor, Event,
    EventKind, GESTATION_DAYS, Gender, HealthStatus, NewAnimal, NewReproduction, NewVaccine,
    Purpose, Reproduction, ServiceMethod, Vaccine, expected_birth_date,
};
