// ── Domain model ──
//
// Typed herd records plus the derived event and activity types.

mod activity;
mod animal;
mod event;
mod reproduction;
mod vaccine;

pub use activity::{Activity, ActivityKind};
pub use animal::{
    Animal, AnimalUpdate, Category, EarTagColor, Gender, HealthStatus, NewAnimal, Purpose,
};
pub use event::{Event, EventKind};
pub use reproduction::{
    GESTATION_DAYS, NewReproduction, Reproduction, ServiceMethod, expected_birth_date,
};
pub use vaccine::{AnimalSummary, NewVaccine, Vaccine};
