// ── Display attributes ──
//
// One table per enumerated column mapping each variant to its English and
// Spanish label and its chart/badge colour. Views and filters read labels
// from here only.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::model::{Category, EarTagColor, Gender, HealthStatus, Purpose, ServiceMethod};

/// Neutral grey used for unknown values and "no data" buckets.
pub const NEUTRAL_COLOR: &str = "#6b7280";

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Locale {
    #[default]
    En,
    Es,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayAttrs {
    pub en: &'static str,
    pub es: &'static str,
    /// `#rrggbb`
    pub color: &'static str,
}

impl DisplayAttrs {
    const fn new(en: &'static str, es: &'static str, color: &'static str) -> Self {
        Self { en, es, color }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.en,
            Locale::Es => self.es,
        }
    }

    /// Whether `needle` is a substring of either label (case-insensitive).
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.en.to_lowercase().contains(&needle) || self.es.to_lowercase().contains(&needle)
    }
}

/// Variants with a display table entry.
pub trait Labelled {
    fn attrs(&self) -> DisplayAttrs;

    fn label(&self, locale: Locale) -> Cow<'_, str> {
        Cow::Borrowed(self.attrs().label(locale))
    }
}

impl Labelled for HealthStatus {
    fn attrs(&self) -> DisplayAttrs {
        match self {
            Self::Healthy => DisplayAttrs::new("Healthy", "Saludable", "#22c55e"),
            Self::Sick => DisplayAttrs::new("Sick", "Enfermo", "#f97316"),
            Self::Pregnant => DisplayAttrs::new("Pregnant", "Preñada", "#3b82f6"),
            Self::Other(_) => DisplayAttrs::new("", "", NEUTRAL_COLOR),
        }
    }

    fn label(&self, locale: Locale) -> Cow<'_, str> {
        match self {
            Self::Other(raw) => Cow::Borrowed(raw),
            known => Cow::Borrowed(known.attrs().label(locale)),
        }
    }
}

impl Labelled for Gender {
    fn attrs(&self) -> DisplayAttrs {
        match self {
            Self::Male => DisplayAttrs::new("Male", "Macho", "#3b82f6"),
            Self::Female => DisplayAttrs::new("Female", "Hembra", "#ec4899"),
        }
    }
}

impl Labelled for EarTagColor {
    fn attrs(&self) -> DisplayAttrs {
        match self {
            Self::Red => DisplayAttrs::new("Red", "Roja", "#ef4444"),
            Self::Green => DisplayAttrs::new("Green", "Verde", "#22c55e"),
            Self::Yellow => DisplayAttrs::new("Yellow", "Amarilla", "#eab308"),
            Self::Sky => DisplayAttrs::new("Sky blue", "Celeste", "#38bdf8"),
        }
    }
}

impl Labelled for Purpose {
    fn attrs(&self) -> DisplayAttrs {
        match self {
            Self::Fattening => DisplayAttrs::new("Fattening", "Engorde", "#f59e0b"),
            Self::Breeding => DisplayAttrs::new("Breeding", "Cría", "#8b5cf6"),
            Self::Sale => DisplayAttrs::new("Sale", "Venta", "#10b981"),
        }
    }
}

impl Labelled for Category {
    fn attrs(&self) -> DisplayAttrs {
        match self {
            Self::Vaca => DisplayAttrs::new("Cow", "Vaca", "#8b5cf6"),
            Self::Vaquilla => DisplayAttrs::new("Heifer", "Vaquilla", "#a78bfa"),
            Self::Novillo => DisplayAttrs::new("Steer", "Novillo", "#f59e0b"),
            Self::Toro => DisplayAttrs::new("Bull", "Toro", "#ef4444"),
            Self::DesmamanteMacho => {
                DisplayAttrs::new("Weaned bull calf", "Desmamante macho", "#3b82f6")
            }
            Self::DesmamanteHembra => {
                DisplayAttrs::new("Weaned heifer calf", "Desmamante hembra", "#ec4899")
            }
            Self::Ternero => DisplayAttrs::new("Calf", "Ternero", "#10b981"),
            Self::Bueye => DisplayAttrs::new("Ox", "Buey", "#6b7280"),
        }
    }
}

impl Labelled for ServiceMethod {
    fn attrs(&self) -> DisplayAttrs {
        match self {
            Self::Natural => DisplayAttrs::new("Natural", "Natural", "#10b981"),
            Self::Artificial => {
                DisplayAttrs::new("Artificial insemination", "Inseminación artificial", "#3b82f6")
            }
        }
    }
}

/// Label for an optional column, `-` when absent.
pub fn label_or_dash<T: Labelled>(value: Option<&T>, locale: Locale) -> String {
    value.map_or_else(|| "-".to_owned(), |v| v.label(locale).into_owned())
}

// ── Relative time ────────────────────────────────────────────────────

/// Human "time ago" text, e.g. `5 minutes ago` / `Hace 5 minutos`.
///
/// Anything under a minute (including timestamps slightly in the future
/// from clock skew) reads as one minute.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>, locale: Locale) -> String {
    let minutes = (now - then).num_minutes().max(1);
    let (n, unit) = if minutes < 60 {
        (minutes, Unit::Minute)
    } else if minutes < 60 * 24 {
        (minutes / 60, Unit::Hour)
    } else if minutes < 60 * 24 * 30 {
        (minutes / (60 * 24), Unit::Day)
    } else if minutes < 60 * 24 * 365 {
        (minutes / (60 * 24 * 30), Unit::Month)
    } else {
        (minutes / (60 * 24 * 365), Unit::Year)
    };

    let word = unit.word(locale, n == 1);
    match locale {
        Locale::En => format!("{n} {word} ago"),
        Locale::Es => format!("Hace {n} {word}"),
    }
}

#[derive(Clone, Copy)]
enum Unit {
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl Unit {
    fn word(self, locale: Locale, singular: bool) -> &'static str {
        match (self, locale, singular) {
            (Self::Minute, Locale::En, true) => "minute",
            (Self::Minute, Locale::En, false) => "minutes",
            (Self::Minute, Locale::Es, true) => "minuto",
            (Self::Minute, Locale::Es, false) => "minutos",
            (Self::Hour, Locale::En, true) => "hour",
            (Self::Hour, Locale::En, false) => "hours",
            (Self::Hour, Locale::Es, true) => "hora",
            (Self::Hour, Locale::Es, false) => "horas",
            (Self::Day, Locale::En, true) => "day",
            (Self::Day, Locale::En, false) => "days",
            (Self::Day, Locale::Es, true) => "día",
            (Self::Day, Locale::Es, false) => "días",
            (Self::Month, Locale::En, true) => "month",
            (Self::Month, Locale::En, false) => "months",
            (Self::Month, Locale::Es, true) => "mes",
            (Self::Month, Locale::Es, false) => "meses",
            (Self::Year, Locale::En, true) => "year",
            (Self::Year, Locale::En, false) => "years",
            (Self::Year, Locale::Es, true) => "año",
            (Self::Year, Locale::Es, false) => "años",
        }
    }
}

/// "Today" / "Tomorrow" / "In N days" for a day offset.
pub fn days_until_label(days: i64, locale: Locale) -> String {
    match (days, locale) {
        (0, Locale::En) => "Today".into(),
        (0, Locale::Es) => "Hoy".into(),
        (1, Locale::En) => "Tomorrow".into(),
        (1, Locale::Es) => "Mañana".into(),
        (n, Locale::En) => format!("In {n} days"),
        (n, Locale::Es) => format!("En {n} días"),
    }
}
