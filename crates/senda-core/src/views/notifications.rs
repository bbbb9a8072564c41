// ── Upcoming-vaccine notifications ──
//
// Vaccines whose next dose falls within the coming week, with read flags
// kept in a `ReadStateStore`. `NotificationCenter` owns the latest list and
// can keep it fresh in the background.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::access::DataAccess;
use crate::display::{Locale, days_until_label};
use crate::error::CoreError;
use crate::model::Vaccine;
use crate::poll::Poller;
use crate::session::Session;
use crate::state::{ReadStateStore, ViewState, ViewStream};

/// Look-ahead, inclusive of both ends.
pub const NOTIFICATION_WINDOW_DAYS: u64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// The vaccine record id.
    pub id: String,
    pub vaccine_type: String,
    pub animal_name: String,
    pub animal_tag: Option<String>,
    pub due: NaiveDate,
    pub days_until: i64,
    pub read: bool,
}

impl Notification {
    pub fn title(locale: Locale) -> &'static str {
        match locale {
            Locale::En => "Vaccination due",
            Locale::Es => "Vacunación pendiente",
        }
    }

    pub fn description(&self, locale: Locale) -> String {
        let animal = match &self.animal_tag {
            Some(tag) => format!("{} ({tag})", self.animal_name),
            None => self.animal_name.clone(),
        };
        match locale {
            Locale::En => format!("{animal} needs {}", self.vaccine_type),
            Locale::Es => format!("{animal} necesita {}", self.vaccine_type),
        }
    }

    pub fn when(&self, locale: Locale) -> String {
        days_until_label(self.days_until, locale)
    }
}

/// Notifications for vaccines due in `[today, today + 7]`, soonest first.
pub fn build_notifications(
    vaccines: &[Vaccine],
    today: NaiveDate,
    read_ids: &BTreeSet<String>,
) -> Vec<Notification> {
    let until = today
        .checked_add_days(Days::new(NOTIFICATION_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MAX);

    let mut notifications: Vec<Notification> = vaccines
        .iter()
        .filter_map(|v| {
            let due = v.next_date.filter(|d| (today..=until).contains(d))?;
            let (animal_name, animal_tag) = match &v.animal {
                Some(a) => (a.name.clone(), Some(a.tag.clone())),
                None => ("-".to_owned(), None),
            };
            Some(Notification {
                id: v.id.clone(),
                vaccine_type: v.vaccine_type.clone(),
                animal_name,
                animal_tag,
                due,
                days_until: (due - today).num_days(),
                read: read_ids.contains(&v.id),
            })
        })
        .collect();
    notifications.sort_by_key(|n| n.due);
    notifications
}

/// The notification bell: latest list, unread count and read tracking.
pub struct NotificationCenter {
    access: DataAccess,
    session: Session,
    store: Arc<dyn ReadStateStore>,
    state: ViewState<Vec<Notification>>,
}

impl NotificationCenter {
    pub fn new(access: DataAccess, session: Session, store: Arc<dyn ReadStateStore>) -> Self {
        Self {
            access,
            session,
            store,
            state: ViewState::new(),
        }
    }

    /// Re-fetch the due vaccines and re-apply read flags.
    pub async fn refresh(&self, today: NaiveDate) -> Result<(), CoreError> {
        let generation = self.state.begin();
        let until = today
            .checked_add_days(Days::new(NOTIFICATION_WINDOW_DAYS))
            .unwrap_or(NaiveDate::MAX);
        let vaccines = self
            .access
            .list_vaccines_due(&self.session, today, until)
            .await?;
        let read = self.store.read_ids(self.session.user_id())?;
        let notifications = build_notifications(&vaccines, today, &read);
        debug!(count = notifications.len(), "notifications refreshed");
        self.state.apply(generation, notifications);
        Ok(())
    }

    /// The last applied list; empty before the first refresh.
    pub fn notifications(&self) -> Vec<Notification> {
        self.state
            .current()
            .map(|list| list.as_ref().clone())
            .unwrap_or_default()
    }

    pub fn unread_count(&self) -> usize {
        self.state
            .current()
            .map_or(0, |list| list.iter().filter(|n| !n.read).count())
    }

    /// Mark one notification read. Returns `false` if it is not in the list.
    pub fn mark_read(&self, id: &str) -> Result<bool, CoreError> {
        let mut list = self.notifications();
        let Some(target) = list.iter_mut().find(|n| n.id == id) else {
            return Ok(false);
        };
        self.store
            .mark_read(self.session.user_id(), &[target.id.clone()])?;
        target.read = true;
        self.republish(list);
        Ok(true)
    }

    /// Mark every listed notification read. Returns how many were unread.
    pub fn mark_all_read(&self) -> Result<usize, CoreError> {
        let mut list = self.notifications();
        let unread: Vec<String> = list
            .iter()
            .filter(|n| !n.read)
            .map(|n| n.id.clone())
            .collect();
        if unread.is_empty() {
            return Ok(0);
        }
        self.store.mark_read(self.session.user_id(), &unread)?;
        for n in &mut list {
            n.read = true;
        }
        self.republish(list);
        Ok(unread.len())
    }

    fn republish(&self, list: Vec<Notification>) {
        let generation = self.state.begin();
        self.state.apply(generation, list);
    }

    pub fn subscribe(&self) -> ViewStream<Vec<Notification>> {
        self.state.subscribe()
    }

    /// Refresh every `period` in the background until the poller is dropped.
    pub fn watch(self: &Arc<Self>, period: Duration) -> Poller {
        let center = Arc::clone(self);
        Poller::spawn("notifications", period, move || {
            let center = Arc::clone(&center);
            async move { center.refresh(Utc::now().date_naive()).await }
        })
    }
}
