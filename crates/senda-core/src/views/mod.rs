// ── View models ──
//
// Each view fetches its record subset through `DataAccess` and reduces it
// to a render-ready model. Building is pure; loading is the async shell.

mod activity;
mod carnet;
mod cattle;
mod dashboard;
mod notifications;
mod reports;

use std::future::Future;

pub use activity::{ACTIVITY_FEED_LEN, ActivityFeed, RECENT_PER_KIND};
pub use carnet::{AnimalCard, Carnet, WholeAge};
pub use cattle::CattleTable;
pub use dashboard::DashboardView;
pub use notifications::{
    NOTIFICATION_WINDOW_DAYS, Notification, NotificationCenter, build_notifications,
};
pub use reports::{ActivityFilter, DateRange, Report};

use crate::error::CoreError;
use crate::state::ViewState;

/// Run one fetch against `state`, applying the result only if no newer
/// fetch started meanwhile. Returns whether the result was applied.
pub async fn refresh_view<T, F>(state: &ViewState<T>, fetch: F) -> Result<bool, CoreError>
where
    T: Send + Sync + 'static,
    F: Future<Output = Result<T, CoreError>>,
{
    let generation = state.begin();
    let value = fetch.await?;
    Ok(state.apply(generation, value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::refresh_view;
    use crate::error::CoreError;
    use crate::state::ViewState;

    #[tokio::test(start_paused = true)]
    async fn slow_refresh_loses_to_a_later_one() {
        let state = ViewState::new();

        let slow = refresh_view(&state, async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, CoreError>("old filter")
        });
        let fast = async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            refresh_view(&state, async { Ok("new filter") }).await
        };
        let (slow, fast) = tokio::join!(slow, fast);

        assert!(!slow.unwrap());
        assert!(fast.unwrap());
        assert_eq!(state.current().as_deref(), Some(&"new filter"));
    }

    #[tokio::test]
    async fn failed_fetch_keeps_the_last_value() {
        let state = ViewState::new();
        refresh_view(&state, async { Ok::<_, CoreError>(1) })
            .await
            .unwrap();
        let err = refresh_view(&state, async {
            Err::<i32, _>(CoreError::Internal("boom".into()))
        })
        .await;

        assert!(err.is_err());
        assert_eq!(state.current().as_deref(), Some(&1));
    }
}
