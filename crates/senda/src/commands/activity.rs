//! Recent-activity handler, with an optional watch loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tabled::Tabled;

use senda_core::views::{ActivityFeed, refresh_view};
use senda_core::{Locale, Poller, ViewState};

use crate::cli::{ActivityArgs, OutputFormat};
use crate::commands::Context;
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct FeedRow {
    #[tabled(rename = "Activity")]
    activity: String,
    #[tabled(rename = "When")]
    when: String,
}

fn render(feed: &ActivityFeed, settings: Settings) -> Result<String, CliError> {
    match settings.output {
        OutputFormat::Table if feed.is_empty() => Ok(output::muted(
            match settings.locale {
                Locale::En => "No recent activity",
                Locale::Es => "Sin actividad reciente",
            },
            settings.color,
        )),
        OutputFormat::Table => {
            let rows: Vec<FeedRow> = feed
                .lines(Utc::now(), settings.locale)
                .into_iter()
                .map(|(activity, when)| FeedRow { activity, when })
                .collect();
            Ok(output::render_table(&rows))
        }
        format => output::render_list(
            format,
            &feed.entries,
            |a| FeedRow {
                activity: a.describe(settings.locale),
                when: a.at.to_rfc3339(),
            },
            |a| a.id.clone(),
        ),
    }
}

pub async fn handle(ctx: &Context, args: ActivityArgs) -> Result<(), CliError> {
    let s = ctx.settings;

    let feed = ActivityFeed::load(ctx.data(), &ctx.session).await?;
    output::print_output(&render(&feed, s)?, s.quiet);
    if !args.watch {
        return Ok(());
    }

    let state = Arc::new(ViewState::new());
    state.apply(state.begin(), feed);
    let mut updates = state.subscribe();

    let poller = {
        let state = Arc::clone(&state);
        let access = ctx.data().clone();
        let session = ctx.session.clone();
        Poller::spawn("activity", Duration::from_secs(args.interval), move || {
            let state = Arc::clone(&state);
            let access = access.clone();
            let session = session.clone();
            async move {
                refresh_view(&state, ActivityFeed::load(&access, &session))
                    .await
                    .map(|_| ())
            }
        })
    };

    let mut shown = state.current();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            update = updates.changed() => {
                let Some(feed) = update else { break };
                if shown.as_deref() != Some(feed.as_ref()) {
                    output::print_output(&render(&feed, s)?, s.quiet);
                    shown = Some(feed);
                }
            }
        }
    }

    poller.shutdown().await;
    Ok(())
}
