//! Notification handlers: vaccines due within the coming week.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tabled::Tabled;

use senda_core::views::{Notification, NotificationCenter};
use senda_core::{FileReadState, Locale, MemoryReadState, ReadStateStore};

use crate::cli::{NotificationsArgs, NotificationsCommand, OutputFormat};
use crate::commands::Context;
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct NotificationRow {
    #[tabled(rename = "")]
    unread: &'static str,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Vaccination")]
    description: String,
}

impl NotificationRow {
    fn new(n: &Notification, locale: Locale) -> Self {
        Self {
            unread: if n.read { "" } else { "●" },
            id: n.id.clone(),
            due: n.due.to_string(),
            when: n.when(locale),
            description: n.description(locale),
        }
    }
}

fn render(list: &[Notification], settings: Settings) -> Result<String, CliError> {
    let locale = settings.locale;
    if settings.output != OutputFormat::Table {
        return output::render_list(
            settings.output,
            list,
            |n| NotificationRow::new(n, locale),
            |n| n.id.clone(),
        );
    }

    let unread = list.iter().filter(|n| !n.read).count();
    let title = format!("{} ({unread})", Notification::title(locale));
    let body = if list.is_empty() {
        output::muted(
            match locale {
                Locale::En => "Nothing due this week",
                Locale::Es => "Nada pendiente esta semana",
            },
            settings.color,
        )
    } else {
        let rows: Vec<NotificationRow> = list
            .iter()
            .map(|n| NotificationRow::new(n, locale))
            .collect();
        output::render_table(&rows)
    };
    Ok(format!("{}\n{body}", output::heading(&title, settings.color)))
}

/// Read flags persist per user unless `--ephemeral` or no data dir exists.
fn read_state(ephemeral: bool) -> Arc<dyn ReadStateStore> {
    let file = if ephemeral {
        None
    } else {
        FileReadState::default_location()
    };
    match file {
        Some(store) => {
            tracing::debug!(path = %store.path().display(), "notification read state");
            Arc::new(store)
        }
        None => {
            if !ephemeral {
                tracing::warn!("no data directory; read flags will not be kept");
            }
            Arc::new(MemoryReadState::new())
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: NotificationsArgs) -> Result<(), CliError> {
    let s = ctx.settings;

    let center = Arc::new(NotificationCenter::new(
        ctx.data().clone(),
        ctx.session.clone(),
        read_state(args.ephemeral),
    ));
    center.refresh(Utc::now().date_naive()).await?;

    match args.command {
        NotificationsCommand::List { unread } => {
            let mut list = center.notifications();
            if unread {
                list.retain(|n| !n.read);
            }
            output::print_output(&render(&list, s)?, s.quiet);
            Ok(())
        }

        NotificationsCommand::Read { id } => {
            if !center.mark_read(&id)? {
                return Err(CliError::NotFound {
                    resource_type: "Notification".into(),
                    identifier: id,
                    list_command: "notifications list".into(),
                });
            }
            output::notice(
                &format!("Marked read, {} unread", center.unread_count()),
                s.quiet,
            );
            Ok(())
        }

        NotificationsCommand::ReadAll => {
            let marked = center.mark_all_read()?;
            output::notice(&format!("Marked {marked} notification(s) read"), s.quiet);
            Ok(())
        }

        NotificationsCommand::Watch { interval } => {
            let mut shown = center.notifications();
            output::print_output(&render(&shown, s)?, s.quiet);

            let mut updates = center.subscribe();
            let poller = center.watch(Duration::from_secs(interval));
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    update = updates.changed() => {
                        let Some(list) = update else { break };
                        if *list != shown {
                            output::print_output(&render(&list, s)?, s.quiet);
                            shown = list.as_ref().clone();
                        }
                    }
                }
            }
            poller.shutdown().await;
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use senda_core::Locale;
    use senda_core::views::Notification;

    use super::render;
    use crate::cli::OutputFormat;
    use crate::config::Settings;

    fn settings(locale: Locale) -> Settings {
        Settings {
            output: OutputFormat::Table,
            color: false,
            locale,
            quiet: false,
            yes: false,
        }
    }

    #[test]
    fn heading_counts_unread() {
        let due = |id: &str, read| Notification {
            id: id.into(),
            vaccine_type: "Aftosa".into(),
            animal_name: "Lucera".into(),
            animal_tag: Some("SND-001".into()),
            due: NaiveDate::from_ymd_opt(2024, 6, 16).unwrap(),
            days_until: 1,
            read,
        };
        let out = render(&[due("v1", false), due("v2", true)], settings(Locale::En)).unwrap();
        assert!(out.starts_with("Vaccination due (1)"));
        assert!(out.contains("Lucera (SND-001) needs Aftosa"));
        assert!(out.contains("Tomorrow"));

        let out = render(&[], settings(Locale::Es)).unwrap();
        assert!(out.contains("Nada pendiente esta semana"));
    }
}
