use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use poise::serenity_prelude::{self as serenity, CreateMessage};
use tokio::time::{Duration, sleep};
use tracing::{error, info, warn};

use crate::{
    constants::ANNOUNCEMENT_CRON,
    dates::format_date_display,
    models::{BirthdayRecord, Data},
};

/// Start the daily announcer task that greets users on their birthday
pub fn start_daily_announcer(http: Arc<serenity::Http>, data: Arc<Data>) {
    tokio::spawn(async move {
        let schedule = match cron::Schedule::from_str(ANNOUNCEMENT_CRON) {
            Ok(s) => s,
            Err(e) => {
                error!(
                    "Invalid announcement cron expression '{}': {}",
                    ANNOUNCEMENT_CRON, e
                );
                return;
            }
        };

        info!("Daily announcer started (cron: '{}')", ANNOUNCEMENT_CRON);

        loop {
            let wait = match duration_until_next(&schedule, Utc::now()) {
                Some(d) => d,
                None => {
                    error!(
                        "No upcoming announcement time for cron '{}'",
                        ANNOUNCEMENT_CRON
                    );
                    return;
                }
            };

            info!(
                "Next birthday announcement run in {} minutes",
                wait.as_secs() / 60
            );

            sleep(wait).await;

            if let Err(e) = run_birthday_announcements(&http, &data).await {
                error!("Failed to run birthday announcements: {}", e);
            }
        }
    });
}

/// Time remaining until the schedule's next occurrence after `now`
fn duration_until_next(schedule: &cron::Schedule, now: DateTime<Utc>) -> Option<Duration> {
    let next = schedule.after(&now).next()?;
    (next - now).to_std().ok()
}

/// Check for birthdays today (UTC) and greet every matched user
async fn run_birthday_announcements(
    http: &Arc<serenity::Http>,
    data: &Data,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let now = Utc::now();
    let month = now.month();
    let day = now.day();

    info!("Checking birthdays for {:02}-{:02}", month, day);

    let records = data.db.birthdays_on(month, day).await?;

    if records.is_empty() {
        info!("No birthdays found for today");
        return Ok(());
    }

    info!("Found {} birthday(s) today", records.len());

    for record in &records {
        info!("Birthday match: user {}", record.user_id);

        if let Err(e) = send_birthday_greeting(http, record).await {
            warn!(
                "Failed to send birthday greeting to user {}: {}",
                record.user_id, e
            );
        }
    }

    Ok(())
}

/// Send a direct-message birthday greeting to a single user
async fn send_birthday_greeting(
    http: &Arc<serenity::Http>,
    record: &BirthdayRecord,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let content = format!(
        "🎂 Happy birthday, <@{}>! Hope your {} is a great one!",
        record.user_id,
        format_date_display(record.birthday.month(), record.birthday.day())
    );

    let dm = record.user_id.create_dm_channel(http).await?;
    dm.id
        .send_message(http, CreateMessage::new().content(content))
        .await?;

    info!("Sent birthday greeting to user {}", record.user_id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_next_run_is_following_midnight() {
        let schedule = cron::Schedule::from_str(ANNOUNCEMENT_CRON).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 6, 6, 12, 0, 0).unwrap();

        let wait = duration_until_next(&schedule, now).unwrap();
        assert_eq!(wait.as_secs(), 12 * 60 * 60);
    }

    #[test]
    fn test_no_leap_day_run_in_common_years() {
        // 2026 is not a leap year: the tick after Feb 28 is Mar 1, so a
        // stored Feb 29 birthday is never queried that year.
        let schedule = cron::Schedule::from_str(ANNOUNCEMENT_CRON).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 2, 28, 23, 0, 0).unwrap();

        let wait = duration_until_next(&schedule, now).unwrap();
        assert_eq!(wait.as_secs(), 60 * 60);

        let next = schedule.after(&now).next().unwrap();
        assert_eq!((next.month(), next.day()), (3, 1));
    }

    #[test]
    fn test_leap_day_run_in_leap_years() {
        let schedule = cron::Schedule::from_str(ANNOUNCEMENT_CRON).unwrap();
        let now = Utc.with_ymd_and_hms(2028, 2, 28, 23, 0, 0).unwrap();

        let next = schedule.after(&now).next().unwrap();
        assert_eq!((next.month(), next.day()), (2, 29));
    }
}
