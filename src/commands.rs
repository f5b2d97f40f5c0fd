use chrono::Datelike;
use tracing::{error, info};

use crate::{
    dates::{format_date_display, parse_birthday},
    models::{Context, Error},
};

/// Register your birthday for the daily announcement
#[poise::command(slash_command, rename = "set-birthday")]
pub async fn set_birthday(
    ctx: Context<'_>,
    #[description = "Your birthday! In MMM DD (e.g. Jun 06), please!"] date: String,
) -> Result<(), Error> {
    let user_id = ctx.author().id;

    let birthday = match parse_birthday(&date) {
        Ok(birthday) => birthday,
        Err(e) => {
            ctx.say(format!("❌ {}", e)).await?;
            return Ok(());
        }
    };

    if let Err(e) = ctx.data().db.upsert_birthday(user_id, birthday).await {
        error!("Failed to save birthday for user {}: {}", user_id, e);
        ctx.say("❌ Failed to save your birthday. Please try again later.")
            .await?;
        return Ok(());
    }

    ctx.say(format!(
        "✅ Success! <@{}>, you have set your birthday to {}.",
        user_id,
        format_date_display(birthday.month(), birthday.day())
    ))
    .await?;

    info!(
        "User {} set birthday to {:02}-{:02}",
        user_id,
        birthday.month(),
        birthday.day()
    );

    Ok(())
}
