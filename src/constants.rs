/// Year used when storing a birthday as a full date. Must be a leap year so
/// that `Feb 29` survives the round trip through epoch seconds.
pub const SENTINEL_YEAR: i32 = 1972;

/// Cron expression for the daily announcement run (midnight UTC)
pub const ANNOUNCEMENT_CRON: &str = "0 0 0 * * *";

/// Log directive for the application
pub const LOG_DIRECTIVE: &str = "birthdaybot_rs=info";
