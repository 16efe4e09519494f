//! Cron-driven background jobs

use std::future::Future;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{DateTime, FixedOffset, Utc};
use cron::Schedule;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub fn parse_schedule(name: &str, expression: &str) -> Result<Schedule> {
    Schedule::from_str(expression).map_err(|e| anyhow!("Invalid schedule for {}: {}", name, e))
}

fn next_run(schedule: &Schedule, after: &DateTime<FixedOffset>) -> Option<DateTime<FixedOffset>> {
    schedule.after(after).next()
}

/// Runs `job` at every tick of `expression`, read in the given UTC offset.
/// A failed run is logged and the next tick runs as usual.
pub fn spawn_job<F, Fut>(
    name: &'static str,
    expression: &str,
    offset: FixedOffset,
    job: F,
) -> Result<JoinHandle<()>>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    let schedule = parse_schedule(name, expression)?;
    info!(job = name, schedule = expression, "Job scheduled");

    Ok(tokio::spawn(async move {
        let mut last = Utc::now().with_timezone(&offset);
        loop {
            let Some(next) = next_run(&schedule, &last) else {
                warn!(job = name, "Schedule has no upcoming runs");
                return;
            };
            let wait = (next.with_timezone(&Utc) - Utc::now()).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            info!(job = name, "Running scheduled job");
            if let Err(e) = job().await {
                error!(job = name, "Scheduled job failed: {:#}", e);
            }
            last = next;
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_next_run_respects_offset() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let schedule = parse_schedule("birthdays", "0 0 8 * * * *").unwrap();
        let after = offset.with_ymd_and_hms(2025, 6, 15, 7, 30, 0).unwrap();
        let next = next_run(&schedule, &after).unwrap();
        assert_eq!(next, offset.with_ymd_and_hms(2025, 6, 15, 8, 0, 0).unwrap());
        assert_eq!(next.with_timezone(&Utc).to_rfc3339(), "2025-06-15T13:00:00+00:00");
    }

    #[test]
    fn test_next_run_is_strictly_after() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let schedule = parse_schedule("birthdays", "0 0 8 * * * *").unwrap();
        let at_tick = offset.with_ymd_and_hms(2025, 6, 15, 8, 0, 0).unwrap();
        let next = next_run(&schedule, &at_tick).unwrap();
        assert_eq!(next, offset.with_ymd_and_hms(2025, 6, 16, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_invalid_schedule_rejected() {
        assert!(parse_schedule("broken", "every morning").is_err());
    }
}
