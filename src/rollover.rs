use crate::errors::TrackerError;
use crate::repository::ActivityRepository;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// How far past a missing local midnight to look for the first valid instant.
const GAP_SEARCH_MINUTES: i64 = 180;

/// The day that starts at the next local midnight and how long until then.
///
/// Derived from the calendar date each call, so a day that is 23 or 25
/// hours long still ends at its own midnight.
pub fn delay_until_next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> (NaiveDate, Duration) {
    let tz = now.timezone();
    let today = now.date_naive();
    let new_day = today.succ_opt().unwrap_or(today);
    let start = first_instant_of(new_day, |local| tz.from_local_datetime(&local).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&new_day.and_time(NaiveTime::default())));
    let delay = (start - now.clone()).to_std().unwrap_or(Duration::ZERO);
    (new_day, delay)
}

/// The day to stamp after waking for the midnight that starts `target`. A
/// late wake-up, say after the host slept, rolls over to the day that is
/// current now, never to one already past.
pub fn rollover_day(target: NaiveDate, today: NaiveDate) -> NaiveDate {
    target.max(today)
}

/// Earliest instant at or after local midnight of `day`. `resolve` maps a
/// local wall-clock time to an instant, or `None` when a DST gap skips it.
fn first_instant_of<T>(day: NaiveDate, resolve: impl Fn(NaiveDateTime) -> Option<T>) -> Option<T> {
    let midnight = day.and_time(NaiveTime::default());
    (0..=GAP_SEARCH_MINUTES).find_map(|minutes| resolve(midnight + chrono::Duration::minutes(minutes)))
}

#[derive(Clone)]
pub struct RolloverScheduler {
    repository: ActivityRepository,
}

impl RolloverScheduler {
    pub fn new(repository: ActivityRepository) -> Self {
        Self { repository }
    }

    /// Reseeds the list for `new_day`: same descriptions and times, new ids,
    /// nothing completed. Returns how many activities were carried over.
    pub async fn roll_over(&self, new_day: NaiveDate) -> Result<usize, TrackerError> {
        let count = self
            .repository
            .replace_with(|current| {
                current
                    .iter()
                    .map(|activity| activity.carried_to(new_day))
                    .collect()
            })
            .await?;
        info!(%new_day, count, "activities rolled over");
        Ok(count)
    }

    /// Sleeps until each local midnight, rolls over, and rearms. The delay is
    /// recomputed from the wall clock every time.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                let (new_day, delay) = delay_until_next_midnight(&Local::now());
                info!(%new_day, delay_secs = delay.as_secs(), "rollover armed");
                tokio::time::sleep(delay).await;

                let today = Local::now().date_naive();
                if today < new_day {
                    warn!(%new_day, "woke before midnight, rearming");
                    continue;
                }
                let new_day = rollover_day(new_day, today);
                if let Err(err) = self.roll_over(new_day).await {
                    error!(%new_day, "rollover failed: {err}");
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Activity, NewActivity};
    use crate::storage::MemoryStore;
    use chrono::{FixedOffset, Utc};
    use std::sync::Arc;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn delay_runs_to_the_next_calendar_day() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 1, 2, 23, 59, 0).unwrap();
        assert_eq!(
            delay_until_next_midnight(&now),
            (day(2024, 1, 3), Duration::from_secs(60))
        );

        let morning = Utc.with_ymd_and_hms(2024, 2, 28, 6, 0, 0).unwrap();
        assert_eq!(
            delay_until_next_midnight(&morning),
            (day(2024, 2, 29), Duration::from_secs(18 * 3600))
        );
    }

    #[test]
    fn exactly_midnight_waits_a_full_day() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(
            delay_until_next_midnight(&now),
            (day(2025, 1, 1), Duration::from_secs(24 * 3600))
        );
    }

    #[test]
    fn missing_midnight_resolves_to_first_valid_minute() {
        // Local clocks jump from 23:59 to 01:00.
        let resolved = first_instant_of(day(2024, 3, 10), |local| {
            (local.time() >= NaiveTime::from_hms_opt(1, 0, 0).unwrap()).then_some(local)
        });
        assert_eq!(resolved, day(2024, 3, 10).and_hms_opt(1, 0, 0));

        let never = first_instant_of(day(2024, 3, 10), |_| None::<NaiveDateTime>);
        assert_eq!(never, None);
    }

    #[test]
    fn late_wake_up_rolls_over_to_the_current_day() {
        assert_eq!(rollover_day(day(2024, 1, 3), day(2024, 1, 3)), day(2024, 1, 3));
        assert_eq!(rollover_day(day(2024, 1, 3), day(2024, 1, 5)), day(2024, 1, 5));
    }

    #[test]
    fn local_delay_is_at_most_a_long_day() {
        let now = Local::now();
        let (new_day, delay) = delay_until_next_midnight(&now);
        assert_eq!(Some(new_day), now.date_naive().succ_opt());
        assert!(delay <= Duration::from_secs(25 * 3600));
    }

    #[tokio::test]
    async fn rollover_resets_every_activity_for_the_new_day() {
        let today = day(2024, 1, 2);
        let tomorrow = day(2024, 1, 3);
        let repository = ActivityRepository::new(Arc::new(MemoryStore::new()));
        for (desc, time) in [("Gym", "18:00"), ("Read", "21:00"), ("Walk", "07:15")] {
            repository
                .append(
                    NewActivity {
                        description: desc.into(),
                        time: time.into(),
                    },
                    today,
                )
                .await
                .unwrap();
        }
        repository
            .update_at(1, |activity| activity.mark_complete(today))
            .await
            .unwrap();
        let before = repository.list().await.unwrap();

        let count = RolloverScheduler::new(repository.clone())
            .roll_over(tomorrow)
            .await
            .unwrap();

        let after = repository.list().await.unwrap();
        assert_eq!(count, 3);
        assert_eq!(after.len(), before.len());
        for (old, new) in before.iter().zip(&after) {
            assert_eq!(new.description, old.description);
            assert_eq!(new.time, old.time);
            assert_eq!(new.date, "1/3/2024");
            assert!(!new.completed);
            assert_eq!(new.completion_date, None);
            assert_ne!(new.id, old.id);
        }
    }

    #[tokio::test]
    async fn rollover_of_empty_list_is_empty() {
        let repository = ActivityRepository::new(Arc::new(MemoryStore::new()));
        let count = RolloverScheduler::new(repository.clone())
            .roll_over(day(2024, 1, 3))
            .await
            .unwrap();
        assert_eq!(count, 0);
        assert!(repository.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replace_all_overwrites_the_list() {
        let repository = ActivityRepository::new(Arc::new(MemoryStore::new()));
        repository
            .replace_all(vec![Activity::new("Gym", "18:00", day(2024, 1, 2))])
            .await
            .unwrap();
        let replacement = vec![Activity::new("Swim", "06:00", day(2024, 1, 3))];
        repository.replace_all(replacement.clone()).await.unwrap();
        assert_eq!(repository.list().await.unwrap(), replacement);
    }
}
