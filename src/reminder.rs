use crate::channels::{ReminderChannels, deliver_notification};
use crate::clock::Clock;
use crate::errors::{ChannelError, TrackerError};
use crate::models::{Activity, parse_time_of_day};
use crate::repository::ActivityRepository;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    /// Activities that became due this tick, in list order.
    pub fired: Vec<Uuid>,
    /// Activities left pending because their time did not parse.
    pub skipped: Vec<(Uuid, String)>,
    /// Side effects that failed, per activity.
    pub channel_failures: Vec<(Uuid, ChannelError)>,
}

#[derive(Clone)]
pub struct ReminderScheduler {
    repository: ActivityRepository,
    channels: ReminderChannels,
    clock: Arc<dyn Clock>,
    interval: Duration,
    alarm_sound: String,
}

impl ReminderScheduler {
    pub fn new(
        repository: ActivityRepository,
        channels: ReminderChannels,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            channels,
            clock,
            interval: DEFAULT_INTERVAL,
            alarm_sound: "alarm.mp3".to_string(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_alarm_sound(mut self, alarm_sound: impl Into<String>) -> Self {
        self.alarm_sound = alarm_sound.into();
        self
    }

    /// Marks every due, uncompleted activity of today as completed, writes
    /// the list once, then announces each of them.
    ///
    /// Nothing is announced when the write fails; those activities stay
    /// pending and come up again on the next tick.
    pub async fn tick(&self) -> Result<TickReport, TrackerError> {
        let now = self.clock.now();
        let today = now.date();

        let (due, skipped) = self
            .repository
            .modify(|list| {
                let mut due: Vec<Activity> = Vec::new();
                let mut skipped = Vec::new();
                for activity in list.iter_mut() {
                    if activity.completed || !activity.is_scheduled_on(today) {
                        continue;
                    }
                    let time = match parse_time_of_day(&activity.time) {
                        Ok(time) => time,
                        Err(err) => {
                            warn!(activity_id = %activity.id, "skipping reminder: {err}");
                            skipped.push((activity.id, activity.time.clone()));
                            continue;
                        }
                    };
                    if today.and_time(time) <= now {
                        activity.mark_complete(today);
                        due.push(activity.clone());
                    }
                }
                let changed = !due.is_empty();
                Ok(((due, skipped), changed))
            })
            .await?;

        let mut report = TickReport {
            fired: due.iter().map(|activity| activity.id).collect(),
            skipped,
            channel_failures: Vec::new(),
        };
        for activity in &due {
            for failure in self.announce(activity).await {
                report.channel_failures.push((activity.id, failure));
            }
        }
        if !report.fired.is_empty() {
            info!(fired = report.fired.len(), "reminders fired");
        }
        Ok(report)
    }

    async fn announce(&self, activity: &Activity) -> Vec<ChannelError> {
        let mut failures = Vec::new();

        self.channels
            .alerter
            .alert(&format!(
                "Reminder: {} at {}",
                activity.description, activity.time
            ))
            .await;

        let title = format!("Activity Reminder: {}", activity.description);
        let body = format!("Scheduled time: {}", activity.time);
        if let Err(err) = deliver_notification(self.channels.notifier.as_ref(), &title, &body).await
        {
            warn!(activity_id = %activity.id, "notification not shown: {err}");
            failures.push(err);
        }

        if let Err(err) = self.channels.audio.play(&self.alarm_sound).await {
            warn!(activity_id = %activity.id, "error playing audio: {err}");
            failures.push(err);
        }

        failures
    }

    /// Ticks once right away and then every `interval` until the runtime
    /// shuts down. A failed tick is logged and the loop keeps going.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_secs = self.interval.as_secs(), "reminder scheduler started");
            loop {
                ticker.tick().await;
                if let Err(err) = self.tick().await {
                    error!("reminder tick failed: {err}");
                }
            }
        })
    }
}
