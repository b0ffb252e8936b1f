use crate::errors::ChannelError;
use crate::models::Activity;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

const FEED_CAPACITY: usize = 256;
pub const DEFAULT_PERMISSION_PROMPT: Duration = Duration::from_secs(15);

pub const SHARE_TITLE: &str = "My Daily Activity";
pub const SHARE_UNSUPPORTED: &str = "Sharing is not supported in this browser.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
    Default,
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "granted" => Ok(Permission::Granted),
            "denied" => Ok(Permission::Denied),
            "default" => Ok(Permission::Default),
            other => Err(format!("unknown notification permission {other:?}")),
        }
    }
}

#[async_trait]
pub trait Alerter: Send + Sync {
    async fn alert(&self, message: &str);
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn permission(&self) -> Permission;
    async fn request_permission(&self) -> Permission;
    async fn show(&self, title: &str, body: &str) -> Result<(), ChannelError>;
}

#[async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn play(&self, resource: &str) -> Result<(), ChannelError>;
}

#[async_trait]
pub trait Sharer: Send + Sync {
    async fn share(&self, payload: &SharePayload) -> Result<(), ChannelError>;
}

/// The three ways a due activity is announced. All of them fire for every
/// reminder.
#[derive(Clone)]
pub struct ReminderChannels {
    pub alerter: Arc<dyn Alerter>,
    pub notifier: Arc<dyn Notifier>,
    pub audio: Arc<dyn AudioPlayer>,
}

impl ReminderChannels {
    /// Every channel delivered through the page's event feed.
    pub fn browser(feed: Arc<BrowserFeed>) -> Self {
        Self {
            alerter: feed.clone(),
            notifier: feed.clone(),
            audio: feed,
        }
    }
}

/// Show a notification, asking for permission once if the user has not
/// decided yet.
pub async fn deliver_notification(
    notifier: &dyn Notifier,
    title: &str,
    body: &str,
) -> Result<(), ChannelError> {
    let permission = match notifier.permission().await {
        Permission::Default => notifier.request_permission().await,
        decided => decided,
    };
    match permission {
        Permission::Granted => notifier.show(title, body).await,
        Permission::Denied | Permission::Default => Err(ChannelError::NotificationDenied),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FeedPayload {
    Alert { message: String },
    Notification { title: String, body: String },
    Sound { resource: String },
    PermissionRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedEvent {
    pub seq: u64,
    #[serde(flatten)]
    pub payload: FeedPayload,
}

#[derive(Debug, Default)]
struct FeedState {
    next_seq: u64,
    events: VecDeque<FeedEvent>,
}

/// Queue of reminder events picked up by the page, which turns them into
/// `alert()`, `Notification` and `Audio` calls.
///
/// The page reports the user's notification choice through
/// `set_permission`; a pending `request_permission` wakes on that answer.
#[derive(Debug)]
pub struct BrowserFeed {
    state: Mutex<FeedState>,
    permission: watch::Sender<Permission>,
    prompt_timeout: Duration,
}

impl BrowserFeed {
    pub fn new(permission: Permission) -> Self {
        Self {
            state: Mutex::new(FeedState {
                next_seq: 1,
                events: VecDeque::new(),
            }),
            permission: watch::Sender::new(permission),
            prompt_timeout: DEFAULT_PERMISSION_PROMPT,
        }
    }

    /// How long `request_permission` waits for the page to answer.
    pub fn with_prompt_timeout(mut self, prompt_timeout: Duration) -> Self {
        self.prompt_timeout = prompt_timeout;
        self
    }

    pub async fn push(&self, payload: FeedPayload) -> u64 {
        let mut state = self.state.lock().await;
        let seq = state.next_seq;
        state.next_seq += 1;
        if state.events.len() == FEED_CAPACITY {
            state.events.pop_front();
        }
        state.events.push_back(FeedEvent { seq, payload });
        seq
    }

    pub async fn events_after(&self, after: u64) -> Vec<FeedEvent> {
        let state = self.state.lock().await;
        state
            .events
            .iter()
            .filter(|event| event.seq > after)
            .cloned()
            .collect()
    }

    pub async fn set_permission(&self, permission: Permission) {
        self.permission.send_replace(permission);
        debug!(?permission, "notification permission updated");
    }
}

#[async_trait]
impl Alerter for BrowserFeed {
    async fn alert(&self, message: &str) {
        self.push(FeedPayload::Alert {
            message: message.to_string(),
        })
        .await;
    }
}

#[async_trait]
impl Notifier for BrowserFeed {
    async fn permission(&self) -> Permission {
        *self.permission.borrow()
    }

    async fn request_permission(&self) -> Permission {
        // Subscribe before pushing so an answer that arrives right away is seen.
        let mut answer = self.permission.subscribe();
        self.push(FeedPayload::PermissionRequest).await;
        let decided = tokio::time::timeout(
            self.prompt_timeout,
            answer.wait_for(|permission| *permission != Permission::Default),
        )
        .await
        .ok()
        .and_then(Result::ok)
        .map(|permission| *permission);
        match decided {
            Some(permission) => permission,
            None => {
                info!(
                    timeout_secs = self.prompt_timeout.as_secs_f64(),
                    "no answer to notification permission request"
                );
                *self.permission.borrow()
            }
        }
    }

    async fn show(&self, title: &str, body: &str) -> Result<(), ChannelError> {
        self.push(FeedPayload::Notification {
            title: title.to_string(),
            body: body.to_string(),
        })
        .await;
        Ok(())
    }
}

#[async_trait]
impl AudioPlayer for BrowserFeed {
    async fn play(&self, resource: &str) -> Result<(), ChannelError> {
        self.push(FeedPayload::Sound {
            resource: resource.to_string(),
        })
        .await;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl SharePayload {
    pub fn for_activity(activity: &Activity, url: impl Into<String>) -> Self {
        Self {
            title: SHARE_TITLE.to_string(),
            text: format!("Check out this activity: {}", activity.display_text()),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareOutcome {
    Shared,
    Unsupported,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareResponse {
    pub outcome: ShareOutcome,
    pub message: Option<String>,
    pub payload: SharePayload,
}

/// Without a sharer the caller gets an informational message and the
/// payload, so the page can try its own share sheet.
pub async fn share_activity(sharer: Option<&dyn Sharer>, payload: SharePayload) -> ShareResponse {
    let Some(sharer) = sharer else {
        return ShareResponse {
            outcome: ShareOutcome::Unsupported,
            message: Some(SHARE_UNSUPPORTED.to_string()),
            payload,
        };
    };
    match sharer.share(&payload).await {
        Ok(()) => {
            debug!("share was successful");
            ShareResponse {
                outcome: ShareOutcome::Shared,
                message: None,
                payload,
            }
        }
        Err(err) => {
            warn!("sharing failed: {err}");
            ShareResponse {
                outcome: ShareOutcome::Failed,
                message: Some(err.to_string()),
                payload,
            }
        }
    }
}

#[cfg(feature = "audio")]
pub use host_audio::RodioPlayer;

#[cfg(feature = "audio")]
mod host_audio {
    use super::AudioPlayer;
    use crate::errors::ChannelError;
    use async_trait::async_trait;
    use std::{fs::File, io::BufReader};
    use tokio::sync::oneshot;

    /// Plays alarm files on the host's default output device.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct RodioPlayer;

    fn failed(err: impl std::fmt::Display) -> ChannelError {
        ChannelError::AudioPlaybackFailed(err.to_string())
    }

    #[async_trait]
    impl AudioPlayer for RodioPlayer {
        async fn play(&self, resource: &str) -> Result<(), ChannelError> {
            let path = resource.to_string();
            let (started_tx, started_rx) = oneshot::channel();
            // The output stream is not Send, so it lives and dies on the
            // blocking thread. We only wait until playback has started.
            tokio::task::spawn_blocking(move || {
                let setup = || -> Result<(rodio::OutputStream, rodio::Sink), ChannelError> {
                    let (stream, handle) = rodio::OutputStream::try_default().map_err(failed)?;
                    let sink = rodio::Sink::try_new(&handle).map_err(failed)?;
                    let file = File::open(&path).map_err(failed)?;
                    let source = rodio::Decoder::new(BufReader::new(file)).map_err(failed)?;
                    sink.append(source);
                    Ok((stream, sink))
                };
                match setup() {
                    Ok((_stream, sink)) => {
                        let _ = started_tx.send(Ok(()));
                        sink.sleep_until_end();
                    }
                    Err(err) => {
                        let _ = started_tx.send(Err(err));
                    }
                }
            });
            started_rx
                .await
                .map_err(|_| failed("playback thread exited"))?
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn feed_hands_out_events_after_a_sequence_number() {
        let feed = BrowserFeed::new(Permission::Granted);
        feed.alert("first").await;
        let second = feed.push(FeedPayload::Sound {
            resource: "alarm.mp3".into(),
        })
        .await;

        let all = feed.events_after(0).await;
        assert_eq!(all.len(), 2);
        let tail = feed.events_after(second - 1).await;
        assert_eq!(tail.len(), 1);
        assert_eq!(
            tail[0].payload,
            FeedPayload::Sound {
                resource: "alarm.mp3".into()
            }
        );
        assert!(feed.events_after(second).await.is_empty());
    }

    #[tokio::test]
    async fn feed_drops_oldest_when_full() {
        let feed = BrowserFeed::new(Permission::Granted);
        for i in 0..(FEED_CAPACITY + 10) {
            feed.alert(&format!("alert {i}")).await;
        }
        let events = feed.events_after(0).await;
        assert_eq!(events.len(), FEED_CAPACITY);
        assert_eq!(events[0].seq, 11);
    }

    #[tokio::test]
    async fn notification_needs_granted_permission() {
        let feed = BrowserFeed::new(Permission::Denied);
        assert_eq!(
            deliver_notification(&feed, "t", "b").await,
            Err(ChannelError::NotificationDenied)
        );

        feed.set_permission(Permission::Granted).await;
        deliver_notification(&feed, "t", "b")
            .await
            .unwrap();
        let events = feed.events_after(0).await;
        assert_eq!(
            events.last().unwrap().payload,
            FeedPayload::Notification {
                title: "t".into(),
                body: "b".into()
            }
        );
    }

    #[tokio::test]
    async fn undecided_permission_is_requested_once() {
        let feed =
            BrowserFeed::new(Permission::Default).with_prompt_timeout(Duration::from_millis(20));
        assert_eq!(
            deliver_notification(&feed, "t", "b").await,
            Err(ChannelError::NotificationDenied)
        );
        let events = feed.events_after(0).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload, FeedPayload::PermissionRequest);
    }

    #[tokio::test]
    async fn notification_waits_for_the_page_to_grant() {
        let feed = Arc::new(BrowserFeed::new(Permission::Default));
        let page = {
            let feed = feed.clone();
            tokio::spawn(async move {
                // Answer the prompt the way the page does once it sees it.
                loop {
                    let events = feed.events_after(0).await;
                    if events.iter().any(|e| e.payload == FeedPayload::PermissionRequest) {
                        feed.set_permission(Permission::Granted).await;
                        return;
                    }
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
            })
        };

        deliver_notification(feed.as_ref(), "Activity Reminder: Gym", "Scheduled time: 18:00")
            .await
            .unwrap();
        page.await.unwrap();

        let payloads: Vec<_> = feed
            .events_after(0)
            .await
            .into_iter()
            .map(|event| event.payload)
            .collect();
        assert_eq!(
            payloads,
            vec![
                FeedPayload::PermissionRequest,
                FeedPayload::Notification {
                    title: "Activity Reminder: Gym".into(),
                    body: "Scheduled time: 18:00".into(),
                },
            ]
        );
        assert_eq!(feed.permission().await, Permission::Granted);
    }

    #[tokio::test]
    async fn page_denial_ends_the_wait_early() {
        let feed = Arc::new(BrowserFeed::new(Permission::Default));
        let answer = {
            let feed = feed.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                feed.set_permission(Permission::Denied).await;
            })
        };
        let started = std::time::Instant::now();
        assert_eq!(feed.request_permission().await, Permission::Denied);
        assert!(started.elapsed() < DEFAULT_PERMISSION_PROMPT);
        answer.await.unwrap();
    }

    #[test]
    fn feed_events_serialize_with_kind_tag() {
        let event = FeedEvent {
            seq: 4,
            payload: FeedPayload::Notification {
                title: "Activity Reminder: Gym".into(),
                body: "Scheduled time: 18:00".into(),
            },
        };
        let value = serde_json::to_value(event).unwrap();
        assert_eq!(value["seq"], 4);
        assert_eq!(value["kind"], "notification");
        assert_eq!(value["title"], "Activity Reminder: Gym");
    }

    #[tokio::test]
    async fn share_without_sharer_is_unsupported() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let activity = Activity::new("Gym", "18:00", day);
        let payload = SharePayload::for_activity(&activity, "http://localhost:8080/");
        assert_eq!(payload.text, "Check out this activity: Gym at 18:00 on 1/2/2024");

        let response = share_activity(None, payload).await;
        assert_eq!(response.outcome, ShareOutcome::Unsupported);
        assert_eq!(response.message.as_deref(), Some(SHARE_UNSUPPORTED));
    }

    struct BrokenSharer;

    #[async_trait]
    impl Sharer for BrokenSharer {
        async fn share(&self, _payload: &SharePayload) -> Result<(), ChannelError> {
            Err(ChannelError::ShareFailed("cancelled".into()))
        }
    }

    #[tokio::test]
    async fn failing_sharer_degrades_to_message() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let payload = SharePayload::for_activity(&Activity::new("Gym", "18:00", day), "/");
        let response = share_activity(Some(&BrokenSharer), payload).await;
        assert_eq!(response.outcome, ShareOutcome::Failed);
        assert_eq!(response.message.as_deref(), Some("share failed: cancelled"));
    }

    #[test]
    fn permission_parses_case_insensitively() {
        assert_eq!("Granted".parse::<Permission>(), Ok(Permission::Granted));
        assert_eq!(" denied ".parse::<Permission>(), Ok(Permission::Denied));
        assert!("maybe".parse::<Permission>().is_err());
    }
}
