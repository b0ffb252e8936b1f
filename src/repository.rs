use crate::errors::TrackerError;
use crate::models::{Activity, ActivityEdit, ActivityView, NewActivity};
use crate::storage::ActivityStore;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

/// Read-modify-write access to the stored activity list.
///
/// Every operation holds the write gate from its read until its write, so
/// the reminder tick, the rollover and user edits are applied one at a time
/// and none of them can overwrite another's change.
#[derive(Clone)]
pub struct ActivityRepository {
    store: Arc<dyn ActivityStore>,
    gate: Arc<Mutex<()>>,
}

impl ActivityRepository {
    pub fn new(store: Arc<dyn ActivityStore>) -> Self {
        Self {
            store,
            gate: Arc::new(Mutex::new(())),
        }
    }

    pub async fn list(&self) -> Result<Vec<Activity>, TrackerError> {
        let _gate = self.gate.lock().await;
        self.read_with_ids().await
    }

    /// Reads the document and gives every record without an id a fresh one,
    /// saving it right away so the ids stay the same on the next read. Caller
    /// must hold the gate.
    async fn read_with_ids(&self) -> Result<Vec<Activity>, TrackerError> {
        let mut activities = self.store.read().await?;
        let mut assigned = 0usize;
        for activity in activities.iter_mut().filter(|activity| activity.id.is_nil()) {
            activity.id = Uuid::new_v4();
            assigned += 1;
        }
        if assigned > 0 {
            self.store.write(&activities).await?;
            info!(assigned, "assigned ids to stored activities");
        }
        Ok(activities)
    }

    pub async fn list_for_day(&self, today: NaiveDate) -> Result<Vec<ActivityView>, TrackerError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .map(|activity| ActivityView::for_day(activity, today))
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<Activity, TrackerError> {
        self.list()
            .await?
            .into_iter()
            .find(|activity| activity.id == id)
            .ok_or(TrackerError::NotFound(id))
    }

    /// Runs `f` over the full list under the gate. The list is written back
    /// only when `f` reports a change; an `Err` from `f` discards its edits.
    pub async fn modify<T, F>(&self, f: F) -> Result<T, TrackerError>
    where
        F: FnOnce(&mut Vec<Activity>) -> Result<(T, bool), TrackerError>,
    {
        let _gate = self.gate.lock().await;
        let mut activities = self.read_with_ids().await?;
        let (value, changed) = f(&mut activities)?;
        if changed {
            self.store.write(&activities).await?;
        }
        Ok(value)
    }

    pub async fn append(
        &self,
        new_activity: NewActivity,
        today: NaiveDate,
    ) -> Result<Activity, TrackerError> {
        let activity = Activity::new(
            new_activity.description.trim(),
            new_activity.time.trim(),
            today,
        );
        let created = activity.clone();
        self.modify(move |list| {
            list.push(activity);
            Ok(((), true))
        })
        .await?;
        info!(activity_id = %created.id, time = %created.time, "activity added");
        Ok(created)
    }

    pub async fn update<F>(&self, id: Uuid, mutator: F) -> Result<Activity, TrackerError>
    where
        F: FnOnce(&mut Activity),
    {
        self.modify(|list| {
            let activity = list
                .iter_mut()
                .find(|activity| activity.id == id)
                .ok_or(TrackerError::NotFound(id))?;
            mutator(activity);
            Ok((activity.clone(), true))
        })
        .await
    }

    pub async fn update_at<F>(&self, index: usize, mutator: F) -> Result<Activity, TrackerError>
    where
        F: FnOnce(&mut Activity),
    {
        self.modify(|list| {
            let len = list.len();
            let activity = list
                .get_mut(index)
                .ok_or(TrackerError::IndexOutOfRange { index, len })?;
            mutator(activity);
            Ok((activity.clone(), true))
        })
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<Activity, TrackerError> {
        let removed = self
            .modify(|list| {
                let index = list
                    .iter()
                    .position(|activity| activity.id == id)
                    .ok_or(TrackerError::NotFound(id))?;
                Ok((list.remove(index), true))
            })
            .await?;
        info!(activity_id = %id, "activity deleted");
        Ok(removed)
    }

    pub async fn delete_at(&self, index: usize) -> Result<Activity, TrackerError> {
        let removed = self
            .modify(|list| {
                if index >= list.len() {
                    return Err(TrackerError::IndexOutOfRange {
                        index,
                        len: list.len(),
                    });
                }
                Ok((list.remove(index), true))
            })
            .await?;
        info!(activity_id = %removed.id, index, "activity deleted");
        Ok(removed)
    }

    pub async fn replace_all(&self, activities: Vec<Activity>) -> Result<(), TrackerError> {
        self.replace_with(|_| activities).await.map(|_| ())
    }

    /// Swaps the whole list for one built from the current list, with no
    /// other mutation in between. Returns the new length.
    pub async fn replace_with<F>(&self, build: F) -> Result<usize, TrackerError>
    where
        F: FnOnce(&[Activity]) -> Vec<Activity>,
    {
        let _gate = self.gate.lock().await;
        let current = self.read_with_ids().await?;
        let replacement = build(&current);
        self.store.write(&replacement).await?;
        debug!(count = replacement.len(), "activity list replaced");
        Ok(replacement.len())
    }

    pub async fn mark_complete(&self, id: Uuid, today: NaiveDate) -> Result<Activity, TrackerError> {
        let activity = self.update(id, |activity| activity.mark_complete(today)).await?;
        info!(activity_id = %id, "activity marked complete");
        Ok(activity)
    }

    pub async fn edit(&self, id: Uuid, edit: ActivityEdit) -> Result<Activity, TrackerError> {
        edit.validate()?;
        self.update(id, |activity| edit.apply(activity)).await
    }
}
