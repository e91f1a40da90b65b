//! Optimistic list updates with snapshot rollback.
//!
//! A removal is applied to the local list immediately and a [`PendingChange`]
//! keeps the list as it was. Once the backend answers the change is either
//! confirmed (snapshot dropped) or rolled back (snapshot restored), so the
//! displayed list never stays out of sync with the backend after a failure.

use std::future::Future;

/// Anything with a stable identifier.
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for crate::taxonomy::Category {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Snapshot taken before a local change.
#[derive(Debug)]
#[must_use = "a pending change must be confirmed or rolled back"]
pub struct PendingChange<T> {
    snapshot: Vec<T>,
    target: String,
}

impl<T> PendingChange<T> {
    pub fn target(&self) -> &str {
        &self.target
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimisticList<T> {
    items: Vec<T>,
}

impl<T: Identified + Clone> OptimisticList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id() == id)
    }

    /// Remove `id` locally. Returns `None` when nothing matched.
    pub fn remove(&mut self, id: &str) -> Option<PendingChange<T>> {
        if !self.contains(id) {
            return None;
        }
        let snapshot = self.items.clone();
        self.items.retain(|item| item.id() != id);
        Some(PendingChange {
            snapshot,
            target: id.to_string(),
        })
    }

    pub fn confirm(&mut self, change: PendingChange<T>) {
        let PendingChange { .. } = change;
    }

    pub fn rollback(&mut self, change: PendingChange<T>) {
        self.items = change.snapshot;
    }
}

/// Remove `id` locally, then await the backend mutation.
///
/// On error the list is restored to its previous contents and the error is
/// returned unchanged. An id not present in the list still runs the mutation.
pub async fn apply_remove<T, E, F>(list: &mut OptimisticList<T>, id: &str, mutation: F) -> Result<(), E>
where
    T: Identified + Clone,
    F: Future<Output = Result<(), E>>,
{
    let change = list.remove(id);
    match mutation.await {
        Ok(()) => {
            if let Some(change) = change {
                list.confirm(change);
            }
            Ok(())
        }
        Err(e) => {
            if let Some(change) = change {
                list.rollback(change);
            }
            Err(e)
        }
    }
}
