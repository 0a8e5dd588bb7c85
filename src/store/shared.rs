use futures_locks::RwLock;

use super::{MealDocument, Store};

/// The process-wide store handle shared by every request handler.
#[derive(Debug)]
pub struct SharedStore(RwLock<Store>);

impl SharedStore {
    pub fn new(store: Store) -> Self {
        Self(RwLock::new(store))
    }

    /// Firestore inserts run after the guard is dropped, so readers never
    /// wait on the network. The other backends append under the write lock.
    pub async fn append(&self, doc: MealDocument) -> crate::Result<()> {
        let writer = self.0.read().await.detached_writer();
        match writer {
            Some(cloud) => cloud.append(&doc).await,
            None => self.0.write().await.append(doc).await,
        }
    }

    pub async fn latest(&self) -> crate::Result<Option<MealDocument>> {
        self.0.read().await.latest().await
    }
}
