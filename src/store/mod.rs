mod cloud;
mod local;
mod shared;

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{Config, StoreKind};

use cloud::Firestore;
use local::FileStore;
pub use shared::SharedStore;

/// One persisted fetch. `meal_data` is the indented JSON of an `AggregateResult`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealDocument {
    pub meal_data: String,
    pub fetched_at: DateTime<Utc>,
}

impl MealDocument {
    pub fn new(meal_data: String) -> Self {
        Self {
            meal_data,
            fetched_at: Utc::now(),
        }
    }
}

/// Append-only document storage; reads only ever see the newest document.
#[derive(Debug)]
#[non_exhaustive]
pub enum Store {
    Cloud(Firestore),
    Local(FileStore),
    AdHoc(Vec<MealDocument>),
}

impl Store {
    #[inline]
    pub async fn cloud(project_id: &str) -> crate::Result<Self> {
        Firestore::open(project_id).await.map(Self::Cloud)
    }

    #[inline]
    pub fn local(p: impl AsRef<Path>) -> Self {
        Self::Local(FileStore::open(p))
    }

    #[inline]
    pub const fn ad_hoc() -> Self {
        Self::AdHoc(Vec::new())
    }

    pub async fn open(config: &Config) -> crate::Result<Self> {
        match &config.store {
            StoreKind::Firestore => Self::cloud(&config.firestore_project).await,
            StoreKind::Memory => Ok(Self::ad_hoc()),
            StoreKind::File(p) => Ok(Self::local(p)),
        }
    }

    /// A handle that can write while the store itself is not borrowed.
    /// Only Firestore has one, the other backends are written in place.
    pub fn detached_writer(&self) -> Option<Firestore> {
        match self {
            Self::Cloud(fs) => Some(fs.clone()),
            Self::Local(_) | Self::AdHoc(_) => None,
        }
    }

    pub async fn append(&mut self, doc: MealDocument) -> crate::Result<()> {
        match self {
            Self::Cloud(fs) => fs.append(&doc).await,
            Self::Local(f) => f.append(&doc).await,
            Self::AdHoc(docs) => {
                docs.push(doc);
                Ok(())
            }
        }
    }

    pub async fn latest(&self) -> crate::Result<Option<MealDocument>> {
        match self {
            Self::Cloud(fs) => fs.latest().await,
            Self::Local(f) => f.latest().await,
            Self::AdHoc(docs) => Ok(docs.last().cloned()),
        }
    }
}
