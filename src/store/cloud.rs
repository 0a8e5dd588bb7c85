use chrono::{DateTime, Utc};
use firestore::{FirestoreDb, FirestoreQueryDirection};
use log::info;

use super::MealDocument;

const MEAL_DATA_COLLECTION: &str = "meal_data";

#[derive(Debug, Clone)]
pub struct Firestore {
    db: FirestoreDb,
}

impl Firestore {
    pub async fn open(project_id: &str) -> crate::Result<Self> {
        let db = FirestoreDb::new(project_id).await?;
        Ok(Self { db })
    }

    pub async fn latest(&self) -> crate::Result<Option<MealDocument>> {
        let newest: Vec<GCloudMealDocument> = self
            .db
            .fluent()
            .select()
            .from(MEAL_DATA_COLLECTION)
            .order_by([(
                "fetched_at".to_string(),
                FirestoreQueryDirection::Descending,
            )])
            .limit(1)
            .obj()
            .query()
            .await?;
        Ok(newest.into_iter().next().map(Into::into))
    }

    pub async fn append(&self, doc: &MealDocument) -> crate::Result<()> {
        let doc = GCloudMealDocument::from(doc.clone());
        info!("Size of meal data: {}", doc.meal_data.len());
        self.db
            .fluent()
            .insert()
            .into(MEAL_DATA_COLLECTION)
            .generate_document_id()
            .object(&doc)
            .execute::<GCloudMealDocument>()
            .await?;
        Ok(())
    }
}

/// Stored with a native timestamp so the newest document can be found by ordering.
#[derive(serde::Serialize, serde::Deserialize)]
struct GCloudMealDocument {
    meal_data: String,
    #[serde(with = "firestore::serialize_as_timestamp")]
    fetched_at: DateTime<Utc>,
}

impl From<MealDocument> for GCloudMealDocument {
    fn from(doc: MealDocument) -> Self {
        Self {
            meal_data: doc.meal_data,
            fetched_at: doc.fetched_at,
        }
    }
}

impl From<GCloudMealDocument> for MealDocument {
    fn from(doc: GCloudMealDocument) -> Self {
        Self {
            meal_data: doc.meal_data,
            fetched_at: doc.fetched_at,
        }
    }
}
