use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};

use super::MealDocument;

/// Documents kept one JSON object per line, oldest first.
#[derive(Debug)]
pub struct FileStore(PathBuf);

impl FileStore {
    pub fn open(p: impl AsRef<Path>) -> Self {
        Self(p.as_ref().to_owned())
    }

    pub async fn latest(&self) -> crate::Result<Option<MealDocument>> {
        if !fs::try_exists(&self.0).await? {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.0).await?;
        contents
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .map(serde_json::from_str)
            .transpose()
            .map_err(From::from)
    }

    pub async fn append(&self, doc: &MealDocument) -> crate::Result<()> {
        let mut line = serde_json::to_string(doc)?;
        line.push('\n');
        let mut f = fs::File::options()
            .create(true)
            .append(true)
            .open(&self.0)
            .await?;
        f.write_all(line.as_bytes()).await?;
        f.flush().await?;
        Ok(())
    }
}
