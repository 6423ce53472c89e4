use std::path::PathBuf;

use crate::error::{DashboardError, Result};

pub const MAIN: &str = "main";
pub const ROW: &str = "tr";
pub const CELL: &str = "td";
pub const ERROR: &str = "error";

/// Directory of `<name>.html` template files, read on every use.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

/// The three fragments a dashboard page is assembled from.
#[derive(Debug, Clone)]
pub struct PageTemplates {
    pub main: String,
    pub row: String,
    pub cell: String,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub async fn load(&self, name: &str) -> Result<String> {
        let path = self.dir.join(format!("{name}.html"));
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| DashboardError::Template {
                name: name.to_string(),
                source,
            })
    }

    pub async fn load_page(&self) -> Result<PageTemplates> {
        Ok(PageTemplates {
            main: self.load(MAIN).await?,
            row: self.load(ROW).await?,
            cell: self.load(CELL).await?,
        })
    }
}
