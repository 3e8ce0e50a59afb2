use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// One day's devotional as extracted from the source page.
///
/// Field order here is the field order in the written JSON files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Devotional {
    pub scraped_at: NaiveDateTime,
    /// Publication date exactly as the source prints it. Archive merge key.
    pub date: String,
    pub title: String,
    #[serde(default)]
    pub scripture: Option<String>,
    #[serde(default)]
    pub scripture_reference: Option<String>,
    pub content: String,
    pub author: String,
}

impl Display for Devotional {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "┌─ {} ─ {}", self.title, self.date)?;
        if let Some(reference) = &self.scripture_reference {
            writeln!(f, "│  {}", reference)?;
        }
        if let Some(scripture) = &self.scripture {
            writeln!(f, "│  \"{}\"", scripture)?;
        }
        let preview: String = self.content.chars().take(120).collect();
        if preview.len() < self.content.len() {
            writeln!(f, "│  {}…", preview)?;
        } else {
            writeln!(f, "│  {}", preview)?;
        }
        write!(f, "└─ {}", self.author)
    }
}
