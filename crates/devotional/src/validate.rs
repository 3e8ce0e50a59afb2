use crate::types::Devotional;

/// Shortest devotional body, in characters, that is accepted as real content.
pub const MIN_CONTENT_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Devotional content too short or empty ({len} of at least {min} characters)")]
    ContentTooShort { len: usize, min: usize },
    #[error("Devotional date is missing")]
    MissingDate,
}

pub fn validate(record: Devotional) -> Result<Devotional, ValidationError> {
    check_content(&record.content)?;
    if record.date.trim().is_empty() {
        return Err(ValidationError::MissingDate);
    }
    Ok(record)
}

fn check_content(content: &str) -> Result<(), ValidationError> {
    let len = content.chars().count();
    if len < MIN_CONTENT_CHARS {
        return Err(ValidationError::ContentTooShort {
            len,
            min: MIN_CONTENT_CHARS,
        });
    }
    Ok(())
}
