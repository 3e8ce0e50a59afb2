use std::sync::LazyLock;

use crate::types::Devotional;
use crate::validate::{ValidationError, validate};

use chrono::{DateTime, Local};
use scraper::{ElementRef, Html, Selector};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Invalid devotional: {0}")]
    Invalid(#[from] ValidationError),
}

const DATE_FORMAT: &str = "%B %d, %Y";

static SEL_DATE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.daily-devotional-date").expect("invalid selector: date")
});
static SEL_SCRIPTURE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.daily-devotional-scripture").expect("invalid selector: scripture")
});
static SEL_SCRIPTURE_REF: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.daily-devotional-scripture-reference")
        .expect("invalid selector: scripture reference")
});
static SEL_COMMENTARY: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.daily-devotional-commentary").expect("invalid selector: commentary")
});
static SEL_PARAGRAPH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("invalid selector: paragraph"));

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|e| normalize_whitespace(&e.text().collect::<String>()))
}

/// Paragraph children joined by blank lines; bare text blocks when there are no `<p>`s.
fn commentary_text(element: ElementRef) -> String {
    let paragraphs: Vec<String> = element
        .select(&SEL_PARAGRAPH)
        .map(|p| normalize_whitespace(&p.text().collect::<Vec<_>>().join(" ")))
        .filter(|t| !t.is_empty())
        .collect();

    if !paragraphs.is_empty() {
        return paragraphs.join("\n\n");
    }

    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn parse_devotional(html: &str) -> Result<Devotional, ParseError> {
    parse_devotional_at(html, Local::now())
}

/// Parses the devotional with `now` as both the scrape time and the fallback date.
pub fn parse_devotional_at(html: &str, now: DateTime<Local>) -> Result<Devotional, ParseError> {
    let document = Html::parse_document(html);

    let date = first_text(&document, &SEL_DATE).unwrap_or_else(|| {
        let today = now.format(DATE_FORMAT).to_string();
        log::warn!("No devotional date found on page, using today ({})", today);
        today
    });

    let scripture = first_text(&document, &SEL_SCRIPTURE);
    if scripture.is_none() {
        log::debug!("No scripture text found on page");
    }

    let scripture_reference = first_text(&document, &SEL_SCRIPTURE_REF);
    if scripture_reference.is_none() {
        log::debug!("No scripture reference found on page");
    }

    let content = document
        .select(&SEL_COMMENTARY)
        .next()
        .map(commentary_text)
        .ok_or_else(|| ParseError::MissingField("daily-devotional-commentary".to_string()))?;

    Ok(validate(Devotional {
        scraped_at: now.naive_local(),
        date,
        title: crate::DEFAULT_TITLE.to_string(),
        scripture,
        scripture_reference,
        content,
        author: crate::DEFAULT_AUTHOR.to_string(),
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;

    const BODY: &str = "When Jesus said, \"Come unto me,\" He meant it for the weary and the heavy laden alike.";

    fn march_third() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 3, 3, 8, 0, 0)
            .single()
            .expect("Unambiguous local time")
    }

    fn page(inner: &str) -> String {
        format!("<html><body><main>{inner}</main></body></html>")
    }

    fn commentary(paragraphs: &[&str]) -> String {
        let body: String = paragraphs.iter().map(|p| format!("<p>{p}</p>")).collect();
        format!(r#"<div class="daily-devotional-commentary">{body}</div>"#)
    }

    #[test]
    fn test_parse_devotional_from_sample() {
        let html = fs::read_to_string("fixtures/joncourson_home.html")
            .expect("Failed to read sample HTML file");

        let record = parse_devotional_at(&html, march_third()).expect("Failed to parse devotional");

        assert_eq!(record.date, "October 14, 2026");
        assert_eq!(
            record.scripture.as_deref(),
            Some("Be still, and know that I am God: I will be exalted among the heathen, I will be exalted in the earth.")
        );
        assert_eq!(record.scripture_reference.as_deref(), Some("Psalm 46:10"));
        assert_eq!(record.title, "Daily Devotional with Pastor Jon");
        assert_eq!(record.author, "Jon Courson");
        assert_eq!(record.scraped_at, march_third().naive_local());

        let paragraphs: Vec<&str> = record.content.split("\n\n").collect();
        assert_eq!(paragraphs.len(), 3, "{:?}", paragraphs);
        assert!(paragraphs[0].starts_with("In the midst of the storm"));
        assert!(paragraphs[1].contains("not a passive resignation but an active trust"));
        assert!(paragraphs[2].ends_with("He is God, and we are not."));
    }

    #[test]
    fn test_paragraph_text_is_collapsed_and_inline_elements_spaced() {
        let html = page(&format!(
            r#"<div class="daily-devotional-date">March 03, 2025</div>{}"#,
            commentary(&[
                "  Grace   is\n   <em>unmerited</em>favor, freely given to all who ask.  ",
                "   ",
                "<span></span>",
                "Peace follows.",
            ])
        ));

        let record = parse_devotional_at(&html, march_third()).expect("Failed to parse");

        assert_eq!(
            record.content,
            "Grace is unmerited favor, freely given to all who ask.\n\nPeace follows."
        );
    }

    #[test]
    fn test_commentary_without_paragraphs_uses_text_blocks() {
        let html = page(
            r#"<div class="daily-devotional-date">March 03, 2025</div>
            <div class="daily-devotional-commentary">
                The first block of commentary sits directly in the container.
                <br>
                <div>A nested block follows it.</div>
                <span>   </span>
            </div>"#,
        );

        let record = parse_devotional_at(&html, march_third()).expect("Failed to parse");

        assert_eq!(
            record.content,
            "The first block of commentary sits directly in the container.\n\nA nested block follows it."
        );
    }

    #[test]
    fn test_missing_date_falls_back_to_today() {
        let html = page(&commentary(&[BODY]));

        let record = parse_devotional_at(&html, march_third()).expect("Run should still succeed");

        assert_eq!(record.date, "March 03, 2025");
    }

    #[test]
    fn test_fallback_date_uses_local_clock() {
        let html = page(&commentary(&[BODY]));
        let before = Local::now().format(DATE_FORMAT).to_string();

        let record = parse_devotional(&html).expect("Run should still succeed");

        let after = Local::now().format(DATE_FORMAT).to_string();
        assert!(record.date == before || record.date == after);
    }

    #[test]
    fn test_missing_scripture_fields_are_none() {
        let html = page(&format!(
            r#"<div class="daily-devotional-date">March 03, 2025</div>{}"#,
            commentary(&[BODY])
        ));

        let record = parse_devotional_at(&html, march_third()).expect("Failed to parse");

        assert_eq!(record.scripture, None);
        assert_eq!(record.scripture_reference, None);

        let json = serde_json::to_value(&record).unwrap();
        assert!(json["scripture"].is_null());
        assert!(json["scripture_reference"].is_null());
    }

    #[test]
    fn test_field_text_is_trimmed() {
        let html = page(&format!(
            r#"<div class="daily-devotional-date">
                 March 03, 2025
               </div>
               <div class="daily-devotional-scripture">  Jesus wept.  </div>
               <div class="daily-devotional-scripture-reference">
                 John 11:35
               </div>{}"#,
            commentary(&[BODY])
        ));

        let record = parse_devotional_at(&html, march_third()).expect("Failed to parse");

        assert_eq!(record.date, "March 03, 2025");
        assert_eq!(record.scripture.as_deref(), Some("Jesus wept."));
        assert_eq!(record.scripture_reference.as_deref(), Some("John 11:35"));
    }

    #[test]
    fn test_missing_commentary_is_error() {
        let html = page(r#"<div class="daily-devotional-date">March 03, 2025</div>"#);

        let err = parse_devotional_at(&html, march_third()).expect_err("Should fail");

        assert!(matches!(err, ParseError::MissingField(ref f) if f == "daily-devotional-commentary"));
    }

    #[test]
    fn test_short_content_is_error() {
        let html = page(&commentary(&["Too short."]));

        let err = parse_devotional_at(&html, march_third()).expect_err("Should fail");

        assert!(matches!(
            err,
            ParseError::Invalid(ValidationError::ContentTooShort { len: 10, min: 50 })
        ));
    }

    #[test]
    fn test_empty_date_container_is_error() {
        let html = page(&format!(
            r#"<div class="daily-devotional-date">   </div>{}"#,
            commentary(&[BODY])
        ));

        let err = parse_devotional_at(&html, march_third()).expect_err("Should fail");

        assert!(matches!(err, ParseError::Invalid(ValidationError::MissingDate)));
    }

    #[test]
    fn test_non_ascii_text_kept_verbatim() {
        let html = page(&format!(
            r#"<div class="daily-devotional-scripture">“Ἐν ἀρχῇ ἦν ὁ λόγος” — ✝</div>{}"#,
            commentary(&["Naïve faith — “simple” trust — is still faith, and faith is enough for the journey ahead."])
        ));

        let record = parse_devotional_at(&html, march_third()).expect("Failed to parse");

        assert_eq!(record.scripture.as_deref(), Some("“Ἐν ἀρχῇ ἦν ὁ λόγος” — ✝"));
        assert!(record.content.starts_with("Naïve faith — “simple” trust"));
    }
}
