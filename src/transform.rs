//! Normalization of raw provider payloads into article records:
//! parse, dedupe the batch, strip markup, derive the wordcount.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::MappingError;
use crate::model::Article;
use crate::sources::guardian::RawArticle;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new("<[^>]*>").expect("Could not build TAG"));

/// Map a raw provider payload onto an article record. A missing required
/// field is a mapping error, there is no defaulting.
pub fn parse(raw: RawArticle, source: &str) -> Result<Article, MappingError> {
    let fields = raw.fields.ok_or(MappingError::MissingField("fields"))?;

    Ok(Article {
        id: None,
        source: source.to_owned(),
        handle: raw.id.ok_or(MappingError::MissingField("id"))?,
        section: raw
            .section_name
            .ok_or(MappingError::MissingField("sectionName"))?,
        authors: fields.byline.ok_or(MappingError::MissingField("byline"))?,
        headline: fields
            .headline
            .ok_or(MappingError::MissingField("headline"))?,
        body: fields.body.ok_or(MappingError::MissingField("body"))?,
        source_url: raw.web_url.ok_or(MappingError::MissingField("webUrl"))?,
        wordcount: None,
        created_at: None,
    })
}

/// Remove every `<...>` tag. HTML entities are left as-is.
pub fn strip_markup(text: &str) -> String {
    TAG.replace_all(text, "").into_owned()
}

/// Keyed dedup on the provider handle: the first occurrence wins and the
/// input order of the survivors is kept.
pub fn dedupe(articles: Vec<Article>) -> Vec<Article> {
    let mut seen = HashSet::new();
    articles
        .into_iter()
        .filter(|article| seen.insert(article.handle.clone()))
        .collect()
}

fn clean(mut article: Article) -> Article {
    article.headline = strip_markup(&article.headline);
    article.body = strip_markup(&article.body);
    // Character count of the cleaned body, not a token count. Stored under
    // `wordcount`, which downstream consumers expect with this semantic.
    article.wordcount = Some(article.body.chars().count() as i32);
    article
}

/// Whole transformation stage, in order: parse every payload, dedupe the
/// batch once, then strip markup and derive the wordcount per item.
#[tracing::instrument(skip(raws))]
pub fn transform(raws: Vec<RawArticle>, source: &str) -> Result<Vec<Article>, MappingError> {
    let total = raws.len();
    let articles: Vec<Article> = raws
        .into_iter()
        .map(|raw| parse(raw, source))
        .collect::<Result<_, _>>()?;

    let articles = dedupe(articles);
    tracing::info!("{} articles left out of {} after dedup", articles.len(), total);

    Ok(articles.into_iter().map(clean).collect())
}

#[cfg(test)]
mod tests {
    use speculoos::prelude::*;

    use super::*;
    use crate::sources::guardian::RawFields;

    fn raw(id: &str, body: &str) -> RawArticle {
        RawArticle {
            id: Some(id.to_owned()),
            section_name: Some("World news".to_owned()),
            web_url: Some(format!("https://example.org/{id}")),
            fields: Some(RawFields {
                headline: Some("<b>Breaking</b>".to_owned()),
                body: Some(body.to_owned()),
                byline: Some("Jane Doe".to_owned()),
            }),
        }
    }

    #[test]
    fn strips_tags_but_not_entities() {
        assert_that!(strip_markup("<p>Hello <b>World</b></p>")).is_equal_to("Hello World".to_owned());
        assert_that!(strip_markup("a &amp; b")).is_equal_to("a &amp; b".to_owned());
    }

    #[test]
    fn wordcount_is_the_cleaned_body_length() {
        let articles = transform(vec![raw("world/a", "<p>Hello World</p>")], "the-guardian")
            .expect("transform failed");

        assert_that!(articles).has_length(1);
        assert_that!(articles[0].body).is_equal_to("Hello World".to_owned());
        assert_that!(articles[0].wordcount).contains_value(11);
    }

    #[test]
    fn dedupe_keeps_the_first_of_two_records_sharing_a_handle() {
        let first = parse(raw("world/a", "first"), "the-guardian").unwrap();
        let second = parse(raw("world/a", "second"), "the-guardian").unwrap();
        let third = parse(raw("world/b", "third"), "the-guardian").unwrap();

        let survivors = dedupe(vec![first, second, third]);

        assert_that!(survivors).has_length(2);
        assert_that!(survivors[0].handle).is_equal_to("world/a".to_owned());
        assert_that!(survivors[0].body).is_equal_to("first".to_owned());
        assert_that!(survivors[1].handle).is_equal_to("world/b".to_owned());
    }

    #[test]
    fn missing_required_field_is_a_mapping_error() {
        let mut payload = raw("world/a", "body");
        payload.fields.as_mut().unwrap().byline = None;

        let error = parse(payload, "the-guardian").unwrap_err();
        assert!(matches!(error, MappingError::MissingField("byline")));
    }

    #[test]
    fn fresh_records_carry_no_store_assigned_fields() {
        let article = parse(raw("world/a", "body"), "the-guardian").unwrap();
        assert_that!(article.id).is_none();
        assert_that!(article.created_at).is_none();
        assert_that!(article.source).is_equal_to("the-guardian".to_owned());
    }
}
