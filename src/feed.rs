//! Writes the syndication artifacts: the general feed (`feed`, rendered from
//! `template.rss`) and the reader-format feed (`cdf`, rendered from
//! `template.cdf`). This module only assembles the render context and picks
//! the template; the markup itself lives in the templates.

use crate::post::in_zone;
use crate::sequence::PublishedPost;
use crate::template::TemplateEngine;
use crate::url::Permalinks;
use crate::write::{overwrite, Result};
use chrono::{Local, NaiveDateTime};
use gtmpl_value::Value;
use log::info;
use std::collections::HashMap;
use std::path::Path;

/// The feed artifacts as `(template name, output file name)` pairs.
pub const ARTIFACTS: [(&str, &str); 2] = [("template.rss", "feed"), ("template.cdf", "cdf")];

/// Blog-level metadata made available to feed templates.
pub struct FeedConfig<'a> {
    pub name: &'a str,
    pub permalinks: &'a Permalinks,
}

/// Renders every artifact in [`ARTIFACTS`] from `views` (oldest to newest) and
/// overwrites the corresponding files in `output_directory`.
pub fn write_feeds<E: TemplateEngine>(
    engine: &E,
    config: &FeedConfig,
    views: &[PublishedPost],
    output_directory: &Path,
) -> Result<()> {
    let context = context(config, views)?;
    for (template, file_name) in ARTIFACTS.iter() {
        let path = output_directory.join(file_name);
        info!("writing {} from {}", path.display(), template);
        let text = engine.render(template, context.clone())?;
        overwrite(&path, text.as_bytes())?;
    }
    Ok(())
}

/// The feed's last-modified time. This is the newest post's date rather than
/// the time of rendering, so reruns over unchanged posts render identical
/// feeds. Falls back to the current time when there are no posts.
pub fn mod_time(views: &[PublishedPost]) -> NaiveDateTime {
    match views.last() {
        Some(newest) => newest.post.date,
        None => Local::now().naive_local(),
    }
}

fn context(config: &FeedConfig, views: &[PublishedPost]) -> Result<Value> {
    let mut blog: HashMap<String, Value> = HashMap::new();
    blog.insert("name".to_owned(), Value::String(config.name.to_owned()));
    blog.insert(
        "url".to_owned(),
        Value::String(config.permalinks.base().to_string()),
    );
    blog.insert(
        "rss_link".to_owned(),
        Value::String(config.permalinks.site_file("feed")?.to_string()),
    );
    blog.insert(
        "cdf_link".to_owned(),
        Value::String(config.permalinks.site_file("cdf")?.to_string()),
    );

    let modified = in_zone(&mod_time(views), &Local);
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert("blog".to_owned(), Value::Object(blog));
    m.insert(
        "mod_time".to_owned(),
        Value::String(modified.format("%Y-%m-%dT%H:%M:%S").to_string()),
    );
    m.insert("mod_time_rfc3339".to_owned(), Value::String(modified.to_rfc3339()));
    m.insert("mod_time_rfc2822".to_owned(), Value::String(modified.to_rfc2822()));
    m.insert(
        "posts".to_owned(),
        Value::Array(views.iter().rev().map(|view| view.to_value()).collect()),
    );
    Ok(Value::Object(m))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::post::PostRecord;
    use crate::sequence::sequence;
    use crate::template::{Error as TemplateError, Templates};
    use crate::write::Error;
    use chrono::NaiveDate;
    use std::fs::{read_to_string, write};
    use url::Url;

    const RSS: &str = "<rss><title>{{.blog.name}}</title><link>{{.blog.rss_link}}</link><updated>{{.mod_time}}</updated>{{range .posts}}<item>{{.link}}|{{.title}}</item>{{end}}</rss>";
    const CDF: &str = "<CHANNEL HREF=\"{{.blog.cdf_link}}\">{{range .posts}}<ITEM HREF=\"{{.shortlink}}\"/>{{end}}</CHANNEL>";

    fn records() -> Vec<PostRecord> {
        (1..=2)
            .map(|id| PostRecord {
                id,
                slug: format!("p{}", id),
                title: format!("T{}", id),
                date: NaiveDate::from_ymd(2024, 1, id as u32).and_hms(12, 0, 0),
                ..PostRecord::default()
            })
            .collect()
    }

    #[test]
    fn test_write_feeds() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let templates = tempfile::tempdir()?;
        write(templates.path().join("template.rss"), RSS)?;
        write(templates.path().join("template.cdf"), CDF)?;
        let output = tempfile::tempdir()?;

        let permalinks = Permalinks::new(
            Url::parse("https://b.example")?,
            Some(Url::parse("https://s.example/b")?),
        );
        let posts = records();
        let views = sequence(&posts, 2, &permalinks)?;
        let config = FeedConfig {
            name: "Ink",
            permalinks: &permalinks,
        };
        write_feeds(&Templates::new(templates.path()), &config, &views, output.path())?;

        let feed = read_to_string(output.path().join("feed"))?;
        assert_eq!(
            "<rss><title>Ink</title><link>https://b.example/feed</link><updated>2024-01-02T12:00:00</updated>\
             <item>https://b.example/0002_p2|T2</item><item>https://b.example/0001_p1|T1</item></rss>",
            feed
        );
        let cdf = read_to_string(output.path().join("cdf"))?;
        assert_eq!(
            "<CHANNEL HREF=\"https://b.example/cdf\"><ITEM HREF=\"https://s.example/b/0002\"/><ITEM HREF=\"https://s.example/b/0001\"/></CHANNEL>",
            cdf
        );

        // Rendering again yields identical bytes.
        write_feeds(&Templates::new(templates.path()), &config, &views, output.path())?;
        assert_eq!(feed, read_to_string(output.path().join("feed"))?);
        Ok(())
    }

    #[test]
    fn test_missing_template() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let templates = tempfile::tempdir()?;
        write(templates.path().join("template.rss"), RSS)?;
        let output = tempfile::tempdir()?;
        let permalinks = Permalinks::new(Url::parse("https://b.example")?, None);
        let config = FeedConfig {
            name: "Ink",
            permalinks: &permalinks,
        };

        match write_feeds(&Templates::new(templates.path()), &config, &[], output.path()) {
            Err(Error::Template(TemplateError::Missing { name, .. })) => {
                assert_eq!("template.cdf", name)
            }
            other => panic!("expected a missing template, got {:?}", other),
        }
        Ok(())
    }
}
