use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::core::filename::{ordinal_name, sanitize_path_component};
use crate::models::course::{Course, Lesson, Video};

static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:title"]"#).unwrap());
static LESSON_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li.toc-level-1").unwrap());
static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static OL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("ol").unwrap());

/// Parses a TOC page into lessons and their video links, in document order.
///
/// Missing structure never fails: a page without `og:title` uses
/// `fallback_title`, and a lesson without a nested `<ol>` has its links
/// collected from the lesson element itself.
pub fn parse_course(html: &str, fallback_title: &str, base_url: Option<&Url>) -> Course {
    let doc = Html::parse_document(html);

    let title = doc
        .select(&TITLE_SEL)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(sanitize_path_component)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| sanitize_path_component(fallback_title));

    let lessons = doc
        .select(&LESSON_SEL)
        .enumerate()
        .map(|(i, el)| Lesson {
            ordinal: i + 1,
            name: ordinal_name(i + 1, &lesson_text(&el)),
            videos: lesson_videos(&el, base_url),
        })
        .collect();

    Course { title, lessons }
}

fn lesson_text(el: &ElementRef) -> String {
    match el.select(&ANCHOR_SEL).next() {
        Some(anchor) => anchor.text().collect(),
        None => el
            .children()
            .filter_map(|node| node.value().as_text())
            .map(|t| &**t)
            .collect::<Vec<_>>()
            .join(" "),
    }
}

fn lesson_videos(el: &ElementRef, base_url: Option<&Url>) -> Vec<Video> {
    let container = el.select(&OL_SEL).next().unwrap_or(*el);

    container
        .select(&LINK_SEL)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            Some((a.text().collect::<String>(), resolve_href(href, base_url)))
        })
        .enumerate()
        .map(|(i, (text, source_url))| Video {
            ordinal: i + 1,
            name: ordinal_name(i + 1, &text),
            source_url,
        })
        .collect()
}

fn resolve_href(href: &str, base_url: Option<&Url>) -> String {
    let href = href.trim();
    match base_url.map(|base| base.join(href)) {
        Some(Ok(url)) => url.to_string(),
        _ => href.to_string(),
    }
}
