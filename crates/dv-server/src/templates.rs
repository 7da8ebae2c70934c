//! Page templates.
//!
//! Templates are compiled into the binary and loaded into one minijinja
//! environment at startup. Names end in `.html`, so auto-escaping is on;
//! rendered fragments are marked `|safe` inside the templates.

use minijinja::{Environment, context};

use crate::entry::EntryView;

/// Listing, document, slide deck and source pages.
pub(crate) struct Templates {
    env: Environment<'static>,
}

/// Per-request page options.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct PageOptions<'a> {
    /// Load the math typesetting script.
    pub(crate) math: bool,
    /// Link to the published documentation site.
    pub(crate) public_base: Option<&'a str>,
}

impl Templates {
    pub(crate) fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("dir.html", include_str!("../templates/dir.html"))?;
        env.add_template("post.html", include_str!("../templates/post.html"))?;
        env.add_template("slide.html", include_str!("../templates/slide.html"))?;
        env.add_template("source.html", include_str!("../templates/source.html"))?;
        Ok(Self { env })
    }

    /// Directory or archive listing.
    pub(crate) fn listing(
        &self,
        title: &str,
        parent: Option<&str>,
        entries: &[EntryView],
        options: PageOptions<'_>,
    ) -> Result<String, minijinja::Error> {
        self.env.get_template("dir.html")?.render(context! {
            title,
            parent,
            entries,
            public_base => options.public_base,
        })
    }

    /// Converted document inside the article layout.
    pub(crate) fn post(
        &self,
        title: &str,
        article: &str,
        options: PageOptions<'_>,
    ) -> Result<String, minijinja::Error> {
        self.env.get_template("post.html")?.render(context! {
            title,
            article,
            math => options.math,
            public_base => options.public_base,
        })
    }

    /// Slide deck, one `<section>` per fragment.
    pub(crate) fn slides(
        &self,
        title: &str,
        slides: &[String],
        options: PageOptions<'_>,
    ) -> Result<String, minijinja::Error> {
        self.env.get_template("slide.html")?.render(context! {
            title,
            slides,
            math => options.math,
        })
    }

    /// Standalone highlighted source page with its stylesheet inlined.
    pub(crate) fn source(
        &self,
        title: &str,
        lexer: &str,
        code: &str,
        stylesheet: &str,
    ) -> Result<String, minijinja::Error> {
        self.env.get_template("source.html")?.render(context! {
            title,
            lexer,
            code,
            stylesheet,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn templates() -> Templates {
        Templates::new().unwrap()
    }

    #[test]
    fn test_listing_escapes_names() {
        let entries = vec![EntryView {
            uri: "/a%3Cb%3E.md".to_owned(),
            filename: "<b>.md".to_owned(),
            is_dir: false,
        }];
        let html = templates()
            .listing("/", None, &entries, PageOptions::default())
            .unwrap();

        assert!(html.contains("&lt;b&gt;.md"));
        assert!(!html.contains("<b>.md"));
    }

    #[test]
    fn test_listing_marks_directories() {
        let entries = vec![EntryView {
            uri: "/sub".to_owned(),
            filename: "sub".to_owned(),
            is_dir: true,
        }];
        let html = templates()
            .listing("/", Some("/"), &entries, PageOptions::default())
            .unwrap();

        assert!(html.contains(r#"<a href="/sub">sub/</a>"#));
        assert!(html.contains(r#"class="parent""#));
    }

    #[test]
    fn test_post_keeps_article_markup() {
        let html = templates()
            .post("notes.md", "<p><em>hi</em></p>", PageOptions::default())
            .unwrap();

        assert!(html.contains("<p><em>hi</em></p>"));
        assert!(!html.contains("MathJax"));
    }

    #[test]
    fn test_post_math_and_public_base() {
        let options = PageOptions {
            math: true,
            public_base: Some("https://docs.example.com"),
        };
        let html = templates().post("notes.md", "", options).unwrap();

        assert!(html.contains("MathJax"));
        assert!(html.contains("docs.example.com"));
    }

    #[test]
    fn test_slides_one_section_each() {
        let slides = vec!["<p>one</p>".to_owned(), "<p>two</p>".to_owned()];
        let html = templates()
            .slides("deck.md", &slides, PageOptions::default())
            .unwrap();

        assert_eq!(html.matches(r#"<section class="slide">"#).count(), 2);
    }
}
