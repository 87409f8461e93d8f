use pulldown_cmark::{html, Options, Parser};

/// Converts markdown to HTML, appending the result to `w`. Markdown syntax is
/// not validated; whatever the parser makes of the input is what gets
/// published.
pub fn to_html(w: &mut String, markdown: &str) {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    html::push_html(w, Parser::new_ext(markdown, options));
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_to_html() {
        let mut out = String::new();
        to_html(&mut out, "## Heading\n\n~~old~~ new\n");
        assert_eq!("<h2>Heading</h2>\n<p><del>old</del> new</p>\n", out);
    }

    #[test]
    fn test_fenced_code() {
        let mut out = String::new();
        to_html(&mut out, "```rust\nfn main() {}\n```\n");
        assert_eq!(
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n",
            out
        );
    }
}
