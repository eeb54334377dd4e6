//! Article body rewriting.
//!
//! Turns raw encyclopedia HTML into a render-ready tree that no longer depends on the browser
//! following links:
//!
//! - image sources (and `srcset` candidates) become absolute URLs, protocol-relative sources
//!   gaining the encyclopedia's scheme;
//! - anchors that point at an internal article (`/wiki/<Title>`) become [`RenderNode::Link`]
//!   nodes carrying whatever action the caller's `on_link` callback produced for the target;
//! - every other anchor stays an ordinary, inert element;
//! - `script` and `style` elements and inline event-handler attributes are dropped.
//!
//! The transformation is pure: the same markup, options and callback always yield the same tree,
//! and nothing here knows how a front end will draw it.

use percent_encoding::percent_decode_str;
use scraper::{ElementRef, Html, Node};
use url::Url;

use crate::config::CoreConfig;
use crate::constants::WIKI_PATH_PREFIX;

/// Elements removed from the tree together with their content.
const DROPPED_ELEMENTS: &[&str] = &["script", "style", "noscript"];

/// Context needed to resolve links and image sources.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    base: Url,
    fallback_alt: String,
}

impl RenderOptions {
    /// `base` is any URL on the encyclopedia host; only its scheme and authority are used for
    /// resolution.
    pub fn new(base: Url) -> Self {
        Self {
            base,
            fallback_alt: String::new(),
        }
    }

    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self::new(cfg.wiki_api_url().clone())
    }

    /// Alt text given to images that carry none (the article title, usually).
    pub fn with_fallback_alt(mut self, alt: impl Into<String>) -> Self {
        self.fallback_alt = alt.into();
        self
    }
}

/// A node of the rewritten article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderNode<A> {
    Text(String),
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
        children: Vec<RenderNode<A>>,
    },
    /// In-app link to another article. Activating it should fire `action`.
    Link {
        target: String,
        action: A,
        children: Vec<RenderNode<A>>,
    },
    Image {
        src: String,
        srcset: Option<String>,
        alt: String,
    },
}

/// The rewritten article: a forest of [`RenderNode`]s in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTree<A> {
    pub nodes: Vec<RenderNode<A>>,
}

impl<A> RenderTree<A> {
    /// In-app links in document order as `(target, action)` pairs.
    pub fn links(&self) -> Vec<(&str, &A)> {
        fn walk<'a, A>(nodes: &'a [RenderNode<A>], out: &mut Vec<(&'a str, &'a A)>) {
            for node in nodes {
                match node {
                    RenderNode::Link {
                        target,
                        action,
                        children,
                    } => {
                        out.push((target.as_str(), action));
                        walk(children, out);
                    }
                    RenderNode::Element { children, .. } => walk(children, out),
                    RenderNode::Text(_) | RenderNode::Image { .. } => {}
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.nodes, &mut out);
        out
    }

    /// Image nodes in document order as `(src, alt)` pairs.
    pub fn images(&self) -> Vec<(&str, &str)> {
        fn walk<'a, A>(nodes: &'a [RenderNode<A>], out: &mut Vec<(&'a str, &'a str)>) {
            for node in nodes {
                match node {
                    RenderNode::Image { src, alt, .. } => out.push((src.as_str(), alt.as_str())),
                    RenderNode::Link { children, .. } | RenderNode::Element { children, .. } => {
                        walk(children, out)
                    }
                    RenderNode::Text(_) => {}
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.nodes, &mut out);
        out
    }

    /// Concatenated text content, without any layout.
    pub fn plain_text(&self) -> String {
        fn walk<A>(nodes: &[RenderNode<A>], out: &mut String) {
            for node in nodes {
                match node {
                    RenderNode::Text(text) => out.push_str(text),
                    RenderNode::Link { children, .. } | RenderNode::Element { children, .. } => {
                        walk(children, out)
                    }
                    RenderNode::Image { .. } => {}
                }
            }
        }

        let mut out = String::new();
        walk(&self.nodes, &mut out);
        out
    }
}

/// Rewrite article markup into a [`RenderTree`].
///
/// `on_link` is called once per internal anchor, in document order, with the decoded target
/// title (`Albert_Einstein` for `/wiki/Albert_Einstein#Early_life`).
///
/// # Arguments
/// * `html` - Article body as returned by the parse API
/// * `options` - Encyclopedia origin and fallback alt text
/// * `on_link` - Maps an internal target to the action fired when the link is activated
///
/// # Returns
/// The rewritten tree. Scripts, styles and event-handler attributes are gone.
pub fn render_body<A, F>(html: &str, options: &RenderOptions, mut on_link: F) -> RenderTree<A>
where
    F: FnMut(&str) -> A,
{
    let fragment = Html::parse_fragment(html);
    let nodes = convert_children(fragment.root_element(), options, &mut on_link);
    RenderTree { nodes }
}

/// Text of an HTML fragment such as a search snippet, tags removed and entities decoded.
pub fn snippet_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let text: String = fragment.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn convert_children<A, F>(
    parent: ElementRef<'_>,
    options: &RenderOptions,
    on_link: &mut F,
) -> Vec<RenderNode<A>>
where
    F: FnMut(&str) -> A,
{
    let mut out = Vec::new();
    for child in parent.children() {
        match child.value() {
            Node::Text(text) => {
                let text: &str = text;
                out.push(RenderNode::Text(text.to_owned()));
            }
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(child) {
                    if let Some(node) = convert_element(element, options, on_link) {
                        out.push(node);
                    }
                }
            }
            _ => {}
        }
    }
    out
}

fn convert_element<A, F>(
    element: ElementRef<'_>,
    options: &RenderOptions,
    on_link: &mut F,
) -> Option<RenderNode<A>>
where
    F: FnMut(&str) -> A,
{
    let tag = element.value().name();
    if DROPPED_ELEMENTS.contains(&tag) {
        return None;
    }

    match tag {
        "img" => {
            // An image without a source keeps its alt text.
            let src = element
                .value()
                .attr("src")
                .map(str::trim)
                .filter(|src| !src.is_empty())
                .map(|src| normalize_image_src(src, options))
                .unwrap_or_default();
            let alt = element
                .value()
                .attr("alt")
                .map(str::trim)
                .filter(|alt| !alt.is_empty())
                .unwrap_or(options.fallback_alt.as_str());
            Some(RenderNode::Image {
                src,
                srcset: element
                    .value()
                    .attr("srcset")
                    .map(|srcset| normalize_srcset(srcset, options)),
                alt: alt.to_owned(),
            })
        }
        "a" => {
            let target = element
                .value()
                .attr("href")
                .and_then(|href| internal_link_target(href, options));
            let children = convert_children(element, options, on_link);
            match target {
                Some(target) => {
                    let action = on_link(&target);
                    Some(RenderNode::Link {
                        target,
                        action,
                        children,
                    })
                }
                None => Some(RenderNode::Element {
                    tag: tag.to_owned(),
                    attrs: safe_attrs(element),
                    children,
                }),
            }
        }
        _ => Some(RenderNode::Element {
            tag: tag.to_owned(),
            attrs: safe_attrs(element),
            children: convert_children(element, options, on_link),
        }),
    }
}

fn safe_attrs(element: ElementRef<'_>) -> Vec<(String, String)> {
    element
        .value()
        .attrs()
        .filter(|(name, value)| {
            !name.starts_with("on")
                && !value
                    .trim_start()
                    .get(..11)
                    .is_some_and(|scheme| scheme.eq_ignore_ascii_case("javascript:"))
        })
        .map(|(name, value)| (name.to_owned(), value.to_owned()))
        .collect()
}

/// Make an image source absolute. `//host/x.png` gains the encyclopedia scheme and `/x.png` the
/// encyclopedia origin; absolute sources are returned as-is apart from URL normalisation.
pub fn normalize_image_src(src: &str, options: &RenderOptions) -> String {
    let src = src.trim();
    match options.base.join(src) {
        Ok(url) => url.into(),
        Err(_) => src.to_owned(),
    }
}

fn normalize_srcset(srcset: &str, options: &RenderOptions) -> String {
    srcset
        .split(',')
        .map(str::trim)
        .filter(|candidate| !candidate.is_empty())
        .map(|candidate| match candidate.split_once(char::is_whitespace) {
            Some((src, descriptor)) => {
                format!("{} {}", normalize_image_src(src, options), descriptor.trim())
            }
            None => normalize_image_src(candidate, options),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// The article title an anchor points at, if it is an internal article link.
///
/// Recognised forms are `/wiki/Title`, `//<host>/wiki/Title` and `http(s)://<host>/wiki/Title`
/// where `<host>` is the encyclopedia host. Fragments are ignored; links carrying a query string
/// (edit and history links) are not internal. The returned title is percent-decoded.
pub fn internal_link_target(href: &str, options: &RenderOptions) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let url = options.base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str() != options.base.host_str() {
        return None;
    }
    if url.query().is_some() {
        return None;
    }

    let encoded = url.path().strip_prefix(WIKI_PATH_PREFIX)?;
    let title = percent_decode_str(encoded).decode_utf8().ok()?;
    let title = title.trim();
    if title.is_empty() {
        return None;
    }
    Some(title.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> RenderOptions {
        RenderOptions::new(Url::parse("https://en.wikipedia.org/w/api.php").unwrap())
            .with_fallback_alt("Cat")
    }

    fn render(html: &str) -> RenderTree<String> {
        render_body(html, &options(), |target| format!("open:{target}"))
    }

    #[test]
    fn protocol_relative_image_gets_https() {
        let tree = render(r#"<p><img src="//upload.wikimedia.org/x.png" alt="An x"></p>"#);
        assert_eq!(
            tree.images(),
            vec![("https://upload.wikimedia.org/x.png", "An x")]
        );
    }

    #[test]
    fn root_relative_image_gets_origin_and_missing_alt_uses_title() {
        let tree = render(r#"<img src="/static/images/icon.png">"#);
        assert_eq!(
            tree.images(),
            vec![("https://en.wikipedia.org/static/images/icon.png", "Cat")]
        );
    }

    #[test]
    fn image_without_src_is_kept_with_its_alt() {
        let tree = render(r#"<p>Before<img alt="A diagram">after</p>"#);
        assert_eq!(tree.images(), vec![("", "A diagram")]);

        let tree = render(r#"<img src="  ">"#);
        assert_eq!(tree.images(), vec![("", "Cat")]);
    }

    #[test]
    fn absolute_image_is_untouched() {
        let tree = render(r#"<img src="https://upload.wikimedia.org/a/b.jpg" alt="b">"#);
        assert_eq!(tree.images()[0].0, "https://upload.wikimedia.org/a/b.jpg");
    }

    #[test]
    fn srcset_candidates_are_normalized() {
        let tree = render(
            r#"<img src="//u.org/a.png" srcset="//u.org/a15.png 1.5x, //u.org/a2.png 2x">"#,
        );
        match &tree.nodes[0] {
            RenderNode::Image { srcset, .. } => assert_eq!(
                srcset.as_deref(),
                Some("https://u.org/a15.png 1.5x, https://u.org/a2.png 2x")
            ),
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn internal_anchor_becomes_link_with_callback_action() {
        let tree = render(r#"<p>See <a href="/wiki/Albert_Einstein" title="Albert Einstein">Einstein</a>.</p>"#);
        assert_eq!(
            tree.links(),
            vec![("Albert_Einstein", &"open:Albert_Einstein".to_string())]
        );
        assert_eq!(tree.plain_text(), "See Einstein.");
    }

    #[test]
    fn callback_runs_once_per_internal_anchor_in_document_order() {
        let mut seen = Vec::new();
        let html = r##"
            <a href="/wiki/Dog">dog</a>
            <a href="https://example.com/">external</a>
            <a href="#cite_note-1">[1]</a>
            <a href="//en.wikipedia.org/wiki/Felidae#Taxonomy">Felidae</a>
            <a href="/w/index.php?title=Cat&action=edit">edit</a>
            <a>no href</a>
        "##;
        let tree: RenderTree<usize> = render_body(html, &options(), |target| {
            seen.push(target.to_owned());
            seen.len()
        });
        assert_eq!(seen, vec!["Dog", "Felidae"]);
        assert_eq!(tree.links().len(), 2);
    }

    #[test]
    fn non_internal_anchor_stays_inert_element_with_children() {
        let tree = render(r#"<a href="https://example.com/" onclick="steal()">out</a>"#);
        match &tree.nodes[0] {
            RenderNode::Element {
                tag,
                attrs,
                children,
            } => {
                assert_eq!(tag, "a");
                assert!(attrs.iter().all(|(name, _)| name != "onclick"));
                assert_eq!(children, &vec![RenderNode::Text("out".into())]);
            }
            other => panic!("expected element, got {other:?}"),
        }
    }

    #[test]
    fn link_target_is_percent_decoded() {
        assert_eq!(
            internal_link_target("/wiki/Caf%C3%A9", &options()).as_deref(),
            Some("Café")
        );
        assert_eq!(
            internal_link_target("https://en.wikipedia.org/wiki/Albert_Einstein", &options())
                .as_deref(),
            Some("Albert_Einstein")
        );
        assert_eq!(
            internal_link_target("https://de.wikipedia.org/wiki/Katze", &options()),
            None
        );
        assert_eq!(internal_link_target("/wiki/", &options()), None);
    }

    #[test]
    fn scripts_and_styles_are_dropped() {
        let tree = render("<style>.x{}</style><p>body</p><script>alert(1)</script>");
        assert_eq!(tree.plain_text(), "body");
    }

    #[test]
    fn snippet_text_strips_markup() {
        assert_eq!(
            snippet_text(r#"The <span class="searchmatch">cat</span> (&quot;Felis&quot;)"#),
            "The cat (\"Felis\")"
        );
    }
}
