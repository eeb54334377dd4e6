//! Plain-text drawing of the app state.
//!
//! Articles are laid out paragraph by paragraph and wrapped to the terminal width. Every in-app
//! link gets a `[n]` marker after its text; the returned link list is indexed by `n - 1` so the
//! session can resolve `follow n`.

use wikinav_core::constants::NO_RESULTS_MESSAGE;
use wikinav_core::{snippet_text, ArticleView, LinkAction, RenderNode, SearchStatus};

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "table", "tr", "ul", "ol", "dl", "dd", "dt", "blockquote", "figure",
    "figcaption", "pre", "center",
];

/// An article flattened to text, plus the links in marker order.
#[derive(Debug, Clone, Default)]
pub struct RenderedArticle {
    pub text: String,
    pub links: Vec<LinkAction>,
}

pub fn search_status(status: SearchStatus<'_>, width: usize) -> String {
    match status {
        SearchStatus::NotAttempted => String::new(),
        SearchStatus::NoResults => NO_RESULTS_MESSAGE.to_string(),
        SearchStatus::Failed(message) => message.to_string(),
        SearchStatus::Results(results) => {
            let indent = "     ";
            let options = textwrap::Options::new(width)
                .initial_indent(indent)
                .subsequent_indent(indent);
            results
                .iter()
                .enumerate()
                .map(|(i, result)| {
                    let snippet = snippet_text(&result.snippet);
                    if snippet.is_empty() {
                        format!("{:>3}. {}", i + 1, result.title)
                    } else {
                        format!(
                            "{:>3}. {}\n{}",
                            i + 1,
                            result.title,
                            textwrap::fill(&snippet, &options)
                        )
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

pub fn article(view: &ArticleView, width: usize) -> RenderedArticle {
    let mut writer = Writer::default();
    writer.paragraphs.push(format!("# {}", view.title));
    writer.walk(&view.body.nodes);
    writer.flush();

    let text = writer
        .paragraphs
        .iter()
        .map(|p| textwrap::fill(p, width))
        .collect::<Vec<_>>()
        .join("\n\n");
    RenderedArticle {
        text,
        links: writer.links,
    }
}

/// The link list alone, one `[n] Target` per line.
pub fn link_list(links: &[LinkAction]) -> String {
    links
        .iter()
        .enumerate()
        .map(|(i, LinkAction::OpenTitle(title))| format!("[{}] {}", i + 1, title.replace('_', " ")))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Default)]
struct Writer {
    paragraphs: Vec<String>,
    current: String,
    links: Vec<LinkAction>,
}

impl Writer {
    fn walk(&mut self, nodes: &[RenderNode<LinkAction>]) {
        for node in nodes {
            match node {
                RenderNode::Text(text) => self.current.push_str(text),
                RenderNode::Link {
                    action, children, ..
                } => {
                    self.walk(children);
                    self.links.push(action.clone());
                    self.current.push_str(&format!("[{}]", self.links.len()));
                }
                RenderNode::Image { alt, .. } => {
                    if !alt.is_empty() {
                        self.current.push_str(&format!(" [image: {alt}] "));
                    }
                }
                RenderNode::Element { tag, children, .. } => self.element(tag, children),
            }
        }
    }

    fn element(&mut self, tag: &str, children: &[RenderNode<LinkAction>]) {
        match tag {
            "br" => self.flush(),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.flush();
                self.walk(children);
                let heading = collapse(&self.current);
                self.current.clear();
                if !heading.is_empty() {
                    let level = tag[1..].parse::<usize>().unwrap_or(2);
                    self.paragraphs
                        .push(format!("{} {}", "#".repeat(level), heading));
                }
            }
            "li" => {
                self.flush();
                self.current.push_str("• ");
                self.walk(children);
                self.flush();
            }
            tag if BLOCK_TAGS.contains(&tag) => {
                self.flush();
                self.walk(children);
                self.flush();
            }
            "td" | "th" => {
                self.walk(children);
                self.current.push_str(" | ");
            }
            _ => self.walk(children),
        }
    }

    fn flush(&mut self) {
        let paragraph = collapse(&self.current);
        self.current.clear();
        if !paragraph.is_empty() && paragraph != "•" {
            self.paragraphs.push(paragraph);
        }
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
