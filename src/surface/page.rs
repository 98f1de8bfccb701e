//! HTML page surface
//!
//! Selections come from the request's query pairs. A value that is not
//! among the offered options is ignored, so every selection the renderers
//! see is valid by construction.

use std::collections::HashMap;
use std::fmt::Write as _;

use tracing::warn;

use super::{Block, Surface};
use crate::frame::StyledFrame;

/// A sidebar control as offered to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Title(String),
    Select {
        key: String,
        label: String,
        options: Vec<String>,
        selected: Option<String>,
    },
    MultiSelect {
        key: String,
        label: String,
        options: Vec<String>,
        selected: Vec<String>,
    },
}

/// One rendered page: sidebar controls and body blocks.
#[derive(Debug, Clone, Default)]
pub struct Page {
    title: String,
    query: HashMap<String, Vec<String>>,
    controls: Vec<Control>,
    blocks: Vec<Block>,
}

impl Page {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// A page whose selections are answered from `pairs`.
    ///
    /// A key given with an empty value counts as present, which lets a form
    /// submit an empty multi-selection.
    pub fn from_query<I, K, V>(title: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut query: HashMap<String, Vec<String>> = HashMap::new();
        for (k, v) in pairs {
            query.entry(k.into()).or_default().push(v.into());
        }
        Self {
            title: title.into(),
            query,
            ..Default::default()
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// Texts of all top-level headers, in order.
    pub fn headers(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Header(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// All tables, including those inside column panes, in order.
    pub fn tables(&self) -> Vec<&StyledFrame> {
        fn collect<'a>(blocks: &'a [Block], out: &mut Vec<&'a StyledFrame>) {
            for block in blocks {
                match block {
                    Block::Table(frame) => out.push(frame),
                    Block::Columns(panes) => {
                        for pane in panes {
                            collect(pane, out);
                        }
                    }
                    _ => {}
                }
            }
        }
        let mut out = Vec::new();
        collect(&self.blocks, &mut out);
        out
    }

    /// Full HTML document.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(html, "<title>{}</title>", escape_html(&self.title));
        html.push_str(PAGE_STYLE);
        html.push_str("</head>\n<body>\n<aside class=\"sidebar\">\n<form method=\"get\">\n");
        for control in &self.controls {
            render_control(&mut html, control);
        }
        html.push_str("<noscript><button type=\"submit\">Apply</button></noscript>\n");
        html.push_str("</form>\n</aside>\n<main>\n");
        for block in &self.blocks {
            render_block(&mut html, block);
        }
        html.push_str("</main>\n</body>\n</html>\n");
        html
    }
}

impl Surface for Page {
    fn sidebar_title(&mut self, text: &str) {
        self.controls.push(Control::Title(text.to_string()));
    }

    fn select(&mut self, key: &str, label: &str, options: &[String]) -> Option<String> {
        let requested = self.query.get(key).and_then(|values| values.first());
        let selected = match requested {
            Some(value) if options.contains(value) => Some(value.clone()),
            Some(value) => {
                warn!("Ignoring {}={:?}: not among {} options", key, value, options.len());
                options.first().cloned()
            }
            None => options.first().cloned(),
        };

        self.controls.push(Control::Select {
            key: key.to_string(),
            label: label.to_string(),
            options: options.to_vec(),
            selected: selected.clone(),
        });
        selected
    }

    fn multiselect(
        &mut self,
        key: &str,
        label: &str,
        options: &[String],
        default: &[String],
    ) -> Vec<String> {
        let chosen: &[String] = self.query.get(key).map(Vec::as_slice).unwrap_or(default);
        let selected: Vec<String> = options
            .iter()
            .filter(|option| chosen.contains(option))
            .cloned()
            .collect();

        self.controls.push(Control::MultiSelect {
            key: key.to_string(),
            label: label.to_string(),
            options: options.to_vec(),
            selected: selected.clone(),
        });
        selected
    }

    fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const PAGE_STYLE: &str = r#"<style>
body { margin: 0; display: flex; font-family: sans-serif; }
.sidebar { width: 18rem; min-height: 100vh; padding: 1rem; background: #f0f2f6; box-sizing: border-box; }
.sidebar label { display: block; margin-top: 1rem; font-size: 0.9em; }
.sidebar select { width: 100%; }
main { flex: 1; padding: 1rem 2rem; overflow-x: auto; }
table { border-collapse: collapse; margin-bottom: 1rem; }
th, td { border: 1px solid #e6e9ef; padding: 0.25rem 0.5rem; text-align: left; }
.columns { display: flex; gap: 1rem; }
.columns > div { flex: 1; overflow-x: auto; }
</style>
"#;

fn render_control(html: &mut String, control: &Control) {
    match control {
        Control::Title(text) => {
            let _ = writeln!(html, "<h1>{}</h1>", escape_html(text));
        }
        Control::Select {
            key,
            label,
            options,
            selected,
        } => {
            let _ = writeln!(html, "<label>{}", escape_html(label));
            let _ = writeln!(
                html,
                "<select name=\"{}\" onchange=\"this.form.submit()\">",
                escape_html(key)
            );
            for option in options {
                let mark = if Some(option) == selected.as_ref() {
                    " selected"
                } else {
                    ""
                };
                let _ = writeln!(
                    html,
                    "<option value=\"{0}\"{1}>{0}</option>",
                    escape_html(option),
                    mark
                );
            }
            html.push_str("</select></label>\n");
        }
        Control::MultiSelect {
            key,
            label,
            options,
            selected,
        } => {
            let _ = writeln!(html, "<fieldset><legend>{}</legend>", escape_html(label));
            // Keeps the key present when every box is unchecked.
            let _ = writeln!(
                html,
                "<input type=\"hidden\" name=\"{}\" value=\"\">",
                escape_html(key)
            );
            for option in options {
                let mark = if selected.contains(option) { " checked" } else { "" };
                let _ = writeln!(
                    html,
                    "<label><input type=\"checkbox\" name=\"{0}\" value=\"{1}\"{2} onchange=\"this.form.submit()\"> {1}</label>",
                    escape_html(key),
                    escape_html(option),
                    mark
                );
            }
            html.push_str("</fieldset>\n");
        }
    }
}

fn render_block(html: &mut String, block: &Block) {
    match block {
        Block::Title(text) => {
            let _ = writeln!(html, "<h1>{}</h1>", escape_html(text));
        }
        Block::Header(text) => {
            let _ = writeln!(html, "<h2>{}</h2>", escape_html(text));
        }
        Block::Subheader(text) => {
            let _ = writeln!(html, "<h3>{}</h3>", escape_html(text));
        }
        Block::Markdown(text) => render_markdown(html, text),
        Block::Table(frame) => render_table(html, frame),
        Block::Columns(panes) => {
            html.push_str("<div class=\"columns\">\n");
            for pane in panes {
                html.push_str("<div>\n");
                for inner in pane {
                    render_block(html, inner);
                }
                html.push_str("</div>\n");
            }
            html.push_str("</div>\n");
        }
        Block::Html(raw) => {
            html.push_str(raw);
            html.push('\n');
        }
    }
}

fn render_markdown(html: &mut String, text: &str) {
    if let Some(item) = text.strip_prefix("- ") {
        let _ = writeln!(html, "<ul><li>{}</li></ul>", escape_html(item));
        return;
    }
    if let Some((number, item)) = text.split_once(". ") {
        if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
            let _ = writeln!(
                html,
                "<ol start=\"{}\"><li>{}</li></ol>",
                number,
                escape_html(item)
            );
            return;
        }
    }
    let _ = writeln!(html, "<p>{}</p>", escape_html(text));
}

fn render_table(html: &mut String, styled: &StyledFrame) {
    let frame = &styled.frame;
    let indexed = !frame.index.is_empty();

    // Corner cell over the row-label column every body row carries.
    html.push_str("<table>\n<thead><tr><th></th>");
    for column in &frame.columns {
        let _ = write!(html, "<th>{}</th>", escape_html(column));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for (r, row) in frame.rows.iter().enumerate() {
        html.push_str("<tr>");
        if indexed {
            let label = frame.index.get(r).map(String::as_str).unwrap_or_default();
            let _ = write!(html, "<th>{}</th>", escape_html(label));
        } else {
            let _ = write!(html, "<th>{}</th>", r);
        }
        for (c, cell) in row.iter().enumerate() {
            let css = styled.style(r, c).css();
            if css.is_empty() {
                let _ = write!(html, "<td>{}</td>", escape_html(cell));
            } else {
                let _ = write!(html, "<td style=\"{}\">{}</td>", css, escape_html(cell));
            }
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Frame, HighlightMask, CHANGED_CSS};

    fn options(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_select_defaults_to_first_option() {
        let mut page = Page::new("t");
        let choice = page.select("file", "Select file", &options(&["a", "b"]));
        assert_eq!(choice.as_deref(), Some("a"));
    }

    #[test]
    fn test_select_honours_valid_query_value() {
        let mut page = Page::from_query("t", [("file", "b")]);
        let choice = page.select("file", "Select file", &options(&["a", "b"]));
        assert_eq!(choice.as_deref(), Some("b"));
    }

    #[test]
    fn test_select_rejects_unknown_value() {
        let mut page = Page::from_query("t", [("file", "zzz")]);
        let choice = page.select("file", "Select file", &options(&["a", "b"]));
        assert_eq!(choice.as_deref(), Some("a"));
    }

    #[test]
    fn test_select_empty_options() {
        let mut page = Page::new("t");
        assert_eq!(page.select("example", "Select example", &[]), None);
    }

    #[test]
    fn test_multiselect_default_and_query() {
        let all = options(&["x", "y", "z"]);

        let mut page = Page::new("t");
        assert_eq!(page.multiselect("types", "Types", &all, &all), all);

        let mut page = Page::from_query("t", [("types", "z"), ("types", "x"), ("types", "q")]);
        assert_eq!(page.multiselect("types", "Types", &all, &all), options(&["x", "z"]));

        let mut page = Page::from_query("t", [("types", "")]);
        assert!(page.multiselect("types", "Types", &all, &all).is_empty());
    }

    #[test]
    fn test_html_escapes_text_but_not_raw_html() {
        let mut page = Page::new("<gallery>");
        page.header("a < b");
        page.raw_html("<mark>raw</mark>".to_string());
        let html = page.to_html();

        assert!(html.contains("<title>&lt;gallery&gt;</title>"));
        assert!(html.contains("<h2>a &lt; b</h2>"));
        assert!(html.contains("<mark>raw</mark>"));
    }

    #[test]
    fn test_html_styles_changed_cells() {
        let mut frame = Frame::new(["Value"]);
        frame.push_row(vec!["old".into()]);
        frame.push_row(vec!["new".into()]);
        let mut mask = HighlightMask::clean(&frame);
        mask.mark(1, 0);

        let mut page = Page::new("t");
        page.table(StyledFrame::highlighted(frame, mask));
        let html = page.to_html();

        assert!(html.contains("<td>old</td>"));
        assert!(html.contains(&format!("<td style=\"{}\">new</td>", CHANGED_CSS)));
    }

    #[test]
    fn test_markdown_lines() {
        let mut page = Page::new("t");
        page.markdown("2. 去故宫");
        page.markdown("- usr: 你好");
        let html = page.to_html();
        assert!(html.contains("<ol start=\"2\"><li>去故宫</li></ol>"));
        assert!(html.contains("<ul><li>usr: 你好</li></ul>"));
    }

    fn cells_per_row(html: &str) -> Vec<usize> {
        html.split("<tr>")
            .skip(1)
            .map(|row| row.matches("<th").count() + row.matches("<td").count())
            .collect()
    }

    #[test]
    fn test_table_header_aligns_with_body() {
        let mut plain = Frame::new(["Id", "Domain"]);
        plain.push_row(vec!["1".into(), "景点".into()]);
        let mut indexed = Frame::new(["景点"]);
        indexed.push_indexed_row("名称", vec!["故宫".into()]);

        for frame in [plain, indexed] {
            let mut html = String::new();
            render_table(&mut html, &StyledFrame::plain(frame.clone()));
            let counts = cells_per_row(&html);
            assert_eq!(counts.len(), 2);
            assert_eq!(counts, vec![frame.columns.len() + 1; 2], "{}", html);
        }
    }

    #[test]
    fn test_plain_table_header_starts_with_corner_cell() {
        let mut frame = Frame::new(["Id", "Domain"]);
        frame.push_row(vec!["1".into(), "景点".into()]);
        let mut html = String::new();
        render_table(&mut html, &StyledFrame::plain(frame));

        assert!(html.contains("<thead><tr><th></th><th>Id</th><th>Domain</th></tr></thead>"));
        assert!(html.contains("<tr><th>0</th><td>1</td><td>景点</td></tr>"));
    }
}
