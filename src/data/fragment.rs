//! Parsing of gateway response fragments.
//!
//! The `ajax/getsms` and `ajax/getrouting` endpoints return either an HTML
//! table (`<table id="smsTable" class="tablesorter">` with a `<thead>` of
//! `<th>` headers and a `<tbody>` of `<td>` cells) or a plain-text notice
//! such as `No SMS in Tables found`. Routing URL cells arrive wrapped in an
//! anchor; the anchor is unwrapped and only the cell text kept.
//!
//! Session expiry is signalled in-band: an expired session produces a
//! fragment carrying an element with `id="sessiontimeout"` instead of the
//! requested content.

use std::sync::LazyLock;

use regex::Regex;

static SENTINEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"id\s*=\s*["']?sessiontimeout["'>\s]"#).expect("sentinel regex is valid")
});

static TABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<table[^>]*>(.*?)</table>").expect("table regex is valid"));

static THEAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<thead[^>]*>(.*?)</thead>").expect("thead regex is valid"));

static TH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<th[^>]*>(.*?)</th>").expect("th regex is valid"));

static TR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").expect("tr regex is valid"));

static TD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<td[^>]*>(.*?)</td>").expect("td regex is valid"));

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag regex is valid"));

/// Whether a response fragment carries the session-expiry sentinel.
///
/// The check is tolerant of attribute position and quote style but matches
/// the marker id exactly. A hit is terminal for the current dashboard
/// instance; the orchestrator reacts with a full reload.
pub fn is_session_expired(fragment: &str) -> bool {
    SENTINEL_RE.is_match(fragment)
}

/// A table extracted from an HTML fragment: header texts plus cell texts
/// per row. Cell order follows document order; rows are untrimmed of
/// columns, so ragged rows keep their own lengths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableModel {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableModel {
    /// The widest row, counting headers. Used for column layout.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }
}

/// A parsed response fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// The fragment contained a table.
    Table(TableModel),
    /// Anything else: the server's plain-text notice, kept verbatim.
    Notice(String),
}

impl Fragment {
    /// Parse a response body into a table or a notice.
    pub fn parse(body: &str) -> Self {
        let Some(table) = TABLE_RE.captures(body) else {
            return Fragment::Notice(body.trim().to_string());
        };
        let inner = &table[1];

        let headers = match THEAD_RE.captures(inner) {
            Some(thead) => {
                TH_RE.captures_iter(&thead[1]).map(|c| clean_cell(&c[1])).collect()
            }
            None => Vec::new(),
        };

        // Header rows live in <thead>; everything else with <td> cells is data.
        let body_part = THEAD_RE.replace(inner, "");
        let rows = TR_RE
            .captures_iter(body_part.as_ref())
            .map(|row| {
                let cells = row.get(1).map_or("", |m| m.as_str());
                TD_RE.captures_iter(cells).map(|c| clean_cell(&c[1])).collect()
            })
            .filter(|cells: &Vec<String>| !cells.is_empty())
            .collect();

        Fragment::Table(TableModel { headers, rows })
    }

    /// The table model, when the fragment contained one.
    pub fn table(&self) -> Option<&TableModel> {
        match self {
            Fragment::Table(model) => Some(model),
            Fragment::Notice(_) => None,
        }
    }
}

/// Strip markup (unwrapping anchors), decode entities, collapse whitespace.
fn clean_cell(raw: &str) -> String {
    let text = TAG_RE.replace_all(raw, "");
    let text = decode_entities(&text);
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMS_FRAGMENT: &str = concat!(
        "<table id=\"smsTable\" class=\"tablesorter\">\n",
        "<thead>\n<tr>\n<th>appid</th>\n<th>mobile</th>\n<th>sent</th>\n</tr>\n</thead>\n",
        "<tbody>\n",
        "<tr>\n<td>app1</td>\n<td>+491701111111</td>\n<td>2024-03-07 14:02:05.0</td>\n</tr>",
        "<tr>\n<td>app2</td>\n<td>+491702222222</td>\n<td>2024-03-07 09:30:00.0</td>\n</tr>",
        "</tbody>\n</table>\n"
    );

    #[test]
    fn detects_session_sentinel() {
        assert!(is_session_expired(r#"<div id="sessiontimeout">Session expired</div>"#));
        assert!(is_session_expired(r#"<p class="warn" id='sessiontimeout'>expired</p>"#));
        assert!(is_session_expired("<span id=sessiontimeout>expired</span>"));
    }

    #[test]
    fn ignores_fragments_without_sentinel() {
        assert!(!is_session_expired(SMS_FRAGMENT));
        assert!(!is_session_expired("No SMS in Tables found"));
        // Similar but different id must not trip the guard.
        assert!(!is_session_expired(r#"<div id="sessiontimeouts"></div>"#));
    }

    #[test]
    fn parses_table_fragment() {
        let fragment = Fragment::parse(SMS_FRAGMENT);
        let table = fragment.table().expect("table fragment");
        assert_eq!(table.headers, vec!["appid", "mobile", "sent"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][1], "+491701111111");
        assert_eq!(table.rows[1][2], "2024-03-07 09:30:00.0");
        assert_eq!(table.column_count(), 3);
    }

    #[test]
    fn unwraps_anchors_in_cells() {
        let body = concat!(
            "<table id=\"routingTable\" class=\"tablesorter\">",
            "<thead><tr><th>modified</th><th>url</th></tr></thead>",
            "<tbody><tr><td>2024-03-07 08:00:00.0</td>",
            "<td><a href=\"http://10.0.0.5/smsgateway\" target=\"_blank\">http://10.0.0.5</a></td>",
            "</tr></tbody></table>"
        );
        let fragment = Fragment::parse(body);
        let table = fragment.table().unwrap();
        assert_eq!(table.rows[0][1], "http://10.0.0.5");
    }

    #[test]
    fn decodes_entities() {
        let body = concat!(
            "<table><thead><tr><th>text</th></tr></thead>",
            "<tbody><tr><td>Tom &amp; Jerry &lt;3</td></tr></tbody></table>"
        );
        let table = Fragment::parse(body).table().unwrap().clone();
        assert_eq!(table.rows[0][0], "Tom & Jerry <3");
    }

    #[test]
    fn plain_text_becomes_notice() {
        let fragment = Fragment::parse("No SMS in Tables found");
        assert_eq!(fragment, Fragment::Notice("No SMS in Tables found".to_string()));

        let fragment = Fragment::parse("  No routes - press button to reload!\n");
        assert_eq!(
            fragment,
            Fragment::Notice("No routes - press button to reload!".to_string())
        );
    }

    #[test]
    fn table_without_thead_has_no_headers() {
        let body = "<table><tbody><tr><td>a</td><td>b</td></tr></tbody></table>";
        let table = Fragment::parse(body).table().unwrap().clone();
        assert!(table.headers.is_empty());
        assert_eq!(table.rows, vec![vec!["a".to_string(), "b".to_string()]]);
    }
}
