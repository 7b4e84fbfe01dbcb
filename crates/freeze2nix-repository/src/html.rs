//! Anchor extraction from simple index listing pages.
//!
//! PEP 503 pages are flat lists of `<a href="...">filename</a>`; a small
//! regex scanner is enough, and tolerates the attribute quoting and case
//! variations real indexes produce.

use std::sync::LazyLock;

use regex::Regex;

static ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<a\b(?P<attrs>[^>]*)>(?P<text>.*?)</a\s*>").expect("anchor pattern is valid")
});

static HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)href\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^\s"'>]+))"#)
        .expect("href pattern is valid")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// One `<a>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Decoded `href` attribute, if present.
    pub href: Option<String>,
    /// Decoded, trimmed link text.
    pub text: String,
}

/// Every anchor in document order.
pub fn anchors(html: &str) -> Vec<Anchor> {
    ANCHOR
        .captures_iter(html)
        .map(|caps| {
            let href = HREF.captures(&caps["attrs"]).and_then(|attr| {
                attr.name("dq")
                    .or_else(|| attr.name("sq"))
                    .or_else(|| attr.name("bare"))
                    .map(|m| unescape(m.as_str()))
            });
            let text = unescape(&TAG.replace_all(&caps["text"], "")).trim().to_string();
            Anchor { href, text }
        })
        .collect()
}

/// Decode the HTML character references that appear in listings.
pub fn unescape(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match rest.find(';').and_then(|end| decode_entity(&rest[1..end]).map(|c| (c, end))) {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = entity.strip_prefix('#')?;
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}
