//! Small helpers over `scraper` documents.
//!
//! `scraper::Html` is not `Send`, so adapters parse pages in plain
//! functions and only hand owned values back to async code.

use scraper::{ElementRef, Selector};
use url::Url;

/// Compile a selector literal
pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}

/// Whitespace-normalized text of an element
pub(crate) fn text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the first match of `sel` under `el`, if non-blank
pub(crate) fn select_text(el: ElementRef<'_>, sel: &Selector) -> Option<String> {
    el.select(sel)
        .next()
        .map(text)
        .filter(|t| !t.is_empty())
}

/// Attribute of the first match of `sel` under `el`, if non-blank
pub(crate) fn select_attr(el: ElementRef<'_>, sel: &Selector, name: &str) -> Option<String> {
    el.select(sel).next().and_then(|e| attr(e, name))
}

/// Trimmed attribute value, if non-blank
pub(crate) fn attr(el: ElementRef<'_>, name: &str) -> Option<String> {
    el.value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Lazy-loading aware image URL of an `<img>`
pub(crate) fn image_attr(el: ElementRef<'_>) -> Option<String> {
    attr(el, "data-src")
        .or_else(|| attr(el, "data-lazy-src"))
        .or_else(|| {
            attr(el, "srcset").and_then(|s| s.split_whitespace().next().map(str::to_string))
        })
        .or_else(|| attr(el, "src"))
}

/// Make `href` absolute against `base`; protocol-relative links get `https:`
pub(crate) fn fix_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with("javascript:") || href == "#" {
        return None;
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    if let Some(rest) = href.strip_prefix("//") {
        return Some(format!("https://{rest}"));
    }

    Url::parse(base)
        .and_then(|b| b.join(href))
        .ok()
        .map(|u| u.to_string())
}

/// Host of a URL without `www.`, used as a hoster label
pub(crate) fn host_label(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| url.to_string())
}

/// Leading integer of a string such as "12 Min." or "Staffel 3"
pub(crate) fn leading_number(s: &str) -> Option<i32> {
    let digits: String = s
        .trim()
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}
