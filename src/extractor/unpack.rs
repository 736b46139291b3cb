//! Decoder for scripts packed with Dean Edwards' P.A.C.K.E.R.
//!
//! Input looks like
//! `eval(function(p,a,c,k,e,d){...}('0 1=\'2\';',3,3,'var|x|hello'.split('|'),0,{}))`
//! and unpacks to `var x='hello';`: every word of the payload is a number in
//! base `a` indexing into the `|`-separated keyword list.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static PACKED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)eval\(function\(p,a,c,k,e,[rd]\).*?\}\s*\(\s*'(?P<p>.*?)',\s*(?P<a>\d+),\s*(?P<c>\d+),\s*'(?P<k>.*?)'\.split\('\|'\)"#,
    )
    .expect("valid packer regex")
});

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\w+\b").expect("valid word regex"));

const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Whether `source` contains a packed script
pub fn is_packed(source: &str) -> bool {
    PACKED.is_match(source)
}

/// Unpack the first packed script in `source`
pub fn unpack(source: &str) -> Option<String> {
    PACKED.captures(source).and_then(|caps| unpack_captures(&caps))
}

/// Unpack every packed script in `source` and join them with newlines
pub fn unpack_all(source: &str) -> Option<String> {
    let scripts: Vec<String> = PACKED
        .captures_iter(source)
        .filter_map(|caps| unpack_captures(&caps))
        .collect();

    (!scripts.is_empty()).then(|| scripts.join("\n"))
}

/// Unpacked scripts if there are any, otherwise `source` unchanged
pub fn unpack_or_source(source: &str) -> String {
    unpack_all(source).unwrap_or_else(|| source.to_string())
}

fn unpack_captures(caps: &Captures<'_>) -> Option<String> {
    let payload = caps.name("p")?.as_str().replace("\\'", "'").replace("\\\\", "\\");
    let radix: u32 = caps.name("a")?.as_str().parse().ok()?;
    let keywords: Vec<&str> = caps.name("k")?.as_str().split('|').collect();

    if !(2..=62).contains(&radix) {
        return None;
    }

    let unpacked = WORD.replace_all(&payload, |word: &Captures<'_>| {
        let word = &word[0];
        unbase(word, radix)
            .and_then(|index| keywords.get(index))
            .filter(|k| !k.is_empty())
            .map_or_else(|| word.to_string(), |k| (*k).to_string())
    });

    Some(unpacked.into_owned())
}

fn unbase(word: &str, radix: u32) -> Option<usize> {
    if radix <= 36 {
        return usize::from_str_radix(word, radix).ok();
    }

    word.bytes().try_fold(0usize, |acc, b| {
        let digit = ALPHABET.iter().position(|&c| c == b)?;
        if digit >= radix as usize {
            return None;
        }
        acc.checked_mul(radix as usize)?.checked_add(digit)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACKED_SAMPLE: &str = r#"<script>eval(function(p,a,c,k,e,d){e=function(c){return c};if(!''.replace(/^/,String)){while(c--){d[c]=k[c]||c}k=[function(e){return d[e]}];e=function(){return'\\w+'};c=1};while(c--){if(k[c]){p=p.replace(new RegExp('\\b'+e(c)+'\\b','g'),k[c])}}return p}('0 1=\'2\';',3,3,'var|x|hello'.split('|'),0,{}))</script>"#;

    #[test]
    fn test_unpack_simple() {
        assert!(is_packed(PACKED_SAMPLE));
        assert_eq!(unpack(PACKED_SAMPLE).as_deref(), Some("var x='hello';"));
    }

    #[test]
    fn test_unpack_keeps_unknown_words() {
        let source = "eval(function(p,a,c,k,e,d){}('0(\"3\");',10,4,'alert||'.split('|'),0,{}))";
        assert_eq!(unpack(source).as_deref(), Some("alert(\"3\");"));
    }

    #[test]
    fn test_unbase_radix_62() {
        assert_eq!(unbase("a", 62), Some(10));
        assert_eq!(unbase("Z", 62), Some(61));
        assert_eq!(unbase("10", 62), Some(62));
        assert_eq!(unbase("z", 36), Some(35));
        assert_eq!(unbase("_", 62), None);
    }

    #[test]
    fn test_unpack_or_source_passthrough() {
        assert_eq!(unpack_or_source("var plain = 1;"), "var plain = 1;");
    }
}
