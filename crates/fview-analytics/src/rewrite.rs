//! Best-effort rewrite of loose dict syntax into strict JSON.
//!
//! Handles the conventions seen in Python dict reprs that producers leak
//! into the analytics channel. The rewrite is textual and approximate; the
//! result must still survive a strict parse to be accepted.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Bare identifier keys: `{team=` / `, team=` / `{team:` / `, team:`.
static BARE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([{,]\s*)([A-Za-z_][A-Za-z0-9_]*)\s*[=:]").expect("bare-key regex")
});

/// Single-quoted strings.
static SINGLE_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'([^']*)'").expect("single-quote regex"));

/// Python literals in value position (after `:`, `[` or `,`).
static PY_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([:\[,]\s*)(True|False|None)\b").expect("literal regex"));

/// Bare-word values: `: diamond,` / `: home}`.
static BARE_WORD_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r":\s*([A-Za-z_][A-Za-z0-9_]*)(\s*[,}\]])").expect("bare-word regex")
});

/// Rewrite loose dict text into something a strict JSON parser may accept.
///
/// Applied in order: quote bare keys, convert single-quoted strings,
/// rewrite boolean/null literal spellings, quote bare-word values.
pub fn rewrite_loose_payload(raw: &str) -> String {
    let keyed = BARE_KEY.replace_all(raw, |caps: &Captures| {
        format!("{}\"{}\":", &caps[1], &caps[2])
    });

    let quoted = SINGLE_QUOTED.replace_all(&keyed, |caps: &Captures| {
        format!("\"{}\"", caps[1].replace('"', "\\\""))
    });

    let literals = PY_LITERAL.replace_all(&quoted, |caps: &Captures| {
        let lit = match &caps[2] {
            "True" => "true",
            "False" => "false",
            _ => "null",
        };
        format!("{}{}", &caps[1], lit)
    });

    BARE_WORD_VALUE
        .replace_all(&literals, |caps: &Captures| {
            match &caps[1] {
                // Already-valid JSON literals stay bare
                "true" | "false" | "null" => format!(": {}{}", &caps[1], &caps[2]),
                word => format!(": \"{}\"{}", word, &caps[2]),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotes_bare_equals_keys() {
        assert_eq!(rewrite_loose_payload("{team='A'}"), r#"{"team":"A"}"#);
    }

    #[test]
    fn test_quotes_bare_colon_keys() {
        assert_eq!(rewrite_loose_payload("{score: 3}"), r#"{"score": 3}"#);
    }

    #[test]
    fn test_rewrites_python_literals() {
        assert_eq!(
            rewrite_loose_payload("{won=True, lost=False, draw=None}"),
            r#"{"won": true, "lost": false, "draw": null}"#
        );
    }

    #[test]
    fn test_quotes_bare_word_values() {
        assert_eq!(
            rewrite_loose_payload("{formation=diamond}"),
            r#"{"formation": "diamond"}"#
        );
    }

    #[test]
    fn test_numbers_left_alone() {
        assert_eq!(
            rewrite_loose_payload("{passes=234, possession=65.5}"),
            r#"{"passes":234, "possession":65.5}"#
        );
    }

    #[test]
    fn test_escapes_inner_double_quotes() {
        assert_eq!(
            rewrite_loose_payload(r#"{note='a "quoted" word'}"#),
            r#"{"note":"a \"quoted\" word"}"#
        );
    }

    #[test]
    fn test_already_strict_json_survives() {
        let strict = r#"{"team": "A", "won": true}"#;
        let rewritten = rewrite_loose_payload(strict);
        let value: serde_json::Value = serde_json::from_str(&rewritten).unwrap();
        assert_eq!(value["team"], "A");
        assert_eq!(value["won"], true);
    }
}
