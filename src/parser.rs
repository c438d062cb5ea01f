use tracing::debug;

use crate::builder::Builder;
use crate::error::{DomainSetError, Result};
use crate::options::BuildOptions;
use crate::text::Materializer;
use crate::types::{CapacityHint, RuleKind};

/// Marker that starts a capacity hint line
pub const CAPACITY_HINT_PREFIX: &str = "# domainset capacity hint ";
/// Terminator of a capacity hint line
pub const CAPACITY_HINT_SUFFIX: &str = "DSKR";

/// Parse a capacity hint line.
///
/// Format: `# domainset capacity hint <domains> <suffixes> <keywords> <regexps> DSKR`.
/// Returns `None` if the line does not start with the hint marker, so it can
/// be handled as an ordinary line. A line with the marker but anything else
/// wrong is an error.
pub fn parse_capacity_hint(line: &str) -> Result<Option<CapacityHint>> {
    let Some(rest) = line.strip_prefix(CAPACITY_HINT_PREFIX) else {
        return Ok(None);
    };

    let fields: Vec<&str> = rest.split(' ').collect();
    if fields.len() != 5 || fields[4] != CAPACITY_HINT_SUFFIX {
        return Err(DomainSetError::MalformedHint(format!(
            "expected 4 counts followed by {}: {}",
            CAPACITY_HINT_SUFFIX, line
        )));
    }

    let mut counts = [0usize; 4];
    for (count, field) in counts.iter_mut().zip(&fields[..4]) {
        *count = field.parse().map_err(|e| {
            DomainSetError::MalformedHint(format!("invalid count {:?}: {}", field, e))
        })?;
    }

    Ok(Some(CapacityHint::new(
        counts[0], counts[1], counts[2], counts[3],
    )))
}

/// Render a capacity hint line (without line terminator).
pub fn format_capacity_hint(hint: &CapacityHint) -> String {
    format!(
        "{}{} {} {} {} {}",
        CAPACITY_HINT_PREFIX,
        hint.domains,
        hint.suffixes,
        hint.keywords,
        hint.regexps,
        CAPACITY_HINT_SUFFIX
    )
}

/// Parse rule text into a builder.
///
/// Lines end with `\n` or `\r\n`. Empty lines and lines starting with `#`
/// are skipped. Every other line must start with `domain:`, `suffix:`,
/// `keyword:` or `regexp:`; the rest of the line is the rule, taken verbatim.
///
/// If `options.capacity_hint` is set, the first non-empty line may be a
/// capacity hint (see [`parse_capacity_hint`]) used to pre-size the builders.
/// Each rule goes through `materializer` before it is stored.
pub fn parse_rules<'a, M>(
    text: &'a str,
    materializer: &mut M,
    options: &BuildOptions,
) -> Result<Builder<M::Text>>
where
    M: Materializer<'a>,
{
    let mut hint = CapacityHint::default();
    if options.capacity_hint {
        if let Some(first) = text.lines().find(|line| !line.is_empty()) {
            if let Some(parsed) = parse_capacity_hint(first)? {
                debug!(
                    domains = parsed.domains,
                    suffixes = parsed.suffixes,
                    keywords = parsed.keywords,
                    regexps = parsed.regexps,
                    "using capacity hint"
                );
                hint = parsed.fit_text(text.len());
            }
        }
    }

    let mut builder = Builder::with_capacity(options, hint);

    for (line_num, line) in text.lines().enumerate() {
        // The hint line itself starts with '#' and is skipped here.
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (kind, rule) =
            RuleKind::split_line(line).ok_or_else(|| DomainSetError::InvalidLine {
                line: line_num + 1,
                content: line.to_string(),
            })?;
        builder.insert(kind, materializer.materialize(rule))?;
    }

    if builder.is_empty() {
        return Err(DomainSetError::EmptyRuleset);
    }

    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{Alias, Duplicate};

    #[test]
    fn test_parse_capacity_hint() {
        let hint = parse_capacity_hint("# domainset capacity hint 1 6 1 1 DSKR")
            .unwrap()
            .unwrap();
        assert_eq!(hint, CapacityHint::new(1, 6, 1, 1));
    }

    #[test]
    fn test_parse_capacity_hint_absent() {
        assert_eq!(parse_capacity_hint("# just a comment").unwrap(), None);
        assert_eq!(parse_capacity_hint("domain:example.com").unwrap(), None);
        assert_eq!(parse_capacity_hint("").unwrap(), None);
    }

    #[test]
    fn test_parse_capacity_hint_malformed() {
        for line in [
            "# domainset capacity hint 1 6 1 DSKR",
            "# domainset capacity hint 1 6 1 1 1 DSKR",
            "# domainset capacity hint 1 6 1 1",
            "# domainset capacity hint 1 6 1 1 XXXX",
            "# domainset capacity hint 1 x 1 1 DSKR",
            "# domainset capacity hint 1 -6 1 1 DSKR",
            "# domainset capacity hint 1  6 1 1 DSKR",
            "# domainset capacity hint ",
        ] {
            let result = parse_capacity_hint(line);
            assert!(
                matches!(result, Err(DomainSetError::MalformedHint(_))),
                "{:?} should be malformed, got {:?}",
                line,
                result
            );
        }
    }

    #[test]
    fn test_format_capacity_hint_parses_back() {
        let hint = CapacityHint::new(3, 0, 12, 7);
        let line = format_capacity_hint(&hint);
        assert_eq!(parse_capacity_hint(&line).unwrap(), Some(hint));
    }

    #[test]
    fn test_parse_rules() {
        let text = "# comment\n\ndomain:www.example.net\nsuffix:example.com\nkeyword:dev\nregexp:^a+$\n";
        let builder = parse_rules(text, &mut Alias, &BuildOptions::default()).unwrap();
        assert_eq!(builder.count(RuleKind::Domain), 1);
        assert_eq!(builder.count(RuleKind::Suffix), 1);
        assert_eq!(builder.count(RuleKind::Keyword), 1);
        assert_eq!(builder.count(RuleKind::Regexp), 1);
    }

    #[test]
    fn test_parse_rules_crlf() {
        let text = "domain:www.example.net\r\nsuffix:example.com\r\n";
        let set = parse_rules(text, &mut Duplicate, &BuildOptions::default())
            .unwrap()
            .freeze()
            .unwrap();
        assert!(set.matches("www.example.net"));
        assert!(set.matches("www.example.com"));
    }

    #[test]
    fn test_parse_rules_without_trailing_newline() {
        let builder = parse_rules("suffix:example.com", &mut Alias, &BuildOptions::default())
            .unwrap();
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_parse_rules_invalid_line() {
        let text = "domain:example.com\nfoo:bar\nsuffix:example.org\n";
        let err = parse_rules(text, &mut Alias, &BuildOptions::default()).unwrap_err();
        match err {
            DomainSetError::InvalidLine { line, content } => {
                assert_eq!(line, 2);
                assert_eq!(content, "foo:bar");
            }
            other => panic!("expected InvalidLine, got {}", other),
        }
    }

    #[test]
    fn test_parse_rules_rejects_indented_and_uppercase_tags() {
        for text in [" domain:example.com", "DOMAIN:example.com", " # comment\ndomain:a"] {
            let result = parse_rules(text, &mut Alias, &BuildOptions::default());
            assert!(
                matches!(result, Err(DomainSetError::InvalidLine { .. })),
                "{:?}",
                text
            );
        }
    }

    #[test]
    fn test_parse_rules_empty() {
        for text in ["", "\n\n", "# only\n# comments\n", "# domainset capacity hint 1 1 1 1 DSKR\n"] {
            let result = parse_rules(text, &mut Alias, &BuildOptions::default());
            assert!(
                matches!(result, Err(DomainSetError::EmptyRuleset)),
                "{:?}",
                text
            );
        }
    }

    #[test]
    fn test_parse_rules_regexp_error() {
        let err = parse_rules("regexp:(oops", &mut Alias, &BuildOptions::default()).unwrap_err();
        match err {
            DomainSetError::PatternCompile { pattern, .. } => assert_eq!(pattern, "(oops"),
            other => panic!("expected PatternCompile, got {}", other),
        }
    }

    #[test]
    fn test_malformed_hint_is_error_only_when_enabled() {
        let text = "# domainset capacity hint 1 two 3 4 DSKR\ndomain:example.com\n";
        let enabled = parse_rules(text, &mut Alias, &BuildOptions::default());
        assert!(matches!(enabled, Err(DomainSetError::MalformedHint(_))));

        let disabled = parse_rules(
            text,
            &mut Alias,
            &BuildOptions::default().with_capacity_hint(false),
        );
        assert_eq!(disabled.unwrap().len(), 1);
    }

    #[test]
    fn test_hint_only_checked_on_first_non_empty_line() {
        let text = "\ndomain:example.com\n# domainset capacity hint x x x x DSKR\n";
        let builder = parse_rules(text, &mut Alias, &BuildOptions::default()).unwrap();
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn test_hint_does_not_change_result() {
        let body = "domain:www.example.net\nsuffix:example.com\nkeyword:dev\n";
        let with_hint = format!("# domainset capacity hint 1 1 1 0 DSKR\n{}", body);
        let a = parse_rules(body, &mut Alias, &BuildOptions::default())
            .unwrap()
            .freeze()
            .unwrap();
        let b = parse_rules(&with_hint, &mut Alias, &BuildOptions::default())
            .unwrap()
            .freeze()
            .unwrap();
        for domain in ["www.example.net", "example.net", "a.example.com", "go.dev", "x"] {
            assert_eq!(a.matches(domain), b.matches(domain), "{}", domain);
        }
    }

    #[test]
    fn test_huge_hint_counts_are_harmless() {
        for counts in ["18446744073709551615 0 0 0", "0 1000000000000 7 18446744073709551615"] {
            let text = format!(
                "# domainset capacity hint {} DSKR\ndomain:a.com\nsuffix:b.com\n",
                counts
            );
            let set = parse_rules(&text, &mut Alias, &BuildOptions::default())
                .unwrap()
                .freeze()
                .unwrap();
            assert!(set.matches("a.com"));
            assert!(set.matches("x.b.com"));
            assert!(!set.matches("c.com"));
        }
    }

    #[test]
    fn test_payload_kept_verbatim() {
        let builder = parse_rules("keyword: dev\n", &mut Alias, &BuildOptions::default()).unwrap();
        let set = builder.freeze().unwrap();
        assert!(set.matches("my dev box"));
        assert!(!set.matches("go.dev"));
    }
}
