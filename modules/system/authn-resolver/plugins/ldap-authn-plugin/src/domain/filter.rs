//! RFC 4515 search filters: escaping for values we splice in, and a small
//! evaluator for directories kept in memory.

use authn_resolver_sdk::ports::DirectoryEntry;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid search filter at offset {offset}: {reason}")]
pub struct FilterError {
    pub offset: usize,
    pub reason: &'static str,
}

/// Escape an assertion value so it matches literally.
#[must_use]
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\5c"),
            '*' => out.push_str("\\2a"),
            '(' => out.push_str("\\28"),
            ')' => out.push_str("\\29"),
            '\0' => out.push_str("\\00"),
            _ => out.push(c),
        }
    }
    out
}

/// Substitute the escaped login name for `{0}` in a filter template.
#[must_use]
pub fn bind_placeholder(template: &str, login: &str) -> String {
    template.replace("{0}", &escape(login))
}

/// Parsed filter. Matching is case-insensitive on attribute names and values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Present(String),
    Equal {
        attr: String,
        value: String,
    },
    Substring {
        attr: String,
        initial: Option<String>,
        any: Vec<String>,
        last: Option<String>,
    },
}

impl Filter {
    /// # Errors
    ///
    /// Returns [`FilterError`] on malformed input.
    pub fn parse(input: &str) -> Result<Self, FilterError> {
        let mut parser = Parser {
            src: input.trim(),
            pos: 0,
        };
        let filter = parser.filter()?;
        if parser.pos != parser.src.len() {
            return Err(parser.error("trailing characters"));
        }
        Ok(filter)
    }

    #[must_use]
    pub fn matches(&self, entry: &DirectoryEntry) -> bool {
        match self {
            Self::And(items) => items.iter().all(|f| f.matches(entry)),
            Self::Or(items) => items.iter().any(|f| f.matches(entry)),
            Self::Not(inner) => !inner.matches(entry),
            Self::Present(attr) => !entry.values(attr).is_empty(),
            Self::Equal { attr, value } => {
                let wanted = value.to_lowercase();
                entry.values(attr).iter().any(|v| v.to_lowercase() == wanted)
            }
            Self::Substring {
                attr,
                initial,
                any,
                last,
            } => entry
                .values(attr)
                .iter()
                .any(|v| substring_match(v, initial.as_deref(), any, last.as_deref())),
        }
    }
}

fn substring_match(value: &str, initial: Option<&str>, any: &[String], last: Option<&str>) -> bool {
    let value = value.to_lowercase();
    let mut rest = value.as_str();

    if let Some(initial) = initial {
        match rest.strip_prefix(initial.to_lowercase().as_str()) {
            Some(tail) => rest = tail,
            None => return false,
        }
    }
    for part in any {
        let part = part.to_lowercase();
        match rest.find(&part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    last.is_none_or(|last| rest.ends_with(&last.to_lowercase()))
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, reason: &'static str) -> FilterError {
        FilterError {
            offset: self.pos,
            reason,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8, reason: &'static str) -> Result<(), FilterError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(reason))
        }
    }

    fn filter(&mut self) -> Result<Filter, FilterError> {
        self.expect(b'(', "expected '('")?;
        let filter = match self.peek() {
            Some(b'&') => {
                self.pos += 1;
                Filter::And(self.list()?)
            }
            Some(b'|') => {
                self.pos += 1;
                Filter::Or(self.list()?)
            }
            Some(b'!') => {
                self.pos += 1;
                Filter::Not(Box::new(self.filter()?))
            }
            Some(_) => self.item()?,
            None => return Err(self.error("unexpected end of filter")),
        };
        self.expect(b')', "expected ')'")?;
        Ok(filter)
    }

    fn list(&mut self) -> Result<Vec<Filter>, FilterError> {
        let mut items = Vec::new();
        while self.peek() == Some(b'(') {
            items.push(self.filter()?);
        }
        if items.is_empty() {
            return Err(self.error("empty filter list"));
        }
        Ok(items)
    }

    fn item(&mut self) -> Result<Filter, FilterError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b'=' | b'(' | b')' | b'~' | b'<' | b'>') {
                break;
            }
            self.pos += 1;
        }
        let attr = self.src[start..self.pos].trim();
        if attr.is_empty() {
            return Err(self.error("missing attribute name"));
        }
        if self.peek() != Some(b'=') {
            return Err(self.error("only equality, presence and substring filters are supported"));
        }
        self.pos += 1;

        let value_start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b'(' | b')') {
                break;
            }
            self.pos += 1;
        }
        let raw = &self.src[value_start..self.pos];
        let attr = attr.to_owned();

        if raw == "*" {
            return Ok(Filter::Present(attr));
        }
        if !raw.contains('*') {
            return Ok(Filter::Equal {
                attr,
                value: unescape(raw).map_err(|reason| self.error(reason))?,
            });
        }

        let parts: Vec<&str> = raw.split('*').collect();
        let decode = |s: &str| unescape(s).map_err(|reason| self.error(reason));
        let initial = parts.first().copied().filter(|s| !s.is_empty()).map(&decode).transpose()?;
        let last = parts.last().copied().filter(|s| !s.is_empty()).map(&decode).transpose()?;
        let any = parts
            .get(1..parts.len().saturating_sub(1))
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(|s| !s.is_empty())
            .map(&decode)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Filter::Substring {
            attr,
            initial,
            any,
            last,
        })
    }
}

fn unescape(raw: &str) -> Result<String, &'static str> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            let hex = raw.get(i + 1..i + 3).ok_or("truncated escape")?;
            let byte = u8::from_str_radix(hex, 16).map_err(|_| "invalid escape")?;
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| "escape produces invalid UTF-8")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn person() -> DirectoryEntry {
        DirectoryEntry::new("uid=jdoe,ou=people,dc=example,dc=org")
            .with_attribute("objectClass", ["top", "inetOrgPerson"])
            .with_attribute("uid", ["jdoe"])
            .with_attribute("cn", ["John Doe"])
    }

    #[test]
    fn escapes_special_characters() {
        assert_eq!(escape("a*b(c)d\\e"), "a\\2ab\\28c\\29d\\5ce");
        assert_eq!(bind_placeholder("(uid={0})", "x)(uid=*"), "(uid=x\\29\\28uid=\\2a)");
    }

    #[test]
    fn escaped_login_cannot_widen_the_filter() {
        let filter = Filter::parse(&bind_placeholder("(uid={0})", "*")).unwrap();
        assert!(!filter.matches(&person()));
        assert_eq!(
            filter,
            Filter::Equal {
                attr: "uid".to_owned(),
                value: "*".to_owned()
            }
        );
    }

    #[test]
    fn evaluates_composite_filters() {
        let entry = person();
        let matching = [
            "(uid=jdoe)",
            "(UID=JDOE)",
            "(&(objectClass=inetOrgPerson)(uid=jdoe))",
            "(|(uid=nobody)(cn=John*))",
            "(!(uid=nobody))",
            "(cn=*Doe)",
            "(cn=J*n*D*)",
            "(mail=*)",
        ];
        for raw in matching.iter().take(7) {
            assert!(Filter::parse(raw).unwrap().matches(&entry), "{raw}");
        }
        assert!(!Filter::parse(matching[7]).unwrap().matches(&entry));
        assert!(!Filter::parse("(&(uid=jdoe)(cn=Jane*))").unwrap().matches(&entry));
    }

    #[test]
    fn rejects_malformed_filters() {
        for raw in ["uid=jdoe", "(uid=jdoe", "(&)", "(=x)", "(uid>=1)", "(uid=\\zz)", "(a=b)x"] {
            assert!(Filter::parse(raw).is_err(), "{raw}");
        }
    }
}
