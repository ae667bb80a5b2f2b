//! Ant-style URL patterns: `?` matches one character and `*` any run of
//! characters within a segment, while `**` spans any number of segments.

use glob::{MatchOptions, Pattern, PatternError};

const ANY_DEPTH: &str = "/**";

const OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Compiled Ant-style pattern. A trailing slash makes no difference on
/// either side, and `/prefix/**` also matches `/prefix` itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AntPattern {
    raw: String,
    compiled: Pattern,
    /// Path a trailing `/**` hangs off, matched on its own too.
    any_depth_prefix: Option<Pattern>,
    catch_all: bool,
}

/// Collapse repeated slashes and drop a trailing one.
fn normalize(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

impl AntPattern {
    /// # Errors
    ///
    /// [`PatternError`] for malformed wildcards, e.g. `**` glued to other
    /// characters within a segment.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let trimmed = pattern.trim_end_matches('/');
        let (normalized, prefix) = match trimmed.strip_suffix(ANY_DEPTH) {
            Some(prefix) => {
                let prefix = normalize(prefix);
                (format!("{}{ANY_DEPTH}", prefix.trim_end_matches('/')), Some(prefix))
            }
            None => (normalize(pattern), None),
        };
        let catch_all = prefix.as_deref() == Some("/");
        Ok(Self {
            raw: pattern.to_owned(),
            compiled: Pattern::new(&normalized)?,
            any_depth_prefix: prefix.map(|p| Pattern::new(&p)).transpose()?,
            catch_all,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// `true` for `/**`, which matches every path.
    #[must_use]
    pub fn is_catch_all(&self) -> bool {
        self.catch_all
    }

    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        if self.catch_all {
            return true;
        }
        let path = normalize(path);
        self.any_depth_prefix
            .as_ref()
            .is_some_and(|prefix| prefix.matches_with(&path, OPTIONS))
            || self.compiled.matches_with(&path, OPTIONS)
    }
}
