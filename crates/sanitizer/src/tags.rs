use std::collections::BTreeSet;

/// A whitelist of lowercase tag names.
///
/// Keeps a pre-rendered, HTML-encoded listing (`&lt;a&gt;, &lt;b&gt;`) for
/// error messages, so swapping sets during validation never re-formats.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllowedTagSet {
    tags: BTreeSet<String>,
    described: String,
}

impl AllowedTagSet {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags: BTreeSet<String> = tags
            .into_iter()
            .map(|t| t.as_ref().trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        let described = tags
            .iter()
            .map(|t| encoded(t))
            .collect::<Vec<_>>()
            .join(", ");
        Self { tags, described }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Tags of `self` that `outer` also allows, plus `always` when `self`
    /// names it.
    pub fn within(&self, outer: &AllowedTagSet, always: &str) -> Self {
        Self::new(self.iter().filter(|t| *t == always || outer.contains(t)))
    }

    /// Encoded, comma-separated listing of every tag in the set.
    pub fn describe(&self) -> &str {
        &self.described
    }
}

/// `a` -> `&lt;a&gt;`.
pub fn encoded(tag: &str) -> String {
    format!("&lt;{tag}&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_and_describes() {
        let set = AllowedTagSet::new(["Strong", " a ", "", "b", "a"]);
        assert_eq!(set.len(), 3);
        assert!(set.contains("strong"));
        assert!(!set.contains("Strong"));
        assert_eq!(set.describe(), "&lt;a&gt;, &lt;b&gt;, &lt;strong&gt;");
    }

    #[test]
    fn within_never_widens_the_outer_set() {
        let list = AllowedTagSet::new(["a", "b", "li", "ol", "ul"]);
        let outer = AllowedTagSet::new(["p", "ul", "b"]);
        let narrowed = list.within(&outer, "li");
        assert_eq!(narrowed.iter().collect::<Vec<_>>(), ["b", "li", "ul"]);
    }

    #[test]
    fn empty_set_describes_as_empty() {
        let set = AllowedTagSet::new(Vec::<String>::new());
        assert!(set.is_empty());
        assert_eq!(set.describe(), "");
    }
}
