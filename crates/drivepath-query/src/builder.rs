//! Immutable query expression builder.
//!
//! Every method borrows `self` and returns a new [`Query`], so a partially
//! built expression can be shared between branches without interference.
//! Calls compose left to right; connectives between predicates are explicit.
//!
//! ```
//! use drivepath_core::types::ResourceKind;
//! use drivepath_query::Query;
//!
//! let q = Query::new()
//!     .is_type(ResourceKind::Folder)
//!     .and()
//!     .is_not_type(ResourceKind::Shortcut);
//! assert!(q.build().ends_with(" trashed = false "));
//! ```

use std::fmt;

use drivepath_core::types::ResourceKind;

/// Escape a value for interpolation between single quotes.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(c),
        }
    }
    out
}

/// An accumulated filter expression plus the trashed-inclusion flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    content: String,
    include_trashed: bool,
}

impl Query {
    /// An empty expression that excludes trashed resources.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, fragment: &str) -> Self {
        let mut content = String::with_capacity(self.content.len() + fragment.len());
        content.push_str(&self.content);
        content.push_str(fragment);
        Self {
            content,
            include_trashed: self.include_trashed,
        }
    }

    fn push_negated(&self, negate: bool, predicate: String) -> Self {
        if negate {
            self.push(&format!(" not{predicate}"))
        } else {
            self.push(&predicate)
        }
    }

    fn mime(&self, op: &str, mime_type: &str) -> Self {
        self.push(&format!(" mimeType {op} '{}' ", escape(mime_type)))
    }

    /// `mimeType = '<kind>'`.
    pub fn is_type(&self, kind: ResourceKind) -> Self {
        self.mime("=", kind.mime_type())
    }

    /// `mimeType != '<kind>'`.
    pub fn is_not_type(&self, kind: ResourceKind) -> Self {
        self.mime("!=", kind.mime_type())
    }

    /// `mimeType = '<mime>'` for a raw MIME string.
    pub fn is_mime_type(&self, mime_type: &str) -> Self {
        self.mime("=", mime_type)
    }

    /// `mimeType contains '<text>'`.
    pub fn type_contains(&self, text: &str) -> Self {
        self.mime("contains", text)
    }

    /// `not mimeType contains '<text>'`.
    pub fn type_not_contains(&self, text: &str) -> Self {
        self.push_negated(true, format!(" mimeType contains '{}' ", escape(text)))
    }

    /// `'<email>' in owners`.
    pub fn is_owner(&self, email: &str) -> Self {
        self.push(&format!(" '{}' in owners ", escape(email)))
    }

    /// `name = '<name>'`.
    pub fn is_name(&self, name: &str) -> Self {
        self.push(&format!(" name = '{}' ", escape(name)))
    }

    /// `name contains '<text>'`.
    pub fn name_contains(&self, text: &str) -> Self {
        self.push(&format!(" name contains '{}' ", escape(text)))
    }

    /// `not name contains '<text>'`.
    pub fn name_not_contains(&self, text: &str) -> Self {
        self.push_negated(true, format!(" name contains '{}' ", escape(text)))
    }

    /// `'<id>' in parents`.
    pub fn is_parent(&self, id: &str) -> Self {
        self.push(&format!(" '{}' in parents ", escape(id)))
    }

    /// `not '<id>' in parents`.
    pub fn is_not_parent(&self, id: &str) -> Self {
        self.push_negated(true, format!(" '{}' in parents ", escape(id)))
    }

    fn property(&self, negate: bool, key: &str, value: &str) -> Self {
        self.push_negated(
            negate,
            format!(
                " properties has {{ key='{}' and value='{}' }} ",
                escape(key),
                escape(value)
            ),
        )
    }

    /// `properties has { key='<key>' and value='<value>' }`.
    pub fn has_property_value(&self, key: &str, value: &str) -> Self {
        self.property(false, key, value)
    }

    /// `not properties has { key='<key>' and value='<value>' }`.
    pub fn has_not_property_value(&self, key: &str, value: &str) -> Self {
        self.property(true, key, value)
    }

    /// Select trashed (`true`) or live (`false`) resources in the final clause.
    pub fn include_trashed(&self, include: bool) -> Self {
        Self {
            content: self.content.clone(),
            include_trashed: include,
        }
    }

    fn connective(&self, word: &str) -> Self {
        if self.is_empty() {
            self.clone()
        } else {
            self.push(&format!(" {word} "))
        }
    }

    /// Bare `and` between two predicates of this chain.
    pub fn and(&self) -> Self {
        self.connective("and")
    }

    /// Bare `or` between two predicates of this chain.
    pub fn or(&self) -> Self {
        self.connective("or")
    }

    fn group(&self, word: &str, other: Option<&Query>) -> Self {
        match other {
            Some(other) if !other.is_empty() => {
                let grouped = format!(" ( {} ) ", other.content);
                if self.is_empty() {
                    self.push(&grouped)
                } else {
                    self.push(&format!(" {word} {grouped}"))
                }
            }
            _ => self.clone(),
        }
    }

    /// Append `and ( <other> )`; a missing or empty `other` changes nothing.
    pub fn and_group(&self, other: Option<&Query>) -> Self {
        self.group("and", other)
    }

    /// Append `or ( <other> )`; a missing or empty `other` changes nothing.
    pub fn or_group(&self, other: Option<&Query>) -> Self {
        self.group("or", other)
    }

    fn binary(&self, word: &str, a: &Query, b: &Query) -> Self {
        Self {
            content: format!(" ( {} ) {word} ( {} ) ", a.content, b.content),
            include_trashed: self.include_trashed,
        }
    }

    /// `( <a> ) and ( <b> )`, replacing this expression's content.
    pub fn all_of(&self, a: &Query, b: &Query) -> Self {
        self.binary("and", a, b)
    }

    /// `( <a> ) or ( <b> )`, replacing this expression's content.
    pub fn any_of(&self, a: &Query, b: &Query) -> Self {
        self.binary("or", a, b)
    }

    /// Whether no predicate has been added.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Whether the final clause selects trashed resources.
    pub fn includes_trashed(&self) -> bool {
        self.include_trashed
    }

    /// The accumulated content without the trailing trashed clause.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Render the filter string, ending in the trashed clause.
    pub fn build(&self) -> String {
        let trashed = format!(" trashed = {} ", self.include_trashed);
        if self.is_empty() {
            trashed
        } else {
            format!("{} and {trashed}", self.content)
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_build_is_only_trashed_clause() {
        assert_eq!(Query::new().build(), " trashed = false ");
        assert_eq!(Query::new().include_trashed(true).build(), " trashed = true ");
    }

    #[test]
    fn test_build_is_repeatable() {
        let q = Query::new().is_name("report");
        assert_eq!(q.build(), q.build());
    }

    #[test]
    fn test_folder_and_not_shortcut() {
        let built = Query::new()
            .is_type(ResourceKind::Folder)
            .and()
            .is_not_type(ResourceKind::Shortcut)
            .build();
        assert_eq!(
            built,
            " mimeType = 'application/vnd.google-apps.folder'  and  \
             mimeType != 'application/vnd.google-apps.shortcut'  and  trashed = false "
        );
    }

    #[test]
    fn test_branches_do_not_interfere() {
        let base = Query::new().is_parent("p1");
        let folders = base.and().is_type(ResourceKind::Folder);
        let files = base.and().is_not_type(ResourceKind::Folder);
        assert_eq!(base.content(), " 'p1' in parents ");
        assert!(folders.content().contains("mimeType = "));
        assert!(files.content().contains("mimeType != "));
        assert!(!folders.content().contains("!="));
    }

    #[test]
    fn test_every_value_is_escaped() {
        let q = Query::new()
            .is_name("it's")
            .and()
            .is_owner("o'neil@example.com")
            .and()
            .has_property_value("k'", "back\\slash");
        let content = q.content();
        assert!(content.contains("name = 'it\\'s'"));
        assert!(content.contains("'o\\'neil@example.com' in owners"));
        assert!(content.contains("key='k\\'' and value='back\\\\slash'"));
    }

    #[test]
    fn test_negations_prefix_predicate() {
        let q = Query::new().name_not_contains("tmp").and().is_not_parent("x");
        assert_eq!(
            q.content(),
            " not name contains 'tmp'  and  not 'x' in parents "
        );
    }

    #[test]
    fn test_group_with_missing_or_empty_other_is_noop() {
        let q = Query::new().is_name("a");
        assert_eq!(q.and_group(None), q);
        assert_eq!(q.and_group(Some(&Query::new())), q);
    }

    #[test]
    fn test_group_parenthesizes_other() {
        let other = Query::new().is_name("a").or().is_name("b");
        let q = Query::new().is_parent("p").and_group(Some(&other));
        assert_eq!(
            q.content(),
            " 'p' in parents  and  (  name = 'a'  or  name = 'b'  ) "
        );
    }

    #[test]
    fn test_group_on_empty_expression_has_no_leading_connective() {
        let other = Query::new().is_name("a");
        let q = Query::new().or_group(Some(&other));
        assert_eq!(q.content(), " (  name = 'a'  ) ");
    }

    #[test]
    fn test_binary_composition_discards_prior_content() {
        let a = Query::new().is_name("a");
        let b = Query::new().is_name("b");
        let q = Query::new().is_parent("ignored").any_of(&a, &b);
        assert!(!q.content().contains("ignored"));
        assert_eq!(q.content(), " (  name = 'a'  ) or (  name = 'b'  ) ");
    }

    #[test]
    fn test_connective_on_empty_expression_is_skipped() {
        let q = Query::new().and().is_name("a");
        assert_eq!(q.content(), " name = 'a' ");
    }
}
