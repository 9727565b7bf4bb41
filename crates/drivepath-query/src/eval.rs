//! Local evaluation of parsed expressions against resources.

use drivepath_core::types::{ROOT_ID, RemoteResource};

use crate::expr::{Collection, CompareOp, Expr, Field};

impl Expr {
    /// Whether `resource` satisfies this expression.
    ///
    /// `contains` is a case-sensitive substring test. A resource without a
    /// parent link is treated as a child of the root alias.
    pub fn matches(&self, resource: &RemoteResource) -> bool {
        match self {
            Expr::And(a, b) => a.matches(resource) && b.matches(resource),
            Expr::Or(a, b) => a.matches(resource) || b.matches(resource),
            Expr::Not(inner) => !inner.matches(resource),
            Expr::Compare { field, op, value } => {
                let actual = match field {
                    Field::Name => resource.name.as_str(),
                    Field::MimeType => resource.mime_type.as_str(),
                };
                match op {
                    CompareOp::Eq => actual == value,
                    CompareOp::Ne => actual != value,
                    CompareOp::Contains => actual.contains(value.as_str()),
                }
            }
            Expr::In {
                value,
                collection: Collection::Parents,
            } => resource.parent_id.as_deref().unwrap_or(ROOT_ID) == value,
            Expr::In {
                value,
                collection: Collection::Owners,
            } => resource.owners.iter().any(|o| o == value),
            Expr::Property { key, value } => resource.properties.get(key) == Some(value),
            Expr::Trashed(flag) => resource.is_trashed == *flag,
        }
    }

    /// Rewrite `'root' in parents` to also accept `root_id`, the concrete id
    /// of the root folder.
    pub fn alias_root(self, root_id: &str) -> Expr {
        match self {
            Expr::And(a, b) => a.alias_root(root_id).and(b.alias_root(root_id)),
            Expr::Or(a, b) => a.alias_root(root_id).or(b.alias_root(root_id)),
            Expr::Not(inner) => inner.alias_root(root_id).negate(),
            Expr::In {
                value,
                collection: Collection::Parents,
            } if value == ROOT_ID => {
                let concrete = Expr::In {
                    value: root_id.to_string(),
                    collection: Collection::Parents,
                };
                Expr::In {
                    value,
                    collection: Collection::Parents,
                }
                .or(concrete)
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use drivepath_core::types::ResourceKind;

    use super::*;
    use crate::{Query, parse};

    fn doc(name: &str, parent: &str) -> RemoteResource {
        let mut r = RemoteResource::new("id", name, ResourceKind::PlainText, Some(parent.into()));
        r.properties.insert("tag".into(), "blue".into());
        r.owners.push("me@example.com".into());
        r
    }

    fn eval(q: &Query, r: &RemoteResource) -> bool {
        parse(&q.build()).map(|e| e.matches(r)).unwrap_or(false)
    }

    #[test]
    fn test_builder_output_evaluates() {
        let r = doc("notes.txt", "p1");
        assert!(eval(&Query::new().is_name("notes.txt").and().is_parent("p1"), &r));
        assert!(!eval(&Query::new().is_name("notes.txt").and().is_parent("p2"), &r));
        assert!(eval(&Query::new().is_not_type(ResourceKind::Folder), &r));
        assert!(eval(&Query::new().has_property_value("tag", "blue"), &r));
        assert!(!eval(&Query::new().has_not_property_value("tag", "blue"), &r));
        assert!(eval(&Query::new().is_owner("me@example.com"), &r));
        assert!(eval(&Query::new().type_contains("text/"), &r));
    }

    #[test]
    fn test_root_alias_matches_concrete_root() {
        let top = doc("a.txt", "my-drive");
        let q = Query::new().is_name("a.txt").and().is_parent(ROOT_ID);
        let expr = parse(&q.build()).unwrap();
        assert!(!expr.matches(&top));
        let aliased = expr.alias_root("my-drive");
        assert!(aliased.matches(&top));
        assert!(!aliased.matches(&doc("a.txt", "elsewhere")));

        let outside = parse(&Query::new().is_not_parent(ROOT_ID).build())
            .unwrap()
            .alias_root("my-drive");
        assert!(!outside.matches(&top));
    }

    #[test]
    fn test_trashed_clause_filters() {
        let mut r = doc("a", "p1");
        r.is_trashed = true;
        assert!(!eval(&Query::new(), &r));
        assert!(eval(&Query::new().include_trashed(true), &r));
    }

    #[test]
    fn test_missing_parent_is_root() {
        let r = RemoteResource::new("id", "a", ResourceKind::Pdf, None);
        assert!(eval(&Query::new().is_parent(ROOT_ID), &r));
    }
}
