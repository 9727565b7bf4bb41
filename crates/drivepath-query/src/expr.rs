//! Expression tree for the filter grammar.

/// A string-valued resource field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// `name`
    Name,
    /// `mimeType`
    MimeType,
}

/// Comparison operator on a [`Field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `contains`
    Contains,
}

/// Collection tested with `'<value>' in <collection>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// `parents`
    Parents,
    /// `owners`
    Owners,
}

/// A parsed filter expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Both sides hold.
    And(Box<Expr>, Box<Expr>),
    /// Either side holds.
    Or(Box<Expr>, Box<Expr>),
    /// The inner expression does not hold.
    Not(Box<Expr>),
    /// `field op 'value'`
    Compare {
        field: Field,
        op: CompareOp,
        value: String,
    },
    /// `'value' in collection`
    In {
        value: String,
        collection: Collection,
    },
    /// `properties has { key='k' and value='v' }`
    Property { key: String, value: String },
    /// `trashed = <bool>`
    Trashed(bool),
}

impl Expr {
    /// Conjunction helper.
    pub fn and(self, other: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(other))
    }

    /// Disjunction helper.
    pub fn or(self, other: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(other))
    }

    /// Negation helper.
    pub fn negate(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}
