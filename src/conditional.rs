//! `[and]`, `[or]` and `[not]` children.

/// How a nested filter combines with the running result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conditional {
    And,
    Or,
    Not,
}

impl Conditional {
    /// Recognise a conditional child tag.
    pub fn from_tag(tag: &str) -> Option<Conditional> {
        match tag {
            "and" => Some(Conditional::And),
            "or" => Some(Conditional::Or),
            "not" => Some(Conditional::Not),
            _ => None,
        }
    }

    /// Fold an already-computed child result into the running result.
    pub fn fold(self, acc: bool, child: bool) -> bool {
        match self {
            Conditional::And => acc && child,
            Conditional::Or => acc || child,
            Conditional::Not => acc && !child,
        }
    }
}

/// Fold `children` left to right. Every child is evaluated, even once the
/// result can no longer change.
pub fn fold_children<T>(
    base: bool,
    children: &[(Conditional, T)],
    mut eval: impl FnMut(&T) -> bool,
) -> bool {
    children
        .iter()
        .fold(base, |acc, (cond, child)| cond.fold(acc, eval(child)))
}
