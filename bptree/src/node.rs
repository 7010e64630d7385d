use eterm::Term;

use crate::error::{BTreeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Leaf,
    Interior,
}

/// A decoded `kv_node` (leaf) or `kp_node` (interior) term.
///
/// For a leaf, each entry is `(key, value)` where `value` is whatever the
/// document/merge layer put there. For an interior node, each entry is
/// `(key, (child_offset, child_reduction))` — the child pointer spec.md's
/// header repair and root probing need to descend through.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub offset: u64,
    pub entries: Vec<(Term, Term)>,
}

impl Node {
    pub fn from_term(offset: u64, term: Term) -> Result<Self> {
        let items = term.as_tuple().ok_or(BTreeError::NotANode(offset))?;
        if items.len() != 2 {
            return Err(BTreeError::NotANode(offset));
        }
        let tag = items[0].as_atom().ok_or(BTreeError::NotANode(offset))?;
        let kind = match tag {
            "kv_node" => NodeKind::Leaf,
            "kp_node" => NodeKind::Interior,
            other => return Err(BTreeError::UnknownTag(other.to_string())),
        };
        let list = items[1].as_list().ok_or(BTreeError::NotANode(offset))?;
        let mut entries = Vec::with_capacity(list.len());
        for item in list {
            let pair = item.as_tuple().ok_or(BTreeError::MalformedEntry(offset))?;
            if pair.len() != 2 {
                return Err(BTreeError::MalformedEntry(offset));
            }
            entries.push((pair[0].clone(), pair[1].clone()));
        }
        Ok(Node {
            kind,
            offset,
            entries,
        })
    }

    /// The child `(offset, reduction)` referenced by an interior entry's
    /// value.
    pub fn child_pointer(&self, value: &Term) -> Result<u64> {
        let pair = value.as_tuple().ok_or(BTreeError::MalformedEntry(self.offset))?;
        let offset = pair
            .first()
            .and_then(Term::as_integer)
            .ok_or(BTreeError::MalformedEntry(self.offset))?;
        Ok(offset as u64)
    }
}

/// Build the on-disk term for a leaf node with `(key, value)` entries.
pub fn encode_leaf(entries: Vec<(Term, Term)>) -> Term {
    Term::Tuple(vec![
        Term::atom("kv_node"),
        Term::List(entries.into_iter().map(|(k, v)| Term::Tuple(vec![k, v])).collect()),
    ])
}

/// Build the on-disk term for an interior node with `(key, (child_offset,
/// child_reduction))` entries.
pub fn encode_interior(entries: Vec<(Term, u64, Term)>) -> Term {
    Term::Tuple(vec![
        Term::atom("kp_node"),
        Term::List(
            entries
                .into_iter()
                .map(|(k, child_offset, reduction)| {
                    Term::Tuple(vec![
                        k,
                        Term::Tuple(vec![Term::Integer(child_offset as i64), reduction]),
                    ])
                })
                .collect(),
        ),
    ])
}
