use eterm::Term;

use crate::error::{DocModelError, Result};

/// A single leaf revision. Real document stores keep a full revision
/// *tree*; repair's merge layer only ever needs the leaves (the tips a
/// replicator would fetch), so that's all this models.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
    pub seq: u64,
    pub rev_num: u32,
    pub rev_hash: Vec<u8>,
    pub deleted: bool,
    pub body: Vec<u8>,
}

impl Revision {
    pub fn to_term(&self) -> Term {
        Term::Tuple(vec![
            Term::Integer(self.seq as i64),
            Term::Integer(self.rev_num as i64),
            Term::Binary(self.rev_hash.clone()),
            Term::atom(if self.deleted { "true" } else { "false" }),
            Term::Binary(self.body.clone()),
        ])
    }

    pub fn from_term(id: &[u8], term: &Term) -> Result<Self> {
        let items = term
            .as_tuple()
            .ok_or_else(|| DocModelError::MalformedDocument(id.to_vec()))?;
        if items.len() != 5 {
            return Err(DocModelError::MalformedDocument(id.to_vec()));
        }
        let seq = items[0]
            .as_integer()
            .ok_or_else(|| DocModelError::MalformedDocument(id.to_vec()))? as u64;
        let rev_num = items[1]
            .as_integer()
            .ok_or_else(|| DocModelError::MalformedDocument(id.to_vec()))? as u32;
        let rev_hash = items[2]
            .as_binary()
            .ok_or_else(|| DocModelError::MalformedDocument(id.to_vec()))?
            .to_vec();
        let deleted = items[3].as_atom() == Some("true");
        let body = items[4]
            .as_binary()
            .ok_or_else(|| DocModelError::MalformedDocument(id.to_vec()))?
            .to_vec();
        Ok(Revision {
            seq,
            rev_num,
            rev_hash,
            deleted,
            body,
        })
    }
}

/// A document: an id plus every leaf revision currently known for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: Vec<u8>,
    pub revisions: Vec<Revision>,
}

impl Document {
    /// Decode a by-id leaf entry `(key, value)` into a `Document`. `key` is
    /// the document id (a binary); `value` is the list of leaf revisions.
    pub fn from_entry(key: &Term, value: &Term) -> Result<Self> {
        let id = key
            .as_binary()
            .ok_or_else(|| DocModelError::MalformedDocument(Vec::new()))?
            .to_vec();
        let revs = value
            .as_list()
            .ok_or_else(|| DocModelError::MalformedDocument(id.clone()))?;
        let revisions = revs
            .iter()
            .map(|t| Revision::from_term(&id, t))
            .collect::<Result<Vec<_>>>()?;
        Ok(Document { id, revisions })
    }

    pub fn to_entry(&self) -> (Term, Term) {
        (
            Term::Binary(self.id.clone()),
            Term::List(self.revisions.iter().map(Revision::to_term).collect()),
        )
    }

    /// Merge another copy of the same document in by revision identity
    /// (`rev_num`, `rev_hash`), keeping the union of leaves. The merge
    /// service is assumed idempotent with respect to revisions (spec.md
    /// §4.6); this is the idempotent union that assumption licenses.
    pub fn merge_from(&mut self, other: &Document) {
        for rev in &other.revisions {
            let already = self
                .revisions
                .iter()
                .any(|r| r.rev_num == rev.rev_num && r.rev_hash == rev.rev_hash);
            if !already {
                self.revisions.push(rev.clone());
            }
        }
    }
}
