/// A decoded (or to-be-encoded) Erlang external term, restricted to the
/// handful of shapes a B-tree node or header field needs: tuples, lists,
/// atoms, integers and binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// `SMALL_INTEGER_EXT` / `INTEGER_EXT` / `SMALL_BIG_EXT`, all collapsed
    /// to a signed 64-bit value — large enough for an update-sequence
    /// counter or a node/reduction offset.
    Integer(i64),
    /// `BINARY_EXT` — a byte string. Document ids and leaf keys are always
    /// binaries, never atoms or lists.
    Binary(Vec<u8>),
    /// `ATOM_EXT` — used only for the `kv_node`/`kp_node` tags.
    Atom(String),
    /// `SMALL_TUPLE_EXT` / `LARGE_TUPLE_EXT`.
    Tuple(Vec<Term>),
    /// `LIST_EXT` with a `NIL_EXT` tail. Proper lists only; no improper
    /// (dotted) list support since node terms never produce one.
    List(Vec<Term>),
}

impl Term {
    pub fn atom(name: &str) -> Term {
        Term::Atom(name.to_string())
    }

    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Term::Atom(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Term]> {
        match self {
            Term::Tuple(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Term]> {
        match self {
            Term::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            Term::Binary(b) => Some(b.as_slice()),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Term::Integer(i) => Some(*i),
            _ => None,
        }
    }
}
