// In-memory term model.
//
// `Term` is the closed set of values the codec produces and consumes. The
// encoder matches it exhaustively; the decoder builds it. Identity types
// (pids, references, ports) are carried through unchanged and compare
// field by field.
//
// # Modules
//
// - `atom`   : process-wide interning of atom names
// - `convert`: `From` conversions from host values
// - `display`: Erlang-like text rendering

pub mod atom;
mod convert;
mod display;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

pub use atom::Atom;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Process identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pid {
    pub node: String,
    pub id: u32,
    pub serial: u32,
    pub creation: u32,
}

/// Unique reference. `ids` is compared element-wise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub node: String,
    pub creation: u32,
    pub ids: Vec<u32>,
}

/// Port identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Port {
    pub node: String,
    pub id: u32,
    pub creation: u32,
}

/// External function reference `fun Module:Function/Arity`.
#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    pub module: Box<Term>,
    pub function: Box<Term>,
    pub arity: u8,
}

/// Closure descriptor. Decoded for inspection only; the encoder rejects it.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub size: u32,
    pub arity: u8,
    pub uniq: [u32; 4],
    pub index: u32,
    pub module: Box<Term>,
    pub old_index: Box<Term>,
    pub old_uniq: Box<Term>,
    pub owner: Box<Term>,
    pub free_vars: Vec<Term>,
}

/// A list whose terminator is `tail` instead of the empty list.
#[derive(Debug, Clone, PartialEq)]
pub struct ImproperList {
    pub head: Vec<Term>,
    pub tail: Box<Term>,
}

// ---------------------------------------------------------------------------
// Term
// ---------------------------------------------------------------------------

/// A value representable by the codec.
///
/// Tuples are encoded with tuple tags but decode as `List`; maps decode as
/// `Map` or, with `map_as_object`, as `Object`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Term {
    /// Absent value, encoded as the atom `nil`. Also the decoded form of the
    /// atoms `nil` and `null`. The empty list tag decodes to an empty `List`.
    #[default]
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    BigInt(BigInt),
    Atom(Atom),
    /// UTF-8 binary.
    Binary(String),
    /// Legacy string tag: a list of byte-sized integers.
    ByteList(Vec<u8>),
    List(Vec<Term>),
    ImproperList(ImproperList),
    Tuple(Vec<Term>),
    /// Explicit map, insertion order preserved.
    Map(Vec<(Term, Term)>),
    /// Keyed structure with text keys, insertion order preserved.
    Object(Vec<(String, Term)>),
    Pid(Pid),
    Reference(Reference),
    Port(Port),
    Export(Export),
    Function(Function),
}

impl Term {
    /// An interned atom.
    pub fn atom(name: &str) -> Self {
        Term::Atom(atom::intern(name))
    }

    pub fn tuple(elements: impl IntoIterator<Item = Term>) -> Self {
        Term::Tuple(elements.into_iter().collect())
    }

    /// A list terminated by `tail`.
    ///
    /// A list or nil tail is spliced in, so the result is either a proper
    /// `List` or an `ImproperList` whose tail is not a list. An empty head
    /// with a non-list tail yields the tail itself.
    pub fn improper(head: impl IntoIterator<Item = Term>, tail: Term) -> Self {
        let mut head: Vec<Term> = head.into_iter().collect();
        match tail {
            Term::Nil => {}
            Term::List(rest) => head.extend(rest),
            Term::ByteList(bytes) => {
                head.extend(bytes.into_iter().map(|b| Term::Integer(b.into())));
            }
            Term::ImproperList(rest) => {
                head.extend(rest.head);
                return Term::ImproperList(ImproperList {
                    head,
                    tail: rest.tail,
                });
            }
            tail if head.is_empty() => return tail,
            tail => {
                return Term::ImproperList(ImproperList {
                    head,
                    tail: Box::new(tail),
                });
            }
        }
        Term::List(head)
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Term::Nil)
    }

    /// Whether the term is a list terminated by the empty list. `Nil`
    /// counts as the empty list.
    pub fn is_proper_list(&self) -> bool {
        matches!(self, Term::Nil | Term::List(_) | Term::ByteList(_))
    }

    /// Integer value if the term is an integer that fits `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Term::Integer(v) => Some(*v),
            Term::BigInt(n) => n.to_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Term::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Term::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Text of a binary or an atom.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Term::Binary(s) => Some(s),
            Term::Atom(a) => Some(a.name()),
            _ => None,
        }
    }

    /// Elements of a proper list or a tuple. `Nil` is the empty slice.
    pub fn as_list(&self) -> Option<&[Term]> {
        match self {
            Term::Nil => Some(&[]),
            Term::List(items) | Term::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Look up `key` in an `Object`, or in a `Map` with binary or atom keys.
    pub fn get(&self, key: &str) -> Option<&Term> {
        match self {
            Term::Object(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            Term::Map(pairs) => pairs
                .iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Text under which this term is stored as a keyed-structure field.
    ///
    /// Binaries and atoms use their text, booleans and nil their atom
    /// names, numbers their decimal form; other keys use `Display`.
    pub fn to_property_key(&self) -> String {
        match self {
            Term::Binary(s) => s.clone(),
            Term::Atom(a) => a.name().to_owned(),
            Term::Nil => "nil".to_owned(),
            Term::Boolean(b) => b.to_string(),
            Term::Integer(v) => v.to_string(),
            Term::BigInt(n) => n.to_string(),
            Term::ByteList(bytes) => bytes.iter().map(|&b| char::from(b)).collect(),
            other => other.to_string(),
        }
    }

    /// Short name of the variant, for error messages and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Term::Nil => "nil",
            Term::Boolean(_) => "boolean",
            Term::Integer(_) => "integer",
            Term::Float(_) => "float",
            Term::BigInt(_) => "bigint",
            Term::Atom(_) => "atom",
            Term::Binary(_) => "binary",
            Term::ByteList(_) => "string",
            Term::List(_) => "list",
            Term::ImproperList(_) => "improper list",
            Term::Tuple(_) => "tuple",
            Term::Map(_) => "map",
            Term::Object(_) => "object",
            Term::Pid(_) => "pid",
            Term::Reference(_) => "reference",
            Term::Port(_) => "port",
            Term::Export(_) => "export",
            Term::Function(_) => "function",
        }
    }
}

/// Free-function form of [`Term::is_proper_list`].
pub fn is_proper_list(term: &Term) -> bool {
    term.is_proper_list()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
