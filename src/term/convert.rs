// Host value → Term conversions.
//
// Integers that fit 32 bits become `Integer`; wider ones become `BigInt`
// so no precision is lost on the way to the wire.

use std::collections::{BTreeMap, HashMap};

use num_bigint::BigInt;

use super::{Atom, Export, Function, ImproperList, Pid, Port, Reference, Term};

impl From<bool> for Term {
    fn from(b: bool) -> Self {
        Term::Boolean(b)
    }
}

macro_rules! from_narrow_int {
    ($($t:ty),*) => {$(
        impl From<$t> for Term {
            #[inline]
            fn from(v: $t) -> Self {
                Term::Integer(i64::from(v))
            }
        }
    )*};
}

from_narrow_int!(i8, i16, i32, u8, u16);

macro_rules! from_wide_int {
    ($($t:ty),*) => {$(
        impl From<$t> for Term {
            fn from(v: $t) -> Self {
                match i32::try_from(v) {
                    Ok(small) => Term::Integer(i64::from(small)),
                    Err(_) => Term::BigInt(BigInt::from(v)),
                }
            }
        }
    )*};
}

from_wide_int!(u32, i64, u64, i128, u128, isize, usize);

impl From<f64> for Term {
    fn from(v: f64) -> Self {
        Term::Float(v)
    }
}

impl From<f32> for Term {
    fn from(v: f32) -> Self {
        Term::Float(f64::from(v))
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term::Binary(s.to_owned())
    }
}

impl From<String> for Term {
    fn from(s: String) -> Self {
        Term::Binary(s)
    }
}

impl From<()> for Term {
    fn from(_: ()) -> Self {
        Term::Nil
    }
}

impl<T: Into<Term>> From<Option<T>> for Term {
    fn from(v: Option<T>) -> Self {
        v.map_or(Term::Nil, Into::into)
    }
}

impl<T: Into<Term>> From<Vec<T>> for Term {
    fn from(items: Vec<T>) -> Self {
        Term::List(items.into_iter().map(Into::into).collect())
    }
}

impl<A: Into<Term>, B: Into<Term>> From<(A, B)> for Term {
    fn from((a, b): (A, B)) -> Self {
        Term::Tuple(vec![a.into(), b.into()])
    }
}

impl<A: Into<Term>, B: Into<Term>, C: Into<Term>> From<(A, B, C)> for Term {
    fn from((a, b, c): (A, B, C)) -> Self {
        Term::Tuple(vec![a.into(), b.into(), c.into()])
    }
}

impl<K: Into<Term>, V: Into<Term>, S> From<HashMap<K, V, S>> for Term {
    fn from(map: HashMap<K, V, S>) -> Self {
        Term::Map(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<Term>, V: Into<Term>> From<BTreeMap<K, V>> for Term {
    fn from(map: BTreeMap<K, V>) -> Self {
        Term::Map(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<BigInt> for Term {
    fn from(n: BigInt) -> Self {
        Term::BigInt(n)
    }
}

impl From<Atom> for Term {
    fn from(a: Atom) -> Self {
        Term::Atom(a)
    }
}

impl From<Pid> for Term {
    fn from(p: Pid) -> Self {
        Term::Pid(p)
    }
}

impl From<Reference> for Term {
    fn from(r: Reference) -> Self {
        Term::Reference(r)
    }
}

impl From<Port> for Term {
    fn from(p: Port) -> Self {
        Term::Port(p)
    }
}

impl From<Export> for Term {
    fn from(e: Export) -> Self {
        Term::Export(e)
    }
}

impl From<Function> for Term {
    fn from(f: Function) -> Self {
        Term::Function(f)
    }
}

impl From<ImproperList> for Term {
    fn from(l: ImproperList) -> Self {
        Term::ImproperList(l)
    }
}
