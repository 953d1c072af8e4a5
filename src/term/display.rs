// Erlang-like rendering of terms.

use std::fmt::{self, Display, Formatter, Write};

use super::Term;

fn write_seq(f: &mut Formatter<'_>, items: &[Term]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

fn write_quoted(f: &mut Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            c => write!(f, "{}", c.escape_debug())?,
        }
    }
    f.write_char('"')
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Term::Nil => f.write_str("nil"),
            Term::Boolean(b) => write!(f, "{b}"),
            Term::Integer(v) => write!(f, "{v}"),
            Term::Float(v) => write!(f, "{v:?}"),
            Term::BigInt(n) => write!(f, "{n}"),
            Term::Atom(a) => write!(f, "{a}"),
            Term::Binary(s) => {
                f.write_str("<<")?;
                write_quoted(f, s)?;
                f.write_str(">>")
            }
            Term::ByteList(bytes) => {
                if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
                    let text: String = bytes.iter().map(|&b| char::from(b)).collect();
                    write_quoted(f, &text)
                } else {
                    f.write_char('[')?;
                    for (i, b) in bytes.iter().enumerate() {
                        if i > 0 {
                            f.write_char(',')?;
                        }
                        write!(f, "{b}")?;
                    }
                    f.write_char(']')
                }
            }
            Term::List(items) => {
                f.write_char('[')?;
                write_seq(f, items)?;
                f.write_char(']')
            }
            Term::ImproperList(l) => {
                f.write_char('[')?;
                write_seq(f, &l.head)?;
                write!(f, "|{}]", l.tail)
            }
            Term::Tuple(items) => {
                f.write_char('{')?;
                write_seq(f, items)?;
                f.write_char('}')
            }
            Term::Map(pairs) => {
                f.write_str("#{")?;
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{k} => {v}")?;
                }
                f.write_char('}')
            }
            Term::Object(fields) => {
                f.write_str("#{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write_quoted(f, k)?;
                    write!(f, " => {v}")?;
                }
                f.write_char('}')
            }
            Term::Pid(p) => write!(f, "#Pid<{}.{}.{}.{}>", p.node, p.id, p.serial, p.creation),
            Term::Reference(r) => {
                write!(f, "#Ref<{}.{}", r.node, r.creation)?;
                for id in &r.ids {
                    write!(f, ".{id}")?;
                }
                f.write_char('>')
            }
            Term::Port(p) => write!(f, "#Port<{}.{}>", p.node, p.id),
            Term::Export(e) => write!(f, "fun {}:{}/{}", e.module, e.function, e.arity),
            Term::Function(func) => {
                write!(f, "#Fun<{}.{}.{}>", func.module, func.index, func.arity)
            }
        }
    }
}
