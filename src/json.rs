// JSON bridge.
//
// `from_json` maps a document onto the keyed-structure shapes the encoder
// understands; `to_json` renders any decoded term. Values JSON cannot
// express natively (big integers, identity types, improper lists) become
// strings or small objects.

use serde_json::{Map, Number, Value, json};

use crate::term::Term;

/// Convert a JSON document to a term.
///
/// Objects keep document order. Integers outside the 32-bit range become
/// big integers so they survive the round trip exactly.
pub fn from_json(value: &Value) -> Term {
    match value {
        Value::Null => Term::Nil,
        Value::Bool(b) => Term::Boolean(*b),
        Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                Term::from(v)
            } else if let Some(v) = n.as_u64() {
                Term::from(v)
            } else {
                Term::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => Term::Binary(s.clone()),
        Value::Array(items) => Term::List(items.iter().map(from_json).collect()),
        Value::Object(fields) => Term::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), from_json(v)))
                .collect(),
        ),
    }
}

fn float(v: f64) -> Value {
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}

fn array(items: &[Term]) -> Value {
    Value::Array(items.iter().map(to_json).collect())
}

/// Render a term as JSON.
pub fn to_json(term: &Term) -> Value {
    match term {
        Term::Nil => Value::Null,
        Term::Boolean(b) => Value::Bool(*b),
        Term::Integer(v) => json!(v),
        Term::Float(v) => float(*v),
        Term::BigInt(n) => Value::String(n.to_string()),
        Term::Atom(a) => Value::String(a.name().to_owned()),
        Term::Binary(s) => Value::String(s.clone()),
        Term::ByteList(bytes) => Value::Array(bytes.iter().map(|&b| json!(b)).collect()),
        Term::List(items) | Term::Tuple(items) => array(items),
        Term::ImproperList(l) => json!({
            "head": array(&l.head),
            "tail": to_json(&l.tail),
        }),
        Term::Map(pairs) => {
            let mut out = Map::with_capacity(pairs.len());
            for (k, v) in pairs {
                out.insert(k.to_property_key(), to_json(v));
            }
            Value::Object(out)
        }
        Term::Object(fields) => {
            let mut out = Map::with_capacity(fields.len());
            for (k, v) in fields {
                out.insert(k.clone(), to_json(v));
            }
            Value::Object(out)
        }
        Term::Pid(p) => json!({
            "node": p.node,
            "id": p.id,
            "serial": p.serial,
            "creation": p.creation,
        }),
        Term::Reference(r) => json!({
            "node": r.node,
            "creation": r.creation,
            "ids": r.ids,
        }),
        Term::Port(p) => json!({
            "node": p.node,
            "id": p.id,
            "creation": p.creation,
        }),
        Term::Export(e) => json!({
            "module": to_json(&e.module),
            "function": to_json(&e.function),
            "arity": e.arity,
        }),
        Term::Function(f) => json!({
            "module": to_json(&f.module),
            "arity": f.arity,
            "index": f.index,
            "uniq": f.uniq,
            "free_vars": array(&f.free_vars),
        }),
    }
}
