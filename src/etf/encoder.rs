// Term → external term format.
//
// One version byte, then one tagged term written depth-first through a
// `Writer`. Output is only returned once the whole term has been written;
// any error drops the partial buffer.
//
// Tag choices:
//   - integers in (-128, 128) use SMALL_INTEGER_EXT, other i32 values
//     INTEGER_EXT, and anything wider NEW_FLOAT_EXT
//   - big integers always use LARGE_BIG_EXT with a back-patched digit count
//   - atoms use the latin-1 tags when every char is below U+0100, the UTF-8
//     tags otherwise; the small variant when the payload fits one byte
//   - tuples of arity <= 255 use SMALL_TUPLE_EXT

use super::DEFAULT_MAX_DEPTH;
use super::bignum;
use super::buffer::Writer;
use super::tag::*;
use crate::term::{Export, ImproperList, Pid, Port, Reference, Term};

const U8_MAX: usize = u8::MAX as usize;
const U16_MAX: usize = u16::MAX as usize;
const U32_MAX: usize = u32::MAX as usize;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Encoder configuration.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Zlib level (0-9). When set, the term is wrapped in the COMPRESSED
    /// tag if that makes the output smaller. Ignored without the `zlib`
    /// feature.
    pub compression: Option<u32>,
    /// Maximum container nesting.
    pub max_depth: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            compression: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("cannot encode value of kind {0}")]
    UnsupportedValue(&'static str),
    #[error("{what} length {len} exceeds the maximum of {max}")]
    LengthOverflow {
        what: &'static str,
        len: usize,
        max: usize,
    },
    #[error("term nesting exceeds depth limit of {limit}")]
    DepthLimit { limit: usize },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn check_len(what: &'static str, len: usize, max: usize) -> Result<(), EncodeError> {
    if len > max {
        return Err(EncodeError::LengthOverflow { what, len, max });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// Single-use term writer.
pub struct Encoder {
    out: Writer,
    depth: usize,
    max_depth: usize,
}

impl Encoder {
    /// Start a stream: the version byte is written immediately.
    pub fn new(options: &EncodeOptions) -> Self {
        let mut out = Writer::new();
        out.write_u8(FORMAT_VERSION);
        Self {
            out,
            depth: 0,
            max_depth: options.max_depth,
        }
    }

    /// Bytes written so far, version byte included.
    pub fn offset(&self) -> usize {
        self.out.offset()
    }

    pub fn finish(self) -> Vec<u8> {
        self.out.into_vec()
    }

    /// Write one tagged term.
    pub fn encode_term(&mut self, term: &Term) -> Result<(), EncodeError> {
        match term {
            Term::Nil => self.write_atom("nil"),
            Term::Boolean(true) => self.write_atom("true"),
            Term::Boolean(false) => self.write_atom("false"),
            Term::Integer(v) => {
                self.write_integer(*v);
                Ok(())
            }
            Term::Float(v) => {
                self.out.write_u8(NEW_FLOAT_EXT);
                self.out.write_f64(*v);
                Ok(())
            }
            Term::BigInt(n) => self.write_bigint(n),
            Term::Atom(a) => self.write_atom(a.name()),
            Term::Binary(s) => self.write_binary(s.as_bytes()),
            Term::ByteList(bytes) => self.write_byte_list(bytes),
            Term::List(items) => self.write_list(items),
            Term::ImproperList(l) => self.write_improper(l),
            Term::Tuple(items) => self.write_tuple(items),
            Term::Map(pairs) => self.nested(|enc| {
                enc.write_map_header(pairs.len())?;
                for (k, v) in pairs {
                    enc.encode_term(k)?;
                    enc.encode_term(v)?;
                }
                Ok(())
            }),
            Term::Object(fields) => self.nested(|enc| {
                enc.write_map_header(fields.len())?;
                for (k, v) in fields {
                    enc.write_binary(k.as_bytes())?;
                    enc.encode_term(v)?;
                }
                Ok(())
            }),
            Term::Pid(p) => self.write_pid(p),
            Term::Reference(r) => self.write_reference(r),
            Term::Port(p) => self.write_port(p),
            Term::Export(e) => self.write_export(e),
            Term::Function(_) => Err(EncodeError::UnsupportedValue(term.kind())),
        }
    }

    /// Run `f` one nesting level deeper.
    fn nested<F>(&mut self, f: F) -> Result<(), EncodeError>
    where
        F: FnOnce(&mut Self) -> Result<(), EncodeError>,
    {
        if self.depth >= self.max_depth {
            return Err(EncodeError::DepthLimit {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // -- Scalars ------------------------------------------------------------

    fn write_integer(&mut self, v: i64) {
        if -128 < v && v < 128 {
            self.out.write_u8(SMALL_INTEGER_EXT);
            self.out.write_u8(v as i8 as u8);
        } else if let Ok(v32) = i32::try_from(v) {
            self.out.write_u8(INTEGER_EXT);
            self.out.write_i32(v32);
        } else {
            self.out.write_u8(NEW_FLOAT_EXT);
            self.out.write_f64(v as f64);
        }
    }

    fn write_bigint(&mut self, n: &num_bigint::BigInt) -> Result<(), EncodeError> {
        let (sign, digits) = bignum::to_digits(n);
        check_len("big integer", digits.len(), U32_MAX)?;
        self.out.write_u8(LARGE_BIG_EXT);
        let count_at = self.out.placeholder_u32();
        self.out.write_u8(sign);
        self.out.write_bytes(&digits);
        self.out.patch_u32(count_at, digits.len() as u32);
        Ok(())
    }

    fn write_atom(&mut self, name: &str) -> Result<(), EncodeError> {
        if name.chars().all(|c| u32::from(c) < 0x100) {
            let latin1: Vec<u8> = name.chars().map(|c| u32::from(c) as u8).collect();
            self.write_atom_payload(SMALL_ATOM_EXT, ATOM_EXT, &latin1)
        } else {
            self.write_atom_payload(SMALL_ATOM_UTF8_EXT, ATOM_UTF8_EXT, name.as_bytes())
        }
    }

    fn write_atom_payload(&mut self, small: u8, large: u8, payload: &[u8]) -> Result<(), EncodeError> {
        let len = payload.len();
        if len <= U8_MAX {
            self.out.write_u8(small);
            self.out.write_u8(len as u8);
        } else {
            check_len("atom", len, U16_MAX)?;
            self.out.write_u8(large);
            self.out.write_u16(len as u16);
        }
        self.out.write_bytes(payload);
        Ok(())
    }

    fn write_binary(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        check_len("binary", bytes.len(), U32_MAX)?;
        self.out.write_u8(BINARY_EXT);
        self.out.write_u32(bytes.len() as u32);
        self.out.write_bytes(bytes);
        Ok(())
    }

    // -- Sequences ----------------------------------------------------------

    fn write_byte_list(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        if bytes.len() <= U16_MAX {
            self.out.write_u8(STRING_EXT);
            self.out.write_u16(bytes.len() as u16);
            self.out.write_bytes(bytes);
            return Ok(());
        }
        check_len("list", bytes.len(), U32_MAX)?;
        self.out.write_u8(LIST_EXT);
        self.out.write_u32(bytes.len() as u32);
        for &b in bytes {
            self.out.write_u8(SMALL_INTEGER_EXT);
            self.out.write_u8(b);
        }
        self.out.write_u8(NIL_EXT);
        Ok(())
    }

    fn write_list(&mut self, items: &[Term]) -> Result<(), EncodeError> {
        if items.is_empty() {
            self.out.write_u8(NIL_EXT);
            return Ok(());
        }
        check_len("list", items.len(), U32_MAX)?;
        self.nested(|enc| {
            enc.out.write_u8(LIST_EXT);
            enc.out.write_u32(items.len() as u32);
            for item in items {
                enc.encode_term(item)?;
            }
            enc.out.write_u8(NIL_EXT);
            Ok(())
        })
    }

    /// Head elements, then the tail term where the terminator would go.
    fn write_improper(&mut self, list: &ImproperList) -> Result<(), EncodeError> {
        check_len("list", list.head.len(), U32_MAX)?;
        self.nested(|enc| {
            enc.out.write_u8(LIST_EXT);
            enc.out.write_u32(list.head.len() as u32);
            for item in &list.head {
                enc.encode_term(item)?;
            }
            enc.encode_term(&list.tail)
        })
    }

    fn write_tuple(&mut self, items: &[Term]) -> Result<(), EncodeError> {
        check_len("tuple", items.len(), U32_MAX)?;
        self.nested(|enc| {
            if items.len() <= U8_MAX {
                enc.out.write_u8(SMALL_TUPLE_EXT);
                enc.out.write_u8(items.len() as u8);
            } else {
                enc.out.write_u8(LARGE_TUPLE_EXT);
                enc.out.write_u32(items.len() as u32);
            }
            for item in items {
                enc.encode_term(item)?;
            }
            Ok(())
        })
    }

    fn write_map_header(&mut self, pairs: usize) -> Result<(), EncodeError> {
        check_len("map", pairs, U32_MAX)?;
        self.out.write_u8(MAP_EXT);
        self.out.write_u32(pairs as u32);
        Ok(())
    }

    // -- Identity types -----------------------------------------------------

    fn write_pid(&mut self, pid: &Pid) -> Result<(), EncodeError> {
        self.out.write_u8(NEW_PID_EXT);
        self.write_atom(&pid.node)?;
        self.out.write_u32(pid.id);
        self.out.write_u32(pid.serial);
        self.out.write_u32(pid.creation);
        Ok(())
    }

    fn write_reference(&mut self, r: &Reference) -> Result<(), EncodeError> {
        check_len("reference", r.ids.len(), U16_MAX)?;
        self.out.write_u8(NEWER_REFERENCE_EXT);
        self.out.write_u16(r.ids.len() as u16);
        self.write_atom(&r.node)?;
        self.out.write_u32(r.creation);
        for &id in &r.ids {
            self.out.write_u32(id);
        }
        Ok(())
    }

    fn write_port(&mut self, port: &Port) -> Result<(), EncodeError> {
        self.out.write_u8(NEW_PORT_EXT);
        self.write_atom(&port.node)?;
        self.out.write_u32(port.id);
        self.out.write_u32(port.creation);
        Ok(())
    }

    fn write_export(&mut self, export: &Export) -> Result<(), EncodeError> {
        self.nested(|enc| {
            enc.out.write_u8(EXPORT_EXT);
            enc.encode_term(&export.module)?;
            enc.encode_term(&export.function)?;
            enc.out.write_u8(SMALL_INTEGER_EXT);
            enc.out.write_u8(export.arity);
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Encode `term` with default options.
pub fn encode(term: &Term) -> Result<Vec<u8>, EncodeError> {
    encode_with_options(term, &EncodeOptions::default())
}

/// Encode `term`, optionally wrapping it in the COMPRESSED tag.
pub fn encode_with_options(term: &Term, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    let mut enc = Encoder::new(options);
    enc.encode_term(term)?;
    let out = enc.finish();
    log::debug!("encoded {} term into {} bytes", term.kind(), out.len());

    #[cfg(feature = "zlib")]
    if let Some(level) = options.compression {
        return compress(out, level);
    }
    Ok(out)
}

/// Wrap an encoded stream as `[version, COMPRESSED, size, zlib(term)]`
/// when that is shorter than the plain stream.
#[cfg(feature = "zlib")]
fn compress(plain: Vec<u8>, level: u32) -> Result<Vec<u8>, EncodeError> {
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    let body = &plain[1..];
    let Ok(size) = u32::try_from(body.len()) else {
        return Ok(plain);
    };
    let mut z = ZlibEncoder::new(Vec::with_capacity(body.len() / 2), Compression::new(level.min(9)));
    z.write_all(body)?;
    let packed = z.finish()?;

    if packed.len() + 6 >= plain.len() {
        log::debug!(
            "compression skipped: {} bytes would become {}",
            plain.len(),
            packed.len() + 6
        );
        return Ok(plain);
    }
    let mut out = Writer::with_capacity(packed.len() + 6);
    out.write_u8(FORMAT_VERSION);
    out.write_u8(COMPRESSED);
    out.write_u32(size);
    out.write_bytes(&packed);
    log::debug!("compressed {} bytes to {}", plain.len(), out.offset());
    Ok(out.into_vec())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
