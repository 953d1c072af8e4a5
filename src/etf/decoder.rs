// External term format → Term.
//
// The header byte is checked on construction; after that every call to
// `decode_term` consumes exactly one tagged term. Recursion follows the
// nesting of the input and is bounded by `DecodeOptions::max_depth`.
//
// Decoding notes:
//   - SMALL_INTEGER_EXT is read as a signed byte
//   - tuples decode to `Term::List`; tuple-ness is not preserved
//   - the atoms `nil`/`null`/`true`/`false` and the empty atom decode to
//     `Nil`/`Boolean`, never to atoms
//   - node names inside pids, ports and references stay raw text
//   - a list whose terminator is not NIL_EXT decodes to `ImproperList`,
//     unless the tail is itself a list, which is spliced into the head
//   - COMPRESSED counts as one nesting level
//   - allocations are sized by the remaining input, not by the length
//     fields, so a forged length cannot trigger a huge up-front allocation

use std::borrow::Cow;
use std::collections::HashMap;

use num_bigint::BigInt;

use super::DEFAULT_MAX_DEPTH;
use super::bignum;
use super::cursor::{Reader, Truncated};
use super::tag::{self, *};
use crate::term::{Export, Function, Pid, Port, Reference, Term, atom};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Render big integers as decimal text (`Term::Binary`).
    pub big_int_as_string: bool,
    /// Render atoms as their name (`Term::Binary`) instead of interning.
    pub atom_as_string: bool,
    /// Render maps as `Term::Object` with text keys instead of `Term::Map`.
    pub map_as_object: bool,
    /// Maximum container nesting.
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            big_int_as_string: false,
            atom_as_string: false,
            map_as_object: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid version header {0} (expected 131)")]
    InvalidHeader(u8),
    #[error("unsupported tag {tag} at offset {offset}")]
    UnsupportedTag { tag: u8, offset: usize },
    #[error(
        "truncated input: read of {needed} bytes at offset {offset} with {available} available"
    )]
    TruncatedInput {
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("malformed list: terminator tag {tag} at offset {offset}")]
    MalformedList { tag: u8, offset: usize },
    #[error("invalid UTF-8 at offset {offset}")]
    InvalidUtf8 { offset: usize },
    #[error("invalid float text {text:?}")]
    InvalidFloat { text: String },
    #[error("expected an atom, found tag {tag} at offset {offset}")]
    ExpectedAtom { tag: u8, offset: usize },
    #[error("term nesting exceeds depth limit of {limit}")]
    DepthLimit { limit: usize },
    #[error("decompression failed: {0}")]
    Decompress(String),
}

impl From<Truncated> for DecodeError {
    fn from(t: Truncated) -> Self {
        Self::TruncatedInput {
            offset: t.offset,
            needed: t.needed,
            available: t.available,
        }
    }
}

/// Character set of an atom payload.
#[derive(Clone, Copy)]
enum AtomText {
    Latin1,
    Utf8,
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

pub struct Decoder<'a> {
    reader: Reader<'a>,
    options: DecodeOptions,
    depth: usize,
}

impl<'a> Decoder<'a> {
    /// Validate the version header and position the cursor after it.
    pub fn new(data: &'a [u8], options: DecodeOptions) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(data);
        let version = reader.read_u8()?;
        if version != FORMAT_VERSION {
            return Err(DecodeError::InvalidHeader(version));
        }
        Ok(Self {
            reader,
            options,
            depth: 0,
        })
    }

    /// Decoder over a headerless term, e.g. an inflated COMPRESSED payload.
    fn headerless(data: &'a [u8], options: DecodeOptions, depth: usize) -> Self {
        Self {
            reader: Reader::new(data),
            options,
            depth,
        }
    }

    /// Bytes consumed so far, header included.
    #[inline]
    pub fn consumed(&self) -> usize {
        self.reader.position()
    }

    /// Bytes left after the terms decoded so far.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.reader.remaining()
    }

    /// Decode one tagged term.
    pub fn decode_term(&mut self) -> Result<Term, DecodeError> {
        let offset = self.reader.position();
        let tag = self.reader.read_u8()?;
        log::trace!("{} at offset {offset}", tag::name(tag));
        match tag {
            SMALL_INTEGER_EXT => Ok(Term::Integer(self.reader.read_i8()?.into())),
            INTEGER_EXT => Ok(Term::Integer(self.reader.read_i32()?.into())),
            FLOAT_EXT => self.read_legacy_float(),
            NEW_FLOAT_EXT => Ok(Term::Float(self.reader.read_f64()?)),

            SMALL_ATOM_EXT => {
                let len = self.reader.read_u8()?.into();
                self.read_atom(len, AtomText::Latin1)
            }
            ATOM_EXT => {
                let len = self.reader.read_u16()?.into();
                self.read_atom(len, AtomText::Latin1)
            }
            SMALL_ATOM_UTF8_EXT => {
                let len = self.reader.read_u8()?.into();
                self.read_atom(len, AtomText::Utf8)
            }
            ATOM_UTF8_EXT => {
                let len = self.reader.read_u16()?.into();
                self.read_atom(len, AtomText::Utf8)
            }

            SMALL_TUPLE_EXT => {
                let arity = self.reader.read_u8()?.into();
                self.nested(|dec| dec.read_terms(arity)).map(Term::List)
            }
            LARGE_TUPLE_EXT => {
                let arity = self.reader.read_u32()? as usize;
                self.nested(|dec| dec.read_terms(arity)).map(Term::List)
            }
            NIL_EXT => Ok(Term::List(Vec::new())),
            STRING_EXT => {
                let len = self.reader.read_u16()?.into();
                Ok(Term::ByteList(self.reader.read_bytes(len)?.to_vec()))
            }
            LIST_EXT => self.read_list(),
            MAP_EXT => self.read_map(),
            BINARY_EXT => {
                let len = self.reader.read_u32()? as usize;
                let text = self.read_utf8(len)?;
                Ok(Term::Binary(text.to_owned()))
            }

            SMALL_BIG_EXT => {
                let digits = self.reader.read_u8()?.into();
                self.read_small_big(digits)
            }
            LARGE_BIG_EXT => {
                let digits = self.reader.read_u32()? as usize;
                let sign = self.reader.read_u8()?;
                let magnitude = self.reader.read_bytes(digits)?;
                Ok(self.big_term(bignum::from_digits(sign, magnitude)))
            }

            PID_EXT | NEW_PID_EXT => self.read_pid(tag),
            REFERENCE_EXT | NEW_REFERENCE_EXT | NEWER_REFERENCE_EXT => self.read_reference(tag),
            PORT_EXT | NEW_PORT_EXT => self.read_port(tag),
            EXPORT_EXT => self.nested(Self::read_export),
            NEW_FUN_EXT => self.nested(Self::read_function),

            #[cfg(feature = "zlib")]
            COMPRESSED => self.nested(Self::read_compressed),

            _ => Err(DecodeError::UnsupportedTag { tag, offset }),
        }
    }

    /// Run `f` one nesting level deeper.
    fn nested<T, F>(&mut self, f: F) -> Result<T, DecodeError>
    where
        F: FnOnce(&mut Self) -> Result<T, DecodeError>,
    {
        if self.depth >= self.options.max_depth {
            return Err(DecodeError::DepthLimit {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Capacity hint for `count` items of at least `min_size` bytes each.
    fn capacity(&self, count: usize, min_size: usize) -> usize {
        count.min(self.reader.remaining() / min_size)
    }

    fn read_terms(&mut self, count: usize) -> Result<Vec<Term>, DecodeError> {
        let mut items = Vec::with_capacity(self.capacity(count, 1));
        for _ in 0..count {
            items.push(self.decode_term()?);
        }
        Ok(items)
    }

    fn read_utf8(&mut self, len: usize) -> Result<&'a str, DecodeError> {
        self.reader
            .read_utf8(len)?
            .map_err(|offset| DecodeError::InvalidUtf8 { offset })
    }

    // -- Numbers ------------------------------------------------------------

    fn read_legacy_float(&mut self) -> Result<Term, DecodeError> {
        let raw = self.reader.read_bytes(FLOAT_EXT_LEN)?;
        let text = String::from_utf8_lossy(raw);
        let trimmed = text.trim_end_matches('\0').trim();
        trimmed
            .parse::<f64>()
            .map(Term::Float)
            .map_err(|_| DecodeError::InvalidFloat {
                text: trimmed.to_owned(),
            })
    }

    fn read_small_big(&mut self, digits: usize) -> Result<Term, DecodeError> {
        let sign = self.reader.read_u8()?;
        let magnitude = self.reader.read_bytes(digits)?;
        if digits < bignum::PLAIN_DIGIT_LIMIT {
            return Ok(Term::Integer(bignum::plain_value(sign, magnitude)));
        }
        Ok(self.big_term(bignum::from_digits(sign, magnitude)))
    }

    fn big_term(&self, n: BigInt) -> Term {
        if self.options.big_int_as_string {
            Term::Binary(n.to_string())
        } else {
            Term::BigInt(n)
        }
    }

    // -- Atoms --------------------------------------------------------------

    fn read_atom_text(&mut self, len: usize, charset: AtomText) -> Result<Cow<'a, str>, DecodeError> {
        match charset {
            AtomText::Utf8 => self.read_utf8(len).map(Cow::Borrowed),
            AtomText::Latin1 => {
                let bytes = self.reader.read_bytes(len)?;
                match std::str::from_utf8(bytes) {
                    // ASCII reads the same in both charsets.
                    Ok(ascii) if bytes.is_ascii() => Ok(Cow::Borrowed(ascii)),
                    _ => Ok(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())),
                }
            }
        }
    }

    fn read_atom(&mut self, len: usize, charset: AtomText) -> Result<Term, DecodeError> {
        let name = self.read_atom_text(len, charset)?;
        match &*name {
            "" | "nil" | "null" => return Ok(Term::Nil),
            "true" => return Ok(Term::Boolean(true)),
            "false" => return Ok(Term::Boolean(false)),
            _ => {}
        }
        if self.options.atom_as_string {
            Ok(Term::Binary(name.into_owned()))
        } else {
            Ok(Term::Atom(atom::intern(&name)))
        }
    }

    /// Read an atom as plain text, bypassing the special names and options.
    fn read_node(&mut self) -> Result<String, DecodeError> {
        let offset = self.reader.position();
        let tag = self.reader.read_u8()?;
        let (len, charset) = match tag {
            SMALL_ATOM_EXT => (usize::from(self.reader.read_u8()?), AtomText::Latin1),
            ATOM_EXT => (usize::from(self.reader.read_u16()?), AtomText::Latin1),
            SMALL_ATOM_UTF8_EXT => (usize::from(self.reader.read_u8()?), AtomText::Utf8),
            ATOM_UTF8_EXT => (usize::from(self.reader.read_u16()?), AtomText::Utf8),
            _ => return Err(DecodeError::ExpectedAtom { tag, offset }),
        };
        Ok(self.read_atom_text(len, charset)?.into_owned())
    }

    // -- Containers ---------------------------------------------------------

    fn read_list(&mut self) -> Result<Term, DecodeError> {
        let len = self.reader.read_u32()? as usize;
        self.nested(|dec| {
            let head = dec.read_terms(len)?;
            let offset = dec.reader.position();
            let next = dec.reader.peek_u8()?;
            if next == NIL_EXT {
                dec.reader.skip(1)?;
                return Ok(Term::List(head));
            }
            if !tag::is_known(next) {
                return Err(DecodeError::MalformedList { tag: next, offset });
            }
            // A list tail continues the list rather than ending it.
            let tail = dec.decode_term()?;
            Ok(Term::improper(head, tail))
        })
    }

    fn read_map(&mut self) -> Result<Term, DecodeError> {
        let count = self.reader.read_u32()? as usize;
        self.nested(|dec| {
            let cap = dec.capacity(count, 2);
            if !dec.options.map_as_object {
                let mut pairs = Vec::with_capacity(cap);
                for _ in 0..count {
                    let key = dec.decode_term()?;
                    let value = dec.decode_term()?;
                    pairs.push((key, value));
                }
                return Ok(Term::Map(pairs));
            }

            // Repeated keys keep their first position and take the last value.
            let mut fields: Vec<(String, Term)> = Vec::with_capacity(cap);
            let mut index: HashMap<String, usize> = HashMap::with_capacity(cap);
            for _ in 0..count {
                let key = dec.decode_term()?.to_property_key();
                let value = dec.decode_term()?;
                match index.get(&key) {
                    Some(&slot) => fields[slot].1 = value,
                    None => {
                        index.insert(key.clone(), fields.len());
                        fields.push((key, value));
                    }
                }
            }
            Ok(Term::Object(fields))
        })
    }

    // -- Identity types -----------------------------------------------------

    fn read_creation(&mut self, wide: bool) -> Result<u32, DecodeError> {
        if wide {
            Ok(self.reader.read_u32()?)
        } else {
            Ok(self.reader.read_u8()?.into())
        }
    }

    fn read_pid(&mut self, tag: u8) -> Result<Term, DecodeError> {
        let node = self.read_node()?;
        let id = self.reader.read_u32()?;
        let serial = self.reader.read_u32()?;
        let creation = self.read_creation(tag == NEW_PID_EXT)?;
        Ok(Term::Pid(Pid {
            node,
            id,
            serial,
            creation,
        }))
    }

    fn read_reference(&mut self, tag: u8) -> Result<Term, DecodeError> {
        if tag == REFERENCE_EXT {
            let node = self.read_node()?;
            let id = self.reader.read_u32()?;
            let creation = self.read_creation(false)?;
            return Ok(Term::Reference(Reference {
                node,
                creation,
                ids: vec![id],
            }));
        }
        let count = usize::from(self.reader.read_u16()?);
        let node = self.read_node()?;
        let creation = self.read_creation(tag == NEWER_REFERENCE_EXT)?;
        let mut ids = Vec::with_capacity(self.capacity(count, 4));
        for _ in 0..count {
            ids.push(self.reader.read_u32()?);
        }
        Ok(Term::Reference(Reference {
            node,
            creation,
            ids,
        }))
    }

    fn read_port(&mut self, tag: u8) -> Result<Term, DecodeError> {
        let node = self.read_node()?;
        let id = self.reader.read_u32()?;
        let creation = self.read_creation(tag == NEW_PORT_EXT)?;
        Ok(Term::Port(Port { node, id, creation }))
    }

    // -- Functions ----------------------------------------------------------

    fn read_export(&mut self) -> Result<Term, DecodeError> {
        let module = self.decode_term()?;
        let function = self.decode_term()?;
        let offset = self.reader.position();
        let tag = self.reader.read_u8()?;
        if tag != SMALL_INTEGER_EXT {
            return Err(DecodeError::UnsupportedTag { tag, offset });
        }
        let arity = self.reader.read_u8()?;
        Ok(Term::Export(Export {
            module: Box::new(module),
            function: Box::new(function),
            arity,
        }))
    }

    fn read_function(&mut self) -> Result<Term, DecodeError> {
        let size = self.reader.read_u32()?;
        let arity = self.reader.read_u8()?;
        let mut uniq = [0u32; 4];
        for word in &mut uniq {
            *word = self.reader.read_u32()?;
        }
        let index = self.reader.read_u32()?;
        let num_free = self.reader.read_u32()? as usize;
        let module = self.decode_term()?;
        let old_index = self.decode_term()?;
        let old_uniq = self.decode_term()?;
        let owner = self.decode_term()?;
        let free_vars = self.read_terms(num_free)?;
        Ok(Term::Function(Function {
            size,
            arity,
            uniq,
            index,
            module: Box::new(module),
            old_index: Box::new(old_index),
            old_uniq: Box::new(old_uniq),
            owner: Box::new(owner),
            free_vars,
        }))
    }

    // -- Compression --------------------------------------------------------

    /// Inflate the zlib payload and decode the single term inside it.
    /// The cursor advances past exactly the compressed bytes; a stream cut
    /// short by the end of input is `TruncatedInput`.
    #[cfg(feature = "zlib")]
    fn read_compressed(&mut self) -> Result<Term, DecodeError> {
        use flate2::{Decompress, FlushDecompress, Status};

        /// Upper bound on the deflate expansion ratio.
        const MAX_RATIO: usize = 1032;
        const GROW: usize = 64 * 1024;

        let size = self.reader.read_u32()? as usize;
        let payload = self.reader.rest();
        let mut inflater = Decompress::new(true);
        let mut inflated =
            Vec::with_capacity(size.min(payload.len().saturating_mul(MAX_RATIO)) + 1);

        loop {
            if inflated.len() == inflated.capacity() {
                inflated.reserve((size + 1 - inflated.len()).min(GROW));
            }
            let (before_in, before_out) = (inflater.total_in(), inflated.len());
            let input = &payload[before_in as usize..];
            let status = inflater
                .decompress_vec(input, &mut inflated, FlushDecompress::None)
                .map_err(|e| DecodeError::Decompress(e.to_string()))?;
            if inflated.len() > size {
                return Err(DecodeError::Decompress(format!(
                    "payload inflates past the announced {size} bytes"
                )));
            }
            if status == Status::StreamEnd {
                break;
            }
            let exhausted = inflater.total_in() as usize == payload.len();
            let stalled = inflater.total_in() == before_in && inflated.len() == before_out;
            if exhausted && (stalled || inflated.len() < inflated.capacity()) {
                return Err(Truncated {
                    offset: self.reader.position() + payload.len(),
                    needed: 1,
                    available: 0,
                }
                .into());
            }
            if stalled {
                return Err(DecodeError::Decompress("zlib stream stalled".into()));
            }
        }
        if inflated.len() != size {
            return Err(DecodeError::Decompress(format!(
                "header announces {size} bytes, payload inflates to {}",
                inflated.len()
            )));
        }
        let consumed = inflater.total_in() as usize;
        self.reader.skip(consumed)?;
        log::debug!("inflated {consumed} compressed bytes to {size}");

        let mut inner = Decoder::headerless(&inflated, self.options, self.depth);
        let term = inner.decode_term()?;
        if inner.remaining() > 0 {
            log::debug!(
                "ignoring {} trailing bytes inside compressed term",
                inner.remaining()
            );
        }
        Ok(term)
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Decode one term from `data`. Bytes after the term are ignored.
pub fn decode(data: &[u8], options: &DecodeOptions) -> Result<Term, DecodeError> {
    decode_prefix(data, options).map(|(term, _)| term)
}

/// Decode one term and report how many bytes of `data` it occupied,
/// header included.
pub fn decode_prefix(data: &[u8], options: &DecodeOptions) -> Result<(Term, usize), DecodeError> {
    let mut dec = Decoder::new(data, *options)?;
    let term = dec.decode_term()?;
    if dec.remaining() > 0 {
        log::debug!(
            "decoded {} term from {} bytes, {} trailing bytes left",
            term.kind(),
            dec.consumed(),
            dec.remaining()
        );
    } else {
        log::debug!("decoded {} term from {} bytes", term.kind(), dec.consumed());
    }
    Ok((term, dec.consumed()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
