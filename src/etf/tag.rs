// External term format version byte and tag constants.
//
// Every encoded stream starts with `FORMAT_VERSION`; every term starts
// with one of the tag bytes below.

// ---------------------------------------------------------------------------
// Version header
// ---------------------------------------------------------------------------

pub const FORMAT_VERSION: u8 = 131;

// ---------------------------------------------------------------------------
// Numbers
// ---------------------------------------------------------------------------

/// (int:u8). Read back as a signed byte by this codec.
pub const SMALL_INTEGER_EXT: u8 = 97;
/// (int:i32be)
pub const INTEGER_EXT: u8 = 98;
/// 31 bytes of NUL-padded ASCII, e.g. `1.50000000000000000000e+00`.
pub const FLOAT_EXT: u8 = 99;
/// (num:f64be)
pub const NEW_FLOAT_EXT: u8 = 70;
/// (digits:u8) (sign:u8) (digit:u8)..  little-endian base 256
pub const SMALL_BIG_EXT: u8 = 110;
/// (digits:u32be) (sign:u8) (digit:u8)..
pub const LARGE_BIG_EXT: u8 = 111;

// ---------------------------------------------------------------------------
// Atoms
// ---------------------------------------------------------------------------

/// (len:u16be) latin-1 bytes
pub const ATOM_EXT: u8 = 100;
/// (len:u8) latin-1 bytes
pub const SMALL_ATOM_EXT: u8 = 115;
/// (len:u16be) UTF-8 bytes
pub const ATOM_UTF8_EXT: u8 = 118;
/// (len:u8) UTF-8 bytes
pub const SMALL_ATOM_UTF8_EXT: u8 = 119;

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

/// (arity:u8) elements..
pub const SMALL_TUPLE_EXT: u8 = 104;
/// (arity:u32be) elements..
pub const LARGE_TUPLE_EXT: u8 = 105;
/// Empty list, also the proper-list terminator.
pub const NIL_EXT: u8 = 106;
/// (len:u16be) bytes..  a list of small integers
pub const STRING_EXT: u8 = 107;
/// (len:u32be) elements.. tail
pub const LIST_EXT: u8 = 108;
/// (len:u32be) bytes..
pub const BINARY_EXT: u8 = 109;
/// (pairs:u32be) (key, value)..
pub const MAP_EXT: u8 = 116;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// (node:atom) (id:u32be) (creation:u8)
pub const PORT_EXT: u8 = 102;
/// (node:atom) (id:u32be) (creation:u32be)
pub const NEW_PORT_EXT: u8 = 89;
/// (node:atom) (id:u32be) (serial:u32be) (creation:u8)
pub const PID_EXT: u8 = 103;
/// (node:atom) (id:u32be) (serial:u32be) (creation:u32be)
pub const NEW_PID_EXT: u8 = 88;
/// (node:atom) (id:u32be) (creation:u8)
pub const REFERENCE_EXT: u8 = 101;
/// (len:u16be) (node:atom) (creation:u8) (id:u32be)..
pub const NEW_REFERENCE_EXT: u8 = 114;
/// (len:u16be) (node:atom) (creation:u32be) (id:u32be)..
pub const NEWER_REFERENCE_EXT: u8 = 90;

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

/// (module:atom) (function:atom) (arity:small_integer)
pub const EXPORT_EXT: u8 = 113;
/// (size:u32be) (arity:u8) (uniq:16 bytes) (index:u32be) (num_free:u32be)
/// (module:atom) (old_index:integer) (old_uniq:integer) (pid:pid) (free)..
pub const NEW_FUN_EXT: u8 = 112;

// ---------------------------------------------------------------------------
// Wrappers
// ---------------------------------------------------------------------------

/// (uncompressed_size:u32be) zlib stream of one tagged term
pub const COMPRESSED: u8 = 80;

/// Length of the legacy `FLOAT_EXT` text field.
pub const FLOAT_EXT_LEN: usize = 31;

/// Whether the decoder has a dispatch entry for `tag`.
pub fn is_known(tag: u8) -> bool {
    matches!(
        tag,
        SMALL_INTEGER_EXT
            | INTEGER_EXT
            | FLOAT_EXT
            | NEW_FLOAT_EXT
            | SMALL_BIG_EXT
            | LARGE_BIG_EXT
            | ATOM_EXT
            | SMALL_ATOM_EXT
            | ATOM_UTF8_EXT
            | SMALL_ATOM_UTF8_EXT
            | SMALL_TUPLE_EXT
            | LARGE_TUPLE_EXT
            | NIL_EXT
            | STRING_EXT
            | LIST_EXT
            | BINARY_EXT
            | MAP_EXT
            | PORT_EXT
            | NEW_PORT_EXT
            | PID_EXT
            | NEW_PID_EXT
            | REFERENCE_EXT
            | NEW_REFERENCE_EXT
            | NEWER_REFERENCE_EXT
            | EXPORT_EXT
            | NEW_FUN_EXT
    ) || (tag == COMPRESSED && cfg!(feature = "zlib"))
}

/// Whether `tag` starts an atom.
#[inline]
pub fn is_atom(tag: u8) -> bool {
    matches!(
        tag,
        ATOM_EXT | SMALL_ATOM_EXT | ATOM_UTF8_EXT | SMALL_ATOM_UTF8_EXT
    )
}

/// Human-readable tag name for log and error output.
pub fn name(tag: u8) -> &'static str {
    match tag {
        SMALL_INTEGER_EXT => "SMALL_INTEGER_EXT",
        INTEGER_EXT => "INTEGER_EXT",
        FLOAT_EXT => "FLOAT_EXT",
        NEW_FLOAT_EXT => "NEW_FLOAT_EXT",
        SMALL_BIG_EXT => "SMALL_BIG_EXT",
        LARGE_BIG_EXT => "LARGE_BIG_EXT",
        ATOM_EXT => "ATOM_EXT",
        SMALL_ATOM_EXT => "SMALL_ATOM_EXT",
        ATOM_UTF8_EXT => "ATOM_UTF8_EXT",
        SMALL_ATOM_UTF8_EXT => "SMALL_ATOM_UTF8_EXT",
        SMALL_TUPLE_EXT => "SMALL_TUPLE_EXT",
        LARGE_TUPLE_EXT => "LARGE_TUPLE_EXT",
        NIL_EXT => "NIL_EXT",
        STRING_EXT => "STRING_EXT",
        LIST_EXT => "LIST_EXT",
        BINARY_EXT => "BINARY_EXT",
        MAP_EXT => "MAP_EXT",
        PORT_EXT => "PORT_EXT",
        NEW_PORT_EXT => "NEW_PORT_EXT",
        PID_EXT => "PID_EXT",
        NEW_PID_EXT => "NEW_PID_EXT",
        REFERENCE_EXT => "REFERENCE_EXT",
        NEW_REFERENCE_EXT => "NEW_REFERENCE_EXT",
        NEWER_REFERENCE_EXT => "NEWER_REFERENCE_EXT",
        EXPORT_EXT => "EXPORT_EXT",
        NEW_FUN_EXT => "NEW_FUN_EXT",
        COMPRESSED => "COMPRESSED",
        _ => "unknown",
    }
}
