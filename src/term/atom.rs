// Process-wide atom interning.
//
// The table maps a name to a weak handle on the shared `Arc<str>`. Interning
// returns the live identity when one exists and registers a fresh one
// otherwise, so names alive at the same time always share one allocation.
// Entries whose last `Atom` has been dropped are swept lazily: whenever the
// table has grown past `next_sweep`, dead entries are removed and the
// threshold is reset to twice the surviving count.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock, Weak};

use parking_lot::Mutex;

/// Smallest sweep threshold.
const MIN_SWEEP: usize = 64;

struct AtomTable {
    entries: HashMap<Box<str>, Weak<str>>,
    next_sweep: usize,
}

static TABLE: LazyLock<Mutex<AtomTable>> = LazyLock::new(|| {
    Mutex::new(AtomTable {
        entries: HashMap::new(),
        next_sweep: MIN_SWEEP,
    })
});

impl AtomTable {
    fn intern(&mut self, name: &str) -> Arc<str> {
        if let Some(live) = self.entries.get(name).and_then(Weak::upgrade) {
            return live;
        }
        let atom: Arc<str> = Arc::from(name);
        self.entries.insert(name.into(), Arc::downgrade(&atom));
        if self.entries.len() > self.next_sweep {
            self.sweep();
        }
        atom
    }

    fn sweep(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, weak| weak.strong_count() > 0);
        self.next_sweep = (self.entries.len() * 2).max(MIN_SWEEP);
        let removed = before - self.entries.len();
        log::trace!(
            "atom table sweep: {removed} reclaimed, {} live",
            self.entries.len()
        );
        removed
    }
}

/// Return the shared identity for `name`, registering it if needed.
pub fn intern(name: &str) -> Atom {
    Atom(TABLE.lock().intern(name))
}

/// Drop table entries whose atoms are no longer referenced.
/// Returns the number of entries removed.
pub fn purge() -> usize {
    TABLE.lock().sweep()
}

/// Whether `name` currently has a live identity.
pub fn is_interned(name: &str) -> bool {
    TABLE
        .lock()
        .entries
        .get(name)
        .is_some_and(|weak| weak.strong_count() > 0)
}

// ---------------------------------------------------------------------------
// Atom handle
// ---------------------------------------------------------------------------

/// An interned symbolic name.
///
/// Equality, ordering and hashing go by name; two handles obtained while
/// either is alive also share storage (`Atom::same_identity`).
#[derive(Clone)]
pub struct Atom(Arc<str>);

impl Atom {
    pub fn new(name: &str) -> Self {
        intern(name)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Whether both handles point at the same table entry.
    #[inline]
    pub fn same_identity(&self, other: &Atom) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Whether the name can be printed without quotes in Erlang syntax.
    pub fn is_bare(&self) -> bool {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(c) if c.is_lowercase() => {}
            _ => return false,
        }
        chars.all(|c| c.is_alphanumeric() || c == '_' || c == '@')
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.same_identity(other) || self.0 == other.0
    }
}

impl Eq for Atom {}

impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Atom {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl Borrow<str> for Atom {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Atom {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Atom {
    fn from(name: &str) -> Self {
        intern(name)
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Atom({:?})", &*self.0)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bare() {
            return f.write_str(&self.0);
        }
        f.write_str("'")?;
        for c in self.0.chars() {
            match c {
                '\'' => f.write_str("\\'")?,
                '\\' => f.write_str("\\\\")?,
                '"' => f.write_str("\"")?,
                c => write!(f, "{}", c.escape_debug())?,
            }
        }
        f.write_str("'")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
