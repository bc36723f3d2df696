//! # Object
//!
//! The prototype-based object runtime that generated programs call into.
//!
//! Every Runtime Object carries a [`Header`]: an optional prototype link and
//! an own [`SlotMap`]. Specialized kinds (boxed integers, doubles and
//! strings) wrap the same header, so any object can be treated as a plain
//! object through [`Object::header`].
//!
//! ```text
//!  leaf ──prototype──▶ mid ──prototype──▶ root ──prototype──▶ null
//!   │                   │                  │
//!  slots               slots              slots { greet }
//! ```
//!
//! Reads may walk the prototype chain ([`Heap::get_slot`] with
//! `follow_chain`), writes never do ([`Heap::put_slot`]).

mod header;
mod heap;
mod interning;
mod lookup;
mod objects;
mod slot;

pub use header::Header;
pub use heap::{Heap, HeapCreateInfo, ObjectError, ObjectRef};
pub use interning::{Symbol, Symbols};
pub use lookup::{LookupResult, lookup};
pub use objects::{Boxed, Object, ObjectKind};
pub use slot::SlotMap;

/// Name of the slot consulted (but never invoked) when allocating an object
/// from a prototype.
pub const INIT_SLOT: &str = "init";
