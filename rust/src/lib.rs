//! Sequence container backed by a 2-3 order-statistics tree.
//!
//! Elements live in the leaves of a tree whose internal nodes have 2 or 3
//! children and whose leaves all sit at the same depth. Each internal node
//! caches monoid aggregates over its subtree; the built-in [`Size`] monoid
//! makes positional lookup, insertion and removal O(log n), and any
//! user-supplied [`Monoid`] gets cached whole-tree and prefix folds.
//!
//! [`SeqTree`] is the tree itself, addressed by index and leaf handle.
//! [`TreeVec`] is an array-style facade on top with clamped `splice` and
//! change notifications.
//!
//! ```
//! use treevec::{FnMonoid, TreeVec};
//!
//! let mut words: TreeVec<&str> = vec!["tree", "backed", "sequence"].into();
//! words.insert(1, "-").unwrap();
//!
//! let letters = FnMonoid::new(0usize, |a, b| a + b, |w: &&str| w.len());
//! assert_eq!(words.fold(&letters).unwrap(), 19);
//! assert_eq!(words.fold_to(2, &letters).unwrap(), 5);
//! ```

mod arena;
mod cache;
mod construction;
mod delete_operations;
mod error;
mod events;
mod fold_operations;
mod get_operations;
mod insert_operations;
mod iteration;
mod monoid;
mod node;
mod tree_structure;
mod tree_vec;
mod types;
mod validation;

pub use arena::{Arena, ArenaStats};
pub use cache::MonoidalCache;
pub use error::{TreeError, TreeResult};
pub use events::{Change, ListenerId};
pub use iteration::{Iter, Leaves};
pub use monoid::{FnMonoid, Monoid, MonoidId, Size, Sum};
pub use tree_vec::TreeVec;
pub use types::{InternalNode, LeafNode, NodeId, NodeRef, SeqTree, MAX_CHILDREN, NULL_NODE};
