//! Monoid descriptors used for cached subtree aggregates.
//!
//! A monoid is an identity value, an associative `combine`, and a `measure`
//! mapping a leaf payload to its contribution. The tree folds a monoid over
//! its leaves and caches the result per internal node, keyed by [`MonoidId`].
//!
//! The built-in [`Size`] monoid counts leaves and drives all index-based
//! navigation.

use std::any::TypeId;
use std::fmt;
use std::ops::Add;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a monoid descriptor, used as the per-node cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonoidId {
    /// Keyed by the implementing type; every value of that type shares a cache entry.
    Type(TypeId),
    /// Keyed by the implementing type plus a parameter the descriptor folds with.
    Keyed(TypeId, u64),
    /// Keyed by a single descriptor instance.
    Instance(u64),
}

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(0);

impl MonoidId {
    /// Identity derived from a type.
    pub fn of<M: ?Sized + 'static>() -> Self {
        MonoidId::Type(TypeId::of::<M>())
    }

    /// Identity for a parameterised descriptor: values of `M` with different
    /// `key`s get separate cache entries.
    pub fn keyed<M: ?Sized + 'static>(key: u64) -> Self {
        MonoidId::Keyed(TypeId::of::<M>(), key)
    }

    /// A process-unique identity.
    pub fn fresh() -> Self {
        MonoidId::Instance(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// An associative aggregate over leaf payloads of type `T`.
///
/// `combine` must be associative and `identity` must be its neutral element;
/// the tree regroups operands freely as nodes split and merge.
///
/// `id` keys the per-node cache. Two descriptors that can fold to different
/// values must return different ids: a unit type can use
/// [`MonoidId::of`], a descriptor carrying parameters should use
/// [`MonoidId::keyed`] or [`MonoidId::fresh`].
///
/// # Examples
///
/// ```
/// use treevec::{Monoid, MonoidId, SeqTree};
///
/// struct Longest;
///
/// impl Monoid<String> for Longest {
///     type Value = usize;
///     fn identity(&self) -> usize { 0 }
///     fn combine(&self, a: &usize, b: &usize) -> usize { *a.max(b) }
///     fn measure(&self, data: &String) -> usize { data.len() }
///     fn id(&self) -> MonoidId { MonoidId::of::<Self>() }
/// }
///
/// /// Number of payloads longer than the threshold.
/// struct LongerThan(usize);
///
/// impl Monoid<String> for LongerThan {
///     type Value = usize;
///     fn identity(&self) -> usize { 0 }
///     fn combine(&self, a: &usize, b: &usize) -> usize { a + b }
///     fn measure(&self, data: &String) -> usize { usize::from(data.len() > self.0) }
///     fn id(&self) -> MonoidId { MonoidId::keyed::<Self>(self.0 as u64) }
/// }
///
/// let tree = SeqTree::from_vec(vec!["a".to_string(), "abc".to_string(), "ab".to_string()]);
/// assert_eq!(tree.fold(&Longest).unwrap(), 3);
/// assert_eq!(tree.fold(&LongerThan(1)).unwrap(), 2);
/// assert_eq!(tree.fold(&LongerThan(0)).unwrap(), 3);
/// ```
pub trait Monoid<T>: 'static {
    type Value: Clone + 'static;

    fn identity(&self) -> Self::Value;

    fn combine(&self, a: &Self::Value, b: &Self::Value) -> Self::Value;

    /// Contribution of a single leaf.
    fn measure(&self, data: &T) -> Self::Value;

    /// Cache key.
    fn id(&self) -> MonoidId;
}

/// Count of leaves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size;

impl<T> Monoid<T> for Size {
    type Value = usize;

    #[inline]
    fn identity(&self) -> usize {
        0
    }

    #[inline]
    fn combine(&self, a: &usize, b: &usize) -> usize {
        a + b
    }

    #[inline]
    fn measure(&self, _data: &T) -> usize {
        1
    }

    #[inline]
    fn id(&self) -> MonoidId {
        MonoidId::of::<Self>()
    }
}

/// Sum of the payloads themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sum;

impl<T> Monoid<T> for Sum
where
    T: Add<Output = T> + Default + Clone + 'static,
{
    type Value = T;

    fn identity(&self) -> T {
        T::default()
    }

    fn combine(&self, a: &T, b: &T) -> T {
        a.clone() + b.clone()
    }

    fn measure(&self, data: &T) -> T {
        data.clone()
    }

    fn id(&self) -> MonoidId {
        MonoidId::of::<Self>()
    }
}

/// Monoid assembled from closures.
///
/// Each instance gets its own cache identity, so two `FnMonoid`s with
/// different closures never share cached values.
pub struct FnMonoid<T, V> {
    id: MonoidId,
    identity: V,
    combine: Box<dyn Fn(&V, &V) -> V>,
    measure: Box<dyn Fn(&T) -> V>,
}

impl<T, V> FnMonoid<T, V> {
    pub fn new(
        identity: V,
        combine: impl Fn(&V, &V) -> V + 'static,
        measure: impl Fn(&T) -> V + 'static,
    ) -> Self {
        Self {
            id: MonoidId::fresh(),
            identity,
            combine: Box::new(combine),
            measure: Box::new(measure),
        }
    }
}

impl<T: 'static, V: Clone + 'static> Monoid<T> for FnMonoid<T, V> {
    type Value = V;

    fn identity(&self) -> V {
        self.identity.clone()
    }

    fn combine(&self, a: &V, b: &V) -> V {
        (self.combine)(a, b)
    }

    fn measure(&self, data: &T) -> V {
        (self.measure)(data)
    }

    fn id(&self) -> MonoidId {
        self.id
    }
}

impl<T, V: fmt::Debug> fmt::Debug for FnMonoid<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMonoid")
            .field("id", &self.id)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}
