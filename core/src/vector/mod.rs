use crate::common::{Contention, Vector};
use crate::config::Config;
use crossbeam_epoch::{self as epoch, Atomic, Guard, Owned, Shared};
use std::fmt::{Debug, Formatter};
use std::sync::atomic::Ordering::{AcqRel, Acquire, Relaxed};


/// Lock-free indexed sequence.
///
/// The whole content is one immutable array behind a single atomic pointer. Every mutation copies
/// the array it loaded, applies the change to the copy and installs it with a CAS, retrying from
/// a fresh load if another mutation won. A reader that loaded an array keeps seeing exactly that
/// content; replaced arrays are freed once no pinned thread can still hold them.
///
/// Those arrays are dropped by whichever thread collects the epoch garbage, so mutations require
/// `T: Send + 'static`:
///
/// ```compile_fail
/// use simple_lockfree_core::LockFreeVector;
/// use std::rc::Rc;
///
/// let vector = LockFreeVector::new();
/// vector.push(Rc::new(1));
/// ```
///
/// # Examples
///
/// ```
/// use simple_lockfree_core::vector::LockFreeVector;
///
/// let vector = LockFreeVector::new();
/// vector.push(10);
/// vector.push(20);
/// vector.push(40);
/// assert!(vector.insert(30, 2));
/// assert_eq!(vector.get(2), Some(30));
/// assert!(vector.remove(1));
/// assert_eq!(vector.size(), 3);
/// assert_eq!(vector.pop(), Some(40));
/// assert!(!vector.remove(2));
/// ```
pub struct LockFreeVector<T> {
    data: Atomic<Box<[T]>>,
    config: Config,
}

impl<T: Debug> Debug for LockFreeVector<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let guard = &epoch::pin();
        f.debug_list().entries(self.snapshot(guard).iter()).finish()
    }
}

impl<T> Default for LockFreeVector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for LockFreeVector<T> {
    fn drop(&mut self) {
        unsafe {
            let guard = epoch::unprotected();
            drop(self.data.load(Relaxed, guard).into_owned());
        }
    }
}

impl<T> LockFreeVector<T> {
    /// Create an empty vector with the default [`Config`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create an empty vector, backed by a zero-length array.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        LockFreeVector {
            data: Atomic::new(Box::default()),
            config,
        }
    }

    /// The config mutations retry with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn snapshot<'g>(&self, guard: &'g Guard) -> &'g [T] {
        // `data` is never null
        let array = unsafe { self.data.load(Acquire, guard).deref() };
        &array[..]
    }

    /// Returns `true` if the vector holds no element.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Get the number of elements.
    #[must_use]
    pub fn size(&self) -> usize {
        self.snapshot(&epoch::pin()).len()
    }
}

impl<T: Send + 'static> LockFreeVector<T> {
    /// Install a fresh empty array.
    ///
    /// The store is unconditional: a mutation that loaded the old array before this call and
    /// wins its CAS afterwards brings the old content back with its change applied.
    pub fn clear(&self) {
        let guard = &epoch::pin();
        let old = self.data.swap(Owned::new(Box::default()), AcqRel, guard);
        crate::trace!("clear discards {} elements", unsafe { old.deref() }.len());
        unsafe { guard.defer_destroy(old) };
    }

    /// Replace the array with `mutate(current, rejected)` until the CAS succeeds.
    ///
    /// `rejected` is the array built by the previous attempt, empty on the first one, so elements
    /// the caller handed over can be moved out of it instead of cloned. `mutate` returns `None` to
    /// give up without touching the vector, e.g. for an index out of range. The returned value is
    /// computed from the array that was actually replaced.
    fn update<R>(
        &self,
        operation: &'static str,
        mut mutate: impl FnMut(&[T], Vec<T>) -> Option<(Vec<T>, R)>,
    ) -> Option<R> {
        let guard = &epoch::pin();
        let mut contention = Contention::new(operation, &self.config);
        let mut rejected = Vec::new();
        loop {
            let current = self.data.load(Acquire, guard);
            let array = unsafe { current.deref() };
            let (next, result) = mutate(&array[..], rejected)?;
            match self.replace(current, next, guard) {
                Ok(()) => return Some(result),
                Err(next) => rejected = next,
            }
            contention.retry();
        }
    }

    /// Install `next` if `data` still holds `current`, otherwise hand `next` back.
    fn replace<'g>(
        &self,
        current: Shared<'g, Box<[T]>>,
        next: Vec<T>,
        guard: &'g Guard,
    ) -> Result<(), Vec<T>> {
        let next = Owned::new(next.into_boxed_slice());
        match self
            .data
            .compare_exchange(current, next, AcqRel, Acquire, guard)
        {
            Ok(_) => {
                // readers may still be holding the old array
                unsafe { guard.defer_destroy(current) };
                Ok(())
            }
            Err(error) => {
                let next: Box<[T]> = *error.new.into_box();
                Err(next.into_vec())
            }
        }
    }
}

impl<T: Clone> LockFreeVector<T> {
    /// Get a clone of the element at `index`, `None` if out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        self.snapshot(&epoch::pin()).get(index).cloned()
    }
}

impl<T: Clone + Send + 'static> LockFreeVector<T> {
    /// Insert `item` at `index`, shifting the elements after it to the right.
    ///
    /// Returns `false` and leaves the vector unchanged if `index > size()`.
    pub fn insert(&self, item: T, index: usize) -> bool {
        let mut item = Some(item);
        self.update("LockFreeVector::insert", |current, mut next| {
            if index > current.len() {
                return None;
            }
            let item = match item.take() {
                Some(item) => item,
                // the previous attempt placed it at `index`
                None => next.remove(index),
            };
            next.clear();
            next.reserve(current.len().saturating_add(1));
            next.extend_from_slice(&current[..index]);
            next.push(item);
            next.extend_from_slice(&current[index..]);
            Some((next, ()))
        })
        .is_some()
    }

    /// Remove the element at `index`, shifting the elements after it to the left.
    ///
    /// Returns `false` and leaves the vector unchanged if `index >= size()`.
    pub fn remove(&self, index: usize) -> bool {
        self.update("LockFreeVector::remove", |current, _| {
            if index >= current.len() {
                return None;
            }
            let mut next = Vec::with_capacity(current.len() - 1);
            next.extend_from_slice(&current[..index]);
            next.extend_from_slice(&current[index + 1..]);
            Some((next, ()))
        })
        .is_some()
    }

    /// Append an element.
    pub fn push(&self, item: T) {
        let mut item = Some(item);
        _ = self.update("LockFreeVector::push", |current, mut next| {
            let item = match item.take() {
                Some(item) => item,
                None => next.pop()?,
            };
            next.clear();
            next.reserve(current.len().saturating_add(1));
            next.extend_from_slice(current);
            next.push(item);
            Some((next, ()))
        });
    }

    /// Remove and return the last element of the array this call replaced.
    pub fn pop(&self) -> Option<T> {
        self.update("LockFreeVector::pop", |current, _| {
            let (last, rest) = current.split_last()?;
            Some((rest.to_vec(), last.clone()))
        })
    }
}

impl<T: Clone + Send + 'static> Vector<T> for LockFreeVector<T> {
    fn is_empty(&self) -> bool {
        LockFreeVector::is_empty(self)
    }

    fn size(&self) -> usize {
        LockFreeVector::size(self)
    }

    fn get(&self, index: usize) -> Option<T> {
        LockFreeVector::get(self, index)
    }

    fn insert(&self, item: T, index: usize) -> bool {
        LockFreeVector::insert(self, item, index)
    }

    fn remove(&self, index: usize) -> bool {
        LockFreeVector::remove(self, index)
    }

    fn push(&self, item: T) {
        LockFreeVector::push(self, item);
    }

    fn pop(&self) -> Option<T> {
        LockFreeVector::pop(self)
    }

    fn clear(&self) {
        LockFreeVector::clear(self);
    }
}
