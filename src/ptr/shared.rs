use alloc::{
    boxed::Box,
    sync::{Arc, Weak},
};
use core::{any::Any, fmt, ops::Deref, ptr::NonNull};
use stable_deref_trait::{CloneStableDeref, StableDeref};

use super::{Deleter, UniquePtr};

/// The control block. It keeps the owned object (or whatever destroys it)
/// alive; the pointee of a [`SharedPtr`] is somewhere inside.
type Owner = dyn Any + Send + Sync;

/// An atomically reference-counted pointer.
///
/// Unlike [`Arc`], the pointee doesn't have to be the whole owned object. A
/// `SharedPtr<U>` obtained by [`SharedPtr::map`] keeps the original object
/// alive while pointing into a part of it (or a trait object view of it).
///
/// # Owned objects
///
/// The control block is type-erased, so a pointer produced by
/// [`SharedPtr::map`] says nothing about the object that it keeps alive. For
/// this reason, every owned object must be `Send + Sync + 'static`; otherwise a
/// projection could carry a `!Send` owner across threads or outlive data the
/// owner borrows. Types with unsynchronized interior mutability are rejected:
///
/// ```compile_fail
/// use core::cell::Cell;
/// use rbkit::ptr::SharedPtr;
///
/// let counter = SharedPtr::new(Cell::new(0));
/// ```
///
/// Use a thread-safe equivalent (an atomic or a lock) for shared mutable
/// state.
///
/// # Examples
///
/// ```
/// use rbkit::ptr::SharedPtr;
///
/// struct Student {
///     name: &'static str,
///     age: u32,
/// }
///
/// let student = SharedPtr::new(Student { name: "wxk", age: 23 });
/// let age = SharedPtr::map(student.clone(), |s| &s.age);
/// drop(student);
///
/// assert_eq!(*age, 23);
/// assert_eq!(SharedPtr::strong_count(&age), 1);
/// ```
pub struct SharedPtr<T: ?Sized> {
    owner: Arc<Owner>,
    ptr: NonNull<T>,
}

// Safety: The pointee is reachable from any thread holding a clone, like
// `Arc<T>`
unsafe impl<T: ?Sized + Send + Sync> Send for SharedPtr<T> {}
// Safety: Ditto
unsafe impl<T: ?Sized + Send + Sync> Sync for SharedPtr<T> {}

/// An owner that runs a [`Deleter`] when the last strong reference goes away.
struct WithDeleter<T: ?Sized, D: Deleter<T>> {
    ptr: NonNull<T>,
    deleter: D,
}

// Safety: `WithDeleter` owns `T` and `D` and only touches them on drop
unsafe impl<T: ?Sized + Send + Sync, D: Deleter<T> + Send> Send for WithDeleter<T, D> {}
// Safety: `&WithDeleter` gives out nothing
unsafe impl<T: ?Sized + Send + Sync, D: Deleter<T>> Sync for WithDeleter<T, D> {}

impl<T: ?Sized, D: Deleter<T>> Drop for WithDeleter<T, D> {
    fn drop(&mut self) {
        // Safety: Every `SharedPtr` to the object is gone at this point
        unsafe { self.deleter.delete(self.ptr) };
    }
}

impl<T: Send + Sync + 'static> SharedPtr<T> {
    /// Allocate `value` and its control block together.
    pub fn new(value: T) -> Self {
        let owner = Arc::new(value);
        let ptr = NonNull::from(&*owner);
        Self { owner, ptr }
    }

    /// Allocate an object that holds a [`WeakPtr`] to itself. `make` receives
    /// the weak pointer before the object exists, so upgrading it inside
    /// `make` fails.
    pub fn new_cyclic(make: impl FnOnce(&WeakPtr<T>) -> T) -> Self {
        let owner = Arc::new_cyclic(|weak: &Weak<T>| {
            // Safety: `Weak::as_ptr` points at the (not yet initialized) slot
            // inside the allocation, which is never null
            let ptr = unsafe { NonNull::new_unchecked(weak.as_ptr() as *mut T) };
            let owner: Weak<Owner> = weak.clone();
            make(&WeakPtr {
                inner: Some((owner, ptr)),
            })
        });
        let ptr = NonNull::from(&*owner);
        Self { owner, ptr }
    }
}

impl<T: ?Sized + Send + Sync + 'static> SharedPtr<T> {
    pub fn from_box(boxed: Box<T>) -> Self {
        let owner = Arc::new(boxed);
        let ptr = NonNull::from(&**owner);
        Self { owner, ptr }
    }

    /// Take shared ownership of the object at `ptr`, which will be destroyed
    /// by `deleter` when the last strong reference is dropped.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a live object that nobody else accesses mutably
    /// while any returned pointer exists, and `deleter` must be able to
    /// destroy it.
    pub unsafe fn from_raw_with_deleter<D>(ptr: NonNull<T>, deleter: D) -> Self
    where
        D: Deleter<T> + Send + Sync + 'static,
    {
        Self {
            owner: Arc::new(WithDeleter { ptr, deleter }),
            ptr,
        }
    }
}

impl<T: ?Sized> SharedPtr<T> {
    /// Get a pointer to something borrowed from the pointee, sharing the
    /// control block with `this`.
    ///
    /// This covers both upcasts (`|x| x as &(dyn Trait + 'static)`) and
    /// projections into fields.
    #[inline]
    pub fn map<U: ?Sized>(this: Self, project: impl FnOnce(&T) -> &U) -> SharedPtr<U> {
        let ptr = NonNull::from(project(&*this));
        SharedPtr {
            owner: this.owner,
            ptr,
        }
    }

    /// Reinterpret the pointee as `U`, sharing the control block with `this`.
    ///
    /// # Safety
    ///
    /// The pointee must be a valid `U`, and it must stay valid for as long as
    /// it's reachable as `T` through other pointers.
    #[inline]
    pub unsafe fn cast<U>(this: Self) -> SharedPtr<U> {
        SharedPtr {
            owner: this.owner,
            ptr: this.ptr.cast(),
        }
    }

    #[inline]
    pub fn as_ptr(this: &Self) -> NonNull<T> {
        this.ptr
    }

    #[inline]
    pub fn strong_count(this: &Self) -> usize {
        Arc::strong_count(&this.owner)
    }

    #[inline]
    pub fn weak_count(this: &Self) -> usize {
        Arc::weak_count(&this.owner)
    }

    /// Return `true` if both point to the same address.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.ptr.cast::<u8>() == other.ptr.cast::<u8>()
    }

    /// Return `true` if both share the same control block, regardless of
    /// their pointee types.
    #[inline]
    pub fn owner_eq<U: ?Sized>(this: &Self, other: &SharedPtr<U>) -> bool {
        Arc::as_ptr(&this.owner).cast::<u8>() == Arc::as_ptr(&other.owner).cast::<u8>()
    }

    #[inline]
    pub fn downgrade(this: &Self) -> WeakPtr<T> {
        WeakPtr {
            inner: Some((Arc::downgrade(&this.owner), this.ptr)),
        }
    }
}

impl SharedPtr<dyn Any + Send + Sync> {
    /// Attempt to convert to a pointer to the concrete type, sharing the
    /// control block. Returns `self` back on mismatch.
    pub fn downcast<U: Any + Send + Sync>(self) -> Result<SharedPtr<U>, Self> {
        let ptr = (*self).downcast_ref::<U>().map(NonNull::from);
        match ptr {
            Some(ptr) => Ok(SharedPtr {
                owner: self.owner,
                ptr,
            }),
            None => Err(self),
        }
    }
}

impl<T: ?Sized, D> From<UniquePtr<T, D>> for SharedPtr<T>
where
    T: Send + Sync + 'static,
    D: Deleter<T> + Send + Sync + 'static,
{
    fn from(unique: UniquePtr<T, D>) -> Self {
        let (ptr, deleter) = unique.into_raw();
        // Safety: The object was exclusively owned by `unique` and is
        // destroyable by `deleter`
        unsafe { Self::from_raw_with_deleter(ptr, deleter) }
    }
}

impl<T: ?Sized> Clone for SharedPtr<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            owner: Arc::clone(&self.owner),
            ptr: self.ptr,
        }
    }
}

impl<T: ?Sized> Deref for SharedPtr<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // Safety: `self.owner` keeps the pointee alive
        unsafe { self.ptr.as_ref() }
    }
}

// Safety: The pointee is owned by the control block and doesn't move
unsafe impl<T: ?Sized> StableDeref for SharedPtr<T> {}
// Safety: Clones point to the same pointee
unsafe impl<T: ?Sized> CloneStableDeref for SharedPtr<T> {}

impl<T: ?Sized + fmt::Debug> fmt::Debug for SharedPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}

impl<T: ?Sized + fmt::Display> fmt::Display for SharedPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}

/// A non-owning observer of a [`SharedPtr`]'s control block.
pub struct WeakPtr<T: ?Sized> {
    inner: Option<(Weak<Owner>, NonNull<T>)>,
}

// Safety: See `SharedPtr`
unsafe impl<T: ?Sized + Send + Sync> Send for WeakPtr<T> {}
// Safety: See `SharedPtr`
unsafe impl<T: ?Sized + Send + Sync> Sync for WeakPtr<T> {}

impl<T: ?Sized> WeakPtr<T> {
    /// Construct a `WeakPtr` that observes nothing.
    #[inline]
    pub const fn new() -> Self {
        Self { inner: None }
    }

    /// Get a [`SharedPtr`] unless the object has been destroyed.
    pub fn upgrade(&self) -> Option<SharedPtr<T>> {
        let (owner, ptr) = self.inner.as_ref()?;
        Some(SharedPtr {
            owner: owner.upgrade()?,
            ptr: *ptr,
        })
    }

    #[inline]
    pub fn strong_count(&self) -> usize {
        self.inner
            .as_ref()
            .map_or(0, |(owner, _)| owner.strong_count())
    }

    /// Return `true` if the object is gone (or was never there).
    #[inline]
    pub fn expired(&self) -> bool {
        self.strong_count() == 0
    }
}

impl<T: ?Sized> Clone for WeakPtr<T> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: ?Sized> Default for WeakPtr<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for WeakPtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(WeakPtr)")
    }
}

/// Lets an object owned by a [`SharedPtr`] obtain another `SharedPtr` to
/// itself.
///
/// The implementor stores a [`WeakPtr`] to itself, which is usually filled in
/// by [`SharedPtr::new_cyclic`].
///
/// # Examples
///
/// ```
/// use rbkit::ptr::{SharedFromThis, SharedPtr, WeakPtr};
///
/// struct Student {
///     weak_this: WeakPtr<Student>,
///     age: u32,
/// }
///
/// impl SharedFromThis for Student {
///     fn weak_this(&self) -> &WeakPtr<Self> {
///         &self.weak_this
///     }
/// }
///
/// let sp = SharedPtr::new_cyclic(|weak| Student {
///     weak_this: weak.clone(),
///     age: 23,
/// });
/// let sp2 = sp.shared_from_this().unwrap();
/// assert!(SharedPtr::ptr_eq(&sp, &sp2));
///
/// let detached = Student { weak_this: WeakPtr::new(), age: 23 };
/// assert!(detached.shared_from_this().is_err());
/// ```
pub trait SharedFromThis {
    fn weak_this(&self) -> &WeakPtr<Self>;

    /// Get a [`SharedPtr`] to `self`.
    fn shared_from_this(&self) -> Result<SharedPtr<Self>, BadWeakPtr> {
        self.weak_this().upgrade().ok_or(BadWeakPtr)
    }

    #[inline]
    fn weak_from_this(&self) -> WeakPtr<Self> {
        self.weak_this().clone()
    }
}

/// Indicates that [`SharedFromThis::shared_from_this`] was called on an
/// object that no [`SharedPtr`] owns.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[cfg_attr(feature = "std", error("the object is not owned by a `SharedPtr`"))]
pub struct BadWeakPtr;
