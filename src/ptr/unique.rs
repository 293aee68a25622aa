use alloc::boxed::Box;
use core::{
    fmt,
    iter::FromIterator,
    marker::PhantomData,
    mem::{ManuallyDrop, MaybeUninit},
    ops::{Deref, DerefMut},
    ptr::{self, NonNull},
};
use stable_deref_trait::StableDeref;

/// The destruction action of a [`UniquePtr`].
pub trait Deleter<T: ?Sized> {
    /// Destroy the object at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a live object that is not accessed afterwards. It
    /// must have been produced in a way this deleter understands.
    unsafe fn delete(&mut self, ptr: NonNull<T>);
}

/// Releases an object allocated by [`Box`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefaultDeleter;

impl<T: ?Sized> Deleter<T> for DefaultDeleter {
    #[inline]
    unsafe fn delete(&mut self, ptr: NonNull<T>) {
        // Safety: Upheld by the caller
        drop(unsafe { Box::from_raw(ptr.as_ptr()) });
    }
}

/// Wraps a closure into a [`Deleter`].
#[derive(Clone, Copy, Default)]
pub struct FnDeleter<F>(pub F);

impl<F> fmt::Debug for FnDeleter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnDeleter")
    }
}

impl<T: ?Sized, F: FnMut(NonNull<T>)> Deleter<T> for FnDeleter<F> {
    #[inline]
    unsafe fn delete(&mut self, ptr: NonNull<T>) {
        (self.0)(ptr)
    }
}

/// A non-null pointer that exclusively owns the pointee and destroys it with
/// `D` when dropped.
///
/// # Examples
///
/// ```
/// use rbkit::ptr::UniquePtr;
///
/// trait Shape {
///     fn area(&self) -> u32;
/// }
///
/// struct Square(u32);
///
/// impl Shape for Square {
///     fn area(&self) -> u32 {
///         self.0 * self.0
///     }
/// }
///
/// let shape = UniquePtr::new(Square(3)).upcast(|b| b as Box<dyn Shape>);
/// assert_eq!(shape.area(), 9);
/// ```
pub struct UniquePtr<T: ?Sized, D: Deleter<T> = DefaultDeleter> {
    ptr: NonNull<T>,
    deleter: D,
    _phantom: PhantomData<T>,
}

// Safety: `UniquePtr` owns `T` and `D` exclusively, i.e., it's like
// `(Box<T>, D)`
unsafe impl<T: ?Sized + Send, D: Deleter<T> + Send> Send for UniquePtr<T, D> {}
// Safety: `&UniquePtr` only gives out `&T` and `&D`
unsafe impl<T: ?Sized + Sync, D: Deleter<T> + Sync> Sync for UniquePtr<T, D> {}

impl<T> UniquePtr<T> {
    /// Allocate `value` on the heap.
    #[inline]
    pub fn new(value: T) -> Self {
        Self::from_box(Box::new(value))
    }

    /// Allocate storage for a `T` without initializing it. Use
    /// [`UniquePtr::write`] to initialize it.
    #[inline]
    pub fn new_uninit() -> UniquePtr<MaybeUninit<T>> {
        UniquePtr::new(MaybeUninit::uninit())
    }
}

impl<T> UniquePtr<MaybeUninit<T>> {
    /// Initialize the storage with `value`.
    pub fn write(self, value: T) -> UniquePtr<T> {
        let ptr = Box::into_raw(self.into_box());
        // Safety: `ptr` came from `Box::into_raw`, and `MaybeUninit<T>` has
        // the same layout as `T`
        unsafe {
            (*ptr).write(value);
            UniquePtr::from_box(Box::from_raw(ptr.cast::<T>()))
        }
    }
}

impl<T: ?Sized> UniquePtr<T> {
    #[inline]
    pub fn from_box(boxed: Box<T>) -> Self {
        Self {
            ptr: NonNull::from(Box::leak(boxed)),
            deleter: DefaultDeleter,
            _phantom: PhantomData,
        }
    }

    #[inline]
    pub fn into_box(self) -> Box<T> {
        let (ptr, DefaultDeleter) = self.into_raw();
        // Safety: `DefaultDeleter` pointers always come from `Box`
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    /// Convert to a pointer to a different type, which is usually an unsized
    /// type such as `dyn Trait` implemented by `T`.
    #[inline]
    pub fn upcast<U: ?Sized>(self, convert: impl FnOnce(Box<T>) -> Box<U>) -> UniquePtr<U> {
        UniquePtr::from_box(convert(self.into_box()))
    }
}

impl<T: ?Sized, D: Deleter<T>> UniquePtr<T, D> {
    /// Take ownership of the object at `ptr`, which will be destroyed by
    /// `deleter`.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a live object that nobody else accesses while the
    /// returned `UniquePtr` exists, and `deleter` must be able to destroy it.
    #[inline]
    pub unsafe fn from_raw_with_deleter(ptr: NonNull<T>, deleter: D) -> Self {
        Self {
            ptr,
            deleter,
            _phantom: PhantomData,
        }
    }

    /// Release the ownership without destroying the object.
    #[inline]
    pub fn into_raw(self) -> (NonNull<T>, D) {
        let this = ManuallyDrop::new(self);
        // Safety: `this.deleter` is never touched again
        let deleter = unsafe { ptr::read(&this.deleter) };
        (this.ptr, deleter)
    }

    #[inline]
    pub fn as_ptr(&self) -> NonNull<T> {
        self.ptr
    }

    #[inline]
    pub fn deleter(&self) -> &D {
        &self.deleter
    }

    #[inline]
    pub fn deleter_mut(&mut self) -> &mut D {
        &mut self.deleter
    }
}

impl<T: ?Sized, D: Deleter<T>> Drop for UniquePtr<T, D> {
    #[inline]
    fn drop(&mut self) {
        // Safety: We own the pointee, and it's never accessed again
        unsafe { self.deleter.delete(self.ptr) };
    }
}

impl<T: ?Sized, D: Deleter<T>> Deref for UniquePtr<T, D> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // Safety: We own the pointee
        unsafe { self.ptr.as_ref() }
    }
}

impl<T: ?Sized, D: Deleter<T>> DerefMut for UniquePtr<T, D> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        // Safety: We own the pointee exclusively
        unsafe { self.ptr.as_mut() }
    }
}

// Safety: The pointee is on the heap and doesn't move with `UniquePtr`
unsafe impl<T: ?Sized, D: Deleter<T>> StableDeref for UniquePtr<T, D> {}

impl<T: ?Sized> From<Box<T>> for UniquePtr<T> {
    #[inline]
    fn from(boxed: Box<T>) -> Self {
        Self::from_box(boxed)
    }
}

impl<T> FromIterator<T> for UniquePtr<[T]> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_box(iter.into_iter().collect())
    }
}

impl<T: ?Sized + fmt::Debug, D: Deleter<T>> fmt::Debug for UniquePtr<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}

impl<T: ?Sized + fmt::Display, D: Deleter<T>> fmt::Display for UniquePtr<T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (**self).fmt(f)
    }
}
