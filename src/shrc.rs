use std::alloc::{handle_alloc_error, Layout};
use std::fmt::{Debug, Display, Pointer};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::mem;
use std::ops::Deref;
use std::ptr::{self, NonNull};

use crate::block::{self, Header, InplaceBlock, RegularBlock};

/// Error returned by the fallible raw-pointer constructors when the control
/// block cannot be allocated.
///
/// By the time this error is produced the deleter has already been invoked on
/// the raw pointer, so the object it pointed at is released, not leaked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("failed to allocate a control block")]
pub struct AllocError;

/// A value that knows how to release a raw pointer.
///
/// Deleters are stored by value inside the control block and invoked at most
/// once, when the last [`Shrc`] referencing the object is dropped. Any
/// `FnMut(*mut T)` closure is a deleter; [`BoxDeleter`] is the default used
/// by [`Shrc::from_box`] and [`Shrc::from_raw`].
///
/// Deleters must not panic. The destroy step runs inside handle drops, and an
/// unwinding deleter leaves the control block in an unspecified (though not
/// memory-unsafe) state.
///
/// ```
/// use shrc::{Deleter, Shrc};
///
/// struct Freer;
///
/// impl Deleter<i32> for Freer {
///     unsafe fn delete(&mut self, ptr: *mut i32) {
///         drop(Box::from_raw(ptr));
///     }
/// }
///
/// let ptr = Box::into_raw(Box::new(5));
/// let handle = unsafe { Shrc::from_raw_with(ptr, Freer) };
/// assert_eq!(*handle, 5);
/// ```
pub trait Deleter<T: ?Sized> {
    /// Release the object behind `ptr`.
    ///
    /// # Safety
    /// `ptr` is the pointer the owning handle was constructed from, still
    /// valid and uniquely owned at the point of the call. Called at most
    /// once per object.
    unsafe fn delete(&mut self, ptr: *mut T);
}

impl<T: ?Sized, F: FnMut(*mut T)> Deleter<T> for F {
    unsafe fn delete(&mut self, ptr: *mut T) {
        self(ptr)
    }
}

/// The default deleter: reconstitutes the [`Box`] the pointer came from and
/// drops it.
pub struct BoxDeleter;

impl<T: ?Sized> Deleter<T> for BoxDeleter {
    unsafe fn delete(&mut self, ptr: *mut T) {
        drop(Box::from_raw(ptr));
    }
}

/// `Shrc<T>` is a heap-allocated smart pointer providing shared ownership of
/// a value within a single thread. `Shrc` stands for: SHared Reference
/// Counted.
///
/// Every clone shares one control block holding a strong and a weak count;
/// the value is dropped when the last `Shrc` goes away, and the control block
/// itself is freed once no [`Weak`] handles remain either. The counts are
/// plain (non-atomic) integers, so `Shrc<T>` is neither [`Send`] nor
/// [`Sync`]; it is the single-threaded sibling of `Rc<T>` with two extra
/// capabilities that `Rc` lacks: custom deleters and aliasing projections.
///
/// ## Construction
/// [`Shrc::new`] is the preferred path: it places the value and the counts in
/// one allocation. [`Shrc::from_box`] and the unsafe [`Shrc::from_raw_with`]
/// family adopt an externally allocated object instead, releasing it through
/// a pluggable [`Deleter`] — at the cost of a separate control-block
/// allocation. [`Shrc::try_new_with`] runs a fallible initializer directly
/// into the block's storage and propagates its error without leaking
/// anything.
///
/// ## The empty state
/// Unlike `Rc`, an `Shrc` can be empty ([`Shrc::empty`], [`Default`],
/// [`Shrc::reset`]): it then owns nothing, [`Shrc::get`] returns [`None`],
/// and dereferencing panics. This mirrors a null smart pointer and is what a
/// failed [`Weak::upgrade`] would otherwise have to invent.
///
/// ## Aliasing
/// [`Shrc::project`] creates a handle that keeps the whole object alive while
/// pointing at a sub-object:
///
/// ```
/// use shrc::Shrc;
///
/// struct Employee {
///     name: String,
///     id: u32,
/// }
///
/// let e = Shrc::new(Employee { name: "ada".into(), id: 7 });
/// let name: Shrc<String> = Shrc::project(&e, |e| &e.name);
/// drop(e);
/// assert_eq!(&*name, "ada"); // the Employee is still alive
/// ```
///
/// To prevent name clashes with methods of `T`, `Shrc<T>`'s own functions are
/// associated.
///
/// ## Equality
/// `PartialEq`, `Eq`, and `Hash` go by the accessible object's address, not
/// by value: two handles are equal iff they expose the same pointer. Aliased
/// handles to different sub-objects of one allocation therefore compare
/// unequal, and two empty handles compare equal.
pub struct Shrc<T: ?Sized> {
    ctrl: Option<NonNull<Header>>,
    ptr: *const T,
    phantom: PhantomData<T>,
}

impl<T> Shrc<T> {
    /// Creates a new `Shrc<T>` with the value and the reference counts placed
    /// in a single allocation.
    /// ```
    /// use shrc::Shrc;
    ///
    /// let handle = Shrc::new(100);
    /// assert_eq!(*handle, 100);
    /// assert_eq!(Shrc::strong_count(&handle), 1);
    /// ```
    #[inline]
    pub fn new(value: T) -> Self {
        let (ctrl, ptr) = InplaceBlock::allocate(value);
        Shrc {
            ctrl: Some(ctrl),
            ptr: ptr.as_ptr(),
            phantom: PhantomData,
        }
    }

    /// Creates a new `Shrc<T>` from a fallible initializer, still with a
    /// single allocation for value and counts.
    ///
    /// The block storage is allocated first and the initializer runs after;
    /// if it returns an error (or panics), the storage is released without
    /// the value slot ever being treated as a `T`, and the error is returned
    /// unchanged.
    /// ```
    /// use shrc::Shrc;
    ///
    /// let ok: Result<Shrc<i32>, String> = Shrc::try_new_with(|| Ok(7));
    /// assert_eq!(*ok.unwrap(), 7);
    ///
    /// let err: Result<Shrc<i32>, String> = Shrc::try_new_with(|| Err("no".into()));
    /// assert_eq!(err.unwrap_err(), "no");
    /// ```
    pub fn try_new_with<E, F>(init: F) -> Result<Self, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let (ctrl, ptr) = InplaceBlock::try_allocate(init)?;
        Ok(Shrc {
            ctrl: Some(ctrl),
            ptr: ptr.as_ptr(),
            phantom: PhantomData,
        })
    }

    /// Creates an empty `Shrc<T>`: no control block, no object.
    /// ```
    /// use shrc::Shrc;
    ///
    /// let empty = Shrc::<i32>::empty();
    /// assert!(Shrc::is_empty(&empty));
    /// assert_eq!(Shrc::strong_count(&empty), 0);
    /// assert!(Shrc::as_ptr(&empty).is_null());
    /// ```
    #[inline]
    pub const fn empty() -> Self {
        Shrc {
            ctrl: None,
            ptr: ptr::null(),
            phantom: PhantomData,
        }
    }

    /// Releases this handle's ownership, leaving it empty. The object is
    /// dropped if this was the last strong reference.
    /// ```
    /// use shrc::Shrc;
    ///
    /// let mut a = Shrc::new(5);
    /// let b = a.clone();
    /// Shrc::reset(&mut a);
    /// assert!(Shrc::is_empty(&a));
    /// assert_eq!(Shrc::strong_count(&b), 1);
    /// ```
    #[inline]
    pub fn reset(this: &mut Self) {
        *this = Shrc::empty();
    }
}

impl<T: ?Sized> Shrc<T> {
    /// Creates an `Shrc<T>` owning the object inside `value`, released with
    /// the default [`BoxDeleter`]. This is the safe entry to the
    /// external-allocation path and works for unsized payloads.
    /// ```
    /// use shrc::Shrc;
    ///
    /// let slice: Shrc<[i32]> = Shrc::from_box(vec![1, 2, 3].into_boxed_slice());
    /// assert_eq!(slice[1], 2);
    /// ```
    pub fn from_box(value: Box<T>) -> Self {
        let ptr = Box::into_raw(value);
        // The pointer came out of a live Box, so it is valid, uniquely owned,
        // and releasable by BoxDeleter.
        unsafe { Shrc::from_raw_with(ptr, BoxDeleter) }
    }

    /// Creates an `Shrc<T>` taking ownership of `ptr`, released with the
    /// default [`BoxDeleter`].
    ///
    /// # Safety
    /// `ptr` must be non-null and must have been obtained from
    /// [`Box::into_raw`] (or be otherwise sound to pass to
    /// [`Box::from_raw`]), and nothing else may release it.
    pub unsafe fn from_raw(ptr: *mut T) -> Self {
        Self::from_raw_with(ptr, BoxDeleter)
    }

    /// Creates an `Shrc<T>` taking ownership of `ptr`, released with
    /// `deleter` when the last strong reference is dropped.
    ///
    /// If the control-block allocation fails, the deleter is first invoked on
    /// `ptr` and the global allocation-error handler is then called, so the
    /// object cannot leak. Use [`Shrc::try_from_raw_with`] to observe that
    /// failure as an error instead.
    /// ```
    /// use std::cell::Cell;
    /// use shrc::Shrc;
    ///
    /// let freed = Cell::new(0);
    /// {
    ///     let ptr = Box::into_raw(Box::new(7));
    ///     let handle = unsafe {
    ///         Shrc::from_raw_with(ptr, |p: *mut i32| {
    ///             freed.set(freed.get() + 1);
    ///             drop(unsafe { Box::from_raw(p) });
    ///         })
    ///     };
    ///     assert_eq!(*handle, 7);
    ///     assert_eq!(freed.get(), 0);
    /// }
    /// assert_eq!(freed.get(), 1);
    /// ```
    ///
    /// # Safety
    /// `ptr` must be non-null, valid, and uniquely owned, and releasing it
    /// through `deleter` must be sound.
    pub unsafe fn from_raw_with<D: Deleter<T>>(ptr: *mut T, deleter: D) -> Self {
        match Self::try_from_raw_with(ptr, deleter) {
            Ok(this) => this,
            Err(AllocError) => handle_alloc_error(Layout::new::<RegularBlock<T, D>>()),
        }
    }

    /// Fallible form of [`Shrc::from_raw_with`]. On [`AllocError`] the
    /// deleter has already run on `ptr`, so the caller holds nothing.
    ///
    /// # Safety
    /// Same contract as [`Shrc::from_raw_with`].
    pub unsafe fn try_from_raw_with<D: Deleter<T>>(
        ptr: *mut T,
        deleter: D,
    ) -> Result<Self, AllocError> {
        debug_assert!(!ptr.is_null());
        let ctrl = RegularBlock::allocate(NonNull::new_unchecked(ptr), deleter)?;
        Ok(Shrc {
            ctrl: Some(ctrl),
            ptr,
            phantom: PhantomData,
        })
    }

    /// Creates a handle that shares ownership with `this` but points at a
    /// sub-object selected by `f` — an aliasing handle. The whole object
    /// stays alive as long as the projected handle does.
    /// ```
    /// use shrc::Shrc;
    ///
    /// let pair = Shrc::new((1u8, "two"));
    /// let second = Shrc::project(&pair, |p| &p.1);
    /// assert_eq!(*second, "two");
    /// assert_eq!(Shrc::strong_count(&pair), 2);
    /// drop(pair);
    /// assert_eq!(*second, "two");
    /// ```
    ///
    /// # Panics
    /// Panics if `this` is empty.
    pub fn project<U: ?Sized, F>(this: &Self, f: F) -> Shrc<U>
    where
        F: FnOnce(&T) -> &U,
    {
        let ctrl = match this.ctrl {
            Some(ctrl) => ctrl,
            None => panic!("cannot project an empty Shrc"),
        };
        let ptr = f(unsafe { &*this.ptr }) as *const U;
        unsafe { ctrl.as_ref() }.add_strong();
        Shrc {
            ctrl: Some(ctrl),
            ptr,
            phantom: PhantomData,
        }
    }

    /// Returns a reference to the object, or [`None`] if the handle is empty.
    /// ```
    /// use shrc::Shrc;
    ///
    /// let a = Shrc::new(3);
    /// assert_eq!(Shrc::get(&a), Some(&3));
    /// assert_eq!(Shrc::get(&Shrc::<i32>::empty()), None);
    /// ```
    #[inline]
    pub fn get(this: &Self) -> Option<&T> {
        this.ctrl.map(|_| unsafe { &*this.ptr })
    }

    /// Returns the accessible object pointer; null iff the handle is empty.
    /// For a projected handle this is the sub-object's address, not the
    /// block's own managed pointer.
    #[inline]
    pub fn as_ptr(this: &Self) -> *const T {
        this.ptr
    }

    /// Whether this handle owns nothing.
    #[inline]
    pub fn is_empty(this: &Self) -> bool {
        this.ctrl.is_none()
    }

    /// Returns the number of `Shrc` handles sharing this handle's control
    /// block, or 0 if the handle is empty.
    /// ```
    /// use shrc::Shrc;
    ///
    /// let a = Shrc::new(1);
    /// let b = a.clone();
    /// assert_eq!(Shrc::strong_count(&a), 2);
    /// drop(b);
    /// assert_eq!(Shrc::strong_count(&a), 1);
    /// ```
    #[inline]
    pub fn strong_count(this: &Self) -> usize {
        match this.ctrl {
            Some(ctrl) => unsafe { ctrl.as_ref() }.strong_count(),
            None => 0,
        }
    }

    /// Returns the number of [`Weak`] handles pointing at this handle's
    /// control block, or 0 if the handle is empty.
    /// ```
    /// use shrc::Shrc;
    ///
    /// let a = Shrc::new(1);
    /// assert_eq!(Shrc::weak_count(&a), 0);
    /// let w = Shrc::downgrade(&a);
    /// assert_eq!(Shrc::weak_count(&a), 1);
    /// drop(w);
    /// assert_eq!(Shrc::weak_count(&a), 0);
    /// ```
    #[inline]
    pub fn weak_count(this: &Self) -> usize {
        match this.ctrl {
            Some(ctrl) => unsafe { ctrl.as_ref() }.weak_count(),
            None => 0,
        }
    }

    /// Whether the two handles expose the same object address. Same relation
    /// as `==`, provided in associated form.
    /// ```
    /// use shrc::Shrc;
    ///
    /// let a = Shrc::new(1);
    /// let b = a.clone();
    /// assert!(Shrc::ptr_eq(&a, &b));
    /// assert!(!Shrc::ptr_eq(&a, &Shrc::new(1)));
    /// ```
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        ptr::eq(this.ptr, other.ptr)
    }

    /// Exchanges the contents of two handles without touching any count.
    #[inline]
    pub fn swap(this: &mut Self, other: &mut Self) {
        mem::swap(this, other);
    }

    /// Releases the current ownership and adopts `ptr` with the default
    /// [`BoxDeleter`]. The new ownership is in place before the old one is
    /// released.
    ///
    /// # Safety
    /// Same contract as [`Shrc::from_raw`].
    pub unsafe fn reset_raw(this: &mut Self, ptr: *mut T) {
        *this = Shrc::from_raw(ptr);
    }

    /// Releases the current ownership and adopts `ptr` with `deleter`,
    /// with the same allocation-failure guarantee as
    /// [`Shrc::from_raw_with`].
    ///
    /// # Safety
    /// Same contract as [`Shrc::from_raw_with`].
    pub unsafe fn reset_raw_with<D: Deleter<T>>(this: &mut Self, ptr: *mut T, deleter: D) {
        *this = Shrc::from_raw_with(ptr, deleter);
    }

    /// Creates a [`Weak`] handle to this handle's object. This increments the
    /// weak count and never affects the object's lifetime.
    /// ```
    /// use shrc::{Shrc, Weak};
    ///
    /// let a = Shrc::new(100);
    /// let w = Shrc::downgrade(&a);
    /// assert_eq!(*Weak::upgrade(&w).unwrap(), 100);
    /// ```
    #[inline]
    pub fn downgrade(this: &Self) -> Weak<T> {
        if let Some(ctrl) = this.ctrl {
            unsafe { ctrl.as_ref() }.add_weak();
        }
        Weak {
            ctrl: this.ctrl,
            ptr: this.ptr,
        }
    }
}

impl<T: ?Sized> Clone for Shrc<T> {
    /// Clone an `Shrc<T>` (increment the strong count). Cloning an empty
    /// handle yields another empty handle.
    /// ```
    /// use shrc::Shrc;
    ///
    /// let a = Shrc::new(100);
    /// let b = a.clone();
    /// assert_eq!(Shrc::strong_count(&a), 2);
    /// assert!(Shrc::ptr_eq(&a, &b));
    /// ```
    #[inline]
    fn clone(&self) -> Self {
        if let Some(ctrl) = self.ctrl {
            unsafe { ctrl.as_ref() }.add_strong();
        }
        Shrc {
            ctrl: self.ctrl,
            ptr: self.ptr,
            phantom: PhantomData,
        }
    }
}

impl<T: ?Sized> Drop for Shrc<T> {
    #[inline]
    fn drop(&mut self) {
        if let Some(ctrl) = self.ctrl {
            unsafe { block::release_strong(ctrl) };
        }
    }
}

impl<T: ?Sized> Deref for Shrc<T> {
    type Target = T;

    /// Get a reference to the object.
    ///
    /// # Panics
    /// Panics if the handle is empty; use [`Shrc::get`] to observe emptiness
    /// without panicking.
    #[inline]
    fn deref(&self) -> &T {
        match Shrc::get(self) {
            Some(value) => value,
            None => panic!("dereferenced an empty Shrc"),
        }
    }
}

impl<T> Default for Shrc<T> {
    /// The empty handle.
    fn default() -> Self {
        Shrc::empty()
    }
}

impl<T> From<T> for Shrc<T> {
    /// Equivalent to [`Shrc::new`].
    fn from(value: T) -> Self {
        Shrc::new(value)
    }
}

impl<T: ?Sized> From<Box<T>> for Shrc<T> {
    /// Equivalent to [`Shrc::from_box`].
    fn from(value: Box<T>) -> Self {
        Shrc::from_box(value)
    }
}

impl<T: ?Sized> PartialEq for Shrc<T> {
    /// Pointer-identity equality: true iff both handles expose the same
    /// object address. Two empty handles are equal; handles to two separate
    /// allocations of equal values are not.
    /// ```
    /// use shrc::Shrc;
    ///
    /// let a = Shrc::new(100);
    /// assert!(a == a.clone());
    /// assert!(a != Shrc::new(100));
    /// assert!(Shrc::<i32>::empty() == Shrc::empty());
    /// ```
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.ptr, other.ptr)
    }
}

impl<T: ?Sized> Eq for Shrc<T> {}

impl<T: ?Sized> Hash for Shrc<T> {
    /// Hashes the accessible object's address, consistently with `==`.
    ///
    /// For unsized `T` only the address is hashed, while `==` also compares
    /// pointer metadata: two handles with the same base address but different
    /// metadata hash alike yet compare unequal. That direction of collision
    /// is permitted by the `Hash`/`Eq` contract (equal handles always share
    /// an address, hence a hash).
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.ptr.cast::<()>() as usize);
    }
}

impl<T: Debug + ?Sized> Debug for Shrc<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match Shrc::get(self) {
            Some(value) => Debug::fmt(value, f),
            None => f.write_str("(empty)"),
        }
    }
}

impl<T: Display + ?Sized> Display for Shrc<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match Shrc::get(self) {
            Some(value) => Display::fmt(value, f),
            None => f.write_str("(empty)"),
        }
    }
}

impl<T: ?Sized> Pointer for Shrc<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Pointer::fmt(&self.ptr, f)
    }
}

/// `Weak<T>` is a non-owning handle to an [`Shrc`]'s object. It observes the
/// object without keeping it alive: the value is dropped when the last `Shrc`
/// goes away no matter how many `Weak`s remain, and only the control-block
/// allocation outlives it. A `Weak` cannot touch the object directly; it must
/// first be turned back into an `Shrc` with [`Weak::upgrade`], which succeeds
/// only while the object is still alive.
///
/// The classic use is breaking reference cycles: parents hold `Shrc`s to
/// their children, children hold `Weak`s back to their parents.
///
/// To prevent name clashes, `Weak<T>`'s functions are associated.
///
/// ```
/// use shrc::{Shrc, Weak};
///
/// let strong = Shrc::new(100);
/// let weak = Shrc::downgrade(&strong);
/// assert_eq!(*Weak::upgrade(&weak).unwrap(), 100);
///
/// drop(strong);
/// assert!(Weak::upgrade(&weak).is_none());
/// ```
pub struct Weak<T: ?Sized> {
    ctrl: Option<NonNull<Header>>,
    ptr: *const T,
}

impl<T> Weak<T> {
    /// Creates an empty `Weak<T>`: no control block, [`Weak::upgrade`] always
    /// returns [`None`].
    #[inline]
    pub const fn new() -> Self {
        Weak {
            ctrl: None,
            ptr: ptr::null(),
        }
    }
}

impl<T: ?Sized> Weak<T> {
    /// Attempts to produce an [`Shrc`] to the object. Succeeds, incrementing
    /// the strong count, iff at least one `Shrc` is alive at the instant of
    /// the call; otherwise returns [`None`].
    /// ```
    /// use shrc::{Shrc, Weak};
    ///
    /// let strong = Shrc::new(1);
    /// let weak = Shrc::downgrade(&strong);
    ///
    /// let second = Weak::upgrade(&weak).unwrap();
    /// drop(strong);
    /// // `second` still keeps the object alive.
    /// assert_eq!(*second, 1);
    ///
    /// drop(second);
    /// assert!(Weak::upgrade(&weak).is_none());
    /// ```
    #[inline]
    pub fn upgrade(this: &Self) -> Option<Shrc<T>> {
        let ctrl = this.ctrl?;
        let header = unsafe { ctrl.as_ref() };
        if header.strong_count() == 0 {
            return None;
        }
        header.add_strong();
        Some(Shrc {
            ctrl: Some(ctrl),
            ptr: this.ptr,
            phantom: PhantomData,
        })
    }

    /// Whether the object is currently alive. A point-in-time snapshot, not a
    /// lock: prefer [`Weak::upgrade`] when the object is to be used.
    /// ```
    /// use shrc::{Shrc, Weak};
    ///
    /// let strong = Shrc::new(1);
    /// let weak = Shrc::downgrade(&strong);
    /// assert!(Weak::is_alive(&weak));
    /// drop(strong);
    /// assert!(!Weak::is_alive(&weak));
    /// ```
    #[inline]
    pub fn is_alive(this: &Self) -> bool {
        match this.ctrl {
            Some(ctrl) => unsafe { ctrl.as_ref() }.strong_count() > 0,
            None => false,
        }
    }

    /// Returns the strong count of the referenced control block, or 0 if the
    /// handle is empty.
    #[inline]
    pub fn strong_count(this: &Self) -> usize {
        match this.ctrl {
            Some(ctrl) => unsafe { ctrl.as_ref() }.strong_count(),
            None => 0,
        }
    }

    /// Returns the weak count of the referenced control block, or 0 if the
    /// handle is empty.
    #[inline]
    pub fn weak_count(this: &Self) -> usize {
        match this.ctrl {
            Some(ctrl) => unsafe { ctrl.as_ref() }.weak_count(),
            None => 0,
        }
    }

    /// Whether the two handles reference the same object address.
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        ptr::eq(this.ptr, other.ptr)
    }
}

impl<T: ?Sized> Clone for Weak<T> {
    /// Clone a `Weak<T>` (increment the weak count).
    /// ```
    /// use shrc::{Shrc, Weak};
    ///
    /// let strong = Shrc::new(1);
    /// let w1 = Shrc::downgrade(&strong);
    /// let w2 = w1.clone();
    /// assert_eq!(Weak::weak_count(&w2), 2);
    /// ```
    #[inline]
    fn clone(&self) -> Self {
        if let Some(ctrl) = self.ctrl {
            unsafe { ctrl.as_ref() }.add_weak();
        }
        Weak {
            ctrl: self.ctrl,
            ptr: self.ptr,
        }
    }
}

impl<T: ?Sized> Drop for Weak<T> {
    #[inline]
    fn drop(&mut self) {
        if let Some(ctrl) = self.ctrl {
            unsafe { block::release_weak(ctrl) };
        }
    }
}

impl<T> Default for Weak<T> {
    /// The empty handle, as from [`Weak::new`].
    fn default() -> Self {
        Weak::new()
    }
}

impl<T: ?Sized> Debug for Weak<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("(Weak)")
    }
}
