//! Control blocks: the shared metadata behind every [`Shrc`](crate::Shrc) and
//! [`Weak`](crate::Weak) handle.
//!
//! A block is one heap allocation that starts with a [`Header`] holding the
//! strong and weak counts plus two erased function pointers: one that destroys
//! the managed object and one that frees the block allocation itself. Handles
//! only ever see a `NonNull<Header>`, so they stay thin no matter which block
//! variant (and which deleter type) sits behind them.
//!
//! Two variants exist. [`RegularBlock`] wraps an externally allocated pointer
//! together with a by-value deleter. [`InplaceBlock`] embeds the value in the
//! block's own allocation, so the object and its metadata share a single
//! allocation.
//!
//! The counts are plain `Cell`s. Strong and weak are tracked independently:
//! the object dies when the strong count reaches zero, and the block is freed
//! once both counts are zero, in whichever order they get there.

use std::alloc::{alloc, Layout};
use std::cell::{Cell, UnsafeCell};
use std::mem::{ManuallyDrop, MaybeUninit};
use std::ptr::{self, NonNull};

use crate::shrc::{AllocError, Deleter};

pub(crate) const MAX_REFCOUNT: usize = isize::MAX as usize;

#[cfg(test)]
thread_local! {
    static LIVE_BLOCKS: Cell<usize> = const { Cell::new(0) };
    static FAIL_NEXT_ALLOC: Cell<bool> = const { Cell::new(false) };
}

/// Number of control blocks currently allocated on this thread.
#[cfg(test)]
pub(crate) fn live_blocks() -> usize {
    LIVE_BLOCKS.with(Cell::get)
}

/// Make the next control-block allocation on this thread report failure.
#[cfg(test)]
pub(crate) fn fail_next_alloc() {
    FAIL_NEXT_ALLOC.with(|f| f.set(true));
}

fn block_alloc(layout: Layout) -> *mut u8 {
    #[cfg(test)]
    if FAIL_NEXT_ALLOC.with(|f| f.replace(false)) {
        return ptr::null_mut();
    }
    unsafe { alloc(layout) }
}

/// The common prefix of every control block.
///
/// `destroy` tears down the managed object and is called exactly once, when
/// the strong count falls to zero. `dealloc` frees the whole block allocation
/// and is called exactly once, when both counts are zero. Both take the block
/// address as a `*mut Header`; each variant casts it back to its concrete
/// type, which is sound because the variants are `repr(C)` with the header
/// first.
#[repr(C)]
pub(crate) struct Header {
    strong: Cell<usize>,
    weak: Cell<usize>,
    destroy: unsafe fn(*mut Header),
    dealloc: unsafe fn(*mut Header),
}

impl Header {
    fn new(destroy: unsafe fn(*mut Header), dealloc: unsafe fn(*mut Header)) -> Self {
        #[cfg(test)]
        LIVE_BLOCKS.with(|c| c.set(c.get() + 1));
        Header {
            strong: Cell::new(0),
            weak: Cell::new(0),
            destroy,
            dealloc,
        }
    }

    pub(crate) fn add_strong(&self) {
        let n = self.strong.get() + 1;
        if n > MAX_REFCOUNT {
            panic!("Overflow of maximum strong reference count.");
        }
        self.strong.set(n);
    }

    fn remove_strong(&self) -> usize {
        let n = self.strong.get() - 1;
        self.strong.set(n);
        n
    }

    pub(crate) fn add_weak(&self) {
        let n = self.weak.get() + 1;
        if n > MAX_REFCOUNT {
            panic!("Overflow of maximum weak reference count.");
        }
        self.weak.set(n);
    }

    fn remove_weak(&self) -> usize {
        let n = self.weak.get() - 1;
        self.weak.set(n);
        n
    }

    pub(crate) fn strong_count(&self) -> usize {
        self.strong.get()
    }

    pub(crate) fn weak_count(&self) -> usize {
        self.weak.get()
    }
}

#[cfg(test)]
impl Drop for Header {
    fn drop(&mut self) {
        LIVE_BLOCKS.with(|c| c.set(c.get() - 1));
    }
}

/// Drop one strong reference to the block at `ctrl`.
///
/// Destroys the managed object on the 1 -> 0 transition and frees the block
/// if no weak references remain.
///
/// # Safety
/// The caller must own one strong reference and must not use `ctrl` after
/// this call.
pub(crate) unsafe fn release_strong(ctrl: NonNull<Header>) {
    let header = ctrl.as_ref();
    if header.remove_strong() != 0 {
        return;
    }
    // The value's own drop may release weak handles to this very block (a
    // value can hold the last `Weak` to itself). Hold a weak reference across
    // the destroy step so a nested `release_weak` cannot free the block under
    // us; releasing it afterwards performs the free check exactly once.
    header.add_weak();
    (header.destroy)(ctrl.as_ptr());
    release_weak(ctrl);
}

/// Drop one weak reference to the block at `ctrl`, freeing the block if it
/// was the last reference of either kind.
///
/// # Safety
/// The caller must own one weak reference and must not use `ctrl` after this
/// call.
pub(crate) unsafe fn release_weak(ctrl: NonNull<Header>) {
    let header = ctrl.as_ref();
    if header.remove_weak() == 0 && header.strong_count() == 0 {
        (header.dealloc)(ctrl.as_ptr());
    }
}

/// Control block for an externally allocated object.
///
/// Owns the raw pointer and the deleter that releases it. The pointer cell is
/// emptied when the deleter fires, so the deleter can never run twice.
#[repr(C)]
pub(crate) struct RegularBlock<T: ?Sized, D: Deleter<T>> {
    header: Header,
    ptr: Cell<Option<NonNull<T>>>,
    deleter: UnsafeCell<D>,
}

impl<T: ?Sized, D: Deleter<T>> RegularBlock<T, D> {
    /// Allocate a block taking ownership of `ptr`, with the strong count
    /// already at one.
    ///
    /// If the block allocation itself fails, the deleter is invoked on `ptr`
    /// before the error is returned, so the object is never leaked.
    ///
    /// # Safety
    /// `ptr` must be valid and uniquely owned, and releasing it with
    /// `deleter` must be sound.
    pub(crate) unsafe fn allocate(
        ptr: NonNull<T>,
        mut deleter: D,
    ) -> Result<NonNull<Header>, AllocError> {
        let raw = block_alloc(Layout::new::<Self>()) as *mut Self;
        if raw.is_null() {
            deleter.delete(ptr.as_ptr());
            return Err(AllocError);
        }
        ptr::write(
            raw,
            RegularBlock {
                header: Header::new(Self::destroy, Self::dealloc),
                ptr: Cell::new(Some(ptr)),
                deleter: UnsafeCell::new(deleter),
            },
        );
        let ctrl = NonNull::new_unchecked(raw as *mut Header);
        ctrl.as_ref().add_strong();
        Ok(ctrl)
    }

    unsafe fn destroy(header: *mut Header) {
        let block = &*(header as *mut Self);
        if let Some(ptr) = block.ptr.take() {
            (*block.deleter.get()).delete(ptr.as_ptr());
        }
    }

    unsafe fn dealloc(header: *mut Header) {
        drop(Box::from_raw(header as *mut Self));
    }
}

/// Control block with the managed object embedded in its own storage.
///
/// `destroy` drops the value in place; the memory it occupied is not released
/// until `dealloc` frees the block as a whole.
#[repr(C)]
pub(crate) struct InplaceBlock<T> {
    header: Header,
    value: UnsafeCell<ManuallyDrop<T>>,
}

impl<T> InplaceBlock<T> {
    /// Allocate a block with `value` constructed inside it and the strong
    /// count already at one. Returns the block and the pointer to the value.
    pub(crate) fn allocate(value: T) -> (NonNull<Header>, NonNull<T>) {
        let block = Box::new(InplaceBlock {
            header: Header::new(Self::destroy, Self::dealloc),
            value: UnsafeCell::new(ManuallyDrop::new(value)),
        });
        let raw = NonNull::from(Box::leak(block));
        unsafe { Self::finish(raw) }
    }

    /// Like [`allocate`](Self::allocate), but the value comes from a fallible
    /// initializer run after the block storage exists.
    ///
    /// If the initializer fails, the block storage is released without ever
    /// touching the value slot, and the initializer's error is returned. A
    /// panicking initializer likewise unwinds without leaking the block.
    pub(crate) fn try_allocate<E, F>(init: F) -> Result<(NonNull<Header>, NonNull<T>), E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        // The uninitialized block is dropped as-is on the error path;
        // `MaybeUninit` guarantees the untouched slot is not dropped as a `T`.
        let block: Box<InplaceBlock<MaybeUninit<T>>> = Box::new(InplaceBlock {
            header: Header::new(Self::destroy, Self::dealloc),
            value: UnsafeCell::new(ManuallyDrop::new(MaybeUninit::uninit())),
        });
        let value = init()?;
        let raw = NonNull::from(Box::leak(block));
        unsafe {
            (*raw.as_ref().value.get()).write(value);
            // MaybeUninit<T> and T share a layout, and the block is repr(C).
            Ok(Self::finish(raw.cast::<Self>()))
        }
    }

    unsafe fn finish(raw: NonNull<Self>) -> (NonNull<Header>, NonNull<T>) {
        let value = NonNull::new_unchecked(raw.as_ref().value.get() as *mut T);
        let ctrl = raw.cast::<Header>();
        ctrl.as_ref().add_strong();
        (ctrl, value)
    }

    unsafe fn destroy(header: *mut Header) {
        let block = &*(header as *mut Self);
        ManuallyDrop::drop(&mut *block.value.get());
    }

    unsafe fn dealloc(header: *mut Header) {
        drop(Box::from_raw(header as *mut Self));
    }
}
