use std::cell::{Cell, RefCell};

use crate::block;
use crate::{AllocError, Shrc, Weak};

/// Increments the referenced counter when dropped.
struct DropTally<'a>(&'a Cell<usize>);

impl Drop for DropTally<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn strong_count_tracks_live_handles() {
    let a = Shrc::new(String::from("counted"));
    assert_eq!(Shrc::strong_count(&a), 1);

    let b = a.clone();
    let c = b.clone();
    assert_eq!(Shrc::strong_count(&a), 3);
    assert_eq!(Shrc::strong_count(&c), 3);

    drop(b);
    assert_eq!(Shrc::strong_count(&a), 2);
    drop(c);
    assert_eq!(Shrc::strong_count(&a), 1);
}

#[test]
fn last_handle_destroys_exactly_once() {
    let drops = Cell::new(0);
    let a = Shrc::new(DropTally(&drops));
    let b = a.clone();

    drop(a);
    assert_eq!(drops.get(), 0);
    drop(b);
    assert_eq!(drops.get(), 1);
}

#[test]
fn weak_handles_never_delay_destruction() {
    let drops = Cell::new(0);
    let strong = Shrc::new(DropTally(&drops));

    let weaks: Vec<Weak<DropTally>> = (0..8).map(|_| Shrc::downgrade(&strong)).collect();
    assert_eq!(Shrc::weak_count(&strong), 8);

    drop(strong);
    assert_eq!(drops.get(), 1);
    for w in &weaks {
        assert!(!Weak::is_alive(w));
        assert!(Weak::upgrade(w).is_none());
    }
}

#[test]
fn upgrade_succeeds_only_while_alive() {
    let strong = Shrc::new(1);
    let weak = Shrc::downgrade(&strong);

    let second = Weak::upgrade(&weak).expect("object is alive");
    assert_eq!(Shrc::strong_count(&strong), 2);

    drop(strong);
    // `second` alone keeps the object alive.
    assert_eq!(*second, 1);
    assert!(Weak::is_alive(&weak));

    drop(second);
    assert!(Weak::upgrade(&weak).is_none());
}

#[test]
fn block_freed_after_both_counts_zero_either_order() {
    let before = block::live_blocks();

    // Strong count reaches zero first. The weak count is independent of the
    // strong count (no implicit weak held by strong handles), so the block
    // survives on the weak reference alone.
    let strong = Shrc::new(5);
    let weak = Shrc::downgrade(&strong);
    assert_eq!(block::live_blocks(), before + 1);
    drop(strong);
    assert_eq!(block::live_blocks(), before + 1);
    drop(weak);
    assert_eq!(block::live_blocks(), before);

    // Weak count reaches zero first.
    let strong = Shrc::new(5);
    let weak = Shrc::downgrade(&strong);
    drop(weak);
    assert_eq!(block::live_blocks(), before + 1);
    drop(strong);
    assert_eq!(block::live_blocks(), before);
}

#[test]
fn projection_keeps_aggregate_alive() {
    struct Aggregate<'a> {
        label: String,
        tally: DropTally<'a>,
    }

    let drops = Cell::new(0);
    let whole = Shrc::new(Aggregate {
        label: String::from("sub-object"),
        tally: DropTally(&drops),
    });

    let label = Shrc::project(&whole, |a| &a.label);
    assert_eq!(Shrc::as_ptr(&label), &whole.label as *const String);
    assert_eq!(Shrc::strong_count(&whole), 2);
    assert_eq!(Shrc::strong_count(&label), 2);

    drop(whole);
    assert_eq!(drops.get(), 0);
    assert_eq!(&*label, "sub-object");

    drop(label);
    assert_eq!(drops.get(), 1);
}

#[test]
fn value_holding_last_weak_to_itself() {
    struct SelfRef {
        this: RefCell<Option<Weak<SelfRef>>>,
    }

    let before = block::live_blocks();
    let strong = Shrc::new(SelfRef {
        this: RefCell::new(None),
    });
    *strong.this.borrow_mut() = Some(Shrc::downgrade(&strong));
    assert_eq!(Shrc::weak_count(&strong), 1);

    // Dropping the value releases the only weak handle to its own block
    // while the destroy step is still running; the block must survive the
    // nested release and still be freed exactly once.
    drop(strong);
    assert_eq!(block::live_blocks(), before);
}

#[test]
fn cyclic_strong_and_weak_pair() {
    struct Node {
        parent: RefCell<Option<Weak<Node>>>,
    }

    let before = block::live_blocks();
    let parent = Shrc::new(Node {
        parent: RefCell::new(None),
    });
    let child = Shrc::new(Node {
        parent: RefCell::new(Some(Shrc::downgrade(&parent))),
    });

    drop(parent);
    assert!(child.parent.borrow().as_ref().map(Weak::upgrade).flatten().is_none());
    drop(child);
    assert_eq!(block::live_blocks(), before);
}

#[test]
fn factory_failure_releases_block_storage() {
    let before = block::live_blocks();
    let res: Result<Shrc<String>, &str> = Shrc::try_new_with(|| Err("init failed"));
    assert_eq!(res.unwrap_err(), "init failed");
    assert_eq!(block::live_blocks(), before);

    let ok: Result<Shrc<String>, &str> = Shrc::try_new_with(|| Ok(String::from("built")));
    assert_eq!(&*ok.unwrap(), "built");
    assert_eq!(block::live_blocks(), before);
}

#[test]
fn factory_panic_releases_block_storage() {
    let before = block::live_blocks();
    let unwound = std::panic::catch_unwind(|| {
        let _: Result<Shrc<String>, ()> = Shrc::try_new_with(|| panic!("init panicked"));
    });
    assert!(unwound.is_err());
    assert_eq!(block::live_blocks(), before);
}

#[test]
fn deleter_runs_when_block_allocation_fails() {
    let calls = Cell::new(0);
    let ptr = Box::into_raw(Box::new(9));

    block::fail_next_alloc();
    let res = unsafe {
        Shrc::try_from_raw_with(ptr, |p: *mut i32| {
            assert_eq!(p, ptr);
            calls.set(calls.get() + 1);
            drop(unsafe { Box::from_raw(p) });
        })
    };

    assert_eq!(res.unwrap_err(), AllocError);
    assert_eq!(calls.get(), 1);
}

#[test]
fn custom_deleter_invoked_once_with_original_pointer() {
    let calls = Cell::new(0);
    let ptr = Box::into_raw(Box::new(String::from("widget")));

    let handle = unsafe {
        Shrc::from_raw_with(ptr, |p: *mut String| {
            assert_eq!(p, ptr);
            calls.set(calls.get() + 1);
            drop(unsafe { Box::from_raw(p) });
        })
    };
    let other = handle.clone();

    drop(handle);
    assert_eq!(calls.get(), 0);
    drop(other);
    assert_eq!(calls.get(), 1);
}

#[test]
fn make_shared_reset_scenario() {
    let mut h1 = Shrc::new(42);
    assert_eq!(Shrc::strong_count(&h1), 1);

    let mut h2 = h1.clone();
    assert_eq!(Shrc::strong_count(&h1), 2);
    assert_eq!(Shrc::strong_count(&h2), 2);
    assert_eq!(*h1, 42);

    let w = Shrc::downgrade(&h1);
    Shrc::reset(&mut h1);
    assert!(Shrc::is_empty(&h1));
    assert!(Weak::is_alive(&w));

    Shrc::reset(&mut h2);
    assert!(Weak::upgrade(&w).is_none());
}

#[test]
fn reset_raw_with_adopts_new_ownership() {
    let old_drops = Cell::new(0);
    let new_frees = Cell::new(0);

    let mut handle = Shrc::new(DropTally(&old_drops));
    let ptr = Box::into_raw(Box::new(DropTally(&new_frees)));
    unsafe {
        Shrc::reset_raw_with(&mut handle, ptr, |p: *mut DropTally| {
            drop(unsafe { Box::from_raw(p) });
        });
    }

    // The previous object is gone, the adopted one is not.
    assert_eq!(old_drops.get(), 1);
    assert_eq!(new_frees.get(), 0);
    assert_eq!(Shrc::strong_count(&handle), 1);

    drop(handle);
    assert_eq!(new_frees.get(), 1);
}

#[test]
fn empty_handle_observers() {
    let empty = Shrc::<i32>::empty();
    assert!(Shrc::is_empty(&empty));
    assert!(Shrc::as_ptr(&empty).is_null());
    assert_eq!(Shrc::get(&empty), None);
    assert_eq!(Shrc::strong_count(&empty), 0);
    assert_eq!(Shrc::weak_count(&empty), 0);

    // Cloning and downgrading an empty handle stays empty.
    assert!(Shrc::is_empty(&empty.clone()));
    let weak = Shrc::downgrade(&empty);
    assert!(!Weak::is_alive(&weak));
    assert!(Weak::upgrade(&weak).is_none());
    assert_eq!(Weak::strong_count(&weak), 0);

    let dead = Weak::<i32>::new();
    assert!(Weak::upgrade(&dead).is_none());
}

#[test]
fn equality_is_pointer_identity() {
    let a = Shrc::new(100);
    let b = a.clone();
    assert!(a == b);
    assert!(Shrc::ptr_eq(&a, &b));

    // Equal values in separate allocations are not equal handles.
    let c = Shrc::new(100);
    assert!(a != c);

    // Aliased handles to different sub-objects share a block but differ.
    let pair = Shrc::new((1u8, 2u8));
    let left = Shrc::project(&pair, |p| &p.0);
    let right = Shrc::project(&pair, |p| &p.1);
    assert!(!Shrc::ptr_eq(&left, &right));
    assert_eq!(Shrc::strong_count(&left), 3);

    assert!(Shrc::<i32>::empty() == Shrc::empty());
}

#[test]
fn swap_exchanges_contents() {
    let mut a = Shrc::new(1);
    let mut b = Shrc::new(2);
    Shrc::swap(&mut a, &mut b);
    assert_eq!(*a, 2);
    assert_eq!(*b, 1);
    assert_eq!(Shrc::strong_count(&a), 1);
    assert_eq!(Shrc::strong_count(&b), 1);
}

#[test]
fn unsized_payloads() {
    let slice: Shrc<[i32]> = Shrc::from_box(vec![1, 2, 3].into_boxed_slice());
    assert_eq!(&*slice, &[1, 2, 3]);

    let middle = Shrc::project(&slice, |s| &s[1]);
    assert_eq!(*middle, 2);
    drop(slice);
    assert_eq!(*middle, 2);

    let text: Shrc<str> = Shrc::from_box(String::from("unsized").into_boxed_str());
    assert_eq!(&*text, "unsized");
}

#[test]
fn from_impls() {
    let a: Shrc<i32> = 5.into();
    assert_eq!(*a, 5);

    let b: Shrc<i32> = Box::new(6).into();
    assert_eq!(*b, 6);

    let d: Shrc<i32> = Shrc::default();
    assert!(Shrc::is_empty(&d));
}

#[test]
fn weak_clone_manipulates_weak_count_only() {
    let strong = Shrc::new(1);
    let w1 = Shrc::downgrade(&strong);
    let w2 = w1.clone();
    assert_eq!(Shrc::strong_count(&strong), 1);
    assert_eq!(Shrc::weak_count(&strong), 2);
    assert!(Weak::ptr_eq(&w1, &w2));

    drop(w1);
    assert_eq!(Shrc::weak_count(&strong), 1);
    drop(w2);
    assert_eq!(Shrc::weak_count(&strong), 0);
}

#[test]
#[should_panic(expected = "dereferenced an empty Shrc")]
fn deref_of_empty_panics() {
    let empty = Shrc::<i32>::empty();
    let _ = *empty;
}

#[test]
#[should_panic(expected = "cannot project an empty Shrc")]
fn project_of_empty_panics() {
    let empty = Shrc::<(i32, i32)>::empty();
    let _ = Shrc::project(&empty, |p| &p.0);
}
