use std::{ops::Deref, rc::Rc, time::Instant};

use shrc::Shrc;

fn time_clone_shrc(n: f64) -> f64 {
    let handle = Shrc::new(100);

    let start = Instant::now();
    for _ in 0..(n as u64) {
        std::hint::black_box(handle.clone());
    }
    let end = Instant::now();
    (end - start).as_nanos() as f64 / n
}

fn time_clone_rc(n: f64) -> f64 {
    let rc = Rc::new(100);

    let start = Instant::now();
    for _ in 0..(n as u64) {
        std::hint::black_box(rc.clone());
    }
    let end = Instant::now();
    (end - start).as_nanos() as f64 / n
}

fn time_deref_shrc(n: f64) -> f64 {
    let handle = Shrc::new(100);

    let start = Instant::now();
    for _ in 0..(n as u64) {
        std::hint::black_box(handle.deref());
    }
    let end = Instant::now();
    (end - start).as_nanos() as f64 / n
}

fn time_deref_rc(n: f64) -> f64 {
    let rc = Rc::new(100);

    let start = Instant::now();
    for _ in 0..(n as u64) {
        std::hint::black_box(rc.deref());
    }
    let end = Instant::now();
    (end - start).as_nanos() as f64 / n
}

fn time_upgrade_shrc(n: f64) -> f64 {
    let handle = Shrc::new(100);
    let weak = Shrc::downgrade(&handle);

    let start = Instant::now();
    for _ in 0..(n as u64) {
        std::hint::black_box(shrc::Weak::upgrade(&weak));
    }
    let end = Instant::now();
    (end - start).as_nanos() as f64 / n
}

fn time_upgrade_rc(n: f64) -> f64 {
    let rc = Rc::new(100);
    let weak = Rc::downgrade(&rc);

    let start = Instant::now();
    for _ in 0..(n as u64) {
        std::hint::black_box(weak.upgrade());
    }
    let end = Instant::now();
    (end - start).as_nanos() as f64 / n
}

fn main() {
    let n = 10e6;

    println!("Clone test Shrc ({}x): {}ns avg", n, time_clone_shrc(n));
    println!("Clone test Rc ({}x): {}ns avg", n, time_clone_rc(n));

    println!("Deref test Shrc ({}x): {}ns avg", n, time_deref_shrc(n));
    println!("Deref test Rc ({}x): {}ns avg", n, time_deref_rc(n));

    println!("Upgrade test Shrc ({}x): {}ns avg", n, time_upgrade_shrc(n));
    println!("Upgrade test Rc ({}x): {}ns avg", n, time_upgrade_rc(n));
}
