use std::{ops::Deref, rc::Rc};

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use shrc::{Shrc, Weak};

//cargo install cargo-criterion
//cargo criterion

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("New Shrc", |b| b.iter(new_shrc));
    c.bench_function("New Rc", |b| b.iter(new_rc));
    c.bench_function("From box Shrc", |b| b.iter(from_box_shrc));
    c.bench_function("Clone Shrc", |b| b.iter(clone_shrc));
    c.bench_function("Clone Rc", |b| b.iter(clone_rc));
    c.bench_function("Multiple clone Shrc", |b| b.iter(multi_clone_shrc));
    c.bench_function("Multiple clone Rc", |b| b.iter(multi_clone_rc));
    c.bench_function("Deref Shrc", |b| b.iter(deref_shrc));
    c.bench_function("Deref Rc", |b| b.iter(deref_rc));
    c.bench_function("Downgrade+upgrade Shrc", |b| b.iter(round_trip_weak_shrc));
    c.bench_function("Downgrade+upgrade Rc", |b| b.iter(round_trip_weak_rc));
    c.bench_function("Project Shrc", |b| b.iter(project_shrc));
}

fn new_shrc() {
    let _ = black_box(Shrc::new(100));
}

fn new_rc() {
    let _ = black_box(Rc::new(100));
}

fn from_box_shrc() {
    let _ = black_box(Shrc::from_box(Box::new(100)));
}

fn clone_shrc() {
    let handle = Shrc::new(100);
    let _ = black_box(handle.clone());
}

fn clone_rc() {
    let rc = Rc::new(100);
    let _ = black_box(Rc::clone(&rc));
}

fn multi_clone_shrc() {
    let handle = Shrc::new(100);
    for _ in 0..100 {
        let _ = black_box(handle.clone());
    }
}

fn multi_clone_rc() {
    let rc = Rc::new(100);
    for _ in 0..100 {
        let _ = black_box(Rc::clone(&rc));
    }
}

fn deref_shrc() {
    let handle = Shrc::new(100);
    let _ = black_box(handle.deref());
}

fn deref_rc() {
    let rc = Rc::new(100);
    let _ = black_box(rc.deref());
}

fn round_trip_weak_shrc() {
    let handle = Shrc::new(100);
    let weak = Shrc::downgrade(&handle);
    let _ = black_box(Weak::upgrade(&weak));
}

fn round_trip_weak_rc() {
    let rc = Rc::new(100);
    let weak = Rc::downgrade(&rc);
    let _ = black_box(weak.upgrade());
}

fn project_shrc() {
    let pair = Shrc::new((1u64, 2u64));
    let _ = black_box(Shrc::project(&pair, |p| &p.1));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
