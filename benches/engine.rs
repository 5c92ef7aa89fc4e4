#![feature(test)]
extern crate fitalloc;
extern crate test;
#[macro_use]
extern crate trackable;

use fitalloc::engine::AllocatorEngine;
use fitalloc::request::RequestId;
use fitalloc::simulation::run_simulation;
use fitalloc::strategy::Strategy;
use test::Bencher;

fn id(id: usize) -> RequestId {
    RequestId::new(format!("req-{}", id))
}

fn block_sizes(n: u32) -> Vec<u32> {
    (0..n).map(|i| 64 + (i * 37) % 512).collect()
}

fn allocate_and_release(b: &mut Bencher, strategy: Strategy) {
    let mut engine = track_try_unwrap!(AllocatorEngine::new(&block_sizes(1024)));
    let mut i = 0;
    b.iter(|| {
        let id = id(i);
        let placement = track_try_unwrap!(engine.allocate_with(id.clone(), 32, strategy));
        if placement.is_placed() {
            track_try_unwrap!(engine.deallocate(&id));
        }
        i += 1;
    });
}

#[bench]
fn first_fit_allocate_and_release(b: &mut Bencher) {
    allocate_and_release(b, Strategy::FirstFit);
}

#[bench]
fn best_fit_allocate_and_release(b: &mut Bencher) {
    allocate_and_release(b, Strategy::BestFit);
}

#[bench]
fn worst_fit_allocate_and_release(b: &mut Bencher) {
    allocate_and_release(b, Strategy::WorstFit);
}

#[bench]
fn best_fit_simulation(b: &mut Bencher) {
    let blocks = block_sizes(256);
    let requests = (0..512).map(|i| 1 + (i * 13) % 200).collect::<Vec<u32>>();
    b.iter(|| track_try_unwrap!(run_simulation(&blocks, &requests, Strategy::BestFit)));
}
