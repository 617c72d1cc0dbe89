use std::sync::Mutex;

use serial_test::serial;

use slotpool::SlotPool;
use slotpool_test::LockStepBuilder;

//
//  Tests
//

#[serial]
#[test]
fn concurrent_same_class() {
    //  Test that slots of a single class are never handed out twice, when allocated and freed concurrently.
    //
    //  Each iteration:
    //
    //  1.  Every thread allocates a batch of slots, and stamps them.
    //  2.  Every thread checks its stamps, then frees its batch.

    const BATCH: usize = 64;
    const SIZE: usize = 24;

    let number_iterations = number_iterations();
    let number_threads = number_threads();

    let pool = SlotPool::new().expect("Valid configuration");
    let locals: Vec<_> = (0..number_threads).map(Local::new).collect();

    let mut builder = LockStepBuilder::new(Global::new(pool, number_threads), locals);

    builder.add_step(|| |global: &Global, local: &mut Local| {
        for index in 0..BATCH {
            let stamp = local.stamp(index);
            let pointer = global.pool.alloc(SIZE);

            assert!(!pointer.is_null());

            unsafe { write_stamp(pointer, SIZE, stamp) };

            local.held.push((pointer as usize, SIZE, stamp));
        }
    });

    builder.add_step(|| |global: &Global, local: &mut Local| {
        for (address, size, stamp) in local.held.drain(..) {
            let pointer = address as *mut u8;

            unsafe {
                check_stamp(pointer, size, stamp);
                global.pool.free(pointer, size);
            }
        }

        local.iteration += 1;
    });

    let run = builder.launch(number_iterations);
    run.join();

    //  Slots are only carved when the free list is empty, hence never more than the peak in use.
    let slots_per_block = 4096 / SIZE - 2;
    let peak = number_threads * BATCH;
    let blocks = run.global().pool.statistics()[SIZE / 8 - 1].blocks;

    assert!(blocks <= (peak + slots_per_block - 1) / slots_per_block, "{} blocks for {} slots", blocks, peak);
}

#[serial]
#[test]
fn cross_thread_free() {
    //  Test that slots allocated on one thread can be freed on another, concurrently with allocations.
    //
    //  Each iteration:
    //
    //  1.  Every thread allocates a batch of slots of various sizes, stamps them, and hands them to its neighbour.
    //  2.  Every thread checks the stamps of the batch it received, then frees it.

    const BATCH: usize = 128;

    let number_iterations = number_iterations();
    let number_threads = number_threads();

    let pool = SlotPool::new().expect("Valid configuration");
    let locals: Vec<_> = (0..number_threads).map(Local::new).collect();

    let mut builder = LockStepBuilder::new(Global::new(pool, number_threads), locals);

    builder.add_step(|| |global: &Global, local: &mut Local| {
        let mut batch = Vec::with_capacity(BATCH);

        for index in 0..BATCH {
            let size = local.next_size();
            let stamp = local.stamp(index);
            let pointer = global.pool.alloc(size);

            assert!(!pointer.is_null());

            unsafe { write_stamp(pointer, size, stamp) };

            batch.push((pointer as usize, size, stamp));
        }

        let neighbour = (local.thread + 1) % global.ring.len();
        global.ring[neighbour].lock().unwrap().extend(batch);
    });

    builder.add_step(|| |global: &Global, local: &mut Local| {
        let received = std::mem::take(&mut *global.ring[local.thread].lock().unwrap());

        assert_eq!(BATCH, received.len());

        for (address, size, stamp) in received {
            let pointer = address as *mut u8;

            unsafe {
                check_stamp(pointer, size, stamp);
                global.pool.free(pointer, size);
            }
        }

        local.iteration += 1;
    });

    let run = builder.launch(number_iterations);
    run.join();

    assert!(run.global().ring.iter().all(|batch| batch.lock().unwrap().is_empty()));
}

#[serial]
#[test]
fn randomized_interleaving() {
    //  Test that randomly interleaved allocations and frees, of random sizes, never share storage.

    const OPERATIONS: usize = 1_000;

    let number_iterations = number_iterations();
    let number_threads = number_threads();

    let pool = SlotPool::new().expect("Valid configuration");
    let locals: Vec<_> = (0..number_threads).map(Local::new).collect();

    let mut builder = LockStepBuilder::new(Global::new(pool, number_threads), locals);

    builder.add_step(|| |global: &Global, local: &mut Local| {
        for index in 0..OPERATIONS {
            let roll = local.next_random();

            if roll % 3 != 0 || local.held.is_empty() {
                let size = local.next_size();
                let stamp = local.stamp(index);
                let pointer = global.pool.alloc(size);

                assert!(!pointer.is_null());

                unsafe { write_stamp(pointer, size, stamp) };

                local.held.push((pointer as usize, size, stamp));
            } else {
                let victim = (roll as usize / 3) % local.held.len();
                let (address, size, stamp) = local.held.swap_remove(victim);
                let pointer = address as *mut u8;

                unsafe {
                    check_stamp(pointer, size, stamp);
                    global.pool.free(pointer, size);
                }
            }
        }

        for (address, size, stamp) in local.held.drain(..) {
            let pointer = address as *mut u8;

            unsafe {
                check_stamp(pointer, size, stamp);
                global.pool.free(pointer, size);
            }
        }

        local.iteration += 1;
    });

    let run = builder.launch(number_iterations);
    run.join();

    assert!(run.locals_with(|local| local.held.is_empty()).into_iter().all(|empty| empty));
}

#[test]
fn stamps_are_distinct() {
    let mut local = Local::new(3);
    let mut stamps = std::collections::BTreeSet::new();

    for iteration in 0..4 {
        local.iteration = iteration;

        for index in 0..1_000 {
            assert!(stamps.insert(local.stamp(index)), "iteration {}, index {}", iteration, index);
        }
    }

    let other = Local::new(4);
    assert!(!stamps.contains(&other.stamp(0)));
}

//
//  Implementation Details
//

struct Global {
    pool: SlotPool,
    ring: Vec<Mutex<Vec<(usize, usize, usize)>>>,
}

impl Global {
    fn new(pool: SlotPool, number_threads: usize) -> Self {
        let ring = (0..number_threads).map(|_| Mutex::new(vec!())).collect();

        Self { pool, ring }
    }
}

//  Pointers are held as addresses, to be sendable.
struct Local {
    thread: usize,
    iteration: usize,
    random: u64,
    held: Vec<(usize, usize, usize)>,
}

impl Local {
    fn new(thread: usize) -> Self {
        let random = 0x9E37_79B9_7F4A_7C15 ^ (thread as u64 + 1);

        Self { thread, iteration: 0, random, held: vec!() }
    }

    //  Unique across threads, iterations, and indexes within an iteration, on 32-bits and 64-bits platforms alike.
    fn stamp(&self, index: usize) -> usize {
        const BITS: u32 = usize::BITS;

        (self.thread << (BITS * 3 / 4)) ^ (self.iteration << (BITS / 4)) ^ index
    }

    //  Mostly pooled sizes, with the occasional oversized one; always a multiple of the word size.
    fn next_size(&mut self) -> usize {
        let words = (self.next_random() % 72) as usize + 1;
        words * std::mem::size_of::<usize>()
    }

    //  xorshift64
    fn next_random(&mut self) -> u64 {
        let mut x = self.random;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.random = x;
        x
    }
}

//  Writes `stamp` in every word of the `size` bytes at `pointer`.
unsafe fn write_stamp(pointer: *mut u8, size: usize, stamp: usize) {
    let words = pointer as *mut usize;

    for i in 0..(size / std::mem::size_of::<usize>()) {
        std::ptr::write(words.add(i), stamp);
    }
}

//  Checks that every word of the `size` bytes at `pointer` still holds `stamp`.
unsafe fn check_stamp(pointer: *mut u8, size: usize, stamp: usize) {
    let words = pointer as *const usize;

    for i in 0..(size / std::mem::size_of::<usize>()) {
        assert_eq!(stamp, std::ptr::read(words.add(i)), "word {} of {} bytes at {:?}", i, size, pointer);
    }
}

fn number_iterations() -> usize { read_number_from_environment("SLOTPOOL_MULTI_NUMBER_ITERATIONS", 100) }

fn number_threads() -> usize {
    read_number_from_environment("SLOTPOOL_MULTI_NUMBER_THREADS", num_cpus::get()).max(2)
}

fn read_number_from_environment(name: &str, default: usize) -> usize {
    if let Some(result) = std::env::var(name).ok().and_then(|value| value.parse().ok()) {
        println!("read_number_from_environment - {}: {}", name, result);
        return result;
    }

    println!("read_number_from_environment - {}: {} (default)", name, default);
    default
}
