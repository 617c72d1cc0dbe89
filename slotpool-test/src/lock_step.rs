//! A test-runner for detecting data-races and race-conditions.

use std::{
    cell::RefCell,
    hint,
    sync::{Arc, atomic::{AtomicBool, AtomicUsize, Ordering}},
    thread::{self, JoinHandle},
};

/// LockStep runs user-specified steps _in lockstep_ across multiple threads of execution.
///
/// LockStep allows the user to:
///
/// -   Register a Global state, shared across all threads.
/// -   Register N instances of a Local state, each dedicated to a single thread.
/// -   Register S steps, which will run on each thread, in lock-step with other threads.
///
/// All threads spin on a barrier before each step, so that a given step starts as simultaneously as possible on each
/// thread, maximizing contention.
///
/// Constructing a `LockStep` is done through a `LockStepBuilder`.
pub struct LockStep<Global, Local> {
    global: Arc<Global>,
    threads: RefCell<Vec<JoinHandle<Local>>>,
    results: RefCell<Vec<Local>>,
}

impl<Global, Local> LockStep<Global, Local> {
    /// Joins the threads, and collects their results.
    ///
    /// #   Panics
    ///
    /// -   If any of the threads being joined panicked.
    pub fn join(&self) {
        let threads = self.threads.replace(vec!());

        if threads.is_empty() {
            return;
        }

        //  Join _all_ threads first, so that none is left running if one panicked.
        let outcomes: Vec<_> = threads.into_iter().map(JoinHandle::join).collect();

        let results = outcomes.into_iter()
            .map(|outcome| outcome.unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect();

        self.results.replace(results);
    }

    /// Returns a reference to the Global state.
    ///
    /// #   Warning
    ///
    /// Access is provided _without_ joining the threads first.
    pub fn global(&self) -> &Global { &self.global }

    /// Returns a clone of the Local states, in the order they were registered.
    ///
    /// Calls `self.join()` to collect them first, if not already done.
    pub fn locals(&self) -> Vec<Local>
        where
            Local: Clone,
    {
        self.locals_with(Local::clone)
    }

    /// Returns the result of applying `fun` to each of the Local states, in the order they were registered.
    ///
    /// Calls `self.join()` to collect them first, if not already done.
    pub fn locals_with<R, F>(&self, fun: F) -> Vec<R>
        where
            F: FnMut(&Local) -> R,
    {
        self.join();

        self.results.borrow().iter().map(fun).collect()
    }
}

impl<Global, Local> Drop for LockStep<Global, Local> {
    fn drop(&mut self) {
        //  Avoid a double panic, which would abort.
        if thread::panicking() {
            return;
        }

        self.join();
    }
}

/// LockStepBuilder, a builder for a `LockStep` instance.
///
/// #   Example
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use slotpool_test::LockStepBuilder;
///
/// let mut builder = LockStepBuilder::new(AtomicUsize::new(0), vec!(1, 10));
///
/// builder.add_step(|| |global: &AtomicUsize, local: &mut usize| { global.fetch_add(*local, Ordering::Relaxed); });
///
/// let run = builder.launch(4);
/// run.join();
///
/// assert_eq!(44, run.global().load(Ordering::Relaxed));
/// assert_eq!(vec!(1, 10), run.locals());
/// ```
pub struct LockStepBuilder<Global, Local> {
    global: Arc<Global>,
    locals: Vec<Local>,
    series: Vec<Vec<Step<Global, Local>>>,
}

impl<Global, Local> LockStepBuilder<Global, Local>
    where
        Global: Send + Sync + 'static,
        Local: Send + 'static,
{
    /// Creates a new instance of LockStepBuilder, with one thread per instance of `Local`.
    ///
    /// #   Panics
    ///
    /// -   If `locals` is empty.
    pub fn new(global: Global, locals: Vec<Local>) -> Self {
        assert!(!locals.is_empty(), "Cannot run in lock-step without a single thread");

        let global = Arc::new(global);
        let series = locals.iter().map(|_| vec!()).collect();

        Self { global, locals, series, }
    }

    /// Adds a step on each thread.
    ///
    /// The step is created by invoking `factory` for each thread.
    pub fn add_step<Factory, S>(&mut self, mut factory: Factory)
        where
            Factory: FnMut() -> S,
            S: FnMut(&Global, &mut Local) + Send + 'static,
    {
        self.add_prepared_step(move || {
            let mut step = factory();
            (|_: &Global, _: &mut Local| (), move |global: &Global, local: &mut Local, _: ()| step(global, local))
        });
    }

    /// Adds a step on each thread, split in two, both created by invoking `factory` for each thread:
    ///
    /// -   A preparatory step Prep, returning R, run before the barrier.
    /// -   The actual step S, run after the barrier.
    ///
    /// The preparatory step is ideal for expensive set-up work, which would otherwise delay the start of the step on
    /// some threads.
    pub fn add_prepared_step<Factory, Prep, R, S>(&mut self, mut factory: Factory)
        where
            Factory: FnMut() -> (Prep, S),
            Prep: FnMut(&Global, &mut Local) -> R + Send + 'static,
            S: FnMut(&Global, &mut Local, R) + Send + 'static,
    {
        for serie in &mut self.series {
            let (mut prep, mut step) = factory();

            serie.push(Box::new(move |global: &Global, local: &mut Local, barrier: &SpinBarrier| {
                let prepared = prep(global, local);

                barrier.wait();

                step(global, local, prepared);
            }));
        }
    }

    /// Creates the LockStep instance, which will run each serie of steps `iterations` times.
    ///
    /// The threads start immediately.
    ///
    /// #   Panics
    ///
    /// -   If no step was added.
    pub fn launch(self, iterations: usize) -> LockStep<Global, Local> {
        assert!(!self.series[0].is_empty(), "Cannot run in lock-step without a single step");

        let barrier = Arc::new(SpinBarrier::new(self.locals.len()));

        let Self { global: shared, locals, series } = self;

        let threads = locals.into_iter()
            .zip(series.into_iter())
            .map(|(mut local, mut serie)| {
                let global = shared.clone();
                let barrier = barrier.clone();

                thread::spawn(move || {
                    let guard = PoisonGuard(&*barrier);

                    for _ in 0..iterations {
                        for step in &mut serie {
                            step(&*global, &mut local, &*barrier);
                        }
                    }

                    guard.dismiss();

                    local
                })
            })
            .collect();

        LockStep { global: shared, threads: RefCell::new(threads), results: RefCell::new(vec!()) }
    }
}

//
//  Implementation details
//

type Step<Global, Local> = Box<dyn FnMut(&Global, &mut Local, &SpinBarrier) + Send + 'static>;

//  A reusable barrier, spinning rather than parking, so that all threads leave it at about the same time.
//
//  The last thread to arrive resets the count, then bumps the generation, releasing the others.
struct SpinBarrier {
    threads: usize,
    arrived: AtomicUsize,
    generation: AtomicUsize,
    poisoned: AtomicBool,
}

impl SpinBarrier {
    fn new(threads: usize) -> Self {
        Self {
            threads,
            arrived: AtomicUsize::new(0),
            generation: AtomicUsize::new(0),
            poisoned: AtomicBool::new(false),
        }
    }

    fn wait(&self) {
        let generation = self.generation.load(Ordering::Acquire);

        if self.arrived.fetch_add(1, Ordering::AcqRel) + 1 == self.threads {
            self.arrived.store(0, Ordering::Relaxed);
            self.generation.fetch_add(1, Ordering::Release);
            return;
        }

        while self.generation.load(Ordering::Acquire) == generation {
            if self.poisoned.load(Ordering::Relaxed) {
                abandon_ship();
            }

            hint::spin_loop();
        }
    }

    fn poison(&self) { self.poisoned.store(true, Ordering::Relaxed); }
}

//  If a single thread panics, then all threads waiting on the barrier must bail out too.
struct PoisonGuard<'a>(&'a SpinBarrier);

impl<'a> PoisonGuard<'a> {
    fn dismiss(self) { std::mem::forget(self) }
}

impl<'a> Drop for PoisonGuard<'a> {
    fn drop(&mut self) { self.0.poison(); }
}

#[cold]
#[inline(never)]
fn abandon_ship() -> ! {
    panic!("Another thread panicked, abandoning ship!");
}

// mod tests
