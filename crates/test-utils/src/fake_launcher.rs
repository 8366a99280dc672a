use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use tokio::sync::Notify;

use remotest::exec::{LaunchSpec, ProcessLauncher, RunnerProcess};

type LaunchHook = Arc<dyn Fn(usize) + Send + Sync>;

/// A fake launcher whose "processes" run until told to exit or killed.
///
/// Clones share their counters, so a test can keep one clone and hand the
/// other to the supervisor.
#[derive(Clone, Default)]
pub struct FakeLauncher {
    shared: Arc<Shared>,
    on_launch: Option<LaunchHook>,
}

#[derive(Default)]
struct Shared {
    launches: AtomicUsize,
    kills: AtomicUsize,
    fail_launch: AtomicBool,
    specs: Mutex<Vec<LaunchSpec>>,
    processes: Mutex<Vec<Arc<AtomicBool>>>,
    exited: Notify,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call `hook` with the launch number (starting at 1) on every launch.
    pub fn on_launch(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_launch = Some(Arc::new(hook));
        self
    }

    /// Make every following launch fail.
    pub fn fail_launches(&self, fail: bool) {
        self.shared.fail_launch.store(fail, Ordering::SeqCst);
    }

    pub fn launches(&self) -> usize {
        self.shared.launches.load(Ordering::SeqCst)
    }

    pub fn kills(&self) -> usize {
        self.shared.kills.load(Ordering::SeqCst)
    }

    pub fn specs(&self) -> Vec<LaunchSpec> {
        self.shared.specs.lock().unwrap().clone()
    }

    /// Make the most recently launched process exit on its own.
    pub fn exit_current(&self) {
        if let Some(flag) = self.shared.processes.lock().unwrap().last() {
            flag.store(true, Ordering::SeqCst);
        }
        self.shared.exited.notify_waiters();
    }
}

impl ProcessLauncher for FakeLauncher {
    fn launch(&mut self, spec: &LaunchSpec) -> anyhow::Result<Box<dyn RunnerProcess>> {
        if self.shared.fail_launch.load(Ordering::SeqCst) {
            return Err(anyhow!("no such file or directory: {}", spec.exe));
        }

        let n = self.shared.launches.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.specs.lock().unwrap().push(spec.clone());

        let exited = Arc::new(AtomicBool::new(false));
        self.shared.processes.lock().unwrap().push(Arc::clone(&exited));

        if let Some(hook) = &self.on_launch {
            hook(n);
        }

        Ok(Box::new(FakeProcess {
            id: n as u32,
            exited,
            shared: Arc::clone(&self.shared),
        }))
    }
}

struct FakeProcess {
    id: u32,
    exited: Arc<AtomicBool>,
    shared: Arc<Shared>,
}

impl RunnerProcess for FakeProcess {
    fn id(&self) -> Option<u32> {
        Some(self.id)
    }

    fn wait(&mut self) -> Pin<Box<dyn Future<Output = io::Result<Option<i32>>> + Send + '_>> {
        Box::pin(async move {
            loop {
                let notified = self.shared.exited.notified();
                if self.exited.load(Ordering::SeqCst) {
                    return Ok(Some(0));
                }
                notified.await;
            }
        })
    }

    fn kill(&mut self) -> Pin<Box<dyn Future<Output = io::Result<()>> + Send + '_>> {
        Box::pin(async move {
            if !self.exited.swap(true, Ordering::SeqCst) {
                self.shared.kills.fetch_add(1, Ordering::SeqCst);
            }
            self.shared.exited.notify_waiters();
            Ok(())
        })
    }
}
