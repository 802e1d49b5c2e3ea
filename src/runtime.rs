//! Task spawning for fetches
//!
//! Natively fetches run on a tokio runtime handle; in the browser they run
//! on the JS event loop via `spawn_local`.

use std::future::Future;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Debug)]
pub struct Spawner {
    handle: tokio::runtime::Handle,
}

#[cfg(not(target_arch = "wasm32"))]
impl Spawner {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Spawner for the runtime the caller is running on, if any
    pub fn current() -> Option<Self> {
        tokio::runtime::Handle::try_current().ok().map(Self::new)
    }

    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(task);
    }
}

#[cfg(target_arch = "wasm32")]
#[derive(Clone, Debug, Default)]
pub struct Spawner;

#[cfg(target_arch = "wasm32")]
impl Spawner {
    pub fn current() -> Option<Self> {
        Some(Self)
    }

    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + 'static,
    {
        wasm_bindgen_futures::spawn_local(task);
    }
}
