//! Top-level entry point wiring engine, transfer client and binding manager.

use std::rc::Rc;

use crate::binding::BindingManager;
use crate::config::Config;
use crate::engine::{Spawn, UploadEngine};
use crate::host::{HostPage, Notifier};
use crate::transfer::{HttpTransfer, Transfer};

/// One composition session's uploader.
///
/// Construct once per page, `start` it, and `stop` it when the host navigates
/// away. Dropping it has the same effect as `stop`.
pub struct Uploader<H: HostPage + 'static> {
    bindings: Rc<BindingManager<H>>,
}

impl<H: HostPage + 'static> Uploader<H> {
    /// Uploader that sends files to the configured HTTP endpoint.
    pub fn new(host: Rc<H>, config: Config, spawner: Rc<dyn Spawn>) -> Self {
        let config = Rc::new(config);
        let transfer = Rc::new(HttpTransfer::new(config.clone()));
        Self::with_transfer(host, config, transfer, spawner)
    }

    pub fn with_transfer(
        host: Rc<H>,
        config: Rc<Config>,
        transfer: Rc<dyn Transfer>,
        spawner: Rc<dyn Spawn>,
    ) -> Self {
        let notifier: Rc<dyn Notifier> = host.clone();
        let engine = UploadEngine::new(config, transfer, spawner, notifier);
        Self {
            bindings: BindingManager::new(host, engine),
        }
    }

    pub fn start(&self) {
        tracing::debug!(endpoint = %self.engine().config().endpoint, "uploader starting");
        self.bindings.start();
    }

    pub fn stop(&self) {
        self.bindings.stop();
    }

    pub fn engine(&self) -> &Rc<UploadEngine> {
        self.bindings.engine()
    }

    pub fn bindings(&self) -> &Rc<BindingManager<H>> {
        &self.bindings
    }
}

impl<H: HostPage + 'static> Drop for Uploader<H> {
    fn drop(&mut self) {
        self.bindings.stop();
    }
}
