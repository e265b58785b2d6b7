//! Shared harness: an uploader on the in-memory page, driven on a `LocalSet`.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use tack_core::memory::{MemoryFile, MemoryPage};
use tack_core::{
    Config, FileHandle, Transfer, TransferError, TransferResult, UploadEngine, Uploader, spawner,
};
use tokio::sync::oneshot;

type Reply = oneshot::Sender<Result<TransferResult, TransferError>>;

/// Transfers that finish only when the test says so.
#[derive(Default)]
pub struct ScriptedTransfer {
    waiting: RefCell<Vec<(String, Reply)>>,
}

impl ScriptedTransfer {
    pub fn in_flight(&self) -> usize {
        self.waiting.borrow().len()
    }

    /// Finish the transfer of `name` successfully at `url`.
    pub fn succeed(&self, name: &str, url: &str) {
        self.finish(
            name,
            Ok(TransferResult {
                url: url.to_owned(),
                filename: name.to_owned(),
            }),
        );
    }

    pub fn finish(&self, name: &str, result: Result<TransferResult, TransferError>) {
        let reply = {
            let mut waiting = self.waiting.borrow_mut();
            let index = waiting
                .iter()
                .position(|(pending, _)| pending == name)
                .unwrap_or_else(|| panic!("no transfer in flight for {name}"));
            waiting.remove(index).1
        };
        let _ = reply.send(result);
    }
}

impl Transfer for ScriptedTransfer {
    fn upload(
        &self,
        file: Rc<dyn FileHandle>,
    ) -> LocalBoxFuture<'static, Result<TransferResult, TransferError>> {
        let (tx, rx) = oneshot::channel();
        self.waiting.borrow_mut().push((file.name().to_owned(), tx));
        async move {
            rx.await
                .unwrap_or_else(|_| Err(TransferError::Read("transfer abandoned".into())))
        }
        .boxed_local()
    }
}

pub fn local_spawner() -> Rc<dyn tack_core::Spawn> {
    spawner(|future| {
        tokio::task::spawn_local(future);
    })
}

/// Uploader bound to `page` with scripted transfers. Must run inside a `LocalSet`.
pub fn scripted_uploader(page: &MemoryPage) -> (Uploader<MemoryPage>, Rc<ScriptedTransfer>) {
    let transfer = Rc::new(ScriptedTransfer::default());
    let uploader = Uploader::with_transfer(
        Rc::new(page.clone()),
        Rc::new(Config::new("https://up.x/upload")),
        transfer.clone(),
        local_spawner(),
    );
    uploader.start();
    (uploader, transfer)
}

pub fn png(name: &str) -> Rc<dyn FileHandle> {
    MemoryFile::new(name, "image/png", vec![0u8; 10]).shared()
}

/// Let spawned tasks run until the engine has nothing pending.
pub async fn settle(engine: &UploadEngine) {
    settle_to(engine, 0).await;
}

/// Let spawned tasks run until at most `remaining` sessions are pending.
pub async fn settle_to(engine: &UploadEngine, remaining: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while engine.pending_count() > remaining {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("uploads did not settle");
}
