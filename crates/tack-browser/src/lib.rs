//! Browser host for tack composer uploads.
//!
//! Binds the `tack-core` uploader to the forum's composer through the DOM.
//! It assumes a `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `host`: page lookup, capture listeners, mutation observers, file picker
//! - `surface`: textarea and contenteditable surfaces (UTF-16 ↔ char offsets)
//! - `event`: paste / drop / drag-over events and the files they carry
//! - `file`: `File` handles read through `Blob.arrayBuffer()`
//!
//! JavaScript calls [`start`] once with a JSON settings object, and [`stop`]
//! when the page goes away.

pub mod event;
pub mod file;
pub mod host;
pub mod surface;

use std::cell::RefCell;
use std::rc::Rc;

use tack_core::{Config, Uploader, spawner};
use wasm_bindgen::prelude::*;

pub use event::DomEvent;
pub use file::DomFile;
pub use host::DomHost;
pub use surface::{DomRichSurface, DomTextarea};

thread_local! {
    static UPLOADER: RefCell<Option<Active>> = const { RefCell::new(None) };
}

struct Active {
    host: Rc<DomHost>,
    uploader: Uploader<DomHost>,
}

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Start the uploader with the given JSON settings.
///
/// Calling it again replaces the running uploader.
#[wasm_bindgen]
pub fn start(settings: &str) -> Result<(), JsValue> {
    let config = Config::from_json(settings).map_err(|e| JsValue::from_str(&e.to_string()))?;
    init_tracing(config.debug);
    stop();

    let host = Rc::new(DomHost::new()?);
    tracing::debug!(
        max_file_size = config.max_file_size,
        locale = ?config.locale,
        "starting composer uploads"
    );
    let uploader = Uploader::new(
        host.clone(),
        config,
        spawner(|future| wasm_bindgen_futures::spawn_local(future)),
    );
    uploader.start();
    host.set_marker(true);

    UPLOADER.with(|slot| *slot.borrow_mut() = Some(Active { host, uploader }));
    Ok(())
}

/// Stop the uploader and release every page subscription.
///
/// Uploads already in flight still resolve into the composer.
#[wasm_bindgen]
pub fn stop() {
    let active = UPLOADER.with(|slot| slot.borrow_mut().take());
    if let Some(Active { host, uploader }) = active {
        uploader.stop();
        host.set_marker(false);
        tracing::debug!("composer uploads stopped");
    }
}

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
fn init_tracing(debug: bool) {
    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if debug { Level::DEBUG } else { Level::WARN };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    // Only the first call installs a subscriber.
    let _ = set_global_default(Registry::default().with(wasm_layer));
}

#[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
fn init_tracing(_debug: bool) {}
