//! Capture-phase input events as seen by the binding manager.

use std::rc::Rc;

use tack_core::{FileHandle, HostEvent};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{ClipboardEvent, DataTransfer, DragEvent, Event};

use crate::file::DomFile;

/// A paste, drop, drag-over or click event.
pub struct DomEvent {
    event: Event,
}

impl DomEvent {
    pub fn new(event: Event) -> Self {
        Self { event }
    }

    fn data_transfer(&self) -> Option<DataTransfer> {
        if let Some(paste) = self.event.dyn_ref::<ClipboardEvent>() {
            return paste.clipboard_data();
        }
        self.event
            .dyn_ref::<DragEvent>()
            .and_then(|drag| drag.data_transfer())
    }
}

/// Every file item on the clipboard, in order.
fn clipboard_files(data: &DataTransfer) -> Vec<web_sys::File> {
    let items = data.items();
    (0..items.length())
        .filter_map(|i| items.get(i))
        .filter(|item| item.kind() == "file")
        .filter_map(|item| item.get_as_file().ok().flatten())
        .collect()
}

/// Every dropped file, in order.
fn dropped_files(data: &DataTransfer) -> Vec<web_sys::File> {
    let Some(files) = data.files() else {
        return Vec::new();
    };
    (0..files.length()).filter_map(|i| files.item(i)).collect()
}

impl HostEvent for DomEvent {
    fn files(&self) -> Vec<Rc<dyn FileHandle>> {
        let Some(data) = self.data_transfer() else {
            return Vec::new();
        };
        let files = if self.event.is_instance_of::<ClipboardEvent>() {
            clipboard_files(&data)
        } else {
            dropped_files(&data)
        };
        files
            .into_iter()
            .map(|file| Rc::new(DomFile::new(file)) as Rc<dyn FileHandle>)
            .collect()
    }

    fn has_files(&self) -> bool {
        // During drag-over only the advertised types are readable.
        self.data_transfer()
            .is_some_and(|data| data.types().includes(&JsValue::from_str("Files"), 0))
    }

    fn prevent_default(&self) {
        self.event.prevent_default();
    }

    fn stop_propagation(&self) {
        self.event.stop_propagation();
    }
}
