//! WASM browser tests for tack-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use tack_browser::{DomHost, DomRichSurface, DomTextarea, host::selectors};
use tack_core::{
    EditorAdapter, HostPage, PlainTextAdapter, RichDocumentAdapter, RichSurface, TextareaSurface,
};
use web_sys::{Document, Element, HtmlElement, HtmlTextAreaElement};

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

/// Mount a composer fixture and return its root. Removes any previous one.
fn mount(inner_html: &str) -> Element {
    let document = document();
    if let Some(old) = document.query_selector(selectors::ROOT).unwrap() {
        old.remove();
    }
    let root = document.create_element("div").unwrap();
    root.set_id("reply-control");
    root.set_inner_html(inner_html);
    document.body().unwrap().append_child(&root).unwrap();
    root
}

fn textarea(root: &Element) -> HtmlTextAreaElement {
    root.query_selector(selectors::PLAIN)
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap()
}

// === Surface tests ===

#[wasm_bindgen_test]
fn test_textarea_offsets_are_chars() {
    let root = mount(r#"<textarea class="d-editor-input"></textarea>"#);
    let surface = DomTextarea::new(textarea(&root));
    surface.set_value("a🌍b");

    surface.set_selection(2..2);
    // the emoji is two UTF-16 units
    assert_eq!(surface.element().selection_start().unwrap(), Some(3));
    assert_eq!(surface.selection(), 2..2);
}

#[wasm_bindgen_test]
fn test_plain_adapter_replaces_placeholder() {
    let root = mount(r#"<textarea class="d-editor-input"></textarea>"#);
    let surface = DomTextarea::new(textarea(&root));
    surface.set_value("🌍 [p] end");
    let adapter = PlainTextAdapter::new(surface);

    assert!(adapter.replace_placeholder("[p]", "![a](u)"));
    assert_eq!(adapter.surface().value(), "🌍 ![a](u) end");
    assert_eq!(adapter.surface().selection(), 9..9);
}

#[wasm_bindgen_test]
fn test_rich_surface_replaces_within_text_node() {
    let root = mount(
        r#"<div class="ProseMirror-container"><div class="ProseMirror d-editor-input" contenteditable="true"><p>first</p><p>see [p] here</p></div></div>"#,
    );
    let editor: HtmlElement = root
        .query_selector(selectors::RICH)
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();
    let adapter = RichDocumentAdapter::new(DomRichSurface::new(editor.clone(), document()));

    assert_eq!(adapter.surface().text_nodes().len(), 2);
    assert!(adapter.replace_placeholder("[p]", "![a](u)"));
    assert_eq!(editor.text_content().unwrap(), "firstsee ![a](u) here");
    assert!(!adapter.replace_placeholder("[p]", "x"));
}

#[wasm_bindgen_test]
fn test_rich_append_lands_at_end() {
    let root = mount(
        r#"<div class="ProseMirror-container"><div class="ProseMirror d-editor-input" contenteditable="true">draft</div></div>"#,
    );
    let editor: HtmlElement = root
        .query_selector(selectors::RICH)
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();
    let adapter = RichDocumentAdapter::new(DomRichSurface::new(editor.clone(), document()));

    adapter.append_content("x");
    // line breaks may be rendered as elements by the browser
    let text = editor.text_content().unwrap();
    assert!(text.starts_with("draft"));
    assert!(text.trim_end().ends_with('x'));
}

// === Host tests ===

#[wasm_bindgen_test]
fn test_host_locates_surfaces() {
    let root = mount(
        r#"<div class="d-editor-button-bar"><button class="toolbar__button upload" style="display:none"></button></div><textarea class="d-editor-input"></textarea>"#,
    );
    let host = DomHost::new().unwrap();

    let found = host.composition_root().unwrap();
    assert_eq!(found, root);
    assert!(!host.is_closed(&found));
    assert!(host.rich_surface(&found).is_none());
    assert!(host.toolbar(&found).is_some());

    let editor = host.plain_surface(&found).unwrap();
    let adapter = host.plain_adapter(&editor).unwrap();
    assert!(adapter.is_usable());

    root.class_list().add_1(selectors::CLOSED).unwrap();
    assert!(host.is_closed(&found));
}

#[wasm_bindgen_test]
fn test_start_marks_page_and_reveals_trigger() {
    let root = mount(
        r#"<div class="d-editor-button-bar"><button class="toolbar__button upload" style="display:none"></button></div><textarea class="d-editor-input"></textarea>"#,
    );

    tack_browser::start(r#"{"endpoint": "https://up.example/upload"}"#).unwrap();
    let body = document().body().unwrap();
    assert_eq!(
        body.get_attribute("data-tack-uploader").as_deref(),
        Some("plugin")
    );

    let trigger: HtmlElement = root
        .query_selector(selectors::UPLOAD_TRIGGER)
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();
    assert_eq!(
        trigger.style().get_property_value("display").unwrap(),
        "inline-flex"
    );

    tack_browser::stop();
    assert!(body.get_attribute("data-tack-uploader").is_none());
}

#[wasm_bindgen_test]
fn test_start_requires_endpoint() {
    assert!(tack_browser::start("{}").is_err());
}
