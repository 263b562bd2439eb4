use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, File, FileReader, HtmlAnchorElement, Url};

/// Offer `contents` to the user as a file download.
pub fn download_text(filename: &str, contents: &str, mime: &str) -> Result<(), JsValue> {
	let parts = js_sys::Array::of1(&JsValue::from_str(contents));
	let options = BlobPropertyBag::new();
	options.set_type(mime);
	let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
	let url = Url::create_object_url_with_blob(&blob)?;

	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| JsValue::from_str("no document"))?;
	let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
	anchor.set_href(&url);
	anchor.set_download(filename);
	anchor.click();
	Url::revoke_object_url(&url)
}

type Done = Box<dyn FnOnce(Result<String, String>)>;

/// Read `file` as UTF-8 text and hand the outcome to `on_done`, exactly once.
pub fn read_text(file: &File, on_done: impl FnOnce(Result<String, String>) + 'static) -> Result<(), JsValue> {
	let reader = FileReader::new()?;
	let on_done: Done = Box::new(on_done);
	let done = Rc::new(RefCell::new(Some(on_done)));

	let (reader_load, done_load) = (reader.clone(), done.clone());
	let onload = Closure::<dyn FnMut()>::new(move || {
		let text = reader_load
			.result()
			.ok()
			.and_then(|v| v.as_string())
			.ok_or_else(|| "file is not readable as text".to_string());
		if let Some(cb) = done_load.borrow_mut().take() {
			cb(text);
		}
	});

	let done_error = done.clone();
	let onerror = Closure::<dyn FnMut()>::new(move || {
		if let Some(cb) = done_error.borrow_mut().take() {
			cb(Err("could not read file".to_string()));
		}
	});

	reader.set_onload(Some(onload.as_ref().unchecked_ref()));
	reader.set_onerror(Some(onerror.as_ref().unchecked_ref()));
	reader.read_as_text(file)?;
	// The reader fires after this returns, so the closures must outlive it.
	onload.forget();
	onerror.forget();
	Ok(())
}
