use session::EditorSurface;
use validation::Diagnostic;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlTextAreaElement};

/// Plain `<textarea>` editor with a diagnostics list beside it.
pub struct TextareaEditor {
    document: Document,
    textarea: HtmlTextAreaElement,
    diagnostics: Element,
}

impl TextareaEditor {
    pub fn attach(
        document: &Document,
        editor_id: &str,
        diagnostics_id: &str,
    ) -> Result<Self, JsValue> {
        let textarea = element_by_id(document, editor_id)?
            .dyn_into::<HtmlTextAreaElement>()
            .map_err(|_| JsValue::from_str(&format!("#{editor_id} is not a textarea")))?;
        let diagnostics = element_by_id(document, diagnostics_id)?;
        Ok(Self {
            document: document.clone(),
            textarea,
            diagnostics,
        })
    }

    fn render_diagnostics(&self, diagnostics: &[Diagnostic]) -> Result<(), JsValue> {
        self.diagnostics.set_inner_html("");
        for d in diagnostics {
            let item = self.document.create_element("li")?;
            item.set_attribute("data-line", &d.line.to_string())?;
            item.set_text_content(Some(&format!("line {}: {}", d.line, d.message)));
            self.diagnostics.append_child(&item)?;
        }
        Ok(())
    }
}

impl EditorSurface for TextareaEditor {
    fn set_text(&mut self, text: &str) {
        self.textarea.set_value(text);
    }

    fn set_diagnostics(&mut self, diagnostics: &[Diagnostic]) {
        if let Err(err) = self.render_diagnostics(diagnostics) {
            web_sys::console::error_2(&JsValue::from_str("diagnostics not shown"), &err);
        }
    }
}

pub fn element_by_id(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))
}
