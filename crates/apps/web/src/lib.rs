use std::cell::RefCell;
use std::rc::{Rc, Weak};

use console_error_panic_hook::set_once;
use geocoding::{Directions, Geocoder};
use serde::Serialize;
use session::{Session, SessionConfig};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element};

mod config;
mod editor;
mod leaflet;
mod transport;

pub use config::ClientConfig;
use editor::{TextareaEditor, element_by_id};
use leaflet::LeafletMap;
use transport::FetchMapbox;

type BrowserSession = Session<LeafletMap, TextareaEditor>;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

#[derive(Debug, Serialize)]
struct CandidateView<'a> {
    index: usize,
    label: &'a str,
}

struct AppInner {
    session: RefCell<BrowserSession>,
    mapbox: FetchMapbox,
    document: Document,
    candidates: Element,
    // Keeps the map click callback alive for as long as the app exists.
    _on_click: Closure<dyn FnMut(u32)>,
}

impl AppInner {
    fn point_clicked(&self, feature_index: usize) {
        self.session.borrow_mut().on_point_clicked(feature_index);
        self.flush_events();
    }

    fn render_candidates(&self) {
        if let Err(err) = self.render_candidates_inner() {
            web_sys::console::error_2(&JsValue::from_str("candidate list not shown"), &err);
        }
    }

    fn render_candidates_inner(&self) -> Result<(), JsValue> {
        let session = self.session.borrow();
        self.candidates.set_inner_html("");
        for (index, candidate) in session.candidates().iter().enumerate() {
            let item = self.document.create_element("li")?;
            item.set_attribute("data-index", &index.to_string())?;
            item.set_text_content(Some(&candidate.label));
            self.candidates.append_child(&item)?;
        }
        Ok(())
    }

    /// Session notifications go to the browser console.
    fn flush_events(&self) {
        for event in self.session.borrow_mut().drain_events() {
            web_sys::console::debug_1(&JsValue::from_str(&format!(
                "[{}] {:?}: {}",
                event.revision, event.kind, event.message
            )));
        }
    }
}

/// The scratchpad page: a GeoJSON text editor bound to a Leaflet map, plus
/// place search.
///
/// The page wires DOM events to `edit`, `search` and `selectCandidate`.
/// Every instance owns its own session.
#[wasm_bindgen]
pub struct EditorApp {
    inner: Rc<AppInner>,
}

#[wasm_bindgen]
impl EditorApp {
    /// `config` is a plain object, see [`ClientConfig`]; `accessToken` is
    /// required.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<EditorApp, JsValue> {
        let config: ClientConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("invalid config: {e}")))?;
        config.validate().map_err(|e| JsValue::from_str(&e))?;

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let candidates = element_by_id(&document, &config.elements.candidates)?;
        let editor = TextareaEditor::attach(
            &document,
            &config.elements.editor,
            &config.elements.diagnostics,
        )?;

        // The click callback needs the app, and the map needs the callback.
        let slot: Rc<RefCell<Weak<AppInner>>> = Rc::new(RefCell::new(Weak::new()));
        let on_click = {
            let slot = slot.clone();
            Closure::<dyn FnMut(u32)>::new(move |index: u32| {
                let app = slot.borrow().upgrade();
                if let Some(app) = app {
                    app.point_clicked(index as usize);
                }
            })
        };
        let map = LeafletMap::create(
            &config,
            on_click.as_ref().unchecked_ref::<js_sys::Function>().clone(),
        )?;

        let session_config = SessionConfig {
            route_profile: config.profile.clone(),
            ..SessionConfig::default()
        };
        let inner = Rc::new(AppInner {
            session: RefCell::new(Session::new(session_config, map, editor)),
            mapbox: FetchMapbox::new(config.mapbox()),
            document,
            candidates,
            _on_click: on_click,
        });
        *slot.borrow_mut() = Rc::downgrade(&inner);
        inner.flush_events();
        Ok(EditorApp { inner })
    }

    /// Text typed into the editor.
    pub fn edit(&self, text: String) {
        self.inner.session.borrow_mut().on_edit(&text);
        self.inner.flush_events();
    }

    /// Search input changed. Each call issues its own query; whichever
    /// completes last decides the list.
    pub fn search(&self, text: String) {
        let request = self.inner.session.borrow_mut().begin_search(&text);
        let Some(request) = request else {
            self.inner.render_candidates();
            return;
        };
        let app = self.inner.clone();
        spawn_local(async move {
            let result = app.mapbox.search(&request.query).await;
            app.session.borrow_mut().finish_search(&request, result);
            app.render_candidates();
            app.flush_events();
        });
    }

    /// A candidate from the list was chosen.
    #[wasm_bindgen(js_name = selectCandidate)]
    pub fn select_candidate(&self, index: usize) {
        let pending = self.inner.session.borrow_mut().begin_selection(index);
        let Some(pending) = pending else {
            return;
        };
        self.inner.render_candidates();
        let app = self.inner.clone();
        spawn_local(async move {
            let route = match pending.route_request() {
                Some((origin, destination)) => Some(app.mapbox.route(origin, destination).await),
                None => None,
            };
            app.session.borrow_mut().finish_selection(pending, route);
            app.flush_events();
        });
    }

    /// Current candidates as `[{index, label}]`.
    pub fn candidates(&self) -> Result<JsValue, JsValue> {
        let session = self.inner.session.borrow();
        let views: Vec<CandidateView<'_>> = session
            .candidates()
            .iter()
            .enumerate()
            .map(|(index, c)| CandidateView {
                index,
                label: &c.label,
            })
            .collect();
        serde_wasm_bindgen::to_value(&views)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    #[wasm_bindgen(js_name = documentText)]
    pub fn document_text(&self) -> String {
        self.inner.session.borrow().document().current_text().to_string()
    }
}
