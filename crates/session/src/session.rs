use std::collections::VecDeque;

use formats::{DEFAULT_DOCUMENT, DocumentChange, DocumentStore, Feature};
use foundation::LonLat;
use geocoding::{Directions, GeocodeError, Geocoder, SearchCandidate};
use layers::{
    CentroidProvider, GeoCentroid, MapSurface, OverlayController, RenderOutcome, SelectedPoint,
};
use tracing::debug;
use validation::{Diagnostic, GeoJsonLinter, Linter, ValidatorAdapter};

use crate::augment::{self, AugmentPlan};
use crate::editor::EditorSurface;
use crate::events::{EventBus, EventKind, SessionEvent};
use crate::search::{SearchController, SearchRequest, SearchState, candidate_feature};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Text loaded into the editor when the session starts.
    pub initial_text: String,
    /// Routing profile recorded on route features.
    pub route_profile: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_text: DEFAULT_DOCUMENT.to_string(),
            route_profile: geocoding::mapbox::DEFAULT_PROFILE.to_string(),
        }
    }
}

/// Result of one validate -> render pass.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// The text is not JSON; nothing was linted or rendered.
    NotJson,
    /// The linter reported problems; the previous overlay stays.
    Invalid(Vec<Diagnostic>),
    Rendered(RenderOutcome),
}

/// A chosen candidate waiting for its (optional) route.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSelection {
    pub candidate: SearchCandidate,
    pub plan: AugmentPlan,
}

impl PendingSelection {
    /// `(origin, destination)` to ask the directions capability for, if any.
    pub fn route_request(&self) -> Option<(LonLat, LonLat)> {
        self.plan.route_request()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    Appended {
        features: usize,
        change: DocumentChange,
        pipeline: PipelineOutcome,
    },
    /// The document is not a FeatureCollection; its text was left untouched.
    NotAppended,
}

/// One editing session: a document, its map overlay and the search workflow.
///
/// All collaborators are owned here; nothing is process-global, so sessions
/// are independent of each other.
pub struct Session<M: MapSurface, E: EditorSurface> {
    config: SessionConfig,
    document: DocumentStore,
    validator: ValidatorAdapter,
    overlay: OverlayController,
    search: SearchController,
    selected: Option<SelectedPoint>,
    map: M,
    editor: E,
    events: EventBus,
}

impl<M: MapSurface, E: EditorSurface> Session<M, E> {
    /// Session using the built-in GeoJSON linter and `geo` centroid.
    pub fn new(config: SessionConfig, map: M, editor: E) -> Self {
        Self::with_capabilities(config, map, editor, GeoJsonLinter, GeoCentroid)
    }

    /// Loads `config.initial_text`, shows it in the editor and renders it.
    pub fn with_capabilities(
        config: SessionConfig,
        map: M,
        editor: E,
        linter: impl Linter + 'static,
        centroid: impl CentroidProvider + 'static,
    ) -> Self {
        let mut session = Self {
            document: DocumentStore::new(),
            validator: ValidatorAdapter::new(linter),
            overlay: OverlayController::new(centroid),
            search: SearchController::new(),
            selected: None,
            map,
            editor,
            events: EventBus::new(),
            config,
        };
        let change = session.document.set_raw_text(session.config.initial_text.clone());
        session.editor.set_text(session.document.current_text());
        session.on_document_changed(change);
        session
    }

    /// Raw edit from the text surface.
    pub fn on_edit(&mut self, text: &str) -> PipelineOutcome {
        let change = self.document.set_raw_text(text);
        self.on_document_changed(change)
    }

    /// A rendered point feature was clicked.
    pub fn on_point_clicked(&mut self, feature_index: usize) -> Option<SelectedPoint> {
        let point = self.overlay.point_at(feature_index)?;
        let selected = SelectedPoint::from(point);
        self.selected = Some(selected);
        self.emit(
            EventKind::PointSelected,
            format!("feature {feature_index} at {}", selected.position),
        );
        Some(selected)
    }

    /// Search input changed. Returns the query to send, or `None` when the
    /// input is empty (which also drops any selected point).
    pub fn begin_search(&mut self, text: &str) -> Option<SearchRequest> {
        let request = self.search.begin_query(text);
        if request.is_none() {
            self.selected = None;
        }
        request
    }

    /// A geocoding query completed. Returns whether the candidate list changed.
    pub fn finish_search(
        &mut self,
        request: &SearchRequest,
        result: Result<Vec<SearchCandidate>, GeocodeError>,
    ) -> bool {
        let failure = result.as_ref().err().map(ToString::to_string);
        let replaced = self.search.complete_query(request, result);
        match failure {
            Some(err) => self.emit(EventKind::SearchFailed, err),
            None => self.emit(
                EventKind::SearchCompleted,
                format!(
                    "{:?}: {} candidates",
                    request.query,
                    self.search.candidates().len()
                ),
            ),
        }
        replaced
    }

    /// Chooses candidate `index`. The candidate list and the selected point are
    /// consumed immediately; the returned selection says whether a route must
    /// be fetched before [`Session::finish_selection`].
    ///
    /// No route is planned when the document cannot take the append.
    pub fn begin_selection(&mut self, index: usize) -> Option<PendingSelection> {
        let candidate = self.search.take(index)?;
        let selected = self.selected.take();
        let appendable = self
            .document
            .current_parsed()
            .is_some_and(formats::is_feature_collection);
        let plan = if appendable {
            augment::plan(selected, &candidate)
        } else {
            AugmentPlan::Plain
        };
        Some(PendingSelection { candidate, plan })
    }

    /// Appends the chosen candidate (and the route, when one was fetched) to
    /// the document, then pushes the new text to the editor and re-renders.
    pub fn finish_selection(
        &mut self,
        pending: PendingSelection,
        route: Option<Result<Vec<LonLat>, GeocodeError>>,
    ) -> SelectionOutcome {
        let mut features: Vec<Feature> = vec![candidate_feature(&pending.candidate)];
        let routed = route.is_some();
        match augment::route_feature(
            &pending.plan,
            &pending.candidate.label,
            &self.config.route_profile,
            route,
        ) {
            Some(line) => features.push(line),
            None if routed => self.emit(EventKind::RouteSkipped, "directions unavailable"),
            None => {}
        }

        let Some(change) = self.document.append_features(&features) else {
            debug!("selection of {:?} not appended", pending.candidate.label);
            return SelectionOutcome::NotAppended;
        };
        let pipeline = self.on_document_changed(change);
        SelectionOutcome::Appended {
            features: features.len(),
            change,
            pipeline,
        }
    }

    /// Runs a whole query in place: issue, await, apply.
    pub async fn search(&mut self, geocoder: &dyn Geocoder, text: &str) -> bool {
        let Some(request) = self.begin_search(text) else {
            return false;
        };
        let result = geocoder.search(&request.query).await;
        self.finish_search(&request, result)
    }

    /// Runs a whole selection in place, fetching the route when a point is
    /// selected.
    pub async fn select(
        &mut self,
        directions: &dyn Directions,
        index: usize,
    ) -> Option<SelectionOutcome> {
        let pending = self.begin_selection(index)?;
        let route = match pending.route_request() {
            Some((origin, destination)) => Some(directions.route(origin, destination).await),
            None => None,
        };
        Some(self.finish_selection(pending, route))
    }

    pub fn document(&self) -> &DocumentStore {
        &self.document
    }

    pub fn candidates(&self) -> &[SearchCandidate] {
        self.search.candidates()
    }

    pub fn search_state(&self) -> &SearchState {
        self.search.state()
    }

    pub fn selected_point(&self) -> Option<SelectedPoint> {
        self.selected
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    pub fn events(&self) -> &VecDeque<SessionEvent> {
        self.events.events()
    }

    /// Takes every event emitted since the last drain, oldest first. Hosts
    /// call this after each action; undrained events beyond
    /// [`crate::events::EVENT_CAPACITY`] are dropped oldest first.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain()
    }

    fn on_document_changed(&mut self, change: DocumentChange) -> PipelineOutcome {
        self.emit(EventKind::DocumentChanged, format!("{:?}", change.origin));
        if change.origin == formats::ChangeOrigin::Append {
            self.editor.set_text(self.document.current_text());
        }
        self.run_pipeline()
    }

    fn run_pipeline(&mut self) -> PipelineOutcome {
        let text = self.document.current_text();
        let parsed = self.document.current_parsed();

        let Some(diagnostics) = self.validator.validate(text, parsed) else {
            self.editor.set_diagnostics(&[]);
            self.emit(EventKind::RenderSuspended, "text is not JSON");
            return PipelineOutcome::NotJson;
        };
        if !diagnostics.is_empty() {
            self.editor.set_diagnostics(&diagnostics);
            self.emit(
                EventKind::ValidationFailed,
                format!("{} problems", diagnostics.len()),
            );
            return PipelineOutcome::Invalid(diagnostics);
        }
        self.editor.set_diagnostics(&[]);

        let Some(parsed) = self.document.current_parsed() else {
            return PipelineOutcome::NotJson;
        };
        let outcome = self.overlay.render(&mut self.map, parsed);
        let message = match outcome.recentered {
            Some(center) => format!("{} centred on {center}", outcome.overlay),
            None => format!("{} without recentring", outcome.overlay),
        };
        self.emit(EventKind::Rendered, message);
        PipelineOutcome::Rendered(outcome)
    }

    fn emit(&mut self, kind: EventKind, message: impl Into<String>) {
        self.events.emit(self.document.revision(), kind, message);
    }
}
