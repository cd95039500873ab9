use formats::Feature;
use foundation::Sequence;
use geocoding::{GeocodeError, SearchCandidate};
use tracing::debug;

/// Property under which a candidate's label is stored on its feature.
pub const ADDRESS_PROPERTY: &str = "address";

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SearchState {
    #[default]
    Idle,
    HasResults(Vec<SearchCandidate>),
}

/// An issued geocoding query. Completions are matched back by value only;
/// nothing is cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub seq: u64,
    pub query: String,
}

#[derive(Debug, Default)]
pub struct SearchController {
    state: SearchState,
    issued: Sequence,
    last_applied: u64,
}

impl SearchController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, SearchState::Idle)
    }

    pub fn candidates(&self) -> &[SearchCandidate] {
        match &self.state {
            SearchState::Idle => &[],
            SearchState::HasResults(list) => list,
        }
    }

    /// Starts a query for `text`. Empty input returns to Idle and issues nothing.
    pub fn begin_query(&mut self, text: &str) -> Option<SearchRequest> {
        let query = text.trim();
        if query.is_empty() {
            self.state = SearchState::Idle;
            return None;
        }
        Some(SearchRequest {
            seq: self.issued.advance(),
            query: query.to_string(),
        })
    }

    /// Applies a completed query. Whatever completes last wins, so a slow
    /// earlier query can replace the results of a later one. Failures leave the
    /// current list alone. Returns whether the list was replaced.
    pub fn complete_query(
        &mut self,
        request: &SearchRequest,
        result: Result<Vec<SearchCandidate>, GeocodeError>,
    ) -> bool {
        let candidates = match result {
            Ok(candidates) => candidates,
            Err(err) => {
                debug!("search #{} {:?} dropped: {err}", request.seq, request.query);
                return false;
            }
        };
        if request.seq < self.last_applied {
            debug!(
                "search #{} completed after #{}; replacing newer results",
                request.seq, self.last_applied
            );
        }
        self.last_applied = request.seq;
        self.state = if candidates.is_empty() {
            SearchState::Idle
        } else {
            SearchState::HasResults(candidates)
        };
        true
    }

    /// Takes candidate `index`, consuming the whole list. An out-of-range index
    /// selects nothing and leaves the list in place.
    pub fn take(&mut self, index: usize) -> Option<SearchCandidate> {
        if index >= self.candidates().len() {
            return None;
        }
        match std::mem::take(&mut self.state) {
            SearchState::HasResults(list) => list.into_iter().nth(index),
            SearchState::Idle => None,
        }
    }
}

/// Feature committed to the document for a chosen candidate.
pub fn candidate_feature(candidate: &SearchCandidate) -> Feature {
    Feature::new(candidate.geometry.clone()).with_property(ADDRESS_PROPERTY, candidate.label.clone())
}

#[cfg(test)]
mod tests {
    use super::{SearchController, SearchState, candidate_feature};
    use formats::Geometry;
    use foundation::LonLat;
    use geocoding::{GeocodeError, SearchCandidate};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn cand(label: &str) -> SearchCandidate {
        SearchCandidate {
            label: label.to_string(),
            geometry: Geometry::Point(LonLat::new(1.0, 2.0)),
        }
    }

    #[test]
    fn empty_input_is_idle_and_issues_nothing() {
        let mut s = SearchController::new();
        assert!(s.is_idle());
        assert_eq!(s.begin_query("   "), None);
        let req = s.begin_query(" main st ").expect("request");
        assert_eq!(req.query, "main st");
        assert!(s.complete_query(&req, Ok(vec![cand("a")])));
        assert!(!s.is_idle());
        assert_eq!(s.begin_query(""), None);
        assert!(s.is_idle());
    }

    #[test]
    fn later_completion_wins_even_if_older() {
        let mut s = SearchController::new();
        let first = s.begin_query("ma").unwrap();
        let second = s.begin_query("main").unwrap();
        assert!(first.seq < second.seq);

        s.complete_query(&second, Ok(vec![cand("main")]));
        s.complete_query(&first, Ok(vec![cand("ma1"), cand("ma2")]));
        assert_eq!(s.candidates().len(), 2);
        assert_eq!(s.candidates()[0].label, "ma1");
    }

    #[test]
    fn failures_keep_current_list() {
        let mut s = SearchController::new();
        let req = s.begin_query("x").unwrap();
        assert!(!s.complete_query(&req, Err(GeocodeError::Status(500))));
        assert!(s.is_idle());

        s.complete_query(&req, Ok(vec![cand("x")]));
        let again = s.begin_query("xy").unwrap();
        assert!(!s.complete_query(&again, Err(GeocodeError::Http("down".into()))));
        assert_eq!(s.candidates().len(), 1);
    }

    #[test]
    fn take_consumes_whole_list() {
        let mut s = SearchController::new();
        let req = s.begin_query("q").unwrap();
        s.complete_query(&req, Ok(vec![cand("a"), cand("b"), cand("c")]));

        assert_eq!(s.take(7), None);
        assert_eq!(s.candidates().len(), 3);

        assert_eq!(s.take(1).map(|c| c.label), Some("b".to_string()));
        assert_eq!(s.state(), &SearchState::Idle);
        assert_eq!(s.take(0), None);
    }

    #[test]
    fn candidate_becomes_feature_with_address() {
        let f = candidate_feature(&cand("Main St"));
        assert_eq!(
            f.to_geojson_value(),
            json!({
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [1.0, 2.0]},
                "properties": {"address": "Main St"}
            })
        );
    }
}
