use serde::Serialize;
use serde_json::{Map, Value};

use crate::locate::{PathSegment, line_of};

/// A single problem reported against a line of the edited text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// 1-based line number.
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// GeoJSON lint capability. Operates on raw text, not on a parsed value.
pub trait Linter {
    fn lint(&self, raw_text: &str) -> Vec<Diagnostic>;
}

/// Gate in front of a [`Linter`]: text that did not parse as JSON is never
/// linted.
pub struct ValidatorAdapter {
    linter: Box<dyn Linter>,
}

impl ValidatorAdapter {
    pub fn new(linter: impl Linter + 'static) -> Self {
        Self {
            linter: Box::new(linter),
        }
    }

    /// Returns `None` when `parsed` is absent (the linter is not consulted),
    /// otherwise the diagnostics ordered by line. An empty list means the
    /// document may be rendered.
    pub fn validate(&self, raw_text: &str, parsed: Option<&Value>) -> Option<Vec<Diagnostic>> {
        parsed?;
        let mut diagnostics = self.linter.lint(raw_text);
        diagnostics.sort_by_key(|d| d.line);
        Some(diagnostics)
    }
}

impl Default for ValidatorAdapter {
    fn default() -> Self {
        Self::new(GeoJsonLinter)
    }
}

const GEOMETRY_TYPES: &[&str] = &[
    "Point",
    "MultiPoint",
    "LineString",
    "MultiLineString",
    "Polygon",
    "MultiPolygon",
    "GeometryCollection",
];

/// Structural GeoJSON checker (RFC 7946 shapes), reporting every problem it
/// finds rather than stopping at the first.
#[derive(Debug, Default, Clone, Copy)]
pub struct GeoJsonLinter;

impl Linter for GeoJsonLinter {
    fn lint(&self, raw_text: &str) -> Vec<Diagnostic> {
        let value: Value = match serde_json::from_str(raw_text) {
            Ok(v) => v,
            Err(err) => return vec![Diagnostic::new(err.line().max(1), err.to_string())],
        };

        let mut walker = Walker::default();
        walker.root(&value);

        walker
            .problems
            .into_iter()
            .map(|(path, message)| Diagnostic::new(line_of(raw_text, &path).unwrap_or(1), message))
            .collect()
    }
}

#[derive(Default)]
struct Walker {
    path: Vec<PathSegment>,
    problems: Vec<(Vec<PathSegment>, String)>,
}

impl Walker {
    fn report(&mut self, message: impl Into<String>) {
        self.problems.push((self.path.clone(), message.into()));
    }

    fn within<F: FnOnce(&mut Self)>(&mut self, seg: PathSegment, f: F) {
        self.path.push(seg);
        f(self);
        self.path.pop();
    }

    fn root(&mut self, value: &Value) {
        let Some(obj) = value.as_object() else {
            self.report("the root of a GeoJSON document must be an object");
            return;
        };
        let Some(ty) = self.type_member(obj) else {
            return;
        };
        match ty {
            "FeatureCollection" => self.feature_collection(obj),
            "Feature" => self.feature(obj),
            t if GEOMETRY_TYPES.contains(&t) => self.geometry_object(obj, t),
            other => self.within(PathSegment::key("type"), |w| {
                w.report(format!("the type {other} is unknown"))
            }),
        }
    }

    fn type_member<'v>(&mut self, obj: &'v Map<String, Value>) -> Option<&'v str> {
        match obj.get("type") {
            None => {
                self.report("\"type\" member required");
                None
            }
            Some(Value::String(s)) => Some(s.as_str()),
            Some(_) => {
                self.within(PathSegment::key("type"), |w| {
                    w.report("\"type\" member must be a string")
                });
                None
            }
        }
    }

    fn feature_collection(&mut self, obj: &Map<String, Value>) {
        match obj.get("features") {
            None => self.report("\"features\" member required"),
            Some(Value::Array(features)) => {
                self.within(PathSegment::key("features"), |w| {
                    for (i, f) in features.iter().enumerate() {
                        w.within(PathSegment::Index(i), |w| w.feature_value(f));
                    }
                });
            }
            Some(_) => self.within(PathSegment::key("features"), |w| {
                w.report("\"features\" member must be an array")
            }),
        }
    }

    fn feature_value(&mut self, value: &Value) {
        let Some(obj) = value.as_object() else {
            self.report("every feature must be an object");
            return;
        };
        match self.type_member(obj) {
            Some("Feature") => self.feature(obj),
            Some(other) => self.within(PathSegment::key("type"), |w| {
                w.report(format!("expected type Feature, found {other}"))
            }),
            None => {}
        }
    }

    fn feature(&mut self, obj: &Map<String, Value>) {
        if let Some(id) = obj.get("id") {
            if !(id.is_string() || id.is_number()) {
                self.within(PathSegment::key("id"), |w| {
                    w.report("feature \"id\" must be a string or a number")
                });
            }
        }
        match obj.get("properties") {
            None => self.report("\"properties\" member required"),
            Some(Value::Object(_)) | Some(Value::Null) => {}
            Some(_) => self.within(PathSegment::key("properties"), |w| {
                w.report("\"properties\" member must be an object or null")
            }),
        }
        match obj.get("geometry") {
            None => self.report("\"geometry\" member required"),
            Some(Value::Null) => {}
            Some(g) => self.within(PathSegment::key("geometry"), |w| w.geometry_value(g)),
        }
    }

    fn geometry_value(&mut self, value: &Value) {
        let Some(obj) = value.as_object() else {
            self.report("geometry must be an object or null");
            return;
        };
        let Some(ty) = self.type_member(obj) else {
            return;
        };
        if !GEOMETRY_TYPES.contains(&ty) {
            self.within(PathSegment::key("type"), |w| {
                w.report(format!("the type {ty} is not a geometry type"))
            });
            return;
        }
        self.geometry_object(obj, ty);
    }

    fn geometry_object(&mut self, obj: &Map<String, Value>, ty: &str) {
        if ty == "GeometryCollection" {
            match obj.get("geometries") {
                None => self.report("\"geometries\" member required"),
                Some(Value::Array(items)) => self.within(PathSegment::key("geometries"), |w| {
                    for (i, g) in items.iter().enumerate() {
                        w.within(PathSegment::Index(i), |w| w.geometry_value(g));
                    }
                }),
                Some(_) => self.within(PathSegment::key("geometries"), |w| {
                    w.report("\"geometries\" member must be an array")
                }),
            }
            return;
        }

        let Some(coords) = obj.get("coordinates") else {
            self.report("\"coordinates\" member required");
            return;
        };
        self.within(PathSegment::key("coordinates"), |w| match ty {
            "Point" => w.position(coords),
            "MultiPoint" => w.each(coords, |w, c| w.position(c)),
            "LineString" => w.line_string(coords),
            "MultiLineString" => w.each(coords, |w, c| w.line_string(c)),
            "Polygon" => w.polygon(coords),
            "MultiPolygon" => w.each(coords, |w, c| w.polygon(c)),
            _ => {}
        });
    }

    fn each(&mut self, value: &Value, mut f: impl FnMut(&mut Self, &Value)) {
        let Some(items) = value.as_array() else {
            self.report("coordinates must be an array");
            return;
        };
        for (i, item) in items.iter().enumerate() {
            self.within(PathSegment::Index(i), |w| f(w, item));
        }
    }

    fn position(&mut self, value: &Value) {
        if let Err(reason) = formats::parse_point(value) {
            self.report(reason);
            return;
        }
        if let Some(extra) = value.as_array().and_then(|a| a.get(2..)) {
            if extra.iter().any(|v| !v.is_number()) {
                self.report("each element in a position must be a number");
            }
        }
    }

    fn line_string(&mut self, value: &Value) {
        let Some(items) = value.as_array() else {
            self.report("coordinates must be an array of positions");
            return;
        };
        if items.len() < 2 {
            self.report("a LineString must have two or more positions");
        }
        self.each(value, |w, c| w.position(c));
    }

    fn polygon(&mut self, value: &Value) {
        self.each(value, |w, ring| w.linear_ring(ring));
    }

    fn linear_ring(&mut self, value: &Value) {
        let Some(items) = value.as_array() else {
            self.report("a linear ring must be an array of positions");
            return;
        };
        if items.len() < 4 {
            self.report("a linear ring must have four or more positions");
        } else if !same_position(&items[0], &items[items.len() - 1]) {
            self.report("the first and last positions in a linear ring must be equivalent");
        }
        self.each(value, |w, c| w.position(c));
    }
}

/// Numeric comparison, so `[10, 20]` closes a ring opened with `[10.0, 20.0]`.
fn same_position(a: &Value, b: &Value) -> bool {
    match (a.as_array(), b.as_array()) {
        (Some(a), Some(b)) => {
            a.len() == b.len()
                && a.iter().zip(b).all(|(x, y)| match (x.as_f64(), y.as_f64()) {
                    (Some(x), Some(y)) => x == y,
                    _ => x == y,
                })
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::{Diagnostic, GeoJsonLinter, Linter, ValidatorAdapter};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingLinter(Rc<Cell<usize>>);

    impl Linter for CountingLinter {
        fn lint(&self, _raw_text: &str) -> Vec<Diagnostic> {
            self.0.set(self.0.get() + 1);
            vec![Diagnostic::new(3, "b"), Diagnostic::new(1, "a")]
        }
    }

    #[test]
    fn adapter_skips_linter_for_unparsed_text() {
        let calls = Rc::new(Cell::new(0));
        let adapter = ValidatorAdapter::new(CountingLinter(calls.clone()));
        assert_eq!(adapter.validate("{\"type\": \"Feature", None), None);
        assert_eq!(calls.get(), 0);

        let parsed = serde_json::json!({});
        let got = adapter.validate("{}", Some(&parsed)).expect("linted");
        assert_eq!(calls.get(), 1);
        assert_eq!(got, vec![Diagnostic::new(1, "a"), Diagnostic::new(3, "b")]);
    }

    #[test]
    fn valid_documents_have_no_diagnostics() {
        let docs = [
            r#"{"type":"FeatureCollection","features":[]}"#,
            r#"{"type":"Feature","properties":null,"geometry":null}"#,
            r#"{"type":"Point","coordinates":[-0.1,51.5,12]}"#,
            r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0]]]}"#,
            r#"{"type":"GeometryCollection","geometries":[{"type":"LineString","coordinates":[[0,0],[1,1]]}]}"#,
        ];
        for doc in docs {
            assert_eq!(GeoJsonLinter.lint(doc), Vec::<Diagnostic>::new(), "{doc}");
        }
    }

    #[test]
    fn reports_problems_on_their_lines() {
        let doc = r#"{
  "type": "FeatureCollection",
  "features": [
    {
      "type": "Feature",
      "properties": {},
      "geometry": {
        "type": "LineString",
        "coordinates": [[0, 0]]
      }
    },
    {
      "type": "Feature",
      "geometry": {"type": "Point", "coordinates": ["x", 1]}
    }
  ]
}"#;
        let got = GeoJsonLinter.lint(doc);
        assert_eq!(
            got,
            vec![
                Diagnostic::new(9, "a LineString must have two or more positions"),
                Diagnostic::new(12, "\"properties\" member required"),
                Diagnostic::new(14, "position lon must be a number"),
            ]
        );
    }

    #[test]
    fn reports_unknown_and_missing_types() {
        assert_eq!(
            GeoJsonLinter.lint(r#"{"type": "Circle"}"#),
            vec![Diagnostic::new(1, "the type Circle is unknown")]
        );
        assert_eq!(
            GeoJsonLinter.lint("[]"),
            vec![Diagnostic::new(
                1,
                "the root of a GeoJSON document must be an object"
            )]
        );
        assert_eq!(
            GeoJsonLinter.lint("{\n\"features\": []\n}"),
            vec![Diagnostic::new(1, "\"type\" member required")]
        );
    }

    #[test]
    fn open_rings_are_flagged() {
        let got = GeoJsonLinter
            .lint(r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1]]]}"#);
        assert_eq!(got.len(), 1);
        assert!(got[0].message.contains("must be equivalent"));
    }

    #[test]
    fn rings_closed_with_mixed_number_forms_pass() {
        assert_eq!(
            GeoJsonLinter.lint(r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0.0,0.0]]]}"#),
            Vec::new()
        );
        assert_eq!(
            GeoJsonLinter.lint(
                r#"{"type":"Polygon","coordinates":[[[10.0,20.0,5],[11,20],[11,21],[10,20,5.0]]]}"#
            ),
            Vec::new()
        );
        let got = GeoJsonLinter
            .lint(r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,0,3]]]}"#);
        assert_eq!(got.len(), 1);
    }

    #[test]
    fn syntax_errors_surface_with_their_line() {
        let got = GeoJsonLinter.lint("{\n  \"type\": \n}");
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].line, 3);
    }
}
