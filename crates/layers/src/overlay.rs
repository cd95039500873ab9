use foundation::{LonLat, Sequence};
use serde_json::Value;
use tracing::debug;

use crate::centroid::CentroidProvider;
use crate::layer::OverlayId;
use crate::selection::{ClickablePoint, clickable_points};

/// Map rendering capability.
///
/// Implementations draw a GeoJSON document as one overlay and report clicks on
/// the given points back to the owning session.
pub trait MapSurface {
    fn add_overlay(&mut self, id: OverlayId, document: &Value, points: &[ClickablePoint]);
    fn remove_overlay(&mut self, id: OverlayId);
    fn pan_to(&mut self, center: LonLat);
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderOutcome {
    pub overlay: OverlayId,
    /// Where the view was recentred, `None` if the centroid was unavailable.
    pub recentered: Option<LonLat>,
}

#[derive(Debug)]
struct ActiveOverlay {
    id: OverlayId,
    points: Vec<ClickablePoint>,
}

/// Owns the single active overlay of a map surface.
pub struct OverlayController {
    centroid: Box<dyn CentroidProvider>,
    active: Option<ActiveOverlay>,
    ids: Sequence,
}

impl OverlayController {
    pub fn new(centroid: impl CentroidProvider + 'static) -> Self {
        Self {
            centroid: Box::new(centroid),
            active: None,
            ids: Sequence::new(),
        }
    }

    /// Replaces the active overlay with one built from `document` and recentres
    /// the view on its centroid.
    ///
    /// The previous overlay is removed before the new one is added, so at most
    /// one overlay is ever on the map. A centroid failure leaves the view where
    /// it is.
    pub fn render(&mut self, surface: &mut dyn MapSurface, document: &Value) -> RenderOutcome {
        if let Some(prev) = self.active.take() {
            surface.remove_overlay(prev.id);
        }

        let id = OverlayId(self.ids.advance());
        let points = clickable_points(document);
        surface.add_overlay(id, document, &points);
        self.active = Some(ActiveOverlay { id, points });

        let recentered = match self.centroid.centroid(document) {
            Ok(center) => {
                surface.pan_to(center);
                Some(center)
            }
            Err(err) => {
                debug!("recentring skipped for {id}: {err}");
                None
            }
        };

        RenderOutcome {
            overlay: id,
            recentered,
        }
    }

    pub fn active(&self) -> Option<OverlayId> {
        self.active.as_ref().map(|a| a.id)
    }

    /// Clickable point of the active overlay for `feature_index`.
    pub fn point_at(&self, feature_index: usize) -> Option<ClickablePoint> {
        self.active
            .as_ref()?
            .points
            .iter()
            .find(|p| p.feature_index == feature_index)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::{MapSurface, OverlayController};
    use crate::centroid::GeoCentroid;
    use crate::layer::OverlayId;
    use crate::selection::ClickablePoint;
    use foundation::LonLat;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Add(OverlayId, usize),
        Remove(OverlayId),
        Pan(LonLat),
    }

    #[derive(Default)]
    struct RecordingSurface {
        calls: Vec<Call>,
    }

    impl MapSurface for RecordingSurface {
        fn add_overlay(&mut self, id: OverlayId, _document: &Value, points: &[ClickablePoint]) {
            self.calls.push(Call::Add(id, points.len()));
        }

        fn remove_overlay(&mut self, id: OverlayId) {
            self.calls.push(Call::Remove(id));
        }

        fn pan_to(&mut self, center: LonLat) {
            self.calls.push(Call::Pan(center));
        }
    }

    fn one_point() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [-0.1, 51.5]}}
            ]
        })
    }

    #[test]
    fn replaces_previous_overlay_before_adding() {
        let mut surface = RecordingSurface::default();
        let mut ctl = OverlayController::new(GeoCentroid);

        let first = ctl.render(&mut surface, &one_point());
        let second = ctl.render(&mut surface, &one_point());
        assert_ne!(first.overlay, second.overlay);
        assert_eq!(ctl.active(), Some(second.overlay));

        let center = LonLat::new(-0.1, 51.5);
        assert_eq!(
            surface.calls,
            vec![
                Call::Add(first.overlay, 1),
                Call::Pan(center),
                Call::Remove(first.overlay),
                Call::Add(second.overlay, 1),
                Call::Pan(center),
            ]
        );
    }

    #[test]
    fn empty_document_renders_without_recentring() {
        let mut surface = RecordingSurface::default();
        let mut ctl = OverlayController::new(GeoCentroid);
        let out = ctl.render(
            &mut surface,
            &json!({"type": "FeatureCollection", "features": []}),
        );
        assert_eq!(out.recentered, None);
        assert_eq!(surface.calls, vec![Call::Add(out.overlay, 0)]);
    }

    #[test]
    fn point_lookup_uses_active_overlay() {
        let mut surface = RecordingSurface::default();
        let mut ctl = OverlayController::new(GeoCentroid);
        assert_eq!(ctl.point_at(0), None);
        ctl.render(&mut surface, &one_point());
        assert_eq!(
            ctl.point_at(0).map(|p| p.position),
            Some(LonLat::new(-0.1, 51.5))
        );
        assert_eq!(ctl.point_at(1), None);
    }
}
