use formats::{Feature, Geometry};
use foundation::LonLat;
use geocoding::{GeocodeError, SearchCandidate};
use layers::SelectedPoint;
use tracing::debug;

/// What a candidate selection adds besides the candidate itself.
#[derive(Debug, Clone, PartialEq)]
pub enum AugmentPlan {
    Plain,
    /// Join the selected point (origin) to the candidate (destination).
    Route {
        origin: LonLat,
        destination: LonLat,
        from_feature: usize,
    },
}

impl AugmentPlan {
    pub fn route_request(&self) -> Option<(LonLat, LonLat)> {
        match self {
            AugmentPlan::Plain => None,
            AugmentPlan::Route {
                origin,
                destination,
                ..
            } => Some((*origin, *destination)),
        }
    }
}

/// Decides whether choosing `candidate` also produces a route.
pub fn plan(selected: Option<SelectedPoint>, candidate: &SearchCandidate) -> AugmentPlan {
    let Some(selected) = selected else {
        return AugmentPlan::Plain;
    };
    match candidate.geometry.first_position() {
        Some(destination) => AugmentPlan::Route {
            origin: selected.position,
            destination,
            from_feature: selected.feature_index,
        },
        None => {
            debug!("route skipped: candidate {:?} has no position", candidate.label);
            AugmentPlan::Plain
        }
    }
}

/// Turns the directions outcome into the extra LineString feature, if any.
///
/// A failed or missing route skips the augmentation; there is no retry.
pub fn route_feature(
    plan: &AugmentPlan,
    destination_label: &str,
    profile: &str,
    route: Option<Result<Vec<LonLat>, GeocodeError>>,
) -> Option<Feature> {
    let AugmentPlan::Route { from_feature, .. } = plan else {
        return None;
    };
    let positions = match route? {
        Ok(positions) => positions,
        Err(err) => {
            debug!("route skipped: {err}");
            return None;
        }
    };
    if positions.len() < 2 {
        debug!("route skipped: {} positions", positions.len());
        return None;
    }
    Some(
        Feature::new(Geometry::LineString(positions))
            .with_property("route", profile)
            .with_property("from_feature", *from_feature as u64)
            .with_property("to", destination_label),
    )
}

#[cfg(test)]
mod tests {
    use super::{AugmentPlan, plan, route_feature};
    use formats::Geometry;
    use foundation::LonLat;
    use geocoding::{GeocodeError, SearchCandidate};
    use layers::SelectedPoint;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn candidate() -> SearchCandidate {
        SearchCandidate {
            label: "Main St".to_string(),
            geometry: Geometry::Point(LonLat::new(-0.1, 51.5)),
        }
    }

    fn selected() -> SelectedPoint {
        SelectedPoint {
            feature_index: 3,
            position: LonLat::new(2.0, 48.0),
        }
    }

    #[test]
    fn no_selection_means_plain() {
        assert_eq!(plan(None, &candidate()), AugmentPlan::Plain);
        assert_eq!(AugmentPlan::Plain.route_request(), None);
    }

    #[test]
    fn selected_point_is_origin() {
        let p = plan(Some(selected()), &candidate());
        assert_eq!(
            p.route_request(),
            Some((LonLat::new(2.0, 48.0), LonLat::new(-0.1, 51.5)))
        );
    }

    #[test]
    fn empty_candidate_geometry_falls_back_to_plain() {
        let c = SearchCandidate {
            label: "x".to_string(),
            geometry: Geometry::LineString(vec![]),
        };
        assert_eq!(plan(Some(selected()), &c), AugmentPlan::Plain);
    }

    #[test]
    fn successful_route_becomes_line_feature() {
        let p = plan(Some(selected()), &candidate());
        let line = vec![LonLat::new(2.0, 48.0), LonLat::new(-0.1, 51.5)];
        let f = route_feature(&p, "Main St", "driving", Some(Ok(line))).expect("feature");
        assert_eq!(
            f.to_geojson_value(),
            json!({
                "type": "Feature",
                "geometry": {"type": "LineString", "coordinates": [[2.0, 48.0], [-0.1, 51.5]]},
                "properties": {"route": "driving", "from_feature": 3, "to": "Main St"}
            })
        );
    }

    #[test]
    fn failed_or_missing_route_is_skipped() {
        let p = plan(Some(selected()), &candidate());
        assert_eq!(
            route_feature(&p, "x", "driving", Some(Err(GeocodeError::Status(401)))),
            None
        );
        assert_eq!(route_feature(&p, "x", "driving", None), None);
        assert_eq!(
            route_feature(&p, "x", "driving", Some(Ok(vec![LonLat::new(0.0, 0.0)]))),
            None
        );
        assert_eq!(
            route_feature(&AugmentPlan::Plain, "x", "driving", Some(Ok(vec![]))),
            None
        );
    }
}
