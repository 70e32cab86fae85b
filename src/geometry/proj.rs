use anyhow::{Context, Result, anyhow};
use geo::{Coord, MapCoords, MultiPolygon, Rect};
use proj4rs::{proj::Proj as Proj4, transform::transform};

/// Source geographic CRS (degrees → radians handled in code).
/// SIRGAS 2000 is WGS84-compatible at adjacency tolerances.
const SOURCE_GEOG_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

/// Build the PROJ.4 string for the target UTM CRS, chosen from the dataset's
/// lon/lat bounding-box center.
fn utm_proj4(bounds: Option<Rect<f64>>) -> String {
    let center = if let Some(b) = bounds { b.center() }
    else { Coord { x: -53.0, y: -11.0 } }; // Brazil geographic center (fallback)

    let zone = (((center.x + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u32;
    let south = if center.y >= 0.0 { "" } else { " +south" };

    format!("+proj=utm +zone={zone}{south} +datum=WGS84 +units=m +no_defs +type=crs")
}

/// Reproject shapes from lon/lat to a metric CRS for Euclidean distance
/// calculations (UTM).
pub(crate) fn reproject_to_metric(
    shapes: &[MultiPolygon<f64>],
    bounds: Option<Rect<f64>>,
) -> Result<Vec<MultiPolygon<f64>>> {
    let from = Proj4::from_proj_string(SOURCE_GEOG_PROJ4)
        .with_context(|| anyhow!("failed to build source PROJ.4: {SOURCE_GEOG_PROJ4}"))?;

    let to = {
        let proj_string = utm_proj4(bounds);
        Proj4::from_proj_string(&proj_string)
            .with_context(|| anyhow!("failed to build target PROJ.4: {proj_string}"))?
    };

    // Map coords → radians in, meters out.
    let projected = shapes
        .iter()
        .map(|shape| {
            shape.map_coords(|coord: Coord<f64>| {
                let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
                transform(&from, &to, &mut point).expect("CRS transform failed");
                Coord { x: point.0, y: point.1 } // UTM meters
            })
        })
        .collect();

    Ok(projected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn southern_hemisphere_gets_the_south_flag() {
        let bounds = Rect::new(Coord { x: -48.0, y: -16.0 }, Coord { x: -46.0, y: -14.0 });
        let proj = utm_proj4(Some(bounds));
        assert!(proj.contains("+south"), "{proj}");
        assert!(proj.contains("+zone=23"), "{proj}");
    }

    #[test]
    fn fallback_center_is_used_without_bounds() {
        let proj = utm_proj4(None);
        assert!(proj.contains("+zone=22"), "{proj}");
        assert!(proj.contains("+south"), "{proj}");
    }
}
