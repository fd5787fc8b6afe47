//! Image layout planning for feed posts.
//!
//! The layout mode depends only on how many images a post has:
//!
//! ```text
//! 1 image   → single   full container width, natural height, no scrolling
//! 2 images  → pair     two squares of width/2, bordered, side by side
//! 3+ images → strip    squares of width/2.5, bordered, horizontal scroll
//! ```
//!
//! Plans are plain data and fully deterministic: the same URLs and width
//! always produce an equal plan. Every tile keeps its zero-based position so
//! the full-screen viewer can open at the tapped image.
//!
//! All functions here are pure and testable without any I/O.

use serde::Serialize;

pub const PAIR_DIVISOR: f64 = 2.0;
pub const STRIP_DIVISOR: f64 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    Single,
    Pair,
    Strip,
}

impl LayoutMode {
    /// Pick the mode for an image count. `None` when there is nothing to lay out.
    pub fn for_count(count: usize) -> Option<Self> {
        match count {
            0 => None,
            1 => Some(Self::Single),
            2 => Some(Self::Pair),
            _ => Some(Self::Strip),
        }
    }

    pub fn scrollable(self) -> bool {
        matches!(self, Self::Strip)
    }
}

/// Border drawn around thumbnail tiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BorderStyle {
    pub width: f64,
    pub radius: f64,
    pub color: String,
}

impl Default for BorderStyle {
    fn default() -> Self {
        Self {
            width: 2.0,
            radius: 10.0,
            color: "white".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "fit", rename_all = "snake_case")]
pub enum TileGeometry {
    /// Image spans the container width; height follows the image's own aspect.
    FullWidth { width: f64 },
    /// Cover-cropped square thumbnail.
    Square { size: f64, border: BorderStyle },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageTile {
    /// Zero-based position, also the index the viewer opens at.
    pub index: usize,
    pub url: String,
    pub geometry: TileGeometry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageLayoutPlan {
    pub mode: LayoutMode,
    pub scrollable: bool,
    pub tiles: Vec<ImageTile>,
    /// Image list handed to the full-screen viewer, in post order.
    pub viewer_urls: Vec<String>,
}

impl ImageLayoutPlan {
    /// Viewer position for a tapped tile.
    pub fn viewer_index(&self, tile: usize) -> Option<usize> {
        self.tiles.get(tile).map(|t| t.index)
    }
}

/// Plans image layouts with a fixed border treatment.
#[derive(Debug, Clone, Default)]
pub struct ImageLayoutPlanner {
    pub border: BorderStyle,
}

impl ImageLayoutPlanner {
    pub fn new(border: BorderStyle) -> Self {
        Self { border }
    }

    /// Lay out `urls` inside a container `container_width` wide.
    ///
    /// Returns `None` for a post without images.
    pub fn plan(&self, urls: &[String], container_width: f64) -> Option<ImageLayoutPlan> {
        let mode = LayoutMode::for_count(urls.len())?;
        let geometry = match mode {
            LayoutMode::Single => TileGeometry::FullWidth {
                width: container_width,
            },
            LayoutMode::Pair => TileGeometry::Square {
                size: container_width / PAIR_DIVISOR,
                border: self.border.clone(),
            },
            LayoutMode::Strip => TileGeometry::Square {
                size: container_width / STRIP_DIVISOR,
                border: self.border.clone(),
            },
        };

        let tiles = urls
            .iter()
            .enumerate()
            .map(|(index, url)| ImageTile {
                index,
                url: url.clone(),
                geometry: geometry.clone(),
            })
            .collect();

        Some(ImageLayoutPlan {
            mode,
            scrollable: mode.scrollable(),
            tiles,
            viewer_urls: urls.to_vec(),
        })
    }
}

/// Width available to a post: the window minus the post's horizontal margins.
pub fn container_width(window_width: f64, margin_horizontal: f64) -> f64 {
    (window_width - 2.0 * margin_horizontal).max(0.0)
}

/// Scale a cover image to the window width, preserving its aspect ratio.
///
/// # Returns
/// * `Some((width, height))` - Display size
/// * `None` - The asset has a zero dimension
pub fn cover_geometry(asset: (u32, u32), window_width: f64) -> Option<(f64, f64)> {
    let (w, h) = asset;
    if w == 0 || h == 0 {
        return None;
    }
    let ratio = w as f64 / h as f64;
    Some((window_width, window_width / ratio))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(n: usize) -> Vec<String> {
        (0..n)
            .map(|i| format!("https://img.example/{i}.jpg"))
            .collect()
    }

    // =========================================================================
    // Mode selection
    // =========================================================================

    #[test]
    fn no_images_no_plan() {
        assert!(ImageLayoutPlanner::default().plan(&[], 400.0).is_none());
    }

    #[test]
    fn one_image_is_single_full_width() {
        let plan = ImageLayoutPlanner::default().plan(&urls(1), 400.0).unwrap();
        assert_eq!(plan.mode, LayoutMode::Single);
        assert!(!plan.scrollable);
        assert_eq!(plan.tiles[0].geometry, TileGeometry::FullWidth { width: 400.0 });
    }

    #[test]
    fn two_images_are_half_width_squares() {
        let plan = ImageLayoutPlanner::default().plan(&urls(2), 400.0).unwrap();
        assert_eq!(plan.mode, LayoutMode::Pair);
        assert!(!plan.scrollable);
        for tile in &plan.tiles {
            match &tile.geometry {
                TileGeometry::Square { size, border } => {
                    assert_eq!(*size, 200.0);
                    assert_eq!(*border, BorderStyle::default());
                }
                other => panic!("expected square, got {other:?}"),
            }
        }
    }

    #[test]
    fn three_images_scroll_as_a_strip() {
        let plan = ImageLayoutPlanner::default().plan(&urls(3), 400.0).unwrap();
        assert_eq!(plan.mode, LayoutMode::Strip);
        assert!(plan.scrollable);
        assert!(matches!(
            plan.tiles[2].geometry,
            TileGeometry::Square { size, .. } if size == 160.0
        ));
    }

    #[test]
    fn many_images_stay_a_strip() {
        let plan = ImageLayoutPlanner::default().plan(&urls(9), 400.0).unwrap();
        assert_eq!(plan.mode, LayoutMode::Strip);
        assert_eq!(plan.tiles.len(), 9);
    }

    // =========================================================================
    // Determinism and viewer mapping
    // =========================================================================

    #[test]
    fn identical_inputs_give_identical_plans() {
        let planner = ImageLayoutPlanner::default();
        for n in 1..=4 {
            let a = planner.plan(&urls(n), 365.0).unwrap();
            let b = planner.plan(&urls(n), 365.0).unwrap();
            assert_eq!(a, b);
            assert_eq!(
                serde_json::to_string(&a).unwrap(),
                serde_json::to_string(&b).unwrap()
            );
        }
    }

    #[test]
    fn every_tile_maps_to_its_viewer_position() {
        let plan = ImageLayoutPlanner::default().plan(&urls(4), 400.0).unwrap();
        assert_eq!(plan.viewer_urls, urls(4));
        for (i, tile) in plan.tiles.iter().enumerate() {
            assert_eq!(plan.viewer_index(i), Some(i));
            assert_eq!(plan.viewer_urls[tile.index], tile.url);
        }
        assert_eq!(plan.viewer_index(4), None);
    }

    #[test]
    fn custom_border_is_applied() {
        let border = BorderStyle {
            width: 1.0,
            radius: 4.0,
            color: "#eee".into(),
        };
        let plan = ImageLayoutPlanner::new(border.clone())
            .plan(&urls(2), 100.0)
            .unwrap();
        assert!(matches!(&plan.tiles[0].geometry, TileGeometry::Square { border: b, .. } if *b == border));
    }

    // =========================================================================
    // Container and cover geometry
    // =========================================================================

    #[test]
    fn container_width_subtracts_both_margins() {
        assert_eq!(container_width(375.0, 5.0), 365.0);
    }

    #[test]
    fn container_width_never_negative() {
        assert_eq!(container_width(6.0, 5.0), 0.0);
    }

    #[test]
    fn cover_scales_to_window_width() {
        // 1000x500 (2:1) on a 400 wide window → 400x200
        assert_eq!(cover_geometry((1000, 500), 400.0), Some((400.0, 200.0)));
    }

    #[test]
    fn cover_with_zero_dimension_has_no_geometry() {
        assert_eq!(cover_geometry((0, 500), 400.0), None);
        assert_eq!(cover_geometry((500, 0), 400.0), None);
    }
}
