//! Drag-resize gesture state machine.
//!
//! One session covers one drag: armed on pointer-down inside the edge zone,
//! fed pointer-move samples while dragging, finished on pointer-up. Visual
//! width updates are computed for every sample; link rewrites are throttled
//! so the editor is not flooded with transactions mid-drag. Samples carry
//! their own timestamps, so the machine is deterministic under test.
//!
//! The session never touches the document itself: it hands widths back to
//! the caller, which drives the match/apply pipeline.

use std::time::Duration;

use web_time::Instant;

use crate::link::file_base_name;

/// Minimum spacing between link rewrites during a drag.
const REWRITE_INTERVAL: Duration = Duration::from_millis(100);

/// Pointer must travel this many pixels horizontally since the last rewrite
/// before another is issued.
const REWRITE_MIN_DX: f64 = 2.0;

/// Gesture-level limits, combined from settings and host layout.
#[derive(Clone, Debug, Copy, PartialEq)]
pub struct ResizeConstraints {
    /// Smallest width a drag can produce.
    pub min_width: u32,
    /// Snap the release width to a multiple of this; 0 or 1 disables.
    pub snap_interval: u32,
    /// Pointer-down must fall within this many pixels of an element edge.
    pub edge_size: f64,
}

impl Default for ResizeConstraints {
    fn default() -> Self {
        Self {
            min_width: 30,
            snap_interval: 0,
            edge_size: 8.0,
        }
    }
}

#[derive(Clone, Debug, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounding box of the rendered element, in the same coordinate space as
/// the pointer.
#[derive(Clone, Debug, Copy, PartialEq)]
pub struct ElementBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementBox {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Which edge of the element the drag started from.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

/// The link a rewrite should be keyed by, resolved from the rendered
/// element before the drag starts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkKey {
    /// A vault attachment, addressed by file name.
    Internal { name: String },
    /// A remote embed, addressed by URL and caption.
    External { url: String, alt: String },
}

/// Resolve the rewrite key for a rendered element.
///
/// Network-scheme sources are external links. Embedded drawings resolve by
/// their base name with the extension stripped (their source files render
/// under a derived name). Everything else takes the file name from the
/// embedding ancestor's `src`.
pub fn resolve_link_key(
    src: &str,
    alt: &str,
    embedded_drawing: bool,
    ancestor_src: Option<&str>,
) -> Option<LinkKey> {
    if src.starts_with("http://") || src.starts_with("https://") {
        return Some(LinkKey::External {
            url: src.to_string(),
            alt: alt.to_string(),
        });
    }
    if embedded_drawing {
        let file = src.rsplit('/').next().unwrap_or(src);
        let name = file.rfind('.').map_or(file, |idx| &file[..idx]);
        return Some(LinkKey::Internal {
            name: name.to_string(),
        });
    }
    ancestor_src
        .and_then(file_base_name)
        .map(|name| LinkKey::Internal {
            name: name.to_string(),
        })
}

/// Visual update for one pointer-move sample.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct MoveUpdate {
    /// Width to show immediately (every sample, unthrottled).
    pub width: u32,
    /// Height derived from width; original aspect ratio is preserved.
    pub height: u32,
    /// Width to push through the link-rewrite pipeline, when throttling
    /// allows one this sample.
    pub rewrite: Option<u32>,
}

/// Ephemeral state for one drag gesture. Nothing survives pointer-up.
#[derive(Clone, Debug)]
pub struct ResizeSession {
    key: LinkKey,
    edge: Edge,
    anchor: Point,
    start_width: f64,
    start_height: f64,
    constraints: ResizeConstraints,
    current_width: u32,
    /// Pointer x and time of the last issued rewrite.
    last_rewrite: Option<(f64, Instant)>,
    /// Whether the last width change grew the element.
    growing: bool,
}

impl ResizeSession {
    /// Arm a session from a pointer-down.
    ///
    /// Returns None when the pointer is not within the edge zone — interior
    /// presses never arm a resize.
    pub fn arm(
        key: LinkKey,
        bounds: &ElementBox,
        pointer: Point,
        constraints: ResizeConstraints,
    ) -> Option<Self> {
        let edge = hit_edge(bounds, pointer, constraints.edge_size)?;
        tracing::trace!(target: "embedflow::resize", ?edge, ?key, "armed");
        Some(Self {
            key,
            edge,
            anchor: pointer,
            start_width: bounds.width,
            start_height: bounds.height,
            constraints,
            current_width: bounds.width.round() as u32,
            last_rewrite: None,
            growing: false,
        })
    }

    pub fn key(&self) -> &LinkKey {
        &self.key
    }

    pub fn edge(&self) -> Edge {
        self.edge
    }

    /// Feed one pointer-move sample.
    ///
    /// The visual size in the returned update applies to every sample; the
    /// `rewrite` width is present at most once per [`REWRITE_INTERVAL`] and
    /// only after the pointer moved [`REWRITE_MIN_DX`] px since the last
    /// rewrite.
    pub fn pointer_move(&mut self, pointer: Point, at: Instant) -> MoveUpdate {
        let dx = match self.edge {
            Edge::Left => self.anchor.x - pointer.x,
            Edge::Right | Edge::Top | Edge::Bottom => pointer.x - self.anchor.x,
        };

        let width = (self.start_width + dx).max(self.constraints.min_width as f64);
        let width = width.round() as u32;
        let height = self.derive_height(width);

        if width != self.current_width {
            self.growing = width > self.current_width;
            self.current_width = width;
        }

        let rewrite = match self.last_rewrite {
            None => true,
            Some((last_x, last_at)) => {
                at.duration_since(last_at) >= REWRITE_INTERVAL
                    && (pointer.x - last_x).abs() > REWRITE_MIN_DX
            }
        };
        let rewrite = if rewrite {
            self.last_rewrite = Some((pointer.x, at));
            Some(width)
        } else {
            None
        };

        MoveUpdate {
            width,
            height,
            rewrite,
        }
    }

    /// End the gesture on pointer-up.
    ///
    /// With a snap interval `k > 1` the final width is rounded down to a
    /// multiple of `k`, plus `k` when the last movement was growing, and one
    /// final rewrite is due at that width. Otherwise the last throttled
    /// rewrite stands and None is returned.
    pub fn release(self) -> Option<u32> {
        let k = self.constraints.snap_interval;
        if k <= 1 {
            return None;
        }
        let base = (self.current_width / k) * k;
        let snapped = if self.growing { base + k } else { base };
        let snapped = snapped.max(self.constraints.min_width);
        tracing::trace!(
            target: "embedflow::resize",
            width = self.current_width,
            snapped,
            "released"
        );
        Some(snapped)
    }

    fn derive_height(&self, width: u32) -> u32 {
        if self.start_width <= 0.0 {
            return 0;
        }
        (width as f64 * self.start_height / self.start_width).round() as u32
    }
}

/// Edge under the pointer, if any. Picks the nearest side when the pointer
/// is inside the box and within `edge_size` of its boundary.
fn hit_edge(bounds: &ElementBox, pointer: Point, edge_size: f64) -> Option<Edge> {
    let inside = pointer.x >= bounds.left
        && pointer.x <= bounds.right()
        && pointer.y >= bounds.top
        && pointer.y <= bounds.bottom();
    if !inside {
        return None;
    }

    let distances = [
        (pointer.x - bounds.left, Edge::Left),
        (bounds.right() - pointer.x, Edge::Right),
        (pointer.y - bounds.top, Edge::Top),
        (bounds.bottom() - pointer.y, Edge::Bottom),
    ];
    distances
        .into_iter()
        .filter(|(distance, _)| *distance <= edge_size)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, edge)| edge)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> ElementBox {
        ElementBox {
            left: 100.0,
            top: 100.0,
            width: 400.0,
            height: 200.0,
        }
    }

    fn key() -> LinkKey {
        LinkKey::Internal {
            name: "pic.png".to_string(),
        }
    }

    fn armed(constraints: ResizeConstraints) -> ResizeSession {
        // Right edge, vertically centered.
        ResizeSession::arm(key(), &bounds(), Point::new(498.0, 200.0), constraints).unwrap()
    }

    #[test]
    fn test_interior_press_does_not_arm() {
        let session = ResizeSession::arm(
            key(),
            &bounds(),
            Point::new(300.0, 200.0),
            ResizeConstraints::default(),
        );
        assert!(session.is_none());
    }

    #[test]
    fn test_edge_detection() {
        let b = bounds();
        let e = 8.0;
        assert_eq!(hit_edge(&b, Point::new(103.0, 200.0), e), Some(Edge::Left));
        assert_eq!(hit_edge(&b, Point::new(497.0, 200.0), e), Some(Edge::Right));
        assert_eq!(hit_edge(&b, Point::new(300.0, 104.0), e), Some(Edge::Top));
        assert_eq!(
            hit_edge(&b, Point::new(300.0, 297.0), e),
            Some(Edge::Bottom)
        );
        assert_eq!(hit_edge(&b, Point::new(300.0, 200.0), e), None);
        // Outside the box entirely.
        assert_eq!(hit_edge(&b, Point::new(99.0, 200.0), e), None);
    }

    #[test]
    fn test_width_follows_pointer_with_aspect() {
        let mut session = armed(ResizeConstraints::default());
        let t0 = Instant::now();
        let update = session.pointer_move(Point::new(548.0, 200.0), t0);
        assert_eq!(update.width, 450);
        // 2:1 aspect preserved.
        assert_eq!(update.height, 225);
        assert_eq!(update.rewrite, Some(450));
    }

    #[test]
    fn test_left_edge_grows_leftward() {
        let mut session = ResizeSession::arm(
            key(),
            &bounds(),
            Point::new(102.0, 200.0),
            ResizeConstraints::default(),
        )
        .unwrap();
        let update = session.pointer_move(Point::new(52.0, 200.0), Instant::now());
        assert_eq!(update.width, 450);
    }

    #[test]
    fn test_rewrite_throttled_within_interval() {
        let mut session = armed(ResizeConstraints::default());
        let t0 = Instant::now();
        assert!(
            session
                .pointer_move(Point::new(520.0, 200.0), t0)
                .rewrite
                .is_some()
        );

        // 50 ms later: visual update yes, rewrite no.
        let update = session.pointer_move(Point::new(560.0, 200.0), t0 + Duration::from_millis(50));
        assert_eq!(update.width, 462);
        assert_eq!(update.rewrite, None);

        // 120 ms after the first rewrite, with enough travel: rewrite fires.
        let update =
            session.pointer_move(Point::new(580.0, 200.0), t0 + Duration::from_millis(120));
        assert_eq!(update.rewrite, Some(482));
    }

    #[test]
    fn test_rewrite_needs_horizontal_travel() {
        let mut session = armed(ResizeConstraints::default());
        let t0 = Instant::now();
        session.pointer_move(Point::new(520.0, 200.0), t0);
        // Plenty of time but barely any travel.
        let update =
            session.pointer_move(Point::new(521.0, 200.0), t0 + Duration::from_millis(500));
        assert_eq!(update.rewrite, None);
    }

    #[test]
    fn test_minimum_width_clamp() {
        let mut session = armed(ResizeConstraints::default());
        let update = session.pointer_move(Point::new(0.0, 200.0), Instant::now());
        assert_eq!(update.width, 30);
    }

    #[test]
    fn test_release_without_snap() {
        let mut session = armed(ResizeConstraints::default());
        session.pointer_move(Point::new(548.0, 200.0), Instant::now());
        assert_eq!(session.release(), None);
    }

    #[test]
    fn test_release_snaps_up_when_growing() {
        let mut session = armed(ResizeConstraints {
            snap_interval: 50,
            ..ResizeConstraints::default()
        });
        session.pointer_move(Point::new(563.0, 200.0), Instant::now());
        // 465 grown from 400: floor to 450, then +50 for the growing drag.
        assert_eq!(session.release(), Some(500));
    }

    #[test]
    fn test_release_snaps_down_when_shrinking() {
        let mut session = armed(ResizeConstraints {
            snap_interval: 50,
            ..ResizeConstraints::default()
        });
        session.pointer_move(Point::new(433.0, 200.0), Instant::now());
        // 335 shrunk from 400: floor to 300.
        assert_eq!(session.release(), Some(300));
    }

    #[test]
    fn test_resolve_link_key_dispatch() {
        assert_eq!(
            resolve_link_key("https://host/img.png", "alt", false, None),
            Some(LinkKey::External {
                url: "https://host/img.png".to_string(),
                alt: "alt".to_string(),
            })
        );
        assert_eq!(
            resolve_link_key("drawings/sketch.svg", "", true, None),
            Some(LinkKey::Internal {
                name: "sketch".to_string(),
            })
        );
        assert_eq!(
            resolve_link_key("blob:internal", "", false, Some("attachments/pic.png")),
            Some(LinkKey::Internal {
                name: "pic.png".to_string(),
            })
        );
        assert_eq!(resolve_link_key("blob:internal", "", false, None), None);
    }
}
