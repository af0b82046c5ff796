//! Pan/zoom state of the venue map viewer

use serde::Serialize;

use super::{LocationProvider, Point, Size};
use crate::models::Exhibitor;

pub const ZOOM_STEP: f64 = 0.2;
pub const MIN_ZOOM: f64 = 0.6;
pub const MAX_ZOOM: f64 = 2.0;
pub const DEFAULT_ZOOM: f64 = 1.0;

/// Tooltip anchor relative to the marker centre
const TOOLTIP_OFFSET: Point = Point::new(14.0, -14.0);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// `start` is the pointer position minus the offset at pointer-down
    Dragging { start: Point },
}

/// A marker as laid out on screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerView {
    pub exhibitor_id: i64,
    pub name: String,
    pub category: String,
    /// Position on the map image
    pub position: Point,
    /// Position inside the viewport at the current pan/zoom
    pub screen: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub exhibitor_id: i64,
    pub name: String,
    pub category: String,
    pub position: Point,
}

#[derive(Debug, Clone)]
pub struct MapViewer {
    exhibitors: Vec<Exhibitor>,
    viewport: Size,
    zoom: f64,
    offset: Point,
    drag: DragState,
    hovered: Option<i64>,
    selected: Option<i64>,
    user_location: Option<Point>,
}

fn snap(zoom: f64) -> f64 {
    (zoom.clamp(MIN_ZOOM, MAX_ZOOM) * 10.0).round() / 10.0
}

impl MapViewer {
    pub fn new(exhibitors: Vec<Exhibitor>, viewport: Size) -> Self {
        Self {
            exhibitors,
            viewport,
            zoom: DEFAULT_ZOOM,
            offset: Point::default(),
            drag: DragState::Idle,
            hovered: None,
            selected: None,
            user_location: None,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn resize(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn pointer_down(&mut self, at: Point) {
        self.drag = DragState::Dragging {
            start: at - self.offset,
        };
    }

    pub fn pointer_move(&mut self, at: Point) {
        if let DragState::Dragging { start } = self.drag {
            self.offset = at - start;
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag = DragState::Idle;
    }

    pub fn pointer_leave(&mut self) {
        self.drag = DragState::Idle;
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    /// Change the zoom level keeping the map point under the viewport centre fixed.
    /// Non-finite levels are ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            return;
        }
        let next = snap(zoom);
        if next == self.zoom {
            return;
        }
        let center = self.viewport.center();
        let anchor = (center - self.offset) / self.zoom;
        self.offset = center - anchor * next;
        self.zoom = next;
    }

    /// Map image point currently shown at the viewport centre
    pub fn center_point(&self) -> Point {
        (self.viewport.center() - self.offset) / self.zoom
    }

    pub fn to_screen(&self, position: Point) -> Point {
        position * self.zoom + self.offset
    }

    pub fn marker(&self, exhibitor: &Exhibitor) -> Option<MarkerView> {
        let pos = exhibitor.map_position?;
        let position = Point::new(pos.x, pos.y);
        Some(MarkerView {
            exhibitor_id: exhibitor.id,
            name: exhibitor.name.clone(),
            category: exhibitor.category.clone(),
            position,
            screen: self.to_screen(position),
        })
    }

    pub fn markers(&self) -> Vec<MarkerView> {
        self.exhibitors.iter().filter_map(|e| self.marker(e)).collect()
    }

    fn find(&self, id: i64) -> Option<&Exhibitor> {
        self.exhibitors.iter().find(|e| e.id == id)
    }

    pub fn hover(&mut self, id: i64) -> Option<Tooltip> {
        self.hovered = self.find(id).map(|e| e.id);
        self.tooltip()
    }

    pub fn hover_clear(&mut self) {
        self.hovered = None;
    }

    pub fn tooltip(&self) -> Option<Tooltip> {
        let marker = self.find(self.hovered?).and_then(|e| self.marker(e))?;
        Some(Tooltip {
            exhibitor_id: marker.exhibitor_id,
            name: marker.name,
            category: marker.category,
            position: marker.screen + TOOLTIP_OFFSET,
        })
    }

    /// Open the detail panel; unknown ids leave it closed
    pub fn select(&mut self, id: i64) -> Option<&Exhibitor> {
        self.selected = self.find(id).map(|e| e.id);
        self.detail()
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }

    pub fn detail(&self) -> Option<&Exhibitor> {
        self.find(self.selected?)
    }

    pub async fn locate_user(&mut self, provider: &dyn LocationProvider) -> anyhow::Result<Point> {
        let position = provider.locate().await?;
        self.user_location = Some(position);
        Ok(position)
    }

    pub fn user_location(&self) -> Option<Point> {
        self.user_location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::SimulatedLocation;
    use crate::models::MapPosition;
    use proptest::prelude::*;
    use std::time::Duration;

    fn exhibitor(id: i64, name: &str, position: Option<(f64, f64)>) -> Exhibitor {
        let mut e = Exhibitor::new(name.to_string(), "Máquinas".to_string());
        e.id = id;
        e.map_position = position.map(|(x, y)| MapPosition { x, y });
        e
    }

    fn viewer() -> MapViewer {
        MapViewer::new(
            vec![
                exhibitor(1, "AgroTech", Some((100.0, 200.0))),
                exhibitor(2, "Sem Posição", None),
                exhibitor(3, "Irriga Mais", Some((640.0, 90.0))),
            ],
            Size::new(800.0, 600.0),
        )
    }

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn test_drag_cycle() {
        let mut v = viewer();
        v.pointer_move(Point::new(50.0, 50.0));
        assert_eq!(v.offset(), Point::default());

        v.pointer_down(Point::new(10.0, 10.0));
        v.pointer_move(Point::new(40.0, 25.0));
        assert_eq!(v.offset(), Point::new(30.0, 15.0));

        v.pointer_up();
        assert_eq!(v.drag_state(), DragState::Idle);
        v.pointer_move(Point::new(500.0, 500.0));
        assert_eq!(v.offset(), Point::new(30.0, 15.0));

        // A second drag continues from the current offset
        v.pointer_down(Point::new(0.0, 0.0));
        v.pointer_move(Point::new(-10.0, 5.0));
        assert_eq!(v.offset(), Point::new(20.0, 20.0));
        v.pointer_leave();
        assert_eq!(v.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_zoom_is_stepped_and_clamped() {
        let mut v = viewer();
        for _ in 0..10 {
            v.zoom_in();
        }
        assert_eq!(v.zoom(), MAX_ZOOM);

        for _ in 0..3 {
            v.zoom_out();
        }
        assert_eq!(v.zoom(), 1.4);

        for _ in 0..10 {
            v.zoom_out();
        }
        assert_eq!(v.zoom(), MIN_ZOOM);

        v.set_zoom(1.23);
        assert_eq!(v.zoom(), 1.2);
    }

    #[test]
    fn test_non_finite_zoom_is_ignored() {
        let mut v = viewer();
        v.set_zoom(1.4);
        let offset = v.offset();
        for zoom in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            v.set_zoom(zoom);
            assert_eq!(v.zoom(), 1.4);
            assert_eq!(v.offset(), offset);
        }
    }

    #[test]
    fn test_markers_skip_missing_positions() {
        let mut v = viewer();
        let markers = v.markers();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].screen, Point::new(100.0, 200.0));

        v.pointer_down(Point::new(0.0, 0.0));
        v.pointer_move(Point::new(10.0, 20.0));
        v.pointer_up();
        v.zoom_in();
        let marker = v.marker(&exhibitor(9, "X", Some((100.0, 100.0)))).unwrap();
        assert!(close(marker.screen, Point::new(100.0, 100.0) * 1.2 + v.offset()));
        assert!(v.marker(&exhibitor(2, "Sem Posição", None)).is_none());
    }

    #[test]
    fn test_hover_and_detail() {
        let mut v = viewer();
        let tooltip = v.hover(3).unwrap();
        assert_eq!(tooltip.name, "Irriga Mais");
        assert_eq!(tooltip.position, Point::new(654.0, 76.0));

        assert!(v.hover(2).is_none());
        v.hover(1);
        v.hover_clear();
        assert!(v.tooltip().is_none());

        assert_eq!(v.select(1).map(|e| e.name.as_str()), Some("AgroTech"));
        assert!(v.detail().is_some());
        v.close_detail();
        assert!(v.detail().is_none());
        assert!(v.select(42).is_none());
    }

    #[tokio::test]
    async fn test_locate_user() {
        let mut v = viewer();
        assert!(v.user_location().is_none());
        let provider = SimulatedLocation::new(Duration::from_millis(1), Point::new(5.0, 6.0));
        let position = v.locate_user(&provider).await.unwrap();
        assert_eq!(position, Point::new(5.0, 6.0));
        assert_eq!(v.user_location(), Some(position));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_zoom_stays_in_bounds(steps in prop::collection::vec(any::<bool>(), 0..30), target in -5.0f64..5.0) {
            let mut v = viewer();
            for zoom_in in steps {
                if zoom_in { v.zoom_in() } else { v.zoom_out() }
                prop_assert!((MIN_ZOOM..=MAX_ZOOM).contains(&v.zoom()));
            }
            v.set_zoom(target);
            prop_assert!((MIN_ZOOM..=MAX_ZOOM).contains(&v.zoom()));
        }

        #[test]
        fn prop_zoom_keeps_center(dx in -300.0f64..300.0, dy in -300.0f64..300.0, steps in prop::collection::vec(any::<bool>(), 1..10)) {
            let mut v = viewer();
            v.pointer_down(Point::new(0.0, 0.0));
            v.pointer_move(Point::new(dx, dy));
            v.pointer_up();

            let before = v.center_point();
            for zoom_in in steps {
                if zoom_in { v.zoom_in() } else { v.zoom_out() }
                let after = v.center_point();
                prop_assert!((after.x - before.x).abs() < 1e-6);
                prop_assert!((after.y - before.y).abs() < 1e-6);
            }
        }
    }
}
