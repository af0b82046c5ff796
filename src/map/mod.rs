//! Venue map
//!
//! A fixed-size background image of the fairground with one circular marker
//! per exhibitor that has a map position. [`MapViewer`] holds the pan/zoom
//! interaction state; [`LocationProvider`] abstracts "where is the visitor".

mod location;
mod viewer;

pub use location::{LocationProvider, SimulatedLocation, SIMULATED_DELAY, SIMULATED_POSITION};
pub use viewer::{DragState, MapViewer, MarkerView, Tooltip, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};

use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Pixel size of the venue map image
pub const MAP_SIZE: Size = Size {
    width: 1200.0,
    height: 800.0,
};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f64> for Point {
    type Output = Point;

    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}
