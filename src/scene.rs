// Scene of primitive drawing commands recorded by a canvas

use crate::layout::Point;
use crate::tier::FigureSize;

/// Points per inch, the unit node/font/arrow sizes are given in
pub const POINTS_PER_INCH: f64 = 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const SKYBLUE: Rgb = Rgb(135, 206, 235);
    pub const GRAY: Rgb = Rgb(128, 128, 128);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
}

/// Filled circular markers. `size` is the marker area in points squared.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStyle {
    pub color: Rgb,
    pub size: f64,
}

/// Arrows between node centers.
///
/// Both ends are pulled back by the radius of a `node_size` marker so the
/// arrowhead stops at the marker's edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStyle {
    pub color: Rgb,
    pub node_size: f64,
    pub arrow_size: f64,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    pub color: Rgb,
    pub font_size: f64,
    pub family: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    pub text: String,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    DrawNodes {
        points: Vec<Point>,
        style: NodeStyle,
    },
    DrawEdges {
        segments: Vec<(Point, Point)>,
        style: EdgeStyle,
    },
    DrawLabels {
        labels: Vec<(String, Point)>,
        style: LabelStyle,
    },
}

/// Everything needed to draw one figure.
/// Coordinates are layout space; the backend maps them to pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub figure: FigureSize,
    pub dpi: u32,
    pub title: Option<Title>,
    pub axis_visible: bool,
    pub commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn new(figure: FigureSize, dpi: u32) -> Self {
        Self {
            figure,
            dpi,
            title: None,
            axis_visible: true,
            commands: Vec::new(),
        }
    }

    /// Figure size in pixels at the scene's dpi
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = self.dpi as f64;
        (
            (self.figure.width * dpi).round().max(1.0) as u32,
            (self.figure.height * dpi).round().max(1.0) as u32,
        )
    }

    pub fn pt_to_px(&self, points: f64) -> f64 {
        points * self.dpi as f64 / POINTS_PER_INCH
    }

    /// Pixel radius of a marker whose area is `size` points squared
    pub fn marker_radius_px(&self, size: f64) -> f64 {
        self.pt_to_px(size.max(0.0).sqrt() / 2.0)
    }

    /// Largest marker radius among the node commands
    pub fn max_marker_radius_px(&self) -> f64 {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                DrawCommand::DrawNodes { style, .. } => Some(self.marker_radius_px(style.size)),
                _ => None,
            })
            .fold(0.0, f64::max)
    }
}
