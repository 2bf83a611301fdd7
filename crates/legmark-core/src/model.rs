use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned rectangle in page coordinates (origin top-left, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        BBox { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn center_y(&self) -> f64 {
        (self.y0 + self.y1) / 2.0
    }

    /// True for empty, inverted or non-finite boxes.
    pub fn is_degenerate(&self) -> bool {
        // Written as a negation so NaN coordinates count as degenerate.
        !(self.x1 > self.x0 && self.y1 > self.y0)
    }

    /// Intersection of two boxes, or `None` if they do not overlap with positive area.
    pub fn intersect(&self, other: &BBox) -> Option<BBox> {
        let bbox = BBox {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        if bbox.is_degenerate() {
            None
        } else {
            Some(bbox)
        }
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

impl fmt::Display for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.1}, {:.1}, {:.1}, {:.1})",
            self.x0, self.y0, self.x1, self.y1
        )
    }
}

/// One extracted word with its box and strike state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub bbox: BBox,
    /// Set by the strikethrough pass; never read from the extraction backend.
    #[serde(default)]
    pub struck: bool,
}

impl Word {
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Word {
            text: text.into(),
            bbox,
            struck: false,
        }
    }

    /// Words with blank text or a degenerate box are never classified or compared.
    pub fn is_strikeable(&self) -> bool {
        !self.text.trim().is_empty() && !self.bbox.is_degenerate()
    }
}

/// Device color normalised to RGB components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub fn new(r: f64, g: f64, b: f64) -> Self {
        Rgb { r, g, b }
    }

    pub fn from_gray(gray: f64) -> Self {
        Rgb {
            r: gray,
            g: gray,
            b: gray,
        }
    }

    pub fn from_cmyk(c: f64, m: f64, y: f64, k: f64) -> Self {
        Rgb {
            r: (1.0 - c) * (1.0 - k),
            g: (1.0 - m) * (1.0 - k),
            b: (1.0 - y) * (1.0 - k),
        }
    }

    /// Exactly (0, 0, 0). Near-black greys do not qualify.
    pub fn is_black(&self) -> bool {
        *self == Rgb::BLACK
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaintKind {
    Fill,
    Stroke,
    FillStroke,
}

impl fmt::Display for PaintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaintKind::Fill => write!(f, "f"),
            PaintKind::Stroke => write!(f, "s"),
            PaintKind::FillStroke => write!(f, "fs"),
        }
    }
}

/// A painted vector path, reduced to its bounding box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub kind: PaintKind,
    /// Fill color at paint time; `None` for stroke-only paths and pattern fills.
    #[serde(default)]
    pub fill: Option<Rgb>,
    pub bbox: BBox,
}

impl Drawing {
    pub fn filled(bbox: BBox, fill: Rgb) -> Self {
        Drawing {
            kind: PaintKind::Fill,
            fill: Some(fill),
            bbox,
        }
    }
}
