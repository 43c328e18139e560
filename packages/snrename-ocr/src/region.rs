#[derive(Debug, Clone, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// Axis-aligned box enclosing a flat `[x1, y1, x2, y2, ...]` polygon.
    pub fn from_polygon(points: &[f32]) -> Option<Self> {
        if points.len() < 4 || points.len() % 2 != 0 {
            return None;
        }

        let xs = points.iter().step_by(2);
        let ys = points.iter().skip(1).step_by(2);
        let (min_x, max_x) = xs.fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let (min_y, max_y) = ys.fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));

        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub bounding_box: Option<BoundingBox>,
}

impl TextLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bounding_box: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OcrPage {
    pub number: u32,
    pub lines: Vec<TextLine>,
}
