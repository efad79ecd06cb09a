//! Retained scene graph
//!
//! Each widget owns one `Scene`: named layers of keyed elements in widget
//! units (origin top-left, y down). `join` binds a fresh element list to a
//! layer with enter/update/exit semantics keyed by element identity, never
//! by position. Front ends only read scenes; they never build them.

use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("Duplicate element key '{key}' in layer '{layer}'")]
    DuplicateKey { layer: String, key: String },

    #[error("Non-finite geometry for '{key}' in layer '{layer}'")]
    NonFiniteGeometry { layer: String, key: String },
}

/// RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    /// From a `0xRRGGBB` literal
    pub const fn hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        anchor: Anchor,
    },
    Polyline {
        points: Vec<(f64, f64)>,
    },
    /// Pictogram centred on (x, y)
    Icon {
        x: f64,
        y: f64,
        size: f64,
        glyph: char,
    },
}

impl Shape {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        match self {
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => px >= *x && px <= x + width && py >= *y && py <= y + height,
            Shape::Circle { cx, cy, r } => (px - cx).powi(2) + (py - cy).powi(2) <= r * r,
            Shape::Icon { x, y, size, .. } => {
                let half = size / 2.0;
                (px - x).abs() <= half && (py - y).abs() <= half
            }
            Shape::Text { .. } | Shape::Polyline { .. } => false,
        }
    }

    fn is_finite(&self) -> bool {
        match self {
            Shape::Rect {
                x,
                y,
                width,
                height,
            } => [x, y, width, height].iter().all(|v| v.is_finite()),
            Shape::Circle { cx, cy, r } => [cx, cy, r].iter().all(|v| v.is_finite()),
            Shape::Text { x, y, .. } => x.is_finite() && y.is_finite(),
            Shape::Polyline { points } => points.iter().all(|(x, y)| x.is_finite() && y.is_finite()),
            Shape::Icon { x, y, size, .. } => [x, y, size].iter().all(|v| v.is_finite()),
        }
    }
}

/// Interaction state flags of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classes {
    /// Matches the clicked/highlighted respondent
    pub clicked: bool,
    /// Outside the working set
    pub inactive: bool,
    /// Part of the active filter
    pub active: bool,
    /// The selected category
    pub selected: bool,
    /// Cosmetic hover highlight
    pub highlighted: bool,
}

impl Classes {
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub key: String,
    pub shape: Shape,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub classes: Classes,
    /// Tooltip / accessible label
    pub label: Option<String>,
    /// Receives pointer events
    pub interactive: bool,
}

impl Element {
    pub fn new(key: impl Into<String>, shape: Shape) -> Self {
        Self {
            key: key.into(),
            shape,
            fill: None,
            stroke: None,
            classes: Classes::default(),
            label: None,
            interactive: false,
        }
    }

    pub fn rect(key: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(
            key,
            Shape::Rect {
                x,
                y,
                width,
                height,
            },
        )
    }

    pub fn circle(key: impl Into<String>, cx: f64, cy: f64, r: f64) -> Self {
        Self::new(key, Shape::Circle { cx, cy, r })
    }

    pub fn text(key: impl Into<String>, x: f64, y: f64, text: impl Into<String>) -> Self {
        Self::new(
            key,
            Shape::Text {
                x,
                y,
                text: text.into(),
                anchor: Anchor::Start,
            },
        )
    }

    pub fn polyline(key: impl Into<String>, points: Vec<(f64, f64)>) -> Self {
        Self::new(key, Shape::Polyline { points })
    }

    pub fn icon(key: impl Into<String>, x: f64, y: f64, size: f64, glyph: char) -> Self {
        Self::new(key, Shape::Icon { x, y, size, glyph })
    }

    pub fn anchored(mut self, anchor: Anchor) -> Self {
        if let Shape::Text { anchor: a, .. } = &mut self.shape {
            *a = anchor;
        }
        self
    }

    pub fn fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn stroke(mut self, color: Color) -> Self {
        self.stroke = Some(color);
        self
    }

    pub fn classes(mut self, classes: Classes) -> Self {
        self.classes = classes;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn interactive(mut self) -> Self {
        self.interactive = true;
        self
    }
}

/// Outcome of a keyed join
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinSummary {
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
}

impl JoinSummary {
    pub fn is_noop(&self) -> bool {
        self.entered == 0 && self.updated == 0 && self.exited == 0
    }
}

impl std::ops::AddAssign for JoinSummary {
    fn add_assign(&mut self, other: Self) {
        self.entered += other.entered;
        self.updated += other.updated;
        self.exited += other.exited;
    }
}

#[derive(Debug, Clone)]
struct Layer {
    name: String,
    elements: Vec<Element>,
}

/// Layers of keyed elements, drawn in layer creation order
#[derive(Debug, Clone)]
pub struct Scene {
    width: f64,
    height: f64,
    layers: Vec<Layer>,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            layers: Vec::new(),
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Change the frame size; elements are untouched
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Bind `elements` to `layer`, replacing its previous content.
    ///
    /// New keys enter, changed keys update, missing keys exit; unchanged
    /// elements count as neither. A rejected join leaves the scene as it was.
    pub fn join(&mut self, layer: &str, elements: Vec<Element>) -> Result<JoinSummary, SceneError> {
        let mut keys = HashSet::with_capacity(elements.len());
        for element in &elements {
            if !keys.insert(element.key.as_str()) {
                return Err(SceneError::DuplicateKey {
                    layer: layer.to_string(),
                    key: element.key.clone(),
                });
            }
            if !element.shape.is_finite() {
                return Err(SceneError::NonFiniteGeometry {
                    layer: layer.to_string(),
                    key: element.key.clone(),
                });
            }
        }

        let index = match self.layers.iter().position(|l| l.name == layer) {
            Some(index) => index,
            None => {
                self.layers.push(Layer {
                    name: layer.to_string(),
                    elements: Vec::new(),
                });
                self.layers.len() - 1
            }
        };

        let previous: HashMap<&str, &Element> = self.layers[index]
            .elements
            .iter()
            .map(|e| (e.key.as_str(), e))
            .collect();

        let mut summary = JoinSummary::default();
        for element in &elements {
            match previous.get(element.key.as_str()) {
                None => summary.entered += 1,
                Some(old) if *old != element => summary.updated += 1,
                Some(_) => {}
            }
        }
        summary.exited = previous.keys().filter(|k| !keys.contains(*k)).count();

        self.layers[index].elements = elements;
        Ok(summary)
    }

    /// Apply a cosmetic change to every element of `layer`; returns how many changed
    pub fn restyle<F>(&mut self, layer: &str, mut f: F) -> usize
    where
        F: FnMut(&mut Element),
    {
        let Some(layer) = self.layers.iter_mut().find(|l| l.name == layer) else {
            return 0;
        };
        let mut changed = 0;
        for element in &mut layer.elements {
            let before = element.clone();
            f(element);
            // cosmetic only: geometry and identity stay put
            element.key = before.key.clone();
            element.shape = before.shape.clone();
            if *element != before {
                changed += 1;
            }
        }
        changed
    }

    /// Topmost interactive element under the point
    pub fn hit_test(&self, x: f64, y: f64) -> Option<&Element> {
        self.layers
            .iter()
            .rev()
            .flat_map(|l| l.elements.iter().rev())
            .find(|e| e.interactive && e.shape.contains(x, y))
    }

    pub fn element(&self, layer: &str, key: &str) -> Option<&Element> {
        self.elements(layer).iter().find(|e| e.key == key)
    }

    pub fn elements(&self, layer: &str) -> &[Element] {
        self.layers
            .iter()
            .find(|l| l.name == layer)
            .map_or(&[], |l| l.elements.as_slice())
    }

    /// Layers in draw order
    pub fn layers(&self) -> impl Iterator<Item = (&str, &[Element])> {
        self.layers
            .iter()
            .map(|l| (l.name.as_str(), l.elements.as_slice()))
    }

    /// Total number of elements across layers
    pub fn len(&self) -> usize {
        self.layers.iter().map(|l| l.elements.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
