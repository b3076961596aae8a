//! Bounding boxes and the three narrow-phase shape tests.
//!
//! Coordinates are room pixels: x grows to the right, y grows downward.
//! Edges that merely touch do not count as overlapping.

use glam::Vec2;

/// Axis-aligned rectangle in room coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    /// Rectangle from its top-left corner and size. Negative sizes collapse
    /// to zero so `left <= right` and `top <= bottom` always hold.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            left: x,
            top: y,
            right: x + width.max(0.0),
            bottom: y + height.max(0.0),
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.left + self.right) * 0.5,
            (self.top + self.bottom) * 0.5,
        )
    }

    pub fn translate(&self, offset: Vec2) -> Self {
        Self {
            left: self.left + offset.x,
            top: self.top + offset.y,
            right: self.right + offset.x,
            bottom: self.bottom + offset.y,
        }
    }

    /// Interval overlap on both axes.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.overlaps_x(other) && self.overlaps_y(other)
    }

    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.left < other.right && other.left < self.right
    }

    pub fn overlaps_y(&self, other: &Rect) -> bool {
        self.top < other.bottom && other.top < self.bottom
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.left && p.x < self.right && p.y >= self.top && p.y < self.bottom
    }

    /// Point of the rectangle nearest to `p`.
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x.clamp(self.left, self.right), p.y.clamp(self.top, self.bottom))
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }
}

/// Which narrow-phase test an entity asks for.
///
/// Ordered from least to most precise; in a pair the more precise request
/// governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum CollisionShape {
    #[default]
    Rectangle,
    Ellipse,
    Precise,
}

/// Boolean pixel mask used for precise collision detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// Build a mask from a row-major bit vector. Returns `None` when the
    /// vector length does not match `width * height`.
    pub fn new(width: u32, height: u32, bits: Vec<bool>) -> Option<Self> {
        if bits.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self { width, height, bits })
    }

    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> bool) -> Self {
        let mut bits = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                bits.push(f(x, y));
            }
        }
        Self { width, height, bits }
    }

    /// Fully set mask.
    pub fn filled(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.bits[(y * self.width + x) as usize]
    }
}

/// A mask anchored in room coordinates at its top-left pixel.
#[derive(Debug, Clone, Copy)]
pub struct PlacedMask<'a> {
    pub mask: &'a Mask,
    pub origin: Vec2,
}

impl PlacedMask<'_> {
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.origin.x.floor(),
            self.origin.y.floor(),
            self.mask.width as f32,
            self.mask.height as f32,
        )
    }
}

/// Everything the narrow phase needs to know about one side of a pair.
#[derive(Debug, Clone, Copy)]
pub struct Body<'a> {
    pub bbox: Rect,
    pub shape: CollisionShape,
    pub mask: Option<PlacedMask<'a>>,
}

impl<'a> Body<'a> {
    pub fn rect(bbox: Rect) -> Self {
        Self {
            bbox,
            shape: CollisionShape::Rectangle,
            mask: None,
        }
    }

    /// Extent used by the broad phase: the bounding box, widened by the
    /// mask when precise detection is requested.
    pub fn bounds(&self) -> Rect {
        match (self.shape, self.mask) {
            (CollisionShape::Precise, Some(placed)) => self.bbox.union(&placed.rect()),
            _ => self.bbox,
        }
    }

    /// Same body moved by `offset`.
    pub fn translate(&self, offset: Vec2) -> Self {
        Self {
            bbox: self.bbox.translate(offset),
            shape: self.shape,
            mask: self.mask.map(|m| PlacedMask {
                mask: m.mask,
                origin: m.origin + offset,
            }),
        }
    }

    /// The mask that takes part in precise tests. Only precise bodies
    /// contribute one.
    fn precise_mask(&self) -> Option<PlacedMask<'a>> {
        match self.shape {
            CollisionShape::Precise => self.mask,
            _ => None,
        }
    }

    /// Whether every coordinate is a real number.
    pub fn is_finite(&self) -> bool {
        let r = &self.bbox;
        r.left.is_finite()
            && r.top.is_finite()
            && r.right.is_finite()
            && r.bottom.is_finite()
            && self.mask.map_or(true, |m| m.origin.is_finite())
    }

    /// Whether the room point `p` lies inside this body's analytic shape.
    /// A precise body without a mask counts as its box.
    fn contains(&self, p: Vec2) -> bool {
        match self.shape {
            CollisionShape::Ellipse => point_in_ellipse(p, &self.bbox),
            _ => self.bbox.contains_point(p),
        }
    }
}

/// Narrow-phase test between two bodies using the more precise of the two
/// requested shapes. Bodies with non-finite coordinates never collide.
pub fn bodies_collide(a: &Body, b: &Body) -> bool {
    if !a.is_finite() || !b.is_finite() {
        return false;
    }
    if !a.bounds().overlaps(&b.bounds()) {
        return false;
    }

    if a.shape.max(b.shape) == CollisionShape::Precise {
        match (a.precise_mask(), b.precise_mask()) {
            (Some(ma), Some(mb)) => return masks_overlap(ma.mask, ma.origin, mb.mask, mb.origin),
            (Some(m), None) => return mask_hits_body(&m, b),
            (None, Some(m)) => return mask_hits_body(&m, a),
            // No pixel data on either side: the shapes decide.
            (None, None) => {}
        }
    }

    match (a.shape, b.shape) {
        (CollisionShape::Ellipse, CollisionShape::Ellipse) => ellipses_overlap(&a.bbox, &b.bbox),
        (CollisionShape::Ellipse, _) => rect_ellipse_overlap(&b.bbox, &a.bbox),
        (_, CollisionShape::Ellipse) => rect_ellipse_overlap(&a.bbox, &b.bbox),
        _ => true,
    }
}

/// Whether any set pixel of `placed` has its center inside `other`.
/// Only the mask pixels under `other`'s box are visited, so the cost is
/// bounded by the mask size whatever the size of `other`.
fn mask_hits_body(placed: &PlacedMask, other: &Body) -> bool {
    let (ox, oy) = (placed.origin.x.floor() as i64, placed.origin.y.floor() as i64);
    let (w, h) = (placed.mask.width as i64, placed.mask.height as i64);
    let r = &other.bbox;

    let left = ox.max(r.left.floor() as i64);
    let right = (ox + w).min(r.right.ceil() as i64);
    let top = oy.max(r.top.floor() as i64);
    let bottom = (oy + h).min(r.bottom.ceil() as i64);

    for y in top..bottom {
        for x in left..right {
            if !placed.mask.get((x - ox) as u32, (y - oy) as u32) {
                continue;
            }
            let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            if other.contains(center) {
                return true;
            }
        }
    }
    false
}

fn point_in_ellipse(p: Vec2, ellipse_box: &Rect) -> bool {
    let rx = ellipse_box.width() / 2.0;
    let ry = ellipse_box.height() / 2.0;
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let c = ellipse_box.center();
    let dx = (p.x - c.x) / rx;
    let dy = (p.y - c.y) / ry;
    dx * dx + dy * dy <= 1.0
}

/// Rectangle against the ellipse inscribed in `ellipse_box`: the point of
/// the rectangle closest to the ellipse center must lie inside the ellipse.
pub fn rect_ellipse_overlap(rect: &Rect, ellipse_box: &Rect) -> bool {
    let rx = ellipse_box.width() / 2.0;
    let ry = ellipse_box.height() / 2.0;
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let c = ellipse_box.center();
    let p = rect.closest_point(c);
    let dx = (p.x - c.x) / rx;
    let dy = (p.y - c.y) / ry;
    dx * dx + dy * dy < 1.0
}

/// Two inscribed ellipses: the center distance is compared with the sum of
/// each ellipse's radius along the line joining the centers.
pub fn ellipses_overlap(a: &Rect, b: &Rect) -> bool {
    let d = b.center() - a.center();
    let dist = d.length();
    let (ax, ay) = (a.width() / 2.0, a.height() / 2.0);
    let (bx, by) = (b.width() / 2.0, b.height() / 2.0);
    if dist <= f32::EPSILON {
        return ax > 0.0 && ay > 0.0 && bx > 0.0 && by > 0.0;
    }
    let dir = d / dist;
    dist < radius_along(ax, ay, dir) + radius_along(bx, by, dir)
}

fn radius_along(rx: f32, ry: f32, dir: Vec2) -> f32 {
    if rx <= 0.0 || ry <= 0.0 {
        return 0.0;
    }
    let denom = ((ry * dir.x).powi(2) + (rx * dir.y).powi(2)).sqrt();
    rx * ry / denom
}

/// Bitwise AND of two masks aligned by their room-space origins.
/// Non-finite origins never overlap.
pub fn masks_overlap(a: &Mask, a_origin: Vec2, b: &Mask, b_origin: Vec2) -> bool {
    if !a_origin.is_finite() || !b_origin.is_finite() {
        return false;
    }
    let (ax, ay) = (a_origin.x.floor() as i64, a_origin.y.floor() as i64);
    let (bx, by) = (b_origin.x.floor() as i64, b_origin.y.floor() as i64);

    let left = ax.max(bx);
    let right = (ax + a.width as i64).min(bx + b.width as i64);
    let top = ay.max(by);
    let bottom = (ay + a.height as i64).min(by + b.height as i64);

    for y in top..bottom {
        for x in left..right {
            let hit_a = a.get((x - ax) as u32, (y - ay) as u32);
            if hit_a && b.get((x - bx) as u32, (y - by) as u32) {
                return true;
            }
        }
    }
    false
}
