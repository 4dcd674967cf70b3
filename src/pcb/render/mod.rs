//! Board image rendering.
//!
//! [`BoardRenderer`] is the interface the verify flow consumes.
//! [`RasterRenderer`] draws the board's items onto an [`RgbImage`] and
//! returns it as a base64-encoded PNG.
//!
//! Board coordinates span the whole `i64` range, so extents are computed
//! with saturating arithmetic and the projection works in `f64`.

use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use image::{ImageFormat, Rgb, RgbImage};
use serde::Serialize;

use super::engine::Board;
use super::error::RenderError;
use super::geometry::Vector2;
use super::items::{BoardItem, BoardLayer, BoardShape, ItemType, ShapeKind, ZoneFillMode};

/// Largest accepted canvas edge, in pixels.
pub const MAX_CANVAS_PX: u32 = 8192;

/// Margin added around the drawn items, in nm.
const BOARD_MARGIN_NM: i64 = 500_000;

/// Half-size of the marker drawn for a footprint anchor, in nm.
const FOOTPRINT_MARKER_NM: i64 = 1_000_000;

/// Segments used to approximate arcs and circles.
const ARC_SEGMENTS: usize = 48;

/// A rendered image, ready to hand to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedImage {
    /// Base64-encoded image bytes.
    pub data: String,
    /// MIME type of the encoded image.
    pub mime_type: String,
}

/// Produces raster images of a board.
pub trait BoardRenderer: Send + Sync {
    /// Renders `board`, restricted to `layers` when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the board cannot be read or nothing is visible.
    fn render(
        &self,
        board: &dyn Board,
        layers: Option<&[BoardLayer]>,
    ) -> Result<RenderedImage, RenderError>;
}

const BACKGROUND: Rgb<u8> = Rgb([0x00, 0x10, 0x23]);
const VIA_COLOUR: Rgb<u8> = Rgb([0xC8, 0xC8, 0xC8]);

/// Display colour for each layer.
const fn layer_colour(layer: BoardLayer) -> Rgb<u8> {
    Rgb(match layer {
        BoardLayer::FrontCopper => [0xC8, 0x34, 0x34],
        BoardLayer::Inner1Copper => [0x7F, 0xC8, 0x7F],
        BoardLayer::Inner2Copper => [0xCE, 0x7D, 0x2C],
        BoardLayer::BackCopper => [0x4D, 0x7F, 0xC4],
        BoardLayer::FrontSilkscreen => [0xF2, 0xED, 0xA1],
        BoardLayer::BackSilkscreen => [0xE8, 0xB2, 0xA7],
        BoardLayer::FrontMask => [0xD8, 0x64, 0xFF],
        BoardLayer::BackMask => [0x02, 0xFF, 0xEE],
        BoardLayer::FrontFab => [0xAF, 0xAF, 0xAF],
        BoardLayer::BackFab => [0x58, 0x5D, 0x84],
        BoardLayer::FrontCourtyard => [0xFF, 0x26, 0xE2],
        BoardLayer::BackCourtyard => [0x26, 0xE9, 0xFF],
        BoardLayer::EdgeCuts => [0xD0, 0xD2, 0xCD],
    })
}

/// Paint order: back side first, board outline last.
const fn layer_depth(layer: BoardLayer) -> u8 {
    match layer {
        BoardLayer::BackCourtyard => 0,
        BoardLayer::BackFab => 1,
        BoardLayer::BackSilkscreen => 2,
        BoardLayer::BackMask => 3,
        BoardLayer::BackCopper => 4,
        BoardLayer::Inner2Copper => 5,
        BoardLayer::Inner1Copper => 6,
        BoardLayer::FrontCopper => 7,
        BoardLayer::FrontMask => 8,
        BoardLayer::FrontSilkscreen => 9,
        BoardLayer::FrontFab => 10,
        BoardLayer::FrontCourtyard => 11,
        BoardLayer::EdgeCuts => 12,
    }
}

/// Renders boards to PNG with a fixed canvas size.
#[derive(Debug, Clone)]
pub struct RasterRenderer {
    width: u32,
    height: u32,
    margin_px: u32,
}

impl RasterRenderer {
    /// Creates a renderer with the given canvas size.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidCanvas`] if a dimension is zero, too
    /// large, or the margin leaves no drawing area.
    pub fn new(width: u32, height: u32, margin_px: u32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 || width > MAX_CANVAS_PX || height > MAX_CANVAS_PX {
            return Err(RenderError::InvalidCanvas {
                message: format!("{width}x{height} is outside 1..={MAX_CANVAS_PX} pixels"),
            });
        }
        if margin_px.saturating_mul(2) >= width.min(height) {
            return Err(RenderError::InvalidCanvas {
                message: format!("margin {margin_px}px leaves no room on a {width}x{height} canvas"),
            });
        }
        Ok(Self {
            width,
            height,
            margin_px,
        })
    }

    /// Collects the items visible on `layers`, in paint order.
    fn visible_items(
        board: &dyn Board,
        layers: Option<&[BoardLayer]>,
    ) -> Result<Vec<(BoardLayer, BoardItem)>, RenderError> {
        let mut visible = Vec::new();
        for item_type in ItemType::ALL {
            for item in board.get_items(item_type)? {
                let paint_layer = item
                    .layers()
                    .into_iter()
                    .filter(|l| layers.map_or(true, |selected| selected.contains(l)))
                    .max_by_key(|l| layer_depth(*l));
                if let Some(layer) = paint_layer {
                    visible.push((layer, item));
                }
            }
        }

        // Zones under everything else on the same layer
        visible.sort_by_key(|(layer, item)| {
            (layer_depth(*layer), u8::from(item.item_type() != ItemType::Zone))
        });
        Ok(visible)
    }
}

impl BoardRenderer for RasterRenderer {
    fn render(
        &self,
        board: &dyn Board,
        layers: Option<&[BoardLayer]>,
    ) -> Result<RenderedImage, RenderError> {
        let items = Self::visible_items(board, layers)?;
        let bounds = Bounds::of(items.iter().map(|(_, item)| item))
            .ok_or(RenderError::EmptySelection)?
            .expanded(BOARD_MARGIN_NM);

        let view = Viewport::fit(&bounds, self.width, self.height, self.margin_px);
        let mut canvas = Canvas::new(self.width, self.height);

        for (layer, item) in &items {
            draw_item(&mut canvas, &view, *layer, item);
        }

        tracing::debug!(
            board = %board.name(),
            items = items.len(),
            width = self.width,
            height = self.height,
            "Rendered board"
        );

        let mut png = Cursor::new(Vec::new());
        canvas
            .image
            .write_to(&mut png, ImageFormat::Png)
            .map_err(|source| RenderError::Encode { source })?;

        Ok(RenderedImage {
            data: BASE64_STANDARD.encode(png.into_inner()),
            mime_type: "image/png".to_string(),
        })
    }
}

/// Axis-aligned bounding box in nm.
#[derive(Debug, Clone, Copy)]
struct Bounds {
    min_x: i64,
    min_y: i64,
    max_x: i64,
    max_y: i64,
}

impl Bounds {
    fn of<'a>(items: impl Iterator<Item = &'a BoardItem>) -> Option<Self> {
        let mut bounds: Option<Self> = None;
        for item in items {
            let reach = item_reach(item);
            for point in item_points(item) {
                let b = bounds.get_or_insert(Self {
                    min_x: point.x_nm,
                    min_y: point.y_nm,
                    max_x: point.x_nm,
                    max_y: point.y_nm,
                });
                b.min_x = b.min_x.min(point.x_nm.saturating_sub(reach));
                b.min_y = b.min_y.min(point.y_nm.saturating_sub(reach));
                b.max_x = b.max_x.max(point.x_nm.saturating_add(reach));
                b.max_y = b.max_y.max(point.y_nm.saturating_add(reach));
            }
        }
        bounds
    }

    const fn expanded(self, margin: i64) -> Self {
        Self {
            min_x: self.min_x.saturating_sub(margin),
            min_y: self.min_y.saturating_sub(margin),
            max_x: self.max_x.saturating_add(margin),
            max_y: self.max_y.saturating_add(margin),
        }
    }
}

/// Points that define an item's extent.
#[allow(clippy::cast_possible_truncation)]
fn item_points(item: &BoardItem) -> Vec<Vector2> {
    match item {
        BoardItem::Track(t) => vec![t.start, t.end],
        BoardItem::ArcTrack(a) => vec![a.start, a.mid, a.end],
        BoardItem::Via(v) => vec![v.position],
        BoardItem::Footprint(f) => vec![f.position],
        BoardItem::Zone(z) => z.outline.clone(),
        BoardItem::BoardText(t) => vec![t.position],
        BoardItem::BoardShape(s) => match s.shape {
            ShapeKind::Circle => {
                let r = distance(s.start, s.end).round() as i64;
                vec![offset(s.start, -r, -r), offset(s.start, r, r)]
            }
            ShapeKind::Segment | ShapeKind::Rectangle => vec![s.start, s.end],
        },
    }
}

/// How far an item extends beyond its defining points, in nm.
fn item_reach(item: &BoardItem) -> i64 {
    match item {
        BoardItem::Track(t) => t.width_nm / 2,
        BoardItem::ArcTrack(a) => a.width_nm / 2,
        BoardItem::Via(v) => v.diameter_nm / 2,
        BoardItem::Footprint(_) => FOOTPRINT_MARKER_NM,
        BoardItem::Zone(_) => 0,
        BoardItem::BoardText(t) => text_extent(t.text.chars().count(), t.size_nm),
        BoardItem::BoardShape(s) => s.width_nm / 2,
    }
}

/// Approximate width of a line of text, in nm.
#[allow(clippy::cast_possible_wrap)]
const fn text_extent(chars: usize, size_nm: i64) -> i64 {
    (chars as i64).saturating_mul(size_nm).saturating_mul(6) / 10
}

/// `p` shifted by `(dx, dy)`, clamped to the coordinate range.
const fn offset(p: Vector2, dx: i64, dy: i64) -> Vector2 {
    Vector2::from_xy(p.x_nm.saturating_add(dx), p.y_nm.saturating_add(dy))
}

#[allow(clippy::cast_precision_loss)]
fn distance(a: Vector2, b: Vector2) -> f64 {
    let dx = b.x_nm as f64 - a.x_nm as f64;
    let dy = b.y_nm as f64 - a.y_nm as f64;
    dx.hypot(dy)
}

/// Maps board coordinates onto the canvas.
struct Viewport {
    origin_x: i64,
    origin_y: i64,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
}

impl Viewport {
    #[allow(clippy::cast_precision_loss)]
    fn fit(bounds: &Bounds, width: u32, height: u32, margin_px: u32) -> Self {
        let span_x = (bounds.max_x as f64 - bounds.min_x as f64).max(1.0);
        let span_y = (bounds.max_y as f64 - bounds.min_y as f64).max(1.0);
        let usable_w = f64::from(width - 2 * margin_px);
        let usable_h = f64::from(height - 2 * margin_px);
        let scale = (usable_w / span_x).min(usable_h / span_y);

        // Centre the drawing in the usable area
        let offset_x = f64::from(margin_px) + (usable_w - span_x * scale) / 2.0;
        let offset_y = f64::from(margin_px) + (usable_h - span_y * scale) / 2.0;

        Self {
            origin_x: bounds.min_x,
            origin_y: bounds.min_y,
            scale,
            offset_x,
            offset_y,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn to_px(&self, p: Vector2) -> (f64, f64) {
        (
            self.offset_x + (p.x_nm as f64 - self.origin_x as f64) * self.scale,
            self.offset_y + (p.y_nm as f64 - self.origin_y as f64) * self.scale,
        )
    }

    /// Converts a length in nm to pixels, never thinner than one pixel.
    #[allow(clippy::cast_precision_loss)]
    fn len_px(&self, nm: i64) -> f64 {
        (nm as f64 * self.scale).max(1.0)
    }
}

/// The image being drawn; points off the image are dropped.
struct Canvas {
    image: RgbImage,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, BACKGROUND),
        }
    }

    fn put(&mut self, x: i64, y: i64, colour: Rgb<u8>) {
        let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
            return;
        };
        if x < self.image.width() && y < self.image.height() {
            self.image.put_pixel(x, y, colour);
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn disc(&mut self, (cx, cy): (f64, f64), radius: f64, colour: Rgb<u8>) {
        let r = radius.max(0.5);
        let (x0, x1) = ((cx - r).floor() as i64, (cx + r).ceil() as i64);
        let (y0, y1) = ((cy - r).floor() as i64, (cy + r).ceil() as i64);
        let r2 = r * r;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.put(x, y, colour);
                }
            }
        }
    }

    /// Draws a thick line with Bresenham's algorithm, stamping a disc per step.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn line(&mut self, from: (f64, f64), to: (f64, f64), thickness: f64, colour: Rgb<u8>) {
        let radius = thickness / 2.0;
        let (mut x, mut y) = (from.0.round() as i64, from.1.round() as i64);
        let (x1, y1) = (to.0.round() as i64, to.1.round() as i64);

        let dx = (x1 - x).abs();
        let dy = (y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx - dy;

        loop {
            if radius <= 0.5 {
                self.put(x, y, colour);
            } else {
                self.disc((x as f64, y as f64), radius, colour);
            }

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                x += sx;
            }
            if e2 < dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn polyline(&mut self, points: &[(f64, f64)], closed: bool, thickness: f64, colour: Rgb<u8>) {
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], thickness, colour);
        }
        if closed && points.len() > 2 {
            self.line(points[points.len() - 1], points[0], thickness, colour);
        }
    }

    /// Fills a polygon using the even-odd scanline rule.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn fill_polygon(&mut self, points: &[(f64, f64)], colour: Rgb<u8>) {
        if points.len() < 3 {
            return;
        }
        let min_y = points.iter().map(|p| p.1).fold(f64::MAX, f64::min).floor() as i64;
        let max_y = points.iter().map(|p| p.1).fold(f64::MIN, f64::max).ceil() as i64;

        for y in min_y.max(0)..=max_y.min(i64::from(self.image.height()) - 1) {
            let scan = y as f64 + 0.5;
            let mut crossings: Vec<f64> = Vec::new();
            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                if (a.1 <= scan && b.1 > scan) || (b.1 <= scan && a.1 > scan) {
                    crossings.push(a.0 + (scan - a.1) / (b.1 - a.1) * (b.0 - a.0));
                }
            }
            crossings.sort_by(f64::total_cmp);
            for span in crossings.chunks(2) {
                if let [start, end] = span {
                    for x in start.round() as i64..end.round() as i64 {
                        self.put(x, y, colour);
                    }
                }
            }
        }
    }
}

/// Darkens a colour for filled areas so outlines stay visible.
const fn dim(Rgb([r, g, b]): Rgb<u8>) -> Rgb<u8> {
    Rgb([r / 2, g / 2, b / 2])
}

fn draw_item(canvas: &mut Canvas, view: &Viewport, layer: BoardLayer, item: &BoardItem) {
    let colour = layer_colour(layer);
    match item {
        BoardItem::Track(t) => {
            canvas.line(view.to_px(t.start), view.to_px(t.end), view.len_px(t.width_nm), colour);
        }
        BoardItem::ArcTrack(a) => {
            let points: Vec<_> = arc_points(a.start, a.mid, a.end)
                .into_iter()
                .map(|p| view.to_px(p))
                .collect();
            canvas.polyline(&points, false, view.len_px(a.width_nm), colour);
        }
        BoardItem::Via(v) => {
            canvas.disc(view.to_px(v.position), view.len_px(v.diameter_nm) / 2.0, VIA_COLOUR);
            canvas.disc(view.to_px(v.position), view.len_px(v.drill_nm) / 2.0, BACKGROUND);
        }
        BoardItem::Footprint(f) => {
            let p = f.position;
            let m = FOOTPRINT_MARKER_NM;
            let corners = [
                offset(p, -m, -m),
                offset(p, m, -m),
                offset(p, m, m),
                offset(p, -m, m),
            ]
            .map(|c| view.to_px(c));
            canvas.polyline(&corners, true, 1.0, colour);
            canvas.disc(view.to_px(p), view.len_px(m / 4), colour);
        }
        BoardItem::Zone(z) => {
            let points: Vec<_> = z.outline.iter().map(|p| view.to_px(*p)).collect();
            if z.fill_mode == ZoneFillMode::Solid {
                canvas.fill_polygon(&points, dim(colour));
            }
            canvas.polyline(&points, true, 1.0, colour);
        }
        BoardItem::BoardText(t) => {
            // Text is shown as its baseline extent
            let extent = text_extent(t.text.chars().count(), t.size_nm);
            let end = offset(t.position, extent, 0);
            canvas.line(
                view.to_px(t.position),
                view.to_px(end),
                view.len_px(t.size_nm / 8),
                colour,
            );
        }
        BoardItem::BoardShape(s) => draw_shape(canvas, view, colour, s),
    }
}

fn draw_shape(canvas: &mut Canvas, view: &Viewport, colour: Rgb<u8>, s: &BoardShape) {
    let thickness = view.len_px(s.width_nm);
    match s.shape {
        ShapeKind::Segment => canvas.line(view.to_px(s.start), view.to_px(s.end), thickness, colour),
        ShapeKind::Rectangle => {
            let corners = [
                s.start,
                Vector2::from_xy(s.end.x_nm, s.start.y_nm),
                s.end,
                Vector2::from_xy(s.start.x_nm, s.end.y_nm),
            ]
            .map(|c| view.to_px(c));
            if s.filled {
                canvas.fill_polygon(&corners, colour);
            }
            canvas.polyline(&corners, true, thickness, colour);
        }
        ShapeKind::Circle => {
            #[allow(clippy::cast_possible_truncation)]
            let radius = distance(s.start, s.end).round() as i64;
            if s.filled {
                canvas.disc(view.to_px(s.start), view.len_px(radius), colour);
            } else {
                let points: Vec<_> = circle_points(s.start, radius)
                    .into_iter()
                    .map(|p| view.to_px(p))
                    .collect();
                canvas.polyline(&points, true, thickness, colour);
            }
        }
    }
}

/// Points on a circle, for outlining.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn circle_points(centre: Vector2, radius: i64) -> Vec<Vector2> {
    (0..ARC_SEGMENTS)
        .map(|i| {
            let t = std::f64::consts::TAU * i as f64 / ARC_SEGMENTS as f64;
            offset(
                centre,
                (radius as f64 * t.cos()).round() as i64,
                (radius as f64 * t.sin()).round() as i64,
            )
        })
        .collect()
}

/// Approximates the arc through `start`, `mid` and `end` with a polyline.
///
/// Collinear points degrade to the two straight segments.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn arc_points(start: Vector2, mid: Vector2, end: Vector2) -> Vec<Vector2> {
    let (ax, ay) = (start.x_nm as f64, start.y_nm as f64);
    let (bx, by) = (mid.x_nm as f64, mid.y_nm as f64);
    let (cx, cy) = (end.x_nm as f64, end.y_nm as f64);

    let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
    if d.abs() < f64::EPSILON {
        return vec![start, mid, end];
    }

    let a2 = ax * ax + ay * ay;
    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;
    let ux = (a2 * (by - cy) + b2 * (cy - ay) + c2 * (ay - by)) / d;
    let uy = (a2 * (cx - bx) + b2 * (ax - cx) + c2 * (bx - ax)) / d;
    let radius = (ax - ux).hypot(ay - uy);

    let angle_of = |x: f64, y: f64| (y - uy).atan2(x - ux);
    let a0 = angle_of(ax, ay);
    let tau = std::f64::consts::TAU;
    let sweep_to_mid = (angle_of(bx, by) - a0).rem_euclid(tau);
    let sweep_to_end = (angle_of(cx, cy) - a0).rem_euclid(tau);

    // Counter-clockwise unless that path misses the mid point
    let sweep = if sweep_to_mid <= sweep_to_end {
        sweep_to_end
    } else {
        sweep_to_end - tau
    };

    (0..=ARC_SEGMENTS)
        .map(|i| {
            let t = a0 + sweep * i as f64 / ARC_SEGMENTS as f64;
            Vector2::from_xy(
                (ux + radius * t.cos()).round() as i64,
                (uy + radius * t.sin()).round() as i64,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use base64::Engine as _;

    use super::*;
    use crate::pcb::geometry::Angle;
    use crate::pcb::items::{BoardText, ItemId, Track, Via, ViaType};
    use crate::pcb::memory::MemoryBoard;

    fn track(layer: BoardLayer) -> BoardItem {
        BoardItem::Track(Track {
            id: ItemId::default(),
            start: Vector2::from_xy(0, 0),
            end: Vector2::from_xy(10_000_000, 5_000_000),
            width_nm: 250_000,
            layer,
            net: None,
            locked: false,
        })
    }

    fn decode(image: &RenderedImage) -> Vec<u8> {
        BASE64_STANDARD.decode(&image.data).unwrap()
    }

    #[test]
    fn rejects_bad_canvas() {
        assert!(RasterRenderer::new(0, 100, 0).is_err());
        assert!(RasterRenderer::new(100, MAX_CANVAS_PX + 1, 0).is_err());
        assert!(RasterRenderer::new(100, 100, 50).is_err());
        assert!(RasterRenderer::new(100, 100, 10).is_ok());
    }

    #[test]
    fn renders_png() {
        let board = MemoryBoard::with_items("r", vec![track(BoardLayer::FrontCopper)]);
        let renderer = RasterRenderer::new(64, 48, 4).unwrap();
        let image = renderer.render(&board, None).unwrap();
        assert_eq!(image.mime_type, "image/png");

        let png = image::load_from_memory(&decode(&image)).unwrap().to_rgb8();
        assert_eq!(png.dimensions(), (64, 48));
        // Margin stays background, the track crosses the canvas
        assert_eq!(*png.get_pixel(0, 0), BACKGROUND);
        let copper = layer_colour(BoardLayer::FrontCopper);
        assert!(png.pixels().any(|p| *p == copper));
    }

    #[test]
    fn extreme_coordinates_render() {
        let far = |x: i64, y: i64| {
            BoardItem::Via(Via {
                id: ItemId::default(),
                position: Vector2::from_xy(x, y),
                diameter_nm: i64::MAX,
                drill_nm: 300_000,
                via_type: ViaType::Through,
                net: None,
                locked: false,
            })
        };
        let text = BoardItem::BoardText(BoardText {
            id: ItemId::default(),
            text: "OVERFLOW".to_string(),
            position: Vector2::from_xy(i64::MAX, 0),
            orientation: Angle::default(),
            layer: BoardLayer::FrontSilkscreen,
            size_nm: i64::MAX,
        });
        let board = MemoryBoard::with_items(
            "r",
            vec![far(i64::MAX, i64::MAX), far(i64::MIN, i64::MIN), text],
        );
        let renderer = RasterRenderer::new(32, 32, 2).unwrap();
        let image = renderer.render(&board, None).unwrap();
        let png = image::load_from_memory(&decode(&image)).unwrap();
        assert_eq!((png.width(), png.height()), (32, 32));
    }

    #[test]
    fn empty_board_is_an_error() {
        let board = MemoryBoard::new("empty");
        let renderer = RasterRenderer::new(64, 48, 4).unwrap();
        assert!(matches!(
            renderer.render(&board, None),
            Err(RenderError::EmptySelection)
        ));
    }

    #[test]
    fn layer_filter_excludes_other_layers() {
        let board = MemoryBoard::with_items("r", vec![track(BoardLayer::BackCopper)]);
        let renderer = RasterRenderer::new(64, 48, 4).unwrap();
        assert!(matches!(
            renderer.render(&board, Some(&[BoardLayer::FrontCopper][..])),
            Err(RenderError::EmptySelection)
        ));
        assert!(renderer
            .render(&board, Some(&[BoardLayer::BackCopper][..]))
            .is_ok());
    }

    #[test]
    fn single_via_renders() {
        let board = MemoryBoard::with_items(
            "r",
            vec![BoardItem::Via(Via {
                id: ItemId::default(),
                position: Vector2::from_xy(1, 1),
                diameter_nm: 600_000,
                drill_nm: 300_000,
                via_type: ViaType::Through,
                net: None,
                locked: false,
            })],
        );
        let renderer = RasterRenderer::new(32, 32, 2).unwrap();
        assert!(renderer.render(&board, None).is_ok());
    }

    #[test]
    fn arc_through_three_points_stays_on_circle() {
        let points = arc_points(
            Vector2::from_xy(1000, 0),
            Vector2::from_xy(0, 1000),
            Vector2::from_xy(-1000, 0),
        );
        assert_eq!(points.len(), ARC_SEGMENTS + 1);
        for p in &points {
            let r = distance(Vector2::default(), *p);
            assert!((r - 1000.0).abs() < 2.0);
        }
        // Passes through the upper half, where the mid point is
        assert!(points.iter().all(|p| p.y_nm >= -1));
    }

    #[test]
    fn collinear_arc_degrades_to_segments() {
        let points = arc_points(
            Vector2::from_xy(0, 0),
            Vector2::from_xy(1, 1),
            Vector2::from_xy(2, 2),
        );
        assert_eq!(points.len(), 3);
    }
}
