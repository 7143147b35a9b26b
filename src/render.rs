//! Render collaborators: view-model props and a default SVG writer.
//!
//! The controllers never draw. Hosts read the props below and hand them to a
//! [`Renderer`]; the bundled [`SvgRenderer`] produces SVG markup that matches
//! the element structure the browser binding expects (a `<g>` per shape
//! carrying `data-shape-id`, with its primitives as direct children).

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::fmt::{self, Write};

use serde::Serialize;

use crate::coords::Dimensions;
use crate::draw::DrawController;
use crate::geometry::Rect;
use crate::handles::HandleName;
use crate::selection::SelectionController;
use crate::shape::{ShapeHandle, ShapeId};
use crate::surface::Surface;

/// Props for a shape body renderer.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeRenderProps {
    pub shape_id: ShapeId,
    /// Displayed rectangle: the live drag or simulated rectangle while one is
    /// active, otherwise the committed one.
    pub rect: Rect,
    pub scale: f64,
    /// Explicit `active` prop if the application set one, else native focus.
    pub active: bool,
    pub native_active: bool,
    pub is_being_changed: bool,
    pub is_in_selection_group: bool,
    pub disabled: bool,
    pub is_internal_component: bool,
    /// Application passthrough props.
    pub extra: serde_json::Value,
}

/// Props for a resize-handle renderer.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HandleRenderProps {
    pub name: HandleName,
    pub cursor: &'static str,
    /// Handle center, relative to the shape's top-left corner.
    pub x: f64,
    pub y: f64,
    pub recommended_size: f64,
    pub scale: f64,
    pub active: bool,
    pub native_active: bool,
    pub is_being_changed: bool,
    pub is_in_selection_group: bool,
}

/// Props for the draw and marquee preview renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewRenderProps {
    pub shape_id: &'static str,
    pub rect: Rect,
    pub scale: f64,
    pub disabled: bool,
    pub is_internal_component: bool,
}

impl PreviewRenderProps {
    #[must_use]
    pub fn new(shape_id: &'static str, rect: Rect, scale: f64) -> Self {
        Self { shape_id, rect, scale, disabled: true, is_internal_component: true }
    }
}

/// Pixel size and viewBox of the surface element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// `[min_x, min_y, width, height]` in plane units.
    pub view_box: [f64; 4],
}

impl Viewport {
    /// Pixel size is the scaled plane plus padding; the viewBox extends the
    /// plane by the padding converted to plane units.
    #[must_use]
    pub fn from_dimensions(dims: &Dimensions) -> Self {
        let p = dims.padding;
        let vp = dims.vector_padding();
        Self {
            width: dims.vector_width * dims.scale + p.left + p.right,
            height: dims.vector_height * dims.scale + p.top + p.bottom,
            // Subtracting from zero keeps an unpadded origin at +0 in markup.
            view_box: [
                0.0 - vp.left,
                0.0 - vp.top,
                dims.vector_width + vp.left + vp.right,
                dims.vector_height + vp.top + vp.bottom,
            ],
        }
    }
}

/// Receives the scene piece by piece.
pub trait Renderer {
    fn begin_surface(&mut self, viewport: &Viewport) -> fmt::Result;

    /// Transparent rectangle covering the padded plane. Pointer-downs on it
    /// start a draw or a marquee.
    fn backing(&mut self, class: &str, rect: &Rect) -> fmt::Result;

    fn shape(&mut self, shape: &ShapeRenderProps, handles: &[HandleRenderProps]) -> fmt::Result;

    fn preview(&mut self, preview: &PreviewRenderProps) -> fmt::Result;

    fn end_surface(&mut self) -> fmt::Result;
}

/// Writes plain SVG markup into a string.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    out: String,
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl SvgRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn markup(&self) -> &str {
        &self.out
    }

    #[must_use]
    pub fn into_markup(self) -> String {
        self.out
    }
}

impl Renderer for SvgRenderer {
    fn begin_surface(&mut self, viewport: &Viewport) -> fmt::Result {
        let [vx, vy, vw, vh] = viewport.view_box;
        write!(
            self.out,
            r#"<svg class="rse-plane-container" width="{}" height="{}" viewBox="{vx} {vy} {vw} {vh}" preserveAspectRatio="xMinYMin" focusable="false">"#,
            viewport.width, viewport.height,
        )
    }

    fn backing(&mut self, class: &str, rect: &Rect) -> fmt::Result {
        write!(
            self.out,
            r#"<rect class="{}" x="{}" y="{}" width="{}" height="{}" fill="transparent"/>"#,
            escape_attr(class),
            rect.x,
            rect.y,
            rect.width,
            rect.height,
        )
    }

    fn shape(&mut self, shape: &ShapeRenderProps, handles: &[HandleRenderProps]) -> fmt::Result {
        let r = &shape.rect;
        let tab_index = if shape.disabled { "" } else { r#" tabindex="0""# };
        write!(
            self.out,
            r#"<g data-shape-id="{}" class="rse-shape-wrapper" transform="translate({},{})"{tab_index}>"#,
            escape_attr(shape.shape_id.as_str()),
            r.x,
            r.y,
        )?;
        let fill = if shape.is_internal_component { "transparent" } else { "rgba(0,0,255,0.5)" };
        let stroke = if shape.active { r#" stroke="rgba(53,33,140,1)""# } else { "" };
        write!(self.out, r#"<rect width="{}" height="{}" fill="{fill}"{stroke}/>"#, r.width, r.height)?;
        if !shape.disabled {
            for handle in handles {
                let half = handle.recommended_size / 2.0;
                write!(
                    self.out,
                    r#"<rect data-handle="{}" x="{}" y="{}" width="{}" height="{}" style="cursor:{}" stroke-width="{}"/>"#,
                    handle.name.as_str(),
                    handle.x - half,
                    handle.y - half,
                    handle.recommended_size,
                    handle.recommended_size,
                    handle.cursor,
                    1.0 / handle.scale,
                )?;
            }
        }
        self.out.write_str("</g>")
    }

    fn preview(&mut self, preview: &PreviewRenderProps) -> fmt::Result {
        let r = &preview.rect;
        write!(
            self.out,
            r#"<g data-shape-id="{}"><rect x="{}" y="{}" width="{}" height="{}" fill="transparent" stroke="rgba(140,179,255,1)" stroke-width="{}"/></g>"#,
            preview.shape_id,
            r.x,
            r.y,
            r.width,
            r.height,
            2.0 / preview.scale,
        )
    }

    fn end_surface(&mut self) -> fmt::Result {
        self.out.write_str("</svg>")
    }
}

/// Everything drawn on one surface.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub surface: &'a Surface,
    pub selection: Option<&'a SelectionController>,
    pub draw: Option<&'a DrawController>,
    /// Application shapes, bottom to top.
    pub shapes: &'a [ShapeHandle],
}

/// Walk `scene` bottom to top: backing rectangles, draw preview, shapes, then
/// the marquee preview or the group overlay.
///
/// # Errors
///
/// Propagates the renderer's formatting error.
pub fn render_scene(renderer: &mut impl Renderer, scene: &Scene<'_>) -> fmt::Result {
    renderer.begin_surface(&scene.surface.viewport())?;

    if let Some(selection) = scene.selection {
        renderer.backing("rse-selection-layer", &selection.backing_rect())?;
    }
    if let Some(draw) = scene.draw {
        renderer.backing("rse-draw-layer", &draw.backing_rect())?;
        if let Some(preview) = draw.preview() {
            renderer.preview(&preview)?;
        }
    }

    for shape in scene.shapes {
        renderer.shape(&shape.render_props(), &shape.handles())?;
    }

    if let Some(selection) = scene.selection {
        if selection.is_selecting() {
            if let Some(preview) = selection.marquee_preview() {
                renderer.preview(&preview)?;
            }
        } else if let Some(overlay) = selection.overlay() {
            renderer.shape(&overlay.render_props(), &overlay.handles())?;
        }
    }

    renderer.end_surface()
}
