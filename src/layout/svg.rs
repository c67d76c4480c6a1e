//! Minimal SVG renderer for [`Diagram`]s.
//!
//! All styling lives in an explicit [`RenderContext`]; nothing is kept in
//! process-wide state between renders.

use quick_xml::escape::escape;

use crate::core::SourceFormat;
use crate::layout::diagram::{Diagram, DiagramCircle};
use crate::utils::format::format_count;

const COLOR_A: &str = "#D17E1A";
const COLOR_B: &str = "#1F5CA8";
const COLOR_COMMON: &str = "#C62828";

/// Presentation settings for one render
#[derive(Debug, Clone, PartialEq)]
pub struct RenderContext {
    pub width: u32,
    pub height: u32,
    pub margin: f64,

    /// Legend entries for dataset A and dataset B
    pub legend: [String; 2],

    /// Overlay catalog captions inside the circles
    pub decorate: bool,

    /// Draw the notional common-area disc, not just its label
    pub draw_common_disc: bool,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            width: 700,
            height: 800,
            margin: 40.0,
            legend: [
                format!("{} Dataset", SourceFormat::HmdbXml.catalog_name()),
                format!("{} Dataset", SourceFormat::LipidMapsSdf.catalog_name()),
            ],
            decorate: false,
            draw_common_disc: false,
        }
    }
}

/// Maps diagram coordinates (y up) onto the SVG canvas (y down)
struct Viewport {
    min_x: f64,
    min_y: f64,
    scale: f64,
    offset_x: f64,
    offset_y: f64,
    height: f64,
}

impl Viewport {
    fn fit<'a>(circles: impl Iterator<Item = &'a DiagramCircle>, ctx: &RenderContext) -> Self {
        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for c in circles {
            min_x = min_x.min(c.center.0 - c.radius);
            max_x = max_x.max(c.center.0 + c.radius);
            min_y = min_y.min(c.center.1 - c.radius);
            max_y = max_y.max(c.center.1 + c.radius);
        }
        if !min_x.is_finite() {
            (min_x, max_x, min_y, max_y) = (-1.0, 1.0, -1.0, 1.0);
        }

        let width = f64::from(ctx.width);
        let height = f64::from(ctx.height);
        // Leave room for the legend below the circles
        let usable_w = (width - 2.0 * ctx.margin).max(1.0);
        let usable_h = (height - 3.0 * ctx.margin).max(1.0);
        let extent_x = (max_x - min_x).max(f64::EPSILON);
        let extent_y = (max_y - min_y).max(f64::EPSILON);
        let scale = (usable_w / extent_x).min(usable_h / extent_y);

        Self {
            min_x,
            min_y,
            scale,
            offset_x: (width - extent_x * scale) / 2.0,
            offset_y: ctx.margin + (usable_h - extent_y * scale) / 2.0 + ctx.margin,
            height,
        }
    }

    fn point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.offset_x + (x - self.min_x) * self.scale,
            self.height - self.offset_y - (y - self.min_y) * self.scale,
        )
    }
}

fn disc(vp: &Viewport, c: &DiagramCircle, color: &str, opacity: f64) -> String {
    let (cx, cy) = vp.point(c.center.0, c.center.1);
    format!(
        "  <circle cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{:.2}\" fill=\"{color}\" fill-opacity=\"{opacity}\"/>\n",
        c.radius * vp.scale
    )
}

/// Two-line label: name above, count below
fn label(vp: &Viewport, c: &DiagramCircle, font_size: f64) -> String {
    let (x, y) = vp.point(c.center.0, c.center.1);
    format!(
        "  <text x=\"{x:.2}\" y=\"{y:.2}\" font-size=\"{font_size:.1}\" fill=\"white\" text-anchor=\"middle\">\
         <tspan x=\"{x:.2}\" dy=\"-0.2em\">{}</tspan><tspan x=\"{x:.2}\" dy=\"1.2em\">{}</tspan></text>\n",
        escape(&c.label),
        format_count(c.count)
    )
}

/// Render `diagram` as a standalone SVG document
#[must_use]
pub fn render_svg(diagram: &Diagram, ctx: &RenderContext) -> String {
    let (Some(a), Some(b)) = (diagram.dataset_a(), diagram.dataset_b()) else {
        return format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\"/>\n",
            ctx.width, ctx.height
        );
    };
    let common = diagram.common();

    let vp = Viewport::fit([a, b].into_iter(), ctx);
    let base_font = vp.scale * 0.15;

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n\
         <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n",
        w = ctx.width,
        h = ctx.height
    );

    svg.push_str(&disc(&vp, a, COLOR_A, 0.6));
    svg.push_str(&disc(&vp, b, COLOR_B, 0.5));
    if let Some(common) = common.filter(|_| ctx.draw_common_disc) {
        svg.push_str(&disc(&vp, common, COLOR_COMMON, 0.5));
    }

    // Font sizes grow with the circle they label
    svg.push_str(&label(&vp, a, base_font * a.radius * 1.2));
    svg.push_str(&label(&vp, b, base_font * b.radius.max(0.3) * 1.8));
    if let Some(common) = common {
        let mut shifted = common.clone();
        shifted.center.1 -= 0.08;
        svg.push_str(&label(&vp, &shifted, base_font * common.radius.max(0.2) * 3.0));
    }

    if ctx.decorate {
        for (circle, caption) in [(a, &ctx.legend[0]), (b, &ctx.legend[1])] {
            let (x, y) = vp.point(circle.center.0, circle.center.1 - circle.radius * 0.6);
            svg.push_str(&format!(
                "  <text x=\"{x:.2}\" y=\"{y:.2}\" font-size=\"{:.1}\" font-style=\"italic\" fill=\"white\" fill-opacity=\"0.8\" text-anchor=\"middle\">{}</text>\n",
                base_font * 0.8,
                escape(caption)
            ));
        }
    }

    // Legend
    let legend_y = f64::from(ctx.height) - ctx.margin;
    let mut x = ctx.margin;
    for (caption, color, opacity) in [
        (&ctx.legend[0], COLOR_A, 0.6),
        (&ctx.legend[1], COLOR_B, 0.5),
    ] {
        svg.push_str(&format!(
            "  <rect x=\"{x:.2}\" y=\"{:.2}\" width=\"14\" height=\"14\" fill=\"{color}\" fill-opacity=\"{opacity}\"/>\n\
             <text x=\"{:.2}\" y=\"{legend_y:.2}\" font-size=\"14\">{}</text>\n",
            legend_y - 12.0,
            x + 20.0,
            escape(caption)
        ));
        x += 220.0;
    }

    svg.push_str("</svg>\n");
    svg
}
