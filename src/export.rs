//! Image export of a rendered [`Scene`].
//!
//! SVG is always available. PNG and JPEG go through resvg and need the
//! `raster` feature; JPEG has no alpha channel, so its background is forced
//! opaque.

use std::path::Path;

use log::info;

use crate::error::ExportError;
use crate::render::{Anchor, Primitive, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Svg,
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Pick the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "svg" => Ok(ImageFormat::Svg),
            "png" => Ok(ImageFormat::Png),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            _ => Err(ExportError::UnsupportedFormat(ext)),
        }
    }

    pub fn has_alpha(self) -> bool {
        !matches!(self, ImageFormat::Jpeg)
    }
}

fn points_attr(points: &[crate::geometry::Vec2f]) -> String {
    points
        .iter()
        .map(|p| format!("{:.2},{:.2}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_element(svg: &mut String, element: String) {
    svg.push_str(&element);
    svg.push('\n');
}

/// Serialise a scene as a standalone SVG document.
pub fn to_svg(scene: &Scene) -> String {
    let mut svg = String::with_capacity(4096);
    push_element(
        &mut svg,
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="13">"#,
            w = scene.width,
            h = scene.height
        ),
    );
    push_element(
        &mut svg,
        format!(
            r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            scene.width, scene.height, scene.background
        ),
    );
    for primitive in &scene.primitives {
        match primitive {
            Primitive::Line {
                from,
                to,
                stroke,
                width,
            } => {
                push_element(
                    &mut svg,
                    format!(
                        r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{}"/>"#,
                        from.x, from.y, to.x, to.y, stroke, width
                    ),
                );
            }
            Primitive::Polyline {
                points,
                stroke,
                width,
                dashed,
            } => {
                let dash = if *dashed {
                    r#" stroke-dasharray="6,3""#
                } else {
                    ""
                };
                push_element(
                    &mut svg,
                    format!(
                        r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{}"{}/>"#,
                        points_attr(points),
                        stroke,
                        width,
                        dash
                    ),
                );
            }
            Primitive::Rect {
                rect,
                stroke,
                fill,
                width,
            } => {
                push_element(
                    &mut svg,
                    format!(
                        r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
                        rect.x, rect.y, rect.width, rect.height, fill, stroke, width
                    ),
                );
            }
            Primitive::Polygon {
                points,
                stroke,
                fill,
            } => {
                let fill = fill.map(|f| f.to_hex()).unwrap_or_else(|| "none".into());
                push_element(
                    &mut svg,
                    format!(
                        r#"<polygon points="{}" fill="{}" stroke="{}"/>"#,
                        points_attr(points),
                        fill,
                        stroke
                    ),
                );
            }
            Primitive::Circle {
                center,
                radius,
                fill,
            } => {
                push_element(
                    &mut svg,
                    format!(
                        r#"<circle cx="{:.2}" cy="{:.2}" r="{}" fill="{}"/>"#,
                        center.x, center.y, radius, fill
                    ),
                );
            }
            Primitive::Text {
                at,
                text,
                color,
                anchor,
                italic,
            } => {
                let anchor = match anchor {
                    Anchor::Start => "start",
                    Anchor::Middle => "middle",
                };
                let style = if *italic { r#" font-style="italic""# } else { "" };
                push_element(
                    &mut svg,
                    format!(
                        r#"<text x="{:.2}" y="{:.2}" fill="{}" text-anchor="{}"{}>{}</text>"#,
                        at.x,
                        at.y,
                        color,
                        anchor,
                        style,
                        html_escape::encode_text(text)
                    ),
                );
            }
        }
    }
    svg.push_str("</svg>\n");
    svg
}

/// Write the scene to `path`, choosing the format from the file extension.
pub fn export_image(scene: &Scene, path: &Path) -> Result<(), ExportError> {
    let format = ImageFormat::from_path(path)?;
    match format {
        ImageFormat::Svg => std::fs::write(path, to_svg(scene))?,
        ImageFormat::Png | ImageFormat::Jpeg => raster::write(scene, path, format)?,
    }
    info!(path:? = path, format:? = format; "Exported image");
    Ok(())
}

#[cfg(feature = "raster")]
mod raster {
    use std::path::Path;

    use resvg::{tiny_skia, usvg};

    use super::{ImageFormat, to_svg};
    use crate::error::ExportError;
    use crate::render::Scene;

    pub(super) fn write(
        scene: &Scene,
        path: &Path,
        format: ImageFormat,
    ) -> Result<(), ExportError> {
        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        let tree = usvg::Tree::from_str(&to_svg(scene), &options)
            .map_err(|e| ExportError::Raster(e.to_string()))?;

        let mut pixmap = tiny_skia::Pixmap::new(scene.width, scene.height)
            .ok_or_else(|| ExportError::Raster("canvas has zero size".into()))?;
        if !format.has_alpha() {
            let bg = scene.background;
            pixmap.fill(tiny_skia::Color::from_rgba8(bg.0, bg.1, bg.2, 255));
        }
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        if format.has_alpha() {
            let bytes = pixmap
                .encode_png()
                .map_err(|e| ExportError::Raster(e.to_string()))?;
            std::fs::write(path, bytes)?;
        } else {
            // Opaque pixmap: premultiplied RGBA equals straight RGBA, drop alpha.
            let rgb: Vec<u8> = pixmap
                .data()
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            let img = image::RgbImage::from_raw(scene.width, scene.height, rgb)
                .ok_or_else(|| ExportError::Raster("pixel buffer size mismatch".into()))?;
            img.save_with_format(path, image::ImageFormat::Jpeg)
                .map_err(|e| ExportError::Raster(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(not(feature = "raster"))]
mod raster {
    use std::path::Path;

    use super::ImageFormat;
    use crate::error::ExportError;
    use crate::render::Scene;

    pub(super) fn write(
        _scene: &Scene,
        _path: &Path,
        format: ImageFormat,
    ) -> Result<(), ExportError> {
        Err(ExportError::UnsupportedFormat(format!(
            "{:?} (built without the `raster` feature)",
            format
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::geometry::Vec2f;

    fn scene_with(primitives: Vec<Primitive>) -> Scene {
        Scene {
            width: 200,
            height: 100,
            background: Rgb::WHITE,
            primitives,
        }
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ImageFormat::from_path(Path::new("a.SVG")).unwrap(), ImageFormat::Svg);
        assert_eq!(ImageFormat::from_path(Path::new("a.jpeg")).unwrap(), ImageFormat::Jpeg);
        assert!(!ImageFormat::Jpeg.has_alpha());
        assert!(ImageFormat::from_path(Path::new("a.bmp")).is_err());
        assert!(ImageFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_svg_escapes_text() {
        let svg = to_svg(&scene_with(vec![Primitive::Text {
            at: Vec2f::new(1.0, 2.0),
            text: "List<T> & more".into(),
            color: Rgb::BLACK,
            anchor: Anchor::Start,
            italic: false,
        }]));
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("List&lt;T&gt; &amp; more"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_svg_dashed_polyline() {
        let svg = to_svg(&scene_with(vec![Primitive::Polyline {
            points: vec![Vec2f::new(0.0, 0.0), Vec2f::new(10.0, 5.0)],
            stroke: Rgb::BLACK,
            width: 1.0,
            dashed: true,
        }]));
        assert!(svg.contains(r#"points="0.00,0.00 10.00,5.00""#));
        assert!(svg.contains("stroke-dasharray"));
    }
}
