use std::fmt::Write as _;
use std::io::{Cursor, Write};

use anyhow::Result;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::templates::*;
use super::{
    AutoShape, Connector, LineStyle, Presentation, Rect, Slide, SlideShape, TextBox, TextStyle,
    escape_xml, pt_to_emu,
};
use crate::theme::to_srgb_hex;

/// PresentationML accepts slide sides between 1 and 56 inches.
const MIN_SLIDE_EMU: i64 = 914_400;
const MAX_SLIDE_EMU: i64 = 51_206_400;

/// Serializes the presentation as an Office Open XML package.
pub fn write_package(presentation: &Presentation) -> Result<Vec<u8>> {
    let parts = package_parts(presentation);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, body) in &parts {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(body.as_bytes())?;
    }
    let cursor = zip.finish()?;
    let bytes = cursor.into_inner();
    tracing::debug!(
        parts = parts.len(),
        bytes = bytes.len(),
        slides = presentation.slides.len(),
        "wrote presentation package"
    );
    Ok(bytes)
}

fn package_parts(presentation: &Presentation) -> Vec<(String, String)> {
    let slide_count = presentation.slides.len();
    let font = presentation
        .slides
        .iter()
        .flat_map(|slide| slide.auto_shapes())
        .map(|shape| shape.text_style.font_family.as_str())
        .next()
        .unwrap_or("Calibri");

    let mut parts = vec![
        ("[Content_Types].xml".to_string(), content_types(slide_count)),
        ("_rels/.rels".to_string(), root_rels()),
        ("docProps/core.xml".to_string(), core_props(&presentation.title)),
        ("docProps/app.xml".to_string(), app_props(slide_count)),
        ("ppt/presentation.xml".to_string(), presentation_xml(presentation)),
        (
            "ppt/_rels/presentation.xml.rels".to_string(),
            presentation_rels(slide_count),
        ),
        ("ppt/presProps.xml".to_string(), pres_props()),
        ("ppt/viewProps.xml".to_string(), view_props()),
        ("ppt/tableStyles.xml".to_string(), table_styles()),
        ("ppt/theme/theme1.xml".to_string(), theme(font)),
        ("ppt/slideMasters/slideMaster1.xml".to_string(), slide_master()),
        (
            "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
            relationships(&[
                ("rId1", REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml"),
                ("rId2", REL_THEME, "../theme/theme1.xml"),
            ]),
        ),
        ("ppt/slideLayouts/slideLayout1.xml".to_string(), blank_layout()),
        (
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels".to_string(),
            relationships(&[("rId1", REL_SLIDE_MASTER, "../slideMasters/slideMaster1.xml")]),
        ),
    ];

    for (idx, slide) in presentation.slides.iter().enumerate() {
        let n = idx + 1;
        parts.push((
            format!("ppt/slides/slide{n}.xml"),
            slide_xml(slide, &presentation.background),
        ));
        parts.push((
            format!("ppt/slides/_rels/slide{n}.xml.rels"),
            relationships(&[("rId1", REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml")]),
        ));
    }
    parts
}

fn relationships(rels: &[(&str, &str, &str)]) -> String {
    let mut xml = format!("{XML_DECL}<Relationships xmlns=\"{REL_NS}\">");
    for (id, kind, target) in rels {
        let _ = write!(
            xml,
            "<Relationship Id=\"{id}\" Type=\"{kind}\" Target=\"{target}\"/>"
        );
    }
    xml.push_str("</Relationships>");
    xml
}

fn content_types(slide_count: usize) -> String {
    let mut xml = format!(
        "{XML_DECL}<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
<Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
<Default Extension=\"xml\" ContentType=\"application/xml\"/>"
    );
    let overrides = [
        ("/ppt/presentation.xml", CT_PRESENTATION),
        ("/ppt/presProps.xml", CT_PRES_PROPS),
        ("/ppt/viewProps.xml", CT_VIEW_PROPS),
        ("/ppt/tableStyles.xml", CT_TABLE_STYLES),
        ("/ppt/theme/theme1.xml", CT_THEME),
        ("/ppt/slideMasters/slideMaster1.xml", CT_SLIDE_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml", CT_SLIDE_LAYOUT),
        ("/docProps/core.xml", CT_CORE_PROPS),
        ("/docProps/app.xml", CT_EXTENDED_PROPS),
    ];
    for (part, content_type) in overrides {
        let _ = write!(
            xml,
            "<Override PartName=\"{part}\" ContentType=\"{content_type}\"/>"
        );
    }
    for n in 1..=slide_count {
        let _ = write!(
            xml,
            "<Override PartName=\"/ppt/slides/slide{n}.xml\" ContentType=\"{CT_SLIDE}\"/>"
        );
    }
    xml.push_str("</Types>");
    xml
}

fn root_rels() -> String {
    relationships(&[
        ("rId1", REL_OFFICE_DOCUMENT, "ppt/presentation.xml"),
        ("rId2", REL_CORE_PROPS, "docProps/core.xml"),
        ("rId3", REL_EXTENDED_PROPS, "docProps/app.xml"),
    ])
}

fn core_props(title: &str) -> String {
    format!(
        concat!(
            "{decl}<cp:coreProperties ",
            "xmlns:cp=\"http://schemas.openxmlformats.org/package/2006/metadata/core-properties\" ",
            "xmlns:dc=\"http://purl.org/dc/elements/1.1/\" ",
            "xmlns:dcterms=\"http://purl.org/dc/terms/\" ",
            "xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\">",
            "<dc:title>{title}</dc:title><dc:creator>{creator}</dc:creator>",
            "</cp:coreProperties>"
        ),
        decl = XML_DECL,
        title = escape_xml(title),
        creator = env!("CARGO_PKG_NAME"),
    )
}

fn app_props(slide_count: usize) -> String {
    format!(
        "{XML_DECL}<Properties xmlns=\"http://schemas.openxmlformats.org/officeDocument/2006/extended-properties\">\
<Application>{}</Application><Slides>{slide_count}</Slides></Properties>",
        env!("CARGO_PKG_NAME")
    )
}

fn presentation_rels(slide_count: usize) -> String {
    // rId1 master, rId2.. slides, then the three property parts
    let mut rels: Vec<(String, &str, String)> = vec![(
        "rId1".to_string(),
        REL_SLIDE_MASTER,
        "slideMasters/slideMaster1.xml".to_string(),
    )];
    for n in 1..=slide_count {
        rels.push((format!("rId{}", n + 1), REL_SLIDE, format!("slides/slide{n}.xml")));
    }
    let base = slide_count + 2;
    rels.push((format!("rId{base}"), REL_PRES_PROPS, "presProps.xml".to_string()));
    rels.push((format!("rId{}", base + 1), REL_VIEW_PROPS, "viewProps.xml".to_string()));
    rels.push((format!("rId{}", base + 2), REL_THEME, "theme/theme1.xml".to_string()));
    rels.push((
        format!("rId{}", base + 3),
        REL_TABLE_STYLES,
        "tableStyles.xml".to_string(),
    ));
    let borrowed: Vec<(&str, &str, &str)> = rels
        .iter()
        .map(|(id, kind, target)| (id.as_str(), *kind, target.as_str()))
        .collect();
    relationships(&borrowed)
}

pub(super) fn slide_extent(points: f32) -> i64 {
    pt_to_emu(points).clamp(MIN_SLIDE_EMU, MAX_SLIDE_EMU)
}

fn presentation_xml(presentation: &Presentation) -> String {
    let cx = slide_extent(presentation.slide_width);
    let cy = slide_extent(presentation.slide_height);
    if cx != pt_to_emu(presentation.slide_width) || cy != pt_to_emu(presentation.slide_height) {
        tracing::warn!(
            width = presentation.slide_width,
            height = presentation.slide_height,
            "slide size clamped to the PresentationML range"
        );
    }
    let mut xml = format!("{XML_DECL}<p:presentation {NS_MAIN} saveSubsetFonts=\"1\">");
    xml.push_str("<p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"rId1\"/></p:sldMasterIdLst>");
    xml.push_str("<p:sldIdLst>");
    for n in 1..=presentation.slides.len() {
        let _ = write!(xml, "<p:sldId id=\"{}\" r:id=\"rId{}\"/>", 255 + n, n + 1);
    }
    xml.push_str("</p:sldIdLst>");
    let _ = write!(
        xml,
        "<p:sldSz cx=\"{cx}\" cy=\"{cy}\"/><p:notesSz cx=\"6858000\" cy=\"9144000\"/></p:presentation>"
    );
    xml
}

pub(super) fn slide_xml(slide: &Slide, background: &str) -> String {
    let mut xml = format!("{XML_DECL}<p:sld {NS_MAIN}><p:cSld>");
    let _ = write!(
        xml,
        "<p:bg><p:bgPr>{}<a:effectLst/></p:bgPr></p:bg>",
        solid_fill(background)
    );
    xml.push_str("<p:spTree>");
    xml.push_str(EMPTY_GROUP_PROPS);
    for shape in &slide.shapes {
        match shape {
            SlideShape::Auto(shape) => auto_shape_xml(&mut xml, shape),
            SlideShape::Text(shape) => text_box_xml(&mut xml, shape),
            SlideShape::Connector(shape) => connector_xml(&mut xml, shape),
        }
    }
    xml.push_str("</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>");
    xml
}

fn solid_fill(color: &str) -> String {
    format!(
        "<a:solidFill><a:srgbClr val=\"{}\"/></a:solidFill>",
        to_srgb_hex(color)
    )
}

fn line_xml(line: Option<&LineStyle>) -> String {
    match line {
        Some(line) if line.width > 0.0 => format!(
            "<a:ln w=\"{}\">{}</a:ln>",
            pt_to_emu(line.width),
            solid_fill(&line.color)
        ),
        _ => "<a:ln><a:noFill/></a:ln>".to_string(),
    }
}

fn xfrm(rect: &Rect) -> String {
    format!(
        "<a:xfrm><a:off x=\"{}\" y=\"{}\"/><a:ext cx=\"{}\" cy=\"{}\"/></a:xfrm>",
        pt_to_emu(rect.x),
        pt_to_emu(rect.y),
        pt_to_emu(rect.width).max(0),
        pt_to_emu(rect.height).max(0)
    )
}

fn paragraph(text: &str, style: &TextStyle) -> String {
    let mut xml = String::new();
    for line in text.split('\n') {
        let _ = write!(
            xml,
            "<a:p><a:pPr algn=\"ctr\"/><a:r><a:rPr lang=\"en-US\" sz=\"{}\" b=\"{}\" dirty=\"0\">{}<a:latin typeface=\"{}\"/></a:rPr><a:t>{}</a:t></a:r></a:p>",
            (style.size * 100.0).round() as i64,
            if style.bold { 1 } else { 0 },
            solid_fill(&style.color),
            escape_xml(&style.font_family),
            escape_xml(line)
        );
    }
    xml
}

fn auto_shape_xml(xml: &mut String, shape: &AutoShape) {
    let _ = write!(
        xml,
        "<p:sp><p:nvSpPr><p:cNvPr id=\"{}\" name=\"{}\"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>",
        shape.id,
        escape_xml(&shape.name)
    );
    let _ = write!(
        xml,
        "<p:spPr>{}<a:prstGeom prst=\"{}\"><a:avLst/></a:prstGeom>",
        xfrm(&shape.rect),
        shape.geometry.preset()
    );
    match shape.fill.as_deref() {
        Some(fill) => xml.push_str(&solid_fill(fill)),
        None => xml.push_str("<a:noFill/>"),
    }
    xml.push_str(&line_xml(shape.line.as_ref()));
    if shape.shadow {
        xml.push_str(
            "<a:effectLst><a:outerShdw blurRad=\"76200\" dist=\"38100\" dir=\"2700000\" algn=\"tl\" rotWithShape=\"0\">\
<a:srgbClr val=\"000000\"><a:alpha val=\"35000\"/></a:srgbClr></a:outerShdw></a:effectLst>",
        );
    }
    xml.push_str("</p:spPr>");
    let _ = write!(
        xml,
        "<p:txBody><a:bodyPr wrap=\"square\" lIns=\"91440\" tIns=\"45720\" rIns=\"91440\" bIns=\"45720\" rtlCol=\"0\" anchor=\"ctr\"><a:normAutofit/></a:bodyPr><a:lstStyle/>{}</p:txBody></p:sp>",
        paragraph(&shape.text, &shape.text_style)
    );
}

fn text_box_xml(xml: &mut String, shape: &TextBox) {
    let _ = write!(
        xml,
        "<p:sp><p:nvSpPr><p:cNvPr id=\"{}\" name=\"{}\"/><p:cNvSpPr txBox=\"1\"/><p:nvPr/></p:nvSpPr>",
        shape.id,
        escape_xml(&shape.name)
    );
    let _ = write!(
        xml,
        "<p:spPr>{}<a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom><a:noFill/><a:ln><a:noFill/></a:ln></p:spPr>",
        xfrm(&shape.rect)
    );
    let _ = write!(
        xml,
        "<p:txBody><a:bodyPr wrap=\"none\" lIns=\"0\" tIns=\"0\" rIns=\"0\" bIns=\"0\" rtlCol=\"0\" anchor=\"ctr\"><a:noAutofit/></a:bodyPr><a:lstStyle/>{}</p:txBody></p:sp>",
        paragraph(&shape.text, &shape.text_style)
    );
}

/// Geometry of an elbow connector from `start` to `finish`.
///
/// The vertical-first route is a `bentConnector3` rotated a quarter turn, so
/// the stored extents are swapped and flips encode the direction of travel.
pub(super) struct ConnectorFrame {
    pub off: (i64, i64),
    pub ext: (i64, i64),
    pub flip_h: bool,
    pub flip_v: bool,
}

pub(super) fn connector_frame(start: (f32, f32), finish: (f32, f32)) -> ConnectorFrame {
    let dx = (finish.0 - start.0).abs();
    let dy = (finish.1 - start.1).abs();
    let cx = (start.0 + finish.0) / 2.0;
    let cy = (start.1 + finish.1) / 2.0;
    ConnectorFrame {
        off: (pt_to_emu(cx - dy / 2.0), pt_to_emu(cy - dx / 2.0)),
        ext: (pt_to_emu(dy), pt_to_emu(dx)),
        flip_h: finish.1 < start.1,
        flip_v: finish.0 > start.0,
    }
}

fn connector_xml(xml: &mut String, conn: &Connector) {
    let frame = connector_frame(conn.start, conn.finish);
    let _ = write!(
        xml,
        "<p:cxnSp><p:nvCxnSpPr><p:cNvPr id=\"{}\" name=\"{}\"/><p:cNvCxnSpPr>\
<a:stCxn id=\"{}\" idx=\"{}\"/><a:endCxn id=\"{}\" idx=\"{}\"/></p:cNvCxnSpPr><p:nvPr/></p:nvCxnSpPr>",
        conn.id,
        escape_xml(&conn.name),
        conn.begin.id,
        conn.begin.site,
        conn.end.id,
        conn.end.site
    );
    let mut flips = String::new();
    if frame.flip_h {
        flips.push_str(" flipH=\"1\"");
    }
    if frame.flip_v {
        flips.push_str(" flipV=\"1\"");
    }
    let _ = write!(
        xml,
        "<p:spPr><a:xfrm rot=\"5400000\"{flips}><a:off x=\"{}\" y=\"{}\"/><a:ext cx=\"{}\" cy=\"{}\"/></a:xfrm>\
<a:prstGeom prst=\"bentConnector3\"><a:avLst><a:gd name=\"adj1\" fmla=\"val 50000\"/></a:avLst></a:prstGeom>{}</p:spPr></p:cxnSp>",
        frame.off.0,
        frame.off.1,
        frame.ext.0,
        frame.ext.1,
        line_xml(Some(&conn.line))
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Geometry, SITE_BOTTOM, SITE_TOP, ShapeRef};
    use std::io::Read;

    fn text_style() -> TextStyle {
        TextStyle {
            font_family: "Aptos Display".to_string(),
            size: 18.0,
            bold: true,
            color: "#000000".to_string(),
        }
    }

    fn sample() -> Presentation {
        let mut pres = Presentation::new("Sample & Co", 720.0, 540.0);
        let slide = pres.add_slide();
        let a = slide
            .add_auto_shape(
                Geometry::RoundRect,
                Rect::new(100.0, 36.0, 180.0, 86.4),
                "A <Holding>",
                text_style(),
            )
            .id;
        let b = slide
            .add_auto_shape(
                Geometry::RoundRect,
                Rect::new(300.0, 230.4, 180.0, 86.4),
                "B",
                text_style(),
            )
            .id;
        slide.add_connector(
            ShapeRef { id: a, site: SITE_BOTTOM },
            ShapeRef { id: b, site: SITE_TOP },
            LineStyle {
                color: "#000000".to_string(),
                width: 1.5,
            },
        );
        slide.add_text_box(Rect::centered_at(290.0, 176.0, 43.2, 18.0), "60.0%", text_style());
        pres
    }

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut body = String::new();
        file.read_to_string(&mut body).unwrap();
        body
    }

    #[test]
    fn package_contains_required_parts() {
        let bytes = write_package(&sample()).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        for required in [
            "[Content_Types].xml",
            "_rels/.rels",
            "ppt/presentation.xml",
            "ppt/slides/slide1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/theme/theme1.xml",
        ] {
            assert!(names.contains(&required), "missing {required}");
        }
    }

    #[test]
    fn slide_glues_connector_to_shapes() {
        let bytes = write_package(&sample()).unwrap();
        let slide = read_part(&bytes, "ppt/slides/slide1.xml");
        assert!(slide.contains("<a:stCxn id=\"2\" idx=\"2\"/>"));
        assert!(slide.contains("<a:endCxn id=\"3\" idx=\"0\"/>"));
        assert!(slide.contains("prst=\"bentConnector3\""));
        assert!(slide.contains("A &lt;Holding&gt;"));
        assert!(slide.contains("txBox=\"1\""));
    }

    #[test]
    fn presentation_declares_slide_size() {
        let bytes = write_package(&sample()).unwrap();
        let xml = read_part(&bytes, "ppt/presentation.xml");
        assert!(xml.contains("<p:sldSz cx=\"9144000\" cy=\"6858000\"/>"));
        let core = read_part(&bytes, "docProps/core.xml");
        assert!(core.contains("Sample &amp; Co"));
    }

    #[test]
    fn output_is_deterministic() {
        let first = write_package(&sample()).unwrap();
        let second = write_package(&sample()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn connector_frame_downward_right() {
        let frame = connector_frame((100.0, 100.0), (200.0, 300.0));
        assert_eq!(frame.ext, (pt_to_emu(200.0), pt_to_emu(100.0)));
        assert_eq!(frame.off, (pt_to_emu(50.0), pt_to_emu(150.0)));
        assert!(frame.flip_v);
        assert!(!frame.flip_h);
    }

    #[test]
    fn connector_frame_upward_left() {
        let frame = connector_frame((200.0, 300.0), (100.0, 100.0));
        assert!(frame.flip_h);
        assert!(!frame.flip_v);
    }

    #[test]
    fn slide_extent_is_clamped() {
        assert_eq!(slide_extent(10.0), MIN_SLIDE_EMU);
        assert_eq!(slide_extent(100_000.0), MAX_SLIDE_EMU);
        assert_eq!(slide_extent(720.0), 9_144_000);
    }
}
