//! Slide-deck (PPTX) rendering of the brief.
//!
//! Writes a minimal PresentationML package: one blank layout, a title slide,
//! and one slide per `**Section**` that has bullet lines under it.

use crate::brief::BriefDocument;
use copilot_core::{CopilotError, CopilotResult};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fmt;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const EMU_PER_INCH: f64 = 914_400.0;
const SLIDE_WIDTH_IN: f64 = 13.33;
const SLIDE_HEIGHT_IN: f64 = 7.5;

const BRAND_BLUE: &str = "00467F";
const SUBTLE_GREY: &str = "5A5A5A";

const NAMESPACES: [(&str, &str); 3] = [
    ("xmlns:a", "http://schemas.openxmlformats.org/drawingml/2006/main"),
    ("xmlns:r", "http://schemas.openxmlformats.org/officeDocument/2006/relationships"),
    ("xmlns:p", "http://schemas.openxmlformats.org/presentationml/2006/main"),
];
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const NS: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

fn emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH).round() as i64
}

fn xml_error<E: fmt::Display>(err: E) -> CopilotError {
    CopilotError::Export(format!("slide XML: {err}"))
}

/// Event writer for one package part. Text and attribute values are escaped
/// by quick-xml.
struct PartWriter {
    xml: Writer<Vec<u8>>,
}

impl PartWriter {
    fn new() -> CopilotResult<Self> {
        let mut part = Self {
            xml: Writer::new(Vec::new()),
        };
        part.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(part)
    }

    fn emit(&mut self, event: Event<'_>) -> CopilotResult<()> {
        self.xml.write_event(event).map_err(xml_error)
    }

    fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> CopilotResult<()> {
        self.emit(Event::Start(
            BytesStart::new(name).with_attributes(attrs.iter().copied()),
        ))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> CopilotResult<()> {
        self.emit(Event::Empty(
            BytesStart::new(name).with_attributes(attrs.iter().copied()),
        ))
    }

    fn close(&mut self, name: &str) -> CopilotResult<()> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    fn text(&mut self, text: &str) -> CopilotResult<()> {
        self.emit(Event::Text(BytesText::new(text)))
    }

    /// `<p:spTree>` header shared by slides, the master and the layout.
    fn open_shape_tree(&mut self) -> CopilotResult<()> {
        self.open("p:spTree", &[])?;
        self.open("p:nvGrpSpPr", &[])?;
        self.empty("p:cNvPr", &[("id", "1"), ("name", "")])?;
        self.empty("p:cNvGrpSpPr", &[])?;
        self.empty("p:nvPr", &[])?;
        self.close("p:nvGrpSpPr")?;
        self.empty("p:grpSpPr", &[])
    }

    fn master_color_mapping(&mut self) -> CopilotResult<()> {
        self.open("p:clrMapOvr", &[])?;
        self.empty("a:masterClrMapping", &[])?;
        self.close("p:clrMapOvr")
    }

    fn finish(self) -> CopilotResult<String> {
        String::from_utf8(self.xml.into_inner()).map_err(xml_error)
    }
}

struct Run<'a> {
    text: &'a str,
    size_pt: u32,
    bold: bool,
    color: Option<&'static str>,
    centered: bool,
}

impl Run<'_> {
    fn write(&self, part: &mut PartWriter) -> CopilotResult<()> {
        part.open("a:p", &[])?;
        if self.centered {
            part.empty("a:pPr", &[("algn", "ctr")])?;
        }
        part.open("a:r", &[])?;

        let size = (self.size_pt * 100).to_string();
        let mut props = vec![("lang", "en-US"), ("sz", size.as_str())];
        if self.bold {
            props.push(("b", "1"));
        }
        props.push(("dirty", "0"));
        match self.color {
            Some(color) => {
                part.open("a:rPr", &props)?;
                part.open("a:solidFill", &[])?;
                part.empty("a:srgbClr", &[("val", color)])?;
                part.close("a:solidFill")?;
                part.close("a:rPr")?;
            }
            None => part.empty("a:rPr", &props)?,
        }

        part.open("a:t", &[])?;
        part.text(self.text)?;
        part.close("a:t")?;
        part.close("a:r")?;
        part.close("a:p")
    }
}

/// A text box positioned in inches.
struct TextBox<'a> {
    id: u32,
    rect: (f64, f64, f64, f64),
    runs: Vec<Run<'a>>,
}

impl TextBox<'_> {
    fn write(&self, part: &mut PartWriter) -> CopilotResult<()> {
        let (x, y, w, h) = self.rect;
        let id = self.id.to_string();
        let name = format!("TextBox {}", self.id);
        let (x, y, w, h) = (
            emu(x).to_string(),
            emu(y).to_string(),
            emu(w).to_string(),
            emu(h).to_string(),
        );

        part.open("p:sp", &[])?;
        part.open("p:nvSpPr", &[])?;
        part.empty("p:cNvPr", &[("id", id.as_str()), ("name", name.as_str())])?;
        part.empty("p:cNvSpPr", &[("txBox", "1")])?;
        part.empty("p:nvPr", &[])?;
        part.close("p:nvSpPr")?;

        part.open("p:spPr", &[])?;
        part.open("a:xfrm", &[])?;
        part.empty("a:off", &[("x", x.as_str()), ("y", y.as_str())])?;
        part.empty("a:ext", &[("cx", w.as_str()), ("cy", h.as_str())])?;
        part.close("a:xfrm")?;
        part.open("a:prstGeom", &[("prst", "rect")])?;
        part.empty("a:avLst", &[])?;
        part.close("a:prstGeom")?;
        part.empty("a:noFill", &[])?;
        part.close("p:spPr")?;

        part.open("p:txBody", &[])?;
        part.open("a:bodyPr", &[("wrap", "square"), ("rtlCol", "0")])?;
        part.empty("a:spAutoFit", &[])?;
        part.close("a:bodyPr")?;
        part.empty("a:lstStyle", &[])?;
        for run in &self.runs {
            run.write(part)?;
        }
        part.close("p:txBody")?;
        part.close("p:sp")
    }
}

fn slide_xml(boxes: &[TextBox<'_>]) -> CopilotResult<String> {
    let mut part = PartWriter::new()?;
    part.open("p:sld", &NAMESPACES)?;
    part.open("p:cSld", &[])?;
    part.open_shape_tree()?;
    for text_box in boxes {
        text_box.write(&mut part)?;
    }
    part.close("p:spTree")?;
    part.close("p:cSld")?;
    part.master_color_mapping()?;
    part.close("p:sld")?;
    part.finish()
}

fn title_slide(brief: &BriefDocument) -> CopilotResult<String> {
    let subtitle = format!("{} – {}", brief.window.start, brief.window.end);
    slide_xml(&[
        TextBox {
            id: 2,
            rect: (1.0, 2.5, 11.33, 2.0),
            runs: vec![Run {
                text: "Eloqua Performance Brief",
                size_pt: 48,
                bold: true,
                color: Some(BRAND_BLUE),
                centered: true,
            }],
        },
        TextBox {
            id: 3,
            rect: (1.0, 4.2, 11.33, 1.0),
            runs: vec![Run {
                text: &subtitle,
                size_pt: 24,
                bold: false,
                color: Some(SUBTLE_GREY),
                centered: true,
            }],
        },
    ])
}

fn section_slide(title: &str, bullets: &[String]) -> CopilotResult<String> {
    let body = bullets
        .iter()
        .map(|b| Run {
            text: b,
            size_pt: 20,
            bold: false,
            color: None,
            centered: false,
        })
        .collect();
    slide_xml(&[
        TextBox {
            id: 2,
            rect: (0.6, 0.4, 12.1, 1.0),
            runs: vec![Run {
                text: title,
                size_pt: 32,
                bold: true,
                color: Some(BRAND_BLUE),
                centered: false,
            }],
        },
        TextBox {
            id: 3,
            rect: (1.0, 1.5, 11.0, 5.0),
            runs: body,
        },
    ])
}

/// `(title, bullets)` for each `**Section**` that has at least one bullet.
fn sections(markdown: &str) -> Vec<(String, Vec<String>)> {
    let mut out = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;
    for line in markdown.lines() {
        let trimmed = line.trim();
        if line.len() >= 4 && line.starts_with("**") && line.ends_with("**") {
            if let Some(done) = current.take().filter(|(_, b)| !b.is_empty()) {
                out.push(done);
            }
            current = Some((line.trim_matches('*').to_string(), Vec::new()));
        } else if let Some(item) = trimmed.strip_prefix("- ") {
            if let Some((_, bullets)) = current.as_mut() {
                bullets.push(item.replace("**", ""));
            }
        }
    }
    if let Some(done) = current.filter(|(_, b)| !b.is_empty()) {
        out.push(done);
    }
    out
}

fn content_types(slide_count: usize) -> String {
    let slides: String = (1..=slide_count)
        .map(|n| format!(r#"<Override PartName="/ppt/slides/slide{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#))
        .collect();
    format!(
        concat!(
            "{decl}",
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>"#,
            r#"<Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>"#,
            r#"<Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#,
            r#"<Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>"#,
            "{slides}</Types>"
        ),
        decl = XML_DECL,
        slides = slides
    )
}

fn relationships(rels: &[(&str, String)]) -> String {
    let body: String = rels
        .iter()
        .enumerate()
        .map(|(i, (kind, target))| {
            format!(
                r#"<Relationship Id="rId{}" Type="{REL_TYPE}/{kind}" Target="{target}"/>"#,
                i + 1
            )
        })
        .collect();
    format!(r#"{XML_DECL}<Relationships xmlns="{REL_NS}">{body}</Relationships>"#)
}

fn presentation(slide_count: usize) -> String {
    // rId1 master, rId2 theme, slides from rId3
    let ids: String = (0..slide_count)
        .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, 3 + i))
        .collect();
    format!(
        concat!(
            "{decl}<p:presentation {ns}>",
            r#"<p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst>"#,
            "<p:sldIdLst>{ids}</p:sldIdLst>",
            r#"<p:sldSz cx="{cx}" cy="{cy}"/><p:notesSz cx="6858000" cy="9144000"/>"#,
            "</p:presentation>"
        ),
        decl = XML_DECL,
        ns = NS,
        ids = ids,
        cx = emu(SLIDE_WIDTH_IN),
        cy = emu(SLIDE_HEIGHT_IN)
    )
}

fn slide_master() -> CopilotResult<String> {
    let mut part = PartWriter::new()?;
    part.open("p:sldMaster", &NAMESPACES)?;
    part.open("p:cSld", &[])?;
    part.open_shape_tree()?;
    part.close("p:spTree")?;
    part.close("p:cSld")?;
    part.empty(
        "p:clrMap",
        &[
            ("bg1", "lt1"),
            ("tx1", "dk1"),
            ("bg2", "lt2"),
            ("tx2", "dk2"),
            ("accent1", "accent1"),
            ("accent2", "accent2"),
            ("accent3", "accent3"),
            ("accent4", "accent4"),
            ("accent5", "accent5"),
            ("accent6", "accent6"),
            ("hlink", "hlink"),
            ("folHlink", "folHlink"),
        ],
    )?;
    part.open("p:sldLayoutIdLst", &[])?;
    part.empty("p:sldLayoutId", &[("id", "2147483649"), ("r:id", "rId1")])?;
    part.close("p:sldLayoutIdLst")?;
    part.close("p:sldMaster")?;
    part.finish()
}

fn slide_layout() -> CopilotResult<String> {
    let mut part = PartWriter::new()?;
    let mut attrs = NAMESPACES.to_vec();
    attrs.extend([("type", "blank"), ("preserve", "1")]);
    part.open("p:sldLayout", &attrs)?;
    part.open("p:cSld", &[("name", "Blank")])?;
    part.open_shape_tree()?;
    part.close("p:spTree")?;
    part.close("p:cSld")?;
    part.master_color_mapping()?;
    part.close("p:sldLayout")?;
    part.finish()
}

fn theme() -> String {
    let srgb = |name: &str, val: &str| format!(r#"<a:{name}><a:srgbClr val="{val}"/></a:{name}>"#);
    let colors = [
        ("dk2", "1F497D"),
        ("lt2", "EEECE1"),
        ("accent1", "00467F"),
        ("accent2", "C0504D"),
        ("accent3", "9BBB59"),
        ("accent4", "8064A2"),
        ("accent5", "4BACC6"),
        ("accent6", "F79646"),
        ("hlink", "0000FF"),
        ("folHlink", "800080"),
    ]
    .iter()
    .map(|(n, v)| srgb(n, v))
    .collect::<String>();
    let fill = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let line = format!(r#"<a:ln w="9525">{fill}</a:ln>"#);
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";
    format!(
        concat!(
            r#"{decl}<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Copilot"><a:themeElements>"#,
            r#"<a:clrScheme name="Copilot"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>"#,
            r#"<a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>{colors}</a:clrScheme>"#,
            r#"<a:fontScheme name="Copilot"><a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
            r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont></a:fontScheme>"#,
            r#"<a:fmtScheme name="Copilot"><a:fillStyleLst>{fill}{fill}{fill}</a:fillStyleLst>"#,
            "<a:lnStyleLst>{line}{line}{line}</a:lnStyleLst>",
            "<a:effectStyleLst>{effect}{effect}{effect}</a:effectStyleLst>",
            "<a:bgFillStyleLst>{fill}{fill}{fill}</a:bgFillStyleLst></a:fmtScheme>",
            "</a:themeElements></a:theme>"
        ),
        decl = XML_DECL,
        colors = colors,
        fill = fill,
        line = line,
        effect = effect
    )
}

fn zip_error(err: zip::result::ZipError) -> CopilotError {
    CopilotError::Export(format!("slide deck packaging failed: {err}"))
}

/// Render the brief as a PPTX deck.
pub fn render_slides(brief: &BriefDocument) -> CopilotResult<Vec<u8>> {
    let mut slides = vec![title_slide(brief)?];
    for (title, bullets) in sections(&brief.markdown) {
        slides.push(section_slide(&title, &bullets)?);
    }

    let mut presentation_rels = vec![
        ("slideMaster", "slideMasters/slideMaster1.xml".to_string()),
        ("theme", "theme/theme1.xml".to_string()),
    ];
    presentation_rels.extend((1..=slides.len()).map(|n| ("slide", format!("slides/slide{n}.xml"))));

    let mut parts: Vec<(String, String)> = vec![
        ("[Content_Types].xml".into(), content_types(slides.len())),
        (
            "_rels/.rels".into(),
            relationships(&[("officeDocument", "ppt/presentation.xml".into())]),
        ),
        ("ppt/presentation.xml".into(), presentation(slides.len())),
        (
            "ppt/_rels/presentation.xml.rels".into(),
            relationships(&presentation_rels),
        ),
        ("ppt/slideMasters/slideMaster1.xml".into(), slide_master()?),
        (
            "ppt/slideMasters/_rels/slideMaster1.xml.rels".into(),
            relationships(&[
                ("slideLayout", "../slideLayouts/slideLayout1.xml".into()),
                ("theme", "../theme/theme1.xml".into()),
            ]),
        ),
        ("ppt/slideLayouts/slideLayout1.xml".into(), slide_layout()?),
        (
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels".into(),
            relationships(&[("slideMaster", "../slideMasters/slideMaster1.xml".into())]),
        ),
        ("ppt/theme/theme1.xml".into(), theme()),
    ];
    for (i, slide) in slides.into_iter().enumerate() {
        let n = i + 1;
        parts.push((format!("ppt/slides/slide{n}.xml"), slide));
        parts.push((
            format!("ppt/slides/_rels/slide{n}.xml.rels"),
            relationships(&[("slideLayout", "../slideLayouts/slideLayout1.xml".into())]),
        ));
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, body) in parts {
        zip.start_file(name, options).map_err(zip_error)?;
        zip.write_all(body.as_bytes())?;
    }
    let cursor = zip.finish().map_err(zip_error)?;
    Ok(cursor.into_inner())
}
