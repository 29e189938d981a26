//! Paginated PDF rendering of the brief.
//!
//! Emits a plain PDF 1.4 file: US Letter pages, one-inch margins, the
//! standard Helvetica faces in WinAnsi encoding, and one content stream per
//! page. Lines are wrapped on an average glyph width.

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;

const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 10.0;
const LEADING: f32 = 1.2;
/// Average Helvetica advance width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Face {
    Regular,
    Bold,
}

impl Face {
    fn resource(self) -> &'static str {
        match self {
            Face::Regular => "F1",
            Face::Bold => "F2",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Block {
    Text { text: String, face: Face, size: f32 },
    Space(f32),
}

fn strip_emphasis(text: &str) -> String {
    text.replace("**", "")
}

/// Map brief Markdown lines onto styled blocks.
fn layout(markdown: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    for line in markdown.lines() {
        let trimmed = line.trim();
        if let Some(title) = line.strip_prefix("# ") {
            blocks.push(Block::Text {
                text: title.trim().to_string(),
                face: Face::Bold,
                size: TITLE_SIZE,
            });
            blocks.push(Block::Space(12.0));
        } else if line.len() >= 4 && line.starts_with("**") && line.ends_with("**") {
            blocks.push(Block::Text {
                text: line.trim_matches('*').to_string(),
                face: Face::Bold,
                size: BODY_SIZE,
            });
        } else if line.starts_with("**") {
            // Bold lead-in with trailing text, set off from its neighbours.
            blocks.push(Block::Space(8.0));
            blocks.push(Block::Text {
                text: line.trim_matches('*').to_string(),
                face: Face::Bold,
                size: BODY_SIZE,
            });
            blocks.push(Block::Space(4.0));
        } else if let Some(item) = trimmed.strip_prefix("- ") {
            blocks.push(Block::Text {
                text: format!("• {}", strip_emphasis(item)),
                face: Face::Regular,
                size: BODY_SIZE,
            });
        } else if trimmed.is_empty() {
            blocks.push(Block::Space(6.0));
        } else {
            blocks.push(Block::Text {
                text: strip_emphasis(line),
                face: Face::Regular,
                size: BODY_SIZE,
            });
        }
    }
    blocks
}

/// Greedy word wrap to at most `max_chars` characters per line.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = current.chars().count() + usize::from(!current.is_empty()) + word.chars().count();
        if !current.is_empty() && needed > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Encode text for a WinAnsi-encoded base font, escaping string delimiters.
fn encode_text(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(ch as u8);
            }
            ' '..='~' => out.push(ch as u8),
            '\u{a0}'..='\u{ff}' => out.push(ch as u32 as u8),
            '‘' => out.push(0x91),
            '’' => out.push(0x92),
            '“' => out.push(0x93),
            '”' => out.push(0x94),
            '•' => out.push(0x95),
            '–' => out.push(0x96),
            '—' => out.push(0x97),
            'Δ' => out.extend_from_slice(b"Delta"),
            _ => out.push(b'?'),
        }
    }
    out
}

/// Accumulates page content streams while tracking the text cursor.
struct Pages {
    done: Vec<Vec<u8>>,
    current: Vec<u8>,
    y: f32,
}

impl Pages {
    fn new() -> Self {
        Self {
            done: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn break_page(&mut self) {
        self.done.push(std::mem::take(&mut self.current));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn space(&mut self, points: f32) {
        self.y -= points;
        if self.y < MARGIN {
            self.break_page();
        }
    }

    fn line(&mut self, text: &str, face: Face, size: f32) {
        let height = size * LEADING;
        if self.y - height < MARGIN {
            self.break_page();
        }
        self.y -= height;
        let op = format!(
            "BT /{} {} Tf {} {:.2} Td (",
            face.resource(),
            size,
            MARGIN,
            self.y
        );
        self.current.extend_from_slice(op.as_bytes());
        self.current.extend_from_slice(&encode_text(text));
        self.current.extend_from_slice(b") Tj ET\n");
    }

    fn finish(mut self) -> Vec<Vec<u8>> {
        if !self.current.is_empty() || self.done.is_empty() {
            self.done.push(self.current);
        }
        self.done
    }
}

/// Serializes numbered objects and remembers their byte offsets for the xref table.
struct PdfWriter {
    buf: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");
        Self {
            buf,
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, body: &[u8]) {
        self.offsets.push(self.buf.len());
        let id = self.offsets.len();
        self.buf
            .extend_from_slice(format!("{id} 0 obj\n").as_bytes());
        self.buf.extend_from_slice(body);
        self.buf.extend_from_slice(b"\nendobj\n");
    }

    fn stream(&mut self, content: &[u8]) {
        let mut body = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(b"\nendstream");
        self.object(&body);
    }

    fn finish(mut self) -> Vec<u8> {
        let xref_at = self.buf.len();
        let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", self.offsets.len() + 1);
        for offset in &self.offsets {
            tail.push_str(&format!("{offset:010} 00000 n \n"));
        }
        tail.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            self.offsets.len() + 1
        ));
        self.buf.extend_from_slice(tail.as_bytes());
        self.buf
    }
}

/// Render brief Markdown as a paginated PDF document.
pub fn render_pdf(markdown: &str) -> Vec<u8> {
    let usable_width = PAGE_WIDTH - 2.0 * MARGIN;
    let mut pages = Pages::new();
    for block in layout(markdown) {
        match block {
            Block::Space(points) => pages.space(points),
            Block::Text { text, face, size } => {
                let max_chars = (usable_width / (size * AVG_GLYPH_WIDTH)) as usize;
                for line in wrap(&text, max_chars) {
                    pages.line(&line, face, size);
                }
            }
        }
    }
    let pages = pages.finish();

    // 1 catalog, 2 page tree, 3-4 fonts, then (page, content) pairs.
    let first_page = 5;
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", first_page + 2 * i))
        .collect();

    let mut pdf = PdfWriter::new();
    pdf.object(b"<< /Type /Catalog /Pages 2 0 R >>");
    pdf.object(
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        )
        .as_bytes(),
    );
    pdf.object(b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>");
    pdf.object(
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    );
    for (i, content) in pages.iter().enumerate() {
        let content_id = first_page + 2 * i + 1;
        pdf.object(
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
                 /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {content_id} 0 R >>"
            )
            .as_bytes(),
        );
        pdf.stream(content);
    }
    pdf.finish()
}
