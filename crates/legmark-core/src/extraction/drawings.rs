use crate::error::LegmarkError;
use crate::model::{BBox, Drawing, PaintKind, Rgb};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Form XObjects nested deeper than this are not interpreted.
const MAX_FORM_DEPTH: usize = 8;

/// US Letter, used when a page carries no usable MediaBox.
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Painted paths of one page, in top-left-origin page coordinates.
#[derive(Debug, Clone, Default)]
pub struct DrawingPage {
    pub width: f64,
    pub height: f64,
    /// `/Rotate` in degrees, normalised to `0..360`. Drawings are not rotated.
    pub rotation: i64,
    pub drawings: Vec<Drawing>,
}

/// Extract painted paths from every page of a PDF, in page order.
pub fn extract_drawings(pdf_bytes: &[u8]) -> Result<Vec<DrawingPage>, LegmarkError> {
    let doc = Document::load_mem(pdf_bytes)?;
    let mut pages = Vec::new();

    for (page_number, page_id) in doc.get_pages() {
        let media_box = inherited(&doc, page_id, b"MediaBox")
            .and_then(|obj| rect_from_object(&doc, obj))
            .unwrap_or(DEFAULT_MEDIA_BOX);

        let mut interpreter = Interpreter::new(&doc, media_box);
        match doc.get_page_content(page_id) {
            Ok(data) => {
                let resources = inherited(&doc, page_id, b"Resources")
                    .and_then(|obj| resolve(&doc, obj).as_dict().ok());
                interpreter.run(&data, resources, 0);
            }
            Err(e) => {
                tracing::warn!(page = page_number, error = %e, "page content unreadable, no drawings");
            }
        }

        let rotation = inherited(&doc, page_id, b"Rotate")
            .and_then(|obj| resolve(&doc, obj).as_i64().ok())
            .unwrap_or(0)
            .rem_euclid(360);

        pages.push(DrawingPage {
            width: media_box[2] - media_box[0],
            height: media_box[3] - media_box[1],
            rotation,
            drawings: interpreter.drawings,
        });
    }

    Ok(pages)
}

/// 2D affine matrix `[a b c d e f]` as used by the PDF `cm` operator.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f64; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// `self` applied first, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        let [a, b, c, d, e, f] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a * a2 + b * c2,
            a * b2 + b * d2,
            c * a2 + d * c2,
            c * b2 + d * d2,
            e * a2 + f * c2 + e2,
            e * b2 + f * d2 + f2,
        ])
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }
}

#[derive(Debug, Clone, Copy)]
enum FillSpace {
    Gray,
    Rgb,
    Cmyk,
    Other,
}

#[derive(Debug, Clone, Copy)]
struct GraphicsState {
    ctm: Matrix,
    fill_space: FillSpace,
    fill: Option<Rgb>,
}

impl Default for GraphicsState {
    fn default() -> Self {
        GraphicsState {
            ctm: Matrix::IDENTITY,
            fill_space: FillSpace::Gray,
            fill: Some(Rgb::BLACK),
        }
    }
}

/// Minimal content-stream interpreter that only tracks what path painting needs.
struct Interpreter<'a> {
    doc: &'a Document,
    media_box: [f64; 4],
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    path: Option<BBox>,
    drawings: Vec<Drawing>,
}

impl<'a> Interpreter<'a> {
    fn new(doc: &'a Document, media_box: [f64; 4]) -> Self {
        Interpreter {
            doc,
            media_box,
            state: GraphicsState::default(),
            stack: Vec::new(),
            path: None,
            drawings: Vec::new(),
        }
    }

    fn run(&mut self, data: &[u8], resources: Option<&'a Dictionary>, depth: usize) {
        let content = match Content::decode(data) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(error = %e, "content stream could not be decoded, skipping");
                return;
            }
        };
        for op in &content.operations {
            self.step(op, resources, depth);
        }
    }

    fn step(&mut self, op: &Operation, resources: Option<&'a Dictionary>, depth: usize) {
        let nums = numbers(&op.operands);
        match op.operator.as_str() {
            "q" => self.stack.push(self.state),
            "Q" => {
                if let Some(saved) = self.stack.pop() {
                    self.state = saved;
                }
            }
            "cm" if nums.len() == 6 => {
                let m = Matrix([nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]]);
                self.state.ctm = m.then(&self.state.ctm);
            }

            "g" if nums.len() == 1 => {
                self.state.fill_space = FillSpace::Gray;
                self.state.fill = Some(Rgb::from_gray(nums[0]));
            }
            "rg" if nums.len() == 3 => {
                self.state.fill_space = FillSpace::Rgb;
                self.state.fill = Some(Rgb::new(nums[0], nums[1], nums[2]));
            }
            "k" if nums.len() == 4 => {
                self.state.fill_space = FillSpace::Cmyk;
                self.state.fill = Some(Rgb::from_cmyk(nums[0], nums[1], nums[2], nums[3]));
            }
            "cs" => self.set_fill_space(op.operands.first()),
            "sc" | "scn" => self.set_fill_components(&op.operands, &nums),

            "re" if nums.len() == 4 => {
                let (x, y, w, h) = (nums[0], nums[1], nums[2], nums[3]);
                for (px, py) in [(x, y), (x + w, y), (x, y + h), (x + w, y + h)] {
                    self.add_point(px, py);
                }
            }
            "m" | "l" if nums.len() == 2 => self.add_point(nums[0], nums[1]),
            "c" | "v" | "y" => {
                for pair in nums.chunks_exact(2) {
                    self.add_point(pair[0], pair[1]);
                }
            }

            "f" | "F" | "f*" => self.paint(PaintKind::Fill),
            "S" | "s" => self.paint(PaintKind::Stroke),
            "B" | "B*" | "b" | "b*" => self.paint(PaintKind::FillStroke),
            "n" => self.path = None,

            "Do" => self.draw_form(op.operands.first(), resources, depth),
            _ => {}
        }
    }

    fn set_fill_space(&mut self, operand: Option<&Object>) {
        let (space, initial) = match operand {
            Some(Object::Name(name)) => match name.as_slice() {
                b"DeviceGray" | b"G" => (FillSpace::Gray, Some(Rgb::BLACK)),
                b"DeviceRGB" | b"RGB" => (FillSpace::Rgb, Some(Rgb::BLACK)),
                b"DeviceCMYK" | b"CMYK" => (FillSpace::Cmyk, Some(Rgb::BLACK)),
                _ => (FillSpace::Other, None),
            },
            _ => (FillSpace::Other, None),
        };
        self.state.fill_space = space;
        self.state.fill = initial;
    }

    fn set_fill_components(&mut self, operands: &[Object], nums: &[f64]) {
        // A trailing name selects a pattern; its color is not a device color.
        if matches!(operands.last(), Some(Object::Name(_))) {
            self.state.fill = None;
            return;
        }
        self.state.fill = match (self.state.fill_space, nums.len()) {
            (FillSpace::Gray, 1) => Some(Rgb::from_gray(nums[0])),
            (FillSpace::Rgb, 3) => Some(Rgb::new(nums[0], nums[1], nums[2])),
            (FillSpace::Cmyk, 4) => Some(Rgb::from_cmyk(nums[0], nums[1], nums[2], nums[3])),
            _ => None,
        };
    }

    fn add_point(&mut self, x: f64, y: f64) {
        let (dx, dy) = self.state.ctm.apply(x, y);
        // Flip into top-left-origin page space.
        let px = dx - self.media_box[0];
        let py = self.media_box[3] - dy;
        let point = BBox::new(px, py, px, py);
        self.path = Some(match self.path {
            Some(bbox) => bbox.union(&point),
            None => point,
        });
    }

    fn paint(&mut self, kind: PaintKind) {
        let Some(bbox) = self.path.take() else {
            return;
        };
        let fill = match kind {
            PaintKind::Stroke => None,
            PaintKind::Fill | PaintKind::FillStroke => self.state.fill,
        };
        self.drawings.push(Drawing { kind, fill, bbox });
    }

    fn draw_form(&mut self, name: Option<&Object>, resources: Option<&'a Dictionary>, depth: usize) {
        if depth >= MAX_FORM_DEPTH {
            return;
        }
        let (Some(Object::Name(name)), Some(resources)) = (name, resources) else {
            return;
        };
        let Some(xobjects) = resources
            .get(b"XObject")
            .ok()
            .and_then(|obj| resolve(self.doc, obj).as_dict().ok())
        else {
            return;
        };
        let Some(Object::Stream(stream)) = xobjects
            .get(name)
            .ok()
            .map(|obj| resolve(self.doc, obj))
        else {
            return;
        };
        let is_form = matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(n)) if n.as_slice() == b"Form");
        if !is_form {
            return;
        }

        let content = match stream.decompressed_content() {
            Ok(content) => content,
            // Uncompressed streams report an error here but carry raw content.
            Err(_) => stream.content.clone(),
        };
        let form_resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|obj| resolve(self.doc, obj).as_dict().ok())
            .or(Some(resources));

        let saved = self.state;
        let saved_depth = self.stack.len();
        if let Ok(matrix) = stream.dict.get(b"Matrix") {
            let nums = match resolve(self.doc, matrix) {
                Object::Array(items) => numbers(items),
                _ => Vec::new(),
            };
            if nums.len() == 6 {
                let m = Matrix([nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]]);
                self.state.ctm = m.then(&self.state.ctm);
            }
        }
        self.run(&content, form_resources, depth + 1);
        self.stack.truncate(saved_depth);
        self.state = saved;
    }
}

fn numbers(operands: &[Object]) -> Vec<f64> {
    operands.iter().filter_map(number).collect()
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn resolve<'d>(doc: &'d Document, obj: &'d Object) -> &'d Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Look up a page attribute, following the `Parent` chain for inheritable keys.
fn inherited<'d>(doc: &'d Document, page_id: ObjectId, key: &[u8]) -> Option<&'d Object> {
    let mut current = doc.get_dictionary(page_id).ok();
    // Bounded walk in case of a cyclic page tree.
    for _ in 0..32 {
        let dict = current?;
        if let Ok(value) = dict.get(key) {
            return Some(value);
        }
        current = dict
            .get(b"Parent")
            .ok()
            .and_then(|p| p.as_reference().ok())
            .and_then(|id| doc.get_dictionary(id).ok());
    }
    None
}

fn rect_from_object(doc: &Document, obj: &Object) -> Option<[f64; 4]> {
    let Object::Array(items) = resolve(doc, obj) else {
        return None;
    };
    let nums: Vec<f64> = items.iter().filter_map(|o| number(resolve(doc, o))).collect();
    if nums.len() != 4 {
        return None;
    }
    // Normalise so [x0, y0] is the lower-left corner.
    Some([
        nums[0].min(nums[2]),
        nums[1].min(nums[3]),
        nums[0].max(nums[2]),
        nums[1].max(nums[3]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    fn ops(content: &str) -> Vec<Drawing> {
        let doc = Document::with_version("1.5");
        let mut interpreter = Interpreter::new(&doc, DEFAULT_MEDIA_BOX);
        interpreter.run(content.as_bytes(), None, 0);
        interpreter.drawings
    }

    #[test]
    fn test_filled_rect_flipped_to_top_origin() {
        let drawings = ops("0 g 100 692 50 1 re f");
        assert_eq!(drawings.len(), 1);
        assert_eq!(drawings[0].kind, PaintKind::Fill);
        assert_eq!(drawings[0].fill, Some(Rgb::BLACK));
        assert_eq!(drawings[0].bbox, BBox::new(100.0, 99.0, 150.0, 100.0));
    }

    #[test]
    fn test_default_fill_is_black() {
        let drawings = ops("10 10 20 1 re f");
        assert_eq!(drawings[0].fill, Some(Rgb::BLACK));
    }

    #[test]
    fn test_fill_colors() {
        let drawings = ops("1 0 0 rg 0 0 10 1 re f 0 0 0 1 k 0 0 10 1 re f 0.5 g 0 0 10 1 re f");
        assert_eq!(drawings[0].fill, Some(Rgb::new(1.0, 0.0, 0.0)));
        assert_eq!(drawings[1].fill, Some(Rgb::BLACK));
        assert_eq!(drawings[2].fill, Some(Rgb::from_gray(0.5)));
    }

    #[test]
    fn test_color_space_operators() {
        let drawings = ops("/DeviceRGB cs 0 0 10 1 re f 0 0 1 sc 0 0 10 1 re f /P0 scn 0 0 10 1 re f");
        assert_eq!(drawings[0].fill, Some(Rgb::BLACK));
        assert_eq!(drawings[1].fill, Some(Rgb::new(0.0, 0.0, 1.0)));
        assert_eq!(drawings[2].fill, None);
    }

    #[test]
    fn test_save_restore_and_ctm() {
        let drawings = ops("q 1 0 0 1 100 0 cm 1 g 0 700 10 1 re f Q 0 700 10 1 re f");
        assert_eq!(drawings[0].bbox, BBox::new(100.0, 91.0, 110.0, 92.0));
        assert_eq!(drawings[0].fill, Some(Rgb::from_gray(1.0)));
        assert_eq!(drawings[1].bbox, BBox::new(0.0, 91.0, 10.0, 92.0));
        assert_eq!(drawings[1].fill, Some(Rgb::BLACK));
    }

    #[test]
    fn test_stroke_and_discard() {
        let drawings = ops("0 0 m 100 0 l S 0 0 10 10 re n 0 0 10 1 re B");
        assert_eq!(drawings.len(), 2);
        assert_eq!(drawings[0].kind, PaintKind::Stroke);
        assert_eq!(drawings[0].fill, None);
        assert_eq!(drawings[1].kind, PaintKind::FillStroke);
    }

    fn one_page_pdf(rotate: Option<i64>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content = Stream::new(dictionary! {}, b"0 g 72 700 100 1 re f".to_vec());
        let content_id = doc.add_object(content);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let mut pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        if let Some(degrees) = rotate {
            pages.set("Rotate", degrees);
        }
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_extract_from_document() {
        let pages = extract_drawings(&one_page_pdf(None)).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].width, 612.0);
        assert_eq!(pages[0].rotation, 0);
        assert_eq!(pages[0].drawings.len(), 1);
        assert_eq!(pages[0].drawings[0].bbox, BBox::new(72.0, 91.0, 172.0, 92.0));
    }

    #[test]
    fn test_inherited_rotation_is_reported() {
        let pages = extract_drawings(&one_page_pdf(Some(-90))).unwrap();
        assert_eq!(pages[0].rotation, 270);
    }

    #[test]
    fn test_garbage_is_error() {
        assert!(extract_drawings(b"not a pdf").is_err());
    }
}
