use crate::error::LegmarkError;
use crate::model::{BBox, Word};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Words of one `<page>` element from `pdftotext -bbox` output.
#[derive(Debug, Clone, Default)]
pub struct BboxPage {
    pub width: f64,
    pub height: f64,
    pub words: Vec<Word>,
}

/// Parse the XHTML written by `pdftotext -bbox`.
///
/// Coordinates are already top-left origin in points, which matches the layout
/// model. Words with unparseable coordinates are skipped.
pub fn parse_bbox_xml(xml: &str) -> Result<Vec<BboxPage>, LegmarkError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut pages: Vec<BboxPage> = Vec::new();
    let mut current_word: Option<(BBox, String)> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            LegmarkError::BboxXml(format!("at byte {}: {}", reader.buffer_position(), e))
        })?;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"page" => pages.push(parse_page(&e)?),
                b"word" => current_word = parse_word_bbox(&e)?.map(|b| (b, String::new())),
                _ => {}
            },
            Event::Empty(e) => {
                // <page/> with no words still counts as a page.
                if e.name().as_ref() == b"page" {
                    pages.push(parse_page(&e)?);
                }
            }
            Event::Text(t) => {
                if let Some((_, text)) = current_word.as_mut() {
                    let unescaped = t
                        .unescape()
                        .map_err(|e| LegmarkError::BboxXml(e.to_string()))?;
                    text.push_str(&unescaped);
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == b"word" {
                    if let Some((bbox, text)) = current_word.take() {
                        let page = pages.last_mut().ok_or_else(|| {
                            LegmarkError::BboxXml("<word> outside of <page>".into())
                        })?;
                        page.words.push(Word::new(text, bbox));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(pages)
}

fn parse_page(tag: &BytesStart<'_>) -> Result<BboxPage, LegmarkError> {
    Ok(BboxPage {
        width: attr_f64(tag, b"width")?.unwrap_or(0.0),
        height: attr_f64(tag, b"height")?.unwrap_or(0.0),
        words: Vec::new(),
    })
}

fn parse_word_bbox(tag: &BytesStart<'_>) -> Result<Option<BBox>, LegmarkError> {
    let (Some(x0), Some(y0), Some(x1), Some(y1)) = (
        attr_f64(tag, b"xMin")?,
        attr_f64(tag, b"yMin")?,
        attr_f64(tag, b"xMax")?,
        attr_f64(tag, b"yMax")?,
    ) else {
        return Ok(None);
    };
    Ok(Some(BBox::new(x0, y0, x1, y1)))
}

fn attr_f64(tag: &BytesStart<'_>, name: &[u8]) -> Result<Option<f64>, LegmarkError> {
    for attr in tag.attributes() {
        let attr = attr.map_err(|e| LegmarkError::BboxXml(e.to_string()))?;
        if attr.key.as_ref() == name {
            let value = attr
                .unescape_value()
                .map_err(|e| LegmarkError::BboxXml(e.to_string()))?;
            return Ok(value.trim().parse().ok());
        }
    }
    Ok(None)
}
