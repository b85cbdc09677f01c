use crate::feed::types::{FieldSet, ItemColumns};
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

/// Element ancestry an item must have, outermost first.
const ITEM_PATH: [&[u8]; 3] = [b"rss", b"channel", b"item"];

/// Extracts the requested fields of every `rss/channel/item` in `raw`.
///
/// Returns one slot per item for every field in [`FieldSet::effective`]. An
/// item without a given field gets `None` in that column; a field repeated
/// within one item keeps its first occurrence. Qualified names such as
/// `dc:creator` match verbatim. Markup nested inside a field is dropped and
/// the text around it is joined with a single space.
///
/// `None` input and malformed XML both produce empty columns. A parse error,
/// or a document ending with elements still open, discards anything
/// extracted before it, so a truncated document never yields a partial result.
pub fn extract(raw: Option<&str>, fields: &FieldSet) -> ItemColumns {
    let Some(raw) = raw else {
        return ItemColumns::new(fields);
    };

    match extract_items(raw, fields) {
        Ok(columns) => columns,
        Err(e) => {
            tracing::warn!(error = %e, "Feed XML could not be parsed, treating as empty");
            ItemColumns::new(fields)
        }
    }
}

#[derive(Debug, Error)]
enum ExtractError {
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error("Document ended inside <{0}>")]
    Truncated(String),
}

/// Text being collected for one field of the current item.
struct Capture {
    slot: usize,
    depth: usize,
    text: String,
    /// Nested markup was skipped since the last text was appended
    after_markup: bool,
}

impl Capture {
    fn new(slot: usize, depth: usize) -> Self {
        Self {
            slot,
            depth,
            text: String::new(),
            after_markup: false,
        }
    }

    fn push(&mut self, text: &str) {
        if !self.after_markup {
            self.text.push_str(text);
            return;
        }

        let text = text.trim_start();
        if text.is_empty() {
            return;
        }
        let kept = self.text.trim_end().len();
        self.text.truncate(kept);
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(text);
        self.after_markup = false;
    }
}

fn extract_items(raw: &str, fields: &FieldSet) -> Result<ItemColumns, ExtractError> {
    // quick-xml never expands <!ENTITY> declarations; only the predefined
    // entities and character references are resolved.
    let mut reader = Reader::from_str(raw);

    let mut columns = ItemColumns::new(fields);
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut item: Option<Vec<Option<String>>> = None;
    let mut capture: Option<Capture> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                stack.push(e.name().as_ref().to_vec());

                if let Some(c) = capture.as_mut() {
                    c.after_markup = true;
                } else if is_item(&stack) {
                    item = Some(vec![None; fields.effective().len()]);
                } else if let Some(slot) = field_slot(&stack, fields, item.as_deref()) {
                    capture = Some(Capture::new(slot, stack.len()));
                }
            }
            Event::Empty(e) => {
                stack.push(e.name().as_ref().to_vec());

                if let Some(c) = capture.as_mut() {
                    c.after_markup = true;
                } else if is_item(&stack) {
                    columns.push_item(fields, vec![None; fields.effective().len()]);
                } else if let (Some(slot), Some(values)) =
                    (field_slot(&stack, fields, item.as_deref()), item.as_mut())
                {
                    values[slot] = Some(String::new());
                }

                stack.pop();
            }
            Event::Text(e) => {
                if let Some(c) = capture.as_mut().filter(|c| c.depth == stack.len()) {
                    match e.unescape() {
                        Ok(text) => c.push(&text),
                        Err(err) => {
                            tracing::debug!(error = %err, "Unresolved entity in item text, keeping raw text");
                            c.push(&String::from_utf8_lossy(&e));
                        }
                    }
                }
            }
            Event::CData(e) => {
                if let Some(c) = capture.as_mut().filter(|c| c.depth == stack.len()) {
                    c.push(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(_) => {
                if capture.as_ref().is_some_and(|c| c.depth == stack.len()) {
                    if let (Some(c), Some(values)) = (capture.take(), item.as_mut()) {
                        values[c.slot] = Some(c.text.trim().to_owned());
                    }
                } else if is_item(&stack) {
                    if let Some(values) = item.take() {
                        columns.push_item(fields, values);
                    }
                }

                stack.pop();
            }
            Event::Eof => {
                // quick-xml reports end of input without checking for open elements
                if let Some(open) = stack.last() {
                    return Err(ExtractError::Truncated(
                        String::from_utf8_lossy(open).into_owned(),
                    ));
                }
                break;
            }
            _ => {}
        }
    }

    Ok(columns)
}

/// `true` when the innermost elements of `stack` are `rss/channel/item`.
fn is_item(stack: &[Vec<u8>]) -> bool {
    stack.len() >= ITEM_PATH.len()
        && stack[stack.len() - ITEM_PATH.len()..]
            .iter()
            .zip(ITEM_PATH)
            .all(|(name, expected)| name.as_slice() == expected)
}

/// Slot index of the field element just opened, if it is a requested field
/// directly under an open item and the item has not seen it yet.
fn field_slot(
    stack: &[Vec<u8>],
    fields: &FieldSet,
    item: Option<&[Option<String>]>,
) -> Option<usize> {
    let item = item?;
    let (name, parents) = stack.split_last()?;
    if !is_item(parents) {
        return None;
    }

    let name = std::str::from_utf8(name).ok()?;
    let slot = fields.position(name)?;
    item[slot].is_none().then_some(slot)
}
