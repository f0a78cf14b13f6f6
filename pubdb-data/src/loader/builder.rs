//! Event-driven tree construction with markup recovery.

use quick_xml::Error as XmlError;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use super::tree::Element;
use super::{Recovery, RecoveryKind};

/// Name of the synthetic element wrapped around the raw fragments.
pub const WRAPPER: &str = "root";

const OPEN_WRAPPER: &[u8] = b"<root>";
const CLOSE_WRAPPER: &[u8] = b"</root>";

/// Parse `source` as a sequence of sibling fragments, recovering from any
/// malformed markup instead of failing.
pub(super) fn parse_wrapped(source: &[u8]) -> (Element, Vec<Recovery>) {
    let mut wrapped = Vec::with_capacity(OPEN_WRAPPER.len() + source.len() + CLOSE_WRAPPER.len());
    wrapped.extend_from_slice(OPEN_WRAPPER);
    wrapped.extend_from_slice(source);
    wrapped.extend_from_slice(CLOSE_WRAPPER);
    let total = wrapped.len();

    let mut base = 0;
    let mut reader = fragment_reader(&wrapped);
    let mut builder = TreeBuilder::new();
    loop {
        let before = absolute(base, reader.buffer_position());
        let event = reader.read_event();
        let after = absolute(base, reader.buffer_position());
        let position = source_offset(before);

        match event {
            Ok(Event::Start(_)) if before == 0 => {}
            Ok(Event::End(_)) if after == total => break,
            Ok(Event::Start(start)) => builder.open(decode_name(start.name().as_ref())),
            Ok(Event::Empty(start)) => builder.empty(decode_name(start.name().as_ref())),
            Ok(Event::End(end)) => builder.close(&decode_name(end.name().as_ref()), position),
            Ok(Event::Text(text)) => match text.unescape() {
                Ok(unescaped) => builder.text(&unescaped),
                Err(_) => {
                    builder.recover(position, RecoveryKind::UndecodableText);
                    builder.text(&String::from_utf8_lossy(&text));
                }
            },
            Ok(Event::CData(data)) => builder.text(&String::from_utf8_lossy(&data)),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                builder.recover(
                    position,
                    RecoveryKind::SyntaxError {
                        message: err.to_string(),
                    },
                );
                if matches!(err, XmlError::IllFormed(_)) && after > before {
                    continue;
                }
                // Any other error leaves the reader finished, so parsing
                // restarts at the next markup after the bad span.
                let Some(resume) = next_markup(&wrapped, before) else {
                    builder.recover(source_offset(after.min(total)), RecoveryKind::Truncated);
                    break;
                };
                base = resume;
                reader = fragment_reader(&wrapped[resume..]);
            }
        }
    }

    let end = source_offset(total.saturating_sub(CLOSE_WRAPPER.len()));
    builder.finish(end)
}

fn fragment_reader(input: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(input);
    // End tags are resolved by the builder against its own stack.
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    reader
}

/// Offset of the first `<` after the markup that starts at `from`.
fn next_markup(wrapped: &[u8], from: usize) -> Option<usize> {
    let start = from.checked_add(1)?;
    wrapped
        .get(start..)?
        .iter()
        .position(|byte| *byte == b'<')
        .map(|index| start + index)
}

fn decode_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn absolute(base: usize, local: u64) -> usize {
    base.saturating_add(usize::try_from(local).unwrap_or(usize::MAX))
}

fn source_offset(wrapped_offset: usize) -> u64 {
    let offset = wrapped_offset.saturating_sub(OPEN_WRAPPER.len());
    u64::try_from(offset).unwrap_or(u64::MAX)
}

/// Stack of open elements. Index 0 is the synthetic wrapper and is never
/// popped before [`TreeBuilder::finish`].
#[derive(Debug)]
struct TreeBuilder {
    stack: Vec<Element>,
    recoveries: Vec<Recovery>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![Element::new(WRAPPER)],
            recoveries: Vec::new(),
        }
    }

    fn open(&mut self, name: String) {
        self.stack.push(Element::new(name));
    }

    fn empty(&mut self, name: String) {
        self.attach(Element::new(name));
    }

    fn text(&mut self, fragment: &str) {
        if let Some(current) = self.stack.last_mut() {
            current.push_text(fragment);
        }
    }

    fn close(&mut self, name: &str, position: u64) {
        let matching = self
            .stack
            .iter()
            .rposition(|element| element.name() == name)
            .filter(|depth| *depth > 0);
        let Some(depth) = matching else {
            self.recover(
                position,
                RecoveryKind::UnmatchedEndTag {
                    name: name.to_owned(),
                },
            );
            return;
        };
        while self.stack.len() > depth + 1 {
            self.close_innermost(position, true);
        }
        self.close_innermost(position, false);
    }

    fn close_innermost(&mut self, position: u64, implicit: bool) {
        let Some(element) = self.stack.pop() else {
            return;
        };
        if implicit {
            self.recover(
                position,
                RecoveryKind::ImplicitlyClosed {
                    name: element.name().to_owned(),
                },
            );
        }
        self.attach(element);
    }

    fn attach(&mut self, element: Element) {
        if let Some(parent) = self.stack.last_mut() {
            parent.push_child(element);
        }
    }

    fn recover(&mut self, position: u64, kind: RecoveryKind) {
        self.recoveries.push(Recovery { position, kind });
    }

    fn finish(mut self, position: u64) -> (Element, Vec<Recovery>) {
        while self.stack.len() > 1 {
            self.close_innermost(position, true);
        }
        let root = self.stack.pop().unwrap_or_else(|| Element::new(WRAPPER));
        (root, self.recoveries)
    }
}
