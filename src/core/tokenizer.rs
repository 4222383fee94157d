//! Push-based tokenizer state machine.
//!
//! Classifies buffered bytes into tag and text boundaries and fires the
//! registered callbacks at each boundary. The machine is resumable: `run`
//! may stop at any byte (end of buffered input) and pick up where it left
//! off on the next call. All positions in the state are offsets into the
//! shared input buffer and are rebased when the buffer compacts.
//!
//! Malformed markup is handled permissively: bytes that fit no transition
//! are skipped while waiting for the next structural byte. Comments,
//! processing instructions and doctype declarations are discarded without
//! firing callbacks.

use crate::core::encoding::TextEncoding;
use crate::core::registry::{AnyElement, Registry};
use crate::core::scanner;
use crate::parser::{Phase, Visit};
use crate::selector::SelectorEngine;

/// What the tokenizer is currently scanning. Offsets index the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Before the first `<`.
    Init,
    /// Just past a `<`, construct kind not yet known.
    Opening,
    /// Inside `<?...?>` or `<!...!>`; `delim` is the byte that must precede
    /// the closing `>`.
    Comment { delim: u8 },
    /// Reading a tag name that started at `start`.
    TagName { start: usize },
    /// Past the tag name, scanning the attribute section.
    Attributes { name_start: usize, name_end: usize },
    /// Inside `</...>`; name starts at `start`.
    Closing { start: usize },
    /// Inside a quoted attribute value.
    Quoted { name_start: usize, name_end: usize },
    /// Between constructs, accumulating text from `start`.
    Text { start: usize },
}

pub struct Machine {
    pub state: State,
    /// End of the current tag's attribute section, exclusive. Read lazily
    /// by the attribute accessor.
    pub attr_end: usize,
    /// Leftmost offset still referenced by the current construct. Everything
    /// before it may be reclaimed by compaction.
    pub low_water: usize,
    /// Latched by `Visit::abort`, cleared only by reset.
    pub aborted: bool,
    pub encoding: TextEncoding,
    pub hooks: Registry,
    pub selectors: SelectorEngine,
}

impl Machine {
    pub fn new(encoding: TextEncoding) -> Self {
        Machine {
            state: State::Init,
            attr_end: 0,
            low_water: 0,
            aborted: false,
            encoding,
            hooks: Registry::default(),
            selectors: SelectorEngine::new(),
        }
    }

    /// Rewind scanning state for a fresh document. Registrations and the
    /// abort latch are kept.
    pub fn rewind(&mut self) {
        self.state = State::Init;
        self.attr_end = 0;
        self.low_water = 0;
        self.selectors.clear_stack();
    }

    pub fn reset(&mut self) {
        self.rewind();
        self.aborted = false;
    }

    /// Shift all recorded offsets left after the buffer compacted.
    pub fn rebase(&mut self, shift: usize) {
        self.low_water = self.low_water.saturating_sub(shift);
        self.attr_end = self.attr_end.saturating_sub(shift);
        self.state = match self.state {
            State::TagName { start } => State::TagName {
                start: start.saturating_sub(shift),
            },
            State::Attributes { name_start, name_end } => State::Attributes {
                name_start: name_start.saturating_sub(shift),
                name_end: name_end.saturating_sub(shift),
            },
            State::Quoted { name_start, name_end } => State::Quoted {
                name_start: name_start.saturating_sub(shift),
                name_end: name_end.saturating_sub(shift),
            },
            State::Closing { start } => State::Closing {
                start: start.saturating_sub(shift),
            },
            State::Text { start } => State::Text {
                start: start.saturating_sub(shift),
            },
            s @ (State::Init | State::Opening | State::Comment { .. }) => s,
        };
    }
}

/// Drive the machine over `buf[from..]`, firing callbacks at each boundary.
///
/// States waiting on a single structural byte jump with memchr; the short
/// in-tag states step byte by byte because they also need the previous byte
/// (self-closing `/>`, escaped quotes).
pub fn run(m: &mut Machine, buf: &[u8], from: usize) {
    let end = buf.len();
    let mut i = from;

    while i < end {
        if m.aborted {
            return;
        }

        match m.state {
            State::Init => match scanner::find_tag_start(buf, i) {
                Some(pos) => {
                    m.low_water = pos;
                    m.state = State::Opening;
                    i = pos;
                }
                None => {
                    // Text before the first tag is discarded
                    m.low_water = end;
                    break;
                }
            },

            State::Opening => {
                let b = buf[i];
                if b == scanner::QUESTION || b == scanner::BANG {
                    m.state = State::Comment { delim: b };
                } else if b == scanner::TAG_CLOSE {
                    m.state = State::Closing { start: i + 1 };
                } else if !scanner::is_whitespace(b) {
                    m.state = State::TagName { start: i };
                }
            }

            State::Comment { delim } => match scanner::find_tag_end(buf, i) {
                Some(pos) => {
                    if pos > 0 && buf[pos - 1] == delim {
                        m.low_water = pos + 1;
                        m.state = State::Text { start: pos + 1 };
                    } else {
                        m.low_water = pos;
                    }
                    i = pos;
                }
                None => {
                    // Keep the last byte so the delimiter check still sees it
                    m.low_water = end.saturating_sub(1);
                    break;
                }
            },

            State::TagName { start } => {
                let b = buf[i];
                if scanner::is_whitespace(b) {
                    m.state = State::Attributes {
                        name_start: start,
                        name_end: i,
                    };
                } else if b == scanner::TAG_END {
                    let self_closing = i > 0 && buf[i - 1] == scanner::TAG_CLOSE;
                    let name_end = if self_closing { i - 1 } else { i };
                    m.attr_end = name_end;
                    m.low_water = i + 1;
                    fire_tag_end(m, buf, start, name_end, true, self_closing);
                    m.state = State::Text { start: i + 1 };
                }
            }

            State::Attributes { name_start, name_end } => {
                let b = buf[i];
                if b == scanner::TAG_END {
                    let self_closing = i > 0 && buf[i - 1] == scanner::TAG_CLOSE;
                    m.attr_end = if self_closing { i - 1 } else { i };
                    m.low_water = i + 1;
                    fire_tag_end(m, buf, name_start, name_end, true, self_closing);
                    m.state = State::Text { start: i + 1 };
                } else if b == scanner::QUOTE {
                    m.state = State::Quoted { name_start, name_end };
                }
            }

            State::Quoted { name_start, name_end } => match scanner::find_quote(buf, i) {
                Some(pos) => {
                    if pos == 0 || buf[pos - 1] != scanner::BACKSLASH {
                        m.state = State::Attributes { name_start, name_end };
                    }
                    i = pos;
                }
                None => break,
            },

            State::Closing { start } => match scanner::find_tag_end(buf, i) {
                Some(pos) => {
                    m.attr_end = pos;
                    m.low_water = pos + 1;
                    fire_tag_end(m, buf, start, pos, false, true);
                    m.state = State::Text { start: pos + 1 };
                    i = pos;
                }
                None => break,
            },

            State::Text { start } => match scanner::find_tag_start(buf, i) {
                Some(pos) => {
                    fire_text(m, buf, start, pos);
                    m.low_water = pos;
                    m.state = State::Opening;
                    i = pos;
                }
                None => break,
            },
        }

        i += 1;
    }
}

/// Dispatch at a tag boundary. `enter`/`exit` select which side fires; a
/// self-closing tag fires both, back to back, per hook.
fn fire_tag_end(
    m: &mut Machine,
    buf: &[u8],
    name_start: usize,
    name_end: usize,
    enter: bool,
    exit: bool,
) {
    let Machine {
        hooks,
        selectors,
        aborted,
        encoding,
        attr_end,
        ..
    } = m;

    let span = (name_start, name_end);
    let attrs = (name_end, (*attr_end).max(name_end));
    let name = &buf[name_start..name_end];

    for hook in hooks.element.iter_mut() {
        if hook.name != name {
            continue;
        }
        if enter {
            let mut visit = Visit::new(buf, Phase::Enter, span, attrs, *encoding, aborted);
            (hook.enter)(&mut visit);
        }
        if exit {
            if let Some(cb) = hook.exit.as_mut() {
                let mut visit = Visit::new(buf, Phase::Exit, span, attrs, *encoding, aborted);
                cb(&mut visit);
            }
        }
    }

    for any in hooks.any.iter_mut() {
        match any {
            AnyElement::User { enter: on_enter, exit: on_exit } => {
                if enter {
                    let mut visit = Visit::new(buf, Phase::Enter, span, attrs, *encoding, aborted);
                    on_enter(&mut visit);
                }
                if exit {
                    if let Some(cb) = on_exit.as_mut() {
                        let mut visit = Visit::new(buf, Phase::Exit, span, attrs, *encoding, aborted);
                        cb(&mut visit);
                    }
                }
            }
            AnyElement::Selectors => {
                if enter {
                    selectors.enter(buf, span, attrs, *encoding, aborted);
                }
                if exit {
                    selectors.exit(buf, span, attrs, *encoding, aborted);
                }
            }
        }
    }
}

fn fire_text(m: &mut Machine, buf: &[u8], start: usize, text_end: usize) {
    let Machine {
        hooks,
        aborted,
        encoding,
        ..
    } = m;

    for cb in hooks.text.iter_mut() {
        let mut visit = Visit::new(buf, Phase::Text, (start, text_end), (0, 0), *encoding, aborted);
        cb(&mut visit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::ElementHook;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn record(log: &Rc<RefCell<Vec<String>>>, prefix: &str) -> crate::core::registry::Hook {
        let log = log.clone();
        let prefix = prefix.to_string();
        Box::new(move |visit| {
            log.borrow_mut()
                .push(format!("{}:{}", prefix, String::from_utf8_lossy(visit.tag_name())))
        })
    }

    fn run_doc(doc: &[u8]) -> (Machine, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut m = Machine::new(TextEncoding::Utf8);
        m.hooks.any.push(AnyElement::User {
            enter: record(&log, "enter"),
            exit: Some(record(&log, "exit")),
        });
        run(&mut m, doc, 0);
        (m, log)
    }

    #[test]
    fn test_enter_exit_order() {
        let (_, log) = run_doc(b"<a><b></b></a>");
        assert_eq!(
            *log.borrow(),
            vec!["enter:a", "enter:b", "exit:b", "exit:a"]
        );
    }

    #[test]
    fn test_self_closing_fires_both() {
        let (_, log) = run_doc(b"<a/>");
        assert_eq!(*log.borrow(), vec!["enter:a", "exit:a"]);
    }

    #[test]
    fn test_comments_and_pi_discarded() {
        let (_, log) = run_doc(b"<?xml version=\"1.0\"?><!stuff!><a/>");
        assert_eq!(*log.borrow(), vec!["enter:a", "exit:a"]);
    }

    #[test]
    fn test_name_excludes_slash_and_attrs() {
        let (_, log) = run_doc(b"<a href=\"x\"/><b/>");
        assert_eq!(*log.borrow(), vec!["enter:a", "exit:a", "enter:b", "exit:b"]);
    }

    #[test]
    fn test_exact_hook_matches_bytes() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut m = Machine::new(TextEncoding::Utf8);
        m.hooks.element.push(ElementHook {
            name: b"Item".to_vec(),
            enter: record(&log, "enter"),
            exit: None,
        });
        run(&mut m, b"<item/><Item/><ItemX/>", 0);
        assert_eq!(*log.borrow(), vec!["enter:Item"]);
    }

    #[test]
    fn test_quoted_markup_does_not_end_tag() {
        let (_, log) = run_doc(b"<a title=\"1 > 0\"></a>");
        assert_eq!(*log.borrow(), vec!["enter:a", "exit:a"]);
    }

    #[test]
    fn test_resume_across_runs() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut m = Machine::new(TextEncoding::Utf8);
        m.hooks.any.push(AnyElement::User {
            enter: record(&log, "enter"),
            exit: None,
        });
        let doc = b"<outer><inner/></outer>";
        let full = doc.to_vec();
        run(&mut m, &full[..9], 0);
        run(&mut m, &full, 9);
        assert_eq!(*log.borrow(), vec!["enter:outer", "enter:inner"]);
    }

    #[test]
    fn test_rebase_shifts_offsets() {
        let mut m = Machine::new(TextEncoding::Utf8);
        m.low_water = 10;
        m.attr_end = 12;
        m.state = State::Attributes {
            name_start: 10,
            name_end: 12,
        };
        m.rebase(4);
        assert_eq!(m.low_water, 6);
        assert_eq!(m.attr_end, 8);
        assert_eq!(
            m.state,
            State::Attributes {
                name_start: 6,
                name_end: 8
            }
        );
    }

    #[test]
    fn test_low_water_tracks_construct_starts() {
        let mut m = Machine::new(TextEncoding::Utf8);
        run(&mut m, b"junk<tag attr=\"v", 0);
        // the whole open tag must survive compaction
        assert_eq!(m.low_water, 4);
    }

    #[test]
    fn test_abort_stops_scan() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut m = Machine::new(TextEncoding::Utf8);
        let seen = log.clone();
        m.hooks.any.push(AnyElement::User {
            enter: Box::new(move |visit| {
                seen.borrow_mut()
                    .push(String::from_utf8_lossy(visit.tag_name()).into_owned());
                visit.abort();
            }),
            exit: None,
        });
        run(&mut m, b"<a/><b/><c/>", 0);
        assert_eq!(*log.borrow(), vec!["a"]);
        assert!(m.aborted);
    }
}
