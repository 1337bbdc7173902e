use std::borrow::Cow;
use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;
use tracing::trace;

use super::tree::Node;
use crate::config::ConfigError;

/// Malformed markup, with the byte offset where the reader gave up.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} (at byte {position})")]
pub struct DocumentError {
    pub message: String,
    pub position: u64,
}

/// Read and parse the document at `path`.
///
/// An unreadable file and malformed markup are both reported as
/// [`ConfigError::DocumentInvalid`].
pub fn parse_file(path: &Path) -> Result<Node, ConfigError> {
    let invalid = |message: String| ConfigError::DocumentInvalid {
        path: path.to_path_buf(),
        message,
    };

    let xml = fs::read_to_string(path).map_err(|e| invalid(format!("cannot read file: {e}")))?;
    let root = parse_str(&xml).map_err(|e| invalid(e.to_string()))?;
    trace!(
        target: "gestured::document",
        path = %path.display(),
        root = %root.tag,
        children = root.children.len(),
        "Parsed document"
    );
    Ok(root)
}

/// Parse a complete document and return its root element.
pub fn parse_str(xml: &str) -> Result<Node, DocumentError> {
    let mut reader = Reader::from_str(xml);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;

    loop {
        let event = reader.read_event().map_err(|e| DocumentError {
            message: format!("XML parse error: {e}"),
            position: reader.error_position(),
        })?;
        let at = |message: String| DocumentError {
            message,
            position: reader.buffer_position(),
        };

        match event {
            Event::Start(ref e) => stack.push(element(e).map_err(at)?),
            Event::Empty(ref e) => {
                let node = element(e).map_err(at)?;
                attach(&mut stack, &mut root, node).map_err(at)?;
            }
            Event::End(ref e) => {
                let node = stack.pop().ok_or_else(|| {
                    at(format!(
                        "closing tag </{}> has no opening tag",
                        String::from_utf8_lossy(e.name().as_ref())
                    ))
                })?;
                attach(&mut stack, &mut root, node).map_err(at)?;
            }
            Event::Text(ref t) => {
                let text = t.unescape().map_err(|e| at(format!("invalid text: {e}")))?;
                // Indentation between elements is not content.
                if !text.trim().is_empty() {
                    push_text(&mut stack, &text).map_err(at)?;
                }
            }
            Event::CData(c) => {
                let raw = c.into_inner();
                let text = std::str::from_utf8(&raw)
                    .map_err(|e| at(format!("CDATA is not valid UTF-8: {e}")))?;
                push_text(&mut stack, text).map_err(at)?;
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes carry no data.
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(DocumentError {
            message: format!("element <{}> is never closed", open.tag),
            position: reader.buffer_position(),
        });
    }
    root.ok_or_else(|| DocumentError {
        message: "document has no root element".into(),
        position: reader.buffer_position(),
    })
}

fn element(start: &BytesStart<'_>) -> Result<Node, String> {
    let mut node = Node::new(utf8(start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| format!("invalid attribute on <{}>: {e}", node.tag))?;
        let key = utf8(attr.key.as_ref())?;
        let value = attr
            .unescape_value()
            .map_err(|e| format!("invalid value for attribute '{key}': {e}"))?;
        node.attributes.insert(key.into_owned(), value.into_owned());
    }
    Ok(node)
}

fn attach(stack: &mut [Node], root: &mut Option<Node>, node: Node) -> Result<(), String> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        return Ok(());
    }
    if root.is_some() {
        return Err(format!(
            "element <{}> follows the root element; only one root is allowed",
            node.tag
        ));
    }
    *root = Some(node);
    Ok(())
}

fn push_text(stack: &mut [Node], text: &str) -> Result<(), String> {
    match stack.last_mut() {
        Some(node) => {
            node.push_text(text);
            Ok(())
        }
        None => Err(format!("text outside of the root element: {text:?}")),
    }
}

fn utf8(bytes: &[u8]) -> Result<Cow<'_, str>, String> {
    std::str::from_utf8(bytes)
        .map(Cow::Borrowed)
        .map_err(|e| format!("name is not valid UTF-8: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_tree_with_attributes_and_text() {
        let xml = r#"<?xml version="1.0"?>
            <root>
              <!-- comment -->
              <application name="a,b">
                <gesture type="SWIPE" fingers="3" direction="UP">
                  <action type="RUN_COMMAND">
                    <command>echo &quot;hi&quot; &amp;&amp; true</command>
                    <repeat/>
                  </action>
                </gesture>
              </application>
            </root>"#;

        let root = parse_str(xml).unwrap();
        assert_eq!(root.tag, "root");
        assert_eq!(root.children.len(), 1);

        let app = &root.children[0];
        assert_eq!(app.attr("name"), Some("a,b"));
        let gesture = app.child("gesture").unwrap();
        assert_eq!(gesture.attr("fingers"), Some("3"));
        let action = gesture.child("action").unwrap();
        assert_eq!(action.children.len(), 2);
        assert_eq!(action.children[0].text(), "echo \"hi\" && true");
        assert_eq!(action.children[1].text, None);
    }

    #[test]
    fn text_keeps_surrounding_whitespace() {
        let root = parse_str("<root>\n  <cmd>  ls -l  </cmd>\n  <script>\n    a\n    b\n  </script>\n</root>").unwrap();
        assert_eq!(root.text, None);
        assert_eq!(root.children[0].text(), "  ls -l  ");
        assert_eq!(root.children[1].text(), "\n    a\n    b\n  ");
    }

    #[test]
    fn whitespace_only_text_is_dropped() {
        let root = parse_str("<root><blank>   </blank></root>").unwrap();
        assert_eq!(root.children[0].text, None);
    }

    #[test]
    fn cdata_counts_as_text() {
        let root = parse_str("<root><cmd><![CDATA[a < b]]></cmd></root>").unwrap();
        assert_eq!(root.children[0].text(), "a < b");
    }

    #[test]
    fn mismatched_closing_tag_is_rejected() {
        let err = parse_str("<root><a></b></root>").unwrap_err();
        assert!(err.message.contains("XML parse error"), "{err}");
    }

    #[test]
    fn unclosed_element_is_rejected() {
        assert!(parse_str("<root><application>").is_err());
    }

    #[test]
    fn empty_document_is_rejected() {
        let err = parse_str("   ").unwrap_err();
        assert!(err.message.contains("no root"), "{err}");
    }

    #[test]
    fn second_root_is_rejected() {
        let err = parse_str("<a/><b/>").unwrap_err();
        assert!(err.message.contains("only one root"), "{err}");
    }

    #[test]
    fn unreadable_file_is_document_invalid() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("missing.conf");
        match parse_file(&path) {
            Err(ConfigError::DocumentInvalid { path: p, message }) => {
                assert_eq!(p, path);
                assert!(message.contains("cannot read"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
