//! Minimal ordered XML tree used for project files and installer manifests.
//!
//! Element order, attribute order, comments and unknown elements survive a
//! read/write cycle. Insignificant whitespace is dropped on read and the tree
//! is re-indented on write.

use crate::exporter::error::{Error, ErrorExt, Result};
use quick_xml::{
    Reader, Writer,
    events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::path::Path;

/// Child node of an element.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    CData(String),
}

/// An element with ordered attributes and children.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Replace the attribute in place, or append it.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn find(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.name == name)
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }
}

/// A parsed XML file: optional declaration and doctype plus the root element.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Document {
    pub declaration: bool,
    pub doctype: Option<String>,
    pub root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            declaration: true,
            doctype: None,
            root,
        }
    }

    /// Parse `text`; `origin` is only used in error messages.
    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        let xml_err = |message: String| Error::Xml {
            path: origin.to_path_buf(),
            message,
        };

        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut declaration = false;
        let mut doctype = None;
        let mut stack: Vec<Element> = Vec::new();
        let mut root = None;

        loop {
            let event = reader.read_event().map_err(|e| {
                xml_err(format!("at byte {}: {e}", reader.buffer_position()))
            })?;
            match event {
                Event::Decl(_) => declaration = true,
                Event::DocType(t) => {
                    doctype = Some(String::from_utf8_lossy(&t.into_inner()).into_owned())
                }
                Event::Start(start) => stack.push(element_from(&start, origin)?),
                Event::Empty(start) => {
                    let element = element_from(&start, origin)?;
                    attach(&mut stack, &mut root, element, origin)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| xml_err("unbalanced closing tag".into()))?;
                    attach(&mut stack, &mut root, element, origin)?;
                }
                Event::Text(t) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = t.unescape().map_err(|e| xml_err(e.to_string()))?;
                        parent.children.push(Node::Text(text.into_owned()));
                    }
                }
                Event::CData(t) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                        parent.children.push(Node::CData(text));
                    }
                }
                Event::Comment(t) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                        parent.children.push(Node::Comment(text));
                    }
                }
                Event::PI(_) => {}
                Event::Eof => break,
            }
        }

        if !stack.is_empty() {
            return Err(xml_err("unexpected end of document".into()));
        }
        let root = root.ok_or_else(|| xml_err("document has no root element".into()))?;

        Ok(Self {
            declaration,
            doctype,
            root,
        })
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .fs_context("failed to read XML file", path)?;
        Self::parse(&text, path)
    }

    /// Serialize with four-space indentation.
    pub fn to_xml_string(&self, origin: &Path) -> Result<String> {
        let xml_err = |e: &dyn std::fmt::Display| Error::Xml {
            path: origin.to_path_buf(),
            message: e.to_string(),
        };

        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
        if self.declaration {
            writer
                .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
                .map_err(|e| xml_err(&e))?;
        }
        if let Some(doctype) = &self.doctype {
            writer
                .write_event(Event::DocType(BytesText::from_escaped(doctype.as_str())))
                .map_err(|e| xml_err(&e))?;
        }
        write_element(&mut writer, &self.root).map_err(|e| xml_err(&e))?;

        let mut text = String::from_utf8(writer.into_inner()).map_err(|e| xml_err(&e))?;
        text.push('\n');
        Ok(text)
    }

    /// Replace the file at `path`: the old file is deleted, then the whole
    /// tree is written anew.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let text = self.to_xml_string(path)?;
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).fs_context("failed to remove old XML file", path),
        }
        tokio::fs::write(path, text)
            .await
            .fs_context("failed to write XML file", path)
    }
}

fn element_from(start: &BytesStart<'_>, origin: &Path) -> Result<Element> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::Xml {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| Error::Xml {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    origin: &Path,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(Error::Xml {
                path: origin.to_path_buf(),
                message: format!("second root element <{}>", element.name),
            });
        }
    }
    Ok(())
}

fn write_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    element: &Element,
) -> std::io::Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer.write_event(Event::Empty(start));
    }

    writer.write_event(Event::Start(start))?;
    for child in &element.children {
        match child {
            Node::Element(e) => write_element(writer, e)?,
            Node::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
            Node::CData(t) => writer.write_event(Event::CData(BytesCData::new(t.as_str())))?,
            Node::Comment(t) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(t.as_str())))?
            }
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))
}
