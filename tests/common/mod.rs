use std::collections::HashMap;

use quick_xml::events::Event as XmlEvent;
use quick_xml::reader::Reader as XmlReader;

pub type Attrs = HashMap<String, String>;

/// An `mxCell` with its attributes and, when present, its geometry attributes.
#[derive(Debug, Default)]
pub struct ParsedCell {
    pub attrs: Attrs,
    pub geometry: Option<Attrs>,
}

impl ParsedCell {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn is_edge(&self) -> bool {
        self.get("edge") == Some("1")
    }

    pub fn is_vertex(&self) -> bool {
        self.get("vertex") == Some("1")
    }

    pub fn style(&self) -> &str {
        self.get("style").unwrap_or("")
    }
}

#[derive(Debug, Default)]
pub struct ParsedModel {
    pub model: Attrs,
    pub cells: Vec<ParsedCell>,
}

impl ParsedModel {
    /// Cells other than the root and layer sentinels.
    pub fn content(&self) -> impl Iterator<Item = &ParsedCell> {
        self.cells
            .iter()
            .filter(|c| !matches!(c.get("id"), Some("0") | Some("1")))
    }
}

fn attributes(e: &quick_xml::events::BytesStart<'_>) -> Attrs {
    e.attributes()
        .filter_map(Result::ok)
        .map(|a| {
            (
                String::from_utf8_lossy(a.key.as_ref()).to_string(),
                String::from_utf8_lossy(&a.value).to_string(),
            )
        })
        .collect()
}

/// Parses emitted draw.io XML. Attribute values are kept raw (still escaped).
pub fn parse(xml: &str) -> ParsedModel {
    let mut reader = XmlReader::from_str(xml);
    let mut buf = Vec::new();
    let mut parsed = ParsedModel::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(XmlEvent::Start(ref e)) | Ok(XmlEvent::Empty(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match name.as_str() {
                    "mxGraphModel" => parsed.model = attributes(e),
                    "mxCell" => parsed.cells.push(ParsedCell {
                        attrs: attributes(e),
                        geometry: None,
                    }),
                    "mxGeometry" => {
                        if let Some(cell) = parsed.cells.last_mut() {
                            cell.geometry = Some(attributes(e));
                        }
                    }
                    _ => {}
                }
            }
            Ok(XmlEvent::Eof) => break,
            Ok(_) => {}
            Err(err) => panic!("emitted XML does not parse: {err}"),
        }
        buf.clear();
    }

    parsed
}
