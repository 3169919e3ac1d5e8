//! Indented rendering of metadata documents

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

use crate::metadata::document::MetadataError;

/// Declaration written at the top of every rendered document
const DECLARATION: &str = "<?xml version=\"1.0\" ?>";

/// Re-indent `xml` with one tab per nesting level
///
/// Whitespace-only text between elements is dropped and the source
/// declaration is replaced by a plain version 1.0 declaration.
pub fn pretty_print(xml: &str) -> Result<String, MetadataError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);

    loop {
        let event = reader.read_event().map_err(|e| MetadataError::Malformed {
            position: reader.error_position(),
            reason: e.to_string(),
        })?;
        match event {
            Event::Eof => break,
            Event::Decl(_) => {}
            event => writer.write_event(event).map_err(|e| MetadataError::Malformed {
                position: reader.buffer_position(),
                reason: e.to_string(),
            })?,
        }
    }

    let body = String::from_utf8(writer.into_inner()).map_err(|e| MetadataError::Malformed {
        position: e.utf8_error().valid_up_to() as u64,
        reason: e.to_string(),
    })?;
    Ok(format!("{}\n{}\n", DECLARATION, body.trim_start()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataDocument;

    #[test]
    fn test_tab_indentation() {
        let xml = "<?xml version=\"1.0\" encoding=\"UTF-8\"?><OME><Image ID=\"Image:0\"><Pixels SizeC=\"1\"/></Image></OME>";
        let pretty = pretty_print(xml).unwrap();
        let lines: Vec<&str> = pretty.lines().collect();
        assert_eq!(lines[0], "<?xml version=\"1.0\" ?>");
        assert_eq!(lines[1], "<OME>");
        assert_eq!(lines[2], "\t<Image ID=\"Image:0\">");
        assert_eq!(lines[3], "\t\t<Pixels SizeC=\"1\"/>");
        assert_eq!(lines[4], "\t</Image>");
        assert_eq!(lines[5], "</OME>");
    }

    #[test]
    fn test_existing_whitespace_dropped() {
        let xml = "<OME>\n    <Image ID=\"Image:0\">\n      <Description>stained</Description>\n    </Image>\n</OME>";
        let pretty = pretty_print(xml).unwrap();
        assert!(pretty.contains("\t\t<Description>stained</Description>"));
        assert!(!pretty.contains("    "));
    }

    #[test]
    fn test_pretty_output_parses_to_same_metadata() {
        let xml = "<OME><Image ID=\"Image:0\"><Pixels SizeC=\"2\" SizeZ=\"1\" SizeT=\"3\"><Channel ID=\"Channel:0:0\" Name=\"DAPI\"/><Channel ID=\"Channel:0:1\"/></Pixels></Image></OME>";
        let original = MetadataDocument::from_xml(xml).unwrap();
        let reparsed = MetadataDocument::from_xml(pretty_print(xml).unwrap()).unwrap();
        assert_eq!(original.images(), reparsed.images());
    }
}
