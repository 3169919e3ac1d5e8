//! Channel identity resolution

use std::path::Path;

use crate::decoder::DecoderSession;
use crate::metadata::document::MetadataDocument;
use crate::pipeline::errors::{ConvertError, ConvertResult};

/// Reads metadata documents through a decoder session and resolves
/// channel names from them
pub struct MetadataResolver<'a> {
    session: &'a DecoderSession,
}

impl<'a> MetadataResolver<'a> {
    pub fn new(session: &'a DecoderSession) -> Self {
        MetadataResolver { session }
    }

    /// Extract the metadata document of `path`
    pub fn parse(&self, path: &Path) -> ConvertResult<MetadataDocument> {
        self.session.extract_metadata(path)
            .map_err(|source| ConvertError::MetadataUnavailable {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Filesystem-safe name of channel `channel` of the first image
    ///
    /// `None` when the image or channel is missing or has no non-empty name.
    pub fn resolve_channel_name(doc: &MetadataDocument, channel: usize) -> Option<String> {
        let name = doc.images().first()?.channels.get(channel)?.name.as_deref()?;
        if name.is_empty() {
            return None;
        }
        Some(sanitize_channel_name(name))
    }
}

/// Replace path separators so a channel name can be used as a file name
pub fn sanitize_channel_name(name: &str) -> String {
    name.replace('/', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(channels: &str) -> MetadataDocument {
        MetadataDocument::from_xml(format!(
            "<OME><Image ID=\"Image:0\"><Pixels SizeC=\"3\">{}</Pixels></Image></OME>", channels
        )).unwrap()
    }

    #[test]
    fn test_named_channel() {
        let doc = document("<Channel Name=\"DAPI\"/><Channel Name=\"GFP\"/>");
        assert_eq!(MetadataResolver::resolve_channel_name(&doc, 0).as_deref(), Some("DAPI"));
        assert_eq!(MetadataResolver::resolve_channel_name(&doc, 1).as_deref(), Some("GFP"));
    }

    #[test]
    fn test_missing_names() {
        let doc = document("<Channel Name=\"\"/><Channel ID=\"Channel:0:1\"/>");
        assert_eq!(MetadataResolver::resolve_channel_name(&doc, 0), None);
        assert_eq!(MetadataResolver::resolve_channel_name(&doc, 1), None);
        assert_eq!(MetadataResolver::resolve_channel_name(&doc, 2), None);

        let no_image = MetadataDocument::from_xml("<OME/>").unwrap();
        assert_eq!(MetadataResolver::resolve_channel_name(&no_image, 0), None);
    }

    #[test]
    fn test_separator_replaced() {
        let doc = document("<Channel Name=\"Cy5/FRET\"/><Channel Name=\"a/b/c\"/>");
        assert_eq!(MetadataResolver::resolve_channel_name(&doc, 0).as_deref(), Some("Cy5_FRET"));
        assert_eq!(MetadataResolver::resolve_channel_name(&doc, 1).as_deref(), Some("a_b_c"));
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let doc = document("<Channel Name=\"DAPI\"/>");
        let first = MetadataResolver::resolve_channel_name(&doc, 0);
        for _ in 0..3 {
            assert_eq!(MetadataResolver::resolve_channel_name(&doc, 0), first);
        }
    }
}
