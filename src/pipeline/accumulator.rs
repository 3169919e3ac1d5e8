//! Plane accumulation
//!
//! Walks a container's (channel, time, depth) index space and groups the
//! decoded planes into one ordered stack per resolved channel name.

use log::{debug, warn};
use std::collections::HashMap;
use std::path::Path;

use crate::decoder::{DecodeError, DecoderSession, Plane};
use crate::metadata::{MetadataDocument, MetadataResolver};
use crate::pipeline::errors::{ConvertError, ConvertResult};
use crate::utils::logger::Logger;
use crate::utils::progress::ProgressTracker;

/// Planes of one file grouped by channel name
///
/// Iteration follows the channel index at which each name was first
/// stored.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ChannelStacks {
    order: Vec<String>,
    stacks: HashMap<String, Vec<Plane>>,
}

impl ChannelStacks {
    pub fn new() -> Self {
        ChannelStacks::default()
    }

    /// Store the planes of one channel, returning the stack it replaced
    pub fn insert(&mut self, name: String, planes: Vec<Plane>) -> Option<Vec<Plane>> {
        if !self.stacks.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.stacks.insert(name, planes)
    }

    pub fn get(&self, name: &str) -> Option<&[Plane]> {
        self.stacks.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Channel names in output order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// (name, planes) pairs in output order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Plane])> {
        self.order.iter().filter_map(move |name| {
            self.stacks.get(name).map(|planes| (name.as_str(), planes.as_slice()))
        })
    }
}

/// Reads every plane of a container through a decoder session
pub struct PlaneAccumulator<'a> {
    session: &'a DecoderSession,
    logger: &'a Logger,
    show_progress: bool,
}

impl<'a> PlaneAccumulator<'a> {
    pub fn new(session: &'a DecoderSession, logger: &'a Logger) -> Self {
        PlaneAccumulator {
            session,
            logger,
            show_progress: false,
        }
    }

    /// Draw a progress bar over the planes of each file
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Read all planes of `path` grouped by channel name
    ///
    /// The container is released when this returns, whatever the outcome.
    pub fn extract_channels(&self, path: &Path) -> ConvertResult<(MetadataDocument, ChannelStacks)> {
        let mut container = self.session.open_container(path)
            .map_err(|source| ConvertError::ContainerUnavailable {
                path: path.to_path_buf(),
                source,
            })?;

        let sizes = container.axis_sizes();
        if !sizes.is_four_dimensional() {
            return Err(ConvertError::UnsupportedDimensionality {
                path: path.to_path_buf(),
                z: sizes.z,
                t: sizes.t,
            });
        }

        let metadata = MetadataResolver::new(self.session).parse(path)?;
        let _ = self.logger.log(&format!(
            "Reading {}: C={} Z={} T={}", path.display(), sizes.c, sizes.z, sizes.t));

        let total = sizes.total_planes()
            .ok_or_else(|| ConvertError::ContainerUnavailable {
                path: path.to_path_buf(),
                source: DecodeError::UnsupportedContainer(format!(
                    "C={} Z={} T={} overflows the plane count", sizes.c, sizes.z, sizes.t)),
            })?;
        let total = total as u64;
        let progress = if self.show_progress {
            ProgressTracker::new(total, "Reading planes")
        } else {
            ProgressTracker::hidden(total)
        };

        let mut stacks = ChannelStacks::new();
        for c in 0..sizes.c {
            let name = MetadataResolver::resolve_channel_name(&metadata, c)
                .unwrap_or_else(|| c.to_string());
            debug!("Channel {} of {} resolved to '{}'", c, path.display(), name);
            progress.set_message(&name);

            let mut planes = Vec::with_capacity(sizes.z * sizes.t);
            for t in 0..sizes.t {
                for z in 0..sizes.z {
                    let plane = container.read_plane(c, z, t)
                        .map_err(|source| ConvertError::PlaneReadFailure {
                            path: path.to_path_buf(),
                            c,
                            z,
                            t,
                            source,
                        })?;
                    planes.push(plane);
                    progress.increment(1);
                }
            }

            if stacks.insert(name.clone(), planes).is_some() {
                warn!("{}: channel {} reuses the name '{}', replacing the earlier stack",
                      path.display(), c, name);
            }
        }
        progress.finish();

        Ok((metadata, stacks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::PixelType;

    fn plane(value: u8) -> Plane {
        Plane::new(1, 1, PixelType::Uint8, vec![value]).unwrap()
    }

    #[test]
    fn test_insertion_order_kept() {
        let mut stacks = ChannelStacks::new();
        stacks.insert("GFP".to_string(), vec![plane(1)]);
        stacks.insert("1".to_string(), vec![plane(2)]);
        stacks.insert("DAPI".to_string(), vec![plane(3)]);

        let names: Vec<&str> = stacks.names().collect();
        assert_eq!(names, vec!["GFP", "1", "DAPI"]);
        assert_eq!(stacks.len(), 3);
    }

    #[test]
    fn test_duplicate_name_replaces_stack() {
        let mut stacks = ChannelStacks::new();
        assert!(stacks.insert("DAPI".to_string(), vec![plane(1)]).is_none());
        stacks.insert("GFP".to_string(), vec![plane(2)]);
        let replaced = stacks.insert("DAPI".to_string(), vec![plane(3), plane(4)]);

        assert_eq!(replaced, Some(vec![plane(1)]));
        assert_eq!(stacks.len(), 2);
        assert_eq!(stacks.get("DAPI").map(|p| p.len()), Some(2));
        let names: Vec<&str> = stacks.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["DAPI", "GFP"]);
    }
}
