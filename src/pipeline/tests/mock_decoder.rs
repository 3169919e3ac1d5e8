//! In-memory decoder backend recording every call made to it

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::decoder::{
    AxisSizes, Container, ContainerDecoder, DecodeError, DecodeResult, PixelType, Plane, SessionConfig,
};
use crate::metadata::MetadataDocument;
use crate::tiff::{tags, PageData, StripReader, TiffReader};

pub const WIDTH: u32 = 3;
pub const HEIGHT: u32 = 2;

/// Layout of one fake container
#[derive(Clone)]
pub struct MockFile {
    pub sizes: AxisSizes,
    pub channel_names: Vec<Option<&'static str>>,
    pub fail_at: Option<(usize, usize, usize)>,
    pub has_metadata: bool,
}

impl MockFile {
    pub fn new(c: usize, z: usize, t: usize, channel_names: Vec<Option<&'static str>>) -> Self {
        MockFile {
            sizes: AxisSizes::new(c, z, t),
            channel_names,
            fail_at: None,
            has_metadata: true,
        }
    }

    fn xml(&self) -> String {
        let channels: String = self.channel_names.iter().enumerate()
            .map(|(i, name)| match name {
                Some(name) => format!("<Channel ID=\"Channel:0:{}\" Name=\"{}\"/>", i, name),
                None => format!("<Channel ID=\"Channel:0:{}\"/>", i),
            })
            .collect();
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><OME><Image ID=\"Image:0\"><Pixels DimensionOrder=\"XYZCT\" Type=\"uint16\" SizeX=\"{}\" SizeY=\"{}\" SizeC=\"{}\" SizeZ=\"{}\" SizeT=\"{}\">{}</Pixels></Image></OME>",
            WIDTH, HEIGHT, self.sizes.c, self.sizes.z, self.sizes.t, channels
        )
    }
}

/// Calls observed by the backend and its containers
#[derive(Default)]
pub struct Calls {
    pub starts: Cell<usize>,
    pub stops: Cell<usize>,
    pub opens: Cell<usize>,
    pub closes: Cell<usize>,
    pub metadata_reads: Cell<usize>,
    pub reads: RefCell<Vec<(usize, usize, usize)>>,
}

pub struct MockDecoder {
    files: HashMap<String, MockFile>,
    calls: Rc<Calls>,
}

impl MockDecoder {
    pub fn new(files: Vec<(&str, MockFile)>) -> (Self, Rc<Calls>) {
        let calls = Rc::new(Calls::default());
        let decoder = MockDecoder {
            files: files.into_iter().map(|(name, file)| (name.to_string(), file)).collect(),
            calls: calls.clone(),
        };
        (decoder, calls)
    }

    fn lookup(&self, path: &Path) -> DecodeResult<&MockFile> {
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        self.files.get(&name)
            .ok_or_else(|| DecodeError::UnsupportedContainer(path.display().to_string()))
    }
}

impl ContainerDecoder for MockDecoder {
    fn name(&self) -> &str {
        "mock"
    }

    fn can_open(&self, path: &Path) -> bool {
        self.lookup(path).is_ok()
    }

    fn open(&self, path: &Path, _config: &SessionConfig) -> DecodeResult<Box<dyn Container>> {
        let file = self.lookup(path)?.clone();
        self.calls.opens.set(self.calls.opens.get() + 1);
        Ok(Box::new(MockContainer { file, calls: self.calls.clone() }))
    }

    fn metadata(&self, path: &Path) -> DecodeResult<MetadataDocument> {
        let file = self.lookup(path)?;
        self.calls.metadata_reads.set(self.calls.metadata_reads.get() + 1);
        if !file.has_metadata {
            return Err(DecodeError::MissingMetadata(path.display().to_string()));
        }
        Ok(MetadataDocument::from_xml(file.xml())?)
    }

    fn start(&mut self, _config: &SessionConfig) -> DecodeResult<()> {
        self.calls.starts.set(self.calls.starts.get() + 1);
        Ok(())
    }

    fn shutdown(&mut self) {
        self.calls.stops.set(self.calls.stops.get() + 1);
    }
}

struct MockContainer {
    file: MockFile,
    calls: Rc<Calls>,
}

/// Sample value every pixel of plane (c, z, t) carries
pub fn plane_value(c: usize, z: usize, t: usize) -> u16 {
    (c * 100 + t * 10 + z) as u16
}

impl Container for MockContainer {
    fn axis_sizes(&self) -> AxisSizes {
        self.file.sizes
    }

    fn read_plane(&mut self, c: usize, z: usize, t: usize) -> DecodeResult<Plane> {
        self.calls.reads.borrow_mut().push((c, z, t));
        if self.file.fail_at == Some((c, z, t)) {
            return Err(DecodeError::Io(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated plane")));
        }
        let value = plane_value(c, z, t).to_le_bytes();
        let data = value.iter().copied().cycle().take((WIDTH * HEIGHT * 2) as usize).collect();
        Plane::new(WIDTH, HEIGHT, PixelType::Uint16, data)
    }
}

impl Drop for MockContainer {
    fn drop(&mut self) {
        self.calls.closes.set(self.calls.closes.get() + 1);
    }
}

/// Fresh directory holding empty input files with the given names
pub fn input_dir(test: &str, names: &[&str]) -> (PathBuf, Vec<PathBuf>) {
    let dir = std::env::temp_dir().join(format!("microscoper-pipeline-{}-{}", std::process::id(), test));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    let dir = dir.canonicalize().unwrap();
    let paths = names.iter()
        .map(|name| {
            let path = dir.join(name);
            fs::write(&path, b"").unwrap();
            path
        })
        .collect();
    (dir, paths)
}

/// Pages of a written TIFF file and the description of its first page
pub fn read_tiff(path: &Path) -> (Vec<PageData>, Option<String>) {
    let mut reader = TiffReader::new();
    let mut file = BufReader::new(File::open(path).unwrap());
    let tiff = reader.read(&mut file).unwrap();
    let pages = tiff.ifds.iter()
        .map(|ifd| StripReader::new(&reader, ifd).read_page(&mut file).unwrap())
        .collect();
    let description = reader.read_ascii(&mut file, &tiff.ifds[0], tags::IMAGE_DESCRIPTION).ok();
    (pages, description)
}

/// First sample of a little-endian 16-bit page
pub fn first_sample(page: &PageData) -> u16 {
    u16::from_le_bytes([page.data[0], page.data[1]])
}
