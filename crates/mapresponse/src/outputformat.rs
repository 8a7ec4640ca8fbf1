use core::fmt;
use std::sync::OnceLock;

use geo::SampleType;

use crate::{Error, Result};

/// The output variants of a map response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Band interleaved by line, samples keep the type of the source
    RawBil,
    /// Band interleaved by line, samples converted to 8 bit unsigned integers
    RawBilByte8,
    /// Band interleaved by line, samples converted to 32 bit floats
    RawBilFloat32,
    /// LZW compressed GeoTIFF
    GeoTiff,
}

/// What a response format supports, none of the formats can be produced in parts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub tiling: bool,
    pub multiple_resolutions: bool,
    pub progressive_output: bool,
}

impl OutputFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::RawBil => "image/bil",
            OutputFormat::GeoTiff => "application/bandstif",
            OutputFormat::RawBilByte8 => "application/bandstifbyte8",
            OutputFormat::RawBilFloat32 => "application/bandstiffloat32",
        }
    }

    /// Content type of the produced byte stream, the requested MIME id is echoed
    pub fn content_type(&self) -> &'static str {
        self.mime_type()
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::GeoTiff => "tif",
            _ => "bil",
        }
    }

    /// The sample type the coverage is converted to before encoding, `None` keeps the source type
    pub fn target_sample_type(&self) -> Option<SampleType> {
        match self {
            OutputFormat::RawBilByte8 => Some(SampleType::Uint8),
            OutputFormat::RawBilFloat32 => Some(SampleType::Float32),
            OutputFormat::RawBil | OutputFormat::GeoTiff => None,
        }
    }

    /// True for the headerless band interleaved by line variants
    pub fn is_raw_bil(&self) -> bool {
        !matches!(self, OutputFormat::GeoTiff)
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.mime_type())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = Error;

    /// Accepts the registered MIME ids and the short names (bil, bil-byte8, bil-float32, geotiff)
    fn from_str(s: &str) -> Result<Self> {
        let registry = register_default_formats();
        if let Some(format) = registry.lookup(s) {
            return Ok(format);
        }

        match s.to_ascii_lowercase().as_str() {
            "bil" => Ok(OutputFormat::RawBil),
            "bil-byte8" | "byte8" => Ok(OutputFormat::RawBilByte8),
            "bil-float32" | "float32" => Ok(OutputFormat::RawBilFloat32),
            "geotiff" | "tiff" | "tif" => Ok(OutputFormat::GeoTiff),
            _ => Err(Error::Request(format!(
                "Unsupported output format '{s}', supported formats: {}",
                registry.mime_types().collect::<Vec<_>>().join(", ")
            ))),
        }
    }
}

/// Lookup table of the supported MIME ids, read only once populated
#[derive(Debug)]
pub struct FormatRegistry {
    formats: Vec<(&'static str, OutputFormat)>,
}

static FORMAT_REGISTRY: OnceLock<FormatRegistry> = OnceLock::new();

/// Populates the process wide format registry, subsequent calls return the existing registry
pub fn register_default_formats() -> &'static FormatRegistry {
    FORMAT_REGISTRY.get_or_init(|| {
        log::debug!("Registering map response output formats");
        FormatRegistry::with_formats(&[
            OutputFormat::RawBil,
            OutputFormat::GeoTiff,
            OutputFormat::RawBilByte8,
            OutputFormat::RawBilFloat32,
        ])
    })
}

impl FormatRegistry {
    fn with_formats(formats: &[OutputFormat]) -> Self {
        FormatRegistry {
            formats: formats.iter().map(|format| (format.mime_type(), *format)).collect(),
        }
    }

    pub fn lookup(&self, mime_type: &str) -> Option<OutputFormat> {
        let mime_type = mime_type.trim();
        self.formats
            .iter()
            .find(|(mime, _)| mime.eq_ignore_ascii_case(mime_type))
            .map(|(_, format)| *format)
    }

    pub fn mime_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.formats.iter().map(|(mime, _)| *mime)
    }

    pub fn supports(&self, mime_type: &str) -> bool {
        self.lookup(mime_type).is_some()
    }
}
