//! Driver photo loading and display support.
//!
//! Supports whatever graphics protocol the terminal answers with
//! (Kitty, Sixel, iTerm2). Photos are downloaded in background tasks,
//! decoded (SVG placeholders are rasterized), and cached per driver as
//! ready-to-render protocols. Without graphics support nothing is fetched.

use image::DynamicImage;
use parking_lot::Mutex;
use ratatui_image::picker::Picker;
use ratatui_image::protocol::StatefulProtocol;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::PhotosConfig;

/// Why a photo could not be shown
#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to parse svg: {0}")]
    Svg(#[from] usvg::Error),

    #[error("cannot rasterize svg at {width}x{height}")]
    Raster { width: u32, height: u32 },
}

/// Downloads and decodes photos. Cheap to clone into tasks.
#[derive(Debug, Clone)]
pub struct PhotoLoader {
    http: reqwest::Client,
    size: u32,
}

impl PhotoLoader {
    pub fn new(size: u32, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            size: size.max(1),
        })
    }

    /// Download a photo and decode it to at most `size` pixels per side
    pub async fn fetch(&self, url: &str) -> Result<DynamicImage, PhotoError> {
        let http_err = |source| PhotoError::Http {
            url: url.to_string(),
            source,
        };

        let resp = self.http.get(url).send().await.map_err(http_err)?;
        if !resp.status().is_success() {
            return Err(PhotoError::Status {
                url: url.to_string(),
                status: resp.status().as_u16(),
            });
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = resp.bytes().await.map_err(http_err)?;

        decode(&bytes, content_type.as_deref(), self.size)
    }
}

/// Decode raster or SVG bytes into an image no larger than `size`
pub fn decode(bytes: &[u8], content_type: Option<&str>, size: u32) -> Result<DynamicImage, PhotoError> {
    if is_svg(bytes, content_type) {
        return rasterize_svg(bytes, size);
    }

    let img = image::load_from_memory(bytes)?;
    if img.width() > size || img.height() > size {
        Ok(img.thumbnail(size, size))
    } else {
        Ok(img)
    }
}

fn is_svg(bytes: &[u8], content_type: Option<&str>) -> bool {
    if content_type.is_some_and(|ct| ct.contains("svg")) {
        return true;
    }
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
    let head = head.trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

/// Render an SVG so its longest side is `size` pixels
fn rasterize_svg(bytes: &[u8], size: u32) -> Result<DynamicImage, PhotoError> {
    let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())?;
    let tree_size = tree.size();

    let scale = size as f32 / tree_size.width().max(tree_size.height());
    let width = (tree_size.width() * scale).round().max(1.0) as u32;
    let height = (tree_size.height() * scale).round().max(1.0) as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width, height).ok_or(PhotoError::Raster { width, height })?;
    resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    image::RgbaImage::from_raw(width, height, pixmap.take())
        .map(DynamicImage::ImageRgba8)
        .ok_or(PhotoError::Raster { width, height })
}

/// Whether we appear to be running inside an SSH session
fn over_ssh() -> bool {
    std::env::var_os("SSH_CONNECTION").is_some() || std::env::var_os("SSH_TTY").is_some()
}

/// Photo manager - owns the graphics picker and the per-driver cache.
/// Must be created before entering raw mode.
pub struct PhotoManager {
    /// The picker determines the graphics protocol and font size
    picker: Option<Picker>,
    /// Ready-to-render photos by driver identifier
    cache: HashMap<String, Arc<Mutex<StatefulProtocol>>>,
    loader: PhotoLoader,
}

impl PhotoManager {
    /// Query the terminal for graphics support
    pub fn new(config: &PhotosConfig, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let loader = PhotoLoader::new(config.size, timeout)?;

        if !config.enabled {
            return Ok(Self::without_graphics(loader));
        }
        if over_ssh() && !config.force_over_ssh {
            tracing::info!("SSH session detected, photos disabled");
            return Ok(Self::without_graphics(loader));
        }

        let picker = match Picker::from_query_stdio() {
            Ok(p) => {
                tracing::info!("Graphics protocol detected: {:?}", p.protocol_type());
                Some(p)
            }
            Err(e) => {
                tracing::debug!("No graphics protocol available: {}", e);
                None
            }
        };

        Ok(Self {
            picker,
            cache: HashMap::new(),
            loader,
        })
    }

    /// A manager that never shows photos
    pub fn without_graphics(loader: PhotoLoader) -> Self {
        Self {
            picker: None,
            cache: HashMap::new(),
            loader,
        }
    }

    /// A manager with a fixed font size instead of a terminal query
    #[cfg(test)]
    pub fn with_font_size(loader: PhotoLoader, font_size: (u16, u16)) -> Self {
        Self {
            picker: Some(Picker::from_fontsize(font_size)),
            cache: HashMap::new(),
            loader,
        }
    }

    pub fn supports_graphics(&self) -> bool {
        self.picker.is_some()
    }

    pub fn loader(&self) -> PhotoLoader {
        self.loader.clone()
    }

    /// Store a decoded photo for a driver
    pub fn install(&mut self, id: &str, img: DynamicImage) -> bool {
        let Some(picker) = self.picker.as_mut() else {
            return false;
        };
        let protocol = picker.new_resize_protocol(img);
        self.cache.insert(id.to_string(), Arc::new(Mutex::new(protocol)));
        true
    }

    pub fn get_cached(&self, id: &str) -> Option<Arc<Mutex<StatefulProtocol>>> {
        self.cache.get(id).cloned()
    }

    /// Forget a driver's photo
    pub fn evict(&mut self, id: &str) {
        self.cache.remove(id);
    }
}
