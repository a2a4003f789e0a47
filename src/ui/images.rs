#[cfg(feature = "ui")]
use std::collections::HashMap;
#[cfg(feature = "ui")]
use std::time::Duration;

#[cfg(feature = "ui")]
use eframe::egui;
#[cfg(feature = "ui")]
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
#[cfg(feature = "ui")]
use tracing::debug;

/// Downloads product thumbnails in the background and keeps them as GPU
/// textures keyed by URL. A URL is fetched at most once per session;
/// failures stay failed instead of being hammered on every repaint.
#[cfg(feature = "ui")]
pub struct ThumbnailCache {
    textures: HashMap<String, TextureState>,
    results: UnboundedReceiver<(String, Option<egui::ColorImage>)>,
    results_tx: UnboundedSender<(String, Option<egui::ColorImage>)>,
    client: reqwest::Client,
}

#[cfg(feature = "ui")]
enum TextureState {
    Loading,
    Ready(egui::TextureHandle),
    Failed,
}

#[cfg(feature = "ui")]
impl ThumbnailCache {
    pub fn new() -> Self {
        let (results_tx, results) = unbounded_channel();
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            textures: HashMap::new(),
            results,
            results_tx,
            client,
        }
    }

    /// Upload finished downloads as textures. Called once per frame,
    /// before any card asks for its thumbnail.
    pub fn poll(&mut self, ctx: &egui::Context) {
        while let Ok((url, image)) = self.results.try_recv() {
            let state = match image {
                Some(image) => {
                    let texture = ctx.load_texture(&url, image, egui::TextureOptions::LINEAR);
                    TextureState::Ready(texture)
                }
                None => TextureState::Failed,
            };
            self.textures.insert(url, state);
        }
    }

    /// Texture for a URL, starting the download on first request.
    /// Returns None while the image is loading or after it failed.
    pub fn texture(&mut self, ctx: &egui::Context, url: &str) -> Option<egui::TextureHandle> {
        match self.textures.get(url) {
            Some(TextureState::Ready(texture)) => return Some(texture.clone()),
            Some(_) => return None,
            None => {}
        }

        self.textures.insert(url.to_string(), TextureState::Loading);

        let client = self.client.clone();
        let results = self.results_tx.clone();
        let ctx = ctx.clone();
        let url = url.to_string();
        tokio::spawn(async move {
            let image = fetch_thumbnail(&client, &url).await;
            if image.is_none() {
                debug!("Thumbnail fetch failed: {}", url);
            }
            let _ = results.send((url, image));
            ctx.request_repaint();
        });

        None
    }
}

#[cfg(feature = "ui")]
impl Default for ThumbnailCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "ui")]
async fn fetch_thumbnail(client: &reqwest::Client, url: &str) -> Option<egui::ColorImage> {
    let response = client.get(url).send().await.ok()?;
    if !response.status().is_success() {
        return None;
    }
    let bytes = response.bytes().await.ok()?;
    decode_thumbnail(&bytes)
}

#[cfg(feature = "ui")]
fn decode_thumbnail(bytes: &[u8]) -> Option<egui::ColorImage> {
    let decoded = image::load_from_memory(bytes).ok()?;
    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Some(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

#[cfg(all(test, feature = "ui"))]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_thumbnail(b"not an image").is_none());
        assert!(decode_thumbnail(b"").is_none());
    }

    #[test]
    fn test_decode_accepts_png() {
        let mut png = Vec::new();
        let image = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 128, 255]));
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .unwrap();

        let decoded = decode_thumbnail(&png).unwrap();
        assert_eq!(decoded.size, [2, 2]);
    }
}
