use std::collections::HashMap;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use rayon::prelude::*;
use tracing::info;

use crate::config::Competition;
use crate::error::{RaceError, RaceResult};
use crate::http_client::fetch_bytes;
use crate::model::Colour;

const CREST_BASE_URL: &str =
    "https://raw.githubusercontent.com/MatthewG375/Prem-Table/refs/heads/main/Logos";

/// Supplies a decoded RGBA crest per team.
pub trait CrestSource: Sync {
    fn load(&self, team_id: u32) -> RaceResult<RgbaImage>;
}

#[derive(Debug, Clone)]
pub struct HttpCrestSource {
    base_url: String,
}

impl HttpCrestSource {
    pub fn for_competition(competition: Competition) -> Self {
        Self {
            base_url: format!("{CREST_BASE_URL}/{}", competition.code()),
        }
    }
}

impl CrestSource for HttpCrestSource {
    fn load(&self, team_id: u32) -> RaceResult<RgbaImage> {
        let bytes = fetch_bytes(&format!("{}/{team_id}.png", self.base_url), &[])?;
        decode_crest(&bytes)
    }
}

pub fn decode_crest(bytes: &[u8]) -> RaceResult<RgbaImage> {
    image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map(|img| img.to_rgba8())
        .map_err(|err| RaceError::malformed("crest image", err))
}

#[derive(Debug, Clone)]
pub struct Crest {
    /// Full colour, used under the x axis.
    pub colour: RgbaImage,
    /// Luminance only, used inside fixture bars.
    pub faded: RgbaImage,
}

impl Crest {
    pub fn new(colour: RgbaImage) -> Self {
        let faded = to_grayscale(&colour);
        Self { colour, faded }
    }
}

pub type CrestSet = HashMap<u32, Crest>;

/// Loads every crest; one failure aborts the whole set.
pub fn load_crests(source: &dyn CrestSource, team_ids: &[u32]) -> RaceResult<CrestSet> {
    let crests = team_ids
        .par_iter()
        .map(|id| source.load(*id).map(|img| (*id, Crest::new(img))))
        .collect::<RaceResult<CrestSet>>()?;
    info!(count = crests.len(), "loaded crests");
    Ok(crests)
}

pub fn to_grayscale(img: &RgbaImage) -> RgbaImage {
    DynamicImage::ImageLumaA8(imageops::grayscale_alpha(img)).to_rgba8()
}

/// Stretches `img` to exactly `width` x `height`.
pub fn fit(img: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    imageops::resize(img, width.max(1), height.max(1), FilterType::Triangle)
}

/// Alpha-composites `img` over a solid `background`, returning packed RGB bytes.
pub fn flatten_onto(img: &RgbaImage, background: Colour) -> Vec<u8> {
    let mut out = Vec::with_capacity((img.width() * img.height() * 3) as usize);
    for px in img.pixels() {
        let [r, g, b, a] = px.0;
        let alpha = u32::from(a);
        let blend = |fg: u8, bg: u8| -> u8 {
            ((u32::from(fg) * alpha + u32::from(bg) * (255 - alpha) + 127) / 255) as u8
        };
        out.push(blend(r, background.r));
        out.push(blend(g, background.g));
        out.push(blend(b, background.b));
    }
    out
}
