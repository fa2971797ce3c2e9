use std::time::Duration;

use dmtx_codec::{decode_symbol, encode_symbol, pattern_score, EncodeOptions};
use dmtx_core::{ImageBuffer, Payload, PayloadKind, Point, TagResult};
use nalgebra::{Point2, Vector2};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::budget::SearchBudget;
use crate::components::{Component, ComponentScanner};
use crate::finder::{candidate_sizes, convex_hull, frames, quad_from_hull, Frame};
use crate::params::{DecodeRequest, EngineConfig};
use crate::preprocess::{preprocess, Preprocessed};
use crate::render::render_matrix;
use crate::sample::{Grid, ModuleSampler};
use crate::threshold::{binarize, contrast, histogram, otsu_threshold, Polarity, Window};
use crate::{EngineError, PayloadError};

/// Reported corners sit this far inside the symbol outline, in pixels, so
/// they land on the symbol's own corner pixels.
const CORNER_INSET: f32 = 0.5;

/// A Data Matrix reader/writer.
///
/// Implementations are immutable once built and may be shared across
/// threads; every call allocates its own working state.
pub trait DecodeEngine: Send + Sync {
    /// Find up to `request.max_tags()` tags in `image`.
    ///
    /// Returns what was found when the timeout elapses. Zero tags is an
    /// empty `Ok`.
    fn decode(
        &self,
        image: &ImageBuffer,
        request: &DecodeRequest,
    ) -> Result<Vec<TagResult>, EngineError>;

    /// Render `payload` as a symbol image.
    fn generate_tag(&self, payload: &Payload) -> Result<ImageBuffer, EngineError>;
}

/// Outcome of [`DataMatrixEngine::decode_report`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodeReport {
    pub tags: Vec<TagResult>,
    /// The time budget ran out before the search finished.
    pub timed_out: bool,
    pub elapsed: Duration,
    /// Candidate regions that were geometrically analysed.
    pub candidates: usize,
}

/// In-process ECC 200 engine.
#[derive(Clone, Debug, Default)]
pub struct DataMatrixEngine {
    config: EngineConfig,
}

impl DataMatrixEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn payload_kind(&self) -> PayloadKind {
        self.config.payload_kind
    }

    /// Like [`DecodeEngine::decode`], with search diagnostics.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, image, request),
            fields(width = image.width(), height = image.height(), max_tags = request.max_tags())
        )
    )]
    pub fn decode_report(
        &self,
        image: &ImageBuffer,
        request: &DecodeRequest,
    ) -> Result<DecodeReport, EngineError> {
        if i32::try_from(image.width()).is_err() || i32::try_from(image.height()).is_err() {
            return Err(EngineError::DecodeEngineFailure(format!(
                "image {}x{} exceeds the addressable coordinate range",
                image.width(),
                image.height()
            )));
        }

        let budget = SearchBudget::new(request.timeout());
        let mut search = Search {
            config: &self.config,
            budget: &budget,
            max_tags: request.max_tags(),
            tags: Vec::new(),
            decoded: Vec::new(),
            candidates: 0,
        };
        search.run(image);

        let report = DecodeReport {
            tags: search.tags,
            timed_out: budget.has_tripped(),
            elapsed: budget.elapsed(),
            candidates: search.candidates,
        };
        log::debug!(
            "decoded {} tag(s) from {} candidate(s) in {:.1} ms{}",
            report.tags.len(),
            report.candidates,
            report.elapsed.as_secs_f64() * 1000.0,
            if report.timed_out { " (timed out)" } else { "" }
        );
        Ok(report)
    }
}

impl DecodeEngine for DataMatrixEngine {
    fn decode(
        &self,
        image: &ImageBuffer,
        request: &DecodeRequest,
    ) -> Result<Vec<TagResult>, EngineError> {
        self.decode_report(image, request).map(|r| r.tags)
    }

    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self)))]
    fn generate_tag(&self, payload: &Payload) -> Result<ImageBuffer, EngineError> {
        let expected = self.config.payload_kind;
        if payload.kind() != expected {
            return Err(PayloadError::KindMismatch {
                expected,
                found: payload.kind(),
            }
            .into());
        }
        if payload.is_empty() {
            return Err(PayloadError::Empty.into());
        }

        let render = &self.config.render;
        let options = EncodeOptions {
            scheme: render.scheme,
            size: render.size,
        };
        let symbol = encode_symbol(&payload.to_message(), &options)?;
        log::debug!(
            "encoded {payload} as {}x{} ({})",
            symbol.size.rows,
            symbol.size.cols,
            render.scheme.name()
        );
        Ok(render_matrix(
            &symbol.matrix,
            render.module_px,
            render.margin_px,
        )?)
    }
}

/// Working state of one decode call.
struct Search<'a> {
    config: &'a EngineConfig,
    budget: &'a SearchBudget,
    max_tags: usize,
    tags: Vec<TagResult>,
    /// Every symbol read so far, reported or not.
    decoded: Vec<Frame>,
    candidates: usize,
}

impl Search<'_> {
    fn done(&self) -> bool {
        self.tags.len() >= self.max_tags || self.budget.expired()
    }

    fn run(&mut self, image: &ImageBuffer) {
        let config = self.config;
        let detect = &config.detect;
        let Some(pre) = preprocess(image, detect.shrink, self.budget) else {
            return;
        };
        let view = pre.search_view();
        let window = self.window(&pre);
        let Some(hist) = histogram(&view, window, self.budget) else {
            return;
        };
        let spread = contrast(&hist);
        if spread < detect.min_contrast {
            log::debug!(
                "luminance spread {spread} below {}, nothing to read",
                detect.min_contrast
            );
            return;
        }
        let threshold = detect.threshold.unwrap_or_else(|| otsu_threshold(&hist));
        log::trace!("global threshold {threshold}");

        let passes: &[Polarity] = if detect.detect_inverted {
            &[Polarity::DarkOnLight, Polarity::LightOnDark]
        } else {
            &[Polarity::DarkOnLight]
        };
        for &polarity in passes {
            if self.done() {
                break;
            }
            self.scan(&pre, threshold, polarity, window);
        }
    }

    /// Search window in downsampled coordinates.
    fn window(&self, pre: &Preprocessed) -> Window {
        let view = pre.search_view();
        let Some(roi) = self.config.detect.roi else {
            return Window::full(view.width, view.height);
        };
        let s = pre.shrink;
        let x0 = (roi.x / s).min(view.width);
        let y0 = (roi.y / s).min(view.height);
        let x1 = roi.x.saturating_add(roi.width).div_ceil(s).min(view.width);
        let y1 = roi.y.saturating_add(roi.height).div_ceil(s).min(view.height);
        Window {
            x0,
            y0,
            x1: x1.max(x0),
            y1: y1.max(y0),
        }
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, pre, window), fields(shrink = pre.shrink))
    )]
    fn scan(&mut self, pre: &Preprocessed, threshold: u8, polarity: Polarity, window: Window) {
        let Some(mask) = binarize(
            &pre.search_view(),
            threshold,
            polarity,
            window,
            self.budget,
        ) else {
            return;
        };
        let scale = pre.shrink as f32;
        let min_side = (self.config.detect.min_edge_px / scale).ceil() as usize;
        let sampler = ModuleSampler::new(pre.gray.view(), polarity);

        for comp in ComponentScanner::new(&mask, min_side, self.budget) {
            if self.done() {
                break;
            }
            let extent = comp.width().max(comp.height()) as f32 * scale;
            if matches!(self.config.detect.max_edge_px, Some(max) if extent > max) {
                continue;
            }
            let center = Point2::from(comp.center().coords * scale);
            if self.decoded.iter().any(|f| f.contains(center)) {
                continue;
            }
            self.candidates += 1;

            let Some((frame, message)) = self.read_component(&comp, scale, &sampler, threshold)
            else {
                continue;
            };
            self.decoded.push(frame);
            let kind = self.config.payload_kind;
            match Payload::from_message(kind, &message) {
                Some(payload) => {
                    let corners = corner_points(&frame, pre.gray.width, pre.gray.height);
                    self.tags.push(TagResult::new(payload, corners));
                }
                None => log::debug!(
                    "skipping symbol at ({:.0}, {:.0}): content is not a {kind} payload",
                    frame.origin.x,
                    frame.origin.y
                ),
            }
        }
    }

    /// Try every orientation and plausible size of one blob, best border first.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "trace", skip(self, comp, sampler), fields(pixels = comp.pixels))
    )]
    fn read_component(
        &self,
        comp: &Component,
        scale: f32,
        sampler: &ModuleSampler<'_>,
        threshold: u8,
    ) -> Option<(Frame, Vec<u8>)> {
        let detect = &self.config.detect;
        let outline: Vec<Point2<f32>> = comp
            .outline()
            .into_iter()
            .map(|p| Point2::from(p.coords * scale))
            .collect();
        let quad = quad_from_hull(&convex_hull(&outline))?;

        let mut ranked = Vec::new();
        for frame in frames(&quad, detect.allow_mirrored) {
            for size in candidate_sizes(&frame, detect.min_module_px) {
                if self.budget.expired() {
                    return None;
                }
                let Some(grid) = Grid::new(&frame, size) else {
                    continue;
                };
                let score = sampler.border_score(&grid, threshold);
                if score >= detect.min_pattern_score {
                    ranked.push((score, frame, grid));
                }
            }
        }
        // Stable: equal scores keep enumeration order.
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (border, frame, grid) in ranked {
            if self.budget.expired() {
                return None;
            }
            let (rows, cols) = (grid.size.rows, grid.size.cols);
            let matrix = sampler.sample_matrix(&grid);
            let agreement = pattern_score(grid.size, &matrix);
            if agreement < detect.min_pattern_score {
                log::trace!("{rows}x{cols}: pattern agreement {agreement:.2} too low");
                continue;
            }
            match decode_symbol(grid.size, &matrix) {
                Ok(read) => {
                    log::debug!(
                        "read {rows}x{cols}{} symbol, border {border:.2}, {} codeword(s) corrected",
                        if frame.mirrored { " mirrored" } else { "" },
                        read.corrected
                    );
                    return Some((frame, read.message));
                }
                Err(e) => log::trace!("{rows}x{cols}: {e}"),
            }
        }
        None
    }
}

/// Integer corners, L corner first and anti-clockwise on screen, pulled
/// inside the outline and clamped into the image.
fn corner_points(frame: &Frame, width: usize, height: usize) -> [Point; 4] {
    let corners = frame.outline();
    let centroid = corners
        .iter()
        .fold(Vector2::zeros(), |acc: Vector2<f32>, p| acc + p.coords)
        / 4.0;
    let clamp = |v: f32, len: usize| v.floor().clamp(0.0, (len - 1) as f32) as i32;
    corners.map(|p| {
        let d = centroid - p.coords;
        let n = d.norm();
        let q = if n > 0.0 { p + d * (CORNER_INSET / n) } else { p };
        Point::new(clamp(q.x, width), clamp(q.y, height))
    })
}
