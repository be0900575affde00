//! Screenshot artifacts and baseline comparison

use std::path::{Path, PathBuf};

use image::{GenericImageView, Pixel, RgbaImage};
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use toolbox_layout::CheckResult;
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};

static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\p{L}\p{N}_-]+").expect("valid regex"));

/// Lowercase `name` and collapse everything but letters, digits, `_` and `-`
/// into single dashes.
pub fn slugify(name: &str) -> String {
    NON_SLUG
        .replace_all(&name.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// Result of comparing a screenshot with its baseline
#[derive(Debug, Clone)]
pub struct VisualDiff {
    /// Whether the images match (within threshold)
    pub matches: bool,

    /// Percentage of pixels that differ
    pub diff_percent: f64,

    pub diff_pixels: u64,
    pub total_pixels: u64,

    /// Path to the diff image (if generated)
    pub diff_image_path: Option<PathBuf>,

    pub actual_hash: String,
    pub baseline_hash: String,
}

impl VisualDiff {
    /// Fold the comparison into the scenario's check results
    pub fn to_check_result(&self, slug: &str, threshold: f64) -> CheckResult {
        let description = format!("screenshot '{}' matches baseline", slug);
        let details = format!(
            "{:.2}% of pixels differ (threshold {:.2}%)",
            self.diff_percent, threshold
        );
        if self.matches {
            CheckResult::pass(description, details)
        } else {
            CheckResult::fail(description, details)
        }
    }
}

/// Output directories for one verification run
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    screenshot_dir: PathBuf,
    baseline_dir: PathBuf,
    diff_dir: PathBuf,
}

impl ArtifactStore {
    /// Create the store's directories under `output_dir`.
    ///
    /// Paths are made absolute because browser scripts run with the
    /// Playwright project as their working directory.
    pub fn new(output_dir: &Path) -> E2eResult<Self> {
        std::fs::create_dir_all(output_dir)?;
        let output_dir = std::fs::canonicalize(output_dir)?;

        let store = Self {
            screenshot_dir: output_dir.join("screenshots"),
            baseline_dir: output_dir.join("baselines"),
            diff_dir: output_dir.join("diffs"),
        };

        std::fs::create_dir_all(&store.screenshot_dir)?;
        std::fs::create_dir_all(&store.baseline_dir)?;
        std::fs::create_dir_all(&store.diff_dir)?;

        Ok(store)
    }

    pub fn screenshot_dir(&self) -> &Path {
        &self.screenshot_dir
    }

    /// Path of the screenshot for `slug`; overwritten on every run
    pub fn screenshot_path(&self, slug: &str) -> PathBuf {
        self.screenshot_dir.join(format!("{}.png", slug))
    }

    /// Path of the best-effort screenshot taken when a run aborts
    pub fn error_screenshot_path(&self, slug: &str) -> PathBuf {
        self.screenshot_dir.join(format!("{}-error.png", slug))
    }

    fn baseline_path(&self, slug: &str) -> PathBuf {
        self.baseline_dir.join(format!("{}.png", slug))
    }

    /// Compare the current screenshot for `slug` against its baseline
    pub fn compare(&self, slug: &str, threshold: f64) -> E2eResult<VisualDiff> {
        let actual_path = self.screenshot_path(slug);
        let baseline_path = self.baseline_path(slug);

        if !actual_path.exists() {
            return Err(E2eError::Playwright(format!(
                "Screenshot not found: {}",
                actual_path.display()
            )));
        }

        if !baseline_path.exists() {
            return Err(E2eError::BaselineNotFound(
                baseline_path.to_string_lossy().to_string(),
            ));
        }

        let actual_hash = hash_file(&actual_path)?;
        let baseline_hash = hash_file(&baseline_path)?;
        let actual_img = image::open(&actual_path)?;

        if actual_hash == baseline_hash {
            debug!("Screenshot '{}' is byte-identical to its baseline", slug);
            let (width, height) = actual_img.dimensions();
            return Ok(VisualDiff {
                matches: true,
                diff_percent: 0.0,
                diff_pixels: 0,
                total_pixels: u64::from(width) * u64::from(height),
                diff_image_path: None,
                actual_hash,
                baseline_hash,
            });
        }

        let baseline_img = image::open(&baseline_path)?;
        if actual_img.dimensions() != baseline_img.dimensions() {
            warn!(
                "Screenshot '{}' dimensions differ: actual {:?} vs baseline {:?}",
                slug,
                actual_img.dimensions(),
                baseline_img.dimensions()
            );
        }

        let actual = actual_img.to_rgba8();
        let baseline = baseline_img.to_rgba8();
        // Compare over the union so content missing from either side counts
        let width = actual.width().max(baseline.width());
        let height = actual.height().max(baseline.height());
        let total_pixels = u64::from(width) * u64::from(height);

        let mut diff_img = RgbaImage::new(width, height);
        let mut diff_pixels = 0u64;

        for y in 0..height {
            for x in 0..width {
                let in_actual = x < actual.width() && y < actual.height();
                let in_baseline = x < baseline.width() && y < baseline.height();

                let same = in_actual
                    && in_baseline
                    && !pixels_differ(actual.get_pixel(x, y), baseline.get_pixel(x, y));

                if same {
                    let c = actual.get_pixel(x, y).channels();
                    diff_img.put_pixel(x, y, image::Rgba([c[0] / 2, c[1] / 2, c[2] / 2, 128]));
                } else {
                    diff_pixels += 1;
                    diff_img.put_pixel(x, y, image::Rgba([255, 0, 0, 255]));
                }
            }
        }

        let diff_percent = if total_pixels == 0 {
            0.0
        } else {
            diff_pixels as f64 / total_pixels as f64 * 100.0
        };
        let matches = diff_percent <= threshold;

        let diff_image_path = if diff_pixels > 0 {
            let path = self.diff_dir.join(format!("{}-diff.png", slug));
            diff_img.save(&path)?;
            Some(path)
        } else {
            None
        };

        if !matches {
            warn!(
                "Visual regression in '{}': {:.2}% pixels differ (threshold: {:.2}%)",
                slug, diff_percent, threshold
            );
        }

        Ok(VisualDiff {
            matches,
            diff_percent,
            diff_pixels,
            total_pixels,
            diff_image_path,
            actual_hash,
            baseline_hash,
        })
    }

    /// Replace the baseline for `slug` with the current screenshot
    pub fn update_baseline(&self, slug: &str) -> E2eResult<()> {
        let actual_path = self.screenshot_path(slug);
        if !actual_path.exists() {
            return Err(E2eError::Playwright(format!(
                "Cannot update baseline: screenshot not found: {}",
                actual_path.display()
            )));
        }

        std::fs::copy(&actual_path, self.baseline_path(slug))?;
        info!("Updated baseline for '{}'", slug);
        Ok(())
    }
}

/// Channels may differ by a few units (anti-aliasing, compression)
fn pixels_differ(a: &image::Rgba<u8>, b: &image::Rgba<u8>) -> bool {
    const TOLERANCE: i32 = 5;

    a.channels()
        .iter()
        .zip(b.channels())
        .any(|(x, y)| (i32::from(*x) - i32::from(*y)).abs() > TOLERANCE)
}

fn hash_file(path: &Path) -> E2eResult<String> {
    let data = std::fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&data)))
}
