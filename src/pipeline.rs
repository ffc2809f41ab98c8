use anyhow::Result;
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::encode::{EncodeError, EncodedImage, encode_image};
use crate::grouping::{GroupLimits, GroupingStats, group_similar};
use crate::oracle::{Oracle, OracleError};
use crate::ranking::rank_by_score;
use crate::record::PhotoRecord;
use crate::scan::scan_directory;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluatorConfig {
    pub detect_duplicates: bool,
    pub limits: GroupLimits,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            detect_duplicates: true,
            limits: GroupLimits::default(),
        }
    }
}

/// What happened to one photo on its way through the scorer.
enum Outcome {
    Scored(PhotoRecord),
    Failed(PhotoRecord, OracleError),
    Unreadable(EncodeError),
}

/// Drives a folder through scoring, duplicate grouping and ranking.
pub struct Evaluator<O> {
    oracle: O,
    config: EvaluatorConfig,
    // Seeds are compared against many candidates in a row; keep the last one encoded.
    seed_image: RefCell<Option<(PathBuf, EncodedImage)>>,
}

impl<O: Oracle> Evaluator<O> {
    pub fn new(oracle: O, config: EvaluatorConfig) -> Self {
        Self {
            oracle,
            config,
            seed_image: RefCell::new(None),
        }
    }

    fn assess(&self, path: &Path) -> Outcome {
        let image = match encode_image(path) {
            Ok(image) => image,
            Err(err) => return Outcome::Unreadable(err),
        };

        let stamp = |mut record: PhotoRecord| {
            record.evaluated_at = Some(Utc::now().to_rfc3339());
            record
        };
        match self.oracle.score(&image) {
            Ok(assessment) => Outcome::Scored(stamp(PhotoRecord::from_assessment(path, assessment))),
            Err(err) => Outcome::Failed(stamp(PhotoRecord::from_failure(path, &err)), err),
        }
    }

    fn log_outcome(&self, path: &Path, outcome: &Outcome) {
        match outcome {
            Outcome::Scored(_) => {}
            Outcome::Failed(_, err) => {
                warn!("{} evaluation failed for {}: {err}", self.oracle.name(), path.display())
            }
            Outcome::Unreadable(err) => warn!("Skipping {}: {err}", path.display()),
        }
    }

    /// Score one photo. `None` if the file could not be read at all; oracle
    /// failures still produce a record, with score 0.
    pub fn evaluate_photo(&self, path: &Path) -> Option<PhotoRecord> {
        let outcome = self.assess(path);
        self.log_outcome(path, &outcome);
        match outcome {
            Outcome::Scored(record) | Outcome::Failed(record, _) => Some(record),
            Outcome::Unreadable(_) => None,
        }
    }

    pub fn score_all(&self, paths: &[PathBuf]) -> Result<Vec<PhotoRecord>> {
        let pb = ProgressBar::new(paths.len() as u64);
        pb.set_style(ProgressStyle::with_template(
            "{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}",
        )?);

        let mut records = Vec::with_capacity(paths.len());
        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            pb.set_message(name);

            let outcome = self.assess(path);
            pb.suspend(|| self.log_outcome(path, &outcome));
            if let Outcome::Scored(record) | Outcome::Failed(record, _) = outcome {
                pb.println(format!("{}: {}/100", record.file, record.score));
                if let Some(reasoning) = record.detail("reasoning") {
                    pb.println(format!("  Reason: {reasoning}"));
                }
                if let Some(caption) = record.caption() {
                    pb.println(format!("  📱 Caption: {caption}"));
                }
                records.push(record);
            }
            pb.inc(1);
        }
        pb.finish_and_clear();
        Ok(records)
    }

    /// Encoded image for a grouping seed, reusing the previous one when the
    /// seed has not changed.
    fn seed_image(&self, path: &Path) -> Result<EncodedImage, EncodeError> {
        let mut cached = self.seed_image.borrow_mut();
        if let Some((cached_path, image)) = cached.as_ref() {
            if cached_path == path {
                return Ok(image.clone());
            }
        }
        let image = encode_image(path)?;
        *cached = Some((path.to_path_buf(), image.clone()));
        Ok(image)
    }

    /// Oracle similarity for two scored photos. Photos that can no longer be
    /// read are never similar to anything.
    pub fn are_similar(&self, a: &PhotoRecord, b: &PhotoRecord) -> Result<bool, OracleError> {
        if !self.config.detect_duplicates {
            return Ok(false);
        }
        let (image_a, image_b) = match (self.seed_image(&a.path), encode_image(&b.path)) {
            (Ok(image_a), Ok(image_b)) => (image_a, image_b),
            (Err(err), _) | (_, Err(err)) => {
                debug!("Not comparing {} & {}: {err}", a.file, b.file);
                return Ok(false);
            }
        };
        self.oracle.similar(&image_a, &image_b)
    }

    /// Sort, collapse near-duplicates if enabled, and sort again for display.
    pub fn rank(&self, mut records: Vec<PhotoRecord>) -> (Vec<PhotoRecord>, Option<GroupingStats>) {
        rank_by_score(&mut records);
        if !self.config.detect_duplicates {
            return (records, None);
        }

        let (mut records, stats) =
            group_similar(records, &self.config.limits, |a, b| self.are_similar(a, b));
        rank_by_score(&mut records);
        (records, stats)
    }

    /// Evaluate every image directly inside `folder`.
    ///
    /// A missing or image-free folder is reported and yields an empty list.
    pub fn evaluate_folder(&self, folder: &Path) -> Result<Vec<PhotoRecord>> {
        if !folder.is_dir() {
            println!("Folder {} does not exist", folder.display());
            return Ok(Vec::new());
        }

        let images = scan_directory(folder)?;
        if images.is_empty() {
            println!("No image files found in {}", folder.display());
            return Ok(Vec::new());
        }

        println!(
            "Evaluating {} images for social media appeal with {}...",
            images.len(),
            self.oracle.name()
        );
        let records = self.score_all(&images)?;
        let (records, _) = self.rank(records);
        Ok(records)
    }
}
