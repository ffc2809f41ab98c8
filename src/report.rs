use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write as _};
use std::path::Path;

use crate::record::PhotoRecord;

const SHOWN_ALTERNATIVES: usize = 3;

/// Human-readable listing of the best `top` photos.
pub fn render_top_results(results: &[PhotoRecord], top: usize) -> String {
    if results.is_empty() {
        return "No results to display\n".to_string();
    }

    let rule = "=".repeat(80);
    let mut out = String::new();
    let _ = writeln!(out, "\n{rule}");
    let _ = writeln!(
        out,
        "TOP {} PHOTOS FOR SOCIAL MEDIA",
        top.min(results.len())
    );
    let _ = writeln!(out, "{rule}");

    for (i, result) in results.iter().take(top).enumerate() {
        let _ = writeln!(out, "\n{}. {}", i + 1, result.file);
        let _ = writeln!(out, "   Score: {}/100", result.score);

        if let Some(shots) = result.similar_shots.filter(|&n| n > 1) {
            let _ = writeln!(out, "   📎 Best of {shots} similar shots");
            if let Some(alternatives) = &result.alternatives {
                let _ = writeln!(out, "      Alternatives: {}", summarize_alternatives(alternatives));
            }
        }

        if let Some(subject) = result.detail("main_subject") {
            let _ = writeln!(out, "   Subject: {subject}");
        }
        let reasoning = result.detail("reasoning");
        if let Some(reasoning) = reasoning {
            let _ = writeln!(out, "   Analysis: {reasoning}");
        }
        if let Some(appeal) = result.detail("social_media_appeal") {
            if Some(appeal) != reasoning {
                let _ = writeln!(out, "   Social Media Appeal: {appeal}");
            }
        }
        if let Some(caption) = result.caption() {
            let _ = writeln!(out, "   📱 Suggested Caption: {caption}");
        }
        if let Some(improvements) = result.detail("improvements") {
            let _ = writeln!(out, "   💡 Improvements: {improvements}");
        }
    }
    out
}

/// First few names, with a count of the rest.
fn summarize_alternatives(alternatives: &[String]) -> String {
    let mut list = alternatives
        .iter()
        .take(SHOWN_ALTERNATIVES)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if alternatives.len() > SHOWN_ALTERNATIVES {
        let _ = write!(list, " (+{} more)", alternatives.len() - SHOWN_ALTERNATIVES);
    }
    list
}

pub fn print_top_results(results: &[PhotoRecord], top: usize) {
    print!("{}", render_top_results(results, top));
}

pub fn write_json(path: &Path, results: &[PhotoRecord]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, results)
        .with_context(|| format!("Failed to write results to {:?}", path))?;
    writer.flush()?;
    Ok(())
}

/// One block per captioned photo among the best `top`. Returns how many were written.
pub fn render_captions(results: &[PhotoRecord], top: usize) -> (String, usize) {
    let mut out = String::new();
    let mut count = 0;
    for result in results.iter().take(top) {
        if let Some(caption) = result.caption() {
            let _ = write!(out, "{} (Score: {})\n{}\n\n", result.file, result.score, caption);
            count += 1;
        }
    }
    (out, count)
}

pub fn write_captions(path: &Path, results: &[PhotoRecord], top: usize) -> Result<usize> {
    let (content, count) = render_captions(results, top);
    fs::write(path, content).with_context(|| format!("Failed to write captions to {:?}", path))?;
    Ok(count)
}
