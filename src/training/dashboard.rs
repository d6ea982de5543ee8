//! Static dashboard generation
//!
//! Renders the training history as self-contained artifacts: per-version
//! SVG charts (reward histogram, action histogram, feature importances), a
//! cross-version learning curve, and one HTML page listing every version
//! with its metadata. Everything is regenerated wholesale after a training
//! run; nothing here is served live.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::experience::ExperienceRecord;

use super::dataset::FEATURE_NAMES;
use super::versioning::{self, ModelConfig};

const REWARD_CHART: &str = "reward_histogram.svg";
const ACTION_CHART: &str = "action_histogram.svg";
const IMPORTANCE_CHART: &str = "feature_importance.svg";
const CURVE_CHART: &str = "learning_curve.svg";

/// Write the per-version charts from the log a model was trained on
pub fn write_version_charts(
    plots_dir: &Path,
    version: u32,
    records: &[ExperienceRecord],
    importances: &[f32],
) -> Result<()> {
    let dir = plots_dir.join(format!("v{version}"));
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create plots directory {:?}", dir))?;

    fs::write(dir.join(REWARD_CHART), reward_histogram_svg(records))
        .context("Failed to write reward histogram")?;
    fs::write(dir.join(ACTION_CHART), action_histogram_svg(records))
        .context("Failed to write action histogram")?;
    fs::write(dir.join(IMPORTANCE_CHART), importance_svg(importances))
        .context("Failed to write feature importance chart")?;

    log::info!("Wrote charts for v{version} to {:?}", dir);
    Ok(())
}

/// Regenerate the learning curve and the dashboard page from every version
/// currently on disk
pub fn write_dashboard(models_dir: &Path, plots_dir: &Path, page_path: &Path) -> Result<()> {
    fs::create_dir_all(plots_dir)
        .with_context(|| format!("Failed to create plots directory {:?}", plots_dir))?;

    let mut configs: Vec<(u32, ModelConfig)> = Vec::new();
    for version in versioning::list_versions(models_dir) {
        match versioning::load_config(models_dir, version) {
            Ok(config) => configs.push((version, config)),
            Err(err) => log::warn!("Skipping v{version} in dashboard: {err:#}"),
        }
    }

    let scores: Vec<(u32, f32)> = configs.iter().map(|(v, c)| (*v, c.f1_macro)).collect();
    fs::write(plots_dir.join(CURVE_CHART), learning_curve_svg(&scores))
        .context("Failed to write learning curve")?;

    // The page links charts relative to its own directory
    let plots_rel = page_path
        .parent()
        .and_then(|parent| plots_dir.strip_prefix(parent).ok())
        .unwrap_or(plots_dir);
    let html = dashboard_html(&configs, &plots_rel.display().to_string());
    fs::write(page_path, html)
        .with_context(|| format!("Failed to write dashboard page {:?}", page_path))?;

    log::info!("Dashboard regenerated at {:?} ({} versions)", page_path, configs.len());
    Ok(())
}

/// Histogram of per-tick rewards
fn reward_histogram_svg(records: &[ExperienceRecord]) -> String {
    if records.is_empty() {
        return empty_chart();
    }
    let rewards: Vec<f32> = records.iter().map(|r| r.reward).collect();
    let min = rewards.iter().copied().fold(f32::INFINITY, f32::min);
    let max = rewards.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let span = if max > min { max - min } else { 1.0 };

    const BINS: usize = 10;
    let mut counts = [0usize; BINS];
    for reward in &rewards {
        let bin = (((reward - min) / span) * BINS as f32) as usize;
        counts[bin.min(BINS - 1)] += 1;
    }

    let bars: Vec<(String, f32)> = counts
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            let low = min + span * i as f32 / BINS as f32;
            (format!("{low:.1}"), count as f32)
        })
        .collect();
    bar_chart_svg(&bars, "reward", "ticks")
}

/// Histogram of selected action labels
fn action_histogram_svg(records: &[ExperienceRecord]) -> String {
    if records.is_empty() {
        return empty_chart();
    }
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.action.as_str()).or_default() += 1;
    }
    let bars: Vec<(String, f32)> = counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count as f32))
        .collect();
    bar_chart_svg(&bars, "action", "ticks")
}

/// Feature importance bars in fixed feature order
fn importance_svg(importances: &[f32]) -> String {
    let bars: Vec<(String, f32)> = FEATURE_NAMES
        .iter()
        .zip(importances)
        .map(|(name, &value)| (name.to_string(), value))
        .collect();
    bar_chart_svg(&bars, "feature", "importance")
}

/// F1 macro score per version
fn learning_curve_svg(scores: &[(u32, f32)]) -> String {
    if scores.is_empty() {
        return empty_chart();
    }

    let width = 600;
    let height = 220;
    let padding = 40;
    let span_x = (width - 2 * padding) as f32;
    let span_y = (height - 2 * padding) as f32;
    let denom = (scores.len().max(2) - 1) as f32;

    let mut path = String::new();
    let mut dots = String::new();
    for (i, (_, score)) in scores.iter().enumerate() {
        let x = padding as f32 + i as f32 / denom * span_x;
        let y = height as f32 - padding as f32 - score.clamp(0.0, 1.0) * span_y;
        if i == 0 {
            path.push_str(&format!("M{x:.1},{y:.1}"));
        } else {
            path.push_str(&format!(" L{x:.1},{y:.1}"));
        }
        dots.push_str(&format!(r#"<circle cx="{x:.1}" cy="{y:.1}" r="3" fill="cyan"/>"#));
    }

    let labels: String = scores
        .iter()
        .enumerate()
        .map(|(i, (version, _))| {
            let x = padding as f32 + i as f32 / denom * span_x;
            format!(
                r#"<text x="{x:.1}" y="{y}" fill="gray" font-size="12" text-anchor="middle">v{version}</text>"#,
                y = height - padding + 15
            )
        })
        .collect();

    format!(
        r#"<svg width="{width}" height="{height}" viewBox="0 0 {width} {height}" xmlns="http://www.w3.org/2000/svg">
    <line x1="{padding}" y1="{padding}" x2="{padding}" y2="{y_bottom}" stroke="gray" stroke-width="1"/>
    <line x1="{padding}" y1="{y_bottom}" x2="{x_right}" y2="{y_bottom}" stroke="gray" stroke-width="1"/>
    <path d="{path}" fill="none" stroke="cyan" stroke-width="2"/>
    {dots}
    {labels}
    <text x="{padding}" y="{top_label}" fill="gray" font-size="12">1.0</text>
    <text x="{padding}" y="{label_y}" fill="gray" font-size="12">0.0</text>
    <text x="{mid_x}" y="{xlabel_y}" fill="gray" font-size="12" text-anchor="middle">F1 macro by version</text>
</svg>"#,
        y_bottom = height - padding,
        x_right = width - padding,
        top_label = padding - 5,
        label_y = height - padding + 15,
        mid_x = width / 2,
        xlabel_y = height - 5,
    )
}

/// Shared vertical bar chart
fn bar_chart_svg(bars: &[(String, f32)], x_label: &str, y_label: &str) -> String {
    if bars.is_empty() {
        return empty_chart();
    }

    let width = 600;
    let height = 220;
    let padding = 40;
    let span_x = (width - 2 * padding) as f32;
    let span_y = (height - 2 * padding) as f32;
    let max_value = bars.iter().map(|(_, v)| *v).fold(0.0f32, f32::max).max(1e-6);
    let slot = span_x / bars.len() as f32;
    let bar_width = (slot * 0.8).max(1.0);

    let mut rects = String::new();
    let mut labels = String::new();
    for (i, (label, value)) in bars.iter().enumerate() {
        let x = padding as f32 + i as f32 * slot + slot * 0.1;
        let bar_height = (value / max_value) * span_y;
        let y = height as f32 - padding as f32 - bar_height;
        rects.push_str(&format!(
            r##"<rect x="{x:.1}" y="{y:.1}" width="{bar_width:.1}" height="{bar_height:.1}" fill="#4ecdc4"/>"##
        ));
        labels.push_str(&format!(
            r#"<text x="{cx:.1}" y="{ly}" fill="gray" font-size="10" text-anchor="middle">{label}</text>"#,
            cx = x + bar_width / 2.0,
            ly = height - padding + 13
        ));
    }

    format!(
        r#"<svg width="{width}" height="{height}" viewBox="0 0 {width} {height}" xmlns="http://www.w3.org/2000/svg">
    <line x1="{padding}" y1="{padding}" x2="{padding}" y2="{y_bottom}" stroke="gray" stroke-width="1"/>
    <line x1="{padding}" y1="{y_bottom}" x2="{x_right}" y2="{y_bottom}" stroke="gray" stroke-width="1"/>
    {rects}
    {labels}
    <text x="{padding}" y="{top_label}" fill="gray" font-size="12">{max_value:.0}</text>
    <text x="{mid_x}" y="{xlabel_y}" fill="gray" font-size="12" text-anchor="middle">{x_label}</text>
    <text x="15" y="{mid_y}" fill="gray" font-size="12" transform="rotate(-90, 15, {mid_y})">{y_label}</text>
</svg>"#,
        y_bottom = height - padding,
        x_right = width - padding,
        top_label = padding - 5,
        mid_x = width / 2,
        xlabel_y = height - 5,
        mid_y = height / 2,
    )
}

fn empty_chart() -> String {
    r#"<svg width="600" height="220" xmlns="http://www.w3.org/2000/svg">
    <text x="300" y="110" fill="gray" font-size="14" text-anchor="middle">No data</text>
</svg>"#
        .to_string()
}

/// The dashboard page: stats cards, the learning curve, and one expandable
/// section per version, newest first
fn dashboard_html(configs: &[(u32, ModelConfig)], plots_rel: &str) -> String {
    let best_f1 = configs
        .iter()
        .map(|(_, c)| c.f1_macro)
        .fold(0.0f32, f32::max);
    let latest = configs.iter().map(|(v, _)| *v).max().unwrap_or(0);

    let mut sections = String::new();
    for (version, config) in configs.iter().rev() {
        sections.push_str(&format!(
            r#"        <details{open}>
            <summary>v{version} &mdash; F1 macro {f1:.3}</summary>
            <table>
                <tr><td>model type</td><td>{model_type}</td></tr>
                <tr><td>max depth</td><td>{max_depth}</td></tr>
                <tr><td>test split</td><td>{test_split}</td></tr>
                <tr><td>trained on</td><td>{trained_on} records</td></tr>
                <tr><td>features</td><td>{features}</td></tr>
                <tr><td>trained at</td><td>{timestamp}</td></tr>
            </table>
            <div class="charts">
                <img src="{plots_rel}/v{version}/{reward}" alt="reward histogram v{version}"/>
                <img src="{plots_rel}/v{version}/{action}" alt="action histogram v{version}"/>
                <img src="{plots_rel}/v{version}/{importance}" alt="feature importances v{version}"/>
            </div>
        </details>
"#,
            open = if *version == latest { " open" } else { "" },
            f1 = config.f1_macro,
            model_type = config.model_type,
            max_depth = config.max_depth,
            test_split = config.test_split,
            trained_on = config.trained_on,
            features = config.features.join(", "),
            timestamp = config.timestamp,
            reward = REWARD_CHART,
            action = ACTION_CHART,
            importance = IMPORTANCE_CHART,
        ));
    }
    if sections.is_empty() {
        sections = "        <p class=\"description\">No trained versions yet.</p>\n".to_string();
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Kokoro Policy Dashboard</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 1000px;
            margin: 0 auto;
            padding: 20px;
            background: #1a1a2e;
            color: #eee;
        }}
        h1, h2 {{ color: #4ecdc4; }}
        .header {{
            border-bottom: 2px solid #4ecdc4;
            padding-bottom: 20px;
            margin-bottom: 30px;
        }}
        .stats-grid {{
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
            gap: 20px;
            margin-bottom: 30px;
        }}
        .stat-card {{
            background: #16213e;
            padding: 20px;
            border-radius: 10px;
            text-align: center;
        }}
        .stat-value {{
            font-size: 2em;
            font-weight: bold;
            color: #4ecdc4;
        }}
        .stat-label {{
            color: #888;
            font-size: 0.9em;
        }}
        .chart-container, details {{
            background: #16213e;
            padding: 20px;
            border-radius: 10px;
            margin-bottom: 20px;
        }}
        summary {{ cursor: pointer; color: #4ecdc4; font-weight: bold; }}
        table {{ margin: 15px 0; border-collapse: collapse; }}
        td {{ padding: 4px 12px; color: #aaa; }}
        .charts img {{ display: block; margin: 10px 0; max-width: 100%; }}
        .description {{ color: #aaa; }}
    </style>
</head>
<body>
    <div class="header">
        <h1>Kokoro Policy Dashboard</h1>
        <p class="description">Versioned decision-tree policies trained from logged experience</p>
    </div>

    <div class="stats-grid">
        <div class="stat-card">
            <div class="stat-value">{version_count}</div>
            <div class="stat-label">Versions</div>
        </div>
        <div class="stat-card">
            <div class="stat-value">{best_f1:.3}</div>
            <div class="stat-label">Best F1 macro</div>
        </div>
        <div class="stat-card">
            <div class="stat-value">v{latest}</div>
            <div class="stat-label">Latest</div>
        </div>
    </div>

    <div class="chart-container">
        <h2>Learning Curve</h2>
        <img src="{plots_rel}/{curve}" alt="F1 macro by version"/>
    </div>

    <div>
        <h2>Versions</h2>
{sections}    </div>

    <footer style="text-align: center; color: #666; margin-top: 40px;">
        Generated by kokoro train
    </footer>
</body>
</html>"#,
        version_count = configs.len(),
        curve = CURVE_CHART,
    )
}
