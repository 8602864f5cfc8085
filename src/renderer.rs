// src/renderer.rs

use crate::grouping::{others_commits, rank_visible, timeline_categories};
use crate::model::*;
use crate::timeline::TimelineAnalysis;
use owo_colors::OwoColorize;
use palette::{FromColor, Lch, Srgb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Write};

const TABLE_WIDTH: usize = 132;
const CHART_WIDTH: usize = 50;
/// Columns in the timeline table, including `community` and `others`
const TIMELINE_COLUMNS: usize = 5;

/// An 8-bit sRGB color
pub type Rgb = [u8; 3];

const COMMUNITY_COLOR: Rgb = [200, 200, 200];
const OTHERS_COLOR: Rgb = [110, 110, 110];

/// Assign a color to every category. Depends only on the set of names, so the same categories always get
/// the same colors.
pub fn category_colors<'a, I>(categories: I) -> BTreeMap<String, Rgb>
where
    I: IntoIterator<Item = &'a str>,
{
    let names: BTreeSet<&str> = categories.into_iter().collect();
    let mut rng = StdRng::seed_from_u64(42); // Seed for deterministic colors

    let mut colors = BTreeMap::new();
    for name in names {
        let color = match name {
            COMMUNITY => COMMUNITY_COLOR,
            OTHERS => OTHERS_COLOR,
            _ => {
                let hue = rng.gen_range(0.0f32..360.0f32);
                let lch = Lch::new(70.0f32, 80.0f32, hue); // Bright, saturated colors
                let srgb: Srgb<f32> = Srgb::from_color(lch);
                let (r, g, b) = srgb.into_components();
                [(r * 255.0f32) as u8, (g * 255.0f32) as u8, (b * 255.0f32) as u8]
            }
        };
        colors.insert(name.to_string(), color);
    }
    colors
}

/// Applies terminal styling, or passes text through untouched when color is off
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    enabled: bool,
}

impl Painter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    fn rgb(self, text: &str, color: Rgb) -> String {
        if self.enabled {
            text.truecolor(color[0], color[1], color[2]).to_string()
        } else {
            text.to_string()
        }
    }

    fn title(self, text: &str) -> String {
        if self.enabled {
            text.cyan().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn header(self, text: &str) -> String {
        if self.enabled {
            text.magenta().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn success(self, text: &str) -> String {
        if self.enabled {
            text.green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn failure(self, text: &str) -> String {
        if self.enabled {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(self, text: &str) -> String {
        if self.enabled {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }
}

fn format_day(range: Option<&DateRange>) -> (String, String) {
    range.map_or_else(
        || ("-".to_string(), "-".to_string()),
        |r| (r.start.format("%Y-%m-%d").to_string(), r.end.format("%Y-%m-%d").to_string()),
    )
}

/// Rounded box around `lines`. Only the first line (the title) is styled.
fn write_box<W: Write>(w: &mut W, painter: Painter, lines: &[String]) -> fmt::Result {
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
    writeln!(w, "╭{}╮", "─".repeat(width))?;
    for (i, line) in lines.iter().enumerate() {
        let pad = width - 4 - line.chars().count();
        let text = if i == 0 { painter.title(line) } else { line.clone() };
        writeln!(w, "│  {text}{}  │", " ".repeat(pad))?;
    }
    writeln!(w, "╰{}╯", "─".repeat(width))
}

/// Whole-repository report: summary box, breakdown table, bar charts and insights.
pub fn write_repository_report<W: Write>(
    w: &mut W,
    analysis: &RepositoryAnalysis,
    top_n: usize,
    painter: Painter,
) -> fmt::Result {
    let mut names: Vec<&str> = analysis.vendor_metrics.keys().map(String::as_str).collect();
    names.push(OTHERS);
    let colors = category_colors(names);

    let (start, end) = format_day(analysis.date_range.as_ref());
    write_box(
        w,
        painter,
        &[
            analysis.repo_name.clone(),
            String::new(),
            format!("Total Commits: {}", format_number(analysis.total_commits as i64)),
            format!("Total Contributors: {}", format_number(analysis.total_contributors as i64)),
            format!("Date Range: {start} to {end}"),
        ],
    )?;
    writeln!(w)?;

    write_summary_table(w, analysis, top_n, painter, &colors)?;
    for metric in [Metric::Commits, Metric::Additions, Metric::Contributors] {
        writeln!(w)?;
        write_bar_chart(w, analysis, metric, painter, &colors)?;
    }
    writeln!(w)?;
    write_insights(w, analysis, painter)
}

fn write_summary_table<W: Write>(
    w: &mut W,
    analysis: &RepositoryAnalysis,
    top_n: usize,
    painter: Painter,
    colors: &BTreeMap<String, Rgb>,
) -> fmt::Result {
    writeln!(w, "{}", painter.header("Vendor/Community Breakdown"))?;
    writeln!(w)?;
    writeln!(
        w,
        "{:<18} {:>10}  {:>10}  {:>14}  {:>16}  {:>15}  {:>15}  {:>13}",
        "Category", "Commits", "% Commits", "Contributors", "% Contributors", "Lines Added", "Lines Deleted", "Net Change"
    )?;
    writeln!(w, "{}", "─".repeat(TABLE_WIDTH))?;

    for group in rank_visible(&analysis.vendor_metrics, Metric::Commits, top_n) {
        let color = colors.get(&group.name).copied().unwrap_or(OTHERS_COLOR);
        let name = painter.rgb(&format!("{:<18}", group.name), color);
        writeln!(
            w,
            "{} {:>10}  {:>10}  {:>14}  {:>16}  {:>15}  {:>15}  {:>13}",
            name,
            format_number(group.total_commits as i64),
            format!("{:.1}%", percentage(group.total_commits, analysis.total_commits)),
            format_number(group.contributor_count() as i64),
            format!("{:.1}%", percentage(group.contributor_count(), analysis.total_contributors)),
            format!("+{}", format_number(group.total_additions as i64)),
            format!("-{}", format_number(group.total_deletions as i64)),
            format_number(group.net_changes()),
        )?;
    }
    Ok(())
}

fn write_bar_chart<W: Write>(
    w: &mut W,
    analysis: &RepositoryAnalysis,
    metric: Metric,
    painter: Painter,
    colors: &BTreeMap<String, Rgb>,
) -> fmt::Result {
    let title = match metric {
        Metric::Commits => "Commits Distribution",
        Metric::Additions => "Lines Added Distribution",
        Metric::Deletions => "Lines Deleted Distribution",
        Metric::Contributors => "Contributors Distribution",
    };
    writeln!(w, "{}", painter.header(title))?;
    writeln!(w)?;

    let rows: Vec<(&str, u64)> = analysis
        .sorted_categories(metric, true)
        .iter()
        .filter_map(|name| analysis.vendor_metrics.get(name))
        .filter(|m| m.total_commits > 0)
        .map(|m| (m.name.as_str(), m.value(metric)))
        .collect();
    let max = rows.iter().map(|&(_, v)| v).max().unwrap_or(0);

    for (name, value) in rows {
        let length = if max > 0 { (value * CHART_WIDTH as u64 / max) as usize } else { 0 };
        let color = colors.get(name).copied().unwrap_or(OTHERS_COLOR);
        writeln!(
            w,
            "{:.<20} {} {:>8}",
            name,
            painter.rgb(&"█".repeat(length), color),
            format_number(value as i64)
        )?;
    }
    Ok(())
}

fn write_insights<W: Write>(w: &mut W, analysis: &RepositoryAnalysis, painter: Painter) -> fmt::Result {
    writeln!(w, "{}", painter.header("Key Insights"))?;
    writeln!(w)?;

    if let Some(leader) = analysis.sorted_categories(Metric::Commits, true).first() {
        let commits = analysis.vendor_metrics.get(leader).map_or(0, |m| m.total_commits);
        writeln!(
            w,
            "{} leads with {:.1}% of commits ({} commits)",
            painter.success(leader),
            analysis.vendor_percentage(leader, Metric::Commits),
            format_number(commits as i64),
        )?;
    }

    if let Some(community) = analysis.vendor_metrics.get(COMMUNITY) {
        writeln!(
            w,
            "Community contributes {:.1}% of commits with {} contributors",
            analysis.vendor_percentage(COMMUNITY, Metric::Commits),
            format_number(community.contributor_count() as i64),
        )?;
    }

    let changes: u64 = analysis
        .vendor_metrics
        .values()
        .map(|m| m.total_additions + m.total_deletions)
        .sum();
    let average = changes.checked_div(analysis.total_commits).unwrap_or(0);
    writeln!(w, "Average commit size: {} lines changed", format_number(average as i64))
}

/// Period-by-period report: summary box, timeline table and trends.
pub fn write_timeline_report<W: Write>(w: &mut W, timeline: &TimelineAnalysis, painter: Painter) -> fmt::Result {
    let mut names: BTreeSet<&str> = timeline
        .periods
        .iter()
        .flat_map(|p| p.vendor_metrics.keys().map(String::as_str))
        .collect();
    names.insert(OTHERS);
    let colors = category_colors(names);

    let (start, end) = format_day(timeline.date_range.as_ref());
    write_box(
        w,
        painter,
        &[
            timeline.repo_name.clone(),
            timeline.granularity.label().to_string(),
            String::new(),
            format!("Total Periods: {}", format_number(timeline.periods.len() as i64)),
            format!("Date Range: {start} to {end}"),
        ],
    )?;
    writeln!(w)?;

    write_timeline_table(w, timeline, painter, &colors)?;
    writeln!(w)?;
    write_trends(w, timeline, painter)
}

fn write_timeline_table<W: Write>(
    w: &mut W,
    timeline: &TimelineAnalysis,
    painter: Painter,
    colors: &BTreeMap<String, Rgb>,
) -> fmt::Result {
    writeln!(w, "{}", painter.header("Timeline Breakdown"))?;
    writeln!(w)?;

    let columns = timeline_categories(timeline, TIMELINE_COLUMNS);
    write!(w, "{:<15} {:>10}", "Period", "Total")?;
    for column in &columns {
        write!(w, "  {column:>12}")?;
    }
    writeln!(w)?;
    writeln!(w, "{}", "─".repeat(15 + 12 + columns.len() * 14))?;

    for period in &timeline.periods {
        write!(w, "{:<15} {:>10}", period.period, format_number(period.total_commits as i64))?;
        for column in &columns {
            let (commits, pct) = if column == OTHERS {
                let commits = others_commits(period, &columns);
                (commits, percentage(commits, period.total_commits))
            } else {
                let commits = period.vendor_metrics.get(column).map_or(0, |m| m.total_commits);
                (commits, period.vendor_percentage(column, Metric::Commits))
            };

            if commits == 0 {
                write!(w, "  {:>12}", "-")?;
                continue;
            }
            let cell = format!("{:>12}", format!("{} ({pct:.0}%)", format_number(commits as i64)));
            let color = colors.get(column).copied().unwrap_or(OTHERS_COLOR);
            write!(w, "  {}", painter.rgb(&cell, color))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

fn write_trends<W: Write>(w: &mut W, timeline: &TimelineAnalysis, painter: Painter) -> fmt::Result {
    writeln!(w, "{}", painter.header("Key Trends"))?;
    writeln!(w)?;

    let (Some(first), Some(last)) = (timeline.periods.first(), timeline.periods.last()) else {
        return writeln!(w, "No data available");
    };

    writeln!(
        w,
        "Period Range: {} → {}",
        painter.success(&first.period),
        painter.success(&last.period)
    )?;

    let change = last.total_commits as i64 - first.total_commits as i64;
    let change_text = format!("{change:+}");
    let change_text = match change.signum() {
        1 => painter.success(&change_text),
        -1 => painter.failure(&change_text),
        _ => change_text,
    };
    writeln!(
        w,
        "Commits: {} → {} ({change_text})",
        format_number(first.total_commits as i64),
        format_number(last.total_commits as i64),
    )?;

    if let Some(community) = first.vendor_metrics.get(COMMUNITY) {
        writeln!(w)?;
        let first_pct = first.vendor_percentage(COMMUNITY, Metric::Commits);
        let last_pct = last.vendor_percentage(COMMUNITY, Metric::Commits);
        let arrow = if last_pct > first_pct {
            "↗"
        } else if last_pct < first_pct {
            "↘"
        } else {
            "→"
        };
        writeln!(w, "Community: {first_pct:.1}% → {last_pct:.1}% {arrow}")?;

        if community.contributor_count() > 0 {
            let last_count = last.vendor_metrics.get(COMMUNITY).map_or(0, CategoryMetrics::contributor_count);
            writeln!(
                w,
                "   Contributors: {} → {}",
                community.contributor_count(),
                last_count
            )?;
        }
    }

    writeln!(w)?;
    writeln!(w, "{}", painter.dim(&format!("Breakdown: {}", timeline.granularity)))
}
