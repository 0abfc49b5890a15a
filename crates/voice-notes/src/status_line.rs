//! Terminal rendering of the live recording state and of note listings.

use crate::{
    category::Category,
    library::{LibraryStats, VoiceNote},
};

use std::{
    io::{self, Write},
    time::Duration,
};

use voice_notes_core::{PlaybackProgress, PlaybackStatus, RecordingState};

const LEVEL_BAR_WIDTH: usize = 20;
const ROW_PREVIEW_WIDTH: usize = 16;
const DETAIL_PREVIEW_WIDTH: usize = 50;
const SPARK_LEVELS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// `M:SS`, with invalid input shown as `0:00`.
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }

    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Horizontal meter for a level in [0, 1].
pub fn level_bar(level: f32, width: usize) -> String {
    let filled = ((level.clamp(0.0, 1.0) * width as f32).round() as usize).min(width);
    let mut bar = String::with_capacity(width * 3);
    bar.extend(std::iter::repeat_n('█', filled));
    bar.extend(std::iter::repeat_n('░', width - filled));
    bar
}

/// One block character per value in [0, 1].
pub fn sparkline(values: &[f32]) -> String {
    let top = (SPARK_LEVELS.len() - 1) as f32;
    values
        .iter()
        .map(|v| SPARK_LEVELS[(v.clamp(0.0, 1.0) * top).round() as usize])
        .collect()
}

/// Shrink an envelope to at most `width` points, keeping each bucket's peak.
pub fn downsample(values: &[f32], width: usize) -> Vec<f32> {
    if width == 0 {
        return Vec::new();
    }
    if values.len() <= width {
        return values.to_vec();
    }

    (0..width)
        .map(|i| {
            let start = i * values.len() / width;
            let end = ((i + 1) * values.len() / width).max(start + 1);
            values[start..end].iter().copied().fold(0.0f32, f32::max)
        })
        .collect()
}

/// Sparkline of a saved envelope at a fixed width.
pub fn envelope_preview(values: &[f32], width: usize) -> String {
    sparkline(&downsample(values, width))
}

/// Status text for a recording snapshot.
pub fn render_state(state: &RecordingState, max_duration: Duration) -> String {
    if state.is_idle() {
        return "Idle".to_string();
    }

    let label = if state.is_paused { "PAUSED" } else { "REC" };
    let remaining = (max_duration.as_secs_f64() - state.duration).max(0.0);

    format!(
        "{:<6} {} / {} {} {}",
        label,
        format_duration(state.duration),
        format_duration(remaining),
        level_bar(state.audio_level, LEVEL_BAR_WIDTH),
        sparkline(&state.waveform_data),
    )
}

/// One listing row: short id, favourite mark, category, duration, waveform,
/// title, tags.
pub fn render_note(note: &VoiceNote) -> String {
    let short_id: String = note.id.to_string().chars().take(8).collect();
    let favorite = if note.is_favorite { '★' } else { ' ' };
    let tags = if note.tags.is_empty() {
        String::new()
    } else {
        format!(" #{}", note.tags.join(" #"))
    };

    format!(
        "{} {} {} {:>5}  {}  {:<width$}  {}{}",
        short_id,
        favorite,
        note.category.info().emoji,
        format_duration(note.duration),
        note.created_at.format("%Y-%m-%d %H:%M"),
        envelope_preview(&note.waveform_data, ROW_PREVIEW_WIDTH),
        note.title,
        tags,
        width = ROW_PREVIEW_WIDTH,
    )
}

/// Full view of one note.
pub fn render_note_detail(note: &VoiceNote) -> String {
    let info = note.category.info();
    let mut out = format!(
        "{}\n  id:       {}\n  category: {} {}\n  length:   {}\n  created:  {}",
        note.title,
        note.id,
        info.emoji,
        info.name,
        format_duration(note.duration),
        note.created_at.format("%Y-%m-%d %H:%M"),
    );

    if note.is_favorite {
        out.push_str("\n  favourite");
    }
    if !note.tags.is_empty() {
        out.push_str(&format!("\n  tags:     #{}", note.tags.join(" #")));
    }
    out.push_str(&format!(
        "\n  {}",
        envelope_preview(&note.waveform_data, DETAIL_PREVIEW_WIDTH)
    ));

    out
}

/// Status text for the player, or `None` when nothing is open.
pub fn render_playback(status: &PlaybackStatus) -> Option<String> {
    let (label, progress) = match status {
        PlaybackStatus::Playing(progress) => ("PLAY", progress),
        PlaybackStatus::Paused(progress) => ("HOLD", progress),
        PlaybackStatus::Idle | PlaybackStatus::Finished => return None,
    };

    Some(format!(
        "{:<6} {} / {} {} {}x vol {}%",
        label,
        format_duration(progress.elapsed),
        format_duration(progress.duration),
        level_bar(playback_fraction(progress), LEVEL_BAR_WIDTH),
        progress.rate,
        (progress.volume * 100.0).round() as u32,
    ))
}

fn playback_fraction(progress: &PlaybackProgress) -> f32 {
    if progress.duration > 0.0 {
        (progress.elapsed / progress.duration) as f32
    } else {
        0.0
    }
}

/// Multi-line stats summary.
pub fn render_stats(stats: &LibraryStats) -> String {
    let mut out = format!(
        "{} notes, {} total, {} favourites",
        stats.total_notes,
        format_duration(stats.total_duration),
        stats.favorite_count
    );

    for (category, count) in &stats.category_stats {
        out.push_str(&format!("\n  {:<24} {}", category.to_string(), count));
    }

    out
}

/// Multi-line category table.
pub fn render_categories() -> String {
    Category::ALL
        .iter()
        .map(|c| {
            let info = c.info();
            let mut row = format!(
                "{:<9} {} {:<20} {:<7} {}",
                c.id(),
                info.emoji,
                info.name,
                info.color,
                info.description
            );
            if !info.keywords.is_empty() {
                row.push_str(&format!("\n          keywords: {}", info.keywords.join(", ")));
            }
            row
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Single self-overwriting terminal line for the live meter.
#[derive(Debug, Default)]
pub struct StatusLine {
    visible: bool,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the meter occupies the current terminal line.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Redraw the recording meter in place.
    pub fn draw(&mut self, state: &RecordingState, max_duration: Duration) {
        self.draw_text(&render_state(state, max_duration));
    }

    /// Replace the meter line with `text`.
    pub fn draw_text(&mut self, text: &str) {
        let mut stdout = io::stdout().lock();
        let _ = write!(stdout, "\r\x1b[2K{}", text);
        let _ = stdout.flush();
        self.visible = true;
    }

    /// Remove the meter so regular output starts on a clean line.
    pub fn clear(&mut self) {
        if self.visible {
            let mut stdout = io::stdout().lock();
            let _ = write!(stdout, "\r\x1b[2K");
            let _ = stdout.flush();
            self.visible = false;
        }
    }

    /// Print a message line after clearing the meter. The meter comes back
    /// on the next draw.
    pub fn println(&mut self, message: &str) {
        self.clear();
        println!("{}", message);
    }
}
