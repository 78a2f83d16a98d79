//! Frame composition
//!
//! A frame is a pure function of the game state: background, grid, player,
//! falling entities, HUD, then the pause/game-over overlay.

use super::surface::{Surface, TextAlign};
use crate::leaderboard::format_score;
use crate::settings::Settings;
use crate::sim::{Entity, EntityKind, GamePhase, GameState};
use crate::tuning::Tuning;

/// Synthwave palette
pub mod palette {
    pub const BACKGROUND: [(f32, &str); 3] = [(0.0, "#1a0b2e"), (0.5, "#16213e"), (1.0, "#0f051d")];
    pub const GRID: &str = "#ff00ff33";
    pub const NEON_PINK: &str = "#ff00ff";
    pub const BOMB: &str = "#ff4444";
    pub const TOKEN: &str = "#00ffff";
    pub const POWERUP: &str = "#facc15";
    pub const OBSTACLE: &str = "#6b7280";
    pub const LABEL: &str = "#ffffff";

    pub const PLAYER_BODY: &str = "#8b5cf6";
    pub const PLAYER_HEAD: &str = "#f5f5dc";
    pub const PLAYER_SPINES: &str = "#4c1d95";
    pub const PLAYER_EYES: &str = "#ff69b4";
    pub const PLAYER_CHEEKS: &str = "#ff9baa";
}

/// Grid cell size in pixels
pub const GRID_SPACING: f64 = 50.0;

/// Visual options for a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    /// Neon glow behind sprites
    pub glow: bool,
    /// Retro grid lines
    pub grid: bool,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            glow: true,
            grid: true,
        }
    }
}

impl From<&Settings> for RenderStyle {
    fn from(settings: &Settings) -> Self {
        Self {
            glow: settings.effective_glow(),
            grid: settings.show_grid,
        }
    }
}

/// Draw one full frame
pub fn draw_frame(surface: &mut dyn Surface, state: &GameState, tuning: &Tuning, style: &RenderStyle) {
    let w = tuning.playfield_width as f64;
    let h = tuning.playfield_height as f64;

    surface.fill_vertical_gradient(0.0, 0.0, w, h, &palette::BACKGROUND);
    if style.grid {
        draw_grid(surface, w, h);
    }

    draw_player(surface, &state.player, style);
    for entity in &state.entities {
        draw_entity(surface, entity, style);
    }
    surface.set_glow(palette::NEON_PINK, 0.0);

    draw_hud(surface, state);

    match state.phase {
        GamePhase::Running => {}
        GamePhase::Paused => draw_pause_overlay(surface, w, h),
        GamePhase::GameOver => draw_game_over_overlay(surface, state, w, h),
    }
}

fn draw_grid(surface: &mut dyn Surface, w: f64, h: f64) {
    let mut x = 0.0;
    while x < w {
        surface.stroke_line((x, 0.0), (x, h), palette::GRID, 1.0);
        x += GRID_SPACING;
    }
    let mut y = 0.0;
    while y < h {
        surface.stroke_line((0.0, y), (w, y), palette::GRID, 1.0);
        y += GRID_SPACING;
    }
}

/// Hedgehog sprite, laid out on a 30px cell and scaled to the player size
fn draw_player(surface: &mut dyn Surface, player: &Entity, style: &RenderStyle) {
    let x = player.pos.x as f64;
    let y = player.pos.y as f64;
    let s = player.size.x as f64 / 30.0;

    if style.glow {
        surface.set_glow(palette::NEON_PINK, 15.0);
    }
    // Body
    surface.fill_rect(x + 3.0 * s, y + 15.0 * s, 24.0 * s, 15.0 * s, palette::PLAYER_BODY);
    surface.set_glow(palette::NEON_PINK, 0.0);

    // Head
    surface.fill_circle(x + 15.0 * s, y + 12.0 * s, 10.0 * s, palette::PLAYER_HEAD);

    // Spines
    for i in 0..5 {
        let base = i as f64 * 3.0;
        surface.fill_triangle(
            [
                (x + (8.0 + base) * s, y + 5.0 * s),
                (x + (6.0 + base) * s, y),
                (x + (10.0 + base) * s, y),
            ],
            palette::PLAYER_SPINES,
        );
    }

    // Eyes, shine, cheeks
    for (ex, shine_x) in [(12.0, 13.0), (18.0, 19.0)] {
        surface.fill_circle(x + ex * s, y + 10.0 * s, 2.0 * s, palette::PLAYER_EYES);
        surface.fill_circle(x + shine_x * s, y + 9.0 * s, 1.0 * s, palette::LABEL);
    }
    for cx in [9.0, 21.0] {
        surface.fill_circle(x + cx * s, y + 12.0 * s, 1.5 * s, palette::PLAYER_CHEEKS);
    }

    // Feet
    for fx in [8.0, 18.0] {
        surface.fill_rect(x + fx * s, y + 28.0 * s, 4.0 * s, 2.0 * s, palette::PLAYER_EYES);
    }
}

fn draw_entity(surface: &mut dyn Surface, entity: &Entity, style: &RenderStyle) {
    let (color, label) = match entity.kind {
        EntityKind::GasBomb => (palette::BOMB, Some("⛽")),
        EntityKind::MonToken => (palette::TOKEN, Some("M")),
        EntityKind::Powerup => (palette::POWERUP, None),
        EntityKind::Obstacle => (palette::OBSTACLE, None),
        EntityKind::Player => return,
    };
    let x = entity.pos.x as f64;
    let y = entity.pos.y as f64;
    let w = entity.size.x as f64;
    let h = entity.size.y as f64;

    if style.glow {
        surface.set_glow(color, 15.0);
    }
    surface.fill_rect(x, y, w, h, color);
    surface.set_glow(color, 0.0);

    if let Some(label) = label {
        surface.fill_text(
            label,
            x + w / 2.0,
            y + h / 2.0 + 5.0,
            "12px monospace",
            palette::LABEL,
            TextAlign::Center,
        );
    }
}

/// HUD lines, top to bottom
pub fn hud_lines(state: &GameState) -> [String; 4] {
    [
        format!("Score: {}", state.score),
        format!("Lives: {}", state.lives),
        format!("Level: {}", state.level()),
        format!("MON: {}", state.mon_tokens),
    ]
}

fn draw_hud(surface: &mut dyn Surface, state: &GameState) {
    for (i, line) in hud_lines(state).iter().enumerate() {
        surface.fill_text(
            line,
            20.0,
            30.0 + i as f64 * 30.0,
            "bold 20px monospace",
            palette::NEON_PINK,
            TextAlign::Left,
        );
    }
}

fn draw_pause_overlay(surface: &mut dyn Surface, w: f64, h: f64) {
    surface.fill_rect(0.0, 0.0, w, h, "rgba(0, 0, 0, 0.7)");
    let cx = w / 2.0;
    let cy = h / 2.0;
    surface.fill_text("PAUSED", cx, cy, "bold 40px monospace", palette::NEON_PINK, TextAlign::Center);
    surface.fill_text(
        "Press SPACE to continue",
        cx,
        cy + 40.0,
        "20px monospace",
        palette::NEON_PINK,
        TextAlign::Center,
    );
}

fn draw_game_over_overlay(surface: &mut dyn Surface, state: &GameState, w: f64, h: f64) {
    surface.fill_rect(0.0, 0.0, w, h, "rgba(0, 0, 0, 0.8)");
    let cx = w / 2.0;
    let cy = h / 2.0;
    surface.fill_text("GAME OVER", cx, cy - 40.0, "bold 40px monospace", palette::BOMB, TextAlign::Center);
    surface.fill_text(
        &format!("Final Score: {}", format_score(state.score)),
        cx,
        cy,
        "24px monospace",
        palette::NEON_PINK,
        TextAlign::Center,
    );
    surface.fill_text(
        &format!("MON Collected: {}", state.mon_tokens),
        cx,
        cy + 30.0,
        "24px monospace",
        palette::NEON_PINK,
        TextAlign::Center,
    );
    surface.fill_text(
        "Press SPACE to restart",
        cx,
        cy + 70.0,
        "20px monospace",
        palette::NEON_PINK,
        TextAlign::Center,
    );
}
