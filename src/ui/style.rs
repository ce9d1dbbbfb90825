//! Central UI style constants and embed helpers.

use serenity::builder::CreateEmbed;

pub const COLOR_ERROR: u32 = 0xE74C3C; // Red
pub const COLOR_INFO: u32 = 0x3DB4F2; // AniList blue
pub const COLOR_DEFAULT: u32 = 0xDEC027; // Fallback profile gold

/// Placeholder shown in place of gated adult-content entries. Entries keep
/// their list position so numbering stays stable.
pub const HIDDEN_ENTRY_LABEL: &str = "Hidden entry";
pub const HIDDEN_ENTRY_NOTE: &str =
    "Adult content. Connect your AniList account and use an age-restricted channel to view it.";

/// Maps an AniList profile color (a name or `#rrggbb`) to an embed color.
pub fn profile_color(color: Option<&str>) -> u32 {
    let Some(color) = color else {
        return COLOR_DEFAULT;
    };
    if let Some(hex) = color.strip_prefix('#') {
        return u32::from_str_radix(hex, 16).unwrap_or(COLOR_DEFAULT);
    }
    match color {
        "blue" => 0x3DB4F2,
        "purple" => 0xC063FF,
        "pink" => 0xFC9DD6,
        "orange" => 0xEF881A,
        "red" => 0xE13333,
        "green" => 0x4CCA51,
        "gray" => 0x677B94,
        _ => COLOR_DEFAULT,
    }
}

/// Convenience builder for an alert/error-styled embed.
pub fn error_embed<T: Into<String>, U: Into<String>>(title: T, description: U) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(description)
        .color(COLOR_ERROR)
}

/// Neutral informational embed, distinct in tone from an error.
pub fn info_embed<T: Into<String>, U: Into<String>>(title: T, description: U) -> CreateEmbed {
    CreateEmbed::new()
        .title(title)
        .description(description)
        .color(COLOR_INFO)
}
