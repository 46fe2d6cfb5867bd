//! Theme configuration for `Batchtube`.
//!
//! Dark surfaces with one accent and a color per item status. Everything is
//! exposed to the stylesheet as CSS custom properties.

use batchtube_core::ItemStatus;

/// Color palette for the application.
pub mod colors {
    /// Surfaces.
    pub mod background {
        /// Page background.
        pub const PRIMARY: &str = "#0b0b0f";
        /// Panels and the input bar.
        pub const SECONDARY: &str = "#15151b";
        /// Cards.
        pub const CARD: &str = "#1d1d25";
        /// Hovered card.
        pub const HOVER: &str = "#272731";
    }

    /// Text colors.
    pub mod text {
        /// Primary text color.
        pub const PRIMARY: &str = "#f4f4f5";
        /// Secondary/muted text.
        pub const SECONDARY: &str = "#a1a1aa";
        /// Disabled text.
        pub const DISABLED: &str = "#52525b";
    }

    /// Accent colors.
    pub mod accent {
        /// Buttons, selection rings and the progress bar.
        pub const PRIMARY: &str = "#ef4444";
        /// Hovered buttons.
        pub const PRIMARY_DIM: &str = "#b91c1c";
        /// Links.
        pub const LINK: &str = "#60a5fa";
    }

    /// Item status colors.
    pub mod status {
        /// Queued, waiting for its turn.
        pub const QUEUED: &str = "#a1a1aa";
        /// Transferring.
        pub const DOWNLOADING: &str = "#60a5fa";
        /// Post-processing.
        pub const MERGING: &str = "#a78bfa";
        /// Finished.
        pub const COMPLETE: &str = "#34d399";
        /// Failed.
        pub const ERROR: &str = "#f87171";
        /// Outcome unknown.
        pub const INTERRUPTED: &str = "#fbbf24";
    }

    /// Border colors.
    pub mod border {
        /// Default border.
        pub const DEFAULT: &str = "rgba(255, 255, 255, 0.08)";
        /// Selected card border.
        pub const SELECTED: &str = "#ef4444";
    }
}

/// Typography configuration.
pub mod typography {
    /// Body font stack (system fonts only).
    pub const FONT_FAMILY: &str =
        "-apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif";
    /// Small text.
    pub const SIZE_SM: &str = "0.8125rem";
    /// Base text.
    pub const SIZE_BASE: &str = "0.9375rem";
    /// Heading.
    pub const SIZE_HEADING: &str = "1.5rem";
}

/// Spacing and shape.
pub mod layout {
    /// Gap between cards.
    pub const GAP: &str = "1rem";
    /// Card corner radius.
    pub const RADIUS: &str = "0.625rem";
    /// Minimum card width in the grid.
    pub const CARD_MIN_WIDTH: &str = "220px";
    /// Default transition.
    pub const TRANSITION: &str = "0.15s cubic-bezier(0.4, 0, 0.2, 1)";
}

/// Color used for an item status.
pub const fn status_color(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::Idle => colors::text::SECONDARY,
        ItemStatus::Queued => colors::status::QUEUED,
        ItemStatus::Downloading => colors::status::DOWNLOADING,
        ItemStatus::Merging => colors::status::MERGING,
        ItemStatus::Complete => colors::status::COMPLETE,
        ItemStatus::Error => colors::status::ERROR,
        ItemStatus::Interrupted => colors::status::INTERRUPTED,
    }
}

const STATUSES: [ItemStatus; 7] = [
    ItemStatus::Idle,
    ItemStatus::Queued,
    ItemStatus::Downloading,
    ItemStatus::Merging,
    ItemStatus::Complete,
    ItemStatus::Error,
    ItemStatus::Interrupted,
];

/// Generate CSS custom properties for the theme.
pub fn generate_css_variables() -> String {
    let mut css = format!(
        r":root {{
  --bg-primary: {bg_primary};
  --bg-secondary: {bg_secondary};
  --bg-card: {bg_card};
  --bg-hover: {bg_hover};
  --text-primary: {text_primary};
  --text-secondary: {text_secondary};
  --text-disabled: {text_disabled};
  --accent-primary: {accent_primary};
  --accent-primary-dim: {accent_primary_dim};
  --accent-link: {accent_link};
  --border-default: {border_default};
  --border-selected: {border_selected};
  --font-family: {font_family};
  --font-size-sm: {font_sm};
  --font-size-base: {font_base};
  --font-size-heading: {font_heading};
  --gap: {gap};
  --radius: {radius};
  --card-min-width: {card_min_width};
  --transition: {transition};
",
        bg_primary = colors::background::PRIMARY,
        bg_secondary = colors::background::SECONDARY,
        bg_card = colors::background::CARD,
        bg_hover = colors::background::HOVER,
        text_primary = colors::text::PRIMARY,
        text_secondary = colors::text::SECONDARY,
        text_disabled = colors::text::DISABLED,
        accent_primary = colors::accent::PRIMARY,
        accent_primary_dim = colors::accent::PRIMARY_DIM,
        accent_link = colors::accent::LINK,
        border_default = colors::border::DEFAULT,
        border_selected = colors::border::SELECTED,
        font_family = typography::FONT_FAMILY,
        font_sm = typography::SIZE_SM,
        font_base = typography::SIZE_BASE,
        font_heading = typography::SIZE_HEADING,
        gap = layout::GAP,
        radius = layout::RADIUS,
        card_min_width = layout::CARD_MIN_WIDTH,
        transition = layout::TRANSITION,
    );
    for status in STATUSES {
        css.push_str(&format!(
            "  --status-{}: {};\n",
            status.as_str(),
            status_color(status)
        ));
    }
    css.push('}');
    css
}
