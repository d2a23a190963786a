const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

pub const DEFAULT_COLOR: &str = "#1f77b4";
pub const EDGE_COLOR: &str = "#64b4ff";
pub const ACTIVE_EDGE_COLOR: &str = "#ffd166";
pub const LABEL_COLOR: &str = "#e8e8f0";
pub const BACKGROUND: &str = "#1a1a2e";

/// Share of the original brightness kept by dimmed elements.
const DIM_FACTOR: f64 = 0.35;

/// Stable palette colour for a category name (FNV-1a over the lowercase bytes).
pub fn category_color(category: Option<&str>) -> &'static str {
	let Some(category) = category else {
		return DEFAULT_COLOR;
	};
	let hash = category
		.to_lowercase()
		.bytes()
		.fold(0x811c_9dc5_u32, |h, b| (h ^ u32::from(b)).wrapping_mul(0x0100_0193));
	COLORS[hash as usize % COLORS.len()]
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
	let hex = color.strip_prefix('#').filter(|h| h.is_ascii())?;
	let channel = |s: &str| u8::from_str_radix(s, 16).ok();
	match hex.len() {
		6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
		3 => {
			let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
			Some((expand(0)?, expand(1)?, expand(2)?))
		}
		_ => None,
	}
}

/// Darkened variant of `color` used for dimmed elements. Colours that are not
/// `#rgb`/`#rrggbb` fall back to a translucent grey so they still recede.
pub fn darken(color: &str) -> String {
	match parse_hex(color) {
		Some((r, g, b)) => {
			let scale = |c: u8| (f64::from(c) * DIM_FACTOR).round() as u8;
			format!("#{:02x}{:02x}{:02x}", scale(r), scale(g), scale(b))
		}
		None => "rgba(90, 90, 110, 0.5)".to_string(),
	}
}
