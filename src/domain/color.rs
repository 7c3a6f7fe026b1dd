use serde::Deserialize;
use std::fmt;

/// A render color, passed through untouched to the output (any CSS color).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Qualitative palette used when the config does not provide one
pub fn default_palette() -> Vec<Color> {
    [
        "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
        "#bcbd22", "#17becf",
    ]
    .into_iter()
    .map(Color::new)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette_is_distinct() {
        let palette = default_palette();
        assert_eq!(palette.len(), 10);
        for (i, a) in palette.iter().enumerate() {
            assert!(palette[i + 1..].iter().all(|b| a != b));
        }
    }

    #[test]
    fn test_color_deserializes_from_string() {
        let colors: Vec<Color> = serde_json::from_str(r##"["red", "#00ff00"]"##).unwrap();
        assert_eq!(colors[0].as_str(), "red");
        assert_eq!(colors[1].to_string(), "#00ff00");
    }
}
