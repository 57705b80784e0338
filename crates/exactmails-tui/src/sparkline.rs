// Sparkline rendering utilities
use exactmails_core::DiscoveryTrend;

/// Generate a sparkline visualization using Unicode block characters
/// Characters: ▁ ▂ ▃ ▄ ▅ ▆ ▇ █
pub fn render_sparkline(data: &[f64]) -> String {
    if data.is_empty() {
        return String::new();
    }

    let chars = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    let max = data.iter().cloned().fold(0.0f64, f64::max);

    if max == 0.0 {
        return "▁".repeat(data.len());
    }

    data.iter()
        .map(|&v| {
            let ratio = (v / max * 7.0).min(7.0).max(0.0);
            chars[ratio as usize]
        })
        .collect()
}

/// Sparkline for the discovery trend chart, one glyph per bucket.
pub fn trend_sparkline(trend: &DiscoveryTrend) -> String {
    let data: Vec<f64> = trend.points.iter().map(|p| p.count as f64).collect();
    render_sparkline(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use exactmails_core::TrendPoint;

    #[test]
    fn test_sparkline_rendering() {
        let data = vec![1.0, 2.0, 3.0, 5.0, 8.0, 5.0, 3.0, 2.0];
        let sparkline = render_sparkline(&data);
        assert_eq!(sparkline.chars().count(), 8);
        assert!(sparkline.contains('█')); // Should have max char
    }

    #[test]
    fn test_empty_sparkline() {
        let data: Vec<f64> = vec![];
        let sparkline = render_sparkline(&data);
        assert_eq!(sparkline, "");
    }

    #[test]
    fn test_zero_data_sparkline() {
        let data = vec![0.0, 0.0, 0.0];
        let sparkline = render_sparkline(&data);
        assert_eq!(sparkline, "▁▁▁");
    }

    #[test]
    fn test_trend_sparkline_uses_bucket_counts() {
        let trend = DiscoveryTrend {
            points: vec![
                TrendPoint { label: "Week 1".into(), count: 0 },
                TrendPoint { label: "Week 2".into(), count: 4 },
            ],
            weekly: true,
        };
        let sparkline = trend_sparkline(&trend);
        assert_eq!(sparkline.chars().count(), 2);
        assert!(sparkline.ends_with('█'));
    }
}
