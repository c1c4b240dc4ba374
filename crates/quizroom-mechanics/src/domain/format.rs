//! Display formatting helpers.

/// `"M min S s"` for a minute or more, `"S s"` otherwise.
#[must_use]
pub fn humanize_seconds(secs: i64) -> String {
    let secs = secs.max(0);
    let (m, s) = (secs / 60, secs % 60);
    if m > 0 {
        format!("{m} min {s} s")
    } else {
        format!("{s} s")
    }
}

/// `"MM:SS"` countdown text for a timer length.
#[must_use]
pub fn timer_text(ms: u64) -> String {
    let secs = ms / 1000;
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Rounded share of `count` in `total`, in percent.
#[must_use]
pub fn percent(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let scaled = (count * 200 + total) / (total * 2);
    u32::try_from(scaled).unwrap_or(100)
}

/// First `max` characters of `text` on a single line.
#[must_use]
pub fn button_excerpt(text: &str, max: usize) -> String {
    text.chars()
        .take(max)
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_seconds() {
        assert_eq!(humanize_seconds(5), "5 s");
        assert_eq!(humanize_seconds(62), "1 min 2 s");
        assert_eq!(humanize_seconds(-3), "0 s");
    }

    #[test]
    fn test_timer_text() {
        assert_eq!(timer_text(300_000), "05:00");
        assert_eq!(timer_text(90_500), "01:30");
    }

    #[test]
    fn test_percent_rounds_half_up() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(0, 0), 0);
    }

    #[test]
    fn test_button_excerpt_flattens_lines() {
        assert_eq!(button_excerpt("a\nbcdef", 4), "a bc");
    }
}
