//! Positional command-line argument parsing: `tracer [threads] [spp] [maxBounces]`.
//!
//! Matches the reference's `argv` handling exactly — each argument is
//! optional, and only overrides the matching [`Config`](crate::config::Config)
//! field when present.

use crate::config::Config;

/// Applies up to three optional positional arguments (threads, samples per
/// pixel, max bounces) onto `config`, left to right. Returns an error
/// message for the first argument that isn't a valid unsigned integer.
pub fn apply_args(config: &mut Config, args: &[String]) -> Result<(), String> {
    if let Some(raw) = args.first() {
        config.threads = parse_positional(raw, "threads")?;
    }
    if let Some(raw) = args.get(1) {
        config.samples_per_pixel = parse_positional(raw, "samplesPerPixel")?;
    }
    if let Some(raw) = args.get(2) {
        config.max_bounces = parse_positional(raw, "maxBounces")?;
    }
    Ok(())
}

fn parse_positional(raw: &str, name: &str) -> Result<usize, String> {
    raw.parse::<usize>().map_err(|_| format!("invalid {name}: {raw:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_defaults_untouched_with_no_args() {
        let mut config = Config::default();
        let defaults = config.clone();
        apply_args(&mut config, &[]).unwrap();
        assert_eq!(config.threads, defaults.threads);
        assert_eq!(config.samples_per_pixel, defaults.samples_per_pixel);
        assert_eq!(config.max_bounces, defaults.max_bounces);
    }

    #[test]
    fn overrides_fields_left_to_right() {
        let mut config = Config::default();
        let args = vec!["4".to_string(), "8".to_string(), "2".to_string()];
        apply_args(&mut config, &args).unwrap();
        assert_eq!(config.threads, 4);
        assert_eq!(config.samples_per_pixel, 8);
        assert_eq!(config.max_bounces, 2);
    }

    #[test]
    fn partial_args_only_override_the_given_prefix() {
        let mut config = Config::default();
        let defaults = config.clone();
        apply_args(&mut config, &["4".to_string()]).unwrap();
        assert_eq!(config.threads, 4);
        assert_eq!(config.samples_per_pixel, defaults.samples_per_pixel);
        assert_eq!(config.max_bounces, defaults.max_bounces);
    }

    #[test]
    fn rejects_non_numeric_arguments() {
        let mut config = Config::default();
        let err = apply_args(&mut config, &["not-a-number".to_string()]).unwrap_err();
        assert!(err.contains("threads"));
    }
}
