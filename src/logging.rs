use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "paddock=warn",
        1 => "paddock=info",
        _ => "paddock=debug",
    }
}

/// Installs the stderr subscriber. `RUST_LOG` takes precedence over `-v`.
pub fn init(verbose: u8, no_color: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(verbose).into());
    let fmt = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(false);
    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry().with(filter).with(fmt).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(default_directive(0), "paddock=warn");
        assert_eq!(default_directive(1), "paddock=info");
        assert_eq!(default_directive(4), "paddock=debug");
    }
}
