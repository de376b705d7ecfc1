/// Install a formatting subscriber filtered to this crate.
///
/// `verbose` maps 0 to warn, 1 to info, 2 to debug and anything higher to
/// trace. Returns false when a global subscriber is already installed.
pub fn init(verbose: u8) -> bool {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("variant_context={}", level))
        .try_init()
        .is_ok()
}
