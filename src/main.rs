fn main() {
    #[cfg(feature = "cli")]
    earl::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("earl: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
